//! Sensor system — recomputes each team's fog-of-war view once per turn.
//!
//! Pure recomputation, no RNG: visibility is a deterministic function of
//! the world. Rules, in order: dead units neither observe nor appear;
//! an observer with zero active radar (decoy, stealthed SAM) sees
//! nothing; a SAM with its radar off is invisible to everyone at any
//! distance; an enemy decoy is always reported as an aircraft; every
//! unit sees itself regardless of its own radar.

use skirmish_core::enums::{Team, UnitKind};
use skirmish_core::observation::Observation;
use skirmish_core::unit::UnitId;

use crate::world::WorldState;

/// Rebuild both team views from the current world.
///
/// Runs as a builder pass: raw per-observer sightings are collected
/// first, then folded into the team views, so partial state is never
/// visible mid-computation. Fired-history on the views survives the
/// rebuild.
pub fn refresh(world: &mut WorldState) {
    for team in Team::BOTH {
        world.team_view_mut(team).reset();
    }

    let alive = world.alive_ids();

    for &id in &alive {
        if let Some(team) = world.team(id) {
            world.team_view_mut(team).add_friendly_id(id);
        }
    }

    // Collect first, fold second.
    let mut sightings: Vec<(Team, Observation)> = Vec::new();
    for &observer in &alive {
        let Some(observer_team) = world.team(observer) else {
            continue;
        };
        for obs in observations_for(world, observer) {
            sightings.push((observer_team, obs));
        }
    }
    for (team, obs) in sightings {
        world.team_view_mut(team).add_observation(obs);
    }

    // Self-observations: a unit always knows its own true position and
    // kind, even with its radar off.
    let mut selves: Vec<(Team, Observation)> = Vec::new();
    for &id in &alive {
        let (Some(team), Some(kind), Some(pos)) =
            (world.team(id), world.kind(id), world.position(id))
        else {
            continue;
        };
        selves.push((
            team,
            Observation {
                unit_id: id,
                kind,
                team,
                pos,
                seen_by: [id].into_iter().collect(),
            },
        ));
    }
    for (team, obs) in selves {
        world.team_view_mut(team).add_observation(obs);
    }
}

/// What a single unit currently observes (excluding itself).
pub fn observations_for(world: &WorldState, observer: UnitId) -> Vec<Observation> {
    let mut observations = Vec::new();

    if !world.is_alive(observer) {
        return observations;
    }
    let active_radar = world.active_radar_range(observer);
    if active_radar <= 0.0 {
        return observations;
    }
    let (Some(observer_pos), Some(observer_team)) =
        (world.position(observer), world.team(observer))
    else {
        return observations;
    };

    for target in world.alive_ids() {
        if target == observer {
            continue;
        }
        if is_stealthed_sam(world, target) {
            continue;
        }
        let (Some(target_pos), Some(target_team), Some(target_kind)) = (
            world.position(target),
            world.team(target),
            world.kind(target),
        ) else {
            continue;
        };
        if world.grid.distance(observer_pos, target_pos) > active_radar {
            continue;
        }

        observations.push(Observation {
            unit_id: target,
            kind: apparent_kind(target_kind, target_team, observer_team),
            team: target_team,
            pos: target_pos,
            seen_by: [observer].into_iter().collect(),
        });
    }

    observations
}

/// Whether one unit can currently see another. Used by validation and agents.
pub fn can_observe(world: &WorldState, observer: UnitId, target: UnitId) -> bool {
    if observer == target || !world.is_alive(observer) || !world.is_alive(target) {
        return false;
    }
    if is_stealthed_sam(world, target) {
        return false;
    }
    let active_radar = world.active_radar_range(observer);
    if active_radar <= 0.0 {
        return false;
    }
    match (world.position(observer), world.position(target)) {
        (Some(a), Some(b)) => world.grid.distance(a, b) <= active_radar,
        _ => false,
    }
}

/// A SAM with its radar off is unconditionally invisible, even inside
/// weapon range.
fn is_stealthed_sam(world: &WorldState, id: UnitId) -> bool {
    world.sam_control(id).map(|sam| !sam.on).unwrap_or(false)
}

/// Friendlies see the truth; an enemy decoy masquerades as an aircraft,
/// permanently — sensing alone never unmasks it.
fn apparent_kind(true_kind: UnitKind, target_team: Team, observer_team: Team) -> UnitKind {
    if target_team == observer_team {
        return true_kind;
    }
    if true_kind == UnitKind::Decoy {
        return UnitKind::Aircraft;
    }
    true_kind
}
