//! Combat resolver — applies Shoot actions and the resulting deaths.
//!
//! Shots resolve in an order shuffled by the world RNG so simultaneous
//! fire carries no id-order bias. Ammunition is spent on firing, hit or
//! miss. Hits mark targets in the pending-kill list; deaths are applied
//! only after every shot has resolved, so several hits on one target in
//! the same turn are idempotent and order-independent.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use skirmish_core::action::Action;
use skirmish_core::components::{Launcher, SamControl};
use skirmish_core::report::{CombatReport, ShotOutcome};
use skirmish_core::unit::UnitId;

use crate::actions::validate_in_world;
use crate::world::WorldState;

/// Hit probability at a given distance.
///
/// Linear interpolation from `base` at distance 0 down to `min_p` at
/// `distance == max_range`, and 0 beyond. A non-positive `max_range`
/// yields 0 at every distance.
pub fn hit_probability(distance: f64, max_range: f64, base: f64, min_p: f64) -> f64 {
    debug_assert!(distance >= 0.0, "distance cannot be negative: {distance}");
    if max_range <= 0.0 || distance > max_range {
        return 0.0;
    }
    let frac = (distance / max_range).clamp(0.0, 1.0);
    base - (base - min_p) * frac
}

/// Resolve all Shoot actions for the turn, then apply pending deaths.
///
/// Actions queued for dead or unknown units are ignored. Updates the
/// no-shooting stall counter: reset when at least one shot was actually
/// fired (regardless of hit), incremented otherwise.
pub fn resolve(world: &mut WorldState, actions: &HashMap<UnitId, Action>) -> CombatReport {
    let mut shooters: Vec<UnitId> = world
        .alive_ids()
        .into_iter()
        .filter(|id| matches!(actions.get(id), Some(Action::Shoot { .. })))
        .collect();

    // Shuffled order: simultaneous shots against related targets must not
    // be biased by insertion order.
    shooters.shuffle(&mut world.rng);

    let mut shots = Vec::with_capacity(shooters.len());
    for id in shooters {
        if let Some(action @ Action::Shoot { target }) = actions.get(&id).copied() {
            shots.push(resolve_single(world, id, target, action));
        }
    }

    let (death_logs, killed) = apply_pending_deaths(world);

    let combat_occurred = shots.iter().any(|shot| shot.success);
    if combat_occurred {
        world.turns_without_shooting = 0;
    } else {
        world.turns_without_shooting += 1;
    }

    CombatReport {
        shots,
        death_logs,
        killed,
        combat_occurred,
    }
}

/// Resolve one shot: validate, roll, spend ammunition, mark the kill.
fn resolve_single(
    world: &mut WorldState,
    attacker: UnitId,
    target: UnitId,
    action: Action,
) -> ShotOutcome {
    if let Err(rejection) = validate_in_world(world, attacker, action) {
        let log = rejection.message.clone();
        return ShotOutcome {
            attacker,
            target,
            success: false,
            hit: None,
            distance: None,
            hit_probability: None,
            roll: None,
            target_killed: false,
            rejection: Some(rejection),
            log,
        };
    }

    // Validated: both units exist, are alive, are hostile, and in range.
    let distance = match (world.position(attacker), world.position(target)) {
        (Some(a), Some(b)) => world.grid.distance(a, b),
        _ => 0.0,
    };
    let (prob, sam) = match world.launcher(attacker) {
        Some(launcher) => (
            hit_probability(
                distance,
                launcher.max_range,
                launcher.base_hit_prob,
                launcher.min_hit_prob,
            ),
            world.sam_control(attacker).is_some(),
        ),
        None => (0.0, false),
    };

    let roll: f64 = world.rng.gen();
    let hit = roll <= prob;

    consume_missile(world, attacker);
    if sam {
        start_cooldown(world, attacker);
    }

    if hit {
        world.mark_for_kill(target);
    }

    // The receiving team learns the attacker has fired — permanently.
    if let Some(target_team) = world.team(target) {
        world.team_view_mut(target_team).record_fired(attacker);
    }

    let log = format!(
        "{} fires at {} (d={distance:.1}, p={prob:.2}, roll={roll:.2}) -> {}",
        world.label(attacker),
        world.label(target),
        if hit { "HIT" } else { "MISS" }
    );

    ShotOutcome {
        attacker,
        target,
        success: true,
        hit: Some(hit),
        distance: Some(distance),
        hit_probability: Some(prob),
        roll: Some(roll),
        target_killed: hit,
        rejection: None,
        log,
    }
}

/// Apply the turn's pending kills in mark order. Returns the death log
/// lines and the ids actually killed.
fn apply_pending_deaths(world: &mut WorldState) -> (Vec<String>, Vec<UnitId>) {
    let mut logs = Vec::new();
    let mut killed = Vec::new();
    for id in world.take_pending_kills() {
        if world.is_alive(id) {
            world.set_alive(id, false);
            logs.push(format!("{} was destroyed!", world.label(id)));
            killed.push(id);
        }
    }
    (logs, killed)
}

fn consume_missile(world: &mut WorldState, id: UnitId) {
    if let Some(e) = world.entity(id) {
        if let Ok(mut launcher) = world.ecs.get::<&mut Launcher>(e) {
            launcher.missiles = launcher.missiles.saturating_sub(1);
        }
    }
}

fn start_cooldown(world: &mut WorldState, id: UnitId) {
    if let Some(e) = world.entity(id) {
        if let Ok(mut control) = world.ecs.get::<&mut SamControl>(e) {
            control.start_cooldown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use skirmish_core::enums::{RejectReason, Team};
    use skirmish_core::grid::{Cell, Grid};
    use skirmish_core::unit::UnitRecord;

    use crate::systems::sensors;

    fn duel_world(seed: u64, base: f64, min_p: f64, separation: i32) -> WorldState {
        let mut world = WorldState::new(Grid::new(20, 20).unwrap(), seed);
        world
            .spawn(&UnitRecord::aircraft(
                Team::Blue,
                Cell::new(2, 10),
                9.0,
                1,
                4.0,
                base,
                min_p,
            ))
            .unwrap();
        world
            .spawn(&UnitRecord::aircraft(
                Team::Red,
                Cell::new(2 + separation, 10),
                9.0,
                1,
                4.0,
                base,
                min_p,
            ))
            .unwrap();
        sensors::refresh(&mut world);
        world
    }

    fn shoot(attacker: u32, target: u32) -> HashMap<UnitId, Action> {
        let mut actions = HashMap::new();
        actions.insert(
            UnitId(attacker),
            Action::Shoot {
                target: UnitId(target),
            },
        );
        actions
    }

    #[test]
    fn test_hit_probability_endpoints() {
        assert_eq!(hit_probability(0.0, 10.0, 0.8, 0.1), 0.8);
        assert!((hit_probability(5.0, 10.0, 0.8, 0.1) - 0.45).abs() < 1e-12);
        assert!((hit_probability(10.0, 10.0, 0.8, 0.1) - 0.1).abs() < 1e-12);
        assert_eq!(hit_probability(10.1, 10.0, 0.8, 0.1), 0.0);
        assert_eq!(hit_probability(3.0, 0.0, 0.8, 0.1), 0.0);
    }

    #[test]
    fn test_ammo_spent_regardless_of_hit() {
        // Boundary shot: d == max_range == 4 gives p == min_p.
        let mut world = duel_world(5, 0.8, 0.1, 4);
        let report = resolve(&mut world, &shoot(0, 1));

        let outcome = &report.shots[0];
        assert!(outcome.success);
        assert!((outcome.hit_probability.unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(world.missiles(UnitId(0)), Some(0));
        assert!(report.combat_occurred);
        assert_eq!(world.turns_without_shooting(), 0);
    }

    #[test]
    fn test_guaranteed_hit_kills_after_all_shots() {
        let mut world = duel_world(5, 1.0, 1.0, 2);
        let report = resolve(&mut world, &shoot(0, 1));

        assert_eq!(report.killed, vec![UnitId(1)]);
        assert!(!world.is_alive(UnitId(1)));
        assert_eq!(report.death_logs.len(), 1);
        assert!(report.shots[0].target_killed);
    }

    #[test]
    fn test_guaranteed_miss_spends_ammo_without_kill() {
        let mut world = duel_world(5, 0.0, 0.0, 2);
        let report = resolve(&mut world, &shoot(0, 1));

        assert!(report.shots[0].success);
        assert_eq!(report.shots[0].hit, Some(false));
        assert!(report.killed.is_empty());
        assert!(world.is_alive(UnitId(1)));
        assert_eq!(world.missiles(UnitId(0)), Some(0));
        // A fired miss still resets the stall counter.
        assert!(report.combat_occurred);
    }

    #[test]
    fn test_rejected_shot_spends_no_ammo() {
        let mut world = duel_world(5, 0.8, 0.1, 9);
        // Separation 9 is within radar (visible) but beyond missile range 4.
        let report = resolve(&mut world, &shoot(0, 1));

        let outcome = &report.shots[0];
        assert!(!outcome.success);
        assert_eq!(
            outcome.rejection.as_ref().unwrap().code,
            RejectReason::OutOfRange
        );
        assert_eq!(world.missiles(UnitId(0)), Some(1));
        assert!(!report.combat_occurred);
        assert_eq!(world.turns_without_shooting(), 1);
    }

    #[test]
    fn test_mutual_fire_both_can_die() {
        // Both sides guaranteed hits: deaths apply after all shots, so
        // both shoot and both die.
        let mut world = duel_world(5, 1.0, 1.0, 2);
        let mut actions = HashMap::new();
        actions.insert(UnitId(0), Action::Shoot { target: UnitId(1) });
        actions.insert(UnitId(1), Action::Shoot { target: UnitId(0) });
        let report = resolve(&mut world, &actions);

        assert_eq!(report.shots.len(), 2);
        assert!(report.shots.iter().all(|s| s.success));
        assert_eq!(report.killed.len(), 2);
        assert!(!world.is_alive(UnitId(0)));
        assert!(!world.is_alive(UnitId(1)));
    }

    #[test]
    fn test_double_hit_same_target_counted_once() {
        let mut world = WorldState::new(Grid::new(20, 20).unwrap(), 5);
        for x in [2, 4] {
            world
                .spawn(&UnitRecord::aircraft(
                    Team::Blue,
                    Cell::new(x, 10),
                    9.0,
                    1,
                    6.0,
                    1.0,
                    1.0,
                ))
                .unwrap();
        }
        let victim = world
            .spawn(&UnitRecord::aircraft(
                Team::Red,
                Cell::new(3, 12),
                9.0,
                1,
                6.0,
                1.0,
                1.0,
            ))
            .unwrap();
        sensors::refresh(&mut world);

        let mut actions = HashMap::new();
        actions.insert(UnitId(0), Action::Shoot { target: victim });
        actions.insert(UnitId(1), Action::Shoot { target: victim });
        let report = resolve(&mut world, &actions);

        assert_eq!(report.killed, vec![victim]);
        assert_eq!(report.death_logs.len(), 1);
        assert_eq!(report.shots.iter().filter(|s| s.target_killed).count(), 2);
    }

    #[test]
    fn test_sam_cooldown_starts_on_fire() {
        let mut world = WorldState::new(Grid::new(20, 20).unwrap(), 5);
        let sam = world
            .spawn(&UnitRecord::sam(
                Team::Blue,
                Cell::new(2, 2),
                8.0,
                6,
                6.0,
                0.8,
                0.1,
                5,
                true,
            ))
            .unwrap();
        let enemy = world
            .spawn(&UnitRecord::aircraft(
                Team::Red,
                Cell::new(5, 2),
                9.0,
                1,
                4.0,
                0.8,
                0.1,
            ))
            .unwrap();
        sensors::refresh(&mut world);

        let report = resolve(&mut world, &shoot(sam.0, enemy.0));
        assert!(report.shots[0].success);
        assert_eq!(world.sam_control(sam).unwrap().cooldown_remaining, 5);
        assert_eq!(world.missiles(sam), Some(5));

        // Second attempt while cooling down is rejected without ammo loss.
        sensors::refresh(&mut world);
        let report = resolve(&mut world, &shoot(sam.0, enemy.0));
        assert_eq!(
            report.shots[0].rejection.as_ref().unwrap().code,
            RejectReason::OnCooldown
        );
        assert_eq!(world.missiles(sam), Some(5));
    }

    #[test]
    fn test_target_team_records_attacker_fired() {
        let mut world = duel_world(5, 0.0, 0.0, 2);
        resolve(&mut world, &shoot(0, 1));

        assert!(world.team_view(Team::Red).has_fired_before(UnitId(0)));
        assert!(!world.team_view(Team::Blue).has_fired_before(UnitId(0)));
        // The flag survives the next sensor rebuild.
        sensors::refresh(&mut world);
        assert!(world.team_view(Team::Red).has_fired_before(UnitId(0)));
    }

    #[test]
    fn test_ammo_never_negative() {
        let mut world = duel_world(5, 0.0, 0.0, 2);
        for _ in 0..4 {
            sensors::refresh(&mut world);
            resolve(&mut world, &shoot(0, 1));
        }
        assert_eq!(world.missiles(UnitId(0)), Some(0));
    }

    proptest! {
        /// p(d) stays within [min_p, base] on [0, max_range] and is
        /// monotonically non-increasing in distance.
        #[test]
        fn prop_hit_probability_bounds_and_monotonic(
            base in 0.0..=1.0f64,
            min_frac in 0.0..=1.0f64,
            max_range in 0.1..50.0f64,
            d1 in 0.0..=1.0f64,
            d2 in 0.0..=1.0f64,
        ) {
            let min_p = base * min_frac;
            let (near, far) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
            let p_near = hit_probability(near * max_range, max_range, base, min_p);
            let p_far = hit_probability(far * max_range, max_range, base, min_p);

            prop_assert!(p_near >= min_p - 1e-12 && p_near <= base + 1e-12);
            prop_assert!(p_far <= p_near + 1e-12);
            prop_assert_eq!(hit_probability(max_range * 1.01, max_range, base, min_p), 0.0);
        }
    }
}
