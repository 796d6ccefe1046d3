//! Action enumeration and validation.
//!
//! Two validation depths, both returning structured rejections rather
//! than errors:
//!
//! - [`validate_unit_action`] — entity-level checks only (alive,
//!   capability, ammunition, SAM radar/cooldown).
//! - [`validate_in_world`] — the shared validator the resolvers run
//!   first: entity-level checks plus the world-level checks knowable
//!   before simultaneous resolution (target visibility, range).
//!
//! Destination-cell occupancy is deliberately absent from both: it can
//! only be decided during the movement phase, when all intended moves
//! are resolved together.

use skirmish_core::action::{Action, Rejection};
use skirmish_core::enums::{MoveDir, RejectReason};
use skirmish_core::unit::UnitId;

use crate::world::WorldState;

/// Enumerate the locally feasible actions for a unit.
///
/// Respects capability flags, in-bounds movement destinations, and only
/// offers `Shoot` against alive, team-visible enemies within missile
/// range. Dead or unknown units get an empty list.
pub fn allowed_actions(world: &WorldState, id: UnitId) -> Vec<Action> {
    if !world.is_alive(id) {
        return Vec::new();
    }
    let Some(pos) = world.position(id) else {
        return Vec::new();
    };
    let Some(team) = world.team(id) else {
        return Vec::new();
    };

    let mut actions = vec![Action::Wait];

    if world.can_move(id) {
        for dir in MoveDir::ALL {
            if world.grid.in_bounds(pos + dir.delta()) {
                actions.push(Action::Move { dir });
            }
        }
    }

    if let Some(launcher) = world.launcher(id) {
        let sam_ready = world
            .sam_control(id)
            .map(|sam| sam.on && sam.ready())
            .unwrap_or(true);
        if launcher.missiles > 0 && sam_ready {
            for target in world.team_view(team).enemy_ids() {
                if !world.is_alive(target) {
                    continue;
                }
                let Some(target_pos) = world.position(target) else {
                    continue;
                };
                if world.grid.distance(pos, target_pos) <= launcher.max_range {
                    actions.push(Action::Shoot { target });
                }
            }
        }
    }

    if let Some(sam) = world.sam_control(id) {
        actions.push(Action::Toggle { on: !sam.on });
    }

    actions
}

/// Entity-level validation: alive, capability, resources, SAM state.
pub fn validate_unit_action(
    world: &WorldState,
    id: UnitId,
    action: Action,
) -> Result<(), Rejection> {
    if !world.contains(id) {
        return Err(Rejection::new(
            RejectReason::NoSuchUnit,
            format!("no unit with id {id}"),
        ));
    }
    let label = world.label(id);
    if !world.is_alive(id) {
        return Err(Rejection::new(
            RejectReason::UnitDead,
            format!("{label} is dead and cannot act"),
        ));
    }

    match action {
        Action::Wait => Ok(()),
        Action::Move { .. } => {
            if !world.can_move(id) {
                return Err(Rejection::new(
                    RejectReason::NoCapability,
                    format!("{label} cannot move (immobile)"),
                ));
            }
            Ok(())
        }
        Action::Shoot { .. } => {
            let Some(launcher) = world.launcher(id) else {
                return Err(Rejection::new(
                    RejectReason::NoCapability,
                    format!("{label} cannot shoot (no weapons)"),
                ));
            };
            if launcher.missiles == 0 {
                return Err(Rejection::new(
                    RejectReason::NoMissiles,
                    format!("{label} has no missiles"),
                ));
            }
            if let Some(sam) = world.sam_control(id) {
                if !sam.on {
                    return Err(Rejection::new(
                        RejectReason::RadarOff,
                        format!("{label} cannot shoot with radar off"),
                    ));
                }
                if !sam.ready() {
                    return Err(Rejection::new(
                        RejectReason::OnCooldown,
                        format!(
                            "{label} is on cooldown for {} more turns",
                            sam.cooldown_remaining
                        ),
                    ));
                }
            }
            Ok(())
        }
        Action::Toggle { .. } => {
            if world.sam_control(id).is_none() {
                return Err(Rejection::new(
                    RejectReason::NotSam,
                    format!("{label} cannot toggle (not a SAM)"),
                ));
            }
            Ok(())
        }
    }
}

/// The shared validator run by the resolvers before applying an action.
///
/// Entity-level checks first, then the world-level checks for shots:
/// target existence, liveness, hostility, team visibility, and range.
pub fn validate_in_world(world: &WorldState, id: UnitId, action: Action) -> Result<(), Rejection> {
    validate_unit_action(world, id, action)?;

    if let Action::Shoot { target } = action {
        let label = world.label(id);
        if !world.contains(target) {
            return Err(Rejection::new(
                RejectReason::NoSuchUnit,
                format!("{label} has no such target (id {target})"),
            ));
        }
        let target_label = world.label(target);
        if !world.is_alive(target) {
            return Err(Rejection::new(
                RejectReason::TargetDead,
                format!("{label} target {target_label} is already dead"),
            ));
        }
        let Some(team) = world.team(id) else {
            return Err(Rejection::new(
                RejectReason::NoSuchUnit,
                format!("no unit with id {id}"),
            ));
        };
        if world.team(target) == Some(team) {
            return Err(Rejection::new(
                RejectReason::TargetNotEnemy,
                format!("{label} cannot fire on friendly {target_label}"),
            ));
        }
        if !world.team_view(team).can_see(target) {
            return Err(Rejection::new(
                RejectReason::TargetNotVisible,
                format!("{label} cannot see {target_label}"),
            ));
        }
        let (Some(pos), Some(target_pos)) = (world.position(id), world.position(target)) else {
            return Err(Rejection::new(
                RejectReason::NoSuchUnit,
                format!("{label} or {target_label} has no position"),
            ));
        };
        let distance = world.grid.distance(pos, target_pos);
        let Some(max_range) = world.launcher(id).map(|l| l.max_range) else {
            return Err(Rejection::new(
                RejectReason::NoCapability,
                format!("{label} cannot shoot (no weapons)"),
            ));
        };
        if distance > max_range {
            return Err(Rejection::new(
                RejectReason::OutOfRange,
                format!(
                    "{label} target {target_label} out of range (d={distance:.1}, max={max_range:.1})"
                ),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::components::SamControl;
    use skirmish_core::enums::{MoveDir, Team};
    use skirmish_core::grid::{Cell, Grid};
    use skirmish_core::unit::UnitRecord;

    use crate::systems::sensors;
    use crate::world::WorldState;

    fn armed_world() -> (WorldState, UnitId, UnitId) {
        let mut world = WorldState::new(Grid::new(10, 10).unwrap(), 1);
        let shooter = world
            .spawn(&UnitRecord::aircraft(
                Team::Blue,
                Cell::new(2, 2),
                6.0,
                2,
                4.0,
                0.8,
                0.1,
            ))
            .unwrap();
        let target = world
            .spawn(&UnitRecord::aircraft(
                Team::Red,
                Cell::new(5, 2),
                6.0,
                2,
                4.0,
                0.8,
                0.1,
            ))
            .unwrap();
        sensors::refresh(&mut world);
        (world, shooter, target)
    }

    #[test]
    fn test_dead_unit_has_no_actions() {
        let (mut world, shooter, _) = armed_world();
        world.set_alive(shooter, false);
        assert!(allowed_actions(&world, shooter).is_empty());
        let rejection = validate_unit_action(&world, shooter, Action::Wait).unwrap_err();
        assert_eq!(rejection.code, RejectReason::UnitDead);
    }

    #[test]
    fn test_allowed_actions_cover_moves_and_shots() {
        let (world, shooter, target) = armed_world();
        let actions = allowed_actions(&world, shooter);
        assert!(actions.contains(&Action::Wait));
        for dir in MoveDir::ALL {
            assert!(actions.contains(&Action::Move { dir }));
        }
        assert!(actions.contains(&Action::Shoot { target }));
    }

    #[test]
    fn test_moves_filtered_to_bounds() {
        let mut world = WorldState::new(Grid::new(10, 10).unwrap(), 1);
        let corner = world
            .spawn(&UnitRecord::decoy(Team::Blue, Cell::new(0, 0)))
            .unwrap();
        sensors::refresh(&mut world);

        let actions = allowed_actions(&world, corner);
        assert!(actions.contains(&Action::Move { dir: MoveDir::Up }));
        assert!(actions.contains(&Action::Move { dir: MoveDir::Right }));
        assert!(!actions.contains(&Action::Move { dir: MoveDir::Down }));
        assert!(!actions.contains(&Action::Move { dir: MoveDir::Left }));
    }

    #[test]
    fn test_out_of_range_target_not_offered_and_rejected() {
        let (mut world, shooter, target) = armed_world();
        // Move the target outside missile range but within radar range.
        world.set_position(target, Cell::new(8, 2));
        sensors::refresh(&mut world);

        let actions = allowed_actions(&world, shooter);
        assert!(!actions.contains(&Action::Shoot { target }));

        let rejection =
            validate_in_world(&world, shooter, Action::Shoot { target }).unwrap_err();
        assert_eq!(rejection.code, RejectReason::OutOfRange);
    }

    #[test]
    fn test_shoot_requires_visibility() {
        let (mut world, shooter, target) = armed_world();
        // Out of radar range entirely: not visible, not shootable.
        world.set_position(target, Cell::new(9, 9));
        sensors::refresh(&mut world);

        let rejection =
            validate_in_world(&world, shooter, Action::Shoot { target }).unwrap_err();
        assert_eq!(rejection.code, RejectReason::TargetNotVisible);
    }

    #[test]
    fn test_friendly_fire_rejected() {
        let mut world = WorldState::new(Grid::new(10, 10).unwrap(), 1);
        let shooter = world
            .spawn(&UnitRecord::aircraft(
                Team::Blue,
                Cell::new(2, 2),
                6.0,
                2,
                4.0,
                0.8,
                0.1,
            ))
            .unwrap();
        let friend = world
            .spawn(&UnitRecord::decoy(Team::Blue, Cell::new(3, 2)))
            .unwrap();
        sensors::refresh(&mut world);

        let rejection =
            validate_in_world(&world, shooter, Action::Shoot { target: friend }).unwrap_err();
        assert_eq!(rejection.code, RejectReason::TargetNotEnemy);
    }

    #[test]
    fn test_sam_gating() {
        let mut world = WorldState::new(Grid::new(10, 10).unwrap(), 1);
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
                false,
            ))
            .unwrap();
        let enemy = world
            .spawn(&UnitRecord::aircraft(
                Team::Red,
                Cell::new(4, 2),
                6.0,
                2,
                4.0,
                0.8,
                0.1,
            ))
            .unwrap();
        sensors::refresh(&mut world);

        // Radar off: no shots offered, shot attempts rejected, toggle offered.
        let actions = allowed_actions(&world, sam);
        assert!(!actions.iter().any(|a| matches!(a, Action::Shoot { .. })));
        assert!(actions.contains(&Action::Toggle { on: true }));
        assert!(!actions.iter().any(|a| matches!(a, Action::Move { .. })));
        let rejection =
            validate_unit_action(&world, sam, Action::Shoot { target: enemy }).unwrap_err();
        assert_eq!(rejection.code, RejectReason::RadarOff);

        // Radar on but cooling down: still rejected.
        if let Some(e) = world.entity(sam) {
            let mut control = world.ecs.get::<&mut SamControl>(e).unwrap();
            control.on = true;
            control.cooldown_remaining = 2;
        }
        sensors::refresh(&mut world);
        let rejection =
            validate_unit_action(&world, sam, Action::Shoot { target: enemy }).unwrap_err();
        assert_eq!(rejection.code, RejectReason::OnCooldown);

        // Moving is never possible for a SAM.
        let rejection =
            validate_unit_action(&world, sam, Action::Move { dir: MoveDir::Up }).unwrap_err();
        assert_eq!(rejection.code, RejectReason::NoCapability);
    }

    #[test]
    fn test_toggle_rejected_for_non_sam() {
        let (world, shooter, _) = armed_world();
        let rejection =
            validate_unit_action(&world, shooter, Action::Toggle { on: true }).unwrap_err();
        assert_eq!(rejection.code, RejectReason::NotSam);
    }
}
