//! Movement resolver — applies Move, Toggle, and Wait actions for a turn.
//!
//! All intended moves are resolved in one pass, in an order shuffled by
//! the world RNG, against a live occupancy map. The collision contract:
//!
//! - Destinations are one cell from the unit's pre-resolution position.
//! - A move lands iff the destination is in bounds and unoccupied at the
//!   moment the mover resolves. Earlier movers vacate their cells, so a
//!   unit may enter a cell another unit left earlier in the same turn.
//! - Two units contending for one free cell: the earlier in shuffled
//!   order wins, the later records `CellOccupied`. Same seed, same
//!   actions — same winner.
//!
//! Failures are recorded in the report, never raised.

use std::collections::HashMap;

use rand::seq::SliceRandom;

use skirmish_core::action::{Action, Rejection};
use skirmish_core::components::SamControl;
use skirmish_core::enums::RejectReason;
use skirmish_core::grid::Cell;
use skirmish_core::report::{MoveOutcome, MovementReport};
use skirmish_core::unit::UnitId;

use crate::actions::validate_in_world;
use crate::world::WorldState;

/// Resolve all movement-phase actions (Move/Toggle/Wait) for the turn.
///
/// Actions queued for dead or unknown units are ignored. Updates the
/// no-movement stall counter: reset when any position actually changed,
/// incremented otherwise.
pub fn resolve(world: &mut WorldState, actions: &HashMap<UnitId, Action>) -> MovementReport {
    let mut movers: Vec<(UnitId, Action)> = world
        .alive_ids()
        .into_iter()
        .filter_map(|id| match actions.get(&id) {
            Some(action @ (Action::Wait | Action::Move { .. } | Action::Toggle { .. })) => {
                Some((id, *action))
            }
            _ => None,
        })
        .collect();

    // Shuffled resolution order prevents id-order bias in collisions.
    movers.shuffle(&mut world.rng);

    // Live occupancy: seeded from current alive positions, updated as
    // moves land.
    let mut occupied: HashMap<Cell, UnitId> = world
        .alive_ids()
        .into_iter()
        .filter_map(|id| world.position(id).map(|pos| (pos, id)))
        .collect();

    let mut outcomes = Vec::with_capacity(movers.len());
    let mut movement_occurred = false;

    for (id, action) in movers {
        let from = match world.position(id) {
            Some(pos) => pos,
            None => continue,
        };

        if let Err(rejection) = validate_in_world(world, id, action) {
            let log = rejection.message.clone();
            outcomes.push(MoveOutcome {
                unit_id: id,
                action,
                from,
                to: from,
                success: false,
                rejection: Some(rejection),
                log,
            });
            continue;
        }

        let outcome = match action {
            Action::Wait => MoveOutcome {
                unit_id: id,
                action,
                from,
                to: from,
                success: true,
                rejection: None,
                log: format!("{} waits", world.label(id)),
            },
            Action::Toggle { on } => {
                apply_toggle(world, id, on);
                MoveOutcome {
                    unit_id: id,
                    action,
                    from,
                    to: from,
                    success: true,
                    rejection: None,
                    log: format!(
                        "{} radar {}",
                        world.label(id),
                        if on { "ON" } else { "OFF" }
                    ),
                }
            }
            Action::Move { dir } => {
                let to = from + dir.delta();
                if !world.grid.in_bounds(to) {
                    let rejection = Rejection::new(
                        RejectReason::OutOfBounds,
                        format!(
                            "{} cannot move to ({}, {}): out of bounds",
                            world.label(id),
                            to.x,
                            to.y
                        ),
                    );
                    let log = rejection.message.clone();
                    MoveOutcome {
                        unit_id: id,
                        action,
                        from,
                        to: from,
                        success: false,
                        rejection: Some(rejection),
                        log,
                    }
                } else if occupied.contains_key(&to) {
                    let rejection = Rejection::new(
                        RejectReason::CellOccupied,
                        format!(
                            "{} cannot move to ({}, {}): occupied",
                            world.label(id),
                            to.x,
                            to.y
                        ),
                    );
                    let log = rejection.message.clone();
                    MoveOutcome {
                        unit_id: id,
                        action,
                        from,
                        to: from,
                        success: false,
                        rejection: Some(rejection),
                        log,
                    }
                } else {
                    occupied.remove(&from);
                    occupied.insert(to, id);
                    world.set_position(id, to);
                    movement_occurred = true;
                    MoveOutcome {
                        unit_id: id,
                        action,
                        from,
                        to,
                        success: true,
                        rejection: None,
                        log: format!("{} moves to ({}, {})", world.label(id), to.x, to.y),
                    }
                }
            }
            Action::Shoot { .. } => unreachable!("shoot actions resolve in the combat phase"),
        };
        outcomes.push(outcome);
    }

    if movement_occurred {
        world.turns_without_movement = 0;
    } else {
        world.turns_without_movement += 1;
    }

    MovementReport {
        outcomes,
        movement_occurred,
    }
}

fn apply_toggle(world: &mut WorldState, id: UnitId, on: bool) {
    if let Some(e) = world.entity(id) {
        if let Ok(mut control) = world.ecs.get::<&mut SamControl>(e) {
            control.on = on;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::enums::{MoveDir, Team};
    use skirmish_core::grid::Grid;
    use skirmish_core::unit::UnitRecord;

    fn world_with(seed: u64, units: &[UnitRecord]) -> WorldState {
        let mut world = WorldState::new(Grid::new(10, 10).unwrap(), seed);
        for unit in units {
            world.spawn(unit).unwrap();
        }
        world
    }

    fn one_action(id: UnitId, action: Action) -> HashMap<UnitId, Action> {
        let mut actions = HashMap::new();
        actions.insert(id, action);
        actions
    }

    #[test]
    fn test_simple_move_updates_position() {
        let mut world = world_with(1, &[UnitRecord::decoy(Team::Blue, Cell::new(4, 4))]);
        let id = UnitId(0);
        let report = resolve(&mut world, &one_action(id, Action::Move { dir: MoveDir::Up }));

        assert!(report.movement_occurred);
        assert_eq!(world.position(id), Some(Cell::new(4, 5)));
        assert_eq!(report.outcomes[0].to, Cell::new(4, 5));
        assert_eq!(world.turns_without_movement(), 0);
    }

    #[test]
    fn test_out_of_bounds_move_fails_softly() {
        let mut world = world_with(1, &[UnitRecord::decoy(Team::Blue, Cell::new(0, 0))]);
        let id = UnitId(0);
        let report = resolve(
            &mut world,
            &one_action(id, Action::Move { dir: MoveDir::Down }),
        );

        let outcome = &report.outcomes[0];
        assert!(!outcome.success);
        assert_eq!(
            outcome.rejection.as_ref().unwrap().code,
            RejectReason::OutOfBounds
        );
        assert_eq!(world.position(id), Some(Cell::new(0, 0)));
        assert_eq!(world.turns_without_movement(), 1);
    }

    #[test]
    fn test_moving_onto_stationary_unit_fails() {
        let mut world = world_with(
            1,
            &[
                UnitRecord::decoy(Team::Blue, Cell::new(4, 4)),
                UnitRecord::decoy(Team::Red, Cell::new(4, 5)),
            ],
        );
        let report = resolve(
            &mut world,
            &one_action(UnitId(0), Action::Move { dir: MoveDir::Up }),
        );

        let outcome = &report.outcomes[0];
        assert!(!outcome.success);
        assert_eq!(
            outcome.rejection.as_ref().unwrap().code,
            RejectReason::CellOccupied
        );
    }

    #[test]
    fn test_contested_cell_exactly_one_winner() {
        // Both units try to enter (5, 5).
        let units = [
            UnitRecord::decoy(Team::Blue, Cell::new(4, 5)),
            UnitRecord::decoy(Team::Red, Cell::new(6, 5)),
        ];
        let mut actions = HashMap::new();
        actions.insert(UnitId(0), Action::Move { dir: MoveDir::Right });
        actions.insert(UnitId(1), Action::Move { dir: MoveDir::Left });

        let mut world = world_with(99, &units);
        let report = resolve(&mut world, &actions);

        let successes: Vec<_> = report.outcomes.iter().filter(|o| o.success).collect();
        let failures: Vec<_> = report.outcomes.iter().filter(|o| !o.success).collect();
        assert_eq!(successes.len(), 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(
            failures[0].rejection.as_ref().unwrap().code,
            RejectReason::CellOccupied
        );

        // Same seed and actions reproduce the same winner.
        let mut replay = world_with(99, &units);
        let replay_report = resolve(&mut replay, &actions);
        let winner = |r: &MovementReport| {
            r.outcomes
                .iter()
                .find(|o| o.success)
                .map(|o| o.unit_id)
                .unwrap()
        };
        assert_eq!(winner(&report), winner(&replay_report));
    }

    #[test]
    fn test_no_two_alive_units_share_a_cell_after_resolution() {
        let units = [
            UnitRecord::decoy(Team::Blue, Cell::new(4, 5)),
            UnitRecord::decoy(Team::Blue, Cell::new(5, 4)),
            UnitRecord::decoy(Team::Red, Cell::new(6, 5)),
            UnitRecord::decoy(Team::Red, Cell::new(5, 6)),
        ];
        let mut actions = HashMap::new();
        actions.insert(UnitId(0), Action::Move { dir: MoveDir::Right });
        actions.insert(UnitId(1), Action::Move { dir: MoveDir::Up });
        actions.insert(UnitId(2), Action::Move { dir: MoveDir::Left });
        actions.insert(UnitId(3), Action::Move { dir: MoveDir::Down });

        for seed in 0..20 {
            let mut world = world_with(seed, &units);
            resolve(&mut world, &actions);
            let positions: Vec<_> = world
                .alive_ids()
                .into_iter()
                .filter_map(|id| world.position(id))
                .collect();
            let mut deduped = positions.clone();
            deduped.sort_by_key(|c| (c.x, c.y));
            deduped.dedup();
            assert_eq!(positions.len(), deduped.len(), "overlap with seed {seed}");
        }
    }

    #[test]
    fn test_swap_never_fully_succeeds() {
        let units = [
            UnitRecord::decoy(Team::Blue, Cell::new(4, 5)),
            UnitRecord::decoy(Team::Red, Cell::new(5, 5)),
        ];
        let mut actions = HashMap::new();
        actions.insert(UnitId(0), Action::Move { dir: MoveDir::Right });
        actions.insert(UnitId(1), Action::Move { dir: MoveDir::Left });

        for seed in 0..20 {
            let mut world = world_with(seed, &units);
            let report = resolve(&mut world, &actions);
            // A failed mover stays put, so the second side collides too.
            assert!(report.outcomes.iter().all(|o| !o.success), "seed {seed}");
        }
    }

    #[test]
    fn test_chain_into_vacated_cell_depends_on_order() {
        // Leader moves right out of (5, 5); follower at (4, 5) tries to
        // take it. With the follower resolving second the chain succeeds.
        let units = [
            UnitRecord::decoy(Team::Blue, Cell::new(5, 5)),
            UnitRecord::decoy(Team::Blue, Cell::new(4, 5)),
        ];
        let mut actions = HashMap::new();
        actions.insert(UnitId(0), Action::Move { dir: MoveDir::Right });
        actions.insert(UnitId(1), Action::Move { dir: MoveDir::Right });

        let mut chain_succeeded = false;
        for seed in 0..20 {
            let mut world = world_with(seed, &units);
            let report = resolve(&mut world, &actions);
            let leader_ok = report
                .outcomes
                .iter()
                .any(|o| o.unit_id == UnitId(0) && o.success);
            assert!(leader_ok, "leader always has a free destination");
            if report
                .outcomes
                .iter()
                .any(|o| o.unit_id == UnitId(1) && o.success)
            {
                chain_succeeded = true;
                assert_eq!(world.position(UnitId(1)), Some(Cell::new(5, 5)));
            }
        }
        assert!(
            chain_succeeded,
            "some ordering should let the follower take the vacated cell"
        );
    }

    #[test]
    fn test_toggle_flips_sam_radar() {
        let mut world = world_with(
            1,
            &[UnitRecord::sam(
                Team::Blue,
                Cell::new(2, 2),
                8.0,
                6,
                6.0,
                0.8,
                0.1,
                5,
                false,
            )],
        );
        let id = UnitId(0);
        let report = resolve(&mut world, &one_action(id, Action::Toggle { on: true }));

        assert!(report.outcomes[0].success);
        assert!(world.sam_control(id).unwrap().on);
        assert_eq!(world.missiles(id), Some(6), "toggling consumes no ammo");
        // Toggling is not movement.
        assert!(!report.movement_occurred);
        assert_eq!(world.turns_without_movement(), 1);
    }

    #[test]
    fn test_immobile_sam_cannot_move() {
        let mut world = world_with(
            1,
            &[UnitRecord::sam(
                Team::Blue,
                Cell::new(2, 2),
                8.0,
                6,
                6.0,
                0.8,
                0.1,
                5,
                true,
            )],
        );
        let report = resolve(
            &mut world,
            &one_action(UnitId(0), Action::Move { dir: MoveDir::Up }),
        );
        assert_eq!(
            report.outcomes[0].rejection.as_ref().unwrap().code,
            RejectReason::NoCapability
        );
    }

    #[test]
    fn test_units_without_actions_are_inert() {
        let mut world = world_with(
            1,
            &[
                UnitRecord::decoy(Team::Blue, Cell::new(4, 4)),
                UnitRecord::decoy(Team::Red, Cell::new(6, 6)),
            ],
        );
        let report = resolve(&mut world, &HashMap::new());
        assert!(report.outcomes.is_empty());
        assert!(!report.movement_occurred);
        assert_eq!(world.turns_without_movement(), 1);
    }
}
