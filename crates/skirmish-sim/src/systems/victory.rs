//! Victory conditions — terminal-state checks run once per turn.
//!
//! Conditions are evaluated in a fixed priority order; the first that
//! triggers is the turn's single outcome. AWACS decapitation is instant
//! and overrides every counter.

use skirmish_core::enums::{EndReason, Team, UnitKind};
use skirmish_core::report::VictoryReport;

use crate::world::WorldState;

/// Terminal-state checker, configured from the scenario.
#[derive(Debug, Clone)]
pub struct VictoryConditions {
    pub max_stalemate_turns: u32,
    pub max_no_move_turns: u32,
    pub max_turns: Option<u32>,
    pub check_missile_exhaustion: bool,
}

impl VictoryConditions {
    /// Run all checks in priority order and report the outcome.
    pub fn check_all(&self, world: &WorldState) -> VictoryReport {
        // 1. Decapitation: losing every fielded AWACS loses the game.
        let blue_lost = team_decapitated(world, Team::Blue);
        let red_lost = team_decapitated(world, Team::Red);
        match (blue_lost, red_lost) {
            (true, true) => return VictoryReport::draw(EndReason::AwacsDestroyed),
            (true, false) => return VictoryReport::win(Team::Red, EndReason::AwacsDestroyed),
            (false, true) => return VictoryReport::win(Team::Blue, EndReason::AwacsDestroyed),
            (false, false) => {}
        }

        // 2. Nobody can ever shoot again: nothing left to decide the game.
        if self.check_missile_exhaustion && !any_shots_possible(world) {
            return VictoryReport::draw(EndReason::MissileExhaustion);
        }

        // 3. Shooting stalemate.
        if world.turns_without_shooting() >= self.max_stalemate_turns {
            return VictoryReport::draw(EndReason::ShootingStalemate);
        }

        // 4. Movement stalemate.
        if world.turns_without_movement() >= self.max_no_move_turns {
            return VictoryReport::draw(EndReason::MovementStalemate);
        }

        // 5. Turn cap.
        if let Some(max_turns) = self.max_turns {
            if world.turn() >= max_turns {
                return VictoryReport::draw(EndReason::TurnLimit);
            }
        }

        VictoryReport::ongoing()
    }
}

/// A team is decapitated when it fielded at least one AWACS and none of
/// them remain alive. Teams without an AWACS cannot lose this way.
fn team_decapitated(world: &WorldState, team: Team) -> bool {
    let mut fielded = false;
    for id in world.unit_ids() {
        if world.team(id) == Some(team) && world.kind(id) == Some(UnitKind::Awacs) {
            fielded = true;
            if world.is_alive(id) {
                return false;
            }
        }
    }
    fielded
}

/// Whether any alive armed unit on either side still has ammunition.
fn any_shots_possible(world: &WorldState) -> bool {
    world
        .alive_ids()
        .into_iter()
        .any(|id| world.missiles(id).map(|m| m > 0).unwrap_or(false))
}
