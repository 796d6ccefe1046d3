//! Environment orchestrator — the gym-style interface around the engine.
//!
//! `CombatEnv` sequences one full turn per `step()`: pre-turn
//! housekeeping (SAM cooldowns), movement, sensor refresh, combat,
//! victory check. Sensing is NOT re-run after combat — deaths are
//! reflected by the alive flag alone until the next turn's refresh.
//!
//! The environment is single-threaded, pure in-memory computation; all
//! simultaneity is modeled by batch-collecting the turn's actions and
//! resolving them in one pass with the world's seeded RNG.

use std::collections::HashMap;

use skirmish_core::action::Action;
use skirmish_core::components::{Alive, SamControl};
use skirmish_core::enums::Team;
use skirmish_core::error::{SetupError, StepError};
use skirmish_core::grid::Grid;
use skirmish_core::report::{StepReport, TeamRewards};
use skirmish_core::unit::UnitId;

use crate::intel::TeamIntel;
use crate::scenario::Scenario;
use crate::systems::victory::VictoryConditions;
use crate::systems::{combat, movement, sensors};
use crate::world::{WorldSnapshot, WorldState};

/// Everything `step()` returns besides the world itself (read that via
/// [`CombatEnv::world`]): the terminal-only rewards, the done flag, and
/// the full structured report.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub rewards: TeamRewards,
    pub done: bool,
    pub report: StepReport,
}

/// The main simulation interface.
///
/// Scenarios are the only way to configure the environment; `reset`
/// builds a fresh world from one, and `reset_from_snapshot` resumes a
/// saved world under a scenario's rules.
pub struct CombatEnv {
    world: Option<WorldState>,
    victory: Option<VictoryConditions>,
}

impl CombatEnv {
    pub fn new() -> Self {
        Self {
            world: None,
            victory: None,
        }
    }

    /// Start a fresh episode from a scenario.
    pub fn reset(&mut self, scenario: &Scenario) -> Result<&WorldState, SetupError> {
        scenario.validate()?;
        let grid = Grid::new(scenario.config.grid_width, scenario.config.grid_height)?;

        let mut world = WorldState::new(grid, scenario.config.seed);
        for unit in &scenario.units {
            world.spawn(unit)?;
        }
        sensors::refresh(&mut world);

        self.victory = Some(victory_conditions(scenario));
        Ok(self.world.insert(world))
    }

    /// Resume a saved world under a scenario's rules.
    ///
    /// Fails fatally when the snapshot's grid does not match the scenario
    /// config — that is an unusable configuration, not a game event.
    pub fn reset_from_snapshot(
        &mut self,
        scenario: &Scenario,
        snapshot: WorldSnapshot,
    ) -> Result<&WorldState, SetupError> {
        scenario.validate()?;
        if snapshot.grid.width != scenario.config.grid_width
            || snapshot.grid.height != scenario.config.grid_height
        {
            return Err(SetupError::GridMismatch {
                world_width: snapshot.grid.width,
                world_height: snapshot.grid.height,
                scenario_width: scenario.config.grid_width,
                scenario_height: scenario.config.grid_height,
            });
        }

        let mut world = WorldState::from_snapshot(snapshot)?;
        sensors::refresh(&mut world);

        self.victory = Some(victory_conditions(scenario));
        Ok(self.world.insert(world))
    }

    /// Execute one turn.
    ///
    /// `actions` need not cover every unit — units without an entry are
    /// inert this turn. Calling before `reset()` or after the game ended
    /// is a fatal usage error.
    pub fn step(&mut self, actions: &HashMap<UnitId, Action>) -> Result<StepResult, StepError> {
        let (Some(world), Some(victory)) = (self.world.as_mut(), self.victory.as_ref()) else {
            return Err(StepError::NotReset);
        };
        if world.is_game_over() {
            return Err(StepError::GameOver);
        }

        world.turn += 1;
        tick_sam_cooldowns(world);

        let movement_report = movement::resolve(world, actions);
        sensors::refresh(world);
        let combat_report = combat::resolve(world, actions);

        let victory_report = victory.check_all(world);
        if victory_report.is_game_over {
            world.game_over = true;
            world.winner = victory_report.winner;
            world.end_reason = victory_report.reason;
        }

        Ok(StepResult {
            rewards: TeamRewards::from_victory(&victory_report),
            done: victory_report.is_game_over,
            report: StepReport {
                movement: movement_report,
                combat: combat_report,
                victory: victory_report,
            },
        })
    }

    pub fn world(&self) -> Option<&WorldState> {
        self.world.as_ref()
    }

    /// Fog-limited view for one team's decision-making.
    pub fn intel(&self, team: Team) -> Option<TeamIntel> {
        self.world.as_ref().map(|world| TeamIntel::build(world, team))
    }

    /// Capture the current world for persistence or replay.
    pub fn snapshot(&self) -> Option<WorldSnapshot> {
        self.world.as_ref().map(WorldState::snapshot)
    }

    pub fn is_game_over(&self) -> bool {
        self.world
            .as_ref()
            .map(WorldState::is_game_over)
            .unwrap_or(false)
    }

    pub fn winner(&self) -> Option<Team> {
        self.world.as_ref().and_then(WorldState::winner)
    }
}

impl Default for CombatEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn victory_conditions(scenario: &Scenario) -> VictoryConditions {
    VictoryConditions {
        max_stalemate_turns: scenario.config.max_stalemate_turns,
        max_no_move_turns: scenario.config.max_no_move_turns,
        max_turns: scenario.config.max_turns,
        check_missile_exhaustion: scenario.config.check_missile_exhaustion,
    }
}

/// Pre-turn housekeeping: tick every alive SAM's cooldown down by one.
fn tick_sam_cooldowns(world: &mut WorldState) {
    for (_entity, (alive, control)) in world.ecs.query_mut::<(&Alive, &mut SamControl)>() {
        if alive.0 {
            control.tick_cooldown();
        }
    }
}
