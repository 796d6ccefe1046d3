//! Per-team intel — the fog-limited query surface for agent callers.
//!
//! A `TeamIntel` is strictly less information than the world: own units
//! in full detail, enemies only as currently observed (decoys spoofed,
//! stealthed SAMs absent). This is the boundary that enforces
//! fog-of-war for anything driving a team.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use skirmish_core::enums::{Team, UnitKind};
use skirmish_core::grid::{Cell, Grid};
use skirmish_core::unit::{UnitId, UnitRecord};

use crate::world::WorldState;

/// Fog-limited snapshot of a currently observed enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleEnemy {
    pub id: UnitId,
    pub team: Team,
    pub pos: Cell,
    /// Apparent kind — an enemy decoy reads as an aircraft.
    pub kind: UnitKind,
    /// Whether this team has ever seen the unit fire. Decoys never fire,
    /// so over time this separates real aircraft from lures.
    pub has_fired_before: bool,
    pub seen_by: BTreeSet<UnitId>,
}

/// Safe per-team view of the world for decision-making.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamIntel {
    pub team: Team,
    pub grid: Grid,
    /// Own units in full detail, dead included.
    pub friendlies: Vec<UnitRecord>,
    /// Currently visible enemies, fog-limited.
    pub visible_enemies: Vec<VisibleEnemy>,
    pub friendly_ids: BTreeSet<UnitId>,
    pub visible_enemy_ids: BTreeSet<UnitId>,
}

impl TeamIntel {
    /// Build the intel view for one team from the current world.
    pub fn build(world: &WorldState, team: Team) -> TeamIntel {
        let view = world.team_view(team);

        let visible_enemies: Vec<VisibleEnemy> = view
            .enemy_observations()
            .map(|obs| VisibleEnemy {
                id: obs.unit_id,
                team: obs.team,
                pos: obs.pos,
                kind: obs.kind,
                has_fired_before: view.has_fired_before(obs.unit_id),
                seen_by: obs.seen_by.clone(),
            })
            .collect();
        let visible_enemy_ids = visible_enemies.iter().map(|e| e.id).collect();

        TeamIntel {
            team,
            grid: world.grid(),
            friendlies: world.team_records(team),
            visible_enemies,
            friendly_ids: view.friendly_ids().clone(),
            visible_enemy_ids,
        }
    }

    pub fn friendly(&self, id: UnitId) -> Option<&UnitRecord> {
        self.friendlies.iter().find(|r| r.id == Some(id))
    }

    pub fn enemy(&self, id: UnitId) -> Option<&VisibleEnemy> {
        self.visible_enemies.iter().find(|e| e.id == id)
    }

    /// Visible enemies within range of one of this team's units.
    pub fn enemies_in_range(&self, unit: &UnitRecord, max_range: f64) -> Vec<&VisibleEnemy> {
        self.visible_enemies
            .iter()
            .filter(|enemy| self.grid.distance(unit.pos, enemy.pos) <= max_range)
            .collect()
    }
}
