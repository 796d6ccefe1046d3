//! Observations and per-team fog-of-war views.
//!
//! Observations are the fog layer only: who a team can currently see and
//! where. They never drive game mechanics — resolvers consult them for
//! visibility checks, and UIs/agents consume them to respect information
//! limits.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::enums::{Team, UnitKind};
use crate::grid::Cell;
use crate::unit::UnitId;

/// One team's knowledge of a single unit this turn.
///
/// `kind` is the *apparent* kind: an enemy decoy is reported as an
/// aircraft, and only a friendly observer sees a decoy's true kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub unit_id: UnitId,
    pub kind: UnitKind,
    pub team: Team,
    pub pos: Cell,
    /// Friendly units that currently see this one.
    pub seen_by: BTreeSet<UnitId>,
}

impl Observation {
    pub fn is_enemy(&self, observer_team: Team) -> bool {
        self.team != observer_team
    }
}

/// Per-team fog-of-war cache, rebuilt from scratch every turn by the
/// sensor system.
///
/// Visibility sets are reset each turn; the fired-history is accumulated
/// across the whole game and never cleared — it is how a team eventually
/// tells real aircraft from decoys (decoys never fire).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamView {
    pub team: Team,
    friendly_ids: BTreeSet<UnitId>,
    observations: BTreeMap<UnitId, Observation>,
    fired: BTreeSet<UnitId>,
}

impl TeamView {
    pub fn new(team: Team) -> Self {
        Self {
            team,
            friendly_ids: BTreeSet::new(),
            observations: BTreeMap::new(),
            fired: BTreeSet::new(),
        }
    }

    /// Clear this turn's visibility, keeping the fired-history.
    pub fn reset(&mut self) {
        self.friendly_ids.clear();
        self.observations.clear();
    }

    pub fn add_friendly_id(&mut self, id: UnitId) {
        self.friendly_ids.insert(id);
    }

    /// Merge one observation. A unit observed by several friendly sensors
    /// is recorded once with the union of observer ids — detection is
    /// boolean per team, not per sensor.
    pub fn add_observation(&mut self, obs: Observation) {
        match self.observations.get_mut(&obs.unit_id) {
            Some(existing) => existing.seen_by.extend(obs.seen_by),
            None => {
                self.observations.insert(obs.unit_id, obs);
            }
        }
    }

    pub fn add_observations(&mut self, observations: impl IntoIterator<Item = Observation>) {
        for obs in observations {
            self.add_observation(obs);
        }
    }

    /// Record that a unit fired a shot this team was on the receiving end
    /// of. Permanent.
    pub fn record_fired(&mut self, id: UnitId) {
        self.fired.insert(id);
    }

    pub fn has_fired_before(&self, id: UnitId) -> bool {
        self.fired.contains(&id)
    }

    pub fn friendly_ids(&self) -> &BTreeSet<UnitId> {
        &self.friendly_ids
    }

    pub fn observation(&self, id: UnitId) -> Option<&Observation> {
        self.observations.get(&id)
    }

    /// Ids of currently visible enemies.
    pub fn enemy_ids(&self) -> BTreeSet<UnitId> {
        self.observations
            .values()
            .filter(|obs| obs.is_enemy(self.team))
            .map(|obs| obs.unit_id)
            .collect()
    }

    /// Observations of currently visible enemies, in id order.
    pub fn enemy_observations(&self) -> impl Iterator<Item = &Observation> {
        self.observations
            .values()
            .filter(move |obs| obs.is_enemy(self.team))
    }

    pub fn can_see(&self, id: UnitId) -> bool {
        self.observations.contains_key(&id)
    }
}
