//! Polymorphic unit records — the serialized and scenario-input form.
//!
//! A `UnitRecord` carries the shared fields every unit has plus a
//! variant payload tagged by `"type"`. The simulation crate maps records
//! to ECS component bundles at spawn and extracts them back for
//! snapshots, so the record is the lossless wire representation.

use serde::{Deserialize, Serialize};

use crate::enums::{Team, UnitKind};
use crate::error::SetupError;
use crate::grid::Cell;

/// Process-unique unit identifier, allocated monotonically and never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A complete unit description: shared fields plus a per-variant payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    /// Explicit id, or `None` to let the world allocate one at spawn.
    #[serde(default)]
    pub id: Option<UnitId>,
    pub team: Team,
    pub pos: Cell,
    #[serde(default = "default_alive")]
    pub alive: bool,
    #[serde(flatten)]
    pub stats: UnitStats,
}

fn default_alive() -> bool {
    true
}

/// Variant-specific stats, tagged by `"type"` in the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UnitStats {
    /// Mobile, unarmed, long-range sensor platform.
    Awacs { radar_range: f64 },
    /// Mobile fighter with radar and missiles.
    Aircraft {
        radar_range: f64,
        missiles: u32,
        missile_max_range: f64,
        base_hit_prob: f64,
        min_hit_prob: f64,
    },
    /// Mobile lure with no radar and no weapons.
    Decoy {},
    /// Stationary launcher with a toggleable radar and a shot cooldown.
    Sam {
        radar_range: f64,
        missiles: u32,
        missile_max_range: f64,
        base_hit_prob: f64,
        min_hit_prob: f64,
        cooldown_steps: u32,
        #[serde(default)]
        cooldown_remaining: u32,
        on: bool,
    },
}

impl UnitRecord {
    pub fn awacs(team: Team, pos: Cell, radar_range: f64) -> Self {
        Self {
            id: None,
            team,
            pos,
            alive: true,
            stats: UnitStats::Awacs { radar_range },
        }
    }

    pub fn aircraft(
        team: Team,
        pos: Cell,
        radar_range: f64,
        missiles: u32,
        missile_max_range: f64,
        base_hit_prob: f64,
        min_hit_prob: f64,
    ) -> Self {
        Self {
            id: None,
            team,
            pos,
            alive: true,
            stats: UnitStats::Aircraft {
                radar_range,
                missiles,
                missile_max_range,
                base_hit_prob,
                min_hit_prob,
            },
        }
    }

    pub fn decoy(team: Team, pos: Cell) -> Self {
        Self {
            id: None,
            team,
            pos,
            alive: true,
            stats: UnitStats::Decoy {},
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn sam(
        team: Team,
        pos: Cell,
        radar_range: f64,
        missiles: u32,
        missile_max_range: f64,
        base_hit_prob: f64,
        min_hit_prob: f64,
        cooldown_steps: u32,
        on: bool,
    ) -> Self {
        Self {
            id: None,
            team,
            pos,
            alive: true,
            stats: UnitStats::Sam {
                radar_range,
                missiles,
                missile_max_range,
                base_hit_prob,
                min_hit_prob,
                cooldown_steps,
                cooldown_remaining: 0,
                on,
            },
        }
    }

    pub fn kind(&self) -> UnitKind {
        self.stats.kind()
    }

    pub fn can_move(&self) -> bool {
        self.stats.can_move()
    }

    pub fn can_shoot(&self) -> bool {
        self.stats.can_shoot()
    }

    /// Nominal radar range (0 for units without radar). See the sim crate
    /// for the *active* range, which accounts for a SAM's on/off switch.
    pub fn radar_range(&self) -> f64 {
        self.stats.radar_range()
    }

    /// Human-readable label like `aircraft#3(BLUE)`. Uses `?` when the
    /// record has no id yet.
    pub fn label(&self) -> String {
        match self.id {
            Some(id) => format!("{}#{}({})", self.kind(), id, self.team),
            None => format!("{}#?({})", self.kind(), self.team),
        }
    }

    /// Validate combat-relevant stats. Out-of-range parameters are a fatal
    /// configuration error, raised at construction/reset time.
    pub fn validate(&self) -> Result<(), SetupError> {
        let invalid = |message: String| SetupError::InvalidStat {
            unit: self.label(),
            message,
        };

        let radar = self.stats.radar_range();
        if !(radar >= 0.0) {
            return Err(invalid(format!("radar range cannot be negative: {radar}")));
        }

        if let Some((max_range, base, min_p)) = self.stats.weapon_params() {
            if !(max_range > 0.0) {
                return Err(invalid(format!(
                    "missile range must be positive: {max_range}"
                )));
            }
            if !(0.0..=1.0).contains(&base) {
                return Err(invalid(format!(
                    "base hit probability must be in [0, 1]: {base}"
                )));
            }
            if !(0.0..=1.0).contains(&min_p) {
                return Err(invalid(format!(
                    "min hit probability must be in [0, 1]: {min_p}"
                )));
            }
            if min_p > base {
                return Err(invalid(format!(
                    "min hit probability ({min_p}) cannot exceed base ({base})"
                )));
            }
        }

        Ok(())
    }
}

impl UnitStats {
    pub fn kind(&self) -> UnitKind {
        match self {
            UnitStats::Awacs { .. } => UnitKind::Awacs,
            UnitStats::Aircraft { .. } => UnitKind::Aircraft,
            UnitStats::Decoy {} => UnitKind::Decoy,
            UnitStats::Sam { .. } => UnitKind::Sam,
        }
    }

    /// SAMs are the only stationary variant.
    pub fn can_move(&self) -> bool {
        !matches!(self, UnitStats::Sam { .. })
    }

    pub fn can_shoot(&self) -> bool {
        matches!(self, UnitStats::Aircraft { .. } | UnitStats::Sam { .. })
    }

    pub fn radar_range(&self) -> f64 {
        match self {
            UnitStats::Awacs { radar_range }
            | UnitStats::Aircraft { radar_range, .. }
            | UnitStats::Sam { radar_range, .. } => *radar_range,
            UnitStats::Decoy {} => 0.0,
        }
    }

    /// `(missile_max_range, base_hit_prob, min_hit_prob)` for armed variants.
    pub fn weapon_params(&self) -> Option<(f64, f64, f64)> {
        match self {
            UnitStats::Aircraft {
                missile_max_range,
                base_hit_prob,
                min_hit_prob,
                ..
            }
            | UnitStats::Sam {
                missile_max_range,
                base_hit_prob,
                min_hit_prob,
                ..
            } => Some((*missile_max_range, *base_hit_prob, *min_hit_prob)),
            _ => None,
        }
    }

    pub fn missiles(&self) -> Option<u32> {
        match self {
            UnitStats::Aircraft { missiles, .. } | UnitStats::Sam { missiles, .. } => {
                Some(*missiles)
            }
            _ => None,
        }
    }
}
