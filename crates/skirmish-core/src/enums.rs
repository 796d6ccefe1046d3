//! Enumeration types used throughout the simulation.

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// The two opposing teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    Blue,
    Red,
}

impl Team {
    pub const BOTH: [Team; 2] = [Team::Blue, Team::Red];

    /// The opposing team.
    pub fn opponent(self) -> Team {
        match self {
            Team::Blue => Team::Red,
            Team::Red => Team::Blue,
        }
    }

    /// Index into per-team arrays (Blue = 0, Red = 1).
    pub fn index(self) -> usize {
        match self {
            Team::Blue => 0,
            Team::Red => 1,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Blue => write!(f, "BLUE"),
            Team::Red => write!(f, "RED"),
        }
    }
}

/// The four unit variants fielded by either team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Long-range unarmed sensor platform. Losing it loses the game.
    Awacs,
    /// Armed mobile fighter with radar and missiles.
    Aircraft,
    /// Unarmed, radarless lure that enemies see as an Aircraft.
    Decoy,
    /// Stationary surface-to-air launcher with a toggleable radar.
    Sam,
}

impl UnitKind {
    /// Lowercase display name used in labels and log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            UnitKind::Awacs => "awacs",
            UnitKind::Aircraft => "aircraft",
            UnitKind::Decoy => "decoy",
            UnitKind::Sam => "sam",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-cell movement direction. Up is +y, Right is +x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveDir {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDir {
    pub const ALL: [MoveDir; 4] = [MoveDir::Up, MoveDir::Down, MoveDir::Left, MoveDir::Right];

    /// Cell offset for this direction.
    pub fn delta(self) -> IVec2 {
        match self {
            MoveDir::Up => IVec2::new(0, 1),
            MoveDir::Down => IVec2::new(0, -1),
            MoveDir::Left => IVec2::new(-1, 0),
            MoveDir::Right => IVec2::new(1, 0),
        }
    }
}

/// Terminal outcome of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    BlueWins,
    RedWins,
    Draw,
}

impl GameResult {
    /// The winning team, if any.
    pub fn winner(self) -> Option<Team> {
        match self {
            GameResult::BlueWins => Some(Team::Blue),
            GameResult::RedWins => Some(Team::Red),
            GameResult::Draw => None,
        }
    }

    pub fn win_for(team: Team) -> GameResult {
        match team {
            Team::Blue => GameResult::BlueWins,
            Team::Red => GameResult::RedWins,
        }
    }
}

/// Why a game ended, in check priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// A team's sensor platform was destroyed (or both were, for a draw).
    AwacsDestroyed,
    /// No alive armed unit on either side has ammunition left.
    MissileExhaustion,
    /// Too many consecutive turns without a shot fired.
    ShootingStalemate,
    /// Too many consecutive turns without any unit moving.
    MovementStalemate,
    /// The configured turn cap was reached.
    TurnLimit,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EndReason::AwacsDestroyed => "AWACS destroyed",
            EndReason::MissileExhaustion => "missile exhaustion",
            EndReason::ShootingStalemate => "shooting stalemate",
            EndReason::MovementStalemate => "movement stalemate",
            EndReason::TurnLimit => "turn limit reached",
        };
        f.write_str(s)
    }
}

/// Machine-readable reason codes for rejected actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The acting unit is dead.
    UnitDead,
    /// No unit with the given id exists.
    NoSuchUnit,
    /// The unit lacks the capability (immobile unit moving, unarmed unit shooting).
    NoCapability,
    /// No missiles remaining.
    NoMissiles,
    /// A SAM cannot shoot with its radar off.
    RadarOff,
    /// A SAM cannot shoot while its cooldown is running.
    OnCooldown,
    /// The shot's target is dead.
    TargetDead,
    /// The shot's target is not currently visible to the shooter's team.
    TargetNotVisible,
    /// The shot's target is on the shooter's own team.
    TargetNotEnemy,
    /// The target is beyond the weapon's maximum range.
    OutOfRange,
    /// The movement destination leaves the grid.
    OutOfBounds,
    /// The movement destination cell is occupied.
    CellOccupied,
    /// Only SAMs can toggle their radar.
    NotSam,
}
