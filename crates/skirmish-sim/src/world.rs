//! World state — the single mutable resource the resolvers operate on.
//!
//! `WorldState` owns the hecs ECS world, the grid, a seeded RNG shared by
//! every resolver, the turn and stalemate counters, the pending-kill
//! list, and one fog-of-war view per team. Units are spawned from
//! `UnitRecord`s and extracted back into records for snapshots, making
//! the whole world losslessly serializable (RNG stream included).

use std::collections::BTreeMap;

use hecs::Entity;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use skirmish_core::components::{Alive, Launcher, Mobile, Position, Radar, SamControl};
use skirmish_core::enums::{EndReason, Team, UnitKind};
use skirmish_core::error::SetupError;
use skirmish_core::grid::{Cell, Grid};
use skirmish_core::observation::TeamView;
use skirmish_core::unit::{UnitId, UnitRecord, UnitStats};

/// The complete mutable game state for one episode.
pub struct WorldState {
    pub(crate) grid: Grid,
    pub(crate) ecs: hecs::World,
    /// Unit id to ECS entity, in id order. Drives all deterministic iteration.
    pub(crate) index: BTreeMap<UnitId, Entity>,
    /// Explicit id allocator — monotonic, never reused, owned by the world
    /// so concurrent episodes cannot collide.
    pub(crate) next_id: u32,
    pub(crate) seed: u64,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) turn: u32,
    pub(crate) turns_without_shooting: u32,
    pub(crate) turns_without_movement: u32,
    /// Kill marks accumulated during combat, applied after all shots
    /// resolve. Insertion-ordered and deduplicated.
    pub(crate) pending_kills: Vec<UnitId>,
    pub(crate) game_over: bool,
    pub(crate) winner: Option<Team>,
    pub(crate) end_reason: Option<EndReason>,
    pub(crate) views: [TeamView; 2],
}

impl std::fmt::Debug for WorldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldState")
            .field("grid", &self.grid)
            .field("index", &self.index)
            .field("next_id", &self.next_id)
            .field("seed", &self.seed)
            .field("rng", &self.rng)
            .field("turn", &self.turn)
            .field("turns_without_shooting", &self.turns_without_shooting)
            .field("turns_without_movement", &self.turns_without_movement)
            .field("pending_kills", &self.pending_kills)
            .field("game_over", &self.game_over)
            .field("winner", &self.winner)
            .field("end_reason", &self.end_reason)
            .field("views", &self.views)
            .finish_non_exhaustive()
    }
}

impl WorldState {
    pub fn new(grid: Grid, seed: u64) -> Self {
        Self {
            grid,
            ecs: hecs::World::new(),
            index: BTreeMap::new(),
            next_id: 0,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            turn: 0,
            turns_without_shooting: 0,
            turns_without_movement: 0,
            pending_kills: Vec::new(),
            game_over: false,
            winner: None,
            end_reason: None,
            views: [TeamView::new(Team::Blue), TeamView::new(Team::Red)],
        }
    }

    /// Spawn a unit from a record.
    ///
    /// Validates stats, placement bounds, and cell uniqueness among alive
    /// units. Allocates an id when the record carries none; an explicit id
    /// bumps the allocator past it so later spawns never collide.
    pub fn spawn(&mut self, record: &UnitRecord) -> Result<UnitId, SetupError> {
        record.validate()?;

        if !self.grid.in_bounds(record.pos) {
            return Err(SetupError::StartsOutOfBounds {
                unit: record.label(),
                x: record.pos.x,
                y: record.pos.y,
            });
        }
        if record.alive {
            for &other in self.index.keys() {
                if self.is_alive(other) && self.position(other) == Some(record.pos) {
                    return Err(SetupError::OverlappingUnits {
                        a: self.label(other),
                        b: record.label(),
                    });
                }
            }
        }

        let id = match record.id {
            Some(id) => {
                if self.index.contains_key(&id) {
                    return Err(SetupError::DuplicateId(id));
                }
                self.next_id = self.next_id.max(id.0 + 1);
                id
            }
            None => {
                let id = UnitId(self.next_id);
                self.next_id += 1;
                id
            }
        };

        let entity = self.ecs.spawn((
            id,
            record.team,
            record.kind(),
            Position(record.pos),
            Alive(record.alive),
        ));
        if record.can_move() {
            let _ = self.ecs.insert_one(entity, Mobile);
        }
        match record.stats {
            UnitStats::Awacs { radar_range } => {
                let _ = self.ecs.insert_one(entity, Radar { range: radar_range });
            }
            UnitStats::Aircraft {
                radar_range,
                missiles,
                missile_max_range,
                base_hit_prob,
                min_hit_prob,
            } => {
                let _ = self.ecs.insert(
                    entity,
                    (
                        Radar { range: radar_range },
                        Launcher {
                            missiles,
                            max_range: missile_max_range,
                            base_hit_prob,
                            min_hit_prob,
                        },
                    ),
                );
            }
            UnitStats::Decoy {} => {}
            UnitStats::Sam {
                radar_range,
                missiles,
                missile_max_range,
                base_hit_prob,
                min_hit_prob,
                cooldown_steps,
                cooldown_remaining,
                on,
            } => {
                let _ = self.ecs.insert(
                    entity,
                    (
                        Radar { range: radar_range },
                        Launcher {
                            missiles,
                            max_range: missile_max_range,
                            base_hit_prob,
                            min_hit_prob,
                        },
                        SamControl {
                            on,
                            cooldown_steps,
                            cooldown_remaining,
                        },
                    ),
                );
            }
        }
        self.index.insert(id, entity);
        Ok(id)
    }

    // --- Read access ---

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn turns_without_shooting(&self) -> u32 {
        self.turns_without_shooting
    }

    pub fn turns_without_movement(&self) -> u32 {
        self.turns_without_movement
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub(crate) fn entity(&self, id: UnitId) -> Option<Entity> {
        self.index.get(&id).copied()
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.index.contains_key(&id)
    }

    /// All unit ids in id order, dead included.
    pub fn unit_ids(&self) -> Vec<UnitId> {
        self.index.keys().copied().collect()
    }

    /// Alive unit ids in id order.
    pub fn alive_ids(&self) -> Vec<UnitId> {
        self.index
            .keys()
            .copied()
            .filter(|&id| self.is_alive(id))
            .collect()
    }

    pub fn is_alive(&self, id: UnitId) -> bool {
        self.entity(id)
            .and_then(|e| self.ecs.get::<&Alive>(e).ok().map(|a| a.0))
            .unwrap_or(false)
    }

    pub fn position(&self, id: UnitId) -> Option<Cell> {
        let e = self.entity(id)?;
        self.ecs.get::<&Position>(e).ok().map(|p| p.0)
    }

    pub fn team(&self, id: UnitId) -> Option<Team> {
        let e = self.entity(id)?;
        self.ecs.get::<&Team>(e).ok().map(|t| *t)
    }

    pub fn kind(&self, id: UnitId) -> Option<UnitKind> {
        let e = self.entity(id)?;
        self.ecs.get::<&UnitKind>(e).ok().map(|k| *k)
    }

    pub fn can_move(&self, id: UnitId) -> bool {
        self.entity(id)
            .map(|e| self.ecs.get::<&Mobile>(e).is_ok())
            .unwrap_or(false)
    }

    pub fn can_shoot(&self, id: UnitId) -> bool {
        self.entity(id)
            .map(|e| self.ecs.get::<&Launcher>(e).is_ok())
            .unwrap_or(false)
    }

    pub fn launcher(&self, id: UnitId) -> Option<Launcher> {
        let e = self.entity(id)?;
        self.ecs.get::<&Launcher>(e).ok().map(|l| *l)
    }

    pub fn sam_control(&self, id: UnitId) -> Option<SamControl> {
        let e = self.entity(id)?;
        self.ecs.get::<&SamControl>(e).ok().map(|s| *s)
    }

    pub fn missiles(&self, id: UnitId) -> Option<u32> {
        self.launcher(id).map(|l| l.missiles)
    }

    /// Effective sensor range this turn — 0 for a SAM with its radar off.
    pub fn active_radar_range(&self, id: UnitId) -> f64 {
        let Some(e) = self.entity(id) else {
            return 0.0;
        };
        if let Ok(sam) = self.ecs.get::<&SamControl>(e) {
            if !sam.on {
                return 0.0;
            }
        }
        self.ecs.get::<&Radar>(e).map(|r| r.range).unwrap_or(0.0)
    }

    /// Human-readable label like `aircraft#3(BLUE)` for log lines.
    pub fn label(&self, id: UnitId) -> String {
        match (self.kind(id), self.team(id)) {
            (Some(kind), Some(team)) => format!("{kind}#{id}({team})"),
            _ => format!("unit#{id}"),
        }
    }

    // --- Mutation used by the resolvers ---

    pub(crate) fn set_position(&mut self, id: UnitId, cell: Cell) {
        if let Some(e) = self.entity(id) {
            if let Ok(mut pos) = self.ecs.get::<&mut Position>(e) {
                pos.0 = cell;
            }
        }
    }

    pub(crate) fn set_alive(&mut self, id: UnitId, alive: bool) {
        if let Some(e) = self.entity(id) {
            if let Ok(mut flag) = self.ecs.get::<&mut Alive>(e) {
                flag.0 = alive;
            }
        }
    }

    /// Mark a unit for death at end-of-combat. Idempotent; marks keep
    /// their first insertion order.
    pub fn mark_for_kill(&mut self, id: UnitId) {
        if !self.pending_kills.contains(&id) {
            self.pending_kills.push(id);
        }
    }

    pub(crate) fn take_pending_kills(&mut self) -> Vec<UnitId> {
        std::mem::take(&mut self.pending_kills)
    }

    // --- Team views ---

    pub fn team_view(&self, team: Team) -> &TeamView {
        &self.views[team.index()]
    }

    pub fn team_view_mut(&mut self, team: Team) -> &mut TeamView {
        &mut self.views[team.index()]
    }

    // --- Record extraction and snapshots ---

    /// Extract a unit back into its record form (id and alive flag included).
    pub fn record(&self, id: UnitId) -> Option<UnitRecord> {
        let e = self.entity(id)?;
        let team = *self.ecs.get::<&Team>(e).ok()?;
        let kind = *self.ecs.get::<&UnitKind>(e).ok()?;
        let pos = self.ecs.get::<&Position>(e).ok()?.0;
        let alive = self.ecs.get::<&Alive>(e).ok()?.0;

        let radar_range = self.ecs.get::<&Radar>(e).map(|r| r.range).unwrap_or(0.0);
        let stats = match kind {
            UnitKind::Awacs => UnitStats::Awacs { radar_range },
            UnitKind::Decoy => UnitStats::Decoy {},
            UnitKind::Aircraft => {
                let l = self.launcher(id)?;
                UnitStats::Aircraft {
                    radar_range,
                    missiles: l.missiles,
                    missile_max_range: l.max_range,
                    base_hit_prob: l.base_hit_prob,
                    min_hit_prob: l.min_hit_prob,
                }
            }
            UnitKind::Sam => {
                let l = self.launcher(id)?;
                let sam = self.sam_control(id)?;
                UnitStats::Sam {
                    radar_range,
                    missiles: l.missiles,
                    missile_max_range: l.max_range,
                    base_hit_prob: l.base_hit_prob,
                    min_hit_prob: l.min_hit_prob,
                    cooldown_steps: sam.cooldown_steps,
                    cooldown_remaining: sam.cooldown_remaining,
                    on: sam.on,
                }
            }
        };

        Some(UnitRecord {
            id: Some(id),
            team,
            pos,
            alive,
            stats,
        })
    }

    /// All unit records in id order, dead included.
    pub fn records(&self) -> Vec<UnitRecord> {
        self.index
            .keys()
            .filter_map(|&id| self.record(id))
            .collect()
    }

    /// One team's unit records in id order, dead included.
    pub fn team_records(&self, team: Team) -> Vec<UnitRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.team == team)
            .collect()
    }

    /// Capture the full world, RNG stream position included.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            grid: self.grid,
            turn: self.turn,
            turns_without_shooting: self.turns_without_shooting,
            turns_without_movement: self.turns_without_movement,
            game_over: self.game_over,
            winner: self.winner,
            end_reason: self.end_reason,
            seed: self.seed,
            rng: self.rng.clone(),
            next_id: self.next_id,
            units: self.records(),
            views: self.views.to_vec(),
        }
    }

    /// Rebuild a world from a snapshot. Stats are re-validated; a
    /// malformed snapshot is a fatal setup error.
    pub fn from_snapshot(snapshot: WorldSnapshot) -> Result<WorldState, SetupError> {
        let grid = Grid::new(snapshot.grid.width, snapshot.grid.height)?;
        let mut world = WorldState::new(grid, snapshot.seed);
        for record in &snapshot.units {
            world.spawn(record)?;
        }

        if snapshot.views.len() != 2 {
            return Err(SetupError::MalformedSnapshot);
        }
        let mut seen = [false; 2];
        for view in snapshot.views {
            let idx = view.team.index();
            seen[idx] = true;
            world.views[idx] = view;
        }
        if seen != [true; 2] {
            return Err(SetupError::MalformedSnapshot);
        }

        world.next_id = world.next_id.max(snapshot.next_id);
        world.rng = snapshot.rng;
        world.turn = snapshot.turn;
        world.turns_without_shooting = snapshot.turns_without_shooting;
        world.turns_without_movement = snapshot.turns_without_movement;
        world.game_over = snapshot.game_over;
        world.winner = snapshot.winner;
        world.end_reason = snapshot.end_reason;
        Ok(world)
    }
}

/// Serialized form of a [`WorldState`] — a lossless round trip, including
/// the RNG stream position, so a resumed game replays identically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub grid: Grid,
    pub turn: u32,
    pub turns_without_shooting: u32,
    pub turns_without_movement: u32,
    pub game_over: bool,
    pub winner: Option<Team>,
    pub end_reason: Option<EndReason>,
    pub seed: u64,
    pub rng: ChaCha8Rng,
    pub next_id: u32,
    pub units: Vec<UnitRecord>,
    pub views: Vec<TeamView>,
}
