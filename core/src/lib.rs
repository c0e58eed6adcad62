#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cinderfall simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what actually happened. Systems read immutable snapshots and
//! respond exclusively with new command batches, which keeps every tick
//! single-writer and deterministic.

mod config;
mod geometry;

pub use config::{
    BossAnimations, BossTuning, ConfigError, GridConfig, PhysicsConfig, PursuitTuning,
    SimulationConfig, SpawnRange, WorldBounds, MAX_PLANNING_HORIZON,
};
pub use geometry::{CollisionShape, Rect, ShapeError, ShapeFit};
pub use glam::Vec2;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the simulation boots.
pub const WELCOME_BANNER: &str = "Cinderfall simulation core ready.";

/// Unique identifier assigned to an entity by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a collision shape registered in the world's shape library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(u32);

impl ShapeId {
    /// Shape id reserved for the built-in unit sprite quad.
    pub const SPRITE: ShapeId = ShapeId(0);
    /// Shape id reserved for the built-in precise beam quad.
    pub const BEAM: ShapeId = ShapeId(1);

    /// Creates a new shape identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// State of a single cell in the occupancy grid.
///
/// `Visited` and `Goal` are scratch markings that only ever exist inside a
/// path query's private copy of the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Traversable cell.
    #[default]
    Empty,
    /// Cell covered by static level geometry.
    Blocked,
    /// Cell already discovered by the running search.
    Visited,
    /// Cell the running search is trying to reach.
    Goal,
}

/// Ordered cell route produced by a grid search.
///
/// Cells are stored goal first, start last. Consumers pop from the start end,
/// so every pop yields the next cell one step closer to the goal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    cells: Vec<CellCoord>,
}

impl Path {
    /// Creates an empty path signalling "no pending move".
    #[must_use]
    pub const fn empty() -> Self {
        Self { cells: Vec::new() }
    }

    /// Wraps cells ordered from the goal back to the start.
    #[must_use]
    pub fn from_goal_first(cells: Vec<CellCoord>) -> Self {
        Self { cells }
    }

    /// Reports whether no cells remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of cells still queued, including the start cell if unconsumed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Number of cell-to-cell steps described by the path.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Cell that will be consumed next.
    #[must_use]
    pub fn peek_next(&self) -> Option<CellCoord> {
        self.cells.last().copied()
    }

    /// Removes and returns the next cell toward the goal.
    pub fn pop_next(&mut self) -> Option<CellCoord> {
        self.cells.pop()
    }

    /// Final destination of the path.
    #[must_use]
    pub fn goal(&self) -> Option<CellCoord> {
        self.cells.first().copied()
    }

    /// Cells ordered goal first.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }
}

/// Rigid-body transform and velocity of an entity.
///
/// The sign of `scale.x` encodes facing; sizes must always be taken from the
/// absolute scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Centre of the entity in world units.
    pub position: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Size of the entity; negative x means facing left.
    pub scale: Vec2,
    /// Rotation in radians.
    pub angle: f32,
    /// Local offset of the collision shape relative to `position`.
    pub offset: Vec2,
}

impl Motion {
    /// Creates a motion at rest with no rotation or offset.
    #[must_use]
    pub fn at(position: Vec2, scale: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            scale,
            angle: 0.0,
            offset: Vec2::ZERO,
        }
    }

    /// Half of the absolute size, used as bounding-box half extents.
    #[must_use]
    pub fn half_extents(&self) -> Vec2 {
        self.scale.abs() / 2.0
    }

    /// Returns `1.0` when facing right and `-1.0` when facing left.
    #[must_use]
    pub fn facing(&self) -> f32 {
        if self.scale.x < 0.0 {
            -1.0
        } else {
            1.0
        }
    }

    /// Flips the scale so the entity faces the provided direction.
    pub fn face(&mut self, direction: f32) {
        let width = self.scale.x.abs();
        self.scale.x = if direction < 0.0 { -width } else { width };
    }
}

/// Closed set of collision roles resolved once per entity per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// The player hero.
    Player,
    /// Damageable opponent, including the boss.
    Enemy,
    /// Static level block.
    Block,
    /// Static region that destroys whatever falls into it.
    Hazard,
    /// Damage-dealing attack region.
    Hitbox,
    /// Elastic thrown body that bounces off blocks.
    Projectile,
    /// Shot fired by an enemy at the player.
    EnemyShot,
    /// Item the player may pick up.
    Collectable,
    /// Non-interacting body such as dialogue panels.
    Scenery,
}

/// Gravity participation of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gravity {
    /// Pinned to a wall on the left or right side.
    pub lodged: [bool; 2],
    /// Currently performing a dash.
    pub dashing: bool,
}

impl Gravity {
    /// Reports whether gravity is currently suspended for the entity.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.lodged[0] || self.lodged[1] || self.dashing
    }
}

/// Health and hit-state of a damageable entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combat {
    /// Remaining health.
    pub health: i32,
    /// Accepts damage while `true`.
    pub hittable: bool,
    /// Deals contact damage while `true`.
    pub hitting: bool,
    /// One-shot animation played when damaged.
    pub hit_animation: u32,
    /// One-shot animation played when defeated.
    pub death_animation: u32,
}

/// Attack region attached to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hitbox {
    /// Deals damage only while active.
    pub active: bool,
    /// Health removed per hit.
    pub damage: i32,
    /// Damages enemies.
    pub hurts_enemies: bool,
    /// Damages the player.
    pub hurts_player: bool,
    /// Removed after striking an enemy or a block.
    pub consumed_on_impact: bool,
    /// Destroys enemy shots on contact.
    pub parries_shots: bool,
}

/// Per-axis friction multipliers applied to a bouncing body after each bounce.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Elastic {
    /// Multipliers for the x and y velocity components.
    pub friction: Vec2,
}

/// Player-only state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Remaining hit points.
    pub hp: i32,
    /// Remaining invulnerability in milliseconds.
    pub invulnerable_ms: f32,
    /// Carries a melee weapon, which makes closing in dangerous for the boss.
    pub armed_melee: bool,
}

/// Minion archetypes the boss keeps count of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MinionKind {
    /// Walking melee minion.
    Ghoul,
    /// Stationary ranged minion.
    Spitter,
    /// Boss projectile volley.
    Bullet,
}

/// One-shot animation currently playing on an entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneShot {
    /// Index of the animation row being played.
    pub index: u32,
    /// Milliseconds elapsed since the animation started.
    pub elapsed_ms: f32,
}

impl OneShot {
    /// Frame currently displayed at the provided playback rate.
    #[must_use]
    pub fn frame(&self, frames_per_second: f32) -> u32 {
        (self.elapsed_ms / 1000.0 * frames_per_second).floor() as u32
    }
}

/// Actions available to the boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BossAction {
    /// Vanish and reappear on another platform.
    Teleport,
    /// Melee swing with two timed hitboxes.
    Swipe,
    /// Call in walking minions.
    SummonGhouls,
    /// Call in ranged minions.
    SummonSpitters,
    /// Fire a volley of projectiles.
    SummonBullets,
    /// Choosing the next action.
    Idle,
}

impl BossAction {
    /// Every action the planner may select, in evaluation order.
    pub const ACTIONABLE: [BossAction; 5] = [
        BossAction::Teleport,
        BossAction::Swipe,
        BossAction::SummonGhouls,
        BossAction::SummonSpitters,
        BossAction::SummonBullets,
    ];

    /// Slot of the action inside a [`BossCooldowns`] vector.
    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            Self::Teleport => 0,
            Self::Swipe => 1,
            Self::SummonGhouls => 2,
            Self::SummonSpitters => 3,
            Self::SummonBullets => 4,
            Self::Idle => 5,
        }
    }
}

/// Per-action cooldowns in milliseconds, including the idle cooldown.
///
/// The vector is `Copy`, so every hypothetical branch of the planner works on
/// its own copy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BossCooldowns([f32; 6]);

impl BossCooldowns {
    /// Creates a cooldown vector from raw slot values.
    #[must_use]
    pub const fn from_slots(slots: [f32; 6]) -> Self {
        Self(slots)
    }

    /// Remaining cooldown for the provided action.
    #[must_use]
    pub fn get(&self, action: BossAction) -> f32 {
        self.0[action.slot()]
    }

    /// Overwrites the cooldown for the provided action.
    pub fn set(&mut self, action: BossAction, value: f32) {
        self.0[action.slot()] = value;
    }

    /// Reports whether the action may be taken.
    #[must_use]
    pub fn is_ready(&self, action: BossAction) -> bool {
        self.get(action) <= 0.0
    }

    /// Subtracts `amount` from every cooldown that is still running.
    pub fn deplete(&mut self, amount: f32) {
        for slot in &mut self.0 {
            if *slot > 0.0 {
                *slot -= amount;
            }
        }
    }
}

/// Decision state of the boss.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossPlan {
    /// Action being executed, or `Idle` while choosing.
    pub action: BossAction,
    /// Sub-step of the action being executed.
    pub phase: u32,
    /// Remaining cooldowns.
    pub cooldowns: BossCooldowns,
}

impl Default for BossPlan {
    fn default() -> Self {
        Self {
            action: BossAction::Idle,
            phase: 0,
            cooldowns: BossCooldowns::default(),
        }
    }
}

/// Walkable surface the boss may teleport onto.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Horizontal centre of the walkable span.
    pub center_x: f32,
    /// Height of the walkable surface.
    pub surface_y: f32,
    /// Half of the walkable span.
    pub half_width: f32,
}

impl Platform {
    /// Creates a new platform description.
    #[must_use]
    pub const fn new(center_x: f32, surface_y: f32, half_width: f32) -> Self {
        Self {
            center_x,
            surface_y,
            half_width,
        }
    }

    /// Centre position for a body of the given size standing in the middle.
    #[must_use]
    pub fn standing_position(&self, body_scale: Vec2) -> Vec2 {
        Vec2::new(self.center_x, self.surface_y - body_scale.y.abs() / 2.0)
    }
}

/// Static level geometry consumed once when the level is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    /// Solid rectangles; each becomes a block entity and blocks grid cells.
    pub blocks: Vec<Rect>,
    /// Lethal rectangles such as lava pits.
    pub hazards: Vec<Rect>,
    /// Surfaces the boss may stand on.
    pub platforms: Vec<Platform>,
}

impl Default for LevelLayout {
    fn default() -> Self {
        const UNIT_X: f32 = 40.0;
        const UNIT_Y: f32 = 40.0;
        const WIDTH: f32 = 1200.0;
        const HEIGHT: f32 = 800.0;

        let block = |x: f32, y: f32, w: f32, h: f32| Rect::from_center(Vec2::new(x, y), Vec2::new(w, h));
        Self {
            blocks: vec![
                block(WIDTH / 2.0, HEIGHT + 100.0, WIDTH, UNIT_Y / 2.0),
                block(-UNIT_X, 0.0, UNIT_X * 6.0, HEIGHT * 2.0),
                block(WIDTH + UNIT_X, 0.0, UNIT_X * 6.0, HEIGHT * 2.0),
                block(UNIT_X * 7.5, UNIT_Y * 12.0, UNIT_X * 11.0, UNIT_Y * 2.0),
                block(WIDTH / 2.0, UNIT_Y * 6.0, UNIT_X * 26.0, UNIT_Y * 2.0),
                block(WIDTH - UNIT_X * 7.5, UNIT_Y * 12.0, UNIT_X * 11.0, UNIT_Y * 2.0),
                block(UNIT_X * 13.0, UNIT_Y * 18.0, UNIT_X * 10.0, UNIT_Y * 2.0),
                block(WIDTH - UNIT_X * 13.0, UNIT_Y * 18.0, UNIT_X * 10.0, UNIT_Y * 2.0),
                block(UNIT_X * 6.5, HEIGHT - UNIT_Y * 3.0, UNIT_X * 9.0, UNIT_Y * 4.0),
                block(WIDTH - UNIT_X * 6.5, HEIGHT - UNIT_Y * 3.0, UNIT_X * 9.0, UNIT_Y * 4.0),
                block(WIDTH / 2.0, HEIGHT - UNIT_Y * 2.0, UNIT_X * 14.0, UNIT_Y * 2.0),
            ],
            hazards: Vec::new(),
            platforms: vec![
                Platform::new(UNIT_X * 7.5, UNIT_Y * 11.0, UNIT_X * 5.5),
                Platform::new(WIDTH / 2.0, UNIT_Y * 5.0, UNIT_X * 13.0),
                Platform::new(WIDTH - UNIT_X * 7.5, UNIT_Y * 11.0, UNIT_X * 5.5),
                Platform::new(UNIT_X * 13.0, UNIT_Y * 17.0, UNIT_X * 5.0),
                Platform::new(WIDTH - UNIT_X * 15.0, UNIT_Y * 17.0, UNIT_X * 5.0),
                Platform::new(UNIT_X * 6.5, HEIGHT - UNIT_Y * 4.0, UNIT_X * 4.5),
                Platform::new(WIDTH - UNIT_X * 6.5, HEIGHT - UNIT_Y * 4.0, UNIT_X * 4.5),
                Platform::new(WIDTH / 2.0, HEIGHT - UNIT_Y * 3.0, UNIT_X * 7.0),
            ],
        }
    }
}

/// Frame counts of each one-shot animation row, indexed by animation index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationTable {
    one_shot_frames: Vec<u32>,
}

impl AnimationTable {
    /// Creates a table from per-index frame counts.
    #[must_use]
    pub fn new(one_shot_frames: Vec<u32>) -> Self {
        Self { one_shot_frames }
    }

    /// Frame count of the provided one-shot row; unknown rows last one frame.
    #[must_use]
    pub fn frames(&self, index: u32) -> u32 {
        usize::try_from(index)
            .ok()
            .and_then(|slot| self.one_shot_frames.get(slot).copied())
            .unwrap_or(1)
    }
}

/// Everything required to insert a fully formed entity into the world.
///
/// Blueprints are produced by the entity factory collaborator, which owns all
/// archetype stats.
#[derive(Clone, Debug, PartialEq)]
pub struct Blueprint {
    /// Collision role of the entity.
    pub role: Role,
    /// Initial transform and velocity.
    pub motion: Motion,
    /// Collision shape from the world's shape library.
    pub shape: ShapeId,
    /// Pushed out of blocks instead of passing through them.
    pub solid: bool,
    /// Falls under gravity.
    pub gravity: Option<Gravity>,
    /// Damageable state.
    pub combat: Option<Combat>,
    /// Attack region.
    pub hitbox: Option<Hitbox>,
    /// Bounces off blocks.
    pub elastic: Option<Elastic>,
    /// Player-only state.
    pub player: Option<PlayerState>,
    /// Counted as a boss minion.
    pub minion: Option<MinionKind>,
    /// Pursues the player across the grid.
    pub pursuer: bool,
    /// Hitboxes owned by the boss, if this entity is the boss.
    pub boss_hurt_boxes: Option<Vec<EntityId>>,
    /// Moves while dialogue is showing.
    pub dialogue: bool,
    /// One-shot animation frame counts.
    pub animations: AnimationTable,
}

impl Blueprint {
    /// Creates a blueprint with only a role, transform and shape.
    #[must_use]
    pub fn new(role: Role, motion: Motion, shape: ShapeId) -> Self {
        Self {
            role,
            motion,
            shape,
            solid: false,
            gravity: None,
            combat: None,
            hitbox: None,
            elastic: None,
            player: None,
            minion: None,
            pursuer: false,
            boss_hurt_boxes: None,
            dialogue: false,
            animations: AnimationTable::default(),
        }
    }
}

/// Axis along which a correction applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Builds the static level: block and hazard entities plus blocked grid cells.
    LoadLevel {
        /// Geometry describing the level.
        layout: LevelLayout,
    },
    /// Adds a collision shape to the shape library.
    RegisterShape {
        /// Shape geometry in local space.
        shape: CollisionShape,
    },
    /// Inserts a new entity.
    Spawn {
        /// Components of the new entity.
        blueprint: Box<Blueprint>,
    },
    /// Removes an entity.
    Despawn {
        /// Entity to remove.
        entity: EntityId,
    },
    /// Advances the simulation clock and integrates motion.
    Tick {
        /// Elapsed time in milliseconds.
        dt_ms: f32,
    },
    /// Toggles dialogue mode, which freezes everything except dialogue panels.
    SetDialogueActive {
        /// Whether dialogue is on screen.
        active: bool,
    },
    /// Overwrites an entity's velocity.
    SetVelocity {
        /// Entity to update.
        entity: EntityId,
        /// New velocity.
        velocity: Vec2,
    },
    /// Moves an entity to a new position.
    PlaceEntity {
        /// Entity to move.
        entity: EntityId,
        /// New centre position.
        position: Vec2,
    },
    /// Corrects an entity along one axis after penetrating a block.
    ClampAxis {
        /// Entity pushed out.
        entity: EntityId,
        /// Axis of the correction.
        axis: Axis,
        /// Corrected coordinate on that axis.
        value: f32,
        /// Zeroes the velocity component on that axis.
        stop: bool,
    },
    /// Bounces an elastic entity off a block along one axis.
    Reflect {
        /// Entity that bounced.
        entity: EntityId,
        /// Axis whose velocity component is reversed.
        axis: Axis,
        /// Signed push-out distance along that axis.
        push: f32,
    },
    /// Applies a hitbox's damage to a damageable entity.
    ApplyHit {
        /// Entity owning the hitbox.
        hitbox: EntityId,
        /// Entity receiving damage.
        target: EntityId,
    },
    /// Removes one hit point from the player unless invulnerable.
    HurtPlayer {
        /// Player entity.
        player: EntityId,
        /// Entity responsible for the damage.
        source: EntityId,
        /// Kills the player outright.
        lethal: bool,
    },
    /// Reports that the player touched a collectable.
    TouchCollectable {
        /// Player entity.
        player: EntityId,
        /// Collectable entity.
        collectable: EntityId,
    },
    /// Toggles a hitbox.
    SetHitboxActive {
        /// Entity owning the hitbox.
        hitbox: EntityId,
        /// New activation state.
        active: bool,
    },
    /// Overwrites the hit-state flags of a damageable entity.
    SetCombatFlags {
        /// Entity to update.
        entity: EntityId,
        /// Accepts damage.
        hittable: bool,
        /// Deals contact damage.
        hitting: bool,
    },
    /// Starts a one-shot animation.
    PlayOneShot {
        /// Entity to animate.
        entity: EntityId,
        /// Animation row to play.
        animation: u32,
    },
    /// Stores a freshly planned path on a pursuer.
    SetPursuerPath {
        /// Pursuer entity.
        pursuer: EntityId,
        /// Route ordered goal first.
        path: Path,
    },
    /// Teleports a pursuer one cell along its path.
    BlinkPursuer {
        /// Pursuer entity.
        pursuer: EntityId,
        /// Cell the pursuer appears in.
        destination: CellCoord,
        /// Cells still queued after the blink.
        remaining: Path,
    },
    /// Plays the pursuer's fade-out after a blink.
    FadePursuer {
        /// Pursuer entity.
        pursuer: EntityId,
    },
    /// Starts a boss action and resets its cooldowns.
    SelectBossAction {
        /// Boss entity.
        boss: EntityId,
        /// Action chosen by the planner.
        action: BossAction,
    },
    /// Moves the running boss action to another phase.
    SetBossPhase {
        /// Boss entity.
        boss: EntityId,
        /// New phase.
        phase: u32,
    },
    /// Returns the boss to `Idle` after an action ends.
    CompleteBossAction {
        /// Boss entity.
        boss: EntityId,
    },
    /// Aborts the running boss action and disarms its hitboxes.
    InterruptBoss {
        /// Boss entity.
        boss: EntityId,
    },
    /// Requests minions from the entity factory.
    SummonMinions {
        /// Summoning entity.
        summoner: EntityId,
        /// Archetype requested.
        kind: MinionKind,
        /// Number of minions requested.
        count: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Elapsed time in milliseconds.
        dt_ms: f32,
    },
    /// Confirms that the static level was built.
    LevelLoaded {
        /// Number of grid cells marked blocked.
        blocked_cells: usize,
    },
    /// Confirms that a shape was added to the library.
    ShapeRegistered {
        /// Identifier assigned to the shape.
        shape: ShapeId,
    },
    /// Confirms that an entity was inserted.
    EntitySpawned {
        /// Identifier assigned to the entity.
        entity: EntityId,
        /// Role of the entity.
        role: Role,
    },
    /// Confirms that an entity was removed.
    EntityDespawned {
        /// Identifier of the removed entity.
        entity: EntityId,
    },
    /// Reports a successful hit.
    EntityDamaged {
        /// Entity that was hit.
        entity: EntityId,
        /// Entity owning the hitbox.
        source: EntityId,
        /// Health remaining after the hit.
        remaining: i32,
    },
    /// Reports that a hit brought an entity's health to zero.
    EntityDefeated {
        /// Entity that was defeated.
        entity: EntityId,
    },
    /// Reports a hit that was not applied.
    HitRejected {
        /// Entity owning the hitbox.
        hitbox: EntityId,
        /// Entity that would have been hit.
        target: EntityId,
        /// Why the hit was ignored.
        reason: HitRejection,
    },
    /// Reports that the player lost a hit point.
    PlayerHurt {
        /// Player entity.
        player: EntityId,
        /// Hit points left.
        remaining: i32,
    },
    /// Reports that the player ran out of hit points.
    PlayerDefeated {
        /// Player entity.
        player: EntityId,
    },
    /// Reports that the player is touching a collectable.
    CollectableTouched {
        /// Player entity.
        player: EntityId,
        /// Collectable entity.
        collectable: EntityId,
    },
    /// Reports that a one-shot animation ran to completion.
    OneShotFinished {
        /// Animated entity.
        entity: EntityId,
        /// Animation row that finished.
        animation: u32,
    },
    /// Reports that a pursuer appeared in a new cell.
    PursuerBlinked {
        /// Pursuer entity.
        pursuer: EntityId,
        /// Cell the pursuer now occupies.
        cell: CellCoord,
    },
    /// Confirms that the boss started a new action.
    BossActionSelected {
        /// Boss entity.
        boss: EntityId,
        /// Action started.
        action: BossAction,
    },
    /// Reports that an action selection was refused.
    BossActionRejected {
        /// Boss entity.
        boss: EntityId,
        /// Action requested.
        action: BossAction,
        /// Why the request was refused.
        reason: BossActionRejection,
    },
    /// Reports that the boss finished an action.
    BossActionCompleted {
        /// Boss entity.
        boss: EntityId,
        /// Action that finished.
        action: BossAction,
    },
    /// Reports that a hurt or death animation aborted the boss's action.
    BossInterrupted {
        /// Boss entity.
        boss: EntityId,
        /// Action that was aborted.
        action: BossAction,
    },
    /// Asks the entity factory to create minions.
    MinionsRequested {
        /// Summoning entity.
        summoner: EntityId,
        /// Archetype requested.
        kind: MinionKind,
        /// Number of minions requested.
        count: u32,
        /// Where the summoner stands.
        origin: Vec2,
    },
}

/// Reasons a hit may be ignored by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitRejection {
    /// The hitbox is disarmed or does not hurt enemies.
    HitboxInactive,
    /// The target already took a hit and has not recovered.
    TargetNotHittable,
    /// One of the entities no longer exists or lacks the required component.
    MissingEntity,
}

/// Reasons a boss action selection may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossActionRejection {
    /// The requested action or the idle cooldown has not expired.
    CoolingDown,
    /// Another action is still running.
    Busy,
    /// `Idle` cannot be selected.
    NotActionable,
    /// The entity is not a boss.
    MissingBoss,
}

/// Immutable representation of a collidable entity used for collision queries.
#[derive(Clone, Debug, PartialEq)]
pub struct BodySnapshot {
    /// Identifier of the entity.
    pub id: EntityId,
    /// Collision role.
    pub role: Role,
    /// Transform and velocity.
    pub motion: Motion,
    /// Shape from the world's library.
    pub shape: ShapeId,
    /// Pushed out of blocks.
    pub solid: bool,
    /// Damageable state.
    pub combat: Option<Combat>,
    /// Attack region.
    pub hitbox: Option<Hitbox>,
    /// Bounce friction.
    pub elastic: Option<Elastic>,
}

/// Immutable representation of the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Identifier of the player entity.
    pub id: EntityId,
    /// Transform and velocity.
    pub motion: Motion,
    /// Player-only state.
    pub state: PlayerState,
}

/// Immutable representation of a pursuer.
#[derive(Clone, Debug, PartialEq)]
pub struct PursuerSnapshot {
    /// Identifier of the pursuer entity.
    pub id: EntityId,
    /// Current world position.
    pub position: Vec2,
    /// Queued route, goal first.
    pub path: Path,
    /// Blink timer expired.
    pub ready: bool,
    /// Blinked since the last fade.
    pub blinked: bool,
}

/// Immutable representation of the boss.
#[derive(Clone, Debug, PartialEq)]
pub struct BossSnapshot {
    /// Identifier of the boss entity.
    pub id: EntityId,
    /// Transform and velocity.
    pub motion: Motion,
    /// Decision state.
    pub plan: BossPlan,
    /// One-shot animation currently playing, `None` once finished.
    pub one_shot: Option<OneShot>,
    /// Hitboxes owned by the boss.
    pub hurt_boxes: Vec<EntityId>,
}

/// Number of living minions per archetype.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MinionCounts {
    /// Living ghouls.
    pub ghouls: u32,
    /// Living spitters.
    pub spitters: u32,
}
