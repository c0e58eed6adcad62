//! Tunable simulation parameters.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BossAction, BossCooldowns, MinionKind};

/// Deepest planning horizon accepted by [`SimulationConfig::validate`].
pub const MAX_PLANNING_HORIZON: u32 = 4;

/// Errors raised when validating a [`SimulationConfig`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The grid has no cells.
    #[error("grid must have at least one column and one row, got {columns}x{rows}")]
    EmptyGrid {
        /// Configured columns.
        columns: u32,
        /// Configured rows.
        rows: u32,
    },
    /// The world has a non-positive extent.
    #[error("world bounds must be positive, got {width}x{height}")]
    InvalidWorldBounds {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
    },
    /// The planner would search too deep.
    #[error("planning horizon {horizon} exceeds the maximum of {max}")]
    HorizonTooDeep {
        /// Configured horizon.
        horizon: u32,
        /// Largest accepted horizon.
        max: u32,
    },
    /// The discount factor is not a probability.
    #[error("discount {0} must be between 0.0 and 1.0")]
    DiscountOutOfRange(f32),
    /// A spawn range has its bounds inverted.
    #[error("{kind:?} spawn range {min}..={max} is empty")]
    EmptySpawnRange {
        /// Minion archetype.
        kind: MinionKind,
        /// Configured lower bound.
        min: u32,
        /// Configured upper bound.
        max: u32,
    },
    /// Animations would never advance.
    #[error("animation rate must be positive, got {0}")]
    NonPositiveAnimationRate(f32),
}

/// Extent of the playable world in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldBounds {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl WorldBounds {
    /// Extent as a vector.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

/// Resolution of the occupancy grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 24,
            rows: 16,
        }
    }
}

/// Motion and damage constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward velocity gained per elapsed millisecond.
    pub gravity_per_ms: f32,
    /// Invulnerability granted to the player after a hit, in milliseconds.
    pub invulnerability_ms: f32,
    /// Playback rate of one-shot animations.
    pub animation_fps: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_per_ms: 10.0 / 17.5,
            invulnerability_ms: 3000.0,
            animation_fps: 10.0,
        }
    }
}

/// Timing of teleporting pursuers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuitTuning {
    /// Delay between blinks, in milliseconds.
    pub blink_interval_ms: f32,
    /// Delay before fading after a blink, in milliseconds.
    pub fade_interval_ms: f32,
    /// One-shot played on arrival.
    pub phase_in_animation: u32,
    /// One-shot played when fading.
    pub phase_out_animation: u32,
}

impl Default for PursuitTuning {
    fn default() -> Self {
        Self {
            blink_interval_ms: 700.0,
            fade_interval_ms: 100.0,
            phase_in_animation: 1,
            phase_out_animation: 4,
        }
    }
}

/// Inclusive range of minion counts spawned by one summon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRange {
    /// Smallest count.
    pub min: u32,
    /// Largest count.
    pub max: u32,
}

impl SpawnRange {
    /// Creates an inclusive range.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Reports whether the range holds no values.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Every count in the range, smallest first.
    pub fn counts(&self) -> impl Iterator<Item = u32> {
        self.min..=self.max
    }
}

/// Animation rows of the boss sprite sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossAnimations {
    /// Swing.
    pub swipe: u32,
    /// Summoning gesture.
    pub summon: u32,
    /// Vanishing.
    pub phase_out: u32,
    /// Reappearing.
    pub phase_in: u32,
    /// Recovery after an attack.
    pub stand_up: u32,
    /// Flinch after taking damage.
    pub hurt: u32,
    /// Death.
    pub death: u32,
}

impl BossAnimations {
    /// Reports whether the row preempts any running action.
    #[must_use]
    pub const fn interrupts(&self, animation: u32) -> bool {
        animation == self.hurt || animation == self.death
    }
}

impl Default for BossAnimations {
    fn default() -> Self {
        Self {
            swipe: 1,
            summon: 6,
            phase_out: 8,
            phase_in: 9,
            stand_up: 10,
            hurt: 11,
            death: 12,
        }
    }
}

/// Constants driving the boss planner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    /// Deepest hypothetical step explored.
    pub horizon: u32,
    /// Weight of future rewards.
    pub discount: f32,
    /// Scale of every reward.
    pub base_reward: f32,
    /// Cooldown applied when an action is selected, in milliseconds.
    pub cooldowns: BossCooldowns,
    /// Soft cap on living ghouls.
    pub max_ghouls: u32,
    /// Soft cap on living spitters.
    pub max_spitters: u32,
    /// Ghouls per summon.
    pub ghoul_spawn: SpawnRange,
    /// Spitters per summon.
    pub spitter_spawn: SpawnRange,
    /// Bullets per volley.
    pub bullet_spawn: SpawnRange,
    /// Box around the boss where a swipe lands at full reward.
    pub swipe_band: Vec2,
    /// Distance past the band over which the swipe reward decays to nothing.
    pub swipe_falloff: f32,
    /// Platform indices the boss considers for teleporting.
    pub teleport_candidates: Vec<usize>,
    /// Distance scale of the positional reward damping.
    pub engagement_range: f32,
    /// Distance change that earns the full positional reward.
    pub engagement_step: f32,
    /// Gap under which an armed player is treated as an emergency.
    pub melee_danger_range: f32,
    /// Offsets of the two swipe hitboxes from the boss centre.
    pub swipe_offsets: [Vec2; 2],
    /// Swing frames on which each swipe hitbox is live.
    pub swipe_frames: [u32; 2],
    /// Animation rows.
    pub animations: BossAnimations,
}

impl BossTuning {
    /// Cooldown configured for the provided action.
    #[must_use]
    pub fn cooldown(&self, action: BossAction) -> f32 {
        self.cooldowns.get(action)
    }

    /// Spawn range used when summoning the provided archetype.
    #[must_use]
    pub const fn spawn_range(&self, kind: MinionKind) -> SpawnRange {
        match kind {
            MinionKind::Ghoul => self.ghoul_spawn,
            MinionKind::Spitter => self.spitter_spawn,
            MinionKind::Bullet => self.bullet_spawn,
        }
    }
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            horizon: 2,
            discount: 0.9,
            base_reward: 100.0,
            cooldowns: BossCooldowns::from_slots([12000.0, 2000.0, 70000.0, 10000.0, 2000.0, 5000.0]),
            max_ghouls: 14,
            max_spitters: 8,
            ghoul_spawn: SpawnRange::new(3, 6),
            spitter_spawn: SpawnRange::new(1, 3),
            bullet_spawn: SpawnRange::new(10, 15),
            swipe_band: Vec2::new(280.0, 40.0),
            swipe_falloff: 20.0,
            teleport_candidates: vec![0, 1, 2, 7],
            engagement_range: 300.0,
            engagement_step: 100.0,
            melee_danger_range: 150.0,
            swipe_offsets: [Vec2::new(0.0, 55.0), Vec2::new(0.0, 15.0)],
            swipe_frames: [1, 3],
            animations: BossAnimations::default(),
        }
    }
}

/// Complete set of simulation parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Extent of the world.
    pub bounds: WorldBounds,
    /// Occupancy grid resolution.
    pub grid: GridConfig,
    /// Motion and damage constants.
    pub physics: PhysicsConfig,
    /// Pursuer timing.
    pub pursuit: PursuitTuning,
    /// Boss planner constants.
    pub boss: BossTuning,
    /// Seed of every random draw made by the systems.
    pub rng_seed: u64,
}

impl SimulationConfig {
    /// Checks that the configuration can drive a simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.columns == 0 || self.grid.rows == 0 {
            return Err(ConfigError::EmptyGrid {
                columns: self.grid.columns,
                rows: self.grid.rows,
            });
        }
        if !(self.bounds.width > 0.0 && self.bounds.height > 0.0) {
            return Err(ConfigError::InvalidWorldBounds {
                width: self.bounds.width,
                height: self.bounds.height,
            });
        }
        if !(self.physics.animation_fps > 0.0) {
            return Err(ConfigError::NonPositiveAnimationRate(
                self.physics.animation_fps,
            ));
        }
        if self.boss.horizon > MAX_PLANNING_HORIZON {
            return Err(ConfigError::HorizonTooDeep {
                horizon: self.boss.horizon,
                max: MAX_PLANNING_HORIZON,
            });
        }
        if !(0.0..=1.0).contains(&self.boss.discount) {
            return Err(ConfigError::DiscountOutOfRange(self.boss.discount));
        }
        for kind in [MinionKind::Ghoul, MinionKind::Spitter, MinionKind::Bullet] {
            let range = self.boss.spawn_range(kind);
            if range.is_empty() {
                return Err(ConfigError::EmptySpawnRange {
                    kind,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        Ok(())
    }
}
