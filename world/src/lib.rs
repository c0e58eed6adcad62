#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Cinderfall.
//!
//! The world owns every entity, the occupancy grid and the shape library. It
//! is only ever mutated through [`apply`], which validates each command and
//! reports the outcome as events.

mod grid;
mod motion;

pub use grid::GridMap;

use std::collections::BTreeMap;

use cinderfall_core::{
    AnimationTable, Axis, Blueprint, BossAction, BossActionRejection, BossPlan, CellCoord,
    CollisionShape, Combat, Command, Elastic, EntityId, Event, Gravity, HitRejection, Hitbox,
    LevelLayout, MinionKind, Motion, OneShot, Path, Platform, PlayerState, Rect, Role, ShapeId,
    SimulationConfig, Vec2, WELCOME_BANNER,
};

const FIRST_ENTITY_ID: u32 = 1;

#[derive(Clone, Debug)]
struct Entity {
    role: Role,
    motion: Motion,
    shape: ShapeId,
    solid: bool,
    gravity: Option<Gravity>,
    combat: Option<Combat>,
    hitbox: Option<Hitbox>,
    elastic: Option<Elastic>,
    player: Option<PlayerState>,
    minion: Option<MinionKind>,
    pursuer: Option<Pursuer>,
    boss: Option<Boss>,
    dialogue: bool,
    animations: AnimationTable,
    one_shot: Option<OneShot>,
}

impl Entity {
    fn from_blueprint(blueprint: Blueprint) -> Self {
        Self {
            role: blueprint.role,
            motion: blueprint.motion,
            shape: blueprint.shape,
            solid: blueprint.solid,
            gravity: blueprint.gravity,
            combat: blueprint.combat,
            hitbox: blueprint.hitbox,
            elastic: blueprint.elastic,
            player: blueprint.player,
            minion: blueprint.minion,
            pursuer: blueprint.pursuer.then(Pursuer::default),
            boss: blueprint.boss_hurt_boxes.map(|hurt_boxes| Boss {
                plan: BossPlan::default(),
                hurt_boxes,
            }),
            dialogue: blueprint.dialogue,
            animations: blueprint.animations,
            one_shot: None,
        }
    }

    fn play(&mut self, animation: u32) {
        self.one_shot = Some(OneShot {
            index: animation,
            elapsed_ms: 0.0,
        });
    }
}

#[derive(Clone, Debug, Default)]
struct Pursuer {
    path: Path,
    timer_ms: f32,
    blinked: bool,
}

#[derive(Clone, Debug)]
struct Boss {
    plan: BossPlan,
    hurt_boxes: Vec<EntityId>,
}

/// Represents the authoritative Cinderfall world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: SimulationConfig,
    grid: GridMap,
    shapes: Vec<CollisionShape>,
    platforms: Vec<Platform>,
    entities: BTreeMap<EntityId, Entity>,
    next_entity: u32,
    dialogue_active: bool,
    tick_index: u64,
}

impl World {
    /// Creates an empty world driven by the provided configuration.
    ///
    /// The shape library starts with the sprite quad at [`ShapeId::SPRITE`]
    /// and the beam quad at [`ShapeId::BEAM`].
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid: GridMap::new(config.grid, config.bounds),
            shapes: vec![CollisionShape::sprite(), CollisionShape::beam()],
            platforms: Vec::new(),
            entities: BTreeMap::new(),
            next_entity: FIRST_ENTITY_ID,
            dialogue_active: false,
            tick_index: 0,
            config,
        }
    }

    fn insert(&mut self, blueprint: Blueprint, out_events: &mut Vec<Event>) -> Option<EntityId> {
        let known_shape = usize::try_from(blueprint.shape.get())
            .ok()
            .is_some_and(|index| index < self.shapes.len());
        if !known_shape {
            log::warn!(
                "refusing to spawn {:?} with unregistered shape {:?}",
                blueprint.role,
                blueprint.shape
            );
            return None;
        }

        let id = EntityId::new(self.next_entity);
        self.next_entity = self.next_entity.saturating_add(1);
        let role = blueprint.role;
        let _ = self.entities.insert(id, Entity::from_blueprint(blueprint));
        out_events.push(Event::EntitySpawned { entity: id, role });
        Some(id)
    }

    fn despawn(&mut self, entity: EntityId, out_events: &mut Vec<Event>) {
        if self.entities.remove(&entity).is_some() {
            out_events.push(Event::EntityDespawned { entity });
        }
    }

    fn load_level(&mut self, layout: LevelLayout, out_events: &mut Vec<Event>) {
        let mut blocked_cells = 0;
        for rect in &layout.blocks {
            blocked_cells += self.grid.mark_blocked(*rect);
            let _ = self.insert(static_body(Role::Block, *rect), out_events);
        }
        for rect in &layout.hazards {
            let _ = self.insert(static_body(Role::Hazard, *rect), out_events);
        }
        self.platforms = layout.platforms;
        log::debug!(
            "level loaded: {} blocks, {} hazards, {} blocked cells",
            layout.blocks.len(),
            layout.hazards.len(),
            blocked_cells
        );
        out_events.push(Event::LevelLoaded { blocked_cells });
    }

    fn tick(&mut self, dt_ms: f32, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt_ms });

        let step = motion::Step {
            dt_ms,
            gravity_per_ms: self.config.physics.gravity_per_ms,
            dialogue_active: self.dialogue_active,
            dialogue_stop_x: self.config.bounds.width / 2.0,
        };
        let boss_animations = self.config.boss.animations;
        let fps = self.config.physics.animation_fps;

        let mut moved = 0_usize;
        let mut finished = Vec::new();
        for (&id, entity) in &mut self.entities {
            if motion::integrate(
                &mut entity.motion,
                entity.gravity.as_ref(),
                entity.dialogue,
                &step,
            ) {
                moved += 1;
            }

            if let Some(player) = entity.player.as_mut() {
                player.invulnerable_ms = (player.invulnerable_ms - dt_ms).max(0.0);
            }

            if let Some(pursuer) = entity.pursuer.as_mut() {
                pursuer.timer_ms -= dt_ms;
            }

            if let Some(boss) = entity.boss.as_mut() {
                let interrupted = entity
                    .one_shot
                    .is_some_and(|shot| boss_animations.interrupts(shot.index));
                if !interrupted {
                    boss.plan.cooldowns.deplete(dt_ms);
                }
            }

            if let Some(shot) = entity.one_shot.as_mut() {
                shot.elapsed_ms += dt_ms;
                let index = shot.index;
                if shot.frame(fps) >= entity.animations.frames(index) {
                    entity.one_shot = None;
                    finished.push((id, index));
                }
            }
        }
        log::trace!(
            "tick {}: {moved} bodies moved over {dt_ms}ms",
            self.tick_index
        );

        for (entity, animation) in finished {
            out_events.push(Event::OneShotFinished { entity, animation });
            self.finish_one_shot(entity, animation, out_events);
        }
    }

    fn finish_one_shot(&mut self, id: EntityId, animation: u32, out_events: &mut Vec<Event>) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        let Some(combat) = entity.combat.as_mut() else {
            return;
        };

        if animation == combat.death_animation && combat.health <= 0 {
            let mut doomed = vec![id];
            if let Some(boss) = &entity.boss {
                doomed.extend(boss.hurt_boxes.iter().copied());
            }
            for entity in doomed {
                self.despawn(entity, out_events);
            }
        } else if animation == combat.hit_animation {
            if let Some(boss) = entity.boss.as_mut() {
                // A flinching boss stays untouchable and escapes by teleporting.
                boss.plan.action = BossAction::Teleport;
                boss.plan.phase = 0;
                out_events.push(Event::BossActionSelected {
                    boss: id,
                    action: BossAction::Teleport,
                });
            } else {
                combat.hittable = true;
                combat.hitting = true;
                let drift = entity.motion.velocity.x;
                if drift != 0.0 {
                    entity.motion.face(drift);
                }
            }
        }
    }

    fn apply_hit(&mut self, hitbox: EntityId, target: EntityId, out_events: &mut Vec<Event>) {
        let reject = |reason| Event::HitRejected {
            hitbox,
            target,
            reason,
        };

        let Some((strike, attacker_x)) = self
            .entities
            .get(&hitbox)
            .and_then(|entity| entity.hitbox.map(|strike| (strike, entity.motion.position.x)))
        else {
            out_events.push(reject(HitRejection::MissingEntity));
            return;
        };
        if !strike.active || !strike.hurts_enemies {
            out_events.push(reject(HitRejection::HitboxInactive));
            return;
        }

        let Some(victim) = self.entities.get_mut(&target) else {
            out_events.push(reject(HitRejection::MissingEntity));
            return;
        };
        let Some(combat) = victim.combat.as_mut() else {
            out_events.push(reject(HitRejection::MissingEntity));
            return;
        };
        if !combat.hittable {
            out_events.push(reject(HitRejection::TargetNotHittable));
            return;
        }

        combat.health -= strike.damage;
        combat.hittable = false;
        combat.hitting = false;
        let defeated = combat.health <= 0;
        let remaining = combat.health;
        let animation = if defeated {
            combat.death_animation
        } else {
            combat.hit_animation
        };

        let toward_attacker = attacker_x - victim.motion.position.x;
        if toward_attacker != 0.0 {
            victim.motion.face(toward_attacker);
        }
        victim.play(animation);

        out_events.push(Event::EntityDamaged {
            entity: target,
            source: hitbox,
            remaining,
        });
        if defeated {
            out_events.push(Event::EntityDefeated { entity: target });
        }
    }

    fn hurt_player(
        &mut self,
        player: EntityId,
        source: EntityId,
        lethal: bool,
        out_events: &mut Vec<Event>,
    ) {
        let invulnerability_ms = self.config.physics.invulnerability_ms;
        let Some(entity) = self.entities.get_mut(&player) else {
            return;
        };
        let dashing = entity.gravity.is_some_and(|gravity| gravity.dashing);
        let Some(state) = entity.player.as_mut() else {
            debug_assert!(false, "{player:?} has no player state");
            return;
        };
        if state.hp <= 0 {
            return;
        }

        if lethal {
            state.hp = 0;
        } else {
            if state.invulnerable_ms > 0.0 || dashing {
                return;
            }
            state.hp -= 1;
            state.invulnerable_ms = invulnerability_ms;
        }
        log::debug!("{player:?} hurt by {source:?}, {} hp left", state.hp);

        out_events.push(Event::PlayerHurt {
            player,
            remaining: state.hp,
        });
        if state.hp <= 0 {
            out_events.push(Event::PlayerDefeated { player });
        }
    }

    fn blink_pursuer(
        &mut self,
        pursuer: EntityId,
        destination: CellCoord,
        remaining: Path,
        out_events: &mut Vec<Event>,
    ) {
        let target = self.grid.grid_to_world(destination);
        let tuning = self.config.pursuit;
        let Some(entity) = self.entities.get_mut(&pursuer) else {
            return;
        };
        let Some(state) = entity.pursuer.as_mut() else {
            debug_assert!(false, "{pursuer:?} is not a pursuer");
            return;
        };

        state.blinked = !remaining.is_empty();
        state.path = remaining;
        state.timer_ms = tuning.blink_interval_ms;

        let heading = target.x - entity.motion.position.x;
        if heading != 0.0 {
            entity.motion.face(heading);
        }
        entity.motion.position = target;
        entity.play(tuning.phase_in_animation);
        out_events.push(Event::PursuerBlinked {
            pursuer,
            cell: destination,
        });
    }

    fn select_boss_action(
        &mut self,
        boss: EntityId,
        action: BossAction,
        out_events: &mut Vec<Event>,
    ) {
        let tuning = &self.config.boss;
        let reject = |reason| Event::BossActionRejected {
            boss,
            action,
            reason,
        };
        let Some(state) = self
            .entities
            .get_mut(&boss)
            .and_then(|entity| entity.boss.as_mut())
        else {
            out_events.push(reject(BossActionRejection::MissingBoss));
            return;
        };
        if action == BossAction::Idle {
            out_events.push(reject(BossActionRejection::NotActionable));
            return;
        }
        if state.plan.action != BossAction::Idle {
            out_events.push(reject(BossActionRejection::Busy));
            return;
        }
        let cooldowns = &mut state.plan.cooldowns;
        if !cooldowns.is_ready(action) || !cooldowns.is_ready(BossAction::Idle) {
            out_events.push(reject(BossActionRejection::CoolingDown));
            return;
        }

        cooldowns.set(action, tuning.cooldown(action));
        cooldowns.set(BossAction::Idle, tuning.cooldown(BossAction::Idle));
        state.plan.action = action;
        state.plan.phase = 0;
        log::debug!("{boss:?} starts {action:?}");
        out_events.push(Event::BossActionSelected { boss, action });
    }

    fn reset_boss(&mut self, boss: EntityId, interrupted: bool, out_events: &mut Vec<Event>) {
        let Some(state) = self
            .entities
            .get_mut(&boss)
            .and_then(|entity| entity.boss.as_mut())
        else {
            debug_assert!(false, "{boss:?} is not a boss");
            return;
        };
        let action = state.plan.action;
        state.plan.action = BossAction::Idle;
        state.plan.phase = 0;

        if interrupted {
            let hurt_boxes = state.hurt_boxes.clone();
            for hurt_box in hurt_boxes {
                if let Some(strike) = self
                    .entities
                    .get_mut(&hurt_box)
                    .and_then(|entity| entity.hitbox.as_mut())
                {
                    strike.active = false;
                }
            }
        }

        if action == BossAction::Idle {
            return;
        }
        out_events.push(if interrupted {
            Event::BossInterrupted { boss, action }
        } else {
            Event::BossActionCompleted { boss, action }
        });
    }

    fn entity_mut(&mut self, entity: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&entity)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

fn static_body(role: Role, rect: Rect) -> Blueprint {
    Blueprint::new(role, Motion::at(rect.center(), rect.size()), ShapeId::SPRITE)
}

fn set_axis(vector: &mut Vec2, axis: Axis, value: f32) {
    match axis {
        Axis::X => vector.x = value,
        Axis::Y => vector.y = value,
    }
}

fn axis_of(vector: Vec2, axis: Axis) -> f32 {
    match axis {
        Axis::X => vector.x,
        Axis::Y => vector.y,
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { layout } => world.load_level(layout, out_events),
        Command::RegisterShape { shape } => {
            let shape_id = ShapeId::new(u32::try_from(world.shapes.len()).unwrap_or(u32::MAX));
            world.shapes.push(shape);
            out_events.push(Event::ShapeRegistered { shape: shape_id });
        }
        Command::Spawn { blueprint } => {
            let _ = world.insert(*blueprint, out_events);
        }
        Command::Despawn { entity } => world.despawn(entity, out_events),
        Command::Tick { dt_ms } => world.tick(dt_ms, out_events),
        Command::SetDialogueActive { active } => world.dialogue_active = active,
        Command::SetVelocity { entity, velocity } => {
            if let Some(entity) = world.entity_mut(entity) {
                entity.motion.velocity = velocity;
            }
        }
        Command::PlaceEntity { entity, position } => {
            if let Some(entity) = world.entity_mut(entity) {
                entity.motion.position = position;
            }
        }
        Command::ClampAxis {
            entity,
            axis,
            value,
            stop,
        } => {
            if let Some(entity) = world.entity_mut(entity) {
                set_axis(&mut entity.motion.position, axis, value);
                if stop {
                    set_axis(&mut entity.motion.velocity, axis, 0.0);
                }
            }
        }
        Command::Reflect { entity, axis, push } => {
            if let Some(entity) = world.entity_mut(entity) {
                let motion = &mut entity.motion;
                let flipped = -axis_of(motion.velocity, axis);
                let pushed = axis_of(motion.position, axis) + push;
                set_axis(&mut motion.velocity, axis, flipped);
                set_axis(&mut motion.position, axis, pushed);
                if let Some(elastic) = entity.elastic {
                    motion.velocity *= elastic.friction;
                }
            }
        }
        Command::ApplyHit { hitbox, target } => world.apply_hit(hitbox, target, out_events),
        Command::HurtPlayer {
            player,
            source,
            lethal,
        } => world.hurt_player(player, source, lethal, out_events),
        Command::TouchCollectable {
            player,
            collectable,
        } => {
            if world.entities.contains_key(&player) && world.entities.contains_key(&collectable) {
                out_events.push(Event::CollectableTouched {
                    player,
                    collectable,
                });
            }
        }
        Command::SetHitboxActive { hitbox, active } => {
            if let Some(entity) = world.entity_mut(hitbox) {
                debug_assert!(entity.hitbox.is_some(), "{hitbox:?} has no hitbox");
                if let Some(strike) = entity.hitbox.as_mut() {
                    strike.active = active;
                }
            }
        }
        Command::SetCombatFlags {
            entity,
            hittable,
            hitting,
        } => {
            if let Some(combat) = world
                .entity_mut(entity)
                .and_then(|entity| entity.combat.as_mut())
            {
                combat.hittable = hittable;
                combat.hitting = hitting;
            }
        }
        Command::PlayOneShot { entity, animation } => {
            if let Some(entity) = world.entity_mut(entity) {
                entity.play(animation);
            }
        }
        Command::SetPursuerPath { pursuer, path } => {
            let interval = world.config.pursuit.blink_interval_ms;
            if let Some(state) = world
                .entity_mut(pursuer)
                .and_then(|entity| entity.pursuer.as_mut())
            {
                state.path = path;
                state.timer_ms = interval;
            }
        }
        Command::BlinkPursuer {
            pursuer,
            destination,
            remaining,
        } => world.blink_pursuer(pursuer, destination, remaining, out_events),
        Command::FadePursuer { pursuer } => {
            let tuning = world.config.pursuit;
            if let Some(entity) = world.entity_mut(pursuer) {
                if let Some(state) = entity.pursuer.as_mut() {
                    state.timer_ms = tuning.fade_interval_ms;
                    state.blinked = false;
                    entity.play(tuning.phase_out_animation);
                }
            }
        }
        Command::SelectBossAction { boss, action } => {
            world.select_boss_action(boss, action, out_events);
        }
        Command::SetBossPhase { boss, phase } => {
            if let Some(state) = world
                .entity_mut(boss)
                .and_then(|entity| entity.boss.as_mut())
            {
                state.plan.phase = phase;
            }
        }
        Command::CompleteBossAction { boss } => world.reset_boss(boss, false, out_events),
        Command::InterruptBoss { boss } => world.reset_boss(boss, true, out_events),
        Command::SummonMinions {
            summoner,
            kind,
            count,
        } => {
            let Some(origin) = world
                .entities
                .get(&summoner)
                .map(|entity| entity.motion.position)
            else {
                return;
            };
            if count > 0 {
                out_events.push(Event::MinionsRequested {
                    summoner,
                    kind,
                    count,
                    origin,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{GridMap, World};
    use cinderfall_core::{
        BodySnapshot, BossSnapshot, CollisionShape, Combat, EntityId, Hitbox, MinionCounts,
        MinionKind, Motion, OneShot, Platform, PlayerSnapshot, PursuerSnapshot, Role, ShapeId,
        SimulationConfig,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }

    /// Provides read-only access to the occupancy grid.
    #[must_use]
    pub fn grid(world: &World) -> &GridMap {
        &world.grid
    }

    /// Looks up a shape from the shape library.
    #[must_use]
    pub fn shape(world: &World, shape: ShapeId) -> Option<&CollisionShape> {
        usize::try_from(shape.get())
            .ok()
            .and_then(|index| world.shapes.get(index))
    }

    /// Walkable platforms of the loaded level.
    #[must_use]
    pub fn platforms(world: &World) -> &[Platform] {
        &world.platforms
    }

    /// Reports whether dialogue is on screen.
    #[must_use]
    pub fn dialogue_active(world: &World) -> bool {
        world.dialogue_active
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Number of living entities.
    #[must_use]
    pub fn entity_count(world: &World) -> usize {
        world.entities.len()
    }

    /// Captures every entity as a collision body, ordered by identifier.
    #[must_use]
    pub fn bodies(world: &World) -> Vec<BodySnapshot> {
        world
            .entities
            .iter()
            .map(|(&id, entity)| BodySnapshot {
                id,
                role: entity.role,
                motion: entity.motion,
                shape: entity.shape,
                solid: entity.solid,
                combat: entity.combat,
                hitbox: entity.hitbox,
                elastic: entity.elastic,
            })
            .collect()
    }

    /// Captures the static blocks of the level.
    #[must_use]
    pub fn blocks(world: &World) -> Vec<BodySnapshot> {
        bodies(world)
            .into_iter()
            .filter(|body| body.role == Role::Block)
            .collect()
    }

    /// Transform of an entity.
    #[must_use]
    pub fn motion(world: &World, entity: EntityId) -> Option<Motion> {
        world.entities.get(&entity).map(|entity| entity.motion)
    }

    /// Damageable state of an entity.
    #[must_use]
    pub fn combat(world: &World, entity: EntityId) -> Option<Combat> {
        world.entities.get(&entity).and_then(|entity| entity.combat)
    }

    /// Attack region of an entity.
    #[must_use]
    pub fn hitbox(world: &World, entity: EntityId) -> Option<Hitbox> {
        world.entities.get(&entity).and_then(|entity| entity.hitbox)
    }

    /// One-shot animation currently playing on an entity.
    #[must_use]
    pub fn one_shot(world: &World, entity: EntityId) -> Option<OneShot> {
        world.entities.get(&entity).and_then(|entity| entity.one_shot)
    }

    /// Captures the player, if one exists.
    #[must_use]
    pub fn player(world: &World) -> Option<PlayerSnapshot> {
        world.entities.iter().find_map(|(&id, entity)| {
            entity.player.map(|state| PlayerSnapshot {
                id,
                motion: entity.motion,
                state,
            })
        })
    }

    /// Captures every pursuer, ordered by identifier.
    #[must_use]
    pub fn pursuers(world: &World) -> Vec<PursuerSnapshot> {
        world
            .entities
            .iter()
            .filter_map(|(&id, entity)| {
                entity.pursuer.as_ref().map(|state| PursuerSnapshot {
                    id,
                    position: entity.motion.position,
                    path: state.path.clone(),
                    ready: state.timer_ms < 0.0,
                    blinked: state.blinked,
                })
            })
            .collect()
    }

    /// Captures every boss, ordered by identifier.
    #[must_use]
    pub fn bosses(world: &World) -> Vec<BossSnapshot> {
        world
            .entities
            .iter()
            .filter_map(|(&id, entity)| {
                entity.boss.as_ref().map(|state| BossSnapshot {
                    id,
                    motion: entity.motion,
                    plan: state.plan,
                    one_shot: entity.one_shot,
                    hurt_boxes: state.hurt_boxes.clone(),
                })
            })
            .collect()
    }

    /// Counts living minions per archetype.
    #[must_use]
    pub fn minion_counts(world: &World) -> MinionCounts {
        let mut counts = MinionCounts::default();
        for entity in world.entities.values() {
            match entity.minion {
                Some(MinionKind::Ghoul) => counts.ghouls += 1,
                Some(MinionKind::Spitter) => counts.spitters += 1,
                Some(MinionKind::Bullet) | None => {}
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinderfall_core::{BossCooldowns, CellState};

    fn spawn(world: &mut World, blueprint: Blueprint) -> EntityId {
        let mut events = Vec::new();
        apply(
            world,
            Command::Spawn {
                blueprint: Box::new(blueprint),
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::EntitySpawned { entity, .. }] => *entity,
            other => panic!("unexpected spawn events: {other:?}"),
        }
    }

    fn enemy(health: i32) -> Blueprint {
        let mut blueprint = Blueprint::new(
            Role::Enemy,
            Motion::at(Vec2::new(100.0, 100.0), Vec2::splat(40.0)),
            ShapeId::SPRITE,
        );
        blueprint.combat = Some(Combat {
            health,
            hittable: true,
            hitting: true,
            hit_animation: 2,
            death_animation: 3,
        });
        blueprint.animations = AnimationTable::new(vec![1, 1, 4, 6]);
        blueprint
    }

    fn sword(active: bool) -> Blueprint {
        let mut blueprint = Blueprint::new(
            Role::Hitbox,
            Motion::at(Vec2::new(140.0, 100.0), Vec2::splat(30.0)),
            ShapeId::SPRITE,
        );
        blueprint.hitbox = Some(Hitbox {
            active,
            damage: 2,
            hurts_enemies: true,
            hurts_player: false,
            consumed_on_impact: false,
            parries_shots: true,
        });
        blueprint
    }

    fn boss_blueprint(hurt_boxes: Vec<EntityId>) -> Blueprint {
        let mut blueprint = enemy(30);
        blueprint.combat = Some(Combat {
            health: 30,
            hittable: true,
            hitting: true,
            hit_animation: 11,
            death_animation: 12,
        });
        blueprint.animations = AnimationTable::new(vec![1; 13]);
        blueprint.boss_hurt_boxes = Some(hurt_boxes);
        blueprint
    }

    #[test]
    fn loading_the_arena_blocks_cells_and_spawns_blocks() {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadLevel {
                layout: LevelLayout::default(),
            },
            &mut events,
        );

        let spawned = events
            .iter()
            .filter(|event| matches!(event, Event::EntitySpawned { role: Role::Block, .. }))
            .count();
        assert_eq!(spawned, 11);
        assert_eq!(query::platforms(&world).len(), 8);
        assert!(matches!(
            events.last(),
            Some(Event::LevelLoaded { blocked_cells }) if *blocked_cells > 0
        ));
        let grid = query::grid(&world);
        assert_eq!(grid.state(CellCoord::new(12, 5)), Some(CellState::Blocked));
        assert_eq!(grid.state(CellCoord::new(12, 2)), Some(CellState::Empty));
    }

    #[test]
    fn hits_are_not_applied_twice() {
        let mut world = World::default();
        let target = spawn(&mut world, enemy(10));
        let hitbox = spawn(&mut world, sword(true));
        let mut events = Vec::new();

        apply(&mut world, Command::ApplyHit { hitbox, target }, &mut events);
        apply(&mut world, Command::ApplyHit { hitbox, target }, &mut events);

        assert_eq!(query::combat(&world, target).map(|combat| combat.health), Some(8));
        assert_eq!(
            events,
            vec![
                Event::EntityDamaged {
                    entity: target,
                    source: hitbox,
                    remaining: 8,
                },
                Event::HitRejected {
                    hitbox,
                    target,
                    reason: HitRejection::TargetNotHittable,
                },
            ]
        );
        let facing = query::motion(&world, target).map(|motion| motion.facing());
        assert_eq!(facing, Some(1.0));
    }

    #[test]
    fn inactive_hitboxes_do_not_damage() {
        let mut world = World::default();
        let target = spawn(&mut world, enemy(10));
        let hitbox = spawn(&mut world, sword(false));
        let mut events = Vec::new();

        apply(&mut world, Command::ApplyHit { hitbox, target }, &mut events);

        assert_eq!(query::combat(&world, target).map(|combat| combat.health), Some(10));
        assert!(matches!(
            events.as_slice(),
            [Event::HitRejected {
                reason: HitRejection::HitboxInactive,
                ..
            }]
        ));
    }

    #[test]
    fn hit_animation_completion_restores_hittable() {
        let mut world = World::default();
        let target = spawn(&mut world, enemy(10));
        let hitbox = spawn(&mut world, sword(true));
        let mut events = Vec::new();
        apply(&mut world, Command::ApplyHit { hitbox, target }, &mut events);
        events.clear();

        // Four frames at ten frames per second.
        apply(&mut world, Command::Tick { dt_ms: 350.0 }, &mut events);
        assert!(!query::combat(&world, target).is_some_and(|combat| combat.hittable));
        apply(&mut world, Command::Tick { dt_ms: 100.0 }, &mut events);

        assert!(events.contains(&Event::OneShotFinished {
            entity: target,
            animation: 2,
        }));
        let combat = query::combat(&world, target).expect("target alive");
        assert!(combat.hittable && combat.hitting);
        assert_eq!(query::one_shot(&world, target), None);
    }

    #[test]
    fn death_animation_completion_despawns() {
        let mut world = World::default();
        let target = spawn(&mut world, enemy(1));
        let hitbox = spawn(&mut world, sword(true));
        let mut events = Vec::new();
        apply(&mut world, Command::ApplyHit { hitbox, target }, &mut events);
        assert!(events.contains(&Event::EntityDefeated { entity: target }));

        apply(&mut world, Command::Tick { dt_ms: 600.0 }, &mut events);
        assert!(events.contains(&Event::EntityDespawned { entity: target }));
        assert_eq!(query::combat(&world, target), None);
    }

    #[test]
    fn player_invulnerability_blocks_repeat_damage() {
        let mut world = World::default();
        let mut blueprint = Blueprint::new(
            Role::Player,
            Motion::at(Vec2::new(300.0, 300.0), Vec2::splat(40.0)),
            ShapeId::SPRITE,
        );
        blueprint.player = Some(PlayerState {
            hp: 3,
            invulnerable_ms: 0.0,
            armed_melee: false,
        });
        let player = spawn(&mut world, blueprint);
        let source = spawn(&mut world, enemy(5));
        let mut events = Vec::new();

        for _ in 0..2 {
            apply(
                &mut world,
                Command::HurtPlayer {
                    player,
                    source,
                    lethal: false,
                },
                &mut events,
            );
        }
        assert_eq!(events, vec![Event::PlayerHurt { player, remaining: 2 }]);

        apply(&mut world, Command::Tick { dt_ms: 3000.0 }, &mut events);
        events.clear();
        apply(
            &mut world,
            Command::HurtPlayer {
                player,
                source,
                lethal: false,
            },
            &mut events,
        );
        assert_eq!(events, vec![Event::PlayerHurt { player, remaining: 1 }]);
    }

    #[test]
    fn boss_selection_sets_both_cooldowns() {
        let mut world = World::default();
        let boss = spawn(&mut world, boss_blueprint(Vec::new()));
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SelectBossAction {
                boss,
                action: BossAction::Swipe,
            },
            &mut events,
        );
        let plan = query::bosses(&world)[0].plan;
        assert_eq!(plan.action, BossAction::Swipe);
        assert_eq!(plan.cooldowns.get(BossAction::Swipe), 2000.0);
        assert_eq!(plan.cooldowns.get(BossAction::Idle), 5000.0);

        apply(&mut world, Command::CompleteBossAction { boss }, &mut events);
        apply(
            &mut world,
            Command::SelectBossAction {
                boss,
                action: BossAction::Swipe,
            },
            &mut events,
        );
        assert_eq!(
            events.last(),
            Some(&Event::BossActionRejected {
                boss,
                action: BossAction::Swipe,
                reason: BossActionRejection::CoolingDown,
            })
        );
    }

    #[test]
    fn boss_cooldowns_freeze_while_hurt() {
        let mut world = World::default();
        let boss = spawn(&mut world, boss_blueprint(Vec::new()));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SelectBossAction {
                boss,
                action: BossAction::Teleport,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PlayOneShot {
                entity: boss,
                animation: 11,
            },
            &mut events,
        );
        apply(&mut world, Command::Tick { dt_ms: 50.0 }, &mut events);
        let cooldowns = query::bosses(&world)[0].plan.cooldowns;
        assert_eq!(
            cooldowns,
            BossCooldowns::from_slots([12000.0, 0.0, 0.0, 0.0, 0.0, 5000.0])
        );

        // The flinch ends during this tick, so the clock only resumes after it.
        apply(&mut world, Command::Tick { dt_ms: 100.0 }, &mut events);
        apply(&mut world, Command::Tick { dt_ms: 100.0 }, &mut events);
        let cooldowns = query::bosses(&world)[0].plan.cooldowns;
        assert_eq!(cooldowns.get(BossAction::Teleport), 11900.0);
    }

    #[test]
    fn interrupting_the_boss_disarms_its_hurt_boxes() {
        let mut world = World::default();
        let blade = spawn(&mut world, sword(true));
        let boss = spawn(&mut world, boss_blueprint(vec![blade]));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SelectBossAction {
                boss,
                action: BossAction::Swipe,
            },
            &mut events,
        );
        apply(&mut world, Command::SetBossPhase { boss, phase: 1 }, &mut events);
        events.clear();

        apply(&mut world, Command::InterruptBoss { boss }, &mut events);

        assert_eq!(
            events,
            vec![Event::BossInterrupted {
                boss,
                action: BossAction::Swipe,
            }]
        );
        let plan = query::bosses(&world)[0].plan;
        assert_eq!((plan.action, plan.phase), (BossAction::Idle, 0));
        assert!(!query::hitbox(&world, blade).is_some_and(|hitbox| hitbox.active));
    }

    #[test]
    fn flinching_boss_escapes_by_teleport() {
        let mut world = World::default();
        let boss = spawn(&mut world, boss_blueprint(Vec::new()));
        let hitbox = spawn(&mut world, sword(true));
        let mut events = Vec::new();
        apply(&mut world, Command::ApplyHit { hitbox, target: boss }, &mut events);
        apply(&mut world, Command::Tick { dt_ms: 150.0 }, &mut events);

        assert!(events.contains(&Event::BossActionSelected {
            boss,
            action: BossAction::Teleport,
        }));
        let combat = query::combat(&world, boss).expect("boss alive");
        assert!(!combat.hittable && !combat.hitting);
    }

    #[test]
    fn reflect_bounces_and_applies_friction() {
        let mut world = World::default();
        let mut blueprint = Blueprint::new(
            Role::Projectile,
            Motion::at(Vec2::new(50.0, 50.0), Vec2::splat(10.0)),
            ShapeId::SPRITE,
        );
        blueprint.motion.velocity = Vec2::new(100.0, 200.0);
        blueprint.elastic = Some(Elastic {
            friction: Vec2::new(0.5, 0.25),
        });
        let grenade = spawn(&mut world, blueprint);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Reflect {
                entity: grenade,
                axis: Axis::Y,
                push: -4.0,
            },
            &mut events,
        );

        let motion = query::motion(&world, grenade).expect("grenade alive");
        assert_eq!(motion.position, Vec2::new(50.0, 46.0));
        assert_eq!(motion.velocity, Vec2::new(50.0, -50.0));
    }
}
