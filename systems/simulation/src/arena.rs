//! Default boss arena: level geometry plus the cast that fights in it.

use cinderfall_core::{
    AnimationTable, Blueprint, CellCoord, Combat, Command, EntityId, Gravity, Hitbox,
    LevelLayout, MinionKind, Motion, PlayerState, Role, ShapeId, Vec2,
};
use cinderfall_world::query;

use crate::Simulation;

const PLAYER_SIZE: Vec2 = Vec2::new(40.0, 60.0);
const BOSS_SIZE: Vec2 = Vec2::new(120.0, 160.0);
const HURT_BOX_SIZE: Vec2 = Vec2::new(200.0, 40.0);
const GHOUL_SIZE: Vec2 = Vec2::new(40.0, 50.0);
const PURSUER_SIZE: Vec2 = Vec2::new(40.0, 40.0);
const PURSUER_CELLS: [CellCoord; 2] = [CellCoord::new(5, 11), CellCoord::new(18, 11)];

/// Frame counts per one-shot row of the boss sheet.
const BOSS_FRAMES: [u32; 13] = [1, 5, 1, 1, 1, 1, 6, 1, 4, 4, 3, 3, 6];
/// Frame counts for ordinary enemies: idle, phase in, hit, death, phase out.
const MINION_FRAMES: [u32; 5] = [1, 4, 2, 6, 4];

/// Identifiers of the entities created by [`Simulation::populate_arena`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Roster {
    /// Player character.
    pub player: EntityId,
    /// Boss.
    pub boss: EntityId,
    /// The boss's two swipe hitboxes.
    pub hurt_boxes: [EntityId; 2],
    /// Blinking pursuers.
    pub pursuers: Vec<EntityId>,
    /// Ghouls resting on the side ledges.
    pub ghouls: Vec<EntityId>,
}

impl Simulation {
    /// Loads the default level and spawns the player, the boss and its minions.
    ///
    /// Returns `None` if the world refused any of the spawns.
    pub fn populate_arena(&mut self) -> Option<Roster> {
        let layout = LevelLayout::default();
        let boss_start = layout.platforms.get(1)?.standing_position(BOSS_SIZE);
        let player_start = layout.platforms.get(7)?.standing_position(PLAYER_SIZE);
        let ledges = [
            layout.platforms.first()?.standing_position(GHOUL_SIZE),
            layout.platforms.get(2)?.standing_position(GHOUL_SIZE),
        ];
        self.apply(Command::LoadLevel { layout });

        let player = self.spawn(player_blueprint(player_start))?;
        let hurt_boxes = [
            self.spawn(hurt_box_blueprint(boss_start))?,
            self.spawn(hurt_box_blueprint(boss_start))?,
        ];
        let boss = self.spawn(boss_blueprint(boss_start, hurt_boxes))?;

        let grid = query::grid(&self.world).clone();
        let pursuers = PURSUER_CELLS
            .iter()
            .map(|&cell| self.spawn(pursuer_blueprint(grid.grid_to_world(cell))))
            .collect::<Option<Vec<_>>>()?;
        let ghouls = ledges
            .iter()
            .map(|&position| self.spawn(ghoul_blueprint(position)))
            .collect::<Option<Vec<_>>>()?;

        log::debug!(
            "arena populated: player {player:?}, boss {boss:?}, {} pursuers, {} ghouls",
            pursuers.len(),
            ghouls.len()
        );
        Some(Roster {
            player,
            boss,
            hurt_boxes,
            pursuers,
            ghouls,
        })
    }
}

fn player_blueprint(position: Vec2) -> Blueprint {
    let mut blueprint = Blueprint::new(
        Role::Player,
        Motion::at(position, PLAYER_SIZE),
        ShapeId::SPRITE,
    );
    blueprint.solid = true;
    blueprint.gravity = Some(Gravity::default());
    blueprint.player = Some(PlayerState {
        hp: 5,
        invulnerable_ms: 0.0,
        armed_melee: true,
    });
    blueprint
}

fn hurt_box_blueprint(position: Vec2) -> Blueprint {
    let mut blueprint = Blueprint::new(
        Role::Hitbox,
        Motion::at(position, HURT_BOX_SIZE),
        ShapeId::SPRITE,
    );
    blueprint.hitbox = Some(Hitbox {
        active: false,
        damage: 1,
        hurts_enemies: false,
        hurts_player: true,
        consumed_on_impact: false,
        parries_shots: false,
    });
    blueprint
}

fn boss_blueprint(position: Vec2, hurt_boxes: [EntityId; 2]) -> Blueprint {
    let mut blueprint = Blueprint::new(Role::Enemy, Motion::at(position, BOSS_SIZE), ShapeId::SPRITE);
    blueprint.combat = Some(Combat {
        health: 30,
        hittable: true,
        hitting: true,
        hit_animation: 11,
        death_animation: 12,
    });
    blueprint.boss_hurt_boxes = Some(hurt_boxes.to_vec());
    blueprint.animations = AnimationTable::new(BOSS_FRAMES.to_vec());
    blueprint
}

fn pursuer_blueprint(position: Vec2) -> Blueprint {
    let mut blueprint = Blueprint::new(
        Role::Enemy,
        Motion::at(position, PURSUER_SIZE),
        ShapeId::SPRITE,
    );
    blueprint.pursuer = true;
    blueprint.combat = Some(Combat {
        health: 3,
        hittable: true,
        hitting: true,
        hit_animation: 2,
        death_animation: 3,
    });
    blueprint.animations = AnimationTable::new(MINION_FRAMES.to_vec());
    blueprint
}

fn ghoul_blueprint(position: Vec2) -> Blueprint {
    let mut blueprint = Blueprint::new(Role::Enemy, Motion::at(position, GHOUL_SIZE), ShapeId::SPRITE);
    blueprint.solid = true;
    blueprint.gravity = Some(Gravity::default());
    blueprint.minion = Some(MinionKind::Ghoul);
    blueprint.combat = Some(Combat {
        health: 5,
        hittable: true,
        hitting: true,
        hit_animation: 2,
        death_animation: 3,
    });
    blueprint.animations = AnimationTable::new(MINION_FRAMES.to_vec());
    blueprint
}
