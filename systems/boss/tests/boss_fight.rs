use cinderfall_core::{
    AnimationTable, Blueprint, BossAction, BossActionRejection, Combat, Command, EntityId, Event,
    Hitbox, LevelLayout, Motion, PlayerState, Role, ShapeId, SimulationConfig, Vec2,
};
use cinderfall_system_boss::{PlanState, RewardSearch, Scene, UtilityPlanner};
use cinderfall_system_collision::segment_blocked;
use cinderfall_world::{self as world, query, World};

const TICK_MS: f32 = 16.0;
const BOSS_SCALE: Vec2 = Vec2::new(120.0, 160.0);

struct Arena {
    world: World,
    planner: UtilityPlanner,
    boss: EntityId,
    hurt_boxes: [EntityId; 2],
}

fn spawn(world: &mut World, blueprint: Blueprint) -> EntityId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Spawn {
            blueprint: Box::new(blueprint),
        },
        &mut events,
    );
    events
        .iter()
        .find_map(|event| match event {
            Event::EntitySpawned { entity, .. } => Some(*entity),
            _ => None,
        })
        .expect("entity spawned")
}

fn hurt_box(world: &mut World, position: Vec2) -> EntityId {
    let mut blueprint = Blueprint::new(
        Role::Hitbox,
        Motion::at(position, Vec2::new(200.0, 40.0)),
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
    spawn(world, blueprint)
}

fn arena(player_offset: Vec2) -> Arena {
    let config = SimulationConfig::default();
    let mut world = World::new(config.clone());
    let mut events = Vec::new();
    let layout = LevelLayout::default();
    let start = layout.platforms[1].standing_position(BOSS_SCALE);
    world::apply(&mut world, Command::LoadLevel { layout }, &mut events);

    let hurt_boxes = [hurt_box(&mut world, start), hurt_box(&mut world, start)];
    let mut boss = Blueprint::new(Role::Enemy, Motion::at(start, BOSS_SCALE), ShapeId::SPRITE);
    boss.combat = Some(Combat {
        health: 30,
        hittable: true,
        hitting: true,
        hit_animation: 11,
        death_animation: 12,
    });
    boss.boss_hurt_boxes = Some(hurt_boxes.to_vec());
    boss.animations = AnimationTable::new(vec![1, 5, 1, 1, 1, 1, 6, 1, 4, 4, 3, 3, 6]);
    let boss = spawn(&mut world, boss);

    let mut player = Blueprint::new(
        Role::Player,
        Motion::at(start + player_offset, Vec2::splat(40.0)),
        ShapeId::SPRITE,
    );
    player.player = Some(PlayerState {
        hp: 5,
        invulnerable_ms: 0.0,
        armed_melee: false,
    });
    let _ = spawn(&mut world, player);

    Arena {
        world,
        planner: UtilityPlanner::new(&config),
        boss,
        hurt_boxes,
    }
}

fn step(arena: &mut Arena, events: &mut Vec<Event>) {
    world::apply(&mut arena.world, Command::Tick { dt_ms: TICK_MS }, events);

    let mut commands = Vec::new();
    {
        let view = &arena.world;
        let blocks = query::blocks(view);
        let player = query::player(view);
        arena.planner.handle(
            &query::bosses(view),
            player.as_ref(),
            query::minion_counts(view),
            query::platforms(view),
            |from, to| segment_blocked(from, to, &blocks, move |shape| query::shape(view, shape)),
            &mut commands,
        );
    }
    for command in commands {
        world::apply(&mut arena.world, command, events);
    }
}

fn first_selection(arena: &mut Arena) -> BossAction {
    let mut events = Vec::new();
    for _ in 0..10 {
        step(arena, &mut events);
        if let Some(action) = events.iter().find_map(|event| match event {
            Event::BossActionSelected { action, .. } => Some(*action),
            _ => None,
        }) {
            return action;
        }
    }
    panic!("boss never chose an action: {events:?}");
}

fn utilities(arena: &Arena, horizon: u32) -> Vec<(BossAction, f32)> {
    let view = &arena.world;
    let mut tuning = arena.planner.tuning().clone();
    tuning.horizon = horizon;
    let boss = query::bosses(view)[0].clone();
    let player = query::player(view).expect("player spawned");
    let minions = query::minion_counts(view);
    let blocks = query::blocks(view);
    let scene = Scene {
        player_position: player.motion.position,
        player_armed: player.state.armed_melee,
        boss_scale: boss.motion.scale,
        platforms: query::platforms(view),
    };
    let mut search = RewardSearch::new(&tuning, scene, |from, to| {
        segment_blocked(from, to, &blocks, move |shape| query::shape(view, shape))
    });
    let state = PlanState {
        boss_position: boss.motion.position,
        ghouls: minions.ghouls,
        spitters: minions.spitters,
        cooldowns: boss.plan.cooldowns,
    };
    BossAction::ACTIONABLE
        .into_iter()
        .map(|action| (action, search.evaluate(action, state, 0)))
        .collect()
}

#[test]
fn distant_player_is_not_swiped_at() {
    let mut arena = arena(Vec2::new(5000.0, 0.0));
    let horizon = arena.planner.tuning().horizon;

    let immediate = utilities(&arena, 0);
    let swipe_now = immediate[BossAction::Swipe.slot()].1;
    assert!(swipe_now.abs() < 1.0e-3, "{swipe_now}");

    let full = utilities(&arena, horizon);
    let (best, best_utility) = full
        .iter()
        .copied()
        .fold((BossAction::Idle, 0.0), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        });
    // With no minions around, spitters pay the most.
    assert_eq!(best, BossAction::SummonSpitters, "{full:?}");
    assert!(full[BossAction::Swipe.slot()].1 < best_utility, "{full:?}");

    assert_eq!(first_selection(&mut arena), best);
}

#[test]
fn adjacent_player_gets_swiped_and_the_boss_recovers() {
    let mut arena = arena(Vec2::new(100.0, 0.0));
    assert_eq!(first_selection(&mut arena), BossAction::Swipe);

    let mut events = Vec::new();
    let mut armed = [false, false];
    let mut completed = false;
    for _ in 0..120 {
        step(&mut arena, &mut events);
        for (slot, hurt_box) in arena.hurt_boxes.iter().enumerate() {
            let hitbox = query::hitbox(&arena.world, *hurt_box).expect("hurt box");
            armed[slot] |= hitbox.active;
        }
        if events.iter().any(|event| {
            matches!(
                event,
                Event::BossActionCompleted {
                    action: BossAction::Swipe,
                    ..
                }
            )
        }) {
            completed = true;
            break;
        }
    }

    assert!(completed, "swipe never completed: {events:?}");
    assert_eq!(armed, [true, true]);
    for hurt_box in arena.hurt_boxes {
        assert!(!query::hitbox(&arena.world, hurt_box).expect("hurt box").active);
    }
}

#[test]
fn selections_respect_cooldowns_over_a_long_fight() {
    let mut arena = arena(Vec2::new(-350.0, 320.0));
    let tuning = arena.planner.tuning().clone();
    let mut selections = 0;

    for _ in 0..4000 {
        let mut events = Vec::new();
        step(&mut arena, &mut events);
        for event in &events {
            match event {
                Event::BossActionSelected { action, .. } => {
                    selections += 1;
                    let plan = query::bosses(&arena.world)[0].plan;
                    assert_eq!(plan.cooldowns.get(*action), tuning.cooldown(*action));
                    assert_eq!(
                        plan.cooldowns.get(BossAction::Idle),
                        tuning.cooldown(BossAction::Idle)
                    );
                }
                Event::BossActionRejected { reason, .. } => {
                    assert_ne!(*reason, BossActionRejection::CoolingDown);
                }
                _ => {}
            }
        }
    }

    // One decision at most every idle cooldown plus animation time.
    let elapsed_ms = 4000.0 * TICK_MS;
    assert!(selections >= 2, "{selections}");
    assert!(selections as f32 <= elapsed_ms / tuning.cooldown(BossAction::Idle) + 1.0);
    assert!(query::motion(&arena.world, arena.boss).is_some());
}

#[test]
fn rejected_selection_leaves_the_plan_untouched() {
    let mut arena = arena(Vec2::new(100.0, 0.0));
    let action = first_selection(&mut arena);
    let before = query::bosses(&arena.world)[0].plan;

    let mut events = Vec::new();
    world::apply(
        &mut arena.world,
        Command::SelectBossAction {
            boss: arena.boss,
            action,
        },
        &mut events,
    );

    assert!(matches!(
        events.as_slice(),
        [Event::BossActionRejected {
            reason: BossActionRejection::Busy,
            ..
        }]
    ));
    assert_eq!(query::bosses(&arena.world)[0].plan, before);
}
