#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Boss decision making for Cinderfall.
//!
//! While idle the boss runs a bounded-depth discounted reward search over its
//! ready actions and asks the world to commit to the best one. Each committed
//! action then advances through numbered phases, each gated on the boss's
//! one-shot animation finishing. A hurt or death animation preempts whatever
//! is running.

mod search;

pub use search::{PlanState, RewardSearch, Scene};

use cinderfall_core::{
    BossAction, BossSnapshot, BossTuning, Command, EntityId, MinionCounts, MinionKind, Platform,
    PlayerSnapshot, SimulationConfig, Vec2,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Pure system that plans and executes boss actions.
#[derive(Debug)]
pub struct UtilityPlanner {
    tuning: BossTuning,
    animation_fps: f32,
    rng: ChaCha8Rng,
}

impl UtilityPlanner {
    /// Creates a planner using the boss tuning and seed of the provided configuration.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            tuning: config.boss.clone(),
            animation_fps: config.physics.animation_fps,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Tuning the planner was built with.
    #[must_use]
    pub fn tuning(&self) -> &BossTuning {
        &self.tuning
    }

    /// Emits the commands that advance every boss by one planning step.
    ///
    /// `shot_blocked(from, to)` must report whether static terrain blocks the
    /// straight line between the two points. Without a player the bosses
    /// finish their running actions but do not pick new ones.
    pub fn handle<F>(
        &mut self,
        bosses: &[BossSnapshot],
        player: Option<&PlayerSnapshot>,
        minions: MinionCounts,
        platforms: &[Platform],
        shot_blocked: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(Vec2, Vec2) -> bool,
    {
        for boss in bosses {
            let animation = boss.one_shot.map(|one_shot| one_shot.index);
            if animation.is_some_and(|index| self.tuning.animations.interrupts(index)) {
                if boss.plan.action != BossAction::Idle || boss.plan.phase != 0 {
                    out.push(Command::InterruptBoss { boss: boss.id });
                }
                continue;
            }

            match boss.plan.action {
                BossAction::Idle => {
                    if let Some(player) = player {
                        self.decide(boss, player, minions, platforms, &shot_blocked, out);
                    }
                }
                BossAction::Teleport => self.teleport(boss, platforms, out),
                BossAction::Swipe => self.swipe(boss, out),
                BossAction::SummonGhouls => self.summon(boss, MinionKind::Ghoul, out),
                BossAction::SummonSpitters => self.summon(boss, MinionKind::Spitter, out),
                BossAction::SummonBullets => self.summon(boss, MinionKind::Bullet, out),
            }
        }
    }

    fn decide<F>(
        &self,
        boss: &BossSnapshot,
        player: &PlayerSnapshot,
        minions: MinionCounts,
        platforms: &[Platform],
        shot_blocked: &F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(Vec2, Vec2) -> bool,
    {
        if !boss.plan.cooldowns.is_ready(BossAction::Idle) {
            return;
        }
        let scene = Scene {
            player_position: player.motion.position,
            player_armed: player.state.armed_melee,
            boss_scale: boss.motion.scale,
            platforms,
        };
        let mut search = RewardSearch::new(&self.tuning, scene, shot_blocked);
        let choice = search.choose(PlanState {
            boss_position: boss.motion.position,
            ghouls: minions.ghouls,
            spitters: minions.spitters,
            cooldowns: boss.plan.cooldowns,
        });
        log::debug!(
            "boss {:?} chose {choice:?} after {} evaluations",
            boss.id,
            search.evaluations()
        );
        if let Some(action) = choice {
            out.push(Command::SelectBossAction {
                boss: boss.id,
                action,
            });
        }
    }

    fn teleport(&mut self, boss: &BossSnapshot, platforms: &[Platform], out: &mut Vec<Command>) {
        let animations = self.tuning.animations;
        let finished = boss.one_shot.is_none();
        match boss.plan.phase {
            0 => {
                out.push(Command::SetCombatFlags {
                    entity: boss.id,
                    hittable: false,
                    hitting: false,
                });
                out.push(Command::PlayOneShot {
                    entity: boss.id,
                    animation: animations.phase_out,
                });
                out.push(set_phase(boss, 1));
            }
            1 if finished => {
                let destinations: Vec<Vec2> = self
                    .tuning
                    .teleport_candidates
                    .iter()
                    .filter_map(|&index| platforms.get(index))
                    .map(|platform| platform.standing_position(boss.motion.scale))
                    .filter(|position| *position != boss.motion.position)
                    .collect();
                if !destinations.is_empty() {
                    let position = destinations[self.rng.gen_range(0..destinations.len())];
                    out.push(Command::PlaceEntity {
                        entity: boss.id,
                        position,
                    });
                }
                out.push(set_phase(boss, 2));
            }
            2 => {
                out.push(Command::SetCombatFlags {
                    entity: boss.id,
                    hittable: true,
                    hitting: false,
                });
                out.push(Command::PlayOneShot {
                    entity: boss.id,
                    animation: animations.phase_in,
                });
                out.push(set_phase(boss, 3));
            }
            3 if finished => {
                out.push(Command::SetCombatFlags {
                    entity: boss.id,
                    hittable: true,
                    hitting: true,
                });
                out.push(Command::CompleteBossAction { boss: boss.id });
            }
            _ => {}
        }
    }

    fn swipe(&self, boss: &BossSnapshot, out: &mut Vec<Command>) {
        let animations = self.tuning.animations;
        let [first, second] = self.tuning.swipe_offsets;
        let hurt_boxes = &boss.hurt_boxes[..boss.hurt_boxes.len().min(2)];
        match (boss.plan.phase, boss.one_shot) {
            (0, _) => {
                out.push(Command::PlayOneShot {
                    entity: boss.id,
                    animation: animations.swipe,
                });
                for (&hurt_box, offset) in hurt_boxes.iter().zip([first, second]) {
                    out.push(Command::PlaceEntity {
                        entity: hurt_box,
                        position: boss.motion.position + offset,
                    });
                }
                out.push(set_phase(boss, 1));
            }
            (1, Some(one_shot)) => {
                let frame = one_shot.frame(self.animation_fps);
                let live = self.tuning.swipe_frames.iter().position(|&live| live == frame);
                match live {
                    Some(slot) => {
                        if let Some(&hurt_box) = hurt_boxes.get(slot) {
                            out.push(Command::SetHitboxActive {
                                hitbox: hurt_box,
                                active: true,
                            });
                        }
                    }
                    None => disarm(hurt_boxes, out),
                }
            }
            (1, None) => {
                disarm(hurt_boxes, out);
                out.push(Command::PlayOneShot {
                    entity: boss.id,
                    animation: animations.stand_up,
                });
                out.push(set_phase(boss, 2));
            }
            (2, None) => out.push(Command::CompleteBossAction { boss: boss.id }),
            _ => {}
        }
    }

    fn summon(&mut self, boss: &BossSnapshot, kind: MinionKind, out: &mut Vec<Command>) {
        let animations = self.tuning.animations;
        let finished = boss.one_shot.is_none();
        match boss.plan.phase {
            0 => {
                out.push(Command::PlayOneShot {
                    entity: boss.id,
                    animation: animations.summon,
                });
                out.push(set_phase(boss, 1));
            }
            1 if finished => {
                out.push(Command::PlayOneShot {
                    entity: boss.id,
                    animation: animations.stand_up,
                });
                let range = self.tuning.spawn_range(kind);
                if !range.is_empty() {
                    out.push(Command::SummonMinions {
                        summoner: boss.id,
                        kind,
                        count: self.rng.gen_range(range.min..=range.max),
                    });
                }
                out.push(set_phase(boss, 2));
            }
            2 if finished => out.push(Command::CompleteBossAction { boss: boss.id }),
            _ => {}
        }
    }
}

fn set_phase(boss: &BossSnapshot, phase: u32) -> Command {
    Command::SetBossPhase {
        boss: boss.id,
        phase,
    }
}

fn disarm(hurt_boxes: &[EntityId], out: &mut Vec<Command>) {
    for &hurt_box in hurt_boxes {
        out.push(Command::SetHitboxActive {
            hitbox: hurt_box,
            active: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinderfall_core::{BossCooldowns, BossPlan, Motion, OneShot, PlayerState};

    fn boss(action: BossAction, phase: u32, one_shot: Option<OneShot>) -> BossSnapshot {
        BossSnapshot {
            id: EntityId::new(3),
            motion: Motion::at(Vec2::new(600.0, 120.0), Vec2::new(120.0, 160.0)),
            plan: BossPlan {
                action,
                phase,
                cooldowns: BossCooldowns::default(),
            },
            one_shot,
            hurt_boxes: vec![EntityId::new(4), EntityId::new(5)],
        }
    }

    fn player(position: Vec2) -> PlayerSnapshot {
        PlayerSnapshot {
            id: EntityId::new(1),
            motion: Motion::at(position, Vec2::splat(40.0)),
            state: PlayerState {
                hp: 5,
                invulnerable_ms: 0.0,
                armed_melee: false,
            },
        }
    }

    fn playing(index: u32, elapsed_ms: f32) -> Option<OneShot> {
        Some(OneShot { index, elapsed_ms })
    }

    fn run(planner: &mut UtilityPlanner, snapshot: &BossSnapshot) -> Vec<Command> {
        let mut out = Vec::new();
        let platforms = cinderfall_core::LevelLayout::default().platforms;
        planner.handle(
            std::slice::from_ref(snapshot),
            Some(&player(Vec2::new(100.0, 700.0))),
            MinionCounts::default(),
            &platforms,
            |_, _| false,
            &mut out,
        );
        out
    }

    #[test]
    fn hurt_animation_interrupts_running_actions() {
        let mut planner = UtilityPlanner::new(&SimulationConfig::default());
        let out = run(&mut planner, &boss(BossAction::Swipe, 1, playing(11, 0.0)));
        assert_eq!(
            out,
            vec![Command::InterruptBoss {
                boss: EntityId::new(3)
            }]
        );
    }

    #[test]
    fn idle_boss_in_hurt_animation_stays_quiet() {
        let mut planner = UtilityPlanner::new(&SimulationConfig::default());
        assert!(run(&mut planner, &boss(BossAction::Idle, 0, playing(12, 0.0))).is_empty());
    }

    #[test]
    fn idle_boss_selects_an_action_once_ready() {
        let mut planner = UtilityPlanner::new(&SimulationConfig::default());
        let out = run(&mut planner, &boss(BossAction::Idle, 0, None));
        assert!(matches!(
            out.as_slice(),
            [Command::SelectBossAction { .. }]
        ));

        let mut resting = boss(BossAction::Idle, 0, None);
        resting.plan.cooldowns.set(BossAction::Idle, 10.0);
        assert!(run(&mut planner, &resting).is_empty());
    }

    #[test]
    fn swipe_arms_hurt_boxes_on_live_frames_only() {
        let mut planner = UtilityPlanner::new(&SimulationConfig::default());

        let start = run(&mut planner, &boss(BossAction::Swipe, 0, None));
        assert!(start.contains(&Command::PlaceEntity {
            entity: EntityId::new(4),
            position: Vec2::new(600.0, 175.0),
        }));
        assert!(start.contains(&Command::SetBossPhase {
            boss: EntityId::new(3),
            phase: 1,
        }));

        let first_frame = run(&mut planner, &boss(BossAction::Swipe, 1, playing(1, 120.0)));
        assert_eq!(
            first_frame,
            vec![Command::SetHitboxActive {
                hitbox: EntityId::new(4),
                active: true,
            }]
        );
        let third_frame = run(&mut planner, &boss(BossAction::Swipe, 1, playing(1, 310.0)));
        assert_eq!(
            third_frame,
            vec![Command::SetHitboxActive {
                hitbox: EntityId::new(5),
                active: true,
            }]
        );
        let between = run(&mut planner, &boss(BossAction::Swipe, 1, playing(1, 250.0)));
        assert_eq!(between.len(), 2);
        assert!(between
            .iter()
            .all(|command| matches!(command, Command::SetHitboxActive { active: false, .. })));
    }

    #[test]
    fn phases_wait_for_the_running_animation() {
        let mut planner = UtilityPlanner::new(&SimulationConfig::default());
        assert!(run(&mut planner, &boss(BossAction::Teleport, 1, playing(8, 50.0))).is_empty());
        assert!(run(&mut planner, &boss(BossAction::SummonGhouls, 2, playing(10, 0.0))).is_empty());
        assert_eq!(
            run(&mut planner, &boss(BossAction::SummonGhouls, 2, None)),
            vec![Command::CompleteBossAction {
                boss: EntityId::new(3)
            }]
        );
    }

    #[test]
    fn summons_request_counts_inside_the_range() {
        let mut planner = UtilityPlanner::new(&SimulationConfig::default());
        for _ in 0..20 {
            let out = run(&mut planner, &boss(BossAction::SummonBullets, 1, None));
            let count = out
                .iter()
                .find_map(|command| match command {
                    Command::SummonMinions { kind, count, .. } => {
                        assert_eq!(*kind, MinionKind::Bullet);
                        Some(*count)
                    }
                    _ => None,
                })
                .expect("summon requested");
            assert!((10..=15).contains(&count), "{count}");
        }
    }

    #[test]
    fn teleport_never_lands_on_the_current_platform() {
        let platforms = cinderfall_core::LevelLayout::default().platforms;
        let mut planner = UtilityPlanner::new(&SimulationConfig::default());
        let mut snapshot = boss(BossAction::Teleport, 1, None);
        snapshot.motion.position = platforms[1].standing_position(snapshot.motion.scale);

        for _ in 0..20 {
            let out = run(&mut planner, &snapshot);
            let position = out
                .iter()
                .find_map(|command| match command {
                    Command::PlaceEntity { position, .. } => Some(*position),
                    _ => None,
                })
                .expect("destination chosen");
            assert_ne!(position, snapshot.motion.position);
        }
    }
}
