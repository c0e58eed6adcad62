//! Bounded-depth discounted reward search over hypothetical boss actions.

use cinderfall_core::{BossAction, BossCooldowns, BossTuning, MinionKind, Platform, Vec2};

/// Ghoul summons share the base reward this many ways per minion.
const GHOUL_REWARD_SHARE: f32 = 7.0;
/// Spitter summons share the base reward this many ways per minion.
const SPITTER_REWARD_SHARE: f32 = 4.0;
/// Reward multiplier when an armed player is already inside melee range.
const EMERGENCY_MULTIPLIER: f32 = 1000.0;
/// Volley reward divisor when terrain blocks the shot.
const BLOCKED_SHOT_DIVISOR: f32 = 1000.0;
/// Volley reward divisor for a clear shot.
const CLEAR_SHOT_DIVISOR: f32 = 2.5;

/// Hypothetical state explored by the search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanState {
    /// Where the boss stands.
    pub boss_position: Vec2,
    /// Living ghouls.
    pub ghouls: u32,
    /// Living spitters.
    pub spitters: u32,
    /// Remaining cooldowns, copied into every branch.
    pub cooldowns: BossCooldowns,
}

/// Facts that stay fixed for the duration of one decision.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    /// Player centre.
    pub player_position: Vec2,
    /// Player carries a melee weapon.
    pub player_armed: bool,
    /// Boss body size, used for standing positions and engagement gaps.
    pub boss_scale: Vec2,
    /// Surfaces the boss can teleport onto.
    pub platforms: &'a [Platform],
}

/// Recursive utility estimator for a single decision.
///
/// `shot_blocked(from, to)` reports whether terrain blocks a straight shot.
/// The search counts every action evaluation so callers can verify the
/// horizon bounds its work.
pub struct RewardSearch<'a, F> {
    tuning: &'a BossTuning,
    scene: Scene<'a>,
    shot_blocked: F,
    evaluations: usize,
    deepest: u32,
}

impl<'a, F> RewardSearch<'a, F>
where
    F: Fn(Vec2, Vec2) -> bool,
{
    /// Prepares a search for the provided scene.
    pub fn new(tuning: &'a BossTuning, scene: Scene<'a>, shot_blocked: F) -> Self {
        Self {
            tuning,
            scene,
            shot_blocked,
            evaluations: 0,
            deepest: 0,
        }
    }

    /// Picks the ready action with the strictly greatest positive utility.
    ///
    /// Returns `None` while the idle cooldown is running, when nothing is
    /// ready, or when every utility is zero or negative.
    pub fn choose(&mut self, state: PlanState) -> Option<BossAction> {
        if !state.cooldowns.is_ready(BossAction::Idle) {
            return None;
        }

        let mut best: Option<(BossAction, f32)> = None;
        for action in BossAction::ACTIONABLE {
            if !state.cooldowns.is_ready(action) {
                continue;
            }
            let utility = self.evaluate(action, state, 0);
            log::trace!("{action:?} utility {utility:.3}");
            if utility > best.map_or(0.0, |(_, value)| value) {
                best = Some((action, utility));
            }
        }
        best.map(|(action, _)| action)
    }

    /// Highest utility among ready actions, or zero once past the horizon.
    pub fn evaluate_best(&mut self, state: PlanState, depth: u32) -> f32 {
        if depth > self.tuning.horizon {
            return 0.0;
        }
        BossAction::ACTIONABLE
            .into_iter()
            .filter(|action| state.cooldowns.is_ready(*action))
            .map(|action| self.evaluate(action, state, depth))
            .fold(0.0, f32::max)
    }

    /// Immediate reward of `action` plus the discounted best continuation.
    pub fn evaluate(&mut self, action: BossAction, state: PlanState, depth: u32) -> f32 {
        self.evaluations += 1;
        self.deepest = self.deepest.max(depth);

        let mut cooldowns = state.cooldowns;
        cooldowns.set(action, self.tuning.cooldown(action));
        cooldowns.deplete(self.tuning.cooldown(BossAction::Idle));
        let successor = PlanState { cooldowns, ..state };
        let discount = self.tuning.discount;
        let base = self.tuning.base_reward;

        match action {
            BossAction::Teleport => {
                let destinations = self.teleport_destinations(state.boss_position);
                if destinations.is_empty() {
                    return 0.0;
                }
                let total: f32 = destinations
                    .iter()
                    .map(|&destination| {
                        self.positional_reward(state.boss_position, destination)
                            + discount
                                * self.evaluate_best(
                                    PlanState {
                                        boss_position: destination,
                                        ..successor
                                    },
                                    depth + 1,
                                )
                    })
                    .sum();
                total / destinations.len() as f32
            }
            BossAction::Swipe => {
                self.swipe_reward(state.boss_position)
                    + discount * self.evaluate_best(successor, depth + 1)
            }
            BossAction::SummonGhouls => self.summon(MinionKind::Ghoul, successor, depth),
            BossAction::SummonSpitters => self.summon(MinionKind::Spitter, successor, depth),
            BossAction::SummonBullets => {
                let divisor = if (self.shot_blocked)(state.boss_position, self.scene.player_position)
                {
                    BLOCKED_SHOT_DIVISOR
                } else {
                    CLEAR_SHOT_DIVISOR
                };
                base / divisor + discount * self.evaluate_best(successor, depth + 1)
            }
            BossAction::Idle => 0.0,
        }
    }

    /// Number of action evaluations performed so far.
    #[must_use]
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Deepest depth at which an action was evaluated.
    #[must_use]
    pub fn deepest(&self) -> u32 {
        self.deepest
    }

    /// Standing positions on candidate platforms other than the current spot.
    pub fn teleport_destinations(&self, current: Vec2) -> Vec<Vec2> {
        self.tuning
            .teleport_candidates
            .iter()
            .filter_map(|&index| self.scene.platforms.get(index))
            .map(|platform| platform.standing_position(self.scene.boss_scale))
            .filter(|position| *position != current)
            .collect()
    }

    fn summon(&mut self, kind: MinionKind, successor: PlanState, depth: u32) -> f32 {
        let (existing, soft_cap, share) = match kind {
            MinionKind::Ghoul => (successor.ghouls, self.tuning.max_ghouls, GHOUL_REWARD_SHARE),
            MinionKind::Spitter => (
                successor.spitters,
                self.tuning.max_spitters,
                SPITTER_REWARD_SHARE,
            ),
            MinionKind::Bullet => return 0.0,
        };
        let range = self.tuning.spawn_range(kind);
        if range.is_empty() {
            return 0.0;
        }

        let discount = self.tuning.discount;
        let mut total = 0.0;
        let mut outcomes = 0;
        for added in range.counts() {
            let mut next = successor;
            if kind == MinionKind::Ghoul {
                next.ghouls += added;
            } else {
                next.spitters += added;
            }
            total += self.summon_reward(existing, added, soft_cap, share)
                + discount * self.evaluate_best(next, depth + 1);
            outcomes += 1;
        }
        total / outcomes as f32
    }

    fn summon_reward(&self, existing: u32, added: u32, soft_cap: u32, share: f32) -> f32 {
        let saturation = saturation(existing as f32 / soft_cap.max(1) as f32);
        self.tuning.base_reward / share * added as f32 * (1.0 - saturation)
    }

    fn swipe_reward(&self, boss_position: Vec2) -> f32 {
        let base = self.tuning.base_reward;
        let falloff = self.tuning.swipe_falloff;
        let per_unit = base.powf(1.0 / falloff);
        let band = self.tuning.swipe_band;
        let gap = (boss_position - self.scene.player_position).abs();
        let penalty = |gap: f32, band: f32| per_unit.powf(gap.min(band + falloff) - band);
        base - penalty(gap.x, band.x) - penalty(gap.y, band.y)
    }

    /// Reward for moving the boss from `from` to `to` relative to the player.
    fn positional_reward(&self, from: Vec2, to: Vec2) -> f32 {
        let base = self.tuning.base_reward;
        let range = self.tuning.engagement_range;
        let step = self.tuning.engagement_step;
        let before = self.engagement_gap(from);
        let after = self.engagement_gap(to);

        if self.scene.player_armed {
            if before < self.tuning.melee_danger_range {
                return base * EMERGENCY_MULTIPLIER;
            }
            base * (1.0 - saturation(before / range)) * ((after - before) / step).clamp(-1.0, 1.0)
        } else {
            base * (1.0 - saturation(after / range)) * ((before - after) / step).clamp(-1.0, 1.0)
        }
    }

    /// Distance from the player to the edge of the boss's box.
    fn engagement_gap(&self, boss_position: Vec2) -> f32 {
        let half = self.scene.boss_scale.abs() / 2.0;
        ((boss_position - self.scene.player_position).abs() - half)
            .max(Vec2::ZERO)
            .length()
    }
}

/// `2^x - 1` capped at one.
fn saturation(ratio: f32) -> f32 {
    (2.0_f32.powf(ratio) - 1.0).min(1.0)
}
