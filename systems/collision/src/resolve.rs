//! Role-pair dispatch turning contacts into world commands.

use cinderfall_core::{Axis, BodySnapshot, Command, Role};

/// Signature shared by every pair resolver.
///
/// The first body is always the one whose role indexes the table row.
pub type ResolverFn = fn(&BodySnapshot, &BodySnapshot, &mut Vec<Command>);

const ROLE_COUNT: usize = 9;

const fn slot(role: Role) -> usize {
    match role {
        Role::Player => 0,
        Role::Enemy => 1,
        Role::Block => 2,
        Role::Hazard => 3,
        Role::Hitbox => 4,
        Role::Projectile => 5,
        Role::EnemyShot => 6,
        Role::Collectable => 7,
        Role::Scenery => 8,
    }
}

/// Lookup table from an ordered role pair to its resolver.
///
/// The table doubles as the relevance predicate of the detector: a pair is
/// only tested when either orientation has an entry.
#[derive(Clone, Debug)]
pub struct ResolverTable {
    entries: [[Option<ResolverFn>; ROLE_COUNT]; ROLE_COUNT],
}

impl ResolverTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: [[None; ROLE_COUNT]; ROLE_COUNT],
        }
    }

    /// Registers the resolver for the ordered pair.
    pub fn register(&mut self, first: Role, second: Role, resolver: ResolverFn) {
        self.entries[slot(first)][slot(second)] = Some(resolver);
    }

    /// Resolver for the ordered pair.
    #[must_use]
    pub fn get(&self, first: Role, second: Role) -> Option<ResolverFn> {
        self.entries[slot(first)][slot(second)]
    }

    /// Reports whether either orientation of the pair is handled.
    #[must_use]
    pub fn is_relevant(&self, first: Role, second: Role) -> bool {
        self.get(first, second).is_some() || self.get(second, first).is_some()
    }
}

impl Default for ResolverTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.register(Role::Player, Role::Enemy, player_meets_enemy);
        table.register(Role::Player, Role::Hitbox, player_meets_hitbox);
        table.register(Role::Player, Role::EnemyShot, player_meets_shot);
        table.register(Role::Player, Role::Collectable, player_meets_collectable);
        table.register(Role::Hitbox, Role::Enemy, strike_enemy);
        table.register(Role::Hitbox, Role::Block, hitbox_meets_block);
        table.register(Role::Hitbox, Role::EnemyShot, hitbox_meets_shot);
        table.register(Role::Projectile, Role::Enemy, strike_enemy);
        table.register(Role::Block, Role::Player, push_out_of_block);
        table.register(Role::Block, Role::Enemy, push_out_of_block);
        table.register(Role::Block, Role::Collectable, push_out_of_block);
        table.register(Role::Block, Role::Projectile, bounce_off_block);
        table.register(Role::Block, Role::EnemyShot, destroy_second);
        table.register(Role::Hazard, Role::Player, hazard_meets_player);
        table.register(Role::Hazard, Role::EnemyShot, destroy_second);
        table.register(Role::Hazard, Role::Projectile, destroy_second);
        table.register(Role::Hazard, Role::Collectable, destroy_second);
        table.register(Role::Hazard, Role::Hitbox, hazard_meets_hitbox);
        table
    }
}

fn player_meets_enemy(player: &BodySnapshot, enemy: &BodySnapshot, out: &mut Vec<Command>) {
    if enemy.combat.is_some_and(|combat| combat.hitting) {
        out.push(Command::HurtPlayer {
            player: player.id,
            source: enemy.id,
            lethal: false,
        });
    }
}

fn player_meets_hitbox(player: &BodySnapshot, hitbox: &BodySnapshot, out: &mut Vec<Command>) {
    if hitbox
        .hitbox
        .is_some_and(|strike| strike.active && strike.hurts_player)
    {
        out.push(Command::HurtPlayer {
            player: player.id,
            source: hitbox.id,
            lethal: false,
        });
    }
}

fn player_meets_shot(player: &BodySnapshot, shot: &BodySnapshot, out: &mut Vec<Command>) {
    out.push(Command::HurtPlayer {
        player: player.id,
        source: shot.id,
        lethal: false,
    });
    out.push(Command::Despawn { entity: shot.id });
}

fn player_meets_collectable(
    player: &BodySnapshot,
    collectable: &BodySnapshot,
    out: &mut Vec<Command>,
) {
    out.push(Command::TouchCollectable {
        player: player.id,
        collectable: collectable.id,
    });
}

/// Damages a hittable enemy and consumes single-use strikes.
fn strike_enemy(striker: &BodySnapshot, enemy: &BodySnapshot, out: &mut Vec<Command>) {
    let Some(strike) = striker.hitbox else {
        return;
    };
    let hittable = enemy.combat.is_some_and(|combat| combat.hittable);
    if !(strike.active && strike.hurts_enemies && hittable) {
        return;
    }
    out.push(Command::ApplyHit {
        hitbox: striker.id,
        target: enemy.id,
    });
    if strike.consumed_on_impact {
        out.push(Command::Despawn { entity: striker.id });
    }
}

fn hitbox_meets_block(hitbox: &BodySnapshot, _block: &BodySnapshot, out: &mut Vec<Command>) {
    if hitbox.hitbox.is_some_and(|strike| strike.consumed_on_impact) {
        out.push(Command::Despawn { entity: hitbox.id });
    }
}

fn hitbox_meets_shot(hitbox: &BodySnapshot, shot: &BodySnapshot, out: &mut Vec<Command>) {
    if hitbox
        .hitbox
        .is_some_and(|strike| strike.active && strike.parries_shots)
    {
        out.push(Command::Despawn { entity: shot.id });
    }
}

/// Minimum-translation push along the shallower axis.
///
/// Vertical corrections only apply while the body moves into the block and
/// also stop its vertical velocity; horizontal corrections always apply.
fn push_out_of_block(block: &BodySnapshot, body: &BodySnapshot, out: &mut Vec<Command>) {
    if !body.solid {
        return;
    }
    let block_half = block.motion.half_extents();
    let body_half = body.motion.half_extents();
    let reach = block_half + body_half;
    let delta = body.motion.position - block.motion.position;
    let vertical_depth = reach.y - delta.y.abs();
    let horizontal_depth = reach.x - delta.x.abs();

    if vertical_depth > 0.0 && (horizontal_depth <= 0.0 || vertical_depth < horizontal_depth) {
        let falling_onto = delta.y < 0.0 && body.motion.velocity.y > 0.0;
        let rising_into = delta.y > 0.0 && body.motion.velocity.y < 0.0;
        if falling_onto || rising_into {
            out.push(Command::ClampAxis {
                entity: body.id,
                axis: Axis::Y,
                value: block.motion.position.y + reach.y * delta.y.signum(),
                stop: true,
            });
        }
    } else {
        let side = if delta.x < 0.0 { -1.0 } else { 1.0 };
        out.push(Command::ClampAxis {
            entity: body.id,
            axis: Axis::X,
            value: block.motion.position.x + reach.x * side,
            stop: false,
        });
    }
}

fn bounce_off_block(block: &BodySnapshot, body: &BodySnapshot, out: &mut Vec<Command>) {
    let reach = block.motion.half_extents() + body.motion.half_extents();
    let delta = body.motion.position - block.motion.position;
    let vertical_depth = reach.y - delta.y.abs();
    let horizontal_depth = reach.x - delta.x.abs();
    let away = |offset: f32| if offset < 0.0 { -1.0 } else { 1.0 };

    let (axis, push) = if vertical_depth < horizontal_depth {
        (Axis::Y, vertical_depth * away(delta.y))
    } else {
        (Axis::X, horizontal_depth * away(delta.x))
    };
    out.push(Command::Reflect {
        entity: body.id,
        axis,
        push,
    });
}

fn destroy_second(_first: &BodySnapshot, second: &BodySnapshot, out: &mut Vec<Command>) {
    out.push(Command::Despawn { entity: second.id });
}

fn hazard_meets_player(hazard: &BodySnapshot, player: &BodySnapshot, out: &mut Vec<Command>) {
    out.push(Command::HurtPlayer {
        player: player.id,
        source: hazard.id,
        lethal: true,
    });
}

fn hazard_meets_hitbox(hazard: &BodySnapshot, hitbox: &BodySnapshot, out: &mut Vec<Command>) {
    hitbox_meets_block(hitbox, hazard, out);
}
