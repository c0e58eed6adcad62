#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-order tick driver for Cinderfall.
//!
//! A tick integrates motion, detects and resolves collisions, advances the
//! blinking pursuers and finally lets the boss plan. Every system reads a
//! fresh snapshot and only ever touches the world through commands, so a
//! tick is fully deterministic for a given seed and command history.

mod arena;

pub use arena::Roster;

use cinderfall_core::{Blueprint, Command, EntityId, Event, SimulationConfig};
use cinderfall_system_boss::UtilityPlanner;
use cinderfall_system_collision::{segment_blocked, Collision, CollisionEvent};
use cinderfall_system_pursuit::Pursuit;
use cinderfall_world::{self as world, query, World};

/// Owns the world and every system that drives it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    collision: Collision,
    pursuit: Pursuit,
    planner: UtilityPlanner,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates an empty simulation. Call [`Simulation::populate_arena`] or
    /// issue commands to build a level.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        let planner = UtilityPlanner::new(&config);
        Self {
            world: World::new(config),
            collision: Collision::default(),
            pursuit: Pursuit::default(),
            planner,
            events: Vec::new(),
        }
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Applies a command on behalf of an external collaborator.
    pub fn apply(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.events);
    }

    /// Spawns an entity and returns its identifier.
    ///
    /// Returns `None` when the world refused the blueprint.
    pub fn spawn(&mut self, blueprint: Blueprint) -> Option<EntityId> {
        let first_new = self.events.len();
        self.apply(Command::Spawn {
            blueprint: Box::new(blueprint),
        });
        self.events[first_new..].iter().find_map(|event| match event {
            Event::EntitySpawned { entity, .. } => Some(*entity),
            _ => None,
        })
    }

    /// Advances time, then detects and resolves contacts against one snapshot.
    pub fn step_physics(&mut self, dt_ms: f32) -> Vec<CollisionEvent> {
        self.apply(Command::Tick { dt_ms });

        let mut commands = Vec::new();
        let contacts = {
            let view = &self.world;
            let bodies = query::bodies(view);
            self.collision
                .handle(&bodies, move |shape| query::shape(view, shape), &mut commands)
        };
        for command in commands {
            self.apply(command);
        }
        contacts
    }

    /// Lets every ready pursuer blink or fade.
    pub fn step_pathfinding(&mut self) {
        let mut commands = Vec::new();
        let player = query::player(&self.world);
        self.pursuit.handle(
            &query::pursuers(&self.world),
            player.as_ref(),
            query::grid(&self.world),
            &mut commands,
        );
        for command in commands {
            self.apply(command);
        }
    }

    /// Lets every boss interrupt, advance its running action or plan a new one.
    pub fn step_boss_planner(&mut self) {
        let mut commands = Vec::new();
        {
            let view = &self.world;
            let blocks = query::blocks(view);
            let player = query::player(view);
            self.planner.handle(
                &query::bosses(view),
                player.as_ref(),
                query::minion_counts(view),
                query::platforms(view),
                |from, to| segment_blocked(from, to, &blocks, move |shape| query::shape(view, shape)),
                &mut commands,
            );
        }
        for command in commands {
            self.apply(command);
        }
    }

    /// Runs one full tick in the fixed order.
    pub fn step(&mut self, dt_ms: f32) -> Vec<CollisionEvent> {
        let contacts = self.step_physics(dt_ms);
        self.step_pathfinding();
        self.step_boss_planner();
        contacts
    }

    /// Events broadcast since the last drain.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Removes and returns every event broadcast since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinderfall_core::{Motion, Role, ShapeId, Vec2};

    #[test]
    fn spawn_reports_the_new_identifier() {
        let mut simulation = Simulation::new(SimulationConfig::default());
        let first = simulation.spawn(Blueprint::new(
            Role::Scenery,
            Motion::at(Vec2::ZERO, Vec2::ONE),
            ShapeId::SPRITE,
        ));
        let second = simulation.spawn(Blueprint::new(
            Role::Scenery,
            Motion::at(Vec2::ONE, Vec2::ONE),
            ShapeId::SPRITE,
        ));

        assert!(first.is_some());
        assert_ne!(first, second);
        assert_eq!(query::entity_count(simulation.world()), 2);
    }

    #[test]
    fn unknown_shapes_are_not_spawned() {
        let mut simulation = Simulation::new(SimulationConfig::default());
        let spawned = simulation.spawn(Blueprint::new(
            Role::Scenery,
            Motion::at(Vec2::ZERO, Vec2::ONE),
            ShapeId::new(99),
        ));
        assert_eq!(spawned, None);
    }

    #[test]
    fn every_step_advances_the_clock_once() {
        let mut simulation = Simulation::new(SimulationConfig::default());
        let _ = simulation.step(16.0);
        let _ = simulation.step(16.0);

        let ticks = simulation
            .drain_events()
            .into_iter()
            .filter(|event| matches!(event, Event::TimeAdvanced { .. }))
            .count();
        assert_eq!(ticks, 2);
        assert_eq!(query::tick_index(simulation.world()), 2);
        assert!(simulation.events().is_empty());
    }
}
