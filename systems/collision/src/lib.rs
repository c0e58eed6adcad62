#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collision detection and resolution for Cinderfall.
//!
//! Detection runs a strict bounding-box test followed by an exact polygon test
//! over every pair of bodies whose roles are relevant to each other. Contacts
//! are recorded in both orientations and then dispatched through a role-pair
//! table that turns each contact into world commands.

mod narrow;
mod resolve;

pub use narrow::{boxes_overlap, collides, precise_collision, segments_intersect, Placed};
pub use resolve::{ResolverFn, ResolverTable};

use cinderfall_core::{BodySnapshot, CollisionShape, Command, EntityId, Motion, ShapeId, Vec2};

/// Ordered contact between two bodies.
///
/// Every contact is reported in both orientations within the same tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionEvent {
    /// Body whose handler reacts to the contact.
    pub entity: EntityId,
    /// Body it touched.
    pub other: EntityId,
}

/// Pure system that detects contacts and emits resolution commands.
#[derive(Debug, Default)]
pub struct Collision {
    table: ResolverTable,
}

impl Collision {
    /// Creates a collision system with a custom resolver table.
    #[must_use]
    pub fn with_table(table: ResolverTable) -> Self {
        Self { table }
    }

    /// Fills `contacts` with every touching pair of relevant bodies.
    ///
    /// Bodies are compared in slice order, so the output is deterministic for
    /// a deterministic snapshot.
    pub fn detect<'s, S>(
        &self,
        bodies: &[BodySnapshot],
        shapes: S,
        contacts: &mut Vec<CollisionEvent>,
    ) where
        S: Fn(ShapeId) -> Option<&'s CollisionShape>,
    {
        let placed: Vec<Option<Placed<'_>>> = bodies
            .iter()
            .map(|body| {
                let shape = shapes(body.shape);
                debug_assert!(shape.is_some(), "{:?} uses unknown {:?}", body.id, body.shape);
                shape.map(|shape| Placed {
                    motion: &body.motion,
                    shape,
                })
            })
            .collect();

        for (i, first) in bodies.iter().enumerate() {
            let Some(first_placed) = placed[i] else {
                continue;
            };
            for (j, second) in bodies.iter().enumerate().skip(i + 1) {
                if !self.table.is_relevant(first.role, second.role) {
                    continue;
                }
                let Some(second_placed) = placed[j] else {
                    continue;
                };
                if collides(first_placed, second_placed) {
                    contacts.push(CollisionEvent {
                        entity: first.id,
                        other: second.id,
                    });
                    contacts.push(CollisionEvent {
                        entity: second.id,
                        other: first.id,
                    });
                }
            }
        }
    }

    /// Dispatches each contact to the resolver registered for its roles.
    pub fn resolve(
        &self,
        bodies: &[BodySnapshot],
        contacts: &[CollisionEvent],
        out: &mut Vec<Command>,
    ) {
        let find = |id: EntityId| {
            bodies
                .binary_search_by_key(&id, |body| body.id)
                .ok()
                .map(|index| &bodies[index])
                .or_else(|| bodies.iter().find(|body| body.id == id))
        };

        for contact in contacts {
            let (Some(first), Some(second)) = (find(contact.entity), find(contact.other)) else {
                continue;
            };
            if let Some(resolver) = self.table.get(first.role, second.role) {
                resolver(first, second, out);
            }
        }
    }

    /// Detects and resolves in one pass, returning the contacts found.
    pub fn handle<'s, S>(
        &self,
        bodies: &[BodySnapshot],
        shapes: S,
        out: &mut Vec<Command>,
    ) -> Vec<CollisionEvent>
    where
        S: Fn(ShapeId) -> Option<&'s CollisionShape>,
    {
        let mut contacts = Vec::new();
        self.detect(bodies, shapes, &mut contacts);
        self.resolve(bodies, &contacts, out);
        log::trace!(
            "collision pass: {} bodies, {} contacts, {} commands",
            bodies.len(),
            contacts.len(),
            out.len()
        );
        contacts
    }
}

/// Reports whether the straight segment between two points crosses any obstacle.
///
/// The segment is probed as a one-unit-thick beam spanning both points, so the
/// exact polygon test always runs. The probe never enters the world.
pub fn segment_blocked<'s, S>(from: Vec2, to: Vec2, obstacles: &[BodySnapshot], shapes: S) -> bool
where
    S: Fn(ShapeId) -> Option<&'s CollisionShape>,
{
    let span = to - from;
    let mut probe_motion = Motion::at((from + to) / 2.0, Vec2::new(span.length(), 1.0));
    probe_motion.angle = span.y.atan2(span.x);
    let beam = CollisionShape::beam();
    let probe = Placed {
        motion: &probe_motion,
        shape: &beam,
    };

    obstacles.iter().any(|obstacle| {
        shapes(obstacle.shape).is_some_and(|shape| {
            collides(
                probe,
                Placed {
                    motion: &obstacle.motion,
                    shape,
                },
            )
        })
    })
}
