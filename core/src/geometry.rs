//! World-space rectangles and the collision outlines tested by the narrow phase.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Axis-aligned rectangle in world space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    center: Vec2,
    size: Vec2,
}

impl Rect {
    /// Creates a rectangle from its centre and full size.
    #[must_use]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            size: size.abs(),
        }
    }

    /// Centre of the rectangle.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Full width and height.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Corner with the smallest coordinates.
    #[must_use]
    pub fn min(&self) -> Vec2 {
        self.center - self.size / 2.0
    }

    /// Corner with the largest coordinates.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.center + self.size / 2.0
    }
}

/// How the narrow phase treats a shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeFit {
    /// The bounding box is the hitbox; overlap alone is a collision.
    Sprite,
    /// Overlapping bounding boxes are refined with the polygon test.
    Polygon,
    /// Always tested with the polygon test, even without box overlap.
    Beam,
}

/// Failures raised while constructing a [`CollisionShape`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ShapeError {
    /// Fewer than two vertices cannot form an edge.
    #[error("shape needs at least two vertices, got {count}")]
    TooFewVertices {
        /// Vertices supplied.
        count: usize,
    },
    /// An edge referenced a vertex index past the end of the vertex list.
    #[error("edge {edge} references vertex {vertex} but only {count} vertices exist")]
    EdgeOutOfRange {
        /// Offending edge index.
        edge: usize,
        /// Offending vertex index.
        vertex: usize,
        /// Vertices supplied.
        count: usize,
    },
}

/// Convex outline in local, unscaled and unrotated space.
///
/// Deserialization goes through [`CollisionShape::new`], so a decoded shape
/// never carries a dangling edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCollisionShape")]
pub struct CollisionShape {
    vertices: Vec<Vec2>,
    edges: Vec<(usize, usize)>,
    fit: ShapeFit,
}

/// Unchecked wire form of [`CollisionShape`].
#[derive(Serialize, Deserialize)]
struct RawCollisionShape {
    vertices: Vec<Vec2>,
    edges: Vec<(usize, usize)>,
    fit: ShapeFit,
}

impl TryFrom<RawCollisionShape> for CollisionShape {
    type Error = ShapeError;

    fn try_from(raw: RawCollisionShape) -> Result<Self, Self::Error> {
        Self::new(raw.vertices, raw.edges, raw.fit)
    }
}

impl CollisionShape {
    /// Creates a shape after checking that every edge references a vertex.
    pub fn new(
        vertices: Vec<Vec2>,
        edges: Vec<(usize, usize)>,
        fit: ShapeFit,
    ) -> Result<Self, ShapeError> {
        if vertices.len() < 2 {
            return Err(ShapeError::TooFewVertices {
                count: vertices.len(),
            });
        }
        for (edge, &(a, b)) in edges.iter().enumerate() {
            for vertex in [a, b] {
                if vertex >= vertices.len() {
                    return Err(ShapeError::EdgeOutOfRange {
                        edge,
                        vertex,
                        count: vertices.len(),
                    });
                }
            }
        }
        Ok(Self {
            vertices,
            edges,
            fit,
        })
    }

    /// Unit quad centred on the origin whose box is its hitbox.
    #[must_use]
    pub fn sprite() -> Self {
        Self::unit_quad(ShapeFit::Sprite)
    }

    /// Unit quad that always takes the exact polygon test.
    #[must_use]
    pub fn beam() -> Self {
        Self::unit_quad(ShapeFit::Beam)
    }

    fn unit_quad(fit: ShapeFit) -> Self {
        Self {
            vertices: vec![
                Vec2::new(-0.5, -0.5),
                Vec2::new(0.5, -0.5),
                Vec2::new(0.5, 0.5),
                Vec2::new(-0.5, 0.5),
            ],
            edges: vec![(0, 1), (1, 2), (2, 3), (3, 0)],
            fit,
        }
    }

    /// Vertices in local space.
    #[must_use]
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Edges as pairs of vertex indices.
    #[must_use]
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Narrow-phase treatment of the shape.
    #[must_use]
    pub const fn fit(&self) -> ShapeFit {
        self.fit
    }
}
