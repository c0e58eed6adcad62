//! Broad and narrow phase geometry tests.

use cinderfall_core::{CollisionShape, Motion, ShapeFit, Vec2};

/// Shape paired with the transform that places it in the world.
#[derive(Clone, Copy, Debug)]
pub struct Placed<'a> {
    /// Transform of the owning body.
    pub motion: &'a Motion,
    /// Local-space outline.
    pub shape: &'a CollisionShape,
}

impl Placed<'_> {
    /// Vertices after scaling, offsetting, rotating and translating.
    #[must_use]
    pub fn world_vertices(&self) -> Vec<Vec2> {
        let rotation = Vec2::from_angle(self.motion.angle);
        self.shape
            .vertices()
            .iter()
            .map(|vertex| {
                self.motion.position + rotation.rotate(self.motion.offset + *vertex * self.motion.scale)
            })
            .collect()
    }

    /// Rotated centre of the outline.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.motion.position + Vec2::from_angle(self.motion.angle).rotate(self.motion.offset)
    }
}

/// Full two-phase test used for every relevant pair.
///
/// Beams skip the box test entirely. Otherwise boxes built from the absolute
/// scale must overlap strictly on both axes, and two sprites stop there.
#[must_use]
pub fn collides(first: Placed<'_>, second: Placed<'_>) -> bool {
    if first.shape.fit() == ShapeFit::Beam || second.shape.fit() == ShapeFit::Beam {
        return precise_collision(first, second);
    }
    if !boxes_overlap(first.motion, second.motion) {
        return false;
    }
    if first.shape.fit() == ShapeFit::Sprite && second.shape.fit() == ShapeFit::Sprite {
        return true;
    }
    precise_collision(first, second)
}

/// Axis-aligned overlap of the bodies' bounding boxes.
#[must_use]
pub fn boxes_overlap(first: &Motion, second: &Motion) -> bool {
    let reach = first.half_extents() + second.half_extents();
    let gap = (first.position - second.position).abs();
    gap.x < reach.x && gap.y < reach.y
}

/// Exact polygon test: any edge crossing, or either centre enclosed by the other outline.
#[must_use]
pub fn precise_collision(first: Placed<'_>, second: Placed<'_>) -> bool {
    let first_vertices = first.world_vertices();
    let second_vertices = second.world_vertices();
    let first_center = first.center();
    let second_center = second.center();

    for &(a, b) in first.shape.edges() {
        let (p, q) = (first_vertices[a], first_vertices[b]);
        for &(c, d) in second.shape.edges() {
            if segments_intersect(p, q, second_vertices[c], second_vertices[d]) {
                return true;
            }
        }
        if encloses(p, q, first_center, second_center) {
            return true;
        }
    }

    second.shape.edges().iter().any(|&(c, d)| {
        encloses(
            second_vertices[c],
            second_vertices[d],
            second_center,
            first_center,
        )
    })
}

/// Parameters `(s, t)` with `p1 + s * d1 == p2 + t * d2`, or `None` for parallel lines.
fn parametrics(p1: Vec2, d1: Vec2, p2: Vec2, d2: Vec2) -> Option<Vec2> {
    let denominator = d1.perp_dot(d2);
    if denominator == 0.0 {
        return None;
    }
    let between = p2 - p1;
    Some(Vec2::new(
        between.perp_dot(d2) / denominator,
        between.perp_dot(d1) / denominator,
    ))
}

/// Closed-interval segment intersection; parallel segments never intersect.
#[must_use]
pub fn segments_intersect(p1: Vec2, q1: Vec2, p2: Vec2, q2: Vec2) -> bool {
    parametrics(p1, q1 - p1, p2, q2 - p2)
        .is_some_and(|t| (0.0..=1.0).contains(&t.x) && (0.0..=1.0).contains(&t.y))
}

/// One-sided containment probe for a single edge of an outline.
///
/// The ray from `own_center` through `other_center` must cross the edge
/// beyond `other_center`, which places `other_center` inside the outline.
/// Coincident centres always count as enclosed.
fn encloses(edge_start: Vec2, edge_end: Vec2, own_center: Vec2, other_center: Vec2) -> bool {
    let ray = other_center - own_center;
    if ray == Vec2::ZERO {
        return true;
    }
    parametrics(edge_start, edge_end - edge_start, own_center, ray)
        .is_some_and(|t| (0.0..=1.0).contains(&t.x) && t.y > 1.0)
}

#[cfg(test)]
mod tests {
    use super::{boxes_overlap, collides, precise_collision, segments_intersect, Placed};
    use cinderfall_core::{CollisionShape, Motion, ShapeFit, Vec2};
    use std::f32::consts::FRAC_PI_4;

    fn placed<'a>(motion: &'a Motion, shape: &'a CollisionShape) -> Placed<'a> {
        Placed { motion, shape }
    }

    fn polygon() -> CollisionShape {
        CollisionShape::new(
            vec![
                Vec2::new(-0.5, -0.5),
                Vec2::new(0.5, -0.5),
                Vec2::new(0.5, 0.5),
                Vec2::new(-0.5, 0.5),
            ],
            vec![(0, 1), (1, 2), (2, 3), (3, 0)],
            ShapeFit::Polygon,
        )
        .expect("valid quad")
    }

    #[test]
    fn sprite_boxes_collide_when_bounds_overlap() {
        let sprite = CollisionShape::sprite();
        let origin = Motion::at(Vec2::ZERO, Vec2::splat(2.0));
        let near = Motion::at(Vec2::new(0.5, 0.0), Vec2::splat(2.0));
        let far = Motion::at(Vec2::new(3.0, 0.0), Vec2::splat(2.0));

        assert!(collides(placed(&origin, &sprite), placed(&near, &sprite)));
        assert!(!collides(placed(&origin, &sprite), placed(&far, &sprite)));
    }

    #[test]
    fn facing_does_not_shrink_boxes() {
        let left = Motion::at(Vec2::ZERO, Vec2::new(-2.0, 2.0));
        let right = Motion::at(Vec2::new(1.5, 0.0), Vec2::splat(2.0));
        assert!(boxes_overlap(&left, &right));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let first = Motion::at(Vec2::ZERO, Vec2::splat(2.0));
        let second = Motion::at(Vec2::new(2.0, 0.0), Vec2::splat(2.0));
        assert!(!boxes_overlap(&first, &second));
    }

    #[test]
    fn parallel_segments_never_intersect() {
        assert!(!segments_intersect(
            Vec2::ZERO,
            Vec2::X,
            Vec2::ZERO,
            Vec2::X * 2.0
        ));
        assert!(segments_intersect(
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, -1.0),
            Vec2::new(0.0, 1.0)
        ));
    }

    #[test]
    fn nested_outlines_collide_without_edge_crossings() {
        let quad = polygon();
        let outer = Motion::at(Vec2::ZERO, Vec2::splat(10.0));
        let inner = Motion::at(Vec2::new(1.0, 1.0), Vec2::splat(2.0));
        assert!(precise_collision(placed(&outer, &quad), placed(&inner, &quad)));
        assert!(precise_collision(placed(&inner, &quad), placed(&outer, &quad)));
    }

    #[test]
    fn rotated_polygons_miss_inside_overlapping_boxes() {
        let quad = polygon();
        let mut diamond = Motion::at(Vec2::ZERO, Vec2::splat(2.0));
        diamond.angle = FRAC_PI_4;
        // Sits in the bounding box corner the rotated square does not reach.
        let corner = Motion::at(Vec2::new(1.3, 1.3), Vec2::splat(1.0));
        assert!(boxes_overlap(&diamond, &corner));
        assert!(!collides(placed(&diamond, &quad), placed(&corner, &quad)));
    }

    #[test]
    fn beams_collide_without_box_overlap() {
        let beam = CollisionShape::beam();
        let sprite = CollisionShape::sprite();
        let mut ray = Motion::at(Vec2::ZERO, Vec2::new(10.0, 1.0));
        ray.angle = FRAC_PI_4;
        let target = Motion::at(Vec2::new(3.0, 3.0), Vec2::splat(1.0));
        assert!(collides(placed(&ray, &beam), placed(&target, &sprite)));
    }
}
