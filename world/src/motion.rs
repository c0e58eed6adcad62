//! Per-tick motion integration.

use cinderfall_core::{Gravity, Motion};

/// Parameters shared by every body integrated during one tick.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Step {
    pub(crate) dt_ms: f32,
    pub(crate) gravity_per_ms: f32,
    pub(crate) dialogue_active: bool,
    /// Dialogue panels stop once they slide past this x coordinate.
    pub(crate) dialogue_stop_x: f32,
}

/// Advances a single body, returning whether it was allowed to move.
///
/// While dialogue is showing only dialogue panels move, and only until they
/// reach the centre of the screen.
pub(crate) fn integrate(
    motion: &mut Motion,
    gravity: Option<&Gravity>,
    is_dialogue: bool,
    step: &Step,
) -> bool {
    let may_move = if is_dialogue {
        motion.position.x > step.dialogue_stop_x
    } else {
        !step.dialogue_active
    };
    if !may_move {
        return false;
    }

    if let Some(gravity) = gravity {
        if !gravity.is_suspended() {
            motion.velocity.y += step.gravity_per_ms * step.dt_ms;
        }
    }
    motion.position += motion.velocity * (step.dt_ms / 1000.0);
    true
}

#[cfg(test)]
mod tests {
    use super::{integrate, Step};
    use cinderfall_core::{Gravity, Motion, Vec2};

    fn step(dialogue_active: bool) -> Step {
        Step {
            dt_ms: 100.0,
            gravity_per_ms: 0.5,
            dialogue_active,
            dialogue_stop_x: 600.0,
        }
    }

    #[test]
    fn gravity_accumulates_before_position_update() {
        let mut motion = Motion::at(Vec2::ZERO, Vec2::ONE);
        motion.velocity = Vec2::new(10.0, 0.0);
        assert!(integrate(&mut motion, Some(&Gravity::default()), false, &step(false)));
        assert_eq!(motion.velocity, Vec2::new(10.0, 50.0));
        assert_eq!(motion.position, Vec2::new(1.0, 5.0));
    }

    #[test]
    fn lodged_and_dashing_bodies_ignore_gravity() {
        for gravity in [
            Gravity {
                lodged: [true, false],
                dashing: false,
            },
            Gravity {
                lodged: [false, false],
                dashing: true,
            },
        ] {
            let mut motion = Motion::at(Vec2::ZERO, Vec2::ONE);
            let _ = integrate(&mut motion, Some(&gravity), false, &step(false));
            assert_eq!(motion.velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn dialogue_freezes_everything_but_sliding_panels() {
        let mut body = Motion::at(Vec2::ZERO, Vec2::ONE);
        body.velocity = Vec2::X * 100.0;
        assert!(!integrate(&mut body, None, false, &step(true)));
        assert_eq!(body.position, Vec2::ZERO);

        let mut panel = Motion::at(Vec2::new(900.0, 0.0), Vec2::ONE);
        panel.velocity = Vec2::X * -100.0;
        assert!(integrate(&mut panel, None, true, &step(true)));
        assert_eq!(panel.position.x, 890.0);

        let mut parked = Motion::at(Vec2::new(600.0, 0.0), Vec2::ONE);
        parked.velocity = Vec2::X * -100.0;
        assert!(!integrate(&mut parked, None, true, &step(true)));
    }
}
