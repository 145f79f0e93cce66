//! Per-step locomotion rules, independent of the ECS.
//!
//! Systems feed these methods with physics results and turn the returned
//! [`MoveOutcome`] into engine side effects.

use bevy::math::Vec2;

use crate::components::{ControllerTuning, Facing, Locomotion};

/// Lower bound for the smoothing time constant.
const MIN_SMOOTH_TIME: f32 = 1e-4;

/// Input intents of one movement command.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveInput {
    /// Signed horizontal movement, already scaled by the caller.
    pub horizontal: f32,
    pub crouch: bool,
    pub jump: bool,
}

/// Side effects requested by [`Locomotion::drive`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    /// New linear velocity of the body.
    pub velocity: Vec2,
    /// `Some(crouching)` on a crouch state transition.
    pub crouch_changed: Option<bool>,
    /// Desired state of the crouch-disable collider, `None` when untouched.
    pub crouch_collider_enabled: Option<bool>,
    /// The facing direction flipped during this command.
    pub flipped: bool,
    /// A jump impulse has to be applied.
    pub jumped: bool,
}

impl Locomotion {
    /// Records a fresh ground overlap result. Returns `true` on landing, i.e.
    /// when the character was airborne on the previous step.
    pub fn sense_ground(&mut self, touching: bool) -> bool {
        let was_grounded = self.grounded;
        self.grounded = touching;
        touching && !was_grounded
    }

    /// Applies one movement command.
    ///
    /// `ceiling_blocked` forces crouching when there is no room to stand up.
    pub fn drive(
        &mut self,
        tuning: &ControllerTuning,
        input: MoveInput,
        ceiling_blocked: bool,
        velocity: Vec2,
        dt: f32,
    ) -> MoveOutcome {
        let crouch = input.crouch || ceiling_blocked;
        let mut horizontal = if input.horizontal.is_finite() {
            input.horizontal
        } else {
            0.0
        };

        let mut outcome = MoveOutcome {
            velocity,
            crouch_changed: None,
            crouch_collider_enabled: None,
            flipped: false,
            jumped: false,
        };

        if self.grounded || tuning.air_control {
            if crouch {
                if !self.crouching {
                    self.crouching = true;
                    outcome.crouch_changed = Some(true);
                }
                horizontal *= tuning.crouch_speed;
                outcome.crouch_collider_enabled = Some(false);
            } else {
                outcome.crouch_collider_enabled = Some(true);
                if self.crouching {
                    self.crouching = false;
                    outcome.crouch_changed = Some(false);
                }
            }

            let target = Vec2::new(horizontal * tuning.speed_scale, velocity.y);
            outcome.velocity = smooth_damp(
                velocity,
                target,
                &mut self.smoothing_velocity,
                tuning.movement_smoothing,
                dt,
            );

            let moving_against_facing = (horizontal > 0.0 && self.facing == Facing::Left)
                || (horizontal < 0.0 && self.facing == Facing::Right);
            if moving_against_facing {
                self.flip();
                outcome.flipped = true;
            }
        }

        if self.grounded && input.jump {
            self.grounded = false;
            outcome.jumped = true;
        }

        outcome
    }

    fn flip(&mut self) {
        self.facing = self.facing.flipped();
    }
}

/// Vertical velocity change of a jump: `jump_force` applied for one step of `dt`.
pub fn jump_velocity_change(jump_force: f32, inverse_mass: f32, dt: f32) -> f32 {
    jump_force * inverse_mass * dt
}

/// Critically damped spring from `current` towards `target`.
///
/// `velocity` is the spring state and must be kept between calls. The result
/// never overshoots `target`.
pub fn smooth_damp(current: Vec2, target: Vec2, velocity: &mut Vec2, smooth_time: f32, dt: f32) -> Vec2 {
    if dt <= 0.0 {
        return current;
    }

    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let output = target + (change + temp) * decay;

    if (target - current).dot(output - target) > 0.0 {
        *velocity = Vec2::ZERO;
        return target;
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.02;

    fn grounded() -> Locomotion {
        Locomotion {
            grounded: true,
            ..Default::default()
        }
    }

    fn input(horizontal: f32, crouch: bool, jump: bool) -> MoveInput {
        MoveInput {
            horizontal,
            crouch,
            jump,
        }
    }

    #[test]
    fn landing_only_on_rising_edge() {
        let mut state = Locomotion::default();

        assert!(!state.sense_ground(false));
        assert!(!state.sense_ground(false));
        assert!(state.sense_ground(true));
        assert!(!state.sense_ground(true));
        assert!(!state.sense_ground(true));
        assert!(!state.sense_ground(false));
        assert!(state.sense_ground(true));
    }

    #[test]
    fn crouch_change_reported_once_per_transition() {
        let tuning = ControllerTuning::default();
        let mut state = grounded();

        let first = state.drive(&tuning, input(0.0, true, false), false, Vec2::ZERO, DT);
        assert_eq!(first.crouch_changed, Some(true));
        for _ in 0..5 {
            let held = state.drive(&tuning, input(0.0, true, false), false, Vec2::ZERO, DT);
            assert_eq!(held.crouch_changed, None);
        }

        let released = state.drive(&tuning, input(0.0, false, false), false, Vec2::ZERO, DT);
        assert_eq!(released.crouch_changed, Some(false));
        let standing = state.drive(&tuning, input(0.0, false, false), false, Vec2::ZERO, DT);
        assert_eq!(standing.crouch_changed, None);
    }

    #[test]
    fn ceiling_forces_crouch() {
        let tuning = ControllerTuning::default();
        let mut state = grounded();

        let outcome = state.drive(&tuning, input(0.5, false, false), true, Vec2::ZERO, DT);
        assert!(state.crouching);
        assert_eq!(outcome.crouch_changed, Some(true));
        assert_eq!(outcome.crouch_collider_enabled, Some(false));

        // Still stuck under the ceiling: stays crouched without a new event.
        let outcome = state.drive(&tuning, input(0.5, false, false), true, Vec2::ZERO, DT);
        assert!(state.crouching);
        assert_eq!(outcome.crouch_changed, None);

        let outcome = state.drive(&tuning, input(0.5, false, false), false, Vec2::ZERO, DT);
        assert!(!state.crouching);
        assert_eq!(outcome.crouch_changed, Some(false));
        assert_eq!(outcome.crouch_collider_enabled, Some(true));
    }

    #[test]
    fn jump_requires_ground_and_clears_it() {
        let tuning = ControllerTuning::default();

        let mut airborne = Locomotion::default();
        let outcome = airborne.drive(&tuning, input(0.0, false, true), false, Vec2::ZERO, DT);
        assert!(!outcome.jumped);

        let mut state = grounded();
        let outcome = state.drive(&tuning, input(0.0, false, true), false, Vec2::ZERO, DT);
        assert!(outcome.jumped);
        assert!(!state.grounded);

        // A second request in the same step finds the character airborne.
        let outcome = state.drive(&tuning, input(0.0, false, true), false, Vec2::ZERO, DT);
        assert!(!outcome.jumped);
    }

    #[test]
    fn facing_follows_movement_sign() {
        let tuning = ControllerTuning::default();
        let mut state = grounded();
        assert_eq!(state.facing, Facing::Right);

        let outcome = state.drive(&tuning, input(1.0, false, false), false, Vec2::ZERO, DT);
        assert!(!outcome.flipped);
        assert_eq!(state.facing, Facing::Right);

        let outcome = state.drive(&tuning, input(-1.0, false, false), false, Vec2::ZERO, DT);
        assert!(outcome.flipped);
        assert_eq!(state.facing, Facing::Left);

        let outcome = state.drive(&tuning, input(0.0, false, false), false, Vec2::ZERO, DT);
        assert!(!outcome.flipped);
        assert_eq!(state.facing, Facing::Left);

        let outcome = state.drive(&tuning, input(-0.3, false, false), false, Vec2::ZERO, DT);
        assert!(!outcome.flipped);

        let outcome = state.drive(&tuning, input(0.3, false, false), false, Vec2::ZERO, DT);
        assert!(outcome.flipped);
        assert_eq!(state.facing, Facing::Right);
    }

    #[test]
    fn airborne_without_air_control_keeps_velocity() {
        let tuning = ControllerTuning::default();
        let mut state = Locomotion::default();
        let velocity = Vec2::new(3.0, -2.0);

        let outcome = state.drive(&tuning, input(-1.0, true, false), false, velocity, DT);
        assert_eq!(outcome.velocity, velocity);
        assert_eq!(outcome.crouch_changed, None);
        assert_eq!(outcome.crouch_collider_enabled, None);
        assert!(!outcome.flipped);
        assert!(!state.crouching);
    }

    #[test]
    fn air_control_steers_while_airborne() {
        let tuning = ControllerTuning {
            air_control: true,
            ..Default::default()
        };
        let mut state = Locomotion::default();

        let outcome = state.drive(&tuning, input(-1.0, false, false), false, Vec2::ZERO, DT);
        assert!(outcome.velocity.x < 0.0);
        assert!(outcome.flipped);
        assert!(!outcome.jumped);
    }

    #[test]
    fn crouching_scales_target_speed() {
        let tuning = ControllerTuning {
            movement_smoothing: 0.0,
            ..Default::default()
        };

        let mut standing = grounded();
        let mut crouched = grounded();
        let mut fast = Vec2::ZERO;
        let mut slow = Vec2::ZERO;
        for _ in 0..50 {
            fast = standing.drive(&tuning, input(1.0, false, false), false, fast, DT).velocity;
            slow = crouched.drive(&tuning, input(1.0, true, false), false, slow, DT).velocity;
        }

        assert!((fast.x - 10.0).abs() < 1e-3, "standing speed {}", fast.x);
        assert!((slow.x - 3.6).abs() < 1e-3, "crouching speed {}", slow.x);
    }

    #[test]
    fn vertical_velocity_is_preserved() {
        let tuning = ControllerTuning::default();
        let mut state = grounded();

        let outcome = state.drive(&tuning, input(1.0, false, false), false, Vec2::new(0.0, -4.0), DT);
        assert_eq!(outcome.velocity.y, -4.0);
    }

    #[test]
    fn non_finite_input_is_treated_as_idle() {
        let tuning = ControllerTuning::default();
        let mut state = grounded();

        let outcome = state.drive(&tuning, input(f32::NAN, false, false), false, Vec2::ZERO, DT);
        assert_eq!(outcome.velocity, Vec2::ZERO);
        assert!(!outcome.flipped);
    }

    #[test]
    fn smooth_damp_converges_without_overshoot() {
        let target = Vec2::new(8.0, 0.0);
        let mut current = Vec2::ZERO;
        let mut velocity = Vec2::ZERO;

        let mut previous = current.x;
        for _ in 0..100 {
            current = smooth_damp(current, target, &mut velocity, 0.05, DT);
            assert!(current.x <= target.x);
            assert!(current.x >= previous);
            previous = current.x;
        }
        assert!((current.x - target.x).abs() < 1e-3);
    }

    #[test]
    fn smooth_damp_partial_first_step() {
        let mut velocity = Vec2::ZERO;
        let out = smooth_damp(Vec2::ZERO, Vec2::new(8.0, 0.0), &mut velocity, 0.05, DT);

        assert!(out.x > 0.0 && out.x < 8.0);
        assert!(velocity.x > 0.0);
    }

    #[test]
    fn smooth_damp_zero_dt_is_identity() {
        let mut velocity = Vec2::new(1.0, 0.0);
        let current = Vec2::new(2.0, 1.0);

        assert_eq!(smooth_damp(current, Vec2::ZERO, &mut velocity, 0.05, 0.0), current);
        assert_eq!(velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn jump_velocity_change_is_force_over_one_step() {
        assert_eq!(jump_velocity_change(400.0, 1.0, 0.02), 8.0);
        assert_eq!(jump_velocity_change(400.0, 0.5, 0.02), 4.0);
    }
}
