//! Components carried by a controlled character.

use avian2d::prelude::*;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ControllerSettings;
use crate::sensors::ContactSensors;

/// Which way the character currently faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Reflect)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    pub fn flipped(self) -> Self {
        match self {
            Facing::Right => Facing::Left,
            Facing::Left => Facing::Right,
        }
    }
}

/// Tunable movement parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct ControllerTuning {
    /// Upward force applied for one physics step when jumping.
    pub jump_force: f32,
    /// Speed multiplier while crouching, `0..=1`.
    pub crouch_speed: f32,
    /// Smoothing time constant for horizontal velocity changes, `0..=0.3`.
    pub movement_smoothing: f32,
    /// Whether horizontal input steers the character while airborne.
    pub air_control: bool,
    /// Target horizontal velocity per unit of commanded movement.
    pub speed_scale: f32,
}

impl Default for ControllerTuning {
    fn default() -> Self {
        Self {
            jump_force: 400.0,
            crouch_speed: 0.36,
            movement_smoothing: 0.05,
            air_control: false,
            speed_scale: 10.0,
        }
    }
}

/// A platformer character driven by [`MoveCommand`](crate::messages::MoveCommand)s.
///
/// The entity is expected to be an avian2d dynamic body; the controller
/// writes its [`LinearVelocity`] and flips its [`Transform`] scale.
#[derive(Component, Debug, Clone)]
#[require(Locomotion, ContactProbe, LinearVelocity, Transform)]
pub struct CharacterController {
    pub tuning: ControllerTuning,
    pub sensors: ContactSensors,
    /// Secondary collider that is disabled while crouching.
    pub crouch_collider: Option<Entity>,
    /// Tuning and probe radii are replaced when the `controller` settings
    /// section is reloaded. Cleared by [`CharacterController::with_tuning`].
    pub follows_settings: bool,
}

impl Default for CharacterController {
    fn default() -> Self {
        Self::from_settings(&ControllerSettings::default())
    }
}

impl CharacterController {
    pub fn from_settings(settings: &ControllerSettings) -> Self {
        Self {
            tuning: settings.tuning(),
            sensors: settings.sensors(),
            crouch_collider: None,
            follows_settings: true,
        }
    }

    /// Fixed tuning that settings reloads leave alone.
    pub fn with_tuning(mut self, tuning: ControllerTuning) -> Self {
        self.tuning = tuning;
        self.follows_settings = false;
        self
    }

    /// Local offset of the ground probe, usually at the feet.
    pub fn with_ground_check(mut self, offset: Vec2) -> Self {
        self.sensors.ground_check = offset;
        self
    }

    /// Local offset of the ceiling probe, usually at head height.
    pub fn with_ceiling_check(mut self, offset: Vec2) -> Self {
        self.sensors.ceiling_check = offset;
        self
    }

    pub fn with_ground_layers(mut self, layers: impl Into<LayerMask>) -> Self {
        self.sensors.ground_layers = layers.into();
        self
    }

    pub fn with_crouch_collider(mut self, collider: Entity) -> Self {
        self.crouch_collider = Some(collider);
        self
    }
}

/// Mutable locomotion state of a character.
///
/// `grounded` is recomputed every physics step from a fresh overlap query.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub struct Locomotion {
    pub grounded: bool,
    pub facing: Facing,
    pub crouching: bool,
    /// Velocity accumulator of the smoothing spring.
    pub smoothing_velocity: Vec2,
}

/// Latest overlap results of the ground and ceiling probes.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub struct ContactProbe {
    pub ground: bool,
    pub ceiling: bool,
}
