//! The `controller` settings section.

use app::LOG_SETTINGS;
use avian2d::prelude::LayerMask;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use settings::{Settings, SettingsArc};
use tracing::{debug, warn};

use crate::components::{CharacterController, ControllerTuning};
use crate::error::ControllerError;
use crate::sensors::{ContactSensors, DEFAULT_CEILING_RADIUS, DEFAULT_GROUNDED_RADIUS};

/// Tunables of every character, as stored in the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    pub jump_force: f32,
    pub crouch_speed: f32,
    pub movement_smoothing: f32,
    pub air_control: bool,
    pub speed_scale: f32,
    pub grounded_radius: f32,
    pub ceiling_radius: f32,
    /// Bit mask of the physics layers that count as ground.
    pub ground_layers: u32,
    pub ground_check: Vec2,
    pub ceiling_check: Vec2,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        let tuning = ControllerTuning::default();
        let sensors = ContactSensors::default();
        Self {
            jump_force: tuning.jump_force,
            crouch_speed: tuning.crouch_speed,
            movement_smoothing: tuning.movement_smoothing,
            air_control: tuning.air_control,
            speed_scale: tuning.speed_scale,
            grounded_radius: DEFAULT_GROUNDED_RADIUS,
            ceiling_radius: DEFAULT_CEILING_RADIUS,
            ground_layers: sensors.ground_layers.0,
            ground_check: sensors.ground_check,
            ceiling_check: sensors.ceiling_check,
        }
    }
}

impl Settings for ControllerSettings {
    const SECTION: &'static str = "controller";
}

impl ControllerSettings {
    pub fn validate(&self) -> Result<(), ControllerError> {
        if !self.jump_force.is_finite() {
            return Err(ControllerError::InvalidJumpForce(self.jump_force));
        }
        if !(0.0..=1.0).contains(&self.crouch_speed) {
            return Err(ControllerError::CrouchSpeedOutOfRange(self.crouch_speed));
        }
        if !(0.0..=0.3).contains(&self.movement_smoothing) {
            return Err(ControllerError::SmoothingOutOfRange(self.movement_smoothing));
        }
        if !self.speed_scale.is_finite() {
            return Err(ControllerError::InvalidSpeedScale(self.speed_scale));
        }
        for (name, value) in [("grounded", self.grounded_radius), ("ceiling", self.ceiling_radius)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ControllerError::InvalidRadius { name, value });
            }
        }
        Ok(())
    }

    /// Movement tunables, clamped into their valid ranges.
    ///
    /// Out of range values are logged and replaced instead of failing, so a
    /// bad settings file never stops the game.
    pub fn tuning(&self) -> ControllerTuning {
        if let Err(err) = self.validate() {
            warn!(target: LOG_SETTINGS, "Controller settings adjusted: {err}");
        }

        let defaults = ControllerTuning::default();
        ControllerTuning {
            jump_force: finite_or(self.jump_force, defaults.jump_force),
            crouch_speed: finite_or(self.crouch_speed, defaults.crouch_speed).clamp(0.0, 1.0),
            movement_smoothing: finite_or(self.movement_smoothing, defaults.movement_smoothing)
                .clamp(0.0, 0.3),
            air_control: self.air_control,
            speed_scale: finite_or(self.speed_scale, defaults.speed_scale),
        }
    }

    pub fn sensors(&self) -> ContactSensors {
        ContactSensors {
            ground_check: self.ground_check,
            ceiling_check: self.ceiling_check,
            grounded_radius: positive_or(self.grounded_radius, DEFAULT_GROUNDED_RADIUS),
            ceiling_radius: positive_or(self.ceiling_radius, DEFAULT_CEILING_RADIUS),
            ground_layers: LayerMask(self.ground_layers),
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Pushes reloaded tunables into the controllers that follow the settings file.
///
/// Probe offsets and layers stay per entity; only tuning and radii follow the
/// settings file.
pub fn refresh_tuning(
    settings: Res<SettingsArc<ControllerSettings>>,
    mut controllers: Query<&mut CharacterController>,
) {
    let tuning = settings.tuning();
    let sensors = settings.sensors();
    let mut refreshed = 0usize;
    for mut controller in &mut controllers {
        if !controller.follows_settings {
            continue;
        }
        controller.tuning = tuning;
        controller.sensors.grounded_radius = sensors.grounded_radius;
        controller.sensors.ceiling_radius = sensors.ceiling_radius;
        refreshed += 1;
    }
    debug!(target: LOG_SETTINGS, "Refreshed tuning of {refreshed} controllers");
}
