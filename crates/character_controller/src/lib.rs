//! 2D platformer character controller on top of avian2d.
//!
//! Each physics step a character probes for ground and ceiling overlaps,
//! consumes its [`MoveCommand`]s and writes the resulting velocity back to
//! its rigid body. Landing and crouch transitions are published as messages.
//!
//! ```no_run
//! use avian2d::prelude::*;
//! use bevy::prelude::*;
//! use character_controller::prelude::*;
//!
//! App::new()
//!     .add_plugins((PhysicsPlugins::default(), CharacterControllerPlugin::default()))
//!     .run();
//! ```

use bevy::ecs::intern::Interned;
use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;
use settings::SettingsArc;

pub mod components;
pub mod config;
pub mod error;
pub mod input;
pub mod locomotion;
pub mod messages;
pub mod sensors;
pub mod systems;

pub use error::ControllerError;

pub mod prelude {
    pub use crate::components::{CharacterController, ContactProbe, ControllerTuning, Facing, Locomotion};
    pub use crate::config::ControllerSettings;
    pub use crate::input::{InputSettings, PlayerInput, PlayerInputPlugin};
    pub use crate::messages::{CrouchChanged, Landed, MoveCommand};
    pub use crate::sensors::ContactSensors;
    pub use crate::{CharacterControllerPlugin, ControllerSet};
}

use components::{ContactProbe, Facing, Locomotion};
use config::ControllerSettings;
use messages::{CrouchChanged, Landed, MoveCommand};

/// Ordering of the controller systems within one physics step.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerSet {
    /// Overlap probes and grounded state.
    Sense,
    /// Producers of [`MoveCommand`]s.
    Command,
    /// Consumption of commands and velocity updates.
    Drive,
}

/// Adds the controller systems to `schedule` (`FixedUpdate` by default).
pub struct CharacterControllerPlugin {
    schedule: Interned<dyn ScheduleLabel>,
}

impl CharacterControllerPlugin {
    pub fn new(schedule: impl ScheduleLabel) -> Self {
        Self {
            schedule: schedule.intern(),
        }
    }
}

impl Default for CharacterControllerPlugin {
    fn default() -> Self {
        Self::new(FixedUpdate)
    }
}

impl Plugin for CharacterControllerPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<MoveCommand>()
            .add_message::<Landed>()
            .add_message::<CrouchChanged>()
            .register_type::<Locomotion>()
            .register_type::<ContactProbe>()
            .register_type::<Facing>()
            .configure_sets(
                self.schedule,
                (ControllerSet::Sense, ControllerSet::Command, ControllerSet::Drive).chain(),
            )
            .add_systems(
                self.schedule,
                (
                    config::refresh_tuning
                        .run_if(resource_exists_and_changed::<SettingsArc<ControllerSettings>>),
                    sensors::probe_contacts,
                    systems::detect_ground,
                )
                    .chain()
                    .in_set(ControllerSet::Sense),
            )
            .add_systems(
                self.schedule,
                systems::drive_characters.in_set(ControllerSet::Drive),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_registers_messages() {
        let mut app = App::new();
        app.add_plugins(CharacterControllerPlugin::default());

        assert!(app.world().contains_resource::<Messages<MoveCommand>>());
        assert!(app.world().contains_resource::<Messages<Landed>>());
        assert!(app.world().contains_resource::<Messages<CrouchChanged>>());
    }
}
