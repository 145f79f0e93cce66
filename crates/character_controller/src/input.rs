//! Keyboard driven movement commands for a player character.

use app::LOG_INPUT;
use bevy::ecs::intern::Interned;
use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use settings::{Settings, SettingsArc};
use tracing::{trace, warn};

use crate::ControllerSet;
use crate::error::ControllerError;
use crate::messages::MoveCommand;

pub const DEFAULT_RUN_SPEED: f32 = 40.0;

const LEFT_KEYS: [KeyCode; 2] = [KeyCode::KeyA, KeyCode::ArrowLeft];
const RIGHT_KEYS: [KeyCode; 2] = [KeyCode::KeyD, KeyCode::ArrowRight];
const JUMP_KEYS: [KeyCode; 3] = [KeyCode::Space, KeyCode::KeyW, KeyCode::ArrowUp];
const CROUCH_KEYS: [KeyCode; 3] = [KeyCode::KeyS, KeyCode::ArrowDown, KeyCode::ControlLeft];

/// Intents gathered from the keyboard between two physics steps.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PlayerInput {
    pub run_speed: f32,
    /// Raw axis in `-1..=1`.
    pub horizontal: f32,
    pub crouch: bool,
    /// Latched until the next movement command is issued.
    pub jump: bool,
}

impl Default for PlayerInput {
    fn default() -> Self {
        Self::with_run_speed(DEFAULT_RUN_SPEED)
    }
}

impl PlayerInput {
    pub fn with_run_speed(run_speed: f32) -> Self {
        Self {
            run_speed,
            horizontal: 0.0,
            crouch: false,
            jump: false,
        }
    }

    /// The movement command for one step of `dt` seconds.
    pub fn command(&self, entity: Entity, dt: f32) -> MoveCommand {
        MoveCommand::new(entity, self.horizontal * self.run_speed * dt, self.crouch, self.jump)
    }
}

/// The `input` settings section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    pub run_speed: f32,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            run_speed: DEFAULT_RUN_SPEED,
        }
    }
}

impl Settings for InputSettings {
    const SECTION: &'static str = "input";
}

impl InputSettings {
    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.run_speed.is_finite() && self.run_speed >= 0.0 {
            Ok(())
        } else {
            Err(ControllerError::InvalidRunSpeed(self.run_speed))
        }
    }

    pub fn run_speed(&self) -> f32 {
        match self.validate() {
            Ok(()) => self.run_speed,
            Err(err) => {
                warn!(target: LOG_INPUT, "{err}, using {DEFAULT_RUN_SPEED}");
                DEFAULT_RUN_SPEED
            }
        }
    }
}

/// `-1`, `0` or `1` from two opposing buttons.
pub fn axis(negative: bool, positive: bool) -> f32 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

pub fn read_keyboard(keys: Res<ButtonInput<KeyCode>>, mut players: Query<&mut PlayerInput>) {
    let horizontal = axis(keys.any_pressed(LEFT_KEYS), keys.any_pressed(RIGHT_KEYS));
    let crouch = keys.any_pressed(CROUCH_KEYS);
    let jump = keys.any_just_pressed(JUMP_KEYS);

    for mut input in &mut players {
        input.horizontal = horizontal;
        input.crouch = crouch;
        if jump {
            trace!(target: LOG_INPUT, "Jump requested");
            input.jump = true;
        }
    }
}

/// One [`MoveCommand`] per player per physics step.
pub fn issue_move_commands(
    time: Res<Time>,
    mut players: Query<(Entity, &mut PlayerInput)>,
    mut moves: MessageWriter<MoveCommand>,
) {
    let dt = time.delta_secs();
    for (entity, mut input) in &mut players {
        moves.write(input.command(entity, dt));
        input.jump = false;
    }
}

pub fn refresh_run_speed(
    settings: Res<SettingsArc<InputSettings>>,
    mut players: Query<&mut PlayerInput>,
) {
    let run_speed = settings.run_speed();
    for mut input in &mut players {
        input.run_speed = run_speed;
    }
}

/// Reads the keyboard in `Update` and issues movement commands in the
/// controller schedule.
pub struct PlayerInputPlugin {
    schedule: Interned<dyn ScheduleLabel>,
}

impl PlayerInputPlugin {
    pub fn new(schedule: impl ScheduleLabel) -> Self {
        Self {
            schedule: schedule.intern(),
        }
    }
}

impl Default for PlayerInputPlugin {
    fn default() -> Self {
        Self::new(FixedUpdate)
    }
}

impl Plugin for PlayerInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            read_keyboard.run_if(resource_exists::<ButtonInput<KeyCode>>),
        )
        .add_systems(
            self.schedule,
            (
                refresh_run_speed.run_if(resource_exists_and_changed::<SettingsArc<InputSettings>>),
                issue_move_commands,
            )
                .chain()
                .in_set(ControllerSet::Command),
        );
    }
}
