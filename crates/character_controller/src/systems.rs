use app::LOG_CONTROLLER;
use avian2d::prelude::*;
use bevy::prelude::*;
use tracing::{debug, warn};

use crate::components::{CharacterController, ContactProbe, Locomotion};
use crate::locomotion::{MoveInput, jump_velocity_change};
use crate::messages::{CrouchChanged, Landed, MoveCommand};

/// Turns fresh probe results into the grounded state and emits [`Landed`].
pub fn detect_ground(
    mut characters: Query<(Entity, &ContactProbe, &mut Locomotion), With<CharacterController>>,
    mut landed: MessageWriter<Landed>,
) {
    for (entity, probe, mut locomotion) in &mut characters {
        if locomotion.sense_ground(probe.ground) {
            debug!(target: LOG_CONTROLLER, "Character {entity} landed");
            landed.write(Landed { entity });
        }
    }
}

/// Applies every pending [`MoveCommand`] to its character.
pub fn drive_characters(
    mut commands: Commands,
    time: Res<Time>,
    mut moves: MessageReader<MoveCommand>,
    mut crouch_changes: MessageWriter<CrouchChanged>,
    mut characters: Query<(
        &CharacterController,
        &mut Locomotion,
        &ContactProbe,
        &mut LinearVelocity,
        &mut Transform,
        Option<&ComputedMass>,
    )>,
    crouch_colliders: Query<Has<ColliderDisabled>>,
) {
    let dt = time.delta_secs();

    for command in moves.read() {
        let Ok((controller, mut locomotion, probe, mut velocity, mut transform, mass)) =
            characters.get_mut(command.entity)
        else {
            warn!(target: LOG_CONTROLLER, "Move command for {} which has no character controller", command.entity);
            continue;
        };

        let input = MoveInput {
            horizontal: command.horizontal,
            crouch: command.crouch,
            jump: command.jump,
        };
        let outcome = locomotion.drive(&controller.tuning, input, probe.ceiling, velocity.0, dt);
        velocity.0 = outcome.velocity;

        if outcome.flipped {
            transform.scale.x *= -1.0;
        }

        if let Some(crouching) = outcome.crouch_changed {
            crouch_changes.write(CrouchChanged {
                entity: command.entity,
                crouching,
            });
        }

        if let (Some(enabled), Some(collider)) =
            (outcome.crouch_collider_enabled, controller.crouch_collider)
        {
            match crouch_colliders.get(collider) {
                Ok(disabled) if disabled && enabled => {
                    commands.entity(collider).try_remove::<ColliderDisabled>();
                }
                Ok(disabled) if !disabled && !enabled => {
                    commands.entity(collider).try_insert(ColliderDisabled);
                }
                Ok(_) => {}
                Err(_) => {
                    warn!(target: LOG_CONTROLLER, "Crouch collider {collider} of {} does not exist", command.entity);
                }
            }
        }

        if outcome.jumped {
            let inverse_mass = mass
                .map(|mass| mass.inverse())
                .filter(|inverse| inverse.is_finite() && *inverse > 0.0)
                .unwrap_or(1.0);
            velocity.y += jump_velocity_change(controller.tuning.jump_force, inverse_mass, dt);
            debug!(target: LOG_CONTROLLER, "Character {} jumped", command.entity);
        }
    }
}
