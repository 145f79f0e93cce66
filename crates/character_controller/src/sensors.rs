//! Ground and ceiling overlap probes.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::components::{CharacterController, ContactProbe};

pub const DEFAULT_GROUNDED_RADIUS: f32 = 0.2;
pub const DEFAULT_CEILING_RADIUS: f32 = 0.2;

/// Where and against what the probes of a character test for overlaps.
///
/// Offsets are in the character's local space, so they follow its scale
/// when the sprite is flipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactSensors {
    pub ground_check: Vec2,
    pub ceiling_check: Vec2,
    pub grounded_radius: f32,
    pub ceiling_radius: f32,
    /// Layers that count as ground. The ceiling probe uses the same mask.
    pub ground_layers: LayerMask,
}

impl Default for ContactSensors {
    fn default() -> Self {
        Self {
            ground_check: Vec2::new(0.0, -0.5),
            ceiling_check: Vec2::new(0.0, 0.5),
            grounded_radius: DEFAULT_GROUNDED_RADIUS,
            ceiling_radius: DEFAULT_CEILING_RADIUS,
            ground_layers: LayerMask::ALL,
        }
    }
}

impl ContactSensors {
    fn filter(&self, owner: Entity, crouch_collider: Option<Entity>) -> SpatialQueryFilter {
        SpatialQueryFilter::from_mask(self.ground_layers)
            .with_excluded_entities(std::iter::once(owner).chain(crouch_collider))
    }
}

/// World position of a probe at local `offset` on a body at `position`.
///
/// Negative `scale.x` mirrors the offset along with the sprite.
pub fn probe_point(position: Vec2, rotation: Rotation, scale: Vec3, offset: Vec2) -> Vec2 {
    position + rotation * (offset * scale.truncate())
}

/// Runs both probes for every character and stores the raw results.
///
/// Probes follow the physics pose rather than `GlobalTransform`, so they stay
/// current when a frame runs several fixed steps. Colliders of the character
/// itself never count as ground or ceiling.
pub fn probe_contacts(
    spatial: SpatialQuery,
    mut characters: Query<(
        Entity,
        &CharacterController,
        &Position,
        &Rotation,
        &Transform,
        &mut ContactProbe,
    )>,
) {
    for (entity, controller, position, rotation, transform, mut probe) in &mut characters {
        let sensors = &controller.sensors;
        let filter = sensors.filter(entity, controller.crouch_collider);

        let ground_at = probe_point(position.0, *rotation, transform.scale, sensors.ground_check);
        let ceiling_at = probe_point(position.0, *rotation, transform.scale, sensors.ceiling_check);

        let ground = !spatial
            .shape_intersections(&Collider::circle(sensors.grounded_radius), ground_at, 0.0, &filter)
            .is_empty();
        let ceiling = !spatial
            .shape_intersections(&Collider::circle(sensors.ceiling_radius), ceiling_at, 0.0, &filter)
            .is_empty();

        probe.set_if_neq(ContactProbe { ground, ceiling });
    }
}
