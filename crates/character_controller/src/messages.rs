use bevy::prelude::*;

/// One step of movement intent for a single character.
///
/// `horizontal` is already scaled by run speed and step duration, so its
/// magnitude is usually small and its sign encodes the direction.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct MoveCommand {
    pub entity: Entity,
    pub horizontal: f32,
    pub crouch: bool,
    pub jump: bool,
}

impl MoveCommand {
    pub fn new(entity: Entity, horizontal: f32, crouch: bool, jump: bool) -> Self {
        Self {
            entity,
            horizontal,
            crouch,
            jump,
        }
    }
}

/// The character touched ground after being airborne.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landed {
    pub entity: Entity,
}

/// The character started or stopped crouching.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrouchChanged {
    pub entity: Entity,
    pub crouching: bool,
}
