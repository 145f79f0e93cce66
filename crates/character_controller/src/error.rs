use thiserror::Error;

/// Configuration mistakes caught when tunables are loaded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControllerError {
    #[error("crouch speed {0} is outside 0..=1")]
    CrouchSpeedOutOfRange(f32),

    #[error("movement smoothing {0} is outside 0..=0.3")]
    SmoothingOutOfRange(f32),

    #[error("{name} radius must be positive and finite, got {value}")]
    InvalidRadius { name: &'static str, value: f32 },

    #[error("jump force must be finite, got {0}")]
    InvalidJumpForce(f32),

    #[error("speed scale must be finite, got {0}")]
    InvalidSpeedScale(f32),

    #[error("run speed must be finite and not negative, got {0}")]
    InvalidRunSpeed(f32),
}
