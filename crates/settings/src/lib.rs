//! Typed settings sections backed by a single RON delta file.
//!
//! Each section is a plain struct that implements [`Settings`] and [`Default`].
//! The store serializes the defaults, overlays whatever the user changed and
//! writes back only the fields that still differ from the defaults.

#[cfg(feature = "bevy")]
mod bevy_adapter;
mod errors;
mod store;

#[cfg(feature = "bevy")]
pub use bevy_adapter::*;
pub use errors::SettingsError;
pub use store::{SettingsStore, SettingsStoreBuilder};

/// A strongly typed section of the settings file.
///
/// ```ignore
/// #[derive(Clone, Default, Serialize, Deserialize)]
/// struct Input { run_speed: f32 }
///
/// impl Settings for Input {
///     const SECTION: &'static str = "input";
/// }
/// ```
pub trait Settings: Send + Sync + 'static {
    /// Top-level key of this section inside the settings file.
    const SECTION: &'static str;

    fn name() -> &'static str {
        Self::SECTION
    }
}
