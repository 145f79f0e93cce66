use app::{AppBuilder, Application, BevyApp, LOG_MAIN};
use avian2d::prelude::*;
use bevy::input::common_conditions::input_just_pressed;
use bevy::{log::LogPlugin, prelude::*};
use character_controller::prelude::*;
use settings::{AppSettingsExt, SettingsStore, reload_settings};

use crate::level::LevelPlugin;

pub struct Platformer;

impl Application for Platformer {
    const APP_ID: &'static str = "platformer";
}

pub fn init() -> anyhow::Result<BevyApp<Platformer>> {
    let builder = AppBuilder::<Platformer>::new(env!("CARGO_PKG_VERSION"))
        .map_err(|err| anyhow::anyhow!(err))?;

    let store = SettingsStore::builder()
        .with_settings_file(builder.context().path_context().settings_file())
        .build()?;
    tracing::info!(target: LOG_MAIN, "Settings file: {}", store.file_path().display());

    let app = builder.build_with_bevy(|mut app, _ctx| {
        // Logging is owned by AppBuilder; Bevy must not install a second subscriber.
        app.add_plugins(
            DefaultPlugins
                .build()
                .disable::<LogPlugin>()
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Platformer".to_string(),
                        ..default()
                    }),
                    ..default()
                }),
        );

        app.insert_settings_store(store)
            .register_settings_section::<ControllerSettings>()
            .register_settings_section::<InputSettings>();

        app.add_plugins((
            PhysicsPlugins::default(),
            CharacterControllerPlugin::default(),
            PlayerInputPlugin::default(),
            LevelPlugin,
        ))
        .add_systems(Update, reload_settings.run_if(input_just_pressed(KeyCode::F5)));
        app
    });

    Ok(app)
}
