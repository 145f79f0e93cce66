#![cfg(feature = "bevy")]

use bevy::{
    app::App,
    ecs::resource::Resource,
    prelude::{Deref, DerefMut, World},
};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

use crate::{Settings, SettingsStore};

#[derive(Resource, Clone)]
pub struct SettingsStoreRef(pub Arc<SettingsStore>);

/// Snapshot of one settings section as a Bevy resource.
#[derive(Resource, Deref, DerefMut, Clone)]
pub struct SettingsArc<T: Send + Sync + 'static>(pub Arc<T>);

#[derive(Resource, Default)]
struct SettingsRegistry {
    updaters: Vec<fn(&Arc<SettingsStore>, &mut World)>,
}

pub trait AppSettingsExt {
    fn insert_settings_store(&mut self, store: SettingsStore) -> &mut Self;
    fn register_settings_section<S>(&mut self) -> &mut Self
    where
        S: Settings + Default + Serialize + DeserializeOwned;
}

impl AppSettingsExt for App {
    fn insert_settings_store(&mut self, store: SettingsStore) -> &mut Self {
        self.world_mut()
            .insert_resource(SettingsStoreRef(Arc::new(store)));
        self.world_mut().init_resource::<SettingsRegistry>();
        self
    }

    fn register_settings_section<S>(&mut self) -> &mut Self
    where
        S: Settings + Default + Serialize + DeserializeOwned,
    {
        let store = self.world().resource::<SettingsStoreRef>().0.clone();

        if !store.is_registered::<S>() {
            if let Err(err) = store.register::<S>() {
                tracing::warn!("Using defaults for section '{}': {err}", S::name());
            }
        }
        let seed = store
            .get::<S>()
            .unwrap_or_else(|_| Arc::new(S::default()));
        self.world_mut().insert_resource(SettingsArc::<S>(seed));

        fn update_one<S: Settings + DeserializeOwned>(store: &Arc<SettingsStore>, world: &mut World) {
            match store.get::<S>() {
                Ok(fresh) => world.resource_mut::<SettingsArc<S>>().0 = fresh,
                Err(err) => {
                    tracing::warn!("Keeping previous '{}' settings: {err}", S::name());
                }
            }
        }
        self.world_mut()
            .resource_mut::<SettingsRegistry>()
            .updaters
            .push(update_one::<S>);
        self
    }
}

/// Exclusive system: re-read the settings file and refresh every registered
/// `SettingsArc` resource.
pub fn reload_settings(world: &mut World) {
    let Some(store) = world.get_resource::<SettingsStoreRef>().map(|r| r.0.clone()) else {
        return;
    };
    if let Err(err) = store.reload() {
        tracing::warn!("Failed to reload settings: {err}");
        return;
    }

    let updaters = world
        .get_resource::<SettingsRegistry>()
        .map(|registry| registry.updaters.clone())
        .unwrap_or_default();
    for update in updaters {
        update(&store, world);
    }
}
