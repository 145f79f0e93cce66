use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{Settings, SettingsError};

type Sections = BTreeMap<String, Value>;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Serialize a section into an object tree.
fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>, SettingsError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(SettingsError::Invalid("section must serialize to a map")),
    }
}

/// Overlay `delta` onto `base`, descending into nested maps.
fn merge(base: &Map<String, Value>, delta: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, patch) in delta {
        let next = match (merged.get(key), patch) {
            (Some(Value::Object(inner)), Value::Object(inner_patch)) => {
                Value::Object(merge(inner, inner_patch))
            }
            _ => patch.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}

/// Fields of `current` that differ from `defaults`, descending into nested maps.
fn diff(current: &Map<String, Value>, defaults: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in current {
        match (value, defaults.get(key)) {
            (Value::Object(inner), Some(Value::Object(inner_default))) => {
                let nested = diff(inner, inner_default);
                if !nested.is_empty() {
                    out.insert(key.clone(), Value::Object(nested));
                }
            }
            (value, Some(default)) if value == default => {}
            (value, _) => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    out
}

fn read_deltas(path: &Path) -> Result<Sections, SettingsError> {
    if !path.exists() {
        return Ok(Sections::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Sections::new());
    }
    Ok(ron::from_str(&content)?)
}

/// Builder for [`SettingsStore`].
#[derive(Default)]
pub struct SettingsStoreBuilder {
    settings_file: Option<PathBuf>,
}

impl SettingsStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_file = Some(path.into());
        self
    }

    pub fn build(self) -> Result<SettingsStore, SettingsError> {
        let file_path = self
            .settings_file
            .ok_or(SettingsError::Invalid("settings file not specified"))?;

        if let Some(dir) = file_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let deltas = read_deltas(&file_path)?;
        tracing::debug!(
            "Opened settings file {:?} with {} changed sections",
            file_path,
            deltas.len()
        );

        Ok(SettingsStore {
            file_path,
            deltas: RwLock::new(deltas),
            defaults: RwLock::new(BTreeMap::new()),
            values: RwLock::new(BTreeMap::new()),
        })
    }
}

/// Thread-safe store of registered settings sections.
///
/// The file is only written by [`SettingsStore::update`]; registering and
/// reading never touch the disk after the initial load.
pub struct SettingsStore {
    file_path: PathBuf,
    deltas: RwLock<Sections>,
    defaults: RwLock<BTreeMap<&'static str, Map<String, Value>>>,
    values: RwLock<BTreeMap<&'static str, Map<String, Value>>>,
}

impl SettingsStore {
    pub fn builder() -> SettingsStoreBuilder {
        SettingsStoreBuilder::new()
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn is_registered<T: Settings>(&self) -> bool {
        read(&self.values).contains_key(T::name())
    }

    /// Register a section: its defaults are merged with whatever delta the
    /// file already holds for it.
    pub fn register<T>(&self) -> Result<(), SettingsError>
    where
        T: Settings + Default + Serialize + DeserializeOwned,
    {
        let section = T::name();
        if self.is_registered::<T>() {
            return Err(SettingsError::Invalid("section already registered"));
        }

        let defaults = to_object(&T::default())?;
        let effective = match read(&self.deltas).get(section) {
            Some(Value::Object(delta)) => merge(&defaults, delta),
            Some(_) => {
                tracing::warn!("Ignoring malformed '{section}' section in settings file");
                defaults.clone()
            }
            None => defaults.clone(),
        };

        // Reject a delta that no longer fits the section type.
        serde_json::from_value::<T>(Value::Object(effective.clone()))?;

        write(&self.defaults).insert(section, defaults);
        write(&self.values).insert(section, effective);
        Ok(())
    }

    /// Snapshot of the effective value of a section.
    pub fn get<T>(&self) -> Result<Arc<T>, SettingsError>
    where
        T: Settings + DeserializeOwned,
    {
        self.try_get::<T>()?.ok_or(SettingsError::NotRegistered)
    }

    /// Like [`SettingsStore::get`], but `None` for an unregistered section.
    pub fn try_get<T>(&self) -> Result<Option<Arc<T>>, SettingsError>
    where
        T: Settings + DeserializeOwned,
    {
        let values = read(&self.values);
        let Some(value) = values.get(T::name()) else {
            return Ok(None);
        };
        let section = serde_json::from_value(Value::Object(value.clone()))?;
        Ok(Some(Arc::new(section)))
    }

    /// Mutate a section and persist the fields that now differ from defaults.
    pub fn update<T, F>(&self, mutator: F) -> Result<(), SettingsError>
    where
        T: Settings + Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let section = T::name();
        let mut current: T = {
            let values = read(&self.values);
            let raw = values.get(section).ok_or(SettingsError::NotRegistered)?;
            serde_json::from_value(Value::Object(raw.clone()))?
        };
        mutator(&mut current);
        let updated = to_object(&current)?;

        let delta = {
            let defaults = read(&self.defaults);
            let section_defaults = defaults.get(section).ok_or(SettingsError::NotRegistered)?;
            diff(&updated, section_defaults)
        };

        write(&self.values).insert(section, updated);
        {
            let mut deltas = write(&self.deltas);
            if delta.is_empty() {
                deltas.remove(section);
            } else {
                deltas.insert(section.to_string(), Value::Object(delta));
            }
        }

        self.persist()
    }

    /// Re-read the file and re-merge every registered section.
    pub fn reload(&self) -> Result<(), SettingsError> {
        let deltas = read_deltas(&self.file_path)?;

        {
            let defaults = read(&self.defaults);
            let mut values = write(&self.values);
            for (&section, section_defaults) in defaults.iter() {
                let effective = match deltas.get(section) {
                    Some(Value::Object(delta)) => merge(section_defaults, delta),
                    _ => section_defaults.clone(),
                };
                values.insert(section, effective);
            }
        }
        *write(&self.deltas) = deltas;

        tracing::info!("Reloaded settings from {:?}", self.file_path);
        Ok(())
    }

    fn persist(&self) -> Result<(), SettingsError> {
        let deltas = read(&self.deltas);
        let text = ron::ser::to_string_pretty(&*deltas, ron::ser::PrettyConfig::default())?;

        let tmp = self.file_path.with_extension("tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.file_path)?;
        Ok(())
    }
}
