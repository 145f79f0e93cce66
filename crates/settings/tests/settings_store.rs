//! Integration tests for the SettingsStore:
//! - Only changed (delta) fields are persisted
//! - Reloading after external file modification
//! - Malformed and unregistered sections

use std::collections::HashMap;
use std::fs;

use serde::{Deserialize, Serialize};
use settings::{Settings, SettingsError, SettingsStore};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Probe {
    radius: f32,
    enabled: bool,
}

impl Default for Probe {
    fn default() -> Self {
        Self {
            radius: 0.2,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Movement {
    jump_force: f32,
    air_control: bool,
    probe: Probe,
}

impl Default for Movement {
    fn default() -> Self {
        Self {
            jump_force: 400.0,
            air_control: false,
            probe: Probe::default(),
        }
    }
}

impl Settings for Movement {
    const SECTION: &'static str = "movement";
}

fn read_file(path: &std::path::Path) -> HashMap<String, serde_json::Value> {
    let content = fs::read_to_string(path).expect("read delta file");
    ron::from_str(&content).expect("parse delta RON")
}

#[test]
fn register_get_update_writes_only_changed_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.ron");

    let store = SettingsStore::builder()
        .with_settings_file(&path)
        .build()
        .expect("build store");
    store.register::<Movement>().expect("register movement");

    assert!(!path.exists(), "nothing is written before the first update");

    let movement = store.get::<Movement>().unwrap();
    assert_eq!(*movement, Movement::default());

    store
        .update::<Movement, _>(|m| m.probe.enabled = false)
        .expect("update nested field");

    let root = read_file(&path);
    let section = root.get("movement").expect("movement section");
    assert_eq!(section, &serde_json::json!({ "probe": { "enabled": false } }));

    let movement = store.get::<Movement>().unwrap();
    assert!(!movement.probe.enabled);
    assert_eq!(movement.jump_force, 400.0);
}

#[test]
fn reverting_to_defaults_removes_the_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.ron");

    let store = SettingsStore::builder()
        .with_settings_file(&path)
        .build()
        .unwrap();
    store.register::<Movement>().unwrap();

    store
        .update::<Movement, _>(|m| m.air_control = true)
        .unwrap();
    assert!(read_file(&path).contains_key("movement"));

    store
        .update::<Movement, _>(|m| m.air_control = false)
        .unwrap();
    assert!(read_file(&path).is_empty());
}

#[test]
fn existing_file_is_merged_on_register() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.ron");
    fs::write(&path, r#"{ "movement": { "jump_force": 650.0 } }"#).unwrap();

    let store = SettingsStore::builder()
        .with_settings_file(&path)
        .build()
        .unwrap();
    store.register::<Movement>().unwrap();

    let movement = store.get::<Movement>().unwrap();
    assert_eq!(movement.jump_force, 650.0);
    assert_eq!(movement.probe, Probe::default());
}

#[test]
fn reload_picks_up_external_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.ron");

    let store = SettingsStore::builder()
        .with_settings_file(&path)
        .build()
        .unwrap();
    store.register::<Movement>().unwrap();

    fs::write(&path, r#"{ "movement": { "air_control": true } }"#).unwrap();
    assert!(!store.get::<Movement>().unwrap().air_control);

    store.reload().expect("reload");
    assert!(store.get::<Movement>().unwrap().air_control);

    fs::remove_file(&path).unwrap();
    store.reload().expect("reload without file");
    assert!(!store.get::<Movement>().unwrap().air_control);
}

#[test]
fn unregistered_section_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::builder()
        .with_settings_file(dir.path().join("settings.ron"))
        .build()
        .unwrap();

    assert!(store.try_get::<Movement>().unwrap().is_none());
    assert!(matches!(
        store.get::<Movement>(),
        Err(SettingsError::NotRegistered)
    ));
}

#[test]
fn double_registration_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::builder()
        .with_settings_file(dir.path().join("settings.ron"))
        .build()
        .unwrap();

    store.register::<Movement>().unwrap();
    assert!(matches!(
        store.register::<Movement>(),
        Err(SettingsError::Invalid(_))
    ));
}

#[test]
fn mistyped_delta_fails_registration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.ron");
    fs::write(&path, r#"{ "movement": { "jump_force": "high" } }"#).unwrap();

    let store = SettingsStore::builder()
        .with_settings_file(&path)
        .build()
        .unwrap();
    assert!(matches!(
        store.register::<Movement>(),
        Err(SettingsError::Value(_))
    ));
}
