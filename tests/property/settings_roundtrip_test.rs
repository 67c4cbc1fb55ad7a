//! Property-based tests for settings persistence.
//!
//! Values written through `set_value` must survive a reload by a fresh
//! engine, and rejected values must leave both memory and disk untouched.

use dashboard::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use dashboard::types::settings::DashboardSettings;
use proptest::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn engine_in(dir: &TempDir) -> SettingsEngine {
    SettingsEngine::new(Some(dir.path().join("settings.json")))
}

/// Valid values for every settable key.
fn arb_valid_edit() -> impl Strategy<Value = (&'static str, serde_json::Value)> {
    prop_oneof![
        (1u32..40).prop_map(|n| ("display.wide_icon_aspect_ratio", json!(f64::from(n) / 4.0))),
        (0i64..86_400).prop_map(|n| ("display.online_recently_window_secs", json!(n))),
        (1u64..120).prop_map(|n| ("network.favicon_timeout_secs", json!(n))),
        "[a-z]{1,8}/[0-9]\\.[0-9]".prop_map(|s| ("network.user_agent", json!(s))),
        "[a-z]{1,12}\\.db".prop_map(|s| ("storage.database_file", json!(s))),
    ]
}

/// Values every key rejects.
fn arb_invalid_edit() -> impl Strategy<Value = (&'static str, serde_json::Value)> {
    prop_oneof![
        (0u32..1000).prop_map(|n| ("display.wide_icon_aspect_ratio", json!(-f64::from(n)))),
        (1i64..86_400).prop_map(|n| ("display.online_recently_window_secs", json!(-n))),
        Just(("network.favicon_timeout_secs", json!(0))),
        "[a-z]{1,8}".prop_map(|s| ("network.favicon_timeout_secs", json!(s))),
        Just(("storage.database_file", json!("  "))),
        "[a-z]{1,8}".prop_map(|s| ("display.unknown_key", json!(s))),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Every accepted edit is visible to a freshly loaded engine.
    #[test]
    fn accepted_edits_survive_reload(edits in prop::collection::vec(arb_valid_edit(), 1..8)) {
        let dir = TempDir::new().unwrap();
        let mut engine = engine_in(&dir);
        engine.load().unwrap();

        for (key, value) in &edits {
            engine.set_value(key, value.clone()).unwrap();
        }

        let mut reloaded = engine_in(&dir);
        let loaded = reloaded.load().unwrap();
        prop_assert_eq!(&loaded, engine.get_settings());

        let tree = serde_json::to_value(&loaded).unwrap();
        for (key, _) in &edits {
            let pointer = format!("/{}", key.replace('.', "/"));
            let last = edits.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.clone());
            prop_assert_eq!(tree.pointer(&pointer).cloned(), last);
        }
    }

    /// A rejected edit changes nothing in memory or on disk.
    #[test]
    fn rejected_edits_change_nothing((key, value) in arb_invalid_edit()) {
        let dir = TempDir::new().unwrap();
        let mut engine = engine_in(&dir);
        engine.set_value("network.favicon_timeout_secs", json!(7)).unwrap();
        let before = engine.get_settings().clone();

        prop_assert!(engine.set_value(key, value).is_err());
        prop_assert_eq!(engine.get_settings(), &before);

        let mut reloaded = engine_in(&dir);
        prop_assert_eq!(reloaded.load().unwrap(), before);
    }

    /// Reset always returns to defaults, whatever was set before.
    #[test]
    fn reset_restores_defaults(edits in prop::collection::vec(arb_valid_edit(), 0..5)) {
        let dir = TempDir::new().unwrap();
        let mut engine = engine_in(&dir);
        for (key, value) in &edits {
            engine.set_value(key, value.clone()).unwrap();
        }

        engine.reset().unwrap();
        prop_assert_eq!(engine.get_settings(), &DashboardSettings::default());
        let mut reloaded = engine_in(&dir);
        prop_assert_eq!(reloaded.load().unwrap(), DashboardSettings::default());
    }
}
