// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
use tether_core::config::{ConfigError, ConfigService, SimConfigFile};
use tether_core::{Fx, SimConfig, Vec2};
use tether_dry_tests::InMemoryConfigStore;

#[test]
fn missing_key_yields_defaults() {
    let service = ConfigService::new(InMemoryConfigStore::new());
    let cfg = service.load_sim_config("world").expect("load");
    assert_eq!(cfg, SimConfig::default());
}

#[test]
fn stored_document_is_merged_over_defaults() {
    let store = InMemoryConfigStore::with_entry("world", br#"{ "gravity": [0.0, -1.5] }"#);
    let service = ConfigService::new(store.clone());
    let cfg = service.load_sim_config("world").expect("load");
    assert_eq!(cfg.gravity(), Vec2::new(Fx::ZERO, Fx::from_f32(-1.5)));
    assert_eq!(cfg.max_sub_steps(), 10);
    assert_eq!(store.load_count(), 1);
}

#[test]
fn save_then_load_round_trips() {
    let service = ConfigService::new(InMemoryConfigStore::new());
    let mut file = SimConfigFile::default();
    file.max_sub_steps = 3;
    file.fixed_time_step = 0.125;
    service.save("world", &file).expect("save");

    let cfg = service.load_sim_config("world").expect("load");
    assert_eq!(cfg.max_sub_steps(), 3);
    assert_eq!(cfg.fixed_time_step(), Fx::from_ratio(1, 8));
}

#[test]
fn invalid_stored_values_are_rejected() {
    let store = InMemoryConfigStore::with_entry("world", br#"{ "fixed_time_step": -1.0 }"#);
    let err = ConfigService::new(store)
        .load_sim_config("world")
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid {
            field: "fixed_time_step",
            ..
        }
    ));
}

#[test]
fn store_failures_propagate() {
    let store = InMemoryConfigStore::new();
    store.set_fail_on_load(true);
    let err = ConfigService::new(store)
        .load_sim_config("world")
        .unwrap_err();
    assert!(matches!(err, ConfigError::Other(_)));
}
