// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for Tether crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`engine`] - Scripted physics engine adapter
//! - [`fixtures`] - Notification builders, call recorder and world setup

pub mod config;
pub mod engine;
pub mod fixtures;

pub use config::InMemoryConfigStore;
pub use engine::{ScriptedBody, ScriptedEngine, ScriptedStepError};
pub use fixtures::{
    contact, contact_begin, contact_end, pre_solve, sensor_begin, sleep, world_with_bodies,
    Recorder,
};
