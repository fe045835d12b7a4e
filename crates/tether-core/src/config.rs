// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Simulation configuration and its storage port.
//!
//! Hosts describe a world with a partial JSON document; missing fields take
//! their defaults and the result is validated once into an immutable
//! [`SimConfig`].

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tether_math::{Fx, Vec2};
use thiserror::Error;

/// Storage port for raw config blobs (keyed by logical name).
pub trait ConfigStore {
    /// Load a raw config blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw config blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Error type for config loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in store.
    #[error("not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A field failed validation.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// On-disk shape of [`SimConfig`]. Every field is optional in the document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfigFile {
    /// Gravity as `[x, y]` in m/s².
    pub gravity: [f64; 2],
    /// Velocity solver iterations.
    pub velocity_iterations: u32,
    /// Position solver iterations.
    pub position_iterations: u32,
    /// Fixed step in seconds.
    pub fixed_time_step: f64,
    /// Cap on fixed steps per frame.
    pub max_sub_steps: u32,
}

impl Default for SimConfigFile {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81],
            velocity_iterations: 8,
            position_iterations: 3,
            fixed_time_step: 1.0 / 60.0,
            max_sub_steps: 10,
        }
    }
}

/// Validated, immutable world parameters.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(try_from = "SimConfigFile", into = "SimConfigFile")]
pub struct SimConfig {
    gravity: Vec2,
    velocity_iterations: u32,
    position_iterations: u32,
    fixed_time_step: Fx,
    max_sub_steps: u32,
}

impl SimConfig {
    /// Parses and validates a (possibly partial) JSON document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Serde`] for malformed JSON or unknown fields,
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let raw: SimConfigFile = serde_json::from_slice(bytes)?;
        Self::try_from(raw)
    }

    /// Gravity passed to the engine adapter.
    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Velocity solver iterations.
    pub fn velocity_iterations(&self) -> u32 {
        self.velocity_iterations
    }

    /// Position solver iterations.
    pub fn position_iterations(&self) -> u32 {
        self.position_iterations
    }

    /// Fixed step duration.
    pub fn fixed_time_step(&self) -> Fx {
        self.fixed_time_step
    }

    /// Cap on fixed steps per frame.
    pub fn max_sub_steps(&self) -> u32 {
        self.max_sub_steps
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(Fx::ZERO, Fx::from_f64(-9.81)),
            velocity_iterations: 8,
            position_iterations: 3,
            fixed_time_step: Fx::from_ratio(1, 60),
            max_sub_steps: 10,
        }
    }
}

fn finite(field: &'static str, v: f64) -> Result<f64, ConfigError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ConfigError::invalid(field, format!("{v} is not finite")))
    }
}

impl TryFrom<SimConfigFile> for SimConfig {
    type Error = ConfigError;

    fn try_from(raw: SimConfigFile) -> Result<Self, Self::Error> {
        let [gx, gy] = raw.gravity;
        let gravity = Vec2::new(
            Fx::from_f64(finite("gravity", gx)?),
            Fx::from_f64(finite("gravity", gy)?),
        );
        let fixed_time_step = Fx::from_f64(finite("fixed_time_step", raw.fixed_time_step)?);
        if fixed_time_step <= Fx::ZERO {
            return Err(ConfigError::invalid(
                "fixed_time_step",
                format!("{} must be positive", raw.fixed_time_step),
            ));
        }
        if raw.max_sub_steps == 0 {
            return Err(ConfigError::invalid("max_sub_steps", "must be at least 1"));
        }
        if raw.velocity_iterations == 0 {
            return Err(ConfigError::invalid("velocity_iterations", "must be at least 1"));
        }
        if raw.position_iterations == 0 {
            return Err(ConfigError::invalid("position_iterations", "must be at least 1"));
        }
        Ok(Self {
            gravity,
            velocity_iterations: raw.velocity_iterations,
            position_iterations: raw.position_iterations,
            fixed_time_step,
            max_sub_steps: raw.max_sub_steps,
        })
    }
}

impl From<SimConfig> for SimConfigFile {
    fn from(cfg: SimConfig) -> Self {
        Self {
            gravity: [cfg.gravity.x.to_f64(), cfg.gravity.y.to_f64()],
            velocity_iterations: cfg.velocity_iterations,
            position_iterations: cfg.position_iterations,
            fixed_time_step: cfg.fixed_time_step.to_f64(),
            max_sub_steps: cfg.max_sub_steps,
        }
    }
}

/// Thin service that serializes config values and delegates storage to a `ConfigStore`.
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Create a new service using the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Consume the service and return the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Load and deserialize a config value for `key`. Returns `Ok(None)` if missing.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        match self.store.load_raw(key) {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(ConfigError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Serialize and persist a config value for `key`.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), ConfigError>
    where
        T: Serialize,
    {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }

    /// Loads the world config stored under `key`, falling back to defaults
    /// when nothing is stored.
    ///
    /// # Errors
    ///
    /// Store failures other than `NotFound`, parse errors, and validation
    /// errors.
    pub fn load_sim_config(&self, key: &str) -> Result<SimConfig, ConfigError> {
        self.load::<SimConfigFile>(key)?
            .map_or_else(|| Ok(SimConfig::default()), SimConfig::try_from)
    }
}
