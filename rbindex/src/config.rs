//! Simulation run configuration.
//!
//! This module provides configuration loading for the `rbindex` binary from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `RBINDEX_SEED`: Seed for the operation generator (default: `42`)
//! - `RBINDEX_OPERATIONS`: Number of operations to run (default: `10000`)
//! - `RBINDEX_KEY_SPACE`: Keys are drawn from `1..=key_space` (default: `1000`)
//! - `RBINDEX_REMOVE_RATE`: Probability of a remove, `0.0` to `1.0` (default: `0.4`)
//! - `RBINDEX_ARENA`: Node store, `hash` or `dense` (default: `hash`)
//!
//! # Invariants
//!
//! - `key_space` is at least 1
//! - with the `dense` arena, `key_space` is at most `RunConfig::MAX_DENSE_KEY_SPACE`
//! - `remove_rate` is within `0.0..=1.0`

use crate::index::Key;
use crate::simulation::SimulatorConfig;

/// Which node store the simulation runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaKind {
    /// `HashArena`: unbounded, sparse keys.
    Hash,
    /// `DenseArena`: vector slots bounded by the key space.
    Dense,
}

impl std::str::FromStr for ArenaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hash" => Ok(Self::Hash),
            "dense" => Ok(Self::Dense),
            other => Err(format!("'{other}' is not an arena kind (expected 'hash' or 'dense')")),
        }
    }
}

impl std::fmt::Display for ArenaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hash => write!(f, "hash"),
            Self::Dense => write!(f, "dense"),
        }
    }
}

/// Simulation run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Seed for the operation generator.
    pub seed: u64,
    /// Number of operations to run.
    pub operations: usize,
    /// Keys are drawn from `1..=key_space`.
    pub key_space: Key,
    /// Probability of a remove vs insert.
    pub remove_rate: f64,
    /// Node store to run against.
    pub arena: ArenaKind,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: Self::DEFAULT_SEED,
            operations: Self::DEFAULT_OPERATIONS,
            key_space: Self::DEFAULT_KEY_SPACE,
            remove_rate: Self::DEFAULT_REMOVE_RATE,
            arena: ArenaKind::Hash,
        }
    }
}

impl RunConfig {
    /// Default generator seed.
    pub const DEFAULT_SEED: u64 = 42;
    /// Default number of operations.
    pub const DEFAULT_OPERATIONS: usize = 10_000;
    /// Default key space.
    pub const DEFAULT_KEY_SPACE: Key = 1_000;
    /// Default remove rate.
    pub const DEFAULT_REMOVE_RATE: f64 = 0.4;
    /// Largest key space the dense arena is run with (512 MiB of slots).
    pub const MAX_DENSE_KEY_SPACE: Key = 1 << 24;

    /// Load configuration from environment variables.
    ///
    /// Unset variables take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is set but does not parse, or parses
    /// to a value outside its range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let seed = parse_var(&lookup, "RBINDEX_SEED")?.unwrap_or(Self::DEFAULT_SEED);
        let operations =
            parse_var(&lookup, "RBINDEX_OPERATIONS")?.unwrap_or(Self::DEFAULT_OPERATIONS);

        let key_space = parse_var(&lookup, "RBINDEX_KEY_SPACE")?.unwrap_or(Self::DEFAULT_KEY_SPACE);
        if key_space == 0 {
            return Err(invalid("RBINDEX_KEY_SPACE", "must be at least 1"));
        }

        let remove_rate: f64 =
            parse_var(&lookup, "RBINDEX_REMOVE_RATE")?.unwrap_or(Self::DEFAULT_REMOVE_RATE);
        if !(0.0..=1.0).contains(&remove_rate) {
            return Err(invalid(
                "RBINDEX_REMOVE_RATE",
                format!("{remove_rate} is not between 0.0 and 1.0"),
            ));
        }

        let arena = parse_var(&lookup, "RBINDEX_ARENA")?.unwrap_or(ArenaKind::Hash);
        if arena == ArenaKind::Dense && key_space > Self::MAX_DENSE_KEY_SPACE {
            return Err(invalid(
                "RBINDEX_KEY_SPACE",
                format!(
                    "{key_space} exceeds the dense arena limit of {}",
                    Self::MAX_DENSE_KEY_SPACE
                ),
            ));
        }

        Ok(Self {
            seed,
            operations,
            key_space,
            remove_rate,
            arena,
        })
    }

    /// Simulator configuration for this run.
    #[must_use]
    pub fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig::new(self.seed)
            .with_operations(self.operations)
            .with_key_space(self.key_space)
            .with_remove_rate(self.remove_rate)
    }
}

/// Parse `name` if it is set.
fn parse_var<T>(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| invalid(name, format!("'{value}': {e}")))
        })
        .transpose()
}

fn invalid(name: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        message: message.into(),
    }
}
