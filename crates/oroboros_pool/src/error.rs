//! # Pool Error Types
//!
//! All errors that can occur while registering pools and handing out
//! instances. Every variant is a configuration or usage mistake, never a
//! transient condition worth retrying.

use std::path::PathBuf;

use thiserror::Error;

use crate::template::TemplateId;

/// Errors raised by pools and the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Two pool configurations share a template.
    #[error("same template in multiple pools: {name} ({template})")]
    DuplicateTemplate {
        /// The colliding template.
        template: TemplateId,
        /// Display name of the colliding template.
        name: String,
    },

    /// No pool is registered for the template.
    #[error("no pool registered for template {0}")]
    UnknownTemplate(TemplateId),

    /// The registry or pool has not been initialized yet.
    #[error("pool used before initialization")]
    NotInitialized,

    /// The registry or pool was initialized twice.
    #[error("pool already initialized")]
    AlreadyInitialized,

    /// A fail-fast pool has no free instance left.
    #[error("pool for template {template} exhausted: capacity {capacity}")]
    PoolExhausted {
        /// The exhausted pool's template.
        template: TemplateId,
        /// Number of instances the pool owns.
        capacity: usize,
    },

    /// The handle refers to an instance that was released or recycled.
    #[error("stale handle for template {template}, slot {slot}")]
    StaleHandle {
        /// Template named by the handle.
        template: TemplateId,
        /// Slot named by the handle.
        slot: u32,
    },
}

/// Errors raised while loading pool configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read pool configuration {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for this schema.
    #[error("malformed pool configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but is semantically invalid.
    #[error("invalid pool configuration: {0}")]
    Invalid(String),

    /// Registry construction from the configuration failed.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
