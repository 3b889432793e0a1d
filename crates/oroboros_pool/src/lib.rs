//! # OROBOROS Pool System
//!
//! Pre-instantiated, reusable entities for things spawned and despawned
//! every few frames: shadows, ground tiles, platforms, traps.
//!
//! ## Design Principles
//!
//! 1. **Allocate at startup** - every pool pre-creates its instances once
//! 2. **O(1) dispatch** - one hash probe from template to pool
//! 3. **Loud configuration mistakes** - duplicate and unknown templates are
//!    always reported, never papered over with a fallback instance
//! 4. **No hidden globals** - the registry is an ordinary value owned by
//!    the application
//!
//! ## Example
//!
//! ```rust,ignore
//! use oroboros_pool::{Placement, PoolRegistry, PoolSystemConfig, TemplateId};
//!
//! let config = PoolSystemConfig::from_path("data/pools.toml")?;
//! let (mut registry, report) = PoolRegistry::from_config(&config)?;
//!
//! // Hands out a pre-created ground tile, placed at (1, 2, 3)
//! let tile = registry.acquire(TemplateId(2), Vec3::new(1.0, 2.0, 3.0));
//!
//! // ...and takes it back when it scrolls off screen
//! registry.release(tile.unwrap())?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod placement;
pub mod pool;
pub mod registry;
pub mod shared;
pub mod template;

pub use config::{GroupEntry, PoolEntry, PoolSystemConfig};
pub use error::{ConfigError, ConfigResult, PoolError, PoolResult};
pub use placement::Placement;
pub use pool::{ExhaustionPolicy, Instance, InstanceHandle, Pool, PoolConfig, PoolStats};
pub use registry::{
    InitReport, PoolGroup, PoolGroupConfig, PoolRegistry, RegistryConfig, RegistryStats, DEFAULT_ROOT_NAME,
};
pub use shared::SharedPoolRegistry;
pub use template::{Template, TemplateId};

pub use oroboros_core::{Hierarchy, NodeId};
pub use oroboros_shared::{Quaternion, Transform, Vec3};
