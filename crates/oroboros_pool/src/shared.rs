//! # Shared Registry
//!
//! Thread-safe view of an initialized [`PoolRegistry`](crate::PoolRegistry).
//!
//! The template mapping is frozen into an immutable snapshot shared by
//! every clone. Each pool sits behind its own lock, so spawning from two
//! different pools never contends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use oroboros_core::{Hierarchy, NodeId};
use parking_lot::Mutex;

use crate::error::{PoolError, PoolResult};
use crate::placement::Placement;
use crate::pool::{Instance, InstanceHandle, Pool};
use crate::registry::{PoolGroup, RegistryConfig, RegistryStats};
use crate::template::TemplateId;

struct Inner {
    config: RegistryConfig,
    hierarchy: Hierarchy,
    root: NodeId,
    /// Group name per pool, parallel to `pools`.
    group_names: Vec<String>,
    pools: Vec<Mutex<Pool>>,
    index: HashMap<TemplateId, usize>,
    containers: HashMap<TemplateId, NodeId>,
    unknown_lookups: AtomicU64,
}

/// Cloneable, `Send + Sync` pool registry.
///
/// Created with [`PoolRegistry::into_shared`](crate::PoolRegistry::into_shared).
/// The set of pools is fixed; only pool contents change.
#[derive(Clone)]
pub struct SharedPoolRegistry {
    inner: Arc<Inner>,
}

impl SharedPoolRegistry {
    pub(crate) fn from_parts(
        config: RegistryConfig,
        hierarchy: Hierarchy,
        root: NodeId,
        groups: Vec<PoolGroup>,
        containers: HashMap<TemplateId, NodeId>,
        unknown_lookups: u64,
    ) -> Self {
        let mut group_names = Vec::new();
        let mut pools = Vec::new();
        let mut index = HashMap::new();
        for group in groups {
            let (name, group_pools) = group.into_parts();
            for pool in group_pools {
                index.insert(pool.template_id(), pools.len());
                group_names.push(name.clone());
                pools.push(Mutex::new(pool));
            }
        }

        Self {
            inner: Arc::new(Inner {
                config,
                hierarchy,
                root,
                group_names,
                pools,
                index,
                containers,
                unknown_lookups: AtomicU64::new(unknown_lookups),
            }),
        }
    }

    fn pool(&self, template: TemplateId) -> Option<&Mutex<Pool>> {
        let slot = *self.inner.index.get(&template)?;
        self.inner.pools.get(slot)
    }

    /// Registry-wide policy.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Hands out a prepared instance of `template`. Failures are logged.
    pub fn acquire(&self, template: TemplateId, placement: impl Into<Placement>) -> Option<InstanceHandle> {
        match self.try_acquire(template, placement) {
            Ok(handle) => Some(handle),
            Err(error) => {
                tracing::error!(template = %template, %error, "pool registry could not hand out instance");
                None
            }
        }
    }

    /// Hands out a prepared instance of `template`.
    ///
    /// # Errors
    ///
    /// - [`PoolError::UnknownTemplate`] if no pool owns `template`
    /// - [`PoolError::PoolExhausted`] if the pool refused
    pub fn try_acquire(&self, template: TemplateId, placement: impl Into<Placement>) -> PoolResult<InstanceHandle> {
        let Some(pool) = self.pool(template) else {
            self.inner.unknown_lookups.fetch_add(1, Ordering::Relaxed);
            return Err(PoolError::UnknownTemplate(template));
        };
        pool.lock().acquire(&placement.into())
    }

    /// Returns an instance to its pool.
    ///
    /// # Errors
    ///
    /// - [`PoolError::UnknownTemplate`] if no pool owns the handle's template
    /// - [`PoolError::StaleHandle`] if already released or recycled
    pub fn release(&self, handle: InstanceHandle) -> PoolResult<()> {
        self.pool(handle.template())
            .ok_or(PoolError::UnknownTemplate(handle.template()))?
            .lock()
            .release(handle)
    }

    /// Runs `f` on a handed-out instance while its pool is locked.
    pub fn with_instance<R>(&self, handle: InstanceHandle, f: impl FnOnce(&Instance) -> R) -> Option<R> {
        let pool = self.pool(handle.template())?.lock();
        pool.get(handle).map(f)
    }

    /// Runs `f` on a handed-out instance mutably while its pool is locked.
    pub fn with_instance_mut<R>(&self, handle: InstanceHandle, f: impl FnOnce(&mut Instance) -> R) -> Option<R> {
        let mut pool = self.pool(handle.template())?.lock();
        pool.get_mut(handle).map(f)
    }

    /// Whether a pool is registered for `template`.
    #[must_use]
    pub fn contains(&self, template: TemplateId) -> bool {
        self.inner.index.contains_key(&template)
    }

    /// Number of registered pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.pools.len()
    }

    /// Whether no pool is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.pools.is_empty()
    }

    /// Group the pool for `template` was declared in.
    #[must_use]
    pub fn group_of(&self, template: TemplateId) -> Option<&str> {
        let slot = *self.inner.index.get(&template)?;
        self.inner.group_names.get(slot).map(String::as_str)
    }

    /// Container nodes and the registry root.
    #[must_use]
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.inner.hierarchy
    }

    /// The registry's root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.inner.root
    }

    /// Container node of the pool for `template`.
    #[must_use]
    pub fn container(&self, template: TemplateId) -> Option<NodeId> {
        self.inner.containers.get(&template).copied()
    }

    /// Lookups for templates with no pool.
    #[must_use]
    pub fn unknown_lookups(&self) -> u64 {
        self.inner.unknown_lookups.load(Ordering::Relaxed)
    }

    /// Current counters. Each pool is locked in turn, not all at once.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            pools: self.inner.pools.iter().map(|p| p.lock().stats()).collect(),
            unknown_lookups: self.unknown_lookups(),
        }
    }
}
