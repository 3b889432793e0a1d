//! # Pool
//!
//! Pre-created instances of one template, handed out and taken back.
//!
//! A pool is created from configuration, initialized once with the
//! container node its instances are grouped under, then queried for the
//! rest of its life. Instances are never destroyed while the pool lives:
//! releasing one only marks it free.
//!
//! ## Exhaustion
//!
//! When every instance is in use the pool follows its [`ExhaustionPolicy`]:
//!
//! | Policy          | Behavior                                          |
//! |-----------------|---------------------------------------------------|
//! | `Grow`          | create one more instance (default)                |
//! | `RecycleOldest` | reclaim the instance that has been out longest    |
//! | `Fail`          | return [`PoolError::PoolExhausted`]               |

use oroboros_core::{NodeId, SlotHandle, SlotPool};
use oroboros_shared::Transform;
use serde::{Deserialize, Serialize};

use crate::error::{PoolError, PoolResult};
use crate::placement::Placement;
use crate::template::{Template, TemplateId};

/// What a pool does when asked for an instance while all are in use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Create a new instance.
    #[default]
    Grow,
    /// Forcibly reclaim the longest-active instance.
    RecycleOldest,
    /// Refuse.
    Fail,
}

/// Construction parameters for one pool.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolConfig {
    /// Blueprint for every instance.
    pub template: Template,
    /// Instances pre-created at initialization.
    pub size: usize,
    /// Behavior when all instances are in use.
    pub exhaustion: ExhaustionPolicy,
}

impl PoolConfig {
    /// Creates a growable pool configuration.
    #[must_use]
    pub fn new(template: Template, size: usize) -> Self {
        Self {
            template,
            size,
            exhaustion: ExhaustionPolicy::Grow,
        }
    }

    /// Sets the exhaustion policy.
    #[must_use]
    pub fn with_exhaustion(mut self, exhaustion: ExhaustionPolicy) -> Self {
        self.exhaustion = exhaustion;
        self
    }
}

/// Handle to one activation of a pooled instance.
///
/// Handles go stale when the instance is released or recycled, and when
/// the pool's container is torn down: a pool re-created after teardown
/// lives under a new container node and rejects handles from the old one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InstanceHandle {
    template: TemplateId,
    container: NodeId,
    slot: SlotHandle,
}

impl InstanceHandle {
    /// Template of the originating pool.
    #[inline]
    #[must_use]
    pub const fn template(self) -> TemplateId {
        self.template
    }

    /// Container node of the pool that issued the handle.
    #[inline]
    #[must_use]
    pub const fn container(self) -> NodeId {
        self.container
    }

    /// Slot index of the instance inside its pool.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> u32 {
        self.slot.index()
    }

    const fn stale(self) -> PoolError {
        PoolError::StaleHandle {
            template: self.template,
            slot: self.slot.index(),
        }
    }
}

/// A pooled entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    template: TemplateId,
    index: u32,
    parent: NodeId,
    active: bool,
    activated_at: u64,
    /// Current placement.
    pub transform: Transform,
}

impl Instance {
    /// Template this instance was created from.
    #[inline]
    #[must_use]
    pub const fn template(&self) -> TemplateId {
        self.template
    }

    /// Slot index inside the owning pool.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Container node the instance is grouped under.
    #[inline]
    #[must_use]
    pub const fn parent(&self) -> NodeId {
        self.parent
    }

    /// Whether the instance is currently handed out.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

/// Point-in-time counters for one pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// The pool's template.
    pub template: Option<TemplateId>,
    /// Instances pre-created at initialization.
    pub initial_size: usize,
    /// Instances owned now.
    pub capacity: usize,
    /// Instances handed out.
    pub in_use: usize,
    /// Instances ready to hand out.
    pub free: usize,
    /// Instances created after initialization.
    pub grown: usize,
    /// In-use instances forcibly reclaimed.
    pub recycled: u64,
}

/// Owner of the pre-created instances for one template.
pub struct Pool {
    config: PoolConfig,
    parent: Option<NodeId>,
    instances: SlotPool<Instance>,
    activations: u64,
    grown: usize,
    recycled: u64,
}

impl Pool {
    /// Creates an uninitialized pool. No instances exist until
    /// [`Pool::initialize`] is called.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        let instances = SlotPool::with_capacity(config.size);
        Self {
            config,
            parent: None,
            instances,
            activations: 0,
            grown: 0,
            recycled: 0,
        }
    }

    /// The pool's blueprint.
    #[inline]
    #[must_use]
    pub const fn template(&self) -> &Template {
        &self.config.template
    }

    /// The pool's template identifier.
    #[inline]
    #[must_use]
    pub const fn template_id(&self) -> TemplateId {
        self.config.template.id
    }

    /// The pool's exhaustion policy.
    #[inline]
    #[must_use]
    pub const fn exhaustion(&self) -> ExhaustionPolicy {
        self.config.exhaustion
    }

    /// Container node, once initialized.
    #[inline]
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Whether [`Pool::initialize`] has run.
    #[inline]
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.parent.is_some()
    }

    /// Number of instances owned.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.instances.capacity()
    }

    /// Number of instances handed out.
    #[inline]
    #[must_use]
    pub const fn in_use(&self) -> usize {
        self.instances.in_use_count()
    }

    /// Number of instances ready to hand out.
    #[inline]
    #[must_use]
    pub fn free(&self) -> usize {
        self.instances.free_count()
    }

    /// Pre-creates the configured number of instances under `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::AlreadyInitialized`] on a second call.
    pub fn initialize(&mut self, parent: NodeId) -> PoolResult<()> {
        if self.parent.is_some() {
            return Err(PoolError::AlreadyInitialized);
        }

        let template = self.config.template.id;
        let transform = self.config.template.transform;
        self.instances.prefill(self.config.size, |index| Instance {
            template,
            index,
            parent,
            active: false,
            activated_at: 0,
            transform,
        });
        self.parent = Some(parent);

        tracing::debug!(
            template = %template,
            name = %self.config.template.name,
            size = self.config.size,
            "pool initialized"
        );
        Ok(())
    }

    /// Hands out a free instance, placed as requested.
    ///
    /// Placement components left unset reset to the template's transform.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotInitialized`] before [`Pool::initialize`]
    /// - [`PoolError::PoolExhausted`] when exhausted under `Fail`, or
    ///   under `RecycleOldest` with no instance to reclaim
    pub fn acquire(&mut self, placement: &Placement) -> PoolResult<InstanceHandle> {
        let Some(parent) = self.parent else {
            return Err(PoolError::NotInitialized);
        };

        let slot = match self.instances.checkout() {
            Some(slot) => slot,
            None => self.on_exhausted(parent)?,
        };

        self.activations += 1;
        let activated_at = self.activations;
        let transform = placement.resolve(&self.config.template.transform);
        if let Some(instance) = self.instances.get_mut(slot) {
            instance.active = true;
            instance.activated_at = activated_at;
            instance.transform = transform;
        }

        Ok(InstanceHandle {
            template: self.config.template.id,
            container: parent,
            slot,
        })
    }

    fn on_exhausted(&mut self, parent: NodeId) -> PoolResult<SlotHandle> {
        let exhausted = PoolError::PoolExhausted {
            template: self.config.template.id,
            capacity: self.instances.capacity(),
        };

        match self.config.exhaustion {
            ExhaustionPolicy::Grow => {
                #[allow(clippy::cast_possible_truncation)]
                let index = self.instances.capacity() as u32;
                self.instances.push(Instance {
                    template: self.config.template.id,
                    index,
                    parent,
                    active: false,
                    activated_at: 0,
                    transform: self.config.template.transform,
                });
                self.grown += 1;
                tracing::debug!(
                    template = %self.config.template.id,
                    name = %self.config.template.name,
                    capacity = self.instances.capacity(),
                    "pool grew past its configured size"
                );
                self.instances.checkout().ok_or(exhausted)
            }
            ExhaustionPolicy::RecycleOldest => {
                let oldest = self
                    .instances
                    .iter_in_use()
                    .min_by_key(|(_, instance)| instance.activated_at)
                    .map(|(handle, _)| handle.index())
                    .ok_or_else(|| exhausted.clone())?;
                self.recycled += 1;
                tracing::warn!(
                    template = %self.config.template.id,
                    name = %self.config.template.name,
                    slot = oldest,
                    "pool exhausted, recycling oldest active instance"
                );
                self.instances.reclaim(oldest).ok_or(exhausted)
            }
            ExhaustionPolicy::Fail => Err(exhausted),
        }
    }

    /// Takes an instance back.
    ///
    /// # Errors
    ///
    /// - [`PoolError::UnknownTemplate`] if the handle belongs to another pool
    /// - [`PoolError::StaleHandle`] if the instance was already released or
    ///   recycled
    pub fn release(&mut self, handle: InstanceHandle) -> PoolResult<()> {
        if handle.template != self.config.template.id {
            return Err(PoolError::UnknownTemplate(handle.template));
        }
        if !self.issued(handle) {
            return Err(handle.stale());
        }
        let instance = self.instances.release(handle.slot).ok_or_else(|| handle.stale())?;
        instance.active = false;
        Ok(())
    }

    /// Takes every instance back. Outstanding handles go stale.
    pub fn release_all(&mut self) {
        self.instances.release_all();
        for instance in self.instances.values_mut() {
            instance.active = false;
        }
    }

    /// Looks up a handed-out instance.
    #[must_use]
    pub fn get(&self, handle: InstanceHandle) -> Option<&Instance> {
        if handle.template != self.config.template.id || !self.issued(handle) {
            return None;
        }
        self.instances.get(handle.slot)
    }

    /// Looks up a handed-out instance mutably.
    pub fn get_mut(&mut self, handle: InstanceHandle) -> Option<&mut Instance> {
        if handle.template != self.config.template.id || !self.issued(handle) {
            return None;
        }
        self.instances.get_mut(handle.slot)
    }

    /// Whether `handle` was issued under this pool's current container.
    fn issued(&self, handle: InstanceHandle) -> bool {
        self.parent == Some(handle.container)
    }

    /// Iterates over handed-out instances.
    pub fn active_instances(&self) -> impl Iterator<Item = (InstanceHandle, &Instance)> {
        let template = self.config.template.id;
        self.instances.iter_in_use().map(move |(slot, instance)| {
            let container = instance.parent;
            (InstanceHandle { template, container, slot }, instance)
        })
    }

    /// Iterates over every owned instance, free or not.
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            template: Some(self.config.template.id),
            initial_size: self.config.size,
            capacity: self.instances.capacity(),
            in_use: self.instances.in_use_count(),
            free: self.instances.free_count(),
            grown: self.grown,
            recycled: self.recycled,
        }
    }
}
