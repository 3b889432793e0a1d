//! # Pool Registry
//!
//! Maps template identifiers to the pool that owns their instances and
//! hands out prepared instances on request.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --initialize()--> Ready --teardown()--> Uninitialized
//! ```
//!
//! The mapping is written once by [`PoolRegistry::initialize`] and only
//! read afterwards. Lookups are a single hash probe; the registry itself
//! never allocates while handing out instances.
//!
//! ## Strictness
//!
//! | Mistake            | `strict = false`                   | `strict = true`        |
//! |--------------------|------------------------------------|------------------------|
//! | duplicate template | logged, skipped, first one wins    | `initialize` fails     |
//! | unknown template   | logged, `acquire` returns `None`   | same                   |

use std::collections::{HashMap, HashSet};

use oroboros_core::{Hierarchy, NodeId};

use crate::config::PoolSystemConfig;
use crate::error::{ConfigResult, PoolError, PoolResult};
use crate::placement::Placement;
use crate::pool::{Instance, InstanceHandle, Pool, PoolConfig, PoolStats};
use crate::shared::SharedPoolRegistry;
use crate::template::TemplateId;

/// Default name of the registry's root node.
pub const DEFAULT_ROOT_NAME: &str = "PoolManager";

/// Registry-wide policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Treat duplicate templates as fatal.
    pub strict: bool,
    /// Name of the root node containers are grouped under.
    pub root_name: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            strict: false,
            root_name: DEFAULT_ROOT_NAME.to_string(),
        }
    }
}

impl RegistryConfig {
    /// Strict configuration with the default root name.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }
}

/// A named, ordered list of pool configurations.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolGroupConfig {
    /// Group name.
    pub name: String,
    /// Disabled groups are kept in configuration but never registered.
    pub enabled: bool,
    /// Pools in registration order.
    pub pools: Vec<PoolConfig>,
}

impl PoolGroupConfig {
    /// Creates an enabled group.
    #[must_use]
    pub fn new(name: impl Into<String>, pools: Vec<PoolConfig>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            pools,
        }
    }

    /// Marks the group disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A registered group. Owns its pools.
pub struct PoolGroup {
    name: String,
    pools: Vec<Pool>,
}

impl PoolGroup {
    /// Group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered pools in registration order.
    #[must_use]
    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Pool>) {
        (self.name, self.pools)
    }
}

#[derive(Clone, Copy, Debug)]
struct PoolLocation {
    group: usize,
    pool: usize,
}

/// Outcome of [`PoolRegistry::initialize`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Pools registered.
    pub registered: usize,
    /// Duplicate entries that were reported and skipped.
    pub skipped: Vec<PoolError>,
    /// Groups left out because they are disabled.
    pub disabled_groups: Vec<String>,
}

/// Point-in-time counters for the whole registry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Per-pool counters in registration order.
    pub pools: Vec<PoolStats>,
    /// Lookups for templates with no pool.
    pub unknown_lookups: u64,
}

impl RegistryStats {
    /// Instances handed out across all pools.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.pools.iter().map(|p| p.in_use).sum()
    }

    /// Instances owned across all pools.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.pools.iter().map(|p| p.capacity).sum()
    }
}

/// Root, groups, mapping and containers produced by a successful build.
type Built = (NodeId, Vec<PoolGroup>, HashMap<TemplateId, PoolLocation>, HashMap<TemplateId, NodeId>);

/// Template-to-pool mapping and the single access point for instances.
///
/// Constructed explicitly and owned by the application. Several
/// registries can coexist, e.g. one per level.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = PoolRegistry::new(RegistryConfig::default());
/// registry.initialize(vec![
///     PoolGroupConfig::new("player_shadow", vec![PoolConfig::new(shadow, 5)]),
///     PoolGroupConfig::new("ground", vec![PoolConfig::new(tile, 10)]),
/// ])?;
///
/// let tile = registry.acquire(tile.id, Vec3::new(1.0, 2.0, 3.0));
/// ```
pub struct PoolRegistry {
    config: RegistryConfig,
    hierarchy: Hierarchy,
    root: Option<NodeId>,
    groups: Vec<PoolGroup>,
    index: HashMap<TemplateId, PoolLocation>,
    containers: HashMap<TemplateId, NodeId>,
    unknown_lookups: u64,
}

impl PoolRegistry {
    /// Creates an uninitialized registry.
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            hierarchy: Hierarchy::new(),
            root: None,
            groups: Vec::new(),
            index: HashMap::new(),
            containers: HashMap::new(),
            unknown_lookups: 0,
        }
    }

    /// Builds and initializes a registry from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, or if it declares
    /// duplicate pools while `strict` is set.
    pub fn from_config(config: &PoolSystemConfig) -> ConfigResult<(Self, InitReport)> {
        let (registry_config, groups) = config.resolve()?;
        let mut registry = Self::new(registry_config);
        let report = registry.initialize(groups)?;
        Ok((registry, report))
    }

    /// Registry-wide policy.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Whether [`PoolRegistry::initialize`] has run.
    #[inline]
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.root.is_some()
    }

    /// Registers every pool of every enabled group, creates one container
    /// per pool and initializes the pool under it.
    ///
    /// Groups and pools are processed in order. A template already
    /// registered is a duplicate: it is logged and skipped, or fails the
    /// whole call when `strict` is set. A failed call leaves the registry
    /// uninitialized.
    ///
    /// # Errors
    ///
    /// - [`PoolError::AlreadyInitialized`] if called twice without
    ///   [`PoolRegistry::teardown`]
    /// - [`PoolError::DuplicateTemplate`] in strict mode
    pub fn initialize(&mut self, groups: Vec<PoolGroupConfig>) -> PoolResult<InitReport> {
        if self.root.is_some() {
            return Err(PoolError::AlreadyInitialized);
        }

        // Built in place so node generations keep rising across teardown.
        let mut report = InitReport::default();
        let (root, registered, index, containers) = match self.build(groups, &mut report) {
            Ok(built) => built,
            Err(error) => {
                self.hierarchy.clear();
                return Err(error);
            }
        };

        report.registered = index.len();
        self.root = Some(root);
        self.groups = registered;
        self.index = index;
        self.containers = containers;

        tracing::info!(
            pools = report.registered,
            groups = self.groups.len(),
            skipped = report.skipped.len(),
            "pool registry initialized"
        );
        Ok(report)
    }

    fn build(&mut self, groups: Vec<PoolGroupConfig>, report: &mut InitReport) -> PoolResult<Built> {
        let mut seen = HashSet::new();
        let mut accepted = Vec::with_capacity(groups.len());

        for PoolGroupConfig { name, enabled, pools: configs } in groups {
            if !enabled {
                tracing::debug!(group = %name, "pool group disabled, not registered");
                report.disabled_groups.push(name);
                continue;
            }

            let mut pools = Vec::with_capacity(configs.len());
            for config in configs {
                let template = config.template.id;
                if !seen.insert(template) {
                    let duplicate = PoolError::DuplicateTemplate {
                        template,
                        name: config.template.name.clone(),
                    };
                    tracing::error!(
                        template = %template,
                        name = %config.template.name,
                        group = %name,
                        "same template in multiple pools"
                    );
                    if self.config.strict {
                        return Err(duplicate);
                    }
                    report.skipped.push(duplicate);
                    continue;
                }
                pools.push(config);
            }
            accepted.push((name, pools));
        }

        let labels = accepted
            .iter()
            .flat_map(|(_, pools)| pools.iter().map(|config| format!("Pool: {}", config.template.name)));
        let (root, nodes) = self
            .hierarchy
            .create_root_with_children(self.config.root_name.clone(), labels);

        let mut nodes = nodes.into_iter();
        let mut index = HashMap::new();
        let mut containers = HashMap::new();
        let mut registered = Vec::with_capacity(accepted.len());
        for (group, (name, configs)) in accepted.into_iter().enumerate() {
            let mut pools = Vec::with_capacity(configs.len());
            for (config, container) in configs.into_iter().zip(nodes.by_ref()) {
                let template = config.template.id;
                let mut pool = Pool::new(config);
                pool.initialize(container)?;

                index.insert(template, PoolLocation { group, pool: pools.len() });
                containers.insert(template, container);
                pools.push(pool);
            }
            registered.push(PoolGroup { name, pools });
        }

        Ok((root, registered, index, containers))
    }

    /// Drops every pool, container and mapping entry.
    ///
    /// The registry returns to the uninitialized state and may be
    /// initialized again, e.g. on level reload. Outstanding handles stop
    /// resolving.
    pub fn teardown(&mut self) {
        let pools = self.index.len();
        self.hierarchy.clear();
        self.root = None;
        self.groups.clear();
        self.index.clear();
        self.containers.clear();
        tracing::info!(pools = pools, "pool registry torn down");
    }

    /// Hands out a prepared instance of `template`.
    ///
    /// `placement` accepts a [`Placement`], a position ([`oroboros_shared::Vec3`])
    /// or a full [`oroboros_shared::Transform`].
    ///
    /// # Returns
    ///
    /// The instance handle, or None if the template has no pool, the
    /// registry is not initialized, or the pool refused. Failures are
    /// logged; a `None` is a configuration mistake to fix, not a runtime
    /// condition to recover from.
    pub fn acquire(&mut self, template: TemplateId, placement: impl Into<Placement>) -> Option<InstanceHandle> {
        match self.try_acquire(template, placement) {
            Ok(handle) => Some(handle),
            Err(error) => {
                tracing::error!(template = %template, %error, "pool registry could not hand out instance");
                None
            }
        }
    }

    /// Like [`PoolRegistry::acquire`] but returns the failure instead of
    /// logging it.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotInitialized`] before initialization
    /// - [`PoolError::UnknownTemplate`] if no pool owns `template`
    /// - [`PoolError::PoolExhausted`] if the pool refused
    pub fn try_acquire(&mut self, template: TemplateId, placement: impl Into<Placement>) -> PoolResult<InstanceHandle> {
        if self.root.is_none() {
            return Err(PoolError::NotInitialized);
        }
        let Some(location) = self.index.get(&template).copied() else {
            self.unknown_lookups += 1;
            return Err(PoolError::UnknownTemplate(template));
        };
        self.groups[location.group].pools[location.pool].acquire(&placement.into())
    }

    /// Returns an instance to its pool.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotInitialized`] before initialization
    /// - [`PoolError::UnknownTemplate`] if no pool owns the handle's template
    /// - [`PoolError::StaleHandle`] if already released or recycled
    pub fn release(&mut self, handle: InstanceHandle) -> PoolResult<()> {
        if self.root.is_none() {
            return Err(PoolError::NotInitialized);
        }
        self.pool_mut(handle.template())
            .ok_or(PoolError::UnknownTemplate(handle.template()))?
            .release(handle)
    }

    /// Returns every instance of every pool. Outstanding handles go stale.
    pub fn release_all(&mut self) {
        for pool in self.groups.iter_mut().flat_map(|g| g.pools.iter_mut()) {
            pool.release_all();
        }
    }

    /// Looks up a handed-out instance.
    #[must_use]
    pub fn instance(&self, handle: InstanceHandle) -> Option<&Instance> {
        self.pool(handle.template())?.get(handle)
    }

    /// Looks up a handed-out instance mutably.
    pub fn instance_mut(&mut self, handle: InstanceHandle) -> Option<&mut Instance> {
        self.pool_mut(handle.template())?.get_mut(handle)
    }

    /// The pool registered for `template`.
    #[must_use]
    pub fn pool(&self, template: TemplateId) -> Option<&Pool> {
        let location = self.index.get(&template)?;
        Some(&self.groups[location.group].pools[location.pool])
    }

    fn pool_mut(&mut self, template: TemplateId) -> Option<&mut Pool> {
        let location = self.index.get(&template)?;
        Some(&mut self.groups[location.group].pools[location.pool])
    }

    /// Whether a pool is registered for `template`.
    #[inline]
    #[must_use]
    pub fn contains(&self, template: TemplateId) -> bool {
        self.index.contains_key(&template)
    }

    /// Number of registered pools.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no pool is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Registered templates, in no particular order.
    pub fn templates(&self) -> impl Iterator<Item = TemplateId> + '_ {
        self.index.keys().copied()
    }

    /// Registered groups in configuration order.
    #[must_use]
    pub fn groups(&self) -> &[PoolGroup] {
        &self.groups
    }

    /// Container nodes and the registry root.
    #[must_use]
    pub const fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// The registry's root node, once initialized.
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Container node of the pool for `template`.
    #[must_use]
    pub fn container(&self, template: TemplateId) -> Option<NodeId> {
        self.containers.get(&template).copied()
    }

    /// Lookups for templates with no pool since construction.
    #[must_use]
    pub const fn unknown_lookups(&self) -> u64 {
        self.unknown_lookups
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            pools: self
                .groups
                .iter()
                .flat_map(|g| g.pools.iter().map(Pool::stats))
                .collect(),
            unknown_lookups: self.unknown_lookups,
        }
    }

    /// Converts into a thread-safe registry.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotInitialized`] before initialization.
    pub fn into_shared(self) -> PoolResult<SharedPoolRegistry> {
        let Some(root) = self.root else {
            return Err(PoolError::NotInitialized);
        };
        let lookups = self.unknown_lookups;
        Ok(SharedPoolRegistry::from_parts(
            self.config,
            self.hierarchy,
            root,
            self.groups,
            self.containers,
            lookups,
        ))
    }
}
