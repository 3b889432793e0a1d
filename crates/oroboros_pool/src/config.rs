//! # Pool Configuration
//!
//! Declarative pool layout, loaded once at startup from TOML.
//!
//! ```toml
//! strict = false
//! root_name = "PoolManager"
//!
//! [[templates]]
//! id = 1
//! name = "PlayerShadow"
//!
//! [[groups]]
//! name = "player_shadow"
//!
//! [[groups.pools]]
//! template = 1
//! size = 5
//! exhaustion = "grow"   # grow | recycle_oldest | fail
//! ```
//!
//! Templates are declared once and referenced by id from pools. Two pools
//! referencing the same template are NOT rejected here: that is the
//! registry's duplicate check, reported or fatal depending on `strict`.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::pool::{ExhaustionPolicy, PoolConfig};
use crate::registry::{PoolGroupConfig, RegistryConfig, DEFAULT_ROOT_NAME};
use crate::template::{Template, TemplateId};

/// Top-level pool configuration file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolSystemConfig {
    /// Treat duplicate pools as fatal.
    #[serde(default)]
    pub strict: bool,
    /// Name of the registry's root node.
    #[serde(default = "default_root_name")]
    pub root_name: String,
    /// Template catalog.
    #[serde(default)]
    pub templates: Vec<Template>,
    /// Pool groups in registration order.
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

/// One `[[groups]]` table.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupEntry {
    /// Group name.
    pub name: String,
    /// Disabled groups are not registered.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Pools in registration order.
    #[serde(default)]
    pub pools: Vec<PoolEntry>,
}

/// One `[[groups.pools]]` table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolEntry {
    /// Template the pool instantiates.
    pub template: TemplateId,
    /// Instances pre-created at startup.
    pub size: usize,
    /// Behavior when every instance is in use.
    #[serde(default)]
    pub exhaustion: ExhaustionPolicy,
}

fn default_root_name() -> String {
    DEFAULT_ROOT_NAME.to_string()
}

const fn enabled_by_default() -> bool {
    true
}

impl Default for PoolSystemConfig {
    fn default() -> Self {
        Self {
            strict: false,
            root_name: default_root_name(),
            templates: Vec::new(),
            groups: Vec::new(),
        }
    }
}

impl PoolSystemConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is malformed.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), groups = config.groups.len(), "pool configuration loaded");
        Ok(config)
    }

    /// Validates the file and resolves template references.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if:
    /// - `root_name` is empty
    /// - a template id or a group name is declared twice
    /// - a pool references an undeclared template
    /// - a `fail` pool has size zero and could never hand out an instance
    /// - a template rotation has zero or non-finite length
    ///
    /// Template rotations are normalized.
    pub fn resolve(&self) -> ConfigResult<(RegistryConfig, Vec<PoolGroupConfig>)> {
        if self.root_name.trim().is_empty() {
            return Err(ConfigError::Invalid("root_name must not be empty".to_string()));
        }

        let mut catalog: HashMap<TemplateId, Template> = HashMap::with_capacity(self.templates.len());
        for template in &self.templates {
            let rotation = template.transform.rotation;
            let length = rotation.length();
            if !length.is_finite() || length <= f32::EPSILON {
                return Err(ConfigError::Invalid(format!(
                    "template {} has a degenerate rotation",
                    template.id
                )));
            }
            let mut template = template.clone();
            template.transform.rotation = rotation.normalize();
            if let Some(previous) = catalog.insert(template.id, template) {
                return Err(ConfigError::Invalid(format!(
                    "template {} declared more than once",
                    previous.id
                )));
            }
        }

        let mut group_names = HashSet::with_capacity(self.groups.len());
        let mut groups = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            if !group_names.insert(group.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "group '{}' declared more than once",
                    group.name
                )));
            }

            let mut pools = Vec::with_capacity(group.pools.len());
            for entry in &group.pools {
                let template = catalog.get(&entry.template).ok_or_else(|| {
                    ConfigError::Invalid(format!(
                        "group '{}' references undeclared template {}",
                        group.name, entry.template
                    ))
                })?;
                if entry.size == 0 && entry.exhaustion == ExhaustionPolicy::Fail {
                    return Err(ConfigError::Invalid(format!(
                        "pool for template {} has size 0 and exhaustion 'fail'",
                        entry.template
                    )));
                }
                pools.push(PoolConfig::new(template.clone(), entry.size).with_exhaustion(entry.exhaustion));
            }

            groups.push(PoolGroupConfig {
                name: group.name.clone(),
                enabled: group.enabled,
                pools,
            });
        }

        let registry = RegistryConfig {
            strict: self.strict,
            root_name: self.root_name.clone(),
        };
        Ok((registry, groups))
    }
}

#[cfg(test)]
mod tests {
    use oroboros_shared::{Quaternion, Vec3};

    use super::*;

    const MINIMAL: &str = r#"
        [[templates]]
        id = 1
        name = "PlayerShadow"

        [[templates]]
        id = 2
        name = "GroundTile"
        transform = { scale = [2.0, 1.0, 2.0] }

        [[groups]]
        name = "player_shadow"
        pools = [{ template = 1, size = 5 }]

        [[groups]]
        name = "ground"
        enabled = false
        pools = [{ template = 2, size = 10, exhaustion = "recycle_oldest" }]
    "#;

    #[test]
    fn test_parse_defaults() {
        let config = PoolSystemConfig::from_toml_str(MINIMAL).unwrap();

        assert!(!config.strict);
        assert_eq!(config.root_name, DEFAULT_ROOT_NAME);
        assert_eq!(config.templates[1].transform.scale, Vec3::new(2.0, 1.0, 2.0));
        assert_eq!(config.groups[0].pools[0].exhaustion, ExhaustionPolicy::Grow);
        assert!(config.groups[0].enabled);
        assert!(!config.groups[1].enabled);
    }

    #[test]
    fn test_resolve() {
        let (registry, groups) = PoolSystemConfig::from_toml_str(MINIMAL).unwrap().resolve().unwrap();

        assert_eq!(registry, RegistryConfig::default());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].pools[0].template.name, "PlayerShadow");
        assert_eq!(groups[0].pools[0].size, 5);
        assert_eq!(groups[1].pools[0].exhaustion, ExhaustionPolicy::RecycleOldest);
        assert!(!groups[1].enabled);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = PoolSystemConfig::from_toml_str("strcit = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_undeclared_template_rejected() {
        let config = PoolSystemConfig::from_toml_str(
            r#"
            [[groups]]
            name = "traps"
            pools = [{ template = 4, size = 1 }]
            "#,
        )
        .unwrap();

        let err = config.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("#4")));
    }

    #[test]
    fn test_duplicate_template_declaration_rejected() {
        let config = PoolSystemConfig::from_toml_str(
            r#"
            templates = [{ id = 1, name = "A" }, { id = 1, name = "B" }]
            "#,
        )
        .unwrap();
        assert!(matches!(config.resolve(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_duplicate_pool_usage_left_to_registry() {
        let config = PoolSystemConfig::from_toml_str(
            r#"
            templates = [{ id = 1, name = "A" }]

            [[groups]]
            name = "first"
            pools = [{ template = 1, size = 1 }]

            [[groups]]
            name = "second"
            pools = [{ template = 1, size = 1 }]
            "#,
        )
        .unwrap();

        let (_, groups) = config.resolve().unwrap();
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_empty_fail_pool_rejected() {
        let config = PoolSystemConfig::from_toml_str(
            r#"
            templates = [{ id = 1, name = "A" }]

            [[groups]]
            name = "g"
            pools = [{ template = 1, size = 0, exhaustion = "fail" }]
            "#,
        )
        .unwrap();
        assert!(matches!(config.resolve(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_template_rotation_normalized() {
        let config = PoolSystemConfig::from_toml_str(
            r#"
            templates = [{ id = 1, name = "A", transform = { rotation = [0.0, 2.0, 0.0, 0.0] } }]

            [[groups]]
            name = "g"
            pools = [{ template = 1, size = 1 }]
            "#,
        )
        .unwrap();

        let (_, groups) = config.resolve().unwrap();
        let rotation = groups[0].pools[0].template.transform.rotation;
        assert_eq!(rotation, Quaternion::new(0.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn test_zero_rotation_rejected() {
        let config = PoolSystemConfig::from_toml_str(
            r#"
            templates = [{ id = 1, name = "A", transform = { rotation = [0.0, 0.0, 0.0, 0.0] } }]
            "#,
        )
        .unwrap();

        let err = config.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("rotation")));
    }

    #[test]
    fn test_missing_file() {
        let err = PoolSystemConfig::from_path("/definitely/not/here/pools.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
