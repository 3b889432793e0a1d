//! Integration tests for building registries from TOML configuration.

use std::path::PathBuf;

use oroboros_pool::{ConfigError, ExhaustionPolicy, PoolError, PoolRegistry, PoolSystemConfig, TemplateId, Vec3};

fn data_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/pools.toml")
}

#[test]
fn test_bundled_layout_builds() {
    let config = PoolSystemConfig::from_path(data_path()).unwrap();
    let (registry, report) = PoolRegistry::from_config(&config).unwrap();

    assert_eq!(report.registered, 3);
    assert!(report.skipped.is_empty());
    assert_eq!(report.disabled_groups, vec!["platforms".to_string(), "traps".to_string()]);

    assert!(registry.contains(TemplateId(1)));
    assert!(registry.contains(TemplateId(2)));
    assert!(registry.contains(TemplateId(3)));
    assert!(!registry.contains(TemplateId(4)));
    assert_eq!(
        registry.pool(TemplateId(3)).unwrap().exhaustion(),
        ExhaustionPolicy::RecycleOldest
    );

    let root = registry.root().unwrap();
    assert_eq!(registry.hierarchy().name(root), Some("PoolManager"));
    assert!(registry.hierarchy().find_child(root, "Pool: GroundTile").is_some());
}

#[test]
fn test_template_transform_from_file() {
    let mut config = PoolSystemConfig::from_path(data_path()).unwrap();
    for group in &mut config.groups {
        group.enabled = true;
    }
    let (mut registry, _) = PoolRegistry::from_config(&config).unwrap();

    let handle = registry.acquire(TemplateId(4), Vec3::ZERO).unwrap();
    assert_eq!(
        registry.instance(handle).unwrap().transform.scale,
        Vec3::new(3.0, 0.5, 1.0)
    );
}

#[test]
fn test_strict_file_with_duplicate_fails() {
    let config = PoolSystemConfig::from_toml_str(
        r#"
        strict = true
        templates = [{ id = 1, name = "PlayerShadow" }]

        [[groups]]
        name = "player_shadow"
        pools = [{ template = 1, size = 5 }]

        [[groups]]
        name = "ground"
        pools = [{ template = 1, size = 10 }]
        "#,
    )
    .unwrap();

    let err = PoolRegistry::from_config(&config).err().unwrap();
    assert!(matches!(
        err,
        ConfigError::Pool(PoolError::DuplicateTemplate { template: TemplateId(1), .. })
    ));
}

#[test]
fn test_lenient_file_with_duplicate_reports() {
    let config = PoolSystemConfig::from_toml_str(
        r#"
        templates = [{ id = 1, name = "PlayerShadow" }]

        [[groups]]
        name = "player_shadow"
        pools = [{ template = 1, size = 5 }]

        [[groups]]
        name = "ground"
        pools = [{ template = 1, size = 10 }]
        "#,
    )
    .unwrap();

    let (registry, report) = PoolRegistry::from_config(&config).unwrap();
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(registry.pool(TemplateId(1)).unwrap().capacity(), 5);
}
