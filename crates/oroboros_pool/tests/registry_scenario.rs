//! Integration tests for pool registration and dispatch.

use oroboros_pool::{
    ExhaustionPolicy, Placement, PoolConfig, PoolError, PoolGroupConfig, PoolRegistry, Quaternion, RegistryConfig,
    Template, TemplateId, Vec3,
};

const A: TemplateId = TemplateId(1);
const B: TemplateId = TemplateId(2);
const C: TemplateId = TemplateId(3);
const D: TemplateId = TemplateId(4);

fn shadow_pool(id: u32, size: usize) -> PoolConfig {
    PoolConfig::new(Template::new(id, format!("Shadow{id}")), size)
}

fn ground_pool(id: u32, size: usize) -> PoolConfig {
    PoolConfig::new(Template::new(id, format!("Ground{id}")), size)
}

fn scenario() -> PoolRegistry {
    let mut registry = PoolRegistry::new(RegistryConfig::default());
    let report = registry
        .initialize(vec![
            PoolGroupConfig::new("player_shadow", vec![shadow_pool(1, 5)]),
            PoolGroupConfig::new("ground", vec![ground_pool(2, 10), ground_pool(3, 10)]),
        ])
        .unwrap();
    assert!(report.skipped.is_empty());
    registry
}

#[test]
fn test_scenario_mapping_has_three_entries() {
    let registry = scenario();

    let mut templates: Vec<_> = registry.templates().collect();
    templates.sort();
    assert_eq!(templates, vec![A, B, C]);
}

#[test]
fn test_scenario_positioned_acquire() {
    let mut registry = scenario();

    let handle = registry.acquire(B, Vec3::new(1.0, 2.0, 3.0)).unwrap();
    let instance = registry.instance(handle).unwrap();

    assert_eq!(handle.template(), B);
    assert_eq!(instance.template(), B);
    assert_eq!(instance.transform.position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(Some(instance.parent()), registry.container(B));
}

#[test]
fn test_scenario_unregistered_template() {
    let mut registry = scenario();

    assert!(registry.acquire(D, Placement::none()).is_none());
    assert_eq!(registry.unknown_lookups(), 1);
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_distinct_templates_across_many_groups() {
    let mut registry = PoolRegistry::new(RegistryConfig::default());
    let groups: Vec<_> = (0..6)
        .map(|g| {
            let pools = (0..4).map(|p| shadow_pool(g * 10 + p, 1)).collect();
            PoolGroupConfig::new(format!("group_{g}"), pools)
        })
        .collect();

    let report = registry.initialize(groups).unwrap();
    assert_eq!(report.registered, 24);
    assert_eq!(registry.len(), 24);
    assert_eq!(registry.hierarchy().len(), 25); // root + one container per pool
}

#[test]
fn test_duplicate_reported_once_first_retained() {
    let mut registry = PoolRegistry::new(RegistryConfig::default());
    let report = registry
        .initialize(vec![
            PoolGroupConfig::new("player_shadow", vec![shadow_pool(1, 5)]),
            PoolGroupConfig::new("ground", vec![ground_pool(1, 10), ground_pool(2, 10)]),
        ])
        .unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert!(matches!(report.skipped[0], PoolError::DuplicateTemplate { template: A, .. }));
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.pool(A).unwrap().template().name, "Shadow1");
}

#[test]
fn test_every_acquire_is_a_distinct_instance() {
    let mut registry = scenario();

    let handles: Vec<_> = (0..5).map(|_| registry.acquire(A, Placement::none()).unwrap()).collect();
    let mut slots: Vec<_> = handles.iter().map(|h| h.slot()).collect();
    slots.sort_unstable();
    slots.dedup();

    assert_eq!(slots.len(), 5);
    assert_eq!(registry.pool(A).unwrap().free(), 0);
}

#[test]
fn test_trailing_placement_defaults_to_template_transform() {
    let tilted = Template::new(9, "Tilted").with_transform(oroboros_pool::Transform::new(
        Vec3::ZERO,
        Quaternion::from_rotation_y(1.0),
        Vec3::splat(2.0),
    ));
    let mut registry = PoolRegistry::new(RegistryConfig::default());
    registry
        .initialize(vec![PoolGroupConfig::new("misc", vec![PoolConfig::new(tilted, 1)])])
        .unwrap();

    let handle = registry.acquire(TemplateId(9), Vec3::Y).unwrap();
    let transform = registry.instance(handle).unwrap().transform;

    assert_eq!(transform.position, Vec3::Y);
    assert_eq!(transform.rotation, Quaternion::from_rotation_y(1.0));
    assert_eq!(transform.scale, Vec3::splat(2.0));
}

#[test]
fn test_spawn_despawn_cycle_reuses_instances() {
    let mut registry = PoolRegistry::new(RegistryConfig::default());
    registry
        .initialize(vec![PoolGroupConfig::new(
            "ground",
            vec![ground_pool(2, 3).with_exhaustion(ExhaustionPolicy::Fail)],
        )])
        .unwrap();

    // Simulated frames: spawn a tile, despawn the one from two frames ago.
    let mut live = std::collections::VecDeque::new();
    for frame in 0..100u8 {
        let handle = registry.acquire(B, Vec3::new(f32::from(frame), 0.0, 0.0)).unwrap();
        live.push_back(handle);
        if live.len() > 2 {
            registry.release(live.pop_front().unwrap()).unwrap();
        }
    }

    let pool = registry.pool(B).unwrap();
    assert_eq!(pool.capacity(), 3);
    assert_eq!(pool.stats().grown, 0);
    assert_eq!(pool.in_use(), 2);
}
