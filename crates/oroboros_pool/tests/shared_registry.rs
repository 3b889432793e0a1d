//! Integration tests for spawning from several threads.

use std::sync::Arc;
use std::thread;

use oroboros_pool::{
    ExhaustionPolicy, Placement, PoolConfig, PoolGroupConfig, PoolRegistry, RegistryConfig, SharedPoolRegistry,
    Template, TemplateId, Vec3,
};

const THREADS: usize = 8;
const SPAWNS_PER_THREAD: usize = 500;

fn shared(exhaustion: ExhaustionPolicy, size: usize) -> SharedPoolRegistry {
    let mut registry = PoolRegistry::new(RegistryConfig::default());
    registry
        .initialize(vec![
            PoolGroupConfig::new(
                "player_shadow",
                vec![PoolConfig::new(Template::new(1, "PlayerShadow"), size).with_exhaustion(exhaustion)],
            ),
            PoolGroupConfig::new(
                "ground",
                vec![PoolConfig::new(Template::new(2, "GroundTile"), size).with_exhaustion(exhaustion)],
            ),
        ])
        .unwrap();
    registry.into_shared().unwrap()
}

#[test]
fn test_concurrent_spawn_despawn() {
    let registry = Arc::new(shared(ExhaustionPolicy::Fail, THREADS));

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                #[allow(clippy::cast_possible_truncation)]
                let template = TemplateId(1 + (t % 2) as u32);
                for i in 0..SPAWNS_PER_THREAD {
                    #[allow(clippy::cast_precision_loss)]
                    let pos = Vec3::new(i as f32, 0.0, 0.0);
                    let handle = registry.acquire(template, pos).unwrap();
                    let placed = registry.with_instance(handle, |inst| inst.transform.position).unwrap();
                    assert_eq!(placed, pos);
                    registry.release(handle).unwrap();
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    let stats = registry.stats();
    assert_eq!(stats.in_use(), 0);
    assert_eq!(stats.capacity(), THREADS * 2);
    assert_eq!(stats.unknown_lookups, 0);
}

#[test]
fn test_concurrent_growth_hands_out_distinct_instances() {
    let registry = shared(ExhaustionPolicy::Grow, 1);

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || {
                (0..50)
                    .map(|_| registry.acquire(TemplateId(2), Placement::none()).unwrap().slot())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut slots: Vec<u32> = workers.into_iter().flat_map(|w| w.join().unwrap()).collect();
    slots.sort_unstable();
    slots.dedup();

    assert_eq!(slots.len(), THREADS * 50);
    assert_eq!(registry.stats().in_use(), THREADS * 50);
}
