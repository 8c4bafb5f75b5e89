//! Synthetic game workload.
//!
//! Each configured level gets its own index. The workload spawns a mix of
//! object types, then for every tick moves entities, cycles projectiles,
//! runs the proximity queries an AI layer would issue, and checks index
//! integrity. The tree is rebuilt once at the end.

use crate::config::AppConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use spatial_index::{
    BoundingBox, IndexStats, LevelLoadError, ObjectId, OptimizeReport, SpatialIndex,
    SpatialObjectType, SpatialWorlds,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Queries issued per tick, each centered on a random live entity
const QUERIES_PER_TICK: usize = 8;

/// Opaque handle the workload stores as payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityHandle {
    pub slot: u32,
}

#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error(transparent)]
    Level(#[from] LevelLoadError),

    #[error("Integrity check failed in level '{level}' at tick {tick}")]
    Integrity { level: String, tick: u32 },
}

/// Per-level results
#[derive(Debug, Clone, Serialize)]
pub struct LevelReport {
    pub level: String,
    pub spawned: usize,
    pub moves: u64,
    pub rejected_moves: u64,
    pub projectiles_cycled: u64,
    pub radius_queries: u64,
    pub radius_hits: u64,
    pub nearest_item_found: u64,
    pub optimize: OptimizeReport,
    pub stats: IndexStats,
}

/// Results for the whole run
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadReport {
    pub seed: u64,
    pub ticks: u32,
    pub levels: Vec<LevelReport>,
}

fn extent_for(object_type: SpatialObjectType) -> f64 {
    match object_type {
        SpatialObjectType::Entity => 16.0,
        SpatialObjectType::Item => 8.0,
        SpatialObjectType::Projectile => 2.0,
        SpatialObjectType::Effect => 24.0,
        SpatialObjectType::Trigger => 64.0,
    }
}

fn type_for_slot(slot: u32) -> SpatialObjectType {
    match slot % 10 {
        0..=4 => SpatialObjectType::Entity,
        5 | 6 => SpatialObjectType::Item,
        7 | 8 => SpatialObjectType::Projectile,
        _ => SpatialObjectType::Trigger,
    }
}

fn random_bounds(rng: &mut StdRng, world: &BoundingBox, size: f64) -> BoundingBox {
    let size = size.min(world.width).min(world.height);
    let x = rng.random_range(world.left()..=(world.right() - size));
    let y = rng.random_range(world.top()..=(world.bottom() - size));
    BoundingBox::new(x, y, size, size)
}

/// Shifts `bounds` by up to `step` on each axis, staying inside `world`
fn wander(rng: &mut StdRng, world: &BoundingBox, bounds: &BoundingBox, step: f64) -> BoundingBox {
    let (dx, dy) = if step > 0.0 {
        (rng.random_range(-step..=step), rng.random_range(-step..=step))
    } else {
        (0.0, 0.0)
    };
    let x = (bounds.x + dx).clamp(world.left(), world.right() - bounds.width);
    let y = (bounds.y + dy).clamp(world.top(), world.bottom() - bounds.height);
    BoundingBox::new(x, y, bounds.width, bounds.height)
}

/// Runs the configured workload over every level
pub fn run(config: &AppConfig) -> Result<WorkloadReport, WorkloadError> {
    let mut worlds: SpatialWorlds<EntityHandle> = SpatialWorlds::new();
    let mut levels = Vec::with_capacity(config.workload.levels.len());

    for (n, level) in config.workload.levels.iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(config.workload.seed.wrapping_add(n as u64));
        let index = worlds.load_level(level.as_str(), &config.index)?;
        levels.push(run_level(config, level, index, &mut rng)?);
    }

    if !worlds.validate_all() {
        warn!("Final integrity sweep reported a mismatch");
    }

    Ok(WorkloadReport {
        seed: config.workload.seed,
        ticks: config.workload.ticks,
        levels,
    })
}

fn run_level(
    config: &AppConfig,
    level: &str,
    index: &mut SpatialIndex<EntityHandle>,
    rng: &mut StdRng,
) -> Result<LevelReport, WorkloadError> {
    let settings = &config.workload;
    let world = *index.world_bounds();

    let mut entities: Vec<ObjectId> = Vec::new();
    let mut projectiles: Vec<ObjectId> = Vec::new();
    let mut next_slot: u32 = 0;

    for _ in 0..settings.object_count {
        let slot = next_slot;
        next_slot += 1;
        let object_type = type_for_slot(slot);
        let id = ObjectId::from(format!("{level}-{slot}"));
        let bounds = random_bounds(rng, &world, extent_for(object_type));

        if index.add_object(id.clone(), bounds, object_type, EntityHandle { slot }) {
            match object_type {
                SpatialObjectType::Entity => entities.push(id),
                SpatialObjectType::Projectile => projectiles.push(id),
                _ => {}
            }
        }
    }
    info!("🌍 Level '{}' spawned {} objects", level, index.len());

    let mut report = LevelReport {
        level: level.to_string(),
        spawned: index.len(),
        moves: 0,
        rejected_moves: 0,
        projectiles_cycled: 0,
        radius_queries: 0,
        radius_hits: 0,
        nearest_item_found: 0,
        optimize: OptimizeReport {
            elapsed_micros: 0,
            objects_rebuilt: 0,
            new_tree_depth: 0,
        },
        stats: index.stats(),
    };

    for tick in 0..settings.ticks {
        for id in &entities {
            let Some(current) = index.get_object(id).map(|obj| obj.bounds) else {
                continue;
            };
            let target = wander(rng, &world, &current, settings.move_step);
            if index.update_object(id, target) {
                report.moves += 1;
            } else {
                report.rejected_moves += 1;
            }
        }

        let cycle = (projectiles.len() as f64 * settings.despawn_ratio).round() as usize;
        for _ in 0..cycle {
            let victim = projectiles.swap_remove(rng.random_range(0..projectiles.len()));
            index.remove_object(&victim);

            let slot = next_slot;
            next_slot += 1;
            let id = ObjectId::from(format!("{level}-{slot}"));
            let bounds = random_bounds(rng, &world, extent_for(SpatialObjectType::Projectile));
            let handle = EntityHandle { slot };
            if index.add_object(id.clone(), bounds, SpatialObjectType::Projectile, handle) {
                projectiles.push(id);
            }
            report.projectiles_cycled += 1;
        }

        if !entities.is_empty() {
            for _ in 0..QUERIES_PER_TICK {
                let probe = &entities[rng.random_range(0..entities.len())];
                let Some((cx, cy)) = index
                    .get_object(probe)
                    .map(|obj| (obj.bounds.center_x(), obj.bounds.center_y()))
                else {
                    continue;
                };

                report.radius_queries += 1;
                let hits = index.query_radius(cx, cy, settings.query_radius);
                report.radius_hits += hits.len() as u64;
                if index.query_nearest(cx, cy, Some(SpatialObjectType::Item)).is_some() {
                    report.nearest_item_found += 1;
                }
            }
        }

        if !index.validate_integrity() {
            return Err(WorkloadError::Integrity {
                level: level.to_string(),
                tick,
            });
        }
        debug!(tick, objects = index.len(), "Tick complete in level '{}'", level);
    }

    report.optimize = index.optimize();
    report.stats = index.stats();
    Ok(report)
}
