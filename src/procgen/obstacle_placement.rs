//! Rejection-sampling placement of mountains, trees and horses.
//!
//! Runs as an ordered pipeline. Each stage sees the final positions of every
//! earlier stage and returns only the obstacles it placed:
//!
//! 1. Mountains, polar-sampled in a ring around the track center
//! 2. Trees, scattered over a square
//! 3. Horses, scattered over a smaller square
//!
//! An obstacle that cannot find a free spot within its attempt budget is
//! dropped without error, so counts may come in under the request.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

use super::track_curve::{TrackClearance, TrackConfig, TrackCurve};
use crate::simulation::obstacles::{ground_distance, Obstacle, ObstacleKind, ObstacleRegistry};
use crate::world::WorldConfig;

/// Settings for a square-scatter stage.
#[derive(Clone, Debug)]
pub struct ScatterStage {
    pub count: usize,
    pub radius: f32,
    /// Half-width of the scatter square as a fraction of the ground size.
    pub range_fraction: f32,
    pub max_attempts: u32,
}

/// Settings for the mountain ring.
#[derive(Clone, Debug)]
pub struct MountainStage {
    pub count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub max_attempts: u32,
    /// Ring center on the ground plane.
    pub center: Vec2,
    /// Extra keep-out around the track, in road widths.
    pub safe_zone_road_widths: f32,
    /// Arc-length step between track samples for the keep-out check.
    pub track_check_step: f32,
}

/// Edge-to-edge gaps required between obstacle kinds, beyond their radii.
#[derive(Clone, Debug)]
pub struct ClearanceMargins {
    pub tree_mountain: f32,
    pub tree_tree: f32,
    pub horse_mountain: f32,
    pub horse_tree: f32,
    pub horse_horse: f32,
    pub mountain_mountain: f32,
}

impl ClearanceMargins {
    /// Margin between two kinds. Symmetric.
    pub fn between(&self, a: ObstacleKind, b: ObstacleKind) -> f32 {
        use ObstacleKind::*;
        match (a, b) {
            (Tree, Tree) => self.tree_tree,
            (Tree, Mountain) | (Mountain, Tree) => self.tree_mountain,
            (Horse, Mountain) | (Mountain, Horse) => self.horse_mountain,
            (Horse, Tree) | (Tree, Horse) => self.horse_tree,
            (Horse, Horse) => self.horse_horse,
            (Mountain, Mountain) => self.mountain_mountain,
        }
    }
}

/// Configuration for obstacle placement.
#[derive(Resource, Clone, Debug)]
pub struct PlacementConfig {
    /// Fixed seed for repeatable layouts. `None` draws from entropy.
    pub seed: Option<u64>,
    pub mountains: MountainStage,
    pub trees: ScatterStage,
    pub horses: ScatterStage,
    pub margins: ClearanceMargins,
    /// Minimum centerline distance for trees and horses, in road widths.
    pub road_clearance_factor: f32,
    /// Centerline samples used for the road clearance check.
    pub clearance_samples: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            seed: None,
            mountains: MountainStage {
                count: 15,
                min_radius: 20.0,
                max_radius: 80.0,
                min_height: 50.0,
                max_height: 150.0,
                max_attempts: 100,
                center: Vec2::ZERO,
                safe_zone_road_widths: 10.0,
                track_check_step: 0.05,
            },
            trees: ScatterStage {
                count: 100,
                radius: 4.0,
                range_fraction: 0.4,
                max_attempts: 20,
            },
            horses: ScatterStage {
                count: 50,
                radius: 1.2,
                range_fraction: 0.35,
                max_attempts: 20,
            },
            margins: ClearanceMargins {
                tree_mountain: 11.0,
                tree_tree: 2.0,
                horse_mountain: 15.0,
                horse_tree: 5.0,
                horse_horse: 5.0,
                mountain_mountain: 50.0,
            },
            road_clearance_factor: 1.5,
            clearance_samples: 100,
        }
    }
}

/// Places obstacles around one track.
pub struct ObstaclePlacer<'a> {
    config: &'a PlacementConfig,
    clearance: TrackClearance,
    /// Coarse samples for the mountain keep-out.
    track_samples: Vec<Vec3>,
    road_width: f32,
    ground_size: f32,
    /// Radius-independent part of the mountain ring's inner edge.
    ring_inner_base: f32,
}

impl<'a> ObstaclePlacer<'a> {
    pub fn new(
        config: &'a PlacementConfig,
        curve: &TrackCurve,
        track: &TrackConfig,
        world: &WorldConfig,
    ) -> Self {
        let step = config.mountains.track_check_step.max(1e-3);
        let steps = (1.0 / step).round() as usize;
        let track_samples = (0..=steps)
            .map(|i| curve.point_at_uniform(i as f32 * step))
            .collect();

        Self {
            config,
            clearance: TrackClearance::new(curve, config.clearance_samples),
            track_samples,
            road_width: track.road_width,
            ground_size: world.ground_size,
            ring_inner_base: track.curve_radius * 3.0 + track.segment_length * 0.5,
        }
    }

    /// Minimum centerline distance for trees and horses.
    pub fn road_tolerance(&self) -> f32 {
        self.road_width * self.config.road_clearance_factor
    }

    pub fn clearance(&self) -> &TrackClearance {
        &self.clearance
    }

    /// Run the full pipeline: mountains, then trees, then horses.
    pub fn place_all<R: Rng + ?Sized>(&self, rng: &mut R) -> ObstacleRegistry {
        let mut placed = self.place_mountains(&[], rng);
        let trees = self.place_scattered(ObstacleKind::Tree, &placed, rng);
        placed.extend(trees);
        let horses = self.place_scattered(ObstacleKind::Horse, &placed, rng);
        placed.extend(horses);

        ObstacleRegistry::new(placed)
    }

    /// Mountains in a ring between the track and the ground edge.
    pub fn place_mountains<R: Rng + ?Sized>(&self, existing: &[Obstacle], rng: &mut R) -> Vec<Obstacle> {
        let stage = &self.config.mountains;
        let safe_zone = self.road_width * stage.safe_zone_road_widths;
        let track_keep_out = self.road_width + safe_zone;
        let mut placed: Vec<Obstacle> = Vec::with_capacity(stage.count);

        for _ in 0..stage.count {
            let radius = rng.gen_range(stage.min_radius..stage.max_radius);
            let height = rng.gen_range(stage.min_height..stage.max_height);
            let min_dist = self.ring_inner_base + radius + safe_zone;
            let max_dist = self.ground_size / 2.0 - radius * 1.5;

            let mut spot = None;
            for _ in 0..stage.max_attempts {
                if min_dist >= max_dist {
                    continue;
                }
                let angle = rng.gen_range(0.0..TAU);
                let distance = rng.gen_range(min_dist..max_dist);
                let position = Vec3::new(
                    stage.center.x + angle.cos() * distance,
                    0.0,
                    stage.center.y + angle.sin() * distance,
                );

                let near_track = self
                    .track_samples
                    .iter()
                    .any(|sample| ground_distance(position, *sample) < track_keep_out);
                if near_track {
                    continue;
                }

                let candidate = Obstacle::new(ObstacleKind::Mountain, position, radius);
                if self.is_clear(&candidate, existing.iter().chain(placed.iter())) {
                    spot = Some(candidate.with_height(height));
                    break;
                }
            }

            match spot {
                Some(mountain) => placed.push(mountain),
                None => debug!("Dropped a mountain after {} attempts", stage.max_attempts),
            }
        }

        info!("Placed {}/{} mountains", placed.len(), stage.count);
        placed
    }

    /// Trees or horses scattered over a square, off the road and clear of
    /// everything already placed.
    pub fn place_scattered<R: Rng + ?Sized>(
        &self,
        kind: ObstacleKind,
        existing: &[Obstacle],
        rng: &mut R,
    ) -> Vec<Obstacle> {
        let stage = match kind {
            ObstacleKind::Tree => &self.config.trees,
            ObstacleKind::Horse => &self.config.horses,
            ObstacleKind::Mountain => return self.place_mountains(existing, rng),
        };
        let range = self.ground_size * stage.range_fraction;
        let road_tolerance = self.road_tolerance();
        let mut placed: Vec<Obstacle> = Vec::with_capacity(stage.count);

        for _ in 0..stage.count {
            let mut spot = None;
            for _ in 0..stage.max_attempts {
                let position = Vec3::new(rng.gen_range(-range..range), 0.0, rng.gen_range(-range..range));
                if self.clearance.is_on_road(position, road_tolerance) {
                    continue;
                }

                let candidate = Obstacle::new(kind, position, stage.radius);
                if self.is_clear(&candidate, existing.iter().chain(placed.iter())) {
                    spot = Some(candidate);
                    break;
                }
            }

            match spot {
                Some(obstacle) => {
                    let obstacle = match kind {
                        ObstacleKind::Horse => obstacle.with_yaw(rng.gen_range(0.0..TAU)),
                        _ => obstacle,
                    };
                    placed.push(obstacle);
                }
                None => debug!("Dropped a {:?} after {} attempts", kind, stage.max_attempts),
            }
        }

        info!("Placed {}/{} {:?} obstacles", placed.len(), stage.count, kind);
        placed
    }

    fn is_clear<'o>(&self, candidate: &Obstacle, others: impl IntoIterator<Item = &'o Obstacle>) -> bool {
        others.into_iter().all(|other| {
            candidate.gap_to(other) >= self.config.margins.between(candidate.kind, other.kind)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn place(seed: u64) -> (ObstacleRegistry, TrackClearance) {
        let config = PlacementConfig::default();
        let track = TrackConfig::default();
        let curve = TrackCurve::from_config(&track);
        let world = WorldConfig::default();
        let placer = ObstaclePlacer::new(&config, &curve, &track, &world);
        let mut rng = StdRng::seed_from_u64(seed);
        (placer.place_all(&mut rng), placer.clearance().clone())
    }

    #[test]
    fn places_nearly_everything_requested() {
        let config = PlacementConfig::default();
        for seed in [1, 2, 3] {
            let (registry, _) = place(seed);
            let at_least = |requested: usize| (requested as f32 * 0.9).ceil() as usize;

            assert!(registry.count_of(ObstacleKind::Mountain) >= at_least(config.mountains.count));
            assert!(registry.count_of(ObstacleKind::Tree) >= at_least(config.trees.count));
            assert!(registry.count_of(ObstacleKind::Horse) >= at_least(config.horses.count));
            assert!(registry.count_of(ObstacleKind::Tree) <= config.trees.count);
        }
    }

    #[test]
    fn no_two_obstacles_crowd_each_other() {
        let margins = PlacementConfig::default().margins;
        for seed in [4, 5] {
            let (registry, _) = place(seed);
            let all: Vec<&Obstacle> = registry.iter().map(|(_, o)| o).collect();

            for (i, a) in all.iter().enumerate() {
                for b in &all[i + 1..] {
                    let required = margins.between(a.kind, b.kind);
                    assert!(
                        a.gap_to(b) >= required - 1e-3,
                        "{:?} at {:?} and {:?} at {:?} are {} apart",
                        a.kind,
                        a.position,
                        b.kind,
                        b.position,
                        a.gap_to(b)
                    );
                }
            }
        }
    }

    #[test]
    fn trees_and_horses_stay_off_the_road() {
        let (registry, clearance) = place(6);
        for (_, obstacle) in registry.iter().filter(|(_, o)| o.kind.is_knockable()) {
            assert!(clearance.distance_to_track(obstacle.position) >= 25.0 * 1.5);
        }
    }

    #[test]
    fn mountains_ring_the_track_inside_the_ground() {
        let (registry, _) = place(7);
        let half = WorldConfig::default().half_extent();
        for (_, mountain) in registry.of_kind(ObstacleKind::Mountain) {
            let distance = Vec2::new(mountain.position.x, mountain.position.z).length();
            assert!(distance >= 600.0 + 225.0 + 250.0 + mountain.radius - 1e-2);
            assert!(distance <= half - mountain.radius * 1.5 + 1e-2);
            assert!((20.0..80.0).contains(&mountain.radius));
            assert!((50.0..150.0).contains(&mountain.height));
        }
    }

    #[test]
    fn stages_run_mountains_first() {
        let (registry, _) = place(8);
        let kinds: Vec<ObstacleKind> = registry.iter().map(|(_, o)| o.kind).collect();
        let first_tree = kinds.iter().position(|k| *k == ObstacleKind::Tree).unwrap();
        let first_horse = kinds.iter().position(|k| *k == ObstacleKind::Horse).unwrap();

        assert!(kinds[..first_tree].iter().all(|k| *k == ObstacleKind::Mountain));
        assert!(kinds[first_horse..].iter().all(|k| *k == ObstacleKind::Horse));
    }

    #[test]
    fn same_seed_gives_same_layout() {
        let (a, _) = place(9);
        let (b, _) = place(9);
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn later_stage_respects_earlier_output() {
        let config = PlacementConfig::default();
        let track = TrackConfig::default();
        let curve = TrackCurve::from_config(&track);
        let placer = ObstaclePlacer::new(&config, &curve, &track, &WorldConfig::default());

        // A wall of fake mountains across the scatter square
        let blockers: Vec<Obstacle> = (-12..=12)
            .flat_map(|x| (-12..=12).map(move |z| (x, z)))
            .map(|(x, z)| {
                Obstacle::new(
                    ObstacleKind::Mountain,
                    Vec3::new(x as f32 * 100.0, 0.0, z as f32 * 100.0),
                    30.0,
                )
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(10);
        let trees = placer.place_scattered(ObstacleKind::Tree, &blockers, &mut rng);
        for tree in &trees {
            for blocker in &blockers {
                assert!(tree.gap_to(blocker) >= config.margins.tree_mountain);
            }
        }
    }

    #[test]
    fn impossible_constraints_drop_silently() {
        let config = PlacementConfig {
            // The keep-out swallows the whole scatter square
            road_clearance_factor: 200.0,
            ..default()
        };
        let track = TrackConfig::default();
        let curve = TrackCurve::from_config(&track);
        let placer = ObstaclePlacer::new(&config, &curve, &track, &WorldConfig::default());
        let mut rng = StdRng::seed_from_u64(11);

        assert!(placer.place_scattered(ObstacleKind::Tree, &[], &mut rng).is_empty());
        assert!(placer.place_scattered(ObstacleKind::Horse, &[], &mut rng).is_empty());
    }

    #[test]
    fn tiny_ground_leaves_no_room_for_mountains() {
        let config = PlacementConfig::default();
        let track = TrackConfig::default();
        let curve = TrackCurve::from_config(&track);
        let world = WorldConfig { ground_size: 500.0 };
        let placer = ObstaclePlacer::new(&config, &curve, &track, &world);
        let mut rng = StdRng::seed_from_u64(12);

        assert!(placer.place_mountains(&[], &mut rng).is_empty());
    }

    #[test]
    fn margins_are_symmetric() {
        let margins = PlacementConfig::default().margins;
        for a in ObstacleKind::COLLISION_PRIORITY {
            for b in ObstacleKind::COLLISION_PRIORITY {
                assert_eq!(margins.between(a, b), margins.between(b, a));
            }
        }
    }
}
