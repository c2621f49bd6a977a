//! Car-versus-obstacle collision query and response.
//!
//! Detection is side-effect free and reports at most one contact per frame,
//! picked by kind priority (trees, horses, mountains, then the ground
//! boundary). Resolution is a separate step that applies the outcome to the
//! car, the registry and the knockdown queue.

use bevy::prelude::*;

use super::car::{CarState, DynamicsStep};
use super::knockdown::KnockdownQueue;
use super::obstacles::{ObstacleId, ObstacleKind, ObstacleRegistry};
use crate::world::WorldConfig;

/// Restitution and pass-through tuning.
#[derive(Resource, Clone, Debug)]
pub struct CollisionConfig {
    /// Speed multiplier after felling a tree or horse.
    pub knockdown_speed_factor: f32,
    /// Fraction of the step the car still travels through a felled obstacle.
    pub knockdown_advance_factor: f32,
    /// Signed speed multiplier after hitting a mountain.
    pub mountain_restitution: f32,
    /// Bounce speeds below this magnitude become a dead stop.
    pub rest_speed: f32,
    /// Steps shorter than this skip the query and commit directly.
    pub min_query_distance: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            knockdown_speed_factor: 0.2,
            knockdown_advance_factor: 0.5,
            mountain_restitution: -0.3,
            rest_speed: 0.1,
            min_query_distance: 0.001,
        }
    }
}

/// The single contact chosen for this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collision {
    /// A standing tree or horse.
    Knockable(ObstacleId),
    Mountain(ObstacleId),
    /// The tentative position left the ground square.
    Boundary,
}

/// What the response did, for consumers that react to impacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Full step committed.
    Clear,
    /// An obstacle was felled; half the step committed.
    KnockedDown(ObstacleId),
    /// Bounced off a mountain; position held.
    Bounced(ObstacleId),
    /// Stopped at the world edge; position held.
    Blocked,
}

/// Find the first obstacle the car would overlap at `next_position`.
pub fn detect(
    next_position: Vec3,
    car_radius: f32,
    registry: &ObstacleRegistry,
    world: &WorldConfig,
) -> Option<Collision> {
    for kind in ObstacleKind::COLLISION_PRIORITY {
        let hit = registry
            .of_kind(kind)
            .filter(|(_, obstacle)| obstacle.is_solid())
            .find(|(_, obstacle)| {
                let dx = next_position.x - obstacle.position.x;
                let dz = next_position.z - obstacle.position.z;
                let reach = car_radius + obstacle.radius;
                dx * dx + dz * dz < reach * reach
            });

        if let Some((id, _)) = hit {
            return Some(if kind.is_knockable() {
                Collision::Knockable(id)
            } else {
                Collision::Mountain(id)
            });
        }
    }

    world.is_out_of_bounds(next_position).then_some(Collision::Boundary)
}

/// Apply a detection result to the car and obstacles.
pub fn resolve(
    car: &mut CarState,
    step: &DynamicsStep,
    collision: Option<Collision>,
    registry: &mut ObstacleRegistry,
    falling: &mut KnockdownQueue,
    config: &CollisionConfig,
) -> Resolution {
    match collision {
        None => {
            car.position += step.displacement();
            Resolution::Clear
        }
        Some(Collision::Knockable(id)) => {
            let felled = registry.get_mut(id).is_some_and(|obstacle| obstacle.knock_down());
            if felled {
                falling.enqueue(id);
                car.speed *= config.knockdown_speed_factor;
            }
            car.position += step.displacement() * config.knockdown_advance_factor;
            if felled {
                Resolution::KnockedDown(id)
            } else {
                Resolution::Clear
            }
        }
        Some(Collision::Mountain(id)) => {
            car.speed *= config.mountain_restitution;
            if car.speed.abs() < config.rest_speed {
                car.speed = 0.0;
            }
            Resolution::Bounced(id)
        }
        Some(Collision::Boundary) => Resolution::Blocked,
    }
}
