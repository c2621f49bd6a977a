//! Fall animation for felled trees and horses.

use std::f32::consts::PI;

use bevy::prelude::*;
use smallvec::SmallVec;

use super::obstacles::{ObstacleId, ObstacleRegistry, FALLEN_TILT};

#[derive(Resource, Clone, Debug)]
pub struct KnockdownConfig {
    /// Angular speed of the fall, radians per second.
    pub fall_speed: f32,
    /// Terminal tilt.
    pub fallen_tilt: f32,
}

impl Default for KnockdownConfig {
    fn default() -> Self {
        Self {
            fall_speed: PI * 0.8,
            fallen_tilt: FALLEN_TILT,
        }
    }
}

/// Obstacles that are mid-fall. Each appears at most once.
#[derive(Clone, Debug, Default)]
pub struct KnockdownQueue {
    falling: SmallVec<[ObstacleId; 8]>,
}

impl KnockdownQueue {
    /// Returns `false` if the obstacle is already falling.
    pub fn enqueue(&mut self, id: ObstacleId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.falling.push(id);
        true
    }

    pub fn contains(&self, id: ObstacleId) -> bool {
        self.falling.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.falling.len()
    }

    pub fn is_empty(&self) -> bool {
        self.falling.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ObstacleId> + '_ {
        self.falling.iter().copied()
    }
}

/// Tip every falling obstacle toward the ground and retire the ones that
/// have landed.
pub fn animate(queue: &mut KnockdownQueue, registry: &mut ObstacleRegistry, delta: f32, config: &KnockdownConfig) {
    let step = config.fall_speed * delta;
    queue.falling.retain(|id| match registry.get_mut(*id) {
        Some(obstacle) => !obstacle.tip_toward(config.fallen_tilt, step),
        None => false,
    });
}
