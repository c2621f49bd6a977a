//! World extent: the square ground plane and its boundary.

use bevy::prelude::*;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldConfig>();
    }
}

/// Global world configuration.
#[derive(Resource, Clone, Debug)]
pub struct WorldConfig {
    /// Side length of the square ground plane in world units.
    pub ground_size: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            ground_size: 3000.0,
        }
    }
}

impl WorldConfig {
    /// Distance from the origin to any edge of the ground.
    pub fn half_extent(&self) -> f32 {
        self.ground_size / 2.0
    }

    /// True when a position has left the ground square on either axis.
    pub fn is_out_of_bounds(&self, position: Vec3) -> bool {
        let half = self.half_extent();
        position.x.abs() > half || position.z.abs() > half
    }
}
