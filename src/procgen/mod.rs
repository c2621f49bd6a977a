//! Procedural generation of the course.
//!
//! - Closed spline track through the control points
//! - Road ribbon, edge lines, start marker and signposts
//! - Obstacle scatter around the track

use bevy::prelude::*;

pub mod obstacle_placement;
pub mod road_ribbon;
pub mod track_curve;

pub struct ProcgenPlugin;

impl Plugin for ProcgenPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<track_curve::TrackConfig>()
            .init_resource::<road_ribbon::RoadRibbonConfig>()
            .init_resource::<obstacle_placement::PlacementConfig>();
    }
}
