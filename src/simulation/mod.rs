//! Driving simulation: car dynamics, collisions and knockdowns.
//!
//! The core types are plain structs that run without an `App`;
//! `SimulationWorld` owns one whole session. `SimulationPlugin` builds the
//! world at startup and ticks it once per rendered frame, after the input
//! snapshot and before anything that draws.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub mod car;
pub mod collision;
pub mod knockdown;
pub mod obstacles;
pub mod world;

use crate::game_state::GameState;
use crate::procgen::obstacle_placement::PlacementConfig;
use crate::procgen::road_ribbon::{build_track_geometry, RoadRibbonConfig};
use crate::procgen::track_curve::TrackConfig;
use crate::world::WorldConfig;
use car::{CarConfig, Controls};
use collision::{CollisionConfig, Resolution};
use knockdown::KnockdownConfig;
use world::{SimulationWorld, WorldSettings};

/// Frame ordering. Consumers of car state run after `Step`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Input,
    Step,
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CarConfig>()
            .init_resource::<CollisionConfig>()
            .init_resource::<KnockdownConfig>()
            .init_resource::<Controls>()
            .configure_sets(Update, (SimulationSet::Input, SimulationSet::Step).chain())
            .add_systems(Startup, setup_world)
            .add_systems(Update, driver_controls.in_set(SimulationSet::Input))
            .add_systems(
                Update,
                advance_world
                    .in_set(SimulationSet::Step)
                    .run_if(resource_exists::<SimulationWorld>),
            );
    }
}

/// Build the track, road geometry and obstacles for a new session.
#[allow(clippy::too_many_arguments)]
fn setup_world(
    mut commands: Commands,
    track: Res<TrackConfig>,
    ribbon: Res<RoadRibbonConfig>,
    placement: Res<PlacementConfig>,
    world: Res<WorldConfig>,
    car: Res<CarConfig>,
    collision: Res<CollisionConfig>,
    knockdown: Res<KnockdownConfig>,
) {
    info!("Generating track and obstacles...");

    let mut rng = match placement.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let settings = WorldSettings {
        world: world.clone(),
        car: car.clone(),
        collision: collision.clone(),
        knockdown: knockdown.clone(),
    };
    let simulation = SimulationWorld::generate(&track, &placement, settings, &mut rng);
    let geometry = build_track_geometry(simulation.curve(), track.road_width, &ribbon, &mut rng);

    info!(
        "Track ready: {:.0} units long, {} road triangles, {} obstacles",
        simulation.curve().length(),
        geometry.surface.triangle_count(),
        simulation.obstacles().len()
    );

    commands.insert_resource(geometry);
    commands.insert_resource(simulation);
}

/// Snapshot the keyboard into `Controls`. Input is ignored until the
/// session has started.
fn driver_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut controls: ResMut<Controls>,
) {
    if !state.get().accepts_input() {
        *controls = Controls::default();
        return;
    }

    *controls = Controls {
        forward: keyboard.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]),
        backward: keyboard.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]),
        left: keyboard.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]),
        right: keyboard.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]),
    };
}

fn advance_world(
    mut simulation: ResMut<SimulationWorld>,
    controls: Res<Controls>,
    state: Res<State<GameState>>,
    time: Res<Time>,
) {
    if !state.get().is_running() {
        return;
    }

    let report = simulation.tick(&controls, time.delta_secs());
    match report.resolution {
        Resolution::KnockedDown(id) => debug!("Frame {}: knocked down {:?}", report.frame, id),
        Resolution::Bounced(id) => debug!("Frame {}: bounced off {:?}", report.frame, id),
        Resolution::Blocked => debug!("Frame {}: blocked at world edge", report.frame),
        Resolution::Clear => {}
    }
}
