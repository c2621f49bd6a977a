//! Scene rendering: lighting, sky, ground and the meshes that mirror
//! simulation state.

use bevy::pbr::CascadeShadowConfigBuilder;
use bevy::prelude::*;

use crate::world::WorldConfig;

pub mod car_mesh;
pub mod obstacle_meshes;
pub mod track_mesh;

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(SKY_COLOR))
            .add_plugins(track_mesh::TrackMeshPlugin)
            .add_plugins(obstacle_meshes::ObstacleMeshesPlugin)
            .add_plugins(car_mesh::CarMeshPlugin)
            .add_systems(Startup, (setup_lighting, spawn_ground));
    }
}

pub const SKY_COLOR: Color = Color::srgb(0.53, 0.81, 0.92);

/// Marker for the ground plane.
#[derive(Component)]
pub struct Ground;

fn setup_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 20000.0,
            shadows_enabled: true,
            shadow_depth_bias: 0.3,
            shadow_normal_bias: 1.8,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_3,
            std::f32::consts::FRAC_PI_4,
            0.0,
        )),
        // Shadows only matter close to the chase camera
        CascadeShadowConfigBuilder {
            num_cascades: 3,
            minimum_distance: 0.1,
            maximum_distance: 300.0,
            first_cascade_far_bound: 40.0,
            overlap_proportion: 0.3,
        }
        .build(),
    ));
}

fn spawn_ground(
    mut commands: Commands,
    world: Res<WorldConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let plane = meshes.add(Plane3d::default().mesh().size(world.ground_size, world.ground_size));
    let grass = materials.add(StandardMaterial {
        base_color: Color::srgb(0.3, 0.55, 0.2),
        perceptual_roughness: 1.0,
        ..default()
    });

    commands.spawn((Mesh3d(plane), MeshMaterial3d(grass), Transform::IDENTITY, Ground));
}
