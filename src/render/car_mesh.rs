//! The player car: a body, a cabin and four wheels.

use bevy::prelude::*;

use crate::simulation::car::CarState;
use crate::simulation::world::SimulationWorld;
use crate::simulation::SimulationSet;

pub struct CarMeshPlugin;

impl Plugin for CarMeshPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, spawn_car_mesh.run_if(should_spawn_car))
            .add_systems(
                Update,
                (sync_car_transform, sync_front_wheels)
                    .after(SimulationSet::Step)
                    .run_if(resource_exists::<SimulationWorld>),
            );
    }
}

fn should_spawn_car(simulation: Option<Res<SimulationWorld>>, query: Query<&CarVisual>) -> bool {
    simulation.is_some() && query.is_empty()
}

/// Marker for the car's root entity.
#[derive(Component)]
pub struct CarVisual;

/// Steerable wheel pivot.
#[derive(Component)]
pub struct FrontWheel;

const WHEEL_RADIUS: f32 = 0.4;
const FRONT_WHEEL_OFFSETS: [(f32, f32); 2] = [(-0.95, 1.2), (0.95, 1.2)];
const REAR_WHEEL_OFFSETS: [(f32, f32); 2] = [(-0.95, -1.2), (0.95, -1.2)];

fn spawn_car_mesh(
    mut commands: Commands,
    simulation: Res<SimulationWorld>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let body_mesh = meshes.add(Cuboid::new(1.8, 0.6, 4.0));
    let cabin_mesh = meshes.add(Cuboid::new(1.5, 0.5, 1.8));
    let wheel_mesh = meshes.add(Cylinder::new(WHEEL_RADIUS, 0.3));

    let paint = materials.add(StandardMaterial {
        base_color: Color::srgb(0.85, 0.1, 0.1),
        metallic: 0.4,
        perceptual_roughness: 0.4,
        ..default()
    });
    let glass = materials.add(StandardMaterial {
        base_color: Color::srgb(0.15, 0.2, 0.25),
        perceptual_roughness: 0.2,
        ..default()
    });
    let rubber = materials.add(StandardMaterial {
        base_color: Color::srgb(0.05, 0.05, 0.05),
        perceptual_roughness: 0.95,
        ..default()
    });

    // Cylinders stand along Y; lay them on their side
    let wheel_roll = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
    let axle_height = WHEEL_RADIUS - simulation.settings().car.ride_height;

    commands
        .spawn((car_transform(simulation.car()), Visibility::default(), CarVisual))
        .with_children(|parent| {
            parent.spawn((
                Mesh3d(body_mesh),
                MeshMaterial3d(paint.clone()),
                Transform::from_xyz(0.0, 0.5, 0.0),
            ));
            parent.spawn((
                Mesh3d(cabin_mesh),
                MeshMaterial3d(glass),
                Transform::from_xyz(0.0, 1.05, -0.3),
            ));

            for (x, z) in FRONT_WHEEL_OFFSETS {
                parent
                    .spawn((
                        Transform::from_xyz(x, axle_height, z),
                        Visibility::default(),
                        FrontWheel,
                    ))
                    .with_children(|pivot| {
                        pivot.spawn((
                            Mesh3d(wheel_mesh.clone()),
                            MeshMaterial3d(rubber.clone()),
                            Transform::from_rotation(wheel_roll),
                        ));
                    });
            }

            for (x, z) in REAR_WHEEL_OFFSETS {
                parent.spawn((
                    Mesh3d(wheel_mesh.clone()),
                    MeshMaterial3d(rubber.clone()),
                    Transform::from_xyz(x, axle_height, z).with_rotation(wheel_roll),
                ));
            }
        });

    info!("Spawned car");
}

/// World transform of the car body for the committed state.
pub fn car_transform(car: &CarState) -> Transform {
    Transform::from_translation(car.position).with_rotation(car.rotation())
}

fn sync_car_transform(simulation: Res<SimulationWorld>, mut query: Query<&mut Transform, With<CarVisual>>) {
    for mut transform in &mut query {
        *transform = car_transform(simulation.car());
    }
}

fn sync_front_wheels(
    simulation: Res<SimulationWorld>,
    mut query: Query<&mut Transform, (With<FrontWheel>, Without<CarVisual>)>,
) {
    let steer = Quat::from_rotation_y(simulation.car().front_wheel_angle);
    for mut transform in &mut query {
        transform.rotation = steer;
    }
}
