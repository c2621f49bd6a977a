//! Primitive meshes for trees, horses and mountains.
//!
//! Each obstacle gets a root entity at its base position carrying an
//! `ObstacleVisual`. The root's rotation follows the obstacle's yaw and
//! knockdown tilt, so a felled tree pivots about its base.

use bevy::prelude::*;

use crate::simulation::obstacles::{Obstacle, ObstacleId, ObstacleKind};
use crate::simulation::world::SimulationWorld;
use crate::simulation::SimulationSet;

pub struct ObstacleMeshesPlugin;

impl Plugin for ObstacleMeshesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, spawn_obstacle_meshes.run_if(should_spawn_obstacles))
            .add_systems(
                Update,
                sync_obstacle_transforms
                    .after(SimulationSet::Step)
                    .run_if(resource_exists::<SimulationWorld>),
            );
    }
}

fn should_spawn_obstacles(
    simulation: Option<Res<SimulationWorld>>,
    query: Query<&ObstacleVisual>,
) -> bool {
    simulation.is_some_and(|s| !s.obstacles().is_empty()) && query.is_empty()
}

/// Links a visual root to its obstacle.
#[derive(Component)]
pub struct ObstacleVisual {
    pub id: ObstacleId,
}

const TRUNK_HEIGHT: f32 = 6.0;
const FOLIAGE_RADIUS: f32 = 5.0;
const FOLIAGE_HEIGHT: f32 = 12.0;

const FOLIAGE_COLORS: &[(f32, f32, f32)] = &[
    (0.2, 0.45, 0.15),
    (0.25, 0.5, 0.2),
    (0.18, 0.42, 0.12),
];

struct ObstacleAssets {
    trunk_mesh: Handle<Mesh>,
    foliage_mesh: Handle<Mesh>,
    horse_body: Handle<Mesh>,
    horse_head: Handle<Mesh>,
    horse_leg: Handle<Mesh>,
    trunk_material: Handle<StandardMaterial>,
    foliage_materials: Vec<Handle<StandardMaterial>>,
    horse_material: Handle<StandardMaterial>,
    rock_material: Handle<StandardMaterial>,
}

fn spawn_obstacle_meshes(
    mut commands: Commands,
    simulation: Res<SimulationWorld>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    info!("Spawning obstacle meshes...");

    let assets = ObstacleAssets {
        trunk_mesh: meshes.add(Cylinder::new(0.6, TRUNK_HEIGHT)),
        foliage_mesh: meshes.add(Cone {
            radius: FOLIAGE_RADIUS,
            height: FOLIAGE_HEIGHT,
        }),
        horse_body: meshes.add(Cuboid::new(1.0, 1.1, 2.4)),
        horse_head: meshes.add(Cuboid::new(0.5, 0.9, 0.9)),
        horse_leg: meshes.add(Cuboid::new(0.25, 1.1, 0.25)),
        trunk_material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.35, 0.25, 0.15),
            perceptual_roughness: 0.9,
            ..default()
        }),
        foliage_materials: FOLIAGE_COLORS
            .iter()
            .map(|&(r, g, b)| {
                materials.add(StandardMaterial {
                    base_color: Color::srgb(r, g, b),
                    perceptual_roughness: 0.8,
                    ..default()
                })
            })
            .collect(),
        horse_material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.45, 0.28, 0.15),
            perceptual_roughness: 0.7,
            ..default()
        }),
        rock_material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.42, 0.4, 0.38),
            perceptual_roughness: 1.0,
            ..default()
        }),
    };

    let mut counts = [0usize; 3];
    for (id, obstacle) in simulation.obstacles().iter() {
        let root = commands
            .spawn((obstacle_transform(obstacle), Visibility::default(), ObstacleVisual { id }))
            .id();

        match obstacle.kind {
            ObstacleKind::Tree => {
                let foliage = &assets.foliage_materials[id.0 % assets.foliage_materials.len()];
                commands.entity(root).with_children(|parent| {
                    parent.spawn((
                        Mesh3d(assets.trunk_mesh.clone()),
                        MeshMaterial3d(assets.trunk_material.clone()),
                        Transform::from_xyz(0.0, TRUNK_HEIGHT / 2.0, 0.0),
                    ));
                    parent.spawn((
                        Mesh3d(assets.foliage_mesh.clone()),
                        MeshMaterial3d(foliage.clone()),
                        Transform::from_xyz(0.0, TRUNK_HEIGHT + FOLIAGE_HEIGHT / 2.0, 0.0),
                    ));
                });
                counts[0] += 1;
            }
            ObstacleKind::Horse => {
                commands.entity(root).with_children(|parent| {
                    parent.spawn((
                        Mesh3d(assets.horse_body.clone()),
                        MeshMaterial3d(assets.horse_material.clone()),
                        Transform::from_xyz(0.0, 1.65, 0.0),
                    ));
                    parent.spawn((
                        Mesh3d(assets.horse_head.clone()),
                        MeshMaterial3d(assets.horse_material.clone()),
                        Transform::from_xyz(0.0, 2.4, 1.4).with_rotation(Quat::from_rotation_x(-0.5)),
                    ));
                    for (x, z) in [(-0.35, -0.95), (0.35, -0.95), (-0.35, 0.95), (0.35, 0.95)] {
                        parent.spawn((
                            Mesh3d(assets.horse_leg.clone()),
                            MeshMaterial3d(assets.horse_material.clone()),
                            Transform::from_xyz(x, 0.55, z),
                        ));
                    }
                });
                counts[1] += 1;
            }
            ObstacleKind::Mountain => {
                let mesh = meshes.add(Cone {
                    radius: obstacle.radius,
                    height: obstacle.height,
                });
                commands.entity(root).with_children(|parent| {
                    parent.spawn((
                        Mesh3d(mesh),
                        MeshMaterial3d(assets.rock_material.clone()),
                        Transform::from_xyz(0.0, obstacle.height / 2.0, 0.0),
                    ));
                });
                counts[2] += 1;
            }
        }
    }

    info!(
        "Spawned {} trees, {} horses, {} mountains",
        counts[0], counts[1], counts[2]
    );
}

/// Root transform for an obstacle: base position, yaw, then fall tilt.
pub fn obstacle_transform(obstacle: &Obstacle) -> Transform {
    Transform::from_translation(obstacle.position)
        .with_rotation(Quat::from_rotation_y(obstacle.yaw) * Quat::from_rotation_x(obstacle.tilt()))
}

fn sync_obstacle_transforms(
    simulation: Res<SimulationWorld>,
    mut query: Query<(&ObstacleVisual, &mut Transform)>,
) {
    if !simulation.is_changed() {
        return;
    }

    for (visual, mut transform) in &mut query {
        let Some(obstacle) = simulation.obstacles().get(visual.id) else {
            continue;
        };
        // Upright obstacles never move
        if obstacle.is_knocked_down() {
            *transform = obstacle_transform(obstacle);
        }
    }
}
