//! Road surface, edge line, start strip and signpost meshes.
//!
//! Spawned once, as soon as `TrackGeometry` is available.

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};

use crate::procgen::road_ribbon::{RibbonStrip, Signpost, StartMarker, TrackGeometry};

pub struct TrackMeshPlugin;

impl Plugin for TrackMeshPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, spawn_track_meshes.run_if(should_spawn_track));
    }
}

fn should_spawn_track(geometry: Option<Res<TrackGeometry>>, query: Query<&TrackMeshGenerated>) -> bool {
    geometry.is_some() && query.is_empty()
}

/// Marker that track meshes have been spawned.
#[derive(Component)]
pub struct TrackMeshGenerated;

/// Marker for road and line mesh entities.
#[derive(Component)]
pub struct TrackSurface;

/// Marker for signpost entities.
#[derive(Component)]
pub struct SignpostVisual;

const POST_HEIGHT: f32 = 6.0;
const BOARD_SIZE: Vec3 = Vec3::new(6.0, 3.0, 0.3);

fn spawn_track_meshes(
    mut commands: Commands,
    geometry: Res<TrackGeometry>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    info!("Generating track meshes...");

    let asphalt = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.2, 0.22),
        perceptual_roughness: 0.9,
        cull_mode: None,
        ..default()
    });
    let paint = materials.add(StandardMaterial {
        base_color: Color::srgb(0.95, 0.95, 0.95),
        perceptual_roughness: 0.7,
        cull_mode: None,
        ..default()
    });
    let check_dark = materials.add(StandardMaterial {
        base_color: Color::srgb(0.05, 0.05, 0.05),
        perceptual_roughness: 0.8,
        cull_mode: None,
        ..default()
    });

    commands.spawn((TrackMeshGenerated, Transform::IDENTITY, Visibility::default()));

    for (strip, material) in [
        (&geometry.surface, &asphalt),
        (&geometry.left_line, &paint),
        (&geometry.right_line, &paint),
    ] {
        commands.spawn((
            Mesh3d(meshes.add(ribbon_mesh(strip))),
            MeshMaterial3d(material.clone()),
            Transform::IDENTITY,
            TrackSurface,
        ));
    }

    for (white, material) in [(true, &paint), (false, &check_dark)] {
        commands.spawn((
            Mesh3d(meshes.add(checker_mesh(&geometry.start_marker, white))),
            MeshMaterial3d(material.clone()),
            Transform::IDENTITY,
            TrackSurface,
        ));
    }

    spawn_signposts(&mut commands, &geometry.signposts, &mut meshes, &mut materials);

    info!(
        "Spawned track: {} road triangles, {} signposts",
        geometry.surface.triangle_count(),
        geometry.signposts.len()
    );
}

fn spawn_signposts(
    commands: &mut Commands,
    signposts: &[Signpost],
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let post_mesh = meshes.add(Cylinder::new(0.2, POST_HEIGHT));
    let board_mesh = meshes.add(Cuboid::from_size(BOARD_SIZE));
    let post_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.5, 0.5, 0.5),
        metallic: 0.6,
        ..default()
    });
    let board_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.1, 0.45, 0.2),
        perceptual_roughness: 0.6,
        ..default()
    });

    for sign in signposts {
        commands
            .spawn((
                signpost_transform(sign),
                Visibility::default(),
                SignpostVisual,
            ))
            .with_children(|parent| {
                parent.spawn((
                    Mesh3d(post_mesh.clone()),
                    MeshMaterial3d(post_material.clone()),
                    Transform::from_xyz(0.0, POST_HEIGHT / 2.0, 0.0),
                ));
                parent.spawn((
                    Mesh3d(board_mesh.clone()),
                    MeshMaterial3d(board_material.clone()),
                    Transform::from_xyz(0.0, POST_HEIGHT + BOARD_SIZE.y / 2.0, 0.0),
                ));
            });
    }
}

/// Place a sign at its base with the board face turned toward `facing`.
pub fn signpost_transform(sign: &Signpost) -> Transform {
    let yaw = sign.facing.x.atan2(sign.facing.z);
    Transform::from_translation(sign.position).with_rotation(Quat::from_rotation_y(yaw))
}

/// Convert a generated strip into a renderable mesh.
pub fn ribbon_mesh(strip: &RibbonStrip) -> Mesh {
    Mesh::new(PrimitiveTopology::TriangleList, default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, strip.positions.clone())
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, strip.normals.clone())
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, strip.uvs.clone())
        .with_inserted_indices(Indices::U32(strip.indices.clone()))
}

/// All checks of one colour merged into a single mesh.
pub fn checker_mesh(marker: &StartMarker, white: bool) -> Mesh {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut uvs: Vec<[f32; 2]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for square in marker.squares().into_iter().filter(|s| s.white == white) {
        let base = positions.len() as u32;
        positions.extend(square.corners.iter().map(|c| c.to_array()));
        uvs.extend([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    let normals = vec![[0.0, 1.0, 0.0]; positions.len()];

    Mesh::new(PrimitiveTopology::TriangleList, default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker() -> StartMarker {
        StartMarker {
            center: Vec3::new(0.0, 0.02, 0.0),
            forward: Vec3::Z,
            across: Vec3::X,
            width: 26.0,
            depth: 16.0,
            squares_x: 13,
            squares_y: 8,
        }
    }

    #[test]
    fn checker_colours_split_the_grid() {
        let white = checker_mesh(&marker(), true);
        let dark = checker_mesh(&marker(), false);
        // 13 x 8 = 104 checks, 52 of each colour, 4 vertices each
        assert_eq!(white.count_vertices(), 52 * 4);
        assert_eq!(dark.count_vertices(), 52 * 4);
        assert_eq!(white.indices().map(|i| i.len()), Some(52 * 6));
    }

    #[test]
    fn ribbon_mesh_keeps_strip_layout() {
        let strip = RibbonStrip {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 1.0]],
            normals: vec![[0.0, 1.0, 0.0]; 4],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
            indices: vec![0, 2, 1, 2, 3, 1],
        };
        let mesh = ribbon_mesh(&strip);
        assert_eq!(mesh.count_vertices(), 4);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(6));
    }

    #[test]
    fn signpost_faces_along_its_direction() {
        let sign = Signpost {
            position: Vec3::new(10.0, 0.0, 5.0),
            facing: Vec3::X,
        };
        let transform = signpost_transform(&sign);
        assert_eq!(transform.translation, sign.position);
        assert!((transform.rotation * Vec3::Z - Vec3::X).length() < 1e-4);
    }
}
