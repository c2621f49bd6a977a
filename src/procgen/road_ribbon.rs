//! Road surface, edge lines, start marker and signposts.
//!
//! Generated once from the track curve. Every strip is a closed ribbon: the
//! final vertex pair is sampled at the same spot as the first so the seam
//! lines up exactly.

use bevy::prelude::*;
use rand::Rng;

use super::track_curve::{ground_normal, TrackCurve};

/// Configuration for road geometry generation.
#[derive(Resource, Clone, Debug)]
pub struct RoadRibbonConfig {
    /// Number of equal arc-length steps along the loop.
    pub divisions: usize,
    /// Height of the road surface above the ground.
    pub road_height: f32,
    /// Width of each painted edge line.
    pub line_width: f32,
    /// Lift of the edge lines above the road surface.
    pub line_lift: f32,
    /// Depth of the checkered start strip along the direction of travel.
    pub marker_depth: f32,
    /// Side length of one start-strip check.
    pub marker_square: f32,
    /// Height of the start strip above the ground.
    pub marker_lift: f32,
    /// Arc-length fractions where roadside signs stand.
    pub sign_positions: Vec<f32>,
    /// Gap between the road edge and a sign post.
    pub sign_offset: f32,
}

impl Default for RoadRibbonConfig {
    fn default() -> Self {
        Self {
            divisions: 2000,
            road_height: 0.01,
            line_width: 2.5,
            line_lift: 0.01,
            marker_depth: 15.0,
            marker_square: 2.0,
            marker_lift: 0.02,
            sign_positions: vec![0.1, 0.25, 0.45, 0.6, 0.8, 0.95],
            sign_offset: 2.0,
        }
    }
}

/// Triangle strip stored as an indexed triangle list.
#[derive(Clone, Debug, Default)]
pub struct RibbonStrip {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl RibbonStrip {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Checkered strip across the road at the start of the loop.
#[derive(Clone, Debug)]
pub struct StartMarker {
    pub center: Vec3,
    /// Unit direction of travel.
    pub forward: Vec3,
    /// Unit direction across the road (left of travel).
    pub across: Vec3,
    pub width: f32,
    pub depth: f32,
    /// Number of checks across the road.
    pub squares_x: u32,
    /// Number of checks along the road.
    pub squares_y: u32,
}

/// One square of the start strip.
#[derive(Clone, Copy, Debug)]
pub struct CheckSquare {
    pub corners: [Vec3; 4],
    pub white: bool,
}

impl StartMarker {
    /// Outline corners, counter-clockwise seen from above.
    pub fn corners(&self) -> [Vec3; 4] {
        let half_across = self.across * (self.width / 2.0);
        let half_forward = self.forward * (self.depth / 2.0);
        [
            self.center - half_across - half_forward,
            self.center + half_across - half_forward,
            self.center + half_across + half_forward,
            self.center - half_across + half_forward,
        ]
    }

    /// Individual checks, clipped to the strip outline.
    pub fn squares(&self) -> Vec<CheckSquare> {
        let origin = self.center - self.across * (self.width / 2.0) - self.forward * (self.depth / 2.0);
        let step_x = self.width / self.squares_x.max(1) as f32;
        let step_y = self.depth / self.squares_y.max(1) as f32;

        let mut squares = Vec::with_capacity((self.squares_x * self.squares_y) as usize);
        for y in 0..self.squares_y {
            for x in 0..self.squares_x {
                let a = origin + self.across * (x as f32 * step_x) + self.forward * (y as f32 * step_y);
                let right = self.across * step_x;
                let up = self.forward * step_y;
                squares.push(CheckSquare {
                    corners: [a, a + right, a + right + up, a + up],
                    white: (x + y) % 2 == 0,
                });
            }
        }
        squares
    }
}

/// Roadside sign placement.
#[derive(Clone, Copy, Debug)]
pub struct Signpost {
    /// Base of the post on the ground.
    pub position: Vec3,
    /// Direction the sign face looks, toward approaching cars.
    pub facing: Vec3,
}

/// All static road geometry for one track.
#[derive(Resource, Clone, Debug)]
pub struct TrackGeometry {
    pub surface: RibbonStrip,
    pub left_line: RibbonStrip,
    pub right_line: RibbonStrip,
    pub start_marker: StartMarker,
    pub signposts: Vec<Signpost>,
}

/// Build the road surface and markings.
pub fn build_track_geometry<R: Rng + ?Sized>(
    curve: &TrackCurve,
    road_width: f32,
    config: &RoadRibbonConfig,
    rng: &mut R,
) -> TrackGeometry {
    let half_road = road_width / 2.0;
    let half_line = config.line_width / 2.0;
    let line_height = config.road_height + config.line_lift;

    let surface = build_strip(curve, config.divisions, config.road_height, half_road, -half_road);
    let left_line = build_strip(
        curve,
        config.divisions,
        line_height,
        half_road + half_line,
        half_road - half_line,
    );
    let right_line = build_strip(
        curve,
        config.divisions,
        line_height,
        -(half_road + half_line),
        -(half_road - half_line),
    );

    TrackGeometry {
        surface,
        left_line,
        right_line,
        start_marker: build_start_marker(curve, road_width, config),
        signposts: place_signposts(curve, road_width, config, rng),
    }
}

/// Sweep two offsets from the centerline along the loop.
///
/// Offsets are measured along the left-pointing ground normal, so a negative
/// offset lies to the right of travel.
fn build_strip(
    curve: &TrackCurve,
    divisions: usize,
    height: f32,
    first_offset: f32,
    second_offset: f32,
) -> RibbonStrip {
    let divisions = divisions.max(1);
    let mut strip = RibbonStrip {
        positions: Vec::with_capacity((divisions + 1) * 2),
        normals: Vec::with_capacity((divisions + 1) * 2),
        uvs: Vec::with_capacity((divisions + 1) * 2),
        indices: Vec::with_capacity(divisions * 6),
    };

    for i in 0..=divisions {
        let u = i as f32 / divisions as f32;
        // The closing pair reuses the start sample
        let sample_u = if i == divisions { 0.0 } else { u };

        let point = curve.point_at_uniform(sample_u);
        let normal = ground_normal(curve.tangent_at_uniform(sample_u));

        let first = point + normal * first_offset;
        let second = point + normal * second_offset;

        strip.positions.push([first.x, height, first.z]);
        strip.positions.push([second.x, height, second.z]);
        strip.normals.push([0.0, 1.0, 0.0]);
        strip.normals.push([0.0, 1.0, 0.0]);
        strip.uvs.push([u, 1.0]);
        strip.uvs.push([u, 0.0]);

        if i < divisions {
            let idx = (i * 2) as u32;
            strip.indices.extend_from_slice(&[idx, idx + 1, idx + 2]);
            strip.indices.extend_from_slice(&[idx + 1, idx + 3, idx + 2]);
        }
    }

    strip
}

fn build_start_marker(curve: &TrackCurve, road_width: f32, config: &RoadRibbonConfig) -> StartMarker {
    let point = curve.point_at_uniform(0.0);
    let tangent = curve.tangent_at_uniform(0.0);
    let forward = Vec3::new(tangent.x, 0.0, tangent.z).normalize_or_zero();

    StartMarker {
        center: Vec3::new(point.x, config.marker_lift, point.z),
        forward,
        across: ground_normal(tangent),
        width: road_width,
        depth: config.marker_depth,
        squares_x: (road_width / config.marker_square).ceil() as u32,
        squares_y: (config.marker_depth / config.marker_square).ceil() as u32,
    }
}

fn place_signposts<R: Rng + ?Sized>(
    curve: &TrackCurve,
    road_width: f32,
    config: &RoadRibbonConfig,
    rng: &mut R,
) -> Vec<Signpost> {
    let offset = road_width / 2.0 + config.sign_offset;

    config
        .sign_positions
        .iter()
        .map(|&u| {
            let point = curve.point_at_uniform(u);
            let tangent = curve.tangent_at_uniform(u);
            let normal = ground_normal(tangent);
            let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let base = point + normal * (offset * side);
            let facing = -Vec3::new(tangent.x, 0.0, tangent.z).normalize_or_zero();

            Signpost {
                position: Vec3::new(base.x, 0.0, base.z),
                facing,
            }
        })
        .collect()
}
