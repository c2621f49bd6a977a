//! Closed Catmull-Rom centerline for the driving loop.
//!
//! The curve passes through every control point in order and wraps from the
//! last point back to the first. Two parameterizations are exposed:
//! - `point_at` / `tangent_at` take the raw spline parameter. Every segment
//!   gets an equal share of `[0, 1)` regardless of its length, so equal steps
//!   are not equal distances.
//! - `point_at_uniform` / `tangent_at_uniform` remap through an arc-length
//!   table built once at construction, so equal steps cover equal road.
//!
//! Both are pure: the same parameter always yields the same point.

use bevy::prelude::*;

/// Number of chords used to approximate arc length.
const ARC_LENGTH_DIVISIONS: usize = 200;

/// Track layout and road dimensions.
#[derive(Resource, Clone, Debug)]
pub struct TrackConfig {
    /// Ordered control points on the ground plane. The loop closes implicitly.
    /// Must describe a simple closed loop of at least 4 points; this is not
    /// checked.
    pub control_points: Vec<Vec3>,
    /// Catmull-Rom tension. Lower values give flatter corners.
    pub tension: f32,
    /// Full width of the drivable surface.
    pub road_width: f32,
    /// Length of the long straights in the default layout.
    pub segment_length: f32,
    /// Corner radius in the default layout.
    pub curve_radius: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        let segment_length = 450.0;
        let curve_radius = 200.0;
        Self {
            control_points: default_loop(segment_length, curve_radius),
            tension: 0.3,
            road_width: 25.0,
            segment_length,
            curve_radius,
        }
    }
}

/// The stock loop: a long northbound straight, a hairpin, an eastern
/// straight and a sweeping return along the south.
pub fn default_loop(segment_length: f32, curve_radius: f32) -> Vec<Vec3> {
    let s = segment_length;
    let r = curve_radius;
    [
        (0.0, 0.0),
        (0.0, s * 1.5),
        (r, s * 1.5 + r),
        (r * 2.0, s * 1.5),
        (r * 2.0 + s, s * 1.5),
        (r * 3.0 + s, s * 1.5 - r),
        (r * 2.0 + s, s * 1.5 - 2.0 * r),
        (r * 2.0 + s, -s * 0.5),
        (r + s, -s * 0.5 - r),
        (r, -s * 0.5 - r * 2.0),
        (-r, -s * 0.5 - r),
        (0.0, -s * 0.5),
    ]
    .into_iter()
    .map(|(x, z)| Vec3::new(x, 0.0, z))
    .collect()
}

/// Immutable closed spline through the control points.
#[derive(Clone, Debug)]
pub struct TrackCurve {
    points: Vec<Vec3>,
    tension: f32,
    /// Cumulative chord length at `i / ARC_LENGTH_DIVISIONS`.
    arc_lengths: Vec<f32>,
}

impl TrackCurve {
    pub fn new(points: Vec<Vec3>, tension: f32) -> Self {
        let mut curve = Self {
            points,
            tension,
            arc_lengths: Vec::new(),
        };
        curve.arc_lengths = curve.compute_arc_lengths();
        curve
    }

    pub fn from_config(config: &TrackConfig) -> Self {
        Self::new(config.control_points.clone(), config.tension)
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    /// Approximate length of the whole loop.
    pub fn length(&self) -> f32 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// Position at raw spline parameter `t`. Values outside `[0, 1)` wrap.
    pub fn point_at(&self, t: f32) -> Vec3 {
        let Some((index, w)) = self.locate(t) else {
            return Vec3::ZERO;
        };
        let [c0, c1, c2, c3] = self.coefficients(index);
        c0 + c1 * w + c2 * (w * w) + c3 * (w * w * w)
    }

    /// Derivative of the curve at raw parameter `t`.
    ///
    /// Not normalized; callers normalize when they need a direction.
    pub fn tangent_at(&self, t: f32) -> Vec3 {
        let Some((index, w)) = self.locate(t) else {
            return Vec3::Z;
        };
        let [_, c1, c2, c3] = self.coefficients(index);
        (c1 + c2 * (2.0 * w) + c3 * (3.0 * w * w)) * self.points.len() as f32
    }

    /// Position at fraction `u` of the loop's arc length.
    pub fn point_at_uniform(&self, u: f32) -> Vec3 {
        self.point_at(self.parameter_at_uniform(u))
    }

    /// Derivative at fraction `u` of the loop's arc length.
    pub fn tangent_at_uniform(&self, u: f32) -> Vec3 {
        self.tangent_at(self.parameter_at_uniform(u))
    }

    /// Map an arc-length fraction to the raw spline parameter.
    pub fn parameter_at_uniform(&self, u: f32) -> f32 {
        let u = u.rem_euclid(1.0);
        let total = self.length();
        if total <= f32::EPSILON {
            return u;
        }

        let target = u * total;
        let upper = self.arc_lengths.partition_point(|&len| len < target);
        if upper == 0 {
            return 0.0;
        }
        let lower = upper - 1;
        let span = self.arc_lengths[upper] - self.arc_lengths[lower];
        let fraction = if span > 0.0 {
            (target - self.arc_lengths[lower]) / span
        } else {
            0.0
        };

        (lower as f32 + fraction) / ARC_LENGTH_DIVISIONS as f32
    }

    /// `divisions + 1` evenly spaced points; the last one repeats the first.
    pub fn sample_uniform(&self, divisions: usize) -> Vec<Vec3> {
        let divisions = divisions.max(1);
        (0..=divisions)
            .map(|i| self.point_at_uniform(i as f32 / divisions as f32))
            .collect()
    }

    /// Segment index and local weight for a raw parameter.
    fn locate(&self, t: f32) -> Option<(usize, f32)> {
        let n = self.points.len();
        if n == 0 {
            return None;
        }
        let scaled = t.rem_euclid(1.0) * n as f32;
        let index = scaled.floor();
        Some(((index as usize) % n, scaled - index))
    }

    /// Cubic coefficients of the segment starting at control point `index`.
    fn coefficients(&self, index: usize) -> [Vec3; 4] {
        let n = self.points.len();
        let p0 = self.points[(index + n - 1) % n];
        let p1 = self.points[index];
        let p2 = self.points[(index + 1) % n];
        let p3 = self.points[(index + 2) % n];

        let m1 = (p2 - p0) * self.tension;
        let m2 = (p3 - p1) * self.tension;

        [
            p1,
            m1,
            p2 * 3.0 - p1 * 3.0 - m1 * 2.0 - m2,
            p1 * 2.0 - p2 * 2.0 + m1 + m2,
        ]
    }

    fn compute_arc_lengths(&self) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(ARC_LENGTH_DIVISIONS + 1);
        let mut previous = self.point_at(0.0);
        let mut total = 0.0;
        lengths.push(0.0);

        for i in 1..=ARC_LENGTH_DIVISIONS {
            let point = self.point_at(i as f32 / ARC_LENGTH_DIVISIONS as f32);
            total += point.distance(previous);
            lengths.push(total);
            previous = point;
        }

        lengths
    }
}

/// Unit vector in the ground plane, perpendicular to `tangent`, pointing to
/// the left of travel.
pub fn ground_normal(tangent: Vec3) -> Vec3 {
    Vec3::new(-tangent.z, 0.0, tangent.x).normalize_or_zero()
}

/// Precomputed centerline samples for "is this spot on the road" queries.
#[derive(Clone, Debug)]
pub struct TrackClearance {
    samples: Vec<Vec2>,
}

impl TrackClearance {
    pub fn new(curve: &TrackCurve, divisions: usize) -> Self {
        Self {
            samples: curve
                .sample_uniform(divisions)
                .into_iter()
                .map(|p| Vec2::new(p.x, p.z))
                .collect(),
        }
    }

    /// Ground-plane distance from `position` to the nearest centerline sample.
    pub fn distance_to_track(&self, position: Vec3) -> f32 {
        let flat = Vec2::new(position.x, position.z);
        self.samples
            .iter()
            .map(|sample| flat.distance_squared(*sample))
            .fold(f32::INFINITY, f32::min)
            .sqrt()
    }

    pub fn is_on_road(&self, position: Vec3, tolerance: f32) -> bool {
        self.distance_to_track(position) < tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_loop() -> TrackCurve {
        TrackCurve::new(
            vec![
                Vec3::new(-100.0, 0.0, -100.0),
                Vec3::new(100.0, 0.0, -100.0),
                Vec3::new(100.0, 0.0, 100.0),
                Vec3::new(-100.0, 0.0, 100.0),
            ],
            0.5,
        )
    }

    #[test]
    fn curve_passes_through_control_points() {
        let curve = TrackCurve::from_config(&TrackConfig::default());
        let n = curve.control_points().len();

        for (i, expected) in curve.control_points().iter().enumerate() {
            let point = curve.point_at(i as f32 / n as f32);
            assert!(point.distance(*expected) < 1e-2, "point {i}: {point:?}");
        }
    }

    #[test]
    fn loop_closes_without_a_gap() {
        for curve in [TrackCurve::from_config(&TrackConfig::default()), square_loop()] {
            let start = curve.point_at(0.0);
            let gaps: Vec<f32> = [1e-2, 1e-3, 1e-4]
                .iter()
                .map(|eps| curve.point_at(1.0 - eps).distance(start))
                .collect();

            assert!(gaps[0] > gaps[1] && gaps[1] > gaps[2], "gaps {gaps:?}");
            assert!(gaps[2] < 0.5);

            let before = curve.tangent_at(1.0 - 1e-5).normalize();
            let after = curve.tangent_at(0.0).normalize();
            assert!(before.dot(after) > 0.999);
        }
    }

    #[test]
    fn sampling_is_repeatable() {
        let curve = square_loop();
        for t in [0.0, 0.13, 0.5, 0.77, 0.999] {
            assert_eq!(curve.point_at(t), curve.point_at(t));
            assert!(curve.point_at(t).distance(curve.point_at(t + 1.0)) < 1e-2);
            assert_eq!(curve.tangent_at(t), curve.tangent_at(t));
        }
    }

    #[test]
    fn uniform_sampling_evens_out_spacing() {
        let curve = TrackCurve::from_config(&TrackConfig::default());

        let spacing = |points: &[Vec3]| {
            let gaps: Vec<f32> = points.windows(2).map(|w| w[0].distance(w[1])).collect();
            let min = gaps.iter().copied().fold(f32::INFINITY, f32::min);
            let max = gaps.iter().copied().fold(0.0, f32::max);
            max / min
        };

        let uniform = curve.sample_uniform(100);
        let raw: Vec<Vec3> = (0..=100).map(|i| curve.point_at(i as f32 / 100.0)).collect();

        assert!(spacing(&uniform) < 1.25);
        assert!(spacing(&raw) > 3.0);
        assert!(uniform[0].distance(uniform[100]) < 1e-3);
    }

    #[test]
    fn uniform_parameter_is_monotonic() {
        let curve = TrackCurve::from_config(&TrackConfig::default());
        let mut previous = -1.0;
        for i in 0..500 {
            let t = curve.parameter_at_uniform(i as f32 / 500.0);
            assert!(t > previous);
            assert!((0.0..1.0).contains(&t));
            previous = t;
        }
    }

    #[test]
    fn ground_normal_points_left_of_travel() {
        let normal = ground_normal(Vec3::new(0.0, 0.0, 5.0));
        assert!(normal.distance(Vec3::new(-1.0, 0.0, 0.0)) < 1e-6);
        assert_eq!(ground_normal(Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn clearance_detects_road_proximity() {
        let curve = TrackCurve::from_config(&TrackConfig::default());
        let clearance = TrackClearance::new(&curve, 100);

        assert!(clearance.is_on_road(Vec3::ZERO, 37.5));
        assert!(clearance.is_on_road(Vec3::new(10.0, 0.0, 300.0), 37.5));
        assert!(!clearance.is_on_road(Vec3::new(-1000.0, 0.0, 1000.0), 37.5));
        assert!(clearance.distance_to_track(Vec3::new(-1000.0, 0.0, 1000.0)) > 500.0);
    }

    #[test]
    fn empty_curve_is_degenerate_but_defined() {
        let curve = TrackCurve::new(Vec::new(), 0.3);
        assert_eq!(curve.length(), 0.0);
        assert_eq!(curve.point_at(0.4), Vec3::ZERO);
        assert_eq!(curve.point_at_uniform(0.4), Vec3::ZERO);
    }
}
