//! Player car: input snapshot, state and the per-frame integrator.
//!
//! Acceleration, braking and drag are flat per-tick changes, not scaled by
//! the frame delta; only the final displacement is.

use std::f32::consts::PI;

use bevy::prelude::*;

use crate::procgen::track_curve::TrackCurve;

/// Tuning constants for the car.
#[derive(Resource, Clone, Debug)]
pub struct CarConfig {
    /// Top forward speed in simulation units.
    pub max_speed: f32,
    /// Speed added per tick while accelerating.
    pub acceleration: f32,
    /// Base drag fraction removed per tick while coasting.
    pub deceleration: f32,
    /// Extra drag per unit of speed ratio while coasting.
    pub speed_drag: f32,
    /// Speed removed per tick while braking or reversing.
    pub brake_power: f32,
    /// Heading change per tick at full turn authority, radians.
    pub turn_speed: f32,
    /// Turn authority available even at crawling speed.
    pub base_turn_authority: f32,
    /// Front wheel visual angle at full turn authority.
    pub max_turn_angle: f32,
    /// Collision radius.
    pub radius: f32,
    /// World units travelled per simulation speed unit per second.
    pub distance_scale: f32,
    /// Reverse top speed is `max_speed / reverse_divisor`.
    pub reverse_divisor: f32,
    /// Height of the car body above the ground.
    pub ride_height: f32,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            max_speed: 7.0,
            acceleration: 0.015,
            deceleration: 0.005,
            speed_drag: 0.02,
            brake_power: 0.05,
            turn_speed: 0.025,
            base_turn_authority: 0.3,
            max_turn_angle: PI,
            radius: 1.0,
            distance_scale: 46.0,
            reverse_divisor: 1.5,
            ride_height: 0.4,
        }
    }
}

impl CarConfig {
    pub fn min_speed(&self) -> f32 {
        -self.max_speed / self.reverse_divisor
    }
}

/// Below this speed the car neither steers nor keeps coasting.
const STANDSTILL_SPEED: f32 = 0.01;

/// Driver input for one frame.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Position, heading and speed of the car.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarState {
    pub position: Vec3,
    /// Heading around the vertical axis. 0 faces +Z.
    pub yaw: f32,
    /// Signed speed; negative is reversing.
    pub speed: f32,
    /// Visual steer angle of the front wheels.
    pub front_wheel_angle: f32,
}

impl CarState {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            yaw,
            speed: 0.0,
            front_wheel_angle: 0.0,
        }
    }

    /// Parked on the start line, facing along the track.
    pub fn at_start(curve: &TrackCurve, config: &CarConfig) -> Self {
        let start = curve.point_at_uniform(0.0);
        let ahead = curve.point_at_uniform(0.01);
        let direction = ahead - start;
        let yaw = direction.x.atan2(direction.z);
        Self::new(Vec3::new(start.x, config.ride_height, start.z), yaw)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Unit direction of travel.
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }
}

/// Movement proposed by the integrator, not yet committed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DynamicsStep {
    pub direction: Vec3,
    /// Signed distance along `direction`.
    pub distance: f32,
}

impl DynamicsStep {
    pub fn displacement(&self) -> Vec3 {
        self.direction * self.distance
    }

    pub fn tentative_position(&self, from: Vec3) -> Vec3 {
        from + self.displacement()
    }
}

/// Turning authority for the current speed.
///
/// Grows with speed up to a cap and is damped again near top speed.
pub fn turn_factor(speed: f32, config: &CarConfig) -> f32 {
    let speed_ratio = speed.abs() / config.max_speed;
    let authority = (speed.abs() / (config.max_speed * 5.0)).min(1.0);
    let stability = 1.0 - speed_ratio * 0.5;
    authority * stability
}

/// Advance heading and speed by one tick and propose a displacement.
///
/// Position is left untouched; collision response decides how much of the
/// step to commit.
pub fn integrate(car: &mut CarState, controls: &Controls, delta: f32, config: &CarConfig) -> DynamicsStep {
    let speed_ratio = car.speed.abs() / config.max_speed;
    let factor = turn_factor(car.speed, config);
    let can_steer = car.speed.abs() > STANDSTILL_SPEED;
    let heading_step = config.turn_speed * (factor + config.base_turn_authority);

    car.front_wheel_angle = 0.0;
    if controls.left && can_steer {
        car.yaw += heading_step;
        car.front_wheel_angle = config.max_turn_angle * factor;
    }
    if controls.right && can_steer {
        car.yaw -= heading_step;
        car.front_wheel_angle = -config.max_turn_angle * factor;
    }

    if controls.forward {
        car.speed += config.acceleration;
    } else if controls.backward {
        car.speed -= config.brake_power;
    } else {
        car.speed *= 1.0 - (config.deceleration + speed_ratio * config.speed_drag);
        if car.speed.abs() < STANDSTILL_SPEED {
            car.speed = 0.0;
        }
    }
    car.speed = car.speed.clamp(config.min_speed(), config.max_speed);

    DynamicsStep {
        direction: car.forward(),
        distance: car.speed * delta * config.distance_scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn parked() -> CarState {
        CarState::new(Vec3::new(0.0, 0.4, 0.0), 0.0)
    }

    #[test]
    fn one_tick_of_throttle_adds_flat_acceleration() {
        let config = CarConfig::default();
        let controls = Controls {
            forward: true,
            ..default()
        };

        let mut car = parked();
        let step = integrate(&mut car, &controls, 0.1, &config);
        assert!((car.speed - 0.015).abs() < 1e-7);
        assert!((step.distance - 0.015 * 0.1 * 46.0).abs() < 1e-6);
        assert_eq!(car.position, parked().position);

        // Speed change is the same at any frame rate
        let mut other = parked();
        integrate(&mut other, &controls, 0.5, &config);
        assert_eq!(car.speed, other.speed);
    }

    #[test]
    fn coasting_applies_speed_dependent_drag() {
        let config = CarConfig::default();
        let mut car = parked();
        car.speed = 5.0;

        integrate(&mut car, &Controls::default(), 0.37, &config);
        let expected = 5.0 * (1.0 - (0.005 + (5.0 / 7.0) * 0.02));
        assert!((car.speed - expected).abs() < 1e-5);
    }

    #[test]
    fn coasting_snaps_to_a_stop() {
        let config = CarConfig::default();
        let mut car = parked();
        car.speed = 0.0100;

        integrate(&mut car, &Controls::default(), 0.016, &config);
        assert_eq!(car.speed, 0.0);
    }

    #[test]
    fn braking_goes_into_reverse_and_clamps() {
        let config = CarConfig::default();
        let controls = Controls {
            backward: true,
            ..default()
        };
        let mut car = parked();

        integrate(&mut car, &controls, 0.016, &config);
        assert!((car.speed + 0.05).abs() < 1e-6);

        for _ in 0..500 {
            integrate(&mut car, &controls, 0.016, &config);
        }
        assert_eq!(car.speed, config.min_speed());

        let step = integrate(&mut car, &controls, 0.1, &config);
        assert!(step.distance < 0.0);
    }

    #[test]
    fn stationary_car_cannot_turn() {
        let config = CarConfig::default();
        let controls = Controls {
            left: true,
            ..default()
        };
        let mut car = parked();

        integrate(&mut car, &controls, 0.016, &config);
        assert_eq!(car.yaw, 0.0);
        assert_eq!(car.front_wheel_angle, 0.0);
    }

    #[test]
    fn steering_rotates_heading_by_turn_authority() {
        let config = CarConfig::default();
        let mut car = parked();
        car.speed = 3.5;

        let factor = turn_factor(3.5, &config);
        assert!((factor - 0.1 * 0.75).abs() < 1e-6);

        let controls = Controls {
            left: true,
            forward: true,
            ..default()
        };
        integrate(&mut car, &controls, 0.016, &config);
        assert!((car.yaw - 0.025 * (factor + 0.3)).abs() < 1e-6);
        assert!((car.front_wheel_angle - PI * factor).abs() < 1e-5);

        let controls = Controls {
            right: true,
            ..default()
        };
        let yaw = car.yaw;
        integrate(&mut car, &controls, 0.016, &config);
        assert!(car.yaw < yaw);
        assert!(car.front_wheel_angle < 0.0);

        // Releasing the wheel recenters it
        integrate(&mut car, &Controls::default(), 0.016, &config);
        assert_eq!(car.front_wheel_angle, 0.0);
    }

    #[test]
    fn left_and_right_cancel_out() {
        let config = CarConfig::default();
        let mut car = parked();
        car.speed = 2.0;
        let controls = Controls {
            left: true,
            right: true,
            ..default()
        };

        integrate(&mut car, &controls, 0.016, &config);
        assert!(car.yaw.abs() < 1e-7);
        assert!(car.front_wheel_angle < 0.0);
    }

    #[test]
    fn speed_stays_in_range_for_any_input() {
        let config = CarConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut car = parked();

        for _ in 0..20_000 {
            let controls = Controls {
                forward: rng.gen_bool(0.6),
                backward: rng.gen_bool(0.3),
                left: rng.gen_bool(0.3),
                right: rng.gen_bool(0.3),
            };
            let delta = rng.gen_range(0.0..0.1);
            integrate(&mut car, &controls, delta, &config);
            assert!(car.speed >= config.min_speed() && car.speed <= config.max_speed);
        }
    }

    #[test]
    fn heading_zero_moves_along_positive_z() {
        let config = CarConfig::default();
        let mut car = parked();
        car.speed = 1.0;
        let step = integrate(&mut car, &Controls { forward: true, ..default() }, 0.5, &config);
        let next = step.tentative_position(car.position);
        assert!(next.z > car.position.z);
        assert!((next.x - car.position.x).abs() < 1e-6);
    }

    #[test]
    fn start_pose_faces_along_the_track() {
        let curve = TrackCurve::from_config(&crate::procgen::track_curve::TrackConfig::default());
        let car = CarState::at_start(&curve, &CarConfig::default());

        assert_eq!(car.position.y, 0.4);
        assert_eq!(car.speed, 0.0);
        let along = curve.tangent_at_uniform(0.0).normalize();
        assert!(car.forward().dot(along) > 0.99);
    }
}
