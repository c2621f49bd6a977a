//! Chase camera that trails the car with a smoothed follow.

use bevy::{
    core_pipeline::tonemapping::Tonemapping,
    pbr::{DistanceFog, FogFalloff},
    prelude::*,
};

use crate::render::SKY_COLOR;
use crate::simulation::car::CarState;
use crate::simulation::world::SimulationWorld;
use crate::simulation::SimulationSet;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraConfig>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                follow_car
                    .after(SimulationSet::Step)
                    .run_if(resource_exists::<SimulationWorld>),
            );
    }
}

/// Chase camera tuning.
#[derive(Resource, Clone, Debug)]
pub struct CameraConfig {
    /// Camera position relative to the car, in the car's frame.
    pub offset: Vec3,
    /// Point the camera aims at, relative to the car.
    pub look_offset: Vec3,
    /// Follow rate; the per-frame blend is `min(rate * delta, 1)`.
    pub follow_rate: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Linear fog range.
    pub fog_start: f32,
    pub fog_end: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 5.0, -10.0),
            look_offset: Vec3::new(0.0, 1.0, 4.0),
            follow_rate: 18.0,
            fov_degrees: 75.0,
            fog_start: 200.0,
            fog_end: 1000.0,
        }
    }
}

/// Marker for the chase camera.
#[derive(Component)]
pub struct ChaseCamera;

fn setup_camera(mut commands: Commands, config: Res<CameraConfig>) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: config.fov_degrees.to_radians(),
            far: 5000.0,
            ..default()
        }),
        Tonemapping::TonyMcMapface,
        Transform::from_xyz(0.0, 5.0, -10.0).looking_at(Vec3::ZERO, Vec3::Y),
        DistanceFog {
            color: SKY_COLOR,
            falloff: FogFalloff::Linear {
                start: config.fog_start,
                end: config.fog_end,
            },
            ..default()
        },
        ChaseCamera,
    ));

    info!("Camera spawned");
}

/// Where the camera wants to be and what it looks at for this car state.
pub fn chase_target(car: &CarState, config: &CameraConfig) -> (Vec3, Vec3) {
    let rotation = car.rotation();
    (
        car.position + rotation * config.offset,
        car.position + rotation * config.look_offset,
    )
}

/// Fraction of the remaining gap closed this frame.
pub fn follow_blend(delta: f32, rate: f32) -> f32 {
    (delta * rate).clamp(0.0, 1.0)
}

fn follow_car(
    time: Res<Time>,
    config: Res<CameraConfig>,
    simulation: Res<SimulationWorld>,
    mut query: Query<&mut Transform, With<ChaseCamera>>,
) {
    let (desired, look_at) = chase_target(simulation.car(), &config);
    let blend = follow_blend(time.delta_secs(), config.follow_rate);

    for mut transform in &mut query {
        transform.translation = transform.translation.lerp(desired, blend);
        transform.look_at(look_at, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_sits_behind_and_above_the_car() {
        let car = CarState::new(Vec3::new(10.0, 0.4, 20.0), 0.0);
        let (position, look_at) = chase_target(&car, &CameraConfig::default());
        assert!((position - Vec3::new(10.0, 5.4, 10.0)).length() < 1e-5);
        assert!((look_at - Vec3::new(10.0, 1.4, 24.0)).length() < 1e-5);
    }

    #[test]
    fn target_turns_with_the_car() {
        let car = CarState::new(Vec3::ZERO, std::f32::consts::FRAC_PI_2);
        let (position, _) = chase_target(&car, &CameraConfig::default());
        // Facing +X, so "behind" is -X
        assert!((position - Vec3::new(-10.0, 5.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn blend_saturates_on_long_frames() {
        assert!((follow_blend(1.0 / 60.0, 18.0) - 0.3).abs() < 1e-6);
        assert_eq!(follow_blend(0.5, 18.0), 1.0);
        assert_eq!(follow_blend(0.0, 18.0), 0.0);
    }
}
