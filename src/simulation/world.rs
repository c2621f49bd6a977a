//! One self-contained driving session.
//!
//! `SimulationWorld` owns the track, the obstacles, the car and the falling
//! queue. Each `tick` runs the frame in a fixed order: dynamics, collision
//! query, resolution, knockdown animation. Readers only ever see the state
//! after a whole tick.

use bevy::prelude::*;
use rand::Rng;

use super::car::{integrate, CarConfig, CarState, Controls};
use super::collision::{detect, resolve, CollisionConfig, Resolution};
use super::knockdown::{animate, KnockdownConfig, KnockdownQueue};
use super::obstacles::ObstacleRegistry;
use crate::procgen::obstacle_placement::{ObstaclePlacer, PlacementConfig};
use crate::procgen::track_curve::{TrackConfig, TrackCurve};
use crate::world::WorldConfig;

/// Per-session tuning that the frame loop needs.
#[derive(Clone, Debug, Default)]
pub struct WorldSettings {
    pub world: WorldConfig,
    pub car: CarConfig,
    pub collision: CollisionConfig,
    pub knockdown: KnockdownConfig,
}

/// Summary of one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub resolution: Resolution,
}

#[derive(Resource, Clone, Debug)]
pub struct SimulationWorld {
    curve: TrackCurve,
    road_width: f32,
    settings: WorldSettings,
    obstacles: ObstacleRegistry,
    car: CarState,
    falling: KnockdownQueue,
    frame: u64,
}

impl SimulationWorld {
    /// Assemble a world from parts. The car starts on the start line.
    pub fn new(curve: TrackCurve, road_width: f32, obstacles: ObstacleRegistry, settings: WorldSettings) -> Self {
        let car = CarState::at_start(&curve, &settings.car);
        Self {
            curve,
            road_width,
            settings,
            obstacles,
            car,
            falling: KnockdownQueue::default(),
            frame: 0,
        }
    }

    /// Build the track and scatter obstacles around it.
    pub fn generate<R: Rng + ?Sized>(
        track: &TrackConfig,
        placement: &PlacementConfig,
        settings: WorldSettings,
        rng: &mut R,
    ) -> Self {
        let curve = TrackCurve::from_config(track);
        let obstacles = ObstaclePlacer::new(placement, &curve, track, &settings.world).place_all(rng);
        Self::new(curve, track.road_width, obstacles, settings)
    }

    /// Advance the session by one frame.
    pub fn tick(&mut self, controls: &Controls, delta: f32) -> FrameReport {
        let step = integrate(&mut self.car, controls, delta, &self.settings.car);

        let collision = if step.distance.abs() > self.settings.collision.min_query_distance {
            detect(
                step.tentative_position(self.car.position),
                self.settings.car.radius,
                &self.obstacles,
                &self.settings.world,
            )
        } else {
            None
        };

        let resolution = resolve(
            &mut self.car,
            &step,
            collision,
            &mut self.obstacles,
            &mut self.falling,
            &self.settings.collision,
        );

        animate(&mut self.falling, &mut self.obstacles, delta, &self.settings.knockdown);

        self.frame += 1;
        FrameReport {
            frame: self.frame,
            resolution,
        }
    }

    /// Replace the car, e.g. to reset after leaving the track.
    pub fn place_car(&mut self, car: CarState) {
        self.car = car;
    }

    pub fn curve(&self) -> &TrackCurve {
        &self.curve
    }

    pub fn road_width(&self) -> f32 {
        self.road_width
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn obstacles(&self) -> &ObstacleRegistry {
        &self.obstacles
    }

    pub fn car(&self) -> &CarState {
        &self.car
    }

    pub fn falling(&self) -> &KnockdownQueue {
        &self.falling
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}
