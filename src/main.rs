//! Trackdrive - drive a loop, dodge mountains, flatten trees.

use bevy::prelude::*;

use trackdrive::{camera, game_state, procgen, render, simulation, ui, world};

fn main() {
    // Force Vulkan backend on Windows (DX12 causes crashes on some systems)
    #[cfg(target_os = "windows")]
    std::env::set_var("WGPU_BACKEND", "vulkan");
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Trackdrive".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        // Session flow
        .add_plugins(game_state::GameStatePlugin)
        // Configuration
        .add_plugins(world::WorldPlugin)
        .add_plugins(procgen::ProcgenPlugin)
        // Simulation
        .add_plugins(simulation::SimulationPlugin)
        // Presentation
        .add_plugins(camera::CameraPlugin)
        .add_plugins(render::RenderPlugin)
        .add_plugins(ui::UiPlugin)
        .run();
}
