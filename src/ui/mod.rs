//! Heads-up display: session status, controls hint and speedometer.

use bevy::prelude::*;

use crate::game_state::GameState;
use crate::simulation::world::SimulationWorld;

pub mod speedometer;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(speedometer::SpeedometerPlugin)
            .add_systems(Startup, setup_hud)
            .add_systems(Update, (update_status, update_obstacle_stats));
    }
}

/// Marker for the session status line.
#[derive(Component)]
struct StatusText;

/// Marker for the obstacle tally.
#[derive(Component)]
struct ObstacleStatsText;

fn setup_hud(mut commands: Commands) {
    let panel_bg = Color::srgba(0.03, 0.04, 0.05, 0.85);
    let accent = Color::srgb(1.0, 0.6, 0.2);
    let body = Color::srgb(0.8, 0.9, 0.85);

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                left: Val::Px(10.0),
                padding: UiRect::axes(Val::Px(12.0), Val::Px(10.0)),
                row_gap: Val::Px(6.0),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(panel_bg),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("TRACKDRIVE"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(accent),
            ));

            parent.spawn((
                Text::new("Press ENTER to start"),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(body),
                StatusText,
            ));

            parent.spawn((
                Text::new("Felled: -- / --"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(body),
                ObstacleStatsText,
            ));
        });

    commands.spawn((
        Text::new("W/S or Up/Down: Throttle/Brake | A/D or Left/Right: Steer | P: Pause"),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.65, 0.75, 0.7)),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));
}

fn update_status(state: Res<State<GameState>>, mut query: Query<&mut Text, With<StatusText>>) {
    if !state.is_changed() {
        return;
    }

    let status = match state.get() {
        GameState::Waiting => "Press ENTER to start",
        GameState::Driving => "DRIVING",
        GameState::Paused => "PAUSED",
    };

    for mut text in &mut query {
        **text = status.to_string();
    }
}

fn update_obstacle_stats(
    simulation: Option<Res<SimulationWorld>>,
    mut query: Query<&mut Text, With<ObstacleStatsText>>,
) {
    let Some(simulation) = simulation else {
        return;
    };
    if !simulation.is_changed() {
        return;
    }

    let obstacles = simulation.obstacles();
    let knockable = obstacles.iter().filter(|(_, o)| o.kind.is_knockable()).count();

    for mut text in &mut query {
        **text = format!(
            "Felled: {} / {} | Falling: {}",
            obstacles.knocked_down_count(),
            knockable,
            simulation.falling().len()
        );
    }
}
