//! Speed, rpm and gear readout.

use bevy::prelude::*;

use crate::simulation::world::SimulationWorld;
use crate::simulation::SimulationSet;

/// Needle range of the dial.
pub const DIAL_MAX_SPEED: f32 = 372.0;
/// Engine speed at full throttle.
pub const MAX_RPM: f32 = 10_000.0;
/// Rpm band covered by each gear.
pub const RPM_PER_GEAR: f32 = 1_500.0;
pub const TOP_GEAR: u32 = 6;
/// Rpm above which the readout turns red.
pub const REDLINE_RPM: f32 = 8_000.0;

/// Dashboard values for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedometerReading {
    pub rpm: f32,
    pub gear: u32,
    pub display_speed: f32,
    pub redline: bool,
}

impl SpeedometerReading {
    /// Derive the readout from signed car speed. Reversing reads the same as
    /// driving forward at the same magnitude.
    pub fn from_speed(speed: f32, max_speed: f32) -> Self {
        let ratio = if max_speed > 0.0 {
            (speed / max_speed).abs()
        } else {
            0.0
        };

        let rpm = ratio * MAX_RPM;
        let gear = ((rpm / RPM_PER_GEAR).floor() as u32 + 1).clamp(1, TOP_GEAR);

        Self {
            rpm,
            gear,
            display_speed: (ratio * DIAL_MAX_SPEED).min(DIAL_MAX_SPEED),
            redline: rpm > REDLINE_RPM,
        }
    }
}

pub struct SpeedometerPlugin;

impl Plugin for SpeedometerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_speedometer).add_systems(
            Update,
            update_speedometer
                .after(SimulationSet::Step)
                .run_if(resource_exists::<SimulationWorld>),
        );
    }
}

#[derive(Component)]
struct SpeedText;

#[derive(Component)]
struct GearText;

const PANEL_BG: Color = Color::srgba(0.03, 0.04, 0.05, 0.85);
const NORMAL_TEXT: Color = Color::srgb(0.85, 0.95, 0.9);
const REDLINE_TEXT: Color = Color::srgb(1.0, 0.25, 0.2);

fn setup_speedometer(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(16.0),
                right: Val::Px(16.0),
                padding: UiRect::axes(Val::Px(14.0), Val::Px(10.0)),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::FlexEnd,
                row_gap: Val::Px(4.0),
                ..default()
            },
            BackgroundColor(PANEL_BG),
        ))
        .with_children(|panel| {
            panel.spawn((
                Text::new("0 km/h"),
                TextFont {
                    font_size: 32.0,
                    ..default()
                },
                TextColor(NORMAL_TEXT),
                SpeedText,
            ));

            panel.spawn((
                Text::new("GEAR 1 | 0 RPM"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(NORMAL_TEXT),
                GearText,
            ));
        });
}

fn update_speedometer(
    simulation: Res<SimulationWorld>,
    mut speed_query: Query<&mut Text, (With<SpeedText>, Without<GearText>)>,
    mut gear_query: Query<(&mut Text, &mut TextColor), With<GearText>>,
) {
    let reading = SpeedometerReading::from_speed(simulation.car().speed, simulation.settings().car.max_speed);

    for mut text in &mut speed_query {
        **text = format!("{:.0} km/h", reading.display_speed);
    }

    for (mut text, mut color) in &mut gear_query {
        **text = format!("GEAR {} | {:.0} RPM", reading.gear, reading.rpm);
        color.0 = if reading.redline { REDLINE_TEXT } else { NORMAL_TEXT };
    }
}
