//! Session flow: waiting at the start line, driving, paused.

use bevy::prelude::*;

pub struct GameStatePlugin;

impl Plugin for GameStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_systems(Update, session_controls);
    }
}

/// High-level state controlling which systems run.
#[derive(States, Default, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum GameState {
    /// World is live but driver input is ignored until the player starts.
    #[default]
    Waiting,
    /// Driver input reaches the car.
    Driving,
    /// Simulation frozen.
    Paused,
}

impl GameState {
    /// Whether the world should advance this frame.
    pub fn is_running(self) -> bool {
        !matches!(self, GameState::Paused)
    }

    /// Whether keyboard input should reach the car.
    pub fn accepts_input(self) -> bool {
        matches!(self, GameState::Driving)
    }
}

/// Enter starts the session, P toggles pause.
fn session_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
) {
    match state.get() {
        GameState::Waiting if keyboard.just_pressed(KeyCode::Enter) => {
            info!("Session started");
            next.set(GameState::Driving);
        }
        GameState::Driving if keyboard.just_pressed(KeyCode::KeyP) => {
            info!("Simulation PAUSED");
            next.set(GameState::Paused);
        }
        GameState::Paused if keyboard.just_pressed(KeyCode::KeyP) => {
            info!("Simulation RESUMED");
            next.set(GameState::Driving);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_driving_takes_input_and_only_paused_freezes() {
        assert!(GameState::Waiting.is_running());
        assert!(!GameState::Waiting.accepts_input());
        assert!(GameState::Driving.is_running());
        assert!(GameState::Driving.accepts_input());
        assert!(!GameState::Paused.is_running());
        assert!(!GameState::Paused.accepts_input());
    }
}
