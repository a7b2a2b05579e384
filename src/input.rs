use crate::types::{EngineSystemSet, Player};
use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

#[derive(Actionlike, PartialEq, Eq, Clone, Copy, Hash, Debug, Reflect)]
pub enum PlayerAction {
    MoveLeft,
    MoveRight,
    Flap,
    LaunchEgg,
}

impl PlayerAction {
    pub const ALL: [PlayerAction; 4] = [
        PlayerAction::MoveLeft,
        PlayerAction::MoveRight,
        PlayerAction::Flap,
        PlayerAction::LaunchEgg,
    ];

    pub fn default_input_map() -> InputMap<PlayerAction> {
        InputMap::new([
            (KeyCode::Left, PlayerAction::MoveLeft),
            (KeyCode::Right, PlayerAction::MoveRight),
            (KeyCode::Space, PlayerAction::Flap),
            (KeyCode::AltRight, PlayerAction::LaunchEgg),
        ])
    }
}

/// A key edge for the locomotion controller.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Pressed(PlayerAction),
    Released(PlayerAction),
}

pub struct PlayerInputPlugin;

impl Plugin for PlayerInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<PlayerAction>::default())
            .add_event::<ControlEvent>()
            .add_systems(
                Update,
                read_player_actions.in_set(EngineSystemSet::ReadInput),
            );
    }
}

pub fn input_bundle() -> InputManagerBundle<PlayerAction> {
    InputManagerBundle::<PlayerAction> {
        action_state: ActionState::default(),
        input_map: PlayerAction::default_input_map(),
    }
}

fn read_player_actions(
    actions_query: Query<&ActionState<PlayerAction>, With<Player>>,
    mut control_events: EventWriter<ControlEvent>,
) {
    for action_state in &actions_query {
        // Releases go first so a key swapped within one frame leaves the new
        // key in charge.
        for action in PlayerAction::ALL {
            if action_state.just_released(action) {
                control_events.send(ControlEvent::Released(action));
            }
        }
        for action in PlayerAction::ALL {
            if action_state.just_pressed(action) {
                control_events.send(ControlEvent::Pressed(action));
            }
        }
    }
}
