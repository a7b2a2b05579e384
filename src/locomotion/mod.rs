use crate::{
    config::{LevelConfig, LocomotionConfig},
    input::ControlEvent,
    types::*,
};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

pub mod body;
pub mod controller;
pub mod egg;
mod lateral;
mod vertical;

use body::RapierBody;
use controller::{reset_velocity, KeyResponse, LocomotionController};

pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LocomotionConfig>()
            .init_resource::<LevelConfig>()
            .register_type::<LocomotionController>()
            .add_event::<ControlEvent>()
            .configure_sets(
                Update,
                (
                    EngineSystemSet::ReadInput,
                    EngineSystemSet::HandleControls,
                    EngineSystemSet::Items,
                    EngineSystemSet::Constrain,
                )
                    .chain(),
            )
            .add_plugins((
                lateral::LateralMovementPlugin,
                vertical::VerticalMovementPlugin,
                egg::EggPlugin,
            ))
            .add_systems(
                Update,
                handle_controls.in_set(EngineSystemSet::HandleControls),
            )
            .add_systems(
                Update,
                flatten_player_motion.in_set(EngineSystemSet::Constrain),
            );
    }
}

fn handle_controls(
    config: Res<LocomotionConfig>,
    mut control_events: EventReader<ControlEvent>,
    mut launch_events: EventWriter<egg::LaunchEgg>,
    mut player_query: Query<
        (
            Entity,
            &mut LocomotionController,
            &mut Transform,
            Option<&mut Velocity>,
            Option<&mut ExternalImpulse>,
            Option<&mut Friction>,
        ),
        With<Player>,
    >,
    mut ground_query: Query<&mut Friction, (With<Ground>, Without<Player>)>,
) {
    for event in control_events.read() {
        for (player, mut controller, transform, velocity, impulse, friction) in &mut player_query
        {
            let mut body = RapierBody::from_components(transform, velocity, impulse, friction);
            let ground_friction = match *event {
                ControlEvent::Pressed(action) => {
                    match controller.key_down(action, body.as_mut(), &config) {
                        Ok(KeyResponse::Friction(coefficient)) => Some(coefficient),
                        Ok(KeyResponse::LaunchEgg(direction)) => {
                            launch_events.send(egg::LaunchEgg { player, direction });
                            None
                        }
                        Ok(KeyResponse::None) => None,
                        Err(err) => {
                            debug!("{action:?} skipped: {err}");
                            None
                        }
                    }
                }
                ControlEvent::Released(action) => {
                    controller.key_up(action, body.as_mut(), &config)
                }
            };

            if let Some(coefficient) = ground_friction {
                for mut surface in &mut ground_query {
                    surface.coefficient = coefficient;
                }
            }
        }
    }
}

/// Runs once per rendered frame.
fn flatten_player_motion(
    mut player_query: Query<
        (
            &mut Transform,
            Option<&mut Velocity>,
            Option<&mut ExternalImpulse>,
            Option<&mut Friction>,
        ),
        (With<Player>, With<LocomotionController>),
    >,
) {
    for (transform, velocity, impulse, friction) in &mut player_query {
        // No body until the character model has loaded.
        let mut body = RapierBody::from_components(transform, velocity, impulse, friction);
        let _ = reset_velocity(body.as_mut());
    }
}
