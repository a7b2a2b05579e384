use super::{body::RapierBody, controller::LocomotionController};
use crate::{config::LocomotionConfig, types::*};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

pub struct LateralMovementPlugin;

impl Plugin for LateralMovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            tick_repeat_move.before(PhysicsSet::SyncBackend),
        )
        .add_systems(Update, face_direction.in_set(EngineSystemSet::Constrain));
    }
}

fn tick_repeat_move(
    time: Res<Time>,
    config: Res<LocomotionConfig>,
    mut player_query: Query<
        (
            &mut LocomotionController,
            &mut Transform,
            Option<&mut Velocity>,
            Option<&mut ExternalImpulse>,
            Option<&mut Friction>,
        ),
        With<Player>,
    >,
) {
    for (mut controller, transform, velocity, impulse, friction) in &mut player_query {
        if !controller.is_repeating() {
            continue;
        }
        let mut body = RapierBody::from_components(transform, velocity, impulse, friction);
        let applied = controller.tick(time.delta(), body.as_mut(), &config);
        if applied > 0 {
            trace!("{applied} step impulse(s) toward {:?}", controller.direction());
        }
    }
}

fn face_direction(
    player_query: Query<(&LocomotionController, &Children), With<Player>>,
    mut model_query: Query<&mut Transform, With<PlayerModel>>,
) {
    for (controller, children) in &player_query {
        let target = controller.facing().facing_rotation();
        for &child in children.iter() {
            if let Ok(mut transform) = model_query.get_mut(child) {
                if transform.rotation != target {
                    transform.rotation = target;
                }
            }
        }
    }
}
