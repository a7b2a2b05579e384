use super::controller::LocomotionController;
use crate::{config::LocomotionConfig, types::*};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

pub struct VerticalMovementPlugin;

impl Plugin for VerticalMovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            handle_ground_contact.after(PhysicsSet::Writeback),
        );
    }
}

/// One contact pair: both colliders and whether they currently touch.
type ContactPair = (Entity, Entity, bool);

/// Whether `player` is touching any collider accepted by `is_surface`.
fn touches_surface(
    player: Entity,
    pairs: impl IntoIterator<Item = ContactPair>,
    is_surface: impl Fn(Entity) -> bool,
) -> bool {
    pairs.into_iter().any(|(collider1, collider2, touching)| {
        let other = if collider1 == player {
            collider2
        } else {
            collider1
        };
        touching && is_surface(other)
    })
}

/// Polls the player's contact pairs every physics step. A contact with the
/// ground or a platform at low vertical speed grounds the player.
fn handle_ground_contact(
    config: Res<LocomotionConfig>,
    rapier_context: Res<RapierContext>,
    mut player_query: Query<(Entity, &mut LocomotionController, &Velocity), With<Player>>,
    surface_query: Query<(), Or<(With<Ground>, With<Platform>)>>,
) {
    for (entity, mut controller, velocity) in &mut player_query {
        let pairs = rapier_context.contacts_with(entity).map(|pair| {
            (
                pair.collider1(),
                pair.collider2(),
                pair.has_any_active_contacts(),
            )
        });

        if touches_surface(entity, pairs, |other| surface_query.contains(other)) {
            controller.on_ground_collision(velocity.linvel, &config);
        }
    }
}
