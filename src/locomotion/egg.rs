//! Egg pickup, carry and launch.

use crate::{
    config::{LevelConfig, LocomotionConfig},
    error::LocomotionError,
    types::*,
};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

pub struct EggPlugin;

impl Plugin for EggPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<EggCarryState>()
            .add_event::<LaunchEgg>()
            .add_systems(
                Update,
                (pick_up_egg, settle_egg, launch_egg)
                    .chain()
                    .in_set(EngineSystemSet::Items),
            );
    }
}

#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum EggCarryState {
    #[default]
    OnGround,
    Carried,
    Launched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EggEvent {
    /// The player touched the egg.
    Touched,
    Launch,
    /// A launched egg came down on the ground or a platform.
    Settled,
}

impl EggCarryState {
    pub fn transition(self, event: EggEvent) -> Result<Self, LocomotionError> {
        match (self, event) {
            (EggCarryState::OnGround, EggEvent::Touched) => Ok(EggCarryState::Carried),
            (EggCarryState::Carried, EggEvent::Launch) => Ok(EggCarryState::Launched),
            (EggCarryState::Launched, EggEvent::Settled) => Ok(EggCarryState::OnGround),
            (state, event) => Err(LocomotionError::InvalidEggTransition { state, event }),
        }
    }

    pub fn apply(&mut self, event: EggEvent) -> Result<Self, LocomotionError> {
        *self = self.transition(event)?;
        Ok(*self)
    }
}

/// Sent when the player asks to throw whatever egg it carries.
#[derive(Event, Debug, Clone, Copy)]
pub struct LaunchEgg {
    pub player: Entity,
    pub direction: MoveDirection,
}

/// Where a launched egg reappears and how hard it is pushed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EggLaunch {
    pub translation: Vec3,
    pub impulse: Vec3,
}

impl EggLaunch {
    /// The egg stays inside the side walls even when the player stands
    /// closer to a wall than the launch offset.
    pub fn from_player(
        player_position: Vec3,
        direction: MoveDirection,
        config: &LocomotionConfig,
        level: &LevelConfig,
    ) -> Self {
        let offset = Vec3::X * direction.sign() * config.egg_launch_offset;
        let mut translation = player_position + offset;
        let limit = (level.width / 2.0 - level.egg_diameter).max(0.0);
        translation.x = translation.x.clamp(-limit, limit);
        translation.z = 0.0;
        EggLaunch {
            translation,
            impulse: Vec3::X * direction.sign() * config.egg_launch_impulse,
        }
    }
}

/// Physics body of a free egg. Removed while the egg is carried.
#[derive(Bundle)]
pub struct EggBodyBundle {
    pub rigid_body: RigidBody,
    pub collider: Collider,
    pub mass: ColliderMassProperties,
    pub restitution: Restitution,
    pub friction: Friction,
    pub velocity: Velocity,
    pub impulse: ExternalImpulse,
    pub active_events: ActiveEvents,
}

impl EggBodyBundle {
    pub fn new(level: &LevelConfig) -> Self {
        EggBodyBundle {
            rigid_body: RigidBody::Dynamic,
            collider: Collider::ball(level.egg_diameter / 2.0),
            mass: ColliderMassProperties::Mass(level.egg_mass),
            restitution: Restitution::coefficient(0.2),
            friction: Friction::coefficient(0.3),
            velocity: Velocity::zero(),
            impulse: ExternalImpulse::default(),
            active_events: ActiveEvents::COLLISION_EVENTS,
        }
    }

    pub fn with_impulse(mut self, impulse: Vec3) -> Self {
        self.impulse.impulse = impulse;
        self
    }
}

fn started_pair(event: &CollisionEvent) -> Option<(Entity, Entity)> {
    match event {
        CollisionEvent::Started(a, b, _) => Some((*a, *b)),
        CollisionEvent::Stopped(..) => None,
    }
}

fn pick_up_egg(
    mut commands: Commands,
    level: Res<LevelConfig>,
    mut collision_events: EventReader<CollisionEvent>,
    player_query: Query<(), With<Player>>,
    mut egg_query: Query<&mut EggCarryState, With<Egg>>,
) {
    for (a, b) in collision_events.read().filter_map(started_pair) {
        let (player, egg) = if player_query.contains(a) && egg_query.contains(b) {
            (a, b)
        } else if player_query.contains(b) && egg_query.contains(a) {
            (b, a)
        } else {
            continue;
        };
        let Ok(mut state) = egg_query.get_mut(egg) else {
            continue;
        };

        match state.apply(EggEvent::Touched) {
            Ok(_) => {
                commands
                    .entity(egg)
                    .remove::<EggBodyBundle>()
                    .set_parent(player)
                    .insert(Transform::from_translation(level.egg_carry_offset()));
                info!("egg picked up");
            }
            Err(err) => debug!("{err}"),
        }
    }
}

fn settle_egg(
    mut collision_events: EventReader<CollisionEvent>,
    surface_query: Query<(), Or<(With<Ground>, With<Platform>)>>,
    mut egg_query: Query<&mut EggCarryState, With<Egg>>,
) {
    for (a, b) in collision_events.read().filter_map(started_pair) {
        let egg = if surface_query.contains(a) {
            b
        } else if surface_query.contains(b) {
            a
        } else {
            continue;
        };
        let Ok(mut state) = egg_query.get_mut(egg) else {
            continue;
        };
        if *state == EggCarryState::Launched && state.apply(EggEvent::Settled).is_ok() {
            info!("egg settled");
        }
    }
}

fn launch_egg(
    mut commands: Commands,
    config: Res<LocomotionConfig>,
    level: Res<LevelConfig>,
    mut launch_events: EventReader<LaunchEgg>,
    player_query: Query<&GlobalTransform, With<Player>>,
    mut egg_query: Query<(Entity, &mut EggCarryState, &Parent), With<Egg>>,
) {
    for request in launch_events.read() {
        let Ok(player_transform) = player_query.get(request.player) else {
            continue;
        };
        for (egg, mut state, parent) in &mut egg_query {
            if parent.get() != request.player {
                continue;
            }
            if let Err(err) = state.apply(EggEvent::Launch) {
                debug!("{err}");
                continue;
            }

            let launch = EggLaunch::from_player(
                player_transform.translation(),
                request.direction,
                &config,
                &level,
            );
            commands.entity(egg).remove_parent().insert((
                Transform::from_translation(launch.translation),
                EggBodyBundle::new(&level).with_impulse(launch.impulse),
            ));
            info!("egg launched from {}", launch.translation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_app::*;
    use super::*;
    use crate::input::{ControlEvent, PlayerAction};
    use bevy_rapier3d::rapier::geometry::CollisionEventFlags;

    fn touch(app: &mut App, a: Entity, b: Entity) {
        app.world.send_event(CollisionEvent::Started(
            a,
            b,
            CollisionEventFlags::empty(),
        ));
    }

    #[test]
    fn transitions_only_follow_the_cycle() {
        use EggCarryState::*;
        assert_eq!(OnGround.transition(EggEvent::Touched), Ok(Carried));
        assert_eq!(Carried.transition(EggEvent::Launch), Ok(Launched));
        assert_eq!(Launched.transition(EggEvent::Settled), Ok(OnGround));

        for (state, event) in [
            (OnGround, EggEvent::Launch),
            (OnGround, EggEvent::Settled),
            (Carried, EggEvent::Touched),
            (Carried, EggEvent::Settled),
            (Launched, EggEvent::Touched),
            (Launched, EggEvent::Launch),
        ] {
            assert_eq!(
                state.transition(event),
                Err(LocomotionError::InvalidEggTransition { state, event })
            );
        }
    }

    #[test]
    fn launch_placement_follows_direction() {
        let config = LocomotionConfig::default();
        let level = LevelConfig::default();
        let launch = EggLaunch::from_player(
            Vec3::new(10.0, 3.0, 0.4),
            MoveDirection::Left,
            &config,
            &level,
        );
        assert_eq!(launch.translation, Vec3::new(5.0, 3.0, 0.0));
        assert_eq!(launch.impulse, Vec3::new(-20.0, 0.0, 0.0));
    }

    #[test]
    fn launch_next_to_a_wall_stays_in_the_room() {
        let config = LocomotionConfig::default();
        let level = LevelConfig::default();

        let right = EggLaunch::from_player(
            Vec3::new(72.0, 3.0, 0.0),
            MoveDirection::Right,
            &config,
            &level,
        );
        assert_eq!(right.translation, Vec3::new(73.5, 3.0, 0.0));
        assert_eq!(right.impulse, Vec3::new(20.0, 0.0, 0.0));

        let left = EggLaunch::from_player(
            Vec3::new(-71.0, 3.0, 0.0),
            MoveDirection::Left,
            &config,
            &level,
        );
        assert_eq!(left.translation, Vec3::new(-73.5, 3.0, 0.0));
    }

    #[test]
    fn touching_the_egg_picks_it_up_once() {
        let mut app = app();
        let player = spawn_player(&mut app, Vec3::new(0.0, 1.0, 0.0));
        let egg = spawn_egg(&mut app);

        touch(&mut app, player, egg);
        touch(&mut app, egg, player);
        app.update();

        assert_eq!(
            app.world.get::<EggCarryState>(egg),
            Some(&EggCarryState::Carried)
        );
        assert_eq!(app.world.get::<Parent>(egg).map(Parent::get), Some(player));
        assert!(app.world.get::<RigidBody>(egg).is_none());
        assert!(app.world.get::<Collider>(egg).is_none());
        assert_eq!(
            app.world.get::<Transform>(egg).unwrap().translation,
            Vec3::new(1.75, 0.0, 0.0)
        );

        // A stale contact from the same step must not dispose again.
        touch(&mut app, player, egg);
        app.update();
        assert_eq!(
            app.world.get::<EggCarryState>(egg),
            Some(&EggCarryState::Carried)
        );
        assert_eq!(app.world.get::<Parent>(egg).map(Parent::get), Some(player));
    }

    #[test]
    fn unrelated_contacts_leave_the_egg_alone() {
        let mut app = app();
        let ground = spawn_ground(&mut app);
        let egg = spawn_egg(&mut app);

        touch(&mut app, ground, egg);
        app.update();

        assert_eq!(
            app.world.get::<EggCarryState>(egg),
            Some(&EggCarryState::OnGround)
        );
        assert!(app.world.get::<RigidBody>(egg).is_some());
    }

    #[test]
    fn launch_throws_the_egg_ahead_of_the_player() {
        let mut app = app();
        let player = spawn_player(&mut app, Vec3::new(10.0, 3.0, 0.0));
        *app.world.get_mut::<GlobalTransform>(player).unwrap() =
            GlobalTransform::from_translation(Vec3::new(10.0, 3.0, 0.0));
        let egg = spawn_egg(&mut app);
        touch(&mut app, player, egg);
        app.update();

        press(&mut app, ControlEvent::Pressed(PlayerAction::MoveLeft));
        press(&mut app, ControlEvent::Pressed(PlayerAction::LaunchEgg));

        assert_eq!(
            app.world.get::<EggCarryState>(egg),
            Some(&EggCarryState::Launched)
        );
        assert!(app.world.get::<Parent>(egg).is_none());
        let transform = app.world.get::<Transform>(egg).unwrap();
        assert!((transform.translation.x - 5.0).abs() < 1e-5);
        assert_eq!(transform.translation.z, 0.0);
        assert_eq!(transform.rotation, Quat::IDENTITY);
        let velocity = app.world.get::<Velocity>(egg).unwrap();
        assert_eq!(velocity.linvel.z, 0.0);
        assert_eq!(velocity.angvel, Vec3::ZERO);
        let impulse = app.world.get::<ExternalImpulse>(egg).unwrap();
        assert_eq!(impulse.impulse, Vec3::new(-20.0, 0.0, 0.0));
        assert!(app.world.get::<Collider>(egg).is_some());
    }

    #[test]
    fn launch_without_an_egg_does_nothing() {
        let mut app = app();
        spawn_player(&mut app, Vec3::ZERO);
        let egg = spawn_egg(&mut app);

        press(&mut app, ControlEvent::Pressed(PlayerAction::LaunchEgg));

        assert_eq!(
            app.world.get::<EggCarryState>(egg),
            Some(&EggCarryState::OnGround)
        );
        assert_eq!(
            app.world.get::<ExternalImpulse>(egg).unwrap().impulse,
            Vec3::ZERO
        );
    }

    #[test]
    fn launched_egg_settles_on_the_ground() {
        let mut app = app();
        let player = spawn_player(&mut app, Vec3::ZERO);
        let ground = spawn_ground(&mut app);
        let egg = spawn_egg(&mut app);
        touch(&mut app, player, egg);
        app.update();
        press(&mut app, ControlEvent::Pressed(PlayerAction::LaunchEgg));

        // Player contact while the egg is in flight is ignored.
        touch(&mut app, player, egg);
        app.update();
        assert_eq!(
            app.world.get::<EggCarryState>(egg),
            Some(&EggCarryState::Launched)
        );

        touch(&mut app, egg, ground);
        app.update();
        assert_eq!(
            app.world.get::<EggCarryState>(egg),
            Some(&EggCarryState::OnGround)
        );

        touch(&mut app, player, egg);
        app.update();
        assert_eq!(
            app.world.get::<EggCarryState>(egg),
            Some(&EggCarryState::Carried)
        );
    }
}
