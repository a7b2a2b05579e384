use crate::{
    config::LevelConfig, input::input_bundle, locomotion::controller::LocomotionController,
    types::*,
};
use bevy::{asset::LoadState, prelude::*};
use bevy_rapier3d::prelude::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerData>()
            .add_systems(Startup, spawn_player)
            .add_systems(Update, (attach_player_body, update_player_data));
    }
}

#[derive(Resource, Default)]
pub struct PlayerData {
    pub player_position: Vec3,
}

/// Marks a player whose character model is still loading.
#[derive(Component)]
pub struct PendingBody {
    model: Option<Handle<Scene>>,
}

#[derive(Bundle)]
pub struct PlayerBodyBundle {
    pub rigid_body: RigidBody,
    pub collider: Collider,
    pub mass: ColliderMassProperties,
    pub restitution: Restitution,
    pub friction: Friction,
    pub velocity: Velocity,
    pub impulse: ExternalImpulse,
    pub active_events: ActiveEvents,
}

impl PlayerBodyBundle {
    pub fn new(level: &LevelConfig) -> Self {
        PlayerBodyBundle {
            rigid_body: RigidBody::Dynamic,
            collider: Collider::ball(level.player_diameter / 2.0),
            mass: ColliderMassProperties::Mass(level.player_mass),
            restitution: Restitution::coefficient(0.0),
            friction: Friction::coefficient(1.0),
            velocity: Velocity::zero(),
            impulse: ExternalImpulse::default(),
            active_events: ActiveEvents::COLLISION_EVENTS,
        }
    }
}

fn spawn_player(
    mut commands: Commands,
    level: Res<LevelConfig>,
    asset_server: Res<AssetServer>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    let model = level
        .player_model
        .as_ref()
        .map(|path| asset_server.load::<Scene>(path.clone()));

    commands
        .spawn((
            Name::new("player"),
            Player,
            LocomotionController::new(),
            input_bundle(),
            SpatialBundle::from_transform(Transform::from_translation(Vec3::from_array(
                level.player_spawn,
            ))),
            PendingBody {
                model: model.clone(),
            },
        ))
        .with_children(|parent| {
            match model {
                Some(scene) => parent.spawn((
                    PlayerModel,
                    SceneBundle {
                        scene,
                        ..default()
                    },
                )),
                None => parent.spawn((
                    PlayerModel,
                    PbrBundle {
                        mesh: meshes.add(
                            shape::UVSphere {
                                radius: level.player_diameter / 2.0,
                                ..default()
                            }
                            .into(),
                        ),
                        material: materials.add(StandardMaterial {
                            base_color: Color::RED,
                            metallic: 0.9,
                            perceptual_roughness: 0.3,
                            ..default()
                        }),
                        ..default()
                    },
                )),
            };
        });
}

fn model_ready(state: LoadState, with_dependencies: bool) -> bool {
    match state {
        // A failed model still gets a body.
        LoadState::Failed => true,
        _ => with_dependencies,
    }
}

fn attach_player_body(
    mut commands: Commands,
    level: Res<LevelConfig>,
    asset_server: Res<AssetServer>,
    pending_query: Query<(Entity, &PendingBody)>,
) {
    for (entity, pending) in &pending_query {
        if let Some(model) = &pending.model {
            let state = asset_server.load_state(model.id());
            if !model_ready(state, asset_server.is_loaded_with_dependencies(model.id())) {
                continue;
            }
            if state == LoadState::Failed {
                warn!("character model failed to load");
            }
        }
        commands
            .entity(entity)
            .remove::<PendingBody>()
            .insert(PlayerBodyBundle::new(&level));
        info!("player body attached");
    }
}

fn update_player_data(
    mut player_data: ResMut<PlayerData>,
    player_query: Query<&Transform, With<Player>>,
) {
    for transform in &player_query {
        player_data.player_position = transform.translation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_waits_for_the_model() {
        assert!(!model_ready(LoadState::Loading, false));
        assert!(!model_ready(LoadState::Loaded, false));
        assert!(model_ready(LoadState::Loaded, true));
        assert!(model_ready(LoadState::Failed, false));
    }

    #[test]
    fn body_matches_the_level() {
        let level = LevelConfig::default();
        let body = PlayerBodyBundle::new(&level);
        assert_eq!(body.friction.coefficient, 1.0);
        assert_eq!(body.restitution.coefficient, 0.0);
        assert!(matches!(body.mass, ColliderMassProperties::Mass(m) if m == 0.2));
        assert!(matches!(body.rigid_body, RigidBody::Dynamic));
    }

    #[test]
    fn player_data_tracks_the_player() {
        let mut app = App::new();
        app.init_resource::<PlayerData>()
            .add_systems(Update, update_player_data);
        app.world
            .spawn((Player, Transform::from_xyz(4.0, 2.0, 0.0)));
        app.update();
        assert_eq!(
            app.world.resource::<PlayerData>().player_position,
            Vec3::new(4.0, 2.0, 0.0)
        );
    }
}
