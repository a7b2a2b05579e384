use crate::{config::LevelConfig, player::PlayerData};
use bevy::prelude::*;

/// Side-on camera that trails the player.
#[derive(Component, Default)]
pub struct MainCamera {
    offset: Vec3,
    easing: f32,
    desired_position: Vec3,
}

fn spawn_camera(mut commands: Commands, level: Res<LevelConfig>) {
    let offset = Vec3::Z * level.camera_distance;
    commands.spawn((
        Camera3dBundle {
            projection: Projection::Perspective(PerspectiveProjection {
                fov: level.camera_fov,
                near: 0.1,
                ..default()
            }),
            transform: Transform::from_translation(offset).looking_at(Vec3::ZERO, Vec3::Y),
            ..default()
        },
        MainCamera {
            offset,
            easing: level.camera_easing,
            desired_position: offset,
        },
    ));
}

fn update_camera_desired_position(
    mut camera_query: Query<&mut MainCamera>,
    player_data: Res<PlayerData>,
) {
    for mut camera in &mut camera_query {
        camera.desired_position = player_data.player_position + camera.offset;
    }
}

fn position_camera(
    time: Res<Time>,
    player_data: Res<PlayerData>,
    mut camera_query: Query<(&mut Transform, &MainCamera)>,
) {
    for (mut transform, camera) in &mut camera_query {
        let step = (time.delta_seconds() * camera.easing).min(1.0);
        transform.translation = transform.translation.lerp(camera.desired_position, step);
        transform.look_at(player_data.player_position, Vec3::Y);
    }
}

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera).add_systems(
            Update,
            (update_camera_desired_position, position_camera).chain(),
        );
    }
}
