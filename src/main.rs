use bevy::prelude::*;
use bevy_inspector_egui::quick::WorldInspectorPlugin;
use bevy_rapier3d::prelude::*;
use egg_platformer::{
    camera::CameraPlugin, config::GameConfig, input::PlayerInputPlugin,
    locomotion::LocomotionPlugin, player::PlayerPlugin, scene::ScenePlugin,
};

fn main() {
    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Playground".into(),
            // Arrow keys and space must not scroll the page.
            prevent_default_event_handling: true,
            ..default()
        }),
        ..default()
    }));

    // Loaded after DefaultPlugins so the log subscriber is up.
    let config = GameConfig::load_or_default();
    let debug = config.debug.clone();

    app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
        .insert_resource(Time::<Fixed>::from_seconds(1.0 / 60.0))
        .insert_resource(config.locomotion)
        .insert_resource(config.level)
        .insert_resource(config.debug)
        .add_plugins((
            PlayerInputPlugin,
            LocomotionPlugin,
            PlayerPlugin,
            ScenePlugin,
            CameraPlugin,
        ));

    if debug.physics_wireframes {
        app.add_plugins(RapierDebugRenderPlugin::default());
    }
    if debug.inspector {
        app.add_plugins(WorldInspectorPlugin::new());
    }

    app.run();
}
