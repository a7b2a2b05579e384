use crate::{
    config::{DebugConfig, LevelConfig},
    locomotion::egg::{EggBodyBundle, EggCarryState},
    types::*,
};
use bevy::{
    prelude::*,
    render::{
        mesh::VertexAttributeValues,
        texture::{ImageAddressMode, ImageLoaderSettings, ImageSampler, ImageSamplerDescriptor},
    },
};
use bevy_rapier3d::prelude::*;

const SLAB_THICKNESS: f32 = 0.2;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::rgb(0.53, 0.78, 0.92)))
            .insert_resource(AmbientLight {
                color: Color::WHITE,
                brightness: 0.3,
            })
            .init_resource::<DebugConfig>()
            .add_systems(Startup, (setup_room, setup_lights))
            .add_systems(
                Update,
                draw_world_axis.run_if(|debug: Res<DebugConfig>| debug.show_world_axis),
            );
    }
}

/// A static box collider with physics material.
#[derive(Bundle)]
struct SlabBundle {
    rigid_body: RigidBody,
    collider: Collider,
    friction: Friction,
    restitution: Restitution,
}

impl SlabBundle {
    fn new(half_extents: Vec3, friction: f32, restitution: f32) -> Self {
        SlabBundle {
            rigid_body: RigidBody::Fixed,
            collider: Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
            friction: Friction::coefficient(friction),
            restitution: Restitution::coefficient(restitution),
        }
    }
}

fn setup_room(
    mut commands: Commands,
    level: Res<LevelConfig>,
    asset_server: Res<AssetServer>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    let white = materials.add(Color::WHITE.into());
    let half_width = level.width / 2.0;
    let half_height = level.height / 2.0;
    let half_depth = level.depth / 2.0;
    let half_slab = SLAB_THICKNESS / 2.0;

    let floor_extents = Vec3::new(half_width, half_slab, half_depth);
    let floor_mesh = meshes.add(shape::Box::new(level.width, SLAB_THICKNESS, level.depth).into());

    commands.spawn((
        Name::new("ground"),
        Ground,
        PbrBundle {
            mesh: floor_mesh.clone(),
            material: white.clone(),
            transform: Transform::from_xyz(0.0, -half_slab, 0.0),
            ..default()
        },
        SlabBundle::new(floor_extents, 1.0, 0.0),
    ));

    commands.spawn((
        Name::new("ceiling"),
        PbrBundle {
            mesh: floor_mesh,
            material: white.clone(),
            transform: Transform::from_xyz(0.0, level.height + half_slab, 0.0),
            ..default()
        },
        SlabBundle::new(floor_extents, 1.0, 0.0),
    ));

    let side_mesh = meshes.add(shape::Box::new(SLAB_THICKNESS, level.height, level.depth).into());
    for (name, x) in [("left wall", -half_width), ("right wall", half_width)] {
        commands.spawn((
            Name::new(name),
            PbrBundle {
                mesh: side_mesh.clone(),
                material: white.clone(),
                transform: Transform::from_xyz(x, half_height, 0.0),
                ..default()
            },
            SlabBundle::new(Vec3::new(half_slab, half_height, half_depth), 1.0, 0.9),
        ));
    }

    let back_material = match back_wall_material(&level, &asset_server) {
        Some(material) => materials.add(material),
        None => white.clone(),
    };
    let mut back_mesh: Mesh = shape::Box::new(level.width, level.height, SLAB_THICKNESS).into();
    if level.back_wall_tile_size > 0.0 {
        tile_uvs(
            &mut back_mesh,
            Vec2::new(level.width, level.height) / level.back_wall_tile_size,
        );
    }
    if level.back_wall_normal_map.is_some() {
        if let Err(err) = back_mesh.generate_tangents() {
            warn!("back wall normal map disabled: {err}");
        }
    }
    let wall_extents = Vec3::new(half_width, half_height, half_slab);
    commands.spawn((
        Name::new("back wall"),
        PbrBundle {
            mesh: meshes.add(back_mesh),
            material: back_material,
            transform: Transform::from_xyz(0.0, half_height, -half_depth - half_slab),
            ..default()
        },
        SlabBundle::new(wall_extents, 0.01, 0.1),
    ));

    // Invisible, it sits between the camera and the player.
    commands.spawn((
        Name::new("front wall"),
        TransformBundle::from_transform(Transform::from_xyz(
            0.0,
            half_height,
            half_depth + half_slab,
        )),
        SlabBundle::new(wall_extents, 0.01, 0.1),
    ));

    commands.spawn((
        Name::new("platform"),
        Platform,
        PbrBundle {
            mesh: meshes.add(
                shape::Box::new(level.platform_width, SLAB_THICKNESS, level.depth).into(),
            ),
            material: white.clone(),
            transform: Transform::from_xyz(0.0, level.platform_height, 0.0),
            ..default()
        },
        SlabBundle::new(
            Vec3::new(level.platform_width / 2.0, half_slab, half_depth),
            0.01,
            0.1,
        ),
    ));

    commands.spawn((
        Name::new("egg"),
        Egg,
        EggCarryState::OnGround,
        PbrBundle {
            mesh: meshes.add(
                shape::UVSphere {
                    radius: level.egg_diameter / 2.0,
                    sectors: 16,
                    stacks: 16,
                }
                .into(),
            ),
            material: white,
            transform: Transform::from_translation(Vec3::from_array(level.egg_spawn)),
            ..default()
        },
        EggBodyBundle::new(&level),
    ));

    info!(
        "room built: {} x {} x {}",
        level.width, level.height, level.depth
    );
}

/// Repeating texture, loaded as colour data when `srgb` is set and as raw
/// values (normals, roughness) otherwise.
fn load_wall_texture(asset_server: &AssetServer, path: &str, srgb: bool) -> Handle<Image> {
    asset_server.load_with_settings(path.to_string(), move |settings: &mut ImageLoaderSettings| {
        settings.is_srgb = srgb;
        settings.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
            address_mode_u: ImageAddressMode::Repeat,
            address_mode_v: ImageAddressMode::Repeat,
            ..default()
        });
    })
}

fn back_wall_material(level: &LevelConfig, asset_server: &AssetServer) -> Option<StandardMaterial> {
    let load = |path: &Option<String>, srgb: bool| {
        path.as_deref().map(|path| load_wall_texture(asset_server, path, srgb))
    };
    let base_color_texture = load(&level.back_wall_texture, true);
    let normal_map_texture = load(&level.back_wall_normal_map, false);
    let metallic_roughness_texture = load(&level.back_wall_roughness_map, false);
    if base_color_texture.is_none()
        && normal_map_texture.is_none()
        && metallic_roughness_texture.is_none()
    {
        return None;
    }

    // With a roughness map the factors scale the texture channels.
    let (metallic, perceptual_roughness) = match metallic_roughness_texture {
        Some(_) => (1.0, 1.0),
        None => (0.0, 0.9),
    };
    Some(StandardMaterial {
        base_color_texture,
        normal_map_texture,
        metallic_roughness_texture,
        metallic,
        perceptual_roughness,
        ..default()
    })
}

/// Scales the mesh's texture coordinates so textures repeat `repeat` times.
fn tile_uvs(mesh: &mut Mesh, repeat: Vec2) {
    if let Some(VertexAttributeValues::Float32x2(uvs)) = mesh.attribute_mut(Mesh::ATTRIBUTE_UV_0) {
        for uv in uvs.iter_mut() {
            uv[0] *= repeat.x;
            uv[1] *= repeat.y;
        }
    }
}

fn setup_lights(mut commands: Commands, level: Res<LevelConfig>) {
    commands.spawn((
        Name::new("sun"),
        DirectionalLightBundle {
            directional_light: DirectionalLight {
                shadows_enabled: true,
                ..default()
            },
            transform: Transform::from_xyz(10.0, level.height, 10.0)
                .looking_to(Vec3::new(-1.0, -3.0, -3.0), Vec3::Y),
            ..default()
        },
    ));
}

fn draw_world_axis(mut gizmos: Gizmos, debug: Res<DebugConfig>) {
    let size = debug.world_axis_size;
    gizmos.line(Vec3::ZERO, Vec3::X * size, Color::RED);
    gizmos.line(Vec3::ZERO, Vec3::Y * size, Color::GREEN);
    gizmos.line(Vec3::ZERO, Vec3::Z * size, Color::BLUE);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uv_bounds(mesh: &Mesh) -> Vec2 {
        match mesh.attribute(Mesh::ATTRIBUTE_UV_0) {
            Some(VertexAttributeValues::Float32x2(uvs)) => uvs
                .iter()
                .fold(Vec2::ZERO, |max, uv| max.max(Vec2::from_array(*uv))),
            _ => Vec2::ZERO,
        }
    }

    #[test]
    fn back_wall_textures_repeat_per_tile() {
        let level = LevelConfig::default();
        let mut mesh: Mesh = shape::Box::new(level.width, level.height, SLAB_THICKNESS).into();
        assert_eq!(uv_bounds(&mesh), Vec2::ONE);

        tile_uvs(
            &mut mesh,
            Vec2::new(level.width, level.height) / level.back_wall_tile_size,
        );
        assert_eq!(uv_bounds(&mesh), Vec2::new(7.5, 2.0));
    }
}
