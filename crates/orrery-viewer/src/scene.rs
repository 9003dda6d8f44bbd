//! 3D scene construction and per-frame transform sync.

use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;
use orrery_logic::config::{BodyConfig, SurfaceKind};
use orrery_logic::scene::BodyId;
use orrery_logic::vector::Vec3 as OrreryVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::state::{BodyMarker, MainCamera, Session, Starfield, SunMarker};

/// Starfield placement is the same on every run.
const STARFIELD_SEED: u64 = 0x5eed_0f_57a5;

/// Three.js-style unit intensity mapped onto Bevy's physical units.
const SUN_LUMENS_PER_UNIT: f32 = 3.0e9;
const AMBIENT_BRIGHTNESS_PER_UNIT: f32 = 500.0;

pub fn hex_color(rgb: u32) -> Color {
    Color::srgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

pub fn to_bevy(v: OrreryVec3) -> Vec3 {
    Vec3::new(v.x as f32, v.y as f32, v.z as f32)
}

pub fn setup_scene(
    mut commands: Commands,
    session: Res<Session>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let config = session.0.config();
    let env = &config.environment;

    commands.insert_resource(ClearColor(Color::BLACK));
    commands.insert_resource(AmbientLight {
        color: hex_color(env.ambient_color),
        brightness: env.ambient_intensity as f32 * AMBIENT_BRIGHTNESS_PER_UNIT,
    });

    let start = session.0.navigation().pose();
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(to_bevy(start.position)),
        DistanceFog {
            color: hex_color(env.fog.color),
            falloff: FogFalloff::Linear {
                start: env.fog.near as f32,
                end: env.fog.far as f32,
            },
            ..default()
        },
        MainCamera,
    ));

    // Sun: unlit emissive sphere carrying the point light.
    let sun = &config.sun;
    commands
        .spawn((
            Mesh3d(meshes.add(Sphere::new(sun.radius as f32).mesh().uv(48, 32))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: hex_color(sun.color),
                emissive: hex_color(sun.emissive).to_linear() * sun.intensity as f32,
                unlit: true,
                ..default()
            })),
            Transform::IDENTITY,
            SunMarker,
        ))
        .with_children(|parent| {
            parent.spawn(PointLight {
                color: hex_color(env.sun_light_color),
                intensity: env.sun_light_intensity as f32 * SUN_LUMENS_PER_UNIT,
                range: (env.fog.far * 4.0) as f32,
                shadows_enabled: false,
                ..default()
            });
        });

    for (i, body) in config.bodies.iter().enumerate() {
        spawn_body(&mut commands, &mut meshes, &mut materials, BodyId(i), body);
    }

    let star_count = env.starfield.count;
    let mut rng = StdRng::seed_from_u64(STARFIELD_SEED);
    let spread = env.starfield.spread as f32;
    let positions: Vec<[f32; 3]> = (0..star_count)
        .map(|_| {
            [
                rng.gen_range(-spread..spread),
                rng.gen_range(-spread..spread),
                rng.gen_range(-spread..spread),
            ]
        })
        .collect();
    let stars = Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::RENDER_WORLD)
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    commands.spawn((
        Mesh3d(meshes.add(stars)),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            unlit: true,
            fog_enabled: false,
            ..default()
        })),
        Transform::IDENTITY,
        Starfield,
    ));

    info!(
        "Scene built: sun, {} bodies, {} stars",
        config.bodies.len(),
        star_count
    );
}

fn spawn_body(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    id: BodyId,
    body: &BodyConfig,
) {
    let radius = body.radius as f32;
    let roughness = match body.surface {
        SurfaceKind::Rocky => 0.95,
        SurfaceKind::Cloudy => 0.7,
        SurfaceKind::Earthlike => 0.6,
        SurfaceKind::GasGiant => 0.5,
    };

    let mut entity = commands.spawn((
        Mesh3d(meshes.add(Sphere::new(radius).mesh().uv(32, 24))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: hex_color(body.color),
            emissive: hex_color(body.emissive).to_linear(),
            perceptual_roughness: roughness,
            ..default()
        })),
        Transform::from_translation(to_bevy(body.start_position())),
        BodyMarker(id),
    ));

    entity.with_children(|parent| {
        if let Some(atmosphere) = body.atmosphere {
            parent.spawn((
                Mesh3d(meshes.add(Sphere::new(radius * 1.1).mesh().uv(32, 24))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: hex_color(atmosphere).with_alpha(0.15),
                    alpha_mode: AlphaMode::Blend,
                    unlit: true,
                    ..default()
                })),
                Transform::IDENTITY,
            ));
        }
        if let Some(rings) = body.rings {
            // Annulus meshes lie in XY; tilt into the orbital plane.
            parent.spawn((
                Mesh3d(meshes.add(Annulus::new(
                    rings.inner_radius as f32,
                    rings.outer_radius as f32,
                ))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: hex_color(rings.color).with_alpha(0.7),
                    alpha_mode: AlphaMode::Blend,
                    cull_mode: None,
                    double_sided: true,
                    ..default()
                })),
                Transform::from_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
            ));
        }
    });
}

/// Copy the session's camera pose and body kinematics onto the entities.
pub fn sync_transforms(
    session: Res<Session>,
    mut camera_q: Query<&mut Transform, With<MainCamera>>,
    mut bodies_q: Query<(&BodyMarker, &mut Transform), Without<MainCamera>>,
    mut sun_q: Query<
        &mut Transform,
        (With<SunMarker>, Without<MainCamera>, Without<BodyMarker>),
    >,
    mut stars_q: Query<
        &mut Transform,
        (
            With<Starfield>,
            Without<MainCamera>,
            Without<BodyMarker>,
            Without<SunMarker>,
        ),
    >,
) {
    let orrery = &session.0;

    if let Ok(mut cam_tf) = camera_q.get_single_mut() {
        let pose = orrery.navigation().pose();
        cam_tf.translation = to_bevy(pose.position);
        cam_tf.rotation = Quat::from_euler(
            EulerRot::YXZ,
            pose.orientation.yaw as f32,
            pose.orientation.pitch as f32,
            pose.orientation.roll as f32,
        );
    }

    for (marker, mut tf) in bodies_q.iter_mut() {
        if let Some(body) = orrery.scene().body(marker.0) {
            tf.translation = to_bevy(body.position);
            tf.rotation = Quat::from_rotation_y(body.spin as f32);
        }
    }

    let scene = orrery.scene();
    if let Ok(mut tf) = sun_q.get_single_mut() {
        tf.rotation = Quat::from_rotation_y(scene.sun_spin as f32);
    }
    if let Ok(mut tf) = stars_q.get_single_mut() {
        tf.rotation = Quat::from_rotation_y(scene.starfield_spin as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_splits_channels() {
        let c = hex_color(0xff8000).to_srgba();
        assert!((c.red - 1.0).abs() < 1e-6);
        assert!((c.green - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.blue, 0.0);
    }

    #[test]
    fn vector_conversion_keeps_axes() {
        let v = to_bevy(OrreryVec3::new(1.0, -2.0, 3.5));
        assert_eq!(v, Vec3::new(1.0, -2.0, 3.5));
    }
}
