//! Desktop preview.
//!
//! Simulates an AR session with a mouse: the floor plane is the detected
//! surface and the cursor is the hit test. Left click taps, R clears.
//!
//! Tiling needs `assets/models/woodTile/woodTile.gltf`; without it the
//! rectangle is still measured but left untiled.

use std::future;
use std::sync::Arc;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_ar_tiling::{
    ray_plane_intersection, ArError, ArSession, ArSessionProvider, ArTilingPlugin, HitTestSource,
    HitTestSourceFuture, InteractionEvent, InteractionQueue, MeasureSession,
};
use parking_lot::Mutex;

#[derive(Default)]
struct DesktopFrame {
    hit: Option<Vec3>,
    view_projection: Mat4,
    viewport: Vec2,
}

/// Mouse-driven stand-in for a device AR session.
#[derive(Resource, Clone, Default)]
struct DesktopSession {
    frame: Arc<Mutex<DesktopFrame>>,
}

impl ArSessionProvider for DesktopSession {
    fn is_active(&self) -> bool {
        true
    }

    fn request_hit_test_source(&mut self) -> HitTestSourceFuture {
        Box::pin(future::ready(Ok::<_, ArError>(HitTestSource(0))))
    }

    fn hit_pose(&self, _source: &HitTestSource) -> Option<Mat4> {
        self.frame.lock().hit.map(Mat4::from_translation)
    }

    fn view_projection(&self) -> Mat4 {
        self.frame.lock().view_projection
    }

    fn viewport_size(&self) -> Vec2 {
        self.frame.lock().viewport
    }
}

#[derive(Component)]
struct Hud;

fn main() {
    let desktop = DesktopSession::default();
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(ArTilingPlugin)
        .insert_resource(ArSession::new(desktop.clone()))
        .insert_resource(desktop)
        .add_systems(Startup, setup)
        .add_systems(First, track_cursor)
        .add_systems(Update, (mouse_and_keyboard, update_hud))
        .run();
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Camera
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 1.6, 2.0).looking_at(Vec3::new(0.0, 0.0, -0.5), Vec3::Y),
    ));

    // Light
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Floor
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::new(Vec3::Y, Vec2::splat(5.0)))),
        MeshMaterial3d(materials.add(Color::srgb(0.35, 0.35, 0.38))),
    ));

    // HUD
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(10.0),
                left: Val::Px(10.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
        ))
        .with_children(|p| {
            p.spawn((
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Hud,
            ));
        });
}

/// Feed the cursor ray and camera matrices into the simulated session.
fn track_cursor(
    desktop: Res<DesktopSession>,
    window: Single<&Window, With<PrimaryWindow>>,
    camera: Single<(&Camera, &GlobalTransform)>,
) {
    let (camera, camera_transform) = *camera;
    let mut frame = desktop.frame.lock();

    frame.viewport = camera
        .logical_viewport_size()
        .unwrap_or_else(|| window.size());
    frame.view_projection =
        camera.clip_from_view() * Mat4::from(camera_transform.affine().inverse());
    frame.hit = window
        .cursor_position()
        .and_then(|cursor| camera.viewport_to_world(camera_transform, cursor).ok())
        .and_then(|ray| ray_plane_intersection(&ray, Vec3::ZERO, Vec3::Y));
}

fn mouse_and_keyboard(
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    queue: Res<InteractionQueue>,
) {
    if mouse.just_pressed(MouseButton::Left) {
        queue.push(InteractionEvent::Select);
    }
    if keys.just_pressed(KeyCode::KeyR) {
        queue.push(InteractionEvent::Reset);
    }
}

fn update_hud(session: Res<MeasureSession>, mut hud: Query<&mut Text, With<Hud>>) {
    if !session.is_changed() {
        return;
    }
    let Ok(mut text) = hud.single_mut() else {
        return;
    };
    let readings = session
        .distances
        .iter()
        .map(|d| format!("{d} cm"))
        .collect::<Vec<_>>()
        .join(" x ");
    text.0 = format!(
        "Click: place corner ({}/3) | R: clear\nEdges: {}\nTiles: {}",
        session.taps,
        if readings.is_empty() { "-" } else { &readings },
        session.tiles.len(),
    );
}
