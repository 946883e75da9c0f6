//! Test utilities for headless Bevy integration tests.
//!
//! Provides `TestApp`, a wrapper around `bevy::app::App` running
//! `MinimalPlugins` + `ArMeasureCorePlugin`, and `MockArSession`, a scripted
//! AR provider whose state can be changed between frames.

use std::future;
use std::sync::Arc;
use std::task::Poll;

use bevy::prelude::*;
use parking_lot::Mutex;

use crate::ar::{ArSession, ArSessionProvider, HitTestSource, HitTestSourceFuture};
use crate::error::ArError;
use crate::session::MeasureSession;
use crate::template::{load_tile_template, track_tile_template, TileTemplate};
use crate::types::{InteractionEvent, InteractionQueue, MeasureStyle, Reticle, TilingConfig};
use crate::{ArMeasureCorePlugin, ArMeasureSet};

const TEST_VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

#[derive(Clone, Copy, PartialEq, Eq)]
enum SourceMode {
    Immediate,
    Pending,
    Failing,
}

struct MockState {
    active: bool,
    hit: Option<Vec3>,
    view_projection: Mat4,
    viewport: Vec2,
    mode: SourceMode,
    resolved: bool,
    requests: usize,
}

/// Scripted AR session shared between the test and the app.
#[derive(Clone)]
pub(crate) struct MockArSession {
    state: Arc<Mutex<MockState>>,
}

impl MockArSession {
    /// Active session whose hit-test source resolves on first poll.
    pub fn new() -> Self {
        let mock = Self {
            state: Arc::new(Mutex::new(MockState {
                active: true,
                hit: Some(Vec3::ZERO),
                view_projection: Mat4::IDENTITY,
                viewport: TEST_VIEWPORT,
                mode: SourceMode::Immediate,
                resolved: false,
                requests: 0,
            })),
        };
        mock.set_camera(Vec3::new(0.0, 1.5, 1.0), Vec3::ZERO);
        mock
    }

    /// Hit-test source stays pending until `resolve_source`.
    pub fn with_pending_source(self) -> Self {
        self.state.lock().mode = SourceMode::Pending;
        self
    }

    /// Hit-test source request fails.
    pub fn with_failing_source(self) -> Self {
        self.state.lock().mode = SourceMode::Failing;
        self
    }

    pub fn resolve_source(&self) {
        self.state.lock().resolved = true;
    }

    pub fn set_active(&self, active: bool) {
        self.state.lock().active = active;
    }

    pub fn set_hit(&self, hit: Option<Vec3>) {
        self.state.lock().hit = hit;
    }

    pub fn set_viewport(&self, viewport: Vec2) {
        self.state.lock().viewport = viewport;
    }

    /// Perspective camera at `eye` looking at `target`.
    pub fn set_camera(&self, eye: Vec3, target: Vec3) {
        let mut state = self.state.lock();
        let aspect = state.viewport.x / state.viewport.y;
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let projection = Mat4::perspective_rh(75f32.to_radians(), aspect, 0.01, 20.0);
        state.view_projection = projection * view;
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().requests
    }
}

impl ArSessionProvider for MockArSession {
    fn is_active(&self) -> bool {
        self.state.lock().active
    }

    fn request_hit_test_source(&mut self) -> HitTestSourceFuture {
        let mut state = self.state.lock();
        state.requests += 1;
        let source = HitTestSource(state.requests as u64);
        match state.mode {
            SourceMode::Immediate => Box::pin(future::ready(Ok::<_, ArError>(source))),
            SourceMode::Failing => Box::pin(future::ready(Err::<HitTestSource, _>(ArError::HitTestUnavailable(
                "plane detection disabled".into(),
            )))),
            SourceMode::Pending => {
                let shared = self.state.clone();
                Box::pin(future::poll_fn(move |_| {
                    if shared.lock().resolved {
                        Poll::Ready(Ok::<_, ArError>(source))
                    } else {
                        Poll::Pending
                    }
                }))
            }
        }
    }

    fn hit_pose(&self, _source: &HitTestSource) -> Option<Mat4> {
        self.state.lock().hit.map(Mat4::from_translation)
    }

    fn view_projection(&self) -> Mat4 {
        self.state.lock().view_projection
    }

    fn viewport_size(&self) -> Vec2 {
        self.state.lock().viewport
    }
}

/// A headless Bevy app wrapper for testing.
pub(crate) struct TestApp {
    pub app: App,
}

impl TestApp {
    /// Create a test app driven by `mock`. No frame is run yet.
    pub fn with_session(mock: MockArSession) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(ArMeasureCorePlugin);
        app.insert_resource(ArSession::new(mock));
        Self { app }
    }

    /// Mark the tile model as loaded.
    pub fn with_tile_template(mut self) -> Self {
        self.app
            .insert_resource(TileTemplate::Ready(Handle::default()));
        self
    }

    /// Load the tile model from `path` through the real asset pipeline.
    pub fn with_tile_asset(mut self, path: &str) -> Self {
        self.app.add_plugins((
            bevy::asset::AssetPlugin::default(),
            bevy::scene::ScenePlugin,
            bevy::gltf::GltfPlugin::default(),
        ));
        self.app.insert_resource(TilingConfig {
            asset_path: path.to_string(),
            ..default()
        });
        self.app.add_systems(Startup, load_tile_template).add_systems(
            Update,
            track_tile_template.in_set(ArMeasureSet::Acquire),
        );
        self.app.finish();
        self.app.cleanup();
        self
    }

    /// Run frames until the tile model leaves `Loading`, up to `max_frames`.
    pub fn settle_tile_template(&mut self, max_frames: usize) -> TileTemplate {
        for _ in 0..max_frames {
            self.update();
            let template = self.app.world().resource::<TileTemplate>();
            if !matches!(template, TileTemplate::Unloaded | TileTemplate::Loading(_)) {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        self.app.world().resource::<TileTemplate>().clone()
    }

    pub fn with_tiling(mut self, config: TilingConfig) -> Self {
        self.app.insert_resource(config);
        self
    }

    pub fn with_style(mut self, style: MeasureStyle) -> Self {
        self.app.insert_resource(style);
        self
    }

    /// Run a single frame update.
    pub fn update(&mut self) {
        self.app.update();
    }

    /// Queue an interaction event for the next frame.
    pub fn push(&mut self, event: InteractionEvent) {
        self.app.world().resource::<InteractionQueue>().push(event);
    }

    /// Aim at `point` for one frame, then tap.
    pub fn tap_at(&mut self, mock: &MockArSession, point: Vec3) {
        mock.set_hit(Some(point));
        self.update();
        self.push(InteractionEvent::Select);
        self.update();
    }

    pub fn session(&self) -> &MeasureSession {
        self.app.world().resource::<MeasureSession>()
    }

    pub fn reticle(&self) -> Reticle {
        *self.app.world().resource::<Reticle>()
    }

    /// Number of entities carrying component `T`.
    pub fn count<T: Component>(&mut self) -> usize {
        let world = self.app.world_mut();
        let mut query = world.query_filtered::<Entity, With<T>>();
        query.iter(world).count()
    }

    pub fn entity_count(&mut self) -> usize {
        let world = self.app.world_mut();
        let mut query = world.query::<Entity>();
        query.iter(world).count()
    }
}
