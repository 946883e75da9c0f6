//! AR session seam: hit-test source acquisition and per-frame sampling.
//!
//! The platform (WebXR, ARCore, a desktop simulator...) implements
//! [`ArSessionProvider`]. The plugin only ever reads from it, once per frame.

use std::future::Future;
use std::pin::Pin;

use bevy::prelude::*;
use bevy::tasks::{block_on, futures_lite::future};
use parking_lot::Mutex;

use crate::error::ArError;
use crate::types::{ArFrame, Reticle};

/// Opaque handle to a platform hit-test source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitTestSource(pub u64);

/// One-shot future resolving to a hit-test source.
pub type HitTestSourceFuture = Pin<Box<dyn Future<Output = Result<HitTestSource, ArError>> + Send>>;

/// Read-only view of the platform AR session.
pub trait ArSessionProvider: Send + Sync + 'static {
    /// Whether the AR session is currently running.
    fn is_active(&self) -> bool;

    /// Start acquiring a viewer-space hit-test source.
    ///
    /// Called at most once per session.
    fn request_hit_test_source(&mut self) -> HitTestSourceFuture;

    /// Pose of the first hit for `source` this frame, if a surface was found.
    fn hit_pose(&self, source: &HitTestSource) -> Option<Mat4>;

    /// Combined projection * view transform of the AR camera.
    fn view_projection(&self) -> Mat4;

    /// Viewport size in logical pixels.
    fn viewport_size(&self) -> Vec2;
}

/// Resource holding the platform session.
#[derive(Resource)]
pub struct ArSession {
    provider: Box<dyn ArSessionProvider>,
}

impl ArSession {
    /// Wrap a platform provider.
    pub fn new(provider: impl ArSessionProvider) -> Self {
        Self {
            provider: Box::new(provider),
        }
    }

    /// Shared access to the provider.
    pub fn provider(&self) -> &dyn ArSessionProvider {
        self.provider.as_ref()
    }

    /// Mutable access to the provider.
    pub fn provider_mut(&mut self) -> &mut dyn ArSessionProvider {
        self.provider.as_mut()
    }
}

/// Progress of the hit-test source acquisition.
#[derive(Resource, Default)]
pub struct HitTestState {
    /// A request has been issued for the current session.
    pub requested: bool,
    pending: Option<Mutex<HitTestSourceFuture>>,
    /// The resolved source, once available.
    pub source: Option<HitTestSource>,
}

impl HitTestState {
    /// Whether per-frame hit testing can run.
    pub fn is_ready(&self) -> bool {
        self.source.is_some()
    }

    /// Drop the source and any in-flight request.
    pub fn release(&mut self) {
        self.requested = false;
        self.pending = None;
        self.source = None;
    }
}

/// Request the hit-test source once per session and poll it until resolved.
pub fn acquire_hit_test_source(
    session: Option<ResMut<ArSession>>,
    mut state: ResMut<HitTestState>,
    mut reticle: ResMut<Reticle>,
) {
    let Some(mut session) = session else {
        return;
    };
    if !session.provider().is_active() {
        if state.pending.is_some() {
            warn!("hit-test request abandoned: {}", ArError::SessionEnded);
        }
        if state.requested {
            info!("AR session ended, releasing hit-test source");
            state.release();
            reticle.visible = false;
        }
        return;
    }

    if !state.requested {
        state.pending = Some(Mutex::new(session.provider_mut().request_hit_test_source()));
        state.requested = true;
        debug!("hit-test source requested");
    }

    let Some(pending) = state.pending.as_mut() else {
        return;
    };
    let Some(result) = block_on(future::poll_once(pending.get_mut())) else {
        return;
    };
    state.pending = None;

    match result {
        Ok(source) => {
            info!("hit-test source {:?} ready", source);
            state.source = Some(source);
        }
        // Not retried: the next session issues a fresh request.
        Err(err) => error!("{err}"),
    }
}

/// Copy this frame's hit pose and camera data out of the session.
pub fn sample_ar_frame(
    session: Option<Res<ArSession>>,
    state: Res<HitTestState>,
    mut reticle: ResMut<Reticle>,
    mut frame: ResMut<ArFrame>,
) {
    let Some(session) = session else {
        return;
    };
    let provider = session.provider();
    if !provider.is_active() {
        return;
    }

    frame.view_projection = provider.view_projection();
    frame.viewport = provider.viewport_size();

    let Some(source) = state.source.as_ref() else {
        return;
    };
    match provider.hit_pose(source) {
        Some(pose) => {
            reticle.visible = true;
            reticle.pose = pose;
        }
        None => reticle.visible = false,
    }
}
