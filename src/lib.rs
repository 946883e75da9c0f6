//! AR floor measuring and tiling plugin for Bevy 0.18.x.
//!
//! Point a device at the floor, tap three times, and the plugin measures the
//! two edges you drew and fills the rectangle with a grid of tile models
//! rotated to follow your first edge.
//!
//! # Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_ar_tiling::{ArSession, ArTilingPlugin, InteractionEvent, InteractionQueue};
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(ArTilingPlugin)
//!         // `MyWebXrSession` implements `ArSessionProvider`.
//!         .insert_resource(ArSession::new(MyWebXrSession::default()))
//!         .add_systems(Startup, hook_taps)
//!         .run();
//! }
//!
//! fn hook_taps(queue: Res<InteractionQueue>) {
//!     let queue = queue.clone();
//!     // Call from the platform's "select" callback:
//!     // queue.push(InteractionEvent::Select);
//! }
//! ```
//!
//! # Interaction
//!
//! - **Tap 1**: places the first corner and starts a line that follows the
//!   reticle. The axis guide appears at the corner.
//! - **Tap 2**: closes the first edge and labels it in centimetres.
//! - **Tap 3**: closes the second edge, labels it, and tiles the rectangle.
//! - **Tap 4**: clears everything.
//!
//! # Configuration
//!
//! - [`TilingConfig`]: tile footprint, margins, model path and coverage policy
//! - [`MeasureStyle`]: colors and sizes of lines, reticle and labels
//!
//! Insert either resource before adding the plugin to override the defaults.

#![warn(missing_docs)]

use bevy::prelude::*;

mod ar;
mod draw;
mod error;
mod interaction;
mod labels;
mod line;
mod math;
mod session;
mod template;
#[cfg(test)]
mod test_utils;
mod tiling;
mod types;

// Re-export all public types
pub use ar::{ArSession, ArSessionProvider, HitTestSource, HitTestSourceFuture, HitTestState};
pub use error::{ArError, TilingError};
pub use interaction::{apply_tap, TapContext, TapOutcome};
pub use math::{distance_cm, project_to_screen, ray_plane_intersection};
pub use session::{AxisGuide, MeasureSession};
pub use template::TileTemplate;
pub use tiling::{EdgeQuadrant, GridRotation, HintSide, TilePlan};
pub use types::{
    ArFrame, AxisGuideLine, GuideAxis, InteractionEvent, InteractionQueue, LabelScreenPosition,
    MeasureLabel, MeasureLine, MeasureStyle, Reticle, TileBoundary, TileInstance, TilePivot,
    TilingConfig, MAX_PENDING_INTERACTIONS,
};

use crate::ar::{acquire_hit_test_source, sample_ar_frame};
use crate::draw::{configure_gizmos, draw_measurements};
use crate::interaction::handle_interactions;
use crate::labels::project_labels;
use crate::line::update_live_line;
use crate::template::{load_tile_template, track_tile_template};

/// System sets of the per-frame pipeline, in execution order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArMeasureSet {
    /// Hit-test source acquisition.
    Acquire,
    /// Queued taps and resets.
    Interact,
    /// Reticle, live line and label positions.
    Track,
    /// Gizmo drawing.
    Draw,
}

/// Logic-only plugin: session state, hit testing, taps, tiling and labels.
///
/// Needs no window or renderer, so it runs under `MinimalPlugins`. An
/// [`ArSession`] resource must be inserted for anything to happen.
pub struct ArMeasureCorePlugin;

impl Plugin for ArMeasureCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MeasureSession>()
            .init_resource::<InteractionQueue>()
            .init_resource::<HitTestState>()
            .init_resource::<Reticle>()
            .init_resource::<ArFrame>()
            .init_resource::<TileTemplate>()
            .init_resource::<TilingConfig>()
            .init_resource::<MeasureStyle>()
            .configure_sets(
                Update,
                (
                    ArMeasureSet::Acquire,
                    ArMeasureSet::Interact,
                    ArMeasureSet::Track,
                    ArMeasureSet::Draw,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    acquire_hit_test_source.in_set(ArMeasureSet::Acquire),
                    handle_interactions.in_set(ArMeasureSet::Interact),
                    (sample_ar_frame, update_live_line, project_labels)
                        .chain()
                        .in_set(ArMeasureSet::Track),
                ),
            );
    }
}

/// Full plugin: [`ArMeasureCorePlugin`] plus tile model loading and gizmo
/// drawing.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_ar_tiling::ArTilingPlugin;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(ArTilingPlugin)
///     .run();
/// ```
pub struct ArTilingPlugin;

impl Plugin for ArTilingPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(ArMeasureCorePlugin)
            .add_systems(Startup, (configure_gizmos, load_tile_template))
            .add_systems(
                Update,
                (
                    track_tile_template.in_set(ArMeasureSet::Acquire),
                    draw_measurements.in_set(ArMeasureSet::Draw),
                ),
            );
    }
}
