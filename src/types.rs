//! Core types for the AR measuring and tiling plugin.
//!
//! This module contains the public components, resources and configuration
//! shared by the interaction, tiling and drawing systems.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::Mutex;

/// Maximum number of interaction events buffered between two frames.
pub const MAX_PENDING_INTERACTIONS: usize = 16;

/// Local axis shown by the axis guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideAxis {
    /// The floor-plane X axis (red).
    X,
    /// The floor-plane Z axis (blue).
    Z,
}

impl GuideAxis {
    /// Converts the axis to its corresponding unit vector.
    pub fn to_vec3(self) -> Vec3 {
        match self {
            GuideAxis::X => Vec3::X,
            GuideAxis::Z => Vec3::Z,
        }
    }

    /// Legend text shown next to the axis segment.
    pub fn legend(self) -> &'static str {
        match self {
            GuideAxis::X => "X axis",
            GuideAxis::Z => "Z axis",
        }
    }
}

impl fmt::Display for GuideAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuideAxis::X => f.write_str("X"),
            GuideAxis::Z => f.write_str("Z"),
        }
    }
}

/// A measured line segment in world space.
///
/// The line that is still following the reticle is referenced by
/// [`MeasureSession::live_line`](crate::MeasureSession); every other line is
/// kept as decoration until the next wipe.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct MeasureLine {
    /// Confirmed start point.
    pub start: Vec3,
    /// End point; tracks the reticle while the line is live.
    pub end: Vec3,
}

/// One segment of the axis guide.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct AxisGuideLine {
    /// Which axis the segment visualizes.
    pub axis: GuideAxis,
    /// Anchor point of the guide.
    pub origin: Vec3,
}

impl AxisGuideLine {
    /// Far end of the unit-length segment.
    pub fn end(&self) -> Vec3 {
        self.origin + self.axis.to_vec3()
    }
}

/// A screen-space text annotation bound to a world-space anchor.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct MeasureLabel {
    /// World-space point the label follows.
    pub anchor: Vec3,
}

/// Last projected pixel position of a [`MeasureLabel`] anchor.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct LabelScreenPosition(pub Vec2);

/// Parent transform of a stamped tile grid.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TilePivot;

/// One stamped tile inside a [`TilePivot`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileInstance {
    /// Index along the first measured edge.
    pub row: u32,
    /// Index along the second measured edge.
    pub col: u32,
}

/// Discrete user input consumed once per frame before the continuous update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEvent {
    /// A tap confirming the current reticle position.
    Select,
    /// Clear everything and start over.
    Reset,
}

/// Bounded, thread-safe queue of interaction events.
///
/// Clone it and hand the clone to the platform's input callback; the
/// plugin drains it at the start of every frame.
#[derive(Resource, Clone)]
pub struct InteractionQueue {
    inner: Arc<Mutex<VecDeque<InteractionEvent>>>,
}

impl InteractionQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(
                MAX_PENDING_INTERACTIONS,
            ))),
        }
    }

    /// Push an event to be processed next frame.
    ///
    /// Returns `false` and drops the event when the queue is full.
    pub fn push(&self, event: InteractionEvent) -> bool {
        let mut queue = self.inner.lock();
        if queue.len() >= MAX_PENDING_INTERACTIONS {
            warn!("interaction queue full, dropping {:?}", event);
            return false;
        }
        queue.push_back(event);
        true
    }

    /// Drain all pending events in arrival order.
    pub fn drain(&self) -> Vec<InteractionEvent> {
        self.inner.lock().drain(..).collect()
    }

    /// Events waiting to be applied.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for InteractionQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// The current hit-test result.
///
/// `visible` means a detected surface was under the device this frame and
/// `pose` holds its world transform.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub struct Reticle {
    /// Whether a valid surface point exists this frame.
    pub visible: bool,
    /// World transform of the last hit.
    pub pose: Mat4,
}

impl Reticle {
    /// World position of the hit, if the reticle is visible.
    pub fn point(&self) -> Option<Vec3> {
        self.visible
            .then(|| Transform::from_matrix(self.pose).translation)
    }
}

/// Camera data sampled from the AR session once per frame.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ArFrame {
    /// Combined projection * view transform of the AR camera.
    pub view_projection: Mat4,
    /// Viewport size in logical pixels.
    pub viewport: Vec2,
}

impl Default for ArFrame {
    fn default() -> Self {
        Self {
            view_projection: Mat4::IDENTITY,
            viewport: Vec2::ONE,
        }
    }
}

/// How much of the measured span the tile grid covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileBoundary {
    /// Stop one tile short on each edge (`count - 1` tiles).
    #[default]
    ShortByOne,
    /// Stamp every whole tile that fits (`count` tiles).
    FullSpan,
}

impl TileBoundary {
    /// Number of tiles stamped for a computed tile count.
    pub fn stamped(self, count: u32) -> u32 {
        match self {
            TileBoundary::ShortByOne => count.saturating_sub(1),
            TileBoundary::FullSpan => count,
        }
    }
}

/// Physical tile dimensions and how the tile model is placed.
#[derive(Resource, Clone, Debug)]
pub struct TilingConfig {
    /// Tile footprint along the first measured edge, in meters.
    pub tile_width: f32,
    /// Tile footprint along the second measured edge, in meters.
    pub tile_height: f32,
    /// Gap between neighbouring tiles as a fraction of the tile size.
    pub margin_fraction: f32,
    /// Offset baked into the tile model before it is cloned.
    pub template_offset: Vec3,
    /// Uniform scale applied to every stamped tile.
    pub tile_scale: f32,
    /// Asset path of the tile scene.
    pub asset_path: String,
    /// Coverage policy for the stamped grid.
    pub boundary: TileBoundary,
    /// Largest grid that will be stamped; bigger rectangles are left untiled.
    pub max_tiles: u32,
}

impl TilingConfig {
    /// Gap between tiles along the width and height.
    pub fn margins(&self) -> Vec2 {
        Vec2::new(
            self.tile_width * self.margin_fraction,
            self.tile_height * self.margin_fraction,
        )
    }
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            tile_width: 0.3,
            tile_height: 0.3,
            margin_fraction: 0.005,
            template_offset: Vec3::new(0.0001, 0.0, 0.0),
            tile_scale: 0.01,
            asset_path: "models/woodTile/woodTile.gltf".to_string(),
            boundary: TileBoundary::ShortByOne,
            max_tiles: 4096,
        }
    }
}

/// Visual style for lines, the reticle and labels.
#[derive(Resource, Clone)]
pub struct MeasureStyle {
    /// Line width for gizmo rendering (in pixels).
    pub line_width: f32,
    /// Depth bias for gizmo rendering.
    pub depth_bias: f32,
    /// Color of measured lines.
    pub line_color: Color,
    /// Color of the axis guide X segment and its legend.
    pub axis_x_color: Color,
    /// Color of the axis guide Z segment and its legend.
    pub axis_z_color: Color,
    /// Whether the axis guide is created on the first tap.
    pub show_axis_guide: bool,
    /// Color of the reticle.
    pub reticle_color: Color,
    /// Inner radius of the reticle ring, in meters.
    pub reticle_inner_radius: f32,
    /// Outer radius of the reticle ring, in meters.
    pub reticle_outer_radius: f32,
    /// Radius of the reticle centre dot, in meters.
    pub reticle_dot_radius: f32,
    /// Number of segments per reticle circle.
    pub reticle_segments: usize,
    /// Color of distance labels.
    pub label_color: Color,
    /// Font size of all labels.
    pub label_font_size: f32,
}

impl Default for MeasureStyle {
    fn default() -> Self {
        Self {
            line_width: 5.0,
            depth_bias: 0.0,
            line_color: Color::WHITE,
            axis_x_color: Color::srgb(1.0, 0.0, 0.0),
            axis_z_color: Color::srgb(0.0, 0.0, 1.0),
            show_axis_guide: true,
            reticle_color: Color::WHITE,
            reticle_inner_radius: 0.045,
            reticle_outer_radius: 0.05,
            reticle_dot_radius: 0.005,
            reticle_segments: 32,
            label_color: Color::WHITE,
            label_font_size: 16.0,
        }
    }
}

impl MeasureStyle {
    /// Color used for an axis guide segment.
    pub fn axis_color(&self, axis: GuideAxis) -> Color {
        match axis {
            GuideAxis::X => self.axis_x_color,
            GuideAxis::Z => self.axis_z_color,
        }
    }
}
