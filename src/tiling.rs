//! Rectangle tiling: tile counts, grid orientation and stamping.
//!
//! The rectangle is given by three taps: `corner`, `edge_end` (the first
//! edge) and a hint point on the far side of the rectangle. Tiles are laid
//! out in the pivot's local XZ plane, rows along local X and columns along
//! local Z, and the pivot is rotated so local X follows the first edge and
//! local Z points toward the hint.

use std::f32::consts::PI;

use bevy::prelude::*;

use crate::error::TilingError;
use crate::math::angle_to_x;
use crate::session::MeasureSession;
use crate::types::{TileInstance, TilePivot, TilingConfig};

/// Centimetres per meter.
const CM_PER_M: f32 = 100.0;

/// Threshold below which an edge counts as vertical in the slope test.
const VERTICAL_EPSILON: f32 = 1e-6;

/// Direction class of the drawn edge, from the signs of `corner - edge_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeQuadrant {
    /// Edge heads toward +X and -Z (or along +X).
    PosXNegZ,
    /// Edge heads toward +X and +Z.
    PosXPosZ,
    /// Edge heads toward -X and -Z (or along -X, or straight along Z).
    NegXNegZ,
    /// Edge heads toward -X and +Z.
    NegXPosZ,
}

impl EdgeQuadrant {
    /// Classify the offset from `edge_end` to `corner`.
    pub fn classify(corner: Vec3, edge_end: Vec3) -> Self {
        let dx = corner.x - edge_end.x;
        let dz = corner.z - edge_end.z;
        match (dx < 0.0, dz < 0.0) {
            (true, false) => EdgeQuadrant::PosXNegZ,
            (true, true) => EdgeQuadrant::PosXPosZ,
            (false, false) => EdgeQuadrant::NegXNegZ,
            (false, true) => EdgeQuadrant::NegXPosZ,
        }
    }
}

/// Where the hint point sits relative to the line through the first edge,
/// in the floor plane (Z plotted against X).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintSide {
    /// `hint.z` is greater than the line's Z at `hint.x`.
    Above,
    /// `hint.z` is on or below the line.
    Below,
}

impl HintSide {
    /// Slope comparison of `hint` against the line `corner`-`edge_end`.
    ///
    /// Returns `None` when the edge is vertical in X (the slope is undefined).
    pub fn classify(corner: Vec3, edge_end: Vec3, hint: Vec3) -> Option<Self> {
        let run = edge_end.x - corner.x;
        if run.abs() < VERTICAL_EPSILON {
            return None;
        }
        let slope = (edge_end.z - corner.z) / run;
        let line_z = corner.z + slope * (hint.x - corner.x);
        Some(if hint.z > line_z {
            HintSide::Above
        } else {
            HintSide::Below
        })
    }
}

/// Orientation of the tile grid's pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridRotation {
    /// Whether the grid is first turned over (180 degrees about X).
    pub flipped: bool,
    /// Rotation about Y, in radians, applied after the flip.
    pub yaw: f32,
}

impl GridRotation {
    /// No rotation.
    pub const IDENTITY: Self = Self {
        flipped: false,
        yaw: 0.0,
    };

    fn plain(yaw: f32) -> Self {
        Self {
            flipped: false,
            yaw,
        }
    }

    fn flipped(yaw: f32) -> Self {
        Self { flipped: true, yaw }
    }

    /// Orient the grid for the edge `corner`-`edge_end` with `hint` on the
    /// far side of the rectangle.
    pub fn for_edge(corner: Vec3, edge_end: Vec3, hint: Vec3) -> Self {
        let edge = edge_end - corner;
        let Some(angle) = angle_to_x(edge) else {
            warn!("zero-length edge at {corner}, tiling without rotation");
            return Self::IDENTITY;
        };

        let quadrant = EdgeQuadrant::classify(corner, edge_end);
        let Some(side) = HintSide::classify(corner, edge_end, hint) else {
            debug!("edge {corner} -> {edge_end} runs along Z, using side-of-edge test");
            return Self::for_vertical_edge(edge, hint - corner, angle);
        };

        use EdgeQuadrant::*;
        use HintSide::*;
        match (quadrant, side) {
            (PosXNegZ, Above) => Self::plain(angle),
            (PosXNegZ, Below) => Self::flipped(-angle),
            (PosXPosZ, Above) => Self::plain(-angle),
            (PosXPosZ, Below) => Self::flipped(angle),
            (NegXNegZ, Above) => Self::flipped(-angle),
            (NegXNegZ, Below) => Self::plain(angle),
            (NegXPosZ, Above) => Self::flipped(angle),
            (NegXPosZ, Below) => Self::plain(-angle),
        }
    }

    /// Division-free fallback for edges with no X extent.
    fn for_vertical_edge(edge: Vec3, to_hint: Vec3, angle: f32) -> Self {
        let yaw = if edge.z <= 0.0 { angle } else { -angle };
        let side = to_hint.z * edge.x - to_hint.x * edge.z;
        if side >= 0.0 {
            Self::plain(yaw)
        } else {
            Self::flipped(-yaw)
        }
    }

    /// Rotation applied to the tile pivot.
    pub fn to_quat(self) -> Quat {
        let yaw = Quat::from_rotation_y(self.yaw);
        if self.flipped {
            Quat::from_rotation_x(PI) * yaw
        } else {
            yaw
        }
    }
}

/// Whole tiles that fit along each measured edge.
pub fn tile_counts(distances: [u32; 2], config: &TilingConfig) -> (u32, u32) {
    let fit = |distance_cm: u32, tile_m: f32| {
        let tile_cm = tile_m * CM_PER_M;
        if tile_cm <= 0.0 {
            return 0;
        }
        (distance_cm as f32 / tile_cm).floor() as u32
    };
    (
        fit(distances[0], config.tile_width),
        fit(distances[1], config.tile_height),
    )
}

/// Offset of tile `(row, col)` from the pivot origin, margins included.
pub fn tile_offset(row: u32, col: u32, config: &TilingConfig) -> Vec3 {
    let margins = config.margins();
    Vec3::new(
        (config.tile_width + margins.x) * row as f32,
        0.0,
        (config.tile_height + margins.y) * col as f32,
    )
}

/// Everything needed to stamp one rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct TilePlan {
    /// Pivot position (the first tap).
    pub origin: Vec3,
    /// Pivot orientation.
    pub rotation: GridRotation,
    /// Whole tiles along the first edge.
    pub rows: u32,
    /// Whole tiles along the second edge.
    pub cols: u32,
    /// Local offsets of the tiles to stamp, row-major.
    pub tiles: Vec<(TileInstance, Vec3)>,
}

impl TilePlan {
    /// Lay out the grid for a closed rectangle.
    pub fn new(
        points: &[Vec3],
        distances: &[u32],
        config: &TilingConfig,
    ) -> Result<Self, TilingError> {
        let &[corner, edge_end, hint] = points else {
            return Err(TilingError::PointCount(points.len()));
        };
        let &[d01, d12] = distances else {
            return Err(TilingError::ReadingCount(distances.len()));
        };

        let (rows, cols) = tile_counts([d01, d12], config);
        let stamped_rows = config.boundary.stamped(rows);
        let stamped_cols = config.boundary.stamped(cols);

        let total = stamped_rows
            .checked_mul(stamped_cols)
            .filter(|&n| n <= config.max_tiles)
            .ok_or(TilingError::GridTooLarge {
                rows: stamped_rows,
                cols: stamped_cols,
                max: config.max_tiles,
            })?;

        let mut tiles = Vec::with_capacity(total as usize);
        for row in 0..stamped_rows {
            for col in 0..stamped_cols {
                tiles.push((TileInstance { row, col }, tile_offset(row, col, config)));
            }
        }

        Ok(Self {
            origin: corner,
            rotation: GridRotation::for_edge(corner, edge_end, hint),
            rows,
            cols,
            tiles,
        })
    }
}

/// Spawn the pivot and clone the tile scene once per planned tile.
///
/// Returns the pivot entity.
pub fn stamp_tiles(
    commands: &mut Commands,
    session: &mut MeasureSession,
    plan: &TilePlan,
    template: &Handle<Scene>,
    config: &TilingConfig,
) -> Entity {
    if let Some(stale) = session.pivot.take() {
        warn!("replacing a tile grid that was never wiped");
        for tile in session.tiles.drain(..) {
            commands.entity(tile).try_despawn();
        }
        commands.entity(stale).try_despawn();
    }

    let pivot = commands
        .spawn((
            TilePivot,
            Transform::from_translation(plan.origin).with_rotation(plan.rotation.to_quat()),
            Visibility::default(),
        ))
        .id();

    for (instance, offset) in &plan.tiles {
        let tile = commands
            .spawn((
                *instance,
                SceneRoot(template.clone()),
                Transform::from_translation(*offset + config.template_offset)
                    .with_scale(Vec3::splat(config.tile_scale)),
                ChildOf(pivot),
            ))
            .id();
        session.tiles.push(tile);
    }

    session.pivot = Some(pivot);
    info!(
        "tiled {}x{} grid ({} tiles) at {}",
        plan.rows,
        plan.cols,
        plan.tiles.len(),
        plan.origin
    );
    pivot
}
