//! Gizmo rendering of the reticle, measured lines and the axis guide.
//!
//! Everything here is immediate-mode: it is redrawn every frame from the
//! components, so despawning an entity is all it takes to remove its lines.

use std::f32::consts::TAU;

use bevy::gizmos::config::{DefaultGizmoConfigGroup, GizmoConfigStore};
use bevy::prelude::*;

use crate::math::axis_basis;
use crate::types::{AxisGuideLine, MeasureLine, MeasureStyle, Reticle};

/// Configure Bevy's built-in gizmo renderer using our style resource.
pub fn configure_gizmos(mut config_store: ResMut<GizmoConfigStore>, style: Res<MeasureStyle>) {
    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line.width = style.line_width;
    config.depth_bias = style.depth_bias;
}

/// Draw a circle of `radius` around `center` in the plane with `normal`.
fn draw_circle(
    gizmos: &mut Gizmos,
    center: Vec3,
    normal: Vec3,
    radius: f32,
    segments: usize,
    color: Color,
) {
    let (t1, t2) = axis_basis(normal);
    let steps = segments.max(3);

    let mut prev_point: Option<Vec3> = None;
    for i in 0..=steps {
        let angle = TAU * i as f32 / steps as f32;
        let point = center + radius * (t1 * angle.cos() + t2 * angle.sin());
        if let Some(prev) = prev_point {
            gizmos.line(prev, point, color);
        }
        prev_point = Some(point);
    }
}

/// Flat ring plus centre dot lying on the detected surface.
fn draw_reticle(gizmos: &mut Gizmos, reticle: &Reticle, style: &MeasureStyle) {
    let pose = Transform::from_matrix(reticle.pose);
    let center = pose.translation;
    let normal = pose.rotation * Vec3::Y;
    let color = style.reticle_color;
    let segments = style.reticle_segments;

    draw_circle(gizmos, center, normal, style.reticle_inner_radius, segments, color);
    draw_circle(gizmos, center, normal, style.reticle_outer_radius, segments, color);
    draw_circle(gizmos, center, normal, style.reticle_dot_radius, segments / 4, color);
}

/// Draw the reticle (when visible), every measured line and the axis guide.
pub fn draw_measurements(
    style: Res<MeasureStyle>,
    reticle: Res<Reticle>,
    lines: Query<&MeasureLine>,
    guides: Query<&AxisGuideLine>,
    mut gizmos: Gizmos,
) {
    if reticle.visible {
        draw_reticle(&mut gizmos, &reticle, &style);
    }

    for line in &lines {
        gizmos.line(line.start, line.end, style.line_color);
    }

    for guide in &guides {
        gizmos.line(guide.origin, guide.end(), style.axis_color(guide.axis));
    }
}
