//! Screen-anchored labels that follow world points.

use bevy::prelude::*;

use crate::math::project_to_screen;
use crate::types::{ArFrame, LabelScreenPosition, MeasureLabel, MeasureStyle};

/// Spawn a text label anchored at a world point.
pub fn spawn_label(
    commands: &mut Commands,
    style: &MeasureStyle,
    text: impl Into<String>,
    color: Color,
    anchor: Vec3,
) -> Entity {
    commands
        .spawn((
            Text::new(text),
            TextFont {
                font_size: style.label_font_size,
                ..default()
            },
            TextColor(color),
            Node {
                position_type: PositionType::Absolute,
                ..default()
            },
            MeasureLabel { anchor },
            LabelScreenPosition::default(),
        ))
        .id()
}

/// Text shown for a distance reading.
pub fn distance_text(distance_cm: u32) -> String {
    format!("{distance_cm} cm")
}

/// Project every label anchor with this frame's camera and move its node.
pub fn project_labels(
    frame: Res<ArFrame>,
    mut labels: Query<(
        &MeasureLabel,
        &mut LabelScreenPosition,
        &mut Node,
        Option<&ComputedNode>,
    )>,
) {
    for (label, mut screen, mut node, computed) in &mut labels {
        let pos = project_to_screen(label.anchor, frame.view_projection, frame.viewport);
        screen.0 = pos;

        // Centre the node on the anchor.
        let half = computed
            .map(|c| c.size() * c.inverse_scale_factor() * 0.5)
            .unwrap_or(Vec2::ZERO);
        node.left = Val::Px(pos.x - half.x);
        node.top = Val::Px(pos.y - half.y);
    }
}
