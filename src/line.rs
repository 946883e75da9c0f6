//! The line that follows the reticle while an edge is being aimed.

use bevy::prelude::*;

use crate::session::MeasureSession;
use crate::types::{MeasureLine, Reticle};

/// Start a new live line at `start`.
///
/// The previous live line, if any, stays in the world as decoration.
pub fn begin_line(commands: &mut Commands, session: &mut MeasureSession, start: Vec3) -> Entity {
    let line = commands.spawn(MeasureLine { start, end: start }).id();
    session.lines.push(line);
    session.live_line = Some(line);
    line
}

/// Move the second vertex of a line.
///
/// Only writes when the end actually moved so change detection stays a
/// reliable "geometry dirty" signal.
pub fn update_line_end(mut line: Mut<MeasureLine>, end: Vec3) {
    if line.end != end {
        line.end = end;
    }
}

/// Keep the live line's end on the latest hit point.
pub fn update_live_line(
    session: Res<MeasureSession>,
    reticle: Res<Reticle>,
    mut lines: Query<&mut MeasureLine>,
) {
    let Some(live) = session.live_line else {
        return;
    };
    let Some(point) = reticle.point() else {
        return;
    };
    if let Ok(line) = lines.get_mut(live) {
        update_line_end(line, point);
    }
}
