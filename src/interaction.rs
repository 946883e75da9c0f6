//! Tap handling.
//!
//! Each confirmed tap records the reticle point and advances the session:
//! the first tap starts a line, the second closes the first edge, the third
//! closes the second edge and tiles the rectangle. A fourth tap wipes the
//! scene so the next one starts over.

use bevy::prelude::*;

use crate::labels::{distance_text, spawn_label};
use crate::line::begin_line;
use crate::math::{distance_cm, midpoint};
use crate::session::{AxisGuide, MeasureSession};
use crate::template::TileTemplate;
use crate::tiling::{stamp_tiles, TilePlan};
use crate::types::{
    AxisGuideLine, GuideAxis, InteractionEvent, InteractionQueue, MeasureStyle, Reticle,
    TilingConfig,
};

/// What a single tap did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// First corner placed.
    Started,
    /// First edge measured.
    EdgeMeasured {
        /// Rounded edge length.
        distance_cm: u32,
    },
    /// Second edge measured; `tiles` is `None` when tiling was unavailable.
    RectangleClosed {
        /// Rounded length of the second edge.
        distance_cm: u32,
        /// Number of tiles stamped.
        tiles: Option<usize>,
    },
    /// The completed rectangle was cleared away.
    Reset,
}

/// Read-only inputs a tap needs besides the session.
pub struct TapContext<'a> {
    /// Colors and sizes for new lines and labels.
    pub style: &'a MeasureStyle,
    /// Tile footprint and placement.
    pub config: &'a TilingConfig,
    /// Tile model availability.
    pub template: &'a TileTemplate,
}

/// Drain queued interaction events and apply them in order.
pub fn handle_interactions(
    mut commands: Commands,
    queue: Res<InteractionQueue>,
    reticle: Res<Reticle>,
    style: Res<MeasureStyle>,
    config: Res<TilingConfig>,
    template: Res<TileTemplate>,
    mut session: ResMut<MeasureSession>,
) {
    let ctx = TapContext {
        style: &style,
        config: &config,
        template: &template,
    };

    for event in queue.drain() {
        match event {
            InteractionEvent::Select => {
                // Taps only count while a surface is under the reticle.
                let Some(point) = reticle.point() else {
                    debug!("tap ignored, no surface under the reticle");
                    continue;
                };
                let outcome = apply_tap(&mut commands, &mut session, point, &ctx);
                debug!("tap at {point}: {outcome:?}");
            }
            InteractionEvent::Reset => session.wipe_all(&mut commands),
        }
    }
}

/// Advance the session by one confirmed tap at `point`.
pub fn apply_tap(
    commands: &mut Commands,
    session: &mut MeasureSession,
    point: Vec3,
    ctx: &TapContext,
) -> TapOutcome {
    if session.taps >= 3 {
        session.wipe_all(commands);
        return TapOutcome::Reset;
    }

    session.measurement.push(point);
    session.taps += 1;

    match session.taps {
        1 => {
            begin_line(commands, session, point);
            if ctx.style.show_axis_guide && session.axis_guide.is_none() {
                session.axis_guide = Some(spawn_axis_guide(commands, ctx.style, point));
            }
            TapOutcome::Started
        }
        2 => {
            let distance = record_edge(commands, session, ctx.style, 0);
            begin_line(commands, session, point);
            TapOutcome::EdgeMeasured {
                distance_cm: distance,
            }
        }
        _ => {
            let distance = record_edge(commands, session, ctx.style, 1);
            let tiles = tile_rectangle(commands, session, ctx);

            // Lines and labels stay until the next wipe.
            session.live_line = None;
            session.measurement.clear();
            TapOutcome::RectangleClosed {
                distance_cm: distance,
                tiles,
            }
        }
    }
}

/// Measure the edge starting at `measurement[from]` and label its midpoint.
fn record_edge(
    commands: &mut Commands,
    session: &mut MeasureSession,
    style: &MeasureStyle,
    from: usize,
) -> u32 {
    let (a, b) = (session.measurement[from], session.measurement[from + 1]);
    let distance = distance_cm(a, b);
    session.distances.push(distance);

    let label = spawn_label(
        commands,
        style,
        distance_text(distance),
        style.label_color,
        midpoint(a, b),
    );
    session.labels.push(label);
    distance
}

fn tile_rectangle(
    commands: &mut Commands,
    session: &mut MeasureSession,
    ctx: &TapContext,
) -> Option<usize> {
    let Some(template) = ctx.template.ready() else {
        info!("tile model not available, rectangle left untiled");
        return None;
    };
    match TilePlan::new(&session.measurement, &session.distances, ctx.config) {
        Ok(plan) => {
            stamp_tiles(commands, session, &plan, template, ctx.config);
            Some(plan.tiles.len())
        }
        Err(err) => {
            warn!("cannot tile rectangle: {err}");
            None
        }
    }
}

fn spawn_axis_guide(commands: &mut Commands, style: &MeasureStyle, origin: Vec3) -> AxisGuide {
    let mut lines = [Entity::PLACEHOLDER; 2];
    let mut labels = Vec::with_capacity(2);
    for (slot, axis) in [GuideAxis::X, GuideAxis::Z].into_iter().enumerate() {
        let line = AxisGuideLine { axis, origin };
        lines[slot] = commands.spawn(line).id();
        labels.push(spawn_label(
            commands,
            style,
            axis.legend(),
            style.axis_color(axis),
            midpoint(origin, line.end()),
        ));
    }
    AxisGuide {
        origin,
        lines,
        labels,
    }
}
