//! Measuring session state and its teardown.
//!
//! Everything a session creates in the world is tracked here so that
//! [`MeasureSession::wipe_all`] can take the scene back to its launch state.

use bevy::prelude::*;

/// The two segments (and their legend labels) of the axis guide.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisGuide {
    /// Point the guide is anchored at.
    pub origin: Vec3,
    /// X and Z segment entities.
    pub lines: [Entity; 2],
    /// Legend label entities.
    pub labels: Vec<Entity>,
}

/// All mutable state of the measuring interaction.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct MeasureSession {
    /// Confirmed points of the rectangle being drawn, in tap order.
    pub measurement: Vec<Vec3>,
    /// Edge lengths in centimetres, one per completed edge.
    pub distances: Vec<u32>,
    /// Confirmed taps since the last wipe (0..=3).
    pub taps: u8,
    /// The line currently following the reticle.
    pub live_line: Option<Entity>,
    /// Every measured line, the live one included.
    pub lines: Vec<Entity>,
    /// Distance labels.
    pub labels: Vec<Entity>,
    /// Axis guide, created on the first tap.
    pub axis_guide: Option<AxisGuide>,
    /// Parent of the stamped tile grid.
    pub pivot: Option<Entity>,
    /// Stamped tiles (children of `pivot`).
    pub tiles: Vec<Entity>,
}

impl MeasureSession {
    /// Whether the session holds nothing, as on first launch.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Tear down every object the session created and reset all state.
    ///
    /// Safe to call at any time, any number of times.
    pub fn wipe_all(&mut self, commands: &mut Commands) {
        let had_content = !self.is_empty();
        self.measurement.clear();
        self.distances.clear();
        self.taps = 0;
        self.live_line = None;

        for line in self.lines.drain(..) {
            dispose(commands, line);
        }
        if let Some(guide) = self.axis_guide.take() {
            for line in guide.lines {
                dispose(commands, line);
            }
            for label in guide.labels {
                dispose(commands, label);
            }
        }
        for tile in self.tiles.drain(..) {
            dispose(commands, tile);
        }
        if let Some(pivot) = self.pivot.take() {
            dispose(commands, pivot);
        }

        // Removals are only queued; they are applied at the next sync point.
        for label in &self.labels {
            dispose(commands, *label);
        }
        self.labels.clear();

        if had_content {
            info!("measurement session wiped");
        }
    }
}

/// Release a session object: its mesh/material/scene handles drop with the
/// entity, and despawning detaches it from its parent.
fn dispose(commands: &mut Commands, entity: Entity) {
    commands.entity(entity).try_despawn();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockArSession, TestApp};
    use crate::types::{InteractionEvent, MeasureLabel, MeasureLine, TileInstance, TilePivot};

    #[test]
    fn wipe_on_fresh_session_is_a_no_op() {
        let mut app = TestApp::with_session(MockArSession::new());
        app.push(InteractionEvent::Reset);
        app.update();
        assert!(app.session().is_empty());
        assert_eq!(app.count::<MeasureLine>(), 0);
    }

    #[test]
    fn wipe_removes_everything_created_by_a_session() {
        let mock = MockArSession::new();
        let mut app = TestApp::with_session(mock.clone()).with_tile_template();
        app.tap_at(&mock, Vec3::ZERO);
        app.tap_at(&mock, Vec3::new(0.5, 0.0, 0.0));
        app.tap_at(&mock, Vec3::new(0.5, 0.0, 1.0));
        assert!(app.count::<MeasureLine>() > 0);
        assert!(app.count::<MeasureLabel>() > 0);
        assert_eq!(app.count::<TilePivot>(), 1);

        app.push(InteractionEvent::Reset);
        app.update();

        assert!(app.session().is_empty());
        assert_eq!(app.count::<MeasureLine>(), 0);
        assert_eq!(app.count::<MeasureLabel>(), 0);
        assert_eq!(app.count::<TilePivot>(), 0);
        assert_eq!(app.count::<TileInstance>(), 0);
    }

    #[test]
    fn double_wipe_leaves_identical_empty_state() {
        let mock = MockArSession::new();
        let mut app = TestApp::with_session(mock.clone()).with_tile_template();
        app.tap_at(&mock, Vec3::ZERO);
        app.tap_at(&mock, Vec3::new(0.0, 0.0, 1.0));

        app.push(InteractionEvent::Reset);
        app.update();
        let first = app.session().clone();
        let entities_after_first = app.entity_count();

        app.push(InteractionEvent::Reset);
        app.update();
        assert_eq!(*app.session(), first);
        assert!(first.is_empty());
        assert_eq!(app.entity_count(), entities_after_first);
    }

    #[test]
    fn session_after_wipe_behaves_like_first_launch() {
        let mock = MockArSession::new();
        let mut app = TestApp::with_session(mock.clone());
        app.tap_at(&mock, Vec3::ZERO);
        app.tap_at(&mock, Vec3::new(0.0, 0.0, 1.0));
        let first_run = app.session().distances.clone();

        app.push(InteractionEvent::Reset);
        app.update();

        app.tap_at(&mock, Vec3::ZERO);
        app.tap_at(&mock, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(app.session().distances, first_run);
        assert_eq!(app.session().taps, 2);
        assert_eq!(app.count::<MeasureLine>(), 2);
        assert_eq!(app.count::<MeasureLabel>(), 3);
    }
}
