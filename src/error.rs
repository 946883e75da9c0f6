//! Error types for AR session plumbing and tile layout.

/// Failures reported by the AR platform or the asset pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArError {
    /// The platform refused to create a hit-test source.
    #[error("hit-test source unavailable: {0}")]
    HitTestUnavailable(String),

    /// The AR session ended before the request completed.
    #[error("AR session ended")]
    SessionEnded,

    /// The tile model could not be loaded.
    #[error("tile asset failed to load: {0}")]
    AssetLoad(String),
}

/// Invalid input handed to the tile layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TilingError {
    /// A rectangle needs exactly three confirmed points.
    #[error("expected 3 measured points, got {0}")]
    PointCount(usize),

    /// A rectangle needs exactly two distance readings.
    #[error("expected 2 distance readings, got {0}")]
    ReadingCount(usize),

    /// The measured rectangle would need more tiles than allowed.
    #[error("{rows}x{cols} tile grid exceeds the limit of {max} tiles")]
    GridTooLarge {
        /// Stamped rows requested.
        rows: u32,
        /// Stamped columns requested.
        cols: u32,
        /// Configured cap.
        max: u32,
    },
}
