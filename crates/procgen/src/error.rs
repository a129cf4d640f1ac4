//! Error type shared by every generation stage.

use thiserror::Error;

/// Precondition violations reported by the generators. None of these are
/// retried; they surface a caller mistake.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcgenError {
    /// A parameter is outside its valid range.
    #[error("invalid {name}: {reason}")]
    Configuration { name: &'static str, reason: String },

    /// Two grids fed to the same pass have different side lengths.
    #[error("grid size mismatch: expected {expected}x{expected}, got {actual}x{actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The sun's ground projection sits exactly on the queried cell, so there
    /// is no direction to march in.
    #[error("sun ground projection coincides with cell ({x}, {y})")]
    DegenerateGeometry { x: usize, y: usize },

    #[error("cell ({x}, {y}) is outside the {size}x{size} grid")]
    OutOfBounds { x: usize, y: usize, size: usize },

    /// Terrain regions must be ordered by ascending `min_height`.
    #[error("terrain region {index} has a lower min height than the region before it")]
    UnsortedRegions { index: usize },

    #[error("falloff was requested but no falloff mask is set")]
    MissingFalloff,
}

impl ProcgenError {
    pub(crate) fn config(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProcgenError>;
