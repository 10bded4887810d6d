//! Error types for girder-line analysis

use girder_fem::error::FemError;
use thiserror::Error;

use crate::types::BridgeAnalysisType;

/// Main error type for girder-line analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Girder line {girder_line} cannot form a stable load path: {reason}")]
    UnstableStructure { girder_line: usize, reason: String },

    #[error("Girder line {0} is not defined by the bridge")]
    GirderLineNotFound(usize),

    #[error("Segment {0} is not defined on the girder line")]
    SegmentNotFound(usize),

    #[error("Pier {0} is not defined by the bridge")]
    PierNotFound(usize),

    #[error("Temporary support {0} is not defined by the bridge")]
    TemporarySupportNotFound(usize),

    #[error("Interval {0} is not defined by the timeline")]
    IntervalNotFound(usize),

    #[error("Loading '{0}' is not defined")]
    LoadingNotFound(String),

    #[error("Unknown name '{0}'")]
    UnknownName(String),

    #[error("{analysis_type:?} model of girder line {girder_line} has not been built")]
    ModelNotBuilt {
        girder_line: usize,
        analysis_type: BridgeAnalysisType,
    },

    #[error("Invalid bridge description: {0}")]
    InvalidBridge(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Fem(#[from] FemError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for girder-line analysis
pub type AnalysisResult<T> = Result<T, AnalysisError>;
