//! Error types for the staged solver

use thiserror::Error;

/// Main error type for solver operations
#[derive(Error, Debug)]
pub enum FemError {
    #[error("Joint {0} not found in model")]
    JointNotFound(usize),

    #[error("Member {0} not found in model")]
    MemberNotFound(usize),

    #[error("Support {0} not found in model")]
    SupportNotFound(usize),

    #[error("Point of interest {0} not found in model")]
    PoiNotFound(usize),

    #[error("Stage {0} not defined in model")]
    StageNotFound(usize),

    #[error("Load group '{0}' not found in model")]
    LoadGroupNotFound(String),

    #[error("Load case '{0}' not found in model")]
    LoadCaseNotFound(String),

    #[error("Load combination '{0}' not found in model")]
    LoadCombinationNotFound(String),

    #[error("Live load model '{0}' not found in model")]
    LiveLoadModelNotFound(String),

    #[error("Duplicate name '{0}' already exists")]
    DuplicateName(String),

    #[error("Model is unstable: {0}")]
    Unstable(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Model not analyzed - run analyze() first")]
    NotAnalyzed,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for solver operations
pub type FemResult<T> = Result<T, FemError>;
