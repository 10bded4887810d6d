//! Joint loads - forces and moments applied directly to joints

use serde::{Deserialize, Serialize};

use crate::analysis::StageIndex;

/// A load applied directly to a joint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointLoad {
    /// Force along the line (N)
    pub fx: f64,
    /// Transverse force, positive up (N)
    pub fy: f64,
    /// Moment, counter-clockwise positive (N·m)
    pub mz: f64,
    /// Stage in which the load is applied
    pub stage: StageIndex,
    /// Load group this load belongs to
    pub group: String,
}

impl JointLoad {
    /// Create a new joint load with all components
    pub fn new(fx: f64, fy: f64, mz: f64, stage: StageIndex, group: &str) -> Self {
        Self {
            fx,
            fy,
            mz,
            stage,
            group: group.to_string(),
        }
    }

    /// Create a transverse force
    pub fn fy(value: f64, stage: StageIndex, group: &str) -> Self {
        Self::new(0.0, value, 0.0, stage, group)
    }

    /// Create a concentrated moment
    pub fn mz(value: f64, stage: StageIndex, group: &str) -> Self {
        Self::new(0.0, 0.0, value, stage, group)
    }

    /// Get the load as an array [FX, FY, MZ]
    pub fn as_array(&self) -> [f64; 3] {
        [self.fx, self.fy, self.mz]
    }
}
