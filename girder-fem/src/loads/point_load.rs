//! Point loads on members

use serde::{Deserialize, Serialize};

use crate::analysis::StageIndex;

/// Direction of a member load in member coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadDirection {
    /// Along the member
    Fx,
    /// Transverse, positive up
    Fy,
}

/// A concentrated load on a member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointLoad {
    /// Distance from the i-joint
    pub x: f64,
    /// Axial force
    pub fx: f64,
    /// Transverse force
    pub fy: f64,
    /// Concentrated moment
    pub mz: f64,
    /// Stage in which the load is applied
    pub stage: StageIndex,
    /// Load group
    pub group: String,
}

impl PointLoad {
    /// Create a new point load
    pub fn new(x: f64, fx: f64, fy: f64, mz: f64, stage: StageIndex, group: &str) -> Self {
        Self {
            x,
            fx,
            fy,
            mz,
            stage,
            group: group.to_string(),
        }
    }

    /// Create a transverse point load
    pub fn fy(x: f64, value: f64, stage: StageIndex, group: &str) -> Self {
        Self::new(x, 0.0, value, 0.0, stage, group)
    }
}
