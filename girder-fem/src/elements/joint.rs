//! Joint element - a point on the girder line

use serde::{Deserialize, Serialize};

/// Index of a joint in the model
pub type JointId = usize;

/// A joint on the line model. Each joint carries three DOF: [DX, DY, RZ]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Joint {
    /// Location along the line
    pub x: f64,
}

impl Joint {
    /// Create a new joint at the given location
    pub fn new(x: f64) -> Self {
        Self { x }
    }

    /// Distance to another joint
    pub fn distance_to(&self, other: &Joint) -> f64 {
        (other.x - self.x).abs()
    }
}
