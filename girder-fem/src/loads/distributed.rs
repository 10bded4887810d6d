//! Distributed loads on members

use serde::{Deserialize, Serialize};

use super::point_load::LoadDirection;
use crate::analysis::StageIndex;

/// A linearly varying distributed load on part of a member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributedLoad {
    /// Start magnitude (at start position)
    pub w1: f64,
    /// End magnitude (at end position)
    pub w2: f64,
    /// Start position (distance from i-joint)
    pub x1: f64,
    /// End position (distance from i-joint)
    pub x2: f64,
    /// Load direction
    pub direction: LoadDirection,
    /// Stage in which the load is applied
    pub stage: StageIndex,
    /// Load group
    pub group: String,
}

impl DistributedLoad {
    /// Create a new distributed load
    pub fn new(
        w1: f64,
        w2: f64,
        x1: f64,
        x2: f64,
        direction: LoadDirection,
        stage: StageIndex,
        group: &str,
    ) -> Self {
        Self {
            w1,
            w2,
            x1,
            x2,
            direction,
            stage,
            group: group.to_string(),
        }
    }

    /// Create a transverse load between `x1` and `x2`
    pub fn transverse(w1: f64, w2: f64, x1: f64, x2: f64, stage: StageIndex, group: &str) -> Self {
        Self::new(w1, w2, x1, x2, LoadDirection::Fy, stage, group)
    }

    /// Check if the load is uniform (constant magnitude)
    pub fn is_uniform(&self) -> bool {
        (self.w1 - self.w2).abs() < 1e-10
    }

    /// Intensity at `x`, zero outside the loaded length
    pub fn intensity(&self, x: f64) -> f64 {
        if x < self.x1 || x > self.x2 {
            return 0.0;
        }
        let len = self.x2 - self.x1;
        if len <= 0.0 {
            return self.w1;
        }
        self.w1 + (self.w2 - self.w1) * (x - self.x1) / len
    }

    /// Resultant of the part of the load left of `x`
    pub fn resultant_to(&self, x: f64) -> f64 {
        let s = (x.min(self.x2) - self.x1).max(0.0);
        let slope = self.slope();
        self.w1 * s + slope * s * s / 2.0
    }

    /// Moment about `x` of the part of the load left of `x`, as ∫(x - ξ)w(ξ)dξ
    pub fn moment_to(&self, x: f64) -> f64 {
        let s = (x.min(self.x2) - self.x1).max(0.0);
        let d = x - self.x1;
        let k = self.slope();
        d * self.w1 * s + d * k * s * s / 2.0 - self.w1 * s * s / 2.0 - k * s * s * s / 3.0
    }

    /// Get the total force from this load
    pub fn total_force(&self) -> f64 {
        (self.w1 + self.w2) / 2.0 * (self.x2 - self.x1)
    }

    fn slope(&self) -> f64 {
        let len = self.x2 - self.x1;
        if len <= 0.0 {
            0.0
        } else {
            (self.w2 - self.w1) / len
        }
    }
}
