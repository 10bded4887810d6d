//! Imposed strain loads

use serde::{Deserialize, Serialize};

use crate::analysis::StageIndex;

/// Imposed axial strain and curvature over part of a member.
///
/// A positive curvature is the curvature of a sagging beam. The load produces
/// deformation only; internal forces arise where the structure restrains it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrainLoad {
    /// Start position (distance from i-joint)
    pub x1: f64,
    /// End position (distance from i-joint)
    pub x2: f64,
    /// Axial strain, extension positive
    pub axial_strain: f64,
    /// Curvature
    pub curvature: f64,
    /// Stage in which the load is applied
    pub stage: StageIndex,
    /// Load group
    pub group: String,
}

impl StrainLoad {
    /// Create a new strain load
    pub fn new(
        x1: f64,
        x2: f64,
        axial_strain: f64,
        curvature: f64,
        stage: StageIndex,
        group: &str,
    ) -> Self {
        Self {
            x1,
            x2,
            axial_strain,
            curvature,
            stage,
            group: group.to_string(),
        }
    }

    /// Imposed curvature at `x`
    pub fn curvature_at(&self, x: f64) -> f64 {
        if x >= self.x1 && x <= self.x2 {
            self.curvature
        } else {
            0.0
        }
    }

    /// Imposed axial strain at `x`
    pub fn strain_at(&self, x: f64) -> f64 {
        if x >= self.x1 && x <= self.x2 {
            self.axial_strain
        } else {
            0.0
        }
    }
}
