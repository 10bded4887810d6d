//! Engine configuration

use girder_fem::prelude::SolverOptions;
use serde::{Deserialize, Serialize};

/// When segment overhangs are modeled as cantilever members
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CantileverPolicy {
    /// Every overhang beyond a bearing is a member
    Always,
    /// Overhang loads are moved to the bearing
    Never,
    /// Overhangs longer than the given length are members
    LongerThan(f64),
}

impl CantileverPolicy {
    pub fn models(&self, length: f64, tolerance: f64) -> bool {
        if length <= tolerance {
            return false;
        }
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::LongerThan(limit) => length > *limit,
        }
    }
}

/// Options for building and querying girder-line models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Cantilever modeling policy
    pub cantilevers: CantileverPolicy,
    /// Influence points per member for live load
    pub influence_subdivisions: usize,
    /// Positions closer than this are the same point
    pub tolerance: f64,
    /// Apply the storage-to-erection correction to girder self-weight deflections
    pub storage_correction: bool,
    /// Enable solver progress logging
    pub log: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            cantilevers: CantileverPolicy::Never,
            influence_subdivisions: 10,
            tolerance: 1.0e-6,
            storage_correction: true,
            log: false,
        }
    }
}

impl AnalysisOptions {
    /// Enable logging
    pub fn with_logging(mut self) -> Self {
        self.log = true;
        self
    }

    /// Set the position tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Set the cantilever modeling policy
    pub fn with_cantilevers(mut self, policy: CantileverPolicy) -> Self {
        self.cantilevers = policy;
        self
    }

    /// Set the number of influence points per member
    pub fn with_influence_subdivisions(mut self, n: usize) -> Self {
        self.influence_subdivisions = n.max(1);
        self
    }

    /// Report girder deflections as computed on the erected structure
    pub fn without_storage_correction(mut self) -> Self {
        self.storage_correction = false;
        self
    }

    /// Solver options for a girder-line model
    pub fn solver_options(&self, live_load_interval: usize) -> SolverOptions {
        let options = SolverOptions::default()
            .with_influence_subdivisions(self.influence_subdivisions)
            .with_live_load_stage(live_load_interval);
        if self.log {
            options.with_logging()
        } else {
            options
        }
    }
}
