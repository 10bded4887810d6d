//! Analysis options and result selectors

use serde::{Deserialize, Serialize};

/// Index of a construction/service stage
pub type StageIndex = usize;

/// How stage results are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultsType {
    /// Change during the requested stage only
    Incremental,
    /// Sum of all stages up to and including the requested stage
    Cumulative,
}

impl Default for ResultsType {
    fn default() -> Self {
        Self::Cumulative
    }
}

/// Direction of optimization for envelopes and combinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Optimization {
    Maximize,
    Minimize,
}

impl Optimization {
    /// The opposite direction
    pub fn inverse(self) -> Self {
        match self {
            Self::Maximize => Self::Minimize,
            Self::Minimize => Self::Maximize,
        }
    }

    /// Returns true when `candidate` improves on `current` in this direction
    pub fn improves(self, candidate: f64, current: f64) -> bool {
        match self {
            Self::Maximize => candidate > current,
            Self::Minimize => candidate < current,
        }
    }

    /// Worst possible starting value for a search in this direction
    pub fn initial(self) -> f64 {
        match self {
            Self::Maximize => f64::NEG_INFINITY,
            Self::Minimize => f64::INFINITY,
        }
    }

    /// Returns true if a contribution of this sign helps the optimization
    pub fn favors(self, value: f64) -> bool {
        match self {
            Self::Maximize => value > 0.0,
            Self::Minimize => value < 0.0,
        }
    }
}

/// Options for staged analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Restrain the axial DOF of any piece of structure that has no axial support
    pub auto_axial_restraint: bool,
    /// Stiffness below which a diagonal term is treated as zero
    pub tolerance: f64,
    /// Use the banded (skyline) Cholesky factorization instead of dense LU
    pub sparse: bool,
    /// Number of influence points per member for live load analysis
    pub influence_subdivisions: usize,
    /// Number of trial spacings for a variable axle spacing
    pub variable_spacing_steps: usize,
    /// First stage for which influence lines are prepared (None = last stage only)
    pub live_load_stage: Option<StageIndex>,
    /// Enable logging/progress output
    pub log: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            auto_axial_restraint: true,
            tolerance: 1e-9,
            sparse: true,
            influence_subdivisions: 10,
            variable_spacing_steps: 8,
            live_load_stage: None,
            log: false,
        }
    }
}

impl SolverOptions {
    /// Enable logging
    pub fn with_logging(mut self) -> Self {
        self.log = true;
        self
    }

    /// Set the zero-stiffness tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Use the dense LU solver
    pub fn dense(mut self) -> Self {
        self.sparse = false;
        self
    }

    /// Set the number of influence points per member
    pub fn with_influence_subdivisions(mut self, n: usize) -> Self {
        self.influence_subdivisions = n.max(1);
        self
    }

    /// Prepare influence lines from this stage on
    pub fn with_live_load_stage(mut self, stage: StageIndex) -> Self {
        self.live_load_stage = Some(stage);
        self
    }
}
