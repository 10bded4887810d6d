//! Support conditions

use serde::{Deserialize, Serialize};

use super::joint::JointId;
use crate::analysis::StageIndex;

/// Index of a support in the model
pub type SupportId = usize;

/// Restraint pattern of a support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fixity {
    /// DY restrained only
    Roller,
    /// DX and DY restrained
    Pinned,
    /// All DOF restrained
    Fixed,
}

/// Support at a joint
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Support {
    /// Supported joint
    pub joint: JointId,
    /// Restraint pattern
    pub fixity: Fixity,
    /// Stage in which the support is installed
    pub stage: StageIndex,
    /// Stage in which the support is removed
    pub removed_at: Option<StageIndex>,
    /// Exclude this support's reaction when reactions are summed by the caller
    pub omit_reaction: bool,
}

impl Support {
    /// Create a support that exists for the whole analysis
    pub fn new(joint: JointId, fixity: Fixity) -> Self {
        Self {
            joint,
            fixity,
            stage: 0,
            removed_at: None,
            omit_reaction: false,
        }
    }

    /// Create a roller support
    pub fn roller(joint: JointId) -> Self {
        Self::new(joint, Fixity::Roller)
    }

    /// Create a pinned support
    pub fn pinned(joint: JointId) -> Self {
        Self::new(joint, Fixity::Pinned)
    }

    /// Create a fixed support
    pub fn fixed(joint: JointId) -> Self {
        Self::new(joint, Fixity::Fixed)
    }

    /// Install the support in `stage`
    pub fn from_stage(mut self, stage: StageIndex) -> Self {
        self.stage = stage;
        self
    }

    /// Remove the support in `stage`
    pub fn removed_at(mut self, stage: StageIndex) -> Self {
        self.removed_at = Some(stage);
        self
    }

    /// Flag the reaction as not load-bearing
    pub fn omit_reaction(mut self) -> Self {
        self.omit_reaction = true;
        self
    }

    /// Check whether the support restrains the structure during `stage`
    pub fn is_active(&self, stage: StageIndex) -> bool {
        self.stage <= stage && self.removed_at.map_or(true, |removed| stage < removed)
    }

    /// Restrained DOF [DX, DY, RZ]
    pub fn restraints(&self) -> [bool; 3] {
        match self.fixity {
            Fixity::Roller => [false, true, false],
            Fixity::Pinned => [true, true, false],
            Fixity::Fixed => [true, true, true],
        }
    }

    /// Count number of restrained DOFs
    pub fn num_restrained(&self) -> usize {
        self.restraints().iter().filter(|r| **r).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_support() {
        let support = Support::fixed(0);
        assert_eq!(support.num_restrained(), 3);
    }

    #[test]
    fn test_temporary_support_activity() {
        let support = Support::roller(3).from_stage(1).removed_at(4);
        assert!(!support.is_active(0));
        assert!(support.is_active(1));
        assert!(support.is_active(3));
        assert!(!support.is_active(4));
    }
}
