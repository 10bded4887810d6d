//! Member element - a staged line-beam segment between two joints

use serde::{Deserialize, Serialize};

use super::joint::JointId;
use crate::analysis::StageIndex;

/// Index of a member in the model
pub type MemberId = usize;

/// Axial and flexural stiffness of a member in one stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberStiffness {
    /// Axial rigidity E*A
    pub ea: f64,
    /// Flexural rigidity E*I
    pub ei: f64,
}

impl MemberStiffness {
    pub fn new(ea: f64, ei: f64) -> Self {
        Self { ea, ei }
    }
}

/// End releases for a member, optionally removed when continuity is made
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MemberReleases {
    /// i-end releases [DX, DY, RZ]
    pub i_end: [bool; 3],
    /// j-end releases [DX, DY, RZ]
    pub j_end: [bool; 3],
    /// Stage from which the releases no longer apply
    pub removed_at: Option<StageIndex>,
}

impl MemberReleases {
    /// Create releases with no end releases
    pub fn none() -> Self {
        Self::default()
    }

    /// Moment release at the i-end
    pub fn pin_i() -> Self {
        Self {
            i_end: [false, false, true],
            ..Self::default()
        }
    }

    /// Moment release at the j-end
    pub fn pin_j() -> Self {
        Self {
            j_end: [false, false, true],
            ..Self::default()
        }
    }

    /// Moment releases at both ends
    pub fn pin_both() -> Self {
        Self {
            i_end: [false, false, true],
            j_end: [false, false, true],
            removed_at: None,
        }
    }

    /// Release axial force at the i-end as well
    pub fn with_axial_i(mut self) -> Self {
        self.i_end[0] = true;
        self
    }

    /// Release axial force at the j-end as well
    pub fn with_axial_j(mut self) -> Self {
        self.j_end[0] = true;
        self
    }

    /// Remove the releases starting at `stage`
    pub fn until(mut self, stage: StageIndex) -> Self {
        self.removed_at = Some(stage);
        self
    }

    /// Check whether the releases are in effect during `stage`
    pub fn is_active(&self, stage: StageIndex) -> bool {
        self.removed_at.map_or(true, |removed| stage < removed)
    }

    /// Combined releases as a 6-element array for `stage`
    pub fn as_array(&self, stage: StageIndex) -> [bool; 6] {
        let mut arr = [false; 6];
        if self.is_active(stage) {
            arr[0..3].copy_from_slice(&self.i_end);
            arr[3..6].copy_from_slice(&self.j_end);
        }
        arr
    }
}

/// A line-beam member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Start joint
    pub i_joint: JointId,
    /// End joint
    pub j_joint: JointId,
    /// Stage in which the member comes into existence
    pub stage: StageIndex,
    /// Stiffness by stage, sorted by stage
    pub stiffness: Vec<(StageIndex, MemberStiffness)>,
    /// End releases
    pub releases: MemberReleases,

    /// Calculated length
    #[serde(skip)]
    pub(crate) length: f64,
}

impl Member {
    /// Create a new member that exists from `stage` on
    pub fn new(i_joint: JointId, j_joint: JointId, stage: StageIndex) -> Self {
        Self {
            i_joint,
            j_joint,
            stage,
            stiffness: Vec::new(),
            releases: MemberReleases::none(),
            length: 0.0,
        }
    }

    /// Set the stiffness that applies from `stage` on
    pub fn with_stiffness(mut self, stage: StageIndex, stiffness: MemberStiffness) -> Self {
        self.set_stiffness(stage, stiffness);
        self
    }

    /// Set end releases
    pub fn with_releases(mut self, releases: MemberReleases) -> Self {
        self.releases = releases;
        self
    }

    /// Set the stiffness that applies from `stage` on, replacing any entry for that stage
    pub fn set_stiffness(&mut self, stage: StageIndex, stiffness: MemberStiffness) {
        match self.stiffness.binary_search_by_key(&stage, |(s, _)| *s) {
            Ok(pos) => self.stiffness[pos].1 = stiffness,
            Err(pos) => self.stiffness.insert(pos, (stage, stiffness)),
        }
    }

    /// Get the member length
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Check whether the member exists during `stage`
    pub fn is_active(&self, stage: StageIndex) -> bool {
        self.stage <= stage
    }

    /// Stiffness in effect during `stage`
    pub fn stiffness_at(&self, stage: StageIndex) -> Option<MemberStiffness> {
        if !self.is_active(stage) {
            return None;
        }
        self.stiffness
            .iter()
            .rev()
            .find(|(s, _)| *s <= stage)
            .map(|(_, k)| *k)
    }
}
