//! Load types, load cases, combinations and live loads

mod distributed;
mod distribution;
mod joint_load;
mod live_load;
mod load_case;
mod load_combo;
mod point_load;
mod strain_load;

pub use distributed::DistributedLoad;
pub use distribution::{DistributionFactorSegment, DistributionFactors};
pub use joint_load::JointLoad;
pub use live_load::{
    Axle, DistributionFactorType, LiveLoadModel, VehicleApplicability, VehicularLoad,
    VehicularLoadConfiguration,
};
pub use load_case::LoadCase;
pub use load_combo::{CaseFactors, LiveLoadApplication, LoadCombination};
pub use point_load::{LoadDirection, PointLoad};
pub use strain_load::StrainLoad;

use serde::{Deserialize, Serialize};

use crate::analysis::StageIndex;
use crate::elements::MemberId;

/// Any load carried by a member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MemberLoad {
    Point(PointLoad),
    Distributed(DistributedLoad),
    Strain(StrainLoad),
}

impl MemberLoad {
    /// Stage in which the load is applied
    pub fn stage(&self) -> StageIndex {
        match self {
            Self::Point(l) => l.stage,
            Self::Distributed(l) => l.stage,
            Self::Strain(l) => l.stage,
        }
    }

    /// Load group of the load
    pub fn group(&self) -> &str {
        match self {
            Self::Point(l) => &l.group,
            Self::Distributed(l) => &l.group,
            Self::Strain(l) => &l.group,
        }
    }

    /// Locations where load effects are discontinuous
    pub(crate) fn breakpoints(&self) -> Vec<f64> {
        match self {
            Self::Point(l) => vec![l.x],
            Self::Distributed(l) => vec![l.x1, l.x2],
            Self::Strain(l) => vec![l.x1, l.x2],
        }
    }
}

/// A member load together with the member that carries it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberLoadItem {
    pub member: MemberId,
    pub load: MemberLoad,
}
