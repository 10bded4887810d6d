//! Girder FEM - a staged line-beam finite element solver
//!
//! This library analyzes a girder line as a straight chain of beam members
//! whose structure changes from stage to stage, supporting:
//! - Members and supports that appear, change stiffness or go away by stage
//! - Moment and axial releases removed when continuity is made
//! - Point, distributed and imposed-strain member loads in named load groups
//! - Load cases and load combinations with min/max factors
//! - Influence-line based live load envelopes with axle placement reporting
//!
//! ## Example
//! ```rust
//! use girder_fem::prelude::*;
//!
//! let mut model = StagedModel::new();
//! let erect = model.add_stage("Erection").unwrap();
//!
//! let a = model.add_joint(Joint::new(0.0));
//! let b = model.add_joint(Joint::new(10.0));
//! model
//!     .add_member(Member::new(a, b, erect).with_stiffness(erect, MemberStiffness::new(1.0e7, 1.0e5)))
//!     .unwrap();
//! model.add_support(Support::pinned(a)).unwrap();
//! model.add_support(Support::roller(b)).unwrap();
//!
//! model.add_load_group("DC").unwrap();
//! model
//!     .add_member_load(0, MemberLoad::Distributed(DistributedLoad::transverse(-10.0, -10.0, 0.0, 10.0, erect, "DC")))
//!     .unwrap();
//! let mid = model.add_poi(5.0);
//!
//! model.analyze().unwrap();
//! let forces = model.section_forces(erect, mid, "DC", ResultsType::Cumulative).unwrap();
//! assert!((forces.mz.left - 125.0).abs() < 1e-6);
//! ```

pub mod analysis;
pub mod elements;
pub mod error;
mod influence;
pub mod loads;
pub mod math;
pub mod model;
pub mod results;
mod solution;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{Optimization, ResultsType, SolverOptions, StageIndex};
    pub use crate::elements::{
        Fixity, Joint, JointId, Member, MemberId, MemberReleases, MemberStiffness, Support,
        SupportId,
    };
    pub use crate::error::{FemError, FemResult};
    pub use crate::loads::{
        Axle, CaseFactors, DistributedLoad, DistributionFactorSegment, DistributionFactorType,
        DistributionFactors, JointLoad, LiveLoadApplication, LiveLoadModel, LoadCase,
        LoadCombination, LoadDirection, MemberLoad, PointLoad, StrainLoad, VehicleApplicability,
        VehicularLoad, VehicularLoadConfiguration,
    };
    pub use crate::model::StagedModel;
    pub use crate::results::{
        AxleConfiguration, AxlePlacement, CombinationResult, Face, ForceEffect, LiveLoadQuery,
        LiveLoadResult, PoiDisplacement, PoiId, Reaction, ResponseQuantity, SectionForces,
        SectionValue, UnitLoad,
    };
}
