//! Girder Analysis - staged girder-line models, response envelopes and load
//! combinations
//!
//! For each girder line of a bridge this library builds a simple-span and a
//! continuous structural model valid over the whole construction timeline,
//! and answers result queries against them:
//! - Product load, load case and external loading results at points of interest
//! - Live load envelopes by model, by vehicle and for the deflection check
//! - Limit state results, concurrent shears, stresses and reactions
//! - Bearing and pier-face reactions, contraflexure points and unit load responses
//!
//! ## Example
//! ```rust,no_run
//! use girder_analysis::prelude::*;
//!
//! let bridge = BridgeDescription::from_file("bridge.json").unwrap();
//! let last = bridge.interval_count() - 1;
//! let mut manager: GirderModelManager<_> = GirderModelManager::new(bridge, AnalysisOptions::default());
//!
//! let model = manager.ensure_built(0, BridgeAnalysisType::ContinuousSpan).unwrap();
//! let pois = [PointOfInterest::new(0, 12.5)];
//! let moments = model
//!     .product_results(
//!         last,
//!         ProductLoad::Slab,
//!         ForceEffect::Mz,
//!         &pois,
//!         BridgeAnalysisType::ContinuousSpan,
//!         ResultsType::Cumulative,
//!     )
//!     .unwrap();
//! println!("slab moment: {}", moments[0]);
//! ```

pub mod bridge;
pub mod builder;
pub mod combinations;
pub mod combined;
pub mod distribution;
pub mod error;
pub mod external;
pub mod layout;
pub mod live_load;
pub mod loads;
pub mod manager;
pub mod model;
pub mod options;
pub mod poi;
pub mod response;
pub mod status;
pub mod storage;
pub mod structural;
pub mod types;

// Re-export common types
pub mod prelude {
    pub use crate::bridge::{BridgeDescription, BridgeProvider};
    pub use crate::combinations::{LimitState, LimitStateDefinition, LoadCombinationTable};
    pub use crate::combined::LimitStateLiveLoad;
    pub use crate::error::{AnalysisError, AnalysisResult};
    pub use crate::external::{ExternalLoad, ExternalLoading};
    pub use crate::manager::GirderModelManager;
    pub use crate::model::GirderLineModel;
    pub use crate::options::{AnalysisOptions, CantileverPolicy};
    pub use crate::poi::PointOfInterest;
    pub use crate::response::{GirderDeflection, GirderForces, GirderStress};
    pub use crate::status::{CollectingStatusSink, LogStatusSink, StatusCategory, StatusSink};
    pub use crate::structural::StructuralModel;
    pub use crate::types::{
        BridgeAnalysisType, DeflectionLiveLoadType, IntervalIndex, LiveLoadType, LoadCase,
        ModelKind, Named, PierFace, ProductLoad, SegmentEnd, SupportLocation,
    };
    pub use girder_fem::prelude::{
        AxleConfiguration, ForceEffect, LiveLoadQuery, LiveLoadResult, Optimization, ResultsType,
        UnitLoad,
    };
}
