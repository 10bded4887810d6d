//! Closed enumerations used throughout the engine
//!
//! Every enumeration that is also known to the structural model by name
//! carries a static bidirectional name table through [`Named`].

use serde::{Deserialize, Serialize};

/// Index of an interval in the bridge timeline
pub type IntervalIndex = usize;

/// Enumeration with a fixed name for every variant
pub trait Named: Sized + Copy + PartialEq + 'static {
    /// Every variant with its name
    const NAMES: &'static [(Self, &'static str)];

    /// Name of this variant
    fn name(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(v, _)| *v == self)
            .map(|(_, n)| *n)
            .unwrap_or_default()
    }

    /// Variant with the given name
    fn from_name(name: &str) -> Option<Self> {
        Self::NAMES.iter().find(|(_, n)| *n == name).map(|(v, _)| *v)
    }

    /// Every variant, in table order
    fn all() -> impl Iterator<Item = Self> {
        Self::NAMES.iter().map(|(v, _)| *v)
    }
}

/// Connectivity assumed when analyzing a girder line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BridgeAnalysisType {
    /// Girders stay simple spans at every pier
    SimpleSpan,
    /// Continuity is made where the bridge says so
    ContinuousSpan,
    /// Smaller of the simple and continuous results
    MinSimpleContinuousEnvelope,
    /// Larger of the simple and continuous results
    MaxSimpleContinuousEnvelope,
}

impl BridgeAnalysisType {
    /// Structural models needed to answer a query of this type
    pub fn models(self) -> &'static [ModelKind] {
        match self {
            Self::SimpleSpan => &[ModelKind::Simple],
            Self::ContinuousSpan => &[ModelKind::Continuous],
            Self::MinSimpleContinuousEnvelope | Self::MaxSimpleContinuousEnvelope => {
                &[ModelKind::Simple, ModelKind::Continuous]
            }
        }
    }

    pub fn is_envelope(self) -> bool {
        matches!(
            self,
            Self::MinSimpleContinuousEnvelope | Self::MaxSimpleContinuousEnvelope
        )
    }
}

/// The two structural models kept for a girder line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelKind {
    Simple,
    Continuous,
}

/// End of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SegmentEnd {
    Start,
    End,
}

/// Side of a pier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PierFace {
    Back,
    Ahead,
}

/// A location where reactions are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SupportLocation {
    Pier(usize),
    TemporarySupport(usize),
}

/// Load group generated by the engine for one physical load category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductLoad {
    Girder,
    Diaphragm,
    ConstructionLoad,
    Slab,
    SlabPad,
    SlabPanel,
    Overlay,
    Sidewalk,
    TrafficBarrier,
    ShearKey,
    LongitudinalJoint,
    UserDC,
    UserDW,
    UserLLIM,
    Pretension,
    PostTensioning,
    Creep,
    Shrinkage,
    Relaxation,
}

impl Named for ProductLoad {
    const NAMES: &'static [(Self, &'static str)] = &[
        (Self::Girder, "Girder"),
        (Self::Diaphragm, "Diaphragm"),
        (Self::ConstructionLoad, "Construction"),
        (Self::Slab, "Slab"),
        (Self::SlabPad, "Slab Pad"),
        (Self::SlabPanel, "Slab Panel"),
        (Self::Overlay, "Overlay"),
        (Self::Sidewalk, "Sidewalk"),
        (Self::TrafficBarrier, "Traffic Barrier"),
        (Self::ShearKey, "Shear Key"),
        (Self::LongitudinalJoint, "Longitudinal Joint"),
        (Self::UserDC, "User DC"),
        (Self::UserDW, "User DW"),
        (Self::UserLLIM, "User LLIM"),
        (Self::Pretension, "Pretension"),
        (Self::PostTensioning, "Post Tensioning"),
        (Self::Creep, "Creep"),
        (Self::Shrinkage, "Shrinkage"),
        (Self::Relaxation, "Relaxation"),
    ];
}

impl ProductLoad {
    /// Load case the product belongs to, if it belongs to one
    pub fn load_case(self) -> Option<LoadCase> {
        match self {
            Self::Girder
            | Self::Diaphragm
            | Self::ConstructionLoad
            | Self::Slab
            | Self::SlabPad
            | Self::SlabPanel
            | Self::Sidewalk
            | Self::TrafficBarrier
            | Self::ShearKey
            | Self::LongitudinalJoint
            | Self::UserDC => Some(LoadCase::DC),
            Self::Overlay | Self::UserDW => Some(LoadCase::DW),
            Self::UserLLIM => Some(LoadCase::LLIM),
            Self::PostTensioning => Some(LoadCase::PS),
            Self::Creep => Some(LoadCase::CR),
            Self::Shrinkage => Some(LoadCase::SH),
            Self::Relaxation => Some(LoadCase::RE),
            Self::Pretension => None,
        }
    }

    /// Time-dependent products exist only for time-step analysis
    pub fn is_time_dependent(self) -> bool {
        matches!(self, Self::Creep | Self::Shrinkage | Self::Relaxation)
    }
}

/// Load cases combined by the limit states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoadCase {
    DC,
    DW,
    /// DW without a future overlay
    DWRating,
    /// User-defined live load
    LLIM,
    /// Secondary effects of post-tensioning
    PS,
    CR,
    SH,
    RE,
}

impl Named for LoadCase {
    const NAMES: &'static [(Self, &'static str)] = &[
        (Self::DC, "DC"),
        (Self::DW, "DW"),
        (Self::DWRating, "DW Rating"),
        (Self::LLIM, "LL+IM"),
        (Self::PS, "PS"),
        (Self::CR, "CR"),
        (Self::SH, "SH"),
        (Self::RE, "RE"),
    ];
}

impl LoadCase {
    pub fn is_time_dependent(self) -> bool {
        matches!(self, Self::CR | Self::SH | Self::RE)
    }
}

/// Live load model types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LiveLoadType {
    Design,
    Permit,
    Fatigue,
    Pedestrian,
    LegalRoutine,
    LegalSpecial,
    LegalEmergency,
    PermitRoutine,
    PermitSpecial,
}

impl Named for LiveLoadType {
    const NAMES: &'static [(Self, &'static str)] = &[
        (Self::Design, "LL Design"),
        (Self::Permit, "LL Permit"),
        (Self::Fatigue, "LL Fatigue"),
        (Self::Pedestrian, "LL Pedestrian"),
        (Self::LegalRoutine, "LL Legal Routine"),
        (Self::LegalSpecial, "LL Legal Special"),
        (Self::LegalEmergency, "LL Legal Emergency"),
        (Self::PermitRoutine, "LL Permit Routine"),
        (Self::PermitSpecial, "LL Permit Special"),
    ];
}

/// Live loads used for the live load deflection check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeflectionLiveLoadType {
    /// Design truck alone
    DesignTruckAlone,
    /// 25% of the design truck together with the design lane
    Design25PlusLane,
    /// Envelope of the two
    Envelope,
}

impl Named for DeflectionLiveLoadType {
    const NAMES: &'static [(Self, &'static str)] = &[
        (Self::DesignTruckAlone, "LL Deflection Truck"),
        (Self::Design25PlusLane, "LL Deflection 25% Truck + Lane"),
        (Self::Envelope, "LL Deflection Envelope"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_tables_round_trip() {
        for product in ProductLoad::all() {
            assert_eq!(ProductLoad::from_name(product.name()), Some(product));
        }
        for case in LoadCase::all() {
            assert_eq!(LoadCase::from_name(case.name()), Some(case));
        }
        for ll in LiveLoadType::all() {
            assert_eq!(LiveLoadType::from_name(ll.name()), Some(ll));
        }
        assert_eq!(ProductLoad::all().count(), 19);
        assert_eq!(ProductLoad::from_name("Deck"), None);
    }

    #[test]
    fn test_product_load_cases() {
        assert_eq!(ProductLoad::Girder.load_case(), Some(LoadCase::DC));
        assert_eq!(ProductLoad::Overlay.load_case(), Some(LoadCase::DW));
        assert_eq!(ProductLoad::Pretension.load_case(), None);
        assert!(ProductLoad::Creep.is_time_dependent());
    }

    #[test]
    fn test_envelope_needs_both_models() {
        assert_eq!(BridgeAnalysisType::SimpleSpan.models(), &[ModelKind::Simple]);
        assert_eq!(BridgeAnalysisType::MaxSimpleContinuousEnvelope.models().len(), 2);
        assert!(BridgeAnalysisType::MinSimpleContinuousEnvelope.is_envelope());
    }
}
