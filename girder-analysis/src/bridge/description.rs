//! Serializable bridge description
//!
//! Positions along a girder line (`station`, `x`) are measured from the
//! start of its first segment. Forces are in N, lengths in m.

use std::collections::BTreeMap;

use girder_fem::prelude::{LiveLoadApplication, VehicularLoadConfiguration};
use serde::{Deserialize, Serialize};

use crate::combinations::LimitState;
use crate::types::{IntervalIndex, LiveLoadType};

/// A named interval of the timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalDescription {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl IntervalDescription {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
        }
    }
}

/// Intervals in which bridge-wide events take place
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimelineEvents {
    /// Deck, haunch, shear keys and intermediate diaphragms are cast
    pub deck_casting: IntervalIndex,
    /// The deck acts compositely with the girders
    pub composite_deck: IntervalIndex,
    /// Barriers and sidewalks are installed
    pub railing_system: IntervalIndex,
    /// The overlay is placed
    pub overlay: IntervalIndex,
    /// The bridge opens to traffic
    pub live_load: IntervalIndex,
}

/// Boundary condition between the girders and a pier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PierConnection {
    /// Girders end on rollers
    Roller,
    /// Girders end on pinned bearings
    Hinge,
    /// Girder ends are made continuous by a diaphragm
    Continuous,
    /// Girder ends are cast into the pier
    Integral,
    /// A segment spans over the pier on a bearing
    ContinuousSegment,
    /// A segment spans over the pier and is later cast into it
    IntegralSegment,
}

impl PierConnection {
    /// Girders end at the pier
    pub fn has_girder_ends(self) -> bool {
        !matches!(self, Self::ContinuousSegment | Self::IntegralSegment)
    }

    /// Moment continuity is made at some interval
    pub fn makes_continuity(self) -> bool {
        matches!(self, Self::Continuous | Self::Integral)
    }

    pub fn is_integral(self) -> bool {
        matches!(self, Self::Integral | Self::IntegralSegment)
    }
}

/// Cast-in-place diaphragm at a pier
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PierDiaphragm {
    /// Weight carried by the back girder (N)
    pub back_weight: f64,
    /// Weight carried by the ahead girder (N)
    pub ahead_weight: f64,
}

/// A permanent pier or abutment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PierDescription {
    pub station: f64,
    pub connection: PierConnection,
    /// Distance from the pier line to each bearing line
    #[serde(default)]
    pub bearing_offset: f64,
    /// Interval in which continuity is made
    #[serde(default)]
    pub continuity_interval: Option<IntervalIndex>,
    #[serde(default)]
    pub diaphragm: PierDiaphragm,
}

/// An erection tower
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporarySupportDescription {
    pub station: f64,
    pub installation_interval: IntervalIndex,
    #[serde(default)]
    pub removal_interval: Option<IntervalIndex>,
}

/// Section properties of a cross section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    pub area: f64,
    pub inertia: f64,
    /// Section modulus to the top fiber
    pub s_top: f64,
    /// Section modulus to the bottom fiber
    pub s_bottom: f64,
}

/// A cross section that applies from `x` (measured from the segment start)
/// up to the next section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDescription {
    pub x: f64,
    #[serde(flatten)]
    pub properties: SectionProperties,
    /// Properties once the deck is composite
    #[serde(default)]
    pub composite: Option<SectionProperties>,
}

/// Modulus of elasticity from an interval on
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModulusEntry {
    pub interval: IntervalIndex,
    pub value: f64,
}

/// A concentrated weight at `x` from the segment start
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointWeight {
    pub x: f64,
    pub weight: f64,
}

/// Effective pretension force and its eccentricity (positive below the centroid)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pretension {
    pub force: f64,
    pub eccentricity: f64,
}

/// A precast girder segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentDescription {
    pub start: f64,
    pub end: f64,
    pub sections: Vec<SectionDescription>,
    /// Unit weight of the concrete (N/m³)
    pub unit_weight: f64,
    pub modulus: Vec<ModulusEntry>,
    pub release_interval: IntervalIndex,
    pub storage_interval: IntervalIndex,
    pub erection_interval: IntervalIndex,
    /// Distance from each end to its storage support
    #[serde(default)]
    pub storage_supports: [f64; 2],
    #[serde(default)]
    pub precast_diaphragms: Vec<PointWeight>,
    /// Diaphragms cast with the deck
    #[serde(default)]
    pub intermediate_diaphragms: Vec<PointWeight>,
    #[serde(default)]
    pub pretension: Option<Pretension>,
}

impl SegmentDescription {
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Section in effect at `x` from the segment start
    pub fn section_at(&self, x: f64) -> Option<&SectionDescription> {
        self.sections
            .iter()
            .take_while(|s| s.x <= x + 1.0e-9)
            .last()
            .or_else(|| self.sections.first())
    }

    /// Section properties at `x` from the segment start in an interval
    pub fn properties_at(&self, x: f64, composite: bool) -> Option<SectionProperties> {
        self.section_at(x).map(|s| match (composite, s.composite) {
            (true, Some(c)) => c,
            _ => s.properties,
        })
    }

    /// Modulus of elasticity in an interval
    pub fn modulus_at(&self, interval: IntervalIndex) -> f64 {
        self.modulus
            .iter()
            .filter(|m| m.interval <= interval)
            .last()
            .or_else(|| self.modulus.first())
            .map_or(0.0, |m| m.value)
    }

    /// Positions along the girder line where the section changes
    pub fn section_breaks(&self) -> impl Iterator<Item = f64> + '_ {
        self.sections
            .iter()
            .filter(move |s| s.x > 0.0 && s.x < self.length())
            .map(move |s| self.start + s.x)
    }

    /// Storage support positions along the girder line
    pub fn storage_locations(&self) -> (f64, f64) {
        (
            self.start + self.storage_supports[0],
            self.end - self.storage_supports[1],
        )
    }
}

/// A cast-in-place closure joint between two segments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosureDescription {
    /// Segment the closure follows
    pub after_segment: usize,
    pub interval: IntervalIndex,
    pub properties: SectionProperties,
    pub modulus: f64,
    pub unit_weight: f64,
}

/// Effective tendon force from an interval on
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TendonForce {
    pub interval: IntervalIndex,
    pub force: f64,
}

/// Tendon eccentricity (positive below the centroid) at a station
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TendonPoint {
    pub x: f64,
    pub eccentricity: f64,
}

/// A post-tensioning tendon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TendonDescription {
    pub stressing_interval: IntervalIndex,
    pub forces: Vec<TendonForce>,
    pub profile: Vec<TendonPoint>,
}

impl TendonDescription {
    /// Effective force in an interval
    pub fn force_at(&self, interval: IntervalIndex) -> f64 {
        if interval < self.stressing_interval {
            return 0.0;
        }
        self.forces
            .iter()
            .filter(|f| f.interval <= interval)
            .last()
            .map_or(0.0, |f| f.force)
    }

    /// Eccentricity at a station, linear between profile points
    pub fn eccentricity_at(&self, x: f64) -> f64 {
        interpolate(&self.profile, x, |p| (p.x, p.eccentricity))
    }
}

/// Haunch depth at a station
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HaunchPoint {
    pub x: f64,
    pub depth: f64,
}

/// Skew correction of the shear distribution factor at the span ends
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SkewShearCorrection {
    pub start: f64,
    pub end: f64,
}

/// Live load distribution factors of a span
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpanDistribution {
    pub pos_moment: f64,
    pub neg_moment: f64,
    pub shear: f64,
    pub deflection: f64,
    pub fatigue_moment: f64,
    pub fatigue_shear: f64,
    #[serde(default)]
    pub skew: Option<SkewShearCorrection>,
}

impl Default for SpanDistribution {
    fn default() -> Self {
        Self {
            pos_moment: 1.0,
            neg_moment: 1.0,
            shear: 1.0,
            deflection: 1.0,
            fatigue_moment: 1.0,
            fatigue_shear: 1.0,
            skew: None,
        }
    }
}

/// Live load distribution factors at a pier
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PierDistribution {
    /// Negative moment factor at the back face
    pub back_neg_moment: f64,
    /// Negative moment factor at the ahead face
    pub ahead_neg_moment: f64,
    pub reaction: f64,
}

impl Default for PierDistribution {
    fn default() -> Self {
        Self {
            back_neg_moment: 1.0,
            ahead_neg_moment: 1.0,
            reaction: 1.0,
        }
    }
}

/// Distribution factor inputs of a girder line, by span and by pier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistributionInputs {
    #[serde(default)]
    pub spans: Vec<SpanDistribution>,
    #[serde(default)]
    pub piers: Vec<PierDistribution>,
}

impl DistributionInputs {
    pub fn span(&self, span: usize) -> SpanDistribution {
        self.spans.get(span).copied().unwrap_or_default()
    }

    pub fn pier(&self, pier: usize) -> PierDistribution {
        self.piers.get(pier).copied().unwrap_or_default()
    }
}

/// One girder of the bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GirderLineDescription {
    pub segments: Vec<SegmentDescription>,
    #[serde(default)]
    pub closures: Vec<ClosureDescription>,
    #[serde(default)]
    pub tendons: Vec<TendonDescription>,
    /// Width of deck carried by the girder
    pub tributary_width: f64,
    #[serde(default)]
    pub haunch: Vec<HaunchPoint>,
    /// Shear key weight (N/m)
    #[serde(default)]
    pub shear_key_load: f64,
    /// Longitudinal joint weight (N/m)
    #[serde(default)]
    pub longitudinal_joint_load: f64,
    #[serde(default)]
    pub distribution: DistributionInputs,
}

impl GirderLineDescription {
    /// Start of the first segment
    pub fn start(&self) -> f64 {
        self.segments.first().map_or(0.0, |s| s.start)
    }

    /// End of the last segment
    pub fn end(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.end)
    }

    /// Index of the segment containing `x`
    pub fn segment_at(&self, x: f64) -> Option<usize> {
        self.segments
            .iter()
            .position(|s| x >= s.start - 1.0e-9 && x <= s.end + 1.0e-9)
    }

    /// Haunch depth at a station
    pub fn haunch_at(&self, x: f64) -> f64 {
        interpolate(&self.haunch, x, |h| (h.x, h.depth))
    }

    pub fn closure_after(&self, segment: usize) -> Option<&ClosureDescription> {
        self.closures.iter().find(|c| c.after_segment == segment)
    }
}

/// Stay-in-place deck panels
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeckPanel {
    /// Weight per unit area (N/m²)
    pub weight: f64,
    /// Width of panel carried by each girder
    pub width: f64,
}

/// Cast-in-place deck slab
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckDescription {
    pub thickness: f64,
    pub unit_weight: f64,
    /// Width of the haunch over the girder
    #[serde(default)]
    pub haunch_width: f64,
    #[serde(default)]
    pub minimum_haunch: f64,
    #[serde(default)]
    pub panel: Option<DeckPanel>,
}

/// How barrier and sidewalk weights are shared among girders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarrierDistribution {
    /// Evenly to every girder
    AllGirders,
    /// Evenly to the given number of girders nearest each barrier
    NearestGirders(usize),
}

/// Barriers and sidewalks on both sides of the bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RailingSystem {
    /// Weight of one barrier (N/m)
    pub barrier_weight: f64,
    /// Weight of one sidewalk (N/m)
    pub sidewalk_weight: f64,
    pub sidewalk_width: f64,
    pub distribution: BarrierDistribution,
    /// Pedestrian load (N/m²)
    pub pedestrian_load: f64,
    /// Narrowest sidewalk that carries pedestrian load
    pub minimum_sidewalk_width: f64,
    /// Transverse position of each girder line from the left deck edge
    #[serde(default)]
    pub girder_offsets: Vec<f64>,
    #[serde(default)]
    pub deck_width: f64,
    /// Distance from a deck edge to the center of gravity of its barrier
    /// and sidewalk
    #[serde(default)]
    pub barrier_offset: f64,
}

impl RailingSystem {
    /// Transverse positions of the left and right barriers, when the girder
    /// lines are located
    pub fn barrier_positions(&self, count: usize) -> Option<(f64, f64)> {
        (self.deck_width > 0.0 && self.girder_offsets.len() >= count)
            .then(|| (self.barrier_offset, self.deck_width - self.barrier_offset))
    }
}

impl Default for RailingSystem {
    fn default() -> Self {
        Self {
            barrier_weight: 0.0,
            sidewalk_weight: 0.0,
            sidewalk_width: 0.0,
            distribution: BarrierDistribution::AllGirders,
            pedestrian_load: 3.6e3,
            minimum_sidewalk_width: 0.6,
            girder_offsets: Vec::new(),
            deck_width: 0.0,
            barrier_offset: 0.0,
        }
    }
}

/// Wearing surface
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OverlayDescription {
    /// Weight per unit area (N/m²)
    pub weight: f64,
    /// A future overlay is left out of load rating
    #[serde(default)]
    pub is_future: bool,
}

/// Dead load category of a user load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserLoadCategory {
    DC,
    DW,
    LLIM,
}

/// Shape of a user load
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum UserLoadKind {
    /// Downward force at a station
    Point { x: f64, force: f64 },
    /// Downward linearly varying load between two stations
    Distributed { x1: f64, x2: f64, w1: f64, w2: f64 },
    /// Counter-clockwise moment at a station
    Moment { x: f64, moment: f64 },
}

/// A load entered by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLoad {
    /// Girder line loaded, every girder line if none
    #[serde(default)]
    pub girder_line: Option<usize>,
    pub interval: IntervalIndex,
    pub category: UserLoadCategory,
    pub kind: UserLoadKind,
}

/// Time-dependent effect of a strain load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeDependentEffect {
    Creep,
    Shrinkage,
    Relaxation,
}

/// Imposed strain from time-step analysis between two stations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeDependentStrain {
    #[serde(default)]
    pub girder_line: Option<usize>,
    pub interval: IntervalIndex,
    pub effect: TimeDependentEffect,
    pub x1: f64,
    pub x2: f64,
    pub axial_strain: f64,
    pub curvature: f64,
}

/// Results of time-step material analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeDependentLoads {
    pub strains: Vec<TimeDependentStrain>,
}

/// Axle of a user-defined vehicle
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AxleDescription {
    pub weight: f64,
    #[serde(default)]
    pub spacing: f64,
}

/// A user-defined vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleDescription {
    pub name: String,
    pub axles: Vec<AxleDescription>,
    #[serde(default)]
    pub variable_axle: Option<usize>,
    #[serde(default)]
    pub max_spacing: f64,
    #[serde(default)]
    pub lane_load: f64,
    pub configuration: VehicularLoadConfiguration,
}

/// A vehicle of a live load model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VehicleSpec {
    /// Design truck and design tandem with lane, and the dual truck train
    Hl93,
    /// Fatigue truck
    Hl93Fatigue,
    /// AASHTO legal load Type 3
    Type3,
    /// AASHTO legal load Type 3S2
    Type3S2,
    /// AASHTO legal load Type 3-3
    Type33,
    /// Emergency vehicle EV2
    Ev2,
    /// Emergency vehicle EV3
    Ev3,
    User(VehicleDescription),
}

/// Vehicles and dynamic load allowance of one live load model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveLoadModelSettings {
    pub vehicles: Vec<VehicleSpec>,
    #[serde(default)]
    pub truck_impact: f64,
    #[serde(default)]
    pub lane_impact: f64,
}

/// Truck-weight dependent live load factor for load rating
///
/// The factor is interpolated linearly in ADTT between the two traffic
/// bounds and in gross vehicle weight between the two weight bounds; values
/// outside the bounds are clamped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LiveLoadFactorModel {
    /// Lower and upper ADTT bounds
    pub adtt: [f64; 2],
    /// Lower and upper gross vehicle weight bounds (N)
    pub weight: [f64; 2],
    /// Factors indexed by `[adtt bound][weight bound]`
    pub factors: [[f64; 2]; 2],
}

impl LiveLoadFactorModel {
    /// Factor that only depends on ADTT
    pub fn by_adtt(adtt: [f64; 2], factors: [f64; 2]) -> Self {
        Self {
            adtt,
            weight: [0.0, 0.0],
            factors: [[factors[0]; 2], [factors[1]; 2]],
        }
    }

    /// Live load factor for a gross vehicle weight
    pub fn strength_factor(&self, adtt: f64, weight: f64) -> f64 {
        let t_adtt = ratio(adtt, self.adtt);
        let t_weight = ratio(weight, self.weight);
        let at_adtt = |w: usize| {
            self.factors[0][w] + (self.factors[1][w] - self.factors[0][w]) * t_adtt
        };
        at_adtt(0) + (at_adtt(1) - at_adtt(0)) * t_weight
    }
}

/// Load rating inputs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingSettings {
    /// Live load factor overrides; a negative factor is computed from truck weight
    #[serde(default)]
    pub live_load_factors: BTreeMap<LimitState, f64>,
    /// Weight-dependent factor models by live load type
    #[serde(default)]
    pub factor_models: BTreeMap<LiveLoadType, LiveLoadFactorModel>,
    /// Pedestrian load is added to the rating vehicles
    #[serde(default)]
    pub include_pedestrian: bool,
}

/// How pedestrian load joins the vehicles of a live load type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PedestrianApplication {
    DontApply,
    Concurrent,
    Envelope,
}

impl PedestrianApplication {
    pub fn combination(self) -> Option<LiveLoadApplication> {
        match self {
            Self::DontApply => None,
            Self::Concurrent => Some(LiveLoadApplication::Sum),
            Self::Envelope => Some(LiveLoadApplication::Envelope),
        }
    }
}

fn default_pedestrian_application() -> BTreeMap<LiveLoadType, PedestrianApplication> {
    BTreeMap::from([
        (LiveLoadType::Design, PedestrianApplication::Concurrent),
        (LiveLoadType::Permit, PedestrianApplication::Concurrent),
        (LiveLoadType::Fatigue, PedestrianApplication::DontApply),
    ])
}

/// Live load definition of the bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveLoadSettings {
    pub models: BTreeMap<LiveLoadType, LiveLoadModelSettings>,
    /// Average daily truck traffic
    #[serde(default)]
    pub adtt: f64,
    #[serde(default)]
    pub rating: RatingSettings,
    /// Pedestrian application of the design, permit and fatigue live loads
    #[serde(default = "default_pedestrian_application")]
    pub pedestrian_application: BTreeMap<LiveLoadType, PedestrianApplication>,
}

impl LiveLoadSettings {
    /// Pedestrian application for the vehicles of a limit state. Rating
    /// vehicles follow [`RatingSettings::include_pedestrian`].
    pub fn pedestrian_for(&self, limit_state: LimitState) -> Option<LiveLoadApplication> {
        if limit_state.is_rating() {
            return self
                .rating
                .include_pedestrian
                .then_some(LiveLoadApplication::Sum);
        }
        self.pedestrian_application
            .get(&limit_state.live_load_type())
            .and_then(|application| application.combination())
    }
}

impl Default for LiveLoadSettings {
    fn default() -> Self {
        let mut models = BTreeMap::new();
        models.insert(
            LiveLoadType::Design,
            LiveLoadModelSettings {
                vehicles: vec![VehicleSpec::Hl93],
                truck_impact: 0.33,
                lane_impact: 0.0,
            },
        );
        models.insert(
            LiveLoadType::Fatigue,
            LiveLoadModelSettings {
                vehicles: vec![VehicleSpec::Hl93Fatigue],
                truck_impact: 0.15,
                lane_impact: 0.0,
            },
        );
        Self {
            models,
            adtt: 0.0,
            rating: RatingSettings::default(),
            pedestrian_application: default_pedestrian_application(),
        }
    }
}

/// A complete bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeDescription {
    #[serde(default)]
    pub name: String,
    pub intervals: Vec<IntervalDescription>,
    pub events: TimelineEvents,
    pub piers: Vec<PierDescription>,
    #[serde(default)]
    pub temporary_supports: Vec<TemporarySupportDescription>,
    pub girder_lines: Vec<GirderLineDescription>,
    #[serde(default)]
    pub deck: Option<DeckDescription>,
    #[serde(default)]
    pub railing: RailingSystem,
    #[serde(default)]
    pub overlay: Option<OverlayDescription>,
    /// Construction load on the deck (N/m²)
    #[serde(default)]
    pub construction_load: f64,
    #[serde(default)]
    pub user_loads: Vec<UserLoad>,
    /// Present when a time-step analysis was made
    #[serde(default)]
    pub time_dependent: Option<TimeDependentLoads>,
    #[serde(default)]
    pub live_load: LiveLoadSettings,
}

fn ratio(value: f64, bounds: [f64; 2]) -> f64 {
    if bounds[1] <= bounds[0] {
        return if value >= bounds[1] { 1.0 } else { 0.0 };
    }
    ((value - bounds[0]) / (bounds[1] - bounds[0])).clamp(0.0, 1.0)
}

/// Linear interpolation through points sorted by x, constant beyond the ends
pub(crate) fn interpolate<T>(points: &[T], x: f64, f: impl Fn(&T) -> (f64, f64)) -> f64 {
    let mut prev: Option<(f64, f64)> = None;
    for p in points {
        let (px, pv) = f(p);
        if x <= px {
            return match prev {
                Some((x0, v0)) if px > x0 => v0 + (pv - v0) * (x - x0) / (px - x0),
                _ => pv,
            };
        }
        prev = Some((px, pv));
    }
    prev.map_or(0.0, |(_, v)| v)
}
