//! Result types for staged analysis

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Index of a point of interest in the model
pub type PoiId = usize;

/// Side of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    /// Face of the body left of the section
    Left,
    /// Face of the body right of the section
    Right,
}

/// Result quantity at a point of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForceEffect {
    /// Axial force
    Fx,
    /// Transverse force
    Fy,
    /// Moment
    Mz,
    /// Vertical displacement
    Dy,
    /// Rotation
    Rz,
}

impl ForceEffect {
    /// Check whether the effect is two-sided at a section
    pub fn is_force(&self) -> bool {
        matches!(self, Self::Fx | Self::Fy | Self::Mz)
    }
}

/// A result with distinct values on the two faces of a section
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionValue {
    pub left: f64,
    pub right: f64,
}

impl SectionValue {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Same value on both faces
    pub fn both(value: f64) -> Self {
        Self::new(value, value)
    }

    /// Value on one face
    pub fn face(&self, face: Face) -> f64 {
        match face {
            Face::Left => self.left,
            Face::Right => self.right,
        }
    }
}

impl Add for SectionValue {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.left + rhs.left, self.right + rhs.right)
    }
}

impl Sub for SectionValue {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.left - rhs.left, self.right - rhs.right)
    }
}

impl AddAssign for SectionValue {
    fn add_assign(&mut self, rhs: Self) {
        self.left += rhs.left;
        self.right += rhs.right;
    }
}

impl Mul<f64> for SectionValue {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.left * rhs, self.right * rhs)
    }
}

impl Neg for SectionValue {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.left, -self.right)
    }
}

/// Internal forces at a point of interest.
///
/// The left face carries the force the left body receives from the right
/// body: `fx.left` is tension positive, `mz.left` is sagging positive and
/// `fy.left` is the negative of the beam shear. Right-face values are the
/// equal and opposite forces on the right body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionForces {
    pub fx: SectionValue,
    pub fy: SectionValue,
    pub mz: SectionValue,
}

impl SectionForces {
    pub(crate) fn from_faces(left: [f64; 3], right: [f64; 3]) -> Self {
        Self {
            fx: SectionValue::new(left[0], right[0]),
            fy: SectionValue::new(left[1], right[1]),
            mz: SectionValue::new(left[2], right[2]),
        }
    }

    /// Value of a force effect
    pub fn effect(&self, effect: ForceEffect) -> SectionValue {
        match effect {
            ForceEffect::Fx => self.fx,
            ForceEffect::Fy => self.fy,
            _ => self.mz,
        }
    }
}

impl Add for SectionForces {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            fx: self.fx + rhs.fx,
            fy: self.fy + rhs.fy,
            mz: self.mz + rhs.mz,
        }
    }
}

impl AddAssign for SectionForces {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<f64> for SectionForces {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self {
            fx: self.fx * rhs,
            fy: self.fy * rhs,
            mz: self.mz * rhs,
        }
    }
}

/// Displacement at a point of interest
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoiDisplacement {
    /// Vertical displacement, positive up
    pub dy: f64,
    /// Rotation, counter-clockwise positive
    pub rz: f64,
}

impl Add for PoiDisplacement {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            dy: self.dy + rhs.dy,
            rz: self.rz + rhs.rz,
        }
    }
}

impl AddAssign for PoiDisplacement {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<f64> for PoiDisplacement {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self {
            dy: self.dy * rhs,
            rz: self.rz * rhs,
        }
    }
}

/// Reaction forces at a support
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// Reaction force along the line
    pub fx: f64,
    /// Vertical reaction force, positive up
    pub fy: f64,
    /// Reaction moment
    pub mz: f64,
}

impl Reaction {
    /// Create from array [FX, FY, MZ]
    pub fn from_array(arr: [f64; 3]) -> Self {
        Self {
            fx: arr[0],
            fy: arr[1],
            mz: arr[2],
        }
    }

    /// Get the reaction as an array [FX, FY, MZ]
    pub fn as_array(&self) -> [f64; 3] {
        [self.fx, self.fy, self.mz]
    }
}

impl Add for Reaction {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            fx: self.fx + rhs.fx,
            fy: self.fy + rhs.fy,
            mz: self.mz + rhs.mz,
        }
    }
}

impl AddAssign for Reaction {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<f64> for Reaction {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self {
            fx: self.fx * rhs,
            fy: self.fy * rhs,
            mz: self.mz * rhs,
        }
    }
}

/// Location and weight of one axle of a placed vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxlePlacement {
    /// Applied weight; zero for axles that are off the structure or picked up
    pub weight: f64,
    /// Location along the line
    pub location: f64,
}

/// The vehicle position that produced a live load result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxleConfiguration {
    /// Index of the vehicle in its live load model
    pub vehicle: usize,
    /// Name of the vehicle
    pub vehicle_name: String,
    /// One entry per axle, front to back
    pub axles: Vec<AxlePlacement>,
    /// Vehicle travels towards decreasing x
    pub reversed: bool,
    /// Axle spacings used for this placement
    pub spacings: Vec<f64>,
    /// Side of an influence line discontinuity an axle sits on
    pub side: Face,
    /// Whether the truck part contributes
    pub truck_applied: bool,
    /// Loaded lane regions [start, end]
    pub lane_regions: Vec<(f64, f64)>,
    /// Lane load intensity
    pub lane_load: f64,
}

impl AxleConfiguration {
    /// Sum of the applied axle weights
    pub fn total_weight(&self) -> f64 {
        self.axles.iter().map(|a| a.weight).sum()
    }
}

/// Governing live load response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveLoadResult {
    /// Response value
    pub value: f64,
    /// Governing vehicle and its placement, if any vehicle contributes
    pub configuration: Option<AxleConfiguration>,
}

impl LiveLoadResult {
    /// A result with no contributing vehicle
    pub fn none() -> Self {
        Self {
            value: 0.0,
            configuration: None,
        }
    }
}

/// Flags that control live load responses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveLoadQuery {
    /// Restrict the search to one vehicle of the model
    pub vehicle: Option<usize>,
    /// Apply the dynamic load allowance
    pub include_impact: bool,
    /// Apply distribution factors
    pub include_distribution: bool,
}

impl Default for LiveLoadQuery {
    fn default() -> Self {
        Self {
            vehicle: None,
            include_impact: true,
            include_distribution: true,
        }
    }
}

impl LiveLoadQuery {
    /// Query for a single vehicle
    pub fn vehicle(index: usize) -> Self {
        Self {
            vehicle: Some(index),
            ..Self::default()
        }
    }

    /// Set impact and distribution factor flags
    pub fn with_flags(mut self, include_impact: bool, include_distribution: bool) -> Self {
        self.include_impact = include_impact;
        self.include_distribution = include_distribution;
        self
    }
}

/// Result of a load combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationResult {
    /// Combined value including factored live load
    pub value: f64,
    /// Governing live load response before the live load factor, if the
    /// combination carries live load
    pub live_load: Option<LiveLoadResult>,
}

/// A scalar response the model can report, influence lines included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResponseQuantity {
    /// Force or displacement at a point of interest
    Poi {
        poi: PoiId,
        effect: ForceEffect,
        face: Face,
    },
    /// Sum of the reactions of one or more supports
    Reaction {
        supports: Vec<usize>,
        effect: ForceEffect,
    },
}

impl ResponseQuantity {
    /// Force or displacement at a point of interest
    pub fn poi(poi: PoiId, effect: ForceEffect, face: Face) -> Self {
        Self::Poi { poi, effect, face }
    }

    /// Reaction of a single support
    pub fn reaction(support: usize, effect: ForceEffect) -> Self {
        Self::Reaction {
            supports: vec![support],
            effect,
        }
    }

    /// Effect reported by this quantity
    pub fn effect(&self) -> ForceEffect {
        match self {
            Self::Poi { effect, .. } | Self::Reaction { effect, .. } => *effect,
        }
    }
}

/// Kind of unit load used for unit-load responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitLoad {
    /// Unit downward force
    Force,
    /// Unit counter-clockwise moment
    Moment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_value_arithmetic() {
        let a = SectionValue::new(1.0, -1.0);
        let b = SectionValue::both(2.0);
        assert_eq!(a + b, SectionValue::new(3.0, 1.0));
        assert_eq!(-a * 2.0, SectionValue::new(-2.0, 2.0));
        assert_eq!(a.face(Face::Right), -1.0);
    }
}
