//! Live load distribution factors

use serde::{Deserialize, Serialize};

use super::live_load::DistributionFactorType;

/// Distribution factors at one location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionFactors {
    pub pos_moment: f64,
    pub neg_moment: f64,
    pub shear: f64,
    pub deflection: f64,
    pub reaction: f64,
    pub fatigue_moment: f64,
    pub fatigue_shear: f64,
    /// Carries the pedestrian load magnitude
    pub pedestrian: f64,
}

impl DistributionFactors {
    /// The same factor in every slot
    pub fn uniform(g: f64) -> Self {
        Self {
            pos_moment: g,
            neg_moment: g,
            shear: g,
            deflection: g,
            reaction: g,
            fatigue_moment: g,
            fatigue_shear: g,
            pedestrian: g,
        }
    }

    /// Linear interpolation between two factor sets
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        let f = |a: f64, b: f64| a + (b - a) * t;
        Self {
            pos_moment: f(self.pos_moment, other.pos_moment),
            neg_moment: f(self.neg_moment, other.neg_moment),
            shear: f(self.shear, other.shear),
            deflection: f(self.deflection, other.deflection),
            reaction: f(self.reaction, other.reaction),
            fatigue_moment: f(self.fatigue_moment, other.fatigue_moment),
            fatigue_shear: f(self.fatigue_shear, other.fatigue_shear),
            pedestrian: f(self.pedestrian, other.pedestrian),
        }
    }

    /// Factor for a moment of the given sign
    pub fn moment(&self, kind: DistributionFactorType, positive: bool) -> f64 {
        match kind {
            DistributionFactorType::Strength if positive => self.pos_moment,
            DistributionFactorType::Strength => self.neg_moment,
            DistributionFactorType::Fatigue => self.fatigue_moment,
            DistributionFactorType::Pedestrian => self.pedestrian,
        }
    }

    /// Factor for shear and axial force
    pub fn shear(&self, kind: DistributionFactorType) -> f64 {
        match kind {
            DistributionFactorType::Strength => self.shear,
            DistributionFactorType::Fatigue => self.fatigue_shear,
            DistributionFactorType::Pedestrian => self.pedestrian,
        }
    }

    /// Factor for deflection and rotation
    pub fn deflection(&self, kind: DistributionFactorType) -> f64 {
        match kind {
            DistributionFactorType::Pedestrian => self.pedestrian,
            _ => self.deflection,
        }
    }

    /// Factor for support reactions
    pub fn reaction(&self, kind: DistributionFactorType) -> f64 {
        match kind {
            DistributionFactorType::Pedestrian => self.pedestrian,
            _ => self.reaction,
        }
    }
}

impl Default for DistributionFactors {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

/// A length of the line carrying linearly varying distribution factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionFactorSegment {
    /// Segment length
    pub length: f64,
    /// Factors at the segment start
    pub start: DistributionFactors,
    /// Factors at the segment end
    pub end: DistributionFactors,
}

impl DistributionFactorSegment {
    /// Segment with constant factors
    pub fn constant(length: f64, factors: DistributionFactors) -> Self {
        Self {
            length,
            start: factors,
            end: factors,
        }
    }

    /// Factors at `x` measured from the segment start
    pub fn at(&self, x: f64) -> DistributionFactors {
        if self.length <= 0.0 {
            return self.start;
        }
        self.start.lerp(&self.end, (x / self.length).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_segment_interpolation() {
        let mut end = DistributionFactors::uniform(0.6);
        end.shear = 0.8;
        let seg = DistributionFactorSegment {
            length: 10.0,
            start: DistributionFactors::uniform(0.6),
            end,
        };
        assert_relative_eq!(seg.at(5.0).shear, 0.7);
        assert_relative_eq!(seg.at(5.0).pos_moment, 0.6);
        assert_relative_eq!(seg.at(20.0).shear, 0.8);
    }
}
