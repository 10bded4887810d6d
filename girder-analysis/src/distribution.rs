//! Live load distribution factors along a girder line
//!
//! Each span is split at the contraflexure points of a unit uniform load so
//! that negative moment factors of a pier face apply where the span hogs
//! next to that pier. Shear factors may additionally vary along the span to
//! correct for skew.

use girder_fem::prelude::{DistributionFactorSegment, DistributionFactors, ResultsType};
use log::debug;

use crate::bridge::{
    BridgeProvider, PierConnection, PierDistribution, RailingSystem, SpanDistribution,
};
use crate::builder::ModelTopology;
use crate::error::AnalysisResult;
use crate::layout::{GirderLineLayout, PierLayout};
use crate::loads::dead::railing_fraction;
use crate::structural::StructuralModel;
use crate::types::{ModelKind, SupportLocation};

/// Load group of the unit uniform load locating the contraflexure points
pub const UNIT_LOAD_GROUP: &str = "Unit Uniform Load";

/// Rotational restraint at the two ends of a span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanFixity {
    PinPin,
    PinFix,
    FixPin,
    FixFix,
}

impl SpanFixity {
    pub fn new(start_fixed: bool, end_fixed: bool) -> Self {
        match (start_fixed, end_fixed) {
            (false, false) => Self::PinPin,
            (false, true) => Self::PinFix,
            (true, false) => Self::FixPin,
            (true, true) => Self::FixFix,
        }
    }
}

/// Part of a span governed by one set of moment factors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanRegion {
    /// Negative moment next to the pier at the span start
    StartPier,
    /// Positive moment
    Span,
    /// Negative moment next to the pier at the span end
    EndPier,
}

/// Regions of a span between `xa` and `xb` given the contraflexure points
/// along the line; the midpoint stands in when a fixed span has none
pub fn span_segments(
    xa: f64,
    xb: f64,
    fixity: SpanFixity,
    contraflexure: &[f64],
) -> Vec<(f64, f64, SpanRegion)> {
    let tol = 1.0e-6 * (xb - xa).abs().max(1.0);
    let inside: Vec<f64> = contraflexure
        .iter()
        .copied()
        .filter(|x| *x > xa + tol && *x < xb - tol)
        .collect();
    let mid = 0.5 * (xa + xb);
    let first = inside.first().copied().unwrap_or(mid);
    let last = inside.last().copied().unwrap_or(mid);

    match fixity {
        SpanFixity::PinPin => vec![(xa, xb, SpanRegion::Span)],
        SpanFixity::PinFix => vec![(xa, last, SpanRegion::Span), (last, xb, SpanRegion::EndPier)],
        SpanFixity::FixPin => vec![(xa, first, SpanRegion::StartPier), (first, xb, SpanRegion::Span)],
        SpanFixity::FixFix if inside.len() >= 2 => vec![
            (xa, first, SpanRegion::StartPier),
            (first, last, SpanRegion::Span),
            (last, xb, SpanRegion::EndPier),
        ],
        SpanFixity::FixFix => vec![
            (xa, first, SpanRegion::StartPier),
            (first, xb, SpanRegion::EndPier),
        ],
    }
}

fn factor_set(span: &SpanDistribution, neg_moment: f64, shear_scale: f64, pedestrian: f64) -> DistributionFactors {
    DistributionFactors {
        pos_moment: span.pos_moment,
        neg_moment,
        shear: span.shear * shear_scale,
        deflection: span.deflection,
        reaction: span.shear * shear_scale,
        fatigue_moment: span.fatigue_moment,
        fatigue_shear: span.fatigue_shear * shear_scale,
        pedestrian,
    }
}

/// Distribution factor segments of one span
#[allow(clippy::too_many_arguments)]
pub fn span_distribution(
    xa: f64,
    xb: f64,
    fixity: SpanFixity,
    contraflexure: &[f64],
    span: &SpanDistribution,
    start_pier: &PierDistribution,
    end_pier: &PierDistribution,
    pedestrian: f64,
) -> Vec<DistributionFactorSegment> {
    let mid = 0.5 * (xa + xb);
    let shear_scale = |x: f64| match span.skew {
        Some(skew) if x <= mid => skew.start + (1.0 - skew.start) * (x - xa) / (mid - xa),
        Some(skew) => 1.0 + (skew.end - 1.0) * (x - mid) / (xb - mid),
        None => 1.0,
    };

    let mut pieces = Vec::new();
    for (a, b, region) in span_segments(xa, xb, fixity, contraflexure) {
        if span.skew.is_some() && a < mid && b > mid {
            pieces.push((a, mid, region));
            pieces.push((mid, b, region));
        } else {
            pieces.push((a, b, region));
        }
    }

    pieces
        .into_iter()
        .filter(|(a, b, _)| b > a)
        .map(|(a, b, region)| {
            let neg = match region {
                SpanRegion::StartPier => start_pier.ahead_neg_moment,
                SpanRegion::EndPier => end_pier.back_neg_moment,
                SpanRegion::Span => span.neg_moment,
            };
            DistributionFactorSegment {
                length: b - a,
                start: factor_set(span, neg, shear_scale(a), pedestrian),
                end: factor_set(span, neg, shear_scale(b), pedestrian),
            }
        })
        .collect()
}

/// Pedestrian load carried by a girder line, zero when the sidewalk is too narrow
pub fn pedestrian_intensity(railing: &RailingSystem, girder_line: usize, count: usize) -> f64 {
    if railing.sidewalk_width <= 0.0 || railing.sidewalk_width < railing.minimum_sidewalk_width {
        return 0.0;
    }
    railing.pedestrian_load
        * railing.sidewalk_width
        * railing_fraction(railing, girder_line, count)
}

/// Check whether a span end at a pier is restrained against rotation in a model
fn end_is_fixed(pier: &PierLayout, kind: ModelKind, layout: &GirderLineLayout, span_starts_here: bool) -> bool {
    let tol = layout.tolerance;
    let continuous = kind == ModelKind::Continuous && pier.continuity.is_some();
    match pier.connection {
        PierConnection::ContinuousSegment | PierConnection::IntegralSegment => return true,
        PierConnection::Integral if continuous => return true,
        PierConnection::Continuous
            if continuous && pier.back_segment.is_some() && pier.ahead_segment.is_some() =>
        {
            return true
        }
        _ => {}
    }
    // a modeled cantilever past the bearing of an end pier
    if span_starts_here && pier.back_segment.is_none() {
        if let (Some(s), Some(bearing)) = (pier.ahead_segment, pier.ahead_bearing) {
            return layout.segments[s].model_start < bearing - tol;
        }
    }
    if !span_starts_here && pier.ahead_segment.is_none() {
        if let (Some(s), Some(bearing)) = (pier.back_segment, pier.back_bearing) {
            return layout.segments[s].model_end > bearing + tol;
        }
    }
    false
}

/// Compute and assign distribution factors to an analyzed model
pub fn assign_distribution_factors<M: StructuralModel>(
    model: &mut M,
    bridge: &dyn BridgeProvider,
    layout: &GirderLineLayout,
    topology: &ModelTopology,
) -> AnalysisResult<()> {
    let line = bridge.girder_line(layout.girder_line)?;
    let inputs = &line.distribution;
    let interval = bridge.events().live_load;
    let contraflexure = if model.has_load_group(UNIT_LOAD_GROUP) {
        model.contraflexure_points(interval, UNIT_LOAD_GROUP, ResultsType::Cumulative)?
    } else {
        Vec::new()
    };
    let pedestrian =
        pedestrian_intensity(bridge.railing(), layout.girder_line, bridge.girder_line_count());

    let mut segments: Vec<DistributionFactorSegment> = Vec::new();
    for (i, pair) in layout.piers.windows(2).enumerate() {
        let (start, end) = (&pair[0], &pair[1]);
        let fixity = SpanFixity::new(
            end_is_fixed(start, topology.kind, layout, true),
            end_is_fixed(end, topology.kind, layout, false),
        );
        let span = span_distribution(
            start.station,
            end.station,
            fixity,
            &contraflexure,
            &inputs.span(i),
            &inputs.pier(start.index),
            &inputs.pier(end.index),
            pedestrian,
        );
        debug!(
            "{:?} model span {i}: {fixity:?}, {} distribution factor segments",
            topology.kind,
            span.len()
        );
        if i == 0 && start.station > 0.0 {
            if let Some(first) = span.first() {
                segments.push(DistributionFactorSegment::constant(start.station, first.start));
            }
        }
        segments.extend(span);
    }
    model.set_distribution_factors(segments);

    for support in &topology.supports {
        let span = inputs.span(bridge.span_at(support.x));
        let mut factors = factor_set(&span, span.neg_moment, 1.0, pedestrian);
        if let SupportLocation::Pier(p) = support.location {
            factors.reaction = inputs.pier(p).reaction;
        }
        model.set_support_distribution_factors(support.id, factors)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{BarrierDistribution, SkewShearCorrection};
    use approx::assert_relative_eq;

    #[test]
    fn test_fix_fix_span_with_two_contraflexure_points() {
        let segs = span_segments(10.0, 40.0, SpanFixity::FixFix, &[5.0, 16.0, 34.0, 44.0]);
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[0], (10.0, 16.0, SpanRegion::StartPier));
        assert_eq!(segs[1], (16.0, 34.0, SpanRegion::Span));
        assert_eq!(segs[2], (34.0, 40.0, SpanRegion::EndPier));
        let total: f64 = segs.iter().map(|(a, b, _)| b - a).sum();
        assert_relative_eq!(total, 30.0);
    }

    #[test]
    fn test_fixed_span_without_contraflexure_splits_at_midspan() {
        let segs = span_segments(0.0, 20.0, SpanFixity::PinFix, &[]);
        assert_eq!(segs, vec![(0.0, 10.0, SpanRegion::Span), (10.0, 20.0, SpanRegion::EndPier)]);
        assert_eq!(span_segments(0.0, 20.0, SpanFixity::PinPin, &[4.0]).len(), 1);
    }

    #[test]
    fn test_pier_face_negative_moment_factors() {
        let span = SpanDistribution {
            neg_moment: 0.55,
            ..SpanDistribution::default()
        };
        let start = PierDistribution {
            ahead_neg_moment: 0.71,
            ..PierDistribution::default()
        };
        let end = PierDistribution {
            back_neg_moment: 0.64,
            ..PierDistribution::default()
        };
        let segs = span_distribution(0.0, 30.0, SpanFixity::FixFix, &[6.0, 24.0], &span, &start, &end, 0.0);
        assert_eq!(segs.len(), 3);
        assert_relative_eq!(segs[0].start.neg_moment, 0.71);
        assert_relative_eq!(segs[1].start.neg_moment, 0.55);
        assert_relative_eq!(segs[2].end.neg_moment, 0.64);
        let total: f64 = segs.iter().map(|s| s.length).sum();
        assert_relative_eq!(total, 30.0);
    }

    #[test]
    fn test_skew_varies_shear_to_midspan() {
        let span = SpanDistribution {
            shear: 0.8,
            skew: Some(SkewShearCorrection { start: 1.2, end: 1.1 }),
            ..SpanDistribution::default()
        };
        let pier = PierDistribution::default();
        let segs = span_distribution(0.0, 20.0, SpanFixity::PinPin, &[], &span, &pier, &pier, 0.0);
        assert_eq!(segs.len(), 2);
        assert_relative_eq!(segs[0].start.shear, 0.96);
        assert_relative_eq!(segs[0].end.shear, 0.8);
        assert_relative_eq!(segs[1].end.shear, 0.88);
    }

    #[test]
    fn test_pedestrian_needs_a_wide_sidewalk() {
        let mut railing = RailingSystem {
            sidewalk_width: 1.5,
            distribution: BarrierDistribution::AllGirders,
            ..RailingSystem::default()
        };
        assert_relative_eq!(pedestrian_intensity(&railing, 0, 4), 3.6e3 * 1.5 * 0.5);
        railing.sidewalk_width = 0.3;
        assert_eq!(pedestrian_intensity(&railing, 0, 4), 0.0);
    }
}
