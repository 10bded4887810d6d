//! Permanent loads: self-weight, diaphragms, deck, railing, overlay and user loads

use log::debug;

use crate::bridge::{
    BarrierDistribution, BridgeProvider, GirderLineDescription, RailingSystem, UserLoadCategory,
    UserLoadKind,
};
use crate::error::AnalysisResult;
use crate::status::{StatusCategory, StatusItem, StatusSink};
use crate::structural::StructuralModel;
use crate::types::{Named, ProductLoad};

use super::LoadApplicator;

/// Share of the two barriers (or sidewalks) carried by a girder line
///
/// With `NearestGirders(n)` each barrier goes to the `n` girder lines closest
/// to its center of gravity. Without girder offsets the exterior lines are
/// taken by index.
pub fn railing_fraction(railing: &RailingSystem, girder_line: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let n = match railing.distribution {
        BarrierDistribution::AllGirders => return 2.0 / count as f64,
        BarrierDistribution::NearestGirders(n) => n.clamp(1, count),
    };
    let (left, right) = match railing.barrier_positions(count) {
        Some((left, right)) => {
            let offsets = &railing.girder_offsets[..count];
            (
                nearest_lines(offsets, left, 0..count),
                nearest_lines(offsets, right, (0..count).rev()),
            )
        }
        None => ((0..count).collect(), (0..count).rev().collect()),
    };
    let share = |lines: &[usize]| {
        if lines[..n].contains(&girder_line) {
            1.0 / n as f64
        } else {
            0.0
        }
    };
    share(&left) + share(&right)
}

/// Girder lines by distance from `at`; ties keep the order of `lines`
fn nearest_lines(offsets: &[f64], at: f64, lines: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut lines: Vec<usize> = lines.collect();
    lines.sort_by(|a, b| (offsets[*a] - at).abs().total_cmp(&(offsets[*b] - at).abs()));
    lines
}

/// Apply every permanent load of a girder line
pub fn apply_dead_loads<M: StructuralModel>(
    applicator: &mut LoadApplicator<'_, M>,
    bridge: &dyn BridgeProvider,
    girder_line: usize,
    status: &dyn StatusSink,
) -> AnalysisResult<()> {
    let line = bridge.girder_line(girder_line)?;
    girder_self_weight(applicator, line)?;
    diaphragms(applicator, bridge, line)?;
    deck(applicator, bridge, line, girder_line, status)?;
    railing(applicator, bridge, line, girder_line)?;
    overlay(applicator, bridge, line)?;
    user_loads(applicator, bridge, girder_line)?;
    Ok(())
}

/// Segment and closure self-weight, applied when each is placed
pub fn girder_self_weight<M: StructuralModel>(
    applicator: &mut LoadApplicator<'_, M>,
    line: &GirderLineDescription,
) -> AnalysisResult<()> {
    let group = ProductLoad::Girder.name();
    for seg in &line.segments {
        let length = seg.length();
        let mut breaks: Vec<f64> = seg.sections.iter().map(|s| s.x.clamp(0.0, length)).collect();
        breaks.push(0.0);
        breaks.push(length);
        breaks.sort_by(f64::total_cmp);
        breaks.dedup();
        for pair in breaks.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let area = seg.properties_at(0.5 * (a + b), false).map_or(0.0, |p| p.area);
            let w = seg.unit_weight * area;
            applicator.gravity(group, seg.erection_interval, seg.start + a, seg.start + b, w, w)?;
        }
    }
    for closure in &line.closures {
        let (Some(back), Some(ahead)) = (
            line.segments.get(closure.after_segment),
            line.segments.get(closure.after_segment + 1),
        ) else {
            continue;
        };
        let w = closure.unit_weight * closure.properties.area;
        applicator.gravity(group, closure.interval, back.end, ahead.start, w, w)?;
    }
    Ok(())
}

fn diaphragms<M: StructuralModel>(
    applicator: &mut LoadApplicator<'_, M>,
    bridge: &dyn BridgeProvider,
    line: &GirderLineDescription,
) -> AnalysisResult<()> {
    let group = ProductLoad::Diaphragm.name();
    let casting = bridge.events().deck_casting;
    let layout = applicator.layout;
    for seg in &line.segments {
        for d in &seg.precast_diaphragms {
            applicator.point(group, seg.erection_interval, seg.start + d.x, 0.0, -d.weight, 0.0)?;
        }
        for d in &seg.intermediate_diaphragms {
            applicator.point(group, casting, seg.start + d.x, 0.0, -d.weight, 0.0)?;
        }
    }

    for (pier, at) in bridge.piers().iter().zip(&layout.piers) {
        let interval = at.continuity.unwrap_or(casting);
        let w = pier.diaphragm;
        if !at.has_girder_ends() {
            let weight = w.back_weight + w.ahead_weight;
            applicator.point(group, interval, at.station, 0.0, -weight, 0.0)?;
            continue;
        }
        let back_end = at.back_segment.map(|s| layout.segments[s].end);
        let ahead_start = at.ahead_segment.map(|s| layout.segments[s].start);
        if let Some(x) = back_end {
            applicator.point(group, interval, x, 0.0, -w.back_weight, 0.0)?;
        }
        if let Some(x) = ahead_start {
            applicator.point(group, interval, x, 0.0, -w.ahead_weight, 0.0)?;
        }
    }
    Ok(())
}

fn deck<M: StructuralModel>(
    applicator: &mut LoadApplicator<'_, M>,
    bridge: &dyn BridgeProvider,
    line: &GirderLineDescription,
    girder_line: usize,
    status: &dyn StatusSink,
) -> AnalysisResult<()> {
    let events = bridge.events();
    let (x1, x2) = (line.start(), line.end());

    let construction = bridge.construction_load() * line.tributary_width;
    applicator.gravity(
        ProductLoad::ConstructionLoad.name(),
        events.deck_casting,
        x1,
        x2,
        construction,
        construction,
    )?;
    applicator.gravity(
        ProductLoad::ShearKey.name(),
        events.deck_casting,
        x1,
        x2,
        line.shear_key_load,
        line.shear_key_load,
    )?;
    applicator.gravity(
        ProductLoad::LongitudinalJoint.name(),
        events.deck_casting,
        x1,
        x2,
        line.longitudinal_joint_load,
        line.longitudinal_joint_load,
    )?;

    let Some(deck) = bridge.deck() else {
        debug!("girder line {girder_line} has no deck");
        return Ok(());
    };

    let slab = deck.thickness * deck.unit_weight * line.tributary_width;
    applicator.gravity(ProductLoad::Slab.name(), events.deck_casting, x1, x2, slab, slab)?;

    if let Some(panel) = deck.panel {
        let w = panel.weight * panel.width;
        applicator.gravity(ProductLoad::SlabPanel.name(), events.deck_casting, x1, x2, w, w)?;
    }

    // haunch varies linearly between its points
    let pad = deck.unit_weight * deck.haunch_width;
    let mut stations: Vec<f64> = vec![x1, x2];
    stations.extend(line.haunch.iter().map(|h| h.x).filter(|x| *x > x1 && *x < x2));
    stations.sort_by(f64::total_cmp);
    stations.dedup();
    for pair in stations.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        applicator.gravity(
            ProductLoad::SlabPad.name(),
            events.deck_casting,
            a,
            b,
            pad * line.haunch_at(a),
            pad * line.haunch_at(b),
        )?;
    }

    if let Some(thin) = line
        .haunch
        .iter()
        .find(|h| h.depth < deck.minimum_haunch - applicator.layout.tolerance)
    {
        status.report(StatusItem::warning(
            girder_line,
            StatusCategory::MinimumHaunch,
            format!(
                "haunch depth {:.4} at x = {:.3} is less than the minimum of {:.4}",
                thin.depth, thin.x, deck.minimum_haunch
            ),
        ));
    }
    Ok(())
}

fn railing<M: StructuralModel>(
    applicator: &mut LoadApplicator<'_, M>,
    bridge: &dyn BridgeProvider,
    line: &GirderLineDescription,
    girder_line: usize,
) -> AnalysisResult<()> {
    let railing = bridge.railing();
    let interval = bridge.events().railing_system;
    let fraction = railing_fraction(railing, girder_line, bridge.girder_line_count());
    let (x1, x2) = (line.start(), line.end());

    let barrier = railing.barrier_weight * fraction;
    applicator.gravity(ProductLoad::TrafficBarrier.name(), interval, x1, x2, barrier, barrier)?;
    let sidewalk = railing.sidewalk_weight * fraction;
    applicator.gravity(ProductLoad::Sidewalk.name(), interval, x1, x2, sidewalk, sidewalk)?;
    Ok(())
}

fn overlay<M: StructuralModel>(
    applicator: &mut LoadApplicator<'_, M>,
    bridge: &dyn BridgeProvider,
    line: &GirderLineDescription,
) -> AnalysisResult<()> {
    let Some(overlay) = bridge.overlay() else {
        return Ok(());
    };
    let w = overlay.weight * line.tributary_width;
    applicator.gravity(
        ProductLoad::Overlay.name(),
        bridge.events().overlay,
        line.start(),
        line.end(),
        w,
        w,
    )
}

fn user_loads<M: StructuralModel>(
    applicator: &mut LoadApplicator<'_, M>,
    bridge: &dyn BridgeProvider,
    girder_line: usize,
) -> AnalysisResult<()> {
    for load in bridge.user_loads() {
        if load.girder_line.is_some_and(|g| g != girder_line) {
            continue;
        }
        let group = match load.category {
            UserLoadCategory::DC => ProductLoad::UserDC,
            UserLoadCategory::DW => ProductLoad::UserDW,
            UserLoadCategory::LLIM => ProductLoad::UserLLIM,
        }
        .name();
        match load.kind {
            UserLoadKind::Point { x, force } => {
                applicator.point(group, load.interval, x, 0.0, -force, 0.0)?
            }
            UserLoadKind::Distributed { x1, x2, w1, w2 } => {
                applicator.gravity(group, load.interval, x1, x2, w1, w2)?
            }
            UserLoadKind::Moment { x, moment } => {
                applicator.point(group, load.interval, x, 0.0, 0.0, moment)?
            }
        }
    }
    Ok(())
}
