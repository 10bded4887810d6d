//! Staged model builder
//!
//! Lays out joints, members and supports of one structural model of a
//! girder line and assigns the staged stiffness of every member. The simple
//! and continuous models come out of the same routine and differ only in
//! whether continuity is ever made at the piers.

use girder_fem::prelude::{
    Fixity, JointId, Member, MemberId, MemberReleases, MemberStiffness, Support, SupportId,
};
use log::{debug, warn};

use crate::bridge::{BridgeProvider, GirderLineDescription, PierConnection};
use crate::error::AnalysisResult;
use crate::layout::{GapKind, GirderLineLayout, PierLayout};
use crate::status::{StatusCategory, StatusItem, StatusSink};
use crate::structural::StructuralModel;
use crate::types::{IntervalIndex, ModelKind, PierFace, SupportLocation};

/// What a member represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Segment(usize),
    /// Closure joint following a segment
    Closure(usize),
    /// Diaphragm zone over a pier
    PierZone(usize),
}

/// A member of a structural model
#[derive(Debug, Clone)]
pub struct MemberLayout {
    pub id: MemberId,
    pub x_i: f64,
    pub x_j: f64,
    pub stage: IntervalIndex,
    pub kind: MemberKind,
    /// Stiffness changes by interval
    pub stiffness: Vec<(IntervalIndex, MemberStiffness)>,
}

impl MemberLayout {
    pub fn is_active(&self, interval: IntervalIndex) -> bool {
        self.stage <= interval
    }

    /// Stiffness in effect in an interval
    pub fn stiffness_at(&self, interval: IntervalIndex) -> Option<MemberStiffness> {
        self.stiffness
            .iter()
            .take_while(|(i, _)| *i <= interval)
            .last()
            .map(|(_, s)| *s)
    }

    pub fn length(&self) -> f64 {
        self.x_j - self.x_i
    }
}

/// A support of a structural model
#[derive(Debug, Clone, Copy)]
pub struct SupportLayout {
    pub id: SupportId,
    pub x: f64,
    pub location: SupportLocation,
    /// Bearing side at a pier with two bearing lines
    pub face: Option<PierFace>,
    pub stage: IntervalIndex,
    pub removed_at: Option<IntervalIndex>,
    pub omit_reaction: bool,
}

impl SupportLayout {
    pub fn is_active(&self, interval: IntervalIndex) -> bool {
        self.stage <= interval && self.removed_at.map_or(true, |r| interval < r)
    }
}

/// Joints, members and supports of one structural model
#[derive(Debug, Clone)]
pub struct ModelTopology {
    pub kind: ModelKind,
    pub joints: Vec<(f64, JointId)>,
    pub members: Vec<MemberLayout>,
    pub supports: Vec<SupportLayout>,
    tolerance: f64,
}

impl ModelTopology {
    pub fn joint_at(&self, x: f64) -> Option<JointId> {
        self.joints
            .iter()
            .find(|(jx, _)| (jx - x).abs() <= self.tolerance)
            .map(|(_, id)| *id)
    }

    /// Active member covering `[a, b]`
    pub fn member_covering(&self, a: f64, b: f64, interval: IntervalIndex) -> Option<&MemberLayout> {
        let tol = self.tolerance;
        self.members
            .iter()
            .find(|m| m.is_active(interval) && a >= m.x_i - tol && b <= m.x_j + tol)
    }

    /// Check whether a joint at `x` is part of the structure in an interval
    pub fn joint_is_active(&self, x: f64, interval: IntervalIndex) -> bool {
        let tol = self.tolerance;
        self.members.iter().any(|m| {
            m.is_active(interval) && ((m.x_i - x).abs() <= tol || (m.x_j - x).abs() <= tol)
        }) || self
            .supports
            .iter()
            .any(|s| s.is_active(interval) && (s.x - x).abs() <= tol)
    }

    /// Member boundaries strictly inside `(a, b)`
    pub fn breaks_between(&self, a: f64, b: f64) -> Vec<f64> {
        let tol = self.tolerance;
        self.joints
            .iter()
            .map(|(x, _)| *x)
            .filter(|x| *x > a + tol && *x < b - tol)
            .collect()
    }

    /// Supports reported at a location
    pub fn supports_at(&self, location: SupportLocation) -> impl Iterator<Item = &SupportLayout> {
        self.supports.iter().filter(move |s| s.location == location)
    }
}

/// Build joints, members and supports of a model
pub fn build_structure<M: StructuralModel>(
    model: &mut M,
    kind: ModelKind,
    bridge: &dyn BridgeProvider,
    layout: &GirderLineLayout,
    status: &dyn StatusSink,
) -> AnalysisResult<ModelTopology> {
    let line = bridge.girder_line(layout.girder_line)?;
    let tol = layout.tolerance;

    for interval in bridge.intervals() {
        model.add_stage(&interval.name)?;
    }

    // joints
    let mut stations = key_stations(bridge, layout, kind);
    stations.sort_by(f64::total_cmp);
    stations.dedup_by(|a, b| (*a - *b).abs() <= tol);
    let joints: Vec<(f64, JointId)> = stations.iter().map(|x| (*x, model.add_joint(*x))).collect();

    // members
    let mut planned: Vec<(usize, usize, IntervalIndex, MemberKind)> = Vec::new();
    for k in 0..joints.len().saturating_sub(1) {
        let (a, b) = (joints[k].0, joints[k + 1].0);
        let mid = 0.5 * (a + b);
        if let Some((stage, member_kind)) = classify(line, layout, kind, mid) {
            planned.push((k, k + 1, stage, member_kind));
        }
    }

    let n_intervals = bridge.interval_count();
    let mut members = Vec::with_capacity(planned.len());
    for (i, j, stage, member_kind) in planned {
        let (x_i, x_j) = (joints[i].0, joints[j].0);
        let mut member = Member::new(joints[i].1, joints[j].1, stage);
        if let Some(releases) = hinge_releases(layout, kind, x_i, x_j) {
            member = member.with_releases(releases);
        }

        let mut changes: Vec<(IntervalIndex, MemberStiffness)> = Vec::new();
        for interval in stage..n_intervals {
            let stiffness = member_stiffness(
                bridge,
                line,
                layout,
                member_kind,
                0.5 * (x_i + x_j),
                interval,
                status,
            );
            if changes.last().map_or(true, |(_, p)| *p != stiffness) {
                member = member.with_stiffness(interval, stiffness);
                changes.push((interval, stiffness));
            }
        }

        let id = model.add_member(member)?;
        members.push(MemberLayout {
            id,
            x_i,
            x_j,
            stage,
            kind: member_kind,
            stiffness: changes,
        });
    }

    let mut topology = ModelTopology {
        kind,
        joints,
        members,
        supports: Vec::new(),
        tolerance: tol,
    };
    add_supports(model, bridge, layout, kind, &mut topology)?;

    debug!(
        "{kind:?} model of girder line {}: {} joints, {} members, {} supports",
        layout.girder_line,
        topology.joints.len(),
        topology.members.len(),
        topology.supports.len()
    );
    Ok(topology)
}

/// Pier diaphragm zones exist only where continuity is made in this model
fn has_zone(pier: &PierLayout, kind: ModelKind) -> bool {
    kind == ModelKind::Continuous && pier.has_girder_ends() && pier.continuity.is_some()
}

fn key_stations(bridge: &dyn BridgeProvider, layout: &GirderLineLayout, kind: ModelKind) -> Vec<f64> {
    let tol = layout.tolerance;
    let mut stations = Vec::new();
    for seg in &layout.segments {
        stations.push(seg.model_start);
        stations.push(seg.model_end);
        stations.extend(seg.start_bearing);
        stations.extend(seg.end_bearing);
        if let Ok(line) = bridge.girder_line(layout.girder_line) {
            if let Some(desc) = line.segments.get(seg.index) {
                stations.extend(
                    desc.section_breaks()
                        .filter(|x| *x > seg.model_start + tol && *x < seg.model_end - tol),
                );
            }
        }
    }
    for pier in &layout.piers {
        if !pier.has_girder_ends() || has_zone(pier, kind) {
            stations.push(pier.station);
        }
    }
    for x in &layout.temporary_supports {
        let on_segment = layout
            .segments
            .iter()
            .any(|s| *x >= s.model_start - tol && *x <= s.model_end + tol);
        let in_closure = layout.gaps.iter().any(|g| {
            matches!(g.kind, GapKind::Closure(_)) && *x >= g.start - tol && *x <= g.end + tol
        });
        if on_segment || in_closure {
            stations.push(*x);
        }
    }
    stations
}

fn classify(
    line: &GirderLineDescription,
    layout: &GirderLineLayout,
    kind: ModelKind,
    mid: f64,
) -> Option<(IntervalIndex, MemberKind)> {
    if let Some(seg) = layout
        .segments
        .iter()
        .find(|s| mid > s.model_start && mid < s.model_end)
    {
        return Some((seg.erection_interval, MemberKind::Segment(seg.index)));
    }
    let gap = layout.gaps.iter().find(|g| mid > g.start && mid < g.end)?;
    match gap.kind {
        GapKind::Pier(p) => {
            let pier = &layout.piers[p];
            if !has_zone(pier, kind) {
                return None;
            }
            // the zone is cast once both girders are in place
            let erected = layout.segments[gap.after_segment]
                .erection_interval
                .max(layout.segments[gap.after_segment + 1].erection_interval);
            let continuity = pier.continuity.unwrap_or(erected).max(erected);
            Some((continuity, MemberKind::PierZone(p)))
        }
        GapKind::Closure(s) => {
            let closure = line.closure_after(s)?;
            Some((closure.interval, MemberKind::Closure(s)))
        }
        GapKind::Open => None,
    }
}

/// Hinges where two girders meet on one bearing line
fn hinge_releases(
    layout: &GirderLineLayout,
    kind: ModelKind,
    x_i: f64,
    x_j: f64,
) -> Option<MemberReleases> {
    let tol = layout.tolerance;
    for pier in layout.piers.iter().filter(|p| p.has_girder_ends()) {
        let Some(gap) = layout
            .gaps
            .iter()
            .find(|g| g.kind == GapKind::Pier(pier.index))
        else {
            continue;
        };
        if gap.end - gap.start > tol {
            continue;
        }
        let at = gap.start;
        let releases = if (x_j - at).abs() <= tol {
            MemberReleases::pin_j()
        } else if (x_i - at).abs() <= tol {
            MemberReleases::pin_i()
        } else {
            continue;
        };
        return Some(match (kind, pier.continuity) {
            (ModelKind::Continuous, Some(c)) => releases.until(c),
            _ => releases,
        });
    }
    None
}

fn member_stiffness(
    bridge: &dyn BridgeProvider,
    line: &GirderLineDescription,
    layout: &GirderLineLayout,
    kind: MemberKind,
    x: f64,
    interval: IntervalIndex,
    status: &dyn StatusSink,
) -> MemberStiffness {
    let composite = interval >= bridge.events().composite_deck;
    let segment_stiffness = |s: usize, at: f64| {
        line.segments.get(s).and_then(|desc| {
            let e = desc.modulus_at(interval);
            desc.properties_at(at - desc.start, composite)
                .map(|p| (e * p.area, e * p.inertia))
        })
    };

    let (ea, ei) = match kind {
        MemberKind::Segment(s) => segment_stiffness(s, x),
        MemberKind::Closure(s) => line
            .closure_after(s)
            .map(|c| (c.modulus * c.properties.area, c.modulus * c.properties.inertia)),
        MemberKind::PierZone(p) => {
            let pier = &layout.piers[p];
            let (segment, at) = match (pier.back_segment, pier.ahead_segment) {
                (Some(b), _) if x <= pier.station => (b, layout.segments[b].end),
                (_, Some(a)) => (a, layout.segments[a].start),
                (Some(b), None) => (b, layout.segments[b].end),
                (None, None) => (0, x),
            };
            segment_stiffness(segment, at)
        }
    }
    .unwrap_or((0.0, 0.0));

    if ea > 0.0 && ei > 0.0 {
        return MemberStiffness::new(ea, ei);
    }
    warn!(
        "girder line {}: member at x = {x:.3} has no stiffness in interval {interval}, \
         using a placeholder",
        layout.girder_line
    );
    status.report(StatusItem::warning(
        layout.girder_line,
        StatusCategory::DegenerateInput,
        format!("member at x = {x:.3} has no stiffness in interval {interval}"),
    ));
    MemberStiffness::new(if ea > 0.0 { ea } else { 1.0 }, if ei > 0.0 { ei } else { 1.0 })
}

fn add_support<M: StructuralModel>(
    model: &mut M,
    topology: &mut ModelTopology,
    support: Support,
    x: f64,
    location: SupportLocation,
    face: Option<PierFace>,
) -> AnalysisResult<()> {
    let id = model.add_support(support)?;
    topology.supports.push(SupportLayout {
        id,
        x,
        location,
        face,
        stage: support.stage,
        removed_at: support.removed_at,
        omit_reaction: support.omit_reaction,
    });
    Ok(())
}

fn add_supports<M: StructuralModel>(
    model: &mut M,
    bridge: &dyn BridgeProvider,
    layout: &GirderLineLayout,
    kind: ModelKind,
    topology: &mut ModelTopology,
) -> AnalysisResult<()> {
    let tol = layout.tolerance;
    for pier in &layout.piers {
        let location = SupportLocation::Pier(pier.index);
        let integral_from = match kind {
            ModelKind::Continuous if pier.connection.is_integral() => {
                pier.continuity.filter(|c| *c > 0)
            }
            _ => None,
        };

        if !pier.has_girder_ends() {
            let Some(joint) = topology.joint_at(pier.station) else {
                continue;
            };
            let mut bearing = Support::new(joint, Fixity::Roller);
            if let Some(c) = integral_from {
                bearing = bearing.removed_at(c);
                let fixed = Support::fixed(joint).from_stage(c);
                add_support(model, topology, bearing, pier.station, location, None)?;
                add_support(model, topology, fixed, pier.station, location, None)?;
            } else {
                add_support(model, topology, bearing, pier.station, location, None)?;
            }
            continue;
        }

        let fixity = match pier.connection {
            PierConnection::Hinge => Fixity::Pinned,
            _ => Fixity::Roller,
        };
        let single = pier.single_bearing_line(tol);
        let mut bearings: Vec<(f64, Option<PierFace>)> = Vec::new();
        if single {
            bearings.extend(pier.back_bearing.map(|x| (x, None)));
        } else {
            bearings.extend(pier.back_bearing.map(|x| (x, Some(PierFace::Back))));
            bearings.extend(pier.ahead_bearing.map(|x| (x, Some(PierFace::Ahead))));
        }

        for (x, face) in &bearings {
            let Some(joint) = topology.joint_at(*x) else {
                continue;
            };
            let mut support = Support::new(joint, fixity);
            if let Some(c) = integral_from {
                // bearings carry the girders until the pier takes them over
                support = support.removed_at(c);
            }
            add_support(model, topology, support, *x, location, *face)?;
        }

        if let Some(c) = integral_from {
            let at = if has_zone(pier, kind) && !single && bearings.len() == 2 {
                vec![pier.station]
            } else {
                bearings.iter().map(|(x, _)| *x).collect()
            };
            for x in at {
                if let Some(joint) = topology.joint_at(x) {
                    add_support(model, topology, Support::fixed(joint).from_stage(c), x, location, None)?;
                }
            }
        }
    }

    for (index, ts) in bridge.temporary_supports().iter().enumerate() {
        let Some(joint) = topology.joint_at(ts.station) else {
            debug!("temporary support {index} is not under girder line {}", layout.girder_line);
            continue;
        };
        let mut support = Support::roller(joint).from_stage(ts.installation_interval);
        if let Some(removed) = ts.removal_interval {
            support = support.removed_at(removed);
        }
        add_support(
            model,
            topology,
            support,
            ts.station,
            SupportLocation::TemporarySupport(index),
            None,
        )?;
    }
    Ok(())
}
