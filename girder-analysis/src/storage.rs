//! Segment models for release and storage
//!
//! Before it is erected a segment is a simple beam: on its ends at release
//! and on its storage supports while stored. Each segment gets one model for
//! each condition, in segment coordinates. They answer girder self-weight and
//! pretension results before erection and supply the storage deflections and
//! reactions that the storage-to-erection correction is built from.

use girder_fem::prelude::{
    DistributedLoad, Fixity, LoadDirection, Member, MemberLoad, MemberStiffness, PoiDisplacement,
    ResultsType, SectionForces, SolverOptions, StrainLoad, Support, SupportId,
};
use log::debug;

use crate::bridge::{BridgeProvider, SegmentDescription};
use crate::error::{AnalysisError, AnalysisResult};
use crate::layout::{GirderLineLayout, SegmentLayout};
use crate::loads::prestress::prestress_strain;
use crate::status::{StatusCategory, StatusItem, StatusSink};
use crate::structural::StructuralModel;
use crate::types::{IntervalIndex, Named, ProductLoad};

/// Load group carrying the load that moves the storage reactions to the
/// erection supports
pub const STORAGE_CORRECTION_GROUP: &str = "Girder Storage Correction";

/// Support condition of a segment before erection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentCondition {
    /// Supported at its ends in the casting bed
    Release,
    /// Supported at the storage supports
    Storage,
}

/// One simply supported segment model
struct SegmentModel<M> {
    model: M,
    supports: [SupportId; 2],
}

/// Release and storage models of one segment
pub struct SegmentModels<M> {
    pub segment: usize,
    /// Station of the segment start
    pub start: f64,
    pub length: f64,
    pub release_interval: IntervalIndex,
    pub storage_interval: IntervalIndex,
    pub erection_interval: IntervalIndex,
    /// Storage support stations
    pub storage_locations: (f64, f64),
    release: SegmentModel<M>,
    storage: SegmentModel<M>,
}

impl<M: StructuralModel> SegmentModels<M> {
    /// Build and analyze both models of a segment
    pub fn build(
        desc: &SegmentDescription,
        layout: &SegmentLayout,
        tolerance: f64,
        girder_line: usize,
        status: &dyn StatusSink,
    ) -> AnalysisResult<Self> {
        let length = desc.length();
        let (mut a, mut b) = (desc.storage_supports[0], length - desc.storage_supports[1]);
        if b - a <= tolerance {
            status.report(StatusItem::warning(
                girder_line,
                StatusCategory::SupportApproximation,
                format!(
                    "storage supports of segment {} leave no span, the segment ends are used",
                    layout.index
                ),
            ));
            (a, b) = (0.0, length);
        }

        let release = build_segment_model(
            desc,
            SegmentCondition::Release,
            desc.modulus_at(desc.release_interval),
            (0.0, length),
            tolerance,
        )?;
        let storage = build_segment_model(
            desc,
            SegmentCondition::Storage,
            desc.modulus_at(desc.storage_interval),
            (a, b),
            tolerance,
        )?;
        debug!(
            "segment {}: release and storage models built, storage supports at {a:.3} and {b:.3}",
            layout.index
        );

        Ok(Self {
            segment: layout.index,
            start: desc.start,
            length,
            release_interval: desc.release_interval,
            storage_interval: desc.storage_interval,
            erection_interval: desc.erection_interval,
            storage_locations: (desc.start + a, desc.start + b),
            release,
            storage,
        })
    }

    /// Condition of the segment in an interval, none once erected or before release
    pub fn condition_at(&self, interval: IntervalIndex) -> Option<SegmentCondition> {
        if interval < self.release_interval || interval >= self.erection_interval {
            None
        } else if interval < self.storage_interval {
            Some(SegmentCondition::Release)
        } else {
            Some(SegmentCondition::Storage)
        }
    }

    fn model(&self, condition: SegmentCondition) -> &SegmentModel<M> {
        match condition {
            SegmentCondition::Release => &self.release,
            SegmentCondition::Storage => &self.storage,
        }
    }

    fn local(&self, x: f64) -> f64 {
        (x - self.start).clamp(0.0, self.length)
    }

    /// Displacement at a station in one condition
    pub fn displacement(
        &self,
        condition: SegmentCondition,
        x: f64,
        group: &str,
    ) -> AnalysisResult<PoiDisplacement> {
        let model = &self.model(condition).model;
        if !model.has_load_group(group) {
            return Ok(PoiDisplacement::default());
        }
        Ok(model.displacement_at(0, self.local(x), group, ResultsType::Cumulative)?)
    }

    /// Section forces at a station in one condition
    pub fn section_forces(
        &self,
        condition: SegmentCondition,
        x: f64,
        group: &str,
    ) -> AnalysisResult<SectionForces> {
        let model = &self.model(condition).model;
        if !model.has_load_group(group) {
            return Ok(SectionForces::default());
        }
        Ok(model.section_forces_at(0, self.local(x), group, ResultsType::Cumulative)?)
    }

    /// Vertical reactions of the two supports in one condition, positive up
    pub fn reactions(&self, condition: SegmentCondition, group: &str) -> AnalysisResult<[f64; 2]> {
        let m = self.model(condition);
        if !m.model.has_load_group(group) {
            return Ok([0.0, 0.0]);
        }
        let mut r = [0.0; 2];
        for (k, id) in m.supports.iter().enumerate() {
            r[k] = m.model.reaction(0, *id, group, ResultsType::Cumulative)?.fy;
        }
        Ok(r)
    }

    /// Cumulative displacement in an interval before erection
    pub fn cumulative_displacement(
        &self,
        interval: IntervalIndex,
        x: f64,
        group: &str,
    ) -> AnalysisResult<PoiDisplacement> {
        match self.condition_at(interval) {
            Some(condition) => self.displacement(condition, x, group),
            None => Ok(PoiDisplacement::default()),
        }
    }

    /// Cumulative section forces in an interval before erection
    pub fn cumulative_section_forces(
        &self,
        interval: IntervalIndex,
        x: f64,
        group: &str,
    ) -> AnalysisResult<SectionForces> {
        match self.condition_at(interval) {
            Some(condition) => self.section_forces(condition, x, group),
            None => Ok(SectionForces::default()),
        }
    }
}

fn build_segment_model<M: StructuralModel>(
    desc: &SegmentDescription,
    condition: SegmentCondition,
    modulus: f64,
    (a, b): (f64, f64),
    tolerance: f64,
) -> AnalysisResult<SegmentModel<M>> {
    let length = desc.length();
    let mut model = M::with_options(SolverOptions::default());
    let name = match condition {
        SegmentCondition::Release => "Release",
        SegmentCondition::Storage => "Storage",
    };
    model.add_stage(name)?;

    let mut stations: Vec<f64> = vec![0.0, length, a, b];
    stations.extend(desc.sections.iter().map(|s| s.x).filter(|x| *x > 0.0 && *x < length));
    stations.sort_by(f64::total_cmp);
    stations.dedup_by(|p, q| (*p - *q).abs() <= tolerance);
    let joints: Vec<_> = stations.iter().map(|x| model.add_joint(*x)).collect();

    let girder = ProductLoad::Girder.name();
    let pretension = ProductLoad::Pretension.name();
    model.add_load_group(girder)?;
    if desc.pretension.is_some() {
        model.add_load_group(pretension)?;
    }

    for (k, pair) in stations.windows(2).enumerate() {
        let (x_i, x_j) = (pair[0], pair[1]);
        let props = desc
            .properties_at(0.5 * (x_i + x_j), false)
            .ok_or_else(|| AnalysisError::InvalidBridge("segment has no sections".into()))?;
        let stiffness = MemberStiffness::new(
            positive(modulus * props.area),
            positive(modulus * props.inertia),
        );
        let member = Member::new(joints[k], joints[k + 1], 0).with_stiffness(0, stiffness);
        let id = model.add_member(member)?;

        let w = -desc.unit_weight * props.area;
        if w != 0.0 {
            let load = DistributedLoad::new(w, w, 0.0, x_j - x_i, LoadDirection::Fy, 0, girder);
            model.add_member_load(id, MemberLoad::Distributed(load))?;
        }
        if let Some(ps) = desc.pretension {
            let (axial, curvature) =
                prestress_strain(ps.force, ps.eccentricity, stiffness.ea, stiffness.ei);
            let load = StrainLoad::new(0.0, x_j - x_i, axial, curvature, 0, pretension);
            model.add_member_load(id, MemberLoad::Strain(load))?;
        }
    }

    let joint_at = |x: f64| {
        stations
            .iter()
            .position(|s| (s - x).abs() <= tolerance)
            .map(|k| joints[k])
            .ok_or_else(|| AnalysisError::InvalidInput(format!("no joint at x = {x}")))
    };
    let left = model.add_support(Support::new(joint_at(a)?, Fixity::Pinned))?;
    let right = model.add_support(Support::new(joint_at(b)?, Fixity::Roller))?;

    model.analyze()?;
    Ok(SegmentModel {
        model,
        supports: [left, right],
    })
}

fn positive(value: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        1.0
    }
}

/// Release and storage models of every segment of a girder line
pub struct StorageModels<M> {
    segments: Vec<SegmentModels<M>>,
}

impl<M: StructuralModel> StorageModels<M> {
    pub fn build(
        bridge: &dyn BridgeProvider,
        layout: &GirderLineLayout,
        status: &dyn StatusSink,
    ) -> AnalysisResult<Self> {
        let line = bridge.girder_line(layout.girder_line)?;
        let segments = line
            .segments
            .iter()
            .zip(&layout.segments)
            .map(|(desc, seg)| {
                SegmentModels::build(desc, seg, layout.tolerance, layout.girder_line, status)
            })
            .collect::<AnalysisResult<Vec<_>>>()?;
        Ok(Self { segments })
    }

    pub fn segment(&self, index: usize) -> AnalysisResult<&SegmentModels<M>> {
        self.segments
            .get(index)
            .ok_or(AnalysisError::SegmentNotFound(index))
    }

    pub fn segments(&self) -> &[SegmentModels<M>] {
        &self.segments
    }
}

/// Storage deflection of a segment measured from the line through its
/// outermost erection supports
///
/// `span` holds the two erection support stations with the storage
/// displacement at each. Without a span the stored shape is returned as is.
pub fn relative_to_supports(
    stored: PoiDisplacement,
    x: f64,
    span: Option<((f64, PoiDisplacement), (f64, PoiDisplacement))>,
) -> PoiDisplacement {
    let Some(((x1, d1), (x2, d2))) = span else {
        return stored;
    };
    if (x2 - x1).abs() <= f64::EPSILON {
        return PoiDisplacement {
            dy: stored.dy - d1.dy,
            rz: stored.rz,
        };
    }
    let slope = (d2.dy - d1.dy) / (x2 - x1);
    PoiDisplacement {
        dy: stored.dy - (d1.dy + slope * (x - x1)),
        rz: stored.rz - slope,
    }
}
