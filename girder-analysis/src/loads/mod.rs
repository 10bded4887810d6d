//! Load placement on a structural model
//!
//! Loads are described in girder-line stations and placed piecewise on the
//! members active in their interval. Load that falls where no member exists
//! (an overhang that is not modeled, or a pier gap before continuity) is moved
//! to the nearest modeled segment end as a force and a moment, and recorded
//! in the [`OverhangCache`] so the bearing reactions can be split by side.

pub mod dead;
pub mod prestress;

use std::collections::BTreeMap;

use girder_fem::prelude::{
    DistributedLoad, JointLoad, LoadDirection, MemberLoad, PointLoad, ResultsType, StrainLoad,
};
use log::debug;

use crate::builder::ModelTopology;
use crate::error::AnalysisResult;
use crate::layout::GirderLineLayout;
use crate::structural::StructuralModel;
use crate::types::{IntervalIndex, SegmentEnd};

/// Force and moment moved from an overhang to a segment end
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverhangLoad {
    pub fx: f64,
    /// Vertical force, positive up
    pub fy: f64,
    /// Moment, counter-clockwise positive
    pub mz: f64,
}

impl OverhangLoad {
    fn add(&mut self, other: OverhangLoad) {
        self.fx += other.fx;
        self.fy += other.fy;
        self.mz += other.mz;
    }
}

/// Loads moved to segment ends, by segment end, load group and interval
#[derive(Debug, Clone, Default)]
pub struct OverhangCache {
    entries: BTreeMap<(usize, SegmentEnd, String, IntervalIndex), OverhangLoad>,
}

impl OverhangCache {
    pub fn record(
        &mut self,
        segment: usize,
        end: SegmentEnd,
        group: &str,
        interval: IntervalIndex,
        load: OverhangLoad,
    ) {
        self.entries
            .entry((segment, end, group.to_string(), interval))
            .or_default()
            .add(load);
    }

    /// Load moved to a segment end by a group
    pub fn load(
        &self,
        segment: usize,
        end: SegmentEnd,
        group: &str,
        interval: IntervalIndex,
        results_type: ResultsType,
    ) -> OverhangLoad {
        let mut total = OverhangLoad::default();
        for ((s, e, g, i), load) in &self.entries {
            let in_range = match results_type {
                ResultsType::Incremental => *i == interval,
                ResultsType::Cumulative => *i <= interval,
            };
            if *s == segment && *e == end && g == group && in_range {
                total.add(*load);
            }
        }
        total
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Places loads given in stations on one structural model
pub struct LoadApplicator<'a, M: StructuralModel> {
    pub model: &'a mut M,
    pub topology: &'a ModelTopology,
    pub layout: &'a GirderLineLayout,
    pub overhangs: &'a mut OverhangCache,
}

impl<'a, M: StructuralModel> LoadApplicator<'a, M> {
    pub fn new(
        model: &'a mut M,
        topology: &'a ModelTopology,
        layout: &'a GirderLineLayout,
        overhangs: &'a mut OverhangCache,
    ) -> Self {
        Self {
            model,
            topology,
            layout,
            overhangs,
        }
    }

    /// Declare a load group once
    pub fn declare(&mut self, group: &str) -> AnalysisResult<()> {
        if !self.model.has_load_group(group) {
            self.model.add_load_group(group)?;
        }
        Ok(())
    }

    /// Downward load varying linearly from `w1` at `x1` to `w2` at `x2`
    pub fn gravity(
        &mut self,
        group: &str,
        interval: IntervalIndex,
        x1: f64,
        x2: f64,
        w1: f64,
        w2: f64,
    ) -> AnalysisResult<()> {
        self.distributed(group, interval, LoadDirection::Fy, x1, x2, -w1, -w2)
    }

    /// Linearly varying load in model sign convention, split at members
    #[allow(clippy::too_many_arguments)]
    pub fn distributed(
        &mut self,
        group: &str,
        interval: IntervalIndex,
        direction: LoadDirection,
        x1: f64,
        x2: f64,
        w1: f64,
        w2: f64,
    ) -> AnalysisResult<()> {
        let tol = self.layout.tolerance;
        if x2 - x1 <= tol || (w1 == 0.0 && w2 == 0.0) {
            return Ok(());
        }
        let intensity = |x: f64| w1 + (w2 - w1) * (x - x1) / (x2 - x1);

        let mut stations = vec![x1];
        stations.extend(self.topology.breaks_between(x1, x2));
        stations.extend(self.gap_breaks(x1, x2));
        stations.push(x2);
        stations.sort_by(f64::total_cmp);
        stations.dedup_by(|a, b| (*a - *b).abs() <= tol);

        for pair in stations.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (wa, wb) = (intensity(a), intensity(b));
            if let Some(member) = self.topology.member_covering(a, b, interval) {
                let load = DistributedLoad::new(
                    wa,
                    wb,
                    a - member.x_i,
                    b - member.x_i,
                    direction,
                    interval,
                    group,
                );
                self.model.add_member_load(member.id, MemberLoad::Distributed(load))?;
                continue;
            }

            let Some((segment, end)) = self.layout.transfer_target(0.5 * (a + b)) else {
                continue;
            };
            let xb = self.layout.segments[segment].model_boundary(end);
            let length = b - a;
            let slope = (wb - wa) / length;
            let resultant = wa * length + slope * length * length / 2.0;
            let moment = match direction {
                LoadDirection::Fy => {
                    let d = a - xb;
                    d * wa * length
                        + d * slope * length * length / 2.0
                        + wa * length * length / 2.0
                        + slope * length * length * length / 3.0
                }
                LoadDirection::Fx => 0.0,
            };
            let load = match direction {
                LoadDirection::Fy => OverhangLoad {
                    fx: 0.0,
                    fy: resultant,
                    mz: moment,
                },
                LoadDirection::Fx => OverhangLoad {
                    fx: resultant,
                    fy: 0.0,
                    mz: 0.0,
                },
            };
            self.transfer(group, interval, segment, end, load)?;
        }
        Ok(())
    }

    /// Concentrated force and moment at a station
    pub fn point(
        &mut self,
        group: &str,
        interval: IntervalIndex,
        x: f64,
        fx: f64,
        fy: f64,
        mz: f64,
    ) -> AnalysisResult<()> {
        if fx == 0.0 && fy == 0.0 && mz == 0.0 {
            return Ok(());
        }
        if let Some(member) = self.topology.member_covering(x, x, interval) {
            let load = PointLoad::new(x - member.x_i, fx, fy, mz, interval, group);
            self.model.add_member_load(member.id, MemberLoad::Point(load))?;
            return Ok(());
        }
        let Some((segment, end)) = self.layout.transfer_target(x) else {
            return Ok(());
        };
        let xb = self.layout.segments[segment].model_boundary(end);
        let load = OverhangLoad {
            fx,
            fy,
            mz: mz + (x - xb) * fy,
        };
        self.transfer(group, interval, segment, end, load)
    }

    /// Imposed strain and curvature between two stations
    ///
    /// Strain on parts of the girder that carry no member in the interval
    /// has no effect on the structure and is dropped.
    pub fn strain(
        &mut self,
        group: &str,
        interval: IntervalIndex,
        x1: f64,
        x2: f64,
        axial_strain: f64,
        curvature: f64,
    ) -> AnalysisResult<()> {
        let tol = self.layout.tolerance;
        if x2 - x1 <= tol || (axial_strain == 0.0 && curvature == 0.0) {
            return Ok(());
        }
        let mut stations = vec![x1];
        stations.extend(self.topology.breaks_between(x1, x2));
        stations.push(x2);
        for pair in stations.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            match self.topology.member_covering(a, b, interval) {
                Some(member) => {
                    let load = StrainLoad::new(
                        a - member.x_i,
                        b - member.x_i,
                        axial_strain,
                        curvature,
                        interval,
                        group,
                    );
                    self.model.add_member_load(member.id, MemberLoad::Strain(load))?;
                }
                None => debug!(
                    "{group}: strain between x = {a:.3} and x = {b:.3} has no member in interval {interval}"
                ),
            }
        }
        Ok(())
    }

    /// Pier centers split unmodeled gaps between the two girders
    fn gap_breaks(&self, x1: f64, x2: f64) -> Vec<f64> {
        self.layout
            .piers
            .iter()
            .map(|p| p.station)
            .chain(self.layout.segments.iter().flat_map(|s| [s.model_start, s.model_end]))
            .filter(|x| *x > x1 && *x < x2)
            .collect()
    }

    fn transfer(
        &mut self,
        group: &str,
        interval: IntervalIndex,
        segment: usize,
        end: SegmentEnd,
        load: OverhangLoad,
    ) -> AnalysisResult<()> {
        let xb = self.layout.segments[segment].model_boundary(end);
        if !self.topology.joint_is_active(xb, interval) {
            debug!(
                "{group}: segment {segment} is not in place in interval {interval}, load dropped"
            );
            return Ok(());
        }
        let Some(joint) = self.topology.joint_at(xb) else {
            return Ok(());
        };
        self.model.add_joint_load(
            joint,
            JointLoad::new(load.fx, load.fy, load.mz, interval, group),
        )?;
        self.overhangs.record(segment, end, group, interval, load);
        Ok(())
    }
}
