//! Result queries on a girder line
//!
//! Results are reported in the girder sign convention: tension, shear that
//! pushes the left part up, sagging moment, upward deflection and
//! counter-clockwise rotation are positive. The structural models report
//! section forces on both faces of a section. Everywhere except at the start
//! of the girder line the left face is read as is (shear negated); at the
//! start only the right face exists and is converted. A negated quantity is
//! optimized in the opposite direction.
//!
//! Every point query maps its points of interest once and evaluates each
//! model the analysis type needs. Envelope analysis types take the smaller or
//! larger of the simple and continuous results; optimized queries take the
//! result the optimization prefers.

use girder_fem::prelude::{
    AxleConfiguration, CombinationResult, Face, ForceEffect, LiveLoadQuery, LiveLoadResult, Optimization,
    PoiDisplacement, ResponseQuantity, ResultsType, SectionForces, SupportId, UnitLoad,
};
use serde::{Deserialize, Serialize};

use crate::bridge::SectionProperties;
use crate::distribution::UNIT_LOAD_GROUP;
use crate::error::{AnalysisError, AnalysisResult};
use crate::loads::OverhangLoad;
use crate::model::{GirderLineModel, MappedPoi, SubModel};
use crate::poi::PointOfInterest;
use crate::storage::{relative_to_supports, SegmentCondition, STORAGE_CORRECTION_GROUP};
use crate::structural::StructuralModel;
use crate::types::{
    BridgeAnalysisType, DeflectionLiveLoadType, IntervalIndex, LiveLoadType, LoadCase, ModelKind,
    Named, PierFace, ProductLoad, SegmentEnd, SupportLocation,
};

/// Face to read and sign to apply for an effect
pub fn sign_convention(effect: ForceEffect, at_start: bool) -> (Face, f64) {
    match (effect, at_start) {
        (ForceEffect::Fx | ForceEffect::Mz, true) => (Face::Right, -1.0),
        (ForceEffect::Fx | ForceEffect::Mz, false) => (Face::Left, 1.0),
        (ForceEffect::Fy, true) => (Face::Right, 1.0),
        (ForceEffect::Fy, false) => (Face::Left, -1.0),
        (ForceEffect::Dy | ForceEffect::Rz, _) => (Face::Left, 1.0),
    }
}

/// A section force in the girder sign convention
pub fn local_force(forces: &SectionForces, effect: ForceEffect, at_start: bool) -> f64 {
    let (face, sign) = sign_convention(effect, at_start);
    sign * forces.effect(effect).face(face)
}

fn displacement_component(d: PoiDisplacement, effect: ForceEffect) -> f64 {
    match effect {
        ForceEffect::Rz => d.rz,
        _ => d.dy,
    }
}

/// Section forces in the girder sign convention
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GirderForces {
    /// Tension positive
    pub axial: f64,
    pub shear: f64,
    /// Sagging positive
    pub moment: f64,
}

impl GirderForces {
    pub fn from_section(forces: &SectionForces, at_start: bool) -> Self {
        Self {
            axial: local_force(forces, ForceEffect::Fx, at_start),
            shear: local_force(forces, ForceEffect::Fy, at_start),
            moment: local_force(forces, ForceEffect::Mz, at_start),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GirderDeflection {
    /// Upward positive
    pub deflection: f64,
    pub rotation: f64,
}

/// Girder fiber stresses, tension positive
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GirderStress {
    pub top: f64,
    pub bottom: f64,
}

impl GirderStress {
    /// Stresses from an axial force and a sagging moment
    pub fn from_forces(props: &SectionProperties, axial: f64, moment: f64) -> Self {
        let p = if props.area > 0.0 { axial / props.area } else { 0.0 };
        let top = if props.s_top > 0.0 { moment / props.s_top } else { 0.0 };
        let bottom = if props.s_bottom > 0.0 { moment / props.s_bottom } else { 0.0 };
        Self {
            top: p - top,
            bottom: p + bottom,
        }
    }
}

/// What a scalar query is about
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Target {
    Poi(MappedPoi, ForceEffect),
    /// Supports reported at a location
    Support(SupportLocation, ForceEffect),
}

/// Evaluates queries against one structural model of a girder line
pub(crate) struct ModelView<'a, M> {
    pub line: &'a GirderLineModel<M>,
    pub sub: &'a SubModel<M>,
}

impl<'a, M: StructuralModel> ModelView<'a, M> {
    /// Supports at a location that carry load in an interval
    pub fn supports(&self, location: SupportLocation, interval: IntervalIndex) -> Vec<SupportId> {
        self.sub
            .topology
            .supports_at(location)
            .filter(|s| s.is_active(interval) && !s.omit_reaction)
            .map(|s| s.id)
            .collect()
    }

    /// Model quantity of a target and the sign turning it into the girder convention
    pub fn quantity(&self, target: &Target, interval: IntervalIndex) -> Option<(ResponseQuantity, f64)> {
        match *target {
            Target::Poi(poi, effect) => {
                let (face, sign) = sign_convention(effect, poi.at_start);
                Some((ResponseQuantity::poi(poi.id, effect, face), sign))
            }
            Target::Support(location, effect) => {
                let supports = self.supports(location, interval);
                (!supports.is_empty())
                    .then_some((ResponseQuantity::Reaction { supports, effect }, 1.0))
            }
        }
    }

    /// Load group result as computed by the model
    pub fn model_group(
        &self,
        interval: IntervalIndex,
        target: &Target,
        group: &str,
        results_type: ResultsType,
    ) -> AnalysisResult<f64> {
        let Some((quantity, sign)) = self.quantity(target, interval) else {
            return Ok(0.0);
        };
        Ok(sign * self.sub.model.response(interval, &quantity, group, results_type)?)
    }

    /// Load group result, with segment results before erection and the
    /// storage-to-erection correction applied to girder deflections
    pub fn group(
        &self,
        interval: IntervalIndex,
        target: &Target,
        group: &str,
        results_type: ResultsType,
    ) -> AnalysisResult<f64> {
        let staged = group == ProductLoad::Girder.name() || group == ProductLoad::Pretension.name();
        let Target::Poi(poi, effect) = *target else {
            return self.model_group(interval, target, group, results_type);
        };
        if !staged {
            return self.model_group(interval, target, group, results_type);
        }
        let now = self.staged_cumulative(interval, &poi, effect, group)?;
        match results_type {
            ResultsType::Cumulative => Ok(now),
            ResultsType::Incremental => match interval.checked_sub(1) {
                Some(previous) => Ok(now - self.staged_cumulative(previous, &poi, effect, group)?),
                None => Ok(now),
            },
        }
    }

    fn staged_cumulative(
        &self,
        interval: IntervalIndex,
        poi: &MappedPoi,
        effect: ForceEffect,
        group: &str,
    ) -> AnalysisResult<f64> {
        let line = self.line;
        let seg = line.storage.segment(poi.poi.segment)?;
        if interval < seg.erection_interval {
            return Ok(if effect.is_force() {
                let forces = seg.cumulative_section_forces(interval, poi.x, group)?;
                local_force(&forces, effect, poi.poi.distance <= line.layout.tolerance)
            } else {
                displacement_component(seg.cumulative_displacement(interval, poi.x, group)?, effect)
            });
        }

        let girder = group == ProductLoad::Girder.name();
        let target = Target::Poi(*poi, effect);
        if effect.is_force() || (girder && !line.options.storage_correction) {
            return self.model_group(interval, &target, group, ResultsType::Cumulative);
        }

        // stored shape seen from the erection supports, then what the
        // erected structure adds
        let erected = seg.erection_interval;
        let stored = seg.displacement(SegmentCondition::Storage, poi.x, group)?;
        let span = match line
            .layout
            .segments
            .get(poi.poi.segment)
            .and_then(|s| s.erection_span())
        {
            Some((x1, x2)) => Some((
                (x1, seg.displacement(SegmentCondition::Storage, x1, group)?),
                (x2, seg.displacement(SegmentCondition::Storage, x2, group)?),
            )),
            None => None,
        };
        let relative = displacement_component(relative_to_supports(stored, poi.x, span), effect);
        let correction = if girder {
            self.model_group(erected, &target, STORAGE_CORRECTION_GROUP, ResultsType::Incremental)?
        } else {
            0.0
        };
        let since_erection = self.model_group(interval, &target, group, ResultsType::Cumulative)?
            - self.model_group(erected, &target, group, ResultsType::Cumulative)?;
        Ok(relative + correction + since_erection)
    }

    /// Load case result, summed over its load groups
    pub fn case(
        &self,
        interval: IntervalIndex,
        target: &Target,
        case: LoadCase,
        results_type: ResultsType,
    ) -> AnalysisResult<f64> {
        let mut total = 0.0;
        for group in self.line.cases.get(&case).into_iter().flatten() {
            total += self.group(interval, target, group, results_type)?;
        }
        Ok(total)
    }

    /// Live load envelope of a model
    pub fn live_load(
        &self,
        interval: IntervalIndex,
        target: &Target,
        model: &str,
        opt: Optimization,
        query: LiveLoadQuery,
    ) -> AnalysisResult<LiveLoadResult> {
        let Some((quantity, sign)) = self.quantity(target, interval) else {
            return Ok(LiveLoadResult::none());
        };
        let model_opt = if sign < 0.0 { opt.inverse() } else { opt };
        let mut result = self
            .sub
            .model
            .live_load_response(interval, &quantity, model, model_opt, query)?;
        result.value *= sign;
        Ok(result)
    }

    /// Response to one placement of a live load model
    pub fn configuration(
        &self,
        interval: IntervalIndex,
        target: &Target,
        model: &str,
        configuration: &AxleConfiguration,
        query: LiveLoadQuery,
    ) -> AnalysisResult<f64> {
        let Some((quantity, sign)) = self.quantity(target, interval) else {
            return Ok(0.0);
        };
        Ok(sign
            * self
                .sub
                .model
                .configuration_response(interval, &quantity, model, configuration, query)?)
    }

    /// Load combination result as computed by the model
    pub fn combination(
        &self,
        interval: IntervalIndex,
        target: &Target,
        combination: &str,
        opt: Optimization,
    ) -> AnalysisResult<CombinationResult> {
        let Some((quantity, sign)) = self.quantity(target, interval) else {
            return Ok(CombinationResult {
                value: 0.0,
                live_load: None,
            });
        };
        let model_opt = if sign < 0.0 { opt.inverse() } else { opt };
        let mut result = self.sub.model.combination_response(
            interval,
            &quantity,
            combination,
            model_opt,
            ResultsType::Cumulative,
        )?;
        result.value *= sign;
        if let Some(live) = result.live_load.as_mut() {
            live.value *= sign;
        }
        Ok(result)
    }

    /// Reaction at one side of a pier
    ///
    /// A bearing line of its own reports its supports. A bearing shared by
    /// both girders is split by the shear entering it from each side plus the
    /// overhang load moved onto it from that side.
    pub fn bearing(
        &self,
        interval: IntervalIndex,
        group: &str,
        pier: usize,
        face: PierFace,
        results_type: ResultsType,
    ) -> AnalysisResult<f64> {
        let layout = self
            .line
            .layout
            .piers
            .get(pier)
            .ok_or(AnalysisError::PierNotFound(pier))?;
        let location = SupportLocation::Pier(pier);
        let tagged: Vec<_> = self
            .sub
            .topology
            .supports_at(location)
            .filter(|s| s.face == Some(face))
            .collect();
        if !tagged.is_empty() {
            let mut total = 0.0;
            for s in tagged.iter().filter(|s| s.is_active(interval) && !s.omit_reaction) {
                total += self.sub.model.reaction(interval, s.id, group, results_type)?.fy;
            }
            return Ok(total);
        }
        if self.supports(location, interval).is_empty() {
            return Ok(0.0);
        }

        let (x, overhang) = if layout.has_girder_ends() {
            let (bearing, segment, end) = match face {
                PierFace::Back => (layout.back_bearing, layout.back_segment, SegmentEnd::End),
                PierFace::Ahead => (layout.ahead_bearing, layout.ahead_segment, SegmentEnd::Start),
            };
            let (Some(x), Some(segment)) = (bearing, segment) else {
                return Ok(0.0);
            };
            let moved = self
                .sub
                .overhangs
                .load(segment, end, group, interval, results_type);
            (x, moved.fy)
        } else {
            (layout.station, 0.0)
        };
        let forces = self.sub.model.section_forces_at(interval, x, group, results_type)?;
        Ok(match face {
            PierFace::Back => forces.fy.left - overhang,
            PierFace::Ahead => forces.fy.right - overhang,
        })
    }
}

/// Envelope of the values of the models of an analysis type
pub(crate) fn envelope(analysis_type: BridgeAnalysisType, values: &[f64]) -> f64 {
    let fold = |f: fn(f64, f64) -> f64| values.iter().copied().reduce(f).unwrap_or(0.0);
    match analysis_type {
        BridgeAnalysisType::MinSimpleContinuousEnvelope => fold(f64::min),
        _ => fold(f64::max),
    }
}

/// Result an optimization prefers
pub(crate) fn optimum(opt: Optimization, values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .reduce(|best, v| if opt.improves(v, best) { v } else { best })
        .unwrap_or(0.0)
}

fn optimum_live_load(opt: Optimization, results: Vec<LiveLoadResult>) -> LiveLoadResult {
    results
        .into_iter()
        .reduce(|best, r| if opt.improves(r.value, best.value) { r } else { best })
        .unwrap_or_else(LiveLoadResult::none)
}

impl<M: StructuralModel> GirderLineModel<M> {
    /// Views of the models an analysis type needs
    pub(crate) fn views(&self, analysis_type: BridgeAnalysisType) -> AnalysisResult<Vec<ModelView<'_, M>>> {
        analysis_type
            .models()
            .iter()
            .map(|kind| {
                self.require(*kind, analysis_type)
                    .map(|sub| ModelView { line: self, sub })
            })
            .collect()
    }

    pub(crate) fn check_interval(&self, interval: IntervalIndex) -> AnalysisResult<()> {
        if interval < self.interval_count {
            Ok(())
        } else {
            Err(AnalysisError::IntervalNotFound(interval))
        }
    }

    /// Bring models up to date and map the points of a query
    pub(crate) fn prepare(
        &mut self,
        interval: IntervalIndex,
        pois: &[PointOfInterest],
    ) -> AnalysisResult<Vec<MappedPoi>> {
        self.check_interval(interval)?;
        self.refresh()?;
        self.map_pois(pois)
    }

    fn check_group(&self, group: &str) -> AnalysisResult<()> {
        let known = ProductLoad::from_name(group).is_some()
            || self.external.contains(group)
            || group == STORAGE_CORRECTION_GROUP
            || group == UNIT_LOAD_GROUP;
        if known {
            Ok(())
        } else {
            Err(AnalysisError::LoadingNotFound(group.to_string()))
        }
    }

    fn check_live_load(&self, name: &str) -> AnalysisResult<usize> {
        self.live_loads
            .get(name)
            .copied()
            .ok_or_else(|| AnalysisError::UnknownName(name.to_string()))
    }

    /// Results of a load group at points of interest
    #[allow(clippy::too_many_arguments)]
    pub fn load_group_results(
        &mut self,
        interval: IntervalIndex,
        group: &str,
        effect: ForceEffect,
        pois: &[PointOfInterest],
        analysis_type: BridgeAnalysisType,
        results_type: ResultsType,
    ) -> AnalysisResult<Vec<f64>> {
        self.check_group(group)?;
        let mapped = self.prepare(interval, pois)?;
        let views = self.views(analysis_type)?;
        mapped
            .iter()
            .map(|poi| {
                let target = Target::Poi(*poi, effect);
                let values = views
                    .iter()
                    .map(|p| p.group(interval, &target, group, results_type))
                    .collect::<AnalysisResult<Vec<_>>>()?;
                Ok(envelope(analysis_type, &values))
            })
            .collect()
    }

    /// Results of a product load at points of interest
    pub fn product_results(
        &mut self,
        interval: IntervalIndex,
        product: ProductLoad,
        effect: ForceEffect,
        pois: &[PointOfInterest],
        analysis_type: BridgeAnalysisType,
        results_type: ResultsType,
    ) -> AnalysisResult<Vec<f64>> {
        self.load_group_results(interval, product.name(), effect, pois, analysis_type, results_type)
    }

    /// Results of an external loading at points of interest
    pub fn loading_results(
        &mut self,
        interval: IntervalIndex,
        loading: &str,
        effect: ForceEffect,
        pois: &[PointOfInterest],
        analysis_type: BridgeAnalysisType,
        results_type: ResultsType,
    ) -> AnalysisResult<Vec<f64>> {
        self.external.get(loading)?;
        self.load_group_results(interval, loading, effect, pois, analysis_type, results_type)
    }

    /// Axial force, shear and moment of a product load
    pub fn product_forces(
        &mut self,
        interval: IntervalIndex,
        product: ProductLoad,
        pois: &[PointOfInterest],
        analysis_type: BridgeAnalysisType,
        results_type: ResultsType,
    ) -> AnalysisResult<Vec<GirderForces>> {
        let mut query = |effect| {
            self.product_results(interval, product, effect, pois, analysis_type, results_type)
        };
        let axial = query(ForceEffect::Fx)?;
        let shear = query(ForceEffect::Fy)?;
        let moment = query(ForceEffect::Mz)?;
        Ok((0..pois.len())
            .map(|k| GirderForces {
                axial: axial[k],
                shear: shear[k],
                moment: moment[k],
            })
            .collect())
    }

    /// Deflection and rotation of a product load
    pub fn product_deflections(
        &mut self,
        interval: IntervalIndex,
        product: ProductLoad,
        pois: &[PointOfInterest],
        analysis_type: BridgeAnalysisType,
        results_type: ResultsType,
    ) -> AnalysisResult<Vec<GirderDeflection>> {
        let deflection =
            self.product_results(interval, product, ForceEffect::Dy, pois, analysis_type, results_type)?;
        let rotation =
            self.product_results(interval, product, ForceEffect::Rz, pois, analysis_type, results_type)?;
        Ok(deflection
            .into_iter()
            .zip(rotation)
            .map(|(deflection, rotation)| GirderDeflection {
                deflection,
                rotation,
            })
            .collect())
    }

    /// Results of a load case at points of interest
    pub fn load_case_results(
        &mut self,
        interval: IntervalIndex,
        case: LoadCase,
        effect: ForceEffect,
        pois: &[PointOfInterest],
        analysis_type: BridgeAnalysisType,
        results_type: ResultsType,
    ) -> AnalysisResult<Vec<f64>> {
        let mapped = self.prepare(interval, pois)?;
        let views = self.views(analysis_type)?;
        mapped
            .iter()
            .map(|poi| {
                let target = Target::Poi(*poi, effect);
                let values = views
                    .iter()
                    .map(|p| p.case(interval, &target, case, results_type))
                    .collect::<AnalysisResult<Vec<_>>>()?;
                Ok(envelope(analysis_type, &values))
            })
            .collect()
    }

    /// Fiber stresses of a load group, accumulated with the section properties
    /// in effect in each interval
    pub fn load_group_stresses(
        &mut self,
        interval: IntervalIndex,
        group: &str,
        pois: &[PointOfInterest],
        analysis_type: BridgeAnalysisType,
        results_type: ResultsType,
    ) -> AnalysisResult<Vec<GirderStress>> {
        self.check_group(group)?;
        let mapped = self.prepare(interval, pois)?;
        let views = self.views(analysis_type)?;
        let first = match results_type {
            ResultsType::Incremental => interval,
            ResultsType::Cumulative => 0,
        };
        let mut stresses = Vec::with_capacity(mapped.len());
        for poi in &mapped {
            let mut per_model = Vec::with_capacity(views.len());
            for view in &views {
                let mut total = GirderStress::default();
                for k in first..=interval {
                    let axial = Target::Poi(*poi, ForceEffect::Fx);
                    let moment = Target::Poi(*poi, ForceEffect::Mz);
                    let n = view.group(k, &axial, group, ResultsType::Incremental)?;
                    let m = view.group(k, &moment, group, ResultsType::Incremental)?;
                    if n == 0.0 && m == 0.0 {
                        continue;
                    }
                    let stress = GirderStress::from_forces(&self.section_properties(poi, k)?, n, m);
                    total.top += stress.top;
                    total.bottom += stress.bottom;
                }
                per_model.push(total);
            }
            let tops: Vec<f64> = per_model.iter().map(|s| s.top).collect();
            let bottoms: Vec<f64> = per_model.iter().map(|s| s.bottom).collect();
            stresses.push(GirderStress {
                top: envelope(analysis_type, &tops),
                bottom: envelope(analysis_type, &bottoms),
            });
        }
        Ok(stresses)
    }

    /// Fiber stresses of a product load
    pub fn product_stresses(
        &mut self,
        interval: IntervalIndex,
        product: ProductLoad,
        pois: &[PointOfInterest],
        analysis_type: BridgeAnalysisType,
        results_type: ResultsType,
    ) -> AnalysisResult<Vec<GirderStress>> {
        self.load_group_stresses(interval, product.name(), pois, analysis_type, results_type)
    }

    /// Girder section properties at a point of interest in an interval
    pub(crate) fn section_properties(
        &self,
        poi: &MappedPoi,
        interval: IntervalIndex,
    ) -> AnalysisResult<SectionProperties> {
        let segment = self
            .line
            .segments
            .get(poi.poi.segment)
            .ok_or(AnalysisError::SegmentNotFound(poi.poi.segment))?;
        segment
            .properties_at(poi.poi.distance, interval >= self.events.composite_deck)
            .ok_or_else(|| {
                AnalysisError::InvalidBridge(format!("segment {} has no sections", poi.poi.segment))
            })
    }

    /// Live load envelope of a live load type
    #[allow(clippy::too_many_arguments)]
    pub fn live_load_results(
        &mut self,
        interval: IntervalIndex,
        live_load: LiveLoadType,
        effect: ForceEffect,
        pois: &[PointOfInterest],
        analysis_type: BridgeAnalysisType,
        opt: Optimization,
        query: LiveLoadQuery,
    ) -> AnalysisResult<Vec<LiveLoadResult>> {
        self.live_load_model_results(interval, live_load.name(), effect, pois, analysis_type, opt, query)
    }

    /// Live load response of one vehicle, with the placement that governs
    #[allow(clippy::too_many_arguments)]
    pub fn vehicle_results(
        &mut self,
        interval: IntervalIndex,
        live_load: LiveLoadType,
        vehicle: usize,
        effect: ForceEffect,
        pois: &[PointOfInterest],
        analysis_type: BridgeAnalysisType,
        opt: Optimization,
    ) -> AnalysisResult<Vec<LiveLoadResult>> {
        let count = self.check_live_load(live_load.name())?;
        if vehicle >= count {
            return Err(AnalysisError::InvalidInput(format!(
                "{} has {count} vehicles, vehicle {vehicle} requested",
                live_load.name()
            )));
        }
        self.live_load_model_results(
            interval,
            live_load.name(),
            effect,
            pois,
            analysis_type,
            opt,
            LiveLoadQuery::vehicle(vehicle),
        )
    }

    /// Response of one sub-model to a fixed placement of a live load type,
    /// such as the placement that governs another effect
    #[allow(clippy::too_many_arguments)]
    pub fn live_load_configuration_results(
        &mut self,
        interval: IntervalIndex,
        live_load: LiveLoadType,
        configuration: &AxleConfiguration,
        effect: ForceEffect,
        pois: &[PointOfInterest],
        kind: ModelKind,
        query: LiveLoadQuery,
    ) -> AnalysisResult<Vec<f64>> {
        self.check_live_load(live_load.name())?;
        let mapped = self.prepare(interval, pois)?;
        let analysis_type = match kind {
            ModelKind::Simple => BridgeAnalysisType::SimpleSpan,
            ModelKind::Continuous => BridgeAnalysisType::ContinuousSpan,
        };
        let view = ModelView {
            line: &*self,
            sub: self.require(kind, analysis_type)?,
        };
        mapped
            .iter()
            .map(|poi| {
                let target = Target::Poi(*poi, effect);
                view.configuration(interval, &target, live_load.name(), configuration, query)
            })
            .collect()
    }

    /// Live load deflection of the design truck alone, 25% of the truck with
    /// lane load, or the envelope of both
    pub fn deflection_live_load_results(
        &mut self,
        interval: IntervalIndex,
        kind: DeflectionLiveLoadType,
        pois: &[PointOfInterest],
        analysis_type: BridgeAnalysisType,
        opt: Optimization,
    ) -> AnalysisResult<Vec<LiveLoadResult>> {
        let models = match kind {
            DeflectionLiveLoadType::Envelope => vec![
                DeflectionLiveLoadType::DesignTruckAlone,
                DeflectionLiveLoadType::Design25PlusLane,
            ],
            single => vec![single],
        };
        let mut per_model = Vec::with_capacity(models.len());
        for model in models {
            per_model.push(self.live_load_model_results(
                interval,
                model.name(),
                ForceEffect::Dy,
                pois,
                analysis_type,
                opt,
                LiveLoadQuery::default(),
            )?);
        }
        Ok((0..pois.len())
            .map(|k| optimum_live_load(opt, per_model.iter().map(|r| r[k].clone()).collect()))
            .collect())
    }

    #[allow(clippy::too_many_arguments)]
    fn live_load_model_results(
        &mut self,
        interval: IntervalIndex,
        model: &str,
        effect: ForceEffect,
        pois: &[PointOfInterest],
        analysis_type: BridgeAnalysisType,
        opt: Optimization,
        query: LiveLoadQuery,
    ) -> AnalysisResult<Vec<LiveLoadResult>> {
        self.check_live_load(model)?;
        let mapped = self.prepare(interval, pois)?;
        let views = self.views(analysis_type)?;
        mapped
            .iter()
            .map(|poi| {
                let target = Target::Poi(*poi, effect);
                let results = views
                    .iter()
                    .map(|p| p.live_load(interval, &target, model, opt, query))
                    .collect::<AnalysisResult<Vec<_>>>()?;
                Ok(optimum_live_load(opt, results))
            })
            .collect()
    }

    /// Reaction of the supports at a location, positive up
    pub fn reaction(
        &mut self,
        interval: IntervalIndex,
        group: &str,
        location: SupportLocation,
        analysis_type: BridgeAnalysisType,
        results_type: ResultsType,
    ) -> AnalysisResult<f64> {
        self.check_group(group)?;
        self.check_location(location)?;
        self.prepare(interval, &[])?;
        let target = Target::Support(location, ForceEffect::Fy);
        let values = self
            .views(analysis_type)?
            .iter()
            .map(|p| p.group(interval, &target, group, results_type))
            .collect::<AnalysisResult<Vec<_>>>()?;
        Ok(envelope(analysis_type, &values))
    }

    /// Load case reaction at a location
    pub fn load_case_reaction(
        &mut self,
        interval: IntervalIndex,
        case: LoadCase,
        location: SupportLocation,
        analysis_type: BridgeAnalysisType,
        results_type: ResultsType,
    ) -> AnalysisResult<f64> {
        self.check_location(location)?;
        self.prepare(interval, &[])?;
        let target = Target::Support(location, ForceEffect::Fy);
        let values = self
            .views(analysis_type)?
            .iter()
            .map(|p| p.case(interval, &target, case, results_type))
            .collect::<AnalysisResult<Vec<_>>>()?;
        Ok(envelope(analysis_type, &values))
    }

    /// Reaction under one side of a pier
    pub fn bearing_reaction(
        &mut self,
        interval: IntervalIndex,
        group: &str,
        pier: usize,
        face: PierFace,
        analysis_type: BridgeAnalysisType,
        results_type: ResultsType,
    ) -> AnalysisResult<f64> {
        self.check_group(group)?;
        self.prepare(interval, &[])?;
        let values = self
            .views(analysis_type)?
            .iter()
            .map(|p| p.bearing(interval, group, pier, face, results_type))
            .collect::<AnalysisResult<Vec<_>>>()?;
        Ok(envelope(analysis_type, &values))
    }

    /// Live load reaction at a location
    pub fn live_load_reaction(
        &mut self,
        interval: IntervalIndex,
        live_load: LiveLoadType,
        location: SupportLocation,
        analysis_type: BridgeAnalysisType,
        opt: Optimization,
        query: LiveLoadQuery,
    ) -> AnalysisResult<LiveLoadResult> {
        self.check_live_load(live_load.name())?;
        self.check_location(location)?;
        self.prepare(interval, &[])?;
        let target = Target::Support(location, ForceEffect::Fy);
        let results = self
            .views(analysis_type)?
            .iter()
            .map(|p| p.live_load(interval, &target, live_load.name(), opt, query))
            .collect::<AnalysisResult<Vec<_>>>()?;
        Ok(optimum_live_load(opt, results))
    }

    pub(crate) fn check_location(&self, location: SupportLocation) -> AnalysisResult<()> {
        match location {
            SupportLocation::Pier(p) if p >= self.layout.piers.len() => {
                Err(AnalysisError::PierNotFound(p))
            }
            SupportLocation::TemporarySupport(t) if t >= self.layout.temporary_supports.len() => {
                Err(AnalysisError::TemporarySupportNotFound(t))
            }
            _ => Ok(()),
        }
    }

    /// Force and moment moved from an overhang to a segment end
    pub fn overhang_load(
        &self,
        kind: ModelKind,
        segment: usize,
        end: SegmentEnd,
        group: &str,
        interval: IntervalIndex,
        results_type: ResultsType,
    ) -> AnalysisResult<OverhangLoad> {
        let analysis_type = match kind {
            ModelKind::Simple => BridgeAnalysisType::SimpleSpan,
            ModelKind::Continuous => BridgeAnalysisType::ContinuousSpan,
        };
        let sub = self.require(kind, analysis_type)?;
        Ok(sub.overhangs.load(segment, end, group, interval, results_type))
    }

    /// Stations where a uniform load over the whole girder line changes the
    /// sign of the moment in the live load interval
    pub fn contraflexure_points(&mut self, kind: ModelKind) -> AnalysisResult<Vec<f64>> {
        self.refresh()?;
        let analysis_type = match kind {
            ModelKind::Simple => BridgeAnalysisType::SimpleSpan,
            ModelKind::Continuous => BridgeAnalysisType::ContinuousSpan,
        };
        let sub = self.require(kind, analysis_type)?;
        Ok(sub.model.contraflexure_points(
            self.events.live_load,
            UNIT_LOAD_GROUP,
            ResultsType::Cumulative,
        )?)
    }

    /// Response at `target` to a unit force or moment at `at`
    pub fn unit_load_response(
        &mut self,
        interval: IntervalIndex,
        at: &PointOfInterest,
        unit: UnitLoad,
        target: &PointOfInterest,
        kind: ModelKind,
    ) -> AnalysisResult<(GirderForces, GirderDeflection)> {
        let mapped = self.prepare(interval, &[*at, *target])?;
        let (load, response) = (mapped[0], mapped[1]);
        let analysis_type = match kind {
            ModelKind::Simple => BridgeAnalysisType::SimpleSpan,
            ModelKind::Continuous => BridgeAnalysisType::ContinuousSpan,
        };
        let sub = self.require(kind, analysis_type)?;
        let (forces, d) = sub.model.unit_load_response(interval, load.id, unit, response.id)?;
        Ok((
            GirderForces::from_section(&forces, response.at_start),
            GirderDeflection {
                deflection: d.dy,
                rotation: d.rz,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use girder_fem::prelude::SectionValue;

    #[test]
    fn test_sign_convention_reads_right_face_at_start() {
        let forces = SectionForces {
            fx: SectionValue::new(10.0, -12.0),
            fy: SectionValue::new(-5.0, 7.0),
            mz: SectionValue::new(40.0, -45.0),
        };
        let inside = GirderForces::from_section(&forces, false);
        assert_eq!(inside, GirderForces { axial: 10.0, shear: 5.0, moment: 40.0 });
        let start = GirderForces::from_section(&forces, true);
        assert_eq!(start, GirderForces { axial: 12.0, shear: 7.0, moment: 45.0 });
    }

    #[test]
    fn test_envelope_and_optimum() {
        let values = [3.0, -1.0];
        assert_eq!(envelope(BridgeAnalysisType::MaxSimpleContinuousEnvelope, &values), 3.0);
        assert_eq!(envelope(BridgeAnalysisType::MinSimpleContinuousEnvelope, &values), -1.0);
        assert_eq!(envelope(BridgeAnalysisType::SimpleSpan, &[2.0]), 2.0);
        assert_eq!(optimum(Optimization::Minimize, &values), -1.0);
        assert_eq!(optimum(Optimization::Maximize, &values), 3.0);
    }

    #[test]
    fn test_fiber_stresses() {
        let props = SectionProperties {
            area: 0.5,
            inertia: 0.1,
            s_top: 0.2,
            s_bottom: 0.25,
        };
        let stress = GirderStress::from_forces(&props, -1000.0, 100.0);
        assert_relative_eq!(stress.top, -2000.0 - 500.0);
        assert_relative_eq!(stress.bottom, -2000.0 + 400.0);
    }
}
