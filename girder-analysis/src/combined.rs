//! Limit state results
//!
//! A limit state is read from the model's own combination when the model can
//! produce it. Otherwise it is reassembled from its load cases: before a
//! segment is erected, for girder deflections that carry the storage
//! correction, with pretension included, when the live load factor depends on
//! the governing truck, and before the live load interval. Concurrent shears
//! are always reassembled so the shear is read from the case signs and truck
//! placement that produce the extreme moment.

use girder_fem::prelude::{
    ForceEffect, LiveLoadApplication, LiveLoadQuery, LiveLoadResult, Optimization, ResultsType,
};
use serde::Serialize;

use crate::combinations::{LimitState, LimitStateDefinition};
use crate::error::{AnalysisError, AnalysisResult};
use crate::model::{GirderLineModel, MappedPoi};
use crate::poi::PointOfInterest;
use crate::response::{optimum, GirderStress, ModelView, Target};
use crate::structural::StructuralModel;
use crate::types::{
    BridgeAnalysisType, IntervalIndex, LiveLoadType, LoadCase, Named, ProductLoad, SupportLocation,
};

/// Factored live load of a limit state at one point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitStateLiveLoad {
    /// Live load factor used, resolved for the governing truck
    pub factor: f64,
    /// Governing vehicular result, unfactored
    pub vehicular: LiveLoadResult,
    /// Pedestrian result, unfactored
    pub pedestrian: f64,
    /// Factored total
    pub value: f64,
}

impl LimitStateLiveLoad {
    fn none() -> Self {
        Self {
            factor: 0.0,
            vehicular: LiveLoadResult::none(),
            pedestrian: 0.0,
            value: 0.0,
        }
    }
}

fn case_factor(
    definition: &LimitStateDefinition,
    opt: Optimization,
    value: f64,
    case: LoadCase,
) -> f64 {
    let factors = definition.factor(case);
    if opt.favors(value) {
        factors.max
    } else {
        factors.min
    }
}

fn combine_pedestrian(
    application: LiveLoadApplication,
    opt: Optimization,
    vehicular: f64,
    pedestrian: f64,
) -> f64 {
    match application {
        LiveLoadApplication::Sum => vehicular + pedestrian,
        LiveLoadApplication::Envelope => {
            if opt.improves(pedestrian, vehicular) {
                pedestrian
            } else {
                vehicular
            }
        }
    }
}

impl<'a, M: StructuralModel> ModelView<'a, M> {
    /// Governing vehicle result and the factor that goes with it
    fn governing_vehicle(
        &self,
        interval: IntervalIndex,
        target: &Target,
        definition: &LimitStateDefinition,
        opt: Optimization,
    ) -> AnalysisResult<(f64, LiveLoadResult)> {
        let model = definition.live_load.name();
        let Some(&count) = self.line.live_loads.get(model) else {
            return Ok((0.0, LiveLoadResult::none()));
        };
        if !definition.is_weight_dependent() {
            let result = self.live_load(interval, target, model, opt, LiveLoadQuery::default())?;
            return Ok((definition.live_load_factor, result));
        }

        let table = &self.line.combinations;
        let mut best: Option<(f64, LiveLoadResult)> = None;
        for vehicle in 0..count {
            let result = self.live_load(interval, target, model, opt, LiveLoadQuery::vehicle(vehicle))?;
            let factor = table.live_load_factor(definition.limit_state, result.configuration.as_ref());
            let better = match &best {
                Some((f, r)) => opt.improves(factor * result.value, f * r.value),
                None => true,
            };
            if better {
                best = Some((factor, result));
            }
        }
        Ok(best.unwrap_or((0.0, LiveLoadResult::none())))
    }

    /// Factored live load of a limit state
    pub fn limit_state_live_load(
        &self,
        interval: IntervalIndex,
        target: &Target,
        definition: &LimitStateDefinition,
        opt: Optimization,
    ) -> AnalysisResult<LimitStateLiveLoad> {
        if interval < self.line.events.live_load {
            return Ok(LimitStateLiveLoad::none());
        }
        let (factor, vehicular) = self.governing_vehicle(interval, target, definition, opt)?;
        let pedestrian_model = LiveLoadType::Pedestrian.name();
        let (pedestrian, combined) = match definition.pedestrian {
            Some(application) if self.line.live_loads.contains_key(pedestrian_model) => {
                let p = self
                    .live_load(interval, target, pedestrian_model, opt, LiveLoadQuery::default())?
                    .value;
                (p, combine_pedestrian(application, opt, vehicular.value, p))
            }
            _ => (0.0, vehicular.value),
        };
        Ok(LimitStateLiveLoad {
            factor,
            value: factor * combined,
            vehicular,
            pedestrian,
        })
    }

    /// Factored dead and time-dependent load of a limit state
    fn limit_state_dead(
        &self,
        interval: IntervalIndex,
        target: &Target,
        definition: &LimitStateDefinition,
        opt: Optimization,
    ) -> AnalysisResult<f64> {
        let mut total = 0.0;
        for case in definition.cases.keys() {
            let value = self.case(interval, target, *case, ResultsType::Cumulative)?;
            total += case_factor(definition, opt, value, *case) * value;
        }
        Ok(total)
    }

    fn is_native(
        &self,
        interval: IntervalIndex,
        target: &Target,
        definition: &LimitStateDefinition,
        include_prestress: bool,
    ) -> AnalysisResult<bool> {
        if definition.is_weight_dependent()
            || include_prestress
            || interval < self.line.events.live_load
        {
            return Ok(false);
        }
        Ok(match target {
            Target::Poi(poi, effect) => {
                let corrected = !effect.is_force() && self.line.options.storage_correction;
                !corrected && interval >= self.line.erection_interval(poi.poi.segment)?
            }
            Target::Support(..) => true,
        })
    }

    /// Limit state result at a target
    pub fn limit_state(
        &self,
        interval: IntervalIndex,
        target: &Target,
        definition: &LimitStateDefinition,
        opt: Optimization,
        include_prestress: bool,
    ) -> AnalysisResult<f64> {
        if self.is_native(interval, target, definition, include_prestress)? {
            let name = definition.limit_state.name();
            return Ok(self.combination(interval, target, name, opt)?.value);
        }
        let mut total = self.limit_state_dead(interval, target, definition, opt)?;
        if include_prestress {
            if let Target::Poi(..) = target {
                let pretension = ProductLoad::Pretension.name();
                total += self.group(interval, target, pretension, ResultsType::Cumulative)?;
            }
        }
        total += self.limit_state_live_load(interval, target, definition, opt)?.value;
        Ok(total)
    }

    /// Extreme moment and the shear acting with it
    fn concurrent_shear(
        &self,
        interval: IntervalIndex,
        poi: &MappedPoi,
        definition: &LimitStateDefinition,
        opt: Optimization,
    ) -> AnalysisResult<(f64, f64)> {
        let moment = Target::Poi(*poi, ForceEffect::Mz);
        let shear = Target::Poi(*poi, ForceEffect::Fy);
        let (mut m, mut v) = (0.0, 0.0);
        for case in definition.cases.keys() {
            let cm = self.case(interval, &moment, *case, ResultsType::Cumulative)?;
            let cv = self.case(interval, &shear, *case, ResultsType::Cumulative)?;
            let factor = case_factor(definition, opt, cm, *case);
            m += factor * cm;
            v += factor * cv;
        }
        if interval < self.line.events.live_load {
            return Ok((m, v));
        }

        let (factor, vehicular) = self.governing_vehicle(interval, &moment, definition, opt)?;
        let mut live_m = vehicular.value;
        let mut live_v = match &vehicular.configuration {
            Some(config) => self.configuration(
                interval,
                &shear,
                definition.live_load.name(),
                config,
                LiveLoadQuery::default(),
            )?,
            None => 0.0,
        };
        let pedestrian_model = LiveLoadType::Pedestrian.name();
        if let (Some(application), true) = (
            definition.pedestrian,
            self.line.live_loads.contains_key(pedestrian_model),
        ) {
            let p = self.live_load(interval, &moment, pedestrian_model, opt, LiveLoadQuery::default())?;
            let pv = match &p.configuration {
                Some(config) => self.configuration(
                    interval,
                    &shear,
                    pedestrian_model,
                    config,
                    LiveLoadQuery::default(),
                )?,
                None => 0.0,
            };
            match application {
                LiveLoadApplication::Sum => {
                    live_m += p.value;
                    live_v += pv;
                }
                LiveLoadApplication::Envelope => {
                    if opt.improves(p.value, live_m) {
                        live_m = p.value;
                        live_v = pv;
                    }
                }
            }
        }
        Ok((m + factor * live_m, v + factor * live_v))
    }

    /// Fiber stresses of a limit state
    fn limit_state_stress(
        &self,
        interval: IntervalIndex,
        poi: &MappedPoi,
        definition: &LimitStateDefinition,
        opt: Optimization,
        include_prestress: bool,
    ) -> AnalysisResult<GirderStress> {
        let axial = Target::Poi(*poi, ForceEffect::Fx);
        let moment = Target::Poi(*poi, ForceEffect::Mz);
        let line = self.line;

        // stress of a load case, accumulated with the properties of each interval
        let case_stress = |case| -> AnalysisResult<GirderStress> {
            let mut total = GirderStress::default();
            for k in 0..=interval {
                let n = self.case(k, &axial, case, ResultsType::Incremental)?;
                let m = self.case(k, &moment, case, ResultsType::Incremental)?;
                if n == 0.0 && m == 0.0 {
                    continue;
                }
                let s = GirderStress::from_forces(&line.section_properties(poi, k)?, n, m);
                total.top += s.top;
                total.bottom += s.bottom;
            }
            Ok(total)
        };

        let mut stress = GirderStress::default();
        for case in definition.cases.keys() {
            let s = case_stress(*case)?;
            stress.top += case_factor(definition, opt, s.top, *case) * s.top;
            stress.bottom += case_factor(definition, opt, s.bottom, *case) * s.bottom;
        }
        if include_prestress {
            let pretension = ProductLoad::Pretension.name();
            for k in 0..=interval {
                let n = self.group(k, &axial, pretension, ResultsType::Incremental)?;
                let m = self.group(k, &moment, pretension, ResultsType::Incremental)?;
                let s = GirderStress::from_forces(&line.section_properties(poi, k)?, n, m);
                stress.top += s.top;
                stress.bottom += s.bottom;
            }
        }
        if interval >= line.events.live_load {
            let props = line.section_properties(poi, interval)?;
            // top fiber stress grows as the moment falls
            let top = self.limit_state_live_load(interval, &moment, definition, opt.inverse())?;
            let bottom = self.limit_state_live_load(interval, &moment, definition, opt)?;
            stress.top += GirderStress::from_forces(&props, 0.0, top.value).top;
            stress.bottom += GirderStress::from_forces(&props, 0.0, bottom.value).bottom;
        }
        Ok(stress)
    }
}

impl<M: StructuralModel> GirderLineModel<M> {
    fn limit_state_definition(&self, limit_state: LimitState) -> AnalysisResult<LimitStateDefinition> {
        self.combinations
            .definition(limit_state)
            .cloned()
            .ok_or_else(|| AnalysisError::UnknownName(limit_state.name().to_string()))
    }

    /// Limit state results at points of interest
    ///
    /// With `include_prestress` the pretension effect is added; post-tensioning
    /// secondary effects are always part of a limit state through PS.
    #[allow(clippy::too_many_arguments)]
    pub fn limit_state_results(
        &mut self,
        interval: IntervalIndex,
        limit_state: LimitState,
        effect: ForceEffect,
        pois: &[PointOfInterest],
        analysis_type: BridgeAnalysisType,
        opt: Optimization,
        include_prestress: bool,
    ) -> AnalysisResult<Vec<f64>> {
        let definition = self.limit_state_definition(limit_state)?;
        let mapped = self.prepare(interval, pois)?;
        let views = self.views(analysis_type)?;
        mapped
            .iter()
            .map(|poi| {
                let target = Target::Poi(*poi, effect);
                let values = views
                    .iter()
                    .map(|p| p.limit_state(interval, &target, &definition, opt, include_prestress))
                    .collect::<AnalysisResult<Vec<_>>>()?;
                Ok(optimum(opt, &values))
            })
            .collect()
    }

    /// Limit state reaction at a location
    pub fn limit_state_reaction(
        &mut self,
        interval: IntervalIndex,
        limit_state: LimitState,
        location: SupportLocation,
        analysis_type: BridgeAnalysisType,
        opt: Optimization,
    ) -> AnalysisResult<f64> {
        let definition = self.limit_state_definition(limit_state)?;
        self.check_location(location)?;
        self.prepare(interval, &[])?;
        let target = Target::Support(location, ForceEffect::Fy);
        let values = self
            .views(analysis_type)?
            .iter()
            .map(|p| p.limit_state(interval, &target, &definition, opt, false))
            .collect::<AnalysisResult<Vec<_>>>()?;
        Ok(optimum(opt, &values))
    }

    /// Extreme limit state moments and the shears acting with them, as
    /// `(moment, shear)` pairs
    pub fn concurrent_shears(
        &mut self,
        interval: IntervalIndex,
        limit_state: LimitState,
        pois: &[PointOfInterest],
        analysis_type: BridgeAnalysisType,
        opt: Optimization,
    ) -> AnalysisResult<Vec<(f64, f64)>> {
        let definition = self.limit_state_definition(limit_state)?;
        let mapped = self.prepare(interval, pois)?;
        let views = self.views(analysis_type)?;
        mapped
            .iter()
            .map(|poi| {
                let mut best: Option<(f64, f64)> = None;
                for view in &views {
                    let (m, v) = view.concurrent_shear(interval, poi, &definition, opt)?;
                    if best.map_or(true, |(bm, _)| opt.improves(m, bm)) {
                        best = Some((m, v));
                    }
                }
                Ok(best.unwrap_or_default())
            })
            .collect()
    }

    /// Limit state fiber stresses; each fiber is optimized on its own
    pub fn limit_state_stresses(
        &mut self,
        interval: IntervalIndex,
        limit_state: LimitState,
        pois: &[PointOfInterest],
        analysis_type: BridgeAnalysisType,
        opt: Optimization,
        include_prestress: bool,
    ) -> AnalysisResult<Vec<GirderStress>> {
        let definition = self.limit_state_definition(limit_state)?;
        let mapped = self.prepare(interval, pois)?;
        let views = self.views(analysis_type)?;
        mapped
            .iter()
            .map(|poi| {
                let per_model = views
                    .iter()
                    .map(|p| p.limit_state_stress(interval, poi, &definition, opt, include_prestress))
                    .collect::<AnalysisResult<Vec<_>>>()?;
                let tops: Vec<f64> = per_model.iter().map(|s| s.top).collect();
                let bottoms: Vec<f64> = per_model.iter().map(|s| s.bottom).collect();
                Ok(GirderStress {
                    top: optimum(opt, &tops),
                    bottom: optimum(opt, &bottoms),
                })
            })
            .collect()
    }

    /// Factored live load of a rating limit state, with the governing truck
    /// and the factor used for it
    pub fn rating_live_load_results(
        &mut self,
        interval: IntervalIndex,
        limit_state: LimitState,
        effect: ForceEffect,
        pois: &[PointOfInterest],
        analysis_type: BridgeAnalysisType,
        opt: Optimization,
    ) -> AnalysisResult<Vec<LimitStateLiveLoad>> {
        if !limit_state.is_rating() {
            return Err(AnalysisError::InvalidInput(format!(
                "{} is not a rating limit state",
                limit_state.name()
            )));
        }
        let definition = self.limit_state_definition(limit_state)?;
        let mapped = self.prepare(interval, pois)?;
        let views = self.views(analysis_type)?;
        mapped
            .iter()
            .map(|poi| {
                let target = Target::Poi(*poi, effect);
                let mut best: Option<LimitStateLiveLoad> = None;
                for view in &views {
                    let result = view.limit_state_live_load(interval, &target, &definition, opt)?;
                    if best.as_ref().map_or(true, |b| opt.improves(result.value, b.value)) {
                        best = Some(result);
                    }
                }
                Ok(best.unwrap_or_else(LimitStateLiveLoad::none))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_factor_follows_sign() {
        let def = LimitStateDefinition::standard(LimitState::StrengthI, false);
        assert_eq!(case_factor(&def, Optimization::Maximize, 10.0, LoadCase::DC), 1.25);
        assert_eq!(case_factor(&def, Optimization::Maximize, -10.0, LoadCase::DC), 0.90);
        assert_eq!(case_factor(&def, Optimization::Minimize, -10.0, LoadCase::DC), 1.25);
    }

    #[test]
    fn test_pedestrian_application() {
        assert_eq!(combine_pedestrian(LiveLoadApplication::Sum, Optimization::Maximize, 5.0, 2.0), 7.0);
        assert_eq!(
            combine_pedestrian(LiveLoadApplication::Envelope, Optimization::Maximize, 5.0, 2.0),
            5.0
        );
        assert_eq!(
            combine_pedestrian(LiveLoadApplication::Envelope, Optimization::Minimize, -1.0, -3.0),
            -3.0
        );
    }
}
