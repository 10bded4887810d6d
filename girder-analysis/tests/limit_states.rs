mod common;

use approx::assert_relative_eq;
use common::*;
use girder_analysis::bridge::{LiveLoadModelSettings, PedestrianApplication, VehicleSpec};
use girder_analysis::prelude::*;

const CONTINUOUS: BridgeAnalysisType = BridgeAnalysisType::ContinuousSpan;

fn case_sum(
    model: &mut GirderLineModel,
    interval: IntervalIndex,
    effect: ForceEffect,
    pois: &[PointOfInterest],
) -> Vec<f64> {
    let mut total = vec![0.0; pois.len()];
    for case in [LoadCase::DC, LoadCase::DW, LoadCase::PS] {
        let values = model
            .load_case_results(interval, case, effect, pois, CONTINUOUS, ResultsType::Cumulative)
            .unwrap();
        for (t, v) in total.iter_mut().zip(values) {
            *t += v;
        }
    }
    total
}

#[test]
fn test_service_i_matches_sum_of_cases() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, CONTINUOUS).unwrap();
    let pois = [midspan(model)];

    let native = model
        .limit_state_results(
            LIVE_LOAD,
            LimitState::ServiceI,
            ForceEffect::Mz,
            &pois,
            CONTINUOUS,
            Optimization::Maximize,
            false,
        )
        .unwrap();
    // no pretension on this bridge, so the reassembled result must agree
    let reassembled = model
        .limit_state_results(
            LIVE_LOAD,
            LimitState::ServiceI,
            ForceEffect::Mz,
            &pois,
            CONTINUOUS,
            Optimization::Maximize,
            true,
        )
        .unwrap();

    let dead = case_sum(model, LIVE_LOAD, ForceEffect::Mz, &pois);
    let mut live = |ll| {
        model
            .live_load_results(
                LIVE_LOAD,
                ll,
                ForceEffect::Mz,
                &pois,
                CONTINUOUS,
                Optimization::Maximize,
                LiveLoadQuery::default(),
            )
            .unwrap()[0]
            .value
    };
    let design = live(LiveLoadType::Design);
    let pedestrian = live(LiveLoadType::Pedestrian);

    assert!(design > 0.0);
    assert_relative_eq!(native[0], reassembled[0], max_relative = 1e-6);
    assert_relative_eq!(native[0], dead[0] + design + pedestrian, max_relative = 1e-6);
}

#[test]
fn test_limit_state_before_traffic_is_dead_load_only() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, CONTINUOUS).unwrap();
    let pois = span_points(model);
    let interval = LIVE_LOAD - 1;

    let service = model
        .limit_state_results(
            interval,
            LimitState::ServiceI,
            ForceEffect::Mz,
            &pois,
            CONTINUOUS,
            Optimization::Maximize,
            false,
        )
        .unwrap();
    let dead = case_sum(model, interval, ForceEffect::Mz, &pois);

    let scale = dead.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    for (s, d) in service.iter().zip(&dead) {
        assert_relative_eq!(*s, *d, epsilon = 1e-9 * scale);
    }
}

#[test]
fn test_strength_i_envelope_is_ordered() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager
        .ensure_built(0, BridgeAnalysisType::MaxSimpleContinuousEnvelope)
        .unwrap();
    let pois = span_points(model);

    for effect in [ForceEffect::Mz, ForceEffect::Fy] {
        let max = model
            .limit_state_results(
                LIVE_LOAD,
                LimitState::StrengthI,
                effect,
                &pois,
                BridgeAnalysisType::MaxSimpleContinuousEnvelope,
                Optimization::Maximize,
                false,
            )
            .unwrap();
        let min = model
            .limit_state_results(
                LIVE_LOAD,
                LimitState::StrengthI,
                effect,
                &pois,
                BridgeAnalysisType::MinSimpleContinuousEnvelope,
                Optimization::Minimize,
                false,
            )
            .unwrap();
        for (lo, hi) in min.iter().zip(&max) {
            assert!(lo <= hi);
        }
    }
}

#[test]
fn test_concurrent_shear_moment_matches_limit_state() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, CONTINUOUS).unwrap();
    let pois = span_points(model);

    for opt in [Optimization::Maximize, Optimization::Minimize] {
        let moments = model
            .limit_state_results(
                LIVE_LOAD,
                LimitState::StrengthI,
                ForceEffect::Mz,
                &pois,
                CONTINUOUS,
                opt,
                false,
            )
            .unwrap();
        let pairs = model
            .concurrent_shears(LIVE_LOAD, LimitState::StrengthI, &pois, CONTINUOUS, opt)
            .unwrap();
        let scale = moments.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        for ((m, _), expected) in pairs.iter().zip(&moments) {
            assert_relative_eq!(*m, *expected, epsilon = 1e-6 * scale);
        }
    }
}

#[test]
fn test_concurrent_shear_comes_from_the_moment_placement() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, CONTINUOUS).unwrap();
    let pois = span_points(model);
    let limit_state = LimitState::StrengthI;
    let definition = model.combinations().definition(limit_state).unwrap().clone();
    let query = LiveLoadQuery::default();

    for opt in [Optimization::Maximize, Optimization::Minimize] {
        let pairs = model
            .concurrent_shears(LIVE_LOAD, limit_state, &pois, CONTINUOUS, opt)
            .unwrap();
        let enveloped = model
            .limit_state_results(LIVE_LOAD, limit_state, ForceEffect::Fy, &pois, CONTINUOUS, opt, false)
            .unwrap();

        let mut expected = vec![0.0; pois.len()];
        for (case, factors) in &definition.cases {
            let case_results = |model: &mut GirderLineModel, effect| {
                model
                    .load_case_results(LIVE_LOAD, *case, effect, &pois, CONTINUOUS, ResultsType::Cumulative)
                    .unwrap()
            };
            let moments = case_results(model, ForceEffect::Mz);
            let shears = case_results(model, ForceEffect::Fy);
            for k in 0..pois.len() {
                // the moment picks the factor
                let factor = if opt.favors(moments[k]) { factors.max } else { factors.min };
                expected[k] += factor * shears[k];
            }
        }

        let mut live = vec![0.0; pois.len()];
        for live_load in [LiveLoadType::Design, LiveLoadType::Pedestrian] {
            let governing = model
                .live_load_results(LIVE_LOAD, live_load, ForceEffect::Mz, &pois, CONTINUOUS, opt, query)
                .unwrap();
            for (k, result) in governing.iter().enumerate() {
                let Some(configuration) = &result.configuration else {
                    continue;
                };
                live[k] += model
                    .live_load_configuration_results(
                        LIVE_LOAD,
                        live_load,
                        configuration,
                        ForceEffect::Fy,
                        &pois[k..=k],
                        ModelKind::Continuous,
                        query,
                    )
                    .unwrap()[0];
            }
        }
        for k in 0..pois.len() {
            expected[k] += definition.live_load_factor * live[k];
        }

        let scale = expected.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        for ((_, v), e) in pairs.iter().zip(&expected) {
            assert_relative_eq!(*v, *e, epsilon = 1e-6 * scale);
        }
        assert!(pairs
            .iter()
            .zip(&enveloped)
            .any(|((_, v), e)| (v - e).abs() > 1e-3 * scale));
    }
}

fn sidewalk_bridge(application: PedestrianApplication) -> BridgeDescription {
    let mut bridge = two_span_bridge();
    bridge.railing.sidewalk_width = 2.0;
    bridge
        .live_load
        .pedestrian_application
        .insert(LiveLoadType::Design, application);
    bridge
}

#[test]
fn test_pedestrian_application_follows_live_load_settings() {
    for application in [PedestrianApplication::Concurrent, PedestrianApplication::Envelope] {
        let mut manager = manager(sidewalk_bridge(application), AnalysisOptions::default());
        let model = manager.ensure_built(0, CONTINUOUS).unwrap();
        let pois = [midspan(model)];

        let mut service = |include_prestress| {
            model
                .limit_state_results(
                    LIVE_LOAD,
                    LimitState::ServiceI,
                    ForceEffect::Mz,
                    &pois,
                    CONTINUOUS,
                    Optimization::Maximize,
                    include_prestress,
                )
                .unwrap()[0]
        };
        let native = service(false);
        let reassembled = service(true);

        let dead = case_sum(model, LIVE_LOAD, ForceEffect::Mz, &pois)[0];
        let mut live = |ll| {
            model
                .live_load_results(
                    LIVE_LOAD,
                    ll,
                    ForceEffect::Mz,
                    &pois,
                    CONTINUOUS,
                    Optimization::Maximize,
                    LiveLoadQuery::default(),
                )
                .unwrap()[0]
                .value
        };
        let design = live(LiveLoadType::Design);
        let pedestrian = live(LiveLoadType::Pedestrian);
        assert!(pedestrian > 0.0);

        let expected = match application {
            PedestrianApplication::Envelope => dead + design.max(pedestrian),
            _ => dead + design + pedestrian,
        };
        assert_relative_eq!(native, expected, max_relative = 1e-6);
        assert_relative_eq!(reassembled, native, max_relative = 1e-6);
    }
}

#[test]
fn test_service_i_reaction_exceeds_dead_load() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, CONTINUOUS).unwrap();
    let pier = SupportLocation::Pier(1);

    let service = model
        .limit_state_reaction(LIVE_LOAD, LimitState::ServiceI, pier, CONTINUOUS, Optimization::Maximize)
        .unwrap();
    let dc = model
        .load_case_reaction(LIVE_LOAD, LoadCase::DC, pier, CONTINUOUS, ResultsType::Cumulative)
        .unwrap();
    let dw = model
        .load_case_reaction(LIVE_LOAD, LoadCase::DW, pier, CONTINUOUS, ResultsType::Cumulative)
        .unwrap();
    let ll = model
        .live_load_reaction(
            LIVE_LOAD,
            LiveLoadType::Design,
            pier,
            CONTINUOUS,
            Optimization::Maximize,
            LiveLoadQuery::default(),
        )
        .unwrap();

    assert!(dc > 0.0 && dw > 0.0 && ll.value > 0.0);
    assert!(service >= dc + dw + ll.value - 1e-6 * service.abs());
}

#[test]
fn test_service_i_stresses_are_ordered() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, CONTINUOUS).unwrap();
    let pois = [midspan(model)];

    let mut stress = |opt| {
        model
            .limit_state_stresses(LIVE_LOAD, LimitState::ServiceI, &pois, CONTINUOUS, opt, false)
            .unwrap()[0]
    };
    let max = stress(Optimization::Maximize);
    let min = stress(Optimization::Minimize);

    assert!(max.top >= min.top);
    assert!(max.bottom >= min.bottom);
    assert!(max.bottom > 0.0);
}

#[test]
fn test_legal_rating_uses_weight_dependent_factor() {
    let mut bridge = two_span_bridge();
    bridge.live_load.models.insert(
        LiveLoadType::LegalRoutine,
        LiveLoadModelSettings {
            vehicles: vec![VehicleSpec::Type3],
            truck_impact: 0.33,
            lane_impact: 0.0,
        },
    );
    let mut manager = manager(bridge, AnalysisOptions::default());
    let model = manager.ensure_built(0, CONTINUOUS).unwrap();
    let pois = [midspan(model)];
    let limit_state = LimitState::StrengthILegalRoutine;

    let rating = model
        .rating_live_load_results(
            LIVE_LOAD,
            limit_state,
            ForceEffect::Mz,
            &pois,
            CONTINUOUS,
            Optimization::Maximize,
        )
        .unwrap();
    let result = &rating[0];
    let factor = model
        .combinations()
        .live_load_factor(limit_state, result.vehicular.configuration.as_ref());

    assert!(result.vehicular.configuration.is_some());
    assert!(result.vehicular.value > 0.0);
    // no ADTT given: the low traffic bound applies
    assert_relative_eq!(result.factor, 1.65);
    assert_relative_eq!(result.factor, factor);
    assert_relative_eq!(result.value, factor * result.vehicular.value);
    assert_eq!(result.pedestrian, 0.0);

    assert!(matches!(
        model.rating_live_load_results(
            LIVE_LOAD,
            LimitState::StrengthI,
            ForceEffect::Mz,
            &pois,
            CONTINUOUS,
            Optimization::Maximize,
        ),
        Err(AnalysisError::InvalidInput(_))
    ));
}

#[test]
fn test_missing_limit_state_is_reported() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, CONTINUOUS).unwrap();
    let pois = [midspan(model)];

    assert!(matches!(
        model.limit_state_results(
            LIVE_LOAD,
            LimitState::StrengthIIPermitSpecial,
            ForceEffect::Mz,
            &pois,
            CONTINUOUS,
            Optimization::Maximize,
            false,
        ),
        Err(AnalysisError::UnknownName(_))
    ));
}

#[test]
fn test_single_vehicle_never_exceeds_envelope() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, CONTINUOUS).unwrap();
    let pois = span_points(model);

    let all = model
        .live_load_results(
            LIVE_LOAD,
            LiveLoadType::Design,
            ForceEffect::Mz,
            &pois,
            CONTINUOUS,
            Optimization::Maximize,
            LiveLoadQuery::default(),
        )
        .unwrap();
    let first = model
        .vehicle_results(
            LIVE_LOAD,
            LiveLoadType::Design,
            0,
            ForceEffect::Mz,
            &pois,
            CONTINUOUS,
            Optimization::Maximize,
        )
        .unwrap();

    for (a, v) in all.iter().zip(&first) {
        assert!(v.value <= a.value + 1e-9 * a.value.abs());
    }
    let mid = &first[5];
    assert!(mid.value > 0.0);
    assert!(mid.configuration.is_some());
}

#[test]
fn test_deflection_envelope_takes_the_extreme_model() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, CONTINUOUS).unwrap();
    let pois = span_points(model);

    let mut deflection = |kind| {
        model
            .deflection_live_load_results(LIVE_LOAD, kind, &pois, CONTINUOUS, Optimization::Minimize)
            .unwrap()
    };
    let envelope = deflection(DeflectionLiveLoadType::Envelope);
    let truck = deflection(DeflectionLiveLoadType::DesignTruckAlone);
    let lane = deflection(DeflectionLiveLoadType::Design25PlusLane);

    for k in 0..pois.len() {
        assert_eq!(envelope[k].value, truck[k].value.min(lane[k].value));
    }
    assert!(envelope[5].value < 0.0);
}
