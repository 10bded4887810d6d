mod common;

use approx::assert_relative_eq;
use common::*;
use girder_analysis::prelude::*;

#[test]
fn test_points_of_interest_are_mapped_once() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager
        .ensure_built(0, BridgeAnalysisType::ContinuousSpan)
        .unwrap();
    let pois = span_points(model);

    let first = model.map_pois(&pois).unwrap();
    let count = model.poi_count();
    let second = model.map_pois(&pois).unwrap();

    assert_eq!(model.poi_count(), count);
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.id, b.id);
        assert_eq!(model.poi(a.id), Some(a.poi));
    }
    assert!(first[0].at_start);
    assert!(!first[1].at_start);
}

#[test]
fn test_pois_at_the_same_station_share_a_model_point() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager
        .ensure_built(0, BridgeAnalysisType::ContinuousSpan)
        .unwrap();
    let (first, second) = (&model.layout().segments[0], &model.layout().segments[1]);
    let x = first.model_end;
    let pois = [
        PointOfInterest::new(0, x - first.start),
        PointOfInterest::new(1, x - second.start),
    ];

    let count = model.poi_count();
    let mapped = model.map_pois(&pois).unwrap();

    assert_eq!(mapped[0].id, mapped[1].id);
    assert_eq!(model.poi_count(), count + 2);
    assert_eq!(model.poi(mapped[0].id), Some(pois[0]));
    assert_eq!(model.pois_at(mapped[0].id), &pois);
}

#[test]
fn test_slab_forces_follow_girder_sign_convention() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, BridgeAnalysisType::SimpleSpan).unwrap();
    let span = &model.layout().segments[0];
    let pois = [
        PointOfInterest::new(0, span.model_start - span.start),
        midspan(model),
        PointOfInterest::new(0, span.model_end - span.start),
    ];

    let forces = model
        .product_forces(
            LIVE_LOAD,
            ProductLoad::Slab,
            &pois,
            BridgeAnalysisType::SimpleSpan,
            ResultsType::Cumulative,
        )
        .unwrap();

    assert!(forces[0].shear > 0.0);
    assert_relative_eq!(forces[2].shear, -forces[0].shear, max_relative = 1e-6);
    assert!(forces[1].moment > 0.0);
    assert_relative_eq!(forces[1].shear, 0.0, epsilon = 1e-6 * forces[0].shear);
    assert_relative_eq!(forces[0].moment, 0.0, epsilon = 1e-6 * forces[1].moment);
}

#[test]
fn test_envelope_bounds_single_models() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager
        .ensure_built(0, BridgeAnalysisType::MaxSimpleContinuousEnvelope)
        .unwrap();
    let pois = span_points(model);

    for product in [ProductLoad::Slab, ProductLoad::TrafficBarrier, ProductLoad::Overlay] {
        for effect in [ForceEffect::Fy, ForceEffect::Mz, ForceEffect::Dy] {
            for interval in 3..=LIVE_LOAD {
                let mut query = |analysis_type| {
                    model
                        .product_results(
                            interval,
                            product,
                            effect,
                            &pois,
                            analysis_type,
                            ResultsType::Cumulative,
                        )
                        .unwrap()
                };
                let min = query(BridgeAnalysisType::MinSimpleContinuousEnvelope);
                let max = query(BridgeAnalysisType::MaxSimpleContinuousEnvelope);
                let simple = query(BridgeAnalysisType::SimpleSpan);
                let continuous = query(BridgeAnalysisType::ContinuousSpan);
                for k in 0..pois.len() {
                    assert!(min[k] <= max[k]);
                    assert_eq!(min[k], simple[k].min(continuous[k]));
                    assert_eq!(max[k], simple[k].max(continuous[k]));
                }
            }
        }
    }
}

#[test]
fn test_incremental_results_add_up_to_cumulative() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager
        .ensure_built(0, BridgeAnalysisType::ContinuousSpan)
        .unwrap();
    let pois = span_points(model);

    let mut total = vec![0.0; pois.len()];
    for interval in ERECTION..=LIVE_LOAD {
        let step = model
            .product_results(
                interval,
                ProductLoad::Slab,
                ForceEffect::Mz,
                &pois,
                BridgeAnalysisType::ContinuousSpan,
                ResultsType::Incremental,
            )
            .unwrap();
        for (t, s) in total.iter_mut().zip(step) {
            *t += s;
        }
    }
    let cumulative = model
        .product_results(
            LIVE_LOAD,
            ProductLoad::Slab,
            ForceEffect::Mz,
            &pois,
            BridgeAnalysisType::ContinuousSpan,
            ResultsType::Cumulative,
        )
        .unwrap();
    let scale = cumulative.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    for (t, c) in total.iter().zip(&cumulative) {
        assert_relative_eq!(*t, *c, epsilon = 1e-9 * scale);
    }
}

#[test]
fn test_bearing_reactions_add_up_to_pier_reaction() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager
        .ensure_built(0, BridgeAnalysisType::ContinuousSpan)
        .unwrap();
    let group = ProductLoad::Slab.name();
    let analysis_type = BridgeAnalysisType::ContinuousSpan;

    let mut bearing = |face| {
        model
            .bearing_reaction(LIVE_LOAD, group, 1, face, analysis_type, ResultsType::Cumulative)
            .unwrap()
    };
    let back = bearing(PierFace::Back);
    let ahead = bearing(PierFace::Ahead);
    let pier = model
        .reaction(
            LIVE_LOAD,
            group,
            SupportLocation::Pier(1),
            analysis_type,
            ResultsType::Cumulative,
        )
        .unwrap();

    assert!(back > 0.0 && ahead > 0.0);
    assert_relative_eq!(back + ahead, pier, max_relative = 1e-9);
}

#[test]
fn test_dead_load_reactions_balance_slab_weight() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, BridgeAnalysisType::SimpleSpan).unwrap();
    let analysis_type = BridgeAnalysisType::SimpleSpan;
    let group = ProductLoad::Slab.name();

    let total: f64 = (0..3)
        .map(|pier| {
            model
                .reaction(
                    LIVE_LOAD,
                    group,
                    SupportLocation::Pier(pier),
                    analysis_type,
                    ResultsType::Cumulative,
                )
                .unwrap()
        })
        .sum();
    let end = model
        .reaction(
            LIVE_LOAD,
            group,
            SupportLocation::Pier(0),
            analysis_type,
            ResultsType::Cumulative,
        )
        .unwrap();

    assert!(end > 0.0);
    assert!(total > 2.0 * end);
}

#[test]
fn test_queries_report_missing_objects() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    assert!(matches!(
        manager.ensure_built(7, BridgeAnalysisType::SimpleSpan),
        Err(AnalysisError::GirderLineNotFound(7))
    ));

    let model = manager.ensure_built(0, BridgeAnalysisType::SimpleSpan).unwrap();
    let poi = [midspan(model)];
    let analysis_type = BridgeAnalysisType::SimpleSpan;

    assert!(matches!(
        model.loading_results(4, "Crane", ForceEffect::Mz, &poi, analysis_type, ResultsType::Cumulative),
        Err(AnalysisError::LoadingNotFound(_))
    ));
    assert!(matches!(
        model.product_results(
            9,
            ProductLoad::Slab,
            ForceEffect::Mz,
            &poi,
            analysis_type,
            ResultsType::Cumulative
        ),
        Err(AnalysisError::IntervalNotFound(9))
    ));
    assert!(matches!(
        model.reaction(
            LIVE_LOAD,
            ProductLoad::Slab.name(),
            SupportLocation::Pier(7),
            analysis_type,
            ResultsType::Cumulative
        ),
        Err(AnalysisError::PierNotFound(7))
    ));
    assert!(matches!(
        model.product_results(
            LIVE_LOAD,
            ProductLoad::Slab,
            ForceEffect::Mz,
            &poi,
            BridgeAnalysisType::ContinuousSpan,
            ResultsType::Cumulative
        ),
        Err(AnalysisError::ModelNotBuilt { .. })
    ));
    assert!(matches!(
        model.vehicle_results(
            LIVE_LOAD,
            LiveLoadType::Design,
            99,
            ForceEffect::Mz,
            &poi,
            analysis_type,
            Optimization::Maximize
        ),
        Err(AnalysisError::InvalidInput(_))
    ));
}

#[test]
fn test_unit_load_at_midspan() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, BridgeAnalysisType::SimpleSpan).unwrap();
    let span = &model.layout().segments[0];
    let length = span.model_end - span.model_start;
    let mid = midspan(model);

    let (forces, deflection) = model
        .unit_load_response(LIVE_LOAD, &mid, UnitLoad::Force, &mid, ModelKind::Simple)
        .unwrap();

    assert_relative_eq!(forces.moment.abs(), length / 4.0, max_relative = 1e-6);
    assert!(deflection.deflection != 0.0);
}

#[test]
fn test_contraflexure_points_lie_near_the_pier() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager
        .ensure_built(0, BridgeAnalysisType::ContinuousSpan)
        .unwrap();

    let points = model.contraflexure_points(ModelKind::Continuous).unwrap();

    assert_eq!(points.len(), 2);
    assert!(points[0] > 15.0 && points[0] < 30.0);
    assert!(points[1] > 30.0 && points[1] < 45.0);
}

#[test]
fn test_live_load_shear_at_girder_start_matches_end_reaction() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, BridgeAnalysisType::SimpleSpan).unwrap();
    let analysis_type = BridgeAnalysisType::SimpleSpan;
    let span = &model.layout().segments[0];
    let start = span.model_start - span.start;
    let pois = [
        PointOfInterest::new(0, start),
        PointOfInterest::new(0, start + 1.0e-4),
    ];
    let plain = LiveLoadQuery::default().with_flags(false, false);

    let mut shear = |opt| {
        model
            .live_load_results(
                LIVE_LOAD,
                LiveLoadType::Design,
                ForceEffect::Fy,
                &pois,
                analysis_type,
                opt,
                plain,
            )
            .unwrap()
    };
    let max = shear(Optimization::Maximize);
    let min = shear(Optimization::Minimize);
    let reaction = model
        .live_load_reaction(
            LIVE_LOAD,
            LiveLoadType::Design,
            SupportLocation::Pier(0),
            analysis_type,
            Optimization::Maximize,
            plain,
        )
        .unwrap();

    assert!(reaction.value > 0.0);
    assert_relative_eq!(max[0].value, reaction.value, max_relative = 1e-6);
    assert_relative_eq!(max[0].value, max[1].value, max_relative = 1e-4);
    assert!(min[0].value.abs() < 1e-6 * reaction.value);
}
