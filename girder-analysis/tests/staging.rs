mod common;

use approx::assert_relative_eq;
use common::*;
use std::rc::Rc;

use girder_analysis::bridge::{ClosureDescription, HaunchPoint, ModulusEntry, SectionProperties};
use girder_analysis::prelude::*;
use girder_analysis::storage::{relative_to_supports, SegmentCondition, STORAGE_CORRECTION_GROUP};

const SIMPLE: BridgeAnalysisType = BridgeAnalysisType::SimpleSpan;

/// Segments that stiffen between storage and erection
fn aged_bridge() -> BridgeDescription {
    let mut bridge = two_span_bridge();
    for line in &mut bridge.girder_lines {
        for segment in &mut line.segments {
            segment.modulus = vec![
                ModulusEntry {
                    interval: 0,
                    value: 2.5e10,
                },
                ModulusEntry {
                    interval: ERECTION,
                    value: 3.2e10,
                },
            ];
        }
    }
    bridge
}

fn girder_deflection(
    manager: &mut GirderModelManager<BridgeDescription>,
    interval: IntervalIndex,
) -> f64 {
    let model = manager.ensure_built(0, SIMPLE).unwrap();
    let pois = [midspan(model)];
    model
        .product_results(
            interval,
            ProductLoad::Girder,
            ForceEffect::Dy,
            &pois,
            SIMPLE,
            ResultsType::Cumulative,
        )
        .unwrap()[0]
}

#[test]
fn test_storage_correction_vanishes_for_constant_modulus() {
    let mut corrected = manager(two_span_bridge(), AnalysisOptions::default());
    let mut naive = manager(
        two_span_bridge(),
        AnalysisOptions::default().without_storage_correction(),
    );

    for interval in [ERECTION, LIVE_LOAD] {
        let a = girder_deflection(&mut corrected, interval);
        let b = girder_deflection(&mut naive, interval);
        assert!(b < 0.0);
        assert_relative_eq!(a, b, max_relative = 1e-6);
    }
}

#[test]
fn test_storage_correction_keeps_stored_shape() {
    let mut corrected = manager(aged_bridge(), AnalysisOptions::default());
    let mut naive = manager(
        aged_bridge(),
        AnalysisOptions::default().without_storage_correction(),
    );
    let naive_erected = girder_deflection(&mut naive, ERECTION);
    let naive_final = girder_deflection(&mut naive, LIVE_LOAD);
    let total = girder_deflection(&mut corrected, LIVE_LOAD);

    let model = corrected.ensure_built(0, SIMPLE).unwrap();
    let poi = midspan(model);
    let girder = ProductLoad::Girder.name();
    let relative = {
        let segment = model.storage().segment(0).unwrap();
        let x = model.layout().segments[0].start + poi.distance;
        let (x1, x2) = model.layout().segments[0].erection_span().unwrap();
        let at = |x| segment.displacement(SegmentCondition::Storage, x, girder).unwrap();
        relative_to_supports(at(x), x, Some(((x1, at(x1)), (x2, at(x2))))).dy
    };
    let correction = model
        .load_group_results(
            ERECTION,
            STORAGE_CORRECTION_GROUP,
            ForceEffect::Dy,
            &[poi],
            SIMPLE,
            ResultsType::Incremental,
        )
        .unwrap()[0];

    // a softer segment in storage sags more than the erected girder would
    assert!(total < naive_final);
    assert!((total - naive_final).abs() > 0.1 * naive_final.abs());
    assert_relative_eq!(
        total,
        relative + correction + naive_final - naive_erected,
        max_relative = 1e-9
    );
}

#[test]
fn test_girder_results_before_erection_come_from_storage_model() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, SIMPLE).unwrap();
    let poi = midspan(model);
    let x = model.layout().segments[0].start + poi.distance;
    let stored = model
        .storage()
        .segment(0)
        .unwrap()
        .displacement(SegmentCondition::Storage, x, ProductLoad::Girder.name())
        .unwrap();

    let dy = model
        .product_results(
            STORAGE,
            ProductLoad::Girder,
            ForceEffect::Dy,
            &[poi],
            SIMPLE,
            ResultsType::Cumulative,
        )
        .unwrap()[0];
    let moment = model
        .product_results(
            STORAGE,
            ProductLoad::Girder,
            ForceEffect::Mz,
            &[poi],
            SIMPLE,
            ResultsType::Cumulative,
        )
        .unwrap()[0];

    assert!(stored.dy < 0.0);
    assert_relative_eq!(dy, stored.dy, max_relative = 1e-12);
    assert!(moment > 0.0);
}

#[test]
fn test_manager_builds_on_demand_and_clears() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    assert!(manager.model(0).is_none());

    manager.ensure_built(0, SIMPLE).unwrap();
    let model = manager.model(0).unwrap();
    assert!(model.is_built(SIMPLE));
    assert!(!model.is_built(BridgeAnalysisType::ContinuousSpan));
    assert!(manager.model(1).is_none());

    manager
        .ensure_built(0, BridgeAnalysisType::MaxSimpleContinuousEnvelope)
        .unwrap();
    assert!(manager
        .model(0)
        .unwrap()
        .is_built(BridgeAnalysisType::MinSimpleContinuousEnvelope));

    manager.clear();
    assert!(manager.model(0).is_none());

    manager.ensure_built(1, SIMPLE).unwrap();
    manager.set_bridge(aged_bridge());
    assert!(manager.model(1).is_none());
    assert_eq!(manager.bridge().girder_line_count(), 2);
}

#[test]
fn test_concentrated_loading_joins_dw() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, SIMPLE).unwrap();
    let span = &model.layout().segments[0];
    let length = span.model_end - span.model_start;
    let pois = [midspan(model)];

    let before = model
        .load_case_results(LIVE_LOAD, LoadCase::DW, ForceEffect::Mz, &pois, SIMPLE, ResultsType::Cumulative)
        .unwrap()[0];

    model.create_loading(4, "Crane").unwrap();
    model
        .create_concentrated_load("Crane", &pois[0], 0.0, -1.0e5, 0.0)
        .unwrap();
    let crane = model
        .loading_results(4, "Crane", ForceEffect::Mz, &pois, SIMPLE, ResultsType::Cumulative)
        .unwrap()[0];
    assert_relative_eq!(crane, 1.0e5 * length / 4.0, max_relative = 1e-6);

    model.add_loading_to_case("Crane", LoadCase::DW).unwrap();
    let after = model
        .load_case_results(LIVE_LOAD, LoadCase::DW, ForceEffect::Mz, &pois, SIMPLE, ResultsType::Cumulative)
        .unwrap()[0];
    assert_relative_eq!(after - before, crane, max_relative = 1e-6);
    assert!(model.case_groups()[&LoadCase::DWRating].contains(&"Crane".to_string()));
}

#[test]
fn test_uniform_and_strain_loadings_on_simple_span() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, SIMPLE).unwrap();
    let span = &model.layout().segments[0];
    let (start, end) = (
        PointOfInterest::new(0, span.model_start - span.start),
        PointOfInterest::new(0, span.model_end - span.start),
    );
    let length = span.model_end - span.model_start;
    let pois = [midspan(model)];

    model.create_loading(4, "Equipment").unwrap();
    model
        .create_uniform_load("Equipment", &end, &start, 0.0, -1.0e4)
        .unwrap();
    model.create_loading(4, "Curvature").unwrap();
    model
        .create_initial_strain("Curvature", &start, &end, 0.0, 1.0e-4)
        .unwrap();

    let moment = model
        .loading_results(4, "Equipment", ForceEffect::Mz, &pois, SIMPLE, ResultsType::Cumulative)
        .unwrap()[0];
    assert_relative_eq!(moment, 1.0e4 * length * length / 8.0, max_relative = 1e-6);

    let curvature_moment = model
        .loading_results(4, "Curvature", ForceEffect::Mz, &pois, SIMPLE, ResultsType::Cumulative)
        .unwrap()[0];
    let deflection = model
        .loading_results(4, "Curvature", ForceEffect::Dy, &pois, SIMPLE, ResultsType::Cumulative)
        .unwrap()[0];
    assert_relative_eq!(curvature_moment, 0.0, epsilon = 1e-6);
    assert_relative_eq!(deflection, -1.0e-4 * length * length / 8.0, max_relative = 1e-6);
}

#[test]
fn test_loadings_reach_models_built_later() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, SIMPLE).unwrap();
    let pois = [midspan(model)];
    model.create_loading(4, "Crane").unwrap();
    model
        .create_concentrated_load("Crane", &pois[0], 0.0, -1.0e5, 0.0)
        .unwrap();

    let model = manager
        .ensure_built(0, BridgeAnalysisType::ContinuousSpan)
        .unwrap();
    let continuous = model
        .loading_results(
            LIVE_LOAD,
            "Crane",
            ForceEffect::Mz,
            &pois,
            BridgeAnalysisType::ContinuousSpan,
            ResultsType::Cumulative,
        )
        .unwrap()[0];
    let simple = model
        .loading_results(LIVE_LOAD, "Crane", ForceEffect::Mz, &pois, SIMPLE, ResultsType::Cumulative)
        .unwrap()[0];

    assert!(continuous > 0.0);
    assert!(continuous < simple);
}

#[test]
fn test_loading_names_are_checked() {
    let mut manager = manager(two_span_bridge(), AnalysisOptions::default());
    let model = manager.ensure_built(0, SIMPLE).unwrap();

    assert!(matches!(
        model.create_loading(4, ProductLoad::Slab.name()),
        Err(AnalysisError::InvalidInput(_))
    ));
    assert!(matches!(
        model.create_loading(9, "Crane"),
        Err(AnalysisError::IntervalNotFound(9))
    ));
    model.create_loading(4, "Crane").unwrap();
    assert!(model.has_loading("Crane"));
    assert!(model.create_loading(4, "Crane").is_err());
    assert!(matches!(
        model.add_loading_to_case("Crane", LoadCase::CR),
        Err(AnalysisError::InvalidInput(_))
    ));
}

#[test]
fn test_thin_haunch_is_reported_once() {
    let mut bridge = two_span_bridge();
    if let Some(deck) = bridge.deck.as_mut() {
        deck.minimum_haunch = 0.05;
    }
    bridge.girder_lines[0].haunch = vec![
        HaunchPoint { x: 0.0, depth: 0.1 },
        HaunchPoint { x: 15.0, depth: 0.02 },
        HaunchPoint { x: 60.0, depth: 0.1 },
    ];
    let sink = Rc::new(CollectingStatusSink::new());
    let mut manager = manager(bridge, AnalysisOptions::default()).with_status_sink(sink.clone());

    manager.ensure_built(0, SIMPLE).unwrap();

    let thin: Vec<_> = sink
        .items()
        .into_iter()
        .filter(|item| item.category == StatusCategory::MinimumHaunch)
        .collect();
    assert_eq!(thin.len(), 1);
    assert_eq!(thin[0].girder_line, 0);
}

#[test]
fn test_segments_without_a_load_path_are_unstable() {
    // no pier or tower under the splice until the closure is cast
    let mut bridge = two_span_bridge();
    bridge.piers.remove(1);
    bridge.girder_lines[0].closures = vec![ClosureDescription {
        after_segment: 0,
        interval: 3,
        properties: SectionProperties {
            area: 0.5,
            inertia: 0.1,
            s_top: 0.15,
            s_bottom: 0.2,
        },
        modulus: 3.0e10,
        unit_weight: 24000.0,
    }];
    let mut manager = manager(bridge, AnalysisOptions::default());

    assert!(matches!(
        manager.ensure_built(0, SIMPLE),
        Err(AnalysisError::UnstableStructure { girder_line: 0, .. })
    ));
}
