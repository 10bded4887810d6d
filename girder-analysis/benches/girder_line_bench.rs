//! Benchmarks for building girder-line models and limit state queries

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use girder_analysis::prelude::*;

const BRIDGE: &str = include_str!("../tests/data/two_span.json");

fn bridge() -> BridgeDescription {
    BridgeDescription::from_json(BRIDGE).unwrap()
}

fn tenth_points(model: &GirderLineModel) -> Vec<PointOfInterest> {
    model
        .layout()
        .segments
        .iter()
        .flat_map(|s| {
            let length = s.end - s.start;
            (1..10).map(move |k| PointOfInterest::new(s.index, length * k as f64 / 10.0))
        })
        .collect()
}

fn benchmark_build(c: &mut Criterion) {
    c.bench_function("two_span_envelope_build", |b| {
        b.iter(|| {
            let mut manager: GirderModelManager<_> =
                GirderModelManager::new(bridge(), AnalysisOptions::default());
            manager
                .ensure_built(0, BridgeAnalysisType::MaxSimpleContinuousEnvelope)
                .unwrap();
            black_box(&manager);
        })
    });
}

fn benchmark_limit_state(c: &mut Criterion) {
    let mut manager: GirderModelManager<_> =
        GirderModelManager::new(bridge(), AnalysisOptions::default());
    let model = manager
        .ensure_built(0, BridgeAnalysisType::ContinuousSpan)
        .unwrap();
    let pois = tenth_points(model);

    c.bench_function("strength_i_moments", |b| {
        b.iter(|| {
            let moments = model
                .limit_state_results(
                    5,
                    LimitState::StrengthI,
                    ForceEffect::Mz,
                    &pois,
                    BridgeAnalysisType::ContinuousSpan,
                    Optimization::Maximize,
                    false,
                )
                .unwrap();
            black_box(moments);
        })
    });

    c.bench_function("strength_i_concurrent_shears", |b| {
        b.iter(|| {
            let shears = model
                .concurrent_shears(
                    5,
                    LimitState::StrengthI,
                    &pois,
                    BridgeAnalysisType::ContinuousSpan,
                    Optimization::Minimize,
                )
                .unwrap();
            black_box(shears);
        })
    });
}

criterion_group!(benches, benchmark_build, benchmark_limit_state);

criterion_main!(benches);
