//! Benchmarks for the staged solver and live load envelopes

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use girder_fem::prelude::*;

fn create_continuous_girder(spans: usize, elements_per_span: usize) -> StagedModel {
    let mut model = StagedModel::with_options(SolverOptions::default().with_influence_subdivisions(4));
    let erect = model.add_stage("Erection").unwrap();
    let deck = model.add_stage("Deck").unwrap();

    let span_length = 30.0;
    let n = spans * elements_per_span;
    let joints: Vec<JointId> = (0..=n)
        .map(|k| model.add_joint(Joint::new(k as f64 * span_length / elements_per_span as f64)))
        .collect();

    for k in 0..n {
        let mut member = Member::new(joints[k], joints[k + 1], erect)
            .with_stiffness(erect, MemberStiffness::new(2.0e7, 1.5e6))
            .with_stiffness(deck, MemberStiffness::new(3.0e7, 4.0e6));
        // Continuity is made over the piers when the deck is cast
        if (k + 1) % elements_per_span == 0 && k + 1 < n {
            member = member.with_releases(MemberReleases::pin_j().until(deck));
        }
        model.add_member(member).unwrap();
    }

    model.add_support(Support::pinned(joints[0])).unwrap();
    for s in 1..=spans {
        model
            .add_support(Support::roller(joints[s * elements_per_span]))
            .unwrap();
    }

    model.add_load_group("DC").unwrap();
    model.add_load_group("DW").unwrap();
    let element_length = span_length / elements_per_span as f64;
    for k in 0..n {
        model
            .add_member_load(
                k,
                MemberLoad::Distributed(DistributedLoad::transverse(
                    -15.0, -15.0, 0.0, element_length, erect, "DC",
                )),
            )
            .unwrap();
        model
            .add_member_load(
                k,
                MemberLoad::Distributed(DistributedLoad::transverse(
                    -3.0, -3.0, 0.0, element_length, deck, "DW",
                )),
            )
            .unwrap();
        model.add_poi(k as f64 * element_length);
    }

    let truck = VehicularLoad::truck(
        "Design Truck",
        vec![Axle::new(35.0, 4.3), Axle::new(145.0, 4.3), Axle::new(145.0, 0.0)],
    )
    .with_variable_spacing(1, 9.0)
    .with_lane(9.3);
    model
        .add_live_load_model(LiveLoadModel::new("Design").with_vehicle(truck).with_impact(0.33, 0.0))
        .unwrap();

    model
}

fn benchmark_three_span(c: &mut Criterion) {
    c.bench_function("girder_3span_staged", |b| {
        b.iter(|| {
            let mut model = create_continuous_girder(3, 10);
            model.analyze().unwrap();
            black_box(&model);
        })
    });
}

fn benchmark_long_girder(c: &mut Criterion) {
    c.bench_function("girder_6span_staged", |b| {
        b.iter(|| {
            let mut model = create_continuous_girder(6, 20);
            model.analyze().unwrap();
            black_box(&model);
        })
    });
}

fn benchmark_live_load_envelope(c: &mut Criterion) {
    let mut model = create_continuous_girder(3, 10);
    model.analyze().unwrap();
    let pier = model.find_poi(30.0).unwrap();
    let q = ResponseQuantity::poi(pier, ForceEffect::Mz, Face::Left);

    c.bench_function("live_load_negative_moment", |b| {
        b.iter(|| {
            let result = model
                .live_load_response(1, &q, "Design", Optimization::Minimize, LiveLoadQuery::default())
                .unwrap();
            black_box(result);
        })
    });
}

criterion_group!(
    benches,
    benchmark_three_span,
    benchmark_long_girder,
    benchmark_live_load_envelope,
);

criterion_main!(benches);
