use approx::assert_relative_eq;
use girder_fem::prelude::*;

/// 10 m simple span with a point of interest at midspan
fn simple_span() -> (StagedModel, PoiId) {
    let mut model = StagedModel::new();
    let s0 = model.add_stage("Service").unwrap();
    let a = model.add_joint(Joint::new(0.0));
    let b = model.add_joint(Joint::new(10.0));
    model
        .add_member(Member::new(a, b, s0).with_stiffness(s0, MemberStiffness::new(1.0e7, 1.0e5)))
        .unwrap();
    model.add_support(Support::pinned(a)).unwrap();
    model.add_support(Support::roller(b)).unwrap();
    model.add_load_group("DC").unwrap();
    model
        .add_member_load(
            0,
            MemberLoad::Distributed(DistributedLoad::transverse(-10.0, -10.0, 0.0, 10.0, s0, "DC")),
        )
        .unwrap();
    let mid = model.add_poi(5.0);
    (model, mid)
}

fn single_axle(weight: f64) -> VehicularLoad {
    VehicularLoad::truck("Axle", vec![Axle::new(weight, 0.0)])
}

#[test]
fn test_single_axle_moment_at_midspan() {
    let (mut model, mid) = simple_span();
    model
        .add_live_load_model(LiveLoadModel::new("LL").with_vehicle(single_axle(100.0)))
        .unwrap();
    model.analyze().unwrap();

    let q = ResponseQuantity::poi(mid, ForceEffect::Mz, Face::Left);
    let max = model
        .live_load_response(0, &q, "LL", Optimization::Maximize, LiveLoadQuery::default())
        .unwrap();
    assert_relative_eq!(max.value, 250.0, epsilon = 1e-6);

    let config = max.configuration.unwrap();
    assert_eq!(config.vehicle, 0);
    assert!(config.truck_applied);
    assert_relative_eq!(config.total_weight(), 100.0, epsilon = 1e-9);
    assert_relative_eq!(config.axles[0].location, 5.0, epsilon = 1e-6);
}

#[test]
fn test_shear_envelope_uses_both_sides_of_the_jump() {
    let (mut model, mid) = simple_span();
    model
        .add_live_load_model(LiveLoadModel::new("LL").with_vehicle(single_axle(100.0)))
        .unwrap();
    model.analyze().unwrap();

    let q = ResponseQuantity::poi(mid, ForceEffect::Fy, Face::Left);
    let max = model
        .live_load_response(0, &q, "LL", Optimization::Maximize, LiveLoadQuery::default())
        .unwrap();
    let min = model
        .live_load_response(0, &q, "LL", Optimization::Minimize, LiveLoadQuery::default())
        .unwrap();
    assert_relative_eq!(max.value, 50.0, epsilon = 1e-6);
    assert_relative_eq!(min.value, -50.0, epsilon = 1e-6);
}

#[test]
fn test_shear_at_line_start_follows_the_span() {
    let (mut model, _) = simple_span();
    let start = model.add_poi(0.0);
    let inside = model.add_poi(0.01);
    model
        .add_live_load_model(LiveLoadModel::new("LL").with_vehicle(single_axle(100.0)))
        .unwrap();
    model.analyze().unwrap();

    let response = |model: &StagedModel, q: &ResponseQuantity, opt| {
        model
            .live_load_response(0, q, "LL", opt, LiveLoadQuery::default())
            .unwrap()
            .value
    };
    let at_start = ResponseQuantity::poi(start, ForceEffect::Fy, Face::Right);
    let near_start = ResponseQuantity::poi(inside, ForceEffect::Fy, Face::Right);
    let reaction = ResponseQuantity::reaction(0, ForceEffect::Fy);

    // an axle on the bearing goes straight into the support
    let max = response(&model, &at_start, Optimization::Maximize);
    let min = response(&model, &at_start, Optimization::Minimize);
    assert_relative_eq!(max, 100.0, epsilon = 1e-6);
    assert_relative_eq!(max, response(&model, &reaction, Optimization::Maximize), epsilon = 1e-6);
    assert_relative_eq!(min, 0.0, epsilon = 1e-6);
    assert_relative_eq!(
        response(&model, &near_start, Optimization::Maximize),
        100.0 * (1.0 - 0.01 / 10.0),
        epsilon = 1e-6
    );
}

#[test]
fn test_lane_load_and_distribution_factors() {
    let (mut model, mid) = simple_span();
    model
        .add_live_load_model(LiveLoadModel::new("Lane").with_vehicle(VehicularLoad::lane("Lane", 10.0)))
        .unwrap();
    let mut df = DistributionFactors::uniform(1.0);
    df.pos_moment = 0.5;
    model.set_distribution_factors(vec![DistributionFactorSegment::constant(10.0, df)]);
    model.analyze().unwrap();

    let q = ResponseQuantity::poi(mid, ForceEffect::Mz, Face::Left);
    let with_df = model
        .live_load_response(0, &q, "Lane", Optimization::Maximize, LiveLoadQuery::default())
        .unwrap();
    let without_df = model
        .live_load_response(
            0,
            &q,
            "Lane",
            Optimization::Maximize,
            LiveLoadQuery::default().with_flags(true, false),
        )
        .unwrap();
    assert_relative_eq!(without_df.value, 125.0, epsilon = 1e-6);
    assert_relative_eq!(with_df.value, 62.5, epsilon = 1e-6);

    let config = with_df.configuration.unwrap();
    assert!(!config.truck_applied);
    assert_eq!(config.lane_regions.len(), 1);
}

#[test]
fn test_impact_applies_to_truck() {
    let (mut model, mid) = simple_span();
    model
        .add_live_load_model(
            LiveLoadModel::new("LL")
                .with_vehicle(single_axle(100.0))
                .with_impact(0.33, 0.0),
        )
        .unwrap();
    model.analyze().unwrap();

    let q = ResponseQuantity::poi(mid, ForceEffect::Mz, Face::Left);
    let with_impact = model
        .live_load_response(0, &q, "LL", Optimization::Maximize, LiveLoadQuery::default())
        .unwrap();
    let without_impact = model
        .live_load_response(
            0,
            &q,
            "LL",
            Optimization::Maximize,
            LiveLoadQuery::default().with_flags(false, true),
        )
        .unwrap();
    assert_relative_eq!(with_impact.value, 332.5, epsilon = 1e-6);
    assert_relative_eq!(without_impact.value, 250.0, epsilon = 1e-6);
}

#[test]
fn test_reaction_influence() {
    let (mut model, _) = simple_span();
    model
        .add_live_load_model(LiveLoadModel::new("LL").with_vehicle(single_axle(100.0)))
        .unwrap();
    model.analyze().unwrap();

    let q = ResponseQuantity::reaction(0, ForceEffect::Fy);
    let max = model
        .live_load_response(0, &q, "LL", Optimization::Maximize, LiveLoadQuery::default())
        .unwrap();
    assert_relative_eq!(max.value, 100.0, epsilon = 1e-6);
}

#[test]
fn test_pier_only_vehicle_skips_positive_moment() {
    let (mut model, mid) = simple_span();
    let vehicle = single_axle(100.0)
        .with_applicability(VehicleApplicability::NegativeMomentAndInteriorPierReaction);
    model
        .add_live_load_model(LiveLoadModel::new("LL").with_vehicle(vehicle))
        .unwrap();
    model.analyze().unwrap();

    let q = ResponseQuantity::poi(mid, ForceEffect::Mz, Face::Left);
    let max = model
        .live_load_response(0, &q, "LL", Optimization::Maximize, LiveLoadQuery::default())
        .unwrap();
    assert_eq!(max.value, 0.0);
    assert!(max.configuration.is_none());
}

#[test]
fn test_configuration_reproduces_governing_value() {
    let (mut model, mid) = simple_span();
    let truck = VehicularLoad::truck(
        "Tandem",
        vec![Axle::new(110.0, 1.2), Axle::new(110.0, 0.0)],
    );
    model
        .add_live_load_model(LiveLoadModel::new("LL").with_vehicle(truck))
        .unwrap();
    model.analyze().unwrap();

    let q = ResponseQuantity::poi(mid, ForceEffect::Mz, Face::Left);
    let query = LiveLoadQuery::default().with_flags(false, false);
    let max = model
        .live_load_response(0, &q, "LL", Optimization::Maximize, query)
        .unwrap();
    let config = max.configuration.clone().unwrap();
    let again = model
        .configuration_response(0, &q, "LL", &config, query)
        .unwrap();
    assert_relative_eq!(max.value, again, epsilon = 1e-6);
    // one axle at midspan, the other 1.2 m away
    assert_relative_eq!(max.value, 110.0 * 2.5 + 110.0 * 1.9, epsilon = 1e-6);
}

#[test]
fn test_combination_with_live_load() {
    let (mut model, mid) = simple_span();
    model
        .add_live_load_model(LiveLoadModel::new("LL").with_vehicle(single_axle(100.0)))
        .unwrap();
    model.add_load_case(LoadCase::new("DC").with_group("DC")).unwrap();
    model
        .add_load_combination(
            LoadCombination::new("Strength I")
                .with_case_range("DC", 0.9, 1.25)
                .with_live_load("LL", 1.75),
        )
        .unwrap();
    model.analyze().unwrap();

    let q = ResponseQuantity::poi(mid, ForceEffect::Mz, Face::Left);
    let result = model
        .combination_response(0, &q, "Strength I", Optimization::Maximize, ResultsType::Cumulative)
        .unwrap();
    let live = result.live_load.unwrap();
    assert_relative_eq!(live.value, 250.0, epsilon = 1e-6);
    assert_relative_eq!(result.value, 1.25 * 125.0 + 1.75 * 250.0, epsilon = 1e-6);
}
