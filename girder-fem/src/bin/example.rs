//! Girder FEM Example - two span girder made continuous for the deck

use anyhow::Result;
use girder_fem::prelude::*;

fn main() -> Result<()> {
    env_logger::init();
    println!("=== Girder FEM Example: Two Span Continuous Girder ===\n");

    let mut model = StagedModel::with_options(SolverOptions::default().with_logging());
    let erect = model.add_stage("Erect girders")?;
    let deck = model.add_stage("Cast deck")?;
    let service = model.add_stage("Final service")?;

    //   A ========== B ========== C
    //   ^            o            o
    // Girders are simple spans until the deck makes them continuous over B
    let span = 25.0;
    let a = model.add_joint(Joint::new(0.0));
    let b = model.add_joint(Joint::new(span));
    let c = model.add_joint(Joint::new(2.0 * span));

    let bare = MemberStiffness::new(2.4e7, 1.2e6);
    let composite = MemberStiffness::new(3.5e7, 3.1e6);
    model.add_member(
        Member::new(a, b, erect)
            .with_stiffness(erect, bare)
            .with_stiffness(service, composite)
            .with_releases(MemberReleases::pin_j().until(service)),
    )?;
    model.add_member(
        Member::new(b, c, erect)
            .with_stiffness(erect, bare)
            .with_stiffness(service, composite)
            .with_releases(MemberReleases::pin_i().until(service)),
    )?;

    model.add_support(Support::pinned(a))?;
    model.add_support(Support::roller(b))?;
    model.add_support(Support::roller(c))?;

    // Loads (kN, m)
    for group in ["Girder", "Slab", "Barrier", "Overlay"] {
        model.add_load_group(group)?;
    }
    let uniform = |w: f64, stage: StageIndex, group: &str| {
        MemberLoad::Distributed(DistributedLoad::transverse(w, w, 0.0, span, stage, group))
    };
    for member in 0..2 {
        model.add_member_load(member, uniform(-12.0, erect, "Girder"))?;
        model.add_member_load(member, uniform(-18.0, deck, "Slab"))?;
        model.add_member_load(member, uniform(-4.0, service, "Barrier"))?;
        model.add_member_load(member, uniform(-2.5, service, "Overlay"))?;
    }

    model.add_load_case(LoadCase::new("DC").with_group("Girder").with_group("Slab").with_group("Barrier"))?;
    model.add_load_case(LoadCase::new("DW").with_group("Overlay"))?;

    let truck = VehicularLoad::truck(
        "Design Truck",
        vec![Axle::new(35.0, 4.3), Axle::new(145.0, 4.3), Axle::new(145.0, 0.0)],
    )
    .with_variable_spacing(1, 9.0)
    .with_lane(9.3);
    model.add_live_load_model(LiveLoadModel::new("Design").with_vehicle(truck).with_impact(0.33, 0.0))?;

    model.add_load_combination(
        LoadCombination::new("Strength I")
            .with_case_range("DC", 0.9, 1.25)
            .with_case_range("DW", 0.65, 1.5)
            .with_live_load("Design", 1.75),
    )?;

    let pois: Vec<PoiId> = (0..=10).map(|k| model.add_poi(k as f64 * span / 5.0)).collect();

    println!("Running staged analysis...\n");
    model.analyze()?;

    for (stage, name) in model.stages.clone().iter().enumerate() {
        println!("=== {} ===", name);
        for group in ["Girder", "Slab"] {
            let r = model.reaction(stage, 1, group, ResultsType::Cumulative)?;
            println!("  {} reaction at B: {:.2} kN", group, r.fy);
        }
    }

    println!("\nStrength I moment envelope (final stage):");
    for poi in &pois {
        let x = model.poi_location(*poi)?;
        let q = ResponseQuantity::poi(*poi, ForceEffect::Mz, Face::Left);
        let max = model.combination_response(service, &q, "Strength I", Optimization::Maximize, ResultsType::Cumulative)?;
        let min = model.combination_response(service, &q, "Strength I", Optimization::Minimize, ResultsType::Cumulative)?;
        println!("  x = {:6.2} m: Mmax = {:9.2} kN·m, Mmin = {:9.2} kN·m", x, max.value, min.value);
    }

    let pier = pois[5];
    let q = ResponseQuantity::poi(pier, ForceEffect::Mz, Face::Left);
    let ll = model.live_load_response(service, &q, "Design", Optimization::Minimize, LiveLoadQuery::default())?;
    if let Some(config) = ll.configuration {
        println!("\nGoverning truck for negative moment at B ({:.2} kN·m):", ll.value);
        for axle in &config.axles {
            println!("  {:.1} kN at x = {:.2} m", axle.weight, axle.location);
        }
    }

    let points = model.contraflexure_points(service, "Barrier", ResultsType::Cumulative)?;
    println!("\nContraflexure points due to barrier load: {:?}", points);

    println!("\n=== Analysis Complete ===");
    Ok(())
}
