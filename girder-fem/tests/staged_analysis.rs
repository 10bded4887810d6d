use approx::assert_relative_eq;
use girder_fem::prelude::*;

const EA: f64 = 1.0e7;
const EI: f64 = 1.0e5;

fn stiffness() -> MemberStiffness {
    MemberStiffness::new(EA, EI)
}

fn uniform(w: f64, length: f64, stage: StageIndex, group: &str) -> MemberLoad {
    MemberLoad::Distributed(DistributedLoad::transverse(w, w, 0.0, length, stage, group))
}

/// Two 10 m spans on three supports, continuous from the start
fn two_span_model(options: SolverOptions) -> StagedModel {
    let mut model = StagedModel::with_options(options);
    let s0 = model.add_stage("Service").unwrap();

    let joints: Vec<JointId> = [0.0, 10.0, 20.0]
        .iter()
        .map(|x| model.add_joint(Joint::new(*x)))
        .collect();
    for w in joints.windows(2) {
        model
            .add_member(Member::new(w[0], w[1], s0).with_stiffness(s0, stiffness()))
            .unwrap();
    }
    model.add_support(Support::pinned(joints[0])).unwrap();
    model.add_support(Support::roller(joints[1])).unwrap();
    model.add_support(Support::roller(joints[2])).unwrap();

    model.add_load_group("DC").unwrap();
    for m in 0..2 {
        model.add_member_load(m, uniform(-10.0, 10.0, s0, "DC")).unwrap();
    }
    model
}

#[test]
fn test_two_span_continuous_uniform_load() {
    let mut model = two_span_model(SolverOptions::default());
    let pier = model.add_poi(10.0);
    model.analyze().unwrap();

    let r_end = model.reaction(0, 0, "DC", ResultsType::Cumulative).unwrap();
    let r_pier = model.reaction(0, 1, "DC", ResultsType::Cumulative).unwrap();
    assert_relative_eq!(r_end.fy, 37.5, epsilon = 1e-6);
    assert_relative_eq!(r_pier.fy, 125.0, epsilon = 1e-6);

    let forces = model
        .section_forces(0, pier, "DC", ResultsType::Cumulative)
        .unwrap();
    assert_relative_eq!(forces.mz.left, -125.0, epsilon = 1e-6);
    // the right face carries the equal and opposite moment
    assert_relative_eq!(forces.mz.right, 125.0, epsilon = 1e-6);
    // shear jumps by the pier reaction
    assert_relative_eq!(-forces.fy.left - forces.fy.right, -125.0, epsilon = 1e-6);
}

#[test]
fn test_dense_solver_matches_skyline() {
    let mut sparse = two_span_model(SolverOptions::default());
    let mut dense = two_span_model(SolverOptions::default().dense());
    sparse.analyze().unwrap();
    dense.analyze().unwrap();

    let a = sparse.reaction(0, 1, "DC", ResultsType::Cumulative).unwrap();
    let b = dense.reaction(0, 1, "DC", ResultsType::Cumulative).unwrap();
    assert_relative_eq!(a.fy, b.fy, epsilon = 1e-6);
}

#[test]
fn test_simple_span_deflection_and_rotation() {
    let mut model = StagedModel::new();
    let s0 = model.add_stage("Erection").unwrap();
    let a = model.add_joint(Joint::new(0.0));
    let b = model.add_joint(Joint::new(10.0));
    model
        .add_member(Member::new(a, b, s0).with_stiffness(s0, stiffness()))
        .unwrap();
    model.add_support(Support::pinned(a)).unwrap();
    model.add_support(Support::roller(b)).unwrap();
    model.add_load_group("DC").unwrap();
    model.add_member_load(0, uniform(-10.0, 10.0, s0, "DC")).unwrap();

    let start = model.add_poi(0.0);
    let mid = model.add_poi(5.0);
    model.analyze().unwrap();

    let d = model
        .displacement(s0, mid, "DC", ResultsType::Cumulative)
        .unwrap();
    assert_relative_eq!(d.dy, -5.0 * 10.0 * 1.0e4 / (384.0 * EI), epsilon = 1e-9);
    assert_relative_eq!(d.rz, 0.0, epsilon = 1e-12);

    let d0 = model
        .displacement(s0, start, "DC", ResultsType::Cumulative)
        .unwrap();
    assert_relative_eq!(d0.rz, -10.0 * 1.0e3 / (24.0 * EI), epsilon = 1e-9);
}

#[test]
fn test_imposed_curvature_on_simple_span() {
    let mut model = StagedModel::new();
    let s0 = model.add_stage("Stressing").unwrap();
    let a = model.add_joint(Joint::new(0.0));
    let b = model.add_joint(Joint::new(10.0));
    model
        .add_member(Member::new(a, b, s0).with_stiffness(s0, stiffness()))
        .unwrap();
    model.add_support(Support::pinned(a)).unwrap();
    model.add_support(Support::roller(b)).unwrap();
    model.add_load_group("PS").unwrap();
    model
        .add_member_load(
            0,
            MemberLoad::Strain(StrainLoad::new(0.0, 10.0, 0.0, 1.0e-3, s0, "PS")),
        )
        .unwrap();
    let mid = model.add_poi(5.0);
    model.analyze().unwrap();

    let forces = model
        .section_forces(s0, mid, "PS", ResultsType::Cumulative)
        .unwrap();
    assert_relative_eq!(forces.mz.left, 0.0, epsilon = 1e-9);

    let d = model
        .displacement(s0, mid, "PS", ResultsType::Cumulative)
        .unwrap();
    assert_relative_eq!(d.dy, -1.0e-3 * 100.0 / 8.0, epsilon = 1e-9);
}

#[test]
fn test_continuity_made_in_later_stage() {
    let mut model = StagedModel::new();
    let erect = model.add_stage("Erection").unwrap();
    let deck = model.add_stage("Continuity").unwrap();

    let joints: Vec<JointId> = [0.0, 10.0, 20.0]
        .iter()
        .map(|x| model.add_joint(Joint::new(*x)))
        .collect();
    model
        .add_member(
            Member::new(joints[0], joints[1], erect)
                .with_stiffness(erect, stiffness())
                .with_releases(MemberReleases::pin_j().until(deck)),
        )
        .unwrap();
    model
        .add_member(
            Member::new(joints[1], joints[2], erect)
                .with_stiffness(erect, stiffness())
                .with_releases(MemberReleases::pin_i().until(deck)),
        )
        .unwrap();
    model.add_support(Support::pinned(joints[0])).unwrap();
    model.add_support(Support::roller(joints[1])).unwrap();
    model.add_support(Support::roller(joints[2])).unwrap();

    model.add_load_group("DC").unwrap();
    model.add_load_group("DW").unwrap();
    for m in 0..2 {
        model.add_member_load(m, uniform(-10.0, 10.0, erect, "DC")).unwrap();
        model.add_member_load(m, uniform(-10.0, 10.0, deck, "DW")).unwrap();
    }
    let mid = model.add_poi(5.0);
    let pier = model.add_poi(10.0);
    model.analyze().unwrap();

    let dc = model
        .section_forces(deck, pier, "DC", ResultsType::Cumulative)
        .unwrap();
    assert_relative_eq!(dc.mz.left, 0.0, epsilon = 1e-6);
    let dc_mid = model
        .section_forces(deck, mid, "DC", ResultsType::Cumulative)
        .unwrap();
    assert_relative_eq!(dc_mid.mz.left, 125.0, epsilon = 1e-6);

    let dw = model
        .section_forces(deck, pier, "DW", ResultsType::Cumulative)
        .unwrap();
    assert_relative_eq!(dw.mz.left, -125.0, epsilon = 1e-6);

    let r_dc = model.reaction(deck, 1, "DC", ResultsType::Cumulative).unwrap();
    let r_dc_inc = model.reaction(deck, 1, "DC", ResultsType::Incremental).unwrap();
    let r_dw = model.reaction(deck, 1, "DW", ResultsType::Cumulative).unwrap();
    assert_relative_eq!(r_dc.fy, 100.0, epsilon = 1e-6);
    assert_relative_eq!(r_dc_inc.fy, 0.0, epsilon = 1e-9);
    assert_relative_eq!(r_dw.fy, 125.0, epsilon = 1e-6);
}

#[test]
fn test_temporary_support_removal() {
    let mut model = StagedModel::new();
    let erect = model.add_stage("Erection").unwrap();
    let release = model.add_stage("Release").unwrap();

    let joints: Vec<JointId> = [0.0, 10.0, 20.0]
        .iter()
        .map(|x| model.add_joint(Joint::new(*x)))
        .collect();
    for w in joints.windows(2) {
        model
            .add_member(Member::new(w[0], w[1], erect).with_stiffness(erect, stiffness()))
            .unwrap();
    }
    model.add_support(Support::pinned(joints[0])).unwrap();
    let temporary = model
        .add_support(Support::roller(joints[1]).removed_at(release))
        .unwrap();
    model.add_support(Support::roller(joints[2])).unwrap();

    model.add_load_group("DC").unwrap();
    for m in 0..2 {
        model.add_member_load(m, uniform(-10.0, 10.0, erect, "DC")).unwrap();
    }
    let mid = model.add_poi(10.0);
    model.analyze().unwrap();

    let before = model
        .reaction(erect, temporary, "DC", ResultsType::Cumulative)
        .unwrap();
    assert_relative_eq!(before.fy, 125.0, epsilon = 1e-6);

    let after = model
        .reaction(release, temporary, "DC", ResultsType::Cumulative)
        .unwrap();
    assert_relative_eq!(after.fy, 0.0, epsilon = 1e-6);

    let end = model.reaction(release, 0, "DC", ResultsType::Cumulative).unwrap();
    assert_relative_eq!(end.fy, 100.0, epsilon = 1e-6);

    let forces = model
        .section_forces(release, mid, "DC", ResultsType::Cumulative)
        .unwrap();
    assert_relative_eq!(forces.mz.left, 500.0, epsilon = 1e-6);
}

#[test]
fn test_axial_restraint_is_added_when_missing() {
    let build = |options: SolverOptions| {
        let mut model = StagedModel::with_options(options);
        let s0 = model.add_stage("Erection").unwrap();
        let a = model.add_joint(Joint::new(0.0));
        let b = model.add_joint(Joint::new(10.0));
        model
            .add_member(Member::new(a, b, s0).with_stiffness(s0, stiffness()))
            .unwrap();
        model.add_support(Support::roller(a)).unwrap();
        model.add_support(Support::roller(b)).unwrap();
        model.add_load_group("DC").unwrap();
        model.add_member_load(0, uniform(-1.0, 10.0, s0, "DC")).unwrap();
        model
    };

    let mut restrained = build(SolverOptions::default());
    assert!(restrained.analyze().is_ok());

    let mut options = SolverOptions::default();
    options.auto_axial_restraint = false;
    let mut free = build(options);
    assert!(matches!(free.analyze(), Err(FemError::Unstable(_))));
}

#[test]
fn test_combination_uses_governing_factors() {
    let mut model = two_span_model(SolverOptions::default());
    model.add_load_group("DW").unwrap();
    model.add_member_load(0, uniform(-2.0, 10.0, 0, "DW")).unwrap();
    model.add_load_case(LoadCase::new("DC").with_group("DC")).unwrap();
    model.add_load_case(LoadCase::new("DW").with_group("DW")).unwrap();
    model
        .add_load_combination(
            LoadCombination::new("Strength I")
                .with_case_range("DC", 0.9, 1.25)
                .with_case_range("DW", 0.65, 1.5),
        )
        .unwrap();
    let poi = model.add_poi(4.0);
    model.analyze().unwrap();

    let q = ResponseQuantity::poi(poi, ForceEffect::Mz, Face::Left);
    let dc = model.load_case_response(0, &q, "DC", ResultsType::Cumulative).unwrap();
    let dw = model.load_case_response(0, &q, "DW", ResultsType::Cumulative).unwrap();
    assert!(dc > 0.0 && dw > 0.0);

    let max = model
        .combination_response(0, &q, "Strength I", Optimization::Maximize, ResultsType::Cumulative)
        .unwrap();
    let min = model
        .combination_response(0, &q, "Strength I", Optimization::Minimize, ResultsType::Cumulative)
        .unwrap();
    assert_relative_eq!(max.value, 1.25 * dc + 1.5 * dw, epsilon = 1e-9);
    assert_relative_eq!(min.value, 0.9 * dc + 0.65 * dw, epsilon = 1e-9);
    assert!(max.live_load.is_none());
}

#[test]
fn test_contraflexure_points_two_span() {
    let mut model = two_span_model(SolverOptions::default());
    model.analyze().unwrap();

    let points = model
        .contraflexure_points(0, "DC", ResultsType::Cumulative)
        .unwrap();
    assert_eq!(points.len(), 2);
    assert_relative_eq!(points[0], 7.5, epsilon = 1e-4);
    assert_relative_eq!(points[1], 12.5, epsilon = 1e-4);
}

#[test]
fn test_unit_load_response() {
    let mut model = two_span_model(SolverOptions::default());
    let load_at = model.add_poi(5.0);
    model.analyze().unwrap();

    let (forces, _) = model
        .unit_load_response(0, load_at, UnitLoad::Force, load_at)
        .unwrap();
    // two-span unit load at midspan of the first span: M = 13PL/64
    assert_relative_eq!(forces.mz.left, 13.0 * 10.0 / 64.0, epsilon = 1e-6);
}

#[test]
fn test_model_points_are_not_duplicated() {
    let mut model = StagedModel::new();
    let a = model.add_poi(3.0);
    let b = model.add_poi(3.0 + 1e-9);
    let c = model.add_poi(4.0);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(model.poi_location(c).unwrap(), 4.0);
}

#[test]
fn test_member_must_run_forward() {
    let mut model = StagedModel::new();
    let s0 = model.add_stage("Erection").unwrap();
    let a = model.add_joint(Joint::new(10.0));
    let b = model.add_joint(Joint::new(0.0));
    assert!(matches!(
        model.add_member(Member::new(a, b, s0)),
        Err(FemError::InvalidGeometry(_))
    ));
}
