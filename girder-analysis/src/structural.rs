//! Structural model capabilities used by the engine
//!
//! The engine describes a girder line to, and reads results from, any type
//! implementing [`StructuralModel`]. The capabilities are grouped the way the
//! engine uses them: geometry and topology, staged properties, load
//! assignment and response queries. [`StagedModel`] implements all of them.

use girder_fem::prelude::*;

/// Stages, joints, members, supports and model points
pub trait StructureGeometry {
    fn add_stage(&mut self, name: &str) -> FemResult<StageIndex>;
    fn add_joint(&mut self, x: f64) -> JointId;
    fn add_member(&mut self, member: Member) -> FemResult<MemberId>;
    fn add_support(&mut self, support: Support) -> FemResult<SupportId>;
    fn add_poi(&mut self, x: f64) -> PoiId;
}

/// Stiffness that changes from stage to stage
pub trait StagedProperties {
    fn set_member_stiffness(
        &mut self,
        member: MemberId,
        stage: StageIndex,
        stiffness: MemberStiffness,
    ) -> FemResult<()>;
}

/// Load groups, loads, cases, combinations and live loads
pub trait LoadAssignment {
    fn add_load_group(&mut self, name: &str) -> FemResult<()>;
    fn has_load_group(&self, name: &str) -> bool;
    fn add_joint_load(&mut self, joint: JointId, load: JointLoad) -> FemResult<()>;
    fn add_member_load(&mut self, member: MemberId, load: MemberLoad) -> FemResult<()>;
    fn add_load_case(&mut self, case: LoadCase) -> FemResult<()>;
    fn add_group_to_case(&mut self, case: &str, group: &str) -> FemResult<()>;
    fn add_load_combination(&mut self, combination: LoadCombination) -> FemResult<()>;
    fn add_live_load_model(&mut self, model: LiveLoadModel) -> FemResult<()>;
    fn set_distribution_factors(&mut self, segments: Vec<DistributionFactorSegment>);
    fn set_support_distribution_factors(
        &mut self,
        support: SupportId,
        factors: DistributionFactors,
    ) -> FemResult<()>;
}

/// Analysis and results
pub trait ResponseQuery {
    fn analyze(&mut self) -> FemResult<()>;

    fn is_analyzed(&self) -> bool;

    fn section_forces(
        &self,
        stage: StageIndex,
        poi: PoiId,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<SectionForces>;

    fn displacement(
        &self,
        stage: StageIndex,
        poi: PoiId,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<PoiDisplacement>;

    fn section_forces_at(
        &self,
        stage: StageIndex,
        x: f64,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<SectionForces>;

    fn displacement_at(
        &self,
        stage: StageIndex,
        x: f64,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<PoiDisplacement>;

    fn reaction(
        &self,
        stage: StageIndex,
        support: SupportId,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<Reaction>;

    fn response(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<f64>;

    fn load_case_response(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        case: &str,
        results_type: ResultsType,
    ) -> FemResult<f64>;

    fn combination_response(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        combination: &str,
        opt: Optimization,
        results_type: ResultsType,
    ) -> FemResult<CombinationResult>;

    fn live_load_response(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        model: &str,
        opt: Optimization,
        query: LiveLoadQuery,
    ) -> FemResult<LiveLoadResult>;

    fn configuration_response(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        model: &str,
        configuration: &AxleConfiguration,
        query: LiveLoadQuery,
    ) -> FemResult<f64>;

    fn contraflexure_points(
        &self,
        stage: StageIndex,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<Vec<f64>>;

    fn unit_load_response(
        &self,
        stage: StageIndex,
        at: PoiId,
        unit: UnitLoad,
        target: PoiId,
    ) -> FemResult<(SectionForces, PoiDisplacement)>;
}

/// A complete structural model
pub trait StructuralModel:
    StructureGeometry + StagedProperties + LoadAssignment + ResponseQuery
{
    /// Empty model using the given solver options
    fn with_options(options: SolverOptions) -> Self;
}

impl StructureGeometry for StagedModel {
    fn add_stage(&mut self, name: &str) -> FemResult<StageIndex> {
        StagedModel::add_stage(self, name)
    }

    fn add_joint(&mut self, x: f64) -> JointId {
        StagedModel::add_joint(self, Joint::new(x))
    }

    fn add_member(&mut self, member: Member) -> FemResult<MemberId> {
        StagedModel::add_member(self, member)
    }

    fn add_support(&mut self, support: Support) -> FemResult<SupportId> {
        StagedModel::add_support(self, support)
    }

    fn add_poi(&mut self, x: f64) -> PoiId {
        StagedModel::add_poi(self, x)
    }
}

impl StagedProperties for StagedModel {
    fn set_member_stiffness(
        &mut self,
        member: MemberId,
        stage: StageIndex,
        stiffness: MemberStiffness,
    ) -> FemResult<()> {
        StagedModel::set_member_stiffness(self, member, stage, stiffness)
    }
}

impl LoadAssignment for StagedModel {
    fn add_load_group(&mut self, name: &str) -> FemResult<()> {
        StagedModel::add_load_group(self, name)
    }

    fn has_load_group(&self, name: &str) -> bool {
        StagedModel::has_load_group(self, name)
    }

    fn add_joint_load(&mut self, joint: JointId, load: JointLoad) -> FemResult<()> {
        StagedModel::add_joint_load(self, joint, load)
    }

    fn add_member_load(&mut self, member: MemberId, load: MemberLoad) -> FemResult<()> {
        StagedModel::add_member_load(self, member, load)
    }

    fn add_load_case(&mut self, case: LoadCase) -> FemResult<()> {
        StagedModel::add_load_case(self, case)
    }

    fn add_group_to_case(&mut self, case: &str, group: &str) -> FemResult<()> {
        StagedModel::add_group_to_case(self, case, group)
    }

    fn add_load_combination(&mut self, combination: LoadCombination) -> FemResult<()> {
        StagedModel::add_load_combination(self, combination)
    }

    fn add_live_load_model(&mut self, model: LiveLoadModel) -> FemResult<()> {
        StagedModel::add_live_load_model(self, model)
    }

    fn set_distribution_factors(&mut self, segments: Vec<DistributionFactorSegment>) {
        StagedModel::set_distribution_factors(self, segments)
    }

    fn set_support_distribution_factors(
        &mut self,
        support: SupportId,
        factors: DistributionFactors,
    ) -> FemResult<()> {
        StagedModel::set_support_distribution_factors(self, support, factors)
    }
}

impl ResponseQuery for StagedModel {
    fn analyze(&mut self) -> FemResult<()> {
        StagedModel::analyze(self)
    }

    fn is_analyzed(&self) -> bool {
        StagedModel::is_analyzed(self)
    }

    fn section_forces(
        &self,
        stage: StageIndex,
        poi: PoiId,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<SectionForces> {
        StagedModel::section_forces(self, stage, poi, group, results_type)
    }

    fn displacement(
        &self,
        stage: StageIndex,
        poi: PoiId,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<PoiDisplacement> {
        StagedModel::displacement(self, stage, poi, group, results_type)
    }

    fn section_forces_at(
        &self,
        stage: StageIndex,
        x: f64,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<SectionForces> {
        StagedModel::section_forces_at(self, stage, x, group, results_type)
    }

    fn displacement_at(
        &self,
        stage: StageIndex,
        x: f64,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<PoiDisplacement> {
        StagedModel::displacement_at(self, stage, x, group, results_type)
    }

    fn reaction(
        &self,
        stage: StageIndex,
        support: SupportId,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<Reaction> {
        StagedModel::reaction(self, stage, support, group, results_type)
    }

    fn response(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<f64> {
        StagedModel::response(self, stage, quantity, group, results_type)
    }

    fn load_case_response(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        case: &str,
        results_type: ResultsType,
    ) -> FemResult<f64> {
        StagedModel::load_case_response(self, stage, quantity, case, results_type)
    }

    fn combination_response(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        combination: &str,
        opt: Optimization,
        results_type: ResultsType,
    ) -> FemResult<CombinationResult> {
        StagedModel::combination_response(self, stage, quantity, combination, opt, results_type)
    }

    fn live_load_response(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        model: &str,
        opt: Optimization,
        query: LiveLoadQuery,
    ) -> FemResult<LiveLoadResult> {
        StagedModel::live_load_response(self, stage, quantity, model, opt, query)
    }

    fn configuration_response(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        model: &str,
        configuration: &AxleConfiguration,
        query: LiveLoadQuery,
    ) -> FemResult<f64> {
        StagedModel::configuration_response(self, stage, quantity, model, configuration, query)
    }

    fn contraflexure_points(
        &self,
        stage: StageIndex,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<Vec<f64>> {
        StagedModel::contraflexure_points(self, stage, group, results_type)
    }

    fn unit_load_response(
        &self,
        stage: StageIndex,
        at: PoiId,
        unit: UnitLoad,
        target: PoiId,
    ) -> FemResult<(SectionForces, PoiDisplacement)> {
        StagedModel::unit_load_response(self, stage, at, unit, target)
    }
}

impl StructuralModel for StagedModel {
    fn with_options(options: SolverOptions) -> Self {
        StagedModel::with_options(options)
    }
}
