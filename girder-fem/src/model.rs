//! Staged model - the structural model container
//!
//! A `StagedModel` describes a girder line as joints on a straight line,
//! members between them and supports under them, each existing from a given
//! stage on. Loads are grouped by name and applied in a stage; every stage is
//! solved incrementally with the stiffness it has at that time.

use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::analysis::{Optimization, ResultsType, SolverOptions, StageIndex};
use crate::elements::{Joint, JointId, Member, MemberId, MemberStiffness, Support, SupportId};
use crate::error::{FemError, FemResult};
use crate::influence::{self, InfluenceLine, InfluencePoint};
use crate::loads::{
    DistributionFactorSegment, DistributionFactors, JointLoad, LiveLoadApplication,
    LiveLoadModel, LoadCase, LoadCombination, MemberLoad, MemberLoadItem, VehicleApplicability,
    VehicularLoad,
};
use crate::results::{
    AxleConfiguration, CombinationResult, Face, ForceEffect, LiveLoadQuery, LiveLoadResult,
    PoiDisplacement, PoiId, Reaction, ResponseQuantity, SectionForces, UnitLoad,
};
use crate::solution::{
    LoadResponse, Solution, StageSolution, StageSystem, POSITION_TOLERANCE, UNIT_DOWN,
};

/// A staged line-beam model of a girder line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StagedModel {
    /// Stage names, in order
    pub stages: Vec<String>,
    /// Joints along the line
    pub joints: Vec<Joint>,
    /// Members between joints
    pub members: Vec<Member>,
    /// Supports at joints
    pub supports: Vec<Support>,
    /// Load group names
    pub load_groups: Vec<String>,
    /// Loads applied directly to joints
    pub joint_loads: Vec<(JointId, JointLoad)>,
    /// Loads carried by members
    pub member_loads: Vec<MemberLoadItem>,
    /// Points of interest (x along the line)
    pub pois: Vec<f64>,
    /// Load cases by name
    pub load_cases: BTreeMap<String, LoadCase>,
    /// Load combinations by name
    pub load_combinations: BTreeMap<String, LoadCombination>,
    /// Live load models by name
    pub live_load_models: BTreeMap<String, LiveLoadModel>,
    /// Distribution factor segments laid end to end from x = 0
    pub distribution_factors: Vec<DistributionFactorSegment>,
    /// Distribution factors for support reactions
    pub support_distribution_factors: BTreeMap<SupportId, DistributionFactors>,
    /// Solver options
    pub options: SolverOptions,

    #[serde(skip)]
    solution: Option<Solution>,
}

impl StagedModel {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty model with the given options
    pub fn with_options(options: SolverOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    // ========================
    // Model Building Methods
    // ========================

    /// Add a stage after the existing ones
    pub fn add_stage(&mut self, name: &str) -> FemResult<StageIndex> {
        if self.stages.iter().any(|s| s == name) {
            return Err(FemError::DuplicateName(name.to_string()));
        }
        self.stages.push(name.to_string());
        self.solution = None;
        Ok(self.stages.len() - 1)
    }

    /// Index of a stage by name
    pub fn stage_index(&self, name: &str) -> Option<StageIndex> {
        self.stages.iter().position(|s| s == name)
    }

    /// Add a joint
    pub fn add_joint(&mut self, joint: Joint) -> JointId {
        self.joints.push(joint);
        self.solution = None;
        self.joints.len() - 1
    }

    /// Add a member. The i-joint must lie left of the j-joint.
    pub fn add_member(&mut self, mut member: Member) -> FemResult<MemberId> {
        let xi = self.joint(member.i_joint)?.x;
        let xj = self.joint(member.j_joint)?.x;
        self.check_stage(member.stage)?;

        let length = xj - xi;
        if length <= POSITION_TOLERANCE {
            return Err(FemError::InvalidGeometry(format!(
                "member from x = {xi} to x = {xj} must run towards increasing x"
            )));
        }
        member.length = length;

        self.members.push(member);
        self.solution = None;
        Ok(self.members.len() - 1)
    }

    /// Set the stiffness of a member from `stage` on
    pub fn set_member_stiffness(
        &mut self,
        member: MemberId,
        stage: StageIndex,
        stiffness: MemberStiffness,
    ) -> FemResult<()> {
        self.check_stage(stage)?;
        self.members
            .get_mut(member)
            .ok_or(FemError::MemberNotFound(member))?
            .set_stiffness(stage, stiffness);
        self.solution = None;
        Ok(())
    }

    /// Add a support
    pub fn add_support(&mut self, support: Support) -> FemResult<SupportId> {
        self.joint(support.joint)?;
        self.check_stage(support.stage)?;
        if let Some(removed) = support.removed_at {
            if removed <= support.stage {
                return Err(FemError::InvalidInput(format!(
                    "support at joint {} is removed before it is installed",
                    support.joint
                )));
            }
        }
        self.supports.push(support);
        self.solution = None;
        Ok(self.supports.len() - 1)
    }

    /// Declare a load group
    pub fn add_load_group(&mut self, name: &str) -> FemResult<()> {
        if self.has_load_group(name) {
            return Err(FemError::DuplicateName(name.to_string()));
        }
        self.load_groups.push(name.to_string());
        Ok(())
    }

    /// Check whether a load group exists
    pub fn has_load_group(&self, name: &str) -> bool {
        self.load_groups.iter().any(|g| g == name)
    }

    /// Add a load to a joint
    pub fn add_joint_load(&mut self, joint: JointId, load: JointLoad) -> FemResult<()> {
        self.joint(joint)?;
        self.check_stage(load.stage)?;
        self.check_group(&load.group)?;
        self.joint_loads.push((joint, load));
        self.solution = None;
        Ok(())
    }

    /// Add a load to a member. Positions are measured from the i-joint.
    pub fn add_member_load(&mut self, member: MemberId, load: MemberLoad) -> FemResult<()> {
        let m = self
            .members
            .get(member)
            .ok_or(FemError::MemberNotFound(member))?;
        self.check_stage(load.stage())?;
        self.check_group(load.group())?;

        if load.stage() < m.stage {
            return Err(FemError::InvalidInput(format!(
                "load on member {member} is applied in stage {} before the member exists",
                load.stage()
            )));
        }

        let length = m.length();
        let inside = |x: f64| x >= -POSITION_TOLERANCE && x <= length + POSITION_TOLERANCE;
        let valid = match &load {
            MemberLoad::Point(p) => inside(p.x),
            MemberLoad::Distributed(d) => inside(d.x1) && inside(d.x2) && d.x1 <= d.x2,
            MemberLoad::Strain(s) => inside(s.x1) && inside(s.x2) && s.x1 <= s.x2,
        };
        if !valid {
            return Err(FemError::InvalidInput(format!(
                "load on member {member} lies outside the member"
            )));
        }

        self.member_loads.push(MemberLoadItem { member, load });
        self.solution = None;
        Ok(())
    }

    /// Add a point of interest. An existing point at the same location is
    /// reused.
    pub fn add_poi(&mut self, x: f64) -> PoiId {
        match self.find_poi(x) {
            Some(id) => id,
            None => {
                self.pois.push(x);
                self.pois.len() - 1
            }
        }
    }

    /// Find the point of interest at `x`
    pub fn find_poi(&self, x: f64) -> Option<PoiId> {
        self.pois
            .iter()
            .position(|p| (p - x).abs() <= POSITION_TOLERANCE)
    }

    /// Location of a point of interest
    pub fn poi_location(&self, poi: PoiId) -> FemResult<f64> {
        self.pois
            .get(poi)
            .copied()
            .ok_or(FemError::PoiNotFound(poi))
    }

    /// Add a load case
    pub fn add_load_case(&mut self, case: LoadCase) -> FemResult<()> {
        if self.load_cases.contains_key(&case.name) {
            return Err(FemError::DuplicateName(case.name));
        }
        for group in &case.load_groups {
            self.check_group(group)?;
        }
        self.load_cases.insert(case.name.clone(), case);
        Ok(())
    }

    /// Add a load group to an existing load case
    pub fn add_group_to_case(&mut self, case: &str, group: &str) -> FemResult<()> {
        self.check_group(group)?;
        self.load_cases
            .get_mut(case)
            .ok_or_else(|| FemError::LoadCaseNotFound(case.to_string()))?
            .add_group(group);
        Ok(())
    }

    /// Add a load combination
    pub fn add_load_combination(&mut self, combo: LoadCombination) -> FemResult<()> {
        if self.load_combinations.contains_key(&combo.name) {
            return Err(FemError::DuplicateName(combo.name));
        }
        for case in combo.factors.keys() {
            if !self.load_cases.contains_key(case) {
                return Err(FemError::LoadCaseNotFound(case.clone()));
            }
        }
        self.load_combinations.insert(combo.name.clone(), combo);
        Ok(())
    }

    /// Add a live load model
    pub fn add_live_load_model(&mut self, model: LiveLoadModel) -> FemResult<()> {
        if self.live_load_models.contains_key(&model.name) {
            return Err(FemError::DuplicateName(model.name));
        }
        self.live_load_models.insert(model.name.clone(), model);
        Ok(())
    }

    /// Replace the distribution factor segments
    pub fn set_distribution_factors(&mut self, segments: Vec<DistributionFactorSegment>) {
        self.distribution_factors = segments;
    }

    /// Set the distribution factors for the reaction of a support
    pub fn set_support_distribution_factors(
        &mut self,
        support: SupportId,
        factors: DistributionFactors,
    ) -> FemResult<()> {
        if support >= self.supports.len() {
            return Err(FemError::SupportNotFound(support));
        }
        self.support_distribution_factors.insert(support, factors);
        Ok(())
    }

    /// Distribution factors at `x`
    pub fn distribution_factors_at(&self, x: f64) -> DistributionFactors {
        let mut start = 0.0;
        for segment in &self.distribution_factors {
            if x <= start + segment.length + POSITION_TOLERANCE {
                return segment.at(x - start);
            }
            start += segment.length;
        }
        self.distribution_factors
            .last()
            .map(|s| s.end)
            .unwrap_or_default()
    }

    fn joint(&self, joint: JointId) -> FemResult<&Joint> {
        self.joints.get(joint).ok_or(FemError::JointNotFound(joint))
    }

    fn check_stage(&self, stage: StageIndex) -> FemResult<()> {
        if stage < self.stages.len() {
            Ok(())
        } else {
            Err(FemError::StageNotFound(stage))
        }
    }

    fn check_group(&self, group: &str) -> FemResult<()> {
        if self.has_load_group(group) {
            Ok(())
        } else {
            Err(FemError::LoadGroupNotFound(group.to_string()))
        }
    }

    // ========================
    // Analysis Methods
    // ========================

    /// Solve every stage
    pub fn analyze(&mut self) -> FemResult<()> {
        self.prepare_model()?;

        let n_stages = self.stages.len();
        let n_supports = self.supports.len();
        let influence_from = self.options.live_load_stage.unwrap_or(n_stages - 1);

        if self.options.log {
            info!(
                "analyzing {} stages: {} joints, {} members, {} supports, {} load groups",
                n_stages,
                self.joints.len(),
                self.members.len(),
                n_supports,
                self.load_groups.len()
            );
        }

        let mut accumulated: HashMap<String, Vec<[f64; 3]>> = HashMap::new();
        let mut stages = Vec::with_capacity(n_stages);

        for stage in 0..n_stages {
            let system = StageSystem::build(self, stage)?;

            let removed: Vec<SupportId> = self
                .supports
                .iter()
                .enumerate()
                .filter(|(_, s)| s.removed_at == Some(stage))
                .map(|(id, _)| id)
                .collect();

            let mut groups = HashMap::new();
            let mut reactions = HashMap::new();

            for group in &self.load_groups {
                let mut joint_loads: Vec<(JointId, [f64; 3])> = self
                    .joint_loads
                    .iter()
                    .filter(|(_, l)| l.stage == stage && l.group == *group)
                    .map(|(j, l)| (*j, l.as_array()))
                    .collect();

                // A removed support hands its reaction back to the structure
                if let Some(acc) = accumulated.get(group) {
                    for &id in &removed {
                        let r = acc[id];
                        joint_loads.push((self.supports[id].joint, [-r[0], -r[1], -r[2]]));
                    }
                }

                let mut member_loads = vec![Vec::new(); self.members.len()];
                let mut loaded = !joint_loads.is_empty();
                for item in self
                    .member_loads
                    .iter()
                    .filter(|i| i.load.stage() == stage && i.load.group() == group)
                {
                    member_loads[item.member].push(item.load.clone());
                    loaded = true;
                }
                if !loaded {
                    continue;
                }

                let response = system.solve(&joint_loads, member_loads);

                let acc = accumulated
                    .entry(group.clone())
                    .or_insert_with(|| vec![[0.0; 3]; n_supports]);
                let mut stage_reactions = vec![Reaction::default(); n_supports];
                for (id, support) in self.supports.iter().enumerate() {
                    let r = if support.is_active(stage) {
                        response.joint_reactions[support.joint]
                    } else if removed.contains(&id) {
                        let a = acc[id];
                        [-a[0], -a[1], -a[2]]
                    } else {
                        [0.0; 3]
                    };
                    for k in 0..3 {
                        acc[id][k] += r[k];
                    }
                    stage_reactions[id] = Reaction::from_array(r);
                }

                reactions.insert(group.clone(), stage_reactions);
                groups.insert(group.clone(), response);
            }

            let influence = (stage >= influence_from)
                .then(|| system.influence_responses(self.options.influence_subdivisions));

            if self.options.log {
                info!(
                    "stage {} '{}': {} load groups solved",
                    stage,
                    self.stages[stage],
                    groups.len()
                );
            }

            stages.push(StageSolution {
                system,
                groups,
                reactions,
                influence,
            });
        }

        self.solution = Some(Solution { stages });
        Ok(())
    }

    /// Validate the model before analysis
    fn prepare_model(&mut self) -> FemResult<()> {
        if self.stages.is_empty() {
            return Err(FemError::InvalidInput("model has no stages".to_string()));
        }

        for (id, member) in self.members.iter_mut().enumerate() {
            let xi = self
                .joints
                .get(member.i_joint)
                .ok_or(FemError::JointNotFound(member.i_joint))?
                .x;
            let xj = self
                .joints
                .get(member.j_joint)
                .ok_or(FemError::JointNotFound(member.j_joint))?
                .x;
            member.length = xj - xi;
            if member.length <= POSITION_TOLERANCE {
                return Err(FemError::InvalidGeometry(format!(
                    "member {id} has zero or negative length"
                )));
            }
            if member
                .stiffness
                .iter()
                .any(|(_, k)| k.ea <= 0.0 || k.ei <= 0.0)
            {
                return Err(FemError::InvalidInput(format!(
                    "member {id} has non-positive stiffness"
                )));
            }
        }

        debug!("model prepared: {} members", self.members.len());
        Ok(())
    }

    /// Check whether the model has been analyzed
    pub fn is_analyzed(&self) -> bool {
        self.solution.is_some()
    }

    fn stage_solution(&self, stage: StageIndex) -> FemResult<&StageSolution> {
        self.solution
            .as_ref()
            .ok_or(FemError::NotAnalyzed)?
            .stages
            .get(stage)
            .ok_or(FemError::StageNotFound(stage))
    }

    fn stage_range(stage: StageIndex, results_type: ResultsType) -> RangeInclusive<StageIndex> {
        match results_type {
            ResultsType::Incremental => stage..=stage,
            ResultsType::Cumulative => 0..=stage,
        }
    }

    /// Stage solutions contributing to a result, checked
    fn contributing(
        &self,
        stage: StageIndex,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<Vec<&StageSolution>> {
        self.check_group(group)?;
        self.stage_solution(stage)?;
        Self::stage_range(stage, results_type)
            .map(|s| self.stage_solution(s))
            .collect()
    }

    // ========================
    // Load Group Results
    // ========================

    /// Section forces at a point of interest
    pub fn section_forces(
        &self,
        stage: StageIndex,
        poi: PoiId,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<SectionForces> {
        self.section_forces_at(stage, self.poi_location(poi)?, group, results_type)
    }

    /// Section forces at any location
    pub fn section_forces_at(
        &self,
        stage: StageIndex,
        x: f64,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<SectionForces> {
        let mut total = SectionForces::default();
        for solution in self.contributing(stage, group, results_type)? {
            if let Some(response) = solution.groups.get(group) {
                total += solution.system.section(response, x);
            }
        }
        Ok(total)
    }

    /// Deflection and rotation at a point of interest
    pub fn displacement(
        &self,
        stage: StageIndex,
        poi: PoiId,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<PoiDisplacement> {
        self.displacement_at(stage, self.poi_location(poi)?, group, results_type)
    }

    /// Deflection and rotation at any location
    pub fn displacement_at(
        &self,
        stage: StageIndex,
        x: f64,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<PoiDisplacement> {
        let mut total = PoiDisplacement::default();
        for solution in self.contributing(stage, group, results_type)? {
            if let Some(response) = solution.groups.get(group) {
                total += solution.system.displacement(response, x);
            }
        }
        Ok(total)
    }

    /// Reaction at a support
    pub fn reaction(
        &self,
        stage: StageIndex,
        support: SupportId,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<Reaction> {
        if support >= self.supports.len() {
            return Err(FemError::SupportNotFound(support));
        }
        let mut total = Reaction::default();
        for solution in self.contributing(stage, group, results_type)? {
            if let Some(reactions) = solution.reactions.get(group) {
                total += reactions[support];
            }
        }
        Ok(total)
    }

    /// Scalar response to a load group
    pub fn response(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<f64> {
        match quantity {
            ResponseQuantity::Poi { poi, effect, face } => {
                let x = self.poi_location(*poi)?;
                if effect.is_force() {
                    let forces = self.section_forces_at(stage, x, group, results_type)?;
                    Ok(forces.effect(*effect).face(*face))
                } else {
                    let d = self.displacement_at(stage, x, group, results_type)?;
                    Ok(displacement_component(&d, *effect))
                }
            }
            ResponseQuantity::Reaction { supports, effect } => supports
                .iter()
                .map(|s| {
                    self.reaction(stage, *s, group, results_type)
                        .map(|r| reaction_component(&r, *effect))
                })
                .sum(),
        }
    }

    // ========================
    // Load Case Results
    // ========================

    fn load_case(&self, name: &str) -> FemResult<&LoadCase> {
        self.load_cases
            .get(name)
            .ok_or_else(|| FemError::LoadCaseNotFound(name.to_string()))
    }

    /// Section forces for a load case
    pub fn load_case_section_forces(
        &self,
        stage: StageIndex,
        poi: PoiId,
        case: &str,
        results_type: ResultsType,
    ) -> FemResult<SectionForces> {
        let mut total = SectionForces::default();
        for group in &self.load_case(case)?.load_groups {
            total += self.section_forces(stage, poi, group, results_type)?;
        }
        Ok(total)
    }

    /// Displacement for a load case
    pub fn load_case_displacement(
        &self,
        stage: StageIndex,
        poi: PoiId,
        case: &str,
        results_type: ResultsType,
    ) -> FemResult<PoiDisplacement> {
        let mut total = PoiDisplacement::default();
        for group in &self.load_case(case)?.load_groups {
            total += self.displacement(stage, poi, group, results_type)?;
        }
        Ok(total)
    }

    /// Support reaction for a load case
    pub fn load_case_reaction(
        &self,
        stage: StageIndex,
        support: SupportId,
        case: &str,
        results_type: ResultsType,
    ) -> FemResult<Reaction> {
        let mut total = Reaction::default();
        for group in &self.load_case(case)?.load_groups {
            total += self.reaction(stage, support, group, results_type)?;
        }
        Ok(total)
    }

    /// Scalar response to a load case
    pub fn load_case_response(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        case: &str,
        results_type: ResultsType,
    ) -> FemResult<f64> {
        self.load_case(case)?
            .load_groups
            .iter()
            .map(|g| self.response(stage, quantity, g, results_type))
            .sum()
    }

    // ========================
    // Load Combination Results
    // ========================

    /// Extreme value of a load combination. For each load case the factor
    /// that drives the result towards the extreme is used.
    pub fn combination_response(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        combination: &str,
        opt: Optimization,
        results_type: ResultsType,
    ) -> FemResult<CombinationResult> {
        let combo = self
            .load_combinations
            .get(combination)
            .ok_or_else(|| FemError::LoadCombinationNotFound(combination.to_string()))?;

        let mut value = 0.0;
        for (case, factors) in &combo.factors {
            let v = self.load_case_response(stage, quantity, case, results_type)?;
            let factor = if opt.favors(v) { factors.max } else { factors.min };
            value += factor * v;
        }

        let live_load = if combo.has_live_load() {
            let live = self.combined_live_load(
                stage,
                quantity,
                &combo.live_load_models,
                combo.live_load_application,
                opt,
            )?;
            value += combo.live_load_factor * live.value;
            Some(live)
        } else {
            None
        };

        Ok(CombinationResult { value, live_load })
    }

    /// Section forces of a load combination, each component and face
    /// optimized independently
    pub fn combination_section_forces(
        &self,
        stage: StageIndex,
        poi: PoiId,
        combination: &str,
        opt: Optimization,
        results_type: ResultsType,
    ) -> FemResult<SectionForces> {
        let mut faces = [[0.0; 3]; 2];
        for (f, face) in [Face::Left, Face::Right].into_iter().enumerate() {
            for (k, effect) in [ForceEffect::Fx, ForceEffect::Fy, ForceEffect::Mz]
                .into_iter()
                .enumerate()
            {
                let q = ResponseQuantity::poi(poi, effect, face);
                faces[f][k] = self
                    .combination_response(stage, &q, combination, opt, results_type)?
                    .value;
            }
        }
        Ok(SectionForces::from_faces(faces[0], faces[1]))
    }

    fn combined_live_load(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        models: &[String],
        application: LiveLoadApplication,
        opt: Optimization,
    ) -> FemResult<LiveLoadResult> {
        let mut combined: Option<LiveLoadResult> = None;
        for model in models {
            let result =
                self.live_load_response(stage, quantity, model, opt, LiveLoadQuery::default())?;
            combined = Some(match (combined, application) {
                (None, _) => result,
                (Some(acc), LiveLoadApplication::Sum) => LiveLoadResult {
                    value: acc.value + result.value,
                    configuration: acc.configuration.or(result.configuration),
                },
                (Some(acc), LiveLoadApplication::Envelope) => {
                    if opt.improves(result.value, acc.value) {
                        result
                    } else {
                        acc
                    }
                }
            });
        }
        Ok(combined.unwrap_or_else(LiveLoadResult::none))
    }

    // ========================
    // Live Load Results
    // ========================

    fn live_load_model(&self, name: &str) -> FemResult<&LiveLoadModel> {
        self.live_load_models
            .get(name)
            .ok_or_else(|| FemError::LiveLoadModelNotFound(name.to_string()))
    }

    /// Influence line of a response in a stage
    fn influence_line(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
    ) -> FemResult<InfluenceLine> {
        let solution = self.stage_solution(stage)?;
        let system = &solution.system;

        let computed;
        let base: &[(f64, LoadResponse)] = match &solution.influence {
            Some(base) => base,
            None => {
                computed = system.influence_responses(self.options.influence_subdivisions);
                &computed
            }
        };

        let mut points = Vec::with_capacity(base.len() + 1);
        match quantity {
            ResponseQuantity::Poi { poi, effect, face } => {
                let x = self.poi_location(*poi)?;
                for (at, response) in base {
                    if (at - x).abs() <= POSITION_TOLERANCE {
                        continue;
                    }
                    let value = poi_value(system, response, x, *effect, *face);
                    points.push(InfluencePoint::continuous(*at, value));
                }
                if let Some(response) = system.unit_response(x, UNIT_DOWN) {
                    points.push(point_at_section(system, &response, x, *effect, *face));
                }
            }
            ResponseQuantity::Reaction { supports, effect } => {
                for (at, response) in base {
                    let value = self.reaction_value(stage, response, supports, *effect)?;
                    points.push(InfluencePoint::continuous(*at, value));
                }
            }
        }

        Ok(InfluenceLine::new(points))
    }

    fn reaction_value(
        &self,
        stage: StageIndex,
        response: &LoadResponse,
        supports: &[SupportId],
        effect: ForceEffect,
    ) -> FemResult<f64> {
        let mut value = 0.0;
        for &id in supports {
            let support = self
                .supports
                .get(id)
                .ok_or(FemError::SupportNotFound(id))?;
            if support.is_active(stage) {
                let r = Reaction::from_array(response.joint_reactions[support.joint]);
                value += reaction_component(&r, effect);
            }
        }
        Ok(value)
    }

    fn distribution_factor(
        &self,
        quantity: &ResponseQuantity,
        model: &LiveLoadModel,
        value: f64,
    ) -> FemResult<f64> {
        let kind = model.distribution;
        Ok(match quantity {
            ResponseQuantity::Poi { poi, effect, .. } => {
                let df = self.distribution_factors_at(self.poi_location(*poi)?);
                match effect {
                    ForceEffect::Mz => df.moment(kind, value >= 0.0),
                    ForceEffect::Fx | ForceEffect::Fy => df.shear(kind),
                    ForceEffect::Dy | ForceEffect::Rz => df.deflection(kind),
                }
            }
            ResponseQuantity::Reaction { supports, .. } => supports
                .first()
                .and_then(|s| self.support_distribution_factors.get(s))
                .copied()
                .unwrap_or_default()
                .reaction(kind),
        })
    }

    fn vehicle_applies(
        &self,
        vehicle: &VehicularLoad,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        opt: Optimization,
    ) -> bool {
        match vehicle.applicability {
            VehicleApplicability::All => true,
            VehicleApplicability::NegativeMomentAndInteriorPierReaction => match quantity {
                ResponseQuantity::Poi { effect, .. } => {
                    *effect == ForceEffect::Mz && opt == Optimization::Minimize
                }
                ResponseQuantity::Reaction { supports, .. } => {
                    let active: Vec<f64> = self
                        .supports
                        .iter()
                        .filter(|s| s.is_active(stage))
                        .filter_map(|s| self.joints.get(s.joint).map(|j| j.x))
                        .collect();
                    let lo = active.iter().copied().fold(f64::INFINITY, f64::min);
                    let hi = active.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    !supports.is_empty()
                        && supports.iter().all(|id| {
                            self.supports
                                .get(*id)
                                .and_then(|s| self.joints.get(s.joint))
                                .map_or(false, |j| {
                                    j.x > lo + POSITION_TOLERANCE && j.x < hi - POSITION_TOLERANCE
                                })
                        })
                }
            },
        }
    }

    /// Governing live load response of a live load model
    pub fn live_load_response(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        model: &str,
        opt: Optimization,
        query: LiveLoadQuery,
    ) -> FemResult<LiveLoadResult> {
        let llm = self.live_load_model(model)?;
        if let Some(v) = query.vehicle {
            if v >= llm.vehicles.len() {
                return Err(FemError::InvalidInput(format!(
                    "live load model '{model}' has no vehicle {v}"
                )));
            }
        }

        let il = self.influence_line(stage, quantity)?;

        let mut best: Option<LiveLoadResult> = None;
        for (index, vehicle) in llm.vehicles.iter().enumerate() {
            if query.vehicle.map_or(false, |v| v != index) {
                continue;
            }
            if !self.vehicle_applies(vehicle, stage, quantity, opt) {
                continue;
            }

            let placement = influence::place_vehicle(
                &il,
                vehicle,
                index,
                llm,
                opt,
                query.include_impact,
                self.options.variable_spacing_steps,
            );

            let mut value = placement.value;
            if query.include_distribution {
                value *= self.distribution_factor(quantity, llm, value)?;
            }

            if best.as_ref().map_or(true, |b| opt.improves(value, b.value)) {
                best = Some(LiveLoadResult {
                    value,
                    configuration: Some(placement.configuration),
                });
            }
        }

        Ok(best.unwrap_or_else(LiveLoadResult::none))
    }

    /// Live load section forces, each component and face enveloped
    /// independently
    pub fn live_load_section_forces(
        &self,
        stage: StageIndex,
        poi: PoiId,
        model: &str,
        opt: Optimization,
        query: LiveLoadQuery,
    ) -> FemResult<SectionForces> {
        let mut faces = [[0.0; 3]; 2];
        for (f, face) in [Face::Left, Face::Right].into_iter().enumerate() {
            for (k, effect) in [ForceEffect::Fx, ForceEffect::Fy, ForceEffect::Mz]
                .into_iter()
                .enumerate()
            {
                let q = ResponseQuantity::poi(poi, effect, face);
                faces[f][k] = self.live_load_response(stage, &q, model, opt, query)?.value;
            }
        }
        Ok(SectionForces::from_faces(faces[0], faces[1]))
    }

    /// Response to a fixed vehicle placement, for results concurrent with a
    /// governing live load result
    pub fn configuration_response(
        &self,
        stage: StageIndex,
        quantity: &ResponseQuantity,
        model: &str,
        configuration: &AxleConfiguration,
        query: LiveLoadQuery,
    ) -> FemResult<f64> {
        let llm = self.live_load_model(model)?;
        let vehicle = llm.vehicles.get(configuration.vehicle).ok_or_else(|| {
            FemError::InvalidInput(format!(
                "live load model '{model}' has no vehicle {}",
                configuration.vehicle
            ))
        })?;

        let il = self.influence_line(stage, quantity)?;
        let mut value =
            influence::evaluate_configuration(&il, vehicle, llm, configuration, query.include_impact);
        if query.include_distribution {
            value *= self.distribution_factor(quantity, llm, value)?;
        }
        Ok(value)
    }

    // ========================
    // Other Results
    // ========================

    /// Locations where the moment due to a load group changes sign
    pub fn contraflexure_points(
        &self,
        stage: StageIndex,
        group: &str,
        results_type: ResultsType,
    ) -> FemResult<Vec<f64>> {
        let system = &self.stage_solution(stage)?.system;
        let n = (self.options.influence_subdivisions * 2).max(4);

        let mut spans: Vec<(f64, f64)> = system
            .members
            .iter()
            .flatten()
            .map(|s| (s.x_i, s.x_j()))
            .collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));

        let moment = |x: f64, at_start: bool| -> FemResult<f64> {
            let forces = self.section_forces_at(stage, x, group, results_type)?;
            Ok(if at_start { -forces.mz.right } else { forces.mz.left })
        };

        let mut samples = Vec::new();
        for (a, b) in spans {
            for k in 0..=n {
                let x = a + (b - a) * k as f64 / n as f64;
                samples.push((x, moment(x, k == 0)?));
            }
        }

        let largest = samples.iter().fold(0.0_f64, |m, (_, v)| m.max(v.abs()));
        let significant: Vec<(f64, f64)> = samples
            .into_iter()
            .filter(|(_, v)| v.abs() > largest * 1.0e-6)
            .collect();

        let mut points: Vec<f64> = Vec::new();
        for w in significant.windows(2) {
            let ((mut lo, mut m_lo), (mut hi, _)) = (w[0], w[1]);
            if m_lo.signum() == w[1].1.signum() {
                continue;
            }
            for _ in 0..60 {
                let mid = (lo + hi) / 2.0;
                let m_mid = moment(mid, false)?;
                if m_mid.signum() == m_lo.signum() {
                    lo = mid;
                    m_lo = m_mid;
                } else {
                    hi = mid;
                }
                if hi - lo <= POSITION_TOLERANCE {
                    break;
                }
            }
            let x = (lo + hi) / 2.0;
            if points.last().map_or(true, |p| (x - p).abs() > POSITION_TOLERANCE) {
                points.push(x);
            }
        }

        Ok(points)
    }

    /// Response at `target` to a unit load at `at`
    pub fn unit_load_response(
        &self,
        stage: StageIndex,
        at: PoiId,
        unit: UnitLoad,
        target: PoiId,
    ) -> FemResult<(SectionForces, PoiDisplacement)> {
        let system = &self.stage_solution(stage)?.system;
        let x_at = self.poi_location(at)?;
        let x_target = self.poi_location(target)?;
        let load = match unit {
            UnitLoad::Force => UNIT_DOWN,
            UnitLoad::Moment => [0.0, 0.0, 1.0],
        };
        let response = system.unit_response(x_at, load).ok_or_else(|| {
            FemError::InvalidInput(format!(
                "x = {x_at} is not on the structure in stage {stage}"
            ))
        })?;
        Ok((
            system.section(&response, x_target),
            system.displacement(&response, x_target),
        ))
    }

    /// Extent of the structure active in a stage
    pub fn active_extent(&self, stage: StageIndex) -> FemResult<Option<(f64, f64)>> {
        Ok(self.stage_solution(stage)?.system.extent())
    }
}

fn displacement_component(d: &PoiDisplacement, effect: ForceEffect) -> f64 {
    match effect {
        ForceEffect::Rz => d.rz,
        _ => d.dy,
    }
}

fn reaction_component(r: &Reaction, effect: ForceEffect) -> f64 {
    match effect {
        ForceEffect::Fx => r.fx,
        ForceEffect::Mz => r.mz,
        _ => r.fy,
    }
}

fn poi_value(
    system: &StageSystem,
    response: &LoadResponse,
    x: f64,
    effect: ForceEffect,
    face: Face,
) -> f64 {
    if effect.is_force() {
        system.section(response, x).effect(effect).face(face)
    } else {
        displacement_component(&system.displacement(response, x), effect)
    }
}

/// Influence ordinate with the unit load on the section itself. A load on
/// the joint lies right of the left face and left of the right face.
fn point_at_section(
    system: &StageSystem,
    response: &LoadResponse,
    x: f64,
    effect: ForceEffect,
    face: Face,
) -> InfluencePoint {
    let k = match effect {
        ForceEffect::Fx => 0,
        ForceEffect::Fy => 1,
        ForceEffect::Mz => 2,
        _ => {
            let value = displacement_component(&system.displacement(response, x), effect);
            return InfluencePoint::continuous(x, value);
        }
    };
    // Contribution of the unit load to the left body
    let jump = [-UNIT_DOWN[0], -UNIT_DOWN[1], 0.0][k];

    match face {
        Face::Left => match system.member_ending_at(x) {
            Some(m) => {
                let excluded = system.left_body(response, m, x, false)[k];
                InfluencePoint {
                    x,
                    left: excluded + jump,
                    right: excluded,
                }
            }
            None => InfluencePoint::continuous(x, 0.0),
        },
        Face::Right => match system.member_starting_at(x) {
            Some(m) => {
                let included = -system.left_body(response, m, x, false)[k];
                InfluencePoint {
                    x,
                    left: included,
                    right: included + jump,
                }
            }
            None => InfluencePoint::continuous(x, 0.0),
        },
    }
}
