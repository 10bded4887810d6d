//! Stage stiffness, factorization and load responses
//!
//! A `StageSystem` holds everything that depends only on the structure of a
//! stage: active members with their condensed stiffness, restrained degrees
//! of freedom and the factorized stiffness matrix. Any number of load vectors
//! are then solved against it, each producing a `LoadResponse`.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;
use nalgebra::{DVector, Dyn, LU};

use crate::analysis::StageIndex;
use crate::elements::{JointId, MemberId, MemberStiffness};
use crate::error::{FemError, FemResult};
use crate::loads::{MemberLoad, PointLoad};
use crate::math::{self, Mat6, SparseCholeskySolver, SparseMatrixBuilder, Vec6};
use crate::model::StagedModel;
use crate::results::{PoiDisplacement, Reaction, SectionForces};

/// Locations closer than this are the same point
pub(crate) const POSITION_TOLERANCE: f64 = 1.0e-6;

/// Degrees of freedom per joint: u, v, θ
pub(crate) const DOF: usize = 3;

/// A unit downward force
pub(crate) const UNIT_DOWN: [f64; 3] = [0.0, -1.0, 0.0];

#[derive(Debug, Clone)]
enum Factorization {
    Skyline(SparseCholeskySolver),
    Dense(LU<f64, Dyn, Dyn>),
}

impl Factorization {
    fn solve(&self, b: &DVector<f64>) -> DVector<f64> {
        match self {
            Self::Skyline(solver) => solver.solve(b),
            Self::Dense(lu) => lu.solve(b).unwrap_or_else(|| DVector::zeros(b.len())),
        }
    }
}

/// An active member in a stage
#[derive(Debug, Clone)]
pub(crate) struct MemberState {
    pub i_joint: JointId,
    pub j_joint: JointId,
    pub x_i: f64,
    pub length: f64,
    pub stiffness: MemberStiffness,
    pub releases: [bool; 6],
    k: Mat6,
    k_condensed: Mat6,
}

impl MemberState {
    fn dofs(&self) -> [usize; 6] {
        let i = self.i_joint * DOF;
        let j = self.j_joint * DOF;
        [i, i + 1, i + 2, j, j + 1, j + 2]
    }

    pub(crate) fn x_j(&self) -> f64 {
        self.x_i + self.length
    }
}

/// Structure of one stage with its factorized stiffness
#[derive(Debug, Clone)]
pub(crate) struct StageSystem {
    pub stage: StageIndex,
    pub members: Vec<Option<MemberState>>,
    pub joint_x: Vec<f64>,
    restrained: Vec<bool>,
    equations: Vec<Option<usize>>,
    n_free: usize,
    factorization: Option<Factorization>,
}

impl StageSystem {
    /// Assemble and factorize the stiffness of `stage`
    pub(crate) fn build(model: &StagedModel, stage: StageIndex) -> FemResult<Self> {
        let joint_x: Vec<f64> = model.joints.iter().map(|j| j.x).collect();
        let n_dofs = joint_x.len() * DOF;

        let mut members = Vec::with_capacity(model.members.len());
        for (id, member) in model.members.iter().enumerate() {
            if !member.is_active(stage) {
                members.push(None);
                continue;
            }
            let stiffness = member.stiffness_at(stage).ok_or_else(|| {
                FemError::InvalidInput(format!("member {id} has no stiffness in stage {stage}"))
            })?;
            let releases = member.releases.as_array(stage);
            let k = math::member_local_stiffness(stiffness.ea, stiffness.ei, member.length());
            let k_condensed = math::apply_releases(&k, &releases);
            members.push(Some(MemberState {
                i_joint: member.i_joint,
                j_joint: member.j_joint,
                x_i: joint_x[member.i_joint],
                length: member.length(),
                stiffness,
                releases,
                k,
                k_condensed,
            }));
        }

        let mut builder = SparseMatrixBuilder::new(n_dofs);
        for state in members.iter().flatten() {
            let dofs = state.dofs();
            for a in 0..6 {
                for b in 0..6 {
                    let value = state.k_condensed[(a, b)];
                    if value != 0.0 {
                        builder.add(dofs[a], dofs[b], value);
                    }
                }
            }
        }
        let k_global = builder.to_csr();

        let mut diagonal = vec![0.0; n_dofs];
        for (row, col, value) in k_global.triplet_iter() {
            if row == col {
                diagonal[row] += *value;
            }
        }

        let mut restrained = vec![false; n_dofs];
        for support in model.supports.iter().filter(|s| s.is_active(stage)) {
            for (k, fixed) in support.restraints().iter().enumerate() {
                if *fixed {
                    restrained[support.joint * DOF + k] = true;
                }
            }
        }

        if model.options.auto_axial_restraint {
            restrain_axially(model, stage, &members, &joint_x, &mut restrained);
        }

        let max_diagonal = diagonal.iter().fold(0.0_f64, |m, d| m.max(d.abs()));
        let threshold = model.options.tolerance * max_diagonal;
        for (dof, value) in diagonal.iter().enumerate() {
            if !restrained[dof] && value.abs() <= threshold {
                restrained[dof] = true;
            }
        }

        // Number equations along the line to keep the band narrow
        let mut order: Vec<JointId> = (0..joint_x.len()).collect();
        order.sort_by(|a, b| joint_x[*a].total_cmp(&joint_x[*b]));

        let mut equations = vec![None; n_dofs];
        let mut n_free = 0;
        for joint in order {
            for k in 0..DOF {
                let dof = joint * DOF + k;
                if !restrained[dof] {
                    equations[dof] = Some(n_free);
                    n_free += 1;
                }
            }
        }

        let mut free = SparseMatrixBuilder::new(n_free);
        for (row, col, value) in k_global.triplet_iter() {
            if let (Some(r), Some(c)) = (equations[row], equations[col]) {
                free.add(r, c, *value);
            }
        }

        let factorization = if n_free == 0 {
            None
        } else {
            Some(factorize(&free, model.options.sparse, stage)?)
        };

        debug!(
            "stage {}: {} active members, {} free equations",
            stage,
            members.iter().flatten().count(),
            n_free
        );

        Ok(Self {
            stage,
            members,
            joint_x,
            restrained,
            equations,
            n_free,
            factorization,
        })
    }

    /// Solve for joint loads and member loads (indexed by member)
    pub(crate) fn solve(
        &self,
        joint_loads: &[(JointId, [f64; 3])],
        member_loads: Vec<Vec<MemberLoad>>,
    ) -> LoadResponse {
        let n_joints = self.joint_x.len();
        let n_dofs = n_joints * DOF;

        let mut applied = DVector::zeros(n_dofs);
        for (joint, load) in joint_loads {
            for k in 0..DOF {
                applied[joint * DOF + k] += load[k];
            }
        }

        let mut p = applied.clone();
        let mut fixed_end = vec![Vec6::zeros(); self.members.len()];
        for (id, loads) in member_loads.iter().enumerate() {
            if loads.is_empty() {
                continue;
            }
            let Some(state) = &self.members[id] else {
                continue;
            };
            let refs: Vec<&MemberLoad> = loads.iter().collect();
            let fer = math::fixed_end_forces(
                &refs,
                state.length,
                state.stiffness.ea,
                state.stiffness.ei,
            );
            let fer = math::apply_fer_releases(&fer, &state.k, &state.releases);

            // FER are reactions, so they enter the load vector negated
            for (a, dof) in state.dofs().iter().enumerate() {
                p[*dof] -= fer[a];
            }
            fixed_end[id] = fer;
        }

        let mut displacements = DVector::zeros(n_dofs);
        if let Some(factorization) = &self.factorization {
            let mut b = DVector::zeros(self.n_free);
            for (dof, eq) in self.equations.iter().enumerate() {
                if let Some(eq) = eq {
                    b[*eq] = p[dof];
                }
            }
            let x = factorization.solve(&b);
            for (dof, eq) in self.equations.iter().enumerate() {
                if let Some(eq) = eq {
                    displacements[dof] = x[*eq];
                }
            }
        }

        let member_forces: Vec<Vec6> = self
            .members
            .iter()
            .zip(fixed_end.iter())
            .map(|(state, fer)| match state {
                Some(state) => {
                    let dofs = state.dofs();
                    let d = Vec6::from_fn(|a, _| displacements[dofs[a]]);
                    state.k_condensed * d + fer
                }
                None => Vec6::zeros(),
            })
            .collect();

        let mut joint_reactions = vec![[0.0; 3]; n_joints];
        for (state, f) in self.members.iter().zip(member_forces.iter()) {
            if let Some(state) = state {
                for k in 0..DOF {
                    joint_reactions[state.i_joint][k] += f[k];
                    joint_reactions[state.j_joint][k] += f[k + DOF];
                }
            }
        }
        for (joint, reaction) in joint_reactions.iter_mut().enumerate() {
            for k in 0..DOF {
                let dof = joint * DOF + k;
                reaction[k] = if self.restrained[dof] {
                    reaction[k] - applied[dof]
                } else {
                    0.0
                };
            }
        }

        LoadResponse {
            displacements,
            member_forces,
            member_loads,
            joint_reactions,
        }
    }

    /// Response to a concentrated load at `x`, or `None` if `x` is off the structure
    pub(crate) fn unit_response(&self, x: f64, load: [f64; 3]) -> Option<LoadResponse> {
        if let Some(joint) = self.joint_at(x) {
            return Some(self.solve(&[(joint, load)], Vec::new()));
        }

        let member = self.members.iter().position(|m| {
            m.as_ref().map_or(false, |s| {
                x > s.x_i + POSITION_TOLERANCE && x < s.x_j() - POSITION_TOLERANCE
            })
        })?;
        let state = self.members[member].as_ref()?;

        let mut loads = vec![Vec::new(); self.members.len()];
        loads[member].push(MemberLoad::Point(PointLoad::new(
            x - state.x_i,
            load[0],
            load[1],
            load[2],
            self.stage,
            "",
        )));
        Some(self.solve(&[], loads))
    }

    /// Unit load responses at joints and member subdivisions
    pub(crate) fn influence_responses(&self, subdivisions: usize) -> Vec<(f64, LoadResponse)> {
        self.influence_locations(subdivisions)
            .into_iter()
            .filter_map(|x| self.unit_response(x, UNIT_DOWN).map(|r| (x, r)))
            .collect()
    }

    fn influence_locations(&self, subdivisions: usize) -> Vec<f64> {
        let n = subdivisions.max(1);
        let mut locations: Vec<f64> = self
            .members
            .iter()
            .flatten()
            .flat_map(|s| (0..=n).map(move |k| s.x_i + s.length * k as f64 / n as f64))
            .collect();
        locations.sort_by(|a, b| a.total_cmp(b));
        locations.dedup_by(|a, b| (*a - *b).abs() <= POSITION_TOLERANCE);
        locations
    }

    /// Active member whose span (x_i, x_j] contains `x`
    pub(crate) fn member_ending_at(&self, x: f64) -> Option<MemberId> {
        self.members.iter().position(|m| {
            m.as_ref().map_or(false, |s| {
                x > s.x_i + POSITION_TOLERANCE && x <= s.x_j() + POSITION_TOLERANCE
            })
        })
    }

    /// Active member whose span [x_i, x_j) contains `x`
    pub(crate) fn member_starting_at(&self, x: f64) -> Option<MemberId> {
        self.members.iter().position(|m| {
            m.as_ref().map_or(false, |s| {
                x >= s.x_i - POSITION_TOLERANCE && x < s.x_j() - POSITION_TOLERANCE
            })
        })
    }

    /// Joint of an active member located at `x`
    pub(crate) fn joint_at(&self, x: f64) -> Option<JointId> {
        self.members.iter().flatten().find_map(|s| {
            if (s.x_i - x).abs() <= POSITION_TOLERANCE {
                Some(s.i_joint)
            } else if (s.x_j() - x).abs() <= POSITION_TOLERANCE {
                Some(s.j_joint)
            } else {
                None
            }
        })
    }

    /// Span of the active structure
    pub(crate) fn extent(&self) -> Option<(f64, f64)> {
        self.members.iter().flatten().fold(None, |acc, s| match acc {
            None => Some((s.x_i, s.x_j())),
            Some((a, b)) => Some((a.min(s.x_i), b.max(s.x_j()))),
        })
    }

    /// Forces on the body left of `x`, computed from `member`
    pub(crate) fn left_body(
        &self,
        response: &LoadResponse,
        member: MemberId,
        x: f64,
        inclusive: bool,
    ) -> [f64; 3] {
        match &self.members[member] {
            Some(state) => {
                let local = (x - state.x_i).clamp(0.0, state.length);
                response.left_body(member, local, inclusive)
            }
            None => [0.0; 3],
        }
    }

    /// Two-sided section forces at `x`
    pub(crate) fn section(&self, response: &LoadResponse, x: f64) -> SectionForces {
        let left = self
            .member_ending_at(x)
            .map(|m| self.left_body(response, m, x, false))
            .unwrap_or([0.0; 3]);
        let right = self
            .member_starting_at(x)
            .map(|m| {
                let body = self.left_body(response, m, x, true);
                [-body[0], -body[1], -body[2]]
            })
            .unwrap_or([0.0; 3]);
        SectionForces::from_faces(left, right)
    }

    /// Deflection and rotation at `x`
    pub(crate) fn displacement(&self, response: &LoadResponse, x: f64) -> PoiDisplacement {
        let member = self
            .member_ending_at(x)
            .or_else(|| self.member_starting_at(x));
        match member.and_then(|m| self.members[m].as_ref().map(|s| (m, s))) {
            Some((id, state)) => {
                let local = (x - state.x_i).clamp(0.0, state.length);
                response.deflection(id, state, local)
            }
            None => PoiDisplacement::default(),
        }
    }
}

/// Response of a stage to one load vector
#[derive(Debug, Clone)]
pub(crate) struct LoadResponse {
    pub displacements: DVector<f64>,
    pub member_forces: Vec<Vec6>,
    pub member_loads: Vec<Vec<MemberLoad>>,
    pub joint_reactions: Vec<[f64; 3]>,
}

impl LoadResponse {
    fn loads(&self, member: MemberId) -> Vec<&MemberLoad> {
        self.member_loads
            .get(member)
            .map(|loads| loads.iter().collect())
            .unwrap_or_default()
    }

    /// Forces on [0, x) of a member (tension, -shear, sagging moment)
    pub(crate) fn left_body(&self, member: MemberId, x: f64, inclusive: bool) -> [f64; 3] {
        let loads = self.loads(member);
        self.body_forces(member, &loads, x, inclusive)
    }

    fn body_forces(
        &self,
        member: MemberId,
        loads: &[&MemberLoad],
        x: f64,
        inclusive: bool,
    ) -> [f64; 3] {
        let f = &self.member_forces[member];
        let effects = math::load_effects(loads, x, inclusive);
        [
            -f[0] - effects.axial,
            -f[1] - effects.shear,
            -f[2] + x * f[1] + effects.moment,
        ]
    }

    fn deflection(&self, member: MemberId, state: &MemberState, x: f64) -> PoiDisplacement {
        let l = state.length;
        let ei = state.stiffness.ei;
        let loads = self.loads(member);
        let breaks = math::breakpoints(&loads, l);

        let curvature = |xi: f64| {
            self.body_forces(member, &loads, xi, false)[2] / ei
                + math::imposed_curvature(&loads, xi)
        };

        let v_i = self.displacements[state.i_joint * DOF + 1];
        let v_j = self.displacements[state.j_joint * DOF + 1];

        let theta_i = (v_j - v_i - math::integrate(0.0, l, &breaks, |xi| (l - xi) * curvature(xi))) / l;
        let dy = v_i + theta_i * x + math::integrate(0.0, x, &breaks, |xi| (x - xi) * curvature(xi));
        let rz = theta_i + math::integrate(0.0, x, &breaks, &curvature);

        PoiDisplacement { dy, rz }
    }
}

/// Results of one stage: the structure and the response of each load group
#[derive(Debug, Clone)]
pub(crate) struct StageSolution {
    pub system: StageSystem,
    pub groups: HashMap<String, LoadResponse>,
    /// Incremental reactions per load group, indexed by support
    pub reactions: HashMap<String, Vec<Reaction>>,
    /// Unit load responses prepared for live load analysis
    pub influence: Option<Vec<(f64, LoadResponse)>>,
}

/// Results of every stage
#[derive(Debug, Clone, Default)]
pub(crate) struct Solution {
    pub stages: Vec<StageSolution>,
}

fn factorize(matrix: &SparseMatrixBuilder, sparse: bool, stage: StageIndex) -> FemResult<Factorization> {
    if sparse {
        let mut solver = SparseCholeskySolver::new(&matrix.to_csr());
        return match solver.factorize() {
            Ok(()) => Ok(Factorization::Skyline(solver)),
            Err(row) => Err(FemError::Unstable(format!(
                "stage {stage}: stiffness is not positive definite at equation {row}"
            ))),
        };
    }

    let lu = matrix.to_dense().lu();
    let pivots = lu.u().diagonal();
    let largest = pivots.iter().fold(0.0_f64, |m, p| m.max(p.abs()));
    if pivots.iter().any(|p| p.abs() <= largest * 1.0e-12) {
        return Err(FemError::Unstable(format!(
            "stage {stage}: stiffness matrix is singular"
        )));
    }
    Ok(Factorization::Dense(lu))
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Restrain u at one joint of every axially connected piece that has no
/// axial support. Supported joints are preferred, then the lowest x.
fn restrain_axially(
    model: &StagedModel,
    stage: StageIndex,
    members: &[Option<MemberState>],
    joint_x: &[f64],
    restrained: &mut [bool],
) {
    let n = joint_x.len();
    let mut parent: Vec<usize> = (0..n).collect();
    let mut connected = vec![false; n];

    for state in members.iter().flatten() {
        connected[state.i_joint] = true;
        connected[state.j_joint] = true;
        if !state.releases[0] && !state.releases[3] {
            let a = find(&mut parent, state.i_joint);
            let b = find(&mut parent, state.j_joint);
            parent[a] = b;
        }
    }

    let mut anchored = HashSet::new();
    for joint in 0..n {
        if restrained[joint * DOF] {
            anchored.insert(find(&mut parent, joint));
        }
    }

    let supported: HashSet<JointId> = model
        .supports
        .iter()
        .filter(|s| s.is_active(stage))
        .map(|s| s.joint)
        .collect();

    let mut choice: BTreeMap<usize, JointId> = BTreeMap::new();
    for joint in (0..n).filter(|j| connected[*j]) {
        let root = find(&mut parent, joint);
        if anchored.contains(&root) {
            continue;
        }
        let replace = match choice.get(&root) {
            None => true,
            Some(&current) => {
                let (a, b) = (supported.contains(&joint), supported.contains(&current));
                (a && !b) || (a == b && joint_x[joint] < joint_x[current])
            }
        };
        if replace {
            choice.insert(root, joint);
        }
    }

    for joint in choice.into_values() {
        restrained[joint * DOF] = true;
        debug!(
            "stage {}: no axial restraint, u restrained at joint {} (x = {:.3})",
            stage, joint, joint_x[joint]
        );
    }
}
