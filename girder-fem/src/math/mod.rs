//! Mathematical utilities for line-beam analysis

pub mod sparse;

use nalgebra::{DMatrix, DVector, SMatrix, SVector};

use crate::loads::{LoadDirection, MemberLoad};

pub use sparse::{SparseCholeskySolver, SparseMatrixBuilder};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;

/// 6x6 matrix for member stiffness
pub type Mat6 = SMatrix<f64, 6, 6>;
/// 6-element vector for member end forces/displacements [FX_i, FY_i, MZ_i, FX_j, FY_j, MZ_j]
pub type Vec6 = SVector<f64, 6>;

/// Compute the local stiffness matrix for a line-beam element
///
/// # Arguments
/// * `ea` - Axial rigidity
/// * `ei` - Flexural rigidity
/// * `length` - Member length
pub fn member_local_stiffness(ea: f64, ei: f64, length: f64) -> Mat6 {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let ea_l = ea / l;
    let ei_l3 = ei / l3;
    let ei_l2 = ei / l2;
    let ei_l = ei / l;

    #[rustfmt::skip]
    let data = [
        // Row 0: axial at i
        ea_l,   0.0,           0.0,          -ea_l,  0.0,           0.0,
        // Row 1: shear at i
        0.0,    12.0*ei_l3,    6.0*ei_l2,    0.0,    -12.0*ei_l3,   6.0*ei_l2,
        // Row 2: moment at i
        0.0,    6.0*ei_l2,     4.0*ei_l,     0.0,    -6.0*ei_l2,    2.0*ei_l,
        // Row 3: axial at j
        -ea_l,  0.0,           0.0,          ea_l,   0.0,           0.0,
        // Row 4: shear at j
        0.0,    -12.0*ei_l3,   -6.0*ei_l2,   0.0,    12.0*ei_l3,    -6.0*ei_l2,
        // Row 5: moment at j
        0.0,    6.0*ei_l2,     2.0*ei_l,     0.0,    -6.0*ei_l2,    4.0*ei_l,
    ];

    Mat6::from_row_slice(&data)
}

fn partition(releases: &[bool; 6]) -> (std::vec::Vec<usize>, std::vec::Vec<usize>) {
    let unreleased = (0..6).filter(|&i| !releases[i]).collect();
    let released = (0..6).filter(|&i| releases[i]).collect();
    (unreleased, released)
}

/// Apply static condensation for released DOFs
///
/// # Arguments
/// * `k` - Full stiffness matrix
/// * `releases` - Boolean array indicating which DOFs are released
pub fn apply_releases(k: &Mat6, releases: &[bool; 6]) -> Mat6 {
    let (unreleased, released) = partition(releases);

    if released.is_empty() {
        return *k;
    }

    let n1 = unreleased.len();
    let n2 = released.len();

    let mut k11 = DMatrix::zeros(n1, n1);
    let mut k12 = DMatrix::zeros(n1, n2);
    let mut k21 = DMatrix::zeros(n2, n1);
    let mut k22 = DMatrix::zeros(n2, n2);

    for (i, &ui) in unreleased.iter().enumerate() {
        for (j, &uj) in unreleased.iter().enumerate() {
            k11[(i, j)] = k[(ui, uj)];
        }
        for (j, &rj) in released.iter().enumerate() {
            k12[(i, j)] = k[(ui, rj)];
        }
    }

    for (i, &ri) in released.iter().enumerate() {
        for (j, &uj) in unreleased.iter().enumerate() {
            k21[(i, j)] = k[(ri, uj)];
        }
        for (j, &rj) in released.iter().enumerate() {
            k22[(i, j)] = k[(ri, rj)];
        }
    }

    // Static condensation: k_cond = k11 - k12 * inv(k22) * k21
    let k22_inv = match k22.try_inverse() {
        Some(inv) => inv,
        None => return *k,
    };

    let k_condensed = &k11 - &k12 * &k22_inv * &k21;

    // Expand back to 6x6 with zeros for released DOFs
    let mut k_result = Mat6::zeros();
    for (i, &ui) in unreleased.iter().enumerate() {
        for (j, &uj) in unreleased.iter().enumerate() {
            k_result[(ui, uj)] = k_condensed[(i, j)];
        }
    }

    k_result
}

/// Apply static condensation to the fixed end force vector for released DOFs:
/// fer_condensed = fer1 - k12 * inv(k22) * fer2
pub fn apply_fer_releases(fer: &Vec6, k: &Mat6, releases: &[bool; 6]) -> Vec6 {
    let (unreleased, released) = partition(releases);

    if released.is_empty() {
        return *fer;
    }

    let n1 = unreleased.len();
    let n2 = released.len();

    let mut k12 = DMatrix::zeros(n1, n2);
    let mut k22 = DMatrix::zeros(n2, n2);

    for (i, &ui) in unreleased.iter().enumerate() {
        for (j, &rj) in released.iter().enumerate() {
            k12[(i, j)] = k[(ui, rj)];
        }
    }
    for (i, &ri) in released.iter().enumerate() {
        for (j, &rj) in released.iter().enumerate() {
            k22[(i, j)] = k[(ri, rj)];
        }
    }

    let fer1 = DVector::from_iterator(n1, unreleased.iter().map(|&i| fer[i]));
    let fer2 = DVector::from_iterator(n2, released.iter().map(|&i| fer[i]));

    let k22_inv = match k22.try_inverse() {
        Some(inv) => inv,
        None => return *fer,
    };

    let fer_condensed = &fer1 - &k12 * &k22_inv * &fer2;

    // Released DOFs remain zero
    let mut fer_result = Vec6::zeros();
    for (i, &ui) in unreleased.iter().enumerate() {
        fer_result[ui] = fer_condensed[i];
    }

    fer_result
}

/// Resultants of the member loads acting left of a section
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadEffects {
    /// Sum of axial load
    pub axial: f64,
    /// Sum of transverse load
    pub shear: f64,
    /// ∑(x - a)·P + ∫(x - ξ)·w dξ - ∑M about the section
    pub moment: f64,
}

/// Resultants of the loads left of `x`. Concentrated loads located exactly
/// at `x` are included when `inclusive` is set.
pub fn load_effects(loads: &[&MemberLoad], x: f64, inclusive: bool) -> LoadEffects {
    let mut effects = LoadEffects::default();

    for load in loads {
        match load {
            MemberLoad::Point(p) => {
                let applies = if inclusive { p.x <= x } else { p.x < x };
                if applies {
                    effects.axial += p.fx;
                    effects.shear += p.fy;
                    effects.moment += (x - p.x) * p.fy - p.mz;
                }
            }
            MemberLoad::Distributed(d) => match d.direction {
                LoadDirection::Fx => effects.axial += d.resultant_to(x),
                LoadDirection::Fy => {
                    effects.shear += d.resultant_to(x);
                    effects.moment += d.moment_to(x);
                }
            },
            MemberLoad::Strain(_) => {}
        }
    }

    effects
}

/// Imposed curvature at `x`
pub fn imposed_curvature(loads: &[&MemberLoad], x: f64) -> f64 {
    loads
        .iter()
        .map(|load| match load {
            MemberLoad::Strain(s) => s.curvature_at(x),
            _ => 0.0,
        })
        .sum()
}

/// Locations inside (0, length) where load effects change character
pub fn breakpoints(loads: &[&MemberLoad], length: f64) -> std::vec::Vec<f64> {
    let mut points: std::vec::Vec<f64> = loads
        .iter()
        .flat_map(|l| l.breakpoints())
        .filter(|&x| x > 0.0 && x < length)
        .collect();
    points.sort_by(|a, b| a.total_cmp(b));
    points.dedup_by(|a, b| (*a - *b).abs() < 1e-12);
    points
}

const GAUSS_POINTS: [f64; 3] = [-0.774_596_669_241_483_4, 0.0, 0.774_596_669_241_483_4];
const GAUSS_WEIGHTS: [f64; 3] = [5.0 / 9.0, 8.0 / 9.0, 5.0 / 9.0];

/// Integrate `f` over [a, b], splitting at `breaks`.
///
/// Three-point Gauss-Legendre is exact for polynomials up to degree five on
/// each piece, which covers every integrand produced by linear member loads.
pub fn integrate<F: Fn(f64) -> f64>(a: f64, b: f64, breaks: &[f64], f: F) -> f64 {
    if b <= a {
        return 0.0;
    }

    let mut edges = std::vec::Vec::with_capacity(breaks.len() + 2);
    edges.push(a);
    edges.extend(breaks.iter().copied().filter(|&x| x > a && x < b));
    edges.push(b);

    edges
        .windows(2)
        .map(|w| {
            let half = (w[1] - w[0]) / 2.0;
            let mid = (w[1] + w[0]) / 2.0;
            GAUSS_POINTS
                .iter()
                .zip(GAUSS_WEIGHTS.iter())
                .map(|(p, wt)| wt * f(mid + half * p))
                .sum::<f64>()
                * half
        })
        .sum()
}

/// Compute fixed end forces for a set of member loads
///
/// The end forces are those exerted by the joints on a member whose ends are
/// fully fixed. Transverse terms follow from the compatibility conditions
/// ∫κ dx = 0 and ∫(L - x)κ dx = 0 with κ = M/EI + κ0.
pub fn fixed_end_forces(loads: &[&MemberLoad], length: f64, ea: f64, ei: f64) -> Vec6 {
    let l = length;
    let breaks = breakpoints(loads, l);

    let load_moment = |x: f64| load_effects(loads, x, false).moment;

    let mut j1 = integrate(0.0, l, &breaks, load_moment);
    let mut j2 = integrate(0.0, l, &breaks, |x| (l - x) * load_moment(x));

    let mut axial_i = 0.0;
    let mut axial_j = 0.0;
    let mut elongation = 0.0;

    for load in loads {
        match load {
            MemberLoad::Point(p) => {
                axial_i -= p.fx * (l - p.x) / l;
                axial_j -= p.fx * p.x / l;
            }
            MemberLoad::Distributed(d) if d.direction == LoadDirection::Fx => {
                axial_i -= integrate(d.x1, d.x2, &[], |x| d.intensity(x) * (l - x) / l);
                axial_j -= integrate(d.x1, d.x2, &[], |x| d.intensity(x) * x / l);
            }
            MemberLoad::Distributed(_) => {}
            MemberLoad::Strain(s) => {
                let (a, b) = (s.x1.max(0.0), s.x2.min(l));
                if b > a {
                    j1 += ei * s.curvature * (b - a);
                    j2 += ei * s.curvature * ((l - a).powi(2) - (l - b).powi(2)) / 2.0;
                    elongation += s.axial_strain * (b - a);
                }
            }
        }
    }

    let fy_i = (12.0 * j2 - 6.0 * l * j1) / (l * l * l);
    let mz_i = (6.0 * j2 - 2.0 * l * j1) / (l * l);

    let total = load_effects(loads, l, true);
    let fy_j = -fy_i - total.shear;
    let mz_j = -mz_i + l * fy_i + total.moment;

    let restraint = ea * elongation / l;

    Vec6::new(
        axial_i + restraint,
        fy_i,
        mz_i,
        axial_j - restraint,
        fy_j,
        mz_j,
    )
}

/// Solve a linear system using LU decomposition
pub fn solve_linear_system(a: &Mat, b: &Vec) -> Option<Vec> {
    a.clone().lu().solve(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::{DistributedLoad, PointLoad, StrainLoad};
    use approx::assert_relative_eq;

    #[test]
    fn test_local_stiffness_symmetry() {
        let k = member_local_stiffness(1.0e9, 2.0e8, 10.0);
        for i in 0..6 {
            for j in 0..6 {
                assert_relative_eq!(k[(i, j)], k[(j, i)], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_uniform_load_fixed_end_forces() {
        let load = MemberLoad::Distributed(DistributedLoad::transverse(-10.0, -10.0, 0.0, 6.0, 0, "DC"));
        let fer = fixed_end_forces(&[&load], 6.0, 1.0, 1.0);

        assert_relative_eq!(fer[1], 30.0, epsilon = 1e-9);
        assert_relative_eq!(fer[2], 30.0, epsilon = 1e-9);
        assert_relative_eq!(fer[4], 30.0, epsilon = 1e-9);
        assert_relative_eq!(fer[5], -30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_point_load_fixed_end_forces() {
        // P = -12 at a = 2 on L = 6: classical P*b^2*(3a+b)/L^3 and P*a*b^2/L^2
        let load = MemberLoad::Point(PointLoad::fy(2.0, -12.0, 0, "DC"));
        let fer = fixed_end_forces(&[&load], 6.0, 1.0, 1.0);

        assert_relative_eq!(fer[1], 12.0 * 16.0 * 10.0 / 216.0, epsilon = 1e-9);
        assert_relative_eq!(fer[2], 12.0 * 2.0 * 16.0 / 36.0, epsilon = 1e-9);
        assert_relative_eq!(fer[1] + fer[4], 12.0, epsilon = 1e-9);
        assert_relative_eq!(fer[5], -12.0 * 4.0 * 4.0 / 36.0, epsilon = 1e-9);
    }

    #[test]
    fn test_uniform_curvature_locks_in_moment() {
        let load = MemberLoad::Strain(StrainLoad::new(0.0, 5.0, 1e-4, 2e-3, 0, "PT"));
        let fer = fixed_end_forces(&[&load], 5.0, 3.0e6, 4.0e5);

        // M = -EI*kappa along the member, no end shear
        assert_relative_eq!(fer[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(fer[2], 4.0e5 * 2e-3, epsilon = 1e-9);
        assert_relative_eq!(fer[5], -4.0e5 * 2e-3, epsilon = 1e-9);
        assert_relative_eq!(fer[0], 3.0e6 * 1e-4, epsilon = 1e-9);
        assert_relative_eq!(fer[3], -3.0e6 * 1e-4, epsilon = 1e-9);
    }

    #[test]
    fn test_moment_release_condensation() {
        let k = member_local_stiffness(1.0, 3.0, 1.0);
        let releases = [false, false, false, false, false, true];
        let kc = apply_releases(&k, &releases);

        // propped cantilever rotational stiffness 3EI/L
        assert_relative_eq!(kc[(2, 2)], 9.0, epsilon = 1e-12);
        assert_relative_eq!(kc[(5, 5)], 0.0);
    }
}
