//! Prestressing modeled as imposed strain
//!
//! A prestress force `P` at eccentricity `e` (positive below the centroid)
//! shortens the girder by `P/EA` and bends it upward by `P·e/EI`. Applying the
//! equivalent strain instead of forces lets the structure develop the
//! secondary effects where it restrains the deformation.

use log::debug;

use crate::bridge::{
    BridgeProvider, GirderLineDescription, TendonDescription, TimeDependentEffect,
};
use crate::error::AnalysisResult;
use crate::structural::StructuralModel;
use crate::types::{IntervalIndex, Named, ProductLoad};

use super::LoadApplicator;

/// Axial strain and curvature imposed by a compressive force
pub fn prestress_strain(force: f64, eccentricity: f64, ea: f64, ei: f64) -> (f64, f64) {
    let axial = if ea > 0.0 { -force / ea } else { 0.0 };
    let curvature = if ei > 0.0 { -force * eccentricity / ei } else { 0.0 };
    (axial, curvature)
}

/// Pretension of each segment, imposed when the segment is erected
pub fn apply_pretension<M: StructuralModel>(
    applicator: &mut LoadApplicator<'_, M>,
    line: &GirderLineDescription,
) -> AnalysisResult<()> {
    let group = ProductLoad::Pretension.name();
    let topology = applicator.topology;
    for (s, seg) in line.segments.iter().enumerate() {
        let Some(ps) = seg.pretension else {
            continue;
        };
        let interval = seg.erection_interval;
        let mut stations = vec![seg.start];
        stations.extend(topology.breaks_between(seg.start, seg.end));
        stations.push(seg.end);
        for pair in stations.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let Some(stiffness) = topology
                .member_covering(a, b, interval)
                .and_then(|m| m.stiffness_at(interval))
            else {
                continue;
            };
            let (axial, curvature) =
                prestress_strain(ps.force, ps.eccentricity, stiffness.ea, stiffness.ei);
            applicator.strain(group, interval, a, b, axial, curvature)?;
        }
        debug!("segment {s}: pretension {:.1} N imposed in interval {interval}", ps.force);
    }
    Ok(())
}

/// Change of every tendon force, imposed in the interval it happens
pub fn apply_post_tensioning<M: StructuralModel>(
    applicator: &mut LoadApplicator<'_, M>,
    line: &GirderLineDescription,
    interval_count: usize,
) -> AnalysisResult<()> {
    let group = ProductLoad::PostTensioning.name();
    let topology = applicator.topology;
    let tol = applicator.layout.tolerance;

    for (t, tendon) in line.tendons.iter().enumerate() {
        let (Some(first), Some(last)) = (tendon.profile.first(), tendon.profile.last()) else {
            debug!("tendon {t} has no profile");
            continue;
        };
        let (x1, x2) = (first.x, last.x);
        let mut stations: Vec<f64> = tendon.profile.iter().map(|p| p.x).collect();
        stations.extend(topology.breaks_between(x1, x2));
        stations.sort_by(f64::total_cmp);
        stations.dedup_by(|a, b| (*a - *b).abs() <= tol);

        for (interval, change) in force_changes(tendon, interval_count) {
            for pair in stations.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let Some(stiffness) = topology
                    .member_covering(a, b, interval)
                    .and_then(|m| m.stiffness_at(interval))
                else {
                    continue;
                };
                // strain is averaged over the piece
                let e = 0.5 * (tendon.eccentricity_at(a) + tendon.eccentricity_at(b));
                let (axial, curvature) = prestress_strain(change, e, stiffness.ea, stiffness.ei);
                applicator.strain(group, interval, a, b, axial, curvature)?;
            }
        }
    }
    Ok(())
}

/// Creep, shrinkage and relaxation strains from time-step analysis
pub fn apply_time_dependent<M: StructuralModel>(
    applicator: &mut LoadApplicator<'_, M>,
    bridge: &dyn BridgeProvider,
    girder_line: usize,
) -> AnalysisResult<()> {
    let Some(loads) = bridge.time_dependent() else {
        return Ok(());
    };
    for strain in &loads.strains {
        if strain.girder_line.is_some_and(|g| g != girder_line) {
            continue;
        }
        let group = time_dependent_product(strain.effect).name();
        applicator.strain(
            group,
            strain.interval,
            strain.x1,
            strain.x2,
            strain.axial_strain,
            strain.curvature,
        )?;
    }
    Ok(())
}

pub fn time_dependent_product(effect: TimeDependentEffect) -> ProductLoad {
    match effect {
        TimeDependentEffect::Creep => ProductLoad::Creep,
        TimeDependentEffect::Shrinkage => ProductLoad::Shrinkage,
        TimeDependentEffect::Relaxation => ProductLoad::Relaxation,
    }
}

/// Intervals in which a tendon force changes
pub fn force_changes(
    tendon: &TendonDescription,
    interval_count: usize,
) -> Vec<(IntervalIndex, f64)> {
    (tendon.stressing_interval..interval_count)
        .filter_map(|i| {
            let previous = i.checked_sub(1).map_or(0.0, |p| tendon.force_at(p));
            let change = tendon.force_at(i) - previous;
            (change != 0.0).then_some((i, change))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::TendonForce;
    use approx::assert_relative_eq;

    #[test]
    fn test_prestress_strain_cambers_upward() {
        let (axial, curvature) = prestress_strain(2.0e6, 0.4, 8.0e9, 2.0e9);
        assert_relative_eq!(axial, -2.5e-4);
        assert_relative_eq!(curvature, -4.0e-4);
        assert_eq!(prestress_strain(1.0, 1.0, 0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn test_force_changes() {
        let tendon = TendonDescription {
            stressing_interval: 2,
            forces: vec![
                TendonForce { interval: 2, force: 3.0e6 },
                TendonForce { interval: 4, force: 2.7e6 },
            ],
            profile: vec![],
        };
        let changes = force_changes(&tendon, 6);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0], (2, 3.0e6));
        assert_eq!(changes[1].0, 4);
        assert_relative_eq!(changes[1].1, -0.3e6, epsilon = 1e-6);
    }
}
