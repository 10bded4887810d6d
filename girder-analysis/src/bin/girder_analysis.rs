//! Girder Analysis - reports dead load, live load and limit state results of
//! every girder line of a bridge
//!
//! Usage: `girder-analysis [bridge.json]`. Without an argument the bundled
//! two-span bridge is analyzed.

use anyhow::{Context, Result};
use girder_analysis::prelude::*;
use log::info;

const DEMO_BRIDGE: &str = include_str!("../../tests/data/two_span.json");

fn load_bridge() -> Result<BridgeDescription> {
    match std::env::args().nth(1) {
        Some(path) => BridgeDescription::from_file(&path)
            .with_context(|| format!("cannot load bridge from {path}")),
        None => BridgeDescription::from_json(DEMO_BRIDGE).context("bundled bridge is invalid"),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let bridge = load_bridge()?;
    let lines = bridge.girder_line_count();
    let last = bridge.interval_count() - 1;
    let piers = bridge.piers().len();
    info!("analyzing {} girder lines of '{}'", lines, bridge.name);

    let envelope = [
        BridgeAnalysisType::MinSimpleContinuousEnvelope,
        BridgeAnalysisType::MaxSimpleContinuousEnvelope,
    ];
    let mut manager: GirderModelManager<_> =
        GirderModelManager::new(bridge, AnalysisOptions::default());

    for girder_line in 0..lines {
        let model = manager
            .ensure_built(girder_line, BridgeAnalysisType::MaxSimpleContinuousEnvelope)
            .with_context(|| format!("cannot build girder line {girder_line}"))?;

        // tenth points of every segment
        let pois: Vec<PointOfInterest> = model
            .layout()
            .segments
            .iter()
            .flat_map(|s| {
                let length = s.end - s.start;
                (0..=10).map(move |k| PointOfInterest::new(s.index, length * k as f64 / 10.0))
            })
            .collect();

        println!("=== Girder line {girder_line} ===\n");
        println!(
            "{:>8} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "segment", "x (m)", "DC (kN·m)", "DW (kN·m)", "LL+ (kN·m)", "Str I+", "Str I-"
        );

        let dc = model.load_case_results(
            last,
            LoadCase::DC,
            ForceEffect::Mz,
            &pois,
            envelope[1],
            ResultsType::Cumulative,
        )?;
        let dw = model.load_case_results(
            last,
            LoadCase::DW,
            ForceEffect::Mz,
            &pois,
            envelope[1],
            ResultsType::Cumulative,
        )?;
        let ll = model.live_load_results(
            last,
            LiveLoadType::Design,
            ForceEffect::Mz,
            &pois,
            envelope[1],
            Optimization::Maximize,
            LiveLoadQuery::default(),
        )?;
        let strength_max = model.limit_state_results(
            last,
            LimitState::StrengthI,
            ForceEffect::Mz,
            &pois,
            envelope[1],
            Optimization::Maximize,
            false,
        )?;
        let strength_min = model.limit_state_results(
            last,
            LimitState::StrengthI,
            ForceEffect::Mz,
            &pois,
            envelope[0],
            Optimization::Minimize,
            false,
        )?;

        for (k, poi) in pois.iter().enumerate() {
            println!(
                "{:>8} {:>8.2} {:>12.1} {:>12.1} {:>12.1} {:>12.1} {:>12.1}",
                poi.segment,
                poi.distance,
                dc[k] / 1e3,
                dw[k] / 1e3,
                ll[k].value / 1e3,
                strength_max[k] / 1e3,
                strength_min[k] / 1e3
            );
        }

        println!("\n{:>8} {:>14} {:>14}", "pier", "DC (kN)", "Service I (kN)");
        for pier in 0..piers {
            let location = SupportLocation::Pier(pier);
            let dc = model.load_case_reaction(
                last,
                LoadCase::DC,
                location,
                envelope[1],
                ResultsType::Cumulative,
            )?;
            let service = model.limit_state_reaction(
                last,
                LimitState::ServiceI,
                location,
                envelope[1],
                Optimization::Maximize,
            )?;
            println!("{:>8} {:>14.1} {:>14.1}", pier, dc / 1e3, service / 1e3);
        }

        let contraflexure = model.contraflexure_points(ModelKind::Continuous)?;
        println!("\nContraflexure points (m): {contraflexure:.2?}\n");
    }

    Ok(())
}
