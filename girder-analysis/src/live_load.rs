//! Live load models of a girder line
//!
//! Every configured live load type becomes a named live load model. The
//! pedestrian model is a unit lane load whose magnitude is carried by the
//! pedestrian distribution factor, and the deflection models are derived
//! from the design truck.

use girder_fem::prelude::{
    Axle, DistributionFactorType, LiveLoadModel, VehicleApplicability, VehicularLoad,
    VehicularLoadConfiguration,
};
use log::{debug, warn};

use crate::bridge::{LiveLoadModelSettings, LiveLoadSettings, VehicleDescription, VehicleSpec};
use crate::types::{DeflectionLiveLoadType, LiveLoadType, Named};

const KIP: f64 = 4448.221_615_260_5;
const FT: f64 = 0.3048;

/// Design truck axles (N, m)
const TRUCK: [(f64, f64); 3] = [(35.0e3, 4.3), (145.0e3, 4.3), (145.0e3, 0.0)];
const TRUCK_MAX_SPACING: f64 = 9.0;
const TANDEM: [(f64, f64); 2] = [(110.0e3, 1.2), (110.0e3, 0.0)];
const DESIGN_LANE: f64 = 9.3e3;
/// Smallest distance between the two trucks of the dual truck train
const TRAIN_GAP: f64 = 15.0;
const TRAIN_MAX_GAP: f64 = 60.0;

fn axles(spec: &[(f64, f64)]) -> Vec<Axle> {
    spec.iter().map(|(w, s)| Axle::new(*w, *s)).collect()
}

/// Axles given in kip and spacings in ft
fn us_axles(weights: &[f64], spacings: &[f64]) -> Vec<Axle> {
    weights
        .iter()
        .enumerate()
        .map(|(k, w)| Axle::new(w * KIP, spacings.get(k).map_or(0.0, |s| s * FT)))
        .collect()
}

/// Design truck with its variable rear axle spacing
pub fn design_truck(name: &str) -> VehicularLoad {
    VehicularLoad::truck(name, axles(&TRUCK)).with_variable_spacing(1, TRUCK_MAX_SPACING)
}

/// Vehicles of one vehicle specification
pub fn vehicles(spec: &VehicleSpec) -> Vec<VehicularLoad> {
    match spec {
        VehicleSpec::Hl93 => {
            let train = [
                (35.0e3, 4.3),
                (145.0e3, 4.3),
                (145.0e3, TRAIN_GAP),
                (35.0e3, 4.3),
                (145.0e3, 4.3),
                (145.0e3, 0.0),
            ];
            vec![
                design_truck("Design Truck + Lane").with_lane(DESIGN_LANE),
                VehicularLoad::truck("Design Tandem + Lane", axles(&TANDEM)).with_lane(DESIGN_LANE),
                VehicularLoad::truck("Dual Truck Train + Lane", axles(&train))
                    .with_variable_spacing(2, TRAIN_MAX_GAP)
                    .with_lane(DESIGN_LANE)
                    .with_factors(0.9, 0.9)
                    .with_applicability(VehicleApplicability::NegativeMomentAndInteriorPierReaction),
            ]
        }
        VehicleSpec::Hl93Fatigue => vec![VehicularLoad::truck(
            "Fatigue Truck",
            axles(&[(35.0e3, 4.3), (145.0e3, 9.0), (145.0e3, 0.0)]),
        )],
        VehicleSpec::Type3 => vec![VehicularLoad::truck(
            "Type 3",
            us_axles(&[16.0, 17.0, 17.0], &[15.0, 4.0]),
        )],
        VehicleSpec::Type3S2 => vec![VehicularLoad::truck(
            "Type 3S2",
            us_axles(&[10.0, 15.5, 15.5, 15.5, 15.5], &[11.0, 4.0, 22.0, 4.0]),
        )],
        VehicleSpec::Type33 => vec![VehicularLoad::truck(
            "Type 3-3",
            us_axles(&[12.0, 12.0, 12.0, 16.0, 14.0, 14.0], &[15.0, 4.0, 15.0, 16.0, 4.0]),
        )],
        VehicleSpec::Ev2 => vec![VehicularLoad::truck("EV2", us_axles(&[24.0, 33.5], &[15.0]))],
        VehicleSpec::Ev3 => vec![VehicularLoad::truck(
            "EV3",
            us_axles(&[24.0, 31.0, 31.0], &[15.0, 4.0]),
        )],
        VehicleSpec::User(desc) => vec![user_vehicle(desc)],
    }
}

fn user_vehicle(desc: &VehicleDescription) -> VehicularLoad {
    let axles = desc
        .axles
        .iter()
        .map(|a| Axle::new(a.weight, a.spacing))
        .collect();
    let mut vehicle = VehicularLoad::truck(&desc.name, axles);
    if let Some(axle) = desc.variable_axle {
        vehicle = vehicle.with_variable_spacing(axle, desc.max_spacing);
    }
    if desc.lane_load != 0.0 {
        vehicle = vehicle.with_lane(desc.lane_load);
    }
    vehicle.with_configuration(desc.configuration)
}

/// Stand-in for an empty vehicle set; it produces no response
pub fn dummy_truck() -> VehicularLoad {
    VehicularLoad::truck("Dummy Truck", vec![Axle::new(0.0, 0.0)])
}

fn distribution_type(ll: LiveLoadType) -> DistributionFactorType {
    match ll {
        LiveLoadType::Fatigue => DistributionFactorType::Fatigue,
        LiveLoadType::Pedestrian => DistributionFactorType::Pedestrian,
        _ => DistributionFactorType::Strength,
    }
}

/// Live load model of one live load type
pub fn live_load_model(ll: LiveLoadType, settings: &LiveLoadModelSettings) -> LiveLoadModel {
    let mut model = LiveLoadModel::new(ll.name())
        .with_impact(settings.truck_impact, settings.lane_impact)
        .with_distribution(distribution_type(ll));
    for spec in &settings.vehicles {
        for vehicle in vehicles(spec) {
            model = model.with_vehicle(vehicle);
        }
    }
    if model.vehicles.is_empty() {
        warn!("{} has no vehicles, a dummy truck is used", ll.name());
        model = model.with_vehicle(dummy_truck());
    }
    model
}

/// Unit lane load carrying the pedestrian load through its distribution factor
pub fn pedestrian_model() -> LiveLoadModel {
    LiveLoadModel::new(LiveLoadType::Pedestrian.name())
        .with_vehicle(VehicularLoad::lane("Pedestrian", 1.0))
        .with_distribution(DistributionFactorType::Pedestrian)
}

/// Live load deflection models, derived from the design truck
pub fn deflection_models(truck_impact: f64) -> Vec<LiveLoadModel> {
    let truck_alone = LiveLoadModel::new(DeflectionLiveLoadType::DesignTruckAlone.name())
        .with_impact(truck_impact, 0.0)
        .with_vehicle(design_truck("Design Truck"));
    let quarter_plus_lane = LiveLoadModel::new(DeflectionLiveLoadType::Design25PlusLane.name())
        .with_impact(truck_impact, 0.0)
        .with_vehicle(
            design_truck("25% Design Truck + Lane")
                .with_lane(DESIGN_LANE)
                .with_factors(0.25, 1.0)
                .with_configuration(VehicularLoadConfiguration::TruckPlusLane),
        );
    vec![truck_alone, quarter_plus_lane]
}

/// Every live load model of a bridge
pub fn live_load_models(settings: &LiveLoadSettings) -> Vec<LiveLoadModel> {
    let mut models: Vec<LiveLoadModel> = settings
        .models
        .iter()
        .filter(|(ll, _)| **ll != LiveLoadType::Pedestrian)
        .map(|(ll, s)| live_load_model(*ll, s))
        .collect();
    models.push(pedestrian_model());
    let impact = settings
        .models
        .get(&LiveLoadType::Design)
        .map_or(0.33, |s| s.truck_impact);
    models.extend(deflection_models(impact));
    debug!("{} live load models", models.len());
    models
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hl93_vehicles() {
        let hl93 = vehicles(&VehicleSpec::Hl93);
        assert_eq!(hl93.len(), 3);
        assert_relative_eq!(hl93[0].total_weight(), 325.0e3);
        assert_relative_eq!(hl93[1].total_weight(), 220.0e3);
        assert_eq!(hl93[2].axles.len(), 6);
        assert_eq!(hl93[2].truck_factor, 0.9);
        assert_eq!(
            hl93[2].applicability,
            VehicleApplicability::NegativeMomentAndInteriorPierReaction
        );
    }

    #[test]
    fn test_legal_loads_in_si_units() {
        let type3 = &vehicles(&VehicleSpec::Type3)[0];
        assert_relative_eq!(type3.total_weight(), 50.0 * KIP, epsilon = 1e-6);
        assert_relative_eq!(type3.axles[0].spacing, 15.0 * FT);
        let ev2 = &vehicles(&VehicleSpec::Ev2)[0];
        assert_relative_eq!(ev2.total_weight(), 57.5 * KIP, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_model_gets_dummy_truck() {
        let settings = LiveLoadModelSettings {
            vehicles: vec![],
            truck_impact: 0.33,
            lane_impact: 0.0,
        };
        let model = live_load_model(LiveLoadType::LegalRoutine, &settings);
        assert_eq!(model.vehicles.len(), 1);
        assert_eq!(model.vehicles[0].total_weight(), 0.0);
    }

    #[test]
    fn test_default_models() {
        let models = live_load_models(&LiveLoadSettings::default());
        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert!(names.contains(&"LL Design"));
        assert!(names.contains(&"LL Fatigue"));
        assert!(names.contains(&"LL Pedestrian"));
        assert!(names.contains(&"LL Deflection Truck"));
        assert!(names.contains(&"LL Deflection 25% Truck + Lane"));
        let fatigue = models.iter().find(|m| m.name == "LL Fatigue").unwrap();
        assert_eq!(fatigue.distribution, DistributionFactorType::Fatigue);
    }
}
