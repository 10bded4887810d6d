//! Vehicular live loads

use serde::{Deserialize, Serialize};

/// One axle of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axle {
    /// Axle weight (N)
    pub weight: f64,
    /// Spacing to the next axle (m), ignored for the last axle
    pub spacing: f64,
}

impl Axle {
    pub fn new(weight: f64, spacing: f64) -> Self {
        Self { weight, spacing }
    }
}

/// Which parts of a vehicular load are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicularLoadConfiguration {
    TruckOnly,
    LaneOnly,
    TruckPlusLane,
    /// Governing of truck alone and lane alone
    TruckLaneEnvelope,
}

/// Responses a vehicle is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleApplicability {
    All,
    /// Negative moments and reactions at interior supports only
    NegativeMomentAndInteriorPierReaction,
}

/// A vehicular load: a truck and/or a uniform lane load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicularLoad {
    /// Name of the vehicle
    pub name: String,
    /// Axles from front to back
    pub axles: Vec<Axle>,
    /// Axle whose spacing to the next axle may vary
    pub variable_axle: Option<usize>,
    /// Largest spacing for the variable axle
    pub variable_max_spacing: f64,
    /// Lane load intensity (N/m, positive down)
    pub lane_load: f64,
    /// Factor on the truck part
    pub truck_factor: f64,
    /// Factor on the lane part
    pub lane_factor: f64,
    /// Which parts are applied
    pub configuration: VehicularLoadConfiguration,
    /// Responses the vehicle governs
    pub applicability: VehicleApplicability,
}

impl VehicularLoad {
    /// Create a truck with the given axles
    pub fn truck(name: &str, axles: Vec<Axle>) -> Self {
        Self {
            name: name.to_string(),
            axles,
            variable_axle: None,
            variable_max_spacing: 0.0,
            lane_load: 0.0,
            truck_factor: 1.0,
            lane_factor: 1.0,
            configuration: VehicularLoadConfiguration::TruckOnly,
            applicability: VehicleApplicability::All,
        }
    }

    /// Create a uniform lane load
    pub fn lane(name: &str, w: f64) -> Self {
        Self {
            lane_load: w,
            configuration: VehicularLoadConfiguration::LaneOnly,
            ..Self::truck(name, Vec::new())
        }
    }

    /// Add a lane load applied together with the truck
    pub fn with_lane(mut self, w: f64) -> Self {
        self.lane_load = w;
        self.configuration = VehicularLoadConfiguration::TruckPlusLane;
        self
    }

    /// Let the spacing behind `axle` vary up to `max_spacing`
    pub fn with_variable_spacing(mut self, axle: usize, max_spacing: f64) -> Self {
        self.variable_axle = Some(axle);
        self.variable_max_spacing = max_spacing;
        self
    }

    /// Scale the truck and lane parts
    pub fn with_factors(mut self, truck_factor: f64, lane_factor: f64) -> Self {
        self.truck_factor = truck_factor;
        self.lane_factor = lane_factor;
        self
    }

    /// Set the applicability
    pub fn with_applicability(mut self, applicability: VehicleApplicability) -> Self {
        self.applicability = applicability;
        self
    }

    /// Set the configuration
    pub fn with_configuration(mut self, configuration: VehicularLoadConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Sum of the nominal axle weights
    pub fn total_weight(&self) -> f64 {
        self.axles.iter().map(|a| a.weight).sum()
    }

    /// Check whether the truck part is applied
    pub fn uses_truck(&self) -> bool {
        !self.axles.is_empty()
            && !matches!(self.configuration, VehicularLoadConfiguration::LaneOnly)
    }

    /// Check whether the lane part is applied
    pub fn uses_lane(&self) -> bool {
        self.lane_load != 0.0
            && !matches!(self.configuration, VehicularLoadConfiguration::TruckOnly)
    }

    /// Trial spacings for every axle gap
    pub(crate) fn spacing_trials(&self, steps: usize) -> Vec<Vec<f64>> {
        let base: Vec<f64> = self.axles.iter().map(|a| a.spacing).collect();
        match self.variable_axle {
            Some(idx) if idx + 1 < self.axles.len() && self.variable_max_spacing > base[idx] => {
                let steps = steps.max(1);
                let min = base[idx];
                (0..=steps)
                    .map(|i| {
                        let mut spacings = base.clone();
                        spacings[idx] =
                            min + (self.variable_max_spacing - min) * i as f64 / steps as f64;
                        spacings
                    })
                    .collect()
            }
            _ => vec![base],
        }
    }
}

/// Which distribution factor set a live load model uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionFactorType {
    Strength,
    Fatigue,
    Pedestrian,
}

/// A named collection of vehicular loads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveLoadModel {
    /// Name of the model
    pub name: String,
    /// Vehicles enveloped by the model
    pub vehicles: Vec<VehicularLoad>,
    /// Dynamic load allowance on trucks
    pub truck_impact: f64,
    /// Dynamic load allowance on lane loads
    pub lane_impact: f64,
    /// Distribution factors used by the model
    pub distribution: DistributionFactorType,
}

impl LiveLoadModel {
    /// Create a new model with no vehicles
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vehicles: Vec::new(),
            truck_impact: 0.0,
            lane_impact: 0.0,
            distribution: DistributionFactorType::Strength,
        }
    }

    /// Add a vehicle
    pub fn with_vehicle(mut self, vehicle: VehicularLoad) -> Self {
        self.vehicles.push(vehicle);
        self
    }

    /// Set the dynamic load allowance
    pub fn with_impact(mut self, truck: f64, lane: f64) -> Self {
        self.truck_impact = truck;
        self.lane_impact = lane;
        self
    }

    /// Set the distribution factor type
    pub fn with_distribution(mut self, distribution: DistributionFactorType) -> Self {
        self.distribution = distribution;
        self
    }
}
