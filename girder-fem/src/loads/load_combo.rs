//! Load combinations

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum and maximum factors for one load case
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaseFactors {
    pub min: f64,
    pub max: f64,
}

impl CaseFactors {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The same factor for both extremes
    pub fn single(factor: f64) -> Self {
        Self::new(factor, factor)
    }
}

/// How several live load models of one combination are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiveLoadApplication {
    /// Responses of all models are added
    Sum,
    /// The governing model is taken
    Envelope,
}

/// A load combination defines how load cases and live loads are combined
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadCombination {
    /// Name of the load combination
    pub name: String,
    /// Factors for each load case (case_name -> factors)
    pub factors: BTreeMap<String, CaseFactors>,
    /// Factor applied to the live load response
    pub live_load_factor: f64,
    /// Live load models included in the combination
    pub live_load_models: Vec<String>,
    /// Combination rule for the live load models
    pub live_load_application: LiveLoadApplication,
    /// Optional tags for filtering
    pub tags: Vec<String>,
}

impl LoadCombination {
    /// Create a new load combination
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            factors: BTreeMap::new(),
            live_load_factor: 0.0,
            live_load_models: Vec::new(),
            live_load_application: LiveLoadApplication::Envelope,
            tags: Vec::new(),
        }
    }

    /// Add a load case with a single factor
    pub fn with_case(self, case: &str, factor: f64) -> Self {
        self.with_case_range(case, factor, factor)
    }

    /// Add a load case with minimum and maximum factors
    pub fn with_case_range(mut self, case: &str, min: f64, max: f64) -> Self {
        self.factors.insert(case.to_string(), CaseFactors::new(min, max));
        self
    }

    /// Add a live load model
    pub fn with_live_load(mut self, model: &str, factor: f64) -> Self {
        self.live_load_models.push(model.to_string());
        self.live_load_factor = factor;
        self
    }

    /// Set how several live load models are combined
    pub fn with_live_load_application(mut self, application: LiveLoadApplication) -> Self {
        self.live_load_application = application;
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    /// Get the factors for a load case
    pub fn factor(&self, case: &str) -> CaseFactors {
        self.factors
            .get(case)
            .copied()
            .unwrap_or(CaseFactors::single(0.0))
    }

    /// Check if this combination includes a specific load case
    pub fn includes(&self, case: &str) -> bool {
        self.factors
            .get(case)
            .map_or(false, |f| f.min.abs() > 1e-10 || f.max.abs() > 1e-10)
    }

    /// Check if the combination carries live load
    pub fn has_live_load(&self) -> bool {
        !self.live_load_models.is_empty() && self.live_load_factor.abs() > 1e-10
    }
}
