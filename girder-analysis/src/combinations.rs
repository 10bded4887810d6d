//! Load cases, limit states and their factors
//!
//! Every limit state used for design and load rating is a closed enumeration
//! with a fixed name. [`LoadCombinationTable`] holds the factors in effect for
//! one bridge and registers matching load cases and combinations with a
//! structural model, so combination results can be read either from the model
//! or reassembled from load case results.

use std::collections::{BTreeMap, BTreeSet};

use girder_fem::prelude::{
    AxleConfiguration, CaseFactors, LiveLoadApplication, LoadCase as ModelLoadCase,
    LoadCombination,
};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::bridge::{BridgeProvider, LiveLoadFactorModel};
use crate::error::AnalysisResult;
use crate::structural::StructuralModel;
use crate::types::{LiveLoadType, LoadCase, Named, ProductLoad};

/// Live load factor meaning "depends on the weight of the governing truck"
pub const WEIGHT_DEPENDENT: f64 = -1.0;

/// Design and load rating limit states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LimitState {
    ServiceI,
    ServiceIII,
    StrengthI,
    StrengthII,
    FatigueI,
    StrengthIInventory,
    StrengthIOperating,
    ServiceIIIInventory,
    StrengthILegalRoutine,
    StrengthILegalSpecial,
    StrengthILegalEmergency,
    ServiceIIILegalRoutine,
    ServiceIIILegalSpecial,
    ServiceIIILegalEmergency,
    StrengthIIPermitRoutine,
    StrengthIIPermitSpecial,
    ServiceIPermitRoutine,
    ServiceIPermitSpecial,
}

impl Named for LimitState {
    const NAMES: &'static [(Self, &'static str)] = &[
        (Self::ServiceI, "Service I"),
        (Self::ServiceIII, "Service III"),
        (Self::StrengthI, "Strength I"),
        (Self::StrengthII, "Strength II"),
        (Self::FatigueI, "Fatigue I"),
        (Self::StrengthIInventory, "Strength I (Inventory)"),
        (Self::StrengthIOperating, "Strength I (Operating)"),
        (Self::ServiceIIIInventory, "Service III (Inventory)"),
        (Self::StrengthILegalRoutine, "Strength I (Legal - Routine)"),
        (Self::StrengthILegalSpecial, "Strength I (Legal - Special)"),
        (Self::StrengthILegalEmergency, "Strength I (Legal - Emergency)"),
        (Self::ServiceIIILegalRoutine, "Service III (Legal - Routine)"),
        (Self::ServiceIIILegalSpecial, "Service III (Legal - Special)"),
        (Self::ServiceIIILegalEmergency, "Service III (Legal - Emergency)"),
        (Self::StrengthIIPermitRoutine, "Strength II (Permit - Routine)"),
        (Self::StrengthIIPermitSpecial, "Strength II (Permit - Special)"),
        (Self::ServiceIPermitRoutine, "Service I (Permit - Routine)"),
        (Self::ServiceIPermitSpecial, "Service I (Permit - Special)"),
    ];
}

impl LimitState {
    pub fn is_rating(self) -> bool {
        !matches!(
            self,
            Self::ServiceI | Self::ServiceIII | Self::StrengthI | Self::StrengthII | Self::FatigueI
        )
    }

    pub fn is_strength(self) -> bool {
        matches!(
            self,
            Self::StrengthI
                | Self::StrengthII
                | Self::StrengthIInventory
                | Self::StrengthIOperating
                | Self::StrengthILegalRoutine
                | Self::StrengthILegalSpecial
                | Self::StrengthILegalEmergency
                | Self::StrengthIIPermitRoutine
                | Self::StrengthIIPermitSpecial
        )
    }

    /// Live load carried by the limit state
    pub fn live_load_type(self) -> LiveLoadType {
        match self {
            Self::ServiceI
            | Self::ServiceIII
            | Self::StrengthI
            | Self::StrengthIInventory
            | Self::StrengthIOperating
            | Self::ServiceIIIInventory => LiveLoadType::Design,
            Self::StrengthII => LiveLoadType::Permit,
            Self::FatigueI => LiveLoadType::Fatigue,
            Self::StrengthILegalRoutine | Self::ServiceIIILegalRoutine => LiveLoadType::LegalRoutine,
            Self::StrengthILegalSpecial | Self::ServiceIIILegalSpecial => LiveLoadType::LegalSpecial,
            Self::StrengthILegalEmergency | Self::ServiceIIILegalEmergency => {
                LiveLoadType::LegalEmergency
            }
            Self::StrengthIIPermitRoutine | Self::ServiceIPermitRoutine => {
                LiveLoadType::PermitRoutine
            }
            Self::StrengthIIPermitSpecial | Self::ServiceIPermitSpecial => {
                LiveLoadType::PermitSpecial
            }
        }
    }
}

/// Factors of one limit state
#[derive(Debug, Clone, PartialEq)]
pub struct LimitStateDefinition {
    pub limit_state: LimitState,
    pub cases: BTreeMap<LoadCase, CaseFactors>,
    pub live_load: LiveLoadType,
    /// [`WEIGHT_DEPENDENT`] when the factor follows the governing truck
    pub live_load_factor: f64,
    /// How pedestrian load is combined with the vehicles, when it is
    pub pedestrian: Option<LiveLoadApplication>,
}

impl LimitStateDefinition {
    /// Factors of a limit state before any rating overrides
    pub fn standard(limit_state: LimitState, time_dependent: bool) -> Self {
        use LimitState::*;

        let strength = limit_state.is_strength();
        let mut cases = BTreeMap::new();
        if limit_state != FatigueI {
            let dw = if limit_state.is_rating() {
                LoadCase::DWRating
            } else {
                LoadCase::DW
            };
            if strength {
                cases.insert(LoadCase::DC, CaseFactors::new(0.90, 1.25));
                cases.insert(dw, CaseFactors::new(0.65, 1.50));
            } else {
                cases.insert(LoadCase::DC, CaseFactors::single(1.0));
                cases.insert(dw, CaseFactors::single(1.0));
            }
            cases.insert(LoadCase::PS, CaseFactors::single(1.0));
            if time_dependent {
                for case in [LoadCase::CR, LoadCase::SH, LoadCase::RE] {
                    cases.insert(case, CaseFactors::single(1.0));
                }
            }
        }

        let live_load_factor = match limit_state {
            ServiceI | ServiceIPermitRoutine | ServiceIPermitSpecial => 1.0,
            ServiceIII
            | ServiceIIIInventory
            | ServiceIIILegalRoutine
            | ServiceIIILegalSpecial
            | ServiceIIILegalEmergency => 0.8,
            StrengthI | StrengthIInventory | FatigueI => 1.75,
            StrengthII | StrengthIOperating => 1.35,
            StrengthILegalRoutine
            | StrengthILegalSpecial
            | StrengthILegalEmergency
            | StrengthIIPermitRoutine
            | StrengthIIPermitSpecial => WEIGHT_DEPENDENT,
        };

        let pedestrian = match limit_state {
            ServiceI | ServiceIII | StrengthI | StrengthII => Some(LiveLoadApplication::Sum),
            _ => None,
        };

        Self {
            limit_state,
            cases,
            live_load: limit_state.live_load_type(),
            live_load_factor,
            pedestrian,
        }
    }

    pub fn factor(&self, case: LoadCase) -> CaseFactors {
        self.cases
            .get(&case)
            .copied()
            .unwrap_or(CaseFactors::single(0.0))
    }

    pub fn is_weight_dependent(&self) -> bool {
        self.live_load_factor < 0.0
    }
}

/// Default truck-weight dependent factor models by live load type
pub fn default_factor_model(live_load: LiveLoadType) -> LiveLoadFactorModel {
    // bounds of 100 and 150 kip trucks
    const LIGHT: f64 = 444.8e3;
    const HEAVY: f64 = 667.2e3;
    match live_load {
        LiveLoadType::PermitRoutine => LiveLoadFactorModel {
            adtt: [1000.0, 5000.0],
            weight: [LIGHT, HEAVY],
            factors: [[1.60, 1.20], [1.80, 1.30]],
        },
        LiveLoadType::PermitSpecial => LiveLoadFactorModel::by_adtt([1000.0, 5000.0], [1.50, 1.50]),
        LiveLoadType::LegalEmergency => LiveLoadFactorModel::by_adtt([1000.0, 5000.0], [1.30, 1.30]),
        _ => LiveLoadFactorModel::by_adtt([1000.0, 5000.0], [1.65, 1.80]),
    }
}

/// Groups of each load case
pub fn case_groups(bridge: &dyn BridgeProvider) -> BTreeMap<LoadCase, Vec<String>> {
    let future_overlay = bridge.overlay().map_or(false, |o| o.is_future);
    let mut cases: BTreeMap<LoadCase, Vec<String>> =
        LoadCase::all().map(|c| (c, Vec::new())).collect();
    for product in ProductLoad::all() {
        if let Some(case) = product.load_case() {
            if let Some(groups) = cases.get_mut(&case) {
                groups.push(product.name().to_string());
            }
        }
        let rating_dw = product == ProductLoad::UserDW
            || (product == ProductLoad::Overlay && !future_overlay);
        if rating_dw {
            if let Some(groups) = cases.get_mut(&LoadCase::DWRating) {
                groups.push(product.name().to_string());
            }
        }
    }
    cases
}

/// Limit states and factors in effect for a bridge
#[derive(Debug, Clone)]
pub struct LoadCombinationTable {
    definitions: BTreeMap<LimitState, LimitStateDefinition>,
    factor_models: BTreeMap<LiveLoadType, LiveLoadFactorModel>,
    adtt: f64,
    time_dependent: bool,
}

impl LoadCombinationTable {
    /// Limit states whose live load is defined for the bridge; Service I and
    /// Strength I are always present
    pub fn new(bridge: &dyn BridgeProvider) -> Self {
        let settings = bridge.live_load();
        let time_dependent = bridge.time_dependent().is_some();
        let mut definitions = BTreeMap::new();
        for limit_state in LimitState::all() {
            let always = matches!(limit_state, LimitState::ServiceI | LimitState::StrengthI);
            if !always && !settings.models.contains_key(&limit_state.live_load_type()) {
                continue;
            }
            let mut definition = LimitStateDefinition::standard(limit_state, time_dependent);
            if let Some(factor) = settings.rating.live_load_factors.get(&limit_state) {
                definition.live_load_factor = *factor;
            }
            definition.pedestrian = settings.pedestrian_for(limit_state);
            definitions.insert(limit_state, definition);
        }
        Self {
            definitions,
            factor_models: settings.rating.factor_models.clone(),
            adtt: settings.adtt,
            time_dependent,
        }
    }

    pub fn definition(&self, limit_state: LimitState) -> Option<&LimitStateDefinition> {
        self.definitions.get(&limit_state)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &LimitStateDefinition> {
        self.definitions.values()
    }

    pub fn is_time_dependent(&self) -> bool {
        self.time_dependent
    }

    /// Live load factor for a limit state, resolved for the governing truck
    /// when it depends on truck weight
    pub fn live_load_factor(
        &self,
        limit_state: LimitState,
        configuration: Option<&AxleConfiguration>,
    ) -> f64 {
        let Some(definition) = self.definitions.get(&limit_state) else {
            return 0.0;
        };
        if !definition.is_weight_dependent() {
            return definition.live_load_factor;
        }
        let weight = configuration.map_or(0.0, |c| c.total_weight());
        self.factor_models
            .get(&definition.live_load)
            .copied()
            .unwrap_or_else(|| default_factor_model(definition.live_load))
            .strength_factor(self.adtt, weight)
    }

    /// Register load cases and limit state combinations with a model
    ///
    /// Groups not declared in the model and live load models not in
    /// `live_load_models` are skipped.
    pub fn register<M: StructuralModel>(
        &self,
        model: &mut M,
        cases: &BTreeMap<LoadCase, Vec<String>>,
        live_load_models: &BTreeSet<String>,
    ) -> AnalysisResult<()> {
        for (case, groups) in cases {
            let mut fem_case = ModelLoadCase::new(case.name());
            for group in groups.iter().filter(|g| model.has_load_group(g)) {
                fem_case.add_group(group);
            }
            model.add_load_case(fem_case)?;
        }

        let pedestrian = LiveLoadType::Pedestrian.name();
        for definition in self.definitions.values() {
            let mut combination = LoadCombination::new(definition.limit_state.name());
            for (case, factors) in &definition.cases {
                combination = combination.with_case_range(case.name(), factors.min, factors.max);
            }
            // weight dependent factors are applied when results are reassembled
            let factor = definition.live_load_factor.max(0.0);
            let vehicles = definition.live_load.name();
            if live_load_models.contains(vehicles) {
                combination = combination.with_live_load(vehicles, factor);
            }
            if let Some(application) = definition.pedestrian {
                if live_load_models.contains(pedestrian) {
                    combination = combination
                        .with_live_load(pedestrian, factor)
                        .with_live_load_application(application);
                }
            }
            if definition.is_weight_dependent() {
                combination = combination.with_tag("weight dependent");
            }
            debug!("registering limit state {}", definition.limit_state.name());
            model.add_load_combination(combination)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_limit_state_names_round_trip() {
        for ls in LimitState::all() {
            assert_eq!(LimitState::from_name(ls.name()), Some(ls));
        }
        assert_eq!(LimitState::all().count(), 18);
    }

    #[test]
    fn test_strength_factors() {
        let def = LimitStateDefinition::standard(LimitState::StrengthI, false);
        assert_eq!(def.factor(LoadCase::DC), CaseFactors::new(0.90, 1.25));
        assert_eq!(def.factor(LoadCase::DW), CaseFactors::new(0.65, 1.50));
        assert_eq!(def.factor(LoadCase::CR), CaseFactors::single(0.0));
        assert_relative_eq!(def.live_load_factor, 1.75);
        assert_eq!(def.pedestrian, Some(LiveLoadApplication::Sum));
    }

    #[test]
    fn test_rating_uses_rating_dw() {
        let def = LimitStateDefinition::standard(LimitState::StrengthIInventory, true);
        assert!(def.cases.contains_key(&LoadCase::DWRating));
        assert!(!def.cases.contains_key(&LoadCase::DW));
        assert!(def.cases.contains_key(&LoadCase::SH));
        assert_eq!(def.pedestrian, None);
    }

    #[test]
    fn test_fatigue_has_no_dead_load() {
        let def = LimitStateDefinition::standard(LimitState::FatigueI, false);
        assert!(def.cases.is_empty());
        assert_eq!(def.live_load, LiveLoadType::Fatigue);
    }

    #[test]
    fn test_legal_factor_is_weight_dependent() {
        let def = LimitStateDefinition::standard(LimitState::StrengthILegalRoutine, false);
        assert!(def.is_weight_dependent());
        let model = default_factor_model(LiveLoadType::PermitRoutine);
        assert_relative_eq!(model.strength_factor(5000.0, 300e3), 1.80);
        assert_relative_eq!(model.strength_factor(5000.0, 900e3), 1.30);
    }

    #[test]
    fn test_pedestrian_application_by_live_load_type() {
        use crate::bridge::{LiveLoadSettings, PedestrianApplication};

        let mut settings: LiveLoadSettings = serde_json::from_str(r#"{ "models": {} }"#).unwrap();
        assert_eq!(settings.pedestrian_for(LimitState::StrengthI), Some(LiveLoadApplication::Sum));
        assert_eq!(settings.pedestrian_for(LimitState::StrengthII), Some(LiveLoadApplication::Sum));
        assert_eq!(settings.pedestrian_for(LimitState::FatigueI), None);
        assert_eq!(settings.pedestrian_for(LimitState::StrengthIInventory), None);

        settings
            .pedestrian_application
            .insert(LiveLoadType::Permit, PedestrianApplication::Envelope);
        settings.rating.include_pedestrian = true;
        assert_eq!(
            settings.pedestrian_for(LimitState::StrengthII),
            Some(LiveLoadApplication::Envelope)
        );
        assert_eq!(
            settings.pedestrian_for(LimitState::ServiceIIILegalRoutine),
            Some(LiveLoadApplication::Sum)
        );
    }
}
