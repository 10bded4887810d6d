//! Loadings created by other parts of an application
//!
//! A loading is a named load group placed in one interval. It collects
//! concentrated, uniform and initial strain loads and may be added to the
//! DC, DW or LL+IM load case so that it takes part in the limit states.
//! Loadings are kept here and replayed into every structural model of the
//! girder line, including models that are built after the loading.

use std::collections::BTreeMap;

use girder_fem::prelude::LoadDirection;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::loads::LoadApplicator;
use crate::structural::StructuralModel;
use crate::types::{IntervalIndex, LoadCase};

/// One load of an external loading, in girder-line stations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExternalLoad {
    /// Force and moment at a station; forces positive along the axes, moment counter-clockwise
    Concentrated { x: f64, fx: f64, fy: f64, mz: f64 },
    /// Constant load per unit length between two stations
    Uniform { x1: f64, x2: f64, wx: f64, wy: f64 },
    /// Initial axial strain and curvature between two stations
    InitialStrain {
        x1: f64,
        x2: f64,
        axial_strain: f64,
        curvature: f64,
    },
}

/// A named loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalLoading {
    pub name: String,
    pub interval: IntervalIndex,
    /// Load cases the loading belongs to
    pub cases: Vec<LoadCase>,
    pub loads: Vec<ExternalLoad>,
}

impl ExternalLoading {
    /// Place one load of this loading on a model
    pub fn apply<M: StructuralModel>(
        &self,
        load: &ExternalLoad,
        applicator: &mut LoadApplicator<'_, M>,
    ) -> AnalysisResult<()> {
        let (group, interval) = (self.name.as_str(), self.interval);
        match *load {
            ExternalLoad::Concentrated { x, fx, fy, mz } => {
                applicator.point(group, interval, x, fx, fy, mz)
            }
            ExternalLoad::Uniform { x1, x2, wx, wy } => {
                applicator.distributed(group, interval, LoadDirection::Fx, x1, x2, wx, wx)?;
                applicator.distributed(group, interval, LoadDirection::Fy, x1, x2, wy, wy)
            }
            ExternalLoad::InitialStrain {
                x1,
                x2,
                axial_strain,
                curvature,
            } => applicator.strain(group, interval, x1, x2, axial_strain, curvature),
        }
    }

    /// Place every load of this loading on a model
    pub fn apply_all<M: StructuralModel>(
        &self,
        applicator: &mut LoadApplicator<'_, M>,
    ) -> AnalysisResult<()> {
        applicator.declare(&self.name)?;
        for load in &self.loads {
            self.apply(load, applicator)?;
        }
        Ok(())
    }
}

/// External loadings of a girder line, by name
#[derive(Debug, Clone, Default)]
pub struct ExternalLoadings {
    loadings: BTreeMap<String, ExternalLoading>,
}

impl ExternalLoadings {
    /// Create an empty loading
    pub fn create(&mut self, name: &str, interval: IntervalIndex) -> AnalysisResult<&ExternalLoading> {
        if self.loadings.contains_key(name) {
            return Err(AnalysisError::InvalidInput(format!(
                "loading '{name}' already exists"
            )));
        }
        let loading = ExternalLoading {
            name: name.to_string(),
            interval,
            cases: Vec::new(),
            loads: Vec::new(),
        };
        Ok(self.loadings.entry(name.to_string()).or_insert(loading))
    }

    /// Add a loading to DC, DW or LL+IM; returns the load cases it joined
    ///
    /// A loading in DW also joins the rating DW case.
    pub fn add_to_case(&mut self, name: &str, case: LoadCase) -> AnalysisResult<Vec<LoadCase>> {
        let cases = match case {
            LoadCase::DC | LoadCase::LLIM => vec![case],
            LoadCase::DW => vec![LoadCase::DW, LoadCase::DWRating],
            other => {
                return Err(AnalysisError::InvalidInput(format!(
                    "loadings can join DC, DW or LL+IM, not {other:?}"
                )))
            }
        };
        let loading = self.get_mut(name)?;
        let added: Vec<LoadCase> = cases
            .into_iter()
            .filter(|c| !loading.cases.contains(c))
            .collect();
        loading.cases.extend(added.iter().copied());
        Ok(added)
    }

    /// Record a load; returns the loading it belongs to
    pub fn add(&mut self, name: &str, load: ExternalLoad) -> AnalysisResult<&ExternalLoading> {
        let loading = self.get_mut(name)?;
        loading.loads.push(load);
        Ok(loading)
    }

    pub fn get(&self, name: &str) -> AnalysisResult<&ExternalLoading> {
        self.loadings
            .get(name)
            .ok_or_else(|| AnalysisError::LoadingNotFound(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> AnalysisResult<&mut ExternalLoading> {
        self.loadings
            .get_mut(name)
            .ok_or_else(|| AnalysisError::LoadingNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loadings.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExternalLoading> {
        self.loadings.values()
    }

    pub fn is_empty(&self) -> bool {
        self.loadings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_lifecycle() {
        let mut loadings = ExternalLoadings::default();
        loadings.create("Crane", 3).unwrap();
        assert!(loadings.create("Crane", 4).is_err());

        let loading = loadings
            .add("Crane", ExternalLoad::Concentrated { x: 5.0, fx: 0.0, fy: -1.0e4, mz: 0.0 })
            .unwrap();
        assert_eq!(loading.loads.len(), 1);

        assert_eq!(
            loadings.add_to_case("Crane", LoadCase::DW).unwrap(),
            vec![LoadCase::DW, LoadCase::DWRating]
        );
        assert!(loadings.add_to_case("Crane", LoadCase::DW).unwrap().is_empty());
        assert!(loadings.add_to_case("Crane", LoadCase::PS).is_err());
        assert!(matches!(
            loadings.add("Missing", ExternalLoad::Uniform { x1: 0.0, x2: 1.0, wx: 0.0, wy: -1.0 }),
            Err(AnalysisError::LoadingNotFound(_))
        ));
    }
}
