//! The structural models of one girder line
//!
//! A [`GirderLineModel`] owns up to two structural models built from the same
//! layout: one that keeps the girders simple spans at every pier and one that
//! makes them continuous where the bridge says so. Both share the point of
//! interest map, so a model point id means the same station in either model.
//! Sub-models are built on demand by [`GirderLineModel::ensure_built`].

use std::collections::{BTreeMap, BTreeSet};

use girder_fem::prelude::{FemError, PoiId, StagedModel};
use log::{debug, info};

use crate::bridge::{BridgeProvider, GirderLineDescription, TimelineEvents};
use crate::builder::{build_structure, ModelTopology};
use crate::combinations::{case_groups, LoadCombinationTable};
use crate::distribution::{assign_distribution_factors, UNIT_LOAD_GROUP};
use crate::error::{AnalysisError, AnalysisResult};
use crate::external::{ExternalLoad, ExternalLoadings};
use crate::layout::GirderLineLayout;
use crate::live_load::live_load_models;
use crate::loads::dead::apply_dead_loads;
use crate::loads::prestress::{apply_post_tensioning, apply_pretension, apply_time_dependent};
use crate::loads::{LoadApplicator, OverhangCache};
use crate::options::AnalysisOptions;
use crate::poi::{PoiMap, PointOfInterest};
use crate::status::StatusSink;
use crate::storage::{SegmentCondition, StorageModels, STORAGE_CORRECTION_GROUP};
use crate::structural::StructuralModel;
use crate::types::{BridgeAnalysisType, IntervalIndex, LoadCase, ModelKind, Named, ProductLoad};

/// A built structural model with its layout and overhang loads
pub struct SubModel<M> {
    pub model: M,
    pub topology: ModelTopology,
    pub overhangs: OverhangCache,
}

/// A point of interest resolved for a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedPoi {
    pub poi: PointOfInterest,
    pub id: PoiId,
    /// Girder-line station
    pub x: f64,
    /// Lies at the start of the girder-line coordinate system
    pub at_start: bool,
}

/// Structural models and shared state of one girder line
pub struct GirderLineModel<M = StagedModel> {
    pub(crate) layout: GirderLineLayout,
    pub(crate) options: AnalysisOptions,
    pub(crate) line: GirderLineDescription,
    pub(crate) events: TimelineEvents,
    pub(crate) interval_count: usize,
    pub(crate) simple: Option<SubModel<M>>,
    pub(crate) continuous: Option<SubModel<M>>,
    pub(crate) pois: PoiMap,
    /// Stations in the order model points were created
    pub(crate) poi_stations: Vec<f64>,
    pub(crate) storage: StorageModels<M>,
    pub(crate) combinations: LoadCombinationTable,
    pub(crate) cases: BTreeMap<LoadCase, Vec<String>>,
    /// Live load models and their number of vehicles
    pub(crate) live_loads: BTreeMap<String, usize>,
    pub(crate) external: ExternalLoadings,
}

fn analyze<M: StructuralModel>(model: &mut M, girder_line: usize) -> AnalysisResult<()> {
    model.analyze().map_err(|e| match e {
        FemError::Unstable(reason) => AnalysisError::UnstableStructure {
            girder_line,
            reason,
        },
        other => other.into(),
    })
}

impl<M: StructuralModel> GirderLineModel<M> {
    /// Resolve the layout and the segment models of a girder line; the
    /// structural models are built later
    pub fn new(
        bridge: &dyn BridgeProvider,
        girder_line: usize,
        options: AnalysisOptions,
        status: &dyn StatusSink,
    ) -> AnalysisResult<Self> {
        let layout = GirderLineLayout::new(bridge, girder_line, &options, status)?;
        let storage = StorageModels::build(bridge, &layout, status)?;
        let live_loads = live_load_models(bridge.live_load())
            .into_iter()
            .map(|m| (m.name.clone(), m.vehicles.len()))
            .collect();

        Ok(Self {
            line: bridge.girder_line(girder_line)?.clone(),
            events: bridge.events(),
            interval_count: bridge.interval_count(),
            pois: PoiMap::new(options.tolerance),
            poi_stations: Vec::new(),
            storage,
            combinations: LoadCombinationTable::new(bridge),
            cases: case_groups(bridge),
            live_loads,
            external: ExternalLoadings::default(),
            simple: None,
            continuous: None,
            layout,
            options,
        })
    }

    pub fn girder_line(&self) -> usize {
        self.layout.girder_line
    }

    pub fn layout(&self) -> &GirderLineLayout {
        &self.layout
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn storage(&self) -> &StorageModels<M> {
        &self.storage
    }

    pub fn combinations(&self) -> &LoadCombinationTable {
        &self.combinations
    }

    /// Load groups of each load case, external loadings included
    pub fn case_groups(&self) -> &BTreeMap<LoadCase, Vec<String>> {
        &self.cases
    }

    pub fn sub_model(&self, kind: ModelKind) -> Option<&SubModel<M>> {
        match kind {
            ModelKind::Simple => self.simple.as_ref(),
            ModelKind::Continuous => self.continuous.as_ref(),
        }
    }

    /// Check whether every model an analysis type needs is built
    pub fn is_built(&self, analysis_type: BridgeAnalysisType) -> bool {
        analysis_type
            .models()
            .iter()
            .all(|kind| self.sub_model(*kind).is_some())
    }

    /// Build the models an analysis type needs and that are missing
    pub fn ensure_built(
        &mut self,
        bridge: &dyn BridgeProvider,
        analysis_type: BridgeAnalysisType,
        status: &dyn StatusSink,
    ) -> AnalysisResult<()> {
        for kind in analysis_type.models() {
            if self.sub_model(*kind).is_some() {
                continue;
            }
            let sub = self.build_sub_model(bridge, *kind, status)?;
            match kind {
                ModelKind::Simple => self.simple = Some(sub),
                ModelKind::Continuous => self.continuous = Some(sub),
            }
        }
        Ok(())
    }

    fn build_sub_model(
        &self,
        bridge: &dyn BridgeProvider,
        kind: ModelKind,
        status: &dyn StatusSink,
    ) -> AnalysisResult<SubModel<M>> {
        let girder_line = self.layout.girder_line;
        info!("building {kind:?} model of girder line {girder_line}");

        let mut model = M::with_options(self.options.solver_options(self.events.live_load));
        let topology = build_structure(&mut model, kind, bridge, &self.layout, status)?;
        let mut overhangs = OverhangCache::default();
        {
            let mut applicator =
                LoadApplicator::new(&mut model, &topology, &self.layout, &mut overhangs);
            for product in ProductLoad::all() {
                applicator.declare(product.name())?;
            }
            applicator.declare(STORAGE_CORRECTION_GROUP)?;
            applicator.declare(UNIT_LOAD_GROUP)?;

            apply_dead_loads(&mut applicator, bridge, girder_line, status)?;
            apply_pretension(&mut applicator, &self.line)?;
            apply_post_tensioning(&mut applicator, &self.line, self.interval_count)?;
            apply_time_dependent(&mut applicator, bridge, girder_line)?;
            self.apply_storage_correction(&mut applicator)?;
            applicator.gravity(
                UNIT_LOAD_GROUP,
                self.events.live_load,
                self.layout.start(),
                self.layout.end(),
                1.0,
                1.0,
            )?;
            for loading in self.external.iter() {
                loading.apply_all(&mut applicator)?;
            }
        }

        for live_load in live_load_models(bridge.live_load()) {
            model.add_live_load_model(live_load)?;
        }
        let names: BTreeSet<String> = self.live_loads.keys().cloned().collect();
        self.combinations.register(&mut model, &self.cases, &names)?;

        for x in &self.poi_stations {
            model.add_poi(*x);
        }

        analyze(&mut model, girder_line)?;
        assign_distribution_factors(&mut model, bridge, &self.layout, &topology)?;
        debug!("{kind:?} model of girder line {girder_line} analyzed");

        Ok(SubModel {
            model,
            topology,
            overhangs,
        })
    }

    /// Storage reactions released onto the erected structure
    fn apply_storage_correction(
        &self,
        applicator: &mut LoadApplicator<'_, M>,
    ) -> AnalysisResult<()> {
        let girder = ProductLoad::Girder.name();
        for seg in self.storage.segments() {
            let [ra, rb] = seg.reactions(SegmentCondition::Storage, girder)?;
            let (a, b) = seg.storage_locations;
            let interval = seg.erection_interval;
            applicator.point(STORAGE_CORRECTION_GROUP, interval, a, 0.0, -ra, 0.0)?;
            applicator.point(STORAGE_CORRECTION_GROUP, interval, b, 0.0, -rb, 0.0)?;
        }
        Ok(())
    }

    /// Built model of a kind, as required by an analysis type
    pub(crate) fn require(
        &self,
        kind: ModelKind,
        analysis_type: BridgeAnalysisType,
    ) -> AnalysisResult<&SubModel<M>> {
        self.sub_model(kind).ok_or(AnalysisError::ModelNotBuilt {
            girder_line: self.layout.girder_line,
            analysis_type,
        })
    }

    /// Re-analyze models whose loads changed since they were analyzed
    pub(crate) fn refresh(&mut self) -> AnalysisResult<()> {
        let girder_line = self.layout.girder_line;
        for sub in self.simple.iter_mut().chain(self.continuous.iter_mut()) {
            if !sub.model.is_analyzed() {
                debug!("{:?} model of girder line {girder_line} re-analyzed", sub.topology.kind);
                analyze(&mut sub.model, girder_line)?;
            }
        }
        Ok(())
    }

    /// Model points of a list of points of interest, created in every built
    /// model when they are new
    pub fn map_pois(&mut self, pois: &[PointOfInterest]) -> AnalysisResult<Vec<MappedPoi>> {
        let tol = self.layout.tolerance;
        let start = self.layout.start();
        let mut mapped = Vec::with_capacity(pois.len());
        for poi in pois {
            let x = self.layout.station(poi)?;
            let Self {
                pois: map,
                simple,
                continuous,
                poi_stations,
                ..
            } = &mut *self;
            let id = map.get_or_insert_with(poi, || {
                let mut id = None;
                for sub in simple.iter_mut().chain(continuous.iter_mut()) {
                    let created = sub.model.add_poi(x);
                    debug_assert!(id.map_or(true, |i| i == created));
                    id = Some(created);
                }
                if !poi_stations.iter().any(|s| (s - x).abs() <= tol) {
                    poi_stations.push(x);
                }
                id.ok_or_else(|| {
                    AnalysisError::InvalidInput(
                        "points of interest need a built structural model".into(),
                    )
                })
            })?;
            mapped.push(MappedPoi {
                poi: *poi,
                id,
                x,
                at_start: (x - start).abs() <= tol,
            });
        }
        Ok(mapped)
    }

    /// Point of interest first mapped to a model point id
    pub fn poi(&self, id: PoiId) -> Option<PointOfInterest> {
        self.pois.poi(id)
    }

    /// Every point of interest sharing a model point id
    pub fn pois_at(&self, id: PoiId) -> &[PointOfInterest] {
        self.pois.pois_at(id)
    }

    /// Number of mapped points of interest
    pub fn poi_count(&self) -> usize {
        self.pois.len()
    }

    /// Interval in which a segment is erected
    pub(crate) fn erection_interval(&self, segment: usize) -> AnalysisResult<IntervalIndex> {
        self.layout
            .segments
            .get(segment)
            .map(|s| s.erection_interval)
            .ok_or(AnalysisError::SegmentNotFound(segment))
    }

    /// Create a named loading in an interval
    pub fn create_loading(&mut self, interval: IntervalIndex, name: &str) -> AnalysisResult<()> {
        let reserved = ProductLoad::from_name(name).is_some()
            || name == STORAGE_CORRECTION_GROUP
            || name == UNIT_LOAD_GROUP;
        if reserved {
            return Err(AnalysisError::InvalidInput(format!(
                "'{name}' is a reserved load group"
            )));
        }
        if interval >= self.interval_count {
            return Err(AnalysisError::IntervalNotFound(interval));
        }
        self.external.create(name, interval)?;
        for sub in self.simple.iter_mut().chain(self.continuous.iter_mut()) {
            sub.model.add_load_group(name)?;
        }
        Ok(())
    }

    /// Add a loading to the DC, DW or LL+IM load case
    pub fn add_loading_to_case(&mut self, name: &str, case: LoadCase) -> AnalysisResult<()> {
        for added in self.external.add_to_case(name, case)? {
            self.cases.entry(added).or_default().push(name.to_string());
            for sub in self.simple.iter_mut().chain(self.continuous.iter_mut()) {
                sub.model.add_group_to_case(added.name(), name)?;
            }
        }
        Ok(())
    }

    /// Concentrated force and moment at a point of interest
    pub fn create_concentrated_load(
        &mut self,
        name: &str,
        poi: &PointOfInterest,
        fx: f64,
        fy: f64,
        mz: f64,
    ) -> AnalysisResult<()> {
        let x = self.layout.station(poi)?;
        self.add_external_load(name, ExternalLoad::Concentrated { x, fx, fy, mz })
    }

    /// Uniform load between two points of interest
    pub fn create_uniform_load(
        &mut self,
        name: &str,
        start: &PointOfInterest,
        end: &PointOfInterest,
        wx: f64,
        wy: f64,
    ) -> AnalysisResult<()> {
        let (x1, x2) = self.ordered_stations(start, end)?;
        self.add_external_load(name, ExternalLoad::Uniform { x1, x2, wx, wy })
    }

    /// Initial strain and curvature between two points of interest
    pub fn create_initial_strain(
        &mut self,
        name: &str,
        start: &PointOfInterest,
        end: &PointOfInterest,
        axial_strain: f64,
        curvature: f64,
    ) -> AnalysisResult<()> {
        let (x1, x2) = self.ordered_stations(start, end)?;
        self.add_external_load(
            name,
            ExternalLoad::InitialStrain {
                x1,
                x2,
                axial_strain,
                curvature,
            },
        )
    }

    fn ordered_stations(
        &self,
        start: &PointOfInterest,
        end: &PointOfInterest,
    ) -> AnalysisResult<(f64, f64)> {
        let (a, b) = (self.layout.station(start)?, self.layout.station(end)?);
        Ok(if a <= b { (a, b) } else { (b, a) })
    }

    fn add_external_load(&mut self, name: &str, load: ExternalLoad) -> AnalysisResult<()> {
        let loading = self.external.add(name, load)?.clone();
        for sub in self.simple.iter_mut().chain(self.continuous.iter_mut()) {
            let mut applicator = LoadApplicator::new(
                &mut sub.model,
                &sub.topology,
                &self.layout,
                &mut sub.overhangs,
            );
            loading.apply(&load, &mut applicator)?;
        }
        Ok(())
    }

    /// Check whether a loading exists
    pub fn has_loading(&self, name: &str) -> bool {
        self.external.contains(name)
    }
}
