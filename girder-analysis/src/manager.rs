//! Per-girder-line model store
//!
//! Models are built the first time a girder line is asked for and kept until
//! the bridge changes. The store is single threaded; a girder line is built
//! and its points of interest are mapped under the same `&mut` borrow.

use std::rc::Rc;

use girder_fem::prelude::StagedModel;
use log::info;

use crate::bridge::BridgeProvider;
use crate::error::{AnalysisError, AnalysisResult};
use crate::model::GirderLineModel;
use crate::options::AnalysisOptions;
use crate::status::{LogStatusSink, StatusSink};
use crate::structural::StructuralModel;
use crate::types::BridgeAnalysisType;

/// Girder-line models of one bridge, indexed by girder line
pub struct GirderModelManager<P, M = StagedModel> {
    bridge: P,
    options: AnalysisOptions,
    status: Rc<dyn StatusSink>,
    models: Vec<Option<GirderLineModel<M>>>,
}

impl<P: BridgeProvider, M: StructuralModel> GirderModelManager<P, M> {
    pub fn new(bridge: P, options: AnalysisOptions) -> Self {
        let count = bridge.girder_line_count();
        Self {
            bridge,
            options,
            status: Rc::new(LogStatusSink),
            models: (0..count).map(|_| None).collect(),
        }
    }

    /// Report status items to `sink` instead of the log
    pub fn with_status_sink(mut self, sink: Rc<dyn StatusSink>) -> Self {
        self.status = sink;
        self
    }

    pub fn bridge(&self) -> &P {
        &self.bridge
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Model of a girder line with every model `analysis_type` needs built
    pub fn ensure_built(
        &mut self,
        girder_line: usize,
        analysis_type: BridgeAnalysisType,
    ) -> AnalysisResult<&mut GirderLineModel<M>> {
        let slot = self
            .models
            .get_mut(girder_line)
            .ok_or(AnalysisError::GirderLineNotFound(girder_line))?;
        if slot.is_none() {
            info!("creating model of girder line {girder_line}");
            *slot = Some(GirderLineModel::new(
                &self.bridge,
                girder_line,
                self.options.clone(),
                self.status.as_ref(),
            )?);
        }
        let model = slot
            .as_mut()
            .ok_or(AnalysisError::GirderLineNotFound(girder_line))?;
        model.ensure_built(&self.bridge, analysis_type, self.status.as_ref())?;
        Ok(model)
    }

    /// Model of a girder line, if it was created
    pub fn model(&self, girder_line: usize) -> Option<&GirderLineModel<M>> {
        self.models.get(girder_line).and_then(Option::as_ref)
    }

    /// Drop every model
    pub fn clear(&mut self) {
        info!("clearing {} girder line models", self.models.len());
        let count = self.bridge.girder_line_count();
        self.models = (0..count).map(|_| None).collect();
    }

    /// Replace the bridge; every model is dropped
    pub fn set_bridge(&mut self, bridge: P) {
        self.bridge = bridge;
        self.clear();
    }
}
