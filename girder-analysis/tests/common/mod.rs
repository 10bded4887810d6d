#![allow(dead_code)]

use girder_analysis::prelude::*;

pub const LIVE_LOAD: IntervalIndex = 5;
pub const ERECTION: IntervalIndex = 2;
pub const STORAGE: IntervalIndex = 1;

pub fn two_span_bridge() -> BridgeDescription {
    BridgeDescription::from_json(include_str!("../data/two_span.json")).unwrap()
}

pub fn manager(bridge: BridgeDescription, options: AnalysisOptions) -> GirderModelManager<BridgeDescription> {
    GirderModelManager::new(bridge, options)
}

/// Points of interest at the tenth points of the span of every segment
pub fn span_points(model: &GirderLineModel) -> Vec<PointOfInterest> {
    model
        .layout()
        .segments
        .iter()
        .flat_map(|s| {
            let offset = s.model_start - s.start;
            let span = s.model_end - s.model_start;
            (0..=10).map(move |k| PointOfInterest::new(s.index, offset + span * k as f64 / 10.0))
        })
        .collect()
}

/// Middle of the first span
pub fn midspan(model: &GirderLineModel) -> PointOfInterest {
    let s = &model.layout().segments[0];
    PointOfInterest::new(0, 0.5 * (s.model_start + s.model_end) - s.start)
}
