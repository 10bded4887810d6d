//! Geometry of a girder line as seen by its structural models
//!
//! The layout is resolved once per girder line from the bridge data and
//! shared by the simple-span and continuous models, so both see the same
//! segments, bearings and stations.

use log::debug;

use crate::bridge::{BridgeProvider, GirderLineDescription, PierConnection};
use crate::error::{AnalysisError, AnalysisResult};
use crate::options::AnalysisOptions;
use crate::poi::PointOfInterest;
use crate::status::{StatusCategory, StatusItem, StatusSink};
use crate::types::{IntervalIndex, SegmentEnd};

/// A segment and the part of it carried by members
#[derive(Debug, Clone)]
pub struct SegmentLayout {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    /// Bearing at the start when the segment starts at a pier
    pub start_bearing: Option<f64>,
    /// Bearing at the end when the segment ends at a pier
    pub end_bearing: Option<f64>,
    /// First modeled station
    pub model_start: f64,
    /// Last modeled station
    pub model_end: f64,
    pub release_interval: IntervalIndex,
    pub storage_interval: IntervalIndex,
    pub erection_interval: IntervalIndex,
    /// Supports carrying the segment when it is erected
    pub erection_supports: Vec<f64>,
}

impl SegmentLayout {
    pub fn contains(&self, x: f64, tol: f64) -> bool {
        x >= self.start - tol && x <= self.end + tol
    }

    /// Modeled boundary at one end
    pub fn model_boundary(&self, end: SegmentEnd) -> f64 {
        match end {
            SegmentEnd::Start => self.model_start,
            SegmentEnd::End => self.model_end,
        }
    }

    /// Outermost erection supports
    pub fn erection_span(&self) -> Option<(f64, f64)> {
        let first = self.erection_supports.first()?;
        let last = self.erection_supports.last()?;
        Some((*first, *last))
    }
}

/// A pier and the bearings under it
#[derive(Debug, Clone)]
pub struct PierLayout {
    pub index: usize,
    pub station: f64,
    pub connection: PierConnection,
    pub back_segment: Option<usize>,
    pub ahead_segment: Option<usize>,
    /// Bearing line of the back girder
    pub back_bearing: Option<f64>,
    /// Bearing line of the ahead girder
    pub ahead_bearing: Option<f64>,
    pub continuity: Option<IntervalIndex>,
}

impl PierLayout {
    /// Girders end at this pier
    pub fn has_girder_ends(&self) -> bool {
        self.connection.has_girder_ends()
    }

    /// Both girders bear on the same line
    pub fn single_bearing_line(&self, tol: f64) -> bool {
        match (self.back_bearing, self.ahead_bearing) {
            (Some(b), Some(a)) => (a - b).abs() <= tol,
            _ => false,
        }
    }
}

/// What connects two consecutive segments
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GapKind {
    /// A pier with girder ends on both sides
    Pier(usize),
    /// A closure joint cast in an interval
    Closure(usize),
    /// Nothing: the segments stay separate
    Open,
}

/// The space between the modeled ends of two consecutive segments
#[derive(Debug, Clone)]
pub struct GapLayout {
    pub after_segment: usize,
    pub start: f64,
    pub end: f64,
    pub kind: GapKind,
}

/// Resolved geometry of one girder line
#[derive(Debug, Clone)]
pub struct GirderLineLayout {
    pub girder_line: usize,
    pub tolerance: f64,
    pub segments: Vec<SegmentLayout>,
    pub piers: Vec<PierLayout>,
    pub gaps: Vec<GapLayout>,
    /// Stations of the temporary supports
    pub temporary_supports: Vec<f64>,
    /// First interval with a segment in place
    pub first_interval: IntervalIndex,
}

impl GirderLineLayout {
    pub fn new(
        bridge: &dyn BridgeProvider,
        girder_line: usize,
        options: &AnalysisOptions,
        status: &dyn StatusSink,
    ) -> AnalysisResult<Self> {
        let line = bridge.girder_line(girder_line)?;
        let tol = options.tolerance;

        let mut segments: Vec<SegmentLayout> = line
            .segments
            .iter()
            .enumerate()
            .map(|(index, s)| SegmentLayout {
                index,
                start: s.start,
                end: s.end,
                start_bearing: None,
                end_bearing: None,
                model_start: s.start,
                model_end: s.end,
                release_interval: s.release_interval,
                storage_interval: s.storage_interval,
                erection_interval: s.erection_interval,
                erection_supports: Vec::new(),
            })
            .collect();

        let n_piers = bridge.piers().len();
        let mut piers = Vec::with_capacity(n_piers);
        for (index, pier) in bridge.piers().iter().enumerate() {
            let mut layout = PierLayout {
                index,
                station: pier.station,
                connection: pier.connection,
                back_segment: None,
                ahead_segment: None,
                back_bearing: None,
                ahead_bearing: None,
                continuity: bridge.continuity_interval(index),
            };

            if !pier.connection.has_girder_ends() {
                let seg = line.segment_at(pier.station).ok_or_else(|| {
                    AnalysisError::InvalidBridge(format!(
                        "pier {index} must lie on a segment of girder line {girder_line}"
                    ))
                })?;
                layout.back_segment = Some(seg);
                layout.ahead_segment = Some(seg);
                piers.push(layout);
                continue;
            }

            let back = if index == 0 {
                None
            } else {
                line.segments.iter().rposition(|s| s.start < pier.station - tol)
            };
            let ahead = if index + 1 == n_piers {
                None
            } else {
                line.segments.iter().position(|s| s.end > pier.station + tol)
            };
            if back.is_some() && back == ahead {
                return Err(AnalysisError::InvalidBridge(format!(
                    "a segment of girder line {girder_line} runs over pier {index}, \
                     which expects girder ends"
                )));
            }

            if let Some(b) = back {
                let seg = &mut segments[b];
                let bearing = pier.station - pier.bearing_offset;
                let bearing = place_bearing(bearing, seg.start, seg.end, tol, || {
                    off_bearing(status, girder_line, b, index)
                });
                let overhang = seg.end - bearing;
                let overlaps = seg.end > pier.station + tol;
                seg.end_bearing = Some(bearing);
                seg.model_end = if !overlaps && options.cantilevers.models(overhang, tol) {
                    seg.end
                } else {
                    bearing
                };
                layout.back_segment = Some(b);
                layout.back_bearing = Some(bearing);
            }
            if let Some(a) = ahead {
                let seg = &mut segments[a];
                let bearing = pier.station + pier.bearing_offset;
                let bearing = place_bearing(bearing, seg.start, seg.end, tol, || {
                    off_bearing(status, girder_line, a, index)
                });
                let overhang = bearing - seg.start;
                let overlaps = seg.start < pier.station - tol;
                seg.start_bearing = Some(bearing);
                seg.model_start = if !overlaps && options.cantilevers.models(overhang, tol) {
                    seg.start
                } else {
                    bearing
                };
                layout.ahead_segment = Some(a);
                layout.ahead_bearing = Some(bearing);
            }
            piers.push(layout);
        }

        let gaps = resolve_gaps(line, &segments, &piers, girder_line)?;

        let temporary_supports: Vec<f64> = bridge
            .temporary_supports()
            .iter()
            .map(|ts| ts.station)
            .collect();

        for (s, seg) in segments.iter_mut().enumerate() {
            let erected = seg.erection_interval;
            let mut supports: Vec<f64> = Vec::new();
            supports.extend(seg.start_bearing);
            supports.extend(seg.end_bearing);
            for pier in &piers {
                if !pier.has_girder_ends() && pier.back_segment == Some(s) {
                    supports.push(pier.station);
                }
            }
            for ts in bridge.temporary_supports() {
                let in_place = ts.installation_interval <= erected
                    && ts.removal_interval.map_or(true, |r| r > erected);
                if in_place && seg.contains(ts.station, tol) {
                    supports.push(ts.station);
                }
            }
            supports.sort_by(f64::total_cmp);
            supports.dedup_by(|a, b| (*a - *b).abs() <= tol);
            seg.erection_supports = supports;
        }

        let first_interval = segments
            .iter()
            .map(|s| s.erection_interval)
            .min()
            .unwrap_or(0);

        debug!(
            "girder line {girder_line}: {} segments, {} piers, {} gaps",
            segments.len(),
            piers.len(),
            gaps.len()
        );

        Ok(Self {
            girder_line,
            tolerance: tol,
            segments,
            piers,
            gaps,
            temporary_supports,
            first_interval,
        })
    }

    /// Station of a point of interest
    pub fn station(&self, poi: &PointOfInterest) -> AnalysisResult<f64> {
        self.segments
            .get(poi.segment)
            .map(|s| s.start + poi.distance)
            .ok_or(AnalysisError::SegmentNotFound(poi.segment))
    }

    /// Point of interest at a station
    pub fn poi_at(&self, x: f64) -> Option<PointOfInterest> {
        self.segment_at(x)
            .map(|s| PointOfInterest::new(s, x - self.segments[s].start))
    }

    /// Segment physically containing a station
    pub fn segment_at(&self, x: f64) -> Option<usize> {
        self.segments
            .iter()
            .position(|s| s.contains(x, self.tolerance))
    }

    /// Start of the girder-line coordinate system
    pub fn start(&self) -> f64 {
        self.segments.first().map_or(0.0, |s| s.model_start)
    }

    pub fn end(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.model_end)
    }

    /// Segment end whose modeled boundary receives load at an unmodeled station
    pub fn transfer_target(&self, x: f64) -> Option<(usize, SegmentEnd)> {
        let tol = self.tolerance;
        if let Some(s) = self.segment_at(x) {
            let seg = &self.segments[s];
            if x < seg.model_start - tol {
                return Some((s, SegmentEnd::Start));
            }
            if x > seg.model_end + tol {
                return Some((s, SegmentEnd::End));
            }
            let mid = 0.5 * (seg.model_start + seg.model_end);
            return Some((s, if x < mid { SegmentEnd::Start } else { SegmentEnd::End }));
        }
        for gap in &self.gaps {
            if x >= gap.start - tol && x <= gap.end + tol {
                let split = match gap.kind {
                    GapKind::Pier(p) => self.piers[p].station,
                    _ => 0.5 * (gap.start + gap.end),
                };
                return Some(if x <= split {
                    (gap.after_segment, SegmentEnd::End)
                } else {
                    (gap.after_segment + 1, SegmentEnd::Start)
                });
            }
        }
        if x < self.start() {
            return Some((0, SegmentEnd::Start));
        }
        self.segments.len().checked_sub(1).map(|s| (s, SegmentEnd::End))
    }
}

fn place_bearing(
    bearing: f64,
    start: f64,
    end: f64,
    tol: f64,
    report: impl FnOnce(),
) -> f64 {
    if bearing < start - tol || bearing > end + tol {
        report();
        bearing.clamp(start, end)
    } else {
        bearing
    }
}

fn off_bearing(status: &dyn StatusSink, girder_line: usize, segment: usize, pier: usize) {
    status.report(StatusItem::information(
        girder_line,
        StatusCategory::SegmentOffBearing,
        format!("segment {segment} does not reach its bearing at pier {pier}"),
    ));
}

fn resolve_gaps(
    line: &GirderLineDescription,
    segments: &[SegmentLayout],
    piers: &[PierLayout],
    girder_line: usize,
) -> AnalysisResult<Vec<GapLayout>> {
    let mut gaps = Vec::new();
    for pair in segments.windows(2) {
        let (back, ahead) = (&pair[0], &pair[1]);
        let pier = piers
            .iter()
            .find(|p| p.back_segment == Some(back.index) && p.ahead_segment == Some(ahead.index));
        let kind = match (pier, line.closure_after(back.index)) {
            (Some(p), _) => GapKind::Pier(p.index),
            (None, Some(_)) => GapKind::Closure(back.index),
            (None, None) => {
                if ahead.start - back.end > 0.0 {
                    return Err(AnalysisError::InvalidBridge(format!(
                        "segments {} and {} of girder line {girder_line} are joined by \
                         neither a pier nor a closure joint",
                        back.index, ahead.index
                    )));
                }
                GapKind::Open
            }
        };
        gaps.push(GapLayout {
            after_segment: back.index,
            start: back.model_end,
            end: ahead.model_start,
            kind,
        });
    }
    Ok(gaps)
}
