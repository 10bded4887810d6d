//! Bridge data consumed by the engine
//!
//! The engine reads bridge geometry, materials, the timeline and load
//! definitions through [`BridgeProvider`]. [`BridgeDescription`] is a
//! serde-backed provider loaded from JSON.

pub mod description;

use std::fs;
use std::path::Path;

pub use description::*;

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::IntervalIndex;

/// Read-only source of bridge data
pub trait BridgeProvider {
    /// Intervals of the timeline, in order
    fn intervals(&self) -> &[IntervalDescription];

    /// Bridge-wide timeline events
    fn events(&self) -> TimelineEvents;

    /// Piers and abutments ordered by station
    fn piers(&self) -> &[PierDescription];

    fn temporary_supports(&self) -> &[TemporarySupportDescription];

    fn girder_line_count(&self) -> usize;

    fn girder_line(&self, index: usize) -> AnalysisResult<&GirderLineDescription>;

    fn deck(&self) -> Option<&DeckDescription>;

    fn railing(&self) -> &RailingSystem;

    fn overlay(&self) -> Option<&OverlayDescription>;

    /// Construction load per unit deck area
    fn construction_load(&self) -> f64;

    fn user_loads(&self) -> &[UserLoad];

    /// Strain loads from time-step analysis, when one was made
    fn time_dependent(&self) -> Option<&TimeDependentLoads>;

    fn live_load(&self) -> &LiveLoadSettings;

    fn pier(&self, index: usize) -> AnalysisResult<&PierDescription> {
        self.piers()
            .get(index)
            .ok_or(AnalysisError::PierNotFound(index))
    }

    fn temporary_support(&self, index: usize) -> AnalysisResult<&TemporarySupportDescription> {
        self.temporary_supports()
            .get(index)
            .ok_or(AnalysisError::TemporarySupportNotFound(index))
    }

    fn interval_count(&self) -> usize {
        self.intervals().len()
    }

    /// Interval in which continuity is made at a pier, if ever
    fn continuity_interval(&self, pier: usize) -> Option<IntervalIndex> {
        let pier = self.piers().get(pier)?;
        match pier.connection {
            PierConnection::Continuous | PierConnection::Integral => pier
                .continuity_interval
                .or(Some(self.events().deck_casting)),
            PierConnection::IntegralSegment => pier.continuity_interval,
            _ => None,
        }
    }

    /// Index of the span containing a station
    fn span_at(&self, x: f64) -> usize {
        let piers = self.piers();
        let interior = piers.len().saturating_sub(2);
        piers
            .iter()
            .skip(1)
            .take(interior)
            .take_while(|p| x > p.station)
            .count()
    }

    fn span_count(&self) -> usize {
        self.piers().len().saturating_sub(1)
    }
}

impl BridgeProvider for BridgeDescription {
    fn intervals(&self) -> &[IntervalDescription] {
        &self.intervals
    }

    fn events(&self) -> TimelineEvents {
        self.events
    }

    fn piers(&self) -> &[PierDescription] {
        &self.piers
    }

    fn temporary_supports(&self) -> &[TemporarySupportDescription] {
        &self.temporary_supports
    }

    fn girder_line_count(&self) -> usize {
        self.girder_lines.len()
    }

    fn girder_line(&self, index: usize) -> AnalysisResult<&GirderLineDescription> {
        self.girder_lines
            .get(index)
            .ok_or(AnalysisError::GirderLineNotFound(index))
    }

    fn deck(&self) -> Option<&DeckDescription> {
        self.deck.as_ref()
    }

    fn railing(&self) -> &RailingSystem {
        &self.railing
    }

    fn overlay(&self) -> Option<&OverlayDescription> {
        self.overlay.as_ref()
    }

    fn construction_load(&self) -> f64 {
        self.construction_load
    }

    fn user_loads(&self) -> &[UserLoad] {
        &self.user_loads
    }

    fn time_dependent(&self) -> Option<&TimeDependentLoads> {
        self.time_dependent.as_ref()
    }

    fn live_load(&self) -> &LiveLoadSettings {
        &self.live_load
    }
}

impl BridgeDescription {
    /// Parse a bridge from JSON and check it
    pub fn from_json(json: &str) -> AnalysisResult<Self> {
        let bridge: Self = serde_json::from_str(json)?;
        bridge.validate()?;
        Ok(bridge)
    }

    /// Read a bridge from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> AnalysisResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            AnalysisError::InvalidBridge(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> AnalysisResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the description for inconsistencies the engine cannot model
    pub fn validate(&self) -> AnalysisResult<()> {
        let n = self.intervals.len();
        let check = |what: &str, interval: IntervalIndex| {
            if interval < n {
                Ok(())
            } else {
                Err(AnalysisError::InvalidBridge(format!(
                    "{what} refers to interval {interval} but the timeline has {n}"
                )))
            }
        };

        if n == 0 {
            return Err(AnalysisError::InvalidBridge("the timeline is empty".into()));
        }
        let e = self.events;
        for (what, interval) in [
            ("deck casting", e.deck_casting),
            ("composite deck", e.composite_deck),
            ("railing system", e.railing_system),
            ("overlay", e.overlay),
            ("live load", e.live_load),
        ] {
            check(what, interval)?;
        }

        if self.piers.len() < 2 {
            return Err(AnalysisError::InvalidBridge(
                "a bridge needs at least two piers or abutments".into(),
            ));
        }
        if self.piers.windows(2).any(|w| w[1].station <= w[0].station) {
            return Err(AnalysisError::InvalidBridge(
                "piers must be ordered by increasing station".into(),
            ));
        }
        for (i, pier) in self.piers.iter().enumerate() {
            if let Some(interval) = pier.continuity_interval {
                check(&format!("pier {i} continuity"), interval)?;
            }
        }
        for (i, ts) in self.temporary_supports.iter().enumerate() {
            check(&format!("temporary support {i}"), ts.installation_interval)?;
            if let Some(removed) = ts.removal_interval {
                check(&format!("temporary support {i}"), removed)?;
                if removed <= ts.installation_interval {
                    return Err(AnalysisError::InvalidBridge(format!(
                        "temporary support {i} is removed before it is installed"
                    )));
                }
            }
        }

        if self.girder_lines.is_empty() {
            return Err(AnalysisError::InvalidBridge("the bridge has no girders".into()));
        }
        for (g, line) in self.girder_lines.iter().enumerate() {
            if line.segments.is_empty() {
                return Err(AnalysisError::InvalidBridge(format!(
                    "girder line {g} has no segments"
                )));
            }
            for (s, seg) in line.segments.iter().enumerate() {
                if seg.length() <= 0.0 || seg.sections.is_empty() || seg.modulus.is_empty() {
                    return Err(AnalysisError::InvalidBridge(format!(
                        "segment {s} of girder line {g} needs a length, sections and a modulus"
                    )));
                }
                check("segment release", seg.release_interval)?;
                check("segment storage", seg.storage_interval)?;
                check("segment erection", seg.erection_interval)?;
                if !(seg.release_interval <= seg.storage_interval
                    && seg.storage_interval < seg.erection_interval)
                {
                    return Err(AnalysisError::InvalidBridge(format!(
                        "segment {s} of girder line {g} must be released, stored and then erected"
                    )));
                }
            }
            if line.segments.windows(2).any(|w| w[1].start < w[0].end) {
                return Err(AnalysisError::InvalidBridge(format!(
                    "segments of girder line {g} overlap"
                )));
            }
            for closure in &line.closures {
                check("closure joint", closure.interval)?;
                if closure.after_segment + 1 >= line.segments.len() {
                    return Err(AnalysisError::InvalidBridge(format!(
                        "closure after segment {} of girder line {g} has no next segment",
                        closure.after_segment
                    )));
                }
            }
            for tendon in &line.tendons {
                check("tendon stressing", tendon.stressing_interval)?;
            }
        }
        for load in &self.user_loads {
            check("user load", load.interval)?;
        }
        Ok(())
    }
}
