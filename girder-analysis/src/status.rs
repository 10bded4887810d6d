//! Status reporting for non-fatal modeling conditions
//!
//! The builder reports conditions such as a segment end falling off its
//! bearing to a [`StatusSink`]. Reporting never interrupts the analysis.

use std::cell::RefCell;

use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Severity of a status item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusSeverity {
    Information,
    Warning,
}

/// Kind of condition being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCategory {
    /// A segment end lies beyond its bearing
    SegmentOffBearing,
    /// The haunch is thinner than the minimum allowed
    MinimumHaunch,
    /// A degenerate input was replaced so the model stays solvable
    DegenerateInput,
    /// A support was approximated
    SupportApproximation,
}

/// One reported condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusItem {
    pub girder_line: usize,
    pub category: StatusCategory,
    pub severity: StatusSeverity,
    pub message: String,
}

impl StatusItem {
    pub fn information(girder_line: usize, category: StatusCategory, message: String) -> Self {
        Self {
            girder_line,
            category,
            severity: StatusSeverity::Information,
            message,
        }
    }

    pub fn warning(girder_line: usize, category: StatusCategory, message: String) -> Self {
        Self {
            girder_line,
            category,
            severity: StatusSeverity::Warning,
            message,
        }
    }
}

/// Receiver of status items
pub trait StatusSink {
    fn report(&self, item: StatusItem);
}

/// Forwards status items to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn report(&self, item: StatusItem) {
        match item.severity {
            StatusSeverity::Information => {
                info!("girder line {}: {}", item.girder_line, item.message)
            }
            StatusSeverity::Warning => {
                warn!("girder line {}: {}", item.girder_line, item.message)
            }
        }
    }
}

/// Keeps every status item for later inspection
#[derive(Debug, Default)]
pub struct CollectingStatusSink {
    items: RefCell<Vec<StatusItem>>,
}

impl CollectingStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items reported so far
    pub fn items(&self) -> Vec<StatusItem> {
        self.items.borrow().clone()
    }

    /// Check whether any item of a category was reported
    pub fn contains(&self, category: StatusCategory) -> bool {
        self.items.borrow().iter().any(|i| i.category == category)
    }

    pub fn clear(&self) {
        self.items.borrow_mut().clear();
    }
}

impl StatusSink for CollectingStatusSink {
    fn report(&self, item: StatusItem) {
        self.items.borrow_mut().push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_records_items() {
        let sink = CollectingStatusSink::new();
        sink.report(StatusItem::information(
            0,
            StatusCategory::MinimumHaunch,
            "haunch too thin".to_string(),
        ));
        assert!(sink.contains(StatusCategory::MinimumHaunch));
        assert!(!sink.contains(StatusCategory::SegmentOffBearing));
        assert_eq!(sink.items().len(), 1);
        sink.clear();
        assert!(sink.items().is_empty());
    }
}
