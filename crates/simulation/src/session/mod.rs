//! Session Aggregator
//!
//! Owns the bounded [`SessionWindow`] of per-tick records. Records are built
//! in full before they are appended and are never modified afterwards; the
//! oldest record is evicted when the window is full.

mod export;
mod summary;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::alerts::Alert;
use crate::classifier::ClassificationResult;
use crate::sample::Sample;
use crate::signal::SignalPlan;

pub use export::{ExportFormat, ExportRow, CSV_HEADER};
pub use summary::{AlertCounts, SessionSummary};

/// Everything one tick produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub sample: Sample,
    pub classification: ClassificationResult,
    pub plan: SignalPlan,
    pub alerts: Vec<Alert>,
}

/// FIFO window of the most recent tick records.
#[derive(Debug, Clone)]
pub struct SessionWindow {
    capacity: usize,
    records: VecDeque<TickRecord>,
    /// Records appended over the window's lifetime, evicted ones included.
    total_recorded: u64,
}

impl SessionWindow {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity.min(4096)),
            total_recorded: 0,
        }
    }

    /// Append one tick's outputs, evicting the oldest record when full.
    pub fn record(
        &mut self,
        sample: Sample,
        classification: ClassificationResult,
        plan: SignalPlan,
        alerts: Vec<Alert>,
    ) {
        self.push(TickRecord {
            sample,
            classification,
            plan,
            alerts,
        });
    }

    /// Append a fully built record.
    pub fn push(&mut self, record: TickRecord) {
        if self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
        self.total_recorded += 1;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }

    /// Number of records dropped by FIFO eviction so far.
    pub fn evicted(&self) -> u64 {
        self.total_recorded - self.records.len() as u64
    }

    /// Records in append order, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &TickRecord> {
        self.records.iter()
    }

    pub fn latest(&self) -> Option<&TickRecord> {
        self.records.back()
    }

    /// Flattened rows in window order.
    pub fn export(&self) -> Vec<ExportRow> {
        self.records.iter().map(ExportRow::from_record).collect()
    }

    /// Serialized export of the current window.
    pub fn export_bytes(&self, format: ExportFormat) -> Vec<u8> {
        export::encode(&self.export(), format)
    }

    /// Aggregate statistics over the current window, computed on demand.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_records(self.records.iter())
    }
}
