//! Run report
//!
//! Accumulates what a source produced, what it dropped, and what went wrong.
//! Recording a warning or failure never aborts the run.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::workunit::MetadataWorkUnit;

/// Shared report state every source carries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceReport {
    /// Total work units handed downstream.
    pub workunits_produced: u64,
    /// Identifiers of every work unit handed downstream, in emission order.
    pub workunit_ids: Vec<String>,
    /// Identifiers of upstream records that produced no entity.
    pub dropped: Vec<String>,
    /// Non-fatal problems, keyed by context label.
    pub warnings: BTreeMap<String, Vec<String>>,
    /// Failures that ended a unit of work, keyed by context label.
    pub failures: BTreeMap<String, Vec<String>>,
}

impl SourceReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a work unit as produced.
    pub fn report_workunit(&mut self, wu: &MetadataWorkUnit) {
        self.workunits_produced += 1;
        self.workunit_ids.push(wu.id.clone());
    }

    /// Record an upstream record that produced no entity.
    pub fn report_dropped(&mut self, id: impl Into<String>) {
        self.dropped.push(id.into());
    }

    /// Record a warning under a context label.
    pub fn report_warning(&mut self, context: impl Into<String>, reason: impl Into<String>) {
        let context = context.into();
        let reason = reason.into();
        warn!(context = %context, reason = %reason, "Source warning");
        self.warnings.entry(context).or_default().push(reason);
    }

    /// Record a failure under a context label.
    pub fn report_failure(&mut self, context: impl Into<String>, reason: impl Into<String>) {
        let context = context.into();
        let reason = reason.into();
        warn!(context = %context, reason = %reason, "Source failure");
        self.failures.entry(context).or_default().push(reason);
    }

    /// Number of warnings across all contexts.
    pub fn warning_count(&self) -> usize {
        self.warnings.values().map(Vec::len).sum()
    }

    /// Number of failures across all contexts.
    pub fn failure_count(&self) -> usize {
        self.failures.values().map(Vec::len).sum()
    }

    /// Whether any failure was recorded.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
