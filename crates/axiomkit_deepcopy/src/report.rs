//! Deep copy report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

/// Aggregate counters and diagnostics for one copy run.
#[derive(Debug, Default, Clone)]
pub struct ReportDeepCopy {
    /// Number of values routed through the traversal engine.
    pub cnt_visited: u64,
    /// Number of distinct shared allocations that received a new copy.
    pub cnt_allocated: u64,
    /// Number of references resolved to an already produced copy.
    pub cnt_shared_hits: u64,
    /// Number of opaque handles and raw addresses passed through unchanged.
    pub cnt_passthrough: u64,
    /// Deepest composite/reference nesting reached.
    pub n_depth_max: usize,
    /// Non-fatal warnings collected during the run.
    pub warnings: Vec<String>,
}

impl ReportDeepCopy {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_visited".to_string(), self.cnt_visited);
        dict_counts.insert("cnt_allocated".to_string(), self.cnt_allocated);
        dict_counts.insert("cnt_shared_hits".to_string(), self.cnt_shared_hits);
        dict_counts.insert("cnt_passthrough".to_string(), self.cnt_passthrough);
        dict_counts.insert("n_depth_max".to_string(), self.n_depth_max as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} visited={} allocated={} shared_hits={} passthrough={} depth_max={} warnings={}",
            dict_counts["cnt_visited"],
            dict_counts["cnt_allocated"],
            dict_counts["cnt_shared_hits"],
            dict_counts["cnt_passthrough"],
            dict_counts["n_depth_max"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportDeepCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[DEEPCOPY]"))
    }
}

/// Mutable accumulator for copy statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportDeepCopyBuilder {
    /// See [`ReportDeepCopy::cnt_visited`].
    pub cnt_visited: u64,
    /// See [`ReportDeepCopy::cnt_allocated`].
    pub cnt_allocated: u64,
    /// See [`ReportDeepCopy::cnt_shared_hits`].
    pub cnt_shared_hits: u64,
    /// See [`ReportDeepCopy::cnt_passthrough`].
    pub cnt_passthrough: u64,
    /// See [`ReportDeepCopy::n_depth_max`].
    pub n_depth_max: usize,
    /// See [`ReportDeepCopy::warnings`].
    pub warnings: Vec<String>,
}

impl ReportDeepCopyBuilder {
    pub fn add_visited(&mut self) {
        self.cnt_visited += 1;
    }

    pub fn add_allocated(&mut self) {
        self.cnt_allocated += 1;
    }

    pub fn add_shared_hit(&mut self) {
        self.cnt_shared_hits += 1;
    }

    pub fn add_passthrough(&mut self) {
        self.cnt_passthrough += 1;
    }

    /// Raise the recorded maximum depth if `n_depth` is deeper.
    pub fn observe_depth(&mut self, n_depth: usize) {
        self.n_depth_max = self.n_depth_max.max(n_depth);
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Fold another run's counters into this one.
    pub fn merge(&mut self, other: &ReportDeepCopy) {
        self.cnt_visited += other.cnt_visited;
        self.cnt_allocated += other.cnt_allocated;
        self.cnt_shared_hits += other.cnt_shared_hits;
        self.cnt_passthrough += other.cnt_passthrough;
        self.n_depth_max = self.n_depth_max.max(other.n_depth_max);
        self.warnings.extend(other.warnings.iter().cloned());
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportDeepCopy {
        ReportDeepCopy {
            cnt_visited: self.cnt_visited,
            cnt_allocated: self.cnt_allocated,
            cnt_shared_hits: self.cnt_shared_hits,
            cnt_passthrough: self.cnt_passthrough,
            n_depth_max: self.n_depth_max,
            warnings: self.warnings,
        }
    }
}
