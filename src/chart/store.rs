//! Per-column statistics and precomputed bins, fixed at construction.

use crate::types::{BinValues, ColumnHeaderStats, ColumnName};
use std::collections::HashMap;

/// Read-only lookup of column statistics and histogram bins
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnStatsStore {
    stats: HashMap<ColumnName, ColumnHeaderStats>,
    bins: HashMap<ColumnName, BinValues>,
}

impl ColumnStatsStore {
    pub fn new(
        stats: HashMap<ColumnName, ColumnHeaderStats>,
        bins: HashMap<ColumnName, BinValues>,
    ) -> Self {
        Self { stats, bins }
    }

    pub fn stats(&self, column: &str) -> Option<&ColumnHeaderStats> {
        self.stats.get(column)
    }

    /// Bins of a column; empty bin lists are reported as absent
    pub fn bins(&self, column: &str) -> Option<&BinValues> {
        self.bins.get(column).filter(|bins| !bins.is_empty())
    }
}
