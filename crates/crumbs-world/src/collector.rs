//! Per-tick data collection.

use crumbs_core::{ModelRow, Reporter, Result};
use serde::{Deserialize, Serialize};

/// Append-only log of model rows, one per tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataCollector {
    rows: Vec<ModelRow>,
}

impl DataCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect(&mut self, row: ModelRow) {
        debug_assert!(
            self.rows.last().map_or(true, |last| last.step < row.step),
            "rows must be collected in tick order"
        );
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ModelRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&ModelRow> {
        self.rows.last()
    }

    /// Row recorded for a given tick
    pub fn get(&self, step: u64) -> Option<&ModelRow> {
        self.rows
            .binary_search_by_key(&step, |row| row.step)
            .ok()
            .map(|index| &self.rows[index])
    }

    /// `(tick, value)` pairs for one reporter
    pub fn series(&self, reporter: Reporter) -> Vec<(u64, f64)> {
        self.rows
            .iter()
            .map(|row| (row.step, reporter.value(row)))
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rows)?)
    }
}
