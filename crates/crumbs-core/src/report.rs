//! Reporter rows and run summaries.

use serde::{Deserialize, Serialize};

/// The fixed set of model-level reporters collected every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reporter {
    /// Live population count
    EatersLeft,
    /// Sum of the crumb layer
    CrumbsRemaining,
    /// Mean energy of the live population (0 when empty)
    MeanEnergy,
}

impl Reporter {
    /// Column name used in tables and chart legends
    pub fn name(&self) -> &'static str {
        match self {
            Reporter::EatersLeft => "Eaters_Left",
            Reporter::CrumbsRemaining => "Crumbs_Remaining",
            Reporter::MeanEnergy => "Mean_Energy",
        }
    }

    pub fn value(&self, row: &ModelRow) -> f64 {
        match self {
            Reporter::EatersLeft => row.eaters_left as f64,
            Reporter::CrumbsRemaining => row.crumbs_remaining as f64,
            Reporter::MeanEnergy => row.mean_energy,
        }
    }

    pub fn all() -> [Reporter; 3] {
        [
            Reporter::EatersLeft,
            Reporter::CrumbsRemaining,
            Reporter::MeanEnergy,
        ]
    }
}

/// One collected data point, tagged with its tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelRow {
    pub step: u64,
    pub eaters_left: usize,
    pub crumbs_remaining: u64,
    pub mean_energy: f64,
}

/// End-of-run summary of a single world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Seed actually used, so a run can be replayed
    pub seed: u64,
    pub ticks: u64,
    pub initial_population: usize,
    pub final_population: usize,
    /// Highest energy reached by any eater still alive
    pub peak_energy: i32,
    /// Total crumbs eaten over the run, starved eaters included
    pub crumbs_eaten: u64,
    /// First tick after which nobody was left
    pub extinction_tick: Option<u64>,
}

impl RunSummary {
    /// Fraction of the starting population still alive
    pub fn survival_rate(&self) -> f64 {
        if self.initial_population == 0 {
            return 0.0;
        }
        self.final_population as f64 / self.initial_population as f64
    }
}
