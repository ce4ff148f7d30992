//! Configuration types for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest grid a world may allocate (4096 x 4096 cells)
pub const MAX_CELLS: i32 = 4096 * 4096;

/// World configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of cookie eaters placed at start
    pub n_eaters: usize,
    /// Width of the world grid
    pub width: i32,
    /// Height of the world grid
    pub height: i32,
    /// Energy gained by eating one crumb
    pub cookie_value: i32,
    /// Random seed for reproducibility (drawn from entropy when absent)
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            n_eaters: 20,
            width: 10,
            height: 10,
            cookie_value: 5,
            seed: None,
        }
    }
}

impl WorldConfig {
    pub fn from_params(params: &WorldParams, seed: Option<u64>) -> Self {
        Self {
            n_eaters: params.n_eaters,
            width: params.width,
            height: params.height,
            cookie_value: params.cookie_value,
            seed,
        }
    }

    pub fn params(&self) -> WorldParams {
        WorldParams {
            n_eaters: self.n_eaters,
            width: self.width,
            height: self.height,
            cookie_value: self.cookie_value,
        }
    }

    /// Reject degenerate grids before anything is built
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::InvalidConfig(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        match self.width.checked_mul(self.height) {
            Some(cells) if cells <= MAX_CELLS => Ok(()),
            _ => Err(Error::InvalidConfig(format!(
                "grid of {}x{} exceeds the {} cell limit",
                self.width, self.height, MAX_CELLS
            ))),
        }
    }
}

/// The sweepable subset of [`WorldConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldParams {
    pub n_eaters: usize,
    pub width: i32,
    pub height: i32,
    pub cookie_value: i32,
}

/// Either a fixed value or a list of candidates to sweep over.
///
/// A JSON scalar deserializes as a constant, a JSON array as a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValues<T> {
    Constant(T),
    Sweep(Vec<T>),
}

impl<T> ParamValues<T> {
    pub fn values(&self) -> &[T] {
        match self {
            ParamValues::Constant(value) => std::slice::from_ref(value),
            ParamValues::Sweep(values) => values,
        }
    }
}

/// Parameter grid for a batch sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamGrid {
    pub n_eaters: ParamValues<usize>,
    pub width: ParamValues<i32>,
    pub height: ParamValues<i32>,
    pub cookie_value: ParamValues<i32>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            n_eaters: ParamValues::Sweep(vec![10, 20, 40]),
            width: ParamValues::Constant(10),
            height: ParamValues::Constant(10),
            cookie_value: ParamValues::Sweep(vec![2, 5, 8]),
        }
    }
}

impl ParamGrid {
    /// Cartesian product of all parameter values.
    ///
    /// `n_eaters` varies slowest and `cookie_value` fastest.
    pub fn combinations(&self) -> Result<Vec<WorldParams>> {
        check_non_empty("n_eaters", &self.n_eaters)?;
        check_non_empty("width", &self.width)?;
        check_non_empty("height", &self.height)?;
        check_non_empty("cookie_value", &self.cookie_value)?;

        let mut combos = Vec::new();
        for &n_eaters in self.n_eaters.values() {
            for &width in self.width.values() {
                for &height in self.height.values() {
                    for &cookie_value in self.cookie_value.values() {
                        combos.push(WorldParams {
                            n_eaters,
                            width,
                            height,
                            cookie_value,
                        });
                    }
                }
            }
        }
        Ok(combos)
    }
}

fn check_non_empty<T>(name: &str, values: &ParamValues<T>) -> Result<()> {
    if values.values().is_empty() {
        return Err(Error::InvalidConfig(format!(
            "parameter `{}` has an empty sweep list",
            name
        )));
    }
    Ok(())
}

/// Which ticks of each batch run end up in the combined table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionPeriod {
    /// One row per tick
    EveryStep,
    /// Only the final tick
    EndOnly,
    /// Every n-th tick, plus the final tick
    Every(u64),
}

impl CollectionPeriod {
    /// Whether the row for `step` is kept in a run of `last_step` ticks
    pub fn keeps(&self, step: u64, last_step: u64) -> bool {
        match self {
            CollectionPeriod::EveryStep => true,
            CollectionPeriod::EndOnly => step == last_step,
            CollectionPeriod::Every(period) => step % period == 0 || step == last_step,
        }
    }
}

/// Batch sweep configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub params: ParamGrid,
    /// Independent repetitions per parameter combination
    pub iterations: u32,
    /// Ticks per run
    pub max_steps: u64,
    pub collection: CollectionPeriod,
    /// Seed for the per-run seed stream
    pub seed: Option<u64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            params: ParamGrid::default(),
            iterations: 5,
            max_steps: 30,
            collection: CollectionPeriod::EveryStep,
            seed: None,
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::InvalidConfig(
                "sweep needs at least one iteration".to_string(),
            ));
        }
        if self.collection == CollectionPeriod::Every(0) {
            return Err(Error::InvalidConfig(
                "collection period must be at least 1".to_string(),
            ));
        }
        for params in self.params.combinations()? {
            WorldConfig::from_params(&params, None).validate()?;
        }
        Ok(())
    }
}

/// Console output options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Draw the population line chart
    pub chart: bool,
    pub chart_width: u16,
    pub chart_height: u16,
    /// Print the per-tick table
    pub print_rows: bool,
    /// Emit collected rows as JSON instead of a table
    pub json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            chart: true,
            chart_width: 72,
            chart_height: 20,
            print_rows: true,
            json: false,
        }
    }
}

/// Top-level configuration of one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub world: WorldConfig,
    /// Number of ticks for the main run
    pub num_ticks: u64,
    pub output: OutputConfig,
    /// Optional "what if" sweep after the main run
    pub sweep: Option<SweepConfig>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig {
                n_eaters: 40,
                cookie_value: 8,
                ..Default::default()
            },
            num_ticks: 30,
            output: OutputConfig::default(),
            sweep: None,
        }
    }
}

impl RunConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        self.world.validate()?;
        if let Some(sweep) = &self.sweep {
            sweep.validate()?;
        }
        Ok(())
    }
}
