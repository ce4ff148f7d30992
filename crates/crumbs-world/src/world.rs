//! The world: grid, crumb layer, eater population and the tick protocol.

use crate::agent::{Agent, TurnOutcome};
use crate::collector::DataCollector;
use crate::grid::Grid;
use crate::layer::PropertyLayer;
use crumbs_core::{AgentId, Error, ModelRow, Position, Result, RunSummary, WorldConfig};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument, trace};

/// Name of the crumb property layer
pub const CRUMB_LAYER: &str = "crumbs";
/// Crumbs per cell at start and after regrowth
pub const CRUMBS_PER_CELL: u32 = 1;

const PROGRESS_INTERVAL: u64 = 10;

/// World-owned state an agent may read and mutate during its turn.
///
/// The RNG lives here so that agents only ever draw from the world's
/// seeded stream.
#[derive(Debug, Clone)]
pub struct Environment {
    pub grid: Grid,
    pub crumbs: PropertyLayer,
    pub cookie_value: i32,
    rng: ChaCha8Rng,
}

impl Environment {
    pub fn new(width: i32, height: i32, cookie_value: i32, rng: ChaCha8Rng) -> Self {
        Self {
            grid: Grid::new(width, height),
            crumbs: PropertyLayer::new(CRUMB_LAYER, width, height, CRUMBS_PER_CELL),
            cookie_value,
            rng,
        }
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn random_cell(&mut self) -> Position {
        self.grid.random_cell(&mut self.rng)
    }

    /// Reset one uniformly random cell to a full crumb, whatever it held
    pub fn regrow(&mut self) -> Position {
        let cell = self.random_cell();
        self.crumbs.set(cell, CRUMBS_PER_CELL);
        cell
    }
}

pub struct World {
    env: Environment,
    agents: Vec<Agent>,
    collector: DataCollector,
    seed: u64,
    tick: u64,
    initial_population: usize,
    crumbs_eaten: u64,
    extinction_tick: Option<u64>,
}

impl World {
    pub fn new(config: &WorldConfig) -> Result<Self> {
        config.validate()?;
        let count = u32::try_from(config.n_eaters).map_err(|_| {
            Error::InvalidConfig(format!("too many eaters: {}", config.n_eaters))
        })?;

        let seed = config.seed.unwrap_or_else(rand::random::<u64>);
        let rng = ChaCha8Rng::seed_from_u64(seed);
        let mut env = Environment::new(config.width, config.height, config.cookie_value, rng);

        let mut agents = Vec::with_capacity(config.n_eaters);
        for i in 0..count {
            let id = AgentId(i);
            let cell = env.random_cell();
            env.grid.place_agent(id, cell);
            agents.push(Agent::new(id, cell));
        }

        debug!(
            seed,
            width = config.width,
            height = config.height,
            n_eaters = config.n_eaters,
            cookie_value = config.cookie_value,
            layer = env.crumbs.name(),
            "World created"
        );

        Ok(Self {
            env,
            agents,
            collector: DataCollector::new(),
            seed,
            tick: 0,
            initial_population: config.n_eaters,
            crumbs_eaten: 0,
            extinction_tick: None,
        })
    }

    /// Run the simulation for the specified number of ticks
    #[instrument(skip(self), fields(seed = self.seed))]
    pub fn run(&mut self, ticks: u64) -> &DataCollector {
        info!("Starting run for {} ticks with {} eaters", ticks, self.agents.len());

        for _ in 0..ticks {
            self.step();

            if self.tick % PROGRESS_INTERVAL == 0 {
                info!(
                    tick = self.tick,
                    population = self.agents.len(),
                    crumbs = self.env.crumbs.total(),
                    "Progress"
                );
            }
        }

        self.emit_run_summary();
        &self.collector
    }

    /// Advance the world by one tick
    pub fn step(&mut self) {
        self.tick += 1;

        // Turn order is fixed for the whole tick
        let mut order: Vec<usize> = (0..self.agents.len()).collect();
        order.shuffle(self.env.rng());

        for index in order {
            let agent = &mut self.agents[index];
            let outcome = agent.turn(&mut self.env);
            if outcome.ate() {
                self.crumbs_eaten += 1;
            }
            if let TurnOutcome::Starved { .. } = outcome {
                debug!(
                    event = "eater_starved",
                    agent_id = %agent.id,
                    tick = self.tick,
                    age = agent.age,
                    crumbs_eaten = agent.crumbs_eaten,
                    "Eater starved"
                );
            }
        }

        let regrown = self.env.regrow();
        trace!(tick = self.tick, x = regrown.x, y = regrown.y, "Crumb regrown");

        self.reconcile();

        if self.agents.is_empty() && self.initial_population > 0 && self.extinction_tick.is_none() {
            self.extinction_tick = Some(self.tick);
            info!(tick = self.tick, "All eaters have starved");
        }

        let row = self.model_row();
        self.collector.collect(row);
    }

    /// Drop starved agents from the population and the grid
    fn reconcile(&mut self) {
        let grid = &mut self.env.grid;
        self.agents.retain(|agent| {
            if agent.is_alive() {
                return true;
            }
            grid.remove_agent(agent.id, agent.position);
            false
        });
    }

    /// Evaluate every reporter against the current state
    pub fn model_row(&self) -> ModelRow {
        let eaters_left = self.agents.len();
        let mean_energy = if eaters_left == 0 {
            0.0
        } else {
            self.agents.iter().map(|a| a.energy as f64).sum::<f64>() / eaters_left as f64
        };

        ModelRow {
            step: self.tick,
            eaters_left,
            crumbs_remaining: self.env.crumbs.total(),
            mean_energy,
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.seed,
            ticks: self.tick,
            initial_population: self.initial_population,
            final_population: self.agents.len(),
            peak_energy: self.agents.iter().map(|a| a.energy).max().unwrap_or(0),
            crumbs_eaten: self.crumbs_eaten,
            extinction_tick: self.extinction_tick,
        }
    }

    fn emit_run_summary(&self) {
        let summary = self.summary();
        info!(
            event = "run_summary",
            seed = summary.seed,
            ticks = summary.ticks,
            initial_population = summary.initial_population,
            final_population = summary.final_population,
            survival_rate = format!("{:.1}%", summary.survival_rate() * 100.0),
            crumbs_eaten = summary.crumbs_eaten,
            extinction_tick = ?summary.extinction_tick,
            "Run complete"
        );
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn population(&self) -> usize {
        self.agents.len()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn grid(&self) -> &Grid {
        &self.env.grid
    }

    pub fn crumbs(&self) -> &PropertyLayer {
        &self.env.crumbs
    }

    pub fn collector(&self) -> &DataCollector {
        &self.collector
    }
}
