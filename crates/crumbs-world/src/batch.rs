//! Batch runs: many independent worlds over a parameter grid.

use crate::world::World;
use crumbs_core::{ModelRow, Result, SweepConfig, WorldConfig, WorldParams};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// One row of the combined batch table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRow {
    pub run_id: usize,
    pub iteration: u32,
    pub seed: u64,
    #[serde(flatten)]
    pub params: WorldParams,
    #[serde(flatten)]
    pub row: ModelRow,
}

/// Run every parameter combination `iterations` times, sequentially.
///
/// Run seeds are drawn from a stream seeded by the sweep seed, so a seeded
/// sweep reproduces exactly.
#[instrument(skip(config), fields(iterations = config.iterations, max_steps = config.max_steps))]
pub fn batch_run(config: &SweepConfig) -> Result<Vec<BatchRow>> {
    config.validate()?;
    let combinations = config.params.combinations()?;

    let sweep_seed = config.seed.unwrap_or_else(rand::random::<u64>);
    let mut seeds = ChaCha8Rng::seed_from_u64(sweep_seed);

    info!(
        sweep_seed,
        combinations = combinations.len(),
        total_runs = combinations.len() * config.iterations as usize,
        "Starting batch run"
    );

    let mut rows = Vec::new();
    let mut run_id = 0;

    for params in &combinations {
        for iteration in 0..config.iterations {
            let seed: u64 = seeds.gen();
            let mut world = World::new(&WorldConfig::from_params(params, Some(seed)))?;
            for _ in 0..config.max_steps {
                world.step();
            }

            let last_step = world.tick();
            let kept = world
                .collector()
                .rows()
                .iter()
                .filter(|row| config.collection.keeps(row.step, last_step));
            rows.extend(kept.map(|row| BatchRow {
                run_id,
                iteration,
                seed,
                params: *params,
                row: *row,
            }));

            debug!(
                run_id,
                iteration,
                seed,
                n_eaters = params.n_eaters,
                cookie_value = params.cookie_value,
                final_population = world.population(),
                "Batch run finished"
            );
            run_id += 1;
        }
    }

    info!(runs = run_id, rows = rows.len(), "Batch run complete");
    Ok(rows)
}

/// Final-population statistics for one parameter combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub params: WorldParams,
    pub runs: usize,
    pub mean_final_population: f64,
    pub min_final_population: usize,
    pub max_final_population: usize,
}

impl SweepSummary {
    fn new(params: WorldParams, final_population: usize) -> Self {
        Self {
            params,
            runs: 1,
            mean_final_population: final_population as f64,
            min_final_population: final_population,
            max_final_population: final_population,
        }
    }

    fn update(&mut self, final_population: usize) {
        let n = self.runs as f64;
        self.mean_final_population =
            (self.mean_final_population * n + final_population as f64) / (n + 1.0);
        self.min_final_population = self.min_final_population.min(final_population);
        self.max_final_population = self.max_final_population.max(final_population);
        self.runs += 1;
    }
}

/// Reduce batch rows to one summary per combination, in first-seen order.
///
/// Each run contributes the population of its last row.
pub fn summarize(rows: &[BatchRow]) -> Vec<SweepSummary> {
    let mut finals: Vec<(usize, WorldParams, usize)> = Vec::new();
    for row in rows {
        match finals.last_mut() {
            Some(last) if last.0 == row.run_id => last.2 = row.row.eaters_left,
            _ => finals.push((row.run_id, row.params, row.row.eaters_left)),
        }
    }

    let mut summaries: Vec<SweepSummary> = Vec::new();
    for (_, params, final_population) in finals {
        match summaries.iter_mut().find(|s| s.params == params) {
            Some(summary) => summary.update(final_population),
            None => summaries.push(SweepSummary::new(params, final_population)),
        }
    }
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crumbs_core::{CollectionPeriod, Error, ParamGrid, ParamValues};
    use std::collections::HashSet;

    fn sweep(collection: CollectionPeriod) -> SweepConfig {
        SweepConfig {
            params: ParamGrid {
                n_eaters: ParamValues::Sweep(vec![5, 15]),
                width: ParamValues::Constant(8),
                height: ParamValues::Constant(8),
                cookie_value: ParamValues::Sweep(vec![1, 6]),
            },
            iterations: 3,
            max_steps: 12,
            collection,
            seed: Some(99),
        }
    }

    #[test]
    fn test_every_step_rows() {
        let rows = batch_run(&sweep(CollectionPeriod::EveryStep)).unwrap();

        // 4 combinations x 3 iterations x 12 steps
        assert_eq!(rows.len(), 144);
        assert_eq!(rows[0].run_id, 0);
        assert_eq!(rows[0].row.step, 1);
        assert_eq!(rows[11].row.step, 12);
        assert_eq!(rows[12].run_id, 1);
        assert_eq!(rows[12].iteration, 1);
        assert_eq!(rows.last().unwrap().run_id, 11);
        assert!(rows.iter().all(|r| r.row.eaters_left <= r.params.n_eaters));
    }

    #[test]
    fn test_end_only_rows() {
        let rows = batch_run(&sweep(CollectionPeriod::EndOnly)).unwrap();

        assert_eq!(rows.len(), 12);
        assert!(rows.iter().all(|r| r.row.step == 12));
        let run_ids: Vec<usize> = rows.iter().map(|r| r.run_id).collect();
        assert_eq!(run_ids, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_periodic_rows() {
        // Every fifth tick of a 12 tick run, plus the final one
        let rows = batch_run(&sweep(CollectionPeriod::Every(5))).unwrap();

        assert_eq!(rows.len(), 36);
        let steps: Vec<u64> = rows.iter().filter(|r| r.run_id == 0).map(|r| r.row.step).collect();
        assert_eq!(steps, vec![5, 10, 12]);

        let every_step = batch_run(&sweep(CollectionPeriod::EveryStep)).unwrap();
        let sampled: Vec<&BatchRow> = every_step
            .iter()
            .filter(|r| r.row.step % 5 == 0 || r.row.step == 12)
            .collect();
        assert_eq!(rows.iter().collect::<Vec<_>>(), sampled);

        let unit = batch_run(&sweep(CollectionPeriod::Every(1))).unwrap();
        assert_eq!(unit, every_step);
    }

    #[test]
    fn test_seeded_sweep_is_reproducible() {
        let first = batch_run(&sweep(CollectionPeriod::EveryStep)).unwrap();
        let second = batch_run(&sweep(CollectionPeriod::EveryStep)).unwrap();
        assert_eq!(first, second);

        let seeds: HashSet<u64> = first.iter().map(|r| r.seed).collect();
        assert_eq!(seeds.len(), 12);
    }

    #[test]
    fn test_rows_match_a_standalone_world() {
        let rows = batch_run(&sweep(CollectionPeriod::EveryStep)).unwrap();
        let first_run: Vec<ModelRow> = rows
            .iter()
            .filter(|r| r.run_id == 0)
            .map(|r| r.row)
            .collect();

        let mut world =
            World::new(&WorldConfig::from_params(&rows[0].params, Some(rows[0].seed))).unwrap();
        for _ in 0..12 {
            world.step();
        }
        assert_eq!(world.collector().rows(), first_run.as_slice());
    }

    #[test]
    fn test_summarize() {
        let rows = batch_run(&sweep(CollectionPeriod::EveryStep)).unwrap();
        let summaries = summarize(&rows);

        assert_eq!(summaries.len(), 4);
        for summary in &summaries {
            assert_eq!(summary.runs, 3);
            assert!(summary.min_final_population <= summary.max_final_population);
            assert!(summary.mean_final_population >= summary.min_final_population as f64);
            assert!(summary.mean_final_population <= summary.max_final_population as f64);
        }
        assert_eq!(summaries[0].params.n_eaters, 5);
        assert_eq!(summaries[0].params.cookie_value, 1);
    }

    #[test]
    fn test_invalid_sweep() {
        let mut config = sweep(CollectionPeriod::EndOnly);
        config.params.width = ParamValues::Sweep(vec![]);
        assert!(matches!(batch_run(&config), Err(Error::InvalidConfig(_))));

        let mut config = sweep(CollectionPeriod::EndOnly);
        config.iterations = 0;
        assert!(batch_run(&config).is_err());

        let config = sweep(CollectionPeriod::Every(0));
        assert!(matches!(batch_run(&config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_batch_row_json_is_flat() {
        let rows = batch_run(&sweep(CollectionPeriod::EndOnly)).unwrap();
        let value = serde_json::to_value(&rows[0]).unwrap();
        assert!(value.get("n_eaters").is_some());
        assert!(value.get("eaters_left").is_some());
        assert!(value.get("params").is_none());
    }
}
