//! Cookie world driver: one run, its chart, and an optional parameter sweep.

mod chart;
mod telemetry;

use anyhow::{Context, Result};
use crumbs_core::{Reporter, RunConfig, RunSummary, SweepConfig};
use crumbs_world::{batch_run, summarize, DataCollector, World};
use tracing::info;

/// Path of an optional JSON config file
const CONFIG_ENV: &str = "CRUMBS_CONFIG";

fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let config = load_config()?;
    info!(
        params = ?config.world.params(),
        seed = ?config.world.seed,
        num_ticks = config.num_ticks,
        "Starting cookie world"
    );

    let mut world = World::new(&config.world).context("failed to build the world")?;
    world.run(config.num_ticks);

    print_summary(&world.summary());

    let output = &config.output;
    if output.json {
        println!("{}", world.collector().to_json()?);
    } else if output.print_rows {
        print_rows(world.collector());
    }

    if output.chart {
        let reporter = Reporter::EatersLeft;
        let series = world.collector().series(reporter);
        println!(
            "{}",
            chart::render(&series, reporter.name(), output.chart_width, output.chart_height)
        );
    }

    match &config.sweep {
        Some(sweep) => run_sweep(sweep, output.json)?,
        None => println!(
            "If you want to run many games at once, add a \"sweep\" section to the file named by {}.",
            CONFIG_ENV
        ),
    }

    Ok(())
}

fn load_config() -> Result<RunConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            info!("Loading configuration from {}", path.to_string_lossy());
            RunConfig::from_json_file(&path)
                .with_context(|| format!("failed to load config from {}", path.to_string_lossy()))
        }
        None => {
            info!("{} not set, using built-in defaults", CONFIG_ENV);
            Ok(RunConfig::default())
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!("Seed:            {}", summary.seed);
    println!("Ticks:           {}", summary.ticks);
    println!(
        "Eaters left:     {} of {} ({:.0}%)",
        summary.final_population,
        summary.initial_population,
        summary.survival_rate() * 100.0
    );
    println!("Crumbs eaten:    {}", summary.crumbs_eaten);
    println!("Peak energy:     {}", summary.peak_energy);
    if let Some(tick) = summary.extinction_tick {
        println!("Extinct at tick: {}", tick);
    }
    println!();
}

fn print_rows(collector: &DataCollector) {
    let names = Reporter::all().map(|r| r.name());
    println!("{:>5}  {:>12}  {:>16}  {:>12}", "Step", names[0], names[1], names[2]);
    for row in collector.rows() {
        println!(
            "{:>5}  {:>12}  {:>16}  {:>12.2}",
            row.step, row.eaters_left, row.crumbs_remaining, row.mean_energy
        );
    }
    println!();
}

fn run_sweep(sweep: &SweepConfig, json: bool) -> Result<()> {
    let rows = batch_run(sweep).context("batch run failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "Batch run: {} rows, {} iterations x {} steps per combination",
        rows.len(),
        sweep.iterations,
        sweep.max_steps
    );
    println!(
        "{:>8}  {:>5}  {:>6}  {:>12}  {:>10}  {:>5}  {:>5}",
        "n_eaters", "width", "height", "cookie_value", "mean_final", "min", "max"
    );
    for summary in summarize(&rows) {
        println!(
            "{:>8}  {:>5}  {:>6}  {:>12}  {:>10.2}  {:>5}  {:>5}",
            summary.params.n_eaters,
            summary.params.width,
            summary.params.height,
            summary.params.cookie_value,
            summary.mean_final_population,
            summary.min_final_population,
            summary.max_final_population
        );
    }
    Ok(())
}
