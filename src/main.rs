use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use u_timetable::ga::GaConfig;
use u_timetable::scheduler::{ScheduleRequest, TimetableScheduler};

#[derive(Debug, Parser)]
#[command(name = "u-timetable", about = "Evolve a weekly timetable from a JSON request")]
struct Args {
    /// Path to the schedule request JSON (input, ga, weights)
    #[arg(long)]
    input: PathBuf,

    /// Where to write the result JSON (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,

    /// RNG seed, overrides the request
    #[arg(long)]
    seed: Option<u64>,

    /// Generation count, overrides the request
    #[arg(long)]
    generations: Option<usize>,

    /// Population size, overrides the request
    #[arg(long)]
    population: Option<usize>,

    /// Start from the larger search preset instead of the request's GA block
    #[arg(long)]
    enhanced: bool,

    /// Apply GA_* environment variables on top of the request
    #[arg(long)]
    env: bool,

    /// Write the per-batch day/slot view instead of the full result
    #[arg(long)]
    view: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let bytes = fs::read(&args.input)
        .with_context(|| format!("failed to read request: {:?}", args.input))?;
    let mut request: ScheduleRequest =
        serde_json::from_slice(&bytes).context("failed to parse request JSON")?;

    if args.enhanced {
        request.ga = GaConfig::enhanced();
    }
    if args.env {
        request.ga = request
            .ga
            .overlay(|key| std::env::var(key).ok())
            .context("failed to apply GA_* environment")?;
    }
    if let Some(seed) = args.seed {
        request.ga.seed = Some(seed);
    }
    if let Some(generations) = args.generations {
        request.ga.max_generations = generations;
    }
    if let Some(population) = args.population {
        request.ga.population_size = population;
    }

    let output = TimetableScheduler::schedule(&request).context("scheduling failed")?;
    info!(
        "Best fitness {:.1} after {} generation(s), {} class(es) placed",
        output.timetable.fitness,
        output.generations,
        output.timetable.entry_count()
    );

    let json = if args.view {
        serde_json::to_string_pretty(&output.timetable.view(&request.input.constraints))?
    } else {
        serde_json::to_string_pretty(&output)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write result: {path:?}"))?;
            info!("Result written to {path:?}");
        }
        None => println!("{json}"),
    }
    Ok(())
}
