use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use hydro_growth::{
    analysis::{reconcile, DeviationSummary, GrowthEngine, SolverStrategy},
    config::AppConfig,
    io,
    logging::{init_logging, LogLevel},
    models::{parse_date, GrowthSeries, GrowthSpec},
    visualization::{
        print_deviation_summary, print_growth_chart, print_growth_table, print_parameter_summary,
        print_phase_table,
    },
};

#[derive(Parser)]
#[command(
    name = "growth-sim",
    about = "Hydroponic growth curve simulator - logistic curves, growth phases and real/predicted tracking",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Parameter solver: fixed-point or bisection (overrides the config file)
    #[arg(long, global = true)]
    solver: Option<SolverStrategy>,

    /// Log level: error, warn, info, debug, trace (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StdoutFormat {
    Table,
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a growth curve and display it
    Simulate {
        /// Cultivar name or id from the catalog (supplies period and weights)
        #[arg(long)]
        cultivar: Option<String>,

        /// Weight at planting, in grams
        #[arg(long)]
        initial: Option<f64>,

        /// Expected harvest weight, in grams
        #[arg(long = "final")]
        final_weight: Option<f64>,

        /// Growth period in days
        #[arg(short, long)]
        days: Option<u32>,

        /// Planting date (YYYY-MM-DD or DD/MM/YYYY), defaults to today
        #[arg(short, long)]
        start: Option<String>,

        /// Write the series to a file (.csv, .json, or .xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// What to print on stdout
        #[arg(short, long, value_enum, default_value = "table")]
        format: StdoutFormat,

        /// Show the text chart
        #[arg(long)]
        chart: bool,
    },

    /// Overlay measured weights onto a saved series
    Reconcile {
        /// Series file (CSV, JSON, or Excel)
        #[arg(short, long)]
        input: PathBuf,

        /// Measurements file (CSV or Excel) with day or date and actual_weight
        #[arg(short, long)]
        actuals: PathBuf,

        /// Where to write the reconciled series (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Confidence level for the deviation interval (0.0-1.0)
        #[arg(long, default_value = "0.95")]
        confidence: f64,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Convert a series between formats
    Convert {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List the cultivar catalog
    Cultivars {
        /// Include cultivars not currently selected for planting
        #[arg(long)]
        all: bool,
    },

    /// Persisted growth records per bench and planting
    #[cfg(feature = "store")]
    Track {
        /// Database path (overrides the config file)
        #[arg(long)]
        db: Option<PathBuf>,

        #[command(subcommand)]
        action: TrackAction,
    },

    /// Write a default configuration file
    InitConfig {
        /// Destination path
        #[arg(short, long, default_value = "growth-sim.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(feature = "store")]
#[derive(clap::Args)]
struct PlantingArgs {
    /// Bench id
    #[arg(short, long)]
    bench: u32,

    /// Cultivar name or id
    #[arg(long)]
    cultivar: String,

    /// Planting date (YYYY-MM-DD or DD/MM/YYYY)
    #[arg(short, long)]
    planted: String,
}

#[cfg(feature = "store")]
#[derive(Subcommand)]
enum TrackAction {
    /// Show stored records, or a fresh simulation when none exist
    Show {
        #[command(flatten)]
        planting: PlantingArgs,

        /// Show the text chart
        #[arg(long)]
        chart: bool,
    },
    /// Store the series for a planting, optionally merging measurements
    Save {
        #[command(flatten)]
        planting: PlantingArgs,

        /// Measurements file (CSV or Excel)
        #[arg(short, long)]
        actuals: Option<PathBuf>,
    },
    /// List stored plantings
    List {
        /// Only this bench
        #[arg(short, long)]
        bench: Option<u32>,
    },
    /// Delete the stored records of a planting
    Delete {
        #[command(flatten)]
        planting: PlantingArgs,
    },
}

fn load_series(path: &Path) -> Result<GrowthSeries> {
    let reader = io::reader_for(path)?;
    reader
        .read(path)
        .with_context(|| format!("failed to read {}", path.display()))
}

fn save_series(series: &GrowthSeries, path: &Path, pretty: bool) -> Result<()> {
    io::writer_for(path, pretty)?
        .write(series, path)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn build_spec(
    config: &AppConfig,
    cultivar: Option<&str>,
    initial: Option<f64>,
    final_weight: Option<f64>,
    days: Option<u32>,
    start: Option<&str>,
) -> Result<GrowthSpec> {
    let start_date = match start {
        Some(s) => parse_date(s)?,
        None => chrono::Local::now().date_naive(),
    };
    let base = match cultivar {
        Some(query) => Some(config.cultivar(query)?.to_spec(start_date)),
        None => None,
    };

    let spec = match (base, initial, final_weight, days) {
        (Some(base), initial, final_weight, days) => GrowthSpec {
            initial_weight: initial.unwrap_or(base.initial_weight),
            final_weight: final_weight.unwrap_or(base.final_weight),
            period_days: days.unwrap_or(base.period_days),
            start_date,
        },
        (None, initial, Some(final_weight), Some(days)) => GrowthSpec::new(
            initial.unwrap_or(hydro_growth::models::DEFAULT_INITIAL_WEIGHT),
            final_weight,
            days,
            start_date,
        ),
        _ => anyhow::bail!("Provide --cultivar, or both --final and --days"),
    };
    Ok(spec)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if let Some(strategy) = cli.solver {
        config.solver.strategy = strategy;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_logging(&config.logging)?;

    let engine = GrowthEngine::new(config.solver.clone());

    match cli.command {
        Commands::Simulate {
            cultivar,
            initial,
            final_weight,
            days,
            start,
            output,
            pretty,
            format,
            chart,
        } => {
            let spec = build_spec(
                &config,
                cultivar.as_deref(),
                initial,
                final_weight,
                days,
                start.as_deref(),
            )?;
            let sim = engine.simulate(&spec)?;

            match format {
                StdoutFormat::Table => {
                    println!(
                        "\n{}",
                        format!(
                            "Growth Simulation: {:.1} g -> {:.1} g in {} days",
                            spec.initial_weight, spec.final_weight, spec.period_days
                        )
                        .bold()
                        .cyan()
                    );
                    print_parameter_summary(&sim);
                    print_phase_table(&sim.series);
                    print_growth_table(&sim.series);
                    if chart {
                        print_growth_chart(&sim.series, sim.parameters().carrying_capacity);
                    }
                    println!();
                }
                StdoutFormat::Csv => print!("{}", io::write_csv_to_string(&sim.series)?),
                StdoutFormat::Json => {
                    let json = if pretty {
                        serde_json::to_string_pretty(&sim)?
                    } else {
                        serde_json::to_string(&sim)?
                    };
                    println!("{json}");
                }
            }

            if !sim.outcome.converged {
                eprintln!(
                    "{}: solver did not converge after {} iterations; curve is approximate",
                    "Warning".yellow(),
                    sim.outcome.iterations
                );
            }

            if let Some(path) = output {
                save_series(&sim.series, &path, pretty)?;
                eprintln!("{} Saved series -> {}", "Success:".green().bold(), path.display());
            }
        }

        Commands::Reconcile {
            input,
            actuals,
            output,
            confidence,
            pretty,
        } => {
            let mut series = load_series(&input)?;
            let rows = io::read_measurements(&actuals)
                .with_context(|| format!("failed to read {}", actuals.display()))?;
            let updates = io::resolve_measurements(&rows, &series)?;
            let applied = reconcile(&mut series, &updates)?;

            println!(
                "\n{}",
                format!("Reconciled {applied} measurements into {}", input.display())
                    .bold()
                    .cyan()
            );
            print_growth_table(&series);
            match DeviationSummary::compute(&series, confidence)? {
                Some(summary) => print_deviation_summary(&summary),
                None => eprintln!("{}: no measured days in series", "Warning".yellow()),
            }
            println!();

            let destination = output.unwrap_or(input);
            save_series(&series, &destination, pretty)?;
            println!(
                "{} Saved series -> {}",
                "Success:".green().bold(),
                destination.display()
            );
        }

        Commands::Convert {
            input,
            output,
            pretty,
        } => {
            let series = load_series(&input)?;
            save_series(&series, &output, pretty)?;
            println!(
                "{} Converted {} -> {}",
                "Success:".green().bold(),
                input.display(),
                output.display()
            );
        }

        Commands::Cultivars { all } => {
            println!("\n{}", "Cultivar Catalog".bold().cyan());
            println!("{}", "=".repeat(60));
            println!(
                "  {:>4}  {:<24} {:>8} {:>12} {:>10}",
                "Id", "Name", "Days", "Harvest (g)", "Start (g)"
            );
            let cultivars: Vec<_> = if all {
                config.cultivars.iter().collect()
            } else {
                config.selected_cultivars().collect()
            };
            for c in cultivars {
                println!(
                    "  {:>4}  {:<24} {:>8} {:>12.1} {:>10.1}",
                    c.id, c.name, c.period_days, c.harvest_weight, c.initial_weight
                );
            }
        }

        #[cfg(feature = "store")]
        Commands::Track { db, action } => {
            let db_path = db.unwrap_or_else(|| config.store.path.clone());
            run_track(&config, &engine, &db_path, action)?;
        }

        Commands::InitConfig { output, force } => {
            if output.exists() && !force {
                anyhow::bail!(
                    "{} already exists; pass --force to overwrite",
                    output.display()
                );
            }
            std::fs::write(&output, AppConfig::default().to_toml_string()?)?;
            println!(
                "{} Wrote default configuration -> {}",
                "Success:".green().bold(),
                output.display()
            );
        }
    }

    Ok(())
}

#[cfg(feature = "store")]
fn run_track(config: &AppConfig, engine: &GrowthEngine, db_path: &Path, action: TrackAction) -> Result<()> {
    use hydro_growth::store::{GrowthStore, SeriesKey};

    let store = GrowthStore::open(db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;

    let resolve = |planting: &PlantingArgs| -> Result<(SeriesKey, GrowthSpec)> {
        let bench = config.bench(planting.bench)?;
        let cultivar = config.cultivar(&planting.cultivar)?;
        let planting_date = parse_date(&planting.planted)?;
        tracing::debug!(bench = %bench.name, cultivar = %cultivar.name, "resolved planting");
        Ok((
            SeriesKey {
                bench_id: bench.id,
                cultivar_id: cultivar.id,
                planting_date,
            },
            cultivar.to_spec(planting_date),
        ))
    };

    match action {
        TrackAction::Show { planting, chart } => {
            let (key, spec) = resolve(&planting)?;
            let stored = store.load_or_generate(&key, &spec, engine)?;
            let origin = if stored.is_loaded() {
                "stored records"
            } else {
                "new simulation"
            };
            println!(
                "\n{}",
                format!(
                    "Bench {} / cultivar {} planted {} ({origin})",
                    key.bench_id,
                    key.cultivar_id,
                    key.planting_date.format("%d/%m/%Y")
                )
                .bold()
                .cyan()
            );
            let series = stored.series();
            print_growth_table(series);
            if chart {
                let capacity = engine.solve(&spec)?.parameters.carrying_capacity;
                print_growth_chart(series, capacity);
            }
            if let Some(summary) = DeviationSummary::compute(series, 0.95)? {
                print_deviation_summary(&summary);
            }
            println!();
        }

        TrackAction::Save { planting, actuals } => {
            let (key, spec) = resolve(&planting)?;
            let mut series = store.load_or_generate(&key, &spec, engine)?.into_series();
            if let Some(path) = actuals {
                let rows = io::read_measurements(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let updates = io::resolve_measurements(&rows, &series)?;
                reconcile(&mut series, &updates)?;
            }
            let written = store.upsert_series(&key, &series)?;
            println!(
                "{} Saved {written} records to {}",
                "Success:".green().bold(),
                db_path.display()
            );
        }

        TrackAction::List { bench } => {
            let plantings = store.list_plantings(bench)?;
            if plantings.is_empty() {
                println!("No stored plantings.");
            }
            for key in plantings {
                let name = config
                    .cultivars
                    .iter()
                    .find(|c| c.id == key.cultivar_id)
                    .map(|c| c.name.as_str())
                    .unwrap_or("?");
                println!(
                    "  bench {:>3}  {:<24} planted {}  ({} records)",
                    key.bench_id,
                    name,
                    key.planting_date.format("%d/%m/%Y"),
                    store.count_records(&key)?
                );
            }
        }

        TrackAction::Delete { planting } => {
            let (key, _) = resolve(&planting)?;
            let removed = store.delete_series(&key)?;
            println!("{} Deleted {removed} records", "Success:".green().bold());
        }
    }
    Ok(())
}
