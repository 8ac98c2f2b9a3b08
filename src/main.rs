use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pipbench_core::{
    classify, render_json, render_table, session_for, Family, HarnessConfig, LogFormat,
    Membership, Registry,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pipbench", version, about = "Benchmark and cross-check point-in-shape predicates")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `pipbench_core=debug`
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    /// Log format (pretty, compact, json)
    #[arg(long, global = true, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered candidates per family
    List,

    /// Time every candidate of a family over the sample grid
    Run {
        #[arg(short, long, value_name = "FAMILY")]
        family: Option<Family>,

        #[arg(short, long, value_name = "N")]
        trials: Option<u64>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Classify the sample grid with every candidate and report disagreements
    Check {
        #[arg(short, long, value_name = "FAMILY")]
        family: Option<Family>,

        /// Treat boundary as inside when comparing
        #[arg(long)]
        collapsed: bool,

        /// Exit with an error when candidates disagree
        #[arg(long)]
        strict: bool,

        /// Maximum number of disagreeing points to print
        #[arg(long, default_value_t = 20, value_name = "N")]
        show: usize,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn setup_logging(config: &HarnessConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match config.logging.format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Compact => subscriber.compact().init(),
        LogFormat::Pretty => subscriber.pretty().init(),
    }
}

fn load_config(cli: &Cli) -> Result<HarnessConfig> {
    let mut config = HarnessConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(&cli)?;
    setup_logging(&config);

    let registry = Registry::builtin();

    match cli.command {
        Command::List => {
            for family in registry.families() {
                println!("{family}");
                for c in registry.discover(family) {
                    println!("  {}", c.name);
                }
            }
        }
        Command::Run {
            family,
            trials,
            format,
        } => {
            if let Some(f) = family {
                config.family = f;
            }
            if let Some(t) = trials {
                config.trials = t;
            }
            config.validate().context("invalid run options")?;

            let shape = config.family.default_shape();
            let points = config.grid.points();
            info!(
                family = %config.family,
                points = points.len(),
                trials = config.trials,
                "starting benchmark"
            );

            let mut session = session_for(&registry, config.family, &shape, &points, config.trials);
            if session.candidates().is_empty() {
                println!("no candidates registered for {}", config.family);
                return Ok(());
            }
            session.run_all();

            let rows = session.rows();
            match format {
                OutputFormat::Text => print!("{}", render_table(&rows)),
                OutputFormat::Json => println!("{}", render_json(&rows).context("failed to encode report")?),
            }
        }
        Command::Check {
            family,
            collapsed,
            strict,
            show,
        } => {
            let family = family.unwrap_or(config.family);
            let mode = if collapsed {
                Membership::Collapsed
            } else {
                Membership::Exact
            };

            let shape = family.default_shape();
            let points = config.grid.points();
            let record = classify(&registry.discover(family), &shape, &points);

            println!("{family}: {} points", record.point_count());
            for (name, counts) in record.summary() {
                println!(
                    "  {name}: inside={} boundary={} outside={}",
                    counts.inside, counts.boundary, counts.outside
                );
            }

            let disagreements = record.disagreements(mode);
            println!("{} disagreeing points ({mode:?})", disagreements.len());
            for &i in disagreements.iter().take(show) {
                let [x, y] = points[i].array;
                let labels: Vec<String> = record
                    .names()
                    .iter()
                    .filter_map(|n| record.get(n, i).map(|c| format!("{n}={c}")))
                    .collect();
                println!("  #{i} ({x}, {y}): {}", labels.join(" "));
            }

            if strict && !disagreements.is_empty() {
                anyhow::bail!("{} points classified inconsistently", disagreements.len());
            }
        }
    }

    Ok(())
}
