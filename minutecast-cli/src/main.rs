//! Minutecast CLI: feature tables and linear-model fits over minute bars.
//!
//! Commands:
//! - `features`: build the labeled feature table and write it as CSV
//! - `fit`: build features, fit one model, print and save the report
//! - `compare`: fit every model kind over the same split and compare
//! - `synth`: write seeded synthetic minute bars to Parquet
//! - `default-config`: print the default pipeline configuration as TOML

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use minutecast_core::data::{
    parse_timestamp, write_bars_parquet, IngestOptions, DEFAULT_TIMESTAMP_COLUMN,
};
use minutecast_runner::data_loader::{
    generate_synthetic_bars, load, BarSource, LoadedData, SyntheticConfig,
};
use minutecast_runner::export::{
    export_comparison_json, export_json, generate_comparison, save_artifacts, write_features_csv,
};
use minutecast_runner::pipeline::{build_features, run_comparison, run_pipeline, RunReport};
use minutecast_runner::{ModelKind, PipelineConfig, SplitPolicy};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "minutecast",
    about = "Minutecast CLI: minute-bar features and linear regression baselines"
)]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the labeled feature table and write it as CSV.
    Features {
        #[command(flatten)]
        input: InputArgs,

        /// Pipeline TOML; only the [features] section is used.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output CSV path.
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Build features and fit one model.
    Fit {
        #[command(flatten)]
        input: InputArgs,

        /// Pipeline TOML. Flags below override its [fit] section.
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: FitOverrides,

        /// Directory for manifest.json and coefficients.csv.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the full report as JSON instead of a summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Fit every model kind over the same split and compare.
    Compare {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: FitOverrides,

        /// Also write the comparison as JSON to this path.
        #[arg(long)]
        json_out: Option<PathBuf>,
    },
    /// Write seeded synthetic minute bars to Parquet.
    Synth {
        /// Number of 1-minute bars.
        #[arg(long, default_value_t = 10_000)]
        bars: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// First bar timestamp (RFC 3339 or `YYYY-MM-DD HH:MM:SS`, UTC).
        #[arg(long)]
        start: Option<String>,

        /// Output Parquet path.
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Print the default pipeline configuration as TOML.
    DefaultConfig,
}

#[derive(Args)]
struct InputArgs {
    /// Bar file (.parquet or .csv).
    #[arg(long, short, required_unless_present = "synthetic")]
    input: Option<PathBuf>,

    /// Timestamp column name in the input file.
    #[arg(long, default_value = DEFAULT_TIMESTAMP_COLUMN)]
    timestamp_column: String,

    /// Use seeded synthetic bars instead of a file.
    #[arg(long, default_value_t = false, conflicts_with = "input")]
    synthetic: bool,

    /// Synthetic bar count.
    #[arg(long, default_value_t = 10_000)]
    synthetic_bars: usize,

    /// Synthetic generator seed.
    #[arg(long, default_value_t = 42)]
    synthetic_seed: u64,
}

impl InputArgs {
    fn source(&self) -> Result<BarSource> {
        if self.synthetic {
            return Ok(BarSource::Synthetic(SyntheticConfig {
                bars: self.synthetic_bars,
                seed: self.synthetic_seed,
                ..SyntheticConfig::default()
            }));
        }
        let Some(path) = &self.input else {
            bail!("one of --input or --synthetic is required");
        };
        Ok(BarSource::File {
            path: path.clone(),
            options: IngestOptions {
                timestamp_column: self.timestamp_column.clone(),
                format: None,
            },
        })
    }
}

#[derive(Args)]
struct FitOverrides {
    /// Model kind: ols, lasso, ridge or elasticnet.
    #[arg(long)]
    model: Option<String>,

    /// Share of rows held out for testing, in (0, 1).
    #[arg(long)]
    test_fraction: Option<f64>,

    /// Shuffle rows with this seed instead of splitting chronologically.
    #[arg(long)]
    shuffle_seed: Option<u64>,

    #[arg(long)]
    alpha: Option<f64>,

    #[arg(long)]
    l1_ratio: Option<f64>,

    #[arg(long)]
    max_iter: Option<usize>,
}

impl FitOverrides {
    fn apply(&self, config: &mut PipelineConfig) {
        let fit = &mut config.fit;
        if let Some(model) = &self.model {
            fit.model = model.clone();
        }
        if let Some(test_fraction) = self.test_fraction {
            fit.test_fraction = test_fraction;
        }
        if let Some(seed) = self.shuffle_seed {
            fit.split = SplitPolicy::Shuffled { seed };
        }
        if let Some(alpha) = self.alpha {
            fit.params.alpha = alpha;
        }
        if let Some(l1_ratio) = self.l1_ratio {
            fit.params.l1_ratio = l1_ratio;
        }
        if let Some(max_iter) = self.max_iter {
            fit.params.max_iter = max_iter;
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Logs go to stderr so JSON and CSV on stdout stay clean.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Features {
            input,
            config,
            output,
        } => run_features(&input, config, &output),
        Commands::Fit {
            input,
            config,
            overrides,
            output_dir,
            json,
        } => run_fit(&input, config, &overrides, output_dir, json),
        Commands::Compare {
            input,
            config,
            overrides,
            json_out,
        } => run_compare(&input, config, &overrides, json_out),
        Commands::Synth {
            bars,
            seed,
            start,
            output,
        } => run_synth(bars, seed, start.as_deref(), &output),
        Commands::DefaultConfig => {
            print!("{}", PipelineConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<PathBuf>, overrides: Option<&FitOverrides>) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_file(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(overrides) = overrides {
        overrides.apply(&mut config);
    }
    Ok(config)
}

fn load_data(input: &InputArgs) -> Result<LoadedData> {
    let data = load(&input.source()?)?;
    if data.bars.is_empty() {
        bail!("input contains no bars");
    }
    Ok(data)
}

fn run_features(input: &InputArgs, config: Option<PathBuf>, output: &Path) -> Result<()> {
    let config = load_config(config, None)?;
    let data = load_data(input)?;
    let table = build_features(&data.bars, &config.features)?;
    write_features_csv(&table, output)?;
    info!(
        rows = table.len(),
        columns = table.width(),
        path = %output.display(),
        "feature table written"
    );
    println!(
        "{} rows x {} columns written to {}",
        table.len(),
        table.width(),
        output.display()
    );
    Ok(())
}

fn run_fit(
    input: &InputArgs,
    config: Option<PathBuf>,
    overrides: &FitOverrides,
    output_dir: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = load_config(config, Some(overrides))?;
    let data = load_data(input)?;
    let report = run_pipeline(&data, &config)?;

    if json {
        println!("{}", export_json(&report)?);
    } else {
        print_summary(&report);
    }
    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&report, &dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_compare(
    input: &InputArgs,
    config: Option<PathBuf>,
    overrides: &FitOverrides,
    json_out: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config, Some(overrides))?;
    let data = load_data(input)?;
    let report = run_comparison(&data, &config, &ModelKind::ALL)?;

    print!("{}", generate_comparison(&report));
    if let Some(path) = json_out {
        std::fs::write(&path, export_comparison_json(&report)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Comparison saved to: {}", path.display());
    }
    Ok(())
}

fn run_synth(bars: usize, seed: u64, start: Option<&str>, output: &Path) -> Result<()> {
    let mut config = SyntheticConfig {
        bars,
        seed,
        ..SyntheticConfig::default()
    };
    if let Some(start) = start {
        let parsed: DateTime<Utc> =
            parse_timestamp(start).with_context(|| format!("invalid --start '{start}'"))?;
        config.start = parsed;
    }
    let generated = generate_synthetic_bars(&config);
    write_bars_parquet(&generated, output)?;
    println!("{} synthetic bars written to {}", generated.len(), output.display());
    Ok(())
}

fn print_summary(report: &RunReport) {
    let r = &report.result;
    println!("=== Minutecast Fit ===");
    println!("Run ID:        {}", report.run_id.get(..16).unwrap_or(&report.run_id));
    println!(
        "Data:          {} bars, {} rows{}",
        report.bars,
        report.rows,
        if report.synthetic { " (SYNTHETIC)" } else { "" }
    );
    println!("Model:         {}", r.model);
    println!("Split:         {} train / {} test", r.train_rows, r.test_rows);
    println!("Test MSE:      {:.6e}", r.test.mse);
    println!("Test R²:       {:.4}", r.test.r2);
    println!("Train R²:      {:.4}", r.train.r2);
    if let Some(iterations) = r.iterations {
        println!(
            "Iterations:    {iterations}{}",
            if r.converged { "" } else { " (not converged)" }
        );
    }
    println!();
    println!("{:<16} {:>14}", "feature", "coefficient");
    println!("{:<16} {:>14.6e}", "(intercept)", r.intercept);
    for (name, coef) in r.feature_names.iter().zip(&r.coefficients) {
        println!("{name:<16} {coef:>14.6e}");
    }
}
