use anyhow::{Context, Result};
use clap::Parser;
use hazard_risk_core::{
    BatchDataset, DataQuality, EngineConfig, NoJitter, RiskPipeline, SeededJitter,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// County hazard risk batch runner
#[derive(Parser, Debug)]
#[command(name = "hazard-risk-demo")]
#[command(about = "Score, classify and forecast a batch of counties", long_about = None)]
struct Args {
    /// Dataset JSON file (units, observations, regional weather)
    dataset: PathBuf,

    /// Engine configuration JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for reproducible confidence jitter
    #[arg(short, long)]
    seed: Option<u64>,

    /// Disable confidence jitter entirely
    #[arg(long, conflicts_with = "seed")]
    no_jitter: bool,

    /// Forecast horizon in days (1-5); omit to skip forecasts
    #[arg(short, long)]
    days: Option<u8>,

    /// Print the full report as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let mut pipeline = RiskPipeline::new(&config).context("building pipeline")?;
    if args.no_jitter {
        pipeline = pipeline.with_jitter(Arc::new(NoJitter));
    } else if let Some(seed) = args.seed {
        pipeline = pipeline.with_jitter(Arc::new(SeededJitter::new(seed)));
    }

    let dataset = match BatchDataset::load(&args.dataset) {
        Ok(dataset) => dataset,
        Err(err) => {
            error!(error = %err, "No predictions could be generated");
            return Err(err).with_context(|| {
                format!("no predictions could be generated from {}", args.dataset.display())
            });
        }
    };
    info!(units = dataset.units.len(), "Loaded dataset");

    let units = pipeline.prepare(&dataset);
    let report = pipeline
        .run_batch(&units)
        .context("no predictions could be generated")?;

    let forecasts: Vec<_> = match args.days {
        Some(days) => pipeline
            .forecast_units(&units, Some(days))
            .into_iter()
            .filter_map(|result| result.ok())
            .collect(),
        None => Vec::new(),
    };

    if args.json {
        let output = serde_json::json!({
            "report": report,
            "forecasts": forecasts,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("=== Hazard Risk Report ===\n");
    println!(
        "Thresholds ({:?}, n={}): HIGH >= {:.3}, MEDIUM >= {:.3}, LOW >= {:.3}",
        report.thresholds.methodology,
        report.thresholds.sample_size,
        report.thresholds.high.threshold,
        report.thresholds.medium.threshold,
        report.thresholds.low.threshold,
    );
    println!(
        "Tiers: {} high, {} medium, {} low ({} on fallback inputs)\n",
        report.tier_counts.high,
        report.tier_counts.medium,
        report.tier_counts.low,
        report.fallback_count,
    );

    println!(
        "{:<10} {:<24} {:>6} {:>6} {:<8} {:>6}",
        "Unit", "Name", "Score", "Index", "Level", "Conf"
    );
    for p in &report.predictions {
        println!(
            "{:<10} {:<24} {:>6.3} {:>6} {:<8} {:>5.0}%{}",
            p.unit_id,
            p.name.as_deref().unwrap_or("-"),
            p.risk_score,
            p.composite_index,
            p.risk_level.label,
            p.confidence * 100.0,
            if p.using_fallback { "  (fallback)" } else { "" },
        );
    }

    if !forecasts.is_empty() {
        println!("\n=== Spread Forecasts ===");
        for forecast in &forecasts {
            let quality = match forecast.data_quality {
                DataQuality::Full => "full data",
                DataQuality::Limited => "limited data",
            };
            println!(
                "\n{} ({quality}), peak on day {}, trend {:?}",
                forecast.unit_id, forecast.highest_risk_day, forecast.risk_trend
            );
            for day in &forecast.days {
                println!(
                    "  Day {}: risk {:.2} ({:?}), area {:.1} km², confidence {:.0}%",
                    day.day,
                    day.risk_score,
                    day.risk_level,
                    day.area_km2,
                    day.confidence * 100.0
                );
            }
            for recommendation in &forecast.recommendations {
                println!("  - {recommendation}");
            }
        }
    }

    Ok(())
}
