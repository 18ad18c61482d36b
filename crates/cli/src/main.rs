//! `replenish` — simulate a SKU catalog's sales history and emit
//! replenishment recommendations.
//!
//! ```bash
//! # Defaults: 50 SKUs, 12 weeks, seed 42, z = 1.65, output in ./
//! replenish
//!
//! # Reproducible run anchored to a fixed date
//! replenish --n-skus 200 --anchor-date 2024-06-30 --output-dir out/
//! ```

use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::Parser;

use replenish_core::PipelineConfig;
use replenish_infra::{FsArtifactSink, Pipeline, persist};
use replenish_observability::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "replenish")]
#[command(about = "Inventory replenishment simulation and recommendations")]
#[command(version)]
struct Args {
    /// Number of SKUs to simulate
    #[arg(long, env = "REPLENISH_N_SKUS", default_value_t = 50)]
    n_skus: u32,

    /// Weeks of daily history to simulate
    #[arg(long, env = "REPLENISH_N_WEEKS", default_value_t = 12)]
    n_weeks: u32,

    /// Random seed
    #[arg(long, env = "REPLENISH_SEED", default_value_t = 42)]
    seed: u64,

    /// Service-level z multiplier for safety stock
    #[arg(long, env = "REPLENISH_SERVICE_LEVEL_Z", default_value_t = 1.65)]
    service_level_z: f64,

    /// History ends the day before this date (YYYY-MM-DD); defaults to today (UTC)
    #[arg(long, env = "REPLENISH_ANCHOR_DATE")]
    anchor_date: Option<NaiveDate>,

    /// Root directory for data/ and outputs/
    #[arg(long, env = "REPLENISH_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Log format: json or pretty
    #[arg(long, env = "REPLENISH_LOG_FORMAT", default_value = "json")]
    log_format: LogFormat,
}

impl Args {
    fn config(&self) -> PipelineConfig {
        PipelineConfig {
            n_skus: self.n_skus,
            n_weeks: self.n_weeks,
            seed: self.seed,
            service_level_z: self.service_level_z,
            anchor_date: self.anchor_date,
            ..PipelineConfig::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    replenish_observability::init(args.log_format);

    let pipeline = Pipeline::new(args.config()).context("invalid configuration")?;
    tracing::info!(config = ?pipeline.config(), "starting replenishment pipeline");

    let run = pipeline
        .run(Utc::now().date_naive())
        .context("pipeline run failed")?;
    let summary = pipeline.summarize(&run);

    for failure in &summary.failed_skus {
        tracing::warn!(sku_id = %failure.sku_id, reason = %failure.reason, "sku skipped");
    }

    let sink = FsArtifactSink::new(&args.output_dir);
    persist(&sink, &run, &summary)
        .with_context(|| format!("failed to write artifacts under {}", args.output_dir.display()))?;

    tracing::info!(
        skus_to_order = summary.skus_to_order,
        output = %sink.path_of(&replenish_infra::Artifact::ToOrder).display(),
        "pipeline completed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_catalog() {
        let args = Args::try_parse_from(["replenish"]).unwrap();
        let cfg = args.config();
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(args.log_format, LogFormat::Json);
    }

    #[test]
    fn parses_overrides() {
        let args = Args::try_parse_from([
            "replenish",
            "--n-skus",
            "7",
            "--service-level-z",
            "2.33",
            "--anchor-date",
            "2024-06-30",
            "--log-format",
            "pretty",
        ])
        .unwrap();
        let cfg = args.config();
        assert_eq!(cfg.n_skus, 7);
        assert_eq!(cfg.service_level_z, 2.33);
        assert_eq!(cfg.anchor_date, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(args.log_format, LogFormat::Pretty);
    }

    #[test]
    fn rejects_malformed_date() {
        assert!(Args::try_parse_from(["replenish", "--anchor-date", "30/06/2024"]).is_err());
    }
}
