//! Persistence of run artifacts as CSV tables and JSON chart/summary files.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use replenish_core::{DailyRecord, ForecastRecord, RecommendationRecord, SkuId};

use crate::charts::{demand_trend, representative_sku, top_stockout_risk};
use crate::pipeline::PipelineRun;
use crate::summary::RunSummary;

/// Number of bars in the stockout risk chart.
pub const TOP_RISK_BARS: usize = 10;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("artifact store lock poisoned")]
    LockPoisoned,
}

/// Files a run produces.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Artifact {
    RawTable,
    ForecastTable,
    Snapshot,
    ToOrder,
    TopRiskChart,
    DemandTrendChart(SkuId),
    Summary,
}

impl Artifact {
    /// Location relative to the output root.
    pub fn relative_path(&self) -> PathBuf {
        match self {
            Artifact::RawTable => PathBuf::from("data/raw/inventory_data_raw.csv"),
            Artifact::ForecastTable => PathBuf::from("data/processed/inventory_data_processed.csv"),
            Artifact::Snapshot => PathBuf::from("outputs/replenishment_snapshot.csv"),
            Artifact::ToOrder => PathBuf::from("outputs/replenishment_recommendations.csv"),
            Artifact::TopRiskChart => PathBuf::from("outputs/figures/top_10_stockout_risk.json"),
            Artifact::DemandTrendChart(sku_id) => {
                PathBuf::from(format!("outputs/figures/demand_trend_{sku_id}.json"))
            }
            Artifact::Summary => PathBuf::from("outputs/run_summary.json"),
        }
    }
}

/// A record type that can be written as a CSV table.
///
/// Headers are written even when the table is empty.
pub trait TableRow: Serialize {
    const HEADERS: &'static [&'static str];
}

impl TableRow for DailyRecord {
    const HEADERS: &'static [&'static str] =
        &["date", "sku_id", "sales", "on_hand", "lead_time_days"];
}

impl TableRow for ForecastRecord {
    const HEADERS: &'static [&'static str] = &[
        "date",
        "sku_id",
        "sales",
        "on_hand",
        "lead_time_days",
        "avg_daily_demand",
        "demand_std",
        "safety_stock",
        "reorder_point",
    ];
}

impl TableRow for RecommendationRecord {
    const HEADERS: &'static [&'static str] = &[
        "date",
        "sku_id",
        "on_hand",
        "lead_time_days",
        "avg_daily_demand",
        "safety_stock",
        "reorder_point",
        "suggested_order_qty",
        "stockout_risk",
    ];
}

pub fn render_csv<T: TableRow>(rows: &[T]) -> Result<Vec<u8>, OutputError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(T::HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| OutputError::Csv(csv::Error::from(e.into_error())))
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, OutputError> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Destination for rendered artifacts.
pub trait ArtifactSink {
    fn put(&self, artifact: &Artifact, bytes: Vec<u8>) -> Result<(), OutputError>;
}

/// Writes artifacts under a root directory, creating parents as needed.
#[derive(Debug, Clone)]
pub struct FsArtifactSink {
    root: PathBuf,
}

impl FsArtifactSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_of(&self, artifact: &Artifact) -> PathBuf {
        self.root.join(artifact.relative_path())
    }
}

impl ArtifactSink for FsArtifactSink {
    fn put(&self, artifact: &Artifact, bytes: Vec<u8>) -> Result<(), OutputError> {
        let path = self.path_of(artifact);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| OutputError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, bytes).map_err(|source| OutputError::Io { path, source })
    }
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryArtifactSink {
    inner: Mutex<BTreeMap<Artifact, Vec<u8>>>,
}

impl InMemoryArtifactSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, artifact: &Artifact) -> Result<Option<Vec<u8>>, OutputError> {
        let map = self.inner.lock().map_err(|_| OutputError::LockPoisoned)?;
        Ok(map.get(artifact).cloned())
    }
}

impl ArtifactSink for InMemoryArtifactSink {
    fn put(&self, artifact: &Artifact, bytes: Vec<u8>) -> Result<(), OutputError> {
        let mut map = self.inner.lock().map_err(|_| OutputError::LockPoisoned)?;
        map.insert(artifact.clone(), bytes);
        Ok(())
    }
}

/// Render and store every artifact of a run. Returns what was written.
pub fn persist<S: ArtifactSink + ?Sized>(
    sink: &S,
    run: &PipelineRun,
    summary: &RunSummary,
) -> Result<Vec<Artifact>, OutputError> {
    let mut written = Vec::new();
    let mut put = |artifact: Artifact, bytes: Vec<u8>| -> Result<(), OutputError> {
        sink.put(&artifact, bytes)?;
        written.push(artifact);
        Ok(())
    };

    put(Artifact::RawTable, render_csv(&run.raw)?)?;
    put(Artifact::ForecastTable, render_csv(&run.forecasts)?)?;
    put(
        Artifact::Snapshot,
        render_csv(&run.recommendations.snapshot)?,
    )?;
    put(
        Artifact::ToOrder,
        render_csv(&run.recommendations.to_order)?,
    )?;
    put(
        Artifact::TopRiskChart,
        render_json(&top_stockout_risk(&run.recommendations, TOP_RISK_BARS))?,
    )?;
    let trend = representative_sku(&run.forecasts)
        .and_then(|sku| demand_trend(&run.forecasts, sku));
    if let Some(trend) = trend {
        put(
            Artifact::DemandTrendChart(trend.sku_id),
            render_json(&trend)?,
        )?;
    }
    put(Artifact::Summary, render_json(summary)?)?;

    info!(
        artifacts = written.len(),
        skus_to_order = summary.skus_to_order,
        "persisted run artifacts"
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn daily() -> DailyRecord {
        DailyRecord {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            sku_id: SkuId::from_index(5),
            sales: 12,
            on_hand: 88,
            lead_time_days: 6,
        }
    }

    #[test]
    fn csv_has_header_and_rendered_ids() {
        let text = String::from_utf8(render_csv(&[daily()]).unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("date,sku_id,sales,on_hand,lead_time_days"));
        assert_eq!(lines.next(), Some("2024-06-03,SKU_005,12,88,6"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_table_still_has_header() {
        let text = String::from_utf8(render_csv::<RecommendationRecord>(&[]).unwrap()).unwrap();
        assert_eq!(
            text.trim_end(),
            "date,sku_id,on_hand,lead_time_days,avg_daily_demand,safety_stock,reorder_point,\
             suggested_order_qty,stockout_risk"
        );
    }

    #[test]
    fn chart_path_embeds_sku() {
        assert_eq!(
            Artifact::DemandTrendChart(SkuId::from_index(1)).relative_path(),
            PathBuf::from("outputs/figures/demand_trend_SKU_001.json")
        );
    }

    #[test]
    fn fs_sink_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path());
        sink.put(&Artifact::RawTable, b"x\n".to_vec()).unwrap();
        let written = fs::read(sink.path_of(&Artifact::RawTable)).unwrap();
        assert_eq!(written, b"x\n");
    }

    #[test]
    fn memory_sink_reports_poisoned_lock() {
        let sink = std::sync::Arc::new(InMemoryArtifactSink::new());
        let holder = std::sync::Arc::clone(&sink);
        let _ = std::thread::spawn(move || {
            let _guard = holder.inner.lock().unwrap();
            panic!("writer died mid-update");
        })
        .join();

        let err = sink.put(&Artifact::Summary, b"{}".to_vec()).unwrap_err();
        assert!(matches!(err, OutputError::LockPoisoned));
        assert!(matches!(sink.get(&Artifact::Summary), Err(OutputError::LockPoisoned)));
    }
}
