//! The four warehouse reports.
//!
//! Each report is one query, a small frame transform and a chart. They share
//! nothing but the connection and always run in [`ReportKind::ALL`] order.

pub mod category;
pub mod customers;
pub mod monthly;
pub mod payments;

use std::fs::{self, File};
use std::path::PathBuf;
use std::str::FromStr;

use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use serde::Serialize;
use tracing::info;

use crate::chart::ChartSpec;
use crate::config::RenderConfig;
use crate::db::DbPool;
use crate::error::Result;
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Category,
    Customers,
    Payments,
    Monthly,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::Category,
        ReportKind::Customers,
        ReportKind::Payments,
        ReportKind::Monthly,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::Category => "category",
            ReportKind::Customers => "customers",
            ReportKind::Payments => "payments",
            ReportKind::Monthly => "monthly",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Category => category::NAME,
            ReportKind::Customers => customers::NAME,
            ReportKind::Payments => payments::NAME,
            ReportKind::Monthly => monthly::NAME,
        }
    }

    /// 1-based position in the fixed run order.
    pub fn position(&self) -> usize {
        match self {
            ReportKind::Category => 1,
            ReportKind::Customers => 2,
            ReportKind::Payments => 3,
            ReportKind::Monthly => 4,
        }
    }

    /// `01_category`, `02_customers`, ...
    pub fn file_stem(&self) -> String {
        format!("{:02}_{}", self.position(), self.slug())
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(slug: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_slug(slug).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(|kind| kind.slug()).collect();
            format!("unknown report '{slug}' (expected one of: {})", known.join(", "))
        })
    }
}

/// Puts a selection into run order and drops repeats. An empty selection
/// means every report.
pub fn run_order(selected: &[ReportKind]) -> Vec<ReportKind> {
    if selected.is_empty() {
        return ReportKind::ALL.to_vec();
    }
    let mut kinds = selected.to_vec();
    kinds.sort();
    kinds.dedup();
    kinds
}

#[derive(Debug, Clone)]
pub struct ReportOutput {
    pub kind: ReportKind,
    /// The table behind the chart, after the transform stage.
    pub frame: DataFrame,
    /// The report's typed rows serialized as a JSON array, one object per row.
    pub rows: serde_json::Value,
    pub chart: ChartSpec,
}

#[derive(Debug, Clone, Default)]
pub struct WrittenFiles {
    pub chart: PathBuf,
    pub csv: Option<PathBuf>,
}

impl ReportOutput {
    pub(crate) fn new<T: Serialize>(
        kind: ReportKind,
        frame: DataFrame,
        rows: &[T],
        chart: ChartSpec,
    ) -> Result<Self> {
        Ok(Self {
            kind,
            frame,
            rows: serde_json::to_value(rows)?,
            chart,
        })
    }

    pub fn write(&mut self, config: &RenderConfig) -> Result<WrittenFiles> {
        fs::create_dir_all(&config.output_dir)?;
        let stem = self.kind.file_stem();

        let chart_path = config.output_dir.join(format!("{stem}.svg"));
        render::render_svg(&self.chart, &chart_path, config.size())?;
        info!(report = self.kind.slug(), path = %chart_path.display(), "wrote chart");

        let csv = if config.write_csv {
            let csv_path = config.output_dir.join(format!("{stem}.csv"));
            let mut file = File::create(&csv_path)?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut self.frame)?;
            info!(report = self.kind.slug(), path = %csv_path.display(), "wrote table");
            Some(csv_path)
        } else {
            None
        };

        Ok(WrittenFiles {
            chart: chart_path,
            csv,
        })
    }
}

/// Fetch, transform and chart one report.
pub async fn run(pool: &DbPool, kind: ReportKind) -> Result<ReportOutput> {
    info!(report = kind.slug(), "running report");
    match kind {
        ReportKind::Category => category::build(&category::fetch(pool).await?),
        ReportKind::Customers => customers::build(&customers::fetch(pool).await?),
        ReportKind::Payments => payments::build(&payments::fetch(pool).await?),
        ReportKind::Monthly => monthly::build(&monthly::fetch(pool).await?),
    }
}

/// Runs the selected reports one after another on the shared connection.
pub async fn run_all(pool: &DbPool, selected: &[ReportKind]) -> Result<Vec<ReportOutput>> {
    let mut outputs = Vec::new();
    for kind in run_order(selected) {
        outputs.push(run(pool, kind).await?);
    }
    Ok(outputs)
}
