use chrono::NaiveDate;
use polars::prelude::{DataFrame, NamedFrom, Series};
use serde::Serialize;
use sqlx::FromRow;
use tracing::{info, warn};

use crate::chart::{ChartSpec, LineChart, LinePoint};
use crate::db::DbPool;
use crate::error::{ReportError, Result};
use crate::reports::{ReportKind, ReportOutput};
use crate::theme::{Palette, ROYAL_BLUE};
use crate::warehouse;

pub const NAME: &str = "monthly sales";

pub const QUERY: &str = r#"
    SELECT DATE_TRUNC('month', d.invoice_date)::date AS month,
           SUM(f.quantity * f.price)::double precision AS total_sales
    FROM fact_sales f
    JOIN dim_date d ON f.date_key = d.date_key
    GROUP BY month
    ORDER BY month
"#;

pub const MILLION: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct MonthlySales {
    /// NULL when the invoice date is missing. Such rows cannot be placed on
    /// the time axis and are left out of the frame.
    pub month: Option<NaiveDate>,
    pub total_sales: f64,
}

pub async fn fetch(pool: &DbPool) -> Result<Vec<MonthlySales>> {
    let rows = warehouse::fetch_rows::<MonthlySales>(pool, QUERY).await?;
    info!(months = rows.len(), "fetched monthly sales");
    Ok(rows)
}

/// Frames the rows in ascending month order with the total also expressed in
/// millions. Rows without a month are dropped.
pub fn frame(rows: &[MonthlySales]) -> Result<DataFrame> {
    let mut dated: Vec<(NaiveDate, f64)> = rows
        .iter()
        .filter_map(|row| row.month.map(|month| (month, row.total_sales)))
        .collect();

    let undated = rows.len() - dated.len();
    if undated > 0 {
        let total: f64 = rows
            .iter()
            .filter(|row| row.month.is_none())
            .map(|row| row.total_sales)
            .sum();
        warn!(rows = undated, total_sales = total, "skipping sales without a month");
    }

    if dated.is_empty() {
        return Err(ReportError::EmptyResult { report: NAME });
    }
    dated.sort_by_key(|(month, _)| *month);

    let months: Vec<NaiveDate> = dated.iter().map(|(month, _)| *month).collect();
    let totals: Vec<f64> = dated.iter().map(|(_, total)| *total).collect();
    let millions: Vec<f64> = totals.iter().map(|total| total / MILLION).collect();

    let df = DataFrame::new(vec![
        Series::new("month".into(), months).into(),
        Series::new("total_sales".into(), totals).into(),
        Series::new("total_sales_millions".into(), millions).into(),
    ])?;
    Ok(df)
}

pub fn build(rows: &[MonthlySales]) -> Result<ReportOutput> {
    let frame = frame(rows)?;
    let chart = chart(&frame)?;
    let mut dated: Vec<&MonthlySales> = rows.iter().filter(|row| row.month.is_some()).collect();
    dated.sort_by_key(|row| row.month);
    ReportOutput::new(ReportKind::Monthly, frame, &dated, chart)
}

pub fn chart(df: &DataFrame) -> Result<ChartSpec> {
    let months = df.column("month")?.date()?;
    let millions = df.column("total_sales_millions")?.f64()?;

    let points: Vec<LinePoint> = months
        .as_date_iter()
        .zip(millions)
        .filter_map(|(month, value)| {
            Some(LinePoint {
                date: month?,
                value: value.unwrap_or(0.0),
            })
        })
        .collect();

    if points.is_empty() {
        return Err(ReportError::EmptyResult { report: NAME });
    }

    let tick_labels = points
        .iter()
        .map(|point| point.date.format("%Y-%m").to_string())
        .collect();

    Ok(ChartSpec::Line(LineChart {
        title: "Monthly sales trend".to_string(),
        x_desc: "Month".to_string(),
        y_desc: "Sales (millions)".to_string(),
        points,
        tick_labels,
        drop_lines: true,
        palette: Palette::Solid(ROYAL_BLUE),
    }))
}
