use polars::prelude::{DataFrame, NamedFrom, Series};
use serde::Serialize;
use sqlx::FromRow;
use tracing::info;

use crate::chart::{Bar, BarChart, ChartSpec, Orientation, ValueFormat};
use crate::db::DbPool;
use crate::error::{ReportError, Result};
use crate::format;
use crate::reports::{ReportKind, ReportOutput};
use crate::theme::Palette;
use crate::warehouse;

pub const NAME: &str = "sales by category";

pub const QUERY: &str = r#"
    SELECT p.category,
           SUM(f.quantity * f.price)::double precision AS total_sales
    FROM fact_sales f
    JOIN dim_product p ON f.product_key = p.product_key
    GROUP BY p.category
    ORDER BY total_sales DESC
"#;

/// Headroom past the longest bar for its annotation.
const VALUE_AXIS_HEADROOM: f64 = 1.2;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct CategorySales {
    /// NULL categories are grouped together and labelled [`format::NULL_LABEL`].
    pub category: Option<String>,
    pub total_sales: f64,
}

pub async fn fetch(pool: &DbPool) -> Result<Vec<CategorySales>> {
    let rows = warehouse::fetch_rows::<CategorySales>(pool, QUERY).await?;
    info!(categories = rows.len(), "fetched sales by category");
    Ok(rows)
}

/// Largest total first. Equal totals keep their query order.
fn largest_first(rows: &[CategorySales]) -> Vec<&CategorySales> {
    let mut sorted: Vec<&CategorySales> = rows.iter().collect();
    sorted.sort_by(|a, b| b.total_sales.total_cmp(&a.total_sales));
    sorted
}

pub fn frame(rows: &[CategorySales]) -> Result<DataFrame> {
    if rows.is_empty() {
        return Err(ReportError::EmptyResult { report: NAME });
    }

    let sorted = largest_first(rows);
    let categories: Vec<&str> = sorted
        .iter()
        .map(|row| row.category.as_deref().unwrap_or(format::NULL_LABEL))
        .collect();
    let totals: Vec<f64> = sorted.iter().map(|row| row.total_sales).collect();

    let df = DataFrame::new(vec![
        Series::new("category".into(), categories).into(),
        Series::new("total_sales".into(), totals).into(),
    ])?;
    Ok(df)
}

pub fn build(rows: &[CategorySales]) -> Result<ReportOutput> {
    let frame = frame(rows)?;
    let chart = chart(&frame)?;
    ReportOutput::new(ReportKind::Category, frame, &largest_first(rows), chart)
}

pub fn chart(df: &DataFrame) -> Result<ChartSpec> {
    let categories = df.column("category")?.str()?;
    let totals = df.column("total_sales")?.f64()?;

    let bars: Vec<Bar> = categories
        .into_iter()
        .zip(totals)
        .map(|(category, total)| {
            let value = total.unwrap_or(0.0);
            Bar {
                label: category.unwrap_or_default().to_string(),
                value,
                annotation: format::thousands(value),
            }
        })
        .collect();

    if bars.is_empty() {
        return Err(ReportError::EmptyResult { report: NAME });
    }

    let largest = bars.iter().map(|bar| bar.value).fold(0.0, f64::max);

    Ok(ChartSpec::Bar(BarChart {
        title: "Total sales by category".to_string(),
        x_desc: "Sales".to_string(),
        y_desc: "Category".to_string(),
        orientation: Orientation::Horizontal,
        bars,
        value_format: ValueFormat::Millions,
        value_max: (largest * VALUE_AXIS_HEADROOM).max(1.0),
        palette: Palette::BluesReversed,
        small_annotations: false,
    }))
}
