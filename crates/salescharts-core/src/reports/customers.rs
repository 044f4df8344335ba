//! Customer purchase distribution.
//!
//! Customers are bucketed by their total spend rounded to the cent: every
//! bucket is one exact amount, not a range. Two customers whose totals only
//! coincide after rounding land in the same bucket.

use std::collections::BTreeMap;

use polars::prelude::{DataFrame, NamedFrom, Series};
use serde::Serialize;
use sqlx::FromRow;
use tracing::{debug, info};

use crate::chart::{Bar, BarChart, ChartSpec, Orientation, ValueFormat};
use crate::db::DbPool;
use crate::error::{ReportError, Result};
use crate::format;
use crate::reports::{ReportKind, ReportOutput};
use crate::theme::Palette;
use crate::warehouse;

pub const NAME: &str = "customer distribution";

pub const QUERY: &str = r#"
    SELECT c.customer_id::text AS customer_id,
           SUM(f.quantity * f.price)::double precision AS total_purchased
    FROM fact_sales f
    JOIN dim_customer c ON f.customer_key = c.customer_key
    GROUP BY c.customer_id
    ORDER BY total_purchased DESC
"#;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct CustomerTotal {
    pub customer_id: String,
    pub total_purchased: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub total_purchased: f64,
    pub customers: u32,
    pub percentage: f64,
}

pub async fn fetch(pool: &DbPool) -> Result<Vec<CustomerTotal>> {
    let rows = warehouse::fetch_rows::<CustomerTotal>(pool, QUERY).await?;
    info!(customers = rows.len(), "fetched customer totals");
    Ok(rows)
}

/// Rounds to whole cents. Exact halves go to the even cent, so `10.125`
/// becomes `1012`.
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round_ties_even() as i64
}

pub fn frame(rows: &[CustomerTotal]) -> Result<DataFrame> {
    if rows.is_empty() {
        return Err(ReportError::EmptyResult { report: NAME });
    }

    let ids: Vec<&str> = rows.iter().map(|row| row.customer_id.as_str()).collect();
    let totals: Vec<f64> = rows.iter().map(|row| row.total_purchased).collect();

    let df = DataFrame::new(vec![
        Series::new("customer_id".into(), ids).into(),
        Series::new("total_purchased".into(), totals).into(),
    ])?;
    Ok(df)
}

/// Groups the raw per-customer totals into equal-amount buckets.
///
/// Buckets come out with the most customers first; equal counts are ordered
/// by ascending amount.
pub fn bucket(totals: &DataFrame) -> Result<Vec<Bucket>> {
    let column = totals.column("total_purchased")?.f64()?;

    let mut counts: BTreeMap<i64, u32> = BTreeMap::new();
    for total in column.into_iter().flatten() {
        *counts.entry(to_cents(total)).or_default() += 1;
    }

    let customers: u32 = counts.values().sum();
    if customers == 0 {
        return Err(ReportError::EmptyResult { report: NAME });
    }

    let mut buckets: Vec<(i64, u32)> = counts.into_iter().collect();
    buckets.sort_by(|(cents_a, count_a), (cents_b, count_b)| {
        count_b.cmp(count_a).then(cents_a.cmp(cents_b))
    });
    debug!(buckets = buckets.len(), customers, "bucketed customer totals");

    Ok(buckets
        .into_iter()
        .map(|(cents, count)| Bucket {
            total_purchased: cents as f64 / 100.0,
            customers: count,
            percentage: f64::from(count) / f64::from(customers) * 100.0,
        })
        .collect())
}

pub fn bucket_frame(buckets: &[Bucket]) -> Result<DataFrame> {
    let amounts: Vec<f64> = buckets.iter().map(|b| b.total_purchased).collect();
    let counts: Vec<u32> = buckets.iter().map(|b| b.customers).collect();
    let percentages: Vec<f64> = buckets.iter().map(|b| b.percentage).collect();

    let df = DataFrame::new(vec![
        Series::new("total_purchased".into(), amounts).into(),
        Series::new("customers".into(), counts).into(),
        Series::new("percentage".into(), percentages).into(),
    ])?;
    Ok(df)
}

/// The buckets are the report's rows; the raw per-customer totals are not kept.
pub fn build(rows: &[CustomerTotal]) -> Result<ReportOutput> {
    let buckets = bucket(&frame(rows)?)?;
    let frame = bucket_frame(&buckets)?;
    let chart = chart(&frame)?;
    ReportOutput::new(ReportKind::Customers, frame, &buckets, chart)
}

pub fn chart(buckets: &DataFrame) -> Result<ChartSpec> {
    let amounts = buckets.column("total_purchased")?.f64()?;
    let percentages = buckets.column("percentage")?.f64()?;

    let bars: Vec<Bar> = amounts
        .into_iter()
        .zip(percentages)
        .map(|(amount, percentage)| {
            let value = percentage.unwrap_or(0.0);
            Bar {
                label: format::amount(amount.unwrap_or(0.0)),
                value,
                annotation: format::percent(value, 2),
            }
        })
        .collect();

    if bars.is_empty() {
        return Err(ReportError::EmptyResult { report: NAME });
    }

    let highest = bars.iter().map(|bar| bar.value).fold(0.0, f64::max);

    Ok(ChartSpec::Bar(BarChart {
        title: "Customer distribution by purchase volume".to_string(),
        x_desc: "Total purchased".to_string(),
        y_desc: "Share of customers (%)".to_string(),
        orientation: Orientation::Vertical,
        bars,
        value_format: ValueFormat::Percent,
        value_max: highest + 1.0,
        palette: Palette::Viridis,
        small_annotations: true,
    }))
}
