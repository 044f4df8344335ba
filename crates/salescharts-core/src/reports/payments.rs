use polars::prelude::{DataFrame, NamedFrom, Series};
use serde::Serialize;
use sqlx::FromRow;
use tracing::info;

use crate::chart::{ChartSpec, PieChart, Slice};
use crate::db::DbPool;
use crate::error::{ReportError, Result};
use crate::format;
use crate::reports::{ReportKind, ReportOutput};
use crate::theme::Palette;
use crate::warehouse;

pub const NAME: &str = "payment methods";

pub const QUERY: &str = r#"
    SELECT pm.payment_method,
           COUNT(*) AS transactions
    FROM fact_sales f
    JOIN dim_payment pm ON f.payment_key = pm.payment_key
    GROUP BY pm.payment_method
"#;

/// First slice starts at 12 o'clock.
const START_ANGLE: f64 = 90.0;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct PaymentMethodCount {
    /// A NULL method gets its own slice, labelled [`format::NULL_LABEL`].
    pub payment_method: Option<String>,
    pub transactions: i64,
}

pub async fn fetch(pool: &DbPool) -> Result<Vec<PaymentMethodCount>> {
    let rows = warehouse::fetch_rows::<PaymentMethodCount>(pool, QUERY).await?;
    info!(methods = rows.len(), "fetched payment method counts");
    Ok(rows)
}

pub fn frame(rows: &[PaymentMethodCount]) -> Result<DataFrame> {
    if rows.is_empty() {
        return Err(ReportError::EmptyResult { report: NAME });
    }

    let methods: Vec<&str> = rows
        .iter()
        .map(|row| row.payment_method.as_deref().unwrap_or(format::NULL_LABEL))
        .collect();
    let counts: Vec<i64> = rows.iter().map(|row| row.transactions).collect();

    let df = DataFrame::new(vec![
        Series::new("payment_method".into(), methods).into(),
        Series::new("transactions".into(), counts).into(),
    ])?;
    Ok(df)
}

pub fn build(rows: &[PaymentMethodCount]) -> Result<ReportOutput> {
    let frame = frame(rows)?;
    let chart = chart(&frame)?;
    ReportOutput::new(ReportKind::Payments, frame, rows, chart)
}

pub fn chart(df: &DataFrame) -> Result<ChartSpec> {
    let methods = df.column("payment_method")?.str()?;
    let counts = df.column("transactions")?.i64()?;

    let pairs: Vec<(String, f64)> = methods
        .into_iter()
        .zip(counts)
        .map(|(method, count)| {
            (
                method.unwrap_or_default().to_string(),
                count.unwrap_or(0) as f64,
            )
        })
        .collect();

    let total: f64 = pairs.iter().map(|(_, count)| count).sum();
    if total <= 0.0 {
        return Err(ReportError::EmptyResult { report: NAME });
    }

    let slices = pairs
        .into_iter()
        .map(|(label, value)| {
            let percentage = value / total * 100.0;
            Slice {
                label,
                value,
                percentage,
                percent_label: format::percent(percentage, 1),
            }
        })
        .collect();

    Ok(ChartSpec::Pie(PieChart {
        title: "Payment method share".to_string(),
        slices,
        start_angle: START_ANGLE,
        palette: Palette::Pastel,
    }))
}
