use anyhow::Result;
use chrono::NaiveDate;

use salescharts_core::chart::ChartSpec;
use salescharts_core::reports::monthly::{self, MonthlySales};
use salescharts_core::ReportError;

fn month(year: i32, month: u32, total_sales: f64) -> MonthlySales {
    MonthlySales {
        month: Some(NaiveDate::from_ymd_opt(year, month, 1).expect("valid month")),
        total_sales,
    }
}

#[test]
fn one_tick_per_observed_month_without_gap_filling() -> Result<()> {
    // March 2023 is missing on purpose.
    let rows = vec![
        month(2023, 1, 1_500_000.0),
        month(2023, 2, 2_250_000.0),
        month(2023, 4, 750_000.0),
        month(2023, 5, 3_000_000.0),
    ];

    let ChartSpec::Line(chart) = monthly::chart(&monthly::frame(&rows)?)? else {
        panic!("monthly report should be a line chart");
    };

    assert_eq!(chart.points.len(), rows.len());
    assert_eq!(chart.tick_labels, ["2023-01", "2023-02", "2023-04", "2023-05"]);
    assert!(chart.drop_lines);

    for (point, row) in chart.points.iter().zip(&rows) {
        assert_eq!(Some(point.date), row.month);
        assert!((point.value - row.total_sales / 1_000_000.0).abs() < 1e-12);
    }
    Ok(())
}

#[test]
fn frame_orders_months_and_adds_millions() -> Result<()> {
    let rows = vec![month(2024, 3, 2_000_000.0), month(2023, 12, 500_000.0)];
    let frame = monthly::frame(&rows)?;

    let millions: Vec<f64> = frame
        .column("total_sales_millions")?
        .f64()?
        .into_no_null_iter()
        .collect();
    assert_eq!(millions, [0.5, 2.0]);

    let ChartSpec::Line(chart) = monthly::chart(&frame)? else {
        panic!("monthly report should be a line chart");
    };
    assert_eq!(chart.tick_labels, ["2023-12", "2024-03"]);
    assert_eq!(chart.value_max(), 2.0);
    Ok(())
}

#[test]
fn no_months_is_an_error() {
    assert!(matches!(
        monthly::frame(&[]),
        Err(ReportError::EmptyResult { .. })
    ));
}

#[test]
fn rows_without_a_month_are_skipped() -> Result<()> {
    let undated = MonthlySales {
        month: None,
        total_sales: 42.0,
    };
    let rows = vec![month(2023, 2, 2_000_000.0), undated.clone(), month(2023, 1, 1_000_000.0)];

    let output = monthly::build(&rows)?;
    assert_eq!(output.frame.height(), 2);
    assert_eq!(output.rows.as_array().map(Vec::len), Some(2));

    let ChartSpec::Line(chart) = &output.chart else {
        panic!("monthly report should be a line chart");
    };
    assert_eq!(chart.tick_labels, ["2023-01", "2023-02"]);

    assert!(matches!(
        monthly::frame(&[undated]),
        Err(ReportError::EmptyResult { .. })
    ));
    Ok(())
}
