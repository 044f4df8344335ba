use anyhow::Result;
use polars::prelude::*;

use salescharts_core::chart::{ChartSpec, Orientation};
use salescharts_core::format::NULL_LABEL;
use salescharts_core::reports::category::{self, CategorySales};
use salescharts_core::reports::ReportKind;
use salescharts_core::ReportError;

fn row(category: &str, total_sales: f64) -> CategorySales {
    CategorySales {
        category: Some(category.to_string()),
        total_sales,
    }
}

#[test]
fn electronics_and_books_render_in_descending_order() -> Result<()> {
    let rows = vec![row("Electronics", 5_000_000.0), row("Books", 1_000_000.0)];

    let frame = category::frame(&rows)?;
    let categories: Vec<&str> = frame.column("category")?.str()?.into_no_null_iter().collect();
    let totals: Vec<f64> = frame
        .column("total_sales")?
        .f64()?
        .into_no_null_iter()
        .collect();
    assert_eq!(categories, ["Electronics", "Books"]);
    assert_eq!(totals, [5_000_000.0, 1_000_000.0]);

    let ChartSpec::Bar(chart) = category::chart(&frame)? else {
        panic!("category report should be a bar chart");
    };
    assert_eq!(chart.orientation, Orientation::Horizontal);

    let annotations: Vec<&str> = chart.bars.iter().map(|bar| bar.annotation.as_str()).collect();
    assert_eq!(annotations, ["5,000,000", "1,000,000"]);

    let values: Vec<f64> = chart.bars.iter().map(|bar| bar.value).collect();
    assert_eq!(chart.value_tick_labels(&values), ["5.0M", "1.0M"]);
    Ok(())
}

#[test]
fn unsorted_rows_are_framed_largest_first() -> Result<()> {
    let rows = vec![
        row("Toys", 120.5),
        row("Garden", 9_800.0),
        row("Books", 1_000.25),
        row("Food", 9_800.0),
    ];

    let frame = category::frame(&rows)?;
    let totals: Vec<f64> = frame
        .column("total_sales")?
        .f64()?
        .into_no_null_iter()
        .collect();
    assert!(totals.windows(2).all(|pair| pair[0] >= pair[1]));

    let categories: Vec<&str> = frame.column("category")?.str()?.into_no_null_iter().collect();
    assert_eq!(categories, ["Garden", "Food", "Books", "Toys"]);
    Ok(())
}

#[test]
fn bar_values_add_up_to_the_raw_total() -> Result<()> {
    let rows = vec![
        row("Electronics", 5_432_100.75),
        row("Clothing", 2_100_000.5),
        row("Books", 87_654.25),
    ];
    let raw_total: f64 = rows.iter().map(|r| r.total_sales).sum();

    let ChartSpec::Bar(chart) = category::chart(&category::frame(&rows)?)? else {
        panic!("category report should be a bar chart");
    };
    assert!((chart.total() - raw_total).abs() < 1e-6);
    assert!(chart.value_max > 5_432_100.75);
    Ok(())
}

#[test]
fn empty_result_is_an_error() {
    let err = category::frame(&[]).unwrap_err();
    assert!(matches!(err, ReportError::EmptyResult { .. }));
}

#[test]
fn chart_reads_a_prebuilt_frame() -> Result<()> {
    let frame = df!(
        "category" => ["Garden"],
        "total_sales" => [1_234_567.6]
    )?;

    let ChartSpec::Bar(chart) = category::chart(&frame)? else {
        panic!("category report should be a bar chart");
    };
    assert_eq!(chart.bars[0].label, "Garden");
    assert_eq!(chart.bars[0].annotation, "1,234,568");
    Ok(())
}

#[test]
fn null_category_gets_a_stand_in_label() -> Result<()> {
    let rows = vec![
        row("Electronics", 5_000.0),
        CategorySales {
            category: None,
            total_sales: 250.0,
        },
    ];

    let output = category::build(&rows)?;
    assert_eq!(output.kind, ReportKind::Category);

    let ChartSpec::Bar(chart) = &output.chart else {
        panic!("category report should be a bar chart");
    };
    let labels: Vec<&str> = chart.bars.iter().map(|bar| bar.label.as_str()).collect();
    assert_eq!(labels, ["Electronics", NULL_LABEL]);

    assert_eq!(output.rows[1]["category"], serde_json::Value::Null);
    assert_eq!(output.rows[1]["total_sales"], 250.0);
    Ok(())
}
