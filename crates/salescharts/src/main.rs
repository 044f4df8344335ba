use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use salescharts_core::config::{self, RenderConfig, WarehouseConfig};
use salescharts_core::db;
use salescharts_core::format::NULL_LABEL;
use salescharts_core::reports::{self, ReportKind, ReportOutput};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Descriptive sales charts from the data warehouse", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the reports and write one SVG chart per report
    Render(RenderArgs),
    /// Run the reports and print their tables
    Summary(SummaryArgs),
}

#[derive(Args, Debug)]
struct ConnectionArgs {
    /// Warehouse connection URL (falls back to DATABASE_URL, then SALESCHARTS_DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
    /// Only run these reports (category, customers, payments, monthly); repeat to select several
    #[arg(long = "only", value_parser = ReportKind::from_str)]
    only: Vec<ReportKind>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Directory the charts are written to
    #[arg(long, default_value = config::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,
    /// Also write each report table as CSV next to its chart
    #[arg(long)]
    csv: bool,
    #[arg(long, default_value_t = config::DEFAULT_WIDTH)]
    width: u32,
    #[arg(long, default_value_t = config::DEFAULT_HEIGHT)]
    height: u32,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => handle_render(args).await,
        Command::Summary(args) => handle_summary(args).await,
    }
}

async fn connect_pool(args: &ConnectionArgs) -> Result<db::DbPool> {
    dotenvy::dotenv().ok();
    let config = WarehouseConfig::resolve(args.database_url.clone())?;
    db::connect(&config.database_url)
        .await
        .context("failed to connect to the warehouse")
}

fn selected(args: &ConnectionArgs) -> Vec<ReportKind> {
    reports::run_order(&args.only)
}

async fn handle_render(args: RenderArgs) -> Result<()> {
    let pool = connect_pool(&args.connection).await?;
    let render_config = RenderConfig {
        output_dir: args.output_dir,
        width: args.width,
        height: args.height,
        write_csv: args.csv,
    };

    for kind in selected(&args.connection) {
        let mut output = reports::run(&pool, kind)
            .await
            .with_context(|| format!("{} report failed", kind.title()))?;
        let written = output
            .write(&render_config)
            .with_context(|| format!("failed to write {} report", kind.title()))?;
        println!("{}", written.chart.display());
        if let Some(csv) = written.csv {
            println!("{}", csv.display());
        }
    }

    info!(output_dir = %render_config.output_dir.display(), "charts written");
    Ok(())
}

async fn handle_summary(args: SummaryArgs) -> Result<()> {
    let pool = connect_pool(&args.connection).await?;
    let outputs = reports::run_all(&pool, &selected(&args.connection))
        .await
        .context("report run failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary_document(&outputs))?);
        return Ok(());
    }

    for output in &outputs {
        println!("{}", output.kind.title());
        println!("{}", rows_table(&output.rows));
    }
    Ok(())
}

fn summary_document(outputs: &[ReportOutput]) -> Value {
    outputs
        .iter()
        .map(|output| serde_json::json!({ "report": output.kind, "rows": output.rows }))
        .collect()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => NULL_LABEL.to_string(),
        Value::String(text) => text.clone(),
        Value::Number(number) if number.is_f64() => {
            format!("{:.2}", number.as_f64().unwrap_or_default())
        }
        other => other.to_string(),
    }
}

/// One column per field of the first row, in declaration order.
fn rows_table(rows: &Value) -> Table {
    let mut table = Table::new();
    let rows = rows.as_array().map(Vec::as_slice).unwrap_or_default();

    if let Some(Value::Object(first)) = rows.first() {
        table.set_header(first.keys().cloned().collect::<Vec<_>>());
    }
    for row in rows {
        if let Value::Object(fields) = row {
            table.add_row(fields.values().map(cell_text).collect::<Vec<_>>());
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use salescharts_core::reports::customers::{self, CustomerTotal};
    use salescharts_core::reports::payments::{self, PaymentMethodCount};

    fn customer_report() -> ReportOutput {
        let totals: Vec<CustomerTotal> = [2.0, 1.0, 2.0]
            .into_iter()
            .enumerate()
            .map(|(idx, total_purchased)| CustomerTotal {
                customer_id: format!("C{idx}"),
                total_purchased,
            })
            .collect();
        customers::build(&totals).expect("customer report builds")
    }

    #[test]
    fn only_flags_parse_into_run_order() {
        let cli = Cli::try_parse_from([
            "salescharts",
            "summary",
            "--only",
            "monthly",
            "--only",
            "category",
            "--only",
            "monthly",
        ])
        .expect("valid arguments");
        let Command::Summary(args) = cli.command else {
            panic!("expected the summary subcommand");
        };
        assert_eq!(
            selected(&args.connection),
            [ReportKind::Category, ReportKind::Monthly]
        );

        let cli = Cli::try_parse_from(["salescharts", "render"]).expect("valid arguments");
        let Command::Render(args) = cli.command else {
            panic!("expected the render subcommand");
        };
        assert_eq!(selected(&args.connection), ReportKind::ALL);
    }

    #[test]
    fn unknown_report_is_rejected() {
        let err = Cli::try_parse_from(["salescharts", "summary", "--only", "refunds"]).unwrap_err();
        assert!(err.to_string().contains("unknown report 'refunds'"));
    }

    #[test]
    fn json_document_carries_the_report_rows() {
        let document = summary_document(&[customer_report()]);

        assert_eq!(document[0]["report"], "customers");
        let rows = document[0]["rows"].as_array().expect("rows array");
        assert_eq!(rows.len(), 2);
        let keys: Vec<&str> = rows[0]
            .as_object()
            .expect("row object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["total_purchased", "customers", "percentage"]);
        assert_eq!(rows[0]["total_purchased"], 2.0);
        assert_eq!(rows[0]["customers"], 2);
    }

    #[test]
    fn table_has_one_column_per_field() {
        let table = rows_table(&customer_report().rows).to_string();
        let lines: Vec<&str> = table.lines().collect();

        let header = lines
            .iter()
            .position(|line| {
                line.contains("total_purchased")
                    && line.contains("customers")
                    && line.contains("percentage")
            })
            .expect("header line");
        let first = lines
            .iter()
            .position(|line| line.contains("2.00") && line.contains("66.67"))
            .expect("largest bucket line");
        let second = lines
            .iter()
            .position(|line| line.contains("1.00") && line.contains("33.33"))
            .expect("smallest bucket line");
        assert!(header < first && first < second, "unexpected layout:\n{table}");
    }

    #[test]
    fn null_cells_print_the_stand_in_label() {
        let output = payments::build(&[PaymentMethodCount {
            payment_method: None,
            transactions: 4,
        }])
        .expect("payment report builds");

        let table = rows_table(&output.rows).to_string();
        assert!(table.contains("payment_method"));
        assert!(table.contains(NULL_LABEL));
        assert!(table.contains('4'));
    }
}
