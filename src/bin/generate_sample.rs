//! Writes a synthetic `Imports_Exports_Dataset.csv` (and optionally a Parquet
//! copy) so the dashboard can be run without the real export.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use trade_dashboard::data::dates::DATE_FORMAT;
use trade_dashboard::data::sample::SeededRng;

/// generate_sample: write a synthetic imports/exports table.
#[derive(Debug, Parser)]
struct Args {
    /// Number of transactions to generate.
    #[arg(long, default_value_t = 15_000)]
    rows: usize,

    /// Seed for the generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// CSV output path.
    #[arg(long, short, default_value = "Imports_Exports_Dataset.csv")]
    output: PathBuf,

    /// Also write a Parquet file next to the CSV.
    #[arg(long)]
    parquet: bool,
}

#[derive(Debug, Serialize)]
struct Row {
    #[serde(rename = "Transaction_ID")]
    id: String,
    #[serde(rename = "Country")]
    country: &'static str,
    #[serde(rename = "Product")]
    product: &'static str,
    #[serde(rename = "Import_Export")]
    direction: &'static str,
    #[serde(rename = "Quantity")]
    quantity: i64,
    #[serde(rename = "Value")]
    value: f64,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Category")]
    category: &'static str,
}

const COUNTRIES: [&str; 8] = [
    "Chile", "Germany", "India", "Japan", "Kenya", "Mexico", "Norway", "Vietnam",
];

/// (category, products, typical unit price)
const CATALOG: [(&str, [&str; 3], f64); 5] = [
    ("Electronics", ["Laptop", "Phone", "Router"], 45.0),
    ("Clothing", ["Jacket", "Shirt", "Shoes"], 12.0),
    ("Furniture", ["Chair", "Desk", "Shelf"], 30.0),
    ("Toys", ["Puzzle", "Doll", "Kite"], 6.0),
    ("Machinery", ["Pump", "Lathe", "Drill"], 90.0),
];

fn pick<'a, T>(rng: &mut SeededRng, items: &'a [T]) -> &'a T {
    &items[rng.below(items.len())]
}

fn generate(args: &Args) -> Result<Vec<Row>> {
    let mut rng = SeededRng::new(args.seed);
    let first_day = NaiveDate::from_ymd_opt(2019, 1, 1).context("invalid start date")?;
    let span_days = 6 * 365;

    let rows = (0..args.rows)
        .map(|i| {
            let (category, products, unit_price) = *pick(&mut rng, &CATALOG);
            let quantity = 1 + rng.below(5000) as i64;
            // Log-normal-ish price spread around the category's typical price.
            let price = unit_price * rng.gauss(0.0, 0.5).exp();
            let date = first_day + Duration::days(rng.below(span_days) as i64);

            Row {
                id: format!("TX{:06}", i + 1),
                country: *pick(&mut rng, &COUNTRIES),
                product: *pick(&mut rng, &products),
                direction: if rng.next_f64() < 0.5 { "Import" } else { "Export" },
                quantity,
                value: (price * quantity as f64 * 100.0).round() / 100.0,
                date: date.format(DATE_FORMAT).to_string(),
                category,
            }
        })
        .collect();

    Ok(rows)
}

fn write_csv(rows: &[Row], path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &Path) -> Result<()> {
    let text = |f: fn(&Row) -> &str| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("Transaction_ID", DataType::Utf8, false),
        Field::new("Country", DataType::Utf8, false),
        Field::new("Product", DataType::Utf8, false),
        Field::new("Import_Export", DataType::Utf8, false),
        Field::new("Quantity", DataType::Int64, false),
        Field::new("Value", DataType::Float64, false),
        Field::new("Date", DataType::Utf8, false),
        Field::new("Category", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text(|r| r.id.as_str())),
            Arc::new(text(|r| r.country)),
            Arc::new(text(|r| r.product)),
            Arc::new(text(|r| r.direction)),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.quantity).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.value).collect::<Vec<_>>())),
            Arc::new(text(|r| r.date.as_str())),
            Arc::new(text(|r| r.category)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating Parquet writer")?;
    writer.write(&batch).context("writing Parquet batch")?;
    writer.close().context("closing Parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rows = generate(&args)?;
    write_csv(&rows, &args.output)?;

    if args.parquet {
        let path = args.output.with_extension("parquet");
        write_parquet(&rows, &path)?;
        log::info!("Wrote {} transactions to {}", rows.len(), path.display());
    }

    println!("Wrote {} transactions to {}", rows.len(), args.output.display());
    Ok(())
}
