use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use arrow::array::{
    Array, ArrayRef, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::dates::{self, DatePolicy, DATE_FORMAT};
use super::model::{Direction, RawRecord, TradeDataset};
use super::sample;
use crate::error::{DatasetError, LoadError};

pub const CATEGORY: &str = "Category";
pub const DIRECTION: &str = "Import_Export";
pub const VALUE: &str = "Value";
pub const DATE: &str = "Date";

pub const DEFAULT_SAMPLE_SIZE: usize = 3000;
pub const DEFAULT_SEED: u64 = 42;

/// How the source is reduced to the working dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub sample_size: usize,
    pub seed: u64,
    pub date_policy: DatePolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: DEFAULT_SEED,
            date_policy: DatePolicy::Strict,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read, sample and normalize a transactions file.
///
/// Sampling happens before dates are parsed, so a malformed date outside the
/// sample never fails the load.
pub fn load_dataset(path: &Path, options: &LoadOptions) -> Result<TradeDataset, DatasetError> {
    let raw = load_file(path)?;
    let source_rows = raw.len();

    let sampled = sample::sample(raw, options.sample_size, options.seed);
    let normalized = dates::normalize(sampled, options.date_policy)?;

    let dataset = TradeDataset::from_transactions(
        normalized.transactions,
        source_rows,
        normalized.skipped.len(),
    );
    log::info!(
        "Loaded {} of {} rows from {} ({} categories, {} directions, {} years, {} skipped)",
        dataset.len(),
        source_rows,
        path.display(),
        dataset.categories().len(),
        dataset.directions().len(),
        dataset.years().len(),
        dataset.skipped_rows(),
    );
    Ok(dataset)
}

/// Load the required columns of every row.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` – header row, comma or tab delimited
/// * `.json`         – `[{ "Category": .., "Import_Export": .., "Value": .., "Date": .. }, ..]`
/// * `.parquet`      – text columns, numeric `Value`, text, date or timestamp `Date`
///
/// Columns other than the four required ones are ignored.
pub fn load_file(path: &Path) -> Result<Vec<RawRecord>, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_delimited(path, b','),
        "tsv" => load_delimited(path, b'\t'),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Positions of the required columns in a header.
struct Columns {
    category: usize,
    direction: usize,
    value: usize,
    date: usize,
}

impl Columns {
    fn locate(position: impl Fn(&str) -> Option<usize>) -> Result<Self, LoadError> {
        let find = |name: &'static str| position(name).ok_or(LoadError::MissingColumn(name));
        Ok(Columns {
            category: find(CATEGORY)?,
            direction: find(DIRECTION)?,
            value: find(VALUE)?,
            date: find(DATE)?,
        })
    }
}

fn parse_value(s: &str, row: usize) -> Result<f64, LoadError> {
    let v = s.trim().parse::<f64>().map_err(|_| LoadError::Malformed {
        row,
        message: format!("'{s}' is not a number"),
    })?;
    finite(v, row)
}

fn finite(v: f64, row: usize) -> Result<f64, LoadError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(LoadError::Malformed {
            row,
            message: format!("value {v} is not finite"),
        })
    }
}

// ---------------------------------------------------------------------------
// CSV / TSV loader
// ---------------------------------------------------------------------------

fn load_delimited(path: &Path, delimiter: u8) -> Result<Vec<RawRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::Headers)
        .from_reader(open(path)?);

    let headers = reader.headers()?.clone();
    let cols = Columns::locate(|name| headers.iter().position(|h| h == name))?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let record = result?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        records.push(RawRecord {
            row,
            category: cell(cols.category).to_string(),
            direction: Direction::parse(cell(cols.direction)),
            value: parse_value(cell(cols.value), row)?,
            date: cell(cols.date).to_string(),
        });
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')` layout.
/// `Value` may be a number or a numeric string.
fn load_json(path: &Path) -> Result<Vec<RawRecord>, LoadError> {
    let root: JsonValue = serde_json::from_reader(std::io::BufReader::new(open(path)?))?;

    let rows = root.as_array().ok_or_else(|| LoadError::Malformed {
        row: 0,
        message: "expected a top-level JSON array".to_string(),
    })?;

    rows.iter()
        .enumerate()
        .map(|(i, rec)| -> Result<RawRecord, LoadError> {
            let row = i + 1;
            let obj = rec.as_object().ok_or_else(|| LoadError::Malformed {
                row,
                message: "not a JSON object".to_string(),
            })?;

            let value = match json_field(obj, VALUE)? {
                JsonValue::Number(n) => finite(n.as_f64().unwrap_or(f64::NAN), row)?,
                JsonValue::String(s) => parse_value(s, row)?,
                other => {
                    return Err(LoadError::Malformed {
                        row,
                        message: format!("'{other}' is not a number"),
                    })
                }
            };

            Ok(RawRecord {
                row,
                category: json_text(obj, CATEGORY, row)?,
                direction: Direction::parse(&json_text(obj, DIRECTION, row)?),
                value,
                date: json_text(obj, DATE, row)?,
            })
        })
        .collect()
}

fn json_field<'a>(
    obj: &'a Map<String, JsonValue>,
    col: &'static str,
) -> Result<&'a JsonValue, LoadError> {
    obj.get(col).ok_or(LoadError::MissingColumn(col))
}

fn json_text(
    obj: &Map<String, JsonValue>,
    col: &'static str,
    row: usize,
) -> Result<String, LoadError> {
    match json_field(obj, col)? {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(LoadError::Malformed {
            row,
            message: format!("column '{col}' holds {other}, expected text"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Reads plain, large, view and dictionary-encoded string columns, so files
/// written by **Pandas** (`df.to_parquet()`, categoricals included) and
/// **Polars** (`df.write_parquet()`) both load. `Date` may also be a
/// date or timestamp column.
fn load_parquet(path: &Path) -> Result<Vec<RawRecord>, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let schema = builder.schema().clone();
    let cols = Columns::locate(|name| schema.index_of(name).ok())?;
    let reader = builder.build()?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let category = plain(batch.column(cols.category))?;
        let direction = plain(batch.column(cols.direction))?;
        let value = plain(batch.column(cols.value))?;
        let date = plain(batch.column(cols.date))?;

        for i in 0..batch.num_rows() {
            let row = records.len() + 1;
            records.push(RawRecord {
                row,
                category: text_at(&category, i, row)?,
                direction: Direction::parse(&text_at(&direction, i, row)?),
                value: finite(number_at(&value, i, row)?, row)?,
                date: text_at(&date, i, row)?,
            });
        }
    }

    Ok(records)
}

// -- Parquet / Arrow helpers --

/// Cast encodings without a direct reader below to their plain equivalents.
fn plain(col: &ArrayRef) -> Result<ArrayRef, LoadError> {
    let target = match col.data_type() {
        DataType::Dictionary(_, values) => values.as_ref().clone(),
        DataType::Utf8View => DataType::Utf8,
        DataType::Timestamp(..) | DataType::Date64 => DataType::Date32,
        _ => return Ok(col.clone()),
    };
    plain(&cast(col, &target)?)
}

fn downcast<'a, T: 'static>(col: &'a ArrayRef, row: usize) -> Result<&'a T, LoadError> {
    col.as_any().downcast_ref::<T>().ok_or_else(|| LoadError::Malformed {
        row,
        message: format!("unexpected column type {:?}", col.data_type()),
    })
}

fn text_at(col: &ArrayRef, i: usize, row: usize) -> Result<String, LoadError> {
    if col.is_null(i) {
        return Err(LoadError::Malformed {
            row,
            message: "null in text column".to_string(),
        });
    }
    match col.data_type() {
        DataType::Utf8 => Ok(downcast::<StringArray>(col, row)?.value(i).to_string()),
        DataType::LargeUtf8 => Ok(downcast::<LargeStringArray>(col, row)?.value(i).to_string()),
        DataType::Date32 => downcast::<Date32Array>(col, row)?
            .value_as_date(i)
            .map(|d| d.format(DATE_FORMAT).to_string())
            .ok_or_else(|| LoadError::Malformed {
                row,
                message: "date out of range".to_string(),
            }),
        other => Err(LoadError::Malformed {
            row,
            message: format!("expected a text column, got {other:?}"),
        }),
    }
}

fn number_at(col: &ArrayRef, i: usize, row: usize) -> Result<f64, LoadError> {
    if col.is_null(i) {
        return Err(LoadError::Malformed {
            row,
            message: "null in Value column".to_string(),
        });
    }
    match col.data_type() {
        DataType::Float64 => Ok(downcast::<Float64Array>(col, row)?.value(i)),
        DataType::Float32 => Ok(downcast::<Float32Array>(col, row)?.value(i) as f64),
        DataType::Int64 => Ok(downcast::<Int64Array>(col, row)?.value(i) as f64),
        DataType::Int32 => Ok(downcast::<Int32Array>(col, row)?.value(i) as f64),
        DataType::Utf8 => parse_value(downcast::<StringArray>(col, row)?.value(i), row),
        other => Err(LoadError::Malformed {
            row,
            message: format!("expected a numeric column, got {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use arrow::array::{DictionaryArray, TimestampMillisecondArray};
    use arrow::datatypes::{Field, Int32Type, Schema, TimeUnit};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    use super::*;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    const SMALL_CSV: &str = "\
Transaction_ID,Category,Import_Export,Value,Date,Country
a1,Toys,Import,10.5,01-02-2020,Chile
a2,Machinery,Export,2000,15-06-2021,Peru
a3,Toys,Export,7,31-12-2021,Chile
";

    #[test]
    fn csv_reads_required_columns_and_ignores_the_rest() {
        let dir = TempDir::new().unwrap();
        let rows = load_file(&write(&dir, "t.csv", SMALL_CSV)).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[1],
            RawRecord {
                row: 2,
                category: "Machinery".into(),
                direction: Direction::Export,
                value: 2000.0,
                date: "15-06-2021".into(),
            }
        );
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "t.tsv",
            "Category\tImport_Export\tValue\tDate\nToys\tImport\t3.25\t05-05-2022\n",
        );
        let rows = load_file(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, 3.25);
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "t.csv", "Category,Import_Export,Date\nToys,Import,01-01-2020\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("Value")), "{err:?}");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_file(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }), "{err:?}");
    }

    #[test]
    fn non_numeric_value_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "t.csv",
            "Category,Import_Export,Value,Date\n\
             Toys,Import,1,01-01-2020\n\
             Toys,Import,lots,01-01-2020\n",
        );
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { row: 2, .. }), "{err:?}");
    }

    #[test]
    fn unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let err = load_file(&write(&dir, "t.xlsx", "")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ref e) if e == "xlsx"));
    }

    #[test]
    fn json_records_accept_numeric_strings() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "t.json",
            r#"[
                {"Category": "Toys", "Import_Export": "Import",
                 "Value": 12.0, "Date": "01-01-2020"},
                {"Category": "Toys", "Import_Export": "Export",
                 "Value": "8.5", "Date": "02-01-2020", "Port": "X"}
            ]"#,
        );
        let rows = load_file(&path).unwrap();
        assert_eq!(rows.iter().map(|r| r.value).collect::<Vec<_>>(), [12.0, 8.5]);
    }

    #[test]
    fn json_missing_column() {
        let dir = TempDir::new().unwrap();
        let json = r#"[{"Category": "Toys", "Value": 1, "Date": "01-01-2020"}]"#;
        let path = write(&dir, "t.json", json);
        assert!(matches!(load_file(&path), Err(LoadError::MissingColumn("Import_Export"))));
    }

    #[test]
    fn json_must_be_an_array_of_records() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "t.json", r#"{"Category": "Toys", "Import_Export": "Import"}"#);
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { row: 0, .. }), "{err:?}");

        let path = write(&dir, "rows.json", "[1, 2]");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { row: 1, .. }), "{err:?}");
    }

    #[test]
    fn parquet_reads_text_and_date32() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("Category", DataType::Utf8, false),
            Field::new("Import_Export", DataType::Utf8, false),
            Field::new("Value", DataType::Int64, false),
            Field::new("Date", DataType::Date32, false),
        ]));
        // 18628 days after the epoch is 2021-01-01.
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Toys", "Furniture"])),
                Arc::new(StringArray::from(vec!["Import", "Export"])),
                Arc::new(Int64Array::from(vec![5, 9])),
                Arc::new(Date32Array::from(vec![18628, 18629])),
            ],
        )
        .unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let rows = load_file(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "01-01-2021");
        assert_eq!(rows[1].value, 9.0);
        assert_eq!(rows[1].direction, Direction::Export);
    }

    #[test]
    fn parquet_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.parquet");

        // No rows at all: the header alone must still be checked.
        let schema = Arc::new(Schema::new(vec![Field::new("Country", DataType::Utf8, false)]));
        let writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.close().unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("Category")), "{err:?}");
        let err = load_dataset(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DatasetError::Load(LoadError::MissingColumn(_))), "{err:?}");
    }

    #[test]
    fn parquet_reads_dictionary_text_and_timestamps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.parquet");

        let dictionary = DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8));
        let schema = Arc::new(Schema::new(vec![
            Field::new("Category", dictionary.clone(), false),
            Field::new("Import_Export", dictionary, false),
            Field::new("Value", DataType::Float64, false),
            Field::new("Date", DataType::Timestamp(TimeUnit::Millisecond, None), false),
        ]));
        // 1609459200000 ms after the epoch is 2021-01-01T00:00:00.
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(DictionaryArray::<Int32Type>::from_iter(["Toys", "Toys", "Furniture"])),
                Arc::new(DictionaryArray::<Int32Type>::from_iter(["Import", "Export", "Export"])),
                Arc::new(Float64Array::from(vec![1.5, 2.5, 3.5])),
                Arc::new(TimestampMillisecondArray::from(vec![
                    1_609_459_200_000,
                    1_609_545_600_000,
                    1_609_545_600_000 + 3_600_000,
                ])),
            ],
        )
        .unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let rows = load_file(&path).unwrap();
        let categories: Vec<_> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, ["Toys", "Toys", "Furniture"]);
        assert_eq!(rows[1].direction, Direction::Export);
        let dates: Vec<_> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, ["01-01-2021", "02-01-2021", "02-01-2021"]);
    }

    #[test]
    fn load_dataset_samples_then_normalizes() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "t.csv", SMALL_CSV);
        let options = LoadOptions {
            sample_size: 2,
            ..LoadOptions::default()
        };

        let ds = load_dataset(&path, &options).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.source_rows(), 3);

        let all = load_dataset(&path, &LoadOptions::default()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all.years().iter().copied().collect::<Vec<_>>(), [2020, 2021]);
    }

    #[test]
    fn bad_date_fails_strict_load() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "t.csv",
            "Category,Import_Export,Value,Date\n\
             Toys,Import,1,01-01-2020\n\
             Toys,Import,2,2020-01-02\n",
        );

        let err = load_dataset(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DatasetError::Parse(ref e) if e.row == 2), "{err:?}");

        let lenient = LoadOptions {
            date_policy: DatePolicy::SkipInvalid,
            ..LoadOptions::default()
        };
        let ds = load_dataset(&path, &lenient).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.skipped_rows(), 1);
    }
}
