use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Schema};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Column, Dataset, Record};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong while reading the dataset. All variants are fatal at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("dataset is missing required column(s): {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    #[error("row {row}: {message}")]
    ParseError { row: usize, message: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    fn parse(row: usize, message: impl Into<String>) -> Self {
        LoadError::ParseError {
            row,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the salaries dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` – header row with the eleven column names (extra columns ignored)
/// * `.parquet`      – one column per field, as written by `df.to_parquet()`
/// * `.json`         – `[{ "work_year": 2022, "experience_level": "SE", ... }, ...]`
///
/// Row numbers in [`LoadError::ParseError`] are 1-based data rows (the header is not counted).
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_delimited(path, b',')?,
        "tsv" => load_delimited(path, b'\t')?,
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!("Loaded {} records from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Names of required columns that are not in `present`, in schema order.
fn missing_columns(present: &[&str]) -> Vec<String> {
    Column::ALL
        .iter()
        .filter(|col| !present.contains(&col.name()))
        .map(|col| col.name().to_string())
        .collect()
}

fn check_schema(present: &[&str]) -> Result<(), LoadError> {
    let missing = missing_columns(present);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::SchemaMismatch { missing })
    }
}

fn validated(row: usize, record: Record) -> Result<Record, LoadError> {
    record.validate().map_err(|msg| LoadError::parse(row, msg))?;
    Ok(record)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Delimited layout: header row with column names, one record per line.
/// Columns are matched by name, so order does not matter.
fn load_delimited(path: &Path, delimiter: u8) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error)?;

    let headers = reader.headers().map_err(csv_error)?.clone();
    check_schema(&headers.iter().collect::<Vec<_>>())?;

    let mut records = Vec::new();
    for (i, result) in reader.deserialize::<Record>().enumerate() {
        let row = i + 1;
        let record = result.map_err(|e| LoadError::parse(row, e.to_string()))?;
        records.push(validated(row, record)?);
    }

    Ok(Dataset::from_records(records))
}

fn csv_error(e: csv::Error) -> LoadError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => LoadError::Io(io),
        other => LoadError::parse(0, format!("{other:?}")),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "work_year": 2022, "experience_level": "SE", "salary_in_usd": 120000, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset, LoadError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue =
        serde_json::from_str(&text).map_err(|e| LoadError::parse(0, format!("invalid JSON: {e}")))?;

    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::parse(0, "expected a top-level JSON array"))?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, value) in rows.iter().enumerate() {
        let row = i + 1;
        let obj = value
            .as_object()
            .ok_or_else(|| LoadError::parse(row, "not a JSON object"))?;
        check_schema(&obj.keys().map(String::as_str).collect::<Vec<_>>())?;

        let record: Record = serde_json::from_value(value.clone())
            .map_err(|e| LoadError::parse(row, e.to_string()))?;
        records.push(validated(row, record)?);
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field.
///
/// Text columns may be Utf8 or LargeUtf8; integer columns Int32 or Int64;
/// salary columns any of Int32/Int64/Float32/Float64.
/// Works with files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| LoadError::parse(0, format!("reading parquet metadata: {e}")))?;

    let names = schema_names(builder.schema());
    check_schema(&names.iter().map(String::as_str).collect::<Vec<_>>())?;

    let reader = builder
        .build()
        .map_err(|e| LoadError::parse(0, format!("building parquet reader: {e}")))?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch =
            batch_result.map_err(|e| LoadError::parse(records.len() + 1, e.to_string()))?;
        let schema = batch.schema();

        let mut columns: Vec<&Arc<dyn Array>> = Vec::with_capacity(Column::ALL.len());
        for col in Column::ALL {
            let idx = schema.index_of(col.name()).map_err(|_| LoadError::SchemaMismatch {
                missing: vec![col.name().to_string()],
            })?;
            columns.push(batch.column(idx));
        }

        for i in 0..batch.num_rows() {
            let row = records.len() + 1;
            let cell = |col: Column| columns[col as usize];

            let record = Record {
                work_year: extract_i64(cell(Column::WorkYear), i, row, Column::WorkYear)?,
                experience_level: extract_text(cell(Column::ExperienceLevel), i, row, Column::ExperienceLevel)?
                    .parse()
                    .map_err(|msg: String| LoadError::parse(row, msg))?,
                employment_type: extract_text(cell(Column::EmploymentType), i, row, Column::EmploymentType)?,
                job_title: extract_text(cell(Column::JobTitle), i, row, Column::JobTitle)?,
                salary: extract_f64(cell(Column::Salary), i, row, Column::Salary)?,
                salary_currency: extract_text(cell(Column::SalaryCurrency), i, row, Column::SalaryCurrency)?,
                salary_in_usd: extract_f64(cell(Column::SalaryInUsd), i, row, Column::SalaryInUsd)?,
                employee_residence: extract_text(cell(Column::EmployeeResidence), i, row, Column::EmployeeResidence)?,
                remote_ratio: extract_i64(cell(Column::RemoteRatio), i, row, Column::RemoteRatio)?,
                company_location: extract_text(cell(Column::CompanyLocation), i, row, Column::CompanyLocation)?,
                company_size: extract_text(cell(Column::CompanySize), i, row, Column::CompanySize)?
                    .parse()
                    .map_err(|msg: String| LoadError::parse(row, msg))?,
            };
            records.push(validated(row, record)?);
        }
    }

    Ok(Dataset::from_records(records))
}

fn schema_names(schema: &Schema) -> Vec<String> {
    schema.fields().iter().map(|f| f.name().clone()).collect()
}

// -- Parquet / Arrow helpers --

fn not_null(arr: &Arc<dyn Array>, i: usize, row: usize, col: Column) -> Result<(), LoadError> {
    if arr.is_null(i) {
        Err(LoadError::parse(row, format!("null value in '{col}'")))
    } else {
        Ok(())
    }
}

fn type_error(arr: &Arc<dyn Array>, row: usize, col: Column) -> LoadError {
    LoadError::parse(
        row,
        format!("column '{col}' has unsupported type {:?}", arr.data_type()),
    )
}

fn extract_text(arr: &Arc<dyn Array>, i: usize, row: usize, col: Column) -> Result<String, LoadError> {
    not_null(arr, i, row, col)?;
    match arr.data_type() {
        DataType::Utf8 => arr
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| s.value(i).to_string())
            .ok_or_else(|| type_error(arr, row, col)),
        DataType::LargeUtf8 => Ok(arr.as_string::<i64>().value(i).to_string()),
        _ => Err(type_error(arr, row, col)),
    }
}

fn extract_i64(arr: &Arc<dyn Array>, i: usize, row: usize, col: Column) -> Result<i64, LoadError> {
    not_null(arr, i, row, col)?;
    match arr.data_type() {
        DataType::Int32 => arr
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(i) as i64)
            .ok_or_else(|| type_error(arr, row, col)),
        DataType::Int64 => arr
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(i))
            .ok_or_else(|| type_error(arr, row, col)),
        _ => Err(type_error(arr, row, col)),
    }
}

fn extract_f64(arr: &Arc<dyn Array>, i: usize, row: usize, col: Column) -> Result<f64, LoadError> {
    not_null(arr, i, row, col)?;
    match arr.data_type() {
        DataType::Float64 => arr
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(i))
            .ok_or_else(|| type_error(arr, row, col)),
        DataType::Float32 => arr
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(i) as f64)
            .ok_or_else(|| type_error(arr, row, col)),
        DataType::Int32 | DataType::Int64 => extract_i64(arr, i, row, col).map(|v| v as f64),
        _ => Err(type_error(arr, row, col)),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{ArrayRef, LargeStringArray};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::{CompanySize, ExperienceLevel};

    const HEADER: &str = "work_year,experience_level,employment_type,job_title,salary,salary_currency,salary_in_usd,employee_residence,remote_ratio,company_location,company_size";

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_csv_ignores_extra_index_column() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!(
            ",{HEADER}\n\
             0,2020,MI,FT,Data Scientist,70000,EUR,79833,DE,0,DE,L\n\
             1,2022,SE,FT,Data Engineer,150000,USD,150000,US,100,US,M\n"
        );
        let path = write_file(&dir, "ds_salaries.csv", &contents);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.records()[0];
        assert_eq!(first.work_year, 2020);
        assert_eq!(first.experience_level, ExperienceLevel::Mid);
        assert_eq!(first.salary_in_usd, 79833.0);
        assert_eq!(first.company_size, CompanySize::Large);
        assert_eq!(ds.records()[1].remote_ratio, 100);
    }

    #[test]
    fn test_load_tsv() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!(
            "{}\n2021\tEN\tPT\tAnalyst\t30000\tGBP\t41000\tGB\t50\tGB\tS\n",
            HEADER.replace(',', "\t")
        );
        let path = write_file(&dir, "salaries.tsv", &contents);
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].company_location, "GB");
    }

    #[test]
    fn test_header_only_file_is_an_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "empty.csv", &format!("{HEADER}\n"));
        let ds = load_file(&path).unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let dir = tempfile::tempdir().unwrap();
        let header = HEADER.replace(",company_size", "").replace("job_title,", "");
        let path = write_file(&dir, "partial.csv", &format!("{header}\n"));

        match load_file(&path).unwrap_err() {
            LoadError::SchemaMismatch { missing } => {
                assert_eq!(missing, vec!["job_title".to_string(), "company_size".to_string()]);
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_row_reports_row_number() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!(
            "{HEADER}\n\
             2020,MI,FT,DS,70000,EUR,79833,DE,0,DE,L\n\
             2020,MI,FT,DS,lots,EUR,79833,DE,0,DE,L\n"
        );
        let path = write_file(&dir, "bad.csv", &contents);

        match load_file(&path).unwrap_err() {
            LoadError::ParseError { row, .. } => assert_eq!(row, 2),
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_invariant_violation_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!("{HEADER}\n2020,MI,FT,DS,70000,EUR,79833,DE,25,DE,L\n");
        let path = write_file(&dir, "ratio.csv", &contents);
        assert!(matches!(
            load_file(&path).unwrap_err(),
            LoadError::ParseError { row: 1, .. }
        ));
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "data.xlsx", "");
        assert!(matches!(
            load_file(&path).unwrap_err(),
            LoadError::UnsupportedFormat(ext) if ext == "xlsx"
        ));
    }

    fn text(values: &[&str]) -> ArrayRef {
        Arc::new(StringArray::from(values.to_vec()))
    }

    /// Two rows with the narrow numeric types and large strings Polars tends to write.
    fn parquet_columns(locations: [Option<&str>; 2]) -> Vec<(&'static str, ArrayRef)> {
        vec![
            ("work_year", Arc::new(Int32Array::from(vec![2021, 2022])) as ArrayRef),
            ("experience_level", text(&["EN", "SE"])),
            ("employment_type", text(&["FT", "FT"])),
            ("job_title", text(&["Data Analyst", "Data Engineer"])),
            ("salary", Arc::new(Int64Array::from(vec![18_000, 150_000])) as ArrayRef),
            ("salary_currency", text(&["EUR", "USD"])),
            ("salary_in_usd", Arc::new(Float32Array::from(vec![19_440.0, 150_000.0])) as ArrayRef),
            ("employee_residence", text(&["FR", "US"])),
            ("remote_ratio", Arc::new(Int32Array::from(vec![50, 100])) as ArrayRef),
            ("company_location", Arc::new(LargeStringArray::from(locations.to_vec())) as ArrayRef),
            ("company_size", text(&["S", "L"])),
        ]
    }

    fn write_parquet(dir: &tempfile::TempDir, name: &str, columns: Vec<(&str, ArrayRef)>) -> PathBuf {
        let path = dir.path().join(name);
        let batch = RecordBatch::try_from_iter(columns).unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        path
    }

    #[test]
    fn test_load_parquet_coerces_column_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_parquet(&dir, "salaries.parquet", parquet_columns([Some("FR"), Some("US")]));

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.records()[0];
        assert_eq!(first.work_year, 2021);
        assert_eq!(first.experience_level, ExperienceLevel::Entry);
        assert_eq!(first.salary, 18_000.0);
        assert_eq!(first.salary_in_usd, 19_440.0);
        assert_eq!(first.remote_ratio, 50);
        assert_eq!(first.company_location, "FR");
        assert_eq!(first.company_size, CompanySize::Small);
        assert_eq!(ds.records()[1].company_location, "US");
    }

    #[test]
    fn test_parquet_null_cell_reports_row_and_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_parquet(&dir, "nulls.pq", parquet_columns([Some("FR"), None]));

        match load_file(&path).unwrap_err() {
            LoadError::ParseError { row, message } => {
                assert_eq!(row, 2);
                assert!(message.contains("company_location"), "{message}");
            }
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_parquet_missing_column_is_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let columns = parquet_columns([Some("FR"), Some("US")])
            .into_iter()
            .filter(|(name, _)| *name != "company_size")
            .collect();
        let path = write_parquet(&dir, "partial.parquet", columns);

        match load_file(&path).unwrap_err() {
            LoadError::SchemaMismatch { missing } => {
                assert_eq!(missing, vec!["company_size".to_string()]);
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_load_json_records() {
        let dir = tempfile::tempdir().unwrap();
        let contents = r#"[
            {"work_year": 2023, "experience_level": "EX", "employment_type": "FT",
             "job_title": "Head of Data", "salary": 250000, "salary_currency": "USD",
             "salary_in_usd": 250000, "employee_residence": "US", "remote_ratio": 0,
             "company_location": "US", "company_size": "L"}
        ]"#;
        let path = write_file(&dir, "salaries.json", contents);
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].experience_level, ExperienceLevel::Executive);
    }

    #[test]
    fn test_json_missing_key_is_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "salaries.json", r#"[{"work_year": 2023}]"#);
        assert!(matches!(
            load_file(&path).unwrap_err(),
            LoadError::SchemaMismatch { missing } if missing.len() == 10
        ));
    }
}
