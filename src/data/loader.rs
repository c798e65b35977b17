use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, UInt8Type,
    UInt16Type, UInt32Type,
};
use calamine::{Data, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::config::PipelineConfig;

use super::clean::clean_table;
use super::model::{CellValue, RawTable, WellLogDataset};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened or its contents could not be decoded.
    #[error("Failed to read {}: {source:#}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("'{0}' column not found in dataset.")]
    MissingDepthColumn(String),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// The file decoded but does not describe a table with a header row.
    #[error("Malformed table: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and clean a well-log table.
///
/// Pipeline: parse → sentinel to missing → drop incomplete rows →
/// per-column percentile trim (sequential) → depth column check.
pub fn load(path: &Path, config: &PipelineConfig) -> Result<WellLogDataset, LoadError> {
    let table = read_table(path)?;
    let (dataset, summary) = clean_table(table, config);

    if dataset.column_index(&config.depth_column).is_none() {
        return Err(LoadError::MissingDepthColumn(config.depth_column.clone()));
    }

    log::info!(
        "Loaded {}: {} of {} rows kept ({} sentinel cells, {} incomplete rows, {} columns trimmed)",
        path.display(),
        summary.rows_kept,
        summary.rows_read,
        summary.sentinel_cells,
        summary.incomplete_rows,
        summary.trims.len()
    );
    for trim in &summary.trims {
        log::debug!(
            "Trimmed {} to [{}, {}], removed {} rows",
            trim.column,
            trim.lower,
            trim.upper,
            trim.removed
        );
    }
    Ok(dataset)
}

/// Parse a file into a [`RawTable`]. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first worksheet, first row is the header
/// * `.csv`     – header row, one measurement per cell
/// * `.json`    – `[{ "DEPTH": 1500.0, "GR": 85.2, ... }, ...]`
/// * `.parquet` – flat scalar columns
pub fn read_table(path: &Path) -> Result<RawTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let read = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => read_spreadsheet(path),
        "csv" => read_csv(path),
        "json" => read_json(path),
        "parquet" | "pq" => read_parquet(path),
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };
    // Readers raise `LoadError::Malformed` for structural problems; anything
    // else is an I/O or decode failure.
    let table = read.map_err(|err| match err.downcast::<LoadError>() {
        Ok(load_err) => load_err,
        Err(source) => LoadError::FileRead {
            path: path.to_path_buf(),
            source,
        },
    })?;

    if table.columns.is_empty() {
        return Err(LoadError::Malformed("no header row".to_string()));
    }
    Ok(table)
}

fn malformed(reason: impl Into<String>) -> anyhow::Error {
    LoadError::Malformed(reason.into()).into()
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn read_spreadsheet(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(RawTable::default());
    };
    let header: Vec<String> = header.iter().map(|c| c.to_string()).collect();
    let mut table = RawTable::with_header(&header);

    for row in rows {
        table.rows.push(row.iter().map(spreadsheet_cell).collect());
    }
    Ok(table)
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if s.trim().is_empty() => CellValue::Missing,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Empty | Data::Error(_) => CellValue::Missing,
        // Dates and durations are labels here, never measurements.
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one value per cell.
/// Empty cells are missing; other cells are typed by [`guess_cell_type`].
fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut table = RawTable::with_header(&headers);

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != table.width() {
            return Err(malformed(format!(
                "row {row_no} has {} cells but the header has {}",
                record.len(),
                table.width()
            )));
        }
        table.rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(table)
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Missing;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "DEPTH": 1500.0, "GR": 85.2, "FACIES": "sand" },
///   ...
/// ]
/// ```
///
/// Column order is taken from the first record; later records may omit keys
/// (the cell is then missing) but may not introduce new ones.
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let Some(records) = root.as_array() else {
        return Err(malformed("expected a top-level JSON array of records"));
    };
    let Some(first) = records.first() else {
        return Ok(RawTable::default());
    };
    let Some(first) = first.as_object() else {
        return Err(malformed("row 0 is not a JSON object"));
    };

    let header: Vec<&String> = first.keys().collect();
    let mut table = RawTable::with_header(&header);

    for (i, rec) in records.iter().enumerate() {
        let Some(obj) = rec.as_object() else {
            return Err(malformed(format!("row {i} is not a JSON object")));
        };
        if let Some(extra) = obj.keys().find(|k| !first.contains_key(*k)) {
            return Err(malformed(format!("row {i} has unknown column '{extra}'")));
        }
        table.rows.push(
            header
                .iter()
                .map(|key| obj.get(*key).map_or(CellValue::Missing, json_to_cell))
                .collect(),
        );
    }

    Ok(table)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::String(s) if s.trim().is_empty() => CellValue::Missing,
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Missing,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per log curve.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Nested columns are rejected.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let schema = builder.schema().clone();
    let header: Vec<&String> = schema.fields().iter().map(|f| f.name()).collect();
    let mut table = RawTable::with_header(&header);

    if let Some(field) = schema
        .fields()
        .iter()
        .find(|f| !is_supported_type(f.data_type()))
    {
        return Err(malformed(format!(
            "column '{}' has unsupported type {:?}",
            field.name(),
            field.data_type()
        )));
    }

    let reader = builder.build().context("building parquet reader")?;
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row}"))?;
            table.rows.push(cells);
        }
    }

    Ok(table)
}

// -- Parquet / Arrow helpers --

fn is_supported_type(dt: &DataType) -> bool {
    matches!(
        dt,
        DataType::Utf8
            | DataType::LargeUtf8
            | DataType::Boolean
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::Float32
            | DataType::Float64
            | DataType::Null
    )
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Missing);
    }
    let cell = match col.data_type() {
        DataType::Null => CellValue::Missing,
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row).into()),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row).into()),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        other => return Err(anyhow!("unsupported column type {other:?}")),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

    use crate::data::model::ColumnKind;

    /// Write a single-sheet workbook; `fill` writes everything below the header.
    fn write_workbook(
        dir: &tempfile::TempDir,
        header: &[&str],
        fill: impl FnOnce(&mut Worksheet) -> Result<(), XlsxError>,
    ) -> PathBuf {
        let path = dir.path().join("well.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in header.iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        fill(sheet).unwrap();
        workbook.save(&path).unwrap();
        path
    }

    fn write_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn csv_load_runs_the_cleaning_pipeline() {
        let mut csv = String::from("DEPTH,POROSITY,PERM\n");
        for i in 0..10 {
            let perm = if i == 7 { "-999.25" } else { "50" };
            csv.push_str(&format!("{},0.2,{perm}\n", 1000 + i * 10));
        }
        let file = write_file(".csv", &csv);

        let ds = load(file.path(), &PipelineConfig::default()).unwrap();
        assert_eq!(ds.len(), 9);
        assert_eq!(ds.feature_columns(), vec!["POROSITY", "PERM"]);
        assert!(ds.rows.iter().flatten().all(|c| !c.is_missing()));
    }

    #[test]
    fn csv_blank_cells_are_missing() {
        let file = write_file(".csv", "DEPTH,GR,FACIES\n1,2,sand\n2,,shale\n3,4,\n");
        let table = read_table(file.path()).unwrap();
        assert_eq!(table.rows[1][1], CellValue::Missing);
        assert_eq!(table.rows[2][2], CellValue::Missing);
        assert_eq!(table.rows[0][2], CellValue::Text("sand".into()));

        let ds = load(file.path(), &PipelineConfig::default()).unwrap();
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn missing_depth_column_is_fatal() {
        let file = write_file(".csv", "MD,GR\n1,2\n2,3\n");
        let err = load(file.path(), &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::MissingDepthColumn(ref c) if c == "DEPTH"));
        assert_eq!(err.to_string(), "'DEPTH' column not found in dataset.");
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        let err = load(Path::new("/nonexistent/well.xlsx"), &PipelineConfig::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::FileRead { .. }));

        let corrupt = write_file(".xlsx", "this is not a workbook");
        let err = load(corrupt.path(), &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::FileRead { .. }));
    }

    #[test]
    fn xlsx_sentinel_row_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(&dir, &["DEPTH", "POROSITY", "PERM"], |sheet| {
            for i in 0..10u32 {
                let row = i + 1;
                let perm = if i == 4 { -999.25 } else { 50.0 };
                sheet.write_number(row, 0, 1000.0 + f64::from(i) * 10.0)?;
                sheet.write_number(row, 1, 0.2)?;
                sheet.write_number(row, 2, perm)?;
            }
            Ok(())
        });

        let ds = load(&path, &PipelineConfig::default()).unwrap();
        assert_eq!(ds.len(), 9);
        assert_eq!(ds.feature_columns(), vec!["POROSITY", "PERM"]);
        let perm = ds.numeric_column("PERM").unwrap();
        assert!(perm.iter().all(|v| *v == 50.0));
        assert!(!ds.numeric_column("DEPTH").unwrap().contains(&1040.0));
    }

    #[test]
    fn xlsx_cells_are_typed_and_blanks_are_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(&dir, &["DEPTH", "POROSITY", "PERM", "FACIES"], |sheet| {
            for i in 0..10u32 {
                let row = i + 1;
                let perm = if i == 4 { -999.25 } else { 50.0 };
                sheet.write_number(row, 0, 1000.0 + f64::from(i) * 10.0)?;
                sheet.write_number(row, 1, 0.2)?;
                sheet.write_number(row, 2, perm)?;
                match i {
                    // Row 7 leaves FACIES empty; row 8 holds only whitespace.
                    7 => {}
                    8 => {
                        sheet.write_string(row, 3, "   ")?;
                    }
                    _ => {
                        sheet.write_string(row, 3, if i % 2 == 0 { "sand" } else { "shale" })?;
                    }
                }
            }
            Ok(())
        });

        let table = read_table(&path).unwrap();
        assert_eq!(table.columns, vec!["DEPTH", "POROSITY", "PERM", "FACIES"]);
        assert_eq!(table.rows.len(), 10);
        assert!(table.rows[0][0].is_numeric());
        assert_eq!(table.rows[0][0].as_f64(), Some(1000.0));
        assert_eq!(table.rows[1][3], CellValue::Text("shale".into()));
        assert_eq!(table.rows[7][3], CellValue::Missing);
        assert_eq!(table.rows[8][3], CellValue::Missing);

        let ds = load(&path, &PipelineConfig::default()).unwrap();
        assert_eq!(
            ds.kinds,
            vec![
                ColumnKind::Numeric,
                ColumnKind::Numeric,
                ColumnKind::Numeric,
                ColumnKind::Other
            ]
        );
        assert_eq!(ds.len(), 7);
        assert_eq!(
            ds.numeric_column("DEPTH").unwrap(),
            vec![1000.0, 1010.0, 1020.0, 1030.0, 1050.0, 1060.0, 1090.0]
        );
        assert!(ds.rows.iter().flatten().all(|c| !c.is_missing()));
    }

    #[test]
    fn xlsx_header_names_are_normalised() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(&dir, &["DEPTH", "GR", "", "GR"], |sheet| {
            for col in 0..4u16 {
                sheet.write_number(1, col, 1.0 + f64::from(col))?;
            }
            Ok(())
        });
        let table = read_table(&path).unwrap();
        assert_eq!(table.columns, vec!["DEPTH", "GR", "Unnamed: 2", "GR.1"]);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = write_file(".las", "~VERSION\n");
        let err = load(file.path(), &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ref e) if e == "las"));
    }

    #[test]
    fn json_records_keep_key_order() {
        let file = write_file(
            ".json",
            r#"[
                {"GR": 80, "DEPTH": 1500.0, "FACIES": "sand"},
                {"GR": 82, "DEPTH": 1500.5, "FACIES": null},
                {"GR": 81, "DEPTH": 1501.0}
            ]"#,
        );
        let table = read_table(file.path()).unwrap();
        assert_eq!(table.columns, vec!["GR", "DEPTH", "FACIES"]);
        assert_eq!(table.rows[1][2], CellValue::Missing);
        assert_eq!(table.rows[2][2], CellValue::Missing);
        assert_eq!(table.rows[0][0], CellValue::Integer(80));
    }

    #[test]
    fn ragged_csv_is_malformed() {
        let file = write_file(".csv", "DEPTH,GR\n1,2\n2\n");
        assert!(matches!(
            read_table(file.path()).unwrap_err(),
            LoadError::Malformed(_)
        ));
    }

    #[test]
    fn json_must_be_records() {
        let file = write_file(".json", r#"{"DEPTH": [1, 2]}"#);
        assert!(matches!(
            read_table(file.path()).unwrap_err(),
            LoadError::Malformed(_)
        ));
    }

    #[test]
    fn parquet_scalar_columns_load() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("DEPTH", DataType::Float64, false),
            Field::new("GR", DataType::Float64, true),
            Field::new("ZONE", DataType::Utf8, false),
            Field::new("CORE_ID", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![1000.0, 1000.5, 1001.0])),
                Arc::new(Float64Array::from(vec![Some(75.0), None, Some(-999.25)])),
                Arc::new(StringArray::from(vec!["Tarbert", "Tarbert", "Ness"])),
                Arc::new(Int64Array::from(vec![1, 2, 3])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = read_table(file.path()).unwrap();
        assert_eq!(table.columns, vec!["DEPTH", "GR", "ZONE", "CORE_ID"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1][1], CellValue::Missing);
        assert_eq!(table.rows[2][2], CellValue::Text("Ness".into()));
        assert_eq!(table.rows[2][3], CellValue::Integer(3));

        let ds = load(file.path(), &PipelineConfig::default()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.numeric_column("DEPTH").unwrap(), vec![1000.0]);
    }
}
