use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, AsArray, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::units::Unit;

use super::model::{Column, MetadataValue, Table, TableMeta};

/// First header line of the self-describing text format.
pub const ECSV_MARKER: &str = "%ECSV 1.0";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.ecsv`    – self-describing text: YAML header in `#` lines, delimited body
/// * `.parquet` – Float64 columns, units and metadata in the Arrow schema
/// * `.csv`     – comma separated text (or `delimiter`)
/// * anything else – whitespace separated text (or `delimiter`)
///
/// For the plain text formats, `columns` replaces the names found in the
/// header row.
pub fn read_table(path: &Path, columns: Option<&[String]>, delimiter: Option<char>) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "ecsv" => read_ecsv(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        "csv" => read_delimited(path, columns, Some(delimiter.unwrap_or(',')))?,
        _ => read_delimited(path, columns, delimiter)?,
    };
    log::info!(
        "Read {} rows x {} columns {:?} from {}",
        table.len(),
        table.ncols(),
        table.column_names(),
        path.display()
    );
    Ok(table)
}

/// Write a table in the format implied by the extension (`.ecsv` or `.parquet`).
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "ecsv" => write_ecsv(table, path),
        "parquet" | "pq" => write_parquet(table, path),
        other => Err(Error::format(format!("cannot write tables as .{other}"))),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}

fn delimiter_byte(d: char) -> Result<u8> {
    if d.is_ascii() {
        Ok(d as u8)
    } else {
        Err(Error::format(format!("delimiter '{d}' is not an ASCII character")))
    }
}

fn parse_cell(cell: &str, row: usize, col: &str) -> Result<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>()
        .map_err(|_| Error::format(format!("row {row}, column '{col}': '{cell}' is not a number")))
}

fn columns_from_rows(
    names: Vec<String>,
    units: Vec<Option<Unit>>,
    rows: Vec<Vec<String>>,
) -> Result<Vec<Column>> {
    let mut values: Vec<Vec<f64>> = vec![Vec::with_capacity(rows.len()); names.len()];
    for (row_no, row) in rows.iter().enumerate() {
        if row.len() != names.len() {
            return Err(Error::format(format!(
                "row {row_no} has {} fields but there are {} columns",
                row.len(),
                names.len()
            )));
        }
        for (j, cell) in row.iter().enumerate() {
            values[j].push(parse_cell(cell, row_no, &names[j])?);
        }
    }
    Ok(names
        .into_iter()
        .zip(units)
        .zip(values)
        .map(|((name, unit), values)| Column { name, unit, values })
        .collect())
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Plain text table.  Lines starting with `#` are comments.  The first
/// remaining row is the header; when `columns` is given it is skipped and
/// those names are used instead.  Without a delimiter, fields are split on
/// runs of whitespace.
fn read_delimited(path: &Path, columns: Option<&[String]>, delimiter: Option<char>) -> Result<Table> {
    let mut records: Vec<Vec<String>> = match delimiter {
        Some(d) => {
            let mut reader = csv::ReaderBuilder::new()
                .delimiter(delimiter_byte(d)?)
                .comment(Some(b'#'))
                .has_headers(false)
                .trim(csv::Trim::All)
                .from_path(path)?;
            let mut rows = Vec::new();
            for result in reader.records() {
                let record = result?;
                rows.push(record.iter().map(str::to_string).collect());
            }
            rows
        }
        None => {
            let reader = BufReader::new(File::open(path)?);
            let mut rows = Vec::new();
            for line in reader.lines() {
                let line = line?;
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                rows.push(line.split_whitespace().map(str::to_string).collect());
            }
            rows
        }
    };

    if records.is_empty() {
        return Err(Error::format(format!("{}: no header row", path.display())));
    }
    let header = records.remove(0);
    let names: Vec<String> = match columns {
        Some(cols) => cols.to_vec(),
        None => header,
    };
    let units = vec![None; names.len()];
    let columns = columns_from_rows(names, units, records)?;

    let stem = file_stem(path);
    let meta = TableMeta {
        title: stem.clone(),
        label: stem,
        ..Default::default()
    };
    Ok(Table::new(columns, meta))
}

// ---------------------------------------------------------------------------
// Self-describing text (ECSV: YAML header + delimited body)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct ColumnHeader {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit: Option<Unit>,
    #[serde(default = "default_datatype")]
    datatype: String,
}

fn default_datatype() -> String {
    "float64".to_string()
}

fn default_delimiter() -> char {
    ' '
}

fn is_default_delimiter(d: &char) -> bool {
    *d == default_delimiter()
}

#[derive(Debug, Serialize, Deserialize)]
struct EcsvHeader {
    #[serde(default = "default_delimiter", skip_serializing_if = "is_default_delimiter")]
    delimiter: char,
    datatype: Vec<ColumnHeader>,
    #[serde(default)]
    meta: serde_yaml::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schema: Option<String>,
}

fn yaml_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Header `meta` block as [`TableMeta`].
///
/// Accepts a plain mapping or an ordered map (`!!omap`, a sequence of
/// one-key mappings).  Unknown keys whose value is not a simple scalar or
/// list are dropped.
fn meta_from_yaml(mut value: serde_yaml::Value) -> Result<TableMeta> {
    use serde_yaml::Value;

    while let Value::Tagged(tagged) = value {
        value = tagged.value;
    }
    let entries: Vec<(Value, Value)> = match value {
        Value::Null => Vec::new(),
        Value::Mapping(map) => map.into_iter().collect(),
        Value::Sequence(items) => {
            let mut entries = Vec::new();
            for item in items {
                match item {
                    Value::Mapping(map) => entries.extend(map),
                    other => return Err(Error::format(format!("unexpected meta entry {other:?}"))),
                }
            }
            entries
        }
        other => return Err(Error::format(format!("unexpected meta block {other:?}"))),
    };

    let mut meta = TableMeta::default();
    for (key, val) in entries {
        let Some(key) = yaml_text(&key) else {
            continue;
        };
        match key.as_str() {
            "title" => meta.title = yaml_text(&val).unwrap_or_default(),
            "label" => meta.label = yaml_text(&val).unwrap_or_default(),
            "History" | "history" => {
                meta.history = match val {
                    Value::Sequence(items) => items.iter().filter_map(yaml_text).collect(),
                    other => yaml_text(&other).into_iter().collect(),
                }
            }
            _ => match serde_yaml::from_value::<MetadataValue>(val) {
                Ok(v) => {
                    meta.extra.insert(key, v);
                }
                Err(e) => log::debug!("Skipping meta key '{key}': {e}"),
            },
        }
    }
    Ok(meta)
}

/// Expected layout (as written by astropy):
///
/// ```text
/// # %ECSV 1.0
/// # ---
/// # datatype:
/// # - {name: Wavelength, unit: nm, datatype: float64}
/// # - {name: Electrical Current, unit: A, datatype: float64}
/// # meta: !!omap
/// # - {title: Blue filter Measurements}
/// # - {label: Blue}
/// # - History: [...]
/// Wavelength "Electrical Current"
/// 350.0 1.2e-9
/// ```
fn read_ecsv(path: &Path) -> Result<Table> {
    let reader = BufReader::new(File::open(path)?);
    let mut header_lines = Vec::new();
    let mut body = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if let Some(comment) = line.strip_prefix('#') {
            header_lines.push(comment.strip_prefix(' ').unwrap_or(comment).to_string());
        } else if !line.trim().is_empty() {
            body.push(line);
        }
    }

    match header_lines.first() {
        Some(first) if first.trim() == ECSV_MARKER => {}
        _ => {
            return Err(Error::format(format!(
                "{}: missing '{ECSV_MARKER}' marker line",
                path.display()
            )))
        }
    }
    let header: EcsvHeader = serde_yaml::from_str(&header_lines[1..].join("\n"))?;

    let body = body.join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte(header.delimiter)?)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());
    let names: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let declared: Vec<&str> = header.datatype.iter().map(|c| c.name.as_str()).collect();
    if names != declared {
        return Err(Error::format(format!(
            "{}: body columns {names:?} do not match header columns {declared:?}",
            path.display()
        )));
    }
    let mut rows = Vec::new();
    for result in reader.records() {
        rows.push(result?.iter().map(str::to_string).collect());
    }
    let units = header.datatype.into_iter().map(|c| c.unit).collect();
    let columns = columns_from_rows(names, units, rows)?;
    Ok(Table::new(columns, meta_from_yaml(header.meta)?))
}

/// Write `table` as ECSV, space separated.  Values use the shortest
/// representation that parses back to the same `f64`.
pub fn write_ecsv(table: &Table, path: &Path) -> Result<()> {
    table.validate()?;
    let header = EcsvHeader {
        delimiter: default_delimiter(),
        datatype: table
            .columns
            .iter()
            .map(|c| ColumnHeader {
                name: c.name.clone(),
                unit: c.unit.clone(),
                datatype: default_datatype(),
            })
            .collect(),
        meta: serde_yaml::to_value(&table.meta)?,
        schema: None,
    };
    let yaml = serde_yaml::to_string(&header)?;

    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# {ECSV_MARKER}")?;
    writeln!(out, "# ---")?;
    for line in yaml.lines().filter(|l| *l != "---") {
        writeln!(out, "# {line}")?;
    }
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter_byte(header.delimiter)?)
        .from_writer(out);
    writer.write_record(table.columns.iter().map(|c| c.name.as_str()))?;
    for row in 0..table.len() {
        writer.write_record(table.columns.iter().map(|c| c.values[row].to_string()))?;
    }
    writer.flush()?;
    log::debug!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet loader / writer
// ---------------------------------------------------------------------------

const UNIT_KEY: &str = "unit";
const TITLE_KEY: &str = "title";
const LABEL_KEY: &str = "label";
const HISTORY_KEY: &str = "History";
const EXTRA_KEY: &str = "meta";

/// Load a Parquet file of numeric columns.
///
/// Every column is cast to Float64 (nulls become NaN).  Column units come from
/// the Arrow field metadata key `unit`; `title`, `label`, `History` (JSON
/// array) and `meta` (JSON object) from the schema metadata.
fn read_parquet(path: &Path) -> Result<Table> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let mut values: Vec<Vec<f64>> = vec![Vec::new(); schema.fields().len()];
    for batch_result in reader {
        let batch = batch_result?;
        for (j, col) in batch.columns().iter().enumerate() {
            values[j].extend(f64_values(col)?);
        }
    }

    let columns = schema
        .fields()
        .iter()
        .zip(values)
        .map(|(field, values)| Column {
            name: field.name().clone(),
            unit: field.metadata().get(UNIT_KEY).map(|u| Unit::from(u.as_str())),
            values,
        })
        .collect();

    let md = schema.metadata();
    let mut meta = TableMeta {
        title: md.get(TITLE_KEY).cloned().unwrap_or_else(|| file_stem(path)),
        label: md.get(LABEL_KEY).cloned().unwrap_or_else(|| file_stem(path)),
        ..Default::default()
    };
    if let Some(history) = md.get(HISTORY_KEY) {
        meta.history = serde_json::from_str(history)?;
    }
    if let Some(extra) = md.get(EXTRA_KEY) {
        meta.extra = serde_json::from_str(extra)?;
    }
    Ok(Table::new(columns, meta))
}

/// Numeric Arrow array as `f64` values.
fn f64_values(col: &ArrayRef) -> Result<Vec<f64>> {
    let casted = match col.data_type() {
        DataType::Float64 => col.clone(),
        DataType::Float32
        | DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => cast(col, &DataType::Float64)?,
        other => {
            return Err(Error::format(format!(
                "expected a numeric column, got {other:?}"
            )))
        }
    };
    let arr = casted.as_primitive::<Float64Type>();
    Ok(arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// Write `table` as a single-batch Parquet file.
pub fn write_parquet(table: &Table, path: &Path) -> Result<()> {
    table.validate()?;
    let fields: Vec<Field> = table
        .columns
        .iter()
        .map(|c| {
            let field = Field::new(&c.name, DataType::Float64, true);
            match &c.unit {
                Some(unit) => field.with_metadata(HashMap::from([(
                    UNIT_KEY.to_string(),
                    unit.to_string(),
                )])),
                None => field,
            }
        })
        .collect();

    let mut md = HashMap::from([
        (TITLE_KEY.to_string(), table.meta.title.clone()),
        (LABEL_KEY.to_string(), table.meta.label.clone()),
        (HISTORY_KEY.to_string(), serde_json::to_string(&table.meta.history)?),
    ]);
    if !table.meta.extra.is_empty() {
        md.insert(EXTRA_KEY.to_string(), serde_json::to_string(&table.meta.extra)?);
    }
    let schema = Arc::new(Schema::new_with_metadata(fields, md));

    let arrays: Vec<ArrayRef> = table
        .columns
        .iter()
        .map(|c| Arc::new(Float64Array::from(c.values.clone())) as ArrayRef)
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;
    if log::log_enabled!(log::Level::Debug) {
        let head = batch.slice(0, batch.num_rows().min(5));
        log::debug!(
            "Writing {} rows to {}, first rows:\n{}",
            batch.num_rows(),
            path.display(),
            arrow::util::pretty::pretty_format_batches(&[head])?
        );
    }

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
