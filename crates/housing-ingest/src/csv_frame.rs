use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::ReaderBuilder;
use housing_common::parse_f64;
use polars::prelude::{Column, DataFrame, DataType};

/// Cell values read as missing.
pub const MISSING_TOKENS: &[&str] = &["", "NA"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Float,
    Text,
    Empty,
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn normalize_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    if MISSING_TOKENS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_finite(value: &str) -> Option<f64> {
    parse_f64(value).filter(|v| v.is_finite())
}

fn infer_kind(values: &[Option<String>]) -> ColumnKind {
    let mut observed = values.iter().flatten().peekable();
    if observed.peek().is_none() {
        return ColumnKind::Empty;
    }
    let mut kind = ColumnKind::Integer;
    for value in observed {
        if kind == ColumnKind::Integer && value.parse::<i64>().is_ok() {
            continue;
        }
        if parse_finite(value).is_some() {
            kind = ColumnKind::Float;
        } else {
            return ColumnKind::Text;
        }
    }
    kind
}

fn build_column(name: &str, values: Vec<Option<String>>) -> Column {
    let kind = infer_kind(&values);
    tracing::debug!(column = name, kind = ?kind, "Inferred column type");
    match kind {
        ColumnKind::Integer => {
            let parsed: Vec<Option<i64>> = values
                .iter()
                .map(|v| v.as_deref().and_then(|s| s.parse::<i64>().ok()))
                .collect();
            Column::new(name.into(), parsed)
        }
        ColumnKind::Float => {
            let parsed: Vec<Option<f64>> = values
                .iter()
                .map(|v| v.as_deref().and_then(parse_finite))
                .collect();
            Column::new(name.into(), parsed)
        }
        ColumnKind::Text => Column::new(name.into(), values),
        ColumnKind::Empty => Column::full_null(name.into(), values.len(), &DataType::String),
    }
}

/// Reads a housing CSV file.
///
/// See [`read_housing_csv_from_reader`] for the parsing rules.
pub fn read_housing_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).with_context(|| format!("open csv: {}", path.display()))?;
    let df = read_housing_csv_from_reader(file)
        .with_context(|| format!("read csv: {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Loaded housing data"
    );
    Ok(df)
}

/// Reads housing CSV text with a header row.
///
/// `NA` and empty cells are missing. A column is `Int64` when every observed
/// value is an integer, `Float64` when every observed value is a number, and
/// `String` otherwise. Fully missing columns are `String` nulls.
pub fn read_housing_csv_from_reader<R: Read>(reader: R) -> Result<DataFrame> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .context("read header row")?
        .iter()
        .map(normalize_header)
        .collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        bail!("csv has no header row");
    }
    let mut seen = BTreeSet::new();
    for header in &headers {
        if header.is_empty() {
            bail!("csv has an empty column name");
        }
        if !seen.insert(header.as_str()) {
            bail!("duplicate column name: {header}");
        }
    }

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read record {}", line + 1))?;
        for (idx, raw) in record.iter().enumerate() {
            cells[idx].push(normalize_cell(raw));
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(cells)
        .map(|(name, values)| build_column(name, values))
        .collect();
    DataFrame::new(columns).context("build data frame")
}
