use polars::prelude::*;

use super::RowError;

/// Cells of a column as written in the table.
pub fn utf8_column(
    df: &DataFrame,
    name: &str,
) -> Result<Vec<Option<String>>, RowError> {
    let series = df
        .column(name)
        .map_err(|_| RowError::MissingColumn(name.to_string()))?
        .cast(&DataType::Utf8)?;
    let values = series
        .utf8()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

pub fn optional_utf8_column(
    df: &DataFrame,
    name: &str,
) -> Result<Vec<Option<String>>, RowError> {
    if has_column(df, name) {
        utf8_column(df, name)
    } else {
        Ok(vec![None; df.height()])
    }
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().contains(&name)
}

fn malformed(line: usize, field: &str, reason: &str) -> RowError {
    RowError::Malformed {
        line,
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// The non-blank content of a cell.
pub fn required<'a>(
    cell: &'a Option<String>,
    line: usize,
    field: &str,
) -> Result<&'a str, RowError> {
    cell.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed(line, field, "is missing"))
}

/// Whole numbers only, `1278.5` and `1278.0` are both rejected.
pub fn parse_integer(cell: &str) -> Option<i64> {
    cell.trim().parse().ok()
}

pub fn integer(cell: &str, line: usize, field: &str) -> Result<i64, RowError> {
    parse_integer(cell).ok_or_else(|| malformed(line, field, "is not an integer"))
}

pub fn optional_integer(
    cell: &Option<String>,
    line: usize,
    field: &str,
) -> Result<Option<i64>, RowError> {
    match cell.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => integer(value, line, field).map(Some),
    }
}

pub fn number(cell: &str, line: usize, field: &str) -> Result<f64, RowError> {
    cell.trim()
        .parse()
        .map_err(|_| malformed(line, field, "is not a number"))
}
