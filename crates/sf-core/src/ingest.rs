//! Tabular time-series ingestion.
//!
//! The only persisted input format: comma-separated numeric tables where
//! rows are variables (or grouped units) and columns are time points.
//! Blank lines and `#` comment lines are skipped. The reader validates
//! shape while parsing so malformed files fail with a line-level error
//! before any series is constructed.

use crate::series::TimeSeries;
use sf_common::{Error, Result};
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parse a table from a reader into a series.
///
/// Each data row becomes one variable of the resulting series; columns
/// are time points, in order.
pub fn read_table<R: BufRead>(reader: R) -> Result<TimeSeries> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut width: Option<usize> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut row = Vec::new();
        for (col, field) in trimmed.split(',').enumerate() {
            let value: f64 = field.trim().parse().map_err(|_| Error::TableSchema {
                line: line_no,
                message: format!("column {}: not a number: {:?}", col + 1, field.trim()),
            })?;
            row.push(value);
        }

        match width {
            None => width = Some(row.len()),
            Some(w) if w != row.len() => {
                return Err(Error::TableSchema {
                    line: line_no,
                    message: format!("expected {w} columns, found {}", row.len()),
                });
            }
            Some(_) => {}
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(Error::TableSchema {
            line: 0,
            message: "no data rows".to_string(),
        });
    }

    // Transpose: rows are variables, the series is indexed by time.
    let steps = rows[0].len();
    let points: Vec<Vec<f64>> = (0..steps)
        .map(|t| rows.iter().map(|r| r[t]).collect())
        .collect();

    TimeSeries::new(points)
}

/// Read a table from a file path.
pub fn read_table_path(path: &Path) -> Result<TimeSeries> {
    let file = std::fs::File::open(path)?;
    read_table(BufReader::new(file))
}

/// Write a series as a table (one row per variable).
pub fn write_table<W: std::io::Write>(series: &TimeSeries, mut writer: W) -> Result<()> {
    for var in 0..series.dim() {
        let row: Vec<String> = series.variable(var).iter().map(|v| v.to_string()).collect();
        writeln!(writer, "{}", row.join(","))?;
    }
    Ok(())
}

/// Write a series to a file path.
pub fn write_table_path(series: &TimeSeries, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_table(series, std::io::BufWriter::new(file))
}
