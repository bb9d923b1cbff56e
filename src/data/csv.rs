//! CSV feature matrix loader
//!
//! Supports loading feature matrices from CSV files where:
//! - Each row is one sample
//! - Every column is a feature (there is no label column)
//! - First row can be headers (automatically detected)
//! - Blank lines and lines starting with `#` are skipped

use crate::core::{FeatureMatrix, GramError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Load a feature matrix from a CSV file
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<FeatureMatrix> {
    let file = File::open(path).map_err(GramError::IoError)?;
    from_reader(BufReader::new(file))
}

/// Load a feature matrix from a reader, detecting a header line
pub fn from_reader<R: BufRead>(reader: R) -> Result<FeatureMatrix> {
    from_reader_with_options(reader, true)
}

/// Load a feature matrix from a reader with explicit header option
pub fn from_reader_with_options<R: BufRead>(
    reader: R,
    auto_detect_header: bool,
) -> Result<FeatureMatrix> {
    let mut data = Vec::new();
    let mut n_features = None;
    let mut n_samples = 0;
    let mut first_row = true;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(GramError::IoError)?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if first_row {
            first_row = false;
            if auto_detect_header && is_header_line(line) {
                continue;
            }
        }

        let row = parse_data_line(line, line_no + 1)?;
        match n_features {
            None => n_features = Some(row.len()),
            Some(expected) if expected != row.len() => {
                return Err(GramError::DimensionMismatch {
                    expected,
                    actual: row.len(),
                });
            }
            Some(_) => {}
        }
        data.extend(row);
        n_samples += 1;
    }

    let n_features = n_features.ok_or(GramError::EmptyDataset)?;
    // Rows are samples, which is exactly the column-major layout
    FeatureMatrix::new(n_features, n_samples, data)
}

/// Check if a line appears to be a header
fn is_header_line(line: &str) -> bool {
    let fields: Vec<&str> = line.split(',').collect();

    let non_numeric_count = fields
        .iter()
        .filter(|field| field.trim().parse::<f32>().is_err())
        .count();

    non_numeric_count * 2 > fields.len()
}

/// Parse a CSV data line into feature values
fn parse_data_line(line: &str, line_no: usize) -> Result<Vec<f32>> {
    line.split(',')
        .map(|field| {
            let field = field.trim();
            field.parse::<f32>().map_err(|_| {
                GramError::ParseError(format!("Invalid feature value on line {line_no}: {field:?}"))
            })
        })
        .collect()
}
