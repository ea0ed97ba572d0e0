//! Plain-text array files.
//!
//! Matrices are headerless CSV, one row per line. Vectors are one value per
//! line and load as `n x 1` columns. Location lists are one id per line.

use std::fmt::Display;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::CliError;

fn open(path: &Path) -> Result<File, CliError> {
    File::open(path).map_err(|e| CliError::io(format!("{}: {e}", path.display())))
}

fn parse_value(path: &Path, line: usize, field: &str) -> Result<f64, CliError> {
    field.parse::<f64>().map_err(|_| {
        CliError::parse(format!("{}:{line}: '{field}' is not a number", path.display()))
    })
}

/// Read a headerless numeric CSV. An empty file is a `0 x 0` matrix.
pub fn read_matrix(path: &Path) -> Result<Array2<f64>, CliError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(open(path)?);

    let mut values = Vec::new();
    let mut cols = None;
    let mut rows = 0;

    for result in reader.records() {
        let record = result.map_err(|e| CliError::parse(format!("{}: {e}", path.display())))?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(rows + 1);
        if record.len() == 1 && record.get(0) == Some("") {
            continue;
        }

        match cols {
            None => cols = Some(record.len()),
            Some(n) if n != record.len() => {
                return Err(CliError::parse(format!(
                    "{}:{line}: expected {n} values, found {}",
                    path.display(),
                    record.len()
                )));
            }
            Some(_) => {}
        }
        for field in record.iter() {
            values.push(parse_value(path, line, field)?);
        }
        rows += 1;
    }

    let cols = cols.unwrap_or(0);
    log::debug!("read {rows}x{cols} matrix from {}", path.display());
    Array2::from_shape_vec((rows, cols), values)
        .map_err(|e| CliError::parse(format!("{}: {e}", path.display())))
}

/// Read one value per line into an `n x 1` column. A single-row file with
/// several values is read as a column too.
pub fn read_vector(path: &Path) -> Result<Array2<f64>, CliError> {
    let m = read_matrix(path)?;
    let values: Vec<f64> = match m.dim() {
        (_, 1) | (0, _) | (1, _) => m.into_iter().collect(),
        (rows, cols) => {
            return Err(CliError::shape(format!(
                "{}: expected a single column, found {rows}x{cols}",
                path.display()
            )));
        }
    };
    let n = values.len();
    Array2::from_shape_vec((n, 1), values)
        .map_err(|e| CliError::parse(format!("{}: {e}", path.display())))
}

/// Read location ids, one per line, ignoring blank lines.
pub fn read_locations(path: &Path) -> Result<Vec<String>, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("{}: {e}", path.display())))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A file when given a path, stdout otherwise.
pub fn output_writer(output: Option<&PathBuf>) -> Result<Box<dyn Write>, CliError> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| CliError::io(format!("{}: {e}", path.display())))?;
            Ok(Box::new(io::BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

pub fn write_matrix<T: Display>(
    matrix: &Array2<T>,
    output: Option<&PathBuf>,
) -> Result<(), CliError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output_writer(output)?);

    for row in matrix.rows() {
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .map_err(|e| CliError::io(e.to_string()))?;
    }
    writer.flush().map_err(|e| CliError::io(e.to_string()))
}

pub fn write_lines<S: AsRef<str>>(lines: &[S], output: Option<&PathBuf>) -> Result<(), CliError> {
    let mut out = output_writer(output)?;
    for line in lines {
        writeln!(out, "{}", line.as_ref()).map_err(|e| CliError::io(e.to_string()))?;
    }
    out.flush().map_err(|e| CliError::io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::{EXIT_PARSE, EXIT_SHAPE};

    fn file(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn matrix_rows_and_columns() {
        let f = file("0, 1.5, 2\n3,4,5e-1\n");
        let m = read_matrix(f.path()).unwrap();
        assert_eq!(m, ndarray::array![[0.0, 1.5, 2.0], [3.0, 4.0, 0.5]]);
    }

    #[test]
    fn empty_matrix() {
        let f = file("");
        assert_eq!(read_matrix(f.path()).unwrap().dim(), (0, 0));
    }

    #[test]
    fn ragged_matrix_is_parse_error() {
        let f = file("1,2\n3\n");
        let err = read_matrix(f.path()).unwrap_err();
        assert_eq!(err.code, EXIT_PARSE);
        assert!(err.message.contains(":2:"), "{}", err.message);
    }

    #[test]
    fn non_numeric_cell() {
        let f = file("1,abc\n");
        let err = read_matrix(f.path()).unwrap_err();
        assert_eq!(err.code, EXIT_PARSE);
        assert!(err.message.contains("'abc'"));
    }

    #[test]
    fn vector_from_lines_or_row() {
        let lines = file("1\n2\n3\n");
        assert_eq!(read_vector(lines.path()).unwrap().dim(), (3, 1));

        let row = file("1,2,3\n");
        let v = read_vector(row.path()).unwrap();
        assert_eq!(v.dim(), (3, 1));
        assert_eq!(v[[2, 0]], 3.0);
    }

    #[test]
    fn vector_rejects_matrix() {
        let f = file("1,2\n3,4\n");
        assert_eq!(read_vector(f.path()).unwrap_err().code, EXIT_SHAPE);
    }

    #[test]
    fn locations_skip_blank_lines() {
        let f = file("01001\n\n 01003 \n");
        assert_eq!(read_locations(f.path()).unwrap(), vec!["01001", "01003"]);
    }

    #[test]
    fn matrix_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.csv");
        let m = ndarray::array![[0.25, 1.0], [1e-12, 0.0]];
        write_matrix(&m, Some(&path)).unwrap();
        assert_eq!(read_matrix(&path).unwrap(), m);
    }
}
