use std::fmt;

#[derive(Debug)]
pub enum MigrationError {
    /// A location id appears twice in a list that must be unique.
    DuplicateLocation(String),
    /// A primary key appears twice in a keyed extraction.
    DuplicateKey(String),
    /// Missing required column in delimited input.
    MissingColumn { column: String },
    /// Malformed record. `line` is 1-based.
    Parse { line: usize, message: String },
    /// No catalog entry or vintage for this reporting year.
    UnknownYear(u16),
    /// Catalog TOML parse / deserialization error.
    ConfigParse(String),
    /// Catalog validation error.
    ConfigValidation(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateLocation(id) => write!(f, "duplicate location id '{id}'"),
            Self::DuplicateKey(key) => {
                write!(f, "primary key column is not unique (duplicate value found: '{key}')")
            }
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::Parse { line, message } => write!(f, "line {line}: {message}"),
            Self::UnknownYear(year) => write!(f, "year {year} out of range"),
            Self::ConfigParse(msg) => write!(f, "catalog parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "catalog validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for MigrationError {}

impl From<std::io::Error> for MigrationError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
