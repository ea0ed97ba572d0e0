//! Raw report parsing: every vintage becomes canonical [`FlowRecord`]s.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::MigrationError;
use crate::model::FlowRecord;
use crate::vintage::Vintage;

// ---------------------------------------------------------------------------
// Location ids
// ---------------------------------------------------------------------------

/// Zero-padded 2-digit state + 3-digit county code, e.g. `("1", "1") -> "01001"`.
pub fn location_id(state: &str, county: &str) -> Result<String, String> {
    let state: u32 = state
        .trim()
        .parse()
        .map_err(|_| format!("cannot parse state code '{state}'"))?;
    let county: u32 = county
        .trim()
        .parse()
        .map_err(|_| format!("cannot parse county code '{county}'"))?;
    Ok(format!("{state:02}{county:03}"))
}

/// Parse a reported count. Negative values mark suppressed cells and
/// yield `None`.
fn parse_count(value: &str) -> Result<Option<u64>, String> {
    let n: i64 = value
        .trim()
        .parse()
        .map_err(|_| format!("cannot parse count '{value}'"))?;
    Ok(u64::try_from(n).ok())
}

// ---------------------------------------------------------------------------
// Fixed-width (2004-2007)
// ---------------------------------------------------------------------------

/// The fields of one fixed-width line that parsing uses, trimmed. The
/// state abbreviation (`14..16`), return count (`50..59`) and AGI
/// (`71..82`) columns are not read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct FixedWidthRow {
    pub state_origin: String,
    pub county_origin: String,
    pub state_dest: String,
    pub county_dest: String,
    pub county_name: String,
    pub exemptions: String,
}

/// Split a line at the fixed character columns. Short lines yield empty
/// trailing fields.
pub(crate) fn parse_fixed_width_row(line: &str) -> FixedWidthRow {
    let chars: Vec<char> = line.chars().collect();
    let field = |start: usize, end: usize| -> String {
        let end = end.min(chars.len());
        let start = start.min(end);
        chars[start..end].iter().collect::<String>().trim().to_string()
    };

    FixedWidthRow {
        state_origin: field(0, 2),
        county_origin: field(3, 6),
        state_dest: field(7, 9),
        county_dest: field(10, 13),
        county_name: field(17, 49),
        exemptions: field(60, 70),
    }
}

fn parse_fixed_width(text: &str) -> Result<ParsedReport, MigrationError> {
    let mut report = ParsedReport::default();

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let err = |message: String| MigrationError::Parse { line: i + 1, message };

        let row = parse_fixed_width_row(line);
        let origin = location_id(&row.state_origin, &row.county_origin).map_err(err)?;
        let destination = location_id(&row.state_dest, &row.county_dest).map_err(err)?;
        match parse_count(&row.exemptions).map_err(err)? {
            Some(count) => report.records.push(FlowRecord { origin, destination, count }),
            None => {
                log::debug!(
                    "line {}: suppressed count for {origin}->{destination} ({})",
                    i + 1,
                    row.county_name
                );
                report.suppressed.push((origin, destination));
            }
        }
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Delimited (2008-2010, 2011-2014)
// ---------------------------------------------------------------------------

/// Header names for the id and count columns of one CSV vintage.
#[derive(Debug, Clone, Copy)]
pub struct CsvSchema {
    pub origin_state: &'static str,
    pub origin_county: &'static str,
    pub dest_state: &'static str,
    pub dest_county: &'static str,
    pub count: &'static str,
}

pub const CSV_2008: CsvSchema = CsvSchema {
    origin_state: "State_Code_Origin",
    origin_county: "County_Code_Origin",
    dest_state: "State_Code_Dest",
    dest_county: "County_Code_Dest",
    count: "Exmpt_Num",
};

pub const CSV_2011: CsvSchema = CsvSchema {
    origin_state: "y1_statefips",
    origin_county: "y1_countyfips",
    dest_state: "y2_statefips",
    dest_county: "y2_countyfips",
    count: "n2",
};

fn header_index(headers: &csv::StringRecord, name: &str) -> Result<usize, MigrationError> {
    headers.iter().position(|h| h == name).ok_or_else(|| MigrationError::MissingColumn {
        column: name.into(),
    })
}

fn parse_csv(text: &str, schema: &CsvSchema) -> Result<ParsedReport, MigrationError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| MigrationError::Parse { line: 1, message: e.to_string() })?
        .clone();

    let origin_state = header_index(&headers, schema.origin_state)?;
    let origin_county = header_index(&headers, schema.origin_county)?;
    let dest_state = header_index(&headers, schema.dest_state)?;
    let dest_county = header_index(&headers, schema.dest_county)?;
    let count_idx = header_index(&headers, schema.count)?;

    let mut report = ParsedReport::default();

    for result in reader.records() {
        let record = result.map_err(|e| MigrationError::Parse {
            line: e.position().map(|p| p.line() as usize).unwrap_or(0),
            message: e.to_string(),
        })?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let err = |message: String| MigrationError::Parse { line, message };
        let get = |i: usize| record.get(i).unwrap_or("");

        let origin = location_id(get(origin_state), get(origin_county)).map_err(err)?;
        let destination = location_id(get(dest_state), get(dest_county)).map_err(err)?;
        match parse_count(get(count_idx)).map_err(err)? {
            Some(count) => report.records.push(FlowRecord { origin, destination, count }),
            None => {
                log::debug!("line {line}: suppressed count for {origin}->{destination}");
                report.suppressed.push((origin, destination));
            }
        }
    }

    Ok(report)
}

/// One parsed report. Suppressed rows carry no count but still name
/// locations that were reported on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReport {
    pub records: Vec<FlowRecord>,
    /// `(origin, destination)` of rows whose count was suppressed.
    pub suppressed: Vec<(String, String)>,
}

/// Parse one raw inflow or outflow report in the given layout, keeping
/// suppressed pairs apart from the counted records.
pub fn parse_report(text: &str, vintage: Vintage) -> Result<ParsedReport, MigrationError> {
    let report = match vintage {
        Vintage::FixedWidth2004 => parse_fixed_width(text)?,
        Vintage::Csv2008 => parse_csv(text, &CSV_2008)?,
        Vintage::Csv2011 => parse_csv(text, &CSV_2011)?,
    };
    log::debug!(
        "parsed {} {vintage} records ({} suppressed)",
        report.records.len(),
        report.suppressed.len()
    );
    Ok(report)
}

/// Counted records of one raw report; suppressed rows are left out.
pub fn parse_records(text: &str, vintage: Vintage) -> Result<Vec<FlowRecord>, MigrationError> {
    Ok(parse_report(text, vintage)?.records)
}

// ---------------------------------------------------------------------------
// Keyed access
// ---------------------------------------------------------------------------

/// Index records by `(origin, destination)`. A pair reported twice is an
/// error naming the pair as `origin->destination`.
pub fn keyed_counts(
    records: &[FlowRecord],
) -> Result<HashMap<(String, String), u64>, MigrationError> {
    let mut map = HashMap::with_capacity(records.len());
    for r in records {
        let key = (r.origin.clone(), r.destination.clone());
        if map.insert(key, r.count).is_some() {
            return Err(MigrationError::DuplicateKey(format!(
                "{}->{}",
                r.origin, r.destination
            )));
        }
    }
    Ok(map)
}

/// Values of one attribute column, optionally keyed by another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnData {
    /// Every row's value in file order, duplicates included.
    Rows(Vec<String>),
    /// `(key, value)` pairs in file order; keys are unique.
    Keyed(Vec<(String, String)>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            Self::Rows(v) => v.len(),
            Self::Keyed(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value for `key` in a keyed extraction.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            Self::Rows(_) => None,
            Self::Keyed(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str()),
        }
    }
}

/// Extract `data_column` from a delimited attribute table.
///
/// With `key_column`, the key column is treated as a primary key: a repeated
/// key is rejected with [`MigrationError::DuplicateKey`].
pub fn extract_column(
    text: &str,
    data_column: &str,
    key_column: Option<&str>,
) -> Result<ColumnData, MigrationError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| MigrationError::Parse { line: 1, message: e.to_string() })?
        .clone();
    let data_idx = header_index(&headers, data_column)?;
    let key_idx = key_column.map(|k| header_index(&headers, k)).transpose()?;

    let mut values = Vec::new();
    let mut pairs = Vec::new();
    let mut seen = HashSet::new();

    for result in reader.records() {
        let record = result.map_err(|e| MigrationError::Parse {
            line: e.position().map(|p| p.line() as usize).unwrap_or(0),
            message: e.to_string(),
        })?;
        let value = record.get(data_idx).unwrap_or("").to_string();

        match key_idx {
            Some(ki) => {
                let key = record.get(ki).unwrap_or("").to_string();
                if !seen.insert(key.clone()) {
                    return Err(MigrationError::DuplicateKey(key));
                }
                pairs.push((key, value));
            }
            None => values.push(value),
        }
    }

    Ok(match key_idx {
        Some(_) => ColumnData::Keyed(pairs),
        None => ColumnData::Rows(values),
    })
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Read a file as UTF-8, falling back to Windows-1252 (a superset of the
/// ISO-8859-1 the reports are published in).
pub fn read_text(path: &Path) -> Result<String, MigrationError> {
    let bytes = std::fs::read(path)
        .map_err(|e| MigrationError::Io(format!("{}: {e}", path.display())))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}
