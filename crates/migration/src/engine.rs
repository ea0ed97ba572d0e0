use std::path::Path;

use crate::builder::build_od_matrix;
use crate::catalog::VintageCatalog;
use crate::error::MigrationError;
use crate::model::{FlowRecord, OdBuild};
use crate::parse::{parse_report, read_text, ParsedReport};
use crate::vintage::Vintage;

/// Both reports for one reporting year, parsed but not reconciled.
#[derive(Debug, Clone)]
pub struct YearRecords {
    pub year: u16,
    pub vintage: Vintage,
    pub inflow: Vec<FlowRecord>,
    pub outflow: Vec<FlowRecord>,
    /// Pairs from either report whose counts were suppressed, as they
    /// appear in the file.
    pub suppressed: Vec<(String, String)>,
}

/// Read and parse the inflow and outflow files catalogued for `year`.
pub fn load_year(
    catalog: &VintageCatalog,
    data_dir: &Path,
    year: u16,
) -> Result<YearRecords, MigrationError> {
    let paths = catalog.paths(year, data_dir)?;
    log::info!(
        "loading {year} ({}) from {} and {}",
        paths.vintage,
        paths.inflow.display(),
        paths.outflow.display()
    );

    let inflow = parse_file(&paths.inflow, paths.vintage)?;
    let outflow = parse_file(&paths.outflow, paths.vintage)?;

    let mut suppressed = inflow.suppressed;
    suppressed.extend(outflow.suppressed);

    Ok(YearRecords {
        year,
        vintage: paths.vintage,
        inflow: inflow.records,
        outflow: outflow.records,
        suppressed,
    })
}

fn parse_file(path: &Path, vintage: Vintage) -> Result<ParsedReport, MigrationError> {
    let text = read_text(path)?;
    parse_report(&text, vintage).map_err(|e| match e {
        MigrationError::Parse { line, message } => MigrationError::Parse {
            line,
            message: format!("{}: {message}", path.display()),
        },
        other => other,
    })
}

/// Load `year` and reconcile it over `locations`, applying the vintage's
/// inflow orientation.
pub fn build_for_year<S: AsRef<str>>(
    catalog: &VintageCatalog,
    data_dir: &Path,
    year: u16,
    locations: &[S],
) -> Result<OdBuild, MigrationError> {
    let records = load_year(catalog, data_dir, year)?;
    build_od_matrix(
        locations,
        &records.inflow,
        &records.outflow,
        records.vintage.inflow_orientation(),
    )
}
