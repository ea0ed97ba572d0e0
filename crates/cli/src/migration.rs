//! `odflow matrix` and `odflow common`.

use std::path::{Path, PathBuf};

use clap::Args;
use odflow_migration::{
    build_for_year, common_locations, load_year, DiscrepancyReport, LocationFilter,
    VintageCatalog,
};
use serde::Serialize;

use crate::table::{read_locations, write_lines, write_matrix};
use crate::CliError;

#[derive(Args)]
pub struct MatrixArgs {
    /// Reporting year (the year the period starts in)
    #[arg(long)]
    pub year: u16,

    /// Location ids in matrix order, one per line
    #[arg(long)]
    pub locations: PathBuf,

    /// Root of the per-year report directories (defaults to the catalog's)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Catalog TOML mapping years to files (defaults to the built-in table)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Output file for the matrix (omit for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Print the build summary as JSON on stdout; the matrix is only
    /// written when --output is given
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CommonArgs {
    /// Root of the per-year report directories (defaults to the catalog's)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Catalog TOML mapping years to files (defaults to the built-in table)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Year or inclusive range, e.g. 2010 or 2004-2014 (defaults to every
    /// catalogued year)
    #[arg(long)]
    pub years: Option<String>,

    /// Keep Alaska, Hawaii and territories
    #[arg(long)]
    pub all_states: bool,

    /// Output file (omit for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct MatrixSummary {
    year: u16,
    vintage: String,
    locations: usize,
    total: u64,
    discrepancies: DiscrepancyReport,
}

fn load_catalog(path: Option<&Path>) -> Result<VintageCatalog, CliError> {
    match path {
        None => Ok(VintageCatalog::builtin()),
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::io(format!("{}: {e}", path.display())))?;
            Ok(VintageCatalog::from_toml(&text)?)
        }
    }
}

/// Parse `2010` or `2004-2014` into the years it covers.
pub fn parse_years(input: &str) -> Result<Vec<u16>, CliError> {
    let bad = || {
        CliError::usage(format!("invalid --years '{input}'")).with_hint("use YEAR or FIRST-LAST")
    };
    let year = |s: &str| s.trim().parse::<u16>().map_err(|_| bad());

    match input.split_once('-') {
        None => Ok(vec![year(input)?]),
        Some((first, last)) => {
            let (first, last) = (year(first)?, year(last)?);
            if first > last {
                return Err(bad());
            }
            Ok((first..=last).collect())
        }
    }
}

pub fn cmd_matrix(args: MatrixArgs) -> Result<(), CliError> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let data_dir = catalog.resolve_data_dir(args.data_dir.as_deref())?;
    let locations = read_locations(&args.locations)?;
    let vintage = catalog.entry(args.year)?.vintage;

    let build = build_for_year(&catalog, &data_dir, args.year, &locations)?;
    let summary = MatrixSummary {
        year: args.year,
        vintage: vintage.to_string(),
        locations: build.locations.len(),
        total: build.total(),
        discrepancies: build.report,
    };

    if args.json {
        if args.output.is_some() {
            write_matrix(&build.matrix, args.output.as_ref())?;
        }
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::general(format!("JSON serialization failed: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    write_matrix(&build.matrix, args.output.as_ref())?;
    eprintln!(
        "{} ({}): {} locations, {} migrants",
        summary.year, summary.vintage, summary.locations, summary.total
    );
    eprintln!(
        "discrepancies: {} cells, magnitude {} (dropped {} inflow, {} outflow records)",
        summary.discrepancies.count,
        summary.discrepancies.magnitude,
        summary.discrepancies.dropped_inflow,
        summary.discrepancies.dropped_outflow
    );
    Ok(())
}

pub fn cmd_common(args: CommonArgs) -> Result<(), CliError> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let data_dir = catalog.resolve_data_dir(args.data_dir.as_deref())?;
    let years = match &args.years {
        Some(range) => parse_years(range)?,
        None => catalog.years(),
    };
    let filter = if args.all_states {
        LocationFilter::All
    } else {
        LocationFilter::Continental
    };

    let records = years
        .iter()
        .map(|&year| load_year(&catalog, &data_dir, year))
        .collect::<Result<Vec<_>, _>>()?;

    let common = common_locations(&records, filter);
    log::info!("{} locations common to {} years", common.len(), records.len());
    write_lines(&common, args.output.as_ref())
}
