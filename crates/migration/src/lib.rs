//! County-to-county migration records and OD matrices.
//!
//! Parses the historical inflow/outflow report vintages into canonical
//! `(origin, destination, count)` records and reconciles the two reports
//! into a single origin-destination matrix with a discrepancy report.

pub mod builder;
pub mod catalog;
pub mod common;
pub mod engine;
pub mod error;
pub mod model;
pub mod parse;
pub mod vintage;

pub use builder::build_od_matrix;
pub use catalog::{VintageCatalog, YearFiles};
pub use common::{common_locations, LocationFilter, CONTINENTAL_STATE_FIPS};
pub use engine::{build_for_year, load_year, YearRecords};
pub use error::MigrationError;
pub use model::{DiscrepancyReport, FlowRecord, LocationIndex, OdBuild};
pub use parse::{
    extract_column, keyed_counts, parse_records, parse_report, read_text, ColumnData, ParsedReport,
};
pub use vintage::{InflowOrientation, Vintage};
