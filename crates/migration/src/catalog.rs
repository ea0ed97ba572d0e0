use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::MigrationError;
use crate::vintage::Vintage;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Where each reporting year's inflow and outflow files live.
///
/// ```toml
/// data_dir = "data/raw/migration"
///
/// [years.2010]
/// dir = "county1011"
/// inflow = "countyinflow1011.csv"
/// outflow = "countyoutflow1011.csv"
/// vintage = "csv_2008"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VintageCatalog {
    /// Root that `dir` entries are relative to. Callers may override it.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Keyed by the year the reporting period starts in.
    #[serde(default)]
    pub years: BTreeMap<String, YearFiles>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearFiles {
    pub dir: String,
    pub inflow: String,
    pub outflow: String,
    pub vintage: Vintage,
}

/// Resolved file paths for one year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearPaths {
    pub inflow: PathBuf,
    pub outflow: PathBuf,
    pub vintage: Vintage,
}

/// The IRS county-to-county releases from 2004-05 through 2014-15.
const BUILTIN_YEARS: &[(u16, Vintage, &str, &str, &str)] = &[
    (2004, Vintage::FixedWidth2004, "county0405", "countyin0405us1.dat", "countyout0405us1.dat"),
    (2005, Vintage::FixedWidth2004, "county0506", "countyin0506.dat", "countyout0506.dat"),
    (2006, Vintage::FixedWidth2004, "county0607", "countyin0607.dat", "countyout0607.dat"),
    (2007, Vintage::FixedWidth2004, "county0708", "ci0708us.dat", "co0708us.dat"),
    (2008, Vintage::Csv2008, "county0809", "countyinflow0809.csv", "countyoutflow0809.csv"),
    (2009, Vintage::Csv2008, "county0910", "countyinflow0910.csv", "countyoutflow0910.csv"),
    (2010, Vintage::Csv2008, "county1011", "countyinflow1011.csv", "countyoutflow1011.csv"),
    (2011, Vintage::Csv2011, "county1112", "countyinflow1112.csv", "countyoutflow1112.csv"),
    (2012, Vintage::Csv2011, "county1213", "countyinflow1213.csv", "countyoutflow1213.csv"),
    (2013, Vintage::Csv2011, "county1314", "countyinflow1314.csv", "countyoutflow1314.csv"),
    (2014, Vintage::Csv2011, "county1415", "countyinflow1415.csv", "countyoutflow1415.csv"),
];

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl VintageCatalog {
    /// The historical file table, with no data directory set.
    pub fn builtin() -> Self {
        let years = BUILTIN_YEARS
            .iter()
            .map(|&(year, vintage, dir, inflow, outflow)| {
                (
                    year.to_string(),
                    YearFiles {
                        dir: dir.into(),
                        inflow: inflow.into(),
                        outflow: outflow.into(),
                        vintage,
                    },
                )
            })
            .collect();
        Self { data_dir: None, years }
    }

    pub fn from_toml(input: &str) -> Result<Self, MigrationError> {
        let catalog: VintageCatalog =
            toml::from_str(input).map_err(|e| MigrationError::ConfigParse(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), MigrationError> {
        if self.years.is_empty() {
            return Err(MigrationError::ConfigValidation(
                "at least one year is required".into(),
            ));
        }

        for (key, files) in &self.years {
            let year: u16 = key.parse().map_err(|_| {
                MigrationError::ConfigValidation(format!("year key '{key}' is not a year"))
            })?;

            for (field, value) in [
                ("dir", &files.dir),
                ("inflow", &files.inflow),
                ("outflow", &files.outflow),
            ] {
                if value.trim().is_empty() {
                    return Err(MigrationError::ConfigValidation(format!(
                        "year {year}: '{field}' must not be empty"
                    )));
                }
            }

            if let Ok(expected) = Vintage::for_year(year) {
                if expected != files.vintage {
                    log::warn!(
                        "year {year}: catalog vintage {} differs from the usual {expected}",
                        files.vintage
                    );
                }
            }
        }

        Ok(())
    }

    /// All catalogued years, ascending.
    pub fn years(&self) -> Vec<u16> {
        let mut years: Vec<u16> = self.years.keys().filter_map(|k| k.parse().ok()).collect();
        years.sort_unstable();
        years
    }

    pub fn entry(&self, year: u16) -> Result<&YearFiles, MigrationError> {
        self.years
            .get(&year.to_string())
            .ok_or(MigrationError::UnknownYear(year))
    }

    /// `data_dir` if given, else the catalog's own.
    pub fn resolve_data_dir(&self, data_dir: Option<&Path>) -> Result<PathBuf, MigrationError> {
        data_dir
            .map(Path::to_path_buf)
            .or_else(|| self.data_dir.clone())
            .ok_or_else(|| {
                MigrationError::ConfigValidation(
                    "no data directory given and the catalog sets none".into(),
                )
            })
    }

    pub fn paths(&self, year: u16, data_dir: &Path) -> Result<YearPaths, MigrationError> {
        let files = self.entry(year)?;
        let base = data_dir.join(&files.dir);
        Ok(YearPaths {
            inflow: base.join(&files.inflow),
            outflow: base.join(&files.outflow),
            vintage: files.vintage,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
