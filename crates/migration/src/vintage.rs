use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MigrationError;
use crate::model::FlowRecord;

/// Historical file layout of the county inflow/outflow reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vintage {
    /// 2004-2007: fixed-width text, inflow file has origin/destination swapped.
    #[serde(rename = "fixed_width_2004")]
    FixedWidth2004,
    /// 2008-2010: CSV with `State_Code_Origin`-style headers.
    #[serde(rename = "csv_2008")]
    Csv2008,
    /// 2011-2014: CSV with `y1_statefips`-style headers.
    #[serde(rename = "csv_2011")]
    Csv2011,
}

impl Vintage {
    /// The layout used for the reporting period starting in `year`.
    pub fn for_year(year: u16) -> Result<Self, MigrationError> {
        match year {
            2004..=2007 => Ok(Self::FixedWidth2004),
            2008..=2010 => Ok(Self::Csv2008),
            2011..=2014 => Ok(Self::Csv2011),
            _ => Err(MigrationError::UnknownYear(year)),
        }
    }

    pub fn inflow_orientation(self) -> InflowOrientation {
        match self {
            Self::FixedWidth2004 => InflowOrientation::Reversed,
            Self::Csv2008 | Self::Csv2011 => InflowOrientation::Canonical,
        }
    }
}

impl fmt::Display for Vintage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedWidth2004 => write!(f, "fixed_width_2004"),
            Self::Csv2008 => write!(f, "csv_2008"),
            Self::Csv2011 => write!(f, "csv_2011"),
        }
    }
}

/// How inflow records map onto `matrix[origin][destination]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InflowOrientation {
    #[default]
    Canonical,
    /// The record's origin field holds the destination and vice versa.
    Reversed,
}

impl InflowOrientation {
    /// `(origin, destination)` of `record` in canonical orientation.
    pub fn orient<'a>(self, record: &'a FlowRecord) -> (&'a str, &'a str) {
        match self {
            Self::Canonical => (&record.origin, &record.destination),
            Self::Reversed => (&record.destination, &record.origin),
        }
    }
}
