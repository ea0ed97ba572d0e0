//! Locations present in every reporting year.

use std::collections::BTreeSet;

use crate::engine::YearRecords;

/// State codes of the 48 contiguous US states. The District of Columbia is
/// not included.
pub const CONTINENTAL_STATE_FIPS: [&str; 48] = [
    "01", "04", "05", "06", "08", "09", "10", "12", "13", "16", "17", "18", "19", "20", "21", "22",
    "23", "24", "25", "26", "27", "28", "29", "30", "31", "32", "33", "34", "35", "36", "37", "38",
    "39", "40", "41", "42", "44", "45", "46", "47", "48", "49", "50", "51", "53", "54", "55", "56",
];

/// County code reserved for state and national aggregate rows.
const AGGREGATE_COUNTY: &str = "000";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LocationFilter {
    /// Contiguous-state counties only.
    #[default]
    Continental,
    /// Any state, including Alaska, Hawaii and summary codes.
    All,
}

impl LocationFilter {
    pub fn accepts(self, id: &str) -> bool {
        let (Some(state), Some(county)) = (id.get(..2), id.get(2..)) else {
            return false;
        };
        if county == AGGREGATE_COUNTY {
            return false;
        }
        match self {
            Self::Continental => CONTINENTAL_STATE_FIPS.contains(&state),
            Self::All => true,
        }
    }
}

/// Every id named as origin or destination in either report, including
/// rows whose counts were suppressed.
pub fn location_ids(year: &YearRecords) -> BTreeSet<String> {
    let counted = year
        .inflow
        .iter()
        .chain(&year.outflow)
        .map(|r| (&r.origin, &r.destination));
    let suppressed = year.suppressed.iter().map(|(o, d)| (o, d));

    counted
        .chain(suppressed)
        .flat_map(|(o, d)| [o.clone(), d.clone()])
        .collect()
}

/// Ids that pass `filter` and appear in every supplied year, in numeric
/// order. Empty when no years are supplied.
pub fn common_locations<'a, I>(years: I, filter: LocationFilter) -> Vec<String>
where
    I: IntoIterator<Item = &'a YearRecords>,
{
    let mut common: Option<BTreeSet<String>> = None;

    for year in years {
        let ids: BTreeSet<String> = location_ids(year)
            .into_iter()
            .filter(|id| filter.accepts(id))
            .collect();
        log::info!("{}: {} locations", year.year, ids.len());

        common = Some(match common {
            None => ids,
            Some(acc) => acc.intersection(&ids).cloned().collect(),
        });
    }

    let mut result: Vec<String> = common.unwrap_or_default().into_iter().collect();
    result.sort_by_key(|id| id.parse::<u64>().unwrap_or(u64::MAX));
    result
}
