use std::collections::HashMap;

use ndarray::{Array1, Array2, Axis};
use serde::Serialize;

use crate::error::MigrationError;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One reported flow. Ids are 5-digit state+county codes, e.g. `"01001"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FlowRecord {
    pub origin: String,
    pub destination: String,
    pub count: u64,
}

impl FlowRecord {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>, count: u64) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            count,
        }
    }
}

// ---------------------------------------------------------------------------
// Location index
// ---------------------------------------------------------------------------

/// Ordered, duplicate-free location ids and their dense matrix positions.
#[derive(Debug, Clone)]
pub struct LocationIndex {
    ids: Vec<String>,
    positions: HashMap<String, usize>,
}

impl LocationIndex {
    pub fn new<I, S>(ids: I) -> Result<Self, MigrationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Vec::new();
        let mut positions = HashMap::new();
        for id in ids {
            let id: String = id.into();
            if positions.insert(id.clone(), list.len()).is_some() {
                return Err(MigrationError::DuplicateLocation(id));
            }
            list.push(id);
        }
        Ok(Self { ids: list, positions })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Matrix cell for an origin/destination pair, if both are indexed.
    pub fn cell(&self, origin: &str, destination: &str) -> Option<[usize; 2]> {
        Some([self.index_of(origin)?, self.index_of(destination)?])
    }
}

// ---------------------------------------------------------------------------
// Build output
// ---------------------------------------------------------------------------

/// Disagreements between the inflow and outflow reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiscrepancyReport {
    /// Cells where outflow overwrote a different non-zero inflow value.
    pub count: usize,
    /// Sum of `|inflow - outflow|` over those cells.
    pub magnitude: u64,
    /// Inflow records naming a location outside the set.
    pub dropped_inflow: usize,
    /// Outflow records naming a location outside the set.
    pub dropped_outflow: usize,
}

/// A reconciled OD matrix. `matrix[[i, j]]` is the number of migrants from
/// `locations.id_at(i)` to `locations.id_at(j)`.
#[derive(Debug, Clone)]
pub struct OdBuild {
    pub locations: LocationIndex,
    pub matrix: Array2<u64>,
    pub report: DiscrepancyReport,
}

impl OdBuild {
    /// Flow volume between two ids; `None` if either is not indexed.
    pub fn flow(&self, origin: &str, destination: &str) -> Option<u64> {
        self.locations.cell(origin, destination).map(|cell| self.matrix[cell])
    }

    /// Total out-migration per origin.
    pub fn row_totals(&self) -> Array1<u64> {
        self.matrix.sum_axis(Axis(1))
    }

    /// Total in-migration per destination.
    pub fn column_totals(&self) -> Array1<u64> {
        self.matrix.sum_axis(Axis(0))
    }

    pub fn total(&self) -> u64 {
        self.matrix.sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_bidirectional() {
        let idx = LocationIndex::new(["01001", "01003", "06037"]).unwrap();
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.index_of("01003"), Some(1));
        assert_eq!(idx.id_at(2), Some("06037"));
        assert_eq!(idx.index_of("99999"), None);
        assert_eq!(idx.id_at(3), None);
        assert_eq!(idx.cell("06037", "01001"), Some([2, 0]));
        assert_eq!(idx.cell("06037", "99999"), None);
    }

    #[test]
    fn index_rejects_duplicates() {
        let err = LocationIndex::new(["01001", "01003", "01001"]).unwrap_err();
        assert!(matches!(err, MigrationError::DuplicateLocation(ref id) if id == "01001"));
    }

    #[test]
    fn totals() {
        let build = OdBuild {
            locations: LocationIndex::new(["a", "b"]).unwrap(),
            matrix: ndarray::array![[0, 3], [5, 0]],
            report: DiscrepancyReport::default(),
        };
        assert_eq!(build.row_totals().to_vec(), vec![3, 5]);
        assert_eq!(build.column_totals().to_vec(), vec![5, 3]);
        assert_eq!(build.total(), 8);
        assert_eq!(build.flow("b", "a"), Some(5));
        assert_eq!(build.flow("b", "c"), None);
    }
}
