use ndarray::Array2;

use crate::error::MigrationError;
use crate::model::{DiscrepancyReport, FlowRecord, LocationIndex, OdBuild};
use crate::vintage::InflowOrientation;

/// Reconcile inflow and outflow reports into one OD matrix over `locations`.
///
/// Inflow records are written first, then outflow records overwrite them.
/// Where an outflow value replaces a different non-zero inflow value the
/// cell is counted as a discrepancy. Records naming a location outside
/// `locations` are dropped. `orientation` applies to inflow records only.
pub fn build_od_matrix<S: AsRef<str>>(
    locations: &[S],
    inflow: &[FlowRecord],
    outflow: &[FlowRecord],
    orientation: InflowOrientation,
) -> Result<OdBuild, MigrationError> {
    let index = LocationIndex::new(locations.iter().map(|id| id.as_ref()))?;
    let n = index.len();

    let mut matrix = Array2::<u64>::zeros((n, n));
    let mut report = DiscrepancyReport::default();

    for record in inflow {
        let (origin, destination) = orientation.orient(record);
        match index.cell(origin, destination) {
            Some(cell) => matrix[cell] = record.count,
            None => report.dropped_inflow += 1,
        }
    }

    for record in outflow {
        let Some(cell) = index.cell(&record.origin, &record.destination) else {
            report.dropped_outflow += 1;
            continue;
        };
        let current = matrix[cell];
        if current != 0 && current != record.count {
            report.count += 1;
            report.magnitude += current.abs_diff(record.count);
        }
        matrix[cell] = record.count;
    }

    log::debug!(
        "built {n}x{n} OD matrix ({} inflow, {} outflow records; dropped {}/{})",
        inflow.len(),
        outflow.len(),
        report.dropped_inflow,
        report.dropped_outflow
    );
    if report.count > 0 {
        log::info!(
            "{} inflow/outflow disagreements totalling {} migrants",
            report.count,
            report.magnitude
        );
    }

    Ok(OdBuild {
        locations: index,
        matrix,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(o: &str, d: &str, c: u64) -> FlowRecord {
        FlowRecord::new(o, d, c)
    }

    #[test]
    fn agreeing_reports() {
        let build = build_od_matrix(
            &["A", "B"],
            &[rec("A", "B", 10)],
            &[rec("A", "B", 10)],
            InflowOrientation::Canonical,
        )
        .unwrap();
        assert_eq!(build.matrix, ndarray::array![[0u64, 10], [0, 0]]);
        assert_eq!(build.report.count, 0);
        assert_eq!(build.report.magnitude, 0);
    }

    #[test]
    fn outflow_wins_and_is_counted() {
        let build = build_od_matrix(
            &["A", "B"],
            &[rec("A", "B", 10)],
            &[rec("A", "B", 7)],
            InflowOrientation::Canonical,
        )
        .unwrap();
        assert_eq!(build.flow("A", "B"), Some(7));
        assert_eq!(build.report.count, 1);
        assert_eq!(build.report.magnitude, 3);
    }

    #[test]
    fn outflow_over_empty_cell_is_not_a_discrepancy() {
        let build = build_od_matrix(
            &["A", "B"],
            &[],
            &[rec("B", "A", 4)],
            InflowOrientation::Canonical,
        )
        .unwrap();
        assert_eq!(build.flow("B", "A"), Some(4));
        assert_eq!(build.report, DiscrepancyReport::default());
    }

    #[test]
    fn zero_outflow_over_inflow_is_counted() {
        let build = build_od_matrix(
            &["A", "B"],
            &[rec("A", "B", 6)],
            &[rec("A", "B", 0)],
            InflowOrientation::Canonical,
        )
        .unwrap();
        assert_eq!(build.flow("A", "B"), Some(0));
        assert_eq!(build.report.count, 1);
        assert_eq!(build.report.magnitude, 6);
    }

    #[test]
    fn unknown_locations_are_dropped() {
        let build = build_od_matrix(
            &["A", "B"],
            &[rec("A", "Z", 10), rec("B", "A", 2)],
            &[rec("Z", "A", 5)],
            InflowOrientation::Canonical,
        )
        .unwrap();
        assert_eq!(build.total(), 2);
        assert_eq!(build.report.dropped_inflow, 1);
        assert_eq!(build.report.dropped_outflow, 1);
        assert_eq!(build.report.count, 0);
    }

    #[test]
    fn reversed_inflow_is_swapped_before_lookup() {
        // Reversed vintages list the destination first in inflow files.
        let build = build_od_matrix(
            &["A", "B"],
            &[rec("B", "A", 9)],
            &[],
            InflowOrientation::Reversed,
        )
        .unwrap();
        assert_eq!(build.flow("A", "B"), Some(9));
        assert_eq!(build.flow("B", "A"), Some(0));
    }

    #[test]
    fn outflow_is_never_reversed() {
        let build = build_od_matrix(
            &["A", "B"],
            &[rec("B", "A", 9)],
            &[rec("A", "B", 9)],
            InflowOrientation::Reversed,
        )
        .unwrap();
        assert_eq!(build.flow("A", "B"), Some(9));
        assert_eq!(build.report.count, 0);
    }

    #[test]
    fn duplicate_locations_rejected() {
        let err = build_od_matrix(&["A", "B", "A"], &[], &[], InflowOrientation::Canonical)
            .unwrap_err();
        assert!(matches!(err, MigrationError::DuplicateLocation(_)));
    }

    #[test]
    fn empty_location_set() {
        let empty: [&str; 0] = [];
        let build = build_od_matrix(&empty, &[rec("A", "B", 1)], &[], InflowOrientation::Canonical)
            .unwrap();
        assert_eq!(build.matrix.dim(), (0, 0));
        assert_eq!(build.report.dropped_inflow, 1);
    }
}
