// sieve-core/src/domain/classifier.rs
//
// Turns ordered expectation results into a valid/invalid row partition,
// or an abort when a `failure`-policy expectation is violated.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::domain::dataset::Dataset;
use crate::domain::error::DomainError;
use crate::domain::expectation::{ExpectationResult, TargetColumn};
use crate::domain::policy::{Action, ExpectationPolicy};

pub const FAILED_EXPECTATION_COLUMN: &str = "failed_expectation_id";
pub const FAILED_COLUMN_COLUMN: &str = "failed_column";

/// One quarantined copy of a source row, annotated with the violation that put it there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarantinedRow {
    pub source_index: usize,
    pub cells: Vec<String>,
    pub failed_expectation_id: String,
    pub failed_column: String,
}

/// The first `failure`-policy violation encountered, in result order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbortReason {
    pub expectation_id: String,
    pub target: TargetColumn,
    /// Position of the triggering result in the evaluated sequence.
    pub position: usize,
}

impl From<AbortReason> for DomainError {
    fn from(reason: AbortReason) -> Self {
        DomainError::PolicyViolation {
            expectation_id: reason.expectation_id,
            column: reason.target.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Rows not flagged by any skip-policy expectation, original order, re-indexed.
    pub valid_rows: Dataset,
    /// Flagged rows, each once, ascending original index, re-indexed.
    pub invalid_rows: Dataset,
    /// One record per (row, violated expectation). Never deduplicated.
    pub quarantine_records: Vec<QuarantinedRow>,
    /// Sorted, deduplicated source positions of `invalid_rows`.
    pub invalid_indices: Vec<usize>,
}

impl Partition {
    /// Quarantine records laid out as a dataset: source columns plus the two annotation columns.
    pub fn quarantine_dataset(&self) -> Result<Dataset, DomainError> {
        let mut columns = self.valid_rows.columns().to_vec();
        columns.push(FAILED_EXPECTATION_COLUMN.to_string());
        columns.push(FAILED_COLUMN_COLUMN.to_string());

        let mut dataset = Dataset::new(columns);
        for record in &self.quarantine_records {
            let mut cells = record.cells.clone();
            cells.push(record.failed_expectation_id.clone());
            cells.push(record.failed_column.clone());
            dataset.push_row(cells)?;
        }
        Ok(dataset)
    }
}

/// Tagged result of one classification. An abort is a value, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(Partition),
    Aborted(AbortReason),
}

impl Outcome {
    pub fn into_result(self) -> Result<Partition, DomainError> {
        match self {
            Outcome::Completed(partition) => Ok(partition),
            Outcome::Aborted(reason) => Err(reason.into()),
        }
    }
}

pub struct RowClassifier<'a> {
    policy: &'a ExpectationPolicy,
}

impl<'a> RowClassifier<'a> {
    pub fn new(policy: &'a ExpectationPolicy) -> Self {
        Self { policy }
    }

    /// Single pass over `results` in the order given.
    ///
    /// Stops at the first failing result whose policy is `failure`. Failing
    /// results without a policy entry have no effect. Indices reported by a
    /// `skip` result must lie inside `dataset`.
    #[instrument(skip_all, fields(rows = dataset.len(), results = results.len()))]
    pub fn classify(
        &self,
        dataset: &Dataset,
        results: &[ExpectationResult],
    ) -> Result<Outcome, DomainError> {
        let mut flagged: Vec<usize> = Vec::new();
        let mut quarantine_records = Vec::new();

        for (position, result) in results.iter().enumerate() {
            if result.success {
                continue;
            }

            match self.policy.get(&result.expectation_id, &result.target) {
                None => {
                    debug!(
                        expectation = %result.expectation_id,
                        column = %result.target,
                        "Failed expectation has no policy, ignoring"
                    );
                }
                Some(Action::Failure) => {
                    warn!(
                        expectation = %result.expectation_id,
                        column = %result.target,
                        position,
                        "Failure policy violated, aborting run"
                    );
                    return Ok(Outcome::Aborted(AbortReason {
                        expectation_id: result.expectation_id.clone(),
                        target: result.target.clone(),
                        position,
                    }));
                }
                Some(Action::Skip) => {
                    if result.violating_indices.is_empty() {
                        debug!(
                            expectation = %result.expectation_id,
                            column = %result.target,
                            "Skip expectation failed without row indices"
                        );
                    }
                    let failed_column = result.target.to_string();
                    for &index in &result.violating_indices {
                        let row = dataset.row(index).ok_or_else(|| DomainError::IndexOutOfRange {
                            expectation_id: result.expectation_id.clone(),
                            index,
                            len: dataset.len(),
                        })?;
                        flagged.push(index);
                        quarantine_records.push(QuarantinedRow {
                            source_index: index,
                            cells: row.cells().to_vec(),
                            failed_expectation_id: result.expectation_id.clone(),
                            failed_column: failed_column.clone(),
                        });
                    }
                }
            }
        }

        let invalid: BTreeSet<usize> = flagged.into_iter().collect();
        let invalid_indices: Vec<usize> = invalid.iter().copied().collect();

        let partition = Partition {
            valid_rows: dataset.without(&invalid),
            invalid_rows: dataset.select(&invalid_indices),
            quarantine_records,
            invalid_indices,
        };

        info!(
            valid = partition.valid_rows.len(),
            invalid = partition.invalid_rows.len(),
            quarantined = partition.quarantine_records.len(),
            "Rows classified"
        );
        Ok(Outcome::Completed(partition))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dataset(n: i64) -> Dataset {
        Dataset::from_rows(
            vec!["x".into(), "y".into()],
            (0..n).map(|i| vec![i.to_string(), format!("y{i}")]),
        )
        .unwrap()
    }

    fn failed(id: &str, column: &str, indices: &[usize]) -> ExpectationResult {
        ExpectationResult::failed(id, TargetColumn::column(column), indices.to_vec())
    }

    fn policy(entries: &[(&str, &str, Action)]) -> ExpectationPolicy {
        let mut policy = ExpectationPolicy::new();
        for (id, column, action) in entries {
            policy.insert(*id, TargetColumn::column(*column), *action);
        }
        policy
    }

    fn ids(ds: &Dataset) -> Vec<i64> {
        ds.column("x")
            .unwrap()
            .map(|cell| cell.parse::<i64>().unwrap())
            .collect()
    }

    fn completed(outcome: Outcome) -> Partition {
        match outcome {
            Outcome::Completed(p) => p,
            Outcome::Aborted(r) => panic!("unexpected abort: {r:?}"),
        }
    }

    #[test]
    fn test_scenario_a_skip_quarantines_flagged_rows() {
        let ds = dataset(5);
        let policy = policy(&[("NotNull", "x", Action::Skip)]);
        let results = vec![failed("NotNull", "x", &[1, 3])];

        let p = completed(RowClassifier::new(&policy).classify(&ds, &results).unwrap());

        assert_eq!(ids(&p.invalid_rows), vec![1, 3]);
        assert_eq!(ids(&p.valid_rows), vec![0, 2, 4]);
        assert_eq!(p.quarantine_records.len(), 2);
        assert_eq!(p.invalid_indices, vec![1, 3]);
    }

    #[test]
    fn test_scenario_b_failure_aborts() {
        let ds = dataset(5);
        let policy = policy(&[("Unique", "y", Action::Failure)]);
        let results = vec![failed("Unique", "y", &[2])];

        let outcome = RowClassifier::new(&policy).classify(&ds, &results).unwrap();

        assert_eq!(
            outcome,
            Outcome::Aborted(AbortReason {
                expectation_id: "Unique".into(),
                target: TargetColumn::column("y"),
                position: 0,
            })
        );
    }

    #[test]
    fn test_scenario_c_same_row_flagged_twice() {
        let ds = dataset(5);
        let policy = policy(&[("NotNull", "x", Action::Skip), ("InSet", "y", Action::Skip)]);
        let results = vec![failed("NotNull", "x", &[2]), failed("InSet", "y", &[2])];

        let p = completed(RowClassifier::new(&policy).classify(&ds, &results).unwrap());

        assert_eq!(ids(&p.invalid_rows), vec![2]);
        let for_row_2: Vec<_> = p
            .quarantine_records
            .iter()
            .filter(|r| r.source_index == 2)
            .map(|r| (r.failed_expectation_id.as_str(), r.failed_column.as_str()))
            .collect();
        assert_eq!(for_row_2, vec![("NotNull", "x"), ("InSet", "y")]);
    }

    #[test]
    fn test_partition_is_complete_and_disjoint() {
        let ds = dataset(10);
        let policy = policy(&[("A", "x", Action::Skip), ("B", "y", Action::Skip)]);
        let results = vec![failed("A", "x", &[7, 2, 9]), failed("B", "y", &[2, 0])];

        let p = completed(RowClassifier::new(&policy).classify(&ds, &results).unwrap());

        let valid: BTreeSet<i64> = ids(&p.valid_rows).into_iter().collect();
        let invalid: BTreeSet<i64> = ids(&p.invalid_rows).into_iter().collect();
        assert!(valid.is_disjoint(&invalid));
        let all: BTreeSet<i64> = valid.union(&invalid).copied().collect();
        assert_eq!(all, (0..10).collect::<BTreeSet<i64>>());
    }

    #[test]
    fn test_order_is_preserved_for_unsorted_indices() {
        let ds = dataset(6);
        let policy = policy(&[("A", "x", Action::Skip)]);
        let results = vec![failed("A", "x", &[5, 1, 3, 1])];

        let p = completed(RowClassifier::new(&policy).classify(&ds, &results).unwrap());

        assert_eq!(ids(&p.invalid_rows), vec![1, 3, 5]);
        assert_eq!(ids(&p.valid_rows), vec![0, 2, 4]);
        assert_eq!(p.invalid_rows.row(0).unwrap().index(), 0);
        // Audit trail keeps engine order and duplicates.
        let sources: Vec<_> = p.quarantine_records.iter().map(|r| r.source_index).collect();
        assert_eq!(sources, vec![5, 1, 3, 1]);
    }

    #[test]
    fn test_failure_short_circuits_later_results() {
        let ds = dataset(5);
        let policy = policy(&[
            ("E1", "x", Action::Skip),
            ("E2", "x", Action::Failure),
            ("E3", "x", Action::Skip),
        ]);
        let results = vec![
            failed("E1", "x", &[0]),
            failed("E2", "x", &[1]),
            failed("E3", "x", &[2]),
        ];

        let outcome = RowClassifier::new(&policy).classify(&ds, &results).unwrap();

        match outcome {
            Outcome::Aborted(reason) => {
                assert_eq!(reason.expectation_id, "E2");
                assert_eq!(reason.position, 1);
            }
            Outcome::Completed(_) => panic!("expected abort"),
        }
    }

    #[test]
    fn test_first_failure_in_sequence_wins() {
        let ds = dataset(3);
        let policy = policy(&[("Late", "x", Action::Failure), ("Early", "y", Action::Failure)]);
        let results = vec![failed("Early", "y", &[]), failed("Late", "x", &[0])];

        let reason = match RowClassifier::new(&policy).classify(&ds, &results).unwrap() {
            Outcome::Aborted(r) => r,
            Outcome::Completed(_) => panic!("expected abort"),
        };
        assert_eq!(reason.expectation_id, "Early");
    }

    #[test]
    fn test_failure_without_policy_is_inert() {
        let ds = dataset(4);
        // Policy exists for another column only.
        let policy = policy(&[("NotNull", "y", Action::Failure)]);
        let results = vec![failed("NotNull", "x", &[0, 1]), failed("Typo", "y", &[2])];

        let p = completed(RowClassifier::new(&policy).classify(&ds, &results).unwrap());

        assert!(p.invalid_rows.is_empty());
        assert!(p.quarantine_records.is_empty());
        assert_eq!(p.valid_rows.len(), 4);
    }

    #[test]
    fn test_passing_results_are_ignored() {
        let ds = dataset(3);
        let policy = policy(&[("A", "x", Action::Failure)]);
        let mut ok = failed("A", "x", &[99]);
        ok.success = true;

        let p = completed(RowClassifier::new(&policy).classify(&ds, &[ok]).unwrap());
        assert_eq!(p.valid_rows.len(), 3);
    }

    #[test]
    fn test_empty_results_keep_everything_valid() {
        let ds = dataset(3);
        let p = completed(
            RowClassifier::new(&ExpectationPolicy::new())
                .classify(&ds, &[])
                .unwrap(),
        );
        assert_eq!(p.valid_rows, ds);
        assert!(p.invalid_rows.is_empty());
    }

    #[test]
    fn test_skip_failure_without_indices_has_no_row_effect() {
        let ds = dataset(3);
        let policy = policy(&[("MeanBetween", "x", Action::Skip)]);
        let results = vec![failed("MeanBetween", "x", &[])];

        let p = completed(RowClassifier::new(&policy).classify(&ds, &results).unwrap());
        assert_eq!(p.valid_rows.len(), 3);
        assert!(p.quarantine_records.is_empty());
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let ds = dataset(3);
        let policy = policy(&[("A", "x", Action::Skip)]);
        let results = vec![failed("A", "x", &[1, 3])];

        let err = RowClassifier::new(&policy).classify(&ds, &results).unwrap_err();
        assert!(matches!(
            err,
            DomainError::IndexOutOfRange { index: 3, len: 3, .. }
        ));
    }

    #[test]
    fn test_multi_column_target_is_a_distinct_key() {
        let ds = dataset(3);
        let target = TargetColumn::Columns(vec!["x".into(), "y".into()]);
        let mut policy = ExpectationPolicy::new();
        policy.insert("CompoundUnique", target.clone(), Action::Skip);
        let results = vec![ExpectationResult::failed("CompoundUnique", target, vec![0])];

        let p = completed(RowClassifier::new(&policy).classify(&ds, &results).unwrap());
        assert_eq!(p.quarantine_records[0].failed_column, "x,y");
    }

    #[test]
    fn test_quarantine_dataset_appends_annotation_columns() {
        let ds = dataset(3);
        let policy = policy(&[("A", "x", Action::Skip)]);
        let p = completed(
            RowClassifier::new(&policy)
                .classify(&ds, &[failed("A", "x", &[1])])
                .unwrap(),
        );

        let q = p.quarantine_dataset().unwrap();
        assert_eq!(q.columns(), &["x", "y", FAILED_EXPECTATION_COLUMN, FAILED_COLUMN_COLUMN]);
        let row = q.row(0).unwrap();
        assert_eq!(row.get("y"), Some("y1"));
        assert_eq!(row.get(FAILED_EXPECTATION_COLUMN), Some("A"));
    }

    #[test]
    fn test_into_result_maps_abort_to_policy_violation() {
        let ds = dataset(2);
        let policy = policy(&[("Unique", "y", Action::Failure)]);
        let err = RowClassifier::new(&policy)
            .classify(&ds, &[failed("Unique", "y", &[0])])
            .unwrap()
            .into_result()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Policy violation: expectation 'Unique' failed on column 'y'"
        );
    }
}
