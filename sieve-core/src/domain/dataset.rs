// sieve-core/src/domain/dataset.rs

use std::collections::BTreeSet;

use crate::domain::error::DomainError;

/// A blank (or whitespace-only) cell is a missing value.
pub fn is_missing(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// Ordered, positionally indexed rows sharing one column list.
///
/// Cells keep the exact text they were read with, so a row written back
/// out is byte-for-byte the row that came in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows<R, C>(columns: Vec<String>, rows: R) -> Result<Self, DomainError>
    where
        R: IntoIterator<Item = Vec<C>>,
        C: Into<String>,
    {
        let mut dataset = Self::new(columns);
        for row in rows {
            dataset.push_row(row.into_iter().map(Into::into).collect())?;
        }
        Ok(dataset)
    }

    pub fn push_row(&mut self, cells: Vec<String>) -> Result<(), DomainError> {
        if cells.len() != self.columns.len() {
            return Err(DomainError::RowWidthMismatch {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: cells.len(),
            });
        }
        self.rows.push(cells);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            index,
            columns: &self.columns,
            cells,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().enumerate().map(|(index, cells)| Row {
            index,
            columns: &self.columns,
            cells,
        })
    }

    /// Cells of one column in row order, `None` if the column is unknown.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| r[idx].as_str()))
    }

    /// New dataset holding the rows at `indices`, in the given order, re-indexed from 0.
    /// Indices past the end are ignored; callers validate bounds beforehand.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// New dataset with every row not in `excluded`, original order kept, re-indexed from 0.
    pub fn without(&self, excluded: &BTreeSet<usize>) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .enumerate()
                .filter(|(i, _)| !excluded.contains(i))
                .map(|(_, r)| r.clone())
                .collect(),
        }
    }
}

/// Borrowed view of one row with its original position.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    index: usize,
    columns: &'a [String],
    cells: &'a [String],
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.cells[i].as_str())
    }

    pub fn cells(&self) -> &'a [String] {
        self.cells
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_rows(
            vec!["id".into(), "name".into()],
            (0..5).map(|i| vec![i.to_string(), format!("n{i}")]),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_cells() {
        assert!(is_missing(""));
        assert!(is_missing("  "));
        assert!(!is_missing("0"));
        assert!(!is_missing("NaN"));
    }

    #[test]
    fn test_push_row_rejects_wrong_width() {
        let mut ds = Dataset::new(vec!["a".into(), "b".into()]);
        let err = ds.push_row(vec![String::new()]).unwrap_err();
        assert!(matches!(
            err,
            DomainError::RowWidthMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_select_reindexes_in_given_order() {
        let ds = sample();
        let subset = ds.select(&[3, 1]);
        assert_eq!(subset.len(), 2);
        assert_eq!(subset.row(0).unwrap().get("id"), Some("3"));
        assert_eq!(subset.row(1).unwrap().index(), 1);
    }

    #[test]
    fn test_without_preserves_order() {
        let ds = sample();
        let excluded: BTreeSet<usize> = [1, 3].into_iter().collect();
        let rest = ds.without(&excluded);
        let ids: Vec<_> = rest.column("id").unwrap().collect();
        assert_eq!(ids, vec!["0", "2", "4"]);
    }

    #[test]
    fn test_cells_keep_their_text() {
        let ds = Dataset::from_rows(vec!["zip".into()], [vec!["00123"], vec![" 1.50 "]]).unwrap();
        let cells: Vec<_> = ds.column("zip").unwrap().collect();
        assert_eq!(cells, vec!["00123", " 1.50 "]);
    }

    #[test]
    fn test_unknown_column() {
        assert!(sample().column("missing").is_none());
        assert_eq!(sample().column_index("name"), Some(1));
    }
}
