// sieve-core/src/domain/expectation/kind.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::expectation::literal::Literal;
use crate::domain::error::DomainError;

/// What an expectation was evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetColumn {
    Table,
    Column(String),
    Columns(Vec<String>),
}

impl TargetColumn {
    pub fn column(name: impl Into<String>) -> Self {
        TargetColumn::Column(name.into())
    }
}

impl fmt::Display for TargetColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetColumn::Table => f.write_str("<table>"),
            TargetColumn::Column(c) => f.write_str(c),
            TargetColumn::Columns(cols) => f.write_str(&cols.join(",")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Schema,
    Completeness,
    Uniqueness,
    Validity,
    Numeric,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Schema => "schema",
            Category::Completeness => "completeness",
            Category::Uniqueness => "uniqueness",
            Category::Validity => "validity",
            Category::Numeric => "numeric",
        };
        f.write_str(label)
    }
}

trait Targeted {
    fn target(&self) -> TargetColumn;
}

// =============================================================================
//  PARAMETER STRUCTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ColumnParams {
    #[validate(length(min = 1, message = "column cannot be empty"))]
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ColumnsParams {
    #[validate(length(min = 1, message = "at least one column is required"))]
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TableColumnsParams {
    #[validate(length(min = 1, message = "at least one column is required"))]
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_count_bounds"))]
pub struct TableColumnCountParams {
    #[serde(default)]
    pub min: Option<usize>,
    #[serde(default)]
    pub max: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ColumnTypeParams {
    #[validate(length(min = 1, message = "column cannot be empty"))]
    pub column: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "type cannot be empty"))]
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ColumnTypeListParams {
    #[validate(length(min = 1, message = "column cannot be empty"))]
    pub column: String,
    #[validate(length(min = 1, message = "type_list cannot be empty"))]
    pub type_list: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_range_bounds"))]
pub struct ColumnRangeParams {
    #[validate(length(min = 1, message = "column cannot be empty"))]
    pub column: String,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ColumnSetParams {
    #[validate(length(min = 1, message = "column cannot be empty"))]
    pub column: String,
    pub value_set: Vec<Literal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ColumnPairParams {
    #[serde(rename = "column_A")]
    #[validate(length(min = 1, message = "column_A cannot be empty"))]
    pub column_a: String,
    #[serde(rename = "column_B")]
    #[validate(length(min = 1, message = "column_B cannot be empty"))]
    pub column_b: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileRanges {
    pub quantiles: Vec<f64>,
    pub value_ranges: Vec<[Option<f64>; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_quantiles"))]
pub struct ColumnQuantileParams {
    #[validate(length(min = 1, message = "column cannot be empty"))]
    pub column: String,
    pub quantile_values: QuantileRanges,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ZScoreParams {
    #[validate(length(min = 1, message = "column cannot be empty"))]
    pub column: String,
    pub threshold: f64,
    #[serde(default = "default_true")]
    pub double_sided: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MulticolumnSumParams {
    #[validate(length(min = 2, message = "at least two columns are required"))]
    pub columns: Vec<String>,
    pub value: f64,
}

// --- Targets ---

impl Targeted for ColumnParams {
    fn target(&self) -> TargetColumn {
        TargetColumn::column(&self.column)
    }
}
impl Targeted for ColumnTypeParams {
    fn target(&self) -> TargetColumn {
        TargetColumn::column(&self.column)
    }
}
impl Targeted for ColumnTypeListParams {
    fn target(&self) -> TargetColumn {
        TargetColumn::column(&self.column)
    }
}
impl Targeted for ColumnRangeParams {
    fn target(&self) -> TargetColumn {
        TargetColumn::column(&self.column)
    }
}
impl Targeted for ColumnSetParams {
    fn target(&self) -> TargetColumn {
        TargetColumn::column(&self.column)
    }
}
impl Targeted for ColumnQuantileParams {
    fn target(&self) -> TargetColumn {
        TargetColumn::column(&self.column)
    }
}
impl Targeted for ZScoreParams {
    fn target(&self) -> TargetColumn {
        TargetColumn::column(&self.column)
    }
}
impl Targeted for ColumnsParams {
    fn target(&self) -> TargetColumn {
        TargetColumn::Columns(self.columns.clone())
    }
}
impl Targeted for MulticolumnSumParams {
    fn target(&self) -> TargetColumn {
        TargetColumn::Columns(self.columns.clone())
    }
}
impl Targeted for ColumnPairParams {
    fn target(&self) -> TargetColumn {
        TargetColumn::Columns(vec![self.column_a.clone(), self.column_b.clone()])
    }
}
impl Targeted for TableColumnsParams {
    fn target(&self) -> TargetColumn {
        TargetColumn::Table
    }
}
impl Targeted for TableColumnCountParams {
    fn target(&self) -> TargetColumn {
        TargetColumn::Table
    }
}

// --- Schema-level validators ---

fn check_bounds<T: PartialOrd>(min: Option<T>, max: Option<T>) -> Result<(), ValidationError> {
    if let (Some(lo), Some(hi)) = (min, max)
        && lo > hi
    {
        let mut err = ValidationError::new("bounds");
        err.message = Some("min must not exceed max".into());
        return Err(err);
    }
    Ok(())
}

fn validate_range_bounds(p: &ColumnRangeParams) -> Result<(), ValidationError> {
    check_bounds(p.min, p.max)
}

fn validate_count_bounds(p: &TableColumnCountParams) -> Result<(), ValidationError> {
    check_bounds(p.min, p.max)
}

fn validate_quantiles(p: &ColumnQuantileParams) -> Result<(), ValidationError> {
    let q = &p.quantile_values;
    if q.quantiles.len() != q.value_ranges.len() {
        let mut err = ValidationError::new("quantiles");
        err.message = Some("quantiles and value_ranges must have the same length".into());
        return Err(err);
    }
    if q.quantiles.iter().any(|x| !(0.0..=1.0).contains(x)) {
        let mut err = ValidationError::new("quantiles");
        err.message = Some("quantiles must lie in [0, 1]".into());
        return Err(err);
    }
    for [lo, hi] in &q.value_ranges {
        check_bounds(*lo, *hi)?;
    }
    Ok(())
}

// =============================================================================
//  REGISTRY
// =============================================================================

macro_rules! expectation_registry {
    ($( $category:ident => { $( $variant:ident($params:ty) ),* $(,)? } )*) => {
        /// Every expectation the pipeline understands, keyed by its `name` in YAML.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "name")]
        pub enum ExpectationKind {
            $($( $variant($params), )*)*
        }

        impl ExpectationKind {
            pub fn name(&self) -> &'static str {
                match self {
                    $($( Self::$variant(_) => stringify!($variant), )*)*
                }
            }

            pub fn category(&self) -> Category {
                match self {
                    $($( Self::$variant(_) => Category::$category, )*)*
                }
            }

            pub fn target(&self) -> TargetColumn {
                match self {
                    $($( Self::$variant(p) => p.target(), )*)*
                }
            }

            /// All registered names with their category, in declaration order.
            pub fn catalog() -> &'static [(&'static str, Category)] {
                &[ $($( (stringify!($variant), Category::$category), )*)* ]
            }

            pub fn validate(&self) -> Result<(), DomainError> {
                let checked = match self {
                    $($( Self::$variant(p) => p.validate(), )*)*
                };
                checked.map_err(|e| DomainError::InvalidExpectation {
                    name: self.name().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    };
}

expectation_registry! {
    Schema => {
        ExpectColumnToExist(ColumnParams),
        ExpectColumnValuesToBeOfType(ColumnTypeParams),
        ExpectColumnValuesToBeInTypeList(ColumnTypeListParams),
        ExpectTableColumnCountToBeBetween(TableColumnCountParams),
        ExpectTableColumnsToMatchOrderedList(TableColumnsParams),
        ExpectTableColumnsToMatchSet(TableColumnsParams),
    }
    Completeness => {
        ExpectColumnValuesToBeNull(ColumnParams),
        ExpectColumnValuesToNotBeNull(ColumnParams),
    }
    Uniqueness => {
        ExpectColumnDistinctValuesToBeInSet(ColumnSetParams),
        ExpectColumnDistinctValuesToContainSet(ColumnSetParams),
        ExpectColumnDistinctValuesToEqualSet(ColumnSetParams),
        ExpectColumnProportionOfUniqueValuesToBeBetween(ColumnRangeParams),
        ExpectColumnUniqueValueCountToBeBetween(ColumnRangeParams),
        ExpectColumnValuesToBeUnique(ColumnParams),
        ExpectCompoundColumnsToBeUnique(ColumnsParams),
        ExpectSelectColumnValuesToBeUniqueWithinRecord(ColumnsParams),
    }
    Validity => {
        ExpectColumnMostCommonValueToBeInSet(ColumnSetParams),
        ExpectColumnPairValuesToBeEqual(ColumnPairParams),
        ExpectColumnValuesToBeInSet(ColumnSetParams),
        ExpectColumnValuesToNotBeInSet(ColumnSetParams),
        ExpectColumnValueLengthsToBeBetween(ColumnRangeParams),
    }
    Numeric => {
        ExpectColumnMaxToBeBetween(ColumnRangeParams),
        ExpectColumnMeanToBeBetween(ColumnRangeParams),
        ExpectColumnMedianToBeBetween(ColumnRangeParams),
        ExpectColumnMinToBeBetween(ColumnRangeParams),
        ExpectColumnQuantileValuesToBeBetween(ColumnQuantileParams),
        ExpectColumnStdevToBeBetween(ColumnRangeParams),
        ExpectColumnSumToBeBetween(ColumnRangeParams),
        ExpectColumnValueZScoresToBeLessThan(ZScoreParams),
        ExpectColumnValuesToBeBetween(ColumnRangeParams),
        ExpectMulticolumnSumToEqual(MulticolumnSumParams),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ExpectationKind {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_parse_column_expectation() {
        let kind = parse("name: ExpectColumnValuesToNotBeNull\ncolumn: MMSI\n");
        assert_eq!(kind.name(), "ExpectColumnValuesToNotBeNull");
        assert_eq!(kind.category(), Category::Completeness);
        assert_eq!(kind.target(), TargetColumn::column("MMSI"));
    }

    #[test]
    fn test_parse_range_with_integer_bounds() {
        let kind = parse("name: ExpectColumnValuesToBeBetween\ncolumn: Latitude\nmin: -90\nmax: 90\n");
        match kind {
            ExpectationKind::ExpectColumnValuesToBeBetween(p) => {
                assert_eq!(p.min, Some(-90.0));
                assert_eq!(p.max, Some(90.0));
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_pair_and_table_targets() {
        let pair = parse("name: ExpectColumnPairValuesToBeEqual\ncolumn_A: a\ncolumn_B: b\n");
        assert_eq!(
            pair.target(),
            TargetColumn::Columns(vec!["a".into(), "b".into()])
        );

        let table = parse("name: ExpectTableColumnsToMatchSet\ncolumns: [a, b]\n");
        assert_eq!(table.target(), TargetColumn::Table);
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let res: Result<ExpectationKind, _> =
            serde_yaml::from_str("name: ExpectColumnToBeAwesome\ncolumn: x\n");
        assert!(res.is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let kind = parse("name: ExpectColumnMeanToBeBetween\ncolumn: speed\nmin: 10\nmax: 1\n");
        let err = kind.validate().unwrap_err();
        assert!(matches!(err, DomainError::InvalidExpectation { .. }));
        assert!(err.to_string().contains("ExpectColumnMeanToBeBetween"));
    }

    #[test]
    fn test_validate_rejects_empty_column() {
        let kind = parse("name: ExpectColumnValuesToBeUnique\ncolumn: \"\"\n");
        assert!(kind.validate().is_err());
    }

    #[test]
    fn test_quantile_lengths_must_match() {
        let kind = parse(
            "name: ExpectColumnQuantileValuesToBeBetween\ncolumn: x\nquantile_values:\n  quantiles: [0.5]\n  value_ranges: [[1, 2], [3, 4]]\n",
        );
        assert!(kind.validate().is_err());
    }

    #[test]
    fn test_catalog_lists_every_category() {
        let catalog = ExpectationKind::catalog();
        assert_eq!(catalog.len(), 31);
        assert!(catalog.iter().any(|(n, c)| *n == "ExpectColumnValuesToBeUnique"
            && *c == Category::Uniqueness));
    }

    #[test]
    fn test_target_display() {
        assert_eq!(TargetColumn::Table.to_string(), "<table>");
        assert_eq!(
            TargetColumn::Columns(vec!["a".into(), "b".into()]).to_string(),
            "a,b"
        );
    }
}
