// sieve-core/src/infrastructure/engine/native.rs
//
// In-process evaluation of every registered expectation, as SQL over a
// DataFusion session holding the dataset.
//
// The dataset is registered as one table of text columns plus a
// `__sieve_row` position column. Row-level checks select the positions that
// violate a predicate; aggregate and table checks only report success plus
// the observed value.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use datafusion::arrow::array::{Array, ArrayRef, StringArray, UInt64Array};
use datafusion::arrow::datatypes::{DataType, Field, Schema};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::arrow::util::display::array_value_to_string;
use datafusion::error::DataFusionError;
use datafusion::prelude::SessionContext;
use tracing::{debug, info, instrument};

use crate::domain::dataset::{Dataset, is_missing};
use crate::domain::expectation::kind::{
    ColumnQuantileParams, ColumnRangeParams, ColumnSetParams, MulticolumnSumParams, ZScoreParams,
};
use crate::domain::expectation::{ExpectationKind, ExpectationResult, Literal, TargetColumn};
use crate::error::SieveError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::engine::ExpectationEngine;

const TABLE: &str = "dataset";
const ROW_FIELD: &str = "__sieve_row";
const ROW: &str = "\"__sieve_row\"";
const SUM_TOLERANCE: f64 = 1e-9;
const MIN_STDDEV: f64 = 1e-9;

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeEngine;

impl NativeEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExpectationEngine for NativeEngine {
    fn name(&self) -> &str {
        "native"
    }

    #[instrument(skip_all, fields(rows = dataset.len(), expectations = expectations.len()))]
    async fn evaluate(
        &self,
        dataset: &Dataset,
        expectations: &[ExpectationKind],
    ) -> Result<Vec<ExpectationResult>, SieveError> {
        let session = Session::open(dataset)?;

        let mut results = Vec::with_capacity(expectations.len());
        for kind in expectations {
            let check = session.check(kind).await?;
            results.push(check.into_result(kind));
        }

        let failed = results.iter().filter(|r| !r.success).count();
        info!(failed, passed = results.len() - failed, "Expectations evaluated");
        Ok(results)
    }
}

/// Raw outcome, before it is tagged with the expectation identity.
enum Check {
    /// Row-level: passes when empty.
    Rows(Vec<usize>),
    Aggregate { success: bool, observed: String },
    /// Columns referenced by the expectation that the dataset does not have.
    Missing(Vec<String>),
}

impl Check {
    fn into_result(self, kind: &ExpectationKind) -> ExpectationResult {
        let id = kind.name();
        let target = kind.target();
        match self {
            Check::Rows(rows) if rows.is_empty() => ExpectationResult::passed(id, target),
            Check::Rows(rows) => {
                let details = format!("{} unexpected rows", rows.len());
                ExpectationResult::failed(id, target, rows).with_details(details)
            }
            Check::Aggregate { success: true, observed } => {
                ExpectationResult::passed(id, target).with_details(observed)
            }
            Check::Aggregate { success: false, observed } => {
                ExpectationResult::failed(id, target, Vec::new()).with_details(observed)
            }
            Check::Missing(columns) => {
                debug!(expectation = id, ?columns, "Referenced column not found");
                ExpectationResult::failed(id, target, Vec::new())
                    .with_details(format!("column not found: {}", columns.join(", ")))
            }
        }
    }
}

fn aggregate(success: bool, observed: String) -> Check {
    Check::Aggregate { success, observed }
}

#[derive(Clone, Copy)]
enum SetRule {
    /// Every distinct value is in the set.
    Within,
    /// Every set member occurs.
    Covers,
    Equals,
}

// =============================================================================
//  SESSION
// =============================================================================

struct Session<'a> {
    ctx: SessionContext,
    dataset: &'a Dataset,
}

impl<'a> Session<'a> {
    fn open(dataset: &'a Dataset) -> Result<Self, InfrastructureError> {
        let ctx = SessionContext::new();
        ctx.register_batch(TABLE, to_batch(dataset)?)?;
        Ok(Self { ctx, dataset })
    }

    async fn fetch(&self, sql: &str) -> Result<Vec<RecordBatch>, InfrastructureError> {
        debug!(sql = %sql, "Expectation query");
        let df = self.ctx.sql(sql).await?;
        Ok(df.collect().await?)
    }

    async fn rows(&self, sql: &str) -> Result<Check, InfrastructureError> {
        let batches = self.fetch(sql).await?;
        let rows = cells(&batches, 0)?
            .into_iter()
            .flatten()
            .filter_map(|cell| cell.parse().ok())
            .collect();
        Ok(Check::Rows(rows))
    }

    async fn rows_where(&self, violation: &str) -> Result<Check, InfrastructureError> {
        self.rows(&format!(
            "SELECT {ROW} FROM {TABLE} WHERE {violation} ORDER BY {ROW}"
        ))
        .await
    }

    /// First row of a single-row query, one number per selected expression.
    async fn scalars(&self, sql: &str) -> Result<Vec<Option<f64>>, InfrastructureError> {
        let batches = self.fetch(sql).await?;
        let width = batches.first().map_or(0, RecordBatch::num_columns);
        (0..width)
            .map(|i| -> Result<Option<f64>, InfrastructureError> {
                Ok(cells(&batches, i)?
                    .into_iter()
                    .next()
                    .flatten()
                    .and_then(|cell| cell.parse().ok()))
            })
            .collect()
    }

    async fn scalar(&self, sql: &str) -> Result<Option<f64>, InfrastructureError> {
        Ok(self.scalars(sql).await?.into_iter().next().flatten())
    }

    async fn check(&self, kind: &ExpectationKind) -> Result<Check, InfrastructureError> {
        use ExpectationKind as K;

        let columns = self.dataset.columns();
        let missing: Vec<String> = referenced_columns(kind)
            .into_iter()
            .filter(|c| !columns.contains(c))
            .collect();
        if !missing.is_empty() {
            return Ok(Check::Missing(missing));
        }

        match kind {
            // --- Schema ---
            K::ExpectColumnToExist(p) => {
                Ok(aggregate(columns.contains(&p.column), listing(columns)))
            }
            K::ExpectColumnValuesToBeOfType(p) => {
                let c = Col::new(&p.column);
                self.rows_where(&format!(
                    "{c} IS NOT NULL AND NOT ({})",
                    type_matches(&c, &p.type_name)
                ))
                .await
            }
            K::ExpectColumnValuesToBeInTypeList(p) => {
                let c = Col::new(&p.column);
                let any = any_of(p.type_list.iter().map(|t| type_matches(&c, t)));
                self.rows_where(&format!("{c} IS NOT NULL AND NOT {any}")).await
            }
            K::ExpectTableColumnCountToBeBetween(p) => {
                let count = columns.len();
                Ok(aggregate(
                    within(
                        count as f64,
                        p.min.map(|m| m as f64),
                        p.max.map(|m| m as f64),
                    ),
                    format!("column_count: {count}"),
                ))
            }
            K::ExpectTableColumnsToMatchOrderedList(p) => Ok(aggregate(
                columns == p.columns.as_slice(),
                listing(columns),
            )),
            K::ExpectTableColumnsToMatchSet(p) => {
                let actual: BTreeSet<&String> = columns.iter().collect();
                let expected: BTreeSet<&String> = p.columns.iter().collect();
                Ok(aggregate(actual == expected, listing(columns)))
            }

            // --- Completeness ---
            K::ExpectColumnValuesToBeNull(p) => {
                self.rows_where(&format!("{} IS NOT NULL", Col::new(&p.column)))
                    .await
            }
            K::ExpectColumnValuesToNotBeNull(p) => {
                self.rows_where(&format!("{} IS NULL", Col::new(&p.column)))
                    .await
            }

            // --- Uniqueness ---
            K::ExpectColumnDistinctValuesToBeInSet(p) => {
                self.distinct_against_set(p, SetRule::Within).await
            }
            K::ExpectColumnDistinctValuesToContainSet(p) => {
                self.distinct_against_set(p, SetRule::Covers).await
            }
            K::ExpectColumnDistinctValuesToEqualSet(p) => {
                self.distinct_against_set(p, SetRule::Equals).await
            }
            K::ExpectColumnProportionOfUniqueValuesToBeBetween(p) => {
                let c = Col::new(&p.column);
                let distinct = self.distinct_count(&c).await?;
                let non_null = self
                    .scalar(&format!("SELECT COUNT({c}) FROM {TABLE}"))
                    .await?
                    .unwrap_or_default();
                if non_null == 0.0 {
                    return Ok(aggregate(false, "no non-null values".to_string()));
                }
                let proportion = distinct / non_null;
                Ok(aggregate(
                    within(proportion, p.min, p.max),
                    format!("observed_value: {proportion}"),
                ))
            }
            K::ExpectColumnUniqueValueCountToBeBetween(p) => {
                let count = self.distinct_count(&Col::new(&p.column)).await?;
                Ok(aggregate(
                    within(count, p.min, p.max),
                    format!("observed_value: {count}"),
                ))
            }
            K::ExpectColumnValuesToBeUnique(p) => {
                self.duplicated_rows(&[Col::new(&p.column)]).await
            }
            K::ExpectCompoundColumnsToBeUnique(p) => {
                // Rows where every value is missing are ignored
                self.duplicated_rows(&cols(&p.columns)).await
            }
            K::ExpectSelectColumnValuesToBeUniqueWithinRecord(p) => {
                let cs = cols(&p.columns);
                let mut repeats = Vec::new();
                for (i, a) in cs.iter().enumerate() {
                    for b in &cs[i + 1..] {
                        repeats.push(format!(
                            "({a} IS NOT NULL AND {b} IS NOT NULL AND {})",
                            same_value(a, b)
                        ));
                    }
                }
                self.rows_where(&any_of(repeats)).await
            }

            // --- Validity ---
            K::ExpectColumnMostCommonValueToBeInSet(p) => self.most_common_in_set(p).await,
            K::ExpectColumnPairValuesToBeEqual(p) => {
                let (a, b) = (Col::new(&p.column_a), Col::new(&p.column_b));
                self.rows_where(&format!(
                    "NOT ({a} IS NULL AND {b} IS NULL) AND NOT {}",
                    same_value(&a, &b)
                ))
                .await
            }
            K::ExpectColumnValuesToBeInSet(p) => {
                let c = Col::new(&p.column);
                self.rows_where(&format!(
                    "{c} IS NOT NULL AND NOT {}",
                    member(&c, &p.value_set)
                ))
                .await
            }
            K::ExpectColumnValuesToNotBeInSet(p) => {
                let c = Col::new(&p.column);
                self.rows_where(&format!("{c} IS NOT NULL AND {}", member(&c, &p.value_set)))
                    .await
            }
            K::ExpectColumnValueLengthsToBeBetween(p) => {
                let c = Col::new(&p.column);
                let length = format!("CHARACTER_LENGTH({c})");
                self.rows_where(&format!(
                    "{c} IS NOT NULL AND NOT {}",
                    range(&length, p.min, p.max)
                ))
                .await
            }

            // --- Numeric ---
            K::ExpectColumnMaxToBeBetween(p) => self.numeric_aggregate(p, "MAX").await,
            K::ExpectColumnMinToBeBetween(p) => self.numeric_aggregate(p, "MIN").await,
            K::ExpectColumnMeanToBeBetween(p) => self.numeric_aggregate(p, "AVG").await,
            K::ExpectColumnSumToBeBetween(p) => self.numeric_aggregate(p, "SUM").await,
            K::ExpectColumnStdevToBeBetween(p) => self.numeric_aggregate(p, "STDDEV").await,
            K::ExpectColumnMedianToBeBetween(p) => self.numeric_aggregate(p, "MEDIAN").await,
            K::ExpectColumnQuantileValuesToBeBetween(p) => self.quantiles_between(p).await,
            K::ExpectColumnValueZScoresToBeLessThan(p) => self.z_scores(p).await,
            K::ExpectColumnValuesToBeBetween(p) => {
                let c = Col::new(&p.column);
                let n = c.num();
                // Non-numeric values are out of any range
                self.rows_where(&format!(
                    "{c} IS NOT NULL AND NOT ({n} IS NOT NULL AND {})",
                    range(&n, p.min, p.max)
                ))
                .await
            }
            K::ExpectMulticolumnSumToEqual(p) => self.multicolumn_sum(p).await,
        }
    }

    // --- Row-level helpers ---

    /// Every row whose key over `cs` occurs more than once.
    async fn duplicated_rows(&self, cs: &[Col]) -> Result<Check, InfrastructureError> {
        let keys: Vec<String> = cs.iter().map(Col::key).collect();
        let present = any_of(cs.iter().map(|c| format!("{c} IS NOT NULL")));
        self.rows(&format!(
            "SELECT {ROW} FROM (\
                SELECT {ROW}, COUNT(*) OVER (PARTITION BY {keys}) AS dup \
                FROM {TABLE} WHERE {present}\
             ) AS counted \
             WHERE dup > 1 ORDER BY {ROW}",
            keys = keys.join(", "),
        ))
        .await
    }

    async fn z_scores(&self, p: &ZScoreParams) -> Result<Check, InfrastructureError> {
        let c = Col::new(&p.column);
        let z = if p.double_sided {
            "ABS((v.x - s.mean_x) / s.sd_x)"
        } else {
            "(v.x - s.mean_x) / s.sd_x"
        };
        // Non-numeric values cannot have a z-score
        self.rows(&format!(
            "WITH v AS (SELECT {ROW} AS pos, {c} AS cell, {n} AS x FROM {TABLE}), \
                  s AS (SELECT AVG(x) AS mean_x, STDDEV(x) AS sd_x FROM v) \
             SELECT v.pos FROM v CROSS JOIN s \
             WHERE v.cell IS NOT NULL \
               AND (v.x IS NULL OR (s.sd_x > {min_sd} AND {z} >= {threshold})) \
             ORDER BY v.pos",
            n = c.num(),
            min_sd = float(MIN_STDDEV),
            threshold = float(p.threshold),
        ))
        .await
    }

    async fn multicolumn_sum(&self, p: &MulticolumnSumParams) -> Result<Check, InfrastructureError> {
        let cs = cols(&p.columns);
        let all_missing = all_of(cs.iter().map(|c| format!("{c} IS NULL")));
        let non_numeric = any_of(
            cs.iter()
                .map(|c| format!("({c} IS NOT NULL AND {} IS NULL)", c.num())),
        );
        let total: Vec<String> = cs
            .iter()
            .map(|c| format!("COALESCE({}, 0.0)", c.num()))
            .collect();
        self.rows_where(&format!(
            "NOT {all_missing} AND ({non_numeric} OR ABS({} - {}) > {})",
            total.join(" + "),
            float(p.value),
            float(SUM_TOLERANCE),
        ))
        .await
    }

    // --- Aggregate helpers ---

    async fn numeric_aggregate(
        &self,
        p: &ColumnRangeParams,
        function: &str,
    ) -> Result<Check, InfrastructureError> {
        let n = Col::new(&p.column).num();
        let observed = self
            .scalar(&format!("SELECT {function}({n}) FROM {TABLE}"))
            .await?;
        Ok(match observed {
            Some(x) => aggregate(within(x, p.min, p.max), format!("observed_value: {x}")),
            None => aggregate(false, "not enough numeric values".to_string()),
        })
    }

    async fn quantiles_between(
        &self,
        p: &ColumnQuantileParams,
    ) -> Result<Check, InfrastructureError> {
        let n = Col::new(&p.column).num();
        let q = &p.quantile_values;

        let mut select = vec![format!("COUNT({n})")];
        select.extend(q.quantiles.iter().map(|quantile| {
            format!("APPROX_PERCENTILE_CONT({quantile:?}) WITHIN GROUP (ORDER BY {n})")
        }));
        let values = self
            .scalars(&format!("SELECT {} FROM {TABLE}", select.join(", ")))
            .await?;

        let mut success = values.first().copied().flatten().unwrap_or_default() > 0.0;
        let mut observed = Vec::with_capacity(q.quantiles.len());
        for ((quantile, [lo, hi]), value) in q
            .quantiles
            .iter()
            .zip(&q.value_ranges)
            .zip(values.iter().skip(1))
        {
            match value {
                Some(x) => {
                    success &= within(*x, *lo, *hi);
                    observed.push(format!("{quantile}: {x}"));
                }
                None => success = false,
            }
        }
        Ok(aggregate(
            success,
            format!("observed_value: [{}]", observed.join(", ")),
        ))
    }

    /// Distinct non-null values, numerically equal cells counted once.
    async fn distinct_count(&self, c: &Col) -> Result<f64, InfrastructureError> {
        let count = self
            .scalar(&format!(
                "SELECT COUNT(*) FROM (\
                    SELECT DISTINCT {n} AS n, {t} AS t FROM {TABLE} WHERE {c} IS NOT NULL\
                 ) AS d",
                n = c.num(),
                t = c.text(),
            ))
            .await?;
        Ok(count.unwrap_or_default())
    }

    async fn distinct_against_set(
        &self,
        p: &ColumnSetParams,
        rule: SetRule,
    ) -> Result<Check, InfrastructureError> {
        let c = Col::new(&p.column);
        let mut select = vec![format!("MIN({c}) AS v")];
        select.extend(p.value_set.iter().map(|lit| {
            format!("MAX(CASE WHEN {} THEN 1 ELSE 0 END)", literal_match(&c, lit))
        }));
        let batches = self
            .fetch(&format!(
                "SELECT {} FROM {TABLE} WHERE {c} IS NOT NULL GROUP BY {} ORDER BY v",
                select.join(", "),
                c.key(),
            ))
            .await?;

        let distinct: Vec<String> = cells(&batches, 0)?.into_iter().flatten().collect();
        // hits[k][i]: distinct value i matches set member k
        let hits = (1..=p.value_set.len())
            .map(|k| flags(&batches, k))
            .collect::<Result<Vec<_>, _>>()?;

        let within_set = (0..distinct.len()).all(|i| hits.iter().any(|member| member[i]));
        let covers_set = hits.iter().all(|member| member.iter().any(|&hit| hit));
        let success = match rule {
            SetRule::Within => within_set,
            SetRule::Covers => covers_set,
            SetRule::Equals => within_set && covers_set,
        };
        Ok(aggregate(
            success,
            format!("observed_value: [{}]", distinct.join(", ")),
        ))
    }

    async fn most_common_in_set(&self, p: &ColumnSetParams) -> Result<Check, InfrastructureError> {
        let c = Col::new(&p.column);
        // Ties: every mode must be in the set
        let batches = self
            .fetch(&format!(
                "WITH g AS (\
                    SELECT MIN({c}) AS v, COUNT(*) AS n, \
                           MAX(CASE WHEN {inside} THEN 1 ELSE 0 END) AS inside \
                    FROM {TABLE} WHERE {c} IS NOT NULL GROUP BY {key}\
                 ) \
                 SELECT v, inside FROM g WHERE n = (SELECT MAX(n) FROM g) ORDER BY v",
                inside = member(&c, &p.value_set),
                key = c.key(),
            ))
            .await?;

        let modes: Vec<String> = cells(&batches, 0)?.into_iter().flatten().collect();
        if modes.is_empty() {
            return Ok(aggregate(false, "no non-null values".to_string()));
        }
        Ok(aggregate(
            flags(&batches, 1)?.into_iter().all(|inside| inside),
            format!("observed_value: [{}]", modes.join(", ")),
        ))
    }
}

// =============================================================================
//  ARROW <-> DATASET
// =============================================================================

fn to_batch(dataset: &Dataset) -> Result<RecordBatch, InfrastructureError> {
    let mut fields = Vec::with_capacity(dataset.columns().len() + 1);
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(dataset.columns().len() + 1);

    for (i, name) in dataset.columns().iter().enumerate() {
        fields.push(Field::new(name.as_str(), DataType::Utf8, true));
        let cells: StringArray = dataset
            .rows()
            .map(|row| {
                let cell = row.cells()[i].as_str();
                (!is_missing(cell)).then_some(cell)
            })
            .collect();
        arrays.push(Arc::new(cells));
    }
    fields.push(Field::new(ROW_FIELD, DataType::UInt64, false));
    arrays.push(Arc::new(UInt64Array::from_iter_values(
        0..dataset.len() as u64,
    )));

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .map_err(DataFusionError::from)?;
    Ok(batch)
}

/// One column of a query result rendered as text, `None` for SQL NULL.
fn cells(
    batches: &[RecordBatch],
    column: usize,
) -> Result<Vec<Option<String>>, InfrastructureError> {
    let mut out = Vec::new();
    for batch in batches {
        let array = batch.column(column);
        for i in 0..batch.num_rows() {
            if array.is_null(i) {
                out.push(None);
                continue;
            }
            let text = array_value_to_string(array, i).map_err(DataFusionError::from)?;
            out.push(Some(text));
        }
    }
    Ok(out)
}

/// A `0` / `1` result column as booleans.
fn flags(batches: &[RecordBatch], column: usize) -> Result<Vec<bool>, InfrastructureError> {
    Ok(cells(batches, column)?
        .into_iter()
        .map(|cell| cell.as_deref() == Some("1"))
        .collect())
}

// =============================================================================
//  SQL BUILDING
// =============================================================================

/// A quoted column reference.
struct Col(String);

impl Col {
    fn new(name: &str) -> Self {
        Col(format!("\"{}\"", name.replace('"', "\"\"")))
    }

    /// Numeric reading of the cell, NULL when it is not a number.
    fn num(&self) -> String {
        format!("TRY_CAST(TRIM({}) AS DOUBLE)", self.0)
    }

    /// The cell text when it is not a number.
    fn text(&self) -> String {
        format!("CASE WHEN {} IS NULL THEN {} END", self.num(), self.0)
    }

    /// Grouping key: numerically equal cells (`1`, `1.0`) share a key.
    fn key(&self) -> String {
        format!("{}, {}", self.num(), self.text())
    }
}

impl fmt::Display for Col {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn cols(names: &[String]) -> Vec<Col> {
    names.iter().map(|n| Col::new(n)).collect()
}

fn referenced_columns(kind: &ExpectationKind) -> Vec<String> {
    match (kind, kind.target()) {
        (ExpectationKind::ExpectColumnToExist(_), _) | (_, TargetColumn::Table) => Vec::new(),
        (_, TargetColumn::Column(c)) => vec![c],
        (_, TargetColumn::Columns(cs)) => cs,
    }
}

fn listing(columns: &[String]) -> String {
    format!("columns: [{}]", columns.join(", "))
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn float(x: f64) -> String {
    format!("CAST('{x}' AS DOUBLE)")
}

/// Parenthesised disjunction, `FALSE` when empty.
fn any_of(terms: impl IntoIterator<Item = String>) -> String {
    let terms: Vec<String> = terms.into_iter().collect();
    if terms.is_empty() {
        "FALSE".to_string()
    } else {
        format!("({})", terms.join(" OR "))
    }
}

/// Parenthesised conjunction, `TRUE` when empty.
fn all_of(terms: impl IntoIterator<Item = String>) -> String {
    let terms: Vec<String> = terms.into_iter().collect();
    if terms.is_empty() {
        "TRUE".to_string()
    } else {
        format!("({})", terms.join(" AND "))
    }
}

/// Inclusive range check on `expr`; a missing bound is open.
fn range(expr: &str, min: Option<f64>, max: Option<f64>) -> String {
    all_of(
        min.map(|lo| format!("{expr} >= {}", float(lo)))
            .into_iter()
            .chain(max.map(|hi| format!("{expr} <= {}", float(hi)))),
    )
}

fn within(x: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.is_none_or(|lo| x >= lo) && max.is_none_or(|hi| x <= hi)
}

/// Never NULL: both numbers and equal, or both text and identical.
fn same_value(a: &Col, b: &Col) -> String {
    format!(
        "(COALESCE({na} = {nb}, FALSE) OR COALESCE({na} IS NULL AND {nb} IS NULL AND {a} = {b}, FALSE))",
        na = a.num(),
        nb = b.num(),
    )
}

/// Never NULL. Numbers compare numerically, text compares exactly.
fn literal_match(c: &Col, literal: &Literal) -> String {
    match literal {
        Literal::Null => "FALSE".to_string(),
        Literal::Bool(b) => format!("COALESCE(LOWER(TRIM({c})) = '{b}', FALSE)"),
        Literal::Integer(i) => format!("COALESCE({} = {}, FALSE)", c.num(), float(*i as f64)),
        Literal::Float(x) => format!("COALESCE({} = {}, FALSE)", c.num(), float(*x)),
        Literal::Text(text) => format!("COALESCE({c} = {}, FALSE)", quote(text)),
    }
}

fn member(c: &Col, set: &[Literal]) -> String {
    any_of(set.iter().map(|lit| literal_match(c, lit)))
}

fn type_matches(c: &Col, type_name: &str) -> String {
    let boolean = format!("LOWER(TRIM({c})) IN ('true', 'false')");
    match type_name.trim().to_ascii_lowercase().as_str() {
        "int" | "integer" | "int8" | "int16" | "int32" | "int64" | "long" => {
            format!("TRY_CAST(TRIM({c}) AS BIGINT) IS NOT NULL")
        }
        "float" | "float16" | "float32" | "float64" | "double" | "number" | "numeric" => {
            format!("{} IS NOT NULL", c.num())
        }
        "str" | "string" | "text" | "varchar" => {
            format!("({} IS NULL AND NOT {boolean})", c.num())
        }
        "bool" | "boolean" => boolean,
        "object" => "TRUE".to_string(),
        _ => "FALSE".to_string(),
    }
}
