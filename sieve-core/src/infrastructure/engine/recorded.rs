// sieve-core/src/infrastructure/engine/recorded.rs
//
// Replays results exported by an external validation framework
// (checkpoint result or a single validation result, as JSON).

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value as Json;
use tracing::{info, instrument, warn};

use crate::domain::dataset::Dataset;
use crate::domain::expectation::naming::to_pascal_case;
use crate::domain::expectation::{ExpectationKind, ExpectationResult, TargetColumn};
use crate::error::SieveError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::engine::ExpectationEngine;

#[derive(Debug, Clone)]
pub struct RecordedResultsEngine {
    results: Vec<ExpectationResult>,
}

impl RecordedResultsEngine {
    #[instrument]
    pub fn from_path(path: &Path) -> Result<Self, InfrastructureError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, InfrastructureError> {
        let doc: Json = serde_json::from_str(content)?;
        let entries = result_entries(&doc)?;

        let results: Vec<ExpectationResult> = entries
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                let parsed = parse_entry(entry);
                if parsed.is_none() {
                    warn!(position, "Skipping malformed result entry");
                }
                parsed
            })
            .collect();

        info!(
            recorded = entries.len(),
            usable = results.len(),
            "Recorded results loaded"
        );
        Ok(Self { results })
    }

    pub fn results(&self) -> &[ExpectationResult] {
        &self.results
    }
}

#[async_trait]
impl ExpectationEngine for RecordedResultsEngine {
    fn name(&self) -> &str {
        "recorded"
    }

    async fn evaluate(
        &self,
        _dataset: &Dataset,
        expectations: &[ExpectationKind],
    ) -> Result<Vec<ExpectationResult>, SieveError> {
        if expectations.len() != self.results.len() {
            warn!(
                configured = expectations.len(),
                recorded = self.results.len(),
                "Recorded results do not match the configured expectations one to one"
            );
        }
        Ok(self.results.clone())
    }
}

/// `run_results.<first>.results`, `run_results.<first>.validation_result.results`, or `results`.
fn result_entries(doc: &Json) -> Result<&Vec<Json>, InfrastructureError> {
    let validation = match doc.get("run_results").and_then(Json::as_object) {
        Some(runs) => {
            if runs.len() > 1 {
                warn!(runs = runs.len(), "Several validation runs recorded, using the first");
            }
            let first = runs.values().next().ok_or_else(|| {
                InfrastructureError::MalformedResults("'run_results' is empty".into())
            })?;
            first.get("validation_result").unwrap_or(first)
        }
        None => doc,
    };

    validation
        .get("results")
        .and_then(Json::as_array)
        .ok_or_else(|| InfrastructureError::MalformedResults("no 'results' array found".into()))
}

fn parse_entry(entry: &Json) -> Option<ExpectationResult> {
    let success = entry.get("success")?.as_bool()?;
    let config = entry.get("expectation_config")?;
    let type_name = config
        .get("type")
        .or_else(|| config.get("expectation_type"))?
        .as_str()?;
    let kwargs = config.get("kwargs");

    let violating_indices = entry
        .get("result")
        .and_then(|r| r.get("unexpected_index_list"))
        .and_then(Json::as_array)
        .map(|list| list.iter().filter_map(index_of).collect())
        .unwrap_or_default();

    Some(ExpectationResult {
        expectation_id: to_pascal_case(type_name),
        target: target_of(kwargs),
        success,
        violating_indices,
        details: None,
    })
}

/// Plain integers, or `{"index": n, ...}` when index columns were requested.
fn index_of(item: &Json) -> Option<usize> {
    let raw = match item {
        Json::Object(map) => map.get("index")?,
        other => other,
    };
    raw.as_u64().and_then(|n| usize::try_from(n).ok())
}

fn target_of(kwargs: Option<&Json>) -> TargetColumn {
    let Some(kwargs) = kwargs else {
        return TargetColumn::Table;
    };
    if let Some(column) = kwargs.get("column").and_then(Json::as_str) {
        return TargetColumn::column(column);
    }
    if let (Some(a), Some(b)) = (
        kwargs.get("column_A").and_then(Json::as_str),
        kwargs.get("column_B").and_then(Json::as_str),
    ) {
        return TargetColumn::Columns(vec![a.to_string(), b.to_string()]);
    }
    // `column_set` only appears on table schema checks, which stay table targets
    let list = kwargs
        .get("column_list")
        .or_else(|| kwargs.get("columns"))
        .and_then(Json::as_array);
    match list {
        Some(cols) => TargetColumn::Columns(
            cols.iter()
                .filter_map(Json::as_str)
                .map(str::to_string)
                .collect(),
        ),
        None => TargetColumn::Table,
    }
}
