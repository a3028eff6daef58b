// sieve-core/src/domain/policy.rs

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::expectation::{ExpectationDecl, TargetColumn};

/// What to do with rows that violate an expectation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Quarantine the offending rows and keep going.
    Skip,
    /// Abort the whole run.
    Failure,
}

impl Action {
    /// Only the exact spellings `skip` and `failure` are actions.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "skip" => Some(Action::Skip),
            "failure" => Some(Action::Failure),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Skip => f.write_str("skip"),
            Action::Failure => f.write_str("failure"),
        }
    }
}

/// Disposition table keyed by `(expectation id, target column)`.
///
/// A missing key means "no policy": a failure of that expectation is inert.
#[derive(Debug, Clone, Default)]
pub struct ExpectationPolicy {
    rules: HashMap<String, HashMap<TargetColumn, Action>>,
}

impl ExpectationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from configured declarations. Later entries win on duplicate keys.
    pub fn from_declarations(decls: &[ExpectationDecl]) -> Self {
        let mut policy = Self::new();
        for decl in decls {
            let name = decl.kind.name();
            let target = decl.kind.target();
            let Some(raw) = decl.action.as_deref() else {
                debug!(expectation = name, column = %target, "No action configured");
                continue;
            };
            match Action::parse(raw) {
                Some(action) => {
                    if let Some(previous) = policy.insert(name, target.clone(), action)
                        && previous != action
                    {
                        warn!(
                            expectation = name,
                            column = %target,
                            %previous,
                            %action,
                            "Duplicate policy entry, last one wins"
                        );
                    }
                }
                None => warn!(
                    expectation = name,
                    column = %target,
                    action = raw,
                    "Unknown action, failures of this expectation will be ignored"
                ),
            }
        }
        policy
    }

    pub fn insert(
        &mut self,
        expectation_id: impl Into<String>,
        target: TargetColumn,
        action: Action,
    ) -> Option<Action> {
        self.rules
            .entry(expectation_id.into())
            .or_default()
            .insert(target, action)
    }

    pub fn get(&self, expectation_id: &str, target: &TargetColumn) -> Option<Action> {
        self.rules.get(expectation_id)?.get(target).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
