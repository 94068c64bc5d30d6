#![forbid(unsafe_code)]

use super::ReferenceTopology;
use crate::model::{NodeId, NodePosition, Position};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    Match,
    Mismatch,
    Unknown,
}

impl ValidationOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationOutcome::Match => "match",
            ValidationOutcome::Mismatch => "MISMATCH",
            ValidationOutcome::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ValidationResult {
    pub node_id: NodeId,
    pub actual: Position,
    pub expected: Option<Position>,
    pub outcome: ValidationOutcome,
}

impl ValidationResult {
    pub fn matches(&self) -> bool {
        self.outcome == ValidationOutcome::Match
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TopologyReport {
    pub results: Vec<ValidationResult>,
    pub matched: usize,
    pub mismatched: usize,
    pub unknown: usize,
    pub all_correct: bool,
}

impl ReferenceTopology {
    /// Compares each observed row against its reference placement with exact
    /// float equality. Rows for nodes outside the reference are `Unknown` and
    /// do not affect `all_correct`.
    pub fn validate(&self, observed: &[NodePosition]) -> TopologyReport {
        let mut report = TopologyReport {
            results: Vec::with_capacity(observed.len()),
            ..TopologyReport::default()
        };

        for row in observed {
            let expected = self.expected(row.node_id);
            let outcome = match expected {
                Some(expected) if expected == row.position => ValidationOutcome::Match,
                Some(_) => ValidationOutcome::Mismatch,
                None => ValidationOutcome::Unknown,
            };
            match outcome {
                ValidationOutcome::Match => report.matched += 1,
                ValidationOutcome::Mismatch => report.mismatched += 1,
                ValidationOutcome::Unknown => report.unknown += 1,
            }
            report.results.push(ValidationResult {
                node_id: row.node_id,
                actual: row.position,
                expected,
                outcome,
            });
        }

        report.all_correct = report.mismatched == 0;
        report
    }
}
