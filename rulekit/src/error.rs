//! Failure objects shared by every rule

use crate::contract::EqualityLaw;
use crate::accessors::ValueKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("contract violation in {type_name}: {law}")]
    ContractViolation { type_name: String, law: EqualityLaw },

    #[error("some invariants are not covered with tests: {}", .uncovered.join(", "))]
    CoverageViolation { uncovered: Vec<String> },

    #[error("accessor mismatch on {field}: set {expected} but got {actual}")]
    AccessorMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("no sample value for {field} ({kind}), skipping")]
    UnsupportedAccessorType { field: String, kind: ValueKind },

    #[error("cannot construct {type_name}: {reason}")]
    Construction { type_name: String, reason: String },

    #[error("{0}")]
    Failed(String),

    #[error("test body panicked: {0}")]
    Panicked(String),

    #[error("failed to spawn worker {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("multiple failures: {}", render_all(.0))]
    MultipleFailures(Vec<RuleError>),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RuleError>;

impl RuleError {
    /// Collapse a list of failures into one, if there are any
    pub fn collect(mut failures: Vec<RuleError>) -> Option<RuleError> {
        match failures.len() {
            0 => None,
            1 => failures.pop(),
            _ => Some(RuleError::MultipleFailures(failures)),
        }
    }

    /// Failures held by this error, flattening nested groups
    pub fn failures(&self) -> Vec<&RuleError> {
        match self {
            RuleError::MultipleFailures(inner) => {
                inner.iter().flat_map(|e| e.failures()).collect()
            }
            other => vec![other],
        }
    }

    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        RuleError::Panicked(message)
    }
}

fn render_all(errors: &[RuleError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Fail the current run with a message
pub fn fail<T>(message: impl Into<String>) -> Result<T> {
    Err(RuleError::Failed(message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_failures() {
        assert!(RuleError::collect(Vec::new()).is_none());

        let single = RuleError::collect(vec![RuleError::Failed("one".into())]).unwrap();
        assert!(matches!(single, RuleError::Failed(ref m) if m == "one"));

        let many = RuleError::collect(vec![
            RuleError::Failed("one".into()),
            RuleError::Failed("two".into()),
        ])
        .unwrap();
        assert_eq!(many.failures().len(), 2);
        assert_eq!(many.to_string(), "multiple failures: one; two");
    }

    #[test]
    fn test_coverage_message_lists_names() {
        let err = RuleError::CoverageViolation {
            uncovered: vec!["b".to_string(), "c".to_string()],
        };
        assert_eq!(err.to_string(), "some invariants are not covered with tests: b, c");
    }

    #[test]
    fn test_panic_payloads() {
        let err = RuleError::from_panic(Box::new("boom"));
        assert_eq!(err.to_string(), "test body panicked: boom");

        let err = RuleError::from_panic(Box::new(String::from("owned boom")));
        assert_eq!(err.to_string(), "test body panicked: owned boom");

        let err = RuleError::from_panic(Box::new(7_u8));
        assert_eq!(err.to_string(), "test body panicked: non-string panic payload");
    }

    #[test]
    fn test_fail_helper() {
        let result: Result<()> = fail("expected failure");
        assert_eq!(result.unwrap_err().to_string(), "expected failure");
    }
}
