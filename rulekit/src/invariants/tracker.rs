//! Per-run invariant hit counting

use super::InvariantDeclaration;
use crate::error::{Result, RuleError};
use crate::lifecycle::TestMethod;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoveragePhase {
    Idle,
    Initialized,
    Accumulated,
}

/// Counts how many live tests name each declared invariant
///
/// Lifecycle: `init` seeds every declared name at zero, `accumulate` walks
/// the test methods, `verify` checks for zeros and clears everything so
/// nothing carries over into the next run.
#[derive(Debug)]
pub struct CoverageTracker {
    phase: CoveragePhase,
    hits: BTreeMap<String, usize>,
    ignored_tags: BTreeSet<String>,
}

impl CoverageTracker {
    pub fn new() -> Self {
        Self {
            phase: CoveragePhase::Idle,
            hits: BTreeMap::new(),
            ignored_tags: BTreeSet::new(),
        }
    }

    pub fn phase(&self) -> CoveragePhase {
        self.phase
    }

    pub fn init(&mut self, declaration: &InvariantDeclaration) {
        self.clear();
        for name in declaration.names() {
            self.hits.insert(name.to_string(), 0);
        }
        debug!("coverage initialized with {} invariants", self.hits.len());
        self.phase = CoveragePhase::Initialized;
    }

    /// Count every test method that names an invariant and is not skipped
    pub fn accumulate(&mut self, methods: &[TestMethod]) {
        for method in methods.iter().filter(|m| m.test) {
            let Some(name) = method.invariant.as_deref() else {
                continue;
            };
            if method.ignored {
                debug!("{} is skipped, not counting {}", method.name, name);
                continue;
            }
            self.record(name);
        }
        self.phase = CoveragePhase::Accumulated;
    }

    /// Count one hit. Names that were never declared are ignored.
    pub fn record(&mut self, name: &str) -> bool {
        if let Some(count) = self.hits.get_mut(name) {
            *count += 1;
            return true;
        }

        if !self.hits.is_empty() {
            warn!("test names undeclared invariant {}", name);
        }
        self.ignored_tags.insert(name.to_string());
        false
    }

    pub fn hits(&self, name: &str) -> Option<usize> {
        self.hits.get(name).copied()
    }

    /// Declared names still at zero, sorted
    pub fn uncovered(&self) -> Vec<String> {
        self.hits
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn report(&self) -> CoverageReport {
        let uncovered = self.uncovered();
        CoverageReport {
            declared: self.hits.len(),
            covered: self.hits.len() - uncovered.len(),
            hits: self.hits.clone(),
            uncovered,
            ignored_tags: self.ignored_tags.iter().cloned().collect(),
        }
    }

    /// Fail if any declared invariant has no hits. Always clears the tracker.
    pub fn verify(&mut self) -> Result<CoverageReport> {
        let report = self.report();
        self.clear();

        if report.uncovered.is_empty() {
            Ok(report)
        } else {
            Err(RuleError::CoverageViolation {
                uncovered: report.uncovered,
            })
        }
    }

    pub fn clear(&mut self) {
        self.hits.clear();
        self.ignored_tags.clear();
        self.phase = CoveragePhase::Idle;
    }
}

impl Default for CoverageTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one coverage run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub declared: usize,
    pub covered: usize,
    pub hits: BTreeMap<String, usize>,
    pub uncovered: Vec<String>,
    pub ignored_tags: Vec<String>,
}

impl CoverageReport {
    pub fn coverage(&self) -> f32 {
        if self.declared == 0 {
            100.0
        } else {
            (self.covered as f32 / self.declared as f32) * 100.0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Invariant Coverage:\n\
             - Invariants: {}/{} ({:.1}%)\n\
             - Uncovered: {}\n\
             - Ignored Tags: {}",
            self.covered,
            self.declared,
            self.coverage(),
            self.uncovered.len(),
            self.ignored_tags.len()
        )
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| RuleError::Other(e.into()))
    }
}
