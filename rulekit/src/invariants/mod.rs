//! Invariant coverage for test classes
//!
//! A type declares its documented invariants as `(name, description)` pairs.
//! Test methods name the invariant they exercise through their metadata. At
//! the end of a class run every declared invariant must have been named by
//! at least one test that was not skipped.

pub mod rule;
pub mod tracker;

pub use rule::InvariantRule;
pub use tracker::{CoveragePhase, CoverageReport, CoverageTracker};

use crate::error::{Result, RuleError};
use serde::{Deserialize, Serialize};

/// A documented invariant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invariant {
    pub name: String,
    pub description: String,
}

/// The invariants a type declares, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantDeclaration {
    invariants: Vec<Invariant>,
}

impl InvariantDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an invariant. A repeated name replaces the earlier description.
    pub fn invariant(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        let description = description.into();

        match self.invariants.iter_mut().find(|i| i.name == name) {
            Some(existing) => existing.description = description,
            None => self.invariants.push(Invariant { name, description }),
        }
        self
    }

    /// Build from parallel name and description lists
    pub fn from_parallel<N, D>(names: &[N], descriptions: &[D]) -> Result<Self>
    where
        N: AsRef<str>,
        D: AsRef<str>,
    {
        if names.len() != descriptions.len() {
            return Err(RuleError::Configuration(format!(
                "{} invariant names but {} descriptions",
                names.len(),
                descriptions.len()
            )));
        }

        Ok(names
            .iter()
            .zip(descriptions)
            .fold(Self::new(), |decl, (name, description)| {
                decl.invariant(name.as_ref(), description.as_ref())
            }))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.invariants.iter().map(|i| i.name.as_str())
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.invariants
            .iter()
            .find(|i| i.name == name)
            .map(|i| i.description.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Invariant> {
        self.invariants.iter()
    }

    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

/// Types that document their invariants
pub trait Invariants {
    fn invariants() -> InvariantDeclaration;
}
