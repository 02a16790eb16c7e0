use super::{AccessorPair, Accessible, Outcome};
use crate::error::{Result, RuleError};
use accessor_naming::{case, convention};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Sets a sample value through every setter and reads it back
pub struct PropertyChecker<T> {
    pairs: Vec<AccessorPair<T>>,
    excluded: BTreeSet<String>,
    verbose: bool,
}

impl<T> PropertyChecker<T> {
    pub fn new(pairs: Vec<AccessorPair<T>>) -> Self {
        Self {
            pairs,
            excluded: BTreeSet::new(),
            verbose: false,
        }
    }

    pub fn for_type() -> Self
    where
        T: Accessible,
    {
        Self::new(T::accessors())
    }

    /// Skip a field. Accessor names and camel case are accepted for names
    /// that are not themselves a declared field.
    pub fn exclude(mut self, name: &str) -> Self {
        self.add_exclusion(name);
        self
    }

    /// Names that are neither a field nor an accessor are dropped with a
    /// warning.
    pub fn add_exclusion(&mut self, name: &str) {
        let name = name.trim();
        if !case::is_field_name(&convention::field_name(name)) {
            warn!("ignoring exclusion {:?}: not a field or accessor name", name);
            return;
        }
        self.excluded.insert(name.to_string());
    }

    pub fn exclusions(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }

    pub fn exclude_all<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .fold(self, |checker, name| checker.exclude(name.as_ref()))
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.set_verbose(verbose);
        self
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_excluded(&self, field: &str) -> bool {
        self.excluded.iter().any(|name| self.resolve(name) == field)
    }

    /// Field an exclusion refers to. A name that is a declared field, as
    /// written or in snake case, refers to that field only; anything else is
    /// read as an accessor name.
    fn resolve(&self, name: &str) -> String {
        let snake = case::to_snake_case(name);
        if self.declares(&snake) {
            snake
        } else {
            convention::field_name(name)
        }
    }

    fn declares(&self, field: &str) -> bool {
        self.pairs.iter().any(|pair| pair.field() == field)
    }

    pub fn pairs(&self) -> &[AccessorPair<T>] {
        &self.pairs
    }

    /// Exercise every pair on `target`, stopping at the first mismatch
    pub fn check(&self, target: &mut T) -> Result<AccessorReport> {
        let mut report = AccessorReport::default();

        for pair in &self.pairs {
            if self.is_excluded(pair.field()) {
                debug!("{} is excluded", pair.field());
                report.excluded.push(pair.field().to_string());
                continue;
            }

            if self.verbose {
                info!(
                    "testing {}/{} for {}",
                    pair.getter_name(),
                    pair.setter_name(),
                    pair.field()
                );
            } else {
                debug!("testing accessors for {}", pair.field());
            }

            match pair.exercise(target) {
                Outcome::Matched => report.exercised.push(pair.field().to_string()),
                Outcome::NoSample => {
                    let skipped = RuleError::UnsupportedAccessorType {
                        field: pair.field().to_string(),
                        kind: pair.kind(),
                    };
                    warn!("{}", skipped);
                    report.skipped.push(pair.field().to_string());
                }
                Outcome::Mismatch { expected, actual } => {
                    return Err(RuleError::AccessorMismatch {
                        field: pair.field().to_string(),
                        expected,
                        actual,
                    });
                }
            }
        }

        if self.verbose {
            info!("{}", report.summary());
        }
        Ok(report)
    }
}

impl<T> std::fmt::Debug for PropertyChecker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyChecker")
            .field("pairs", &self.pairs)
            .field("excluded", &self.excluded)
            .field("verbose", &self.verbose)
            .finish()
    }
}

/// Fields handled by one accessor check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessorReport {
    pub exercised: Vec<String>,
    pub excluded: Vec<String>,
    pub skipped: Vec<String>,
}

impl AccessorReport {
    pub fn summary(&self) -> String {
        format!(
            "Accessors: {} exercised, {} excluded, {} skipped",
            self.exercised.len(),
            self.excluded.len(),
            self.skipped.len()
        )
    }
}
