use super::{CoverageTracker, InvariantDeclaration, Invariants};
use crate::error::RuleError;
use crate::lifecycle::{Description, Statement, TestRule, run_guarded};
use tracing::{debug, warn};

/// Fails a class run when a declared invariant has no live test
///
/// Apply it to a class-level [`Description`]; the methods of its test class
/// are the ones counted. Each evaluation gets its own tracker, so repeated
/// runs never see each other's counts.
#[derive(Debug, Clone)]
pub struct InvariantRule {
    subject: String,
    declaration: InvariantDeclaration,
}

impl InvariantRule {
    pub fn new(subject: impl Into<String>, declaration: InvariantDeclaration) -> Self {
        Self {
            subject: subject.into(),
            declaration,
        }
    }

    pub fn for_type<T: Invariants>() -> Self {
        Self::new(std::any::type_name::<T>(), T::invariants())
    }

    pub fn declaration(&self) -> &InvariantDeclaration {
        &self.declaration
    }
}

impl TestRule for InvariantRule {
    fn apply<'a>(
        &'a self,
        base: Box<dyn Statement + 'a>,
        description: &'a Description,
    ) -> Box<dyn Statement + 'a> {
        Box::new(move || {
            let mut tracker = CoverageTracker::new();
            tracker.init(&self.declaration);

            match description.test_class() {
                Some(class) => tracker.accumulate(&class.methods),
                None => warn!(
                    "{}: no test class to scan for invariants of {}",
                    description.display_name(),
                    self.subject
                ),
            }

            let body = run_guarded(&*base);
            let coverage = tracker.verify();

            match (body, coverage) {
                (Ok(()), Ok(report)) => {
                    debug!("{}: {}", self.subject, report.summary());
                    Ok(())
                }
                (Err(e), Ok(_)) | (Ok(()), Err(e)) => Err(e),
                (Err(body), Err(coverage)) => {
                    Err(RuleError::MultipleFailures(vec![body, coverage]))
                }
            }
        })
    }
}
