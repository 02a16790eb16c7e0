use super::{Comparable, EqualityProfile, EqualsContractChecker};
use crate::lifecycle::{Description, Statement, TestRule};
use tracing::debug;

/// Checks the equality contract of `T` before running the test body
///
/// Meant to wrap a whole test class: a violation fails the run and the body
/// never executes.
pub struct FulfillEqualsContractRule<T> {
    checker: EqualsContractChecker<T>,
}

impl<T: Default + 'static> FulfillEqualsContractRule<T> {
    pub fn new(profile: EqualityProfile<T>) -> Self {
        Self::from_checker(EqualsContractChecker::new(profile))
    }
}

impl<T: Comparable + Default> FulfillEqualsContractRule<T> {
    pub fn for_type() -> Self {
        Self::from_checker(EqualsContractChecker::for_type())
    }
}

impl<T> FulfillEqualsContractRule<T> {
    pub fn from_checker(checker: EqualsContractChecker<T>) -> Self {
        Self { checker }
    }

    pub fn checker(&self) -> &EqualsContractChecker<T> {
        &self.checker
    }
}

impl<T> TestRule for FulfillEqualsContractRule<T> {
    fn apply<'a>(
        &'a self,
        base: Box<dyn Statement + 'a>,
        description: &'a Description,
    ) -> Box<dyn Statement + 'a> {
        Box::new(move || {
            debug!(
                "{}: checking equality contract of {}",
                description.display_name(),
                self.checker.type_name()
            );
            self.checker.check()?;
            base.evaluate()
        })
    }
}
