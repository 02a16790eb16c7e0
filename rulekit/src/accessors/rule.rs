use super::{AccessorReport, Accessible, PropertyChecker};
use crate::error::RuleError;
use crate::lifecycle::{Description, Statement, TestRule};
use std::sync::Mutex;

/// Runs the accessor check on an instance before the test body
pub struct GetterSetterRule<T> {
    instance: Mutex<T>,
    checker: PropertyChecker<T>,
    last_report: Mutex<Option<AccessorReport>>,
}

impl<T: Accessible> GetterSetterRule<T> {
    pub fn new(instance: T) -> Self {
        Self::with_checker(instance, PropertyChecker::for_type())
    }

    pub fn ignoring<I, S>(instance: T, ignores: I, verbose: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let checker = PropertyChecker::for_type()
            .exclude_all(ignores)
            .verbose(verbose);
        Self::with_checker(instance, checker)
    }
}

impl<T> GetterSetterRule<T> {
    pub fn with_checker(instance: T, checker: PropertyChecker<T>) -> Self {
        Self {
            instance: Mutex::new(instance),
            checker,
            last_report: Mutex::new(None),
        }
    }

    pub fn checker(&self) -> &PropertyChecker<T> {
        &self.checker
    }

    pub fn checker_mut(&mut self) -> &mut PropertyChecker<T> {
        &mut self.checker
    }

    /// Report from the most recent successful check
    pub fn last_report(&self) -> Option<AccessorReport> {
        self.last_report.lock().ok().and_then(|report| report.clone())
    }
}

impl<T: Send> TestRule for GetterSetterRule<T> {
    fn apply<'a>(
        &'a self,
        base: Box<dyn Statement + 'a>,
        _description: &'a Description,
    ) -> Box<dyn Statement + 'a> {
        Box::new(move || {
            let report = {
                let mut instance = self
                    .instance
                    .lock()
                    .map_err(|_| RuleError::Failed("accessor instance lock poisoned".to_string()))?;
                self.checker.check(&mut instance)?
            };

            if let Ok(mut last) = self.last_report.lock() {
                *last = Some(report);
            }

            base.evaluate()
        })
    }
}
