//! Test lifecycle: statements, rules and the metadata they read
//!
//! A [`Statement`] is one runnable step of a test. A [`TestRule`] wraps a
//! statement in another one, adding work before and after the wrapped body.
//! Rules never see test discovery; the caller describes the test with a
//! [`Description`] and hands over the body.

pub mod concurrent;
pub mod retry;

pub use concurrent::ConcurrentRule;
pub use retry::RetryRule;

use crate::error::{Result, RuleError};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// A runnable piece of a test
pub trait Statement: Send + Sync {
    fn evaluate(&self) -> Result<()>;
}

impl<F> Statement for F
where
    F: Fn() -> Result<()> + Send + Sync,
{
    fn evaluate(&self) -> Result<()> {
        self()
    }
}

/// Wraps a statement with extra behavior
pub trait TestRule: Send + Sync {
    fn apply<'a>(
        &'a self,
        base: Box<dyn Statement + 'a>,
        description: &'a Description,
    ) -> Box<dyn Statement + 'a>;

    /// Apply the rule to `body` and evaluate the result
    fn run<'a, F>(&'a self, description: &'a Description, body: F) -> Result<()>
    where
        F: Fn() -> Result<()> + Send + Sync + 'a,
        Self: Sized,
    {
        self.apply(Box::new(body), description).evaluate()
    }
}

/// Evaluate a statement, turning a panic into [`RuleError::Panicked`]
pub fn run_guarded(statement: &dyn Statement) -> Result<()> {
    panic::catch_unwind(AssertUnwindSafe(|| statement.evaluate()))
        .unwrap_or_else(|payload| Err(RuleError::from_panic(payload)))
}

fn guarded<F: FnOnce() -> Result<()>>(step: F) -> Result<()> {
    panic::catch_unwind(AssertUnwindSafe(step))
        .unwrap_or_else(|payload| Err(RuleError::from_panic(payload)))
}

/// Metadata attached to a single test method
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMethod {
    pub name: String,

    /// Invariant this test is responsible for
    pub invariant: Option<String>,

    /// Number of parallel invocations requested
    pub concurrency: Option<usize>,

    /// Marked as skipped
    pub ignored: bool,

    /// Whether the method is a test at all, rather than a helper
    pub test: bool,
}

impl TestMethod {
    pub fn test(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            test: true,
            ..Default::default()
        }
    }

    /// A non-test method that happens to live on the test class
    pub fn helper(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_invariant(mut self, invariant: impl Into<String>) -> Self {
        self.invariant = Some(invariant.into());
        self
    }

    pub fn concurrent(mut self, degree: usize) -> Self {
        self.concurrency = Some(degree);
        self
    }

    pub fn ignore(mut self) -> Self {
        self.ignored = true;
        self
    }
}

/// A group of test methods run together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestClass {
    pub name: String,
    pub methods: Vec<TestMethod>,
}

impl TestClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn method(mut self, method: TestMethod) -> Self {
        self.methods.push(method);
        self
    }
}

/// What a rule is being applied to
#[derive(Debug, Clone, Default)]
pub struct Description {
    display_name: String,
    class: Option<TestClass>,
    method: Option<TestMethod>,
}

impl Description {
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    /// Describes a whole class run, as seen by class-level rules
    pub fn for_class(class: TestClass) -> Self {
        Self {
            display_name: class.name.clone(),
            class: Some(class),
            method: None,
        }
    }

    /// Describes one method, displayed as `method(Class)`
    pub fn for_method(class_name: &str, method: TestMethod) -> Self {
        Self {
            display_name: format!("{}({})", method.name, class_name),
            class: None,
            method: Some(method),
        }
    }

    pub fn with_class(mut self, class: TestClass) -> Self {
        self.class = Some(class);
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn test_class(&self) -> Option<&TestClass> {
        self.class.as_ref()
    }

    pub fn method(&self) -> Option<&TestMethod> {
        self.method.as_ref()
    }

    /// Name used for worker threads and log lines
    pub fn short_name(&self) -> &str {
        self.method
            .as_ref()
            .map(|m| m.name.as_str())
            .unwrap_or(&self.display_name)
    }
}

/// Setup and teardown around a test body
///
/// `after` runs whenever `before` was attempted, including when `before`,
/// the body, or both failed or panicked. All failures of one run are
/// reported together.
pub trait InitializationRule: Send + Sync {
    fn before(&self) -> Result<()>;

    fn after(&self) -> Result<()>;
}

impl<R: InitializationRule> TestRule for R {
    fn apply<'a>(
        &'a self,
        base: Box<dyn Statement + 'a>,
        description: &'a Description,
    ) -> Box<dyn Statement + 'a> {
        Box::new(move || {
            let mut failures = Vec::new();

            debug!("{}: before", description.display_name());
            match guarded(|| self.before()) {
                Ok(()) => {
                    if let Err(e) = run_guarded(&*base) {
                        failures.push(e);
                    }
                }
                Err(e) => failures.push(e),
            }

            debug!("{}: after", description.display_name());
            if let Err(e) = guarded(|| self.after()) {
                failures.push(e);
            }

            RuleError::collect(failures).map_or(Ok(()), Err)
        })
    }
}

/// Rules applied in order, the first one outermost
#[derive(Default)]
pub struct RuleChain {
    rules: Vec<Box<dyn TestRule>>,
}

impl RuleChain {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn outer_rule(rule: impl TestRule + 'static) -> Self {
        Self::empty().around(rule)
    }

    pub fn around(mut self, rule: impl TestRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl TestRule for RuleChain {
    fn apply<'a>(
        &'a self,
        base: Box<dyn Statement + 'a>,
        description: &'a Description,
    ) -> Box<dyn Statement + 'a> {
        self.rules
            .iter()
            .rev()
            .fold(base, |statement, rule| rule.apply(statement, description))
    }
}

#[cfg(test)]
mod tests;
