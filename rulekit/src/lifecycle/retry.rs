//! Re-run a failing test a fixed number of times

use super::{Description, Statement, TestRule, run_guarded};
use crate::error::RuleError;
use tracing::{error, warn};

/// Retries the wrapped statement until it passes or attempts run out
///
/// Intermediate failures are logged and dropped; only the last failure is
/// returned. Put the rule outermost in a [`super::RuleChain`] to retry setup
/// and teardown along with the body.
#[derive(Debug, Clone)]
pub struct RetryRule {
    retry_count: u32,
}

impl RetryRule {
    pub fn new(retry_count: u32) -> Self {
        if retry_count == 0 {
            warn!("retry count of 0 requested, running once");
        }
        Self {
            retry_count: retry_count.max(1),
        }
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }
}

impl TestRule for RetryRule {
    fn apply<'a>(
        &'a self,
        base: Box<dyn Statement + 'a>,
        description: &'a Description,
    ) -> Box<dyn Statement + 'a> {
        Box::new(move || {
            let mut caught = None;

            for attempt in 1..=self.retry_count {
                match run_guarded(&*base) {
                    Ok(()) => return Ok(()),
                    Err(e) => {
                        error!("{}: run {} failed: {}", description.display_name(), attempt, e);
                        caught = Some(e);
                    }
                }
            }

            error!(
                "{}: giving up after {} failures",
                description.display_name(),
                self.retry_count
            );
            Err(caught.unwrap_or_else(|| RuleError::Failed("no attempt was made".to_string())))
        })
    }
}
