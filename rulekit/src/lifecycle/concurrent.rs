//! Fan a test body out across parallel worker threads

use super::{Description, Statement, TestRule, run_guarded};
use crate::error::{Result, RuleError};
use std::sync::{Condvar, Mutex, PoisonError};
use std::thread;
use tracing::{debug, warn};

/// Largest number of workers one evaluation may start
pub const MAX_DEGREE: usize = 1024;

/// Runs the body on several threads at once
///
/// The degree comes from the method's `concurrency` metadata, falling back
/// to the rule's own degree. Without either the body runs once on the
/// calling thread. Workers are held at a start gate until every one of them
/// has been spawned, and the rule returns only after all have finished.
/// Nothing else is synchronized: races inside the body are the body's own.
/// A degree above [`MAX_DEGREE`] fails with a configuration error before
/// any worker starts.
#[derive(Debug, Clone, Default)]
pub struct ConcurrentRule {
    degree: Option<usize>,
}

impl ConcurrentRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Degree used for methods that carry none of their own
    pub fn with_degree(degree: usize) -> Self {
        Self {
            degree: Some(degree),
        }
    }

    pub fn degree_for(&self, description: &Description) -> Option<usize> {
        description
            .method()
            .and_then(|m| m.concurrency)
            .or(self.degree)
    }
}

impl TestRule for ConcurrentRule {
    fn apply<'a>(
        &'a self,
        base: Box<dyn Statement + 'a>,
        description: &'a Description,
    ) -> Box<dyn Statement + 'a> {
        let degree = self.degree_for(description);

        Box::new(move || match degree {
            None => base.evaluate(),
            Some(0) => {
                warn!("{}: concurrency of 0 requested, running once", description.display_name());
                base.evaluate()
            }
            Some(k) => fan_out(&*base, description.short_name(), k),
        })
    }
}

fn fan_out(body: &dyn Statement, name: &str, degree: usize) -> Result<()> {
    if degree > MAX_DEGREE {
        return Err(RuleError::Configuration(format!(
            "{name}: concurrency degree {degree} exceeds the limit of {MAX_DEGREE}"
        )));
    }

    debug!("{}: starting {} workers", name, degree);

    let gate = StartGate::default();
    let mut failures = Vec::new();

    thread::scope(|scope| {
        let mut workers = Vec::with_capacity(degree);

        for i in 0..degree {
            let worker = format!("{name}-worker-{i}");
            let gate = &gate;
            let spawned = thread::Builder::new()
                .name(worker.clone())
                .spawn_scoped(scope, move || {
                    gate.wait();
                    run_guarded(body)
                });

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(source) => {
                    failures.push(RuleError::Spawn { name: worker, source });
                    break;
                }
            }
        }

        // Also after a spawn failure: spawned workers must still be joined
        gate.open();

        for handle in workers {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => failures.push(e),
                Err(payload) => failures.push(RuleError::from_panic(payload)),
            }
        }
    });

    debug!("{}: all workers finished, {} failed", name, failures.len());
    RuleError::collect(failures).map_or(Ok(()), Err)
}

/// One-shot gate: waiters block until it is opened
#[derive(Default)]
struct StartGate {
    open: Mutex<bool>,
    released: Condvar,
}

impl StartGate {
    fn wait(&self) {
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        while !*open {
            open = self
                .released
                .wait(open)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn open(&self) {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.released.notify_all();
    }
}
