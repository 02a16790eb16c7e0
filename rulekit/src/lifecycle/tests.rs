// Lifecycle wrapper tests

use super::*;
use crate::error::fail;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};

/// Records the order of setup, body and teardown
struct Recording {
    log: Arc<Mutex<Vec<&'static str>>>,
    fail_before: bool,
}

impl Recording {
    fn new() -> (Self, Arc<Mutex<Vec<&'static str>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                log: log.clone(),
                fail_before: false,
            },
            log,
        )
    }
}

impl InitializationRule for Recording {
    fn before(&self) -> Result<()> {
        self.log.lock().unwrap().push("before");
        if self.fail_before {
            return fail("setup broke");
        }
        Ok(())
    }

    fn after(&self) -> Result<()> {
        self.log.lock().unwrap().push("after");
        Ok(())
    }
}

#[test]
fn test_initialization_order() {
    let (rule, log) = Recording::new();
    let body_log = log.clone();

    rule.run(&Description::named("ordered"), move || {
        body_log.lock().unwrap().push("body");
        Ok(())
    })
    .unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["before", "body", "after"]);
}

#[test]
fn test_after_runs_when_body_fails() {
    let (rule, log) = Recording::new();

    let result = rule.run(&Description::named("failing"), || fail("body broke"));

    assert_eq!(result.unwrap_err().to_string(), "body broke");
    assert_eq!(*log.lock().unwrap(), vec!["before", "after"]);
}

#[test]
fn test_after_runs_when_body_panics() {
    let (rule, log) = Recording::new();

    let result = rule.run(&Description::named("panicking"), || -> Result<()> {
        panic!("assertion exploded");
    });

    match result {
        Err(RuleError::Panicked(message)) => assert_eq!(message, "assertion exploded"),
        other => panic!("expected a panic failure, got {other:?}"),
    }
    assert_eq!(*log.lock().unwrap(), vec!["before", "after"]);
}

#[test]
fn test_after_runs_when_before_fails() {
    let (mut rule, log) = Recording::new();
    rule.fail_before = true;
    let ran = Arc::new(AtomicUsize::new(0));
    let body_ran = ran.clone();

    let result = rule.run(&Description::named("setup"), move || {
        body_ran.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    assert_eq!(result.unwrap_err().to_string(), "setup broke");
    assert_eq!(ran.load(Ordering::SeqCst), 0);
    assert_eq!(*log.lock().unwrap(), vec!["before", "after"]);
}

#[test]
fn test_retry_until_success() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let rule = RetryRule::new(3);

    rule.run(&Description::named("flaky"), move || {
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            return fail("not yet");
        }
        Ok(())
    })
    .unwrap();

    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[test]
fn test_retry_surfaces_last_failure() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let rule = RetryRule::new(2);

    let result = rule.run(&Description::named("broken"), move || {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        fail(format!("attempt {n}"))
    });

    assert_eq!(result.unwrap_err().to_string(), "attempt 2");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_retry_zero_runs_once() {
    let rule = RetryRule::new(0);
    assert_eq!(rule.retry_count(), 1);

    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let _ = rule.run(&Description::named("zero"), move || {
        counter.fetch_add(1, Ordering::SeqCst);
        fail("always")
    });
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[test]
fn test_retry_wraps_whole_cycle() {
    let (setup, log) = Recording::new();
    let chain = RuleChain::outer_rule(RetryRule::new(2)).around(setup);
    let tries = Arc::new(AtomicUsize::new(0));
    let counter = tries.clone();

    chain
        .run(&Description::named("cycle"), move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                return fail("first try fails");
            }
            Ok(())
        })
        .unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["before", "after", "before", "after"]
    );
}

#[test]
fn test_chain_order() {
    let (outer, log) = Recording::new();
    let inner = Recording {
        log: log.clone(),
        fail_before: false,
    };
    let chain = RuleChain::outer_rule(outer).around(inner);
    assert_eq!(chain.len(), 2);

    chain.run(&Description::named("chain"), || Ok(())).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["before", "before", "after", "after"]
    );
}

#[test]
fn test_concurrent_without_degree_runs_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let description = Description::for_method("Plain", TestMethod::test("single"));

    ConcurrentRule::new()
        .run(&description, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_runs_every_worker_in_parallel() {
    // Each worker blocks on the barrier, so this only finishes when all
    // five invocations are alive at the same time.
    let rendezvous = Arc::new(Barrier::new(5));
    let threads = Arc::new(Mutex::new(HashSet::new()));
    let seen = threads.clone();
    let description =
        Description::for_method("Parallel", TestMethod::test("fan_out").concurrent(5));

    ConcurrentRule::new()
        .run(&description, move || {
            rendezvous.wait();
            let name = std::thread::current().name().map(str::to_string);
            seen.lock().unwrap().insert(name);
            Ok(())
        })
        .unwrap();

    let names = threads.lock().unwrap();
    assert_eq!(names.len(), 5);
    assert!(names.contains(&Some("fan_out-worker-0".to_string())));
    assert!(names.contains(&Some("fan_out-worker-4".to_string())));
}

#[test]
fn test_unsynchronized_counter_may_lose_updates() {
    // A load-then-store increment is not atomic as a whole; with five
    // workers the final value is anywhere from 1 to 5. The rule only
    // guarantees every invocation ran.
    let racy = Arc::new(AtomicUsize::new(0));
    let invocations = Arc::new(AtomicUsize::new(0));
    let (shared, calls) = (racy.clone(), invocations.clone());
    let description = Description::for_method("Race", TestMethod::test("racy").concurrent(5));

    ConcurrentRule::new()
        .run(&description, move || {
            let current = shared.load(Ordering::Relaxed);
            std::thread::yield_now();
            shared.store(current + 1, Ordering::Relaxed);
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

    assert_eq!(invocations.load(Ordering::SeqCst), 5);
    let value = racy.load(Ordering::SeqCst);
    assert!((1..=5).contains(&value));
}

#[test]
fn test_concurrent_reraises_worker_failures() {
    let description = Description::for_method("Failing", TestMethod::test("boom").concurrent(3));
    let finished = Arc::new(AtomicUsize::new(0));
    let counter = finished.clone();

    let result = ConcurrentRule::new().run(&description, move || {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        if n == 0 {
            panic!("worker exploded");
        }
        Ok(())
    });

    assert_eq!(finished.load(Ordering::SeqCst), 3);
    assert!(matches!(result, Err(RuleError::Panicked(ref m)) if m == "worker exploded"));
}

#[test]
fn test_concurrent_collects_every_failure() {
    let description = Description::for_method("AllFail", TestMethod::test("all").concurrent(4));

    let err = ConcurrentRule::new()
        .run(&description, || fail("nope"))
        .unwrap_err();

    assert_eq!(err.failures().len(), 4);
}

#[test]
fn test_oversized_degree_is_rejected_before_spawning() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let huge = Description::for_method("Huge", TestMethod::test("huge").concurrent(usize::MAX));

    let err = ConcurrentRule::new()
        .run(&huge, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(err, RuleError::Configuration(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let from_default = ConcurrentRule::with_degree(concurrent::MAX_DEGREE + 1)
        .run(&Description::for_method("Huge", TestMethod::test("plain")), || Ok(()));
    assert!(matches!(from_default, Err(RuleError::Configuration(_))));
}

#[test]
fn test_rule_degree_is_a_fallback() {
    let rule = ConcurrentRule::with_degree(3);
    let tagged = Description::for_method("C", TestMethod::test("tagged").concurrent(2));
    let untagged = Description::for_method("C", TestMethod::test("untagged"));

    assert_eq!(rule.degree_for(&tagged), Some(2));
    assert_eq!(rule.degree_for(&untagged), Some(3));
    assert_eq!(ConcurrentRule::new().degree_for(&untagged), None);
}

#[test]
fn test_description_names() {
    let method = Description::for_method("SampleTest", TestMethod::test("works"));
    assert_eq!(method.display_name(), "works(SampleTest)");
    assert_eq!(method.short_name(), "works");

    let class = Description::for_class(TestClass::new("SampleTest").method(TestMethod::test("a")));
    assert_eq!(class.display_name(), "SampleTest");
    assert_eq!(class.short_name(), "SampleTest");
    assert_eq!(class.test_class().map(|c| c.methods.len()), Some(1));
}
