//! Test: Failure Handling - catch markers and failure propagation

use crate::helpers::*;
use anyhow::anyhow;
use std::time::Duration;
use typepipe::{Outcome, Pipeline, Settled};

/// A failing step stops the run and the error propagates when nothing catches it
#[test]
fn test_uncaught_failure_skips_later_steps() {
    let log = CallLog::new();
    let pipeline = Pipeline::<i32, (), ()>::new()
        .pipe(log.step::<i32, (), ()>("first"))
        .pipe(log.failing_step::<i32, i32, (), ()>("broken", "step exploded"))
        .pipe(log.step::<i32, (), ()>("never"));

    let error = assert_ready_failure(pipeline.run(1, &(), &()));

    assert_error_contains(&error, "step exploded");
    assert_eq!(log.entries(), vec!["first", "broken"]);
}

/// A handler recovers failures of steps registered after it
#[test]
fn test_catch_recovers() {
    let pipeline = Pipeline::<i32, (), ()>::new()
        .catch(|error, _, _| Outcome::ok(format!("recovered: {}", error)))
        .pipe(|_, _, _| Outcome::<String>::fail(anyhow!("bad input")));

    let result = assert_ready(pipeline.run(1, &(), &()));

    assert_eq!(result, Settled::Recovered("recovered: bad input".to_string()));
}

/// Steps registered before a handler are not covered by it
#[test]
fn test_handler_only_covers_later_steps() {
    let log = CallLog::new();
    let pipeline = Pipeline::<i32, (), ()>::new()
        .pipe(log.failing_step::<i32, i32, (), ()>("early", "too early"))
        .catch(|_, _, _| Outcome::ok(0));

    let error = assert_ready_failure(pipeline.run(1, &(), &()));

    assert_error_contains(&error, "too early");
}

/// A later catch replaces the earlier one for the steps after it
#[test]
fn test_later_handler_overrides() {
    let pipeline = |fail_at: i32| {
        Pipeline::<i32, (), ()>::new()
            .catch(|_, _, _| Outcome::ok("first"))
            .pipe(move |value, _, _| {
                if value == fail_at && fail_at == 1 {
                    Outcome::fail(anyhow!("step one"))
                } else {
                    Outcome::ok(value)
                }
            })
            .catch(|_, _, _| Outcome::ok("second"))
            .pipe(move |value, _, _| {
                if fail_at == 2 {
                    Outcome::fail(anyhow!("step two"))
                } else {
                    Outcome::ok(value)
                }
            })
    };

    assert_eq!(assert_ready(pipeline(1).run(1, &(), &())), Settled::Recovered("first"));
    assert_eq!(assert_ready(pipeline(2).run(1, &(), &())), Settled::Recovered("second"));
    assert_eq!(assert_ready(pipeline(3).run(1, &(), &())), Settled::Completed(1));
}

/// Deferred failures reach the handler and a deferred recovery is awaited
#[tokio::test]
async fn test_deferred_failure_and_recovery() {
    let pipeline = Pipeline::<i32, (), ()>::new()
        .catch(|error, _, _| {
            let message = error.to_string();
            Outcome::deferred(async move {
                tokio::time::sleep(Duration::from_millis(2)).await;
                Ok(message.len())
            })
        })
        .pipe(|_, _, _| {
            Outcome::<i32>::deferred(async {
                tokio::time::sleep(Duration::from_millis(2)).await;
                Err(anyhow!("timeout"))
            })
        });

    let outcome = pipeline.run(1, &(), &());

    assert!(outcome.is_deferred());
    assert_eq!(outcome.await.unwrap(), Settled::Recovered(7));
}

/// A failing handler propagates its own error
#[tokio::test]
async fn test_failing_handler_propagates() {
    let pipeline = Pipeline::<i32, (), ()>::new()
        .catch(|error, _, _| Outcome::<i32>::fail(anyhow!("handler gave up on: {}", error)))
        .pipe(|value, _, _| later(value, 1))
        .pipe(|_, _, _| Outcome::<i32>::fail(anyhow!("disk full")));

    let error = pipeline.run(1, &(), &()).await.unwrap_err();

    assert_error_contains(&error, "handler gave up on: disk full");
}

/// Concurrent runs each use the handler active where they failed
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_runs_keep_their_own_handler() {
    let composed = Pipeline::<u64, (), ()>::new()
        .catch(|_, _, _| Outcome::ok("early"))
        .pipe(|value, _, _| {
            Outcome::deferred(async move {
                tokio::time::sleep(Duration::from_millis(value % 7)).await;
                if value % 2 == 0 {
                    Err(anyhow!("even"))
                } else {
                    Ok(value)
                }
            })
        })
        .catch(|_, _, _| Outcome::ok("late"))
        .pipe(|value, _, _| {
            Outcome::<u64>::deferred(async move {
                tokio::time::sleep(Duration::from_millis(value % 5)).await;
                Err(anyhow!("odd"))
            })
        })
        .compose()
        .unwrap();

    let tasks: Vec<_> = (0..40u64)
        .map(|value| {
            let run = composed.call(value, &(), &());
            tokio::spawn(async move { (value, run.await) })
        })
        .collect();

    for task in tasks {
        let (value, result) = task.await.unwrap();
        let expected = if value % 2 == 0 { "early" } else { "late" };
        assert_eq!(result.unwrap(), Settled::Recovered(expected), "run {}", value);
    }
}

/// A handler registered in one run never affects the next run
#[test]
fn test_handler_state_does_not_leak_between_runs() {
    let composed = Pipeline::<bool, (), ()>::new()
        .pipe(|fail, _, _| {
            if fail {
                Outcome::fail(anyhow!("before any handler"))
            } else {
                Outcome::ok(fail)
            }
        })
        .catch(|_, _, _| Outcome::ok(()))
        .pipe(|_, _, _| Outcome::<bool>::fail(anyhow!("after handler")))
        .compose()
        .unwrap();

    assert_eq!(assert_ready(composed.call(false, &(), &())), Settled::Recovered(()));
    let error = assert_ready_failure(composed.call(true, &(), &()));
    assert_error_contains(&error, "before any handler");
    assert_eq!(assert_ready(composed.call(false, &(), &())), Settled::Recovered(()));
}

/// Assert turns a missing value into the thrown error, which the handler sees
#[test]
fn test_assert_failure_is_caught() {
    let pipeline = Pipeline::<Option<i32>, String, ()>::new()
        .catch(|error, _, _| Outcome::ok(error.to_string()))
        .assert(|context: &String, _: &()| anyhow!("missing value for {}", context))
        .pipe(|value, _, _| Outcome::ok(value + 1));

    assert_eq!(
        assert_ready(pipeline.run(None, &"ticket".to_string(), &())),
        Settled::Recovered("missing value for ticket".to_string())
    );
    assert_eq!(
        assert_ready(pipeline.run(Some(1), &"ticket".to_string(), &())),
        Settled::Completed(2)
    );
}
