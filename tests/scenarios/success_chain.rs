//! Test: Success Chain - steps run left to right

use crate::helpers::*;
use typepipe::{Outcome, Pipeline, StepKind};

/// Synchronous steps run in order and the result stays ready
#[test]
fn test_synchronous_chain_is_ready() {
    let log = CallLog::new();
    let pipeline = Pipeline::<i32, (), ()>::new()
        .pipe(log.step::<i32, (), ()>("first"))
        .pipe(|value, _, _| Outcome::ok(value * 2))
        .pipe(log.step::<i32, (), ()>("second"))
        .pipe(|value, _, _| Outcome::ok(format!("value={}", value)));

    let result = assert_ready(pipeline.run(21, &(), &()));

    assert_eq!(result, "value=42");
    assert_eq!(log.entries(), vec!["first", "second"]);
}

/// A deferred step makes the whole run deferred; later steps wait for it
#[tokio::test]
async fn test_deferred_step_orders_later_steps() {
    let log = CallLog::new();
    let pipeline = Pipeline::<i32, (), ()>::new()
        .pipe(log.step::<i32, (), ()>("sync"))
        .pipe(log.deferred_step::<i32, (), ()>("slow", 20))
        .pipe(log.deferred_step::<i32, (), ()>("fast", 1))
        .pipe(log.step::<i32, (), ()>("after"));

    let outcome = pipeline.run(7, &(), &());

    assert!(outcome.is_deferred());
    assert_eq!(log.entries(), vec!["sync"]);
    assert_eq!(outcome.await.unwrap(), 7);
    assert_eq!(log.entries(), vec!["sync", "slow", "fast", "after"]);
}

/// Taps observe the value without replacing it, and a deferred tap is awaited
#[tokio::test]
async fn test_tap_passes_value_through() {
    let log = CallLog::new();
    let seen = log.clone();
    let waited = log.clone();

    let pipeline = Pipeline::<String, (), ()>::new()
        .tap(move |value, _, _| {
            seen.push(format!("saw {}", value));
            Outcome::ok(value.len())
        })
        .tap(move |_, _, _| {
            let waited = waited.clone();
            Outcome::deferred(async move {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                waited.push("waited");
                Ok(())
            })
        })
        .pipe(log.step::<String, (), ()>("next"));

    let result = pipeline.run("hello".to_string(), &(), &()).await.unwrap();

    assert_eq!(result, "hello");
    assert_eq!(log.entries(), vec!["saw hello", "waited", "next"]);
}

/// Conditional and pairwise steps chain with plain steps
#[test]
fn test_convenience_steps_chain() {
    let pipeline = Pipeline::<i32, (), i32>::new()
        .when(|value, _, _| Outcome::ok(*value < 0), |value, _, _| Outcome::ok(-value))
        .ifelse(
            |value, _, limit| Outcome::ok(value > limit),
            |value, _, _| Outcome::ok(format!("big {}", value)),
            |value, _, _| Outcome::ok(format!("small {}", value)),
        )
        .pairwise(|text, _, _| Outcome::ok(text.len()));

    assert_eq!(
        assert_ready(pipeline.run(-50, &(), &10)),
        ("big 50".to_string(), 6)
    );
    assert_eq!(
        assert_ready(pipeline.run(3, &(), &10)),
        ("small 3".to_string(), 7)
    );
    assert_eq!(
        pipeline.steps(),
        &[StepKind::IfElse, StepKind::IfElse, StepKind::Pairwise]
    );
}

/// A composed pipeline can be called many times with independent results
#[tokio::test]
async fn test_composed_pipeline_is_reusable() {
    let counter = CallCounter::new();
    let hits = counter.clone();

    let composed = Pipeline::<u64, (), ()>::new()
        .named("doubler")
        .tap(move |_, _, _| {
            hits.hit();
            Outcome::ok(())
        })
        .pipe(|value, _, _| later(value * 2, 1))
        .compose()
        .unwrap();

    assert_eq!(composed.name(), "doubler");
    for value in 0..5 {
        assert_eq!(composed.call(value, &(), &()).await.unwrap(), value * 2);
    }
    assert_eq!(counter.count(), 5);
}

/// The global is shared by every step of a run
#[test]
fn test_global_is_visible_to_every_step() {
    let pipeline = Pipeline::<i32, (), i32>::new()
        .pipe(|value, _, offset| Outcome::ok(value + offset))
        .pipe(|value, _, offset| Outcome::ok(value * offset));

    assert_eq!(assert_ready(pipeline.run(1, &(), &3)), 12);
    assert_eq!(assert_ready(pipeline.run(1, &(), &4)), 20);
}
