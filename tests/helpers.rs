//! Test utility functions for typepipe
#![allow(dead_code)]

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use typepipe::chat::{BotConfig, ChatBot, Envelope, MemorySink};
use typepipe::{Error, Outcome};

/// Deferred outcome resolving to `value` after `millis`
pub fn later<T: Send + 'static>(value: T, millis: u64) -> Outcome<T> {
    Outcome::deferred(async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(value)
    })
}

/// Records the order in which steps ran
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Synchronous step that logs `name` and passes the value on
    pub fn step<V, C, G>(&self, name: &str) -> impl Fn(V, &C, &G) -> Outcome<V> + Send + Sync + 'static
    where
        V: Send + 'static,
        C: 'static,
        G: 'static,
    {
        let log = self.clone();
        let name = name.to_string();
        move |value, _, _| {
            log.push(name.clone());
            Outcome::ok(value)
        }
    }

    /// Deferred step that logs `name` once it resolves and passes the value on
    pub fn deferred_step<V, C, G>(
        &self,
        name: &str,
        millis: u64,
    ) -> impl Fn(V, &C, &G) -> Outcome<V> + Send + Sync + 'static
    where
        V: Send + 'static,
        C: 'static,
        G: 'static,
    {
        let log = self.clone();
        let name = name.to_string();
        move |value, _, _| {
            let log = log.clone();
            let name = name.clone();
            Outcome::deferred(async move {
                tokio::time::sleep(Duration::from_millis(millis)).await;
                log.push(name);
                Ok(value)
            })
        }
    }

    /// Step that logs `name` and fails with `message`
    pub fn failing_step<V, T, C, G>(
        &self,
        name: &str,
        message: &str,
    ) -> impl Fn(V, &C, &G) -> Outcome<T> + Send + Sync + 'static
    where
        V: Send + 'static,
        T: Send + 'static,
        C: 'static,
        G: 'static,
    {
        let log = self.clone();
        let name = name.to_string();
        let message = message.to_string();
        move |_, _, _| {
            log.push(name.clone());
            Outcome::fail(anyhow::anyhow!("{}", message))
        }
    }
}

/// Thread-safe call counter
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    count: Arc<AtomicUsize>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// Assert an outcome is ready and return its success value
pub fn assert_ready<T: Debug>(outcome: Outcome<T>) -> T {
    assert!(outcome.is_ready(), "Outcome should be ready, but was deferred");
    match outcome.expect_ready("checked above") {
        Ok(value) => value,
        Err(e) => panic!("Outcome should have succeeded, but failed with: {:#}", e),
    }
}

/// Assert an outcome is ready and failed, returning the error
pub fn assert_ready_failure<T: Debug>(outcome: Outcome<T>) -> Error {
    assert!(outcome.is_ready(), "Outcome should be ready, but was deferred");
    match outcome.expect_ready("checked above") {
        Ok(value) => panic!("Outcome should have failed, but succeeded with: {:?}", value),
        Err(e) => e,
    }
}

/// Assert an error's message contains `expected`
pub fn assert_error_contains(error: &Error, expected: &str) {
    let message = format!("{:#}", error);
    assert!(
        message.contains(expected),
        "Error:\n{}\n\ndoes not contain:\n{}",
        message,
        expected
    );
}

/// Bot built from YAML with replies recorded in memory
pub fn bot_from_yaml(yaml: &str) -> (ChatBot, Arc<MemorySink>) {
    let config = BotConfig::from_yaml(yaml).expect("bot config should be valid");
    let sink = Arc::new(MemorySink::new());
    let bot = ChatBot::new(config, sink.clone()).expect("bot pipeline should compose");
    (bot, sink)
}

pub fn envelope(user: &str) -> Envelope {
    Envelope::new("#general", user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_log_step_records_and_passes_value() {
        let log = CallLog::new();
        let step = log.step::<i32, (), ()>("first");

        assert_eq!(assert_ready(step(3, &(), &())), 3);
        assert_eq!(log.entries(), vec!["first"]);
    }

    #[tokio::test]
    async fn test_deferred_step_records_on_resolve() {
        let log = CallLog::new();
        let step = log.deferred_step::<i32, (), ()>("slow", 1);

        let outcome = step(1, &(), &());
        assert!(log.entries().is_empty());
        assert_eq!(outcome.await.unwrap(), 1);
        assert_eq!(log.entries(), vec!["slow"]);
    }

    #[test]
    fn test_failing_step() {
        let log = CallLog::new();
        let step = log.failing_step::<i32, i32, (), ()>("bad", "broken");

        let error = assert_ready_failure(step(1, &(), &()));
        assert_error_contains(&error, "broken");
        assert_eq!(log.entries(), vec!["bad"]);
    }
}
