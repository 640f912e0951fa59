//! Reporting of diagnostics to the surrounding test harness.

use {
    http::Method,
    std::{
        fmt,
        sync::{Arc, Mutex, PoisonError},
        thread,
    },
};

/// A diagnostic produced by the double.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// No pending expectation shares the method and path of the request.
    UnexpectedRequest {
        method: Method,
        path: String,
        /// The number of expectations on the same route that already answered all their calls.
        exhausted: usize,
    },
    /// A pending expectation shares the route of the request, but its other criteria fail.
    ClosestMatchMismatch {
        method: Method,
        path: String,
        /// The rendered criteria of the closest expectation.
        closest: String,
        /// The rendered request.
        received: String,
    },
    /// The request does not target the next pending expectation in sequential mode.
    OutOfOrder {
        method: Method,
        path: String,
        /// The rendered criteria of the next pending expectation.
        next: String,
    },
    /// An expectation did not receive all the calls it was declared for.
    MissingCalls {
        method: Method,
        path: String,
        expected: usize,
        observed: usize,
    },
}

impl Failure {
    /// Returns the number of calls still missing, for `MissingCalls`.
    pub fn outstanding(&self) -> Option<usize> {
        match self {
            Failure::MissingCalls {
                expected, observed, ..
            } => Some(expected.saturating_sub(*observed)),
            _ => None,
        }
    }

    /// Returns `true` if the failure was raised while intercepting a call.
    pub fn is_call_failure(&self) -> bool {
        !matches!(self, Failure::MissingCalls { .. })
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::UnexpectedRequest {
                method,
                path,
                exhausted,
            } => {
                write!(f, "Unexpected request on route [{}] {:?}", method, path)?;
                if *exhausted > 0 {
                    write!(
                        f,
                        " ({} expectation(s) on this route already received all their calls)",
                        exhausted
                    )?;
                }
                Ok(())
            }
            Failure::ClosestMatchMismatch {
                method,
                path,
                closest,
                received,
            } => write!(
                f,
                "Unexpected request on route [{}] {:?} the closest request I have is:\n{}\nreceived:\n{}",
                method, path, closest, received
            ),
            Failure::OutOfOrder { method, path, next } => write!(
                f,
                "Unexpected request on route [{}] {:?} the next expected request is:\n{}",
                method, path, next
            ),
            Failure::MissingCalls {
                method,
                path,
                expected,
                observed,
            } => write!(
                f,
                "Missing calls on route [{}] {:?}: expected {}, received {} ({} outstanding)",
                method,
                path,
                expected,
                observed,
                expected.saturating_sub(*observed)
            ),
        }
    }
}

/// The mechanism of the surrounding test framework for recording failures.
pub trait Reporter: Send + Sync {
    /// Records a failure without interrupting the test.
    fn report_failure(&self, failure: Failure);

    /// Stops the current test immediately.
    ///
    /// Only called when the client is configured to fail fast.
    fn abort_now(&self, failure: &Failure) -> ! {
        panic!("{}", failure)
    }
}

impl<R: ?Sized + Reporter> Reporter for Arc<R> {
    fn report_failure(&self, failure: Failure) {
        (**self).report_failure(failure)
    }

    fn abort_now(&self, failure: &Failure) -> ! {
        (**self).abort_now(failure)
    }
}

/// A `Reporter` that collects failures so that they can be inspected afterwards.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    failures: Arc<Mutex<Vec<Failure>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if at least one failure has been recorded.
    pub fn failed(&self) -> bool {
        !self.lock().is_empty()
    }

    /// Returns a copy of the recorded failures.
    pub fn failures(&self) -> Vec<Failure> {
        self.lock().clone()
    }

    /// Discards the recorded failures.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Failure>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Reporter for Recorder {
    fn report_failure(&self, failure: Failure) {
        self.lock().push(failure);
    }
}

/// The default `Reporter`.
///
/// Every failure is logged as soon as it is recorded, and the test is failed
/// with the whole list when the reporter is dropped.
#[derive(Debug, Default)]
pub struct TestReporter {
    recorder: Recorder,
}

impl TestReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for TestReporter {
    fn report_failure(&self, failure: Failure) {
        log::error!("{}", failure);
        self.recorder.report_failure(failure);
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if thread::panicking() {
            return;
        }
        let failures = self.recorder.failures();
        if !failures.is_empty() {
            let messages: Vec<String> = failures.iter().map(ToString::to_string).collect();
            panic!(
                "httpdouble recorded {} failure(s):\n\n{}",
                failures.len(),
                messages.join("\n\n")
            );
        }
    }
}
