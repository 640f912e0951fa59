use crate::{expectation::Expectation, report::Failure};

/// Lists a `MissingCalls` failure for every expectation under its declared call count.
///
/// Over-calls never show up here: an exhausted expectation stops matching and the
/// extra call is reported when it is intercepted.
pub(crate) fn missing_calls(expectations: &[Expectation]) -> Vec<Failure> {
    expectations
        .iter()
        .filter(|e| !e.is_exhausted())
        .map(|e| Failure::MissingCalls {
            method: e.method.clone(),
            path: e.path.clone(),
            expected: e.expected_times_called,
            observed: e.times_called,
        })
        .collect()
}
