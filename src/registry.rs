use {
    crate::{
        expectation::{Expectation, ExpectationId, Respond},
        matcher::{self, Incoming, MatchOrder, Resolution},
        report::Failure,
        verify,
    },
    std::{
        mem,
        sync::{Mutex, MutexGuard, PoisonError},
    },
};

/// The outcome of matching one intercepted request.
#[derive(Debug)]
pub(crate) enum Outcome {
    Matched(Respond),
    Unmatched(Failure),
}

/// The arena of registered expectations.
///
/// Every mutation goes through the single lock, so the eligibility check and
/// the counter increment of a call happen atomically.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    expectations: Mutex<Vec<Expectation>>,
}

impl Registry {
    fn lock(&self) -> MutexGuard<'_, Vec<Expectation>> {
        self.expectations.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn register(&self, expectation: Expectation) -> ExpectationId {
        let mut expectations = self.lock();
        let id = ExpectationId(expectations.len());
        log::debug!(
            "registered expectation #{} on [{}] {:?}",
            id.0,
            expectation.method,
            expectation.path
        );
        expectations.push(expectation);
        id
    }

    /// Replaces the expectation with the value returned from `f`.
    ///
    /// An expectation that already answered a call is left untouched and `false` is returned.
    pub(crate) fn update(&self, id: ExpectationId, f: impl FnOnce(Expectation) -> Expectation) -> bool {
        let mut expectations = self.lock();
        let slot = match expectations.get_mut(id.0) {
            Some(slot) => slot,
            None => return false,
        };
        if slot.times_called > 0 {
            log::warn!(
                "expectation #{} on [{}] {:?} already answered {} call(s); the change is ignored",
                id.0,
                slot.method,
                slot.path,
                slot.times_called
            );
            return false;
        }
        let current = mem::take(slot);
        *slot = f(current);
        true
    }

    pub(crate) fn get(&self, id: ExpectationId) -> Option<Expectation> {
        self.lock().get(id.0).cloned()
    }

    pub(crate) fn snapshot(&self) -> Vec<Expectation> {
        self.lock().clone()
    }

    /// Resolves the request and, on success, records the call against the winning expectation.
    pub(crate) fn intercept(&self, incoming: &Incoming<'_>, order: MatchOrder) -> Outcome {
        let mut expectations = self.lock();
        match matcher::resolve(&expectations, incoming, order) {
            Resolution::Matched(index) => {
                let expectation = &mut expectations[index];
                expectation.times_called += 1;
                log::trace!(
                    "[{}] {:?} answered by expectation #{} ({}/{})",
                    incoming.method,
                    incoming.path,
                    index,
                    expectation.times_called,
                    expectation.expected_times_called
                );
                Outcome::Matched(expectation.respond.clone())
            }
            Resolution::Closest(index) => Outcome::Unmatched(Failure::ClosestMatchMismatch {
                method: incoming.method.clone(),
                path: incoming.path.to_string(),
                closest: expectations[index].to_string(),
                received: incoming.to_string(),
            }),
            Resolution::OutOfOrder(index) => Outcome::Unmatched(Failure::OutOfOrder {
                method: incoming.method.clone(),
                path: incoming.path.to_string(),
                next: expectations[index].to_string(),
            }),
            Resolution::NoRoute { exhausted } => Outcome::Unmatched(Failure::UnexpectedRequest {
                method: incoming.method.clone(),
                path: incoming.path.to_string(),
                exhausted,
            }),
        }
    }

    pub(crate) fn missing_calls(&self) -> Vec<Failure> {
        verify::missing_calls(&self.lock())
    }
}
