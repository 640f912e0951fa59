use {
    crate::{
        body::Body,
        error::Error,
        expectation::{Expectation, ExpectationId},
        matcher::{Incoming, MatchOrder},
        registry::{Outcome, Registry},
        report::{Failure, Reporter, TestReporter},
        respond::respond,
        transport::Transport,
    },
    futures::future::{self, Ready},
    http::{Method, Request, Response},
    serde::Serialize,
    std::{
        fmt,
        sync::Arc,
        task::{Context, Poll},
        thread,
    },
};

/// A builder for creating a `MockClient` with custom configuration.
#[derive(Debug)]
pub struct Builder {
    reporter: Option<Box<dyn Reporter>>,
    match_order: MatchOrder,
    fail_fast: bool,
    verify_on_drop: bool,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self {
            reporter: None,
            match_order: MatchOrder::default(),
            fail_fast: false,
            verify_on_drop: false,
        }
    }

    /// Sets the reporter receiving the failures.
    ///
    /// By default, failures are sent to a `TestReporter`.
    pub fn reporter(self, reporter: impl Reporter + 'static) -> Self {
        Self {
            reporter: Some(Box::new(reporter)),
            ..self
        }
    }

    /// Sets the policy used to select the expectation answering a request.
    pub fn match_order(self, match_order: MatchOrder) -> Self {
        Self {
            match_order,
            ..self
        }
    }

    /// Sets whether to abort the test right after an unexpected request is reported.
    ///
    /// By default, the failure is only recorded and the call returns an error.
    pub fn fail_fast(self, enabled: bool) -> Self {
        Self {
            fail_fast: enabled,
            ..self
        }
    }

    /// Sets whether to verify the expectations when the last handle of the client is dropped.
    pub fn verify_on_drop(self, enabled: bool) -> Self {
        Self {
            verify_on_drop: enabled,
            ..self
        }
    }

    /// Consume itself and creates an instance of `MockClient` using the current configuration.
    pub fn build(self) -> MockClient {
        MockClient {
            inner: Arc::new(Inner {
                registry: Registry::default(),
                reporter: self
                    .reporter
                    .unwrap_or_else(|| Box::new(TestReporter::new())),
                match_order: self.match_order,
                fail_fast: self.fail_fast,
                verify_on_drop: self.verify_on_drop,
            }),
        }
    }
}

impl fmt::Debug for dyn Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Reporter")
    }
}

/// An in-memory replacement of an HTTP client.
///
/// Requests sent through the client are matched against the registered
/// expectations and answered with their scripted response or error.
/// Handles are cheap to clone and share the same expectations.
#[derive(Debug, Clone)]
pub struct MockClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    registry: Registry,
    reporter: Box<dyn Reporter>,
    match_order: MatchOrder,
    fail_fast: bool,
    verify_on_drop: bool,
}

impl Inner {
    fn report(&self, failure: Failure) {
        if self.fail_fast {
            self.reporter.report_failure(failure.clone());
            self.reporter.abort_now(&failure)
        } else {
            self.reporter.report_failure(failure)
        }
    }

    fn verify(&self) {
        let failures = self.registry.missing_calls();
        log::debug!("verified expectations: {} unmet", failures.len());
        for failure in failures {
            self.reporter.report_failure(failure);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if self.verify_on_drop && !thread::panicking() {
            self.verify();
        }
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClient {
    /// Creates a `MockClient` reporting failures to a `TestReporter`.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a `MockClient` reporting failures to the specified reporter.
    pub fn with_reporter(reporter: impl Reporter + 'static) -> Self {
        Self::builder().reporter(reporter).build()
    }

    /// Creates a `Builder` to configure a `MockClient`.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Registers an expectation and returns the client for chaining.
    pub fn expect(self, expectation: Expectation) -> Self {
        self.register(expectation);
        self
    }

    /// Registers an expectation and returns its handle.
    pub fn register(&self, expectation: Expectation) -> ExpectationId {
        self.inner.registry.register(expectation)
    }

    /// Registers an expectation on the specified route and returns a handle to configure it in place.
    pub fn on(&self, method: Method, path: impl Into<String>) -> ExpectationMut<'_> {
        let id = self.register(Expectation::new(method, path));
        ExpectationMut { client: self, id }
    }

    /// Returns how many calls the expectation has answered so far.
    pub fn times_called(&self, id: ExpectationId) -> Option<usize> {
        self.inner.registry.get(id).map(|e| e.times_called())
    }

    /// Returns a copy of the expectation with the specified handle.
    pub fn expectation(&self, id: ExpectationId) -> Option<Expectation> {
        self.inner.registry.get(id)
    }

    /// Returns a copy of all registered expectations, in registration order.
    pub fn expectations(&self) -> Vec<Expectation> {
        self.inner.registry.snapshot()
    }

    /// Reports a failure for every expectation that did not receive all its calls.
    ///
    /// This should be called after every concurrent caller has completed.
    pub fn verify(&self) {
        self.inner.verify();
    }

    fn intercept(&self, request: Request<Body>) -> crate::Result<Response<Body>> {
        let (parts, body) = request.into_parts();
        let body = body.concat()?;
        let incoming = Incoming::new(&parts.method, &parts.uri, &parts.headers, &body);

        let outcome = self.inner.registry.intercept(&incoming, self.inner.match_order);
        match outcome {
            Outcome::Matched(template) => respond(template),
            Outcome::Unmatched(failure) => {
                self.inner.report(failure);
                Err(Error::unexpected_request(parts.method.clone(), &*incoming.path))
            }
        }
    }
}

impl Transport for MockClient {
    fn send(&self, request: Request<Body>) -> crate::Result<Response<Body>> {
        self.intercept(request)
    }
}

impl<Bd> tower_service::Service<Request<Bd>> for MockClient
where
    Bd: Into<Body>,
{
    type Response = Response<Body>;
    type Error = Error;
    type Future = Ready<crate::Result<Response<Body>>>;

    #[inline]
    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<crate::Result<()>> {
        Poll::Ready(Ok(()))
    }

    #[inline]
    fn call(&mut self, request: Request<Bd>) -> Self::Future {
        future::ready(self.intercept(request.map(Into::into)))
    }
}

/// A handle to configure an expectation after it has been registered.
///
/// Every setter updates the registered expectation immediately.
/// Once the expectation has answered a call, setters are ignored and a warning is logged.
#[derive(Debug)]
pub struct ExpectationMut<'a> {
    client: &'a MockClient,
    id: ExpectationId,
}

macro_rules! forward_setters {
    ($( $(#[$attr:meta])* fn $name:ident ( $($arg:ident : $ty:ty),* ); )*) => {$(
        $(#[$attr])*
        pub fn $name(self, $($arg: $ty),*) -> Self {
            self.update(move |e| e.$name($($arg),*))
        }
    )*};
}

impl<'a> ExpectationMut<'a> {
    /// Returns the handle of the registered expectation.
    pub fn id(&self) -> ExpectationId {
        self.id
    }

    /// Returns how many calls the expectation has answered so far.
    pub fn times_called(&self) -> usize {
        self.client.times_called(self.id).unwrap_or(0)
    }

    fn update(self, f: impl FnOnce(Expectation) -> Expectation) -> Self {
        self.client.inner.registry.update(self.id, f);
        self
    }

    forward_setters! {
        /// See `Expectation::expect_header`.
        fn expect_header(name: impl AsRef<str>, values: impl IntoIterator<Item = impl Into<String>>);
        /// See `Expectation::expect_query_param`.
        fn expect_query_param(name: impl Into<String>, value: impl Into<String>);
        /// See `Expectation::expect_query_param_values`.
        fn expect_query_param_values(name: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>);
        /// See `Expectation::expect_body`.
        fn expect_body(body: impl Into<String>);
        /// See `Expectation::expect_json`.
        fn expect_json(json: impl Into<String>);
        /// See `Expectation::return_status`.
        fn return_status(status: u16);
        /// See `Expectation::return_body`.
        fn return_body(body: impl Into<bytes::Bytes>);
        /// See `Expectation::return_header`.
        fn return_header(name: impl AsRef<str>, values: impl IntoIterator<Item = impl Into<String>>);
        /// See `Expectation::return_error`.
        fn return_error(err: impl Into<crate::error::BoxedStdError>);
        /// See `Expectation::times`.
        fn times(times: usize);
    }

    /// See `Expectation::return_body_from_object`.
    pub fn return_body_from_object<T>(self, value: &T) -> crate::Result<Self>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(value)?;
        Ok(self.update(move |e| e.return_body(body)))
    }
}
