//! Declared requests and their scripted outcomes.

use {
    crate::error::{BoxedStdError, SharedError},
    bytes::Bytes,
    http::{header::CONTENT_LENGTH, Method},
    serde::Serialize,
    std::{collections::BTreeMap, fmt, sync::Arc},
};

/// The handle of an expectation registered on a `MockClient`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpectationId(pub(crate) usize);

impl ExpectationId {
    /// Returns the position of the expectation in registration order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// The requirement declared for a query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    /// The parameter carries at least this value.
    Contains(String),
    /// The parameter carries exactly these values, in this order.
    Exact(Vec<String>),
}

impl QueryParam {
    pub(crate) fn is_satisfied_by(&self, actual: &[String]) -> bool {
        match self {
            QueryParam::Contains(value) => actual.iter().any(|v| v == value),
            QueryParam::Exact(values) => values.as_slice() == actual,
        }
    }
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryParam::Contains(value) => write!(f, "contains {:?}", value),
            QueryParam::Exact(values) => write!(f, "{:?}", values),
        }
    }
}

/// The outcome scripted for an expectation.
#[derive(Debug, Clone)]
pub(crate) struct Respond {
    pub(crate) status: u16,
    pub(crate) headers: BTreeMap<String, Vec<String>>,
    pub(crate) body: Bytes,
    pub(crate) error: Option<SharedError>,
}

impl Respond {
    /// Returns the length announced by the response.
    ///
    /// An explicit `content-length` header takes precedence over the body length.
    pub(crate) fn content_length(&self) -> u64 {
        self.headers
            .get(CONTENT_LENGTH.as_str())
            .and_then(|values| values.first())
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(self.body.len() as u64)
    }
}

/// A declared request and the response or error to return for it.
///
/// The setters consume and return `self`, so an expectation is usually
/// described with a single chained expression before being registered.
///
/// ```
/// use httpdouble::Expectation;
/// use http::Method;
///
/// let expectation = Expectation::new(Method::POST, "/users")
///     .expect_header("Authorization", ["Bearer TOKEN"])
///     .expect_json(r#"{"name": "alice"}"#)
///     .return_status(201)
///     .times(2);
/// assert_eq!(expectation.expected_times_called(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Expectation {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) expected_headers: BTreeMap<String, Vec<String>>,
    pub(crate) expected_query_params: BTreeMap<String, QueryParam>,
    pub(crate) expected_body: String,
    pub(crate) expected_json: String,
    pub(crate) respond: Respond,
    pub(crate) expected_times_called: usize,
    pub(crate) times_called: usize,
}

impl Default for Expectation {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".into(),
            expected_headers: BTreeMap::new(),
            expected_query_params: BTreeMap::new(),
            expected_body: String::new(),
            expected_json: String::new(),
            respond: Respond {
                status: 200,
                headers: BTreeMap::new(),
                body: Bytes::new(),
                error: None,
            },
            expected_times_called: 1,
            times_called: 0,
        }
    }
}

impl Expectation {
    /// Creates an expectation for a request with the specified method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Default::default()
        }
    }

    /// Requires the request to carry exactly these values for the header.
    ///
    /// Header names are case-insensitive.
    pub fn expect_header<V>(mut self, name: impl AsRef<str>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<String>,
    {
        self.expected_headers.insert(
            name.as_ref().to_ascii_lowercase(),
            values.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Requires the query parameter to contain at least this value.
    pub fn expect_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.expected_query_params
            .insert(name.into(), QueryParam::Contains(value.into()));
        self
    }

    /// Requires the query parameter to carry exactly these values, in this order.
    pub fn expect_query_param_values<V>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self
    where
        V: Into<String>,
    {
        self.expected_query_params.insert(
            name.into(),
            QueryParam::Exact(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Requires the request body to be exactly this string.
    ///
    /// An empty string removes the constraint.
    pub fn expect_body(mut self, body: impl Into<String>) -> Self {
        self.expected_body = body.into();
        self
    }

    /// Requires the request body to be a JSON document equal to this one.
    ///
    /// Documents are compared after parsing, so whitespace and key order do not matter.
    pub fn expect_json(mut self, json: impl Into<String>) -> Self {
        self.expected_json = json.into();
        self
    }

    /// Sets the status code of the response. Defaults to `200`.
    pub fn return_status(mut self, status: u16) -> Self {
        self.respond.status = status;
        self
    }

    /// Sets the body of the response.
    pub fn return_body(mut self, body: impl Into<Bytes>) -> Self {
        self.respond.body = body.into();
        self
    }

    /// Sets the body of the response to the JSON representation of `value`.
    pub fn return_body_from_object<T>(mut self, value: &T) -> crate::Result<Self>
    where
        T: Serialize + ?Sized,
    {
        self.respond.body = serde_json::to_vec(value)?.into();
        Ok(self)
    }

    /// Adds a header to the response.
    pub fn return_header<V>(mut self, name: impl AsRef<str>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<String>,
    {
        self.respond.headers.insert(
            name.as_ref().to_ascii_lowercase(),
            values.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Makes every matching call fail with this error instead of returning a response.
    pub fn return_error(mut self, err: impl Into<BoxedStdError>) -> Self {
        self.respond.error = Some(Arc::from(err.into()));
        self
    }

    /// Sets how many calls the expectation has to answer. Defaults to `1`.
    pub fn times(mut self, times: usize) -> Self {
        if times == 0 {
            log::warn!(
                "an expectation on [{}] {:?} must be called at least once; using 1",
                self.method,
                self.path
            );
        }
        self.expected_times_called = times.max(1);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn expected_headers(&self) -> &BTreeMap<String, Vec<String>> {
        &self.expected_headers
    }

    pub fn expected_query_params(&self) -> &BTreeMap<String, QueryParam> {
        &self.expected_query_params
    }

    pub fn expected_body(&self) -> &str {
        &self.expected_body
    }

    pub fn expected_json(&self) -> &str {
        &self.expected_json
    }

    pub fn return_status_code(&self) -> u16 {
        self.respond.status
    }

    pub fn returned_headers(&self) -> &BTreeMap<String, Vec<String>> {
        &self.respond.headers
    }

    pub fn returned_body(&self) -> &Bytes {
        &self.respond.body
    }

    /// Returns `true` if the expectation answers with an error.
    pub fn returns_error(&self) -> bool {
        self.respond.error.is_some()
    }

    /// Returns the length the response will announce.
    pub fn content_length(&self) -> u64 {
        self.respond.content_length()
    }

    pub fn expected_times_called(&self) -> usize {
        self.expected_times_called
    }

    /// Returns how many calls the expectation has answered so far.
    pub fn times_called(&self) -> usize {
        self.times_called
    }

    /// Returns the number of calls still required.
    pub fn remaining(&self) -> usize {
        self.expected_times_called.saturating_sub(self.times_called)
    }

    /// Returns `true` once the expectation has answered all the calls it was declared for.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub(crate) fn targets(&self, method: &Method, path: &str) -> bool {
        self.method == *method && self.path == path
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Request: [{}] {:?}", self.method, self.path)?;

        if !self.expected_headers.is_empty() {
            writeln!(f, "Expected headers:")?;
            for (name, values) in &self.expected_headers {
                writeln!(f, "\t- {}: {:?}", name, values)?;
            }
        }

        if !self.expected_query_params.is_empty() {
            writeln!(f, "Expected query params:")?;
            for (name, param) in &self.expected_query_params {
                writeln!(f, "\t- {}: {}", name, param)?;
            }
        }

        if !self.expected_body.is_empty() {
            writeln!(f, "Expected body:\n\t{:?}", self.expected_body)?;
        }

        if !self.expected_json.is_empty() {
            writeln!(f, "Expected JSON:\n\t{:?}", self.expected_json)?;
        }

        Ok(())
    }
}
