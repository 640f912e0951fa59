//! Resolution of intercepted requests against the registered expectations.

use {
    crate::expectation::Expectation,
    http::{HeaderMap, Method, Uri},
    percent_encoding::percent_decode_str,
    serde_json::Value,
    std::{borrow::Cow, cell::OnceCell, collections::BTreeMap, fmt},
};

/// The policy used to select candidates among the registered expectations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MatchOrder {
    /// Any pending expectation may answer a request; registration order only breaks ties.
    Unordered,
    /// Requests must arrive in registration order; only the first pending expectation is considered.
    Sequential,
}

impl Default for MatchOrder {
    fn default() -> Self {
        MatchOrder::Unordered
    }
}

/// The parts of an intercepted request inspected by the matcher.
pub(crate) struct Incoming<'a> {
    pub(crate) method: &'a Method,
    /// The percent-decoded path.
    pub(crate) path: Cow<'a, str>,
    pub(crate) query: BTreeMap<String, Vec<String>>,
    pub(crate) headers: &'a HeaderMap,
    pub(crate) body: &'a [u8],
    json: OnceCell<Option<Value>>,
}

impl<'a> Incoming<'a> {
    pub(crate) fn new(method: &'a Method, uri: &'a Uri, headers: &'a HeaderMap, body: &'a [u8]) -> Self {
        let mut query = BTreeMap::<String, Vec<String>>::new();
        for (key, value) in form_urlencoded::parse(uri.query().unwrap_or("").as_bytes()) {
            query.entry(key.into_owned()).or_default().push(value.into_owned());
        }

        Self {
            method,
            path: percent_decode_str(uri.path()).decode_utf8_lossy(),
            query,
            headers,
            body,
            json: OnceCell::new(),
        }
    }

    fn json(&self) -> Option<&Value> {
        self.json
            .get_or_init(|| serde_json::from_slice(self.body).ok())
            .as_ref()
    }
}

impl fmt::Display for Incoming<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Request: [{}] {:?}", self.method, self.path)?;

        if !self.headers.is_empty() {
            writeln!(f, "Headers:")?;
            for name in self.headers.keys() {
                let values: Vec<_> = self
                    .headers
                    .get_all(name)
                    .iter()
                    .map(|v| String::from_utf8_lossy(v.as_bytes()))
                    .collect();
                writeln!(f, "\t- {}: {:?}", name, values)?;
            }
        }

        if !self.query.is_empty() {
            writeln!(f, "Query params:")?;
            for (name, values) in &self.query {
                writeln!(f, "\t- {}: {:?}", name, values)?;
            }
        }

        if !self.body.is_empty() {
            writeln!(f, "Body:\n\t{:?}", String::from_utf8_lossy(self.body))?;
        }

        Ok(())
    }
}

/// The result of resolving a request.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// The expectation at this index answers the request.
    Matched(usize),
    /// No expectation answers the request; the one at this index shares its route.
    Closest(usize),
    /// Sequential mode only: the request does not target the next pending expectation.
    OutOfOrder(usize),
    /// No pending expectation shares the route of the request.
    NoRoute { exhausted: usize },
}

pub(crate) fn resolve(expectations: &[Expectation], incoming: &Incoming<'_>, order: MatchOrder) -> Resolution {
    match order {
        MatchOrder::Unordered => resolve_unordered(expectations, incoming),
        MatchOrder::Sequential => resolve_sequential(expectations, incoming),
    }
}

fn resolve_unordered(expectations: &[Expectation], incoming: &Incoming<'_>) -> Resolution {
    let mut closest = None;
    for (index, expectation) in expectations.iter().enumerate() {
        if !is_eligible(expectation, incoming) {
            continue;
        }
        if satisfies(expectation, incoming) {
            return Resolution::Matched(index);
        }
        closest.get_or_insert(index);
    }

    match closest {
        Some(index) => Resolution::Closest(index),
        None => Resolution::NoRoute {
            exhausted: count_exhausted(expectations, incoming),
        },
    }
}

fn resolve_sequential(expectations: &[Expectation], incoming: &Incoming<'_>) -> Resolution {
    let next = match expectations.iter().position(|e| !e.is_exhausted()) {
        Some(index) => index,
        None => {
            return Resolution::NoRoute {
                exhausted: count_exhausted(expectations, incoming),
            }
        }
    };

    let expectation = &expectations[next];
    if !expectation.targets(incoming.method, &incoming.path) {
        Resolution::OutOfOrder(next)
    } else if satisfies(expectation, incoming) {
        Resolution::Matched(next)
    } else {
        Resolution::Closest(next)
    }
}

fn is_eligible(expectation: &Expectation, incoming: &Incoming<'_>) -> bool {
    expectation.targets(incoming.method, &incoming.path) && !expectation.is_exhausted()
}

fn count_exhausted(expectations: &[Expectation], incoming: &Incoming<'_>) -> usize {
    expectations
        .iter()
        .filter(|e| e.targets(incoming.method, &incoming.path) && e.is_exhausted())
        .count()
}

fn satisfies(expectation: &Expectation, incoming: &Incoming<'_>) -> bool {
    headers_match(expectation, incoming)
        && query_params_match(expectation, incoming)
        && body_matches(expectation, incoming)
        && json_matches(expectation, incoming)
}

fn headers_match(expectation: &Expectation, incoming: &Incoming<'_>) -> bool {
    expectation.expected_headers.iter().all(|(name, expected)| {
        incoming.headers.contains_key(name.as_str())
            && incoming
                .headers
                .get_all(name.as_str())
                .iter()
                .map(|value| value.as_bytes())
                .eq(expected.iter().map(|value| value.as_bytes()))
    })
}

fn query_params_match(expectation: &Expectation, incoming: &Incoming<'_>) -> bool {
    expectation
        .expected_query_params
        .iter()
        .all(|(name, param)| {
            let actual = incoming.query.get(name).map_or(&[][..], |v| v.as_slice());
            param.is_satisfied_by(actual)
        })
}

fn body_matches(expectation: &Expectation, incoming: &Incoming<'_>) -> bool {
    expectation.expected_body.is_empty() || expectation.expected_body.as_bytes() == incoming.body
}

fn json_matches(expectation: &Expectation, incoming: &Incoming<'_>) -> bool {
    if expectation.expected_json.is_empty() {
        return true;
    }
    let expected = match serde_json::from_str::<Value>(&expectation.expected_json) {
        Ok(expected) => expected,
        Err(..) => return false,
    };
    incoming.json().map_or(false, |actual| json_eq(&expected, actual))
}

/// Compares two documents, treating numbers as equal when they denote the same value.
fn json_eq(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
                return a == b;
            }
            if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
                return a == b;
            }
            a.as_f64() == b.as_f64()
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| json_eq(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, a)| b.get(key).map_or(false, |b| json_eq(a, b)))
        }
        (a, b) => a == b,
    }
}
