//! An in-memory test double for outbound HTTP calls.
//!
//! The purpose of this crate is to replace the HTTP client used by the code
//! under test with a `MockClient`, which answers every request from a list of
//! declared expectations without using the network.
//!
//! # Example
//!
//! ```
//! use {
//!     http::{Method, Request},
//!     httpdouble::{Body, Expectation, MockClient, Recorder, Transport},
//! };
//!
//! # fn main() -> httpdouble::Result<()> {
//! let recorder = Recorder::new();
//! let client = MockClient::with_reporter(recorder.clone()).expect(
//!     Expectation::new(Method::POST, "/users")
//!         .expect_header("Authorization", ["Bearer TOKEN"])
//!         .expect_json(r#"{"name": "alice"}"#)
//!         .return_status(201)
//!         .return_body(r#"{"id": 1}"#),
//! );
//!
//! // the code under test only sees a `Transport`.
//! fn create_user(transport: &impl Transport) -> httpdouble::Result<u16> {
//!     let request = Request::post("https://api.example.com/users")
//!         .header("Authorization", "Bearer TOKEN")
//!         .body(Body::from(r#"{ "name" : "alice" }"#))?;
//!     Ok(transport.send(request)?.status().as_u16())
//! }
//!
//! assert_eq!(create_user(&client)?, 201);
//!
//! // a second call is not expected.
//! assert!(create_user(&client).unwrap_err().is_unexpected_request());
//!
//! client.verify();
//! assert_eq!(recorder.failures().len(), 1);
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/httpdouble/0.1.0-preview.1")]
#![deny(
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    rust_2018_compatibility,
    unused
)]
#![forbid(clippy::unimplemented)]

mod body;
mod client;
mod error;
mod expectation;
mod matcher;
pub mod report;
mod registry;
mod respond;
pub mod transport;
mod util;
mod verify;

pub use crate::{
    body::Body,
    client::{Builder, ExpectationMut, MockClient},
    error::{Error, ErrorKind, Result},
    expectation::{Expectation, ExpectationId, QueryParam},
    matcher::MatchOrder,
    report::{Failure, Recorder, Reporter, TestReporter},
    transport::Transport,
    util::ResponseExt,
};
