//! A client of a weather forecast API.
//!
//! The client only depends on `httpdouble::Transport`, so that any HTTP
//! client implementing it can be plugged in, and `MockClient` in tests.

#![deny(
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    rust_2018_compatibility,
    unused
)]

use {
    http::{header, Request, StatusCode},
    httpdouble::{Body, Transport},
    serde::{Deserialize, Serialize},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] httpdouble::Error),

    #[error("failed to build the request: {0}")]
    Request(#[from] http::Error),

    #[error("failed to read the response body: {0}")]
    Body(#[from] std::io::Error),

    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("unexpected status code: {0}")]
    Status(StatusCode),
}

pub type Result<T = ()> = std::result::Result<T, Error>;

/// The forecast of a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub city: String,
    pub temperature: f64,
    pub summary: String,
}

/// A measure submitted by a weather station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub station: String,
    pub temperature: f64,
}

#[derive(Debug)]
pub struct ForecastClient<T> {
    transport: T,
    base_url: String,
    token: String,
}

impl<T> ForecastClient<T>
where
    T: Transport,
{
    pub fn new(transport: T, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Fetches the forecast of the specified city.
    pub fn forecast(&self, city: &str) -> Result<Forecast> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("city", city)
            .finish();
        let request = Request::get(format!("{}/forecast?{}", self.base_url, query))
            .header(header::AUTHORIZATION, self.authorization())
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())?;

        log::debug!("fetching the forecast of {}", city);
        let response = self.transport.send(request)?;
        if response.status() != StatusCode::OK {
            return Err(Error::Status(response.status()));
        }

        let body = response.into_body().concat()?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Submits an observation.
    pub fn submit(&self, observation: &Observation) -> Result {
        let request = Request::post(format!("{}/observations", self.base_url))
            .header(header::AUTHORIZATION, self.authorization())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(observation)?))?;

        log::debug!("submitting an observation of {}", observation.station);
        let response = self.transport.send(request)?;
        match response.status() {
            StatusCode::CREATED => Ok(()),
            status => Err(Error::Status(status)),
        }
    }

    /// Returns whether the service is available.
    pub fn ping(&self) -> Result<bool> {
        let request = Request::get(format!("{}/health", self.base_url)).body(Body::empty())?;
        let response = self.transport.send(request)?;
        Ok(response.status().is_success())
    }
}
