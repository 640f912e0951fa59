use {
    http::Method,
    std::{error, fmt, io, sync::Arc},
};

pub(crate) type BoxedStdError = Box<dyn error::Error + Send + Sync + 'static>;

/// The error value scripted with `return_error`, shared by every call it answers.
pub(crate) type SharedError = Arc<dyn error::Error + Send + Sync + 'static>;

/// The error type returned from the intercepted calls and the registration helpers.
#[derive(Debug)]
pub struct Error {
    kind: Kind,
}

/// The category of an `Error`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request did not match any registered expectation.
    UnexpectedRequest,
    /// The matched expectation was scripted to fail with a user-provided error.
    Configured,
    /// The request body could not be consumed.
    Body,
    /// The scripted response could not be built.
    Response,
    /// A value could not be serialized into a response body.
    Serialize,
}

#[derive(Debug, thiserror::Error)]
enum Kind {
    #[error("unexpected request on route [{method}] {path:?}")]
    UnexpectedRequest { method: Method, path: String },

    #[error("{0}")]
    Configured(SharedError),

    #[error("failed to read the request body: {0}")]
    Body(#[source] io::Error),

    #[error("invalid scripted response: {0}")]
    Response(#[source] http::Error),

    #[error("failed to serialize the response body: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl Error {
    pub(crate) fn unexpected_request(method: Method, path: impl Into<String>) -> Self {
        Self {
            kind: Kind::UnexpectedRequest {
                method,
                path: path.into(),
            },
        }
    }

    pub(crate) fn configured(err: SharedError) -> Self {
        Self {
            kind: Kind::Configured(err),
        }
    }

    pub(crate) fn body(err: io::Error) -> Self {
        Self {
            kind: Kind::Body(err),
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self.kind {
            Kind::UnexpectedRequest { .. } => ErrorKind::UnexpectedRequest,
            Kind::Configured(..) => ErrorKind::Configured,
            Kind::Body(..) => ErrorKind::Body,
            Kind::Response(..) => ErrorKind::Response,
            Kind::Serialize(..) => ErrorKind::Serialize,
        }
    }

    /// Returns `true` if the request was rejected by the matcher.
    pub fn is_unexpected_request(&self) -> bool {
        self.kind() == ErrorKind::UnexpectedRequest
    }

    /// Returns a reference to the error value scripted with `return_error`, if any.
    pub fn configured_error(&self) -> Option<&(dyn error::Error + Send + Sync + 'static)> {
        match &self.kind {
            Kind::Configured(err) => Some(&**err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            Kind::Configured(err) => Some(&**err),
            Kind::Body(err) => Some(err),
            Kind::Response(err) => Some(err),
            Kind::Serialize(err) => Some(err),
            Kind::UnexpectedRequest { .. } => None,
        }
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self {
            kind: Kind::Response(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self {
            kind: Kind::Serialize(err),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::body(err)
    }
}

pub type Result<T = ()> = std::result::Result<T, Error>;
