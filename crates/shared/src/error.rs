use thiserror::Error;

/// Failure taxonomy for every call against a resource collection.
///
/// `AuthExpired` is the only variant that ends the session; everything else is
/// reported to the user and leaves state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("session expired or token rejected")]
    AuthExpired,
    #[error("request failed with status {status}")]
    RequestFailed { status: u16 },
    #[error("transport failure: {0}")]
    TransportFailure(String),
    #[error("no bearer token available")]
    MissingToken,
}

impl ClientError {
    pub fn from_status(status: u16) -> Self {
        if status == 401 {
            Self::AuthExpired
        } else {
            Self::RequestFailed { status }
        }
    }

    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::TransportFailure(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
