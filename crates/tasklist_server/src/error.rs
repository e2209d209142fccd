//! HTTP error mapping and startup failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};
use tasklist_core::{ServiceError, StoreError};

/// Handler error; always rendered as a bare `500 Internal Server Error`.
#[derive(Debug)]
pub struct AppError(ServiceError);

impl From<ServiceError> for AppError {
    fn from(value: ServiceError) -> Self {
        Self(value)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(
            "event=request_failed module=http status=error error={}",
            self.0
        );
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Failure that prevents the server from starting or shutting down cleanly.
#[derive(Debug)]
pub enum StartupError {
    Db(StoreError),
    Init(ServiceError),
    Io(std::io::Error),
}

impl Display for StartupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database bootstrap failed: {err}"),
            Self::Init(err) => write!(f, "store initialization failed: {err}"),
            Self::Io(err) => write!(f, "listener failed: {err}"),
        }
    }
}

impl Error for StartupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Init(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<StoreError> for StartupError {
    fn from(value: StoreError) -> Self {
        Self::Db(value)
    }
}

impl From<ServiceError> for StartupError {
    fn from(value: ServiceError) -> Self {
        Self::Init(value)
    }
}

impl From<std::io::Error> for StartupError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
