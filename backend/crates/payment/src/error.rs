//! Payment Error Types
//!
//! Payment-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_objects::Gateway;

/// Payment-specific result type alias
pub type PaymentResult<T> = Result<T, PaymentError>;

/// Payment-specific error variants
///
/// Display strings are safe to return to clients: upstream response
/// bodies are kept in `detail` fields that are only logged.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Request body or query string could not be parsed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Amount is not a positive decimal with at most two fraction digits
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Transaction uuid contains characters the gateway does not accept
    #[error("Invalid transaction id: {0}")]
    InvalidTransactionId(String),

    #[error("Invalid product code: {0}")]
    InvalidProductCode(String),

    #[error("Invalid pidx")]
    InvalidPidx,

    /// Khalti order or customer fields are missing or malformed
    #[error("Invalid order details: {0}")]
    InvalidOrder(String),

    /// Callback payload could not be decoded
    #[error("Invalid callback payload: {0}")]
    InvalidCallback(String),

    /// Callback signature does not match the payload
    #[error("Callback signature mismatch")]
    SignatureMismatch,

    /// An attempt with this reference was already recorded
    #[error("Payment reference already used")]
    DuplicateReference,

    #[error("Payment attempt not found")]
    AttemptNotFound,

    /// Gateway has no credentials configured
    #[error("{0} payments are not enabled")]
    GatewayDisabled(Gateway),

    /// Gateway answered with a non-success HTTP status
    #[error("{gateway} rejected the request (HTTP {status})")]
    GatewayRejected {
        gateway: Gateway,
        status: u16,
        detail: String,
    },

    /// Gateway could not be reached or did not answer in time
    #[error("{gateway} is unreachable")]
    GatewayUnreachable {
        gateway: Gateway,
        timed_out: bool,
        detail: String,
    },

    /// Gateway answered 2xx with a body we cannot interpret
    #[error("{gateway} returned an unreadable response")]
    MalformedResponse { gateway: Gateway, detail: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] platform::config::ConfigError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Map a reqwest transport failure
    pub fn unreachable(gateway: Gateway, err: &reqwest::Error) -> Self {
        PaymentError::GatewayUnreachable {
            gateway,
            timed_out: err.is_timeout(),
            detail: err.to_string(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::InvalidRequest(_)
            | PaymentError::InvalidAmount(_)
            | PaymentError::InvalidTransactionId(_)
            | PaymentError::InvalidProductCode(_)
            | PaymentError::InvalidPidx
            | PaymentError::InvalidOrder(_)
            | PaymentError::InvalidCallback(_)
            | PaymentError::SignatureMismatch => ErrorKind::BadRequest,
            PaymentError::DuplicateReference => ErrorKind::Conflict,
            PaymentError::AttemptNotFound => ErrorKind::NotFound,
            PaymentError::GatewayDisabled(_) => ErrorKind::ServiceUnavailable,
            PaymentError::GatewayRejected { .. } | PaymentError::MalformedResponse { .. } => {
                ErrorKind::BadGateway
            }
            PaymentError::GatewayUnreachable { timed_out, .. } => {
                if *timed_out {
                    ErrorKind::GatewayTimeout
                } else {
                    ErrorKind::BadGateway
                }
            }
            PaymentError::Config(_) | PaymentError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            PaymentError::SignatureMismatch => {
                err.with_action("Start the payment again from the checkout page")
            }
            PaymentError::GatewayUnreachable { .. } => {
                err.with_action("Retry verification in a few moments")
            }
            _ => err,
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            PaymentError::GatewayRejected {
                gateway,
                status,
                detail,
            } => {
                tracing::error!(%gateway, status, detail = %detail, "Gateway rejected request");
            }
            PaymentError::GatewayUnreachable {
                gateway,
                timed_out,
                detail,
            } => {
                tracing::error!(%gateway, timed_out, detail = %detail, "Gateway unreachable");
            }
            PaymentError::MalformedResponse { gateway, detail } => {
                tracing::error!(%gateway, detail = %detail, "Unreadable gateway response");
            }
            PaymentError::Config(e) => {
                tracing::error!(error = %e, "Payment configuration error");
            }
            PaymentError::Internal(msg) => {
                tracing::error!(message = %msg, "Payment internal error");
            }
            PaymentError::SignatureMismatch => {
                tracing::warn!("Callback with invalid signature");
            }
            _ => {
                tracing::debug!(error = %self, "Payment error");
            }
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
