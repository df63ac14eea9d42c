//! Error types module
//!
//! Every failure the client can report is a `ClientError`. Network and HTTP
//! status failures are caught at the API client boundary and re-raised as
//! `RequestFailed`, labeled with the `Operation` that was attempted, so callers
//! can show a one-shot message without inspecting transport details.

use std::fmt;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a rejected request
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Remote operation an API call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Authenticate,
    Register,
    FetchRestaurants,
    FetchPlans,
    FetchMySubscriptions,
    PurchaseOrRenewSubscription,
    DeleteSubscription,
    ExpireSubscription,
    QuotePrice,
    SubmitOrder,
}

impl Operation {
    /// Message shown to the user when this operation fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Authenticate => "Login failed",
            Operation::Register => "Registration failed",
            Operation::FetchRestaurants => "Error loading restaurants",
            Operation::FetchPlans => "Error loading available subscriptions",
            Operation::FetchMySubscriptions => "Error loading subscriptions",
            Operation::PurchaseOrRenewSubscription => "Could not renew subscription",
            Operation::DeleteSubscription => "Could not delete subscription",
            Operation::ExpireSubscription => "Could not set subscription to expire",
            Operation::QuotePrice => "Error calculating total price",
            Operation::SubmitOrder => "Error placing the order",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Authenticate => "authenticate",
            Operation::Register => "register",
            Operation::FetchRestaurants => "fetch_restaurants",
            Operation::FetchPlans => "fetch_plans",
            Operation::FetchMySubscriptions => "fetch_my_subscriptions",
            Operation::PurchaseOrRenewSubscription => "purchase_or_renew_subscription",
            Operation::DeleteSubscription => "delete_subscription",
            Operation::ExpireSubscription => "expire_subscription",
            Operation::QuotePrice => "quote_price",
            Operation::SubmitOrder => "submit_order",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata describing how an error should be presented to the user
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "REQUEST_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether the user can simply try the same action again
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// One-shot message shown to the user (may differ from the internal message)
    fn user_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("{} ({operation}): {detail}", .operation.failure_message())]
    RequestFailed {
        operation: Operation,
        status: Option<u16>,
        detail: String,
    },

    #[error("Validation rejected: {0}")]
    ValidationRejected(String),

    #[error("Not eligible: {0}")]
    NotEligible(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session error: {message}")]
    Session {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Label a transport or status failure with the operation it interrupted.
    pub fn request_failed(operation: Operation, status: Option<u16>, err: &anyhow::Error) -> Self {
        ClientError::RequestFailed {
            operation,
            status,
            detail: format!("{:#}", err),
        }
    }

    /// Operation the error belongs to, if it came from a remote call.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            ClientError::RequestFailed { operation, .. } => Some(*operation),
            ClientError::AuthenticationFailed(_) => Some(Operation::Authenticate),
            _ => None,
        }
    }

    pub fn error_type(&self) -> &str {
        match self {
            ClientError::AuthenticationFailed(_) => "AuthenticationFailed",
            ClientError::RequestFailed { .. } => "RequestFailed",
            ClientError::ValidationRejected(_) => "ValidationRejected",
            ClientError::NotEligible(_) => "NotEligible",
            ClientError::NotFound(_) => "NotFound",
            ClientError::Config(_) => "Config",
            ClientError::Session { .. } => "Session",
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::ValidationRejected(format!("Validation error: {}", err))
    }
}

impl From<envy::Error> for ClientError {
    fn from(err: envy::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn client_error_static_metadata(
    err: &ClientError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        ClientError::AuthenticationFailed(_) => (
            "AUTHENTICATION_FAILED",
            false,
            Some("Check your email and password"),
            LogLevel::Debug,
        ),
        ClientError::RequestFailed { .. } => (
            "REQUEST_FAILED",
            true,
            Some("Try again in a moment"),
            LogLevel::Warn,
        ),
        ClientError::ValidationRejected(_) => (
            "VALIDATION_REJECTED",
            false,
            Some("Check the values you entered"),
            LogLevel::Debug,
        ),
        ClientError::NotEligible(_) => (
            "NOT_ELIGIBLE",
            false,
            Some("Review your current subscriptions"),
            LogLevel::Debug,
        ),
        ClientError::NotFound(_) => (
            "NOT_FOUND",
            false,
            Some("Verify the identifier exists"),
            LogLevel::Debug,
        ),
        ClientError::Config(_) => (
            "CONFIG_ERROR",
            false,
            Some("Check DELIVERY_* environment variables"),
            LogLevel::Error,
        ),
        ClientError::Session { .. } => (
            "SESSION_ERROR",
            true,
            Some("Log in again"),
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for ClientError {
    fn error_code(&self) -> &'static str {
        client_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        client_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        client_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        client_error_static_metadata(self).3
    }

    fn user_message(&self) -> String {
        match self {
            ClientError::AuthenticationFailed(_) => "Login failed".to_string(),
            ClientError::RequestFailed { operation, .. } => {
                operation.failure_message().to_string()
            }
            ClientError::ValidationRejected(ref msg) => msg.clone(),
            ClientError::NotEligible(ref msg) => msg.clone(),
            ClientError::NotFound(ref msg) => msg.clone(),
            ClientError::Config(_) => "Client is not configured correctly".to_string(),
            ClientError::Session { .. } => "Could not access the stored session".to_string(),
        }
    }
}
