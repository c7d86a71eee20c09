// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::navigation::Route;

#[derive(Error, Debug)]
pub enum AppError {
    // Validation: caught before any backend call
    #[error("{0}")]
    ValidationError(String),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Enter full 6-digit OTP")]
    IncompleteOtp,

    // Transport
    #[error("Server error")]
    Network(String),

    // Business-rule rejections
    #[error("This email is already registered!")]
    AlreadyRegistered,

    #[error("Please complete registration first.")]
    NotRegistered,

    #[error("You have already paid this month's fee.")]
    AlreadyPaidThisMonth,

    #[error("{0}")]
    OrderFailed(String),

    #[error("{0}")]
    Rejected(String),

    // Lockouts
    #[error("Too many attempts! Try again in {} minutes", .remaining_seconds.div_ceil(60))]
    LoginLocked { remaining_seconds: u64 },

    #[error("Resend OTP in {remaining_seconds}s")]
    ResendCooldown { remaining_seconds: u64 },

    // Guards
    #[error("Session expired, please log in again")]
    Unauthorized { redirect: Route },

    #[error("Verify the OTP before resetting the password")]
    OtpNotVerified,

    // Flow misuse
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Another request is still being processed")]
    RequestInFlight,

    // Ambient
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::PasswordMismatch | AppError::IncompleteOtp => {
                StatusCode::BAD_REQUEST
            }
            AppError::Network(_) => StatusCode::BAD_GATEWAY,
            AppError::AlreadyRegistered
            | AppError::NotRegistered
            | AppError::AlreadyPaidThisMonth => StatusCode::CONFLICT,
            AppError::OrderFailed(_) | AppError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::LoginLocked { .. } | AppError::ResendCooldown { .. } => {
                StatusCode::TOO_MANY_REQUESTS
            }
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::OtpNotVerified => StatusCode::FORBIDDEN,
            AppError::InvalidTransition(_) | AppError::RequestInFlight => StatusCode::CONFLICT,
            AppError::ConfigurationError(_) | AppError::Serialization(_) | AppError::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::PasswordMismatch | AppError::IncompleteOtp => {
                "validation"
            }
            AppError::Network(_) => "network",
            AppError::AlreadyRegistered
            | AppError::NotRegistered
            | AppError::AlreadyPaidThisMonth
            | AppError::OrderFailed(_)
            | AppError::Rejected(_) => "rejected",
            AppError::LoginLocked { .. } | AppError::ResendCooldown { .. } => "locked",
            AppError::Unauthorized { .. } | AppError::OtpNotVerified => "unauthorized",
            AppError::InvalidTransition(_) | AppError::RequestInFlight => "conflict",
            AppError::ConfigurationError(_) | AppError::Serialization(_) | AppError::Session(_) => {
                "internal"
            }
        }
    }

    /// Where the UI should navigate after showing this error, if anywhere.
    pub fn redirect(&self) -> Option<Route> {
        match self {
            AppError::Unauthorized { redirect } => Some(*redirect),
            AppError::OtpNotVerified => Some(Route::ForgotPassword),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let mut body = json!({
            "error": self.kind(),
            "message": self.to_string(),
            "success": false,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        if let Some(route) = self.redirect() {
            body["redirect"] = json!(route.path());
        }

        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(format!("HTTP request failed: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect();
        messages.sort();
        messages.dedup();

        if messages.is_empty() {
            AppError::ValidationError("Invalid form data".to_string())
        } else {
            AppError::ValidationError(messages.join("; "))
        }
    }
}

// Helper conversion functions
impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        AppError::Rejected(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::ConfigurationError(msg.into())
    }

    pub fn transition(msg: impl Into<String>) -> Self {
        AppError::InvalidTransition(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
