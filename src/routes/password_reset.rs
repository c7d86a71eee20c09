use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::otp;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/forgot-password", get(otp::forgot_password_page))
        .route("/forgot-password/send", post(otp::send_otp))
        .route("/forgot-password/resend", post(otp::resend_otp))
        .route("/forgot-password/input", post(otp::otp_input))
        .route("/forgot-password/verify", post(otp::verify_otp))
        .route(
            "/reset-password",
            get(otp::reset_password_page).post(otp::reset_password),
        )
}
