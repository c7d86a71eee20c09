use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::admission;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admission",
            get(admission::admission_form).post(admission::submit_admission),
        )
        .route("/registration-payment", get(admission::registration_payment_page))
        .route("/registration-payment/edit", post(admission::edit_admission))
}
