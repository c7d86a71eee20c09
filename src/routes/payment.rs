use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::payment;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/registration-payment/pay", post(payment::pay_registration))
        .route("/payment/monthly", get(payment::monthly_page))
        .route("/payment/monthly/fee", get(payment::monthly_fee))
        .route("/payment/monthly/pay", post(payment::pay_monthly))
        .route("/payment/complete", post(payment::complete_payment))
        .route("/payment/state", get(payment::payment_state))
}
