use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers::{admin_auth, admin_panel};
use crate::middleware::auth::require_admin;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let back_office = Router::new()
        .route("/admin/dashboard", get(admin_panel::dashboard))
        .route("/admin/students", get(admin_panel::students))
        .route("/admin/payments", get(admin_panel::payments))
        .route("/admin/payments/toggle", post(admin_panel::toggle_payment))
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    Router::new()
        .route(
            "/admin/login",
            get(admin_auth::login_status).post(admin_auth::login),
        )
        .route("/admin/logout", post(admin_auth::logout))
        .merge(back_office)
}
