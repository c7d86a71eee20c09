pub mod admin;
pub mod admission;
pub mod password_reset;
pub mod payment;

use axum::{
    http::Method,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::middleware::session::{one_at_a_time, session_layer};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false);

    let flows = Router::new()
        .merge(admission::routes())
        .merge(payment::routes())
        .merge(password_reset::routes())
        .merge(admin::routes(state.clone()))
        .route("/contact", post(handlers::contact::send_message))
        .layer(middleware::from_fn_with_state(state.clone(), one_at_a_time))
        .layer(session_layer(&state.config));

    let portal = Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(flows);

    Router::new()
        .nest("/api/portal", portal)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
