use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::Result;
use crate::models::navigation::Redirect;
use crate::services::client_store::ClientStore;
use crate::services::login_guard::{MAX_ATTEMPTS, UNKNOWN_PEER};
use crate::services::session_guard;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

fn peer_ip(peer: Option<ConnectInfo<SocketAddr>>) -> std::net::IpAddr {
    peer.map(|ConnectInfo(addr)| addr.ip()).unwrap_or(UNKNOWN_PEER)
}

/// Login page mount: whether the form is currently locked.
pub async fn login_status(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> Result<Json<Value>> {
    let now = state.now();
    let mut guard = state.logins.guard(peer_ip(peer), now)?;
    let locked_for = guard.locked_for(now);
    Ok(Json(json!({
        "locked": locked_for.is_some(),
        "remainingSeconds": locked_for.unwrap_or(0),
        "attempts": guard.attempts(now),
        "maxAttempts": MAX_ATTEMPTS,
    })))
}

pub async fn login(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    store: ClientStore,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Redirect>> {
    let now = state.now();
    let mut guard = state.logins.guard(peer_ip(peer), now)?;
    let route = guard
        .login(&payload.password, &store, state.backend.as_ref(), now)
        .await?;
    Ok(Json(Redirect::to(route)))
}

pub async fn logout(store: ClientStore) -> Result<Json<Redirect>> {
    Ok(Json(Redirect::to(session_guard::logout(&store).await?)))
}
