use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::Result;
use crate::models::navigation::Redirect;
use crate::models::otp::OtpKey;
use crate::services::client_store::ClientStore;
use crate::services::otp_reset::{self, OtpFlowKey, OtpResetFlow, OtpView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

async fn load(store: &ClientStore, state: &AppState) -> Result<OtpResetFlow> {
    Ok(store.get::<OtpFlowKey>(state.now()).await?.unwrap_or_default())
}

/// Forgot-password mount: always back to step 1.
pub async fn forgot_password_page(State(state): State<AppState>, store: ClientStore) -> Result<Json<OtpView>> {
    let flow = OtpResetFlow::new();
    store.save::<OtpFlowKey>(&flow, state.now()).await?;
    Ok(Json(flow.view(state.now())))
}

pub async fn send_otp(State(state): State<AppState>, store: ClientStore) -> Result<Json<OtpView>> {
    let now = state.now();
    let mut flow = load(&store, &state).await?;
    flow.send(state.backend.as_ref(), now).await?;
    store.save::<OtpFlowKey>(&flow, now).await?;
    Ok(Json(flow.view(now)))
}

pub async fn resend_otp(State(state): State<AppState>, store: ClientStore) -> Result<Json<OtpView>> {
    let now = state.now();
    let mut flow = load(&store, &state).await?;
    flow.resend(state.backend.as_ref(), now).await?;
    store.save::<OtpFlowKey>(&flow, now).await?;
    Ok(Json(flow.view(now)))
}

pub async fn otp_input(
    State(state): State<AppState>,
    store: ClientStore,
    Json(key): Json<OtpKey>,
) -> Result<Json<OtpView>> {
    let now = state.now();
    let mut flow = load(&store, &state).await?;
    flow.input(&key)?;
    store.save::<OtpFlowKey>(&flow, now).await?;
    Ok(Json(flow.view(now)))
}

pub async fn verify_otp(State(state): State<AppState>, store: ClientStore) -> Result<Json<Redirect>> {
    let now = state.now();
    let mut flow = load(&store, &state).await?;
    let route = flow.verify(&store, state.backend.as_ref(), now).await?;
    store.save::<OtpFlowKey>(&flow, now).await?;
    Ok(Json(Redirect::to(route)))
}

/// Reset page mount.
pub async fn reset_password_page(State(state): State<AppState>, store: ClientStore) -> Result<Json<Value>> {
    otp_reset::reset_gate(&store, state.now()).await?;
    Ok(Json(json!({ "verified": true })))
}

pub async fn reset_password(
    State(state): State<AppState>,
    store: ClientStore,
    Json(payload): Json<ResetRequest>,
) -> Result<Json<Redirect>> {
    let redirect = otp_reset::reset_password(
        &store,
        state.backend.as_ref(),
        &payload.password,
        &payload.confirm_password,
        state.now(),
    )
    .await?;
    Ok(Json(redirect))
}
