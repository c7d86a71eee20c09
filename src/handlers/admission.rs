use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::errors::Result;
use crate::models::navigation::{Redirect, Route};
use crate::models::payment::REGISTRATION_FEE;
use crate::models::student::StudentDetails;
use crate::services::client_store::ClientStore;
use crate::services::payment::{PaymentFlow, PaymentFlowKey};
use crate::services::registration;
use crate::state::AppState;

/// Admission form mount. The draft is only prefilled when editing.
pub async fn admission_form(State(state): State<AppState>, store: ClientStore) -> Result<Json<Value>> {
    let draft = registration::load_draft_if_editing(&store, state.now()).await?;
    Ok(Json(json!({ "draft": draft })))
}

pub async fn submit_admission(
    State(state): State<AppState>,
    store: ClientStore,
    Json(payload): Json<StudentDetails>,
) -> Result<Json<Redirect>> {
    let route = registration::submit(payload, &store, state.backend.as_ref(), state.now()).await?;
    Ok(Json(Redirect::to(route)))
}

/// Registration payment mount: shows the draft and starts a fresh attempt.
/// Without a draft the UI is sent back to the admission form.
pub async fn registration_payment_page(
    State(state): State<AppState>,
    store: ClientStore,
) -> Result<Json<Value>> {
    let now = state.now();
    let payment = PaymentFlow::new();
    store.save::<PaymentFlowKey>(&payment, now).await?;
    let draft = registration::current_draft(&store, now).await?;

    let mut body = json!({
        "draft": draft,
        "fee": REGISTRATION_FEE,
        "payment": payment.state(),
    });
    if draft.is_none() {
        body["redirect"] = json!(Route::Admission);
    }
    Ok(Json(body))
}

pub async fn edit_admission(State(state): State<AppState>, store: ClientStore) -> Result<Json<Redirect>> {
    let route = registration::request_edit(&store, state.now()).await?;
    Ok(Json(Redirect::to(route)))
}
