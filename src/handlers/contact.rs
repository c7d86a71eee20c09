use axum::{extract::State, response::Json};

use crate::errors::Result;
use crate::models::contact::{ContactMessage, ContactReceipt};
use crate::services::contact;
use crate::state::AppState;

pub async fn send_message(
    State(state): State<AppState>,
    Json(payload): Json<ContactMessage>,
) -> Result<Json<ContactReceipt>> {
    Ok(Json(contact::send_message(state.backend.as_ref(), &payload).await?))
}
