use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;

use crate::errors::Result;
use crate::models::admin::{AdminStudent, DashboardSummary, StudentFilter};
use crate::models::payment::BillingMonth;
use crate::services::admin_panel::{self, PaymentsPage, ToggleOutcome, ToggleRequest};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PaymentsQuery {
    pub month: Option<BillingMonth>,
    pub search: Option<String>,
    pub class: Option<String>,
}

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardSummary>> {
    Ok(Json(admin_panel::dashboard(state.backend.as_ref()).await?))
}

pub async fn students(
    State(state): State<AppState>,
    Query(filter): Query<StudentFilter>,
) -> Result<Json<Vec<AdminStudent>>> {
    Ok(Json(admin_panel::students(state.backend.as_ref(), &filter).await?))
}

pub async fn payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentsQuery>,
) -> Result<Json<PaymentsPage>> {
    let filter = StudentFilter { search: query.search, class: query.class };
    let page =
        admin_panel::payments(state.backend.as_ref(), query.month, &filter, state.local_now())
            .await?;
    Ok(Json(page))
}

pub async fn toggle_payment(
    State(state): State<AppState>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ToggleOutcome>> {
    Ok(Json(admin_panel::toggle_payment(state.backend.as_ref(), payload).await?))
}
