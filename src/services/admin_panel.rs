//! Back-office reads and the paid/unpaid toggle. Every function here runs
//! behind the admin session guard.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{AppError, Result};
use crate::models::admin::{AdminStudent, DashboardSummary, PaymentRow, PaymentStatus, StudentFilter};
use crate::models::payment::BillingMonth;
use crate::services::backend::Backend;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsPage {
    pub month: BillingMonth,
    pub rows: Vec<PaymentRow>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub student_id: String,
    pub month: BillingMonth,
    /// Status the table showed; lets the reply carry the new one.
    #[serde(default)]
    pub current: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub student_id: String,
    pub month: BillingMonth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
}

pub async fn dashboard(backend: &dyn Backend) -> Result<DashboardSummary> {
    backend.dashboard().await
}

pub async fn students(backend: &dyn Backend, filter: &StudentFilter) -> Result<Vec<AdminStudent>> {
    let all = backend.students().await?;
    Ok(filter.apply(all))
}

/// Payment status per student for `month`, the current local month when absent.
pub async fn payments(
    backend: &dyn Backend,
    month: Option<BillingMonth>,
    filter: &StudentFilter,
    now: DateTime<FixedOffset>,
) -> Result<PaymentsPage> {
    let month = month.unwrap_or_else(|| BillingMonth::containing(&now));
    let rows = backend.payments(month).await?;
    Ok(PaymentsPage { month, rows: filter.apply(rows) })
}

pub async fn toggle_payment(backend: &dyn Backend, request: ToggleRequest) -> Result<ToggleOutcome> {
    if request.student_id.trim().is_empty() {
        return Err(AppError::invalid_data("Student id is required"));
    }

    if !backend.toggle_payment(&request.student_id, request.month).await? {
        warn!("Toggle refused for {} in {}", request.student_id, request.month);
        return Err(AppError::rejected("Toggle failed"));
    }

    info!("Payment status toggled for {} in {}", request.student_id, request.month);
    Ok(ToggleOutcome {
        student_id: request.student_id,
        month: request.month,
        status: request.current.map(PaymentStatus::toggled),
    })
}
