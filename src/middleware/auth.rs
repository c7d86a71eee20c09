use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::errors::{AppError, Result};
use crate::services::client_store::ClientStore;
use crate::services::session_guard::{check_admin, GuardOutcome};
use crate::state::AppState;

/// Runs before any back-office handler.
pub async fn require_admin(
    State(state): State<AppState>,
    store: ClientStore,
    request: Request,
    next: Next,
) -> Result<Response> {
    match check_admin(&store, state.now()).await? {
        GuardOutcome::Allow(_) => Ok(next.run(request).await),
        GuardOutcome::Redirect(redirect) => Err(AppError::Unauthorized { redirect }),
    }
}
