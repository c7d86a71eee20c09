use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::errors::Result;
use crate::models::admin::AdminSession;
use crate::models::navigation::Route;
use crate::services::client_store::{AdminSessionKey, ClientStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow(AdminSession),
    Redirect(Route),
}

/// Gate for protected admin views. Absent, unflagged or expired sessions
/// redirect to the login page; an invalid marker is cleared on the way.
pub async fn check_admin(store: &ClientStore, now: DateTime<Utc>) -> Result<GuardOutcome> {
    let Some(session) = store.get::<AdminSessionKey>(now).await? else {
        debug!("No admin session, redirecting to login");
        return Ok(GuardOutcome::Redirect(Route::AdminLogin));
    };

    if !session.is_valid(now) {
        info!("Admin session from {} is no longer valid", session.login_time);
        store.remove::<AdminSessionKey>().await?;
        return Ok(GuardOutcome::Redirect(Route::AdminLogin));
    }

    Ok(GuardOutcome::Allow(session))
}

/// Explicit logout from the back-office sidebar.
pub async fn logout(store: &ClientStore) -> Result<Route> {
    if store.remove::<AdminSessionKey>().await? {
        info!("Admin logged out");
    }
    Ok(Route::AdminLogin)
}
