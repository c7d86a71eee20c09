use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use time::Duration;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::PortalConfig;
use crate::errors::Result;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "pathshala.sid";

/// Cookie-backed session per browser. Records live in memory and lapse after
/// the configured idle time; a session is only stored once something is
/// written to it.
pub fn session_layer(config: &PortalConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_secure(config.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(config.session_idle_minutes)))
}

/// One action per browser at a time; an overlapping request gets 409.
pub async fn one_at_a_time(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response> {
    let _slot = session.id().map(|id| state.in_flight.claim(id)).transpose()?;
    Ok(next.run(request).await)
}
