//! Admin password login with a bounded-retry lockout.
//!
//! Three consecutive failures lock the form for five minutes. The lock is
//! evaluated against the clock, so it lifts on its own and nothing the user
//! submits in the meantime can shorten or extend it. Failures are counted per
//! peer address, so a fresh session does not reset the count.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::errors::{AppError, Result};
use crate::models::admin::AdminSession;
use crate::models::navigation::Route;
use crate::services::backend::Backend;
use crate::services::client_store::{AdminSessionKey, ClientStore};

pub const MAX_ATTEMPTS: u32 = 3;
pub const LOCK_DURATION_SECS: i64 = 5 * 60;

/// Key used when the peer address is not known.
pub const UNKNOWN_PEER: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginGuard {
    attempts: u32,
    last_failure: Option<DateTime<Utc>>,
    locked_until: Option<DateTime<Utc>>,
}

impl LoginGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lift an elapsed lock; counter goes back to zero with it. Failures
    /// older than the lock window are forgotten too.
    fn refresh(&mut self, now: DateTime<Utc>) {
        let window = Duration::seconds(LOCK_DURATION_SECS);
        match (self.locked_until, self.last_failure) {
            (Some(until), _) if now >= until => {
                info!("Admin login lock lifted");
                *self = Self::default();
            }
            (None, Some(last)) if now - last >= window => {
                *self = Self::default();
            }
            _ => {}
        }
    }

    pub fn attempts(&mut self, now: DateTime<Utc>) -> u32 {
        self.refresh(now);
        self.attempts
    }

    /// Seconds left on the lock, if locked.
    pub fn locked_for(&mut self, now: DateTime<Utc>) -> Option<u64> {
        self.refresh(now);
        self.locked_until
            .map(|until| (until - now).num_seconds().max(0) as u64)
    }

    pub fn is_locked(&mut self, now: DateTime<Utc>) -> bool {
        self.locked_for(now).is_some()
    }

    /// Anything worth remembering for this peer.
    fn is_active(&mut self, now: DateTime<Utc>) -> bool {
        self.refresh(now);
        *self != Self::default()
    }

    fn record_failure(&mut self, now: DateTime<Utc>) {
        self.attempts += 1;
        self.last_failure = Some(now);
        if self.attempts >= MAX_ATTEMPTS {
            warn!("Admin login locked after {} failed attempts", self.attempts);
            self.locked_until = Some(now + Duration::seconds(LOCK_DURATION_SECS));
        }
    }

    /// Submit a password. While locked no backend call is made.
    pub async fn login(
        &mut self,
        password: &str,
        store: &ClientStore,
        backend: &dyn Backend,
        now: DateTime<Utc>,
    ) -> Result<Route> {
        if let Some(remaining_seconds) = self.locked_for(now) {
            return Err(AppError::LoginLocked { remaining_seconds });
        }
        if password.is_empty() {
            return Err(AppError::invalid_data("Enter password"));
        }

        match backend.admin_login(password).await {
            Ok(()) => {
                *self = Self::default();
                store.set::<AdminSessionKey>(&AdminSession::started_at(now), now).await?;
                info!("Admin logged in");
                Ok(Route::Dashboard)
            }
            Err(AppError::Rejected(message)) => {
                self.record_failure(now);
                match self.locked_for(now) {
                    Some(remaining_seconds) => Err(AppError::LoginLocked { remaining_seconds }),
                    None => Err(AppError::Rejected(message)),
                }
            }
            // transport failures are not counted against the user
            Err(e) => Err(e),
        }
    }
}

/// Login guards by peer address. Entries with nothing left to remember are
/// dropped whenever a guard is taken.
#[derive(Debug, Clone, Default)]
pub struct LoginThrottle {
    peers: Arc<StdMutex<HashMap<IpAddr, Arc<Mutex<LoginGuard>>>>>,
}

impl LoginThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive use of `peer`'s guard. A second login from the same address
    /// while one is still running is refused.
    pub fn guard(&self, peer: IpAddr, now: DateTime<Utc>) -> Result<OwnedMutexGuard<LoginGuard>> {
        let mut peers = self.peers.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let before = peers.len();
        peers.retain(|_, guard| match guard.try_lock() {
            Ok(mut guard) => guard.is_active(now),
            Err(_) => true,
        });
        if peers.len() < before {
            debug!("Forgot {} quiet login peers", before - peers.len());
        }

        peers
            .entry(peer)
            .or_default()
            .clone()
            .try_lock_owned()
            .map_err(|_| AppError::RequestInFlight)
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.peers.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }
}
