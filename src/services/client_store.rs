//! Typed view over the browser's session.
//!
//! Each entry is addressed by a [`StoreKey`] type, so the value type and the
//! retention scope travel with the key instead of living in string literals at
//! every call site. Values live in the `tower_sessions` record as JSON; an
//! entry that no longer deserializes into its key's type reads as absent.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::models::admin::AdminSession;
use crate::models::otp::OtpVerification;
use crate::models::student::StudentDetails;

/// How long an entry survives inside the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Kept as long as the session.
    Local,
    /// Dropped once older than `ttl_secs`.
    Session { ttl_secs: i64 },
}

pub trait StoreKey {
    const NAME: &'static str;
    const SCOPE: Scope;
    type Value: Serialize + DeserializeOwned;
}

/// Draft Registration awaiting the registration payment.
pub struct AdmissionDraftKey;

impl StoreKey for AdmissionDraftKey {
    const NAME: &'static str = "admissionData";
    const SCOPE: Scope = Scope::Local;
    type Value = StudentDetails;
}

/// One-shot "edit admission details" flag.
pub struct EditAdmissionKey;

impl StoreKey for EditAdmissionKey {
    const NAME: &'static str = "editAdmission";
    const SCOPE: Scope = Scope::Local;
    type Value = bool;
}

pub struct AdminSessionKey;

impl StoreKey for AdminSessionKey {
    const NAME: &'static str = "adminSession";
    const SCOPE: Scope = Scope::Local;
    type Value = AdminSession;
}

/// Verified-OTP marker and temp token.
pub struct OtpVerifiedKey;

impl StoreKey for OtpVerifiedKey {
    const NAME: &'static str = "otpVerified";
    const SCOPE: Scope = Scope::Session { ttl_secs: 10 * 60 };
    type Value = OtpVerification;
}

/// Session-scoped entries carry their write time.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Stamped<T> {
    value: T,
    written_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ClientStore {
    session: Session,
}

impl ClientStore {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Read the value under `K`, dropping it if it expired or is unreadable.
    pub async fn get<K: StoreKey>(&self, now: DateTime<Utc>) -> Result<Option<K::Value>> {
        let Some(raw) = self.session.get_value(K::NAME).await? else {
            return Ok(None);
        };

        let decoded = match K::SCOPE {
            Scope::Local => serde_json::from_value::<K::Value>(raw).map(Some),
            Scope::Session { ttl_secs } => serde_json::from_value::<Stamped<K::Value>>(raw)
                .map(|entry| (now - entry.written_at <= Duration::seconds(ttl_secs)).then_some(entry.value)),
        };

        match decoded {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => {
                debug!("Store entry {} expired", K::NAME);
                self.session.remove_value(K::NAME).await?;
                Ok(None)
            }
            Err(e) => {
                warn!("Dropping unreadable store entry {}: {}", K::NAME, e);
                self.session.remove_value(K::NAME).await?;
                Ok(None)
            }
        }
    }

    pub async fn set<K: StoreKey>(&self, value: &K::Value, now: DateTime<Utc>) -> Result<()> {
        let raw = match K::SCOPE {
            Scope::Local => serde_json::to_value(value)?,
            Scope::Session { .. } => serde_json::to_value(Stamped { value, written_at: now })?,
        };
        self.session.insert_value(K::NAME, raw).await?;
        Ok(())
    }

    /// Write flow state; a value back at its default clears the entry so an
    /// untouched browser leaves nothing behind.
    pub async fn save<K>(&self, value: &K::Value, now: DateTime<Utc>) -> Result<()>
    where
        K: StoreKey,
        K::Value: Default + PartialEq,
    {
        if *value == K::Value::default() {
            self.remove::<K>().await?;
            return Ok(());
        }
        self.set::<K>(value, now).await
    }

    /// Returns whether an entry was present.
    pub async fn remove<K: StoreKey>(&self) -> Result<bool> {
        if self.session.get_value(K::NAME).await?.is_none() {
            return Ok(false);
        }
        Ok(self.session.remove_value(K::NAME).await?.is_some())
    }

    /// Read and remove in one step.
    pub async fn take<K: StoreKey>(&self, now: DateTime<Utc>) -> Result<Option<K::Value>> {
        let value = self.get::<K>(now).await?;
        self.remove::<K>().await?;
        Ok(value)
    }

    pub async fn contains<K: StoreKey>(&self, now: DateTime<Utc>) -> Result<bool> {
        Ok(self.get::<K>(now).await?.is_some())
    }

    #[cfg(test)]
    pub(crate) async fn is_empty(&self) -> bool {
        self.session.is_empty().await
    }

    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        use std::sync::Arc;
        use tower_sessions::MemoryStore;

        Self::new(Session::new(None, Arc::new(MemoryStore::default()), None))
    }

    #[cfg(test)]
    pub(crate) async fn insert_raw(&self, name: &str, value: serde_json::Value) {
        self.session.insert_value(name, value).await.unwrap();
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientStore
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> std::result::Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(ClientStore::new)
    }
}
