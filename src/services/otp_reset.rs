//! Admin password recovery.
//!
//! ```text
//! RequestOtp --send--> AwaitOtp --verify--> [OtpVerifiedKey] --reset--> login
//!     ^                  |  ^
//!     +--- mount --------+  +-- resend (after cooldown)
//! ```
//!
//! The step is not persisted: opening the page again starts over at step 1.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{AppError, Result};
use crate::models::navigation::{Redirect, Route};
use crate::models::otp::{OtpInput, OtpKey, OtpVerification};
use crate::services::backend::Backend;
use crate::services::client_store::{ClientStore, OtpVerifiedKey, Scope, StoreKey};

pub const RESEND_COOLDOWN_SECS: i64 = 30;
pub const LOGIN_REDIRECT_DELAY_MS: u64 = 1200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OtpStep {
    #[default]
    RequestOtp,
    AwaitOtp,
}

impl OtpStep {
    /// 1-based index shown by the step indicator.
    pub fn number(self) -> u8 {
        match self {
            OtpStep::RequestOtp => 1,
            OtpStep::AwaitOtp => 2,
        }
    }
}

/// Fixed-length countdown started whenever an OTP goes out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResendCooldown {
    ends_at: Option<DateTime<Utc>>,
}

impl ResendCooldown {
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.ends_at = Some(now + Duration::seconds(RESEND_COOLDOWN_SECS));
    }

    /// Whole seconds left, rounded up; zero once elapsed.
    pub fn remaining(&self, now: DateTime<Utc>) -> u64 {
        match self.ends_at {
            Some(end) if end > now => {
                let millis = (end - now).num_milliseconds() as u64;
                millis.div_ceil(1000)
            }
            _ => 0,
        }
    }

    pub fn is_running(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now) > 0
    }
}

/// What the forgot-password page renders. The UI shows its own pending
/// state while a send or resend is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpView {
    pub step: OtpStep,
    pub step_number: u8,
    pub otp: OtpInput,
    pub resend_in_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpResetFlow {
    step: OtpStep,
    otp: OtpInput,
    cooldown: ResendCooldown,
}

pub struct OtpFlowKey;

impl StoreKey for OtpFlowKey {
    const NAME: &'static str = "otpReset";
    const SCOPE: Scope = Scope::Local;
    type Value = OtpResetFlow;
}

impl OtpResetFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> OtpStep {
        self.step
    }

    pub fn otp(&self) -> &OtpInput {
        &self.otp
    }

    pub fn view(&self, now: DateTime<Utc>) -> OtpView {
        OtpView {
            step: self.step,
            step_number: self.step.number(),
            otp: self.otp.clone(),
            resend_in_secs: self.cooldown.remaining(now),
        }
    }

    /// Page mount.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Step 1: ask the backend to send an OTP. A failure keeps the user on
    /// step 1 with the server's message.
    pub async fn send(&mut self, backend: &dyn Backend, now: DateTime<Utc>) -> Result<OtpStep> {
        if self.step != OtpStep::RequestOtp {
            return Err(AppError::transition("OTP already sent, use resend"));
        }

        backend.forgot_password().await?;

        info!("Password reset OTP sent");
        self.step = OtpStep::AwaitOtp;
        self.otp.clear();
        self.cooldown.start(now);
        Ok(self.step)
    }

    /// Step 2: send a fresh OTP once the cooldown has run out.
    pub async fn resend(&mut self, backend: &dyn Backend, now: DateTime<Utc>) -> Result<u64> {
        if self.step != OtpStep::AwaitOtp {
            return Err(AppError::transition("request an OTP first"));
        }
        let remaining_seconds = self.cooldown.remaining(now);
        if remaining_seconds > 0 {
            return Err(AppError::ResendCooldown { remaining_seconds });
        }

        backend.forgot_password().await?;

        debug!("Password reset OTP resent");
        self.cooldown.start(now);
        Ok(self.cooldown.remaining(now))
    }

    /// Step 2: one key event on the OTP boxes. Ignored events leave the
    /// boxes untouched.
    pub fn input(&mut self, key: &OtpKey) -> Result<&OtpInput> {
        if self.step != OtpStep::AwaitOtp {
            return Err(AppError::transition("request an OTP first"));
        }
        if !self.otp.apply(key) {
            debug!("OTP key event ignored");
        }
        Ok(&self.otp)
    }

    /// Step 2: verify the entered code. An incomplete code never reaches the
    /// backend; a rejected one keeps the user on step 2.
    pub async fn verify(
        &mut self,
        store: &ClientStore,
        backend: &dyn Backend,
        now: DateTime<Utc>,
    ) -> Result<Route> {
        if self.step != OtpStep::AwaitOtp {
            return Err(AppError::transition("request an OTP first"));
        }
        let code = self.otp.code().ok_or(AppError::IncompleteOtp)?;

        let temp_token = match backend.verify_otp(&code).await {
            Ok(token) => token,
            Err(e) => {
                warn!("OTP verification failed");
                return Err(e);
            }
        };

        store.set::<OtpVerifiedKey>(&OtpVerification { verified: true, temp_token }, now).await?;
        info!("OTP verified");
        self.reset();
        Ok(Route::ResetPassword)
    }
}

/// Reset page mount: only reachable with a live verified marker.
pub async fn reset_gate(store: &ClientStore, now: DateTime<Utc>) -> Result<()> {
    match store.get::<OtpVerifiedKey>(now).await? {
        Some(marker) if marker.verified => Ok(()),
        _ => Err(AppError::OtpNotVerified),
    }
}

/// Step 3: set the new password. The marker is consumed only on success.
pub async fn reset_password(
    store: &ClientStore,
    backend: &dyn Backend,
    password: &str,
    confirmation: &str,
    now: DateTime<Utc>,
) -> Result<Redirect> {
    reset_gate(store, now).await?;

    if password.is_empty() || confirmation.is_empty() {
        return Err(AppError::invalid_data("Please fill in both password fields."));
    }
    if password != confirmation {
        return Err(AppError::PasswordMismatch);
    }

    backend.reset_password(password).await?;

    store.remove::<OtpVerifiedKey>().await?;
    info!("Admin password reset");
    Ok(Redirect::delayed(Route::AdminLogin, LOGIN_REDIRECT_DELAY_MS))
}
