use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::errors::{AppError, Result};
use crate::models::navigation::Route;
use crate::models::payment::FeeType;
use crate::models::student::StudentDetails;
use crate::services::backend::Backend;
use crate::services::client_store::{AdmissionDraftKey, ClientStore, EditAdmissionKey};
use crate::services::payment::PaymentVariant;

/// Admission form mount: returns the saved draft when the user came back via
/// "Edit Admission Details". The edit flag is consumed either way.
pub async fn load_draft_if_editing(store: &ClientStore, now: DateTime<Utc>) -> Result<Option<StudentDetails>> {
    match store.take::<EditAdmissionKey>(now).await? {
        Some(true) => store.get::<AdmissionDraftKey>(now).await,
        _ => Ok(None),
    }
}

/// Admission form submit. On success the draft is saved and the user moves
/// on to the registration payment.
pub async fn submit(
    draft: StudentDetails,
    store: &ClientStore,
    backend: &dyn Backend,
    now: DateTime<Utc>,
) -> Result<Route> {
    draft.ensure_valid()?;

    let status = backend.student_status(&draft.email).await?;
    if status.registered {
        warn!("Admission refused, {} is already registered", draft.email);
        return Err(AppError::AlreadyRegistered);
    }

    store.set::<AdmissionDraftKey>(&draft, now).await?;
    info!("Admission draft saved for {}", draft.email);
    Ok(Route::RegistrationPayment)
}

/// "Edit Admission Details" on the registration payment page.
pub async fn request_edit(store: &ClientStore, now: DateTime<Utc>) -> Result<Route> {
    store.set::<EditAdmissionKey>(&true, now).await?;
    Ok(Route::Admission)
}

pub async fn current_draft(store: &ClientStore, now: DateTime<Utc>) -> Result<Option<StudentDetails>> {
    store.get::<AdmissionDraftKey>(now).await
}

/// Registration fee: the payer is the stored draft, already checked on submit.
pub struct RegistrationVariant {
    draft: Option<StudentDetails>,
}

impl RegistrationVariant {
    pub async fn from_store(store: &ClientStore, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self { draft: current_draft(store, now).await? })
    }
}

#[async_trait]
impl PaymentVariant for RegistrationVariant {
    fn fee_type(&self) -> FeeType {
        FeeType::Registration
    }

    async fn verify(&mut self, _backend: &dyn Backend) -> Result<StudentDetails> {
        let draft = self
            .draft
            .clone()
            .ok_or_else(|| AppError::invalid_data("Please fill in the admission form first."))?;
        draft.ensure_valid()?;
        Ok(draft)
    }
}
