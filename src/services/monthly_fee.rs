use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{AppError, Result};
use crate::models::payment::{already_paid_this_month, monthly_fee_for_label, FeeType};
use crate::models::student::{MonthlyPayment, StudentDetails};
use crate::services::backend::Backend;
use crate::services::client_store::{Scope, StoreKey};
use crate::services::payment::PaymentVariant;

/// The monthly fee form. Editable until the backend confirms the student is
/// registered; from then on it shows the backend's record and ignores edits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyForm {
    details: StudentDetails,
    registered: bool,
    monthly_payments: Vec<MonthlyPayment>,
}

pub struct MonthlyFormKey;

impl StoreKey for MonthlyFormKey {
    const NAME: &'static str = "monthlyForm";
    const SCOPE: Scope = Scope::Local;
    type Value = MonthlyForm;
}

/// Fee shown next to the pay button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeQuote {
    pub class: String,
    pub monthly_fee: u32,
}

pub fn fee_quote(class: &str) -> FeeQuote {
    FeeQuote {
        class: class.to_string(),
        monthly_fee: monthly_fee_for_label(class),
    }
}

impl MonthlyForm {
    pub fn details(&self) -> &StudentDetails {
        &self.details
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn fee(&self) -> u32 {
        monthly_fee_for_label(&self.details.class)
    }

    /// Returns false when the form is locked to a verified record.
    pub fn update(&mut self, details: StudentDetails) -> bool {
        if self.registered {
            return false;
        }
        self.details = details;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Monthly fee: re-verifies the student against the backend and refuses a
/// second payment in the same calendar month.
pub struct MonthlyVariant<'a> {
    form: &'a mut MonthlyForm,
    now: DateTime<FixedOffset>,
}

impl<'a> MonthlyVariant<'a> {
    pub fn new(form: &'a mut MonthlyForm, now: DateTime<FixedOffset>) -> Self {
        Self { form, now }
    }
}

#[async_trait]
impl PaymentVariant for MonthlyVariant<'_> {
    fn fee_type(&self) -> FeeType {
        FeeType::Monthly
    }

    async fn verify(&mut self, backend: &dyn Backend) -> Result<StudentDetails> {
        self.form.details.ensure_valid()?;

        let status = backend.student_status_by_details(&self.form.details).await?;
        let student = match status.student {
            Some(student) if status.registered => student,
            _ => {
                warn!("Monthly payment refused, {} is not registered", self.form.details.email);
                self.form.registered = false;
                return Err(AppError::NotRegistered);
            }
        };

        self.form.details = student.details();
        self.form.monthly_payments = student.monthly_payments.clone();
        self.form.registered = true;

        if already_paid_this_month(&student.monthly_payments, &self.now) {
            warn!("{} already paid for {}", student.email, self.now.format("%Y-%m"));
            return Err(AppError::AlreadyPaidThisMonth);
        }

        info!(
            "Monthly fee of {} verified for {} ({})",
            self.form.fee(),
            student.email,
            student.class
        );
        Ok(self.form.details.clone())
    }
}
