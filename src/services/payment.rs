//! Payment initiation shared by the registration and monthly fee pages.
//!
//! ```text
//! Idle -> Verifying -> OrderCreated -> CheckoutOpen -> Success
//!             |             |
//!             +-------------+---------> Failed
//! ```
//!
//! The variant supplies the verification step and the fee label; everything
//! else (order creation, the checkout descriptor, completion) is common.
//! A failed attempt is terminal: the user resubmits to try again.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::CheckoutSettings;
use crate::errors::{AppError, Result};
use crate::models::payment::{CreateOrderRequest, FeeType, PaymentOrder};
use crate::models::student::StudentDetails;
use crate::services::backend::Backend;
use crate::services::client_store::{AdmissionDraftKey, ClientStore, Scope, StoreKey};

/// Descriptor handed to the checkout widget. The widget's `handler` callback
/// is wired up by the UI, which reports completion back to the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutOptions {
    pub key: String,
    pub amount: u64,
    pub currency: String,
    pub order_id: String,
    pub name: String,
    pub description: String,
    pub prefill: Prefill,
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub color: String,
}

impl CheckoutOptions {
    pub fn new(
        settings: &CheckoutSettings,
        order: &PaymentOrder,
        description: &str,
        payer: &StudentDetails,
    ) -> Self {
        CheckoutOptions {
            key: settings.key.clone(),
            amount: order.amount,
            currency: order.currency.clone(),
            order_id: order.id.clone(),
            name: settings.name.clone(),
            description: description.to_string(),
            prefill: Prefill {
                name: payer.name.clone(),
                email: payer.email.clone(),
                contact: payer.phone.clone(),
            },
            theme: Theme { color: settings.theme_color.clone() },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum PaymentState {
    #[default]
    Idle,
    #[serde(rename_all = "camelCase")]
    Verifying { fee_type: FeeType },
    #[serde(rename_all = "camelCase")]
    OrderCreated { fee_type: FeeType, order: PaymentOrder },
    #[serde(rename_all = "camelCase")]
    CheckoutOpen { fee_type: FeeType, checkout: CheckoutOptions },
    #[serde(rename_all = "camelCase")]
    Success { fee_type: FeeType, order_id: String },
    #[serde(rename_all = "camelCase")]
    Failed { fee_type: FeeType, reason: String },
}

impl PaymentState {
    pub fn name(&self) -> &'static str {
        match self {
            PaymentState::Idle => "idle",
            PaymentState::Verifying { .. } => "verifying",
            PaymentState::OrderCreated { .. } => "orderCreated",
            PaymentState::CheckoutOpen { .. } => "checkoutOpen",
            PaymentState::Success { .. } => "success",
            PaymentState::Failed { .. } => "failed",
        }
    }
}

/// What differs between the registration and monthly payment pages.
#[async_trait]
pub trait PaymentVariant: Send {
    fn fee_type(&self) -> FeeType;

    fn description(&self) -> &'static str {
        self.fee_type().description()
    }

    /// Establish who is paying. Runs before any order is created.
    async fn verify(&mut self, backend: &dyn Backend) -> Result<StudentDetails>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentFlow {
    state: PaymentState,
}

/// The payment attempt of the page the browser is on.
pub struct PaymentFlowKey;

impl StoreKey for PaymentFlowKey {
    const NAME: &'static str = "paymentFlow";
    const SCOPE: Scope = Scope::Local;
    type Value = PaymentFlow;
}

impl PaymentFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PaymentState {
        &self.state
    }

    /// Back to `Idle`, e.g. when the payment page is opened again.
    pub fn reset(&mut self) {
        self.state = PaymentState::Idle;
    }

    fn transition(&mut self, next: PaymentState) {
        debug!("Payment {} -> {}", self.state.name(), next.name());
        self.state = next;
    }

    fn fail(&mut self, fee_type: FeeType, err: AppError) -> AppError {
        warn!("{:?} payment attempt failed: {}", fee_type, err);
        self.transition(PaymentState::Failed { fee_type, reason: err.to_string() });
        err
    }

    /// Run one attempt up to the point where the checkout widget opens.
    ///
    /// A checkout left open by an abandoned attempt is replaced.
    pub async fn start<V>(
        &mut self,
        variant: &mut V,
        backend: &dyn Backend,
        settings: &CheckoutSettings,
    ) -> Result<CheckoutOptions>
    where
        V: PaymentVariant + ?Sized,
    {
        let fee_type = variant.fee_type();
        self.transition(PaymentState::Verifying { fee_type });

        let payer = match variant.verify(backend).await {
            Ok(payer) => payer,
            Err(e) => return Err(self.fail(fee_type, e)),
        };
        if !payer.is_complete() {
            let err = AppError::invalid_data("Please enter all student details.");
            return Err(self.fail(fee_type, err));
        }

        let request = CreateOrderRequest::new(&payer, fee_type);
        let order = match backend.create_order(&request).await {
            Ok(order) => order,
            Err(e) => return Err(self.fail(fee_type, e)),
        };
        self.transition(PaymentState::OrderCreated { fee_type, order: order.clone() });

        let checkout = CheckoutOptions::new(settings, &order, variant.description(), &payer);
        self.transition(PaymentState::CheckoutOpen { fee_type, checkout: checkout.clone() });
        info!("Checkout opened for order {}", order.id);
        Ok(checkout)
    }

    /// The widget's success callback. Only an open checkout with the same
    /// order id can complete, so a repeated callback is rejected.
    pub async fn complete(&mut self, order_id: &str, store: &ClientStore) -> Result<FeeType> {
        let fee_type = match &self.state {
            PaymentState::CheckoutOpen { fee_type, checkout } if checkout.order_id == order_id => {
                *fee_type
            }
            PaymentState::CheckoutOpen { .. } => {
                return Err(AppError::transition("order does not match the open checkout"));
            }
            other => {
                return Err(AppError::transition(format!(
                    "no checkout is open (payment is {})",
                    other.name()
                )));
            }
        };

        if fee_type == FeeType::Registration && store.remove::<AdmissionDraftKey>().await? {
            debug!("Admission draft discarded after payment");
        }
        info!("{:?} payment for order {} completed", fee_type, order_id);
        self.transition(PaymentState::Success { fee_type, order_id: order_id.to_string() });
        Ok(fee_type)
    }
}
