use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::Result;
use crate::models::student::StudentDetails;
use crate::services::client_store::ClientStore;
use crate::services::monthly_fee::{self, FeeQuote, MonthlyForm, MonthlyFormKey, MonthlyVariant};
use crate::services::payment::{CheckoutOptions, PaymentFlow, PaymentFlowKey, PaymentState};
use crate::services::registration::RegistrationVariant;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeeQuery {
    #[serde(default)]
    pub class: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePayment {
    pub order_id: String,
}

pub async fn pay_registration(
    State(state): State<AppState>,
    store: ClientStore,
) -> Result<Json<CheckoutOptions>> {
    let now = state.now();
    let mut payment = store.get::<PaymentFlowKey>(now).await?.unwrap_or_default();
    let mut variant = RegistrationVariant::from_store(&store, now).await?;

    let started = payment
        .start(&mut variant, state.backend.as_ref(), &state.config.checkout_settings())
        .await;
    // a failed attempt is kept so the page can show it
    store.save::<PaymentFlowKey>(&payment, now).await?;
    Ok(Json(started?))
}

/// Monthly payment mount: an unlocked, empty form.
pub async fn monthly_page(State(state): State<AppState>, store: ClientStore) -> Result<Json<Value>> {
    let now = state.now();
    let form = MonthlyForm::default();
    let payment = PaymentFlow::new();
    store.save::<MonthlyFormKey>(&form, now).await?;
    store.save::<PaymentFlowKey>(&payment, now).await?;
    Ok(Json(json!({ "form": form, "payment": payment.state() })))
}

pub async fn monthly_fee(Query(query): Query<FeeQuery>) -> Json<FeeQuote> {
    Json(monthly_fee::fee_quote(&query.class))
}

pub async fn pay_monthly(
    State(state): State<AppState>,
    store: ClientStore,
    Json(payload): Json<StudentDetails>,
) -> Result<Json<CheckoutOptions>> {
    let now = state.now();
    let mut form = store.get::<MonthlyFormKey>(now).await?.unwrap_or_default();
    let mut payment = store.get::<PaymentFlowKey>(now).await?.unwrap_or_default();

    // a verified form keeps the backend's record
    form.update(payload);

    let started = payment
        .start(
            &mut MonthlyVariant::new(&mut form, state.local_now()),
            state.backend.as_ref(),
            &state.config.checkout_settings(),
        )
        .await;
    store.save::<MonthlyFormKey>(&form, now).await?;
    store.save::<PaymentFlowKey>(&payment, now).await?;
    Ok(Json(started?))
}

/// Reported by the checkout widget's success handler.
pub async fn complete_payment(
    State(state): State<AppState>,
    store: ClientStore,
    Json(payload): Json<CompletePayment>,
) -> Result<Json<Value>> {
    let now = state.now();
    let mut payment = store.get::<PaymentFlowKey>(now).await?.unwrap_or_default();
    let fee_type = payment.complete(&payload.order_id, &store).await?;
    store.save::<PaymentFlowKey>(&payment, now).await?;
    Ok(Json(json!({
        "success": true,
        "feeType": fee_type,
        "message": format!("{} paid", fee_type.description()),
    })))
}

pub async fn payment_state(State(state): State<AppState>, store: ClientStore) -> Result<Json<PaymentState>> {
    let payment = store.get::<PaymentFlowKey>(state.now()).await?.unwrap_or_default();
    Ok(Json(payment.state().clone()))
}
