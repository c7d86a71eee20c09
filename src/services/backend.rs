// services/backend.rs
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::PortalConfig;
use crate::errors::{AppError, Result};
use crate::models::admin::{
    AdminStudent, DashboardSummary, PaymentRow, StudentsEnvelope, TogglePaymentRequest,
    ToggleResponse,
};
use crate::models::contact::{ContactMessage, ContactReceipt};
use crate::models::payment::{BillingMonth, CreateOrderRequest, CreateOrderResponse, PaymentOrder};
use crate::models::student::{StudentDetails, StudentStatus};

const ORDER_FAILED: &str = "Failed to create order.";

/// The institute's backend API. Every call is a single request with no retry.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn student_status(&self, email: &str) -> Result<StudentStatus>;
    async fn student_status_by_details(&self, details: &StudentDetails) -> Result<StudentStatus>;
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<PaymentOrder>;

    async fn admin_login(&self, password: &str) -> Result<()>;
    async fn forgot_password(&self) -> Result<()>;
    /// Returns the short-lived token issued for the reset step.
    async fn verify_otp(&self, otp: &str) -> Result<String>;
    async fn reset_password(&self, password: &str) -> Result<()>;

    async fn dashboard(&self) -> Result<DashboardSummary>;
    async fn students(&self) -> Result<Vec<AdminStudent>>;
    async fn payments(&self, month: BillingMonth) -> Result<Vec<PaymentRow>>;
    /// Returns whether the backend applied the toggle.
    async fn toggle_payment(&self, student_id: &str, month: BillingMonth) -> Result<bool>;

    async fn contact(&self, message: &ContactMessage) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOtpResponse {
    temp_token: String,
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &PortalConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.backend_timeout_secs))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpBackend {
            client,
            base_url: config.backend_url.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::configuration("BACKEND_URL cannot be a base URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<Response> {
        let url = self.endpoint(segments)?;
        self.client.post(url).json(body).send().await.map_err(|e| {
            error!("Backend call to /{} failed: {}", segments.join("/"), e);
            AppError::from(e)
        })
    }

    async fn get(&self, url: Url) -> Result<Response> {
        let path = url.path().to_string();
        self.client.get(url).send().await.map_err(|e| {
            error!("Backend call to {} failed: {}", path, e);
            AppError::from(e)
        })
    }
}

/// Parse a successful body, or turn a non-2xx response into a rejection
/// carrying the server's `message`.
async fn read_json<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = server_message(&body).unwrap_or_else(|| fallback.to_string());
        warn!("Backend rejected request: {} - {}", status, message);
        return Err(AppError::rejected(message));
    }

    serde_json::from_str(&body).map_err(|e| {
        error!("Unexpected backend response body: {}", e);
        AppError::Network(format!("Unexpected response body: {}", e))
    })
}

async fn expect_success(response: Response, fallback: &str) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    let message = server_message(&body).unwrap_or_else(|| fallback.to_string());
    warn!("Backend rejected request: {} - {}", status, message);
    Err(AppError::rejected(message))
}

fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<MessageBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

#[async_trait]
impl Backend for HttpBackend {
    async fn student_status(&self, email: &str) -> Result<StudentStatus> {
        let url = self.endpoint(&["api", "student", "status", email])?;
        let response = self.get(url).await?;
        read_json(response, "Failed to check registration status. Please try again.").await
    }

    async fn student_status_by_details(&self, details: &StudentDetails) -> Result<StudentStatus> {
        let response = self.post_json(&["api", "student", "status"], details).await?;
        read_json(response, "Failed to verify registration.").await
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<PaymentOrder> {
        info!("Creating {:?} order for {}", request.fee_type, request.email);
        let response = self.post_json(&["api", "payment", "create-order"], request).await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed: Option<CreateOrderResponse> = serde_json::from_str(&body).ok();

        match parsed {
            Some(CreateOrderResponse { order: Some(order), .. }) if status.is_success() => {
                info!("Order {} created ({} {})", order.id, order.amount, order.currency);
                Ok(order)
            }
            other => {
                let message = other
                    .and_then(|r| r.message)
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| ORDER_FAILED.to_string());
                error!("Order creation failed: {} - {}", status, message);
                Err(AppError::OrderFailed(message))
            }
        }
    }

    async fn admin_login(&self, password: &str) -> Result<()> {
        let response = self
            .post_json(&["api", "admin", "login"], &json!({ "password": password }))
            .await?;
        expect_success(response, "Invalid password").await
    }

    async fn forgot_password(&self) -> Result<()> {
        let url = self.endpoint(&["api", "admin", "forgot-password"])?;
        let response = self.client.post(url).send().await.map_err(|e| {
            error!("Backend call to /api/admin/forgot-password failed: {}", e);
            AppError::from(e)
        })?;
        expect_success(response, "Failed to send OTP").await
    }

    async fn verify_otp(&self, otp: &str) -> Result<String> {
        let response = self
            .post_json(&["api", "admin", "verify-otp"], &json!({ "otp": otp }))
            .await?;
        let verified: VerifyOtpResponse = read_json(response, "Invalid OTP").await?;
        Ok(verified.temp_token)
    }

    async fn reset_password(&self, password: &str) -> Result<()> {
        let response = self
            .post_json(&["api", "admin", "reset-password"], &json!({ "password": password }))
            .await?;
        expect_success(response, "Failed to reset password").await
    }

    async fn dashboard(&self) -> Result<DashboardSummary> {
        let url = self.endpoint(&["api", "admin", "dashboard"])?;
        let response = self.get(url).await?;
        read_json(response, "Failed to load dashboard").await
    }

    async fn students(&self) -> Result<Vec<AdminStudent>> {
        let url = self.endpoint(&["api", "admin", "students"])?;
        let response = self.get(url).await?;
        let envelope: StudentsEnvelope<AdminStudent> =
            read_json(response, "Failed to fetch students").await?;
        Ok(envelope.students)
    }

    async fn payments(&self, month: BillingMonth) -> Result<Vec<PaymentRow>> {
        let mut url = self.endpoint(&["api", "admin", "payments"])?;
        url.query_pairs_mut().append_pair("month", &month.to_string());
        let response = self.get(url).await?;
        let envelope: StudentsEnvelope<PaymentRow> =
            read_json(response, "Failed to fetch payments").await?;
        Ok(envelope.students)
    }

    async fn toggle_payment(&self, student_id: &str, month: BillingMonth) -> Result<bool> {
        let body = TogglePaymentRequest {
            student_id: student_id.to_string(),
            month: month.to_string(),
        };
        let response = self
            .post_json(&["api", "admin", "payments", "toggle"], &body)
            .await?;
        let toggled: ToggleResponse = read_json(response, "Toggle failed").await?;
        Ok(toggled.success)
    }

    async fn contact(&self, message: &ContactMessage) -> Result<String> {
        let response = self.post_json(&["api", "contact"], message).await?;
        let receipt: ContactReceipt = read_json(response, "Something went wrong").await?;
        Ok(receipt.message)
    }
}
