//! In-memory backend for flow tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::{AppError, Result};
use crate::models::admin::{AdminStudent, DashboardSummary, PaymentRow};
use crate::models::contact::ContactMessage;
use crate::models::payment::{BillingMonth, CreateOrderRequest, PaymentOrder};
use crate::models::student::{StudentDetails, StudentRecord, StudentStatus};
use crate::services::backend::Backend;

#[derive(Debug, Default)]
pub struct FakeBackend {
    pub registered: Vec<StudentRecord>,
    pub order: Option<PaymentOrder>,
    pub admin_password: String,
    pub otp: String,
    pub offline: bool,
    pub forgot_error: Option<String>,
    pub reset_error: Option<String>,
    pub students: Vec<AdminStudent>,
    pub payments: Vec<PaymentRow>,
    pub toggle_success: bool,
    pub(crate) calls: Mutex<Vec<&'static str>>,
    pub(crate) orders: Mutex<Vec<CreateOrderRequest>>,
    pub(crate) months: Mutex<Vec<BillingMonth>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            order: Some(PaymentOrder { id: "order_1".into(), amount: 20000, currency: "INR".into() }),
            admin_password: "secret".into(),
            otp: "123456".into(),
            toggle_success: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    pub fn orders(&self) -> Vec<CreateOrderRequest> {
        self.orders.lock().unwrap().clone()
    }

    pub fn months(&self) -> Vec<BillingMonth> {
        self.months.lock().unwrap().clone()
    }

    fn hit(&self, call: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.offline {
            return Err(AppError::Network("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn student_status(&self, email: &str) -> Result<StudentStatus> {
        self.hit("student_status")?;
        let student = self.registered.iter().find(|s| s.email == email).cloned();
        Ok(StudentStatus { registered: student.is_some(), student })
    }

    async fn student_status_by_details(&self, details: &StudentDetails) -> Result<StudentStatus> {
        self.hit("student_status_by_details")?;
        let student = self.registered.iter().find(|s| s.email == details.email).cloned();
        Ok(StudentStatus { registered: student.is_some(), student })
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<PaymentOrder> {
        self.hit("create_order")?;
        self.orders.lock().unwrap().push(request.clone());
        self.order
            .clone()
            .ok_or_else(|| AppError::OrderFailed("Failed to create order.".into()))
    }

    async fn admin_login(&self, password: &str) -> Result<()> {
        self.hit("admin_login")?;
        if password == self.admin_password {
            Ok(())
        } else {
            Err(AppError::rejected("Invalid password"))
        }
    }

    async fn forgot_password(&self) -> Result<()> {
        self.hit("forgot_password")?;
        match &self.forgot_error {
            Some(message) => Err(AppError::rejected(message.clone())),
            None => Ok(()),
        }
    }

    async fn verify_otp(&self, otp: &str) -> Result<String> {
        self.hit("verify_otp")?;
        if otp == self.otp {
            Ok("temp-token".into())
        } else {
            Err(AppError::rejected("Invalid OTP"))
        }
    }

    async fn reset_password(&self, _password: &str) -> Result<()> {
        self.hit("reset_password")?;
        match &self.reset_error {
            Some(message) => Err(AppError::rejected(message.clone())),
            None => Ok(()),
        }
    }

    async fn dashboard(&self) -> Result<DashboardSummary> {
        self.hit("dashboard")?;
        Ok(DashboardSummary {
            total_students: self.students.len() as u64,
            ..DashboardSummary::default()
        })
    }

    async fn students(&self) -> Result<Vec<AdminStudent>> {
        self.hit("students")?;
        Ok(self.students.clone())
    }

    async fn payments(&self, month: BillingMonth) -> Result<Vec<PaymentRow>> {
        self.hit("payments")?;
        self.months.lock().unwrap().push(month);
        Ok(self.payments.clone())
    }

    async fn toggle_payment(&self, _student_id: &str, month: BillingMonth) -> Result<bool> {
        self.hit("toggle_payment")?;
        self.months.lock().unwrap().push(month);
        Ok(self.toggle_success)
    }

    async fn contact(&self, _message: &ContactMessage) -> Result<String> {
        self.hit("contact")?;
        Ok("Message sent".into())
    }
}
