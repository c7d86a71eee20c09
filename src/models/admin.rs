use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Admin session validity window.
pub const ADMIN_SESSION_TTL_HOURS: i64 = 48;

/// Admin Session marker: logged-in flag plus login timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub logged_in: bool,
    pub login_time: DateTime<Utc>,
}

impl AdminSession {
    pub fn started_at(now: DateTime<Utc>) -> Self {
        Self { logged_in: true, login_time: now }
    }

    /// Older than the validity window, whatever the flag says.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.login_time > Duration::hours(ADMIN_SESSION_TTL_HOURS)
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.logged_in && !self.is_expired(now)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(default)]
    pub total_students: u64,
    #[serde(default)]
    pub not_paid_count: u64,
    #[serde(default)]
    pub revenue_this_month: f64,
    #[serde(default)]
    pub monthly_stats: Vec<MonthlyStat>,
}

/// One bar of the admissions-per-month series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyStat {
    pub month: String,
    pub students: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStudent {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub class: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    pub fn toggled(self) -> Self {
        match self {
            PaymentStatus::Paid => PaymentStatus::Unpaid,
            PaymentStatus::Unpaid => PaymentStatus::Paid,
        }
    }
}

/// A student's payment status for one billing month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRow {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub class: String,
    pub status: PaymentStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentsEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub students: Vec<T>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TogglePaymentRequest {
    pub student_id: String,
    pub month: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToggleResponse {
    #[serde(default)]
    pub success: bool,
}

/// Rows with a name, email and phone that a filter can match.
pub trait Searchable {
    fn class_label(&self) -> &str;
    fn search_fields(&self) -> [&str; 3];
}

impl Searchable for AdminStudent {
    fn class_label(&self) -> &str {
        &self.class
    }

    fn search_fields(&self) -> [&str; 3] {
        [&self.name, &self.email, &self.phone]
    }
}

impl Searchable for PaymentRow {
    fn class_label(&self) -> &str {
        &self.class
    }

    fn search_fields(&self) -> [&str; 3] {
        [&self.name, &self.email, &self.phone]
    }
}

/// Search box plus class dropdown of the back-office tables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentFilter {
    #[serde(default)]
    pub search: Option<String>,
    /// `"All"` (or absent) or a class label such as `"Class 3"`.
    #[serde(default)]
    pub class: Option<String>,
}

impl StudentFilter {
    pub fn matches<T: Searchable>(&self, row: &T) -> bool {
        let class_ok = match self.class.as_deref().map(str::trim) {
            None | Some("") | Some("All") => true,
            Some(class) => row.class_label() == class,
        };
        if !class_ok {
            return false;
        }

        let needle = self.search.as_deref().unwrap_or("").trim().to_lowercase();
        needle.is_empty()
            || row
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn apply<T: Searchable>(&self, rows: Vec<T>) -> Vec<T> {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}
