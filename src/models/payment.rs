use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::AppError;
use crate::models::student::{class_number, MonthlyPayment, StudentDetails};

/// Registration fee shown on the registration payment page, in rupees.
pub const REGISTRATION_FEE: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeType {
    Registration,
    Monthly,
}

impl FeeType {
    /// Label shown in the checkout widget.
    pub fn description(&self) -> &'static str {
        match self {
            FeeType::Registration => "Registration Fee",
            FeeType::Monthly => "Monthly Fee",
        }
    }
}

/// Monthly fee in rupees for a class number.
///
/// 1-4: 150, 5-6: 175, 7-8: 200, 9-10: 250, anything else: 0.
pub fn monthly_fee(class: u32) -> u32 {
    match class {
        1..=4 => 150,
        5..=6 => 175,
        7..=8 => 200,
        9..=10 => 250,
        _ => 0,
    }
}

/// Monthly fee for a class label such as `"Class 7"`.
pub fn monthly_fee_for_label(label: &str) -> u32 {
    class_number(label).map(monthly_fee).unwrap_or(0)
}

/// True when any payment falls in the same calendar month and year as `now`,
/// judged in `now`'s time zone.
pub fn already_paid_this_month<Tz: TimeZone>(payments: &[MonthlyPayment], now: &DateTime<Tz>) -> bool {
    let tz = now.timezone();
    payments.iter().any(|p| {
        let paid = p.date.with_timezone(&tz);
        paid.year() == now.year() && paid.month() == now.month()
    })
}

/// Body of `POST /api/payment/create-order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateOrderRequest {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub class: String,
    #[serde(rename = "type")]
    pub fee_type: FeeType,
}

impl CreateOrderRequest {
    pub fn new(details: &StudentDetails, fee_type: FeeType) -> Self {
        Self {
            email: details.email.clone(),
            name: details.name.clone(),
            phone: details.phone.clone(),
            class: details.class.clone(),
            fee_type,
        }
    }
}

/// Order created by the backend for a single checkout attempt.
///
/// `amount` is in the smallest currency unit, as the gateway expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: String,
    pub amount: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

pub fn default_currency() -> String {
    "INR".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderResponse {
    #[serde(default)]
    pub order: Option<PaymentOrder>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A `YYYY-MM` month used by the admin payments view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BillingMonth {
    year: i32,
    month: u32,
}

impl BillingMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn containing<Tz: TimeZone>(at: &DateTime<Tz>) -> Self {
        Self { year: at.year(), month: at.month() }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BillingMonth {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::invalid_data(format!("Invalid month '{}', expected YYYY-MM", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        BillingMonth::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for BillingMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BillingMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn paid_at(rfc3339: &str) -> MonthlyPayment {
        MonthlyPayment {
            amount: 150.0,
            date: DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc),
        }
    }

    #[test]
    fn fee_tiers_cover_classes_one_to_ten() {
        let expected = [150, 150, 150, 150, 175, 175, 200, 200, 250, 250];
        for (i, fee) in expected.iter().enumerate() {
            assert_eq!(monthly_fee(i as u32 + 1), *fee, "class {}", i + 1);
        }
    }

    #[test]
    fn fee_is_zero_outside_known_classes() {
        for class in [0, 11, 12, 100, u32::MAX] {
            assert_eq!(monthly_fee(class), 0);
        }
        assert_eq!(monthly_fee_for_label(""), 0);
        assert_eq!(monthly_fee_for_label("Class 9"), 250);
    }

    #[test]
    fn empty_history_is_not_paid() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert!(!already_paid_this_month(&[], &now));
    }

    #[test]
    fn payment_in_same_month_counts() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert!(already_paid_this_month(&[paid_at("2026-10-01T00:00:00Z")], &now));
        assert!(!already_paid_this_month(&[paid_at("2026-09-30T10:00:00Z")], &now));
        // same month, different year
        assert!(!already_paid_this_month(&[paid_at("2025-10-05T10:00:00Z")], &now));
    }

    #[test]
    fn month_boundary_follows_local_offset() {
        let ist = FixedOffset::east_opt(330 * 60).unwrap();
        let now = ist.with_ymd_and_hms(2026, 11, 1, 9, 0, 0).unwrap();
        // 20:00 UTC on Oct 31 is already Nov 1 in IST
        assert!(already_paid_this_month(&[paid_at("2026-10-31T20:00:00Z")], &now));
    }

    #[test]
    fn order_request_uses_wire_names() {
        let details = StudentDetails {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            phone: "9876543210".into(),
            class: "Class 4".into(),
        };
        let body = serde_json::to_value(CreateOrderRequest::new(&details, FeeType::Monthly)).unwrap();
        assert_eq!(body["type"], "monthly");
        assert_eq!(body["class"], "Class 4");
    }

    #[test]
    fn billing_month_parses_and_formats() {
        let month: BillingMonth = "2026-03".parse().unwrap();
        assert_eq!(month.to_string(), "2026-03");
        assert!("2026-13".parse::<BillingMonth>().is_err());
        assert!("2026-3".parse::<BillingMonth>().is_err());
        assert!("march".parse::<BillingMonth>().is_err());
    }
}
