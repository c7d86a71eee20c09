use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::errors::{AppError, Result};

/// Highest class the institute admits.
pub const MAX_CLASS: u32 = 10;

/// Name, email, phone and class label of a (prospective) student.
///
/// Doubles as the Draft Registration persisted between the admission form and
/// the registration payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StudentDetails {
    pub name: String,

    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    pub phone: String,

    #[validate(custom(function = "validate_class_label"))]
    pub class: String,
}

impl StudentDetails {
    /// Every field filled in (whitespace does not count).
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.phone, &self.class]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    /// Required-field check followed by the format rules.
    pub fn ensure_valid(&self) -> Result<()> {
        if !self.is_complete() {
            return Err(AppError::invalid_data("Please enter all student details."));
        }
        self.validate()?;
        Ok(())
    }
}

/// Numeric part of a class label, e.g. `"Class 7"` -> `7`.
///
/// All non-digit characters are dropped before parsing, so `"7th"` also yields 7.
pub fn class_number(label: &str) -> Option<u32> {
    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

pub fn class_label(number: u32) -> String {
    format!("Class {}", number)
}

fn validate_class_label(label: &str) -> std::result::Result<(), ValidationError> {
    match class_number(label) {
        Some(n) if (1..=MAX_CLASS).contains(&n) && label.trim() == class_label(n) => Ok(()),
        _ => {
            let mut err = ValidationError::new("class");
            err.message = Some("Select a class between Class 1 and Class 10".into());
            Err(err)
        }
    }
}

/// One recurring fee payment recorded by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPayment {
    pub amount: f64,
    pub date: DateTime<Utc>,
}

/// Student as owned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_status: Option<String>,
    #[serde(default)]
    pub monthly_payments: Vec<MonthlyPayment>,
}

impl StudentRecord {
    pub fn details(&self) -> StudentDetails {
        StudentDetails {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            class: self.class.clone(),
        }
    }
}

/// Response of both student-status endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StudentStatus {
    pub registered: bool,
    #[serde(default)]
    pub student: Option<StudentRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> StudentDetails {
        StudentDetails {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            phone: "9876543210".into(),
            class: "Class 4".into(),
        }
    }

    #[test]
    fn class_number_strips_non_digits() {
        assert_eq!(class_number("Class 10"), Some(10));
        assert_eq!(class_number("7th"), Some(7));
        assert_eq!(class_number("Class"), None);
        assert_eq!(class_number(""), None);
    }

    #[test]
    fn blank_fields_are_incomplete() {
        let mut d = details();
        assert!(d.is_complete());
        d.phone = "   ".into();
        assert!(!d.is_complete());
        assert!(matches!(d.ensure_valid(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn class_label_must_be_in_range() {
        let mut d = details();
        assert!(d.ensure_valid().is_ok());
        d.class = "Class 11".into();
        assert!(d.ensure_valid().is_err());
        d.class = "Grade 3".into();
        assert!(d.ensure_valid().is_err());
    }

    #[test]
    fn record_parses_backend_shape() {
        let json = serde_json::json!({
            "_id": "s1",
            "name": "Asha",
            "email": "asha@example.com",
            "phone": "9876543210",
            "class": "Class 4",
            "monthlyPayments": [{ "amount": 150, "date": "2026-10-02T09:30:00.000Z" }]
        });
        let record: StudentRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.monthly_payments.len(), 1);
        assert_eq!(record.details(), details());
    }
}
