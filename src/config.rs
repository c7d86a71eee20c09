// config.rs
use std::env;
use std::str::FromStr;

use chrono::FixedOffset;
use reqwest::Url;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub backend_url: Url,
    pub backend_timeout_secs: u64,
    pub razorpay_key: String,
    pub institute_name: String,
    pub checkout_theme_color: String,
    pub local_offset: FixedOffset,
    pub session_idle_minutes: i64,
    pub secure_cookies: bool,
    pub port: u16,
    pub host: String,
}

/// Static part of the checkout widget descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    pub key: String,
    pub name: String,
    pub theme_color: String,
}

impl PortalConfig {
    /// Load from the process environment; a `.env` file is read first.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::configuration(format!("{} must be set", key)))
        };

        let backend_url = parse_backend_url(&required("BACKEND_URL")?)?;

        let offset_minutes: i32 = parse_or(&lookup, "PORTAL_UTC_OFFSET_MINUTES", 330)?;
        let local_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "PORTAL_UTC_OFFSET_MINUTES out of range: {}",
                    offset_minutes
                ))
            })?;

        let session_idle_minutes: i64 = parse_or(&lookup, "SESSION_IDLE_MINUTES", 120)?;
        if session_idle_minutes <= 0 {
            return Err(AppError::configuration("SESSION_IDLE_MINUTES must be positive"));
        }

        Ok(PortalConfig {
            backend_url,
            backend_timeout_secs: parse_or(&lookup, "BACKEND_TIMEOUT_SECS", 30)?,
            razorpay_key: required("RAZORPAY_KEY")?,
            institute_name: lookup("INSTITUTE_NAME")
                .unwrap_or_else(|| "Sanjeevni Pathshala".to_string()),
            checkout_theme_color: lookup("CHECKOUT_THEME_COLOR")
                .unwrap_or_else(|| "#ec4899".to_string()),
            local_offset,
            session_idle_minutes,
            secure_cookies: parse_or(&lookup, "SESSION_SECURE_COOKIE", true)?,
            port: parse_or(&lookup, "PORT", 3000)?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
        })
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            key: self.razorpay_key.clone(),
            name: self.institute_name.clone(),
            theme_color: self.checkout_theme_color.clone(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_backend_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::configuration(format!("BACKEND_URL is not a valid URL: {}", e)))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(AppError::configuration(format!(
            "BACKEND_URL must be an absolute http(s) URL, got {}",
            raw
        ))),
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::configuration(format!("{} has an invalid value '{}'", key, raw))),
    }
}
