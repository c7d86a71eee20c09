pub mod admin_auth;
pub mod admin_panel;
pub mod admission;
pub mod contact;
pub mod health;
pub mod otp;
pub mod payment;
