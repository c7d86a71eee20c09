pub mod admin;
pub mod contact;
pub mod navigation;
pub mod otp;
pub mod payment;
pub mod student;
