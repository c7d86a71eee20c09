pub mod admin_panel;
pub mod backend;
pub mod client_store;
pub mod clock;
pub mod contact;
pub mod login_guard;
pub mod monthly_fee;
pub mod otp_reset;
pub mod payment;
pub mod registration;
pub mod session_guard;
pub mod sessions;

#[cfg(test)]
pub mod testing;
