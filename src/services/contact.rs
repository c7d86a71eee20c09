use tracing::{info, warn};
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::contact::{ContactMessage, ContactReceipt};
use crate::services::backend::Backend;

/// Shown when the backend could not be reached at all.
pub const CONTACT_FALLBACK: &str = "Something went wrong";

/// Contact form submit. Field rules are checked before the backend is called.
pub async fn send_message(backend: &dyn Backend, message: &ContactMessage) -> Result<ContactReceipt> {
    message.validate()?;
    let reply = backend.contact(message).await.map_err(|e| match e {
        AppError::Network(cause) => {
            warn!("Contact message not delivered: {}", cause);
            AppError::rejected(CONTACT_FALLBACK)
        }
        other => other,
    })?;
    info!("Contact message from {} delivered", message.email);
    Ok(ContactReceipt { message: reply })
}
