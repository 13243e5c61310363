//! Outbound mail port.

use std::sync::Arc;

use crate::domain::SubscriberEmail;
use crate::error::MailError;

/// Delivers one plain-text message to one recipient.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, to: &SubscriberEmail, subject: &str, body: &str) -> Result<(), MailError>;
}

#[async_trait::async_trait]
impl<T: Mailer + ?Sized> Mailer for Arc<T> {
    async fn send(&self, to: &SubscriberEmail, subject: &str, body: &str) -> Result<(), MailError> {
        (**self).send(to, subject, body).await
    }
}
