//! Port for persisting and delivering notifications.
//!
//! Callers dispatch after a state change has committed. A dispatch failure is
//! logged by the caller and never undoes the change.

use async_trait::async_trait;

use crate::domain::{Notification, NotificationRecord, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification dispatchers.
    pub enum NotificationDispatchError {
        /// The notification could not be stored or handed off.
        Delivery { message: String } => "notification delivery failed: {message}",
    }
}

/// Delivery port for user-facing notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Persist and deliver one notification.
    async fn notify(
        &self,
        notification: &Notification,
    ) -> Result<NotificationRecord, NotificationDispatchError>;

    /// Notifications addressed to `recipient`, newest first.
    async fn list_for(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<NotificationRecord>, NotificationDispatchError>;
}
