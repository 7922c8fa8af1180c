//! Notification log over the in-memory store.

use async_trait::async_trait;

use crate::domain::ports::{NotificationDispatchError, NotificationDispatcher};
use crate::domain::{Notification, NotificationId, NotificationRecord, UserId};

use super::InMemoryStore;

#[async_trait]
impl NotificationDispatcher for InMemoryStore {
    async fn notify(
        &self,
        notification: &Notification,
    ) -> Result<NotificationRecord, NotificationDispatchError> {
        let record = NotificationRecord {
            id: NotificationId::random(),
            notification: notification.clone(),
            read: false,
            created_at: self.clock.utc(),
        };
        self.lock().notifications.push(record.clone());
        Ok(record)
    }

    async fn list_for(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<NotificationRecord>, NotificationDispatchError> {
        Ok(self
            .lock()
            .notifications
            .iter()
            .rev()
            .filter(|record| &record.notification.recipient == recipient)
            .cloned()
            .collect())
    }
}
