//! PostgreSQL-backed `NotificationDispatcher` that persists every message.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use std::sync::Arc;

use crate::domain::ports::{NotificationDispatchError, NotificationDispatcher};
use crate::domain::{Notification, NotificationId, NotificationRecord, UserId};

use super::diesel_error_mapping;
use super::models::NotificationRow;
use super::pool::{DbPool, PoolError};
use super::row_conversions::row_to_notification;
use super::schema::notifications;

/// Diesel-backed notification log.
#[derive(Clone)]
pub struct DieselNotificationDispatcher {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselNotificationDispatcher {
    /// Create a dispatcher stamping records with `clock`.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn map_pool_error(error: PoolError) -> NotificationDispatchError {
    diesel_error_mapping::map_pool_error(error)
}

fn map_diesel_error(error: diesel::result::Error) -> NotificationDispatchError {
    diesel_error_mapping::map_diesel_error(error)
}

#[async_trait]
impl NotificationDispatcher for DieselNotificationDispatcher {
    async fn notify(
        &self,
        notification: &Notification,
    ) -> Result<NotificationRecord, NotificationDispatchError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let record = NotificationRecord {
            id: NotificationId::random(),
            notification: notification.clone(),
            read: false,
            created_at: self.clock.utc(),
        };
        diesel::insert_into(notifications::table)
            .values(&NotificationRow {
                id: *record.id.as_uuid(),
                recipient_id: *notification.recipient.as_uuid(),
                kind: notification.kind.as_str().to_owned(),
                title: notification.title.clone(),
                message: notification.message.clone(),
                payload: notification.payload.clone(),
                read: false,
                created_at: record.created_at,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(record)
    }

    async fn list_for(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<NotificationRecord>, NotificationDispatchError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NotificationRow> = notifications::table
            .filter(notifications::recipient_id.eq(recipient.as_uuid()))
            .select(NotificationRow::as_select())
            .order_by(notifications::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(row_to_notification)
            .collect::<Result<Vec<_>, _>>()
            .map_err(NotificationDispatchError::delivery)
    }
}
