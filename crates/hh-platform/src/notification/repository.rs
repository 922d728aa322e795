//! Notification Repositories

use chrono::{DateTime, Utc};
use mongodb::{Collection, Database, bson::doc, bson::Document};
use futures::TryStreamExt;

use crate::device::entity::DeviceKind;
use crate::notification::entity::{Notification, UserNotification};
use crate::shared::error::Result;

pub struct NotificationRepository {
    collection: Collection<Notification>,
}

impl NotificationRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("notifications"),
        }
    }

    pub async fn insert(&self, notification: &Notification) -> Result<()> {
        self.collection.insert_one(notification).await?;
        Ok(())
    }

    pub async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Notification>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let cursor = self.collection
            .find(doc! { "_id": { "$in": ids } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Notification IDs matching the kind and creation-day filters. Used to
    /// narrow a user's deliveries before joining in memory. The day bound is
    /// start-inclusive, end-exclusive.
    pub async fn find_ids_with_filters(
        &self,
        device_kind: Option<DeviceKind>,
        created: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<String>> {
        let mut filter = doc! {};
        if let Some(kind) = device_kind {
            filter.insert("deviceKind", kind.as_str());
        }
        if let Some((from, to)) = created {
            let mut range = Document::new();
            range.insert("$gte", bson::DateTime::from_chrono(from));
            range.insert("$lt", bson::DateTime::from_chrono(to));
            filter.insert("createdAt", range);
        }

        let notifications: Vec<Notification> =
            self.collection.find(filter).await?.try_collect().await?;
        Ok(notifications.into_iter().map(|n| n.id).collect())
    }
}

pub struct UserNotificationRepository {
    collection: Collection<UserNotification>,
}

impl UserNotificationRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("user_notifications"),
        }
    }

    pub async fn insert(&self, delivery: &UserNotification) -> Result<()> {
        self.collection.insert_one(delivery).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<UserNotification>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_for_user(
        &self,
        user_id: &str,
        read: Option<bool>,
        notification_ids: Option<&[String]>,
    ) -> Result<Vec<UserNotification>> {
        let mut filter = doc! { "userId": user_id };
        if let Some(read) = read {
            filter.insert("hasBeenRead", read);
        }
        if let Some(ids) = notification_ids {
            filter.insert("notificationId", doc! { "$in": ids });
        }

        let cursor = self.collection
            .find(filter)
            .sort(doc! { "_id": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, delivery: &UserNotification) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &delivery.id }, delivery)
            .await?;
        Ok(())
    }
}
