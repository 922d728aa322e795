//! Notification Entities
//!
//! A [`Notification`] records one hardware event. Each recipient gets a
//! [`UserNotification`] carrying the per-user read flag.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

use crate::device::entity::DeviceKind;
use crate::home::entity::{HomePermission, Resident};
use crate::shared::error::{HubError, Result};

/// Events simulated hardware can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum NotificationEvent {
    MotionDetected,
    PersonDetected,
    OpeningStateChanged,
    PowerStateChanged,
}

impl NotificationEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationEvent::MotionDetected => "motionDetected",
            NotificationEvent::PersonDetected => "personDetected",
            NotificationEvent::OpeningStateChanged => "openingStateChanged",
            NotificationEvent::PowerStateChanged => "powerStateChanged",
        }
    }

    /// Device kinds that may emit this event
    pub fn allowed_kinds(&self) -> &'static [DeviceKind] {
        match self {
            NotificationEvent::MotionDetected => {
                &[DeviceKind::SecurityCamera, DeviceKind::MotionSensor]
            }
            NotificationEvent::PersonDetected => &[DeviceKind::SecurityCamera],
            NotificationEvent::OpeningStateChanged => &[DeviceKind::WindowSensor],
            NotificationEvent::PowerStateChanged => &[DeviceKind::SmartLamp],
        }
    }

    pub fn supports(&self, kind: DeviceKind) -> bool {
        self.allowed_kinds().contains(&kind)
    }
}

/// One recorded hardware event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: String,

    pub event: NotificationEvent,

    /// Emitting hardware device
    pub hardware_device_id: String,

    /// Kind, denormalized for query filters
    pub device_kind: DeviceKind,

    pub home_id: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        event: NotificationEvent,
        hardware_device_id: impl Into<String>,
        device_kind: DeviceKind,
        home_id: impl Into<String>,
    ) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            event,
            hardware_device_id: hardware_device_id.into(),
            device_kind,
            home_id: home_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// Per-recipient delivery of a notification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNotification {
    #[serde(rename = "_id")]
    pub id: String,

    pub notification_id: String,
    pub user_id: String,
    pub has_been_read: bool,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl UserNotification {
    pub fn new(notification_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            notification_id: notification_id.into(),
            user_id: user_id.into(),
            has_been_read: false,
            created_at: Utc::now(),
        }
    }
}

/// Read filter accepted by the notification listing endpoint.
/// "Yes" and "No" filter on the flag, the empty string means no filter.
pub fn parse_read_filter(value: &str) -> Result<Option<bool>> {
    match value {
        "Yes" => Ok(Some(true)),
        "No" => Ok(Some(false)),
        "" => Ok(None),
        other => Err(HubError::validation(format!(
            "Invalid read filter '{}', expected 'Yes', 'No' or empty",
            other
        ))),
    }
}

/// UTC bounds of a calendar day, start inclusive and end exclusive. The
/// creation-date filter matches notifications created on that day.
pub fn day_range(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = (date + Days::new(1)).and_time(NaiveTime::MIN).and_utc();
    (start, end)
}

/// Users that receive a notification for a home: every resident granted
/// ReceiveNotifications, then the owner appended unconditionally.
pub fn select_recipients(owner_id: &str, residents: &[Resident]) -> Vec<String> {
    let mut recipients: Vec<String> = residents
        .iter()
        .filter(|r| r.has_permission(HomePermission::ReceiveNotifications))
        .map(|r| r.user_id.clone())
        .collect();
    recipients.push(owner_id.to_string());
    recipients
}

/// One unread delivery per recipient, in recipient order.
pub fn build_deliveries(notification_id: &str, recipients: &[String]) -> Vec<UserNotification> {
    recipients
        .iter()
        .map(|user_id| UserNotification::new(notification_id, user_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_matrix() {
        assert!(NotificationEvent::MotionDetected.supports(DeviceKind::SecurityCamera));
        assert!(NotificationEvent::MotionDetected.supports(DeviceKind::MotionSensor));
        assert!(!NotificationEvent::MotionDetected.supports(DeviceKind::SmartLamp));

        assert!(NotificationEvent::PersonDetected.supports(DeviceKind::SecurityCamera));
        assert!(!NotificationEvent::PersonDetected.supports(DeviceKind::MotionSensor));

        assert!(NotificationEvent::OpeningStateChanged.supports(DeviceKind::WindowSensor));
        assert!(!NotificationEvent::OpeningStateChanged.supports(DeviceKind::SecurityCamera));

        assert!(NotificationEvent::PowerStateChanged.supports(DeviceKind::SmartLamp));
        assert!(!NotificationEvent::PowerStateChanged.supports(DeviceKind::WindowSensor));
    }

    #[test]
    fn test_select_recipients_permission_gated_plus_owner() {
        let mut allowed = Resident::new("h1", "u2");
        allowed.grant(HomePermission::ReceiveNotifications);
        let denied = Resident::new("h1", "u3");

        let recipients = select_recipients("owner", &[allowed, denied]);
        assert_eq!(recipients, vec!["u2".to_string(), "owner".to_string()]);
    }

    #[test]
    fn test_select_recipients_owner_always_included() {
        let recipients = select_recipients("owner", &[]);
        assert_eq!(recipients, vec!["owner".to_string()]);
    }

    #[test]
    fn test_day_range_covers_exactly_one_day() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        let (start, end) = day_range(date);

        assert_eq!(start.to_rfc3339(), "2026-03-05T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-03-06T00:00:00+00:00");

        let inside = start + chrono::Duration::hours(13);
        assert!(inside >= start && inside < end);
    }

    #[test]
    fn test_build_deliveries_one_unread_per_recipient() {
        let mut allowed = Resident::new("h1", "u2");
        allowed.grant(HomePermission::ReceiveNotifications);
        let denied = Resident::new("h1", "u3");

        let recipients = select_recipients("owner", &[allowed, denied]);
        let deliveries = build_deliveries("n1", &recipients);

        assert_eq!(deliveries.len(), 2);
        let users: Vec<&str> = deliveries.iter().map(|d| d.user_id.as_str()).collect();
        assert_eq!(users, vec!["u2", "owner"]);
        assert!(deliveries.iter().all(|d| !d.has_been_read));
        assert!(deliveries.iter().all(|d| d.notification_id == "n1"));
    }

    #[test]
    fn test_parse_read_filter() {
        assert_eq!(parse_read_filter("Yes").unwrap(), Some(true));
        assert_eq!(parse_read_filter("No").unwrap(), Some(false));
        assert_eq!(parse_read_filter("").unwrap(), None);
        assert!(parse_read_filter("yes").is_err());
        assert!(parse_read_filter("maybe").is_err());
    }
}
