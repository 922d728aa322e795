//! Notification Service
//!
//! Simulated hardware events come in through the trigger operations. Each
//! trigger validates its preconditions in a fixed order, persists any device
//! state change first, then records the notification and fans it out to one
//! delivery per recipient. Fan-out is sequential and not atomic; a failure
//! mid-way leaves earlier deliveries in place.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::device::entity::DeviceKind;
use crate::device::repository::DeviceRepository;
use crate::home::entity::{HardwareDevice, OpeningState, PowerState};
use crate::home::repository::{HardwareDeviceRepository, HomeRepository, ResidentRepository};
use crate::notification::entity::{
    build_deliveries, day_range, select_recipients, Notification, NotificationEvent,
    UserNotification,
};
use crate::notification::repository::{NotificationRepository, UserNotificationRepository};
use crate::shared::error::{HubError, Result};

/// A delivery joined with the event it carries
#[derive(Debug, Clone)]
pub struct UserNotificationView {
    pub delivery: UserNotification,
    pub notification: Notification,
}

/// Result of a trigger: the recorded event plus the deliveries created for it
#[derive(Debug, Clone)]
pub struct FanOut {
    pub notification: Notification,
    pub deliveries: Vec<UserNotification>,
}

pub struct NotificationService {
    notification_repo: Arc<NotificationRepository>,
    user_notification_repo: Arc<UserNotificationRepository>,
    hardware_repo: Arc<HardwareDeviceRepository>,
    home_repo: Arc<HomeRepository>,
    resident_repo: Arc<ResidentRepository>,
    device_repo: Arc<DeviceRepository>,
}

impl NotificationService {
    pub fn new(
        notification_repo: Arc<NotificationRepository>,
        user_notification_repo: Arc<UserNotificationRepository>,
        hardware_repo: Arc<HardwareDeviceRepository>,
        home_repo: Arc<HomeRepository>,
        resident_repo: Arc<ResidentRepository>,
        device_repo: Arc<DeviceRepository>,
    ) -> Self {
        Self {
            notification_repo,
            user_notification_repo,
            hardware_repo,
            home_repo,
            resident_repo,
            device_repo,
        }
    }

    pub async fn trigger_motion_detected(&self, hardware_id: &str) -> Result<FanOut> {
        let hardware = self
            .load_for_event(hardware_id, NotificationEvent::MotionDetected)
            .await?;
        // Cameras can have detection disabled; motion sensors always pass
        if hardware.kind == DeviceKind::SecurityCamera {
            let device = self.catalog_entry(&hardware).await?;
            if !device.motion_detection() {
                return Err(HubError::validation(
                    "Hardware device does not have motion detection enabled",
                ));
            }
        }
        self.record_and_fan_out(NotificationEvent::MotionDetected, &hardware)
            .await
    }

    pub async fn trigger_person_detected(&self, hardware_id: &str) -> Result<FanOut> {
        let hardware = self
            .load_for_event(hardware_id, NotificationEvent::PersonDetected)
            .await?;
        let device = self.catalog_entry(&hardware).await?;
        if !device.person_detection() {
            return Err(HubError::validation(
                "Hardware device does not have person detection enabled",
            ));
        }
        self.record_and_fan_out(NotificationEvent::PersonDetected, &hardware)
            .await
    }

    /// Flip the opening state and notify. The new state is persisted before
    /// the notification is recorded.
    pub async fn trigger_opening_state_changed(
        &self,
        hardware_id: &str,
        target: OpeningState,
    ) -> Result<FanOut> {
        let mut hardware = self
            .load_for_event(hardware_id, NotificationEvent::OpeningStateChanged)
            .await?;
        hardware.set_opening_state(target)?;
        self.hardware_repo.update(&hardware).await?;
        self.record_and_fan_out(NotificationEvent::OpeningStateChanged, &hardware)
            .await
    }

    /// Flip the power state and notify. Same persistence order as opening.
    pub async fn trigger_power_state_changed(
        &self,
        hardware_id: &str,
        target: PowerState,
    ) -> Result<FanOut> {
        let mut hardware = self
            .load_for_event(hardware_id, NotificationEvent::PowerStateChanged)
            .await?;
        hardware.set_power_state(target)?;
        self.hardware_repo.update(&hardware).await?;
        self.record_and_fan_out(NotificationEvent::PowerStateChanged, &hardware)
            .await
    }

    /// Shared trigger preconditions: device exists, kind supports the event,
    /// device is connected.
    async fn load_for_event(
        &self,
        hardware_id: &str,
        event: NotificationEvent,
    ) -> Result<HardwareDevice> {
        let hardware = self
            .hardware_repo
            .find_by_id(hardware_id)
            .await?
            .ok_or_else(|| HubError::not_found("Hardware device not found"))?;
        if !event.supports(hardware.kind) {
            return Err(HubError::validation(format!(
                "Hardware device of type '{}' does not support this action",
                hardware.kind.as_str()
            )));
        }
        if !hardware.is_connected() {
            return Err(HubError::validation("Hardware device is not connected"));
        }
        Ok(hardware)
    }

    async fn catalog_entry(&self, hardware: &HardwareDevice) -> Result<crate::device::entity::Device> {
        self.device_repo
            .find_by_id(&hardware.device_id)
            .await?
            .ok_or_else(|| HubError::not_found("Device not found"))
    }

    async fn record_and_fan_out(
        &self,
        event: NotificationEvent,
        hardware: &HardwareDevice,
    ) -> Result<FanOut> {
        let home = self
            .home_repo
            .find_by_id(&hardware.home_id)
            .await?
            .ok_or_else(|| HubError::not_found("Home not found"))?;
        let residents = self.resident_repo.find_by_home(&home.id).await?;
        let recipients = select_recipients(&home.owner_id, &residents);

        let notification = Notification::new(event, &hardware.id, hardware.kind, &home.id);
        self.notification_repo.insert(&notification).await?;
        let deliveries = build_deliveries(&notification.id, &recipients);
        for delivery in &deliveries {
            self.user_notification_repo.insert(delivery).await?;
        }
        info!(
            event = event.as_str(),
            hardware_id = %hardware.id,
            home_id = %home.id,
            recipients = deliveries.len(),
            "Notification fanned out"
        );
        Ok(FanOut { notification, deliveries })
    }

    /// The caller's deliveries, newest first, optionally filtered by device
    /// kind, read flag, and creation date (same-day match).
    pub async fn list_user_notifications(
        &self,
        user_id: &str,
        device_kind: Option<DeviceKind>,
        read: Option<bool>,
        date: Option<NaiveDate>,
    ) -> Result<Vec<UserNotificationView>> {
        let created = date.map(day_range);
        let notification_ids = if device_kind.is_some() || created.is_some() {
            Some(
                self.notification_repo
                    .find_ids_with_filters(device_kind, created)
                    .await?,
            )
        } else {
            None
        };

        let deliveries = self
            .user_notification_repo
            .find_for_user(user_id, read, notification_ids.as_deref())
            .await?;

        let ids: Vec<String> = deliveries.iter().map(|d| d.notification_id.clone()).collect();
        let notifications = self.notification_repo.find_by_ids(&ids).await?;

        let mut views = Vec::with_capacity(deliveries.len());
        for delivery in deliveries {
            if let Some(notification) = notifications
                .iter()
                .find(|n| n.id == delivery.notification_id)
            {
                views.push(UserNotificationView {
                    delivery,
                    notification: notification.clone(),
                });
            }
        }
        Ok(views)
    }

    /// Mark one of the caller's deliveries as read. Idempotent.
    pub async fn mark_read(&self, user_id: &str, delivery_id: &str) -> Result<UserNotification> {
        let mut delivery = self
            .user_notification_repo
            .find_by_id(delivery_id)
            .await?
            .ok_or_else(|| HubError::not_found("Notification not found"))?;
        if delivery.user_id != user_id {
            return Err(HubError::not_found("Notification not found"));
        }
        if !delivery.has_been_read {
            delivery.has_been_read = true;
            self.user_notification_repo.update(&delivery).await?;
        }
        Ok(delivery)
    }
}
