//! Notifications API
//!
//! Trigger endpoints are unauthenticated, they stand in for hardware pushing
//! events. Query and read endpoints require a session.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::{IntoParams, ToSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::device::entity::DeviceKind;
use crate::home::entity::{OpeningState, PowerState};
use crate::notification::entity::{parse_read_filter, NotificationEvent};
use crate::notification::service::{FanOut, NotificationService, UserNotificationView};
use crate::shared::error::Result;
use crate::shared::middleware::Authenticated;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub event: NotificationEvent,
    pub hardware_device_id: String,
    pub device_kind: DeviceKind,
    pub home_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<crate::notification::entity::Notification> for NotificationResponse {
    fn from(notification: crate::notification::entity::Notification) -> Self {
        Self {
            id: notification.id,
            event: notification.event,
            hardware_device_id: notification.hardware_device_id,
            device_kind: notification.device_kind,
            home_id: notification.home_id,
            created_at: notification.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponse {
    pub id: String,
    pub user_id: String,
    pub has_been_read: bool,
}

/// Trigger result: the recorded event and who it was delivered to
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FanOutResponse {
    pub notification: NotificationResponse,
    pub deliveries: Vec<DeliveryResponse>,
}

impl From<FanOut> for FanOutResponse {
    fn from(fan_out: FanOut) -> Self {
        Self {
            notification: fan_out.notification.into(),
            deliveries: fan_out
                .deliveries
                .into_iter()
                .map(|d| DeliveryResponse {
                    id: d.id,
                    user_id: d.user_id,
                    has_been_read: d.has_been_read,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserNotificationResponse {
    pub id: String,
    pub event: NotificationEvent,
    pub hardware_device_id: String,
    pub device_kind: DeviceKind,
    pub home_id: String,
    pub has_been_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserNotificationView> for UserNotificationResponse {
    fn from(view: UserNotificationView) -> Self {
        Self {
            id: view.delivery.id,
            event: view.notification.event,
            hardware_device_id: view.notification.hardware_device_id,
            device_kind: view.notification.device_kind,
            home_id: view.notification.home_id,
            has_been_read: view.delivery.has_been_read,
            created_at: view.notification.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NotificationsQuery {
    /// Filter by device kind wire name, e.g. "windowSensor"
    pub device_kind: Option<String>,

    /// Read filter: "Yes", "No", or empty for all
    pub read: Option<String>,

    /// Creation date, "YYYY-MM-DD". Matches notifications created that day.
    #[param(value_type = Option<String>)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpeningStateEventRequest {
    /// "open" or "closed"
    pub state: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PowerStateEventRequest {
    /// "ON" or "OFF"
    pub state: String,
}

#[derive(Clone)]
pub struct NotificationsState {
    pub notification_service: Arc<NotificationService>,
}

/// Report motion detected by a camera or motion sensor
#[utoipa::path(
    post,
    path = "/events/{hardware_id}/motion",
    tag = "notifications",
    params(("hardware_id" = String, Path, description = "Hardware device ID")),
    responses(
        (status = 200, description = "Notification recorded", body = FanOutResponse),
        (status = 400, description = "Unsupported kind, disconnected, or detection disabled"),
        (status = 404, description = "Hardware device not found")
    )
)]
pub async fn trigger_motion_detected(
    State(state): State<NotificationsState>,
    Path(hardware_id): Path<String>,
) -> Result<Json<FanOutResponse>> {
    let fan_out = state
        .notification_service
        .trigger_motion_detected(&hardware_id)
        .await?;
    Ok(Json(fan_out.into()))
}

/// Report a person detected by a camera
#[utoipa::path(
    post,
    path = "/events/{hardware_id}/person",
    tag = "notifications",
    params(("hardware_id" = String, Path, description = "Hardware device ID")),
    responses(
        (status = 200, description = "Notification recorded", body = FanOutResponse),
        (status = 400, description = "Unsupported kind, disconnected, or detection disabled"),
        (status = 404, description = "Hardware device not found")
    )
)]
pub async fn trigger_person_detected(
    State(state): State<NotificationsState>,
    Path(hardware_id): Path<String>,
) -> Result<Json<FanOutResponse>> {
    let fan_out = state
        .notification_service
        .trigger_person_detected(&hardware_id)
        .await?;
    Ok(Json(fan_out.into()))
}

/// Report a window sensor opening state change
#[utoipa::path(
    post,
    path = "/events/{hardware_id}/opening",
    tag = "notifications",
    params(("hardware_id" = String, Path, description = "Hardware device ID")),
    request_body = OpeningStateEventRequest,
    responses(
        (status = 200, description = "Notification recorded", body = FanOutResponse),
        (status = 400, description = "Unsupported kind, disconnected, unknown state, or no-op transition"),
        (status = 404, description = "Hardware device not found")
    )
)]
pub async fn trigger_opening_state_changed(
    State(state): State<NotificationsState>,
    Path(hardware_id): Path<String>,
    Json(request): Json<OpeningStateEventRequest>,
) -> Result<Json<FanOutResponse>> {
    let target = OpeningState::parse(&request.state)?;
    let fan_out = state
        .notification_service
        .trigger_opening_state_changed(&hardware_id, target)
        .await?;
    Ok(Json(fan_out.into()))
}

/// Report a smart lamp power state change
#[utoipa::path(
    post,
    path = "/events/{hardware_id}/power",
    tag = "notifications",
    params(("hardware_id" = String, Path, description = "Hardware device ID")),
    request_body = PowerStateEventRequest,
    responses(
        (status = 200, description = "Notification recorded", body = FanOutResponse),
        (status = 400, description = "Unsupported kind, disconnected, unknown state, or no-op transition"),
        (status = 404, description = "Hardware device not found")
    )
)]
pub async fn trigger_power_state_changed(
    State(state): State<NotificationsState>,
    Path(hardware_id): Path<String>,
    Json(request): Json<PowerStateEventRequest>,
) -> Result<Json<FanOutResponse>> {
    let target = PowerState::parse(&request.state)?;
    let fan_out = state
        .notification_service
        .trigger_power_state_changed(&hardware_id, target)
        .await?;
    Ok(Json(fan_out.into()))
}

/// The caller's notifications, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "notifications",
    params(NotificationsQuery),
    responses(
        (status = 200, description = "The caller's notifications", body = Vec<UserNotificationResponse>),
        (status = 400, description = "Invalid filter value")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_notifications(
    State(state): State<NotificationsState>,
    auth: Authenticated,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<Vec<UserNotificationResponse>>> {
    let device_kind = query.device_kind.as_deref().map(DeviceKind::parse).transpose()?;
    let read = match query.read.as_deref() {
        Some(value) => parse_read_filter(value)?,
        None => None,
    };

    let views = state
        .notification_service
        .list_user_notifications(&auth.0.user_id, device_kind, read, query.date)
        .await?;
    Ok(Json(views.into_iter().map(UserNotificationResponse::from).collect()))
}

/// Mark one of the caller's notifications as read
#[utoipa::path(
    patch,
    path = "/{id}/read",
    tag = "notifications",
    params(("id" = String, Path, description = "User notification ID")),
    responses(
        (status = 200, description = "Marked as read"),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_notification_read(
    State(state): State<NotificationsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let delivery = state.notification_service.mark_read(&auth.0.user_id, &id).await?;
    Ok(Json(serde_json::json!({
        "id": delivery.id,
        "hasBeenRead": delivery.has_been_read,
    })))
}

/// Create notifications router
pub fn notifications_router(state: NotificationsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(trigger_motion_detected))
        .routes(routes!(trigger_person_detected))
        .routes(routes!(trigger_opening_state_changed))
        .routes(routes!(trigger_power_state_changed))
        .routes(routes!(list_my_notifications))
        .routes(routes!(mark_notification_read))
        .with_state(state)
}
