//! Device Catalog API

use axum::{
    extract::{Path, Query, State},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::{IntoParams, ToSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::device::entity::{CameraUsage, Device, DeviceKind};
use crate::device::service::{CreateDeviceArgs, DeviceService};
use crate::role::registry::permissions;
use crate::shared::api_common::{PaginatedResponse, PaginationParams};
use crate::shared::error::Result;
use crate::shared::middleware::Authenticated;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    pub id: String,
    pub name: String,
    pub model: String,
    pub description: String,
    pub main_photo: String,
    pub photos: Vec<String>,
    pub company_id: String,
    pub kind: DeviceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<CameraUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion_detection_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_detection_enabled: Option<bool>,
}

impl From<Device> for DeviceResponse {
    fn from(device: Device) -> Self {
        Self {
            id: device.id,
            name: device.name,
            model: device.model,
            description: device.description,
            main_photo: device.main_photo,
            photos: device.photos,
            company_id: device.company_id,
            kind: device.kind,
            usage: device.usage,
            motion_detection_enabled: device.motion_detection_enabled,
            person_detection_enabled: device.person_detection_enabled,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DevicesQuery {
    /// Filter by device name
    pub name: Option<String>,

    /// Filter by model
    pub model: Option<String>,

    /// Filter by owning company ID
    pub company_id: Option<String>,

    /// Filter by kind wire name, e.g. "securityCamera"
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportDevicesRequest {
    /// Import format, e.g. "json"
    pub format: String,

    /// File name inside the configured import directory
    pub file_name: String,
}

#[derive(Clone)]
pub struct DevicesState {
    pub device_service: Arc<DeviceService>,
}

/// List catalog devices. Public, no authentication required.
#[utoipa::path(
    get,
    path = "",
    tag = "devices",
    params(DevicesQuery, PaginationParams),
    responses(
        (status = 200, description = "Paginated device list", body = PaginatedResponse<DeviceResponse>),
        (status = 400, description = "Unknown kind filter")
    )
)]
pub async fn list_devices(
    State(state): State<DevicesState>,
    Query(query): Query<DevicesQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<DeviceResponse>>> {
    let kind = query.kind.as_deref().map(DeviceKind::parse).transpose()?;

    let (devices, total) = state
        .device_service
        .list_devices(
            query.name.as_deref(),
            query.model.as_deref(),
            query.company_id.as_deref(),
            kind,
            pagination.offset(),
            pagination.limit(),
        )
        .await?;

    let data = devices.into_iter().map(DeviceResponse::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        pagination.page(),
        pagination.size(),
        total,
    )))
}

/// Get a catalog device by ID. Public.
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "devices",
    params(("id" = String, Path, description = "Device ID")),
    responses(
        (status = 200, description = "Catalog device", body = DeviceResponse),
        (status = 404, description = "Device not found")
    )
)]
pub async fn get_device(
    State(state): State<DevicesState>,
    Path(id): Path<String>,
) -> Result<Json<DeviceResponse>> {
    let device = state.device_service.get_device(&id).await?;
    Ok(Json(device.into()))
}

/// List supported device kinds. Public.
#[utoipa::path(
    get,
    path = "/kinds",
    tag = "devices",
    responses(
        (status = 200, description = "Device kind wire names", body = Vec<String>)
    )
)]
pub async fn list_device_kinds() -> Json<Vec<&'static str>> {
    Json(DeviceKind::ALL.iter().map(DeviceKind::as_str).collect())
}

/// Register a catalog device under the caller's company
#[utoipa::path(
    post,
    path = "",
    tag = "devices",
    request_body = CreateDeviceArgs,
    responses(
        (status = 200, description = "Device registered", body = DeviceResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Caller has no company")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_device(
    State(state): State<DevicesState>,
    auth: Authenticated,
    Json(args): Json<CreateDeviceArgs>,
) -> Result<Json<DeviceResponse>> {
    crate::checks::require_permission(&auth.0, permissions::company::DEVICE_CREATE)?;

    let device = state.device_service.create_device(&auth.0, args).await?;
    Ok(Json(device.into()))
}

/// Bulk import catalog devices from a server-side file
#[utoipa::path(
    post,
    path = "/import",
    tag = "devices",
    request_body = ImportDevicesRequest,
    responses(
        (status = 200, description = "Imported devices", body = Vec<DeviceResponse>),
        (status = 400, description = "Unsupported format or invalid file"),
        (status = 404, description = "Caller has no company")
    ),
    security(("bearer_auth" = []))
)]
pub async fn import_devices(
    State(state): State<DevicesState>,
    auth: Authenticated,
    Json(request): Json<ImportDevicesRequest>,
) -> Result<Json<Vec<DeviceResponse>>> {
    crate::checks::require_permission(&auth.0, permissions::company::DEVICE_IMPORT)?;

    let devices = state
        .device_service
        .import_devices(&auth.0, &request.format, &request.file_name)
        .await?;
    Ok(Json(devices.into_iter().map(DeviceResponse::from).collect()))
}

/// Create devices router
pub fn devices_router(state: DevicesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_devices, create_device))
        .routes(routes!(list_device_kinds))
        .routes(routes!(get_device))
        .routes(routes!(import_devices))
        .with_state(state)
}
