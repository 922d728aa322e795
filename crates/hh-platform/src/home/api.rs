//! Homes API

use axum::{
    extract::{Path, State},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::device::entity::DeviceKind;
use crate::home::entity::{
    ConnectionState, HardwareDevice, Home, HomePermission, OpeningState, PowerState, Resident,
    Room,
};
use crate::home::service::{CreateHomeArgs, HomeService};
use crate::role::registry::permissions;
use crate::shared::error::Result;
use crate::shared::middleware::Authenticated;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomeResponse {
    pub id: String,
    pub alias: String,
    pub address: String,
    pub owner_id: String,
    pub residents_allowed: u32,
    pub residents_count: u32,
}

impl From<Home> for HomeResponse {
    fn from(home: Home) -> Self {
        Self {
            id: home.id,
            alias: home.alias,
            address: home.address,
            owner_id: home.owner_id,
            residents_allowed: home.residents_allowed,
            residents_count: home.residents_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub id: String,
    pub home_id: String,
    pub name: String,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            home_id: room.home_id,
            name: room.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResidentResponse {
    pub id: String,
    pub home_id: String,
    pub user_id: String,
    pub permissions: Vec<HomePermission>,
}

impl From<Resident> for ResidentResponse {
    fn from(resident: Resident) -> Self {
        Self {
            id: resident.id,
            home_id: resident.home_id,
            user_id: resident.user_id,
            permissions: resident.permissions,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HardwareDeviceResponse {
    pub id: String,
    pub home_id: String,
    pub room_id: String,
    pub device_id: String,
    pub kind: DeviceKind,
    pub name: String,
    pub connection_state: ConnectionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_state: Option<OpeningState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_state: Option<PowerState>,
}

impl From<HardwareDevice> for HardwareDeviceResponse {
    fn from(device: HardwareDevice) -> Self {
        Self {
            id: device.id,
            home_id: device.home_id,
            room_id: device.room_id,
            device_id: device.device_id,
            kind: device.kind,
            name: device.name,
            connection_state: device.connection_state,
            opening_state: device.opening_state,
            power_state: device.power_state,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddResidentRequest {
    /// ID of the home owner to add as a resident
    pub user_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantPermissionsRequest {
    pub permissions: Vec<HomePermission>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAliasRequest {
    pub alias: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddRoomRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstallDeviceRequest {
    pub room_id: String,
    pub device_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameDeviceRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStateRequest {
    /// "connected" or "disconnected"
    pub state: String,
}

#[derive(Clone)]
pub struct HomesState {
    pub home_service: Arc<HomeService>,
}

/// Register a home owned by the caller
#[utoipa::path(
    post,
    path = "",
    tag = "homes",
    request_body = CreateHomeArgs,
    responses(
        (status = 200, description = "Home registered", body = HomeResponse),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_home(
    State(state): State<HomesState>,
    auth: Authenticated,
    Json(args): Json<CreateHomeArgs>,
) -> Result<Json<HomeResponse>> {
    crate::checks::require_permission(&auth.0, permissions::home::HOME_CREATE)?;

    let home = state.home_service.create_home(&auth.0, args).await?;
    Ok(Json(home.into()))
}

/// Homes the caller owns or lives in
#[utoipa::path(
    get,
    path = "",
    tag = "homes",
    responses(
        (status = 200, description = "The caller's homes", body = Vec<HomeResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_homes(
    State(state): State<HomesState>,
    auth: Authenticated,
) -> Result<Json<Vec<HomeResponse>>> {
    let homes = state.home_service.list_user_homes(&auth.0.user_id).await?;
    Ok(Json(homes.into_iter().map(HomeResponse::from).collect()))
}

/// Add a home owner as a resident
#[utoipa::path(
    post,
    path = "/{id}/residents",
    tag = "homes",
    params(("id" = String, Path, description = "Home ID")),
    request_body = AddResidentRequest,
    responses(
        (status = 200, description = "Resident added", body = ResidentResponse),
        (status = 400, description = "Home full, user not a home owner, or already a resident"),
        (status = 403, description = "Caller is not the home owner"),
        (status = 404, description = "Home or user not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_resident(
    State(state): State<HomesState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(request): Json<AddResidentRequest>,
) -> Result<Json<ResidentResponse>> {
    let resident = state
        .home_service
        .add_user_to_home(&auth.0, &id, &request.user_id)
        .await?;
    Ok(Json(resident.into()))
}

/// Permissions a resident holds in the home
#[utoipa::path(
    get,
    path = "/{id}/residents/{user_id}/permissions",
    tag = "homes",
    params(
        ("id" = String, Path, description = "Home ID"),
        ("user_id" = String, Path, description = "Resident user ID")
    ),
    responses(
        (status = 200, description = "Granted permissions", body = Vec<HomePermission>),
        (status = 400, description = "User is not a resident of this home"),
        (status = 404, description = "Home not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_resident_permissions(
    State(state): State<HomesState>,
    auth: Authenticated,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<Vec<HomePermission>>> {
    let permissions = state
        .home_service
        .get_resident_permissions(&auth.0, &id, &user_id)
        .await?;
    Ok(Json(permissions))
}

/// Grant permissions to a resident
#[utoipa::path(
    patch,
    path = "/{id}/residents/{user_id}/permissions",
    tag = "homes",
    params(
        ("id" = String, Path, description = "Home ID"),
        ("user_id" = String, Path, description = "Resident user ID")
    ),
    request_body = GrantPermissionsRequest,
    responses(
        (status = 200, description = "Updated resident", body = ResidentResponse),
        (status = 403, description = "Caller is not the home owner"),
        (status = 404, description = "Home not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn grant_resident_permissions(
    State(state): State<HomesState>,
    auth: Authenticated,
    Path((id, user_id)): Path<(String, String)>,
    Json(request): Json<GrantPermissionsRequest>,
) -> Result<Json<ResidentResponse>> {
    let resident = state
        .home_service
        .configure_resident_permissions(&auth.0, &id, &user_id, &request.permissions)
        .await?;
    Ok(Json(resident.into()))
}

/// Change the home alias
#[utoipa::path(
    patch,
    path = "/{id}/alias",
    tag = "homes",
    params(("id" = String, Path, description = "Home ID")),
    request_body = ChangeAliasRequest,
    responses(
        (status = 200, description = "Updated home", body = HomeResponse),
        (status = 403, description = "Caller is not a member of the home"),
        (status = 404, description = "Home not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_home_alias(
    State(state): State<HomesState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(request): Json<ChangeAliasRequest>,
) -> Result<Json<HomeResponse>> {
    let home = state
        .home_service
        .change_home_alias(&auth.0, &id, &request.alias)
        .await?;
    Ok(Json(home.into()))
}

/// Add a room to the home
#[utoipa::path(
    post,
    path = "/{id}/rooms",
    tag = "homes",
    params(("id" = String, Path, description = "Home ID")),
    request_body = AddRoomRequest,
    responses(
        (status = 200, description = "Room added", body = RoomResponse),
        (status = 403, description = "Caller lacks the AddRoomToHome permission"),
        (status = 404, description = "Home not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_room(
    State(state): State<HomesState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(request): Json<AddRoomRequest>,
) -> Result<Json<RoomResponse>> {
    let room = state.home_service.add_room(&auth.0, &id, &request.name).await?;
    Ok(Json(room.into()))
}

/// Rooms of the home
#[utoipa::path(
    get,
    path = "/{id}/rooms",
    tag = "homes",
    params(("id" = String, Path, description = "Home ID")),
    responses(
        (status = 200, description = "Rooms", body = Vec<RoomResponse>),
        (status = 404, description = "Home not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_rooms(
    State(state): State<HomesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Vec<RoomResponse>>> {
    let rooms = state.home_service.list_rooms(&auth.0, &id).await?;
    Ok(Json(rooms.into_iter().map(RoomResponse::from).collect()))
}

/// Install a catalog device into a room
#[utoipa::path(
    post,
    path = "/{id}/devices",
    tag = "homes",
    params(("id" = String, Path, description = "Home ID")),
    request_body = InstallDeviceRequest,
    responses(
        (status = 200, description = "Installed hardware device", body = HardwareDeviceResponse),
        (status = 403, description = "Caller lacks the BindDeviceToHome permission"),
        (status = 404, description = "Home, room, or device not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn install_device(
    State(state): State<HomesState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(request): Json<InstallDeviceRequest>,
) -> Result<Json<HardwareDeviceResponse>> {
    let hardware = state
        .home_service
        .add_device_to_home(&auth.0, &id, &request.room_id, &request.device_id, &request.name)
        .await?;
    Ok(Json(hardware.into()))
}

/// Installed hardware devices of the home
#[utoipa::path(
    get,
    path = "/{id}/devices",
    tag = "homes",
    params(("id" = String, Path, description = "Home ID")),
    responses(
        (status = 200, description = "Installed devices", body = Vec<HardwareDeviceResponse>),
        (status = 403, description = "Caller lacks the ListHardwareDevices permission"),
        (status = 404, description = "Home not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_hardware_devices(
    State(state): State<HomesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Vec<HardwareDeviceResponse>>> {
    let devices = state.home_service.list_hardware_devices(&auth.0, &id).await?;
    Ok(Json(devices.into_iter().map(HardwareDeviceResponse::from).collect()))
}

/// Rename an installed hardware device
#[utoipa::path(
    patch,
    path = "/{id}/devices/{hardware_id}/name",
    tag = "homes",
    params(
        ("id" = String, Path, description = "Home ID"),
        ("hardware_id" = String, Path, description = "Hardware device ID")
    ),
    request_body = RenameDeviceRequest,
    responses(
        (status = 200, description = "Updated hardware device", body = HardwareDeviceResponse),
        (status = 403, description = "Caller lacks the ChangeHardwareDeviceName permission"),
        (status = 404, description = "Home or hardware device not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn rename_hardware_device(
    State(state): State<HomesState>,
    auth: Authenticated,
    Path((id, hardware_id)): Path<(String, String)>,
    Json(request): Json<RenameDeviceRequest>,
) -> Result<Json<HardwareDeviceResponse>> {
    let hardware = state
        .home_service
        .change_hardware_device_name(&auth.0, &id, &hardware_id, &request.name)
        .await?;
    Ok(Json(hardware.into()))
}

/// List grantable home permissions. Public.
#[utoipa::path(
    get,
    path = "/permissions",
    tag = "homes",
    responses(
        (status = 200, description = "Grantable home permissions", body = Vec<HomePermission>)
    )
)]
pub async fn list_home_permissions() -> Json<Vec<HomePermission>> {
    Json(HomePermission::ALL.to_vec())
}

/// Hardware-facing connectivity update. Unauthenticated, devices report in
/// over this endpoint.
#[utoipa::path(
    patch,
    path = "/hardware/{hardware_id}/connection",
    tag = "homes",
    params(("hardware_id" = String, Path, description = "Hardware device ID")),
    request_body = ConnectionStateRequest,
    responses(
        (status = 200, description = "Updated hardware device", body = HardwareDeviceResponse),
        (status = 400, description = "Unknown state or no-op transition"),
        (status = 404, description = "Hardware device not found")
    )
)]
pub async fn update_connection_state(
    State(state): State<HomesState>,
    Path(hardware_id): Path<String>,
    Json(request): Json<ConnectionStateRequest>,
) -> Result<Json<HardwareDeviceResponse>> {
    let target = ConnectionState::parse(&request.state)?;
    let hardware = state
        .home_service
        .update_connection_state(&hardware_id, target)
        .await?;
    Ok(Json(hardware.into()))
}

/// Create homes router
pub fn homes_router(state: HomesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_home, list_my_homes))
        .routes(routes!(add_resident))
        .routes(routes!(get_resident_permissions, grant_resident_permissions))
        .routes(routes!(change_home_alias))
        .routes(routes!(add_room, list_rooms))
        .routes(routes!(install_device, list_hardware_devices))
        .routes(routes!(rename_hardware_device))
        .routes(routes!(list_home_permissions))
        .routes(routes!(update_connection_state))
        .with_state(state)
}
