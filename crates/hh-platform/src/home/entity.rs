//! Home Aggregate Entities
//!
//! A home is owned by one home-owner user and holds rooms, resident
//! memberships, and installed hardware devices. Hardware state transitions
//! live here so the rules are testable without a database.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

use crate::device::entity::DeviceKind;
use crate::shared::error::{HubError, Result};

/// Per-home capabilities a resident can be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum HomePermission {
    BindDeviceToHome,
    AddRoomToHome,
    ListHardwareDevices,
    ChangeHardwareDeviceName,
    ReceiveNotifications,
}

impl HomePermission {
    pub const ALL: &'static [HomePermission] = &[
        HomePermission::BindDeviceToHome,
        HomePermission::AddRoomToHome,
        HomePermission::ListHardwareDevices,
        HomePermission::ChangeHardwareDeviceName,
        HomePermission::ReceiveNotifications,
    ];
}

/// A registered home
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Home {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Display alias, owner-editable
    pub alias: String,

    /// Street address
    pub address: String,

    /// Owning user ID
    pub owner_id: String,

    /// Maximum number of residents (owner excluded)
    pub residents_allowed: u32,

    /// Current number of residents (owner excluded)
    pub residents_count: u32,

    /// Audit fields
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Home {
    pub fn new(
        alias: impl Into<String>,
        address: impl Into<String>,
        owner_id: impl Into<String>,
        residents_allowed: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            alias: alias.into(),
            address: address.into(),
            owner_id: owner_id.into(),
            residents_allowed,
            residents_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_full(&self) -> bool {
        self.residents_count >= self.residents_allowed
    }
}

/// A room inside a home
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(rename = "_id")]
    pub id: String,
    pub home_id: String,
    pub name: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(home_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            home_id: home_id.into(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A user's membership in a home, with granted permissions.
///
/// Grants are append-only and may repeat; checks treat the list as a set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    #[serde(rename = "_id")]
    pub id: String,
    pub home_id: String,
    pub user_id: String,
    #[serde(default)]
    pub permissions: Vec<HomePermission>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Resident {
    pub fn new(home_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            home_id: home_id.into(),
            user_id: user_id.into(),
            permissions: vec![],
            created_at: Utc::now(),
        }
    }

    pub fn grant(&mut self, permission: HomePermission) {
        self.permissions.push(permission);
    }

    pub fn has_permission(&self, permission: HomePermission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// Connectivity of an installed device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "connected" => Ok(ConnectionState::Connected),
            "disconnected" => Ok(ConnectionState::Disconnected),
            other => Err(HubError::validation(format!(
                "Unknown connection state '{}'",
                other
            ))),
        }
    }
}

/// Open or closed, window sensors only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum OpeningState {
    Open,
    Closed,
}

impl OpeningState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpeningState::Open => "open",
            OpeningState::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(OpeningState::Open),
            "closed" => Ok(OpeningState::Closed),
            other => Err(HubError::validation(format!(
                "Unknown opening state '{}'",
                other
            ))),
        }
    }
}

/// Power state, smart lamps only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum PowerState {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
}

impl PowerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerState::On => "ON",
            PowerState::Off => "OFF",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "ON" => Ok(PowerState::On),
            "OFF" => Ok(PowerState::Off),
            other => Err(HubError::validation(format!(
                "Unknown power state '{}'",
                other
            ))),
        }
    }
}

/// An installed instance of a catalog device inside a home
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareDevice {
    #[serde(rename = "_id")]
    pub id: String,

    /// Owning home
    pub home_id: String,

    /// Room the device is placed in
    pub room_id: String,

    /// Catalog device this is an instance of
    pub device_id: String,

    /// Kind, denormalized from the catalog entry
    pub kind: DeviceKind,

    /// Display name, editable by permitted residents
    pub name: String,

    pub connection_state: ConnectionState,

    /// Present for window sensors only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_state: Option<OpeningState>,

    /// Present for smart lamps only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_state: Option<PowerState>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl HardwareDevice {
    /// New installation. Starts connected; window sensors start closed and
    /// smart lamps start off, other kinds carry no extra state.
    pub fn install(
        home_id: impl Into<String>,
        room_id: impl Into<String>,
        device_id: impl Into<String>,
        kind: DeviceKind,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            home_id: home_id.into(),
            room_id: room_id.into(),
            device_id: device_id.into(),
            kind,
            name: name.into(),
            connection_state: ConnectionState::Connected,
            opening_state: (kind == DeviceKind::WindowSensor).then_some(OpeningState::Closed),
            power_state: (kind == DeviceKind::SmartLamp).then_some(PowerState::Off),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection_state == ConnectionState::Connected
    }

    /// Flip connectivity. Rejects a no-op transition.
    pub fn set_connection_state(&mut self, state: ConnectionState) -> Result<()> {
        if self.connection_state == state {
            return Err(HubError::validation("Device is already in the specified state"));
        }
        self.connection_state = state;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Flip the opening state. Only valid for devices that carry one.
    pub fn set_opening_state(&mut self, state: OpeningState) -> Result<()> {
        let current = self.opening_state.ok_or_else(|| {
            HubError::validation(format!(
                "Hardware device of type '{}' does not support this action",
                self.kind.as_str()
            ))
        })?;
        if current == state {
            return Err(HubError::validation("Device is already in the specified state"));
        }
        self.opening_state = Some(state);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Flip the power state. Only valid for devices that carry one.
    pub fn set_power_state(&mut self, state: PowerState) -> Result<()> {
        let current = self.power_state.ok_or_else(|| {
            HubError::validation(format!(
                "Hardware device of type '{}' does not support this action",
                self.kind.as_str()
            ))
        })?;
        if current == state {
            return Err(HubError::validation("Device is already in the specified state"));
        }
        self.power_state = Some(state);
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_lists_every_grantable_permission() {
        assert_eq!(HomePermission::ALL.len(), 5);
        for permission in [
            HomePermission::BindDeviceToHome,
            HomePermission::AddRoomToHome,
            HomePermission::ListHardwareDevices,
            HomePermission::ChangeHardwareDeviceName,
            HomePermission::ReceiveNotifications,
        ] {
            assert!(HomePermission::ALL.contains(&permission));
        }
    }

    #[test]
    fn test_home_is_full() {
        let mut home = Home::new("Beach house", "1 Shore Rd", "u1", 2);
        assert!(!home.is_full());
        home.residents_count = 2;
        assert!(home.is_full());
    }

    #[test]
    fn test_resident_grants_are_append_only() {
        let mut resident = Resident::new("h1", "u2");
        assert!(!resident.has_permission(HomePermission::AddRoomToHome));

        resident.grant(HomePermission::AddRoomToHome);
        resident.grant(HomePermission::AddRoomToHome);
        // Duplicates are kept, membership still holds
        assert_eq!(resident.permissions.len(), 2);
        assert!(resident.has_permission(HomePermission::AddRoomToHome));
        assert!(!resident.has_permission(HomePermission::ReceiveNotifications));
    }

    #[test]
    fn test_install_initial_state_per_kind() {
        let sensor = HardwareDevice::install("h1", "r1", "d1", DeviceKind::WindowSensor, "Window");
        assert_eq!(sensor.connection_state, ConnectionState::Connected);
        assert_eq!(sensor.opening_state, Some(OpeningState::Closed));
        assert!(sensor.power_state.is_none());

        let lamp = HardwareDevice::install("h1", "r1", "d2", DeviceKind::SmartLamp, "Lamp");
        assert_eq!(lamp.power_state, Some(PowerState::Off));
        assert!(lamp.opening_state.is_none());

        let camera = HardwareDevice::install("h1", "r1", "d3", DeviceKind::SecurityCamera, "Cam");
        assert!(camera.opening_state.is_none());
        assert!(camera.power_state.is_none());
    }

    #[test]
    fn test_connection_transition_rejects_noop() {
        let mut device =
            HardwareDevice::install("h1", "r1", "d1", DeviceKind::MotionSensor, "Hall");
        let err = device.set_connection_state(ConnectionState::Connected).unwrap_err();
        assert!(matches!(err, HubError::Validation { .. }));

        device.set_connection_state(ConnectionState::Disconnected).unwrap();
        assert!(!device.is_connected());
        device.set_connection_state(ConnectionState::Connected).unwrap();
        assert!(device.is_connected());
    }

    #[test]
    fn test_opening_transition_only_for_window_sensors() {
        let mut lamp = HardwareDevice::install("h1", "r1", "d1", DeviceKind::SmartLamp, "Lamp");
        let err = lamp.set_opening_state(OpeningState::Open).unwrap_err();
        assert!(matches!(err, HubError::Validation { .. }));

        let mut sensor =
            HardwareDevice::install("h1", "r1", "d2", DeviceKind::WindowSensor, "Window");
        assert!(sensor.set_opening_state(OpeningState::Closed).is_err());
        sensor.set_opening_state(OpeningState::Open).unwrap();
        assert_eq!(sensor.opening_state, Some(OpeningState::Open));
    }

    #[test]
    fn test_power_transition_only_for_lamps() {
        let mut sensor =
            HardwareDevice::install("h1", "r1", "d1", DeviceKind::WindowSensor, "Window");
        assert!(sensor.set_power_state(PowerState::On).is_err());

        let mut lamp = HardwareDevice::install("h1", "r1", "d2", DeviceKind::SmartLamp, "Lamp");
        assert!(lamp.set_power_state(PowerState::Off).is_err());
        lamp.set_power_state(PowerState::On).unwrap();
        assert_eq!(lamp.power_state, Some(PowerState::On));
    }

    #[test]
    fn test_power_state_wire_names() {
        assert_eq!(serde_json::to_string(&PowerState::On).unwrap(), "\"ON\"");
        assert_eq!(serde_json::to_string(&PowerState::Off).unwrap(), "\"OFF\"");
        assert_eq!(PowerState::parse("ON").unwrap(), PowerState::On);
        assert!(PowerState::parse("on").is_err());
    }
}
