//! Catalog Device Entity
//!
//! A company-owned product definition. Installed instances are
//! [`crate::home::entity::HardwareDevice`].

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

use crate::shared::error::{HubError, Result};

/// Closed set of catalog device kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum DeviceKind {
    SecurityCamera,
    MotionSensor,
    WindowSensor,
    SmartLamp,
}

impl DeviceKind {
    pub const ALL: &'static [DeviceKind] = &[
        DeviceKind::SecurityCamera,
        DeviceKind::MotionSensor,
        DeviceKind::WindowSensor,
        DeviceKind::SmartLamp,
    ];

    /// Wire name, matching the serde rename
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::SecurityCamera => "securityCamera",
            DeviceKind::MotionSensor => "motionSensor",
            DeviceKind::WindowSensor => "windowSensor",
            DeviceKind::SmartLamp => "smartLamp",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "securityCamera" => Ok(DeviceKind::SecurityCamera),
            "motionSensor" => Ok(DeviceKind::MotionSensor),
            "windowSensor" => Ok(DeviceKind::WindowSensor),
            "smartLamp" => Ok(DeviceKind::SmartLamp),
            other => Err(HubError::validation(format!(
                "Unknown device kind '{}'",
                other
            ))),
        }
    }

    pub fn is_camera(&self) -> bool {
        matches!(self, DeviceKind::SecurityCamera)
    }
}

/// Where a camera is meant to be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum CameraUsage {
    Indoor,
    Outdoor,
    Both,
}

/// Catalog device entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Product name
    pub name: String,

    /// Model identifier
    pub model: String,

    /// Description
    pub description: String,

    /// Main product photo URL
    pub main_photo: String,

    /// Additional photo URLs
    #[serde(default)]
    pub photos: Vec<String>,

    /// Owning company ID
    pub company_id: String,

    /// Device kind
    pub kind: DeviceKind,

    /// Usage type (cameras only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<CameraUsage>,

    /// Motion detection capability (cameras only; motion sensors always detect)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion_detection_enabled: Option<bool>,

    /// Person detection capability (cameras only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_detection_enabled: Option<bool>,

    /// Audit fields
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Device {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        description: impl Into<String>,
        main_photo: impl Into<String>,
        company_id: impl Into<String>,
        kind: DeviceKind,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            name: name.into(),
            model: model.into(),
            description: description.into(),
            main_photo: main_photo.into(),
            photos: vec![],
            company_id: company_id.into(),
            kind,
            usage: None,
            motion_detection_enabled: None,
            person_detection_enabled: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_photos(mut self, photos: Vec<String>) -> Self {
        self.photos = photos;
        self
    }

    pub fn with_usage(mut self, usage: CameraUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_detection(mut self, motion: bool, person: bool) -> Self {
        self.motion_detection_enabled = Some(motion);
        self.person_detection_enabled = Some(person);
        self
    }

    /// Whether this device can emit motion-detection events
    pub fn motion_detection(&self) -> bool {
        match self.kind {
            // Motion sensors always detect motion
            DeviceKind::MotionSensor => true,
            _ => self.motion_detection_enabled.unwrap_or(false),
        }
    }

    /// Whether this device can emit person-detection events
    pub fn person_detection(&self) -> bool {
        self.person_detection_enabled.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_names_round_trip() {
        for kind in DeviceKind::ALL {
            assert_eq!(DeviceKind::parse(kind.as_str()).unwrap(), *kind);
        }
        assert!(DeviceKind::parse("toaster").is_err());
    }

    #[test]
    fn test_kind_serde_matches_as_str() {
        for kind in DeviceKind::ALL {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_motion_sensor_always_detects_motion() {
        let sensor = Device::new("S", "m1", "d", "p.jpg", "c1", DeviceKind::MotionSensor);
        assert!(sensor.motion_detection());

        let camera = Device::new("C", "m2", "d", "p.jpg", "c1", DeviceKind::SecurityCamera);
        assert!(!camera.motion_detection());
        let camera = camera.with_detection(true, false);
        assert!(camera.motion_detection());
        assert!(!camera.person_detection());
    }
}
