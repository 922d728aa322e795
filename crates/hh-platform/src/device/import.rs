//! Device Catalog Import
//!
//! Bulk import of catalog devices from files. Each supported file format is a
//! [`DeviceImporter`] registered by name in the [`ImporterRegistry`]; callers
//! pick the format explicitly, there is no sniffing.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::device::entity::{CameraUsage, DeviceKind};
use crate::shared::error::{HubError, Result};

/// One device row as read from an import file, before validation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceImportRecord {
    pub name: String,
    pub model: String,
    #[serde(default)]
    pub description: String,
    pub main_photo: String,
    #[serde(default)]
    pub photos: Vec<String>,
    pub kind: DeviceKind,
    #[serde(default)]
    pub usage: Option<CameraUsage>,
    #[serde(default)]
    pub motion_detection_enabled: Option<bool>,
    #[serde(default)]
    pub person_detection_enabled: Option<bool>,
}

/// A parser for one import file format
pub trait DeviceImporter: Send + Sync {
    /// Format name used to select this importer, e.g. "json"
    fn format_name(&self) -> &'static str;

    /// Parse the file into import records. Parse errors are validation errors.
    fn read(&self, path: &Path) -> Result<Vec<DeviceImportRecord>>;
}

/// Format name to importer mapping. Built at startup; no runtime discovery.
pub struct ImporterRegistry {
    importers: HashMap<&'static str, Arc<dyn DeviceImporter>>,
}

impl ImporterRegistry {
    pub fn new() -> Self {
        Self {
            importers: HashMap::new(),
        }
    }

    /// Registry with all built-in importers
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JsonDeviceImporter));
        registry
    }

    pub fn register(&mut self, importer: Arc<dyn DeviceImporter>) {
        debug!(format = importer.format_name(), "Registered device importer");
        self.importers.insert(importer.format_name(), importer);
    }

    pub fn get(&self, format: &str) -> Result<Arc<dyn DeviceImporter>> {
        self.importers
            .get(format)
            .cloned()
            .ok_or_else(|| HubError::validation(format!("Unsupported import format '{}'", format)))
    }

    pub fn formats(&self) -> Vec<&'static str> {
        let mut formats: Vec<_> = self.importers.keys().copied().collect();
        formats.sort_unstable();
        formats
    }
}

impl Default for ImporterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// JSON import format: `{"devices": [ ... ]}`
pub struct JsonDeviceImporter;

#[derive(Deserialize)]
struct JsonImportFile {
    devices: Vec<DeviceImportRecord>,
}

impl DeviceImporter for JsonDeviceImporter {
    fn format_name(&self) -> &'static str {
        "json"
    }

    fn read(&self, path: &Path) -> Result<Vec<DeviceImportRecord>> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HubError::validation(format!("Cannot read import file '{}': {}", path.display(), e))
        })?;
        let file: JsonImportFile = serde_json::from_str(&content)
            .map_err(|e| HubError::validation(format!("Invalid import file: {}", e)))?;
        Ok(file.devices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_json_importer_reads_devices() {
        let file = write_temp(
            r#"{
                "devices": [
                    {
                        "name": "Watcher",
                        "model": "W-100",
                        "mainPhoto": "https://img.example/w100.jpg",
                        "kind": "securityCamera",
                        "usage": "outdoor",
                        "motionDetectionEnabled": true,
                        "personDetectionEnabled": false
                    },
                    {
                        "name": "Glow",
                        "model": "G-1",
                        "mainPhoto": "https://img.example/g1.jpg",
                        "kind": "smartLamp"
                    }
                ]
            }"#,
        );

        let records = JsonDeviceImporter.read(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, DeviceKind::SecurityCamera);
        assert_eq!(records[0].usage, Some(CameraUsage::Outdoor));
        assert_eq!(records[1].kind, DeviceKind::SmartLamp);
        assert!(records[1].usage.is_none());
    }

    #[test]
    fn test_json_importer_rejects_unknown_kind() {
        let file = write_temp(
            r#"{"devices": [{"name": "X", "model": "M", "mainPhoto": "p", "kind": "toaster"}]}"#,
        );
        let err = JsonDeviceImporter.read(file.path()).unwrap_err();
        assert!(matches!(err, HubError::Validation { .. }));
    }

    #[test]
    fn test_registry_lookup() {
        let registry = ImporterRegistry::builtin();
        assert!(registry.get("json").is_ok());
        assert!(registry.get("xml").is_err());
        assert_eq!(registry.formats(), vec!["json"]);
    }
}
