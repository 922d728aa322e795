//! Device Catalog Service
//!
//! Catalog device registration for company owners, including bulk import
//! through the [`ImporterRegistry`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::company::repository::CompanyRepository;
use crate::device::entity::{CameraUsage, Device, DeviceKind};
use crate::device::import::{DeviceImportRecord, ImporterRegistry};
use crate::device::repository::DeviceRepository;
use crate::shared::authorization_service::AuthContext;
use crate::shared::error::{HubError, Result};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeviceArgs {
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

pub struct DeviceService {
    device_repo: Arc<DeviceRepository>,
    company_repo: Arc<CompanyRepository>,
    importers: Arc<ImporterRegistry>,
    /// Directory import file names are resolved against
    import_dir: PathBuf,
}

impl DeviceService {
    pub fn new(
        device_repo: Arc<DeviceRepository>,
        company_repo: Arc<CompanyRepository>,
        importers: Arc<ImporterRegistry>,
        import_dir: PathBuf,
    ) -> Self {
        Self {
            device_repo,
            company_repo,
            importers,
            import_dir,
        }
    }

    /// Register one catalog device under the caller's company.
    pub async fn create_device(&self, owner: &AuthContext, args: CreateDeviceArgs) -> Result<Device> {
        let company = self
            .company_repo
            .find_by_owner(&owner.user_id)
            .await?
            .ok_or_else(|| HubError::not_found("Company not found"))?;

        let device = build_device(&company.id, args)?;
        self.device_repo.insert(&device).await?;
        info!(device_id = %device.id, company_id = %company.id, kind = device.kind.as_str(), "Catalog device registered");
        Ok(device)
    }

    /// Bulk import catalog devices from a file in the configured import
    /// directory. The whole batch is validated before anything is persisted.
    pub async fn import_devices(
        &self,
        owner: &AuthContext,
        format: &str,
        file_name: &str,
    ) -> Result<Vec<Device>> {
        let company = self
            .company_repo
            .find_by_owner(&owner.user_id)
            .await?
            .ok_or_else(|| HubError::not_found("Company not found"))?;

        let path = self.resolve_import_path(file_name)?;
        let importer = self.importers.get(format)?;
        let records = importer.read(&path)?;

        let devices = records
            .into_iter()
            .map(|record| build_device(&company.id, record.into()))
            .collect::<Result<Vec<_>>>()?;

        self.device_repo.insert_many(&devices).await?;
        info!(
            company_id = %company.id,
            format,
            count = devices.len(),
            "Catalog devices imported"
        );
        Ok(devices)
    }

    /// Only plain file names are accepted, the import directory is fixed.
    fn resolve_import_path(&self, file_name: &str) -> Result<PathBuf> {
        let name = Path::new(file_name);
        if file_name.is_empty() || name.components().count() != 1 {
            return Err(HubError::validation("Invalid import file name"));
        }
        Ok(self.import_dir.join(name))
    }

    pub async fn get_device(&self, id: &str) -> Result<Device> {
        self.device_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| HubError::not_found("Device not found"))
    }

    pub async fn list_devices(
        &self,
        name: Option<&str>,
        model: Option<&str>,
        company_id: Option<&str>,
        kind: Option<DeviceKind>,
        skip: u64,
        limit: i64,
    ) -> Result<(Vec<Device>, u64)> {
        let devices = self
            .device_repo
            .search(name, model, company_id, kind, skip, limit)
            .await?;
        let total = self
            .device_repo
            .count_with_filters(name, model, company_id, kind)
            .await?;
        Ok((devices, total))
    }
}

impl From<DeviceImportRecord> for CreateDeviceArgs {
    fn from(record: DeviceImportRecord) -> Self {
        Self {
            name: record.name,
            model: record.model,
            description: record.description,
            main_photo: record.main_photo,
            photos: record.photos,
            kind: record.kind,
            usage: record.usage,
            motion_detection_enabled: record.motion_detection_enabled,
            person_detection_enabled: record.person_detection_enabled,
        }
    }
}

/// Validate kind-conditional fields and assemble the entity.
fn build_device(company_id: &str, args: CreateDeviceArgs) -> Result<Device> {
    let name = args.name.trim();
    let model = args.model.trim();
    let main_photo = args.main_photo.trim();

    if name.is_empty() || model.is_empty() || main_photo.is_empty() {
        return Err(HubError::validation("Name, model and main photo are required"));
    }

    if args.kind.is_camera() {
        let usage = args
            .usage
            .ok_or_else(|| HubError::validation("Security cameras require a usage type"))?;
        let motion = args.motion_detection_enabled.ok_or_else(|| {
            HubError::validation("Security cameras require a motion detection setting")
        })?;
        let person = args.person_detection_enabled.ok_or_else(|| {
            HubError::validation("Security cameras require a person detection setting")
        })?;
        Ok(Device::new(name, model, args.description.trim(), main_photo, company_id, args.kind)
            .with_photos(args.photos)
            .with_usage(usage)
            .with_detection(motion, person))
    } else {
        if args.usage.is_some()
            || args.motion_detection_enabled.is_some()
            || args.person_detection_enabled.is_some()
        {
            return Err(HubError::validation(format!(
                "Camera settings are not valid for device kind '{}'",
                args.kind.as_str()
            )));
        }
        Ok(Device::new(name, model, args.description.trim(), main_photo, company_id, args.kind)
            .with_photos(args.photos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_args() -> CreateDeviceArgs {
        CreateDeviceArgs {
            name: "Watcher".into(),
            model: "W-100".into(),
            description: "Outdoor camera".into(),
            main_photo: "https://img.example/w100.jpg".into(),
            photos: vec![],
            kind: DeviceKind::SecurityCamera,
            usage: Some(CameraUsage::Outdoor),
            motion_detection_enabled: Some(true),
            person_detection_enabled: Some(false),
        }
    }

    #[test]
    fn test_build_camera_requires_camera_fields() {
        let device = build_device("c1", camera_args()).unwrap();
        assert_eq!(device.kind, DeviceKind::SecurityCamera);
        assert_eq!(device.usage, Some(CameraUsage::Outdoor));

        let mut args = camera_args();
        args.usage = None;
        assert!(build_device("c1", args).is_err());

        let mut args = camera_args();
        args.motion_detection_enabled = None;
        assert!(build_device("c1", args).is_err());
    }

    #[test]
    fn test_build_non_camera_rejects_camera_fields() {
        let mut args = camera_args();
        args.kind = DeviceKind::SmartLamp;
        let err = build_device("c1", args).unwrap_err();
        assert!(matches!(err, HubError::Validation { .. }));

        let args = CreateDeviceArgs {
            name: "Glow".into(),
            model: "G-1".into(),
            description: String::new(),
            main_photo: "p.jpg".into(),
            photos: vec![],
            kind: DeviceKind::SmartLamp,
            usage: None,
            motion_detection_enabled: None,
            person_detection_enabled: None,
        };
        let device = build_device("c1", args).unwrap();
        assert_eq!(device.kind, DeviceKind::SmartLamp);
        assert!(device.usage.is_none());
    }

    #[test]
    fn test_build_requires_core_fields() {
        let mut args = camera_args();
        args.name = "  ".into();
        assert!(build_device("c1", args).is_err());
    }
}
