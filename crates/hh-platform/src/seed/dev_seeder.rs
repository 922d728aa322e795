//! Development Data Seeder
//!
//! Seeds a known admin, a company owner with a small catalog, and a home
//! owner with a ready-made home. Idempotent, each record is created only if
//! its email or name is not already present.

use std::sync::Arc;

use tracing::{info, warn};

use crate::company::repository::CompanyRepository;
use crate::company::service::{CompanyService, CreateCompanyArgs};
use crate::device::entity::{CameraUsage, DeviceKind};
use crate::device::service::{CreateDeviceArgs, DeviceService};
use crate::home::service::{CreateHomeArgs, HomeService};
use crate::role::registry::{roles, RoleRegistry};
use crate::shared::authorization_service::AuthContext;
use crate::shared::error::Result;
use crate::user::entity::User;
use crate::user::repository::UserRepository;
use crate::user::service::{CreateUserArgs, SystemService};

const ADMIN_EMAIL: &str = "admin@homehub.dev";
const COMPANY_OWNER_EMAIL: &str = "owner@acme.dev";
const HOME_OWNER_EMAIL: &str = "casa@homehub.dev";
const DEV_PASSWORD: &str = "Dev-pass1!";

pub struct DevSeeder {
    system_service: Arc<SystemService>,
    company_service: Arc<CompanyService>,
    device_service: Arc<DeviceService>,
    home_service: Arc<HomeService>,
    user_repo: Arc<UserRepository>,
    company_repo: Arc<CompanyRepository>,
    registry: Arc<RoleRegistry>,
}

impl DevSeeder {
    pub fn new(
        system_service: Arc<SystemService>,
        company_service: Arc<CompanyService>,
        device_service: Arc<DeviceService>,
        home_service: Arc<HomeService>,
        user_repo: Arc<UserRepository>,
        company_repo: Arc<CompanyRepository>,
        registry: Arc<RoleRegistry>,
    ) -> Self {
        Self {
            system_service,
            company_service,
            device_service,
            home_service,
            user_repo,
            company_repo,
            registry,
        }
    }

    pub async fn run(&self) -> Result<()> {
        info!("Seeding development data");

        self.seed_user(ADMIN_EMAIL, "Ada", "Admin", roles::ADMINISTRATOR, None)
            .await?;
        let company_owner = self
            .seed_user(
                COMPANY_OWNER_EMAIL,
                "Omar",
                "Vega",
                roles::COMPANY_OWNER,
                None,
            )
            .await?;
        let home_owner = self
            .seed_user(
                HOME_OWNER_EMAIL,
                "Carla",
                "Reyes",
                roles::HOME_OWNER,
                Some("https://img.homehub.dev/carla.jpg"),
            )
            .await?;

        self.seed_company_and_catalog(&company_owner).await?;
        self.seed_home(&home_owner).await?;

        info!(
            admin = ADMIN_EMAIL,
            company_owner = COMPANY_OWNER_EMAIL,
            home_owner = HOME_OWNER_EMAIL,
            password = DEV_PASSWORD,
            "Development credentials"
        );
        Ok(())
    }

    async fn seed_user(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        role: &str,
        profile_photo: Option<&str>,
    ) -> Result<User> {
        if let Some(existing) = self.user_repo.find_by_email(email).await? {
            return Ok(existing);
        }

        let args = CreateUserArgs {
            email: email.to_string(),
            password: DEV_PASSWORD.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            profile_photo: profile_photo.map(String::from),
        };
        let user = match role {
            roles::ADMINISTRATOR => self.system_service.create_administrator(args).await?,
            roles::COMPANY_OWNER => self.system_service.create_company_owner(args).await?,
            _ => self.system_service.register_home_owner(args).await?,
        };
        info!(email, role, "Seeded user");
        Ok(user)
    }

    async fn seed_company_and_catalog(&self, owner: &User) -> Result<()> {
        if self.company_repo.find_by_owner(&owner.id).await?.is_some() {
            return Ok(());
        }
        let ctx = AuthContext::for_user(owner, &self.registry);

        self.company_service
            .create_company(
                &ctx,
                CreateCompanyArgs {
                    name: "Acme Smart Devices".to_string(),
                    logo_url: "https://img.homehub.dev/acme.png".to_string(),
                    rut: "7654321-K".to_string(),
                },
            )
            .await?;

        let catalog = [
            CreateDeviceArgs {
                name: "Watcher Pro".to_string(),
                model: "WP-200".to_string(),
                description: "Outdoor security camera".to_string(),
                main_photo: "https://img.homehub.dev/wp200.jpg".to_string(),
                photos: vec![],
                kind: DeviceKind::SecurityCamera,
                usage: Some(CameraUsage::Outdoor),
                motion_detection_enabled: Some(true),
                person_detection_enabled: Some(true),
            },
            CreateDeviceArgs {
                name: "Hall Sentry".to_string(),
                model: "HS-1".to_string(),
                description: "Passive infrared motion sensor".to_string(),
                main_photo: "https://img.homehub.dev/hs1.jpg".to_string(),
                photos: vec![],
                kind: DeviceKind::MotionSensor,
                usage: None,
                motion_detection_enabled: None,
                person_detection_enabled: None,
            },
            CreateDeviceArgs {
                name: "SealCheck".to_string(),
                model: "SC-3".to_string(),
                description: "Window opening sensor".to_string(),
                main_photo: "https://img.homehub.dev/sc3.jpg".to_string(),
                photos: vec![],
                kind: DeviceKind::WindowSensor,
                usage: None,
                motion_detection_enabled: None,
                person_detection_enabled: None,
            },
            CreateDeviceArgs {
                name: "Glow One".to_string(),
                model: "G-1".to_string(),
                description: "Dimmable smart lamp".to_string(),
                main_photo: "https://img.homehub.dev/g1.jpg".to_string(),
                photos: vec![],
                kind: DeviceKind::SmartLamp,
                usage: None,
                motion_detection_enabled: None,
                person_detection_enabled: None,
            },
        ];
        for args in catalog {
            self.device_service.create_device(&ctx, args).await?;
        }
        info!("Seeded company and device catalog");
        Ok(())
    }

    async fn seed_home(&self, owner: &User) -> Result<()> {
        let ctx = AuthContext::for_user(owner, &self.registry);
        let existing = self.home_service.list_user_homes(&owner.id).await?;
        if !existing.is_empty() {
            return Ok(());
        }

        let home = self
            .home_service
            .create_home(
                &ctx,
                CreateHomeArgs {
                    alias: "Casa Central".to_string(),
                    address: "Av. Providencia 1234".to_string(),
                    residents_allowed: 3,
                },
            )
            .await?;
        if let Err(e) = self.home_service.add_room(&ctx, &home.id, "Living Room").await {
            warn!(error = %e, "Could not seed room");
        }
        info!(home_id = %home.id, "Seeded home");
        Ok(())
    }
}
