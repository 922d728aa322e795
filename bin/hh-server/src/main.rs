//! HomeHub Server
//!
//! Production server for the smart-home management REST APIs:
//! - System APIs: users, roles, companies
//! - Catalog APIs: devices and bulk import
//! - Home APIs: homes, rooms, residents, installed hardware
//! - Notification APIs: hardware event triggers and per-user inboxes
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HH_API_PORT` | `8080` | HTTP API port |
//! | `HH_MONGO_URL` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `HH_MONGO_DB` | `homehub` | MongoDB database name |
//! | `HH_IMPORT_DIR` | `./imports` | Directory for device import files |
//! | `HH_DEV_MODE` | `false` | Seed development data on startup |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;
use axum::{routing::get, response::Json, Router};
use utoipa_axum::router::OpenApiRouter;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use anyhow::Result;
use tracing::info;
use tokio::{net::TcpListener, signal};
use utoipa_swagger_ui::SwaggerUi;

use hh_platform::auth::api::{auth_router, AuthApiState};
use hh_platform::auth::password_service::PasswordService;
use hh_platform::auth::session_repository::SessionRepository;
use hh_platform::auth::session_service::SessionService;
use hh_platform::company::api::{companies_router, CompaniesState};
use hh_platform::company::repository::CompanyRepository;
use hh_platform::company::service::CompanyService;
use hh_platform::device::api::{devices_router, DevicesState};
use hh_platform::device::import::ImporterRegistry;
use hh_platform::device::repository::DeviceRepository;
use hh_platform::device::service::DeviceService;
use hh_platform::home::api::{homes_router, HomesState};
use hh_platform::home::repository::{
    HardwareDeviceRepository, HomeRepository, ResidentRepository, RoomRepository,
};
use hh_platform::home::service::HomeService;
use hh_platform::notification::api::{notifications_router, NotificationsState};
use hh_platform::notification::repository::{NotificationRepository, UserNotificationRepository};
use hh_platform::notification::service::NotificationService;
use hh_platform::seed::dev_seeder::DevSeeder;
use hh_platform::user::api::{users_router, UsersState};
use hh_platform::user::repository::UserRepository;
use hh_platform::user::service::SystemService;
use hh_platform::{AppState, AuthLayer, AuthorizationService, RoleRegistry};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    hh_common::logging::init_logging("hh-server");

    info!("Starting HomeHub Server");

    // Configuration from environment
    let api_port: u16 = env_or_parse("HH_API_PORT", 8080);
    let mongo_url = env_or("HH_MONGO_URL", "mongodb://localhost:27017");
    let mongo_db = env_or("HH_MONGO_DB", "homehub");
    let import_dir = std::path::PathBuf::from(env_or("HH_IMPORT_DIR", "./imports"));

    // Connect to MongoDB
    info!("Connecting to MongoDB: {}/{}", mongo_url, mongo_db);
    let mongo_client = mongodb::Client::with_uri_str(&mongo_url).await?;
    let db = mongo_client.database(&mongo_db);

    // Repositories
    let user_repo = Arc::new(UserRepository::new(&db));
    let company_repo = Arc::new(CompanyRepository::new(&db));
    let device_repo = Arc::new(DeviceRepository::new(&db));
    let home_repo = Arc::new(HomeRepository::new(&db));
    let room_repo = Arc::new(RoomRepository::new(&db));
    let resident_repo = Arc::new(ResidentRepository::new(&db));
    let hardware_repo = Arc::new(HardwareDeviceRepository::new(&db));
    let notification_repo = Arc::new(NotificationRepository::new(&db));
    let user_notification_repo = Arc::new(UserNotificationRepository::new(&db));
    info!("Repositories initialized");

    // Services
    let registry = Arc::new(RoleRegistry::builtin());
    let password_service = Arc::new(PasswordService::default());
    let authz_service = Arc::new(AuthorizationService::new(registry.clone()));
    let session_repo = Arc::new(SessionRepository::new(&db));
    let session_service = Arc::new(SessionService::new(
        session_repo,
        user_repo.clone(),
        password_service.clone(),
        authz_service,
    ));
    let system_service = Arc::new(SystemService::new(
        user_repo.clone(),
        password_service.clone(),
        registry.clone(),
    ));
    let company_service = Arc::new(CompanyService::new(company_repo.clone()));
    let importers = Arc::new(ImporterRegistry::builtin());
    let device_service = Arc::new(DeviceService::new(
        device_repo.clone(),
        company_repo.clone(),
        importers,
        import_dir,
    ));
    let home_service = Arc::new(HomeService::new(
        home_repo.clone(),
        room_repo,
        resident_repo.clone(),
        hardware_repo.clone(),
        device_repo.clone(),
        user_repo.clone(),
    ));
    let notification_service = Arc::new(NotificationService::new(
        notification_repo,
        user_notification_repo,
        hardware_repo,
        home_repo,
        resident_repo,
        device_repo,
    ));
    info!("Services initialized");

    // Seed development data if in dev mode
    let dev_mode = std::env::var("HH_DEV_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    if dev_mode {
        let seeder = DevSeeder::new(
            system_service.clone(),
            company_service.clone(),
            device_service.clone(),
            home_service.clone(),
            user_repo,
            company_repo,
            registry,
        );
        if let Err(e) = seeder.run().await {
            tracing::warn!("Dev data seeding skipped (data may already exist): {}", e);
        }
    }

    let app_state = AppState {
        session_service: session_service.clone(),
    };

    // API states
    let users_state = UsersState { system_service };
    let companies_state = CompaniesState { company_service };
    let devices_state = DevicesState { device_service };
    let homes_state = HomesState { home_service };
    let notifications_state = NotificationsState {
        notification_service,
    };
    let auth_state = AuthApiState { session_service };

    // Build API router using OpenApiRouter for auto-collected OpenAPI paths
    let (router, mut openapi) = OpenApiRouter::new()
        .nest("/api/users", users_router(users_state))
        .nest("/api/companies", companies_router(companies_state))
        .nest("/api/devices", devices_router(devices_state))
        .nest("/api/homes", homes_router(homes_state))
        .nest("/api/notifications", notifications_router(notifications_state))
        .nest("/auth", auth_router(auth_state))
        .split_for_parts();

    openapi.info.title = "HomeHub API".to_string();
    openapi.info.version = "1.0.0".to_string();
    openapi.info.description =
        Some("REST APIs for users, companies, homes, and notifications".to_string());

    let app = Router::new()
        .merge(router)
        .route("/health", get(health_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .layer(AuthLayer::new(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    // Start API server
    let api_addr = format!("0.0.0.0:{}", api_port);
    info!("API server listening on http://{}", api_addr);

    let api_listener = TcpListener::bind(&api_addr).await?;
    let api_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(api_listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    info!("HomeHub Server started");
    info!("Press Ctrl+C to shutdown");

    shutdown_signal().await;
    info!("Shutdown signal received...");

    api_task.abort();

    info!("HomeHub Server shutdown complete");
    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
