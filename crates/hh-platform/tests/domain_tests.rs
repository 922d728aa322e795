//! Domain rule tests covering the flows end-to-end at the entity level:
//! membership capacity, permission grants, hardware state machines, and
//! notification recipient selection.

use hh_platform::device::entity::{CameraUsage, Device, DeviceKind};
use hh_platform::home::entity::{
    ConnectionState, HardwareDevice, Home, HomePermission, OpeningState, PowerState, Resident,
};
use hh_platform::notification::entity::{
    parse_read_filter, select_recipients, Notification, NotificationEvent, UserNotification,
};
use hh_platform::role::registry::{permissions, roles, RoleRegistry};
use hh_platform::user::entity::User;
use hh_platform::{AuthContext, HubError};

fn home_with_capacity(capacity: u32) -> Home {
    Home::new("Casa", "Calle 1", "owner-1", capacity)
}

#[test]
fn home_capacity_is_enforced_by_is_full() {
    let mut home = home_with_capacity(1);
    assert!(!home.is_full());
    home.residents_count = 1;
    assert!(home.is_full());
}

#[test]
fn resident_permission_grants_accumulate_without_dedup() {
    let mut resident = Resident::new("h1", "u1");
    resident.grant(HomePermission::ReceiveNotifications);
    resident.grant(HomePermission::BindDeviceToHome);
    resident.grant(HomePermission::ReceiveNotifications);

    assert_eq!(resident.permissions.len(), 3);
    assert!(resident.has_permission(HomePermission::ReceiveNotifications));
    assert!(resident.has_permission(HomePermission::BindDeviceToHome));
    assert!(!resident.has_permission(HomePermission::AddRoomToHome));
}

#[test]
fn window_sensor_lifecycle_closed_open_closed() {
    let mut sensor = HardwareDevice::install("h1", "r1", "d1", DeviceKind::WindowSensor, "Window");
    assert_eq!(sensor.opening_state, Some(OpeningState::Closed));

    sensor.set_opening_state(OpeningState::Open).unwrap();
    sensor.set_opening_state(OpeningState::Closed).unwrap();
    let err = sensor.set_opening_state(OpeningState::Closed).unwrap_err();
    assert!(err.to_string().contains("already in the specified state"));
}

#[test]
fn lamp_power_cycle_and_disconnect() {
    let mut lamp = HardwareDevice::install("h1", "r1", "d1", DeviceKind::SmartLamp, "Lamp");
    assert_eq!(lamp.power_state, Some(PowerState::Off));

    lamp.set_power_state(PowerState::On).unwrap();
    lamp.set_connection_state(ConnectionState::Disconnected).unwrap();
    assert!(!lamp.is_connected());
    // Power state survives disconnection
    assert_eq!(lamp.power_state, Some(PowerState::On));
}

#[test]
fn cameras_carry_no_opening_or_power_state() {
    let mut camera =
        HardwareDevice::install("h1", "r1", "d1", DeviceKind::SecurityCamera, "Cam");
    assert!(camera.set_opening_state(OpeningState::Open).is_err());
    assert!(camera.set_power_state(PowerState::On).is_err());
}

#[test]
fn event_support_matrix_matches_device_kinds() {
    let cases = [
        (NotificationEvent::MotionDetected, DeviceKind::MotionSensor, true),
        (NotificationEvent::MotionDetected, DeviceKind::SecurityCamera, true),
        (NotificationEvent::MotionDetected, DeviceKind::WindowSensor, false),
        (NotificationEvent::PersonDetected, DeviceKind::SecurityCamera, true),
        (NotificationEvent::PersonDetected, DeviceKind::MotionSensor, false),
        (NotificationEvent::OpeningStateChanged, DeviceKind::WindowSensor, true),
        (NotificationEvent::OpeningStateChanged, DeviceKind::SmartLamp, false),
        (NotificationEvent::PowerStateChanged, DeviceKind::SmartLamp, true),
        (NotificationEvent::PowerStateChanged, DeviceKind::SecurityCamera, false),
    ];
    for (event, kind, expected) in cases {
        assert_eq!(event.supports(kind), expected, "{:?} / {:?}", event, kind);
    }
}

#[test]
fn fan_out_targets_permitted_residents_and_always_the_owner() {
    let mut maria = Resident::new("h1", "maria");
    maria.grant(HomePermission::ReceiveNotifications);
    let pedro = Resident::new("h1", "pedro");
    let mut luisa = Resident::new("h1", "luisa");
    luisa.grant(HomePermission::AddRoomToHome);

    let recipients = select_recipients("owner-1", &[maria, pedro, luisa]);
    assert_eq!(recipients, vec!["maria".to_string(), "owner-1".to_string()]);
}

#[test]
fn one_delivery_per_recipient_starts_unread() {
    let notification = Notification::new(
        NotificationEvent::MotionDetected,
        "hw-1",
        DeviceKind::MotionSensor,
        "h1",
    );
    let delivery = UserNotification::new(&notification.id, "maria");
    assert!(!delivery.has_been_read);
    assert_eq!(delivery.notification_id, notification.id);
}

#[test]
fn read_filter_is_strict() {
    assert_eq!(parse_read_filter("Yes").unwrap(), Some(true));
    assert_eq!(parse_read_filter("No").unwrap(), Some(false));
    assert_eq!(parse_read_filter("").unwrap(), None);
    assert!(matches!(
        parse_read_filter("nope").unwrap_err(),
        HubError::Validation { .. }
    ));
}

#[test]
fn role_registry_scopes_system_permissions() {
    let registry = RoleRegistry::builtin();

    let admin = User::new("a@x.dev", "hash", "Ada", "Admin").with_role(roles::ADMINISTRATOR);
    let admin_ctx = AuthContext::for_user(&admin, &registry);
    assert!(admin_ctx.has_permission(permissions::admin::USER_LIST));
    assert!(admin_ctx.has_permission(permissions::admin::COMPANY_LIST));
    assert!(!admin_ctx.has_permission(permissions::home::HOME_CREATE));

    let owner = User::new("o@x.dev", "hash", "Omar", "Vega").with_role(roles::COMPANY_OWNER);
    let owner_ctx = AuthContext::for_user(&owner, &registry);
    assert!(owner_ctx.has_permission(permissions::company::DEVICE_CREATE));
    assert!(owner_ctx.has_permission(permissions::company::DEVICE_IMPORT));
    assert!(!owner_ctx.has_permission(permissions::admin::USER_LIST));

    let home_owner = User::new("h@x.dev", "hash", "Carla", "Reyes").with_role(roles::HOME_OWNER);
    let home_ctx = AuthContext::for_user(&home_owner, &registry);
    assert!(home_ctx.has_permission(permissions::home::HOME_CREATE));
    assert!(!home_ctx.has_permission(permissions::company::COMPANY_CREATE));
}

#[test]
fn catalog_detection_flags_gate_camera_events() {
    let camera = Device::new("Cam", "C-1", "d", "p.jpg", "c1", DeviceKind::SecurityCamera)
        .with_usage(CameraUsage::Indoor)
        .with_detection(false, true);
    assert!(!camera.motion_detection());
    assert!(camera.person_detection());

    let sensor = Device::new("PIR", "P-1", "d", "p.jpg", "c1", DeviceKind::MotionSensor);
    assert!(sensor.motion_detection());
}
