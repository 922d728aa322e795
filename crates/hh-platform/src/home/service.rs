//! Home Service
//!
//! Home lifecycle, resident membership, rooms, and installed hardware.
//! Membership checks are ordered so callers get the most specific error.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::device::repository::DeviceRepository;
use crate::home::entity::{
    ConnectionState, HardwareDevice, Home, HomePermission, Resident, Room,
};
use crate::home::repository::{
    HardwareDeviceRepository, HomeRepository, ResidentRepository, RoomRepository,
};
use crate::role::registry::roles;
use crate::shared::authorization_service::AuthContext;
use crate::shared::error::{HubError, Result};
use crate::user::entity::User;
use crate::user::repository::UserRepository;

/// Ordered admission checks for adding a resident. Returns the admitted user.
///
/// Ordering matters for the error a caller sees: ownership, capacity, target
/// existence, target role, owner-as-resident, duplicate membership.
fn admit_resident<'a>(
    home: &Home,
    caller_id: &str,
    target: Option<&'a User>,
    already_resident: bool,
) -> Result<&'a User> {
    if home.owner_id != caller_id {
        return Err(HubError::forbidden("Only the home owner can add residents"));
    }
    if home.is_full() {
        return Err(HubError::validation("Home is full"));
    }
    let target = target.ok_or_else(|| HubError::not_found("User not found"))?;
    if !target.has_role(roles::HOME_OWNER) {
        return Err(HubError::validation("User is not a home owner"));
    }
    if target.id == home.owner_id {
        return Err(HubError::validation("User is the owner of this home"));
    }
    if already_resident {
        return Err(HubError::validation("User is already a resident of this home"));
    }
    Ok(target)
}

/// Resolve the resident record a grant targets. A missing user is a 404;
/// a user who exists but does not live in the home is a validation error.
fn resolve_grant_target(
    target: Option<&User>,
    membership: Option<Resident>,
) -> Result<Resident> {
    if target.is_none() {
        return Err(HubError::not_found("User not found"));
    }
    membership.ok_or_else(|| HubError::validation("User is not a resident of this home"))
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHomeArgs {
    pub alias: String,
    pub address: String,
    pub residents_allowed: u32,
}

pub struct HomeService {
    home_repo: Arc<HomeRepository>,
    room_repo: Arc<RoomRepository>,
    resident_repo: Arc<ResidentRepository>,
    hardware_repo: Arc<HardwareDeviceRepository>,
    device_repo: Arc<DeviceRepository>,
    user_repo: Arc<UserRepository>,
}

impl HomeService {
    pub fn new(
        home_repo: Arc<HomeRepository>,
        room_repo: Arc<RoomRepository>,
        resident_repo: Arc<ResidentRepository>,
        hardware_repo: Arc<HardwareDeviceRepository>,
        device_repo: Arc<DeviceRepository>,
        user_repo: Arc<UserRepository>,
    ) -> Self {
        Self {
            home_repo,
            room_repo,
            resident_repo,
            hardware_repo,
            device_repo,
            user_repo,
        }
    }

    pub async fn create_home(&self, owner: &AuthContext, args: CreateHomeArgs) -> Result<Home> {
        let alias = args.alias.trim();
        let address = args.address.trim();
        if alias.is_empty() || address.is_empty() {
            return Err(HubError::validation("Alias and address are required"));
        }
        if args.residents_allowed == 0 {
            return Err(HubError::validation("A home must allow at least one resident"));
        }

        let home = Home::new(alias, address, &owner.user_id, args.residents_allowed);
        self.home_repo.insert(&home).await?;
        info!(home_id = %home.id, owner_id = %owner.user_id, "Home registered");
        Ok(home)
    }

    pub async fn get_home(&self, home_id: &str) -> Result<Home> {
        self.home_repo
            .find_by_id(home_id)
            .await?
            .ok_or_else(|| HubError::not_found("Home not found"))
    }

    /// Homes the user owns plus homes the user lives in.
    pub async fn list_user_homes(&self, user_id: &str) -> Result<Vec<Home>> {
        let mut homes = self.home_repo.find_by_owner(user_id).await?;
        for membership in self.resident_repo.find_by_user(user_id).await? {
            if let Some(home) = self.home_repo.find_by_id(&membership.home_id).await? {
                homes.push(home);
            }
        }
        Ok(homes)
    }

    /// Add a home owner as a resident of the caller's home.
    ///
    /// Checks run in order: home exists, caller owns it, capacity, target
    /// exists, target holds the home-owner role, target is not the owner or
    /// already a resident.
    pub async fn add_user_to_home(
        &self,
        caller: &AuthContext,
        home_id: &str,
        target_user_id: &str,
    ) -> Result<Resident> {
        let mut home = self.get_home(home_id).await?;
        let target = self.user_repo.find_by_id(target_user_id).await?;
        let already_resident = self
            .resident_repo
            .find_by_home_and_user(home_id, target_user_id)
            .await?
            .is_some();
        let target = admit_resident(&home, &caller.user_id, target.as_ref(), already_resident)?;

        let resident = Resident::new(home_id, &target.id);
        self.resident_repo.insert(&resident).await?;
        home.residents_count += 1;
        self.home_repo.update(&home).await?;
        info!(home_id, user_id = %target.id, "Resident added to home");
        Ok(resident)
    }

    /// Permissions a resident holds in a home. The owner sees any resident,
    /// residents see their own grants.
    pub async fn get_resident_permissions(
        &self,
        caller: &AuthContext,
        home_id: &str,
        user_id: &str,
    ) -> Result<Vec<HomePermission>> {
        let home = self.get_home(home_id).await?;
        if home.owner_id != caller.user_id && caller.user_id != user_id {
            return Err(HubError::forbidden(
                "Only the home owner can view other residents' permissions",
            ));
        }

        let resident = self
            .resident_repo
            .find_by_home_and_user(home_id, user_id)
            .await?
            .ok_or_else(|| HubError::validation("User is not a resident of this home"))?;
        Ok(resident.permissions)
    }

    /// Append grants to a resident. Grants accumulate; repeated grants are
    /// stored again rather than deduplicated.
    pub async fn configure_resident_permissions(
        &self,
        caller: &AuthContext,
        home_id: &str,
        user_id: &str,
        permissions: &[HomePermission],
    ) -> Result<Resident> {
        let home = self.get_home(home_id).await?;
        if home.owner_id != caller.user_id {
            return Err(HubError::forbidden(
                "Only the home owner can configure resident permissions",
            ));
        }

        let target = self.user_repo.find_by_id(user_id).await?;
        let membership = self
            .resident_repo
            .find_by_home_and_user(home_id, user_id)
            .await?;
        let mut resident = resolve_grant_target(target.as_ref(), membership)?;
        for permission in permissions {
            resident.grant(*permission);
        }
        self.resident_repo.update(&resident).await?;
        info!(home_id, user_id, granted = permissions.len(), "Resident permissions updated");
        Ok(resident)
    }

    /// Rename a home. Owner and residents may both do this.
    pub async fn change_home_alias(
        &self,
        caller: &AuthContext,
        home_id: &str,
        alias: &str,
    ) -> Result<Home> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(HubError::validation("Alias is required"));
        }

        let mut home = self.get_home(home_id).await?;
        self.require_membership(&home, &caller.user_id).await?;

        home.alias = alias.to_string();
        home.updated_at = chrono::Utc::now();
        self.home_repo.update(&home).await?;
        Ok(home)
    }

    pub async fn add_room(
        &self,
        caller: &AuthContext,
        home_id: &str,
        name: &str,
    ) -> Result<Room> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HubError::validation("Room name is required"));
        }

        let home = self.get_home(home_id).await?;
        self.require_member_permission(&home, &caller.user_id, HomePermission::AddRoomToHome)
            .await?;
        if self.room_repo.exists_by_home_and_name(home_id, name).await? {
            return Err(HubError::validation("A room with this name already exists in the home"));
        }

        let room = Room::new(home_id, name);
        self.room_repo.insert(&room).await?;
        Ok(room)
    }

    pub async fn list_rooms(&self, caller: &AuthContext, home_id: &str) -> Result<Vec<Room>> {
        let home = self.get_home(home_id).await?;
        self.require_membership(&home, &caller.user_id).await?;
        self.room_repo.find_by_home(home_id).await
    }

    /// Install a catalog device into a room of the home.
    pub async fn add_device_to_home(
        &self,
        caller: &AuthContext,
        home_id: &str,
        room_id: &str,
        device_id: &str,
        name: &str,
    ) -> Result<HardwareDevice> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HubError::validation("Device name is required"));
        }

        let home = self.get_home(home_id).await?;
        self.require_member_permission(&home, &caller.user_id, HomePermission::BindDeviceToHome)
            .await?;

        let room = self
            .room_repo
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| HubError::not_found("Room not found"))?;
        if room.home_id != home.id {
            return Err(HubError::validation("Room does not belong to this home"));
        }

        let device = self
            .device_repo
            .find_by_id(device_id)
            .await?
            .ok_or_else(|| HubError::not_found("Device not found"))?;

        let hardware = HardwareDevice::install(home_id, room_id, device_id, device.kind, name);
        self.hardware_repo.insert(&hardware).await?;
        info!(
            home_id,
            hardware_id = %hardware.id,
            kind = hardware.kind.as_str(),
            "Hardware device installed"
        );
        Ok(hardware)
    }

    pub async fn list_hardware_devices(
        &self,
        caller: &AuthContext,
        home_id: &str,
    ) -> Result<Vec<HardwareDevice>> {
        let home = self.get_home(home_id).await?;
        self.require_member_permission(&home, &caller.user_id, HomePermission::ListHardwareDevices)
            .await?;
        self.hardware_repo.find_by_home(home_id).await
    }

    pub async fn change_hardware_device_name(
        &self,
        caller: &AuthContext,
        home_id: &str,
        hardware_id: &str,
        name: &str,
    ) -> Result<HardwareDevice> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HubError::validation("Device name is required"));
        }

        let home = self.get_home(home_id).await?;
        self.require_member_permission(
            &home,
            &caller.user_id,
            HomePermission::ChangeHardwareDeviceName,
        )
        .await?;

        let mut hardware = self
            .hardware_repo
            .find_by_id(hardware_id)
            .await?
            .ok_or_else(|| HubError::not_found("Hardware device not found"))?;
        if hardware.home_id != home.id {
            return Err(HubError::not_found("Hardware device not found"));
        }

        hardware.name = name.to_string();
        hardware.updated_at = chrono::Utc::now();
        self.hardware_repo.update(&hardware).await?;
        Ok(hardware)
    }

    /// Hardware-facing connectivity update, no caller authentication.
    pub async fn update_connection_state(
        &self,
        hardware_id: &str,
        state: ConnectionState,
    ) -> Result<HardwareDevice> {
        let mut hardware = self
            .hardware_repo
            .find_by_id(hardware_id)
            .await?
            .ok_or_else(|| HubError::not_found("Hardware device not found"))?;
        hardware.set_connection_state(state)?;
        self.hardware_repo.update(&hardware).await?;
        info!(hardware_id, state = state.as_str(), "Connection state updated");
        Ok(hardware)
    }

    /// Owner or any resident.
    async fn require_membership(&self, home: &Home, user_id: &str) -> Result<()> {
        if home.owner_id == user_id {
            return Ok(());
        }
        if self
            .resident_repo
            .find_by_home_and_user(&home.id, user_id)
            .await?
            .is_some()
        {
            return Ok(());
        }
        Err(HubError::forbidden("User is not a member of this home"))
    }

    /// Owner always passes; residents need the specific grant.
    async fn require_member_permission(
        &self,
        home: &Home,
        user_id: &str,
        permission: HomePermission,
    ) -> Result<()> {
        if home.owner_id == user_id {
            return Ok(());
        }
        let resident = self
            .resident_repo
            .find_by_home_and_user(&home.id, user_id)
            .await?
            .ok_or_else(|| HubError::forbidden("User is not a member of this home"))?;
        if !resident.has_permission(permission) {
            return Err(HubError::forbidden("User lacks the required home permission"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> User {
        User::new("owner@example.com", "hash", "Ana", "Paz").with_role(roles::HOME_OWNER)
    }

    fn home_of(owner: &User, residents_allowed: u32) -> Home {
        Home::new("Beach House", "123 Shore Dr", &owner.id, residents_allowed)
    }

    #[test]
    fn test_admit_resident_rejects_non_owner_caller() {
        let owner = owner();
        let home = home_of(&owner, 3);
        let target = User::new("guest@example.com", "hash", "Gus", "Lee")
            .with_role(roles::HOME_OWNER);

        let err = admit_resident(&home, "someone-else", Some(&target), false).unwrap_err();
        assert!(matches!(err, HubError::Forbidden { .. }));
    }

    #[test]
    fn test_admit_resident_rejects_full_home() {
        let owner = owner();
        let mut home = home_of(&owner, 1);
        home.residents_count = 1;
        let target = User::new("guest@example.com", "hash", "Gus", "Lee")
            .with_role(roles::HOME_OWNER);

        let err = admit_resident(&home, &owner.id, Some(&target), false).unwrap_err();
        assert!(matches!(err, HubError::Validation { ref message } if message == "Home is full"));
    }

    #[test]
    fn test_admit_resident_missing_target_is_not_found() {
        let owner = owner();
        let home = home_of(&owner, 3);

        let err = admit_resident(&home, &owner.id, None, false).unwrap_err();
        assert!(matches!(err, HubError::NotFound { .. }));
    }

    #[test]
    fn test_admit_resident_requires_home_owner_role() {
        let owner = owner();
        let home = home_of(&owner, 3);
        let target = User::new("plain@example.com", "hash", "Pat", "Kim");

        let err = admit_resident(&home, &owner.id, Some(&target), false).unwrap_err();
        assert!(matches!(
            err,
            HubError::Validation { ref message } if message == "User is not a home owner"
        ));
    }

    #[test]
    fn test_admit_resident_rejects_owner_and_duplicates() {
        let owner = owner();
        let home = home_of(&owner, 3);

        let err = admit_resident(&home, &owner.id, Some(&owner), false).unwrap_err();
        assert!(matches!(
            err,
            HubError::Validation { ref message } if message == "User is the owner of this home"
        ));

        let target = User::new("guest@example.com", "hash", "Gus", "Lee")
            .with_role(roles::HOME_OWNER);
        let err = admit_resident(&home, &owner.id, Some(&target), true).unwrap_err();
        assert!(matches!(
            err,
            HubError::Validation { ref message } if message == "User is already a resident of this home"
        ));
    }

    #[test]
    fn test_admitted_resident_starts_with_no_permissions_and_bumps_count() {
        let owner = owner();
        let mut home = home_of(&owner, 3);
        let target = User::new("guest@example.com", "hash", "Gus", "Lee")
            .with_role(roles::HOME_OWNER);

        let admitted = admit_resident(&home, &owner.id, Some(&target), false).unwrap();
        let resident = Resident::new(&home.id, &admitted.id);
        home.residents_count += 1;

        assert!(resident.permissions.is_empty());
        assert_eq!(home.residents_count, 1);
        assert_eq!(resident.user_id, target.id);
    }

    #[test]
    fn test_grant_target_missing_user_is_not_found() {
        let err = resolve_grant_target(None, None).unwrap_err();
        assert!(matches!(err, HubError::NotFound { .. }));
    }

    #[test]
    fn test_grant_target_non_resident_user_is_validation() {
        let user = User::new("guest@example.com", "hash", "Gus", "Lee")
            .with_role(roles::HOME_OWNER);

        let err = resolve_grant_target(Some(&user), None).unwrap_err();
        assert!(matches!(
            err,
            HubError::Validation { ref message } if message == "User is not a resident of this home"
        ));

        let membership = Resident::new("home1", &user.id);
        let resolved = resolve_grant_target(Some(&user), Some(membership)).unwrap();
        assert_eq!(resolved.user_id, user.id);
    }
}
