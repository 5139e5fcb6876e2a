//! In-memory device implementing the system service ports.
//!
//! Models just enough of the user, package and policy subsystems to run a
//! provisioning flow end to end: users with serial numbers and a user limit,
//! per-user package installs, profile owners and scoped broadcasts. Fault
//! switches let callers make individual subsystem calls fail.

mod fixture;

pub use fixture::{
    AccessibilityServiceFixture, DeviceFixture, FixtureError, InputMethodFixture, PackageFixture,
    UserFixture,
};

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::debug;

use mp_core::ports::{
    AccessibilityPort, BroadcastPort, DevicePolicyPort, InputMethodError, InputMethodPort,
    PackageManagerPort, UserManagerPort,
};
use mp_core::{
    AccessibilityServiceInfo, ApplicationFlags, ApplicationInfo, Broadcast, DeleteFlags,
    InputMethodInfo, InstallStatus, PackageName, PackageQuery, PackageRecord, RequiredForProfile,
    SerialNumber, UserFlags, UserHandle, UserId, UserInfo,
};

#[derive(Debug, Clone)]
struct SimUser {
    info: UserInfo,
    parent: Option<UserId>,
    packages: HashSet<PackageName>,
}

#[derive(Debug, Default)]
struct Faults {
    refuse_user_creation: bool,
    install_status: Option<InstallStatus>,
    refuse_profile_owner: bool,
    failing_deletes: HashSet<PackageName>,
    unreachable: HashSet<&'static str>,
}

#[derive(Debug)]
struct DeviceState {
    users: BTreeMap<UserId, SimUser>,
    next_user_id: i32,
    next_serial: i32,
    max_users: usize,
    foreground: UserId,
    calling: UserId,
    /// Every package known to the device, keyed by name.
    catalog: BTreeMap<PackageName, PackageRecord>,
    profile_owners: HashMap<UserId, (PackageName, String)>,
    broadcasts: Vec<(Broadcast, UserHandle)>,
    input_methods: Vec<InputMethodInfo>,
    default_input_method: Option<String>,
    accessibility_services: Vec<AccessibilityServiceInfo>,
    faults: Faults,
    mutations: usize,
}

impl DeviceState {
    fn user(&self, id: UserId) -> Result<&SimUser> {
        self.users
            .get(&id)
            .ok_or_else(|| anyhow!("no such user {id}"))
    }

    fn user_mut(&mut self, id: UserId) -> Result<&mut SimUser> {
        self.users
            .get_mut(&id)
            .ok_or_else(|| anyhow!("no such user {id}"))
    }

    fn check_reachable(&self, call: &'static str) -> Result<()> {
        if self.faults.unreachable.contains(call) {
            return Err(anyhow!("{call}: service unavailable"));
        }
        Ok(())
    }
}

/// In-memory device shared by all system ports.
#[derive(Debug)]
pub struct SimulatedDevice {
    state: Mutex<DeviceState>,
}

impl SimulatedDevice {
    pub fn from_fixture(fixture: &DeviceFixture) -> Result<Self, FixtureError> {
        let catalog: BTreeMap<PackageName, PackageRecord> = fixture
            .packages
            .iter()
            .map(|p| (PackageName::from(p.name.as_str()), package_record(p)))
            .collect();

        let mut users = BTreeMap::new();
        for user in &fixture.users {
            let mut packages = HashSet::new();
            for package in &user.packages {
                let name = PackageName::from(package.as_str());
                if !catalog.contains_key(&name) {
                    return Err(FixtureError::UnknownPackage {
                        user: user.id,
                        package: package.clone(),
                    });
                }
                packages.insert(name);
            }
            let id = UserId::new(user.id);
            users.insert(
                id,
                SimUser {
                    info: UserInfo {
                        id,
                        serial_number: SerialNumber::new(user.serial_number),
                        name: user.name.clone(),
                        flags: UserFlags::from_bits(user.flags),
                    },
                    parent: user.parent.map(UserId::new),
                    packages,
                },
            );
        }

        let foreground = UserId::new(fixture.foreground_user);
        if !users.contains_key(&foreground) {
            return Err(FixtureError::UnknownUser(fixture.foreground_user));
        }
        let calling = fixture.calling_user.map(UserId::new).unwrap_or(foreground);
        if !users.contains_key(&calling) {
            return Err(FixtureError::UnknownUser(calling.get()));
        }

        // Secondary users start at 10, as on the platform.
        let next_user_id = users
            .keys()
            .map(|id| id.get() + 1)
            .max()
            .unwrap_or(0)
            .max(10);
        let next_serial = users
            .values()
            .map(|u| u.info.serial_number.get() + 1)
            .max()
            .unwrap_or(0);

        Ok(Self {
            state: Mutex::new(DeviceState {
                users,
                next_user_id,
                next_serial,
                max_users: fixture.max_users,
                foreground,
                calling,
                catalog,
                profile_owners: HashMap::new(),
                broadcasts: Vec::new(),
                input_methods: fixture
                    .input_methods
                    .iter()
                    .map(|m| InputMethodInfo {
                        id: m.id.clone(),
                        package_name: PackageName::from(m.package.as_str()),
                    })
                    .collect(),
                default_input_method: fixture.default_input_method.clone(),
                accessibility_services: fixture
                    .accessibility_services
                    .iter()
                    .map(|s| AccessibilityServiceInfo {
                        service_name: s.service.clone(),
                        package_name: PackageName::from(s.package.as_str()),
                    })
                    .collect(),
                faults: Faults::default(),
                mutations: 0,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        // A panic while holding the lock only happens in a failing test;
        // the state is still usable for inspection.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // Fault injection

    /// Next user creations return no user.
    pub fn refuse_user_creation(&self) {
        self.lock().faults.refuse_user_creation = true;
    }

    /// Install requests return `status` without installing anything.
    pub fn force_install_status(&self, status: InstallStatus) {
        self.lock().faults.install_status = Some(status);
    }

    pub fn refuse_profile_owner(&self) {
        self.lock().faults.refuse_profile_owner = true;
    }

    pub fn fail_delete_of(&self, package: impl Into<PackageName>) {
        self.lock().faults.failing_deletes.insert(package.into());
    }

    /// Calls to `call` (a port method name) return an error.
    pub fn make_unreachable(&self, call: &'static str) {
        self.lock().faults.unreachable.insert(call);
    }

    // Inspection

    pub fn is_installed(&self, package: &str, user: UserId) -> bool {
        self.lock()
            .users
            .get(&user)
            .map(|u| u.packages.contains(&PackageName::from(package)))
            .unwrap_or(false)
    }

    pub fn installed_packages(&self, user: UserId) -> Vec<PackageName> {
        let state = self.lock();
        let mut packages: Vec<PackageName> = state
            .users
            .get(&user)
            .map(|u| u.packages.iter().cloned().collect())
            .unwrap_or_default();
        packages.sort();
        packages
    }

    pub fn users(&self) -> Vec<UserInfo> {
        self.lock().users.values().map(|u| u.info.clone()).collect()
    }

    pub fn managed_profiles(&self) -> Vec<UserInfo> {
        self.users()
            .into_iter()
            .filter(UserInfo::is_managed_profile)
            .collect()
    }

    /// Owner package and label of `user`'s profile, if any.
    pub fn profile_owner(&self, user: UserId) -> Option<(PackageName, String)> {
        self.lock().profile_owners.get(&user).cloned()
    }

    pub fn broadcasts(&self) -> Vec<(Broadcast, UserHandle)> {
        self.lock().broadcasts.clone()
    }

    /// Number of state-changing calls served so far.
    pub fn mutation_count(&self) -> usize {
        self.lock().mutations
    }
}

fn package_record(fixture: &PackageFixture) -> PackageRecord {
    let mut flags = ApplicationFlags::empty();
    if fixture.system {
        flags |= ApplicationFlags::SYSTEM;
    }
    if fixture.updated_system {
        flags |= ApplicationFlags::UPDATED_SYSTEM_APP;
    }
    let name = PackageName::from(fixture.name.as_str());
    PackageRecord {
        package_name: name.clone(),
        required_for_all_users: fixture.required_for_all_users,
        required_for_profile: if fixture.required_for_managed_profile {
            RequiredForProfile::MANAGED_PROFILE
        } else {
            RequiredForProfile::empty()
        },
        application_info: Some(ApplicationInfo {
            package_name: name,
            flags,
        }),
    }
}

#[async_trait]
impl UserManagerPort for SimulatedDevice {
    async fn create_related_user(
        &self,
        name: &str,
        flags: UserFlags,
        parent: UserId,
    ) -> Result<Option<UserInfo>> {
        let mut state = self.lock();
        state.check_reachable("create_related_user")?;
        state.user(parent)?;

        if state.faults.refuse_user_creation || state.users.len() >= state.max_users {
            debug!(
                users = state.users.len(),
                max = state.max_users,
                "user creation refused"
            );
            return Ok(None);
        }

        let id = UserId::new(state.next_user_id);
        let serial_number = SerialNumber::new(state.next_serial);
        state.next_user_id += 1;
        state.next_serial += 1;

        // New users get every system package on the device.
        let packages = state
            .catalog
            .values()
            .filter(|record| record.is_system())
            .map(|record| record.package_name.clone())
            .collect();
        let info = UserInfo {
            id,
            serial_number,
            name: name.to_string(),
            flags,
        };
        state.users.insert(
            id,
            SimUser {
                info: info.clone(),
                parent: Some(parent),
                packages,
            },
        );
        state.mutations += 1;
        debug!(user = %id, serial = %serial_number, "user created");
        Ok(Some(info))
    }

    async fn current_user(&self) -> Result<UserId> {
        let state = self.lock();
        state.check_reachable("current_user")?;
        Ok(state.foreground)
    }

    async fn calling_user(&self) -> Result<UserId> {
        let state = self.lock();
        state.check_reachable("calling_user")?;
        Ok(state.calling)
    }

    async fn related_users(&self, user: UserId) -> Result<Vec<UserInfo>> {
        let state = self.lock();
        state.check_reachable("related_users")?;
        let root = state.user(user)?.parent.unwrap_or(user);
        Ok(state
            .users
            .values()
            .filter(|u| u.info.id == root || u.parent == Some(root))
            .map(|u| u.info.clone())
            .collect())
    }

    async fn user_count(&self) -> Result<usize> {
        let state = self.lock();
        state.check_reachable("user_count")?;
        Ok(state.users.len())
    }

    async fn max_supported_users(&self) -> Result<usize> {
        let state = self.lock();
        state.check_reachable("max_supported_users")?;
        Ok(state.max_users)
    }

    async fn user_for_serial_number(
        &self,
        serial_number: SerialNumber,
    ) -> Result<Option<UserHandle>> {
        let state = self.lock();
        state.check_reachable("user_for_serial_number")?;
        Ok(state
            .users
            .values()
            .find(|u| u.info.serial_number == serial_number)
            .map(|u| UserHandle::of(u.info.id)))
    }
}

#[async_trait]
impl PackageManagerPort for SimulatedDevice {
    async fn installed_applications(&self, user: UserId) -> Result<Vec<ApplicationInfo>> {
        let state = self.lock();
        state.check_reachable("installed_applications")?;
        let sim_user = state.user(user)?;
        let mut apps: Vec<ApplicationInfo> = sim_user
            .packages
            .iter()
            .filter_map(|name| state.catalog.get(name))
            .filter_map(|record| record.application_info.clone())
            .collect();
        apps.sort_by(|a, b| a.package_name.cmp(&b.package_name));
        Ok(apps)
    }

    async fn package_info(
        &self,
        package: &PackageName,
        _query: PackageQuery,
        user: UserId,
    ) -> Result<Option<PackageRecord>> {
        let state = self.lock();
        state.check_reachable("package_info")?;
        if !state.user(user)?.packages.contains(package) {
            return Ok(None);
        }
        Ok(state.catalog.get(package).cloned())
    }

    async fn delete_package_as_user(
        &self,
        package: &PackageName,
        user: UserId,
        flags: DeleteFlags,
    ) -> Result<()> {
        let mut state = self.lock();
        state.check_reachable("delete_package_as_user")?;
        if state.faults.failing_deletes.contains(package) {
            return Err(anyhow!("delete of {package} failed"));
        }
        let is_system = state
            .catalog
            .get(package)
            .map(PackageRecord::is_system)
            .unwrap_or(false);
        if is_system && !flags.contains(DeleteFlags::DELETE_SYSTEM_APP) {
            return Err(anyhow!("{package} is a system app"));
        }
        let sim_user = state.user_mut(user)?;
        if !sim_user.packages.remove(package) {
            return Err(anyhow!("{package} is not installed for user {user}"));
        }
        state.mutations += 1;
        debug!(package = %package, user = %user, "package deleted");
        Ok(())
    }

    async fn install_existing_package_as_user(
        &self,
        package: &PackageName,
        user: UserId,
    ) -> Result<InstallStatus> {
        let mut state = self.lock();
        state.check_reachable("install_existing_package_as_user")?;
        if let Some(status) = state.faults.install_status {
            return Ok(status);
        }
        if !state.catalog.contains_key(package) {
            return Ok(InstallStatus::FAILED_INVALID_URI);
        }
        let sim_user = state.user_mut(user)?;
        if sim_user.info.flags.contains(UserFlags::RESTRICTED) {
            return Ok(InstallStatus::FAILED_USER_RESTRICTED);
        }
        sim_user.packages.insert(package.clone());
        state.mutations += 1;
        debug!(package = %package, user = %user, "package installed");
        Ok(InstallStatus::SUCCEEDED)
    }
}

#[async_trait]
impl DevicePolicyPort for SimulatedDevice {
    async fn set_profile_owner(
        &self,
        package: &PackageName,
        owner_name: &str,
        user: UserId,
    ) -> Result<bool> {
        let mut state = self.lock();
        state.check_reachable("set_profile_owner")?;
        if state.faults.refuse_profile_owner
            || state.profile_owners.contains_key(&user)
            || !state.user(user)?.packages.contains(package)
        {
            return Ok(false);
        }
        state
            .profile_owners
            .insert(user, (package.clone(), owner_name.to_string()));
        state.mutations += 1;
        Ok(true)
    }
}

#[async_trait]
impl InputMethodPort for SimulatedDevice {
    async fn input_methods(&self) -> Result<Vec<InputMethodInfo>, InputMethodError> {
        let state = self.lock();
        state
            .check_reachable("input_methods")
            .map_err(|err| InputMethodError::Service(err.to_string()))?;
        Ok(state.input_methods.clone())
    }

    async fn is_default(&self, method: &InputMethodInfo) -> Result<bool, InputMethodError> {
        let state = self.lock();
        state
            .check_reachable("is_default")
            .map_err(|err| InputMethodError::Service(err.to_string()))?;
        match &state.default_input_method {
            Some(default) => Ok(*default == method.id),
            None => Err(InputMethodError::NoDefault),
        }
    }
}

#[async_trait]
impl AccessibilityPort for SimulatedDevice {
    async fn installed_services(&self) -> Result<Vec<AccessibilityServiceInfo>> {
        let state = self.lock();
        state.check_reachable("installed_services")?;
        Ok(state.accessibility_services.clone())
    }
}

#[async_trait]
impl BroadcastPort for SimulatedDevice {
    async fn send_broadcast_as_user(
        &self,
        broadcast: &Broadcast,
        handle: UserHandle,
    ) -> Result<()> {
        let mut state = self.lock();
        state.check_reachable("send_broadcast_as_user")?;
        state.user(handle.identifier())?;
        state.broadcasts.push((broadcast.clone(), handle));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        max_users = 2
        foreground_user = 0

        [[users]]
        id = 0
        serial_number = 0
        name = "Owner"
        flags = 0x13
        packages = ["com.android.launcher", "com.example.mdm"]

        [[packages]]
        name = "com.android.launcher"
        system = true

        [[packages]]
        name = "com.android.settings"
        system = true

        [[packages]]
        name = "com.example.mdm"
    "#;

    fn device() -> SimulatedDevice {
        SimulatedDevice::from_fixture(&DeviceFixture::from_toml_str(FIXTURE).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn new_profile_gets_system_packages_only() {
        let device = device();

        let profile = device
            .create_related_user("Work", UserFlags::MANAGED_PROFILE, UserId::SYSTEM)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(profile.id, UserId::new(10));
        assert_eq!(profile.serial_number, SerialNumber::new(1));
        assert_eq!(
            device.installed_packages(profile.id),
            vec![
                PackageName::from("com.android.launcher"),
                PackageName::from("com.android.settings")
            ]
        );
        assert_eq!(device.managed_profiles().len(), 1);
    }

    #[tokio::test]
    async fn user_limit_refuses_creation() {
        let device = device();
        device
            .create_related_user("Work", UserFlags::MANAGED_PROFILE, UserId::SYSTEM)
            .await
            .unwrap();

        let second = device
            .create_related_user("Work 2", UserFlags::MANAGED_PROFILE, UserId::SYSTEM)
            .await
            .unwrap();

        assert!(second.is_none());
        assert_eq!(device.user_count().await.unwrap(), 2);
        assert_eq!(device.max_supported_users().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn related_users_include_parent_and_profiles() {
        let device = device();
        let profile = device
            .create_related_user("Work", UserFlags::MANAGED_PROFILE, UserId::SYSTEM)
            .await
            .unwrap()
            .unwrap();

        let from_parent = device.related_users(UserId::SYSTEM).await.unwrap();
        let from_profile = device.related_users(profile.id).await.unwrap();

        assert_eq!(from_parent.len(), 2);
        assert_eq!(from_parent, from_profile);
    }

    #[tokio::test]
    async fn install_existing_package_statuses() {
        let device = device();
        let profile = device
            .create_related_user("Work", UserFlags::MANAGED_PROFILE, UserId::SYSTEM)
            .await
            .unwrap()
            .unwrap();

        let status = device
            .install_existing_package_as_user(&"com.example.mdm".into(), profile.id)
            .await
            .unwrap();
        assert_eq!(status, InstallStatus::SUCCEEDED);
        assert!(device.is_installed("com.example.mdm", profile.id));

        let status = device
            .install_existing_package_as_user(&"com.example.unknown".into(), profile.id)
            .await
            .unwrap();
        assert_eq!(status, InstallStatus::FAILED_INVALID_URI);

        device.force_install_status(InstallStatus::from_code(-4));
        let status = device
            .install_existing_package_as_user(&"com.example.mdm".into(), profile.id)
            .await
            .unwrap();
        assert_eq!(status.code(), -4);
    }

    #[tokio::test]
    async fn system_packages_need_delete_system_app_flag() {
        let device = device();

        let err = device
            .delete_package_as_user(
                &"com.android.launcher".into(),
                UserId::SYSTEM,
                DeleteFlags::NONE,
            )
            .await;
        assert!(err.is_err());

        device
            .delete_package_as_user(
                &"com.android.launcher".into(),
                UserId::SYSTEM,
                DeleteFlags::DELETE_SYSTEM_APP,
            )
            .await
            .unwrap();
        assert!(!device.is_installed("com.android.launcher", UserId::SYSTEM));
    }

    #[tokio::test]
    async fn profile_owner_requires_installed_package() {
        let device = device();
        let profile = device
            .create_related_user("Work", UserFlags::MANAGED_PROFILE, UserId::SYSTEM)
            .await
            .unwrap()
            .unwrap();
        let mdm = PackageName::from("com.example.mdm");

        let accepted = device.set_profile_owner(&mdm, "Work", profile.id).await;
        assert!(!accepted.unwrap());

        device
            .install_existing_package_as_user(&mdm, profile.id)
            .await
            .unwrap();
        let accepted = device.set_profile_owner(&mdm, "Work", profile.id).await;
        assert!(accepted.unwrap());
        assert_eq!(
            device.profile_owner(profile.id),
            Some((mdm.clone(), "Work".to_string()))
        );
        // only one owner per profile
        let accepted = device.set_profile_owner(&mdm, "Work", profile.id).await;
        assert!(!accepted.unwrap());
    }

    #[tokio::test]
    async fn unreachable_calls_fail() {
        let device = device();
        device.make_unreachable("calling_user");

        assert!(device.calling_user().await.is_err());
        assert!(device.current_user().await.is_ok());
    }

    #[tokio::test]
    async fn unreachable_input_method_service_is_reported_as_service_error() {
        let device = device();
        device.make_unreachable("input_methods");

        assert!(matches!(
            device.input_methods().await,
            Err(InputMethodError::Service(_))
        ));
    }

    #[test]
    fn fixture_with_unknown_package_is_rejected() {
        let fixture = DeviceFixture::from_toml_str(
            r#"
            max_users = 2
            [[users]]
            id = 0
            serial_number = 0
            name = "Owner"
            packages = ["com.example.missing"]
            "#,
        )
        .unwrap();

        let err = SimulatedDevice::from_fixture(&fixture).unwrap_err();
        assert!(matches!(err, FixtureError::UnknownPackage { user: 0, .. }));
    }
}
