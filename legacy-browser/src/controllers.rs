//! Connected legacy controllers and their permissions
//!
//! Every legacy client that successfully connects gets a [`ControllerInfo`]
//! holding what the session knows about it and the single callback used to
//! reach it. The [`ControllerRegistry`] maps identities to those records and
//! answers the permission checks made before each dispatch.

use std::sync::Arc;

use dashmap::DashMap;
use media_session::{
    CallerInfo, LibraryParams, RemoteIdentity, SessionCommand, SessionCommands,
};

use crate::error::{BridgeError, Result};
use crate::ledger::SearchRequestLedger;

/// Outbound notifications to one connected controller
pub trait ControllerCallback: Send + Sync + 'static {
    /// The children of `parent_id` changed
    fn on_children_changed(&self, parent_id: &str, item_count: i32, params: Option<&LibraryParams>);

    /// Results for `query` are ready to be fetched
    fn on_search_result_changed(&self, query: &str, item_count: i32, params: Option<&LibraryParams>);

    /// Outstanding search requests, for callbacks that serve legacy searches
    fn search_ledger(&self) -> Option<&SearchRequestLedger> {
        None
    }
}

/// A connected controller
pub struct ControllerInfo {
    caller: CallerInfo,
    callback: Arc<dyn ControllerCallback>,
}

impl ControllerInfo {
    pub fn new(caller: CallerInfo, callback: Arc<dyn ControllerCallback>) -> Self {
        Self { caller, callback }
    }

    pub fn identity(&self) -> &RemoteIdentity {
        &self.caller.identity
    }

    /// What the session sees about this controller
    pub fn caller(&self) -> &CallerInfo {
        &self.caller
    }

    pub fn callback(&self) -> &Arc<dyn ControllerCallback> {
        &self.callback
    }
}

impl std::fmt::Debug for ControllerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerInfo")
            .field("identity", &self.caller.identity)
            .field("trusted", &self.caller.trusted)
            .finish()
    }
}

struct ControllerEntry {
    info: Arc<ControllerInfo>,
    commands: SessionCommands,
}

/// Thread-safe registry of connected controllers keyed by identity
#[derive(Default)]
pub struct ControllerRegistry {
    controllers: DashMap<RemoteIdentity, ControllerEntry>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller with its available commands
    ///
    /// Fails if the identity is already connected; the existing record is
    /// left untouched.
    pub fn add(&self, info: Arc<ControllerInfo>, commands: SessionCommands) -> Result<()> {
        use dashmap::mapref::entry::Entry;

        match self.controllers.entry(info.identity().clone()) {
            Entry::Occupied(entry) => Err(BridgeError::AlreadyConnected(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::debug!(
                    "Controller {} connected with {} commands",
                    info.identity(),
                    commands.len()
                );
                entry.insert(ControllerEntry { info, commands });
                Ok(())
            }
        }
    }

    /// Remove a controller, returning its record if it was connected
    pub fn remove(&self, identity: &RemoteIdentity) -> Option<Arc<ControllerInfo>> {
        self.controllers
            .remove(identity)
            .map(|(_, entry)| entry.info)
    }

    pub fn get(&self, identity: &RemoteIdentity) -> Option<Arc<ControllerInfo>> {
        self.controllers
            .get(identity)
            .map(|entry| Arc::clone(&entry.info))
    }

    pub fn is_connected(&self, identity: &RemoteIdentity) -> bool {
        self.controllers.contains_key(identity)
    }

    pub fn is_command_available(&self, identity: &RemoteIdentity, command: &SessionCommand) -> bool {
        self.controllers
            .get(identity)
            .is_some_and(|entry| entry.commands.contains(command))
    }

    pub fn is_command_code_available(&self, identity: &RemoteIdentity, command_code: i32) -> bool {
        self.controllers
            .get(identity)
            .is_some_and(|entry| entry.commands.contains_code(command_code))
    }

    /// Replace the commands available to a connected controller
    pub fn set_available_commands(
        &self,
        identity: &RemoteIdentity,
        commands: SessionCommands,
    ) -> Result<()> {
        let mut entry = self
            .controllers
            .get_mut(identity)
            .ok_or_else(|| BridgeError::NotConnected(identity.clone()))?;
        entry.commands = commands;
        Ok(())
    }

    /// Snapshot of every connected controller
    pub fn controllers(&self) -> Vec<Arc<ControllerInfo>> {
        self.controllers
            .iter()
            .map(|entry| Arc::clone(&entry.info))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_session::command::{COMMAND_CODE_LIBRARY_GET_CHILDREN, COMMAND_CODE_LIBRARY_SEARCH};
    use media_session::Extras;

    struct NoopCallback;

    impl ControllerCallback for NoopCallback {
        fn on_children_changed(&self, _: &str, _: i32, _: Option<&LibraryParams>) {}
        fn on_search_result_changed(&self, _: &str, _: i32, _: Option<&LibraryParams>) {}
    }

    fn controller(package: &str) -> Arc<ControllerInfo> {
        let caller = CallerInfo::new(RemoteIdentity::new(package, 10_001));
        Arc::new(ControllerInfo::new(caller, Arc::new(NoopCallback)))
    }

    #[test]
    fn test_add_and_lookup() {
        let registry = ControllerRegistry::new();
        let info = controller("com.example.car");
        let identity = info.identity().clone();

        registry
            .add(Arc::clone(&info), SessionCommands::library_defaults())
            .unwrap();

        assert!(registry.is_connected(&identity));
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.get(&identity).unwrap(), &info));
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let registry = ControllerRegistry::new();
        registry
            .add(controller("com.example.car"), SessionCommands::new())
            .unwrap();

        let result = registry.add(controller("com.example.car"), SessionCommands::new());
        assert!(matches!(result, Err(BridgeError::AlreadyConnected(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_permission_checks() {
        let registry = ControllerRegistry::new();
        let info = controller("com.example.watch");
        let identity = info.identity().clone();
        let commands = SessionCommands::library_defaults()
            .without_code(COMMAND_CODE_LIBRARY_SEARCH)
            .with(SessionCommand::custom("like", Extras::new()));
        registry.add(info, commands).unwrap();

        assert!(registry.is_command_code_available(&identity, COMMAND_CODE_LIBRARY_GET_CHILDREN));
        assert!(!registry.is_command_code_available(&identity, COMMAND_CODE_LIBRARY_SEARCH));
        assert!(registry.is_command_available(&identity, &SessionCommand::custom("like", Extras::new())));
        assert!(!registry.is_command_available(&identity, &SessionCommand::custom("skip", Extras::new())));

        registry
            .set_available_commands(&identity, SessionCommands::new())
            .unwrap();
        assert!(!registry.is_command_code_available(&identity, COMMAND_CODE_LIBRARY_GET_CHILDREN));
    }

    #[test]
    fn test_unknown_identity_has_no_permissions() {
        let registry = ControllerRegistry::new();
        let stranger = RemoteIdentity::new("com.example.unknown", 1);
        assert!(!registry.is_command_code_available(&stranger, COMMAND_CODE_LIBRARY_GET_CHILDREN));
        assert!(registry.remove(&stranger).is_none());
        assert!(matches!(
            registry.set_available_commands(&stranger, SessionCommands::new()),
            Err(BridgeError::NotConnected(_))
        ));
    }
}
