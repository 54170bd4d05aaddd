//! Identities of remote clients talking to a session

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::extras::Extras;

/// Opaque identity of a connecting client
///
/// Immutable once created and used as an equality/hash key throughout the
/// bridge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteIdentity {
    package_name: String,
    uid: u32,
    pid: Option<u32>,
}

impl RemoteIdentity {
    pub fn new(package_name: impl Into<String>, uid: u32) -> Self {
        Self {
            package_name: package_name.into(),
            uid,
            pid: None,
        }
    }

    /// Attach the client's process handle
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }
}

impl fmt::Display for RemoteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pid {
            Some(pid) => write!(f, "{}(uid={}, pid={})", self.package_name, self.uid, pid),
            None => write!(f, "{}(uid={})", self.package_name, self.uid),
        }
    }
}

/// What the session sees about a caller
///
/// Passed to every session operation so the session can tailor results to
/// the calling client.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerInfo {
    pub identity: RemoteIdentity,
    pub controller_version: i32,
    pub interface_version: i32,
    pub trusted: bool,
    pub connection_hints: Extras,
}

impl CallerInfo {
    pub fn new(identity: RemoteIdentity) -> Self {
        Self {
            identity,
            controller_version: 0,
            interface_version: 0,
            trusted: false,
            connection_hints: Extras::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_equality_and_hash() {
        let a = RemoteIdentity::new("com.example.car", 10_001);
        let b = RemoteIdentity::new("com.example.car", 10_001);
        let c = RemoteIdentity::new("com.example.car", 10_002);

        let mut set = HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&b));
        assert!(!set.contains(&c));
    }

    #[test]
    fn test_identity_display() {
        let identity = RemoteIdentity::new("com.example.car", 10_001).with_pid(42);
        assert_eq!(identity.to_string(), "com.example.car(uid=10001, pid=42)");
    }
}
