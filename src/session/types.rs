use crate::channel::{ChannelError, RemoteError, ReplyKind};
use std::fmt;

/// Object path of an open configuration session.
///
/// Only ever built from a reply of the session factory, and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionPath(String);

impl SessionPath {
    pub fn new(path: impl Into<String>) -> Option<Self> {
        let path = path.into();
        if path.is_empty() { None } else { Some(Self(path)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cached session state of a [`SessionManager`](super::SessionManager)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    NoSession,
    Active(SessionPath),
}

impl SessionState {
    pub fn path(&self) -> Option<&SessionPath> {
        match self {
            SessionState::NoSession => None,
            SessionState::Active(path) => Some(path),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active(_))
    }
}

/// Methods of the session interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigMethod {
    Get,
    Set,
    Try,
    Apply,
    Cancel,
}

impl ConfigMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigMethod::Get => "Get",
            ConfigMethod::Set => "Set",
            ConfigMethod::Try => "Try",
            ConfigMethod::Apply => "Apply",
            ConfigMethod::Cancel => "Cancel",
        }
    }

    pub fn reply_kind(&self) -> ReplyKind {
        match self {
            ConfigMethod::Get => ReplyKind::Str,
            _ => ReplyKind::Bool,
        }
    }
}

impl fmt::Display for ConfigMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `target=value` edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedChange {
    target: String,
    value: String,
}

impl StagedChange {
    /// Validate a change.
    ///
    /// The target is a dotted key path such as `network.ethernets.eth0.dhcp4`
    /// and may not contain `=`, which separates it from the value on the wire.
    pub fn new(target: impl Into<String>, value: impl Into<String>) -> Result<Self, NetplanError> {
        let target = target.into();
        let value = value.into();

        if target.is_empty() {
            return Err(NetplanError::InvalidChange("target is empty".to_string()));
        }
        if target.contains('=') {
            return Err(NetplanError::InvalidChange(format!(
                "target '{}' contains '='",
                target
            )));
        }
        if value.is_empty() {
            return Err(NetplanError::InvalidChange(format!(
                "value for '{}' is empty",
                target
            )));
        }

        Ok(Self { target, value })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Wire form passed to `Set`
    pub fn encode(&self) -> String {
        format!("{}={}", self.target, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetplanError {
    #[error("Failed to dispatch {method}: {source}")]
    Channel {
        method: ConfigMethod,
        #[source]
        source: ChannelError,
    },
    #[error("Failed to open a configuration session: {source}")]
    Session {
        #[source]
        source: ChannelError,
    },
    #[error("{method} failed: {name}: {message}")]
    RemoteCall {
        method: ConfigMethod,
        name: String,
        message: String,
    },
    #[error("Invalid configuration change: {0}")]
    InvalidChange(String),
}

impl NetplanError {
    /// Classify a failed call against a session object
    pub(crate) fn from_call(method: ConfigMethod, err: ChannelError) -> Self {
        match err {
            ChannelError::Remote(RemoteError { name, message }) => NetplanError::RemoteCall {
                method,
                name,
                message,
            },
            source => NetplanError::Channel { method, source },
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, NetplanError::RemoteCall { .. })
    }

    /// D-Bus error name attached by the service, if any
    pub fn remote_name(&self) -> Option<&str> {
        match self {
            NetplanError::RemoteCall { name, .. } => Some(name),
            NetplanError::Session { source } => source.remote().map(|r| r.name.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staged_change_encoding() {
        let change = StagedChange::new("network.ethernets.eth0.dhcp4", "true").unwrap();
        assert_eq!(change.encode(), "network.ethernets.eth0.dhcp4=true");

        let with_equals = StagedChange::new("network.bridges.br0.parameters", "a=b").unwrap();
        assert_eq!(with_equals.encode(), "network.bridges.br0.parameters=a=b");
    }

    #[test]
    fn test_staged_change_rejects_bad_input() {
        assert!(matches!(
            StagedChange::new("", "true"),
            Err(NetplanError::InvalidChange(_))
        ));
        assert!(matches!(
            StagedChange::new("network.version", ""),
            Err(NetplanError::InvalidChange(_))
        ));
        assert!(matches!(
            StagedChange::new("a=b", "c"),
            Err(NetplanError::InvalidChange(_))
        ));
    }

    #[test]
    fn test_session_path_never_empty() {
        assert!(SessionPath::new("").is_none());
        let path = SessionPath::new("/io/netplan/Netplan/config/X").unwrap();
        assert_eq!(path.to_string(), "/io/netplan/Netplan/config/X");
        assert!(SessionState::Active(path).is_active());
        assert!(SessionState::default().path().is_none());
    }

    #[test]
    fn test_error_classification() {
        let remote = NetplanError::from_call(
            ConfigMethod::Apply,
            ChannelError::Remote(RemoteError::new("io.netplan.Netplan.Error", "failed")),
        );
        assert!(remote.is_remote());
        assert_eq!(remote.remote_name(), Some("io.netplan.Netplan.Error"));
        assert_eq!(remote.to_string(), "Apply failed: io.netplan.Netplan.Error: failed");

        let transport =
            NetplanError::from_call(ConfigMethod::Get, ChannelError::Transport("eof".into()));
        assert!(!transport.is_remote());
        assert!(transport.remote_name().is_none());
    }
}
