use serde::{Deserialize, Serialize};
use std::fmt;

/// Which message bus a channel connects to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    /// The system bus, where netplan lives (needs root or polkit rights)
    #[default]
    System,
    /// The per-user session bus
    Session,
}

impl fmt::Display for BusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusKind::System => write!(f, "system"),
            BusKind::Session => write!(f, "session"),
        }
    }
}

/// A remote object a channel invokes methods on.
///
/// The handle is bound once to a service and can be re-targeted to another
/// object path of the same service without rebinding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHandle {
    service: String,
    path: String,
}

impl ObjectHandle {
    pub fn bind(service: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            path: path.into(),
        }
    }

    /// Point the handle at another object of the same service
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Argument or reply value carried over a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    U32(u32),
    Str(String),
    ObjectPath(String),
}

impl Value {
    pub fn into_bool(self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_object_path(self) -> Option<String> {
        match self {
            Value::ObjectPath(p) => Some(p),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

/// Reply shape a caller expects from a method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Bool,
    Str,
    ObjectPath,
}

impl fmt::Display for ReplyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplyKind::Bool => "boolean",
            ReplyKind::Str => "string",
            ReplyKind::ObjectPath => "object path",
        };
        f.write_str(name)
    }
}

/// Error reply sent back by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    /// D-Bus error name, e.g. `org.freedesktop.DBus.Error.UnknownObject`
    pub name: String,
    pub message: String,
}

impl RemoteError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}: {}", self.name, self.message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to connect to the {bus} bus: {message}")]
    Connect { bus: BusKind, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Remote error {0}")]
    Remote(RemoteError),
    #[error("Unexpected reply to {method}: expected {expected}")]
    UnexpectedReply { method: String, expected: ReplyKind },
    #[error("Unsupported argument list for {method}")]
    UnsupportedArguments { method: String },
}

impl ChannelError {
    /// The remote error reply, if the service answered with one
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            ChannelError::Remote(err) => Some(err),
            _ => None,
        }
    }
}
