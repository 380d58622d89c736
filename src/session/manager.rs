use crate::channel::{ChannelError, ObjectHandle, ReplyKind, RpcChannel, Value};
use crate::env;
use crate::session::types::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Well-known names of the service the manager talks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceNames {
    pub service_name: String,
    pub root_object_path: String,
    pub root_interface: String,
    pub config_interface: String,
    pub session_factory_method: String,
}

impl Default for ServiceNames {
    fn default() -> Self {
        Self {
            service_name: env::netplan::SERVICE_NAME.to_string(),
            root_object_path: env::netplan::ROOT_OBJECT_PATH.to_string(),
            root_interface: env::netplan::ROOT_INTERFACE.to_string(),
            config_interface: env::netplan::CONFIG_INTERFACE.to_string(),
            session_factory_method: env::netplan::SESSION_FACTORY_METHOD.to_string(),
        }
    }
}

/// Configuration for session manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionManagerConfig {
    pub service: ServiceNames,
    /// Artifact the service writes staged changes into
    pub artifact_id: String,
}

impl Default for SessionManagerConfig {
    fn default() -> Self {
        Self {
            service: ServiceNames::default(),
            artifact_id: env::netplan::DEFAULT_ARTIFACT_ID.to_string(),
        }
    }
}

/// Session manager shared between callers.
///
/// Holding the guard across a whole operation keeps session creation and
/// the call that uses it in one critical section.
pub type SharedSessionManager = Arc<Mutex<SessionManager>>;

/// Owns the cached configuration session and runs every operation against it.
///
/// Each public operation first makes sure a session exists, opening one
/// through the service's factory method when none is cached, then performs
/// exactly one call on the session object. Any failure of that call drops
/// the cached session so the next operation negotiates a new one instead of
/// reusing a handle that may be dead.
pub struct SessionManager {
    channel: Arc<dyn RpcChannel>,
    object: ObjectHandle,
    config: SessionManagerConfig,
    state: SessionState,
}

impl SessionManager {
    /// Create a new session manager; no remote call is made until first use
    pub fn new(channel: Arc<dyn RpcChannel>, config: SessionManagerConfig) -> Self {
        let object = ObjectHandle::bind(
            config.service.service_name.clone(),
            config.service.root_object_path.clone(),
        );

        Self {
            channel,
            object,
            config,
            state: SessionState::NoSession,
        }
    }

    /// Wrap the manager for use by several callers
    pub fn into_shared(self) -> SharedSessionManager {
        Arc::new(Mutex::new(self))
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn has_session(&self) -> bool {
        self.state.is_active()
    }

    pub fn artifact_id(&self) -> &str {
        &self.config.artifact_id
    }

    pub fn config(&self) -> &SessionManagerConfig {
        &self.config
    }

    /// Forget the cached session; the next operation opens a new one
    pub fn reset_session(&mut self) {
        if let SessionState::Active(path) = &self.state {
            info!("Dropping configuration session {}", path);
        }
        self.state = SessionState::NoSession;
    }

    /// Path of the current session, opening one if needed
    pub async fn configuration_path(&mut self) -> Result<String, NetplanError> {
        let path = self.ensure_session().await?;
        Ok(path.to_string())
    }

    /// Full configuration document as seen by the session
    pub async fn get_configuration(&mut self) -> Result<String, NetplanError> {
        self.call_session(ConfigMethod::Get, &[], Value::into_string)
            .await
    }

    /// Stage `target=value` into the configured artifact
    pub async fn set_configuration(
        &mut self,
        target: &str,
        value: &str,
    ) -> Result<bool, NetplanError> {
        let change = StagedChange::new(target, value)?;
        self.stage(&change).await
    }

    /// Stage an already validated change
    pub async fn stage(&mut self, change: &StagedChange) -> Result<bool, NetplanError> {
        debug!(
            "Staging {}={} into artifact {}",
            change.target(),
            change.value(),
            self.config.artifact_id
        );
        let args = [
            Value::from(change.encode()),
            Value::from(self.config.artifact_id.as_str()),
        ];
        self.call_session(ConfigMethod::Set, &args, Value::into_bool)
            .await
    }

    /// Ask the service to try the staged configuration.
    ///
    /// A `false` reply means the configuration was not confirmed in time;
    /// it is returned as is and does not drop the session.
    pub async fn try_configuration(&mut self, timeout_seconds: u32) -> Result<bool, NetplanError> {
        self.call_session(
            ConfigMethod::Try,
            &[Value::U32(timeout_seconds)],
            Value::into_bool,
        )
        .await
    }

    /// Commit the staged configuration
    pub async fn apply_configuration(&mut self) -> Result<bool, NetplanError> {
        self.call_session(ConfigMethod::Apply, &[], Value::into_bool)
            .await
    }

    /// Discard the staged configuration; the session is gone afterwards
    /// whether or not the call succeeded
    pub async fn cancel_configuration(&mut self) -> Result<bool, NetplanError> {
        let outcome = self
            .call_session(ConfigMethod::Cancel, &[], Value::into_bool)
            .await;
        self.reset_session();
        outcome
    }

    async fn ensure_session(&mut self) -> Result<SessionPath, NetplanError> {
        if let SessionState::Active(path) = &self.state {
            return Ok(path.clone());
        }

        let service = &self.config.service;
        self.object.set_path(service.root_object_path.as_str());

        debug!(
            "Opening configuration session via {}.{}",
            service.root_interface, service.session_factory_method
        );

        let reply = self
            .channel
            .invoke(
                &self.object,
                &service.root_interface,
                &service.session_factory_method,
                &[],
                ReplyKind::ObjectPath,
            )
            .await
            .and_then(|value| {
                value
                    .into_object_path()
                    .and_then(SessionPath::new)
                    .ok_or_else(|| ChannelError::UnexpectedReply {
                        method: service.session_factory_method.clone(),
                        expected: ReplyKind::ObjectPath,
                    })
            });

        match reply {
            Ok(path) => {
                info!("Opened configuration session {}", path);
                self.state = SessionState::Active(path.clone());
                Ok(path)
            }
            Err(source) => {
                warn!("Failed to open configuration session: {}", source);
                self.state = SessionState::NoSession;
                Err(NetplanError::Session { source })
            }
        }
    }

    async fn call_session<T>(
        &mut self,
        method: ConfigMethod,
        args: &[Value],
        extract: fn(Value) -> Option<T>,
    ) -> Result<T, NetplanError> {
        let path = self.ensure_session().await?;
        self.object.set_path(path.as_str());

        let outcome = self
            .channel
            .invoke(
                &self.object,
                &self.config.service.config_interface,
                method.as_str(),
                args,
                method.reply_kind(),
            )
            .await
            .and_then(|value| {
                extract(value).ok_or_else(|| ChannelError::UnexpectedReply {
                    method: method.to_string(),
                    expected: method.reply_kind(),
                })
            });

        outcome.map_err(|err| {
            warn!("{} on session {} failed: {}", method, path, err);
            self.reset_session();
            NetplanError::from_call(method, err)
        })
    }
}
