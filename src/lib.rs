//! # Netplan Client
//!
//! A session-aware client for netplan's configuration service on the D-Bus
//! system bus. Netplan scopes every edit to a server-side *session*: the
//! client opens one, stages `key=value` changes into it, optionally tries
//! them with a rollback timeout, and finally applies or cancels.
//!
//! ## Architecture Overview
//!
//! - **[`channel`]**: RPC transport abstraction, with a zbus implementation
//!   and an in-memory mock for tests
//! - **[`session`]**: The session manager and its two-state lifecycle
//!   (no session / active session), including the error-reset policy
//! - **[`cli`]**: Argument parsing, configuration discovery, one-shot
//!   commands and the interactive menu
//! - **[`env`]**: Well-known bus names and configuration file locations
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netplan_client::{BusKind, DbusChannel, SessionManager, SessionManagerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let channel = DbusChannel::connect(BusKind::System).await?;
//!     let mut manager = SessionManager::new(Arc::new(channel), SessionManagerConfig::default());
//!
//!     manager.set_configuration("network.ethernets.eth0.dhcp4", "true").await?;
//!     if manager.try_configuration(30).await? {
//!         manager.apply_configuration().await?;
//!     } else {
//!         manager.cancel_configuration().await?;
//!     }
//!     Ok(())
//! }
//! ```

/// RPC channel abstraction and its D-Bus implementation.
pub mod channel;

/// Configuration session lifecycle management.
///
/// Every operation runs against a lazily opened session and drops the
/// cached session whenever a call against it fails.
pub mod session;

/// Environment constants and path utilities.
pub mod env;

// CLI module for command-line interface
pub mod cli;

// Re-export main channel types
pub use channel::{BusKind, ChannelError, DbusChannel, ObjectHandle, RpcChannel, Value};

// Re-export main session types
pub use session::{
    NetplanError, ServiceNames, SessionManager, SessionManagerConfig, SessionState,
    SharedSessionManager, StagedChange,
};
