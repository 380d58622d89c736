//! Environment constants and path utilities for the netplan client.
//!
//! This module centralizes the well-known bus names and the configuration
//! file locations used throughout the application, making them easier to
//! maintain and to override in tests.

/// Hidden directory holding the client configuration
pub const CLIENT_DIR_NAME: &str = ".netplan-client";

/// Configuration file name inside [`CLIENT_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Stand-alone configuration file name in the working directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "netplan-client.toml";

/// System-wide configuration file
#[cfg(unix)]
pub const SYSTEM_CONFIG_FILE_PATH: &str = "/etc/netplan-client/config.toml";

/// Well-known names of the netplan D-Bus service
pub mod netplan {
    /// Bus name the service owns on the system bus
    pub const SERVICE_NAME: &str = "io.netplan.Netplan";

    /// Root object exposing the session factory
    pub const ROOT_OBJECT_PATH: &str = "/io/netplan/Netplan";

    /// Interface of the root object
    pub const ROOT_INTERFACE: &str = "io.netplan.Netplan";

    /// Interface implemented by every session object
    pub const CONFIG_INTERFACE: &str = "io.netplan.Netplan.Config";

    /// Method on the root interface that opens a new session
    pub const SESSION_FACTORY_METHOD: &str = "Config";

    /// Artifact the service writes staged changes into (`<name>.yaml`)
    pub const DEFAULT_ARTIFACT_ID: &str = "dbus-test-config";

    /// Seconds `Try` waits for confirmation when the caller gives none
    pub const DEFAULT_TRY_TIMEOUT_SECS: u32 = 30;
}

/// Test-related constants
pub mod test {
    /// Environment variable enabling tests against a live system bus
    pub const RUN_DBUS_TESTS_VAR: &str = "RUN_DBUS_TESTS";
}

use std::path::{Path, PathBuf};

/// Build config directory path in user's home directory
pub fn user_config_dir_path(home_dir: &Path) -> PathBuf {
    home_dir.join(CLIENT_DIR_NAME)
}

/// Build config file path in user's home directory
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    user_config_dir_path(home_dir).join(CONFIG_FILE_NAME)
}

/// Build hidden-directory config file path in the current directory
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    current_dir.join(CLIENT_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Build stand-alone config file path in the current directory
pub fn local_standalone_config_path(current_dir: &Path) -> PathBuf {
    current_dir.join(LOCAL_CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_paths() {
        let home_dir = Path::new("/home/user");
        let current_dir = Path::new("/current/project");

        assert_eq!(
            user_config_file_path(home_dir),
            Path::new("/home/user/.netplan-client/config.toml")
        );

        assert_eq!(
            local_config_file_path(current_dir),
            Path::new("/current/project/.netplan-client/config.toml")
        );

        assert_eq!(
            local_standalone_config_path(current_dir),
            Path::new("/current/project/netplan-client.toml")
        );
    }

    #[test]
    fn test_config_interface_extends_root_interface() {
        assert!(netplan::CONFIG_INTERFACE.starts_with(netplan::ROOT_INTERFACE));
    }
}
