//! Command line argument parsing
//!
//! This module handles CLI argument parsing with subcommands:
//! - `path`: Print the path of a freshly opened configuration session
//! - `get`: Print the configuration document
//! - `set`: Stage a `target=value` change, optionally trying and applying it
//! - `try`: Try the session's staged configuration
//! - `apply`: Apply the session's staged configuration
//! - `cancel`: Cancel the session
//! - `interactive`: Run the interactive menu (default)
//! - `show-config`: Show configuration discovery information
//! - `init-config`: Write a default user configuration file
//!
//! Sessions live only as long as the process, so one-shot commands other
//! than `set --try/--apply` act on a session that holds no staged changes.

use crate::channel::BusKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionMode {
    OneShot(Operation),
    Interactive,
    ShowConfig,
    InitConfig,
}

/// A single session operation requested from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Path,
    Get,
    Set {
        target: String,
        value: String,
        try_timeout: Option<u32>,
        apply: bool,
    },
    Try {
        timeout: Option<u32>,
    },
    Apply,
    Cancel,
}

/// Values from the command line that take precedence over the config file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub bus: Option<BusKind>,
    pub artifact_id: Option<String>,
}

#[derive(Debug, Parser)]
#[command(name = "netplan-client")]
#[command(author = "Netplan Client Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Edit netplan configuration through its D-Bus session API")]
#[command(long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
    /// Bus the netplan service is reached on
    #[arg(long = "bus", value_enum, global = true)]
    pub bus: Option<BusKind>,
    /// Artifact (configuration file name) staged changes are written to
    #[arg(short = 'a', long = "artifact", global = true)]
    pub artifact: Option<String>,
    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the configuration session path
    Path,
    /// Print the current configuration
    Get,
    /// Stage a configuration change
    Set {
        /// Dotted key path, e.g. network.ethernets.eth0.dhcp4
        target: String,
        /// New value for the key
        value: String,
        /// Try the change for SECS seconds after staging it
        #[arg(long = "try", value_name = "SECS")]
        try_timeout: Option<u32>,
        /// Apply the change after staging (and trying) it
        #[arg(long = "apply")]
        apply: bool,
    },
    /// Try the staged configuration
    Try {
        /// Seconds to wait for confirmation
        timeout: Option<u32>,
    },
    /// Apply the staged configuration
    Apply,
    /// Cancel the configuration session
    Cancel,
    /// Run the interactive menu
    Interactive,
    /// Show configuration discovery information
    ShowConfig,
    /// Write a default configuration file to ~/.netplan-client/config.toml
    InitConfig,
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn mode(&self) -> ExecutionMode {
        let operation = match &self.command {
            None | Some(Commands::Interactive) => return ExecutionMode::Interactive,
            Some(Commands::ShowConfig) => return ExecutionMode::ShowConfig,
            Some(Commands::InitConfig) => return ExecutionMode::InitConfig,
            Some(Commands::Path) => Operation::Path,
            Some(Commands::Get) => Operation::Get,
            Some(Commands::Set {
                target,
                value,
                try_timeout,
                apply,
            }) => Operation::Set {
                target: target.clone(),
                value: value.clone(),
                try_timeout: *try_timeout,
                apply: *apply,
            },
            Some(Commands::Try { timeout }) => Operation::Try { timeout: *timeout },
            Some(Commands::Apply) => Operation::Apply,
            Some(Commands::Cancel) => Operation::Cancel,
        };

        ExecutionMode::OneShot(operation)
    }

    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            bus: self.bus,
            artifact_id: self.artifact.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_no_command_runs_interactive() {
        assert_eq!(parse(&["netplan-client"]).mode(), ExecutionMode::Interactive);
    }

    #[test]
    fn test_set_with_chain() {
        let args = parse(&[
            "netplan-client",
            "set",
            "network.ethernets.eth0.dhcp4",
            "true",
            "--try",
            "20",
            "--apply",
        ]);

        assert_eq!(
            args.mode(),
            ExecutionMode::OneShot(Operation::Set {
                target: "network.ethernets.eth0.dhcp4".to_string(),
                value: "true".to_string(),
                try_timeout: Some(20),
                apply: true,
            })
        );
    }

    #[test]
    fn test_global_overrides_after_subcommand() {
        let args = parse(&["netplan-client", "get", "--bus", "session", "-a", "90-test"]);
        let overrides = args.overrides();

        assert_eq!(overrides.bus, Some(BusKind::Session));
        assert_eq!(overrides.artifact_id.as_deref(), Some("90-test"));
        assert_eq!(args.mode(), ExecutionMode::OneShot(Operation::Get));
    }

    #[test]
    fn test_config_subcommands() {
        assert_eq!(
            parse(&["netplan-client", "show-config"]).mode(),
            ExecutionMode::ShowConfig
        );
        assert_eq!(
            parse(&["netplan-client", "init-config"]).mode(),
            ExecutionMode::InitConfig
        );
    }

    #[test]
    fn test_try_timeout_must_be_unsigned() {
        assert!(Args::try_parse_from(["netplan-client", "try", "-5"]).is_err());
        assert_eq!(
            parse(&["netplan-client", "try"]).mode(),
            ExecutionMode::OneShot(Operation::Try { timeout: None })
        );
    }
}
