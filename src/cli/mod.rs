//! CLI-specific functionality for the netplan client
//!
//! This module contains all front-end code: argument parsing, configuration
//! discovery, one-shot command execution and the interactive menu.

pub mod args;
pub mod commands;
pub mod config;
pub mod menu;

pub use args::{Args, ConfigOverrides, ExecutionMode, Operation};
pub use config::{ClientConfig, ConfigDiscovery};
pub use menu::{Menu, render_error};
