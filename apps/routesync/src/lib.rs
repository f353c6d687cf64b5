//! # routesync
//!
//! Scenario runner for the routesync engine - THE BINARY.
//!
//! - [`config`]: TOML scenario and route files
//! - [`replay`]: scripted sessions against a live binding
//! - [`cli`]: clap commands wrapping both

pub mod cli;
pub mod config;
pub mod replay;
