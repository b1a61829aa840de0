//! # stock-cli
//!
//! Interactive console for the stockroom inventory tool.
//!
//! This crate provides:
//! - `AppConfig` layered from defaults, `stockroom.toml`, environment and flags
//! - `Console` port with a terminal implementation
//! - `Menus` for the administrator and buyer roles
//!
//! ## Menus
//!
//! | Role | Actions |
//! |------|---------|
//! | Administrator | add, edit, remove, list products |
//! | Buyer | browse, add to cart, view cart, change quantity, remove, checkout |

pub mod config;
pub mod console;
pub mod menu;

pub use config::{AppConfig, ConfigError, LogFormat};
pub use console::{Console, InputError, TerminalConsole};
pub use menu::Menus;
