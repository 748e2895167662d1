//! Brickbox Library - the launcher
//!
//! Holds everything around the core engine that makes a playable shell:
//!
//! - [`config`] - Persisted launcher settings
//! - [`catalog`] - Game catalog fetched once at startup
//! - [`menu`] - The built-in menu game
//! - [`loader`] - Fetching and compiling external game modules
//! - [`orchestrator`] - Switching the frame loop between controllers
//! - [`launcher`] - Ties the above to a display and an audio backend

pub mod catalog;
pub mod config;
pub mod http;
pub mod launcher;
pub mod loader;
pub mod menu;
pub mod orchestrator;
pub mod registry;
pub mod terminal;

pub use catalog::{CatalogError, CatalogSource, GameCatalog, HttpCatalogSource};
pub use config::LauncherConfig;
pub use launcher::Launcher;
pub use loader::{HttpModuleFetcher, LoadError, ModuleFetcher, ModuleLoader};
pub use menu::MenuController;
pub use orchestrator::{SwitchGuard, SwitchIntent, SwitchOrchestrator, SwitchOutcome};
pub use registry::ActiveGameRegistry;
