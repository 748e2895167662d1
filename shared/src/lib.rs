//! Shared types for the Brickbox game launcher.
//!
//! Everything both the host engine and the launcher need to agree on:
//! the catalog listing wire format and the immutable [`CatalogEntry`].

pub mod api;
pub mod catalog;
pub mod constants;
pub mod ids;

pub use api::{GameListing, GamesResponse};
pub use catalog::{CatalogEntry, InvalidEntry, Sentinel};
pub use constants::*;
