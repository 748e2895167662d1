//! Listing service response types.

use serde::{Deserialize, Serialize};

/// A game as described by the listing service.
///
/// The service may send additional fields (author, version, thumbnails);
/// they are ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameListing {
    /// Unique game identifier.
    #[serde(default)]
    pub id: String,
    /// Display name shown in the menu.
    #[serde(default)]
    pub name: String,
    /// Location of the game's WASM module.
    #[serde(default)]
    pub url: String,
}

/// Body of `GET <base>/<listing-path>`.
///
/// A missing or `null` `games` field is treated the same as an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub games: Option<Vec<GameListing>>,
}

impl GamesResponse {
    /// Listings in response order; empty when the field was absent.
    pub fn listings(&self) -> &[GameListing] {
        self.games.as_deref().unwrap_or_default()
    }
}
