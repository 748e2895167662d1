//! Catalog entries shown by the menu.

use thiserror::Error;

use crate::api::GameListing;
use crate::ids::is_valid_game_id;

/// Synthetic entries that stand in for real catalog data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// Catalog fetch has not completed yet
    Loading,
    /// Listing service answered with no games
    Empty,
    /// Listing could not be fetched or parsed
    Error,
}

impl Sentinel {
    pub const ALL: [Sentinel; 3] = [Sentinel::Loading, Sentinel::Empty, Sentinel::Error];

    /// Id carried by the sentinel entry.
    pub const fn id(self) -> &'static str {
        match self {
            Sentinel::Loading => "loading",
            Sentinel::Empty => "empty",
            Sentinel::Error => "error",
        }
    }

    /// Name the menu shows for the sentinel entry.
    pub const fn display_name(self) -> &'static str {
        match self {
            Sentinel::Loading => "Loading...",
            Sentinel::Empty => "Not found",
            Sentinel::Error => "Error",
        }
    }

    /// Look up the sentinel for an id, if it is one.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }
}

/// Rejected catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidEntry {
    #[error("catalog entry id must be non-empty and printable, got {0:?}")]
    Id(String),
}

/// One selectable game: identity, display name and load location.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogEntry {
    id: String,
    display_name: String,
    load_location: String,
}

impl CatalogEntry {
    /// Create an entry, validating its id.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        load_location: impl Into<String>,
    ) -> Result<Self, InvalidEntry> {
        let id = id.into();
        if !is_valid_game_id(&id) {
            return Err(InvalidEntry::Id(id));
        }
        Ok(Self {
            id,
            display_name: display_name.into(),
            load_location: load_location.into(),
        })
    }

    /// The placeholder entry for a sentinel state. Its load location is empty.
    pub fn sentinel(kind: Sentinel) -> Self {
        Self {
            id: kind.id().to_string(),
            display_name: kind.display_name().to_string(),
            load_location: String::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn load_location(&self) -> &str {
        &self.load_location
    }

    /// Whether this entry is a synthetic placeholder rather than a real game.
    pub fn is_sentinel(&self) -> bool {
        Sentinel::from_id(&self.id).is_some()
    }
}

impl TryFrom<&GameListing> for CatalogEntry {
    type Error = InvalidEntry;

    fn try_from(listing: &GameListing) -> Result<Self, Self::Error> {
        CatalogEntry::new(&listing.id, &listing.name, &listing.url)
    }
}
