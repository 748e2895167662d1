//! Centralized constants for the Brickbox launcher.

/// Bearer token prefix for Authorization headers.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Local development listing service base URL.
///
/// Used when no catalog endpoint is configured.
pub const LOCAL_DEV_BASE_URL: &str = "http://127.0.0.1:54321";

/// Path of the game listing function relative to the base URL.
pub const LISTING_PATH: &str = "functions/v1/list";

/// Game id the menu assigns to itself.
pub const MENU_GAME_ID: &str = "game-menu";

/// Name of the constructor export every external game module must provide.
pub const ENTRY_POINT_EXPORT: &str = "brick_game_create";
