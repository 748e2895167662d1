//! Helpers for validating catalog identifiers.

/// Returns true if a game id can identify a catalog entry.
///
/// Rules:
/// - Must be non-empty after trimming whitespace
/// - Must not contain control characters or NUL
pub fn is_valid_game_id(id: &str) -> bool {
    if id.trim().is_empty() {
        return false;
    }

    !id.chars().any(|c| c == '\0' || c.is_control())
}
