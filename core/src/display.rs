//! Display collaborator
//!
//! The launcher never rasterizes anything itself. It hands finished frames
//! and module snapshots to whatever implements [`Display`].

use crate::frame::Frame;
use crate::modules::ModulesSnapshot;

/// Display / control surface trait
pub trait Display {
    /// Route the surface's key events to the controller with this id.
    fn bind_controls(&mut self, game_id: &str);

    /// Publish the active controller's modules to the debug overlay.
    fn update_debugger_game_modules(&mut self, modules: &ModulesSnapshot);

    /// Show a rendered frame.
    fn present(&mut self, frame: &Frame);
}

/// Display that discards everything (headless runs)
pub struct NullDisplay;

impl Display for NullDisplay {
    fn bind_controls(&mut self, _game_id: &str) {}

    fn update_debugger_game_modules(&mut self, _modules: &ModulesSnapshot) {}

    fn present(&mut self, _frame: &Frame) {}
}
