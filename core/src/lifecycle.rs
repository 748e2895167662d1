//! Game lifecycle capability
//!
//! Every controller bound to the frame loop (the menu and every loaded
//! game) implements [`GameLifecycle`]. Controllers never call back into the
//! launcher; anything that has to leave the controller is returned as a
//! [`HostRequest`].

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use brickbox_shared::CatalogEntry;

use crate::frame::Frame;
use crate::modules::{Continuity, GameModules, ModulesSnapshot};
use crate::state::{IllegalTransition, StateChange};

/// Shared handle to a controller.
///
/// The frame loop, the orchestrator and the registry all point at the same
/// controllers, all on the loop's thread.
pub type GameHandle = Rc<RefCell<dyn GameLifecycle>>;

/// Something a controller wants the launcher to do.
#[derive(Debug, Clone, PartialEq)]
pub enum HostRequest {
    /// Switch to the given catalog entry
    Launch(CatalogEntry),
    /// Return to the menu
    ExitToMenu,
    /// Return to the menu and leave it powered off
    PowerToMenu,
}

/// Capability contract of a game controller
pub trait GameLifecycle {
    /// Identity of this controller (catalog id, or the menu id)
    fn game_id(&self) -> &str;

    fn set_game_id(&mut self, id: String);

    fn modules(&self) -> &GameModules;

    fn modules_mut(&mut self) -> &mut GameModules;

    /// Initialize for one activation: subscribe controls, configure modules.
    fn setup(&mut self) -> Result<()>;

    /// Advance one simulated tick.
    fn update(&mut self, delta: f32) -> Result<()>;

    /// Draw the current state into `frame`.
    fn render(&mut self, frame: &mut Frame) -> Result<()>;

    /// Drop every input subscription and stop reacting to anything.
    fn destroy(&mut self);

    /// Whether the controller is between `setup` and `destroy`.
    fn is_active(&self) -> bool;

    /// Handle a game-defined control action.
    fn on_action(&mut self, _action: u32) -> Result<Option<HostRequest>> {
        Ok(None)
    }

    /// Called after the power flag changed.
    fn on_power(&mut self, _on: bool) -> Result<()> {
        Ok(())
    }

    /// Request raised by the controller itself during `update`.
    fn take_host_request(&mut self) -> Option<HostRequest> {
        None
    }

    fn continuity(&self) -> Continuity {
        self.modules().continuity()
    }

    fn accept_continuity(&mut self, continuity: Continuity) {
        self.modules_mut().accept_continuity(continuity);
    }

    fn snapshot(&self) -> ModulesSnapshot {
        self.modules().snapshot(self.game_id())
    }

    fn turn_on(&mut self) -> StateChange {
        let change = self.modules_mut().turn_on();
        notify_power(self, change);
        change
    }

    fn turn_off(&mut self) -> StateChange {
        let change = self.modules_mut().turn_off();
        notify_power(self, change);
        change
    }

    fn toggle_power(&mut self) -> StateChange {
        if self.modules().state.is_on() {
            self.turn_off()
        } else {
            self.turn_on()
        }
    }

    fn start_or_pause(&mut self) -> Result<StateChange, IllegalTransition> {
        self.modules_mut().start_or_pause()
    }
}

fn notify_power<G: GameLifecycle + ?Sized>(game: &mut G, change: StateChange) {
    if !change.changed() {
        return;
    }
    if let Err(e) = game.on_power(change.to.is_on()) {
        tracing::warn!(game = game.game_id(), "power hook failed: {e:#}");
    }
}
