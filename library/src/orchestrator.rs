//! Game switch orchestration
//!
//! Hands the frame loop from the active controller to a target: the menu, or
//! an external game produced by the [`ModuleLoader`]. A switch is a short
//! lived state machine:
//!
//! ```text
//! Idle -> Loading -> TearingDown -> Activating -> Done
//!                                             \-> RolledBack
//! ```
//!
//! Load failures abort before teardown, so the active controller is never
//! touched. Failures after teardown are compensated by restoring the previous
//! controller (or the menu).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use thiserror::Error;

use brickbox_core::{
    ControlAction, ControlEventType, ControlKey, Display, GameHandle, GameLifecycle, Runtime,
};
use brickbox_shared::CatalogEntry;

use crate::loader::{LoadError, ModuleLoader, PendingLoad};
use crate::registry::ActiveGameRegistry;

/// Shared "switch in flight" flag
///
/// Clones refer to the same flag. The menu reads it to ignore ACTION while a
/// switch runs.
#[derive(Debug, Clone, Default)]
pub struct SwitchGuard(Rc<Cell<bool>>);

impl SwitchGuard {
    pub fn in_flight(&self) -> bool {
        self.0.get()
    }

    pub fn set_in_flight(&self, in_flight: bool) {
        self.0.set(in_flight);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwitchPhase {
    #[default]
    Idle,
    Loading,
    TearingDown,
    Activating,
    Done,
    RolledBack,
}

/// Power state the target is left in after activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchIntent {
    /// Turn the target on
    Resume,
    /// Leave the target off (POWER back to the menu)
    PoweredOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The target is active
    Switched,
    /// Nothing changed: load failed, or the switch was refused
    Aborted,
    /// Activation failed and a previous controller was restored
    RolledBack,
    /// Activation and every recovery attempt failed
    Failed,
}

/// Record of the last externally loaded module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedArtifact {
    pub game_id: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("a game switch is already in flight")]
    InFlight,
    #[error("'{0}' is a placeholder entry and cannot be loaded")]
    Sentinel(String),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("setup of '{game}' failed: {source:#}")]
    Setup {
        game: String,
        source: anyhow::Error,
    },
    #[error("no menu is registered")]
    NoMenu,
}

/// What a switch needs from the launcher for its duration.
pub struct SwitchContext<'a> {
    pub runtime: &'a mut Runtime,
    pub display: &'a mut dyn Display,
}

pub struct SwitchOrchestrator {
    registry: ActiveGameRegistry,
    loader: ModuleLoader,
    guard: SwitchGuard,
    phase: SwitchPhase,
    pending: Option<PendingLoad>,
    artifact: Option<LoadedArtifact>,
}

impl SwitchOrchestrator {
    pub fn new(registry: ActiveGameRegistry, loader: ModuleLoader, guard: SwitchGuard) -> Self {
        Self {
            registry,
            loader,
            guard,
            phase: SwitchPhase::Idle,
            pending: None,
            artifact: None,
        }
    }

    pub fn phase(&self) -> SwitchPhase {
        self.phase
    }

    pub fn guard(&self) -> &SwitchGuard {
        &self.guard
    }

    pub fn artifact(&self) -> Option<&LoadedArtifact> {
        self.artifact.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Begin switching to an external game.
    ///
    /// The load runs in the background; [`SwitchOrchestrator::poll`] finishes
    /// the switch once it completes.
    pub fn request_entry(&mut self, entry: CatalogEntry) -> Result<(), SwitchError> {
        if self.guard.in_flight() {
            return Err(SwitchError::InFlight);
        }
        self.artifact = None;
        if entry.is_sentinel() {
            return Err(SwitchError::Sentinel(entry.id().to_string()));
        }

        tracing::info!("Loading game '{}' from {}", entry.id(), entry.load_location());
        self.guard.set_in_flight(true);
        self.phase = SwitchPhase::Loading;
        self.pending = Some(self.loader.start(entry));
        Ok(())
    }

    /// Wait for the background load, if any, to finish.
    pub async fn settle(&mut self) {
        if let Some(pending) = &mut self.pending {
            pending.wait().await;
        }
    }

    /// Finish a completed load. Returns `None` while nothing is ready.
    pub fn poll(&mut self, ctx: &mut SwitchContext<'_>) -> Option<SwitchOutcome> {
        let result = self.pending.as_mut()?.try_take()?;
        let entry = self.pending.take()?.entry().clone();

        let game = result.and_then(|factory| {
            factory
                .create(entry.id())
                .map_err(LoadError::Construct)
        });
        let mut game = match game {
            Ok(game) => game,
            Err(e) => {
                tracing::error!("Failed to load game: {e}");
                self.phase = SwitchPhase::Idle;
                self.guard.set_in_flight(false);
                return Some(SwitchOutcome::Aborted);
            }
        };
        game.set_game_id(entry.id().to_string());

        self.artifact = Some(LoadedArtifact {
            game_id: entry.id().to_string(),
            url: entry.load_location().to_string(),
        });
        let target: GameHandle = Rc::new(RefCell::new(game));
        Some(self.switch_to(ctx, target, SwitchIntent::Resume))
    }

    /// Switch back to the registered menu.
    pub fn switch_to_menu(
        &mut self,
        ctx: &mut SwitchContext<'_>,
        intent: SwitchIntent,
    ) -> SwitchOutcome {
        if self.guard.in_flight() {
            tracing::debug!("Return to menu ignored: {}", SwitchError::InFlight);
            return SwitchOutcome::Aborted;
        }
        let Some(menu) = self.registry.get() else {
            tracing::error!("Error switching game: {}", SwitchError::NoMenu);
            return SwitchOutcome::Failed;
        };
        if ctx.runtime.is_active(&menu) {
            return SwitchOutcome::Aborted;
        }
        self.switch_to(ctx, menu, intent)
    }

    /// Generic switch from the active controller to `target`.
    pub fn switch_to(
        &mut self,
        ctx: &mut SwitchContext<'_>,
        target: GameHandle,
        intent: SwitchIntent,
    ) -> SwitchOutcome {
        self.guard.set_in_flight(true);
        self.phase = SwitchPhase::TearingDown;

        let previous = ctx.runtime.active().cloned();
        let from = ctx.runtime.active_id().unwrap_or_default();
        let continuity = previous.as_ref().map(|prev| {
            let mut prev = prev.borrow_mut();
            prev.destroy();
            // Cues it queued are never played
            prev.modules_mut().sound.clear();
            prev.continuity()
        });
        ctx.runtime.halt();
        if let Some(continuity) = continuity {
            target.borrow_mut().accept_continuity(continuity);
        }

        self.phase = SwitchPhase::Activating;
        let outcome = match self.activate(ctx, &target, intent) {
            Ok(()) => {
                let to = target.borrow().game_id().to_string();
                tracing::info!(from = %from, to = %to, "Switched game");
                self.phase = SwitchPhase::Done;
                SwitchOutcome::Switched
            }
            Err(e) => {
                tracing::error!("Error switching game: {e}");
                target.borrow_mut().destroy();
                self.roll_back(ctx, &target, previous)
            }
        };

        self.guard.set_in_flight(false);
        outcome
    }

    /// Steps 3-9 of a switch: bind, set up and wire `target`.
    fn activate(
        &self,
        ctx: &mut SwitchContext<'_>,
        target: &GameHandle,
        intent: SwitchIntent,
    ) -> Result<(), SwitchError> {
        ctx.runtime.set_active(target.clone());

        let setup = target.borrow_mut().setup();
        setup.map_err(|source| SwitchError::Setup {
            game: target.borrow().game_id().to_string(),
            source,
        })?;

        ctx.display
            .update_debugger_game_modules(&target.borrow().snapshot());
        ctx.runtime.resume();
        ctx.display.bind_controls(target.borrow().game_id());

        let mut game = target.borrow_mut();
        match intent {
            SwitchIntent::Resume => game.turn_on(),
            SwitchIntent::PoweredOff => game.turn_off(),
        };

        let is_menu = self.registry.is_menu(target);
        if !is_menu && self.registry.has_instance() {
            let control = &mut game.modules_mut().control;
            control.rebind(
                ControlKey::Exit,
                ControlEventType::Pressed,
                ControlAction::ExitToMenu,
            );
            control.rebind(
                ControlKey::Power,
                ControlEventType::Pressed,
                ControlAction::PowerToMenu,
            );
        }
        Ok(())
    }

    /// Restore the previous controller, falling back to the menu.
    fn roll_back(
        &mut self,
        ctx: &mut SwitchContext<'_>,
        failed: &GameHandle,
        previous: Option<GameHandle>,
    ) -> SwitchOutcome {
        let mut candidates: Vec<GameHandle> = previous.into_iter().collect();
        if let Some(menu) = self.registry.get() {
            if !candidates.iter().any(|game| Rc::ptr_eq(game, &menu)) {
                candidates.push(menu);
            }
        }
        candidates.retain(|game| !Rc::ptr_eq(game, failed));

        for candidate in candidates {
            match self.activate(ctx, &candidate, SwitchIntent::Resume) {
                Ok(()) => {
                    tracing::warn!(
                        "Restored '{}' after failed switch",
                        candidate.borrow().game_id()
                    );
                    self.phase = SwitchPhase::RolledBack;
                    return SwitchOutcome::RolledBack;
                }
                Err(e) => {
                    tracing::error!("Error switching game: {e}");
                    candidate.borrow_mut().destroy();
                }
            }
        }

        ctx.runtime.halt();
        self.phase = SwitchPhase::RolledBack;
        SwitchOutcome::Failed
    }
}
