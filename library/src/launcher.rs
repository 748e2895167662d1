//! Launcher
//!
//! Owns the frame loop and everything bound to it: the menu, the switch
//! orchestrator and the display/audio collaborators. All of it lives on the
//! thread that drives frames.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};

use brickbox_core::{
    Audio, Continuity, ControlEvent, Display, GameHandle, GameLifecycle, HostRequest, Runtime,
};

use crate::catalog::GameCatalog;
use crate::config::LauncherConfig;
use crate::loader::ModuleLoader;
use crate::menu::MenuController;
use crate::orchestrator::{
    SwitchContext, SwitchGuard, SwitchIntent, SwitchOrchestrator, SwitchOutcome,
};
use crate::registry::ActiveGameRegistry;

pub struct Launcher<D: Display, A: Audio> {
    runtime: Runtime,
    catalog: GameCatalog,
    registry: ActiveGameRegistry,
    menu: Rc<RefCell<MenuController>>,
    orchestrator: SwitchOrchestrator,
    display: D,
    audio: A,
    last_outcome: Option<SwitchOutcome>,
}

impl<D: Display, A: Audio> Launcher<D, A> {
    /// Build the launcher and activate the menu, powered off.
    pub fn new(
        config: &LauncherConfig,
        catalog: GameCatalog,
        loader: ModuleLoader,
        mut display: D,
        audio: A,
    ) -> Result<Self> {
        let registry = ActiveGameRegistry::new();
        let guard = SwitchGuard::default();
        let menu = MenuController::create(catalog.clone(), guard.clone(), &registry);
        let orchestrator = SwitchOrchestrator::new(registry.clone(), loader, guard);
        let mut runtime = Runtime::new(config.runtime.to_runtime_config());

        {
            let mut menu = menu.borrow_mut();
            menu.accept_continuity(Continuity {
                volume: config.audio.master_volume,
                muted: config.audio.muted,
            });
            menu.setup().context("Failed to set up the menu")?;
        }
        runtime.set_active(menu.clone());
        display.update_debugger_game_modules(&menu.borrow().snapshot());
        runtime.resume();
        display.bind_controls(menu.borrow().game_id());

        Ok(Self {
            runtime,
            catalog,
            registry,
            menu,
            orchestrator,
            display,
            audio,
            last_outcome: None,
        })
    }

    /// Deliver a key event and act on whatever it requested.
    pub fn handle_input(&mut self, event: ControlEvent) {
        self.runtime.handle_input(event);
        self.process_requests();
    }

    /// Run one frame on wall-clock time.
    pub fn frame(&mut self) -> (u32, f32) {
        self.poll_switch();
        let result = self.runtime.frame();
        self.finish_frame();
        result
    }

    /// Run one frame with an explicit elapsed time.
    pub fn frame_with_delta(&mut self, delta: Duration) -> (u32, f32) {
        self.poll_switch();
        let result = self.runtime.frame_with_delta(delta);
        self.finish_frame();
        result
    }

    fn finish_frame(&mut self) {
        self.process_requests();
        self.runtime.flush_audio(&mut self.audio);
        self.display.present(self.runtime.last_frame());
    }

    /// Finish a background load if it completed.
    pub fn poll_switch(&mut self) -> Option<SwitchOutcome> {
        let mut ctx = SwitchContext {
            runtime: &mut self.runtime,
            display: &mut self.display,
        };
        let outcome = self.orchestrator.poll(&mut ctx);
        if outcome.is_some() {
            self.last_outcome = outcome;
        }
        outcome
    }

    /// Act on queued controller requests, oldest first.
    ///
    /// A switch rebinds the loop and discards whatever the old controller
    /// still had queued.
    pub fn process_requests(&mut self) {
        while let Some(request) = self.runtime.next_request() {
            match request {
                HostRequest::Launch(entry) => {
                    if let Err(e) = self.orchestrator.request_entry(entry) {
                        tracing::warn!("Launch refused: {e}");
                    }
                }
                HostRequest::ExitToMenu => self.return_to_menu(SwitchIntent::Resume),
                HostRequest::PowerToMenu => self.return_to_menu(SwitchIntent::PoweredOff),
            }
        }
    }

    fn return_to_menu(&mut self, intent: SwitchIntent) {
        let mut ctx = SwitchContext {
            runtime: &mut self.runtime,
            display: &mut self.display,
        };
        self.last_outcome = Some(self.orchestrator.switch_to_menu(&mut ctx, intent));
    }

    /// Wait for a background load to finish. The switch itself happens on
    /// the next frame.
    pub async fn settle(&mut self) {
        self.orchestrator.settle().await;
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &ActiveGameRegistry {
        &self.registry
    }

    pub fn menu(&self) -> &Rc<RefCell<MenuController>> {
        &self.menu
    }

    pub fn orchestrator(&self) -> &SwitchOrchestrator {
        &self.orchestrator
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn active(&self) -> Option<&GameHandle> {
        self.runtime.active()
    }

    pub fn active_id(&self) -> Option<String> {
        self.runtime.active_id()
    }

    pub fn is_menu_active(&self) -> bool {
        self.runtime
            .active()
            .is_some_and(|active| self.registry.is_menu(active))
    }

    /// Outcome of the most recent switch attempt.
    pub fn last_outcome(&self) -> Option<SwitchOutcome> {
        self.last_outcome
    }
}
