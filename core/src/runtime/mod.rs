//! Game loop orchestration
//!
//! Owns the "active" pointer: the single controller bound to the frame loop.
//! Runs fixed timestep updates with a variable render rate, dispatches input
//! to the active controller and collects the [`HostRequest`]s it raises.

use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::control::{ControlAction, ControlEvent};
use crate::frame::Frame;
use crate::lifecycle::{GameHandle, GameLifecycle, HostRequest};
use crate::sound::Audio;

mod config;
mod game_loop;


pub use config::RuntimeConfig;

/// Main runtime driving the active controller
pub struct Runtime {
    config: RuntimeConfig,
    active: Option<GameHandle>,
    running: bool,
    accumulator: Duration,
    last_update: Option<Instant>,
    tick_duration: Duration,
    frame: Frame,
    requests: VecDeque<HostRequest>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        let tick_duration = config.tick_duration();
        Self {
            config,
            active: None,
            running: false,
            accumulator: Duration::ZERO,
            last_update: None,
            tick_duration,
            frame: Frame::new(),
            requests: VecDeque::new(),
        }
    }

    /// Set the tick rate
    pub fn set_tick_rate(&mut self, tick_rate: u32) {
        self.config.tick_rate = tick_rate;
        self.tick_duration = self.config.tick_duration();
    }

    /// Get the tick duration (time per tick, inverse of tick rate)
    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Get the current tick rate
    pub fn tick_rate(&self) -> u32 {
        self.config.tick_rate
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Rebind the active pointer. Returns the previously active controller.
    ///
    /// Timing state and queued requests belong to the old controller and are
    /// discarded.
    pub fn set_active(&mut self, game: GameHandle) -> Option<GameHandle> {
        self.accumulator = Duration::ZERO;
        self.last_update = None;
        self.requests.clear();
        self.frame.clear();
        self.active.replace(game)
    }

    pub fn active(&self) -> Option<&GameHandle> {
        self.active.as_ref()
    }

    /// Whether `game` is the controller bound to the loop.
    pub fn is_active(&self, game: &GameHandle) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| Rc::ptr_eq(active, game))
    }

    pub fn active_id(&self) -> Option<String> {
        self.active
            .as_ref()
            .map(|game| game.borrow().game_id().to_string())
    }

    /// Stop updating and rendering until [`Runtime::resume`].
    pub fn halt(&mut self) {
        self.running = false;
    }

    /// Restart the loop after a halt.
    pub fn resume(&mut self) {
        if !self.running {
            self.running = true;
            self.last_update = None;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run a single frame using wall-clock time.
    ///
    /// Returns the number of ticks that were executed and the interpolation
    /// factor for rendering between the last two states.
    pub fn frame(&mut self) -> (u32, f32) {
        let now = Instant::now();
        let delta = match self.last_update {
            Some(last) => now - last,
            None => self.tick_duration,
        };
        self.last_update = Some(now);
        self.frame_with_delta(delta)
    }

    /// Run a single frame with an explicit elapsed time.
    pub fn frame_with_delta(&mut self, delta: Duration) -> (u32, f32) {
        if !self.running {
            return (0, 0.0);
        }
        let Some(game) = &self.active else {
            return (0, 0.0);
        };
        game_loop::execute_frame(
            &self.config,
            self.tick_duration,
            &mut self.accumulator,
            delta,
            game,
            &mut self.frame,
            &mut self.requests,
        )
    }

    /// The most recently rendered frame
    pub fn last_frame(&self) -> &Frame {
        &self.frame
    }

    /// Deliver a key event to the active controller.
    ///
    /// Ignored while halted. Failures are logged, never returned.
    pub fn handle_input(&mut self, event: ControlEvent) {
        if !self.running {
            return;
        }
        let Some(handle) = &self.active else {
            return;
        };
        let mut game = handle.borrow_mut();
        let actions = game.modules().control.notify(event.key, event.event_type);
        for action in actions {
            match dispatch_action(&mut *game, action) {
                Ok(Some(request)) => self.requests.push_back(request),
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(game = game.game_id(), ?action, "control action failed: {e:#}");
                }
            }
        }
    }

    /// Queue a request on behalf of the launcher.
    pub fn push_request(&mut self, request: HostRequest) {
        self.requests.push_back(request);
    }

    /// Take the next pending request, oldest first.
    pub fn next_request(&mut self) -> Option<HostRequest> {
        self.requests.pop_front()
    }

    pub fn has_pending_requests(&self) -> bool {
        !self.requests.is_empty()
    }

    /// Play the active controller's queued sound cues.
    pub fn flush_audio(&mut self, audio: &mut dyn Audio) {
        if let Some(game) = &self.active {
            game.borrow_mut().modules_mut().sound.flush(audio);
        }
    }
}

/// Apply one fired control action to a controller.
fn dispatch_action(
    game: &mut dyn GameLifecycle,
    action: ControlAction,
) -> Result<Option<HostRequest>> {
    match action {
        ControlAction::Game(id) => game.on_action(id),
        ControlAction::TogglePower => {
            game.toggle_power();
            Ok(None)
        }
        ControlAction::StartOrPause => {
            if let Err(e) = game.start_or_pause() {
                tracing::debug!(game = game.game_id(), "start ignored: {e}");
            }
            Ok(None)
        }
        ControlAction::ExitToMenu => Ok(Some(HostRequest::ExitToMenu)),
        ControlAction::PowerToMenu => {
            if game.modules().state.is_on() {
                Ok(Some(HostRequest::PowerToMenu))
            } else {
                game.turn_on();
                Ok(None)
            }
        }
    }
}
