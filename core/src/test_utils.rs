//! Shared test utilities for unit tests and downstream crates
//!
//! Enabled for this crate's own tests and, for other crates, through the
//! `test-utils` feature.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Result, bail};

use crate::control::{ControlAction, ControlEventType, ControlKey};
use crate::display::Display;
use crate::frame::{FontAlign, FontSize, Frame};
use crate::lifecycle::{GameLifecycle, HostRequest};
use crate::modules::{Continuity, GameModules, ModulesSnapshot};
use crate::sound::{Audio, Sound};

// ============================================================================
// Test Game
// ============================================================================

/// Game action fired by ACTION presses on a [`TestGame`]
pub const TEST_ACTION: u32 = 1;

/// Scripted controller that records every lifecycle call.
#[derive(Debug)]
pub struct TestGame {
    id: String,
    modules: GameModules,
    active: bool,
    pending: Option<HostRequest>,
    /// Lifecycle calls in order ("setup", "destroy", "power:on", ...)
    pub events: Vec<String>,
    pub updates: u32,
    pub renders: u32,
    pub actions: u32,
    pub received: Option<Continuity>,
    pub fail_setup: bool,
    pub fail_update: bool,
    /// Request returned from the next ACTION press
    pub action_request: Option<HostRequest>,
}

impl TestGame {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            modules: GameModules::new(),
            active: false,
            pending: None,
            events: Vec::new(),
            updates: 0,
            renders: 0,
            actions: 0,
            received: None,
            fail_setup: false,
            fail_update: false,
            action_request: None,
        }
    }

    pub fn shared(id: &str) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(id)))
    }

    /// Raise a request from the next update.
    pub fn queue_request(&mut self, request: HostRequest) {
        self.pending = Some(request);
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }
}

impl GameLifecycle for TestGame {
    fn game_id(&self) -> &str {
        &self.id
    }

    fn set_game_id(&mut self, id: String) {
        self.id = id;
    }

    fn modules(&self) -> &GameModules {
        &self.modules
    }

    fn modules_mut(&mut self) -> &mut GameModules {
        &mut self.modules
    }

    fn setup(&mut self) -> Result<()> {
        self.events.push("setup".into());
        if self.fail_setup {
            bail!("scripted setup failure");
        }
        self.modules.control.unsubscribe_all();
        self.modules.install_default_bindings();
        self.modules.control.subscribe(
            ControlKey::Action,
            ControlEventType::Pressed,
            ControlAction::Game(TEST_ACTION),
        );
        self.active = true;
        Ok(())
    }

    fn update(&mut self, _delta: f32) -> Result<()> {
        self.updates += 1;
        if self.fail_update {
            bail!("scripted update failure");
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) -> Result<()> {
        self.renders += 1;
        frame.text(self.id.clone(), 0.5, 0.5, FontSize::Medium, FontAlign::Center);
        Ok(())
    }

    fn destroy(&mut self) {
        self.events.push("destroy".into());
        self.modules.control.unsubscribe_all();
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn on_action(&mut self, action: u32) -> Result<Option<HostRequest>> {
        if action == TEST_ACTION {
            self.actions += 1;
        }
        Ok(self.action_request.take())
    }

    fn on_power(&mut self, on: bool) -> Result<()> {
        self.events
            .push(if on { "power:on" } else { "power:off" }.into());
        Ok(())
    }

    fn take_host_request(&mut self) -> Option<HostRequest> {
        self.pending.take()
    }

    fn accept_continuity(&mut self, continuity: Continuity) {
        self.received = Some(continuity);
        self.modules.accept_continuity(continuity);
    }
}

// ============================================================================
// Test Display / Audio
// ============================================================================

/// Display that records every call
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub bound: Vec<String>,
    pub snapshots: Vec<ModulesSnapshot>,
    pub frames: Vec<Frame>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_bound(&self) -> Option<&str> {
        self.bound.last().map(String::as_str)
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl Display for RecordingDisplay {
    fn bind_controls(&mut self, game_id: &str) {
        self.bound.push(game_id.to_string());
    }

    fn update_debugger_game_modules(&mut self, modules: &ModulesSnapshot) {
        self.snapshots.push(modules.clone());
    }

    fn present(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }
}

/// Audio backend that records every cue
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub played: Vec<(Sound, f32)>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, sound: Sound) -> usize {
        self.played.iter().filter(|(s, _)| *s == sound).count()
    }
}

impl Audio for RecordingAudio {
    fn play(&mut self, sound: Sound, volume: f32) {
        self.played.push((sound, volume));
    }
}
