//! Engine modules owned by every game controller
//!
//! - [`StateMachine`] - power / progress / play state
//! - [`ControlModule`] - input subscriptions
//! - [`SoundModule`] - queued sound cues
//! - [`TimeModule`] - simulation clock

use crate::control::{ControlAction, ControlEventType, ControlKey, ControlModule};
use crate::sound::{Sound, SoundModule};
use crate::state::{IllegalTransition, LifecycleState, StateChange, StateMachine, Transition};

/// Simulation clock advanced once per tick by the runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeModule {
    /// Seconds since the controller was set up
    pub elapsed: f32,
    /// Delta of the current tick (seconds)
    pub delta: f32,
    /// Ticks since the controller was set up
    pub ticks: u64,
}

impl TimeModule {
    pub fn advance(&mut self, delta: f32) {
        self.delta = delta;
        self.elapsed += delta;
        self.ticks += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Data carried over from the outgoing controller to the incoming one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Continuity {
    pub volume: f32,
    pub muted: bool,
}

/// Read-only view of a controller's modules for debug/inspection surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct ModulesSnapshot {
    pub game_id: String,
    pub state: LifecycleState,
    pub subscriptions: usize,
    pub volume: f32,
    pub muted: bool,
    pub session_enabled: bool,
    pub elapsed: f32,
    pub ticks: u64,
}

/// Modules every controller exposes.
#[derive(Debug)]
pub struct GameModules {
    pub state: StateMachine,
    pub control: ControlModule,
    pub sound: SoundModule,
    pub time: TimeModule,
    /// Whether progress should be persisted between runs
    pub session_enabled: bool,
}

impl Default for GameModules {
    fn default() -> Self {
        Self {
            state: StateMachine::new(),
            control: ControlModule::new(),
            sound: SoundModule::new(),
            time: TimeModule::default(),
            session_enabled: true,
        }
    }
}

impl GameModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe the engine-wide POWER and START behaviour.
    pub fn install_default_bindings(&mut self) {
        self.control.subscribe(
            ControlKey::Power,
            ControlEventType::Pressed,
            ControlAction::TogglePower,
        );
        self.control.subscribe(
            ControlKey::Start,
            ControlEventType::Pressed,
            ControlAction::StartOrPause,
        );
    }

    /// Apply a lifecycle transition and fire its side effects.
    ///
    /// Powering on queues the start theme.
    pub fn transition(&mut self, transition: Transition) -> Result<StateChange, IllegalTransition> {
        let change = self.state.apply(transition)?;
        if change.powered_on() {
            self.sound.play(Sound::StartTheme);
        }
        Ok(change)
    }

    pub fn turn_on(&mut self) -> StateChange {
        // TurnOn is legal from every state
        self.transition(Transition::TurnOn).unwrap_or(StateChange {
            from: self.state.state(),
            to: self.state.state(),
        })
    }

    pub fn turn_off(&mut self) -> StateChange {
        let from = self.state.state();
        self.transition(Transition::TurnOff)
            .unwrap_or(StateChange { from, to: from })
    }

    pub fn toggle_power(&mut self) -> StateChange {
        if self.state.is_on() {
            self.turn_off()
        } else {
            self.turn_on()
        }
    }

    /// START key: leave the title screen, or toggle pause once started.
    pub fn start_or_pause(&mut self) -> Result<StateChange, IllegalTransition> {
        let transition = match self.state.state() {
            LifecycleState::Idle => Transition::Start,
            LifecycleState::Playing => Transition::Pause,
            LifecycleState::Paused => Transition::Resume,
            LifecycleState::Off => Transition::Start,
        };
        self.transition(transition)
    }

    pub fn continuity(&self) -> Continuity {
        Continuity {
            volume: self.sound.volume(),
            muted: self.sound.is_muted(),
        }
    }

    pub fn accept_continuity(&mut self, continuity: Continuity) {
        self.sound.set_volume(continuity.volume);
        self.sound.set_muted(continuity.muted);
    }

    pub fn snapshot(&self, game_id: &str) -> ModulesSnapshot {
        ModulesSnapshot {
            game_id: game_id.to_string(),
            state: self.state.state(),
            subscriptions: self.control.len(),
            volume: self.sound.volume(),
            muted: self.sound.is_muted(),
            session_enabled: self.session_enabled,
            elapsed: self.time.elapsed,
            ticks: self.time.ticks,
        }
    }
}
