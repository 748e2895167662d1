//! Lifecycle state machine
//!
//! Power, progress and play are folded into a single enum so that
//! "started implies on" cannot be violated.

use std::fmt;

use thiserror::Error;

/// Lifecycle state of a game controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// Power off (progress is always reset)
    #[default]
    Off,
    /// Powered on, not started (title screen)
    Idle,
    /// Started and paused
    Paused,
    /// Started and playing
    Playing,
}

impl LifecycleState {
    pub fn is_on(self) -> bool {
        self != LifecycleState::Off
    }

    pub fn is_started(self) -> bool {
        matches!(self, LifecycleState::Paused | LifecycleState::Playing)
    }

    pub fn is_playing(self) -> bool {
        self == LifecycleState::Playing
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Off => "off",
            LifecycleState::Idle => "on/not-started",
            LifecycleState::Paused => "started/paused",
            LifecycleState::Playing => "started/playing",
        };
        f.write_str(name)
    }
}

/// Requested change of lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    TurnOn,
    TurnOff,
    Start,
    Pause,
    Resume,
}

/// A transition that is not legal from the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal lifecycle transition {transition:?} from {from}")]
pub struct IllegalTransition {
    pub from: LifecycleState,
    pub transition: Transition,
}

/// Result of an applied transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: LifecycleState,
    pub to: LifecycleState,
}

impl StateChange {
    /// Whether the state actually changed.
    pub fn changed(&self) -> bool {
        self.from != self.to
    }

    /// Whether this change switched the power on.
    pub fn powered_on(&self) -> bool {
        !self.from.is_on() && self.to.is_on()
    }

    /// Whether this change switched the power off.
    pub fn powered_off(&self) -> bool {
        self.from.is_on() && !self.to.is_on()
    }
}

/// Owner of a controller's [`LifecycleState`], enforcing the legal transitions.
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    state: LifecycleState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state.is_on()
    }

    pub fn is_started(&self) -> bool {
        self.state.is_started()
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Apply a transition.
    ///
    /// `TurnOn` while on and `TurnOff` while off are accepted as no-ops.
    pub fn apply(&mut self, transition: Transition) -> Result<StateChange, IllegalTransition> {
        use LifecycleState::*;

        let from = self.state;
        let to = match (from, transition) {
            (Off, Transition::TurnOn) => Idle,
            (on, Transition::TurnOn) => on,
            (_, Transition::TurnOff) => Off,
            (Idle, Transition::Start) => Playing,
            (Playing, Transition::Pause) => Paused,
            (Paused, Transition::Resume) => Playing,
            _ => return Err(IllegalTransition { from, transition }),
        };
        self.state = to;
        Ok(StateChange { from, to })
    }

    /// Reset to `Off` without reporting a change.
    pub fn reset(&mut self) {
        self.state = LifecycleState::Off;
    }
}
