//! Brickbox Core - host engine for brick games
//!
//! This crate provides the lifecycle contract every game implements, the
//! engine modules it is built from, the frame loop that drives the active
//! game, and the WASM host that turns downloaded modules into games.
//!
//! # Architecture
//!
//! - [`GameLifecycle`] - Capability every controller exposes
//! - [`GameModules`] - State machine, controls, sound and clock of one controller
//! - [`Runtime`] - Fixed-timestep loop bound to the active controller
//! - [`GameFactory`] / [`WasmGame`] - External games loaded from WASM

pub mod control;
pub mod display;
pub mod ffi;
pub mod frame;
pub mod lifecycle;
pub mod modules;
pub mod runtime;
pub mod sound;
pub mod state;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod wasm;

pub use control::{
    ControlAction, ControlEvent, ControlEventType, ControlKey, ControlModule, FiredActions,
    SubscriptionId,
};
pub use display::{Display, NullDisplay};
pub use frame::{DrawCommand, FontAlign, FontSize, Frame};
pub use lifecycle::{GameHandle, GameLifecycle, HostRequest};
pub use modules::{Continuity, GameModules, ModulesSnapshot, TimeModule};
pub use runtime::{Runtime, RuntimeConfig};
pub use sound::{Audio, NullAudio, Sound, SoundModule};
pub use state::{IllegalTransition, LifecycleState, StateChange, StateMachine, Transition};
pub use wasm::{DEFAULT_RAM_LIMIT, GameFactory, ModuleError, WasmEngine, WasmGame};
