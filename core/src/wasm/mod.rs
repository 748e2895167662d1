//! WASM game host
//!
//! External games are WebAssembly modules exporting `brick_game_create`.
//!
//! # Key Types
//!
//! - [`WasmEngine`] - Shared WASM engine (one per application)
//! - [`GameFactory`] - Validated module, ready to construct a game
//! - [`WasmGame`] - Instantiated guest implementing [`GameLifecycle`](crate::GameLifecycle)
//! - [`WasmGameContext`] - Store data shared with the host FFI

mod context;
mod engine;
mod factory;
mod game;


pub use context::{
    DEFAULT_RAM_LIMIT, GuestState, MAX_GUEST_STRING, WasmGameContext, read_bytes_from_memory,
    read_string_from_memory,
};
pub use engine::WasmEngine;
pub use factory::{GameFactory, ModuleError};
pub use game::WasmGame;
