//! System and timing FFI functions

use wasmtime::Caller;

use crate::wasm::{WasmGameContext, read_string_from_memory};

/// Get delta time of the current tick (seconds)
pub(super) fn delta_time(caller: Caller<'_, WasmGameContext>) -> f32 {
    caller.data().game.delta_time
}

/// Get elapsed time since setup (seconds)
pub(super) fn elapsed_time(caller: Caller<'_, WasmGameContext>) -> f32 {
    caller.data().game.elapsed_time
}

/// Get current tick number
pub(super) fn tick_count(caller: Caller<'_, WasmGameContext>) -> u64 {
    caller.data().game.tick_count
}

/// 1 while the game is started and not paused
pub(super) fn is_playing(caller: Caller<'_, WasmGameContext>) -> i32 {
    caller.data().game.playing as i32
}

/// Log a message from WASM
pub(super) fn log_message(caller: Caller<'_, WasmGameContext>, ptr: u32, len: u32) {
    if let Some(memory) = caller.data().game.memory
        && let Ok(msg) = read_string_from_memory(memory, &caller, ptr, len)
    {
        tracing::info!("[GAME] {}", msg);
    }
}

/// Request to return to the menu
pub(super) fn quit(mut caller: Caller<'_, WasmGameContext>) {
    caller.data_mut().game.quit_requested = true;
}
