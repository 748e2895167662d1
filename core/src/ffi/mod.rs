//! Host FFI functions
//!
//! Everything a guest game may import from module `env`.

mod output;
mod system;

#[cfg(test)]
mod tests;

use anyhow::Result;
use wasmtime::Linker;

use crate::wasm::WasmGameContext;

/// Register the host functions with the linker
pub fn register_host_ffi(linker: &mut Linker<WasmGameContext>) -> Result<()> {
    // System functions
    linker.func_wrap("env", "delta_time", system::delta_time)?;
    linker.func_wrap("env", "elapsed_time", system::elapsed_time)?;
    linker.func_wrap("env", "tick_count", system::tick_count)?;
    linker.func_wrap("env", "is_playing", system::is_playing)?;
    linker.func_wrap("env", "log", system::log_message)?;
    linker.func_wrap("env", "quit", system::quit)?;

    // Output functions
    linker.func_wrap("env", "play_sound", output::play_sound)?;
    linker.func_wrap("env", "draw_text", output::draw_text)?;

    Ok(())
}
