//! Per-instance host state shared with FFI functions

use anyhow::{Context, Result};
use wasmtime::{Memory, StoreContext, StoreLimits, StoreLimitsBuilder};

use crate::frame::DrawCommand;
use crate::sound::Sound;

/// Default guest linear memory limit (4MB)
pub const DEFAULT_RAM_LIMIT: usize = 4 * 1024 * 1024;

/// Longest string the host will read out of guest memory
pub const MAX_GUEST_STRING: u32 = 1024;

/// Host-visible state of a running guest
#[derive(Debug, Default)]
pub struct GuestState {
    pub memory: Option<Memory>,
    pub delta_time: f32,
    pub elapsed_time: f32,
    pub tick_count: u64,
    pub playing: bool,
    pub quit_requested: bool,
    /// Cues requested since the last drain
    pub sounds: Vec<Sound>,
    /// Draw commands issued during the current `render` call
    pub draws: Vec<DrawCommand>,
}

/// Store data for a guest instance
pub struct WasmGameContext {
    pub game: GuestState,
    pub limits: StoreLimits,
}

impl WasmGameContext {
    pub fn new() -> Self {
        Self::with_ram_limit(DEFAULT_RAM_LIMIT)
    }

    pub fn with_ram_limit(ram_limit: usize) -> Self {
        Self {
            game: GuestState::default(),
            limits: StoreLimitsBuilder::new()
                .memory_size(ram_limit)
                .instances(1)
                .build(),
        }
    }
}

impl Default for WasmGameContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy `len` bytes at `ptr` out of guest memory.
pub fn read_bytes_from_memory<'a, T: 'static>(
    memory: Memory,
    store: impl Into<StoreContext<'a, T>>,
    ptr: u32,
    len: u32,
) -> Result<Vec<u8>> {
    let data = memory.data(store);
    let start = ptr as usize;
    let end = start
        .checked_add(len as usize)
        .context("guest pointer overflow")?;
    data.get(start..end)
        .map(<[u8]>::to_vec)
        .with_context(|| format!("guest range {start}..{end} out of bounds ({} bytes)", data.len()))
}

/// Read a UTF-8 string out of guest memory, truncated to [`MAX_GUEST_STRING`].
pub fn read_string_from_memory<'a, T: 'static>(
    memory: Memory,
    store: impl Into<StoreContext<'a, T>>,
    ptr: u32,
    len: u32,
) -> Result<String> {
    let bytes = read_bytes_from_memory(memory, store, ptr, len.min(MAX_GUEST_STRING))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
