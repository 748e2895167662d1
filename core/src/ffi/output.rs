//! Sound and text output FFI functions

use wasmtime::Caller;

use crate::frame::{DrawCommand, FontAlign, FontSize};
use crate::sound::Sound;
use crate::wasm::{WasmGameContext, read_string_from_memory};

/// Queue a built-in sound cue. Unknown ids are ignored.
pub(super) fn play_sound(mut caller: Caller<'_, WasmGameContext>, id: u32) {
    match Sound::from_id(id) {
        Some(sound) => caller.data_mut().game.sounds.push(sound),
        None => tracing::warn!("guest requested unknown sound {}", id),
    }
}

/// Draw a line of text at normalized display coordinates
pub(super) fn draw_text(mut caller: Caller<'_, WasmGameContext>, ptr: u32, len: u32, x: f32, y: f32) {
    let Some(memory) = caller.data().game.memory else {
        return;
    };
    match read_string_from_memory(memory, &caller, ptr, len) {
        Ok(text) => caller.data_mut().game.draws.push(DrawCommand::Text {
            text,
            x,
            y,
            size: FontSize::default(),
            align: FontAlign::default(),
            pulsing: false,
        }),
        Err(e) => tracing::warn!("draw_text: {e:#}"),
    }
}
