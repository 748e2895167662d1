//! Tests for FFI functions

use super::*;
use crate::frame::DrawCommand;
use crate::sound::Sound;
use crate::wasm::WasmGameContext;
use wasmtime::{Engine, Linker, Module, Store};

fn instantiate(wat: &str) -> (Store<WasmGameContext>, wasmtime::Instance) {
    let engine = Engine::default();
    let mut linker: Linker<WasmGameContext> = Linker::new(&engine);
    register_host_ffi(&mut linker).unwrap();

    let wasm = wat::parse_str(wat).unwrap();
    let module = Module::new(&engine, wasm).unwrap();
    let mut store = Store::new(&engine, WasmGameContext::new());
    let instance = linker.instantiate(&mut store, &module).unwrap();
    if let Some(memory) = instance.get_memory(&mut store, "memory") {
        store.data_mut().game.memory = Some(memory);
    }
    (store, instance)
}

// ============================================================================
// FFI Registration Tests
// ============================================================================

#[test]
fn test_register_host_ffi() {
    let engine = Engine::default();
    let mut linker: Linker<WasmGameContext> = Linker::new(&engine);
    assert!(register_host_ffi(&mut linker).is_ok());
}

#[test]
fn test_all_imports_resolve() {
    let (_store, _instance) = instantiate(
        r#"
        (module
            (import "env" "delta_time" (func (result f32)))
            (import "env" "elapsed_time" (func (result f32)))
            (import "env" "tick_count" (func (result i64)))
            (import "env" "is_playing" (func (result i32)))
            (import "env" "log" (func (param i32 i32)))
            (import "env" "quit" (func))
            (import "env" "play_sound" (func (param i32)))
            (import "env" "draw_text" (func (param i32 i32 f32 f32)))
            (memory (export "memory") 1)
        )
    "#,
    );
}

// ============================================================================
// System Function Tests
// ============================================================================

#[test]
fn test_timing_from_wasm() {
    let (mut store, instance) = instantiate(
        r#"
        (module
            (import "env" "elapsed_time" (func $elapsed_time (result f32)))
            (import "env" "tick_count" (func $tick_count (result i64)))
            (import "env" "is_playing" (func $is_playing (result i32)))
            (func (export "get_elapsed") (result f32) call $elapsed_time)
            (func (export "get_ticks") (result i64) call $tick_count)
            (func (export "get_playing") (result i32) call $is_playing)
        )
    "#,
    );
    {
        let game = &mut store.data_mut().game;
        game.elapsed_time = 1.5;
        game.tick_count = 90;
        game.playing = true;
    }

    let elapsed = instance
        .get_typed_func::<(), f32>(&mut store, "get_elapsed")
        .unwrap()
        .call(&mut store, ())
        .unwrap();
    let ticks = instance
        .get_typed_func::<(), i64>(&mut store, "get_ticks")
        .unwrap()
        .call(&mut store, ())
        .unwrap();
    let playing = instance
        .get_typed_func::<(), i32>(&mut store, "get_playing")
        .unwrap()
        .call(&mut store, ())
        .unwrap();

    assert!((elapsed - 1.5).abs() < f32::EPSILON);
    assert_eq!(ticks, 90);
    assert_eq!(playing, 1);
}

#[test]
fn test_quit_sets_flag() {
    let (mut store, instance) = instantiate(
        r#"
        (module
            (import "env" "quit" (func $quit))
            (func (export "leave") call $quit)
        )
    "#,
    );
    assert!(!store.data().game.quit_requested);
    instance
        .get_typed_func::<(), ()>(&mut store, "leave")
        .unwrap()
        .call(&mut store, ())
        .unwrap();
    assert!(store.data().game.quit_requested);
}

#[test]
fn test_log_out_of_bounds_is_ignored() {
    let (mut store, instance) = instantiate(
        r#"
        (module
            (import "env" "log" (func $log (param i32 i32)))
            (memory (export "memory") 1)
            (func (export "bad_log") (call $log (i32.const 65530) (i32.const 100)))
        )
    "#,
    );
    let result = instance
        .get_typed_func::<(), ()>(&mut store, "bad_log")
        .unwrap()
        .call(&mut store, ());
    assert!(result.is_ok());
}

// ============================================================================
// Output Function Tests
// ============================================================================

#[test]
fn test_play_sound_known_and_unknown() {
    let (mut store, instance) = instantiate(
        r#"
        (module
            (import "env" "play_sound" (func $play_sound (param i32)))
            (func (export "sounds")
                (call $play_sound (i32.const 2))
                (call $play_sound (i32.const 99)))
        )
    "#,
    );
    instance
        .get_typed_func::<(), ()>(&mut store, "sounds")
        .unwrap()
        .call(&mut store, ())
        .unwrap();
    assert_eq!(store.data().game.sounds, vec![Sound::Action2]);
}

#[test]
fn test_draw_text_reads_guest_string() {
    let (mut store, instance) = instantiate(
        r#"
        (module
            (import "env" "draw_text" (func $draw_text (param i32 i32 f32 f32)))
            (memory (export "memory") 1)
            (data (i32.const 8) "Score 10")
            (func (export "draw")
                (call $draw_text (i32.const 8) (i32.const 8) (f32.const 0.25) (f32.const 0.75)))
        )
    "#,
    );
    instance
        .get_typed_func::<(), ()>(&mut store, "draw")
        .unwrap()
        .call(&mut store, ())
        .unwrap();

    let draws = &store.data().game.draws;
    assert_eq!(draws.len(), 1);
    let DrawCommand::Text { text, x, y, .. } = &draws[0];
    assert_eq!(text, "Score 10");
    assert!((x - 0.25).abs() < f32::EPSILON);
    assert!((y - 0.75).abs() < f32::EPSILON);
}
