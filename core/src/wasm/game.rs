//! Lifecycle controller backed by a WASM guest

use anyhow::{Result, anyhow};
use wasmtime::{Instance, Store, TypedFunc};

use super::context::WasmGameContext;
use crate::control::{ControlAction, ControlEventType, ControlKey};
use crate::frame::Frame;
use crate::lifecycle::{GameLifecycle, HostRequest};
use crate::modules::GameModules;

/// Keys forwarded to the guest's `on_control` export
const GUEST_KEYS: [ControlKey; 5] = [
    ControlKey::Left,
    ControlKey::Right,
    ControlKey::Up,
    ControlKey::Down,
    ControlKey::Action,
];

/// An instantiated external game
pub struct WasmGame {
    id: String,
    modules: GameModules,
    active: bool,
    store: Store<WasmGameContext>,
    /// Kept alive for the exported functions and memory
    #[allow(dead_code)]
    instance: Instance,
    update_fn: Option<TypedFunc<(), ()>>,
    render_fn: Option<TypedFunc<(), ()>>,
    on_control_fn: Option<TypedFunc<i32, ()>>,
    on_power_fn: Option<TypedFunc<i32, ()>>,
    pending: Option<HostRequest>,
}

impl WasmGame {
    pub(super) fn new(id: String, mut store: Store<WasmGameContext>, instance: Instance) -> Result<Self> {
        let update_fn = instance.get_typed_func::<(), ()>(&mut store, "update").ok();
        let render_fn = instance.get_typed_func::<(), ()>(&mut store, "render").ok();
        let on_control_fn = instance.get_typed_func::<i32, ()>(&mut store, "on_control").ok();
        let on_power_fn = instance.get_typed_func::<i32, ()>(&mut store, "on_power").ok();

        let mut game = Self {
            id,
            modules: GameModules::new(),
            active: false,
            store,
            instance,
            update_fn,
            render_fn,
            on_control_fn,
            on_power_fn,
            pending: None,
        };
        // Cues queued by the constructor
        game.drain_guest_output();
        Ok(game)
    }

    /// Push the host-side module state the FFI functions read.
    fn sync_guest_state(&mut self) {
        let time = self.modules.time;
        let playing = self.modules.state.is_playing();
        let state = &mut self.store.data_mut().game;
        state.delta_time = time.delta;
        state.elapsed_time = time.elapsed;
        state.tick_count = time.ticks;
        state.playing = playing;
    }

    /// Move guest-side sound requests and quit flags onto the host.
    fn drain_guest_output(&mut self) {
        let state = &mut self.store.data_mut().game;
        let sounds = std::mem::take(&mut state.sounds);
        let quit = std::mem::take(&mut state.quit_requested);
        for sound in sounds {
            self.modules.sound.play(sound);
        }
        if quit {
            self.pending = Some(HostRequest::ExitToMenu);
        }
    }

    fn call(&mut self, func: Option<TypedFunc<(), ()>>, name: &str) -> Result<()> {
        let Some(func) = func else {
            return Ok(());
        };
        self.sync_guest_state();
        let result = func.call(&mut self.store, ());
        self.drain_guest_output();
        result.map_err(|e| anyhow!("WASM {name}() failed at tick {}: {e:#}", self.modules.time.ticks))
    }

    fn call_i32(&mut self, func: Option<TypedFunc<i32, ()>>, name: &str, arg: i32) -> Result<()> {
        let Some(func) = func else {
            return Ok(());
        };
        self.sync_guest_state();
        let result = func.call(&mut self.store, arg);
        self.drain_guest_output();
        result.map_err(|e| anyhow!("WASM {name}({arg}) failed: {e:#}"))
    }
}

impl GameLifecycle for WasmGame {
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
        self.modules.control.unsubscribe_all();
        self.modules.install_default_bindings();
        if self.on_control_fn.is_some() {
            for key in GUEST_KEYS {
                self.modules.control.subscribe(
                    key,
                    ControlEventType::Pressed,
                    ControlAction::Game(key.code() as u32),
                );
            }
        }
        self.modules.time.reset();
        self.active = true;
        Ok(())
    }

    fn update(&mut self, _delta: f32) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.call(self.update_fn.clone(), "update")
    }

    fn render(&mut self, frame: &mut Frame) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.store.data_mut().game.draws.clear();
        let result = self.call(self.render_fn.clone(), "render");
        for command in self.store.data_mut().game.draws.drain(..) {
            frame.push(command);
        }
        result
    }

    fn destroy(&mut self) {
        self.modules.control.unsubscribe_all();
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn on_action(&mut self, action: u32) -> Result<Option<HostRequest>> {
        if !self.active {
            return Ok(None);
        }
        self.call_i32(self.on_control_fn.clone(), "on_control", action as i32)?;
        Ok(self.pending.take())
    }

    fn on_power(&mut self, on: bool) -> Result<()> {
        self.call_i32(self.on_power_fn.clone(), "on_power", on as i32)
    }

    fn take_host_request(&mut self) -> Option<HostRequest> {
        self.pending.take()
    }
}
