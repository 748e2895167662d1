//! Game constructors produced by the loader

use anyhow::{Context, Result};
use thiserror::Error;
use wasmtime::{Linker, Module, Store};

use brickbox_shared::ENTRY_POINT_EXPORT;

use super::context::WasmGameContext;
use super::engine::WasmEngine;
use super::game::WasmGame;
use crate::ffi::register_host_ffi;

/// Why a compiled module cannot become a [`GameFactory`].
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("module does not export `{0}`")]
    MissingEntryPoint(&'static str),
    #[error("module exceeds memory limit: {0:#}")]
    Memory(anyhow::Error),
    #[error("module failed to compile: {0:#}")]
    Compile(anyhow::Error),
}

/// Constructor for one external game
///
/// Consumed by [`GameFactory::create`], so a factory never outlives the
/// switch it was loaded for.
pub struct GameFactory {
    engine: WasmEngine,
    module: Module,
    ram_limit: usize,
}

impl std::fmt::Debug for GameFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameFactory")
            .field("module", &self.module.name())
            .field("ram_limit", &self.ram_limit)
            .finish()
    }
}

impl GameFactory {
    /// Compile `bytes` and check they describe a brick game.
    pub fn from_bytes(engine: &WasmEngine, bytes: &[u8], ram_limit: usize) -> Result<Self, ModuleError> {
        let module = engine.load_module(bytes).map_err(ModuleError::Compile)?;
        Self::from_module(engine, module, ram_limit)
    }

    pub fn from_module(engine: &WasmEngine, module: Module, ram_limit: usize) -> Result<Self, ModuleError> {
        if !WasmEngine::has_entry_point(&module) {
            return Err(ModuleError::MissingEntryPoint(ENTRY_POINT_EXPORT));
        }
        WasmEngine::validate_module_memory(&module, ram_limit).map_err(ModuleError::Memory)?;
        Ok(Self {
            engine: engine.clone(),
            module,
            ram_limit,
        })
    }

    /// Instantiate the module and run its constructor.
    pub fn create(self, game_id: &str) -> Result<WasmGame> {
        let mut linker = Linker::new(self.engine.engine());
        register_host_ffi(&mut linker)?;

        let mut store = Store::new(
            self.engine.engine(),
            WasmGameContext::with_ram_limit(self.ram_limit),
        );
        store.limiter(|ctx| &mut ctx.limits);

        let instance = linker
            .instantiate(&mut store, &self.module)
            .context("Failed to instantiate WASM module")?;

        if let Some(memory) = instance.get_memory(&mut store, "memory") {
            store.data_mut().game.memory = Some(memory);
        }

        let create = instance
            .get_typed_func::<(), ()>(&mut store, ENTRY_POINT_EXPORT)
            .with_context(|| format!("`{ENTRY_POINT_EXPORT}` has the wrong signature"))?;
        create
            .call(&mut store, ())
            .with_context(|| format!("WASM {ENTRY_POINT_EXPORT}() failed"))?;

        WasmGame::new(game_id.to_string(), store, instance)
    }
}
