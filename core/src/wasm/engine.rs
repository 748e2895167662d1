//! WASM engine wrapper for loading and compiling game modules

use anyhow::{Context, Result};
use wasmtime::{Engine, ExternType, Module};

use brickbox_shared::ENTRY_POINT_EXPORT;

/// Shared WASM engine (one per application)
///
/// Cloning is cheap; clones share the same compiled-code cache.
#[derive(Clone)]
pub struct WasmEngine {
    engine: Engine,
}

impl WasmEngine {
    /// Create a new WASM engine with default configuration
    pub fn new() -> Result<Self> {
        let engine = Engine::default();
        Ok(Self { engine })
    }

    /// Get a reference to the underlying wasmtime engine
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Load a WASM module from bytes
    pub fn load_module(&self, bytes: &[u8]) -> Result<Module> {
        Module::new(&self.engine, bytes).context("Failed to compile WASM module")
    }

    /// Whether the module exports the `brick_game_create` constructor.
    pub fn has_entry_point(module: &Module) -> bool {
        module.exports().any(|export| {
            export.name() == ENTRY_POINT_EXPORT && matches!(export.ty(), ExternType::Func(_))
        })
    }

    /// Validate that a module's declared memory fits the guest RAM limit
    ///
    /// Gives a clear error up front instead of a failed instantiation.
    pub fn validate_module_memory(module: &Module, ram_limit: usize) -> Result<()> {
        for export in module.exports() {
            if let ExternType::Memory(mem_type) = export.ty() {
                let min_pages = mem_type.minimum();
                let min_bytes = min_pages as usize * 65536; // WASM pages are 64KB

                if min_bytes > ram_limit {
                    anyhow::bail!(
                        "Module '{}' requires {} bytes ({} pages) minimum memory, \
                         but the launcher only allows {} bytes",
                        export.name(),
                        min_bytes,
                        min_pages,
                        ram_limit
                    );
                }

                if mem_type.maximum().is_none() {
                    tracing::debug!(
                        "Module memory '{}' has no maximum declared; \
                         host will limit to {} bytes",
                        export.name(),
                        ram_limit
                    );
                }
            }
        }
        Ok(())
    }
}
