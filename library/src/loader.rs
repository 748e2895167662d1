//! Game module loader
//!
//! Fetches a game's WASM module, compiles it off the frame loop and hands the
//! resulting [`GameFactory`] straight back to the caller.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use brickbox_core::{GameFactory, ModuleError, WasmEngine};
use brickbox_shared::CatalogEntry;

use crate::config::LoaderConfig;
use crate::http::{BodyError, read_body_limited};

/// Boxed future returned by [`ModuleFetcher::fetch`]
pub type BytesFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>, LoadError>> + Send + 'a>>;

/// Failure loading a game module
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid load location {0:?}")]
    InvalidLocation(String),
    #[error("failed to fetch {location}: {message}")]
    Fetch { location: String, message: String },
    #[error("HTTP {status} fetching {location}")]
    Status { location: String, status: u16 },
    #[error("module is at least {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: usize },
    #[error("module does not export `{0}`")]
    MissingEntryPoint(&'static str),
    #[error("module rejected: {0}")]
    Module(ModuleError),
    #[error("game constructor failed: {0:#}")]
    Construct(anyhow::Error),
    #[error("load timed out after {0:?}")]
    Timeout(Duration),
    #[error("load task ended before completing")]
    Cancelled,
}

impl From<ModuleError> for LoadError {
    fn from(e: ModuleError) -> Self {
        match e {
            ModuleError::MissingEntryPoint(name) => LoadError::MissingEntryPoint(name),
            other => LoadError::Module(other),
        }
    }
}

/// Where module bytes come from
pub trait ModuleFetcher: Send + Sync + 'static {
    fn fetch<'a>(&'a self, location: &'a str) -> BytesFuture<'a>;
}

/// Fetches `http(s)://` locations with reqwest and everything else from disk.
///
/// Bodies larger than `max_bytes` are refused without being buffered.
pub struct HttpModuleFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpModuleFetcher {
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::Fetch {
                location: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client, max_bytes })
    }

    async fn fetch_http(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        let fetch_error = |e: reqwest::Error| LoadError::Fetch {
            location: location.to_string(),
            message: e.to_string(),
        };
        let response = self.client.get(location).send().await.map_err(fetch_error)?;
        if !response.status().is_success() {
            return Err(LoadError::Status {
                location: location.to_string(),
                status: response.status().as_u16(),
            });
        }
        read_body_limited(response, self.max_bytes)
            .await
            .map_err(|e| match e {
                BodyError::TooLarge { size, limit } => LoadError::TooLarge { size, limit },
                BodyError::Transport(e) => fetch_error(e),
            })
    }

    async fn fetch_file(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        let path = local_path(location).ok_or_else(|| LoadError::InvalidLocation(location.to_string()))?;
        let io_error = |e: std::io::Error| LoadError::Fetch {
            location: location.to_string(),
            message: e.to_string(),
        };
        let size = tokio::fs::metadata(&path).await.map_err(io_error)?.len();
        if size > self.max_bytes as u64 {
            return Err(LoadError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        tokio::fs::read(&path).await.map_err(io_error)
    }
}

impl ModuleFetcher for HttpModuleFetcher {
    fn fetch<'a>(&'a self, location: &'a str) -> BytesFuture<'a> {
        if is_http(location) {
            Box::pin(self.fetch_http(location))
        } else {
            Box::pin(self.fetch_file(location))
        }
    }
}

fn is_http(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Filesystem path for a `file://` URL or bare path.
fn local_path(location: &str) -> Option<PathBuf> {
    let path = location.strip_prefix("file://").unwrap_or(location);
    if path.is_empty() || path.contains("://") {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

/// A load running on the async runtime
pub struct PendingLoad {
    entry: CatalogEntry,
    rx: oneshot::Receiver<Result<GameFactory, LoadError>>,
    result: Option<Result<GameFactory, LoadError>>,
}

impl PendingLoad {
    pub fn entry(&self) -> &CatalogEntry {
        &self.entry
    }

    /// Take the result if the load has finished. Never blocks.
    pub fn try_take(&mut self) -> Option<Result<GameFactory, LoadError>> {
        if let Some(result) = self.result.take() {
            return Some(result);
        }
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(LoadError::Cancelled)),
        }
    }

    /// Wait for the load to finish without consuming the result.
    pub async fn wait(&mut self) {
        if self.result.is_none() {
            let result = (&mut self.rx).await.unwrap_or(Err(LoadError::Cancelled));
            self.result = Some(result);
        }
    }
}

/// Loads game modules on a tokio runtime
#[derive(Clone)]
pub struct ModuleLoader {
    engine: WasmEngine,
    fetcher: Arc<dyn ModuleFetcher>,
    config: LoaderConfig,
    handle: Handle,
}

impl ModuleLoader {
    pub fn new(
        engine: WasmEngine,
        fetcher: Arc<dyn ModuleFetcher>,
        config: LoaderConfig,
        handle: Handle,
    ) -> Self {
        Self {
            engine,
            fetcher,
            config,
            handle,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Start loading `entry` in the background.
    pub fn start(&self, entry: CatalogEntry) -> PendingLoad {
        let (tx, rx) = oneshot::channel();
        let loader = self.clone();
        let location = entry.load_location().to_string();
        self.handle.spawn(async move {
            let result = loader.load(&location).await;
            // The orchestrator may have gone away
            let _ = tx.send(result);
        });
        PendingLoad {
            entry,
            rx,
            result: None,
        }
    }

    /// Fetch, size-check and compile one module within the configured timeout.
    pub async fn load(&self, location: &str) -> Result<GameFactory, LoadError> {
        let timeout = self.config.timeout();
        match tokio::time::timeout(timeout, self.load_inner(location)).await {
            Ok(result) => result,
            Err(_) => Err(LoadError::Timeout(timeout)),
        }
    }

    async fn load_inner(&self, location: &str) -> Result<GameFactory, LoadError> {
        if location.trim().is_empty() {
            return Err(LoadError::InvalidLocation(location.to_string()));
        }

        let bytes = self.fetcher.fetch(location).await?;
        let limit = self.config.max_module_bytes;
        if bytes.len() > limit {
            return Err(LoadError::TooLarge {
                size: bytes.len() as u64,
                limit,
            });
        }
        tracing::debug!("Fetched {} ({} bytes)", location, bytes.len());

        // Compilation is CPU-bound
        let engine = self.engine.clone();
        let ram_limit = self.config.ram_limit;
        let factory = tokio::task::spawn_blocking(move || {
            GameFactory::from_bytes(&engine, &bytes, ram_limit)
        })
        .await
        .map_err(|_| LoadError::Cancelled)??;
        Ok(factory)
    }
}
