//! Game catalog
//!
//! Starts as a single "loading" placeholder and is replaced, once, by the
//! result of one fetch against the listing service. Readers always see a
//! complete, non-empty snapshot.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::watch;

use brickbox_shared::{BEARER_PREFIX, CatalogEntry, GamesResponse, Sentinel};

use crate::config::CatalogConfig;
use crate::http::{BodyError, read_body_limited};

/// Immutable, non-empty list of catalog entries
pub type CatalogSnapshot = Arc<[CatalogEntry]>;

/// Boxed future returned by [`CatalogSource::fetch`]
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<GamesResponse, CatalogError>> + Send + 'a>>;

/// Failure fetching the game list
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(String),
    #[error("catalog request returned HTTP {0}")]
    Status(u16),
    #[error("catalog response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog request timed out after {0:?}")]
    Timeout(Duration),
    #[error("catalog response is at least {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: usize },
}

/// Where the catalog comes from
pub trait CatalogSource: Send + Sync + 'static {
    fn fetch(&self) -> FetchFuture<'_>;
}

/// Listing service over HTTP
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpCatalogSource {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: config.listing_url(),
            token: config.token.clone(),
            timeout: config.timeout(),
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_listing(&self) -> Result<GamesResponse, CatalogError> {
        let mut request = self.client.get(&self.url);
        if let Some(token) = &self.token {
            request = request.header(
                reqwest::header::AUTHORIZATION,
                format!("{BEARER_PREFIX}{token}"),
            );
        }

        let response = match tokio::time::timeout(self.timeout, request.send()).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) if e.is_timeout() => return Err(CatalogError::Timeout(self.timeout)),
            Ok(Err(e)) => return Err(CatalogError::Transport(e.to_string())),
            Err(_) => return Err(CatalogError::Timeout(self.timeout)),
        };

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status().as_u16()));
        }

        let body = read_body_limited(response, self.max_body_bytes)
            .await
            .map_err(|e| match e {
                BodyError::TooLarge { size, limit } => CatalogError::TooLarge { size, limit },
                BodyError::Transport(e) => CatalogError::Transport(e.to_string()),
            })?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl CatalogSource for HttpCatalogSource {
    fn fetch(&self) -> FetchFuture<'_> {
        Box::pin(self.fetch_listing())
    }
}

/// Single-entry snapshot for a sentinel state.
pub fn sentinel_snapshot(kind: Sentinel) -> CatalogSnapshot {
    Arc::from([CatalogEntry::sentinel(kind)])
}

/// Map a listing response onto a snapshot.
///
/// Extra fields are already gone after deserialization. Listings with an
/// invalid id, a reserved sentinel id, or an id seen earlier in the response
/// are skipped; no valid listing at all yields the "empty" sentinel.
pub fn snapshot_from_response(response: &GamesResponse) -> CatalogSnapshot {
    let mut entries: Vec<CatalogEntry> = Vec::new();
    for listing in response.listings() {
        if Sentinel::from_id(&listing.id).is_some() {
            tracing::warn!("Skipping catalog listing with reserved id '{}'", listing.id);
            continue;
        }
        if entries.iter().any(|entry| entry.id() == listing.id) {
            tracing::warn!("Skipping duplicate catalog listing '{}'", listing.id);
            continue;
        }
        match CatalogEntry::try_from(listing) {
            Ok(entry) => entries.push(entry),
            Err(e) => tracing::warn!("Skipping catalog listing: {e}"),
        }
    }

    if entries.is_empty() {
        sentinel_snapshot(Sentinel::Empty)
    } else {
        Arc::from(entries)
    }
}

/// Fetch once and turn the outcome into a snapshot. Never fails.
pub async fn fetch_snapshot(source: &dyn CatalogSource) -> CatalogSnapshot {
    match source.fetch().await {
        Ok(response) => {
            let snapshot = snapshot_from_response(&response);
            tracing::info!("Catalog loaded: {} entries", snapshot.len());
            snapshot
        }
        Err(e) => {
            tracing::error!("Failed to fetch game catalog: {e}");
            sentinel_snapshot(Sentinel::Error)
        }
    }
}

/// Read side of the catalog
///
/// Cloning shares the same underlying snapshot.
#[derive(Clone)]
pub struct GameCatalog {
    rx: watch::Receiver<CatalogSnapshot>,
}

impl GameCatalog {
    /// Start with the "loading" placeholder and fetch once on `handle`.
    pub fn spawn(source: Arc<dyn CatalogSource>, handle: &Handle) -> Self {
        let (tx, rx) = watch::channel(sentinel_snapshot(Sentinel::Loading));
        handle.spawn(async move {
            let snapshot = fetch_snapshot(source.as_ref()).await;
            // Nobody listening is fine
            let _ = tx.send(snapshot);
        });
        Self { rx }
    }

    /// Catalog with fixed contents. An empty list becomes the "empty" sentinel.
    pub fn fixed(entries: Vec<CatalogEntry>) -> Self {
        let snapshot = if entries.is_empty() {
            sentinel_snapshot(Sentinel::Empty)
        } else {
            Arc::from(entries)
        };
        let (_tx, rx) = watch::channel(snapshot);
        Self { rx }
    }

    /// Catalog stuck in one sentinel state.
    pub fn sentinel(kind: Sentinel) -> Self {
        let (_tx, rx) = watch::channel(sentinel_snapshot(kind));
        Self { rx }
    }

    /// Current snapshot. Never empty.
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.rx.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.rx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<CatalogEntry> {
        self.rx.borrow().get(index).cloned()
    }

    /// Whether the fetch is still outstanding.
    pub fn is_loading(&self) -> bool {
        is_sentinel_snapshot(&self.rx.borrow(), Sentinel::Loading)
    }

    /// Wait until the fetch has settled (or its task is gone).
    pub async fn ready(&mut self) -> CatalogSnapshot {
        let _ = self
            .rx
            .wait_for(|snapshot| !is_sentinel_snapshot(snapshot, Sentinel::Loading))
            .await;
        self.snapshot()
    }
}

fn is_sentinel_snapshot(snapshot: &[CatalogEntry], kind: Sentinel) -> bool {
    matches!(snapshot, [only] if only.id() == kind.id())
}
