//! HTTP catalog and module fetching against an in-process responder

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use brickbox_core::WasmEngine;
use brickbox_library::catalog::fetch_snapshot;
use brickbox_library::config::{CatalogConfig, LoaderConfig};
use brickbox_library::{
    GameCatalog, HttpCatalogSource, HttpModuleFetcher, LoadError, ModuleLoader,
};

/// Serve one canned response per connection, reporting each request head.
async fn serve(status: &'static str, body: Vec<u8>) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    respond(status, body, true).await
}

/// Like [`serve`], but without `Content-Length`: the body ends at close.
async fn serve_unannounced(status: &'static str, body: Vec<u8>) -> SocketAddr {
    respond(status, body, false).await.0
}

async fn respond(
    status: &'static str,
    body: Vec<u8>,
    announce_length: bool,
) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&buf[..n]),
                }
            }
            let _ = tx.send(String::from_utf8_lossy(&head).into_owned());

            let length = if announce_length {
                format!("Content-Length: {}\r\n", body.len())
            } else {
                String::new()
            };
            let header = format!("HTTP/1.1 {status}\r\n{length}Connection: close\r\n\r\n");
            let _ = socket.write_all(header.as_bytes()).await;
            let _ = socket.write_all(&body).await;
            let _ = socket.shutdown().await;
        }
    });
    (addr, rx)
}

fn catalog_config(addr: SocketAddr, token: Option<&str>) -> CatalogConfig {
    CatalogConfig {
        base_url: format!("http://{addr}"),
        token: token.map(str::to_string),
        timeout_ms: 2000,
        ..CatalogConfig::default()
    }
}

#[tokio::test]
async fn test_catalog_maps_listing() {
    let body = br#"{"games":[
        {"id":"a","name":"Alpha","url":"u1","author":"x"},
        {"id":"b","name":"Beta","url":"u2"}
    ]}"#;
    let (addr, mut requests) = serve("200 OK", body.to_vec()).await;

    let source = HttpCatalogSource::new(&catalog_config(addr, Some("secret"))).unwrap();
    let snapshot = fetch_snapshot(&source).await;

    let ids: Vec<_> = snapshot.iter().map(|e| (e.id(), e.display_name(), e.load_location())).collect();
    assert_eq!(ids, vec![("a", "Alpha", "u1"), ("b", "Beta", "u2")]);

    let head = requests.recv().await.unwrap().to_ascii_lowercase();
    assert!(head.starts_with("get /functions/v1/list "));
    assert!(head.contains("authorization: bearer secret"));
}

#[tokio::test]
async fn test_catalog_without_token_sends_no_authorization() {
    let (addr, mut requests) = serve("200 OK", br#"{"games":[]}"#.to_vec()).await;

    let source = HttpCatalogSource::new(&catalog_config(addr, None)).unwrap();
    let snapshot = fetch_snapshot(&source).await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id(), "empty");

    let head = requests.recv().await.unwrap().to_ascii_lowercase();
    assert!(!head.contains("authorization"));
}

#[tokio::test]
async fn test_catalog_http_error_becomes_error_sentinel() {
    let (addr, _requests) = serve("500 Internal Server Error", b"boom".to_vec()).await;

    let source = HttpCatalogSource::new(&catalog_config(addr, None)).unwrap();
    let mut catalog = GameCatalog::spawn(Arc::new(source), &tokio::runtime::Handle::current());
    assert!(catalog.is_loading());

    let snapshot = catalog.ready().await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id(), "error");
}

#[tokio::test]
async fn test_catalog_malformed_body_becomes_error_sentinel() {
    let (addr, _requests) = serve("200 OK", b"<html>".to_vec()).await;

    let source = HttpCatalogSource::new(&catalog_config(addr, None)).unwrap();
    let snapshot = fetch_snapshot(&source).await;
    assert_eq!(snapshot[0].id(), "error");
}

#[tokio::test]
async fn test_catalog_oversized_body_becomes_error_sentinel() {
    let mut body = br#"{"games":[{"id":"a","name":"Alpha","url":"u1"}],"pad":""#.to_vec();
    body.extend(std::iter::repeat_n(b'x', 8 * 1024));
    body.extend_from_slice(br#""}"#);
    let addr = serve_unannounced("200 OK", body).await;

    let config = CatalogConfig {
        max_body_bytes: 1024,
        ..catalog_config(addr, None)
    };
    let source = HttpCatalogSource::new(&config).unwrap();
    let snapshot = fetch_snapshot(&source).await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id(), "error");
}

#[tokio::test]
async fn test_catalog_unreachable_becomes_error_sentinel() {
    // Bind then drop to get a port nobody listens on
    let addr = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();

    let source = HttpCatalogSource::new(&catalog_config(addr, None)).unwrap();
    let snapshot = fetch_snapshot(&source).await;
    assert_eq!(snapshot[0].id(), "error");
}

fn http_loader() -> ModuleLoader {
    limited_loader(LoaderConfig::default().max_module_bytes)
}

fn limited_loader(max_module_bytes: usize) -> ModuleLoader {
    let config = LoaderConfig {
        max_module_bytes,
        ..LoaderConfig::default()
    };
    ModuleLoader::new(
        WasmEngine::new().unwrap(),
        Arc::new(HttpModuleFetcher::new(Duration::from_secs(2), max_module_bytes).unwrap()),
        config,
        tokio::runtime::Handle::current(),
    )
}

#[tokio::test]
async fn test_module_download_and_compile() {
    let wasm = wat::parse_str(r#"(module (func (export "brick_game_create")))"#).unwrap();
    let (addr, _requests) = serve("200 OK", wasm).await;

    let factory = http_loader()
        .load(&format!("http://{addr}/games/a.wasm"))
        .await
        .unwrap();
    assert!(factory.create("a").is_ok());
}

#[tokio::test]
async fn test_module_download_http_error() {
    let (addr, _requests) = serve("404 Not Found", Vec::new()).await;

    let err = http_loader()
        .load(&format!("http://{addr}/games/missing.wasm"))
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_module_announced_oversize_is_refused() {
    let body = vec![0u8; 256 * 1024];
    let (addr, _requests) = serve("200 OK", body.clone()).await;

    let err = limited_loader(64 * 1024)
        .load(&format!("http://{addr}/games/huge.wasm"))
        .await
        .unwrap_err();
    match err {
        LoadError::TooLarge { size, limit } => {
            assert_eq!(size, body.len() as u64);
            assert_eq!(limit, 64 * 1024);
        }
        other => panic!("expected TooLarge, got {other}"),
    }
}

#[tokio::test]
async fn test_module_unannounced_oversize_stops_reading() {
    let body = vec![0u8; 4 * 1024 * 1024];
    let addr = serve_unannounced("200 OK", body.clone()).await;

    let err = limited_loader(64 * 1024)
        .load(&format!("http://{addr}/games/huge.wasm"))
        .await
        .unwrap_err();
    match err {
        LoadError::TooLarge { size, limit } => {
            assert!(size > limit as u64);
            assert!(size < body.len() as u64);
        }
        other => panic!("expected TooLarge, got {other}"),
    }
}
