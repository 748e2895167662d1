//! Brickbox launcher
//!
//! Text front-end: type a key name (`left`, `right`, `action`, `start`,
//! `exit`, `power`, ...) and press enter. `quit` leaves.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, TryRecvError};

use anyhow::Result;
use clap::Parser;

use brickbox_core::{ControlEvent, ControlKey, WasmEngine};
use brickbox_library::terminal::{LogAudio, TextDisplay};
use brickbox_library::{
    GameCatalog, HttpCatalogSource, HttpModuleFetcher, Launcher, LauncherConfig, ModuleLoader,
};

#[derive(Parser, Debug)]
#[command(name = "brickbox", about = "Brick game launcher")]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Catalog base URL
    #[arg(long)]
    catalog_url: Option<String>,

    /// Bearer token for the catalog
    #[arg(long)]
    token: Option<String>,

    /// Ticks per second
    #[arg(long)]
    tick_rate: Option<u32>,
}

enum Command {
    Key(ControlKey),
    Quit,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let source = Arc::new(HttpCatalogSource::new(&config.catalog)?);
    tracing::info!("Fetching catalog from {}", source.url());
    let catalog = GameCatalog::spawn(source, rt.handle());

    let fetcher = Arc::new(HttpModuleFetcher::new(
        config.loader.timeout(),
        config.loader.max_module_bytes,
    )?);
    let loader = ModuleLoader::new(
        WasmEngine::new()?,
        fetcher,
        config.loader.clone(),
        rt.handle().clone(),
    );

    let mut launcher = Launcher::new(&config, catalog, loader, TextDisplay::stdout(), LogAudio)?;
    let commands = spawn_stdin_reader();
    let tick = launcher.runtime().tick_duration();

    loop {
        match commands.try_recv() {
            Ok(Command::Key(key)) => {
                launcher.handle_input(ControlEvent::pressed(key));
                launcher.handle_input(ControlEvent::released(key));
            }
            Ok(Command::Quit) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }
        launcher.frame();
        std::thread::sleep(tick);
    }

    tracing::info!("Bye");
    Ok(())
}

fn load_config(args: &Args) -> Result<LauncherConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = LauncherConfig::load_from(path)?;
            config.apply_env_overrides();
            config
        }
        None => LauncherConfig::load(),
    };
    if let Some(url) = &args.catalog_url {
        config.catalog.base_url = url.clone();
    }
    if let Some(token) = &args.token {
        config.catalog.token = Some(token.clone());
    }
    if let Some(tick_rate) = args.tick_rate {
        config.runtime.tick_rate = tick_rate;
    }
    Ok(config)
}

/// Read commands from stdin on a separate thread.
fn spawn_stdin_reader() -> mpsc::Receiver<Command> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let command = if line.eq_ignore_ascii_case("quit") {
                Command::Quit
            } else if let Some(key) = ControlKey::parse(line) {
                Command::Key(key)
            } else {
                tracing::warn!("Unknown command '{line}'");
                continue;
            };
            if tx.send(command).is_err() {
                break;
            }
        }
    });
    rx
}
