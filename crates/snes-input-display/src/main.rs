//! SNES Input Display
//!
//! Polls controller input from a Usb2Snes bridge and renders it as an overlay
//! served over HTTP.

mod config;
mod overlay;
mod rendering;
mod state;
mod web;

use anyhow::{Context, Result};
use snes_input_core::{Client, USB2SNES_URI};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use overlay::Viewer;
use rendering::{Canvas, Layout, Overlay};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let config = Config::load(&path).context("Failed to load configuration")?;
            info!("Loaded configuration from: {}", path);
            config
        }
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    // Prepare the canvas
    let background = rendering::background_from_config(&config.overlay)?;
    let pressed = rendering::parse_hex_color(&config.overlay.pressed_color)
        .with_context(|| format!("Invalid pressed_color: {}", config.overlay.pressed_color))?;
    let state = Arc::new(AppState::new(background.clone(), config.web.refresh));
    let canvas = Canvas::new(background, pressed, state.clone());
    let (width, height) = canvas.dimensions();
    debug!("Canvas is {}x{}", width, height);

    // First signal stops the loop after the current iteration, a second one
    // exits right away
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match relay_signals(wait_for_signal, shutdown_tx).await {
            Ok(()) => {
                warn!("Second signal received, exiting immediately");
                std::process::exit(130);
            }
            Err(e) => warn!("Failed to listen for shutdown signals: {}", e),
        }
    });

    // Optionally start web server
    if config.web.enable {
        let app = web::create_router(state.clone());
        let addr: SocketAddr = config
            .web
            .listen
            .parse()
            .context("Invalid listen address")?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to listen on {}", addr))?;
        info!("Overlay available at http://{}", addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                warn!("Web server stopped: {}", e);
            }
        });
    } else {
        info!("Web server disabled");
    }

    // Connect to the bridge
    let mut client = Client::connect(USB2SNES_URI)
        .await
        .context("Could not connect to QUsb2Snes")?;
    let device = overlay::connect(&mut client, &config.name).await?;
    state.set_device(&device);

    let mut viewer = Viewer::new(
        config.input.region(),
        Overlay::new(Layout::snes()),
        canvas,
        state,
        Duration::from_millis(config.interval),
    );
    let result = viewer.run(&mut client, shutdown_rx).await;

    if let Err(e) = client.close().await {
        debug!("Error closing connection: {}", e);
    }

    let frames = result?;
    info!("Stopped after {} frames", frames);
    Ok(())
}

/// Raises `shutdown` on the first signal and returns on the second.
async fn relay_signals<F, Fut>(
    mut next_signal: F,
    shutdown: watch::Sender<bool>,
) -> std::io::Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    next_signal().await?;
    shutdown.send_replace(true);
    next_signal().await
}

async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Received SIGINT, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl-C, shutting down");
    }

    Ok(())
}
