//! Session setup and the poll/render loop.

use anyhow::{Context, Result};
use snes_input_core::{Client, Error, InputSnapshot, MemoryRegion, Transport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::rendering::{Overlay, Surface};
use crate::state::AppState;

/// Announces the client, attaches to the first device and logs its info.
///
/// Fails with [`Error::NoDevice`] before any Attach is sent when the bridge
/// lists nothing.
pub async fn connect<T: Transport>(client: &mut Client<T>, name: &str) -> Result<String> {
    client.set_name(name).await?;
    let device = client.attach_first().await?;

    match client.info().await {
        Ok(info) => info!(
            "{} firmware {} running {}",
            info.dev_type,
            info.version,
            info.game.trim()
        ),
        Err(e @ Error::InvalidInfo(_)) => warn!("Ignoring device info: {}", e),
        Err(e) => return Err(e).context("Failed to query device info"),
    }

    Ok(device)
}

/// Polls the controller word and renders one frame per read.
pub struct Viewer<S: Surface> {
    region: MemoryRegion,
    overlay: Overlay,
    surface: S,
    state: Arc<AppState>,
    interval: Duration,
}

impl<S: Surface> Viewer<S> {
    pub fn new(
        region: MemoryRegion,
        overlay: Overlay,
        surface: S,
        state: Arc<AppState>,
        interval: Duration,
    ) -> Self {
        Self {
            region,
            overlay,
            surface,
            state,
            interval,
        }
    }

    /// Runs until `shutdown` turns true, checked between iterations.
    /// Returns the number of frames presented.
    pub async fn run<T: Transport>(
        &mut self,
        client: &mut Client<T>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<u64> {
        let mut frames = 0;
        let mut last: Option<InputSnapshot> = None;

        while !*shutdown.borrow() {
            let snapshot = client
                .read_inputs(self.region)
                .await
                .context("Failed to read controller inputs")?;

            if last != Some(snapshot) {
                debug!("Inputs: {}", describe(&snapshot));
                last = Some(snapshot);
            }

            self.state.set_snapshot(snapshot);
            self.overlay.render(&snapshot, &mut self.surface)?;
            frames += 1;

            if !self.interval.is_zero() {
                tokio::time::sleep(self.interval).await;
            }
        }

        Ok(frames)
    }
}

/// Space separated list of held buttons.
pub fn describe(snapshot: &InputSnapshot) -> String {
    let labels: Vec<_> = snapshot.pressed().map(|b| b.label()).collect();
    if labels.is_empty() {
        "-".to_string()
    } else {
        labels.join(" ")
    }
}
