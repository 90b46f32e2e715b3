//! `tago run`: the CLI as a minimal automation host.
//!
//! Lights are only logged; each `tago_event` becomes one JSON line on stdout.

use std::io::{self, Write};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use tago_core::{BoxError, DimmerLight, Host, Integration, IntegrationConfig, TagoEvent};

use crate::cli::GlobalOpts;
use crate::error::CliError;

#[derive(Serialize)]
struct EventLine<'a> {
    event_type: &'a str,
    data: &'a TagoEvent,
}

/// Host that prints events to stdout.
struct ConsoleHost {
    quiet: bool,
}

impl Host for ConsoleHost {
    fn add_lights(&self, lights: &[Arc<DimmerLight>]) {
        for light in lights {
            info!(unique_id = light.unique_id(), name = light.name(), "light added");
        }
    }

    fn fire_event(&self, event_type: &str, event: &TagoEvent) -> Result<(), BoxError> {
        if self.quiet {
            return Ok(());
        }
        let line = serde_json::to_string(&EventLine {
            event_type,
            data: event,
        })?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{line}")?;
        stdout.flush()?;
        Ok(())
    }

    fn remove_lights(&self, lights: &[Arc<DimmerLight>]) {
        debug!(count = lights.len(), "lights removed");
    }
}

pub async fn handle(config: IntegrationConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let host = Arc::new(ConsoleHost {
        quiet: global.quiet,
    });
    let integration = Integration::setup(config, host).await?;

    let mut state = integration.listener_state();
    let watcher = tokio::spawn(async move {
        while state.changed().await.is_ok() {
            let current = *state.borrow_and_update();
            info!(state = %current, "event listener");
        }
    });

    let interrupted = tokio::signal::ctrl_c().await;
    info!("shutting down");
    integration.shutdown().await;
    watcher.abort();

    interrupted?;
    Ok(())
}
