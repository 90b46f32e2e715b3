//! Device listing handler.

use tabled::Tabled;
use tago_core::{DimmerChannel, IntegrationConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ChannelRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Ch")]
    channel: u32,
}

impl From<&DimmerChannel> for ChannelRow {
    fn from(c: &DimmerChannel) -> Self {
        Self {
            id: c.unique_id.clone(),
            name: c.display_name.clone(),
            device: c.bridge_device_id.clone(),
            channel: c.channel_index,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(config: &IntegrationConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let (_, channels) = util::fetch_channels(config).await?;
    tracing::debug!(count = channels.len(), "channels fetched");

    let out = output::render_list(
        &global.output,
        &channels,
        |c| ChannelRow::from(c),
        |c| c.unique_id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
