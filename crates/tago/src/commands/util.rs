//! Shared helpers for command handlers.

use tago_core::{
    BridgeClient, CoreError, DimmerChannel, DimmerLight, IntegrationConfig, channels_from_listing,
};

use crate::error::CliError;

/// List the bridge once and flatten it into dimmer channels.
///
/// Unlike integration setup, failures surface as their specific error
/// (refused, timed out, garbled) rather than a blanket setup failure.
pub async fn fetch_channels(
    config: &IntegrationConfig,
) -> Result<(BridgeClient, Vec<DimmerChannel>), CliError> {
    let client =
        BridgeClient::new(&config.address, &config.transport_config()).map_err(CoreError::from)?;
    let listing = client
        .list_devices(config.enumeration_timeout)
        .await
        .map_err(CoreError::from)?;
    Ok((client, channels_from_listing(&listing)))
}

/// Build a light entity for `unique_id`, looked up on the bridge.
pub async fn resolve_light(
    config: &IntegrationConfig,
    unique_id: &str,
) -> Result<DimmerLight, CliError> {
    let (client, channels) = fetch_channels(config).await?;
    channels
        .into_iter()
        .find(|channel| channel.unique_id == unique_id)
        .map(|channel| DimmerLight::new(channel, client))
        .ok_or_else(|| {
            CoreError::LightNotFound {
                unique_id: unique_id.into(),
            }
            .into()
        })
}
