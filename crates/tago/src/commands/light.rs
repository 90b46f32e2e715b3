//! Light command handlers.

use std::time::Duration;

use serde::Serialize;
use tago_core::{DimmerLight, IntegrationConfig, TurnOn, to_native_level};

use crate::cli::{GlobalOpts, LightArgs, LightCommand};
use crate::error::CliError;
use crate::output;

use super::util;

/// What the light looks like after the command.
#[derive(Debug, Serialize)]
struct LightStatus {
    unique_id: String,
    name: String,
    brightness: u8,
    native_level: u8,
    is_on: bool,
}

impl LightStatus {
    async fn of(light: &DimmerLight) -> Self {
        let state = light.state().await;
        Self {
            unique_id: light.unique_id().to_string(),
            name: light.name().to_string(),
            brightness: state.brightness,
            native_level: to_native_level(state.brightness),
            is_on: state.is_on(),
        }
    }
}

fn detail(s: &LightStatus) -> String {
    [
        format!("ID:         {}", s.unique_id),
        format!("Name:       {}", s.name),
        format!("State:      {}", if s.is_on { "on" } else { "off" }),
        format!("Brightness: {} (bridge {})", s.brightness, s.native_level),
    ]
    .join("\n")
}

pub async fn handle(
    config: &IntegrationConfig,
    args: LightArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let light = match args.command {
        LightCommand::On {
            unique_id,
            brightness,
            transition,
        } => {
            let light = util::resolve_light(config, &unique_id).await?;
            light
                .turn_on(TurnOn {
                    brightness,
                    transition: transition.map(Duration::from_millis),
                })
                .await?;
            light
        }

        LightCommand::Off {
            unique_id,
            transition,
        } => {
            let light = util::resolve_light(config, &unique_id).await?;
            light.turn_off(transition.map(Duration::from_millis)).await?;
            light
        }

        LightCommand::Set { unique_id, level } => {
            let light = util::resolve_light(config, &unique_id).await?;
            light.set_brightness(level).await?;
            light
        }
    };

    let status = LightStatus::of(&light).await;
    let out = output::render_single(&global.output, &status, detail, |s| {
        s.brightness.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
