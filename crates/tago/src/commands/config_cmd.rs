//! Config subcommand handlers.

use tago_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

fn detail(cfg: &Config) -> String {
    [
        format!("Host:                {}", cfg.host.as_deref().unwrap_or("-")),
        format!("Event port:          {}", cfg.event_port),
        format!("Control port:        {}", cfg.control_port),
        format!("Retry interval:      {}s", cfg.retry_interval_secs),
        format!("Enumeration timeout: {}s", cfg.enumeration_timeout_secs),
        format!("Command timeout:     {}s", cfg.command_timeout_secs),
    ]
    .join("\n")
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);

    match args.command {
        ConfigCommand::Init {
            event_port,
            control_port,
            force,
        } => {
            let host = global.host.clone().ok_or_else(|| CliError::NoHost {
                path: path.display().to_string(),
            })?;
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let defaults = Config::default();
            let cfg = Config {
                host: Some(host),
                event_port: event_port.unwrap_or(defaults.event_port),
                control_port: control_port.unwrap_or(defaults.control_port),
                ..defaults
            };
            tago_config::save_config_to(&cfg, &path)?;

            if !global.quiet {
                eprintln!("Wrote {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let mut cfg = config::load(global)?;
            if let Some(host) = &global.host {
                cfg.host = Some(host.clone());
            }
            let out = output::render_single(&global.output, &cfg, detail, |c| {
                c.host.clone().unwrap_or_default()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
    }
}
