//! Configuration inspection commands

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use songlib_server::Config;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the resolved configuration (database password masked)
    Show {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
    /// Check that the configuration is complete enough to start the server
    Validate,
}

pub fn run_config(args: ConfigArgs, config: &Config) -> Result<()> {
    match args.command {
        ConfigCommand::Show { json } => {
            let redacted = config.redacted();
            if json {
                println!("{}", serde_json::to_string_pretty(&redacted)?);
            } else {
                print!("{}", redacted.to_toml_string()?);
            }
        }
        ConfigCommand::Validate => {
            config.validate().context("Configuration is invalid")?;
            println!("Configuration is valid");
        }
    }
    Ok(())
}
