//! Config command - show or initialize the configuration file.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use foodocr_core::config::FoodOcrConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the active configuration
    Show {
        /// Config file to read (default: the standard location)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Write a default configuration file
    Init {
        /// Destination path (default: the standard location)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Standard config location: `<config dir>/foodocr/config.json`.
fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("foodocr")
        .join("config.json")
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.action {
        ConfigAction::Show { path } => {
            let path = path.unwrap_or_else(default_config_path);
            let config = if path.exists() {
                FoodOcrConfig::from_file(&path)?
            } else {
                FoodOcrConfig::default()
            };
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Init { path, force } => {
            let path = path.unwrap_or_else(default_config_path);
            if path.exists() && !force {
                anyhow::bail!(
                    "config file already exists: {} (use --force to overwrite)",
                    path.display()
                );
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            FoodOcrConfig::default().save(&path)?;
            eprintln!(
                "{} wrote default config to {}",
                style("done:").green().bold(),
                path.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path_has_expected_tail() {
        let path = default_config_path();
        assert!(path.ends_with("foodocr/config.json"));
    }
}
