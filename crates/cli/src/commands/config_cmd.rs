//! `switchback config`: print configuration as TOML.

use std::path::Path;

use switchback_config::AppConfig;

use super::load_config;

pub fn run(default: bool, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    if default {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let config = load_config(config_path)?;
    if let Some(path) = config_path {
        println!("# Source: {}", path.display());
    } else {
        println!("# Source: {}", AppConfig::config_dir().join("config.toml").display());
    }
    print!("{}", config.to_redacted_toml());
    Ok(())
}
