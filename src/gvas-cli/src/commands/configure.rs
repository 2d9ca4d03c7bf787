//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting gvas CLI defaults.

use crate::config::Config;
use anyhow::Result;

/// Handle the configure command
///
/// # Arguments
/// * `property_count` - Optional default number of properties to decode
/// * `pretty` - Optional default for pretty-printed JSON
/// * `show` - If true, show current configuration
pub fn handle(property_count: Option<usize>, pretty: Option<bool>, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if property_count.is_none() && pretty.is_none() {
        show_usage();
        return Ok(());
    }

    apply(&mut config, property_count, pretty);
    config.save()?;

    println!("Property count: {}", config.property_count());
    println!("Pretty JSON: {}", config.pretty());
    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}

fn apply(config: &mut Config, property_count: Option<usize>, pretty: Option<bool>) {
    if let Some(count) = property_count {
        config.set_property_count(count);
    }
    if let Some(pretty) = pretty {
        config.set_pretty(pretty);
    }
}

/// Display current configuration
fn show_config(config: &Config) {
    match config.property_count {
        Some(count) => println!("Property count: {}", count),
        None => println!("Property count: {} (default)", config.property_count()),
    }
    match config.pretty {
        Some(pretty) => println!("Pretty JSON: {}", pretty),
        None => println!("Pretty JSON: false (default)"),
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: gvas configure --property-count COUNT");
    println!("   or: gvas configure --pretty true");
    println!("   or: gvas configure --show");
    println!();
    println!("Note: the property count is how many top-level properties are decoded");
    println!("      before the remaining bytes are kept as an opaque tail.");
}
