//! `murmur config` -- print the effective configuration.

use std::path::Path;

use console::style;

use murmur_types::config::GlobalConfig;

pub fn show_config(config: &GlobalConfig, data_dir: &Path, json: bool) -> anyhow::Result<()> {
    let key_present = std::env::var(&config.provider.api_key_env)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false);

    if json {
        let mut value = serde_json::to_value(config)?;
        value["api_key_present"] = serde_json::Value::Bool(key_present);
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style("Config file:").bold(),
        style(data_dir.join("config.toml").display()).dim()
    );
    println!(
        "  {} {} ({})",
        style("API key:").bold(),
        config.provider.api_key_env,
        if key_present {
            style("set").green()
        } else {
            style("missing").red()
        }
    );
    println!();
    print!("{}", toml::to_string_pretty(config)?);
    println!();
    Ok(())
}
