//! Configuration commands.
//!
//! - `config show`: display current configuration
//! - `config get`: print one setting
//! - `config set`: change one setting

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::config::{BASE_URL_ENV, Config};
use crate::error::Result;

/// Mask a sensitive value by showing only the first 2 and last 2 characters
fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}

fn masked(value: Option<&String>) -> Option<String> {
    value.map(|v| mask_sensitive_value(v))
}

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let auth = &config.auth;
    let base_url_overridden = config.base_url() != config.base_url;

    let json_output = json!({
        "base_url": config.base_url(),
        "timeout_secs": config.timeout_secs,
        "items_per_page": config.items_per_page,
        "notification_timeout_secs": config.notification_timeout_secs,
        "session": {
            "signed_in": auth.access_token.is_some() || auth.refresh_token.is_some(),
            "access_token": masked(auth.access_token.as_ref()),
            "refresh_token": masked(auth.refresh_token.as_ref()),
        },
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    text_output.push_str(&format!("{}: {}", "base_url".cyan(), config.base_url()));
    if base_url_overridden {
        text_output.push_str(&format!(" {}", format!("(from {BASE_URL_ENV})").dimmed()));
    }
    text_output.push('\n');
    text_output.push_str(&format!("{}: {}\n", "timeout_secs".cyan(), config.timeout_secs));
    text_output.push_str(&format!(
        "{}: {}\n",
        "items_per_page".cyan(),
        config.items_per_page
    ));
    text_output.push_str(&format!(
        "{}: {}\n\n",
        "notification_timeout_secs".cyan(),
        config.notification_timeout_secs
    ));

    // Never print the raw cookie values
    text_output.push_str(&format!("{}:\n", "session".cyan()));
    for (name, value) in [
        ("access_token", &auth.access_token),
        ("refresh_token", &auth.refresh_token),
    ] {
        let status = match value {
            Some(v) => mask_sensitive_value(v).green().to_string(),
            None => "not set".dimmed().to_string(),
        };
        text_output.push_str(&format!("  {name}: {status}\n"));
    }

    text_output.push('\n');
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    let stored = config.get(key)?;
    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": stored,
        "success": true,
    }))
    .with_text(format!("Set {} to {stored}", key.cyan()))
    .print(output)
}

/// Get a specific configuration value
pub fn cmd_config_get(key: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let value = config.get(key)?;

    CommandOutput::new(json!({
        "key": key,
        "value": value,
    }))
    .with_text(value)
    .print(output)
}
