mod auth;
mod config;
mod delete;
pub mod interactive;
mod list;
mod record;
mod show;

pub use auth::{cmd_login, cmd_logout, cmd_whoami};
pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use delete::{DeleteOptions, cmd_delete};
pub use list::{ListOptions, cmd_list};
pub use record::{cmd_record_add, cmd_record_edit};
pub use show::cmd_show;

use serde_json::Value;
use tracing::debug;

use crate::cli::OutputOptions;
use crate::config::Config;
use crate::error::Result;
use crate::remote::ApiClient;

/// Result of a command, printed as JSON or text depending on `--json`.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, output: OutputOptions) -> Result<()> {
        if output.json {
            println!("{}", serde_json::to_string_pretty(&self.json)?);
            return Ok(());
        }
        match self.text {
            Some(text) => println!("{text}"),
            None => println!("{}", serde_json::to_string_pretty(&self.json)?),
        }
        Ok(())
    }
}

/// Build an API client from the config, carrying over stored cookies.
pub(crate) fn connect(config: &Config) -> Result<ApiClient> {
    let client = ApiClient::new(&config.base_url(), config.timeout())?;
    Ok(client.with_credentials(&config.auth))
}

/// Write back cookies the client refreshed during the command.
pub(crate) fn persist_credentials(config: &mut Config, client: &ApiClient) -> Result<()> {
    let credentials = client.credentials();
    if client.session().is_expired() {
        debug!("session expired, dropping stored credentials");
        config.clear_credentials();
    } else if credentials != config.auth {
        debug!("session cookies rotated");
        config.set_credentials(credentials);
    } else {
        return Ok(());
    }
    config.save()
}
