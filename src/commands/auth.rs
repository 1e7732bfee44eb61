//! Session commands: `login`, `logout` and `whoami`.

use owo_colors::OwoColorize;
use serde_json::json;
use tracing::info;

use super::{CommandOutput, connect, interactive, persist_credentials};
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::session::UserProfile;

fn profile_json(user: &UserProfile) -> serde_json::Value {
    json!({
        "user_id": user.user_id,
        "name": user.display_name(),
        "email": user.email,
        "department": user.department,
        "role": user.role_name(),
    })
}

fn profile_text(user: &UserProfile) -> String {
    format!(
        "{} <{}>\n  role: {}\n  department: {}",
        user.display_name().bold(),
        user.email,
        user.role_name().cyan(),
        user.department.as_deref().unwrap_or("-")
    )
}

/// Sign in and store the session cookies in the config file.
///
/// The password is read from stdin when not given on the command line.
pub async fn cmd_login(email: &str, password: Option<&str>, output: OutputOptions) -> Result<()> {
    let password = match password {
        Some(password) => password.to_string(),
        None => interactive::read_line("Password")?,
    };
    if password.is_empty() {
        return Err(CatalogError::validation("password", "must not be empty"));
    }

    let mut config = Config::load()?;
    // Start from a clean jar so stale cookies are not sent with the login
    config.clear_credentials();
    let client = connect(&config)?;
    let user = client.login(email.trim(), &password).await?;

    config.set_credentials(client.credentials());
    config.save()?;
    info!(path = %Config::config_path().display(), "session saved");

    CommandOutput::new(json!({
        "action": "login",
        "success": true,
        "user": profile_json(&user),
    }))
    .with_text(format!(
        "{} {}",
        "Signed in as".green(),
        user.display_name().bold()
    ))
    .print(output)
}

/// Sign out on the server and forget the stored session.
pub async fn cmd_logout(output: OutputOptions) -> Result<()> {
    let mut config = Config::load()?;
    let had_session = !config.auth.is_empty();

    if had_session {
        let client = connect(&config)?;
        client.logout().await;
    }
    config.clear_credentials();
    config.save()?;

    let text = if had_session {
        "Signed out".to_string()
    } else {
        "Not signed in".dimmed().to_string()
    };
    CommandOutput::new(json!({
        "action": "logout",
        "success": true,
        "had_session": had_session,
    }))
    .with_text(text)
    .print(output)
}

/// Show the signed-in user, refreshing the session if needed.
pub async fn cmd_whoami(output: OutputOptions) -> Result<()> {
    let mut config = Config::load()?;
    if config.auth.is_empty() {
        return Err(CatalogError::SessionExpired);
    }

    let client = connect(&config)?;
    let result = client.check_session().await;
    persist_credentials(&mut config, &client)?;
    let user = result?;

    CommandOutput::new(profile_json(&user))
        .with_text(profile_text(&user))
        .print(output)
}
