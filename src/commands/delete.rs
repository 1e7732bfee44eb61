//! `evcat delete`: confirm and delete one catalog item.

use serde_json::json;

use super::{CommandOutput, connect, interactive, persist_credentials};
use crate::catalog::{DiscoveryRecord, Firearm, Narcotic, Resource, ResourceKind, UserAccount};
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::display::{format_confirm, format_notification, render_page};
use crate::error::{CatalogError, Result};
use crate::list::{DeletionCoordinator, ItemId, ListManager, LoadState, PageState};

#[derive(Debug, Clone)]
pub struct DeleteOptions {
    pub kind: ResourceKind,
    pub id: ItemId,
    /// Skip the confirmation prompt
    pub yes: bool,
}

pub async fn cmd_delete(options: DeleteOptions, output: OutputOptions) -> Result<()> {
    match options.kind {
        ResourceKind::Firearms => delete_kind::<Firearm>(options, output).await,
        ResourceKind::Narcotics => delete_kind::<Narcotic>(options, output).await,
        ResourceKind::Users => delete_kind::<UserAccount>(options, output).await,
        ResourceKind::History => delete_kind::<DiscoveryRecord>(options, output).await,
    }
}

async fn delete_kind<T: Resource>(options: DeleteOptions, output: OutputOptions) -> Result<()> {
    if !options.yes && (output.json || !interactive::is_stdin_tty()) {
        return Err(CatalogError::ConfirmationRequired(
            "deleting requires --yes in non-interactive contexts".to_string(),
        ));
    }

    let mut config = Config::load()?;
    let client = connect(&config)?;

    // The delete endpoint and label come from the loaded record
    let mut manager: ListManager<T> = ListManager::new(PageState::new(config.items_per_page)?);
    manager.load(&client).await;
    persist_credentials(&mut config, &client)?;
    if let LoadState::Failed { message, .. } = manager.load_state() {
        if client.session().is_expired() {
            return Err(CatalogError::SessionExpired);
        }
        return Err(CatalogError::Other(message.clone()));
    }

    let label = manager
        .find(options.id)
        .map(|item| item.label())
        .ok_or_else(|| CatalogError::NotFound(format!("{} {}", T::KIND.noun(), options.id)))?;

    let mut coordinator = DeletionCoordinator::new().with_auto_dismiss(config.notification_timeout());
    coordinator.request_delete(options.id);

    if !options.yes
        && let Some(dialog) = coordinator.confirm_view(&label)
        && !interactive::confirm(&format_confirm(&dialog))?
    {
        coordinator.cancel();
        persist_credentials(&mut config, &client)?;
        println!("Cancelled");
        return Ok(());
    }

    let outcome = coordinator.confirm_delete(&client, &mut manager).await;
    persist_credentials(&mut config, &client)?;
    let Some(notification) = outcome? else {
        return Ok(());
    };

    if !notification.is_success() {
        return Err(CatalogError::Mutation {
            status: None,
            message: notification.message,
        });
    }

    CommandOutput::new(json!({
        "action": "deleted",
        "kind": T::KIND.to_string(),
        "id": options.id,
        "label": label,
        "remaining": manager.items().len(),
        "success": true,
    }))
    .with_text(format!(
        "{}\n{}",
        format_notification(&notification),
        render_page(&manager.view())
    ))
    .print(output)
}
