//! `evcat record add|edit`: create and update discovery records.

use serde_json::json;

use super::{CommandOutput, connect, persist_credentials};
use crate::catalog::DiscoveryDraft;
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::display::{format_notification, render_detail};
use crate::error::Result;
use crate::list::{Draft, ItemId, Listable, SaveTarget, save_draft, saved_notification};

pub async fn cmd_record_add(draft: DiscoveryDraft, output: OutputOptions) -> Result<()> {
    save(draft, SaveTarget::New, output).await
}

pub async fn cmd_record_edit(id: ItemId, draft: DiscoveryDraft, output: OutputOptions) -> Result<()> {
    save(draft, SaveTarget::Existing(id), output).await
}

async fn save(draft: DiscoveryDraft, target: SaveTarget, output: OutputOptions) -> Result<()> {
    // Checked before the config is read or any request goes out
    draft.validate(target)?;

    let mut config = Config::load()?;
    let client = connect(&config)?;
    let result = save_draft(&client, &draft, target).await;
    persist_credentials(&mut config, &client)?;
    let record = result?;

    let notification = saved_notification(target, record.item_id())
        .with_auto_dismiss(config.notification_timeout());
    let action = match target {
        SaveTarget::New => "created",
        SaveTarget::Existing(_) => "updated",
    };
    CommandOutput::new(json!({
        "action": action,
        "id": record.id,
        "record": &record,
        "success": true,
    }))
    .with_text(format!(
        "{}\n{}",
        format_notification(&notification),
        render_detail(&record)
    ))
    .print(output)
}
