//! `evcat show`: one catalog item.

use super::{CommandOutput, connect, persist_credentials};
use crate::catalog::{DiscoveryRecord, Firearm, Narcotic, Resource, ResourceKind, UserAccount};
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::display::render_detail;
use crate::error::Result;
use crate::list::ItemId;
use crate::remote::fetch_one;

pub async fn cmd_show(kind: ResourceKind, id: ItemId, output: OutputOptions) -> Result<()> {
    match kind {
        ResourceKind::Firearms => show_kind::<Firearm>(id, output).await,
        ResourceKind::Narcotics => show_kind::<Narcotic>(id, output).await,
        ResourceKind::Users => show_kind::<UserAccount>(id, output).await,
        ResourceKind::History => show_kind::<DiscoveryRecord>(id, output).await,
    }
}

async fn show_kind<T: Resource>(id: ItemId, output: OutputOptions) -> Result<()> {
    let mut config = Config::load()?;
    let client = connect(&config)?;

    let result = fetch_one::<T, _>(&client, id).await;
    persist_credentials(&mut config, &client)?;
    let item = result?;

    CommandOutput::new(serde_json::to_value(&item)?)
        .with_text(render_detail(&item))
        .print(output)
}
