//! Create and update flow: validate, send, merge the saved item, notify.
//!
//! Validation runs before any request and fails with
//! [`CatalogError::Validation`], which callers show next to the offending
//! field instead of opening a notification. Server failures become
//! [`CatalogError::Mutation`] with the backend's detail message.

use std::fmt;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::catalog::Resource;
use crate::error::{CatalogError, Result};
use crate::remote::{CatalogApi, decode_entity};

use super::mutation::failure_message;
use super::overlay::Notification;
use super::{ItemId, ListManager, Listable};

/// Whether a save creates a new item or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    New,
    Existing(ItemId),
}

impl fmt::Display for SaveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveTarget::New => write!(f, "new"),
            SaveTarget::Existing(id) => write!(f, "{id}"),
        }
    }
}

/// Form contents for one resource kind.
pub trait Draft {
    type Item: Resource;

    /// Check required fields and value ranges for `target`.
    fn validate(&self, target: SaveTarget) -> Result<()>;

    /// JSON body sent to the backend.
    fn to_body(&self) -> Result<Value>;
}

/// Validate `draft`, send it, and decode the saved item.
pub async fn save_draft<A, D>(api: &A, draft: &D, target: SaveTarget) -> Result<D::Item>
where
    A: CatalogApi,
    D: Draft,
{
    let kind = <D::Item as Resource>::KIND;
    draft.validate(target)?;
    let body = draft.to_body()?;

    let response = match target {
        SaveTarget::New => {
            let endpoint = <D::Item as Resource>::create_endpoint();
            debug!(%kind, %endpoint, "creating item");
            api.post(&endpoint, &body).await
        }
        SaveTarget::Existing(id) => {
            let endpoint = <D::Item as Resource>::detail_endpoint(id);
            debug!(%kind, %endpoint, "updating item");
            api.put(&endpoint, &body).await
        }
    }
    .map_err(CatalogError::into_mutation_error)?;

    match decode_entity::<D::Item>(response) {
        Ok(Some(item)) => Ok(item),
        Ok(None) => Err(CatalogError::Mutation {
            status: None,
            message: format!("the saved entity is not a {}", kind.noun()),
        }),
        Err(err) => Err(CatalogError::Mutation {
            status: None,
            message: format!("malformed response: {err}"),
        }),
    }
}

/// Save `draft` and merge the result into `manager`.
///
/// Returns the notification to show. Validation errors and an expired
/// session are returned as errors; every other failure becomes an error
/// notification and leaves the collection untouched.
pub async fn submit_draft<A, D>(
    api: &A,
    manager: &mut ListManager<D::Item>,
    draft: &D,
    target: SaveTarget,
) -> Result<Notification>
where
    A: CatalogApi,
    D: Draft,
{
    match save_draft(api, draft, target).await {
        Ok(item) => {
            let id = item.item_id();
            manager.upsert_item(item);
            info!(%id, %target, "item saved");
            Ok(saved_notification(target, id))
        }
        Err(err @ (CatalogError::Validation { .. } | CatalogError::SessionExpired)) => Err(err),
        Err(err) => {
            let message = failure_message(err);
            warn!(%target, error = %message, "save failed");
            Ok(Notification::error("Save failed", message))
        }
    }
}

/// Success notification for a completed save.
pub fn saved_notification(target: SaveTarget, id: ItemId) -> Notification {
    match target {
        SaveTarget::New => Notification::success("Created", format!("Item {id} was created.")),
        SaveTarget::Existing(_) => Notification::success("Saved", format!("Item {id} was updated.")),
    }
}
