//! Remote collection fetcher.
//!
//! Loads one collection endpoint, or a single item, and normalizes the
//! payload into flat catalog items. Transport failures come back as
//! [`CatalogError::RemoteFetch`] so callers can tell "failed to load" apart
//! from "loaded, but empty".

use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::Resource;
use crate::error::{CatalogError, Result};
use crate::list::ItemId;

use super::{CatalogApi, Endpoint};

/// Fetch and normalize a whole collection.
pub async fn fetch_collection<R, A>(api: &A, endpoint: &Endpoint) -> Result<Vec<R>>
where
    R: Resource,
    A: CatalogApi,
{
    debug!(kind = %R::KIND, %endpoint, "fetching collection");
    let payload = api
        .get(endpoint)
        .await
        .map_err(CatalogError::into_fetch_error)?;
    let items = decode_collection::<R>(payload)?;
    debug!(kind = %R::KIND, count = items.len(), "collection loaded");
    Ok(items)
}

/// Fetch one item. A 404, or an entry that does not belong to the
/// collection, is [`CatalogError::NotFound`].
pub async fn fetch_one<R, A>(api: &A, id: ItemId) -> Result<R>
where
    R: Resource,
    A: CatalogApi,
{
    let endpoint = R::detail_endpoint(id);
    debug!(kind = %R::KIND, %endpoint, "fetching item");
    let not_found = || CatalogError::NotFound(format!("{} {id}", R::KIND.noun()));
    let payload = api.get(&endpoint).await.map_err(|err| match err {
        CatalogError::Api(api_err) if api_err.is_not_found() => not_found(),
        other => other.into_fetch_error(),
    })?;
    decode_entity::<R>(payload)
        .map_err(CatalogError::into_fetch_error)?
        .ok_or_else(not_found)
}

/// Normalize a single JSON object into an item.
///
/// `Ok(None)` means the entity decoded but does not belong to `R`'s
/// collection.
pub fn decode_entity<R: Resource>(payload: Value) -> Result<Option<R>> {
    let dto = serde_json::from_value::<R::Dto>(payload)?;
    Ok(R::from_dto(dto))
}

/// Normalize a JSON array payload into items.
///
/// Entries that do not decode, or that do not belong to the collection
/// (an exhibit without a firearm in the firearm list), are skipped.
pub fn decode_collection<R: Resource>(payload: Value) -> Result<Vec<R>> {
    let Value::Array(entries) = payload else {
        return Err(CatalogError::RemoteFetch {
            status: None,
            body: format!("expected a JSON array, got {}", json_kind(&payload)),
        });
    };

    let mut items = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<R::Dto>(entry) {
            Ok(dto) => {
                if let Some(item) = R::from_dto(dto) {
                    items.push(item);
                }
            }
            Err(err) => {
                warn!(kind = %R::KIND, index, error = %err, "skipping malformed entry");
            }
        }
    }
    Ok(items)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
