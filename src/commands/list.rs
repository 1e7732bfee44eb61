//! `evcat list`: one filtered, sorted page of a catalog collection.

use jiff::civil::Date;
use serde_json::json;
use tracing::{debug, warn};

use super::{CommandOutput, connect, persist_credentials};
use crate::catalog::{DiscoveryRecord, Firearm, Narcotic, Resource, ResourceKind, UserAccount};
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::display::{format_filter_tags, render_page};
use crate::error::{CatalogError, Result};
use crate::list::pager::validate_page_size;
use crate::list::{ListManager, LoadState, PageState, SortDirection, SortOrder};

/// Options for listing a collection
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub kind: ResourceKind,
    pub search: Option<String>,
    /// `(category, value)` pairs
    pub filters: Vec<(String, String)>,
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub sort: Option<SortDirection>,
    pub sort_by: Option<String>,
    pub page: usize,
    pub per_page: Option<usize>,
}

pub async fn cmd_list(options: ListOptions, output: OutputOptions) -> Result<()> {
    match options.kind {
        ResourceKind::Firearms => list_kind::<Firearm>(options, output).await,
        ResourceKind::Narcotics => list_kind::<Narcotic>(options, output).await,
        ResourceKind::Users => list_kind::<UserAccount>(options, output).await,
        ResourceKind::History => list_kind::<DiscoveryRecord>(options, output).await,
    }
}

/// Check filter categories and the sort field against what `kind` offers.
pub(crate) fn validate_options(options: &ListOptions) -> Result<()> {
    let kind = options.kind;
    for (category, value) in &options.filters {
        if !kind.filter_categories().contains(&category.as_str()) {
            return Err(CatalogError::InvalidFilter(format!(
                "{category}={value} (filters for {kind}: {})",
                kind.filter_categories().join(", ")
            )));
        }
    }
    if let Some(field) = &options.sort_by
        && !kind.sort_fields().contains(&field.as_str())
    {
        return Err(CatalogError::validation(
            "sort field",
            format!(
                "'{field}' is not sortable for {kind}, expected one of: {}",
                kind.sort_fields().join(", ")
            ),
        ));
    }
    Ok(())
}

/// Resolve `--sort` and `--sort-field` into an order. A field without a
/// direction sorts ascending; a direction without a field uses the kind's
/// default field.
pub(crate) fn sort_order(options: &ListOptions) -> SortOrder {
    let direction = match (options.sort, &options.sort_by) {
        (Some(direction), _) => direction,
        (None, Some(_)) => SortDirection::Ascending,
        (None, None) => SortDirection::None,
    };
    let field = options
        .sort_by
        .clone()
        .unwrap_or_else(|| options.kind.default_sort_field().to_string());
    SortOrder::new(direction, field)
}

async fn list_kind<T: Resource>(options: ListOptions, output: OutputOptions) -> Result<()> {
    validate_options(&options)?;

    let mut config = Config::load()?;
    let per_page = validate_page_size(options.per_page.unwrap_or(config.items_per_page))?;

    let mut manager: ListManager<T> =
        ListManager::new(PageState::new(per_page)?).with_sort(sort_order(&options));
    if let Some(term) = &options.search {
        manager.set_search(term.as_str());
    }
    for (category, value) in &options.filters {
        manager.select(category.as_str(), value.as_str());
    }
    manager.set_date_range(options.from, options.to)?;

    let client = connect(&config)?;
    manager.load(&client).await;
    persist_credentials(&mut config, &client)?;

    if let LoadState::Failed { message, .. } = manager.load_state() {
        if client.session().is_expired() {
            return Err(CatalogError::SessionExpired);
        }
        return Err(CatalogError::Other(message.clone()));
    }

    if options.page > 1 && !manager.go_to_page(options.page) {
        warn!(
            page = options.page,
            total_pages = manager.view().total_pages,
            "requested page is out of range, showing page 1"
        );
    }

    let view = manager.view();
    debug!(
        kind = %T::KIND,
        filtered = view.filtered_count,
        total = view.total_count,
        page = view.current_page,
        "rendered list page"
    );

    let filter = manager.filter();
    let (from, to) = filter.date_range();
    let json_output = json!({
        "kind": T::KIND.to_string(),
        "page": view.current_page,
        "total_pages": view.total_pages,
        "items_per_page": view.items_per_page,
        "filtered_count": view.filtered_count,
        "total_count": view.total_count,
        "filters": {
            "search": filter.search_term(),
            "categories": filter
                .active_tags()
                .into_iter()
                .map(|(category, value)| json!({"category": category, "value": value}))
                .collect::<Vec<_>>(),
            "from": from.map(|d| d.to_string()),
            "to": to.map(|d| d.to_string()),
        },
        "sort": {
            "direction": manager.sort().direction().to_string(),
            "field": manager.sort().field(),
        },
        "items": view.page_items,
    });

    let mut text = String::new();
    if let Some(tags) = format_filter_tags(filter) {
        text.push_str(&tags);
        text.push('\n');
    }
    text.push_str(&render_page(&view));

    CommandOutput::new(json_output).with_text(text).print(output)
}
