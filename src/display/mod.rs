//! Terminal rendering for list pages and overlays.

use owo_colors::OwoColorize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::catalog::Resource;
use crate::list::{ConfirmDialogView, FilterState, ListView, LoadState, Notification, NotificationKind};

/// Render items as a table with the resource's columns.
pub fn render_table<T: Resource>(items: &[T]) -> String {
    let mut builder = Builder::default();
    builder.push_record(T::columns().iter().copied());
    for item in items {
        builder.push_record(item.row());
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Render a single item as a two-column field/value table.
pub fn render_detail<T: Resource>(item: &T) -> String {
    let mut builder = Builder::default();
    for (column, value) in T::columns().iter().zip(item.row()) {
        builder.push_record([column.to_string(), value]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    format!("{}\n{table}", item.label().bold())
}

/// Render one page of a list, including the empty and failed states.
pub fn render_page<T: Resource>(view: &ListView<T>) -> String {
    match &view.load_state {
        LoadState::Failed { message, .. } => {
            return format!("{} {message}", "Failed to load:".red().bold());
        }
        LoadState::Idle | LoadState::Loading => {
            return "Loading...".dimmed().to_string();
        }
        LoadState::Loaded => {}
    }

    if view.is_empty_collection() {
        return format!("No {} found.", T::KIND).dimmed().to_string();
    }
    if view.filtered_count == 0 {
        return "No items match the current filters.".dimmed().to_string();
    }

    format!("{}\n{}", render_table(&view.page_items), format_pager(view))
}

/// "Showing 11-20 of 25 · page 2/3 · 1 [2] 3"
pub fn format_pager<T>(view: &ListView<T>) -> String {
    let buttons: Vec<String> = view
        .page_numbers
        .iter()
        .map(|&n| {
            if n == view.current_page {
                format!("[{n}]").cyan().bold().to_string()
            } else {
                n.to_string()
            }
        })
        .collect();

    let mut line = format!(
        "Showing {}-{} of {}",
        view.summary.first, view.summary.last, view.summary.total
    );
    if view.filtered_count != view.total_count {
        line.push_str(&format!(" (filtered from {})", view.total_count));
    }
    line.push_str(&format!(
        " · page {}/{} · {}",
        view.current_page,
        view.total_pages,
        buttons.join(" ")
    ));
    line.dimmed().to_string()
}

/// Active filters as `category=value` tags.
pub fn format_filter_tags(filter: &FilterState) -> Option<String> {
    let mut tags: Vec<String> = filter
        .active_tags()
        .into_iter()
        .map(|(category, value)| format!("{category}={value}"))
        .collect();
    if !filter.search_term().trim().is_empty() {
        tags.insert(0, format!("search=\"{}\"", filter.search_term().trim()));
    }
    match filter.date_range() {
        (None, None) => {}
        (from, to) => tags.push(format!(
            "date={}..{}",
            from.map(|d| d.to_string()).unwrap_or_default(),
            to.map(|d| d.to_string()).unwrap_or_default()
        )),
    }
    if tags.is_empty() {
        None
    } else {
        Some(format!("{} {}", "Filters:".cyan(), tags.join(", ")))
    }
}

pub fn format_notification(notification: &Notification) -> String {
    match notification.kind {
        NotificationKind::Success => format!(
            "{} {}",
            format!("{}:", notification.title).green().bold(),
            notification.message
        ),
        NotificationKind::Error => format!(
            "{} {}",
            format!("{}:", notification.title).red().bold(),
            notification.message
        ),
    }
}

pub fn format_confirm(dialog: &ConfirmDialogView) -> String {
    let prompt = if dialog.in_flight {
        "deleting...".dimmed().to_string()
    } else {
        "[y/N]".to_string()
    };
    format!(
        "{} {} {prompt}",
        format!("{}:", dialog.title).yellow().bold(),
        dialog.message
    )
}
