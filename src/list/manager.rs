//! State owner for one list screen.
//!
//! A [`ListManager`] holds the raw collection together with its filter,
//! sort and page state. Views are recomputed from scratch on every call to
//! [`ListManager::view`], so a stale filtered list can never be shown.
//!
//! Loads are tagged with a generation number. Only the result of the most
//! recent load is applied; older results, and anything arriving after
//! [`ListManager::unmount`], are dropped.

use serde::Serialize;
use tracing::debug;

use crate::catalog::Resource;
use crate::error::{CatalogError, Result};
use crate::remote::{CatalogApi, fetch_collection};

use super::pager::{DEFAULT_PAGE_WINDOW, PageSummary, page_window, paginate};
use super::{FilterState, ItemId, Listable, PageState, SortOrder};

/// Progress of the collection load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed {
        status: Option<u16>,
        message: String,
    },
}

impl LoadState {
    fn failed(err: &CatalogError) -> Self {
        let status = match err {
            CatalogError::RemoteFetch { status, .. } => *status,
            _ => None,
        };
        LoadState::Failed {
            status,
            message: err.to_string(),
        }
    }
}

/// Handle for one in-progress load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "pass the ticket to complete_load"]
pub struct LoadTicket {
    generation: u64,
}

/// One rendered page of the list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView<T> {
    pub page_items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub items_per_page: usize,
    /// Items left after filtering
    pub filtered_count: usize,
    /// Items in the raw collection
    pub total_count: usize,
    pub summary: PageSummary,
    /// Page numbers to offer as buttons
    pub page_numbers: Vec<usize>,
    pub load_state: LoadState,
}

impl<T> ListView<T> {
    /// A loaded collection with no items, as opposed to a failed load.
    pub fn is_empty_collection(&self) -> bool {
        self.load_state == LoadState::Loaded && self.total_count == 0
    }
}

#[derive(Debug, Clone)]
pub struct ListManager<T> {
    items: Vec<T>,
    load_state: LoadState,
    filter: FilterState,
    sort: SortOrder,
    page: PageState,
    generation: u64,
    mounted: bool,
}

impl<T: Listable + Clone> Default for ListManager<T> {
    fn default() -> Self {
        Self::new(PageState::default())
    }
}

impl<T: Listable + Clone> ListManager<T> {
    pub fn new(page: PageState) -> Self {
        Self {
            items: Vec::new(),
            load_state: LoadState::Idle,
            filter: FilterState::new(),
            sort: SortOrder::None,
            page,
            generation: 0,
            mounted: true,
        }
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> &SortOrder {
        &self.sort
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Start a load. Any load started earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.load_state = LoadState::Loading;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply the result of a load. Returns `false` if the result was
    /// discarded because a newer load started or the screen unmounted.
    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<Vec<T>>) -> bool {
        if !self.mounted {
            debug!(generation = ticket.generation, "discarding load result after unmount");
            return false;
        }
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                current = self.generation,
                "discarding stale load result"
            );
            return false;
        }

        match result {
            Ok(items) => {
                self.items = items;
                self.load_state = LoadState::Loaded;
            }
            Err(err) => {
                debug!(error = %err, "collection load failed");
                self.load_state = LoadState::failed(&err);
            }
        }
        self.reclamp();
        true
    }

    /// Replace the collection directly.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.load_state = LoadState::Loaded;
        self.reclamp();
    }

    /// Stop applying async results to this manager.
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filter.set_search(term);
        self.reclamp();
    }

    pub fn select(&mut self, category: impl Into<String>, value: impl Into<String>) {
        self.filter.select(category, value);
        self.reclamp();
    }

    pub fn toggle(&mut self, category: &str, value: &str) {
        self.filter.toggle(category, value);
        self.reclamp();
    }

    pub fn remove_filter(&mut self, category: &str, value: &str) {
        self.filter.remove(category, value);
        self.reclamp();
    }

    pub fn set_date_range(
        &mut self,
        from: Option<jiff::civil::Date>,
        to: Option<jiff::civil::Date>,
    ) -> Result<()> {
        self.filter.set_date_range(from, to)?;
        self.reclamp();
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
        self.reclamp();
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        self.reclamp();
    }

    /// Navigate to `page`; out-of-range pages are ignored.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        let count = self.filtered_count();
        self.page.go_to_page(page, count)
    }

    pub fn next_page(&mut self) -> bool {
        let count = self.filtered_count();
        self.page.next_page(count)
    }

    pub fn prev_page(&mut self) -> bool {
        let count = self.filtered_count();
        self.page.prev_page(count)
    }

    pub fn set_items_per_page(&mut self, items_per_page: usize) -> Result<()> {
        self.page.set_items_per_page(items_per_page)
    }

    pub fn find(&self, id: ItemId) -> Option<&T> {
        self.items.iter().find(|item| item.item_id() == id)
    }

    /// Remove an item from the raw collection and re-clamp the page.
    pub fn remove_item(&mut self, id: ItemId) -> Option<T> {
        let index = self.items.iter().position(|item| item.item_id() == id)?;
        let removed = self.items.remove(index);
        self.reclamp();
        Some(removed)
    }

    /// Replace the item with the same id, or append it when it is new.
    /// Returns `true` when an existing item was replaced.
    pub fn upsert_item(&mut self, item: T) -> bool {
        let id = item.item_id();
        let replaced = match self.items.iter_mut().find(|existing| existing.item_id() == id) {
            Some(existing) => {
                *existing = item;
                true
            }
            None => {
                self.items.push(item);
                false
            }
        };
        self.reclamp();
        replaced
    }

    pub fn filtered_count(&self) -> usize {
        self.items.iter().filter(|item| self.filter.matches(*item)).count()
    }

    /// Filter, sort and paginate the current collection.
    pub fn view(&self) -> ListView<T> {
        let filtered = self.filter.apply(&self.items);
        let sorted = self.sort.apply(&filtered);
        let paginated = paginate(&sorted, &self.page);
        let current_page = self.page.current_page().min(paginated.total_pages);

        ListView {
            page_items: paginated.page_items.into_iter().cloned().collect(),
            current_page,
            total_pages: paginated.total_pages,
            items_per_page: self.page.items_per_page(),
            filtered_count: sorted.len(),
            total_count: self.items.len(),
            summary: PageSummary::new(&self.page, sorted.len()),
            page_numbers: page_window(current_page, paginated.total_pages, DEFAULT_PAGE_WINDOW)
                .collect(),
            load_state: self.load_state.clone(),
        }
    }

    fn reclamp(&mut self) {
        let before = self.page.current_page();
        let count = self.filtered_count();
        if self.page.clamp(count) {
            debug!(
                from = before,
                to = self.page.current_page(),
                "current page clamped"
            );
        }
    }
}

impl<T: Resource> ListManager<T> {
    /// Fetch the collection from its list endpoint and apply the result.
    pub async fn load<A: CatalogApi>(&mut self, api: &A) -> bool {
        let ticket = self.begin_load();
        let result = fetch_collection::<T, A>(api, &T::list_endpoint()).await;
        self.complete_load(ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::testing::{Row, rows};

    fn loaded(count: i64, page_size: usize) -> ListManager<Row> {
        let mut manager = ListManager::new(PageState::new(page_size).unwrap());
        let ticket = manager.begin_load();
        assert!(manager.complete_load(ticket, Ok(rows(count))));
        manager
    }

    #[test]
    fn test_loading_flag_settles_on_success_and_failure() {
        let mut manager: ListManager<Row> = ListManager::default();
        let ticket = manager.begin_load();
        assert!(manager.is_loading());
        manager.complete_load(ticket, Ok(Vec::new()));
        assert!(!manager.is_loading());
        assert!(manager.view().is_empty_collection());

        let ticket = manager.begin_load();
        manager.complete_load(
            ticket,
            Err(CatalogError::RemoteFetch {
                status: Some(500),
                body: "boom".to_string(),
            }),
        );
        assert!(!manager.is_loading());
        let view = manager.view();
        assert!(!view.is_empty_collection());
        assert!(matches!(
            view.load_state,
            LoadState::Failed {
                status: Some(500),
                ..
            }
        ));
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut manager: ListManager<Row> = ListManager::default();
        let first = manager.begin_load();
        let second = manager.begin_load();

        assert!(manager.complete_load(second, Ok(rows(2))));
        assert!(!manager.complete_load(first, Ok(rows(7))));
        assert_eq!(manager.items().len(), 2);
        assert_eq!(manager.load_state(), &LoadState::Loaded);
    }

    #[test]
    fn test_stale_result_does_not_settle_newer_load() {
        let mut manager: ListManager<Row> = ListManager::default();
        let first = manager.begin_load();
        let _second = manager.begin_load();
        assert!(!manager.complete_load(first, Ok(rows(3))));
        assert!(manager.is_loading());
        assert!(manager.items().is_empty());
    }

    #[test]
    fn test_result_after_unmount_is_discarded() {
        let mut manager: ListManager<Row> = ListManager::default();
        let ticket = manager.begin_load();
        manager.unmount();
        assert!(!manager.complete_load(ticket, Ok(rows(3))));
        assert!(manager.items().is_empty());
        assert!(!manager.is_mounted());
    }

    #[test]
    fn test_filter_change_clamps_page() {
        let mut manager = loaded(25, 10);
        assert!(manager.go_to_page(3));
        manager.set_search("item-1");
        // item-1, item-10..item-19 => 11 matches, 2 pages
        let view = manager.view();
        assert_eq!(view.filtered_count, 11);
        assert_eq!(view.current_page, 2);
        assert_eq!(manager.page().current_page(), 2);
        assert_eq!(view.page_items.len(), 1);
    }

    #[test]
    fn test_remove_from_middle_page_keeps_page() {
        let mut manager = loaded(30, 10);
        assert!(manager.go_to_page(2));
        manager.remove_item(ItemId(15)).unwrap();
        let view = manager.view();
        assert_eq!(view.current_page, 2);
        assert_eq!(view.total_pages, 3);
        assert_eq!(view.page_items.len(), 10);
    }

    #[test]
    fn test_upsert_replaces_or_appends() {
        let mut manager = loaded(3, 10);
        assert!(manager.upsert_item(Row::new(2, "renamed", "user", "A")));
        assert_eq!(manager.items().len(), 3);
        assert_eq!(manager.find(ItemId(2)).unwrap().name, "renamed");

        assert!(!manager.upsert_item(Row::new(9, "new", "user", "A")));
        assert_eq!(manager.items().len(), 4);
        assert_eq!(manager.items()[3].id, 9);
    }

    #[test]
    fn test_remove_missing_item() {
        let mut manager = loaded(3, 10);
        assert!(manager.remove_item(ItemId(99)).is_none());
        assert_eq!(manager.items().len(), 3);
    }

    #[test]
    fn test_view_summary_and_page_numbers() {
        let mut manager = loaded(95, 10);
        manager.go_to_page(10);
        let view = manager.view();
        assert_eq!(view.page_numbers, vec![6, 7, 8, 9, 10]);
        assert_eq!(
            view.summary,
            PageSummary {
                first: 91,
                last: 95,
                total: 95
            }
        );
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let mut manager = loaded(50, 10);
        manager.go_to_page(4);
        manager.set_items_per_page(20).unwrap();
        assert_eq!(manager.view().current_page, 1);
    }

    #[test]
    fn test_sort_applies_to_view_only() {
        let mut manager = loaded(3, 10);
        manager.set_sort(SortOrder::Descending("name".to_string()));
        let names: Vec<String> = manager.view().page_items.into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["item-3", "item-2", "item-1"]);
        assert_eq!(manager.items()[0].name, "item-1");
    }
}
