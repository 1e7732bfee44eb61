//! Generic filtered list manager.
//!
//! The pipeline is: raw collection → [`filter`] → [`sort`] → [`pager`].
//! [`ListManager`] owns the state for one list screen and recomputes the
//! pipeline on demand; [`DeletionCoordinator`] sequences confirm → request →
//! local update → notification for deletes, and [`editor`] does the same for
//! creates and updates. The item type only needs to implement [`Listable`].

pub mod editor;
pub mod filter;
pub mod manager;
pub mod mutation;
pub mod overlay;
pub mod pager;
pub mod sort;

use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

pub use editor::{Draft, SaveTarget, save_draft, saved_notification, submit_draft};
pub use filter::FilterState;
pub use manager::{ListManager, ListView, LoadState, LoadTicket};
pub use mutation::{DeleteTicket, DeletionCoordinator, DeletionPhase};
pub use overlay::{ConfirmDialogView, Notification, NotificationKind};
pub use pager::{PAGE_SIZES, PageState, PageSummary, Paginated, page_window, paginate};
pub use sort::{SortDirection, SortOrder};

/// Stable identifier of an item within its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(ItemId)
            .map_err(|_| CatalogError::validation("id", format!("'{s}' is not a numeric id")))
    }
}

/// Value an item exposes for ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortKey<'a> {
    Text(&'a str),
    Number(f64),
    Date(Date),
}

/// Field accessors the list pipeline needs from an item.
pub trait Listable {
    fn item_id(&self) -> ItemId;

    /// Text fields matched by the free-text search
    fn search_fields(&self) -> Vec<&str>;

    /// The item's value for a filter category, if it has one
    fn category(&self, name: &str) -> Option<&str>;

    /// The item's value for a sort field, if it has one
    fn sort_key(&self, field: &str) -> Option<SortKey<'_>>;

    /// Date used by date-range filters
    fn date(&self) -> Option<Date> {
        None
    }
}

impl<T: Listable + ?Sized> Listable for &T {
    fn item_id(&self) -> ItemId {
        (**self).item_id()
    }

    fn search_fields(&self) -> Vec<&str> {
        (**self).search_fields()
    }

    fn category(&self, name: &str) -> Option<&str> {
        (**self).category(name)
    }

    fn sort_key(&self, field: &str) -> Option<SortKey<'_>> {
        (**self).sort_key(field)
    }

    fn date(&self) -> Option<Date> {
        (**self).date()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_parse() {
        assert_eq!("42".parse::<ItemId>().unwrap(), ItemId(42));
        assert_eq!(" 7 ".parse::<ItemId>().unwrap(), ItemId(7));
        assert!("abc".parse::<ItemId>().is_err());
        assert_eq!(ItemId(9).to_string(), "9");
    }
}
