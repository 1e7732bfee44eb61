//! Search and categorical filtering.
//!
//! An item matches a [`FilterState`] when all of these hold:
//!
//! - the search term is empty, or one of the item's search fields contains
//!   it (case-insensitive)
//! - for every category with a non-empty selection, the item's value for
//!   that category is one of the selected values
//! - if a date range is set, the item has a date inside it (both ends
//!   inclusive)
//!
//! A category with nothing selected is not applied at all.

use std::collections::{BTreeMap, BTreeSet};

use jiff::civil::Date;

use crate::error::{CatalogError, Result};

use super::Listable;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    search_term: String,
    selections: BTreeMap<String, BTreeSet<String>>,
    from: Option<Date>,
    to: Option<Date>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Add `value` to the selection for `category`.
    pub fn select(&mut self, category: impl Into<String>, value: impl Into<String>) {
        self.selections
            .entry(category.into())
            .or_default()
            .insert(value.into());
    }

    /// Select `value` if it is not selected, deselect it otherwise.
    pub fn toggle(&mut self, category: &str, value: &str) {
        if self.is_selected(category, value) {
            self.remove(category, value);
        } else {
            self.select(category, value);
        }
    }

    /// Remove one selected value. Removing the last value for a category
    /// turns that category's filter off.
    pub fn remove(&mut self, category: &str, value: &str) {
        if let Some(values) = self.selections.get_mut(category) {
            values.remove(value);
            if values.is_empty() {
                self.selections.remove(category);
            }
        }
    }

    pub fn is_selected(&self, category: &str, value: &str) -> bool {
        self.selections
            .get(category)
            .is_some_and(|values| values.contains(value))
    }

    pub fn selected(&self, category: &str) -> Option<&BTreeSet<String>> {
        self.selections.get(category)
    }

    /// Restrict to items dated within `from..=to`. Either end may be open.
    pub fn set_date_range(&mut self, from: Option<Date>, to: Option<Date>) -> Result<()> {
        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(CatalogError::validation(
                "date range",
                format!("start {from} is after end {to}"),
            ));
        }
        self.from = from;
        self.to = to;
        Ok(())
    }

    pub fn date_range(&self) -> (Option<Date>, Option<Date>) {
        (self.from, self.to)
    }

    /// Reset to the all-empty default.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.search_term.trim().is_empty()
            && self.selections.is_empty()
            && self.from.is_none()
            && self.to.is_none()
    }

    /// Selected `(category, value)` pairs, in a stable order.
    pub fn active_tags(&self) -> Vec<(&str, &str)> {
        self.selections
            .iter()
            .flat_map(|(category, values)| {
                values
                    .iter()
                    .map(move |value| (category.as_str(), value.as_str()))
            })
            .collect()
    }

    pub fn matches<T: Listable>(&self, item: &T) -> bool {
        self.matches_search(item) && self.matches_categories(item) && self.matches_dates(item)
    }

    /// Items matching this filter, in their original order.
    pub fn apply<'a, T: Listable>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(*item)).collect()
    }

    fn matches_search<T: Listable>(&self, item: &T) -> bool {
        let term = self.search_term.trim();
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        item.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_categories<T: Listable>(&self, item: &T) -> bool {
        self.selections.iter().all(|(category, values)| {
            values.is_empty()
                || item
                    .category(category)
                    .is_some_and(|value| values.contains(value))
        })
    }

    fn matches_dates<T: Listable>(&self, item: &T) -> bool {
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        let Some(date) = item.date() else {
            return false;
        };
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::testing::{Row, rows};
    use jiff::civil::date;

    fn ids<T: Listable>(items: &[T]) -> Vec<i64> {
        items.iter().map(|i| i.item_id().0).collect()
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let items = rows(5);
        let filtered = FilterState::new().apply(&items);
        assert_eq!(ids(&filtered), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_trimmed() {
        let items = vec![
            Row::new(1, "Glock 19", "user", "A"),
            Row::new(2, "SIG Sauer", "user", "A"),
            Row::new(3, "glock 17", "user", "A"),
        ];
        let mut filter = FilterState::new();
        filter.set_search("  GLOCK ");
        assert_eq!(ids(&filter.apply(&items)), vec![1, 3]);
    }

    #[test]
    fn test_search_thai_text() {
        let items = vec![
            Row::new(1, "ยาบ้า สีส้ม", "user", "A"),
            Row::new(2, "ไอซ์", "user", "A"),
            Row::new(3, "กัญชาแห้ง", "user", "A"),
            Row::new(4, "เม็ดยาบ้า WY", "user", "A"),
            Row::new(5, "เฮโรอีน", "user", "A"),
        ];
        let mut filter = FilterState::new();
        filter.set_search("ยาบ้า");
        assert_eq!(ids(&filter.apply(&items)), vec![1, 4]);

        filter.set_search("");
        assert_eq!(filter.apply(&items).len(), 5);
    }

    #[test]
    fn test_categories_are_conjunctive() {
        let items = vec![
            Row::new(1, "a", "admin", "A"),
            Row::new(2, "b", "admin", "B"),
            Row::new(3, "c", "user", "A"),
        ];
        let mut filter = FilterState::new();
        filter.select("role", "admin");
        filter.select("dept", "A");
        assert_eq!(ids(&filter.apply(&items)), vec![1]);
    }

    #[test]
    fn test_values_within_category_are_disjunctive() {
        let items = vec![
            Row::new(1, "a", "admin", "A"),
            Row::new(2, "b", "admin", "B"),
            Row::new(3, "c", "user", "C"),
        ];
        let mut filter = FilterState::new();
        filter.select("dept", "A");
        filter.select("dept", "C");
        assert_eq!(ids(&filter.apply(&items)), vec![1, 3]);
    }

    #[test]
    fn test_unknown_category_matches_nothing() {
        let items = rows(3);
        let mut filter = FilterState::new();
        filter.select("province", "เชียงใหม่");
        assert!(filter.apply(&items).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let items = vec![
            Row::new(1, "alpha", "admin", "A"),
            Row::new(2, "beta", "user", "A"),
            Row::new(3, "alphabet", "admin", "B"),
        ];
        let mut filter = FilterState::new();
        filter.set_search("alpha");
        filter.select("role", "admin");
        let once = filter.apply(&items);
        let twice = filter.apply(&once);
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn test_toggle_and_remove_last_value_disables_category() {
        let mut filter = FilterState::new();
        filter.toggle("role", "admin");
        assert!(filter.is_selected("role", "admin"));
        filter.toggle("role", "admin");
        assert!(filter.selected("role").is_none());
        assert!(filter.is_empty());
    }

    #[test]
    fn test_active_tags_and_clear() {
        let mut filter = FilterState::new();
        filter.select("role", "user");
        filter.select("dept", "B");
        filter.select("dept", "A");
        assert_eq!(
            filter.active_tags(),
            vec![("dept", "A"), ("dept", "B"), ("role", "user")]
        );
        filter.set_search("x");
        filter.clear();
        assert!(filter.is_empty());
        assert_eq!(filter, FilterState::default());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let items = vec![
            Row::new(1, "a", "user", "A").dated(date(2024, 1, 1)),
            Row::new(2, "b", "user", "A").dated(date(2024, 1, 15)),
            Row::new(3, "c", "user", "A").dated(date(2024, 1, 31)),
            Row::new(4, "d", "user", "A"),
        ];
        let mut filter = FilterState::new();
        filter
            .set_date_range(Some(date(2024, 1, 1)), Some(date(2024, 1, 15)))
            .unwrap();
        assert_eq!(ids(&filter.apply(&items)), vec![1, 2]);

        filter.set_date_range(Some(date(2024, 1, 15)), None).unwrap();
        assert_eq!(ids(&filter.apply(&items)), vec![2, 3]);
    }

    #[test]
    fn test_inverted_date_range_rejected() {
        let mut filter = FilterState::new();
        let err = filter
            .set_date_range(Some(date(2024, 2, 1)), Some(date(2024, 1, 1)))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation { .. }));
        assert_eq!(filter.date_range(), (None, None));
    }
}
