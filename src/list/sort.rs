//! Sort stage.
//!
//! Sorting copies its input and uses a stable sort, so items with equal
//! keys keep their relative order in both directions.

use std::cmp::Ordering;

use unicase::UniCase;

use super::{Listable, SortKey};

/// Sort direction as chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    None,
    Ascending,
    Descending,
}

enum_display_fromstr!(
    SortDirection,
    crate::error::CatalogError::InvalidSort,
    {
        None => "none" | "off",
        Ascending => "asc" | "ascending",
        Descending => "desc" | "descending",
    }
);

/// Ordering applied to a filtered list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    None,
    Ascending(String),
    Descending(String),
}

impl SortOrder {
    pub fn new(direction: SortDirection, field: impl Into<String>) -> Self {
        match direction {
            SortDirection::None => SortOrder::None,
            SortDirection::Ascending => SortOrder::Ascending(field.into()),
            SortDirection::Descending => SortOrder::Descending(field.into()),
        }
    }

    pub fn direction(&self) -> SortDirection {
        match self {
            SortOrder::None => SortDirection::None,
            SortOrder::Ascending(_) => SortDirection::Ascending,
            SortOrder::Descending(_) => SortDirection::Descending,
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            SortOrder::None => None,
            SortOrder::Ascending(field) | SortOrder::Descending(field) => Some(field),
        }
    }

    /// Return a sorted copy of `items`; the input is left untouched.
    pub fn apply<T: Listable + Clone>(&self, items: &[T]) -> Vec<T> {
        let mut sorted = items.to_vec();
        match self {
            SortOrder::None => {}
            SortOrder::Ascending(field) => {
                sorted.sort_by(|a, b| compare_keys(a.sort_key(field), b.sort_key(field)));
            }
            SortOrder::Descending(field) => {
                sorted.sort_by(|a, b| compare_keys(b.sort_key(field), a.sort_key(field)));
            }
        }
        sorted
    }
}

/// Compare two sort keys. A missing key sorts like empty text.
pub fn compare_keys(a: Option<SortKey<'_>>, b: Option<SortKey<'_>>) -> Ordering {
    let a = a.unwrap_or(SortKey::Text(""));
    let b = b.unwrap_or(SortKey::Text(""));
    match (a, b) {
        (SortKey::Text(a), SortKey::Text(b)) => compare_text(a, b),
        (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(&b),
        (SortKey::Date(a), SortKey::Date(b)) => a.cmp(&b),
        (a, b) => rank(&a).cmp(&rank(&b)),
    }
}

fn rank(key: &SortKey<'_>) -> u8 {
    match key {
        SortKey::Number(_) => 0,
        SortKey::Date(_) => 1,
        SortKey::Text(_) => 2,
    }
}

/// Case-insensitive text comparison that follows Thai dictionary order.
///
/// Thai leading vowels (เ แ โ ใ ไ) are written before the consonant they
/// follow in speech, and dictionaries order words by that consonant. The
/// collation key moves each leading vowel after its consonant.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    let ka = collation_key(a);
    let kb = collation_key(b);
    UniCase::new(ka.as_str())
        .cmp(&UniCase::new(kb.as_str()))
        .then_with(|| a.cmp(b))
}

fn is_thai_leading_vowel(c: char) -> bool {
    ('\u{0E40}'..='\u{0E44}').contains(&c)
}

fn collation_key(s: &str) -> String {
    let mut key = String::with_capacity(s.len());
    let mut chars = s.trim().chars().peekable();
    while let Some(c) = chars.next() {
        if is_thai_leading_vowel(c)
            && let Some(&next) = chars.peek()
        {
            key.push(next);
            key.push(c);
            chars.next();
        } else {
            key.push(c);
        }
    }
    key
}
