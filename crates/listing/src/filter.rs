//! Filter/sort engine.
//!
//! `apply(records, state)` is a pure function:
//!
//! - **Search**: case-insensitive substring match over the record's search
//!   fields. A blank query matches everything.
//! - **Status / category**: exact equality; [`Selection::All`] (parsed from
//!   `"all"`) means no constraint.
//! - **Sort**: text keys ascending with case folding, numeric keys
//!   descending, date keys ascending with missing dates last. The sort is
//!   stable, so ties keep input order.

use std::borrow::Cow;
use std::cmp::Reverse;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use cura_core::normalize_label;

/// A filter choice: everything, or one exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl Selection<String> {
    /// Category match against an optional record field.
    ///
    /// Records without a category only pass the `All` selection.
    pub fn admits_str(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => value == Some(expected.as_str()),
        }
    }
}

/// `"all"` (any case) is the sentinel for no constraint.
impl<T: FromStr> FromStr for Selection<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if normalize_label(s) == "all" {
            return Ok(Selection::All);
        }
        s.parse().map(Selection::Only)
    }
}

/// Value a record exposes for one sort key.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue<'a> {
    /// Ascending, case-folded.
    Text(Cow<'a, str>),
    /// Descending.
    Number(i128),
    /// Ascending, `None` last.
    Date(Option<NaiveDateTime>),
}

impl<'a> SortValue<'a> {
    pub fn text(value: &'a str) -> Self {
        SortValue::Text(Cow::Borrowed(value))
    }

    pub fn number(value: impl Into<i128>) -> Self {
        SortValue::Number(value.into())
    }

    pub fn day(value: Option<NaiveDate>) -> Self {
        SortValue::Date(value.and_then(|d| d.and_hms_opt(0, 0, 0)))
    }

    pub fn instant(value: DateTime<Utc>) -> Self {
        SortValue::Date(Some(value.naive_utc()))
    }
}

/// Owned, totally ordered form of a [`SortValue`].
///
/// Built once per record so the comparison itself never allocates.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum OrderKey {
    Text { folded: String, raw: String },
    Number(Reverse<i128>),
    Date { missing: bool, at: Option<NaiveDateTime> },
}

impl From<SortValue<'_>> for OrderKey {
    fn from(value: SortValue<'_>) -> Self {
        match value {
            SortValue::Text(raw) => OrderKey::Text {
                folded: raw.to_lowercase(),
                raw: raw.into_owned(),
            },
            SortValue::Number(n) => OrderKey::Number(Reverse(n)),
            SortValue::Date(at) => OrderKey::Date {
                missing: at.is_none(),
                at,
            },
        }
    }
}

/// A record a list view can filter and sort.
pub trait Filterable {
    type Status: Copy + PartialEq;
    type SortKey: Copy + Default;

    /// Fields the search box matches against.
    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    fn status(&self) -> Self::Status;

    fn category(&self) -> Option<&str> {
        None
    }

    fn sort_value(&self, key: Self::SortKey) -> SortValue<'_>;
}

/// Transient filter state owned by one list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState<S, K> {
    pub search_query: String,
    pub status_filter: Selection<S>,
    pub category_filter: Selection<String>,
    pub sort_by: K,
}

impl<S, K: Default> Default for FilterState<S, K> {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            status_filter: Selection::All,
            category_filter: Selection::All,
            sort_by: K::default(),
        }
    }
}

impl<S: PartialEq, K: Copy + Default> FilterState<S, K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    pub fn with_status(mut self, status: S) -> Self {
        self.status_filter = Selection::Only(status);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category_filter = Selection::Only(category.into());
        self
    }

    pub fn sorted_by(mut self, key: K) -> Self {
        self.sort_by = key;
        self
    }

    /// Back to defaults (used when the user navigates away).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// No search text and no status/category constraint.
    pub fn is_unconstrained(&self) -> bool {
        self.search_query.trim().is_empty()
            && self.status_filter.is_all()
            && self.category_filter.is_all()
    }

    fn needle(&self) -> Option<String> {
        let trimmed = self.search_query.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }

    fn admits<T>(&self, record: &T, needle: Option<&str>) -> bool
    where
        T: Filterable<Status = S, SortKey = K>,
    {
        if !self.status_filter.admits(&record.status()) {
            return false;
        }
        if !self.category_filter.admits_str(record.category()) {
            return false;
        }
        match needle {
            None => true,
            Some(needle) => record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(needle)),
        }
    }

    /// Whether a single record passes search, status and category.
    pub fn matches<T>(&self, record: &T) -> bool
    where
        T: Filterable<Status = S, SortKey = K>,
    {
        self.admits(record, self.needle().as_deref())
    }
}

/// Reduce `records` to the ordered visible subset for `state`.
pub fn apply<'a, T>(records: &'a [T], state: &FilterState<T::Status, T::SortKey>) -> Vec<&'a T>
where
    T: Filterable,
{
    apply_iter(records.iter(), state)
}

/// [`apply`] over any iterator of borrowed records.
pub fn apply_iter<'a, T, I>(records: I, state: &FilterState<T::Status, T::SortKey>) -> Vec<&'a T>
where
    T: Filterable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let needle = state.needle();
    let mut visible: Vec<&'a T> = records
        .into_iter()
        .filter(|record| state.admits(*record, needle.as_deref()))
        .collect();

    // Stable: equal keys keep their input order.
    visible.sort_by_cached_key(|record| OrderKey::from(record.sort_value(state.sort_by)));
    visible
}
