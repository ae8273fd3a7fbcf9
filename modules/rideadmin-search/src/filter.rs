//! Free-text search plus exact-match filters over an in-memory record list.
//!
//! A record is kept when it passes the text query AND every active discrete
//! filter. Output is a stable subsequence of the input; nothing is re-sorted
//! and nothing is mutated.

use std::borrow::Cow;
use std::collections::BTreeMap;

use tracing::debug;

use rideadmin_common::config::DEFAULT_ALL_SENTINEL;

// ---------------------------------------------------------------------------
// Field access
// ---------------------------------------------------------------------------

/// Named field access for filtering. `None` means the record has no value
/// for that field, which never matches anything.
pub trait Searchable {
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;
}

impl<T: Searchable + ?Sized> Searchable for &T {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).field(name)
    }
}

// ---------------------------------------------------------------------------
// Query shape
// ---------------------------------------------------------------------------

/// Which of the searchable fields the text query looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchMode {
    #[default]
    All,
    Only(String),
}

impl SearchMode {
    /// `"all"` (any case) or blank is [`SearchMode::All`], anything else names a field.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(trimmed.to_string())
        }
    }
}

/// The fields a screen offers for text search, and the mode picked by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelector {
    fields: Vec<String>,
    mode: SearchMode,
}

impl FieldSelector {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            mode: SearchMode::All,
        }
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> &SearchMode {
        &self.mode
    }

    /// Fields the query is matched against under the current mode.
    pub fn searched_fields(&self) -> &[String] {
        match &self.mode {
            SearchMode::All => &self.fields,
            SearchMode::Only(field) => std::slice::from_ref(field),
        }
    }
}

/// Exact-match constraints keyed by field name. A value equal to the
/// sentinel (`"all"` unless overridden) means no constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscreteFilters {
    filters: BTreeMap<String, String>,
    all_sentinel: String,
}

impl Default for DiscreteFilters {
    fn default() -> Self {
        Self {
            filters: BTreeMap::new(),
            all_sentinel: DEFAULT_ALL_SENTINEL.to_string(),
        }
    }
}

impl DiscreteFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.all_sentinel = sentinel.into();
        self
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.filters.insert(field.into(), value.into());
    }

    /// Constraints that actually narrow the result.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters
            .iter()
            .filter(|(_, value)| **value != self.all_sentinel)
            .map(|(field, value)| (field.as_str(), value.as_str()))
    }

    pub fn is_unconstrained(&self) -> bool {
        self.active().next().is_none()
    }
}

impl<K, V> FromIterator<(K, V)> for DiscreteFilters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Self::default();
        for (field, value) in iter {
            filters.insert(field, value);
        }
        filters
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Filter records that know their own fields.
pub fn filter<'a, R: Searchable>(
    records: &'a [R],
    query: &str,
    selector: &FieldSelector,
    filters: &DiscreteFilters,
) -> Vec<&'a R> {
    filter_by(records, query, selector, filters, |record, name| record.field(name))
}

/// Filter with a caller-supplied field accessor.
pub fn filter_by<'a, R, F>(
    records: &'a [R],
    query: &str,
    selector: &FieldSelector,
    filters: &DiscreteFilters,
    accessor: F,
) -> Vec<&'a R>
where
    F: for<'r> Fn(&'r R, &str) -> Option<Cow<'r, str>>,
{
    let needle = query.trim().to_lowercase();

    let kept: Vec<&R> = records
        .iter()
        .filter(|record| matches_text(*record, &needle, selector, &accessor))
        .filter(|record| matches_filters(*record, filters, &accessor))
        .collect();

    debug!(
        total = records.len(),
        kept = kept.len(),
        query = %needle,
        mode = ?selector.mode(),
        unconstrained = filters.is_unconstrained(),
        "Record filter applied"
    );
    kept
}

fn matches_text<R, F>(record: &R, needle: &str, selector: &FieldSelector, accessor: &F) -> bool
where
    F: for<'r> Fn(&'r R, &str) -> Option<Cow<'r, str>>,
{
    if needle.is_empty() {
        return true;
    }
    selector.searched_fields().iter().any(|name| {
        accessor(record, name).is_some_and(|value| value.to_lowercase().contains(needle))
    })
}

fn matches_filters<R, F>(record: &R, filters: &DiscreteFilters, accessor: &F) -> bool
where
    F: for<'r> Fn(&'r R, &str) -> Option<Cow<'r, str>>,
{
    filters
        .active()
        .all(|(name, expected)| accessor(record, name).is_some_and(|value| value == expected))
}
