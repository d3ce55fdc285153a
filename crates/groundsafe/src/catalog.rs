//! Case catalog lookup and filtering.

use crate::error::{Error, Result};
use crate::highlight::Highlighter;
use crate::record::{Category, IncidentRecord};

/// Criteria for selecting cases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Substring that must appear in the title or content, ignoring case.
    /// Empty or whitespace-only matches every case.
    pub query: String,
    /// Restrict to one category.
    pub category: Option<Category>,
}

impl CatalogFilter {
    /// A filter on the search query only.
    #[must_use]
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category: None,
        }
    }

    /// Restrict the filter to one category.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    fn matches(&self, record: &IncidentRecord, matcher: &Highlighter) -> bool {
        if self.category.is_some_and(|c| c != record.category) {
            return false;
        }
        !matcher.is_active()
            || matcher.is_match(&record.title)
            || matcher.is_match(&record.content)
    }
}

/// The immutable set of case records.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<IncidentRecord>,
}

impl Catalog {
    /// Create a catalog over the given records.
    #[must_use]
    pub fn new(records: Vec<IncidentRecord>) -> Self {
        Self { records }
    }

    /// All records in dataset order.
    #[must_use]
    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if no record has that id.
    pub fn get(&self, id: i64) -> Result<&IncidentRecord> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or(Error::RecordNotFound(id))
    }

    /// Records matching the filter, in dataset order.
    #[must_use]
    pub fn search(&self, filter: &CatalogFilter) -> Vec<&IncidentRecord> {
        // Hits are exactly the records the card highlighting marks.
        let matcher = Highlighter::new(&filter.query);
        self.records
            .iter()
            .filter(|r| filter.matches(r, &matcher))
            .collect()
    }

    /// Number of records in a category.
    #[must_use]
    pub fn count_by_category(&self, category: Category) -> usize {
        self.records
            .iter()
            .filter(|r| r.category == category)
            .count()
    }
}
