//! Pure catalog filtering.
//!
//! The dashboard derives its visible subset from the full catalog with the
//! three filter inputs below. Everything here is deterministic and free of
//! side effects, so it can run on every request without coordination.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::sweet::Sweet;

/// Price bands offered by the dashboard filter.
///
/// The bands are half-open and partition the non-negative prices: low is
/// `[0, 2)`, medium is `[2, 4)`, high is `[4, ..)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBand {
    Low,
    Medium,
    High,
}

impl PriceBand {
    /// Classify a price into its band.
    ///
    /// Total over all prices by construction, so no price can fall into two
    /// bands or into none.
    #[must_use]
    pub fn classify(price: Decimal) -> Self {
        if price < Decimal::TWO {
            Self::Low
        } else if price < Decimal::from(4) {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Whether `price` falls within this band.
    #[must_use]
    pub fn contains(self, price: Decimal) -> bool {
        Self::classify(price) == self
    }
}

impl std::fmt::Display for PriceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for PriceBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("invalid price band: {s}")),
        }
    }
}

/// The three dashboard filter inputs.
///
/// `None` means "all" for the category and band selectors; an absent or
/// empty query means no text filtering. Transient UI state, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Free-text search over name, category, and description.
    pub query: Option<String>,
    /// Exact (case-sensitive) category selection.
    pub category: Option<String>,
    /// Price band selection.
    pub band: Option<PriceBand>,
}

impl CatalogFilter {
    /// Whether any filter input is narrowing the catalog.
    ///
    /// Drives the "Clear Filters" affordance: it only appears when clearing
    /// would change the result.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.query.as_deref().is_some_and(|q| !q.is_empty())
            || self.category.is_some()
            || self.band.is_some()
    }

    /// Whether a sweet satisfies every active filter input (conjunction).
    ///
    /// The text predicate is a case-insensitive substring match against name,
    /// category, or description; a sweet without a description simply cannot
    /// match on the description leg. The category predicate is exact and
    /// case-sensitive.
    #[must_use]
    pub fn matches(&self, sweet: &Sweet) -> bool {
        if let Some(query) = self.query.as_deref()
            && !query.is_empty()
        {
            let needle = query.to_lowercase();
            let in_name = sweet.name.to_lowercase().contains(&needle);
            let in_category = sweet.category.to_lowercase().contains(&needle);
            let in_description = sweet
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !(in_name || in_category || in_description) {
                return false;
            }
        }

        if let Some(category) = self.category.as_deref()
            && sweet.category != category
        {
            return false;
        }

        if let Some(band) = self.band
            && !band.contains(sweet.price)
        {
            return false;
        }

        true
    }
}

/// Select the sweets satisfying `filter`, preserving the input order.
#[must_use]
pub fn filter_sweets<'a>(sweets: &'a [Sweet], filter: &CatalogFilter) -> Vec<&'a Sweet> {
    sweets.iter().filter(|sweet| filter.matches(sweet)).collect()
}

/// Distinct category labels in order of first occurrence.
///
/// Populates the category selector, so the order tracks the catalog order
/// rather than being alphabetized.
#[must_use]
pub fn distinct_categories(sweets: &[Sweet]) -> Vec<String> {
    let mut categories = Vec::new();
    for sweet in sweets {
        if !categories.contains(&sweet.category) {
            categories.push(sweet.category.clone());
        }
    }
    categories
}
