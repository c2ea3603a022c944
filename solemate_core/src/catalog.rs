//! Read-only catalog projections and the query used to look them up.

use serde::{Deserialize, Serialize};

/// A product as seen by the conversation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogFact {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub price: f64,
    pub in_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Inclusive price bounds. Both ends open means "any price".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}

/// Lowercase `text` and collapse punctuation and whitespace runs to single
/// spaces, so "Dr. Martens" and "dr martens" compare equal.
#[must_use]
pub fn normalize_term(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Catalog terms extracted from a user's message.
///
/// Brands and categories are stored in [`normalize_term`] form, keywords
/// lowercase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub brands: Vec<String>,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
    pub price: PriceRange,
    /// Ids named explicitly in the message; resolved with `get`.
    pub product_ids: Vec<String>,
}

impl CatalogQuery {
    /// Whether there is anything to `search` for. Explicit ids are looked up
    /// separately and do not count.
    #[must_use]
    pub fn has_search_terms(&self) -> bool {
        !self.brands.is_empty()
            || !self.categories.is_empty()
            || !self.keywords.is_empty()
            || !self.price.is_unbounded()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.has_search_terms() && self.product_ids.is_empty()
    }

    /// Whether `fact` satisfies every constraint in the query.
    ///
    /// Each non-empty term group must match at least one of its entries;
    /// keywords are matched as substrings of the product name. A query
    /// without search terms matches nothing.
    #[must_use]
    pub fn matches(&self, fact: &CatalogFact) -> bool {
        if !self.has_search_terms() {
            return false;
        }

        let brand = normalize_term(&fact.brand);
        let category = normalize_term(&fact.category);
        let name = fact.name.to_lowercase();

        let brand_ok = self.brands.is_empty() || self.brands.iter().any(|b| *b == brand);
        let category_ok =
            self.categories.is_empty() || self.categories.iter().any(|c| *c == category);
        let keyword_ok =
            self.keywords.is_empty() || self.keywords.iter().any(|k| name.contains(k.as_str()));

        brand_ok && category_ok && keyword_ok && self.price.contains(fact.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(id: &str, name: &str, brand: &str, category: &str, price: f64) -> CatalogFact {
        CatalogFact {
            id: id.to_string(),
            name: name.to_string(),
            brand: brand.to_string(),
            category: category.to_string(),
            price,
            in_stock: true,
            size: None,
            color: None,
        }
    }

    #[test]
    fn test_price_range_bounds_are_inclusive() {
        let range = PriceRange {
            min: Some(50.0),
            max: Some(100.0),
        };
        assert!(range.contains(50.0));
        assert!(range.contains(100.0));
        assert!(!range.contains(100.01));
        assert!(!range.contains(49.99));
        assert!(PriceRange::default().contains(1_000.0));
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let query = CatalogQuery::default();
        assert!(query.is_empty());
        assert!(!query.matches(&fact("1", "Nike Air", "Nike", "Running", 120.0)));
    }

    #[test]
    fn test_brand_match_is_case_insensitive() {
        let query = CatalogQuery {
            brands: vec!["new balance".to_string()],
            ..CatalogQuery::default()
        };
        assert!(query.matches(&fact("5", "574 Core", "New Balance", "Casual", 85.0)));
        assert!(!query.matches(&fact("1", "Pegasus", "Nike", "Running", 120.0)));
    }

    #[test]
    fn test_brand_match_ignores_punctuation() {
        assert_eq!(normalize_term("  Dr. Martens "), "dr martens");

        let query = CatalogQuery {
            brands: vec!["dr martens".to_string()],
            categories: vec!["outdoor".to_string()],
            ..CatalogQuery::default()
        };
        assert!(query.matches(&fact("9", "1460 Boot", "Dr. Martens", "Outdoor", 170.0)));
    }

    #[test]
    fn test_all_term_groups_must_match() {
        let query = CatalogQuery {
            brands: vec!["nike".to_string()],
            categories: vec!["running".to_string()],
            price: PriceRange {
                min: None,
                max: Some(100.0),
            },
            ..CatalogQuery::default()
        };
        assert!(!query.matches(&fact("1", "Pegasus", "Nike", "Running", 120.0)));
        assert!(query.matches(&fact("2", "Revolution", "Nike", "Running", 65.0)));
        assert!(!query.matches(&fact("3", "Court", "Nike", "Casual", 65.0)));
    }

    #[test]
    fn test_keywords_match_product_names() {
        let query = CatalogQuery {
            keywords: vec!["pegasus".to_string()],
            ..CatalogQuery::default()
        };
        assert!(query.matches(&fact("1", "Nike Air Zoom Pegasus 39", "Nike", "Running", 120.0)));
        assert!(!query.matches(&fact("2", "Ultraboost 22", "Adidas", "Running", 180.0)));
    }

    #[test]
    fn test_ids_alone_are_not_search_terms() {
        let query = CatalogQuery {
            product_ids: vec!["3".to_string()],
            ..CatalogQuery::default()
        };
        assert!(!query.has_search_terms());
        assert!(!query.is_empty());
    }
}
