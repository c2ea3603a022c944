use async_trait::async_trait;
use solemate_core::{CatalogError, CatalogFact, CatalogQuery, CatalogStore};

/// Fixed, in-process catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    facts: Vec<CatalogFact>,
}

impl InMemoryCatalog {
    #[must_use]
    pub const fn new(facts: Vec<CatalogFact>) -> Self {
        Self { facts }
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn get(&self, id: &str) -> Result<Option<CatalogFact>, CatalogError> {
        Ok(self.facts.iter().find(|f| f.id == id).cloned())
    }

    async fn search(&self, query: &CatalogQuery) -> Result<Vec<CatalogFact>, CatalogError> {
        Ok(self
            .facts
            .iter()
            .filter(|f| query.matches(f))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<CatalogFact>, CatalogError> {
        Ok(self.facts.clone())
    }
}
