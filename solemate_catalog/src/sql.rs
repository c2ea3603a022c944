use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use solemate_core::{CatalogError, CatalogFact, CatalogQuery, CatalogStore};
use solemate_entities::products;
use tracing::debug;

fn unavailable(err: DbErr) -> CatalogError {
    CatalogError::Unavailable(err.to_string())
}

fn fact_from_model(model: products::Model) -> CatalogFact {
    CatalogFact {
        id: model.id.to_string(),
        name: model.name,
        brand: model.brand,
        category: model.category,
        price: model.price,
        in_stock: model.stock > 0,
        size: model.size,
        color: model.color,
    }
}

/// Catalog read through sea-orm from the `products` table.
///
/// Price bounds are pushed into SQL; brand, category and keyword matching run
/// on the narrowed rows with [`CatalogQuery::matches`] so they behave the same
/// on every backend regardless of its collation.
pub struct SqlCatalogStore {
    db: DatabaseConnection,
}

impl SqlCatalogStore {
    pub async fn new(db: DatabaseConnection) -> anyhow::Result<Self> {
        solemate_entities::ensure_table(&db, products::Entity).await?;
        Ok(Self { db })
    }

    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = solemate_entities::connect(database_url).await?;
        Self::new(db).await
    }

    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl CatalogStore for SqlCatalogStore {
    async fn get(&self, id: &str) -> Result<Option<CatalogFact>, CatalogError> {
        let Ok(pk) = id.trim().parse::<i64>() else {
            return Ok(None);
        };
        let model = products::Entity::find_by_id(pk)
            .one(&self.db)
            .await
            .map_err(unavailable)?;
        Ok(model.map(fact_from_model))
    }

    async fn search(&self, query: &CatalogQuery) -> Result<Vec<CatalogFact>, CatalogError> {
        if !query.has_search_terms() {
            return Ok(Vec::new());
        }

        let mut select = products::Entity::find();
        if let Some(min) = query.price.min {
            select = select.filter(products::Column::Price.gte(min));
        }
        if let Some(max) = query.price.max {
            select = select.filter(products::Column::Price.lte(max));
        }

        let rows = select
            .order_by_asc(products::Column::Id)
            .all(&self.db)
            .await
            .map_err(unavailable)?;
        let scanned = rows.len();

        let facts: Vec<CatalogFact> = rows
            .into_iter()
            .map(fact_from_model)
            .filter(|fact| query.matches(fact))
            .collect();

        debug!("Catalog search matched {} of {} rows", facts.len(), scanned);
        Ok(facts)
    }

    async fn list_all(&self) -> Result<Vec<CatalogFact>, CatalogError> {
        let rows = products::Entity::find()
            .order_by_asc(products::Column::Id)
            .all(&self.db)
            .await
            .map_err(unavailable)?;
        Ok(rows.into_iter().map(fact_from_model).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed_catalog;

    async fn seeded() -> SqlCatalogStore {
        let store = SqlCatalogStore::connect("sqlite::memory:").await.unwrap();
        seed_catalog(store.connection()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = seeded().await;
        assert_eq!(seed_catalog(store.connection()).await.unwrap(), 0);
        assert_eq!(store.list_all().await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_get_by_numeric_id() {
        let store = seeded().await;
        let fact = store.get("1").await.unwrap().unwrap();
        assert_eq!(fact.brand, "Nike");
        assert!(fact.in_stock);
        assert!(store.get("p1").await.unwrap().is_none());
        assert!(store.get("999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_running_under_150() {
        let store = seeded().await;
        let query = CatalogQuery {
            categories: vec!["running".to_string()],
            price: solemate_core::PriceRange {
                min: None,
                max: Some(150.0),
            },
            ..CatalogQuery::default()
        };
        let names: Vec<String> = store
            .search(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, ["Nike Air Zoom Pegasus 39", "Under Armour HOVR Sonic 5"]);
    }

    #[tokio::test]
    async fn test_search_without_terms_is_empty() {
        let store = seeded().await;
        assert!(store.search(&CatalogQuery::default()).await.unwrap().is_empty());
    }
}
