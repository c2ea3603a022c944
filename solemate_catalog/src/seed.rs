//! Demo catalog loaded into an empty products table.

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use solemate_core::CatalogFact;
use solemate_entities::products;
use tracing::info;

/// A product row that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: &'static str,
    pub brand: &'static str,
    pub category: &'static str,
    pub size: &'static str,
    pub color: &'static str,
    pub price: f64,
    pub stock: i32,
    pub description: &'static str,
}

impl NewProduct {
    /// Project into a fact under `id`, for in-memory catalogs.
    #[must_use]
    pub fn into_fact(self, id: &str) -> CatalogFact {
        CatalogFact {
            id: id.to_string(),
            name: self.name.to_string(),
            brand: self.brand.to_string(),
            category: self.category.to_string(),
            price: self.price,
            in_stock: self.stock > 0,
            size: Some(self.size.to_string()),
            color: Some(self.color.to_string()),
        }
    }

    fn into_active_model(self) -> products::ActiveModel {
        products::ActiveModel {
            name: Set(self.name.to_string()),
            brand: Set(self.brand.to_string()),
            category: Set(self.category.to_string()),
            size: Set(Some(self.size.to_string())),
            color: Set(Some(self.color.to_string())),
            price: Set(self.price),
            stock: Set(self.stock),
            description: Set(Some(self.description.to_string())),
            ..Default::default()
        }
    }
}

#[must_use]
pub fn demo_products() -> Vec<NewProduct> {
    vec![
        NewProduct {
            name: "Nike Air Zoom Pegasus 39",
            brand: "Nike",
            category: "Running",
            size: "42",
            color: "Black",
            price: 120.0,
            stock: 15,
            description: "Light, comfortable trainers for demanding runners.",
        },
        NewProduct {
            name: "Adidas Ultraboost 22",
            brand: "Adidas",
            category: "Running",
            size: "41",
            color: "White",
            price: 180.0,
            stock: 10,
            description: "Superior cushioning with a modern design.",
        },
        NewProduct {
            name: "Puma Smash V2",
            brand: "Puma",
            category: "Casual",
            size: "43",
            color: "Blue",
            price: 70.0,
            stock: 20,
            description: "Classic style with an urban touch, made for every day.",
        },
        NewProduct {
            name: "Converse Chuck Taylor All Star",
            brand: "Converse",
            category: "Casual",
            size: "42",
            color: "Red",
            price: 60.0,
            stock: 25,
            description: "The iconic canvas sneakers that never go out of style.",
        },
        NewProduct {
            name: "New Balance 574 Core",
            brand: "New Balance",
            category: "Casual",
            size: "44",
            color: "Gray",
            price: 85.0,
            stock: 18,
            description: "Retro comfort built from high quality materials.",
        },
        NewProduct {
            name: "Reebok Nano X3",
            brand: "Reebok",
            category: "Training",
            size: "42",
            color: "Black",
            price: 130.0,
            stock: 12,
            description: "Built for intense workouts, durable and stable.",
        },
        NewProduct {
            name: "Under Armour HOVR Sonic 5",
            brand: "Under Armour",
            category: "Running",
            size: "40",
            color: "Gray",
            price: 140.0,
            stock: 8,
            description: "HOVR cushioning that returns energy with every stride.",
        },
        NewProduct {
            name: "Vans Old Skool",
            brand: "Vans",
            category: "Casual",
            size: "41",
            color: "Black",
            price: 75.0,
            stock: 30,
            description: "Classic skate style on a tough waffle sole.",
        },
        NewProduct {
            name: "Clarks Tilden Cap",
            brand: "Clarks",
            category: "Formal",
            size: "43",
            color: "Brown",
            price: 110.0,
            stock: 9,
            description: "Smart leather shoes for the office or special events.",
        },
        NewProduct {
            name: "Timberland Premium 6-Inch Boot",
            brand: "Timberland",
            category: "Outdoor",
            size: "44",
            color: "Beige",
            price: 200.0,
            stock: 6,
            description: "Waterproof boots made for outdoor adventures.",
        },
    ]
}

/// Insert the demo products when the table is empty.
///
/// Returns the number of rows inserted; an already populated catalog is left
/// untouched.
pub async fn seed_catalog(db: &DatabaseConnection) -> anyhow::Result<usize> {
    solemate_entities::ensure_table(db, products::Entity).await?;

    let existing = products::Entity::find().count(db).await?;
    if existing > 0 {
        info!("Catalog already holds {existing} products, skipping seed");
        return Ok(0);
    }

    let rows = demo_products();
    let inserted = rows.len();
    for row in rows {
        row.into_active_model().insert(db).await?;
    }

    info!("Seeded catalog with {inserted} products");
    Ok(inserted)
}
