use solemate_catalog::seed_catalog;

use super::init_common_components;

/// Loads the demo products when the catalog is empty.
#[derive(Debug, Clone, Copy)]
pub struct SeedStrategy;

impl super::CommandStrategy for SeedStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components().await?;

        match seed_catalog(&common.db).await? {
            0 => println!("Catalog already has products, nothing to seed"),
            n => println!("Seeded {n} demo products"),
        }
        Ok(())
    }
}
