use solemate_conversation::fact_line;

use super::init_common_components;

#[derive(Debug, Clone, Copy)]
pub struct ProductsStrategy;

impl super::CommandStrategy for ProductsStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components().await?;

        let products = common.catalog.list_all().await?;
        if products.is_empty() {
            println!("The catalog is empty. Run 'solemate seed' to load demo products.");
            return Ok(());
        }

        for product in &products {
            println!("{}", fact_line(product));
        }
        println!("\n{} products", products.len());
        Ok(())
    }
}
