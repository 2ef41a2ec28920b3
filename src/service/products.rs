use crate::error::AppError;
use crate::model::{NewProduct, Page, Product, ProductPatch};
use crate::store::Store;

pub struct ProductService;

impl ProductService {
    pub async fn list(store: &dyn Store, page: Page) -> Result<Vec<Product>, AppError> {
        store.list_products(page).await
    }

    pub async fn get(store: &dyn Store, id: i64) -> Result<Product, AppError> {
        store
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", id)))
    }

    pub async fn create(store: &dyn Store, input: &NewProduct) -> Result<Product, AppError> {
        let product = store.insert_product(input).await?;
        tracing::info!(product_id = product.id, "product created");
        Ok(product)
    }

    pub async fn update(store: &dyn Store, id: i64, patch: &ProductPatch) -> Result<Product, AppError> {
        store
            .update_product(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", id)))
    }

    /// Orders that contained the product keep existing; only their association rows go.
    pub async fn delete(store: &dyn Store, id: i64) -> Result<(), AppError> {
        if !store.delete_product(id).await? {
            return Err(AppError::NotFound(format!("product {}", id)));
        }
        tracing::info!(product_id = id, "product deleted");
        Ok(())
    }
}
