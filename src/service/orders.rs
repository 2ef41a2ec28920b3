use super::{ProductService, ValidationErrors};
use crate::error::AppError;
use crate::model::{NewOrder, Order, OrderPatch, OrderRecord, Page, Product};
use crate::store::Store;
use std::collections::HashMap;

pub struct OrderService;

impl OrderService {
    pub async fn list(store: &dyn Store, page: Page) -> Result<Vec<Order>, AppError> {
        let records = store.list_orders(page).await?;
        Self::with_products(store, records).await
    }

    pub async fn get(store: &dyn Store, id: i64) -> Result<Order, AppError> {
        let record = Self::record(store, id).await?;
        let products = store.products_for_order(id).await?;
        Ok(Order::from_record(record, products))
    }

    /// Rejects the order when `user_id` does not name an existing user.
    pub async fn create(store: &dyn Store, input: &NewOrder) -> Result<Order, AppError> {
        Self::ensure_user_exists(store, input.user_id).await?;
        let record = store.insert_order(input).await?;
        tracing::info!(order_id = record.id, user_id = record.user_id, "order created");
        Ok(Order::from_record(record, Vec::new()))
    }

    pub async fn update(store: &dyn Store, id: i64, patch: &OrderPatch) -> Result<Order, AppError> {
        Self::record(store, id).await?;
        if let Some(user_id) = patch.user_id {
            Self::ensure_user_exists(store, user_id).await?;
        }
        store
            .update_order(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {}", id)))?;
        Self::get(store, id).await
    }

    pub async fn delete(store: &dyn Store, id: i64) -> Result<(), AppError> {
        if !store.delete_order(id).await? {
            return Err(AppError::NotFound(format!("order {}", id)));
        }
        tracing::info!(order_id = id, "order deleted");
        Ok(())
    }

    /// Adding a product already on the order leaves it unchanged. The flag tells whether a row was inserted.
    pub async fn add_product(store: &dyn Store, order_id: i64, product_id: i64) -> Result<(Order, bool), AppError> {
        Self::record(store, order_id).await?;
        ProductService::get(store, product_id).await?;
        let added = store.add_order_product(order_id, product_id).await?;
        tracing::debug!(order_id, product_id, added, "add product to order");
        Ok((Self::get(store, order_id).await?, added))
    }

    pub async fn remove_product(store: &dyn Store, order_id: i64, product_id: i64) -> Result<Order, AppError> {
        Self::record(store, order_id).await?;
        ProductService::get(store, product_id).await?;
        if !store.remove_order_product(order_id, product_id).await? {
            return Err(AppError::NotFound(format!(
                "product {} is not in order {}",
                product_id, order_id
            )));
        }
        tracing::debug!(order_id, product_id, "remove product from order");
        Self::get(store, order_id).await
    }

    pub async fn products(store: &dyn Store, order_id: i64) -> Result<Vec<Product>, AppError> {
        Self::record(store, order_id).await?;
        store.products_for_order(order_id).await
    }

    /// Attach products to many orders with one batch query.
    pub async fn with_products(store: &dyn Store, records: Vec<OrderRecord>) -> Result<Vec<Order>, AppError> {
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        let mut by_order: HashMap<i64, Vec<Product>> = HashMap::new();
        for (order_id, product) in store.products_for_orders(&ids).await? {
            by_order.entry(order_id).or_default().push(product);
        }
        Ok(records
            .into_iter()
            .map(|r| {
                let products = by_order.remove(&r.id).unwrap_or_default();
                Order::from_record(r, products)
            })
            .collect())
    }

    async fn record(store: &dyn Store, id: i64) -> Result<OrderRecord, AppError> {
        store
            .get_order(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {}", id)))
    }

    async fn ensure_user_exists(store: &dyn Store, user_id: i64) -> Result<(), AppError> {
        if store.get_user(user_id).await?.is_none() {
            return Err(ValidationErrors::single("user_id", "does not reference an existing user").into());
        }
        Ok(())
    }
}
