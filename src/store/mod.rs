//! Persistence behind a trait so handlers get their store injected through `AppState`.
//!
//! `PgStore` is the production implementation. `MemoryStore` holds the same constraints
//! (unique email, foreign keys, cascades, association pair key) in process memory.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::AppError;
use crate::model::{
    NewOrder, NewProduct, NewUser, OrderPatch, OrderRecord, Page, Product, ProductPatch, User, UserPatch,
};
use async_trait::async_trait;

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round trip used by `/ready`.
    async fn ping(&self) -> Result<(), AppError>;

    async fn list_users(&self, page: Page) -> Result<Vec<User>, AppError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn insert_user(&self, user: &NewUser) -> Result<User, AppError>;
    async fn update_user(&self, id: i64, patch: &UserPatch) -> Result<Option<User>, AppError>;
    /// Cascades to the user's orders and their association rows. False when no such user.
    async fn delete_user(&self, id: i64) -> Result<bool, AppError>;

    async fn list_products(&self, page: Page) -> Result<Vec<Product>, AppError>;
    async fn get_product(&self, id: i64) -> Result<Option<Product>, AppError>;
    async fn insert_product(&self, product: &NewProduct) -> Result<Product, AppError>;
    async fn update_product(&self, id: i64, patch: &ProductPatch) -> Result<Option<Product>, AppError>;
    /// Removes the product's association rows; orders stay.
    async fn delete_product(&self, id: i64) -> Result<bool, AppError>;

    async fn list_orders(&self, page: Page) -> Result<Vec<OrderRecord>, AppError>;
    async fn get_order(&self, id: i64) -> Result<Option<OrderRecord>, AppError>;
    async fn insert_order(&self, order: &NewOrder) -> Result<OrderRecord, AppError>;
    async fn update_order(&self, id: i64, patch: &OrderPatch) -> Result<Option<OrderRecord>, AppError>;
    async fn delete_order(&self, id: i64) -> Result<bool, AppError>;
    /// Ordered by order id.
    async fn orders_for_user(&self, user_id: i64) -> Result<Vec<OrderRecord>, AppError>;

    /// True when a row was inserted, false when the pair already existed.
    async fn add_order_product(&self, order_id: i64, product_id: i64) -> Result<bool, AppError>;
    /// True when a row was removed.
    async fn remove_order_product(&self, order_id: i64, product_id: i64) -> Result<bool, AppError>;
    /// Ordered by product id.
    async fn products_for_order(&self, order_id: i64) -> Result<Vec<Product>, AppError>;
    /// Batch variant: (order_id, product) pairs for all given orders, ordered by order id then product id.
    async fn products_for_orders(&self, order_ids: &[i64]) -> Result<Vec<(i64, Product)>, AppError>;
}
