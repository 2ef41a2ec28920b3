//! In-process store with the same constraints as the PostgreSQL schema.

use super::Store;
use crate::error::AppError;
use crate::model::{
    NewOrder, NewProduct, NewUser, OrderPatch, OrderRecord, Page, Product, ProductPatch, User, UserPatch,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    products: BTreeMap<i64, Product>,
    orders: BTreeMap<i64, OrderRecord>,
    /// (order_id, product_id)
    order_products: BTreeSet<(i64, i64)>,
    last_user_id: i64,
    last_product_id: i64,
    last_order_id: i64,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn remove_order(&mut self, id: i64) -> bool {
        self.order_products.retain(|(order_id, _)| *order_id != id);
        self.orders.remove(&id).is_some()
    }
}

fn page_of<T: Clone>(rows: &BTreeMap<i64, T>, page: Page) -> Vec<T> {
    rows.values()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect()
}

fn email_conflict(email: &str) -> AppError {
    AppError::Conflict(format!("email '{}' already in use", email))
}

fn missing_user(user_id: i64) -> AppError {
    AppError::Conflict(format!("user {} does not exist", user_id))
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list_users(&self, page: Page) -> Result<Vec<User>, AppError> {
        Ok(page_of(&self.tables.lock().await.users, page))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.email_taken(&user.email, None) {
            return Err(email_conflict(&user.email));
        }
        tables.last_user_id += 1;
        let row = User {
            id: tables.last_user_id,
            name: user.name.clone(),
            email: user.email.clone(),
            address: user.address.clone(),
        };
        tables.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_user(&self, id: i64, patch: &UserPatch) -> Result<Option<User>, AppError> {
        let mut tables = self.tables.lock().await;
        if let Some(email) = &patch.email {
            if tables.email_taken(email, Some(id)) {
                return Err(email_conflict(email));
            }
        }
        Ok(tables.users.get_mut(&id).map(|user| {
            patch.apply(user);
            user.clone()
        }))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        let owned: Vec<i64> = tables
            .orders
            .values()
            .filter(|o| o.user_id == id)
            .map(|o| o.id)
            .collect();
        for order_id in owned {
            tables.remove_order(order_id);
        }
        Ok(true)
    }

    async fn list_products(&self, page: Page) -> Result<Vec<Product>, AppError> {
        Ok(page_of(&self.tables.lock().await.products, page))
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, AppError> {
        Ok(self.tables.lock().await.products.get(&id).cloned())
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<Product, AppError> {
        let mut tables = self.tables.lock().await;
        tables.last_product_id += 1;
        let row = Product {
            id: tables.last_product_id,
            name: product.name.clone(),
            price: product.price,
        };
        tables.products.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_product(&self, id: i64, patch: &ProductPatch) -> Result<Option<Product>, AppError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.products.get_mut(&id).map(|product| {
            patch.apply(product);
            product.clone()
        }))
    }

    async fn delete_product(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        tables.order_products.retain(|(_, product_id)| *product_id != id);
        Ok(tables.products.remove(&id).is_some())
    }

    async fn list_orders(&self, page: Page) -> Result<Vec<OrderRecord>, AppError> {
        Ok(page_of(&self.tables.lock().await.orders, page))
    }

    async fn get_order(&self, id: i64) -> Result<Option<OrderRecord>, AppError> {
        Ok(self.tables.lock().await.orders.get(&id).cloned())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<OrderRecord, AppError> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&order.user_id) {
            return Err(missing_user(order.user_id));
        }
        tables.last_order_id += 1;
        let row = OrderRecord {
            id: tables.last_order_id,
            user_id: order.user_id,
            order_date: order.order_date.unwrap_or_else(Utc::now),
        };
        tables.orders.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_order(&self, id: i64, patch: &OrderPatch) -> Result<Option<OrderRecord>, AppError> {
        let mut tables = self.tables.lock().await;
        if let Some(user_id) = patch.user_id {
            if !tables.users.contains_key(&user_id) {
                return Err(missing_user(user_id));
            }
        }
        Ok(tables.orders.get_mut(&id).map(|order| {
            patch.apply(order);
            order.clone()
        }))
    }

    async fn delete_order(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.lock().await.remove_order(id))
    }

    async fn orders_for_user(&self, user_id: i64) -> Result<Vec<OrderRecord>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn add_order_product(&self, order_id: i64, product_id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        if !tables.orders.contains_key(&order_id) || !tables.products.contains_key(&product_id) {
            return Err(AppError::Conflict(format!(
                "order {} or product {} does not exist",
                order_id, product_id
            )));
        }
        Ok(tables.order_products.insert((order_id, product_id)))
    }

    async fn remove_order_product(&self, order_id: i64, product_id: i64) -> Result<bool, AppError> {
        Ok(self
            .tables
            .lock()
            .await
            .order_products
            .remove(&(order_id, product_id)))
    }

    async fn products_for_order(&self, order_id: i64) -> Result<Vec<Product>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .order_products
            .range((order_id, i64::MIN)..=(order_id, i64::MAX))
            .filter_map(|(_, product_id)| tables.products.get(product_id).cloned())
            .collect())
    }

    async fn products_for_orders(&self, order_ids: &[i64]) -> Result<Vec<(i64, Product)>, AppError> {
        let wanted: BTreeSet<i64> = order_ids.iter().copied().collect();
        let tables = self.tables.lock().await;
        Ok(tables
            .order_products
            .iter()
            .filter(|(order_id, _)| wanted.contains(order_id))
            .filter_map(|(order_id, product_id)| {
                tables
                    .products
                    .get(product_id)
                    .map(|p| (*order_id, p.clone()))
            })
            .collect())
    }
}
