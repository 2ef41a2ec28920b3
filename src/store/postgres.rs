//! PostgreSQL store. Every statement is explicit SQL with bound parameters.

use super::Store;
use crate::error::AppError;
use crate::model::{
    NewOrder, NewProduct, NewUser, OrderPatch, OrderProductRow, OrderRecord, Page, Product,
    ProductPatch, User, UserPatch,
};
use async_trait::async_trait;
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

fn traced(sql: &'static str) -> &'static str {
    tracing::debug!(sql = %sql, "query");
    sql
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query(traced("SELECT 1")).execute(&self.pool).await?;
        Ok(())
    }

    async fn list_users(&self, page: Page) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, User>(traced(
            "SELECT id, name, email, address FROM users ORDER BY id LIMIT $1 OFFSET $2",
        ))
        .bind(i64::from(page.limit()))
        .bind(i64::from(page.offset()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, User>(traced(
            "SELECT id, name, email, address FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, User>(traced(
            "SELECT id, name, email, address FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, User>(traced(
            "INSERT INTO users (name, email, address) VALUES ($1, $2, $3) \
             RETURNING id, name, email, address",
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.address)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_user(&self, id: i64, patch: &UserPatch) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, User>(traced(
            "UPDATE users SET name = COALESCE($2, name), email = COALESCE($3, email), \
             address = CASE WHEN $4 THEN $5 ELSE address END \
             WHERE id = $1 RETURNING id, name, email, address",
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.email)
        .bind(patch.address.is_some())
        .bind(patch.address.clone().flatten())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(traced("DELETE FROM users WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_products(&self, page: Page) -> Result<Vec<Product>, AppError> {
        let rows = sqlx::query_as::<_, Product>(traced(
            "SELECT id, name, price FROM products ORDER BY id LIMIT $1 OFFSET $2",
        ))
        .bind(i64::from(page.limit()))
        .bind(i64::from(page.offset()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, AppError> {
        let row = sqlx::query_as::<_, Product>(traced(
            "SELECT id, name, price FROM products WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<Product, AppError> {
        let row = sqlx::query_as::<_, Product>(traced(
            "INSERT INTO products (name, price) VALUES ($1, $2) RETURNING id, name, price",
        ))
        .bind(&product.name)
        .bind(product.price)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_product(
        &self,
        id: i64,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, AppError> {
        let row = sqlx::query_as::<_, Product>(traced(
            "UPDATE products SET name = COALESCE($2, name), price = COALESCE($3, price) \
             WHERE id = $1 RETURNING id, name, price",
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(patch.price)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_product(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(traced("DELETE FROM products WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_orders(&self, page: Page) -> Result<Vec<OrderRecord>, AppError> {
        let rows = sqlx::query_as::<_, OrderRecord>(traced(
            "SELECT id, user_id, order_date FROM orders ORDER BY id LIMIT $1 OFFSET $2",
        ))
        .bind(i64::from(page.limit()))
        .bind(i64::from(page.offset()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_order(&self, id: i64) -> Result<Option<OrderRecord>, AppError> {
        let row = sqlx::query_as::<_, OrderRecord>(traced(
            "SELECT id, user_id, order_date FROM orders WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<OrderRecord, AppError> {
        let row = sqlx::query_as::<_, OrderRecord>(traced(
            "INSERT INTO orders (user_id, order_date) VALUES ($1, COALESCE($2, NOW())) \
             RETURNING id, user_id, order_date",
        ))
        .bind(order.user_id)
        .bind(order.order_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_order(
        &self,
        id: i64,
        patch: &OrderPatch,
    ) -> Result<Option<OrderRecord>, AppError> {
        let row = sqlx::query_as::<_, OrderRecord>(traced(
            "UPDATE orders SET user_id = COALESCE($2, user_id), \
             order_date = COALESCE($3, order_date) \
             WHERE id = $1 RETURNING id, user_id, order_date",
        ))
        .bind(id)
        .bind(patch.user_id)
        .bind(patch.order_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_order(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(traced("DELETE FROM orders WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn orders_for_user(&self, user_id: i64) -> Result<Vec<OrderRecord>, AppError> {
        let rows = sqlx::query_as::<_, OrderRecord>(traced(
            "SELECT id, user_id, order_date FROM orders WHERE user_id = $1 ORDER BY id",
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn add_order_product(&self, order_id: i64, product_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(traced(
            "INSERT INTO order_products (order_id, product_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        ))
        .bind(order_id)
        .bind(product_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_order_product(
        &self,
        order_id: i64,
        product_id: i64,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(traced(
            "DELETE FROM order_products WHERE order_id = $1 AND product_id = $2",
        ))
        .bind(order_id)
        .bind(product_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn products_for_order(&self, order_id: i64) -> Result<Vec<Product>, AppError> {
        let rows = sqlx::query_as::<_, Product>(traced(
            "SELECT p.id, p.name, p.price FROM order_products op \
             JOIN products p ON p.id = op.product_id \
             WHERE op.order_id = $1 ORDER BY p.id",
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn products_for_orders(
        &self,
        order_ids: &[i64],
    ) -> Result<Vec<(i64, Product)>, AppError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, OrderProductRow>(traced(
            "SELECT op.order_id, p.id, p.name, p.price FROM order_products op \
             JOIN products p ON p.id = op.product_id \
             WHERE op.order_id = ANY($1) ORDER BY op.order_id, p.id",
        ))
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(OrderProductRow::into_parts).collect())
    }
}
