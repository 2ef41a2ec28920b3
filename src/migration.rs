//! DDL for the commerce schema and database bootstrap.
//! Tables are created in foreign-key dependency order; every statement is idempotent.

use crate::error::{AppError, ConfigError};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

const DDL: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(120) NOT NULL,
            email VARCHAR(255) NOT NULL UNIQUE,
            address VARCHAR(255)
        )
        "#,
    ),
    (
        "products",
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(200) NOT NULL,
            price DOUBLE PRECISION NOT NULL,
            CONSTRAINT products_price_non_negative CHECK (price >= 0)
        )
        "#,
    ),
    (
        "orders",
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            order_date TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "orders_user_id_idx",
        "CREATE INDEX IF NOT EXISTS orders_user_id_idx ON orders USING btree (user_id)",
    ),
    (
        "order_products",
        r#"
        CREATE TABLE IF NOT EXISTS order_products (
            order_id BIGINT NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
            product_id BIGINT NOT NULL REFERENCES products (id) ON DELETE CASCADE,
            PRIMARY KEY (order_id, product_id)
        )
        "#,
    ),
];

/// Create the users, products, orders and order_products relations if they do not exist.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), AppError> {
    for &(name, sql) in DDL {
        tracing::debug!(object = %name, "migrate");
        sqlx::query(sql).execute(pool).await?;
    }
    tracing::info!(objects = DDL.len(), "schema ready");
    Ok(())
}

/// Create the database named in `database_url` when missing, via the `postgres` maintenance database.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|_| invalid_url(database_url))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Split a connection URL into the `postgres` maintenance URL and the target database name.
/// Connection options after `?` are carried over to the maintenance URL.
fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let (location, options) = match url.split_once('?') {
        Some((location, options)) => (location, Some(options)),
        None => (url, None),
    };
    let slash = location.rfind('/').ok_or_else(|| invalid_url(url))?;
    let (base, db_name) = location.split_at(slash + 1);
    if base.ends_with("//") {
        // host only, no database segment
        return Ok((url.to_string(), String::new()));
    }
    let admin_url = match options {
        Some(options) => format!("{}postgres?{}", base, options),
        None => format!("{}postgres", base),
    };
    Ok((admin_url, db_name.trim().to_string()))
}

fn invalid_url(url: &str) -> AppError {
    AppError::Config(ConfigError::Invalid {
        key: "DATABASE_URL",
        value: url.to_string(),
    })
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
