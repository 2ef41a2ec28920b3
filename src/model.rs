//! Entity rows, validated inputs, and API representations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

/// Order row as stored, without its products.
#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct OrderRecord {
    pub id: i64,
    pub user_id: i64,
    pub order_date: DateTime<Utc>,
}

/// Order as returned by the API: the row plus its associated products ordered by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub order_date: DateTime<Utc>,
    pub products: Vec<Product>,
}

impl Order {
    pub fn from_record(record: OrderRecord, products: Vec<Product>) -> Self {
        Order {
            id: record.id,
            user_id: record.user_id,
            order_date: record.order_date,
            products,
        }
    }
}

/// One product joined to the order it belongs to. Used to batch-load products for many orders.
#[derive(Clone, Debug, FromRow)]
pub struct OrderProductRow {
    pub order_id: i64,
    pub id: i64,
    pub name: String,
    pub price: f64,
}

impl OrderProductRow {
    pub fn into_parts(self) -> (i64, Product) {
        (
            self.order_id,
            Product {
                id: self.id,
                name: self.name,
                price: self.price,
            },
        )
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, ToSchema)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// Partial user update. `address: Some(None)` clears the address.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<Option<String>>,
}

impl UserPatch {
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(address) = &self.address {
            user.address = address.clone();
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, ToSchema)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
}

impl ProductPatch {
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, ToSchema)]
pub struct NewOrder {
    pub user_id: i64,
    /// Defaults to the time of creation.
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderPatch {
    pub user_id: Option<i64>,
    pub order_date: Option<DateTime<Utc>>,
}

impl OrderPatch {
    pub fn apply(&self, order: &mut OrderRecord) {
        if let Some(user_id) = self.user_id {
            order.user_id = user_id;
        }
        if let Some(order_date) = self.order_date {
            order.order_date = order_date;
        }
    }
}

/// Pagination for list endpoints. Limit defaults to 100 and is capped at 1000.
#[derive(Clone, Copy, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Page {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 100;
    pub const MAX_LIMIT: u32 = 1000;

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).min(Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }
}
