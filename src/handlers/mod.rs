//! HTTP handlers for user, product and order endpoints.

pub mod orders;
pub mod products;
pub mod users;

use crate::error::AppError;

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", id_str)))
}
