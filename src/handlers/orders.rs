//! Order CRUD handlers and the order/product association handlers.

use super::parse_id;
use crate::error::AppError;
use crate::extractors::{JsonObject, QueryParams};
use crate::model::{NewOrder, Order, Page, Product};
use crate::response::{success_many, success_one, success_one_ok, success_one_with_meta};
use crate::service::{OrderService, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

#[utoipa::path(
    get,
    path = "/orders",
    tag = "orders",
    params(Page),
    responses((status = 200, description = "Orders ordered by id, each with its products", body = [Order]))
)]
pub async fn list(
    State(state): State<AppState>,
    QueryParams(page): QueryParams<Page>,
) -> Result<impl IntoResponse, AppError> {
    let orders = OrderService::list(state.store(), page).await?;
    Ok(success_many(orders))
}

#[utoipa::path(
    post,
    path = "/orders",
    tag = "orders",
    request_body = NewOrder,
    responses(
        (status = 201, body = Order),
        (status = 422, description = "user_id missing or not an existing user")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let input = RequestValidator::new_order(&body)?;
    let order = OrderService::create(state.store(), &input).await?;
    Ok(success_one(order))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "orders",
    params(("id" = i64, Path, description = "Order id")),
    responses((status = 200, body = Order), (status = 404))
)]
pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let order = OrderService::get(state.store(), parse_id(&id_str)?).await?;
    Ok(success_one_ok(order))
}

#[utoipa::path(
    put,
    path = "/orders/{id}",
    tag = "orders",
    params(("id" = i64, Path, description = "Order id")),
    request_body(content = Object, description = "Any subset of user_id, order_date"),
    responses((status = 200, body = Order), (status = 404), (status = 422))
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let patch = RequestValidator::order_patch(&body)?;
    let order = OrderService::update(state.store(), id, &patch).await?;
    Ok(success_one_ok(order))
}

#[utoipa::path(
    delete,
    path = "/orders/{id}",
    tag = "orders",
    params(("id" = i64, Path, description = "Order id")),
    responses((status = 204), (status = 404))
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    OrderService::delete(state.store(), parse_id(&id_str)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/orders/{id}/products",
    tag = "orders",
    params(("id" = i64, Path, description = "Order id")),
    responses((status = 200, description = "Products ordered by id", body = [Product]), (status = 404))
)]
pub async fn products(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let products = OrderService::products(state.store(), parse_id(&id_str)?).await?;
    Ok(success_many(products))
}

#[utoipa::path(
    put,
    path = "/orders/{id}/products/{product_id}",
    tag = "orders",
    params(
        ("id" = i64, Path, description = "Order id"),
        ("product_id" = i64, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Order after the add; meta.added is false when the product was already on it", body = Order),
        (status = 404, description = "No such order or product")
    )
)]
pub async fn add_product(
    State(state): State<AppState>,
    Path((id_str, product_id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let (order_id, product_id) = (parse_id(&id_str)?, parse_id(&product_id_str)?);
    let (order, added) = OrderService::add_product(state.store(), order_id, product_id).await?;
    Ok(success_one_with_meta(order, Some(serde_json::json!({ "added": added }))))
}

#[utoipa::path(
    delete,
    path = "/orders/{id}/products/{product_id}",
    tag = "orders",
    params(
        ("id" = i64, Path, description = "Order id"),
        ("product_id" = i64, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Order after the removal", body = Order),
        (status = 404, description = "No such order or product, or the product is not on the order")
    )
)]
pub async fn remove_product(
    State(state): State<AppState>,
    Path((id_str, product_id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let (order_id, product_id) = (parse_id(&id_str)?, parse_id(&product_id_str)?);
    let order = OrderService::remove_product(state.store(), order_id, product_id).await?;
    Ok(success_one_ok(order))
}
