//! Product CRUD handlers.

use super::parse_id;
use crate::error::AppError;
use crate::extractors::{JsonObject, QueryParams};
use crate::model::{NewProduct, Page, Product};
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::{ProductService, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    params(Page),
    responses((status = 200, description = "Products ordered by id", body = [Product]))
)]
pub async fn list(
    State(state): State<AppState>,
    QueryParams(page): QueryParams<Page>,
) -> Result<impl IntoResponse, AppError> {
    let products = ProductService::list(state.store(), page).await?;
    Ok(success_many(products))
}

#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    request_body = NewProduct,
    responses(
        (status = 201, body = Product),
        (status = 422, description = "Missing name, or price negative or not numeric")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let input = RequestValidator::new_product(&body)?;
    let product = ProductService::create(state.store(), &input).await?;
    Ok(success_one(product))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    responses((status = 200, body = Product), (status = 404))
)]
pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = ProductService::get(state.store(), parse_id(&id_str)?).await?;
    Ok(success_one_ok(product))
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    request_body(content = Object, description = "Any subset of name, price"),
    responses((status = 200, body = Product), (status = 404), (status = 422))
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let patch = RequestValidator::product_patch(&body)?;
    let product = ProductService::update(state.store(), id, &patch).await?;
    Ok(success_one_ok(product))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    responses((status = 204, description = "Product deleted and removed from every order"), (status = 404))
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    ProductService::delete(state.store(), parse_id(&id_str)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
