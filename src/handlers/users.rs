//! User CRUD handlers plus the orders-for-user listing.

use super::parse_id;
use crate::error::AppError;
use crate::extractors::{JsonObject, QueryParams};
use crate::model::{NewUser, Order, Page, User};
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::{RequestValidator, UserService};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(Page),
    responses((status = 200, description = "Users ordered by id", body = [User]))
)]
pub async fn list(
    State(state): State<AppState>,
    QueryParams(page): QueryParams<Page>,
) -> Result<impl IntoResponse, AppError> {
    let users = UserService::list(state.store(), page).await?;
    Ok(success_many(users))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = NewUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 409, description = "Email already in use"),
        (status = 422, description = "Invalid name, email or address")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let input = RequestValidator::new_user(&body)?;
    let user = UserService::create(state.store(), &input).await?;
    Ok(success_one(user))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses((status = 200, body = User), (status = 404, description = "No such user"))
)]
pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = UserService::get(state.store(), parse_id(&id_str)?).await?;
    Ok(success_one_ok(user))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    request_body(content = Object, description = "Any subset of name, email, address"),
    responses(
        (status = 200, body = User),
        (status = 404, description = "No such user"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    JsonObject(body): JsonObject,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let patch = RequestValidator::user_patch(&body)?;
    let user = UserService::update(state.store(), id, &patch).await?;
    Ok(success_one_ok(user))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses((status = 204, description = "User and their orders deleted"), (status = 404))
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    UserService::delete(state.store(), parse_id(&id_str)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/users/{id}/orders",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses((status = 200, description = "Orders ordered by id", body = [Order]), (status = 404))
)]
pub async fn orders(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let orders = UserService::orders(state.store(), parse_id(&id_str)?).await?;
    Ok(success_many(orders))
}
