//! User, product and order routes.

use crate::handlers::{orders, products, users};
use crate::state::AppState;
use axum::{routing::get, routing::put, Router};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/:id",
            get(users::read)
                .put(users::update)
                .patch(users::update)
                .delete(users::delete),
        )
        .route("/users/:id/orders", get(users::orders))
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/:id",
            get(products::read)
                .put(products::update)
                .patch(products::update)
                .delete(products::delete),
        )
        .route("/orders", get(orders::list).post(orders::create))
        .route(
            "/orders/:id",
            get(orders::read)
                .put(orders::update)
                .patch(orders::update)
                .delete(orders::delete),
        )
        .route("/orders/:id/products", get(orders::products))
        .route(
            "/orders/:id/products/:product_id",
            put(orders::add_product).delete(orders::remove_product),
        )
        .with_state(state)
}
