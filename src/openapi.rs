//! OpenAPI document for the REST surface.

use crate::handlers::{orders, products, users};
use crate::model::{NewOrder, NewProduct, NewUser, Order, Product, User};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "commerce-api", description = "Users, products and orders over PostgreSQL"),
    paths(
        users::list,
        users::create,
        users::read,
        users::update,
        users::delete,
        users::orders,
        products::list,
        products::create,
        products::read,
        products::update,
        products::delete,
        orders::list,
        orders::create,
        orders::read,
        orders::update,
        orders::delete,
        orders::products,
        orders::add_product,
        orders::remove_product,
    ),
    components(schemas(User, Product, Order, NewUser, NewProduct, NewOrder)),
    tags(
        (name = "users", description = "User accounts"),
        (name = "products", description = "Product catalogue"),
        (name = "orders", description = "Orders and their products")
    )
)]
pub struct ApiDoc;
