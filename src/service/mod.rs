//! Entity services: existence checks and store calls behind the handlers.

mod orders;
mod products;
mod users;
mod validation;

pub use orders::OrderService;
pub use products::ProductService;
pub use users::UserService;
pub use validation::{is_valid_email, parse_timestamp, RequestValidator, ValidationErrors};
