mod json_object;
mod query_params;

pub use json_object::JsonObject;
pub use query_params::QueryParams;
