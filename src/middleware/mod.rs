mod cache;
mod guards;
mod json_error;
mod panic;

pub use cache::response_cache_middleware;
pub use guards::BearerToken;
pub use json_error::json_error_middleware;
pub use panic::catch_panic_layer;
