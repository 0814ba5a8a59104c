pub mod products;
pub mod routes;

pub use routes::{build_router, ApiError, AppState};
