pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod validation;

#[cfg(test)]
mod test_helpers;

// Re-export key types
pub use routes::build_router;
pub use state::AppState;
