mod api;
pub mod config;
mod http_layers;
mod quotes_routes;
pub mod server;
pub mod state;

pub use api::{ApiError, ApiResponse, Pagination};
pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
