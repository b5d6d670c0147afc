//! HTTP Layer - axum 服务器与路由表适配

pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use routes::{create_routes, register_all, Capabilities};
pub use server::{HttpServer, ServerConfig};
pub use state::AppState;
