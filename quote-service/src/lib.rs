pub mod config;
pub mod models;
pub mod service;

pub use config::{LogFormat, ServiceConfig};
pub use service::{AppState, build_router, create_app};
