pub mod ai;
pub mod api;
pub mod config;
pub mod rag;
pub mod server;

pub use config::Config;
