pub mod chat;
pub mod errors;

pub use errors::ApiError;
