mod error;
pub mod thumbnail;

pub use error::ApiError;
