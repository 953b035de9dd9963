#![doc = include_str!("../README.md")]

pub mod db;
pub mod error;
pub mod logger;
pub mod options;
pub mod utils;

// Re-exports for convenience
pub use db::adapter::Adapter;
pub use db::models::{Account, IdentityLink, Session};
pub use error::{ApiError, ErrorCode, OmnilinkError};
pub use logger::{LinkLogger, LogHandler, LogLevel, LoggerConfig};
pub use options::OmnilinkOptions;
