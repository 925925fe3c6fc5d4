//! Shared types for the Office Hours Oracle daemon and CLI.

pub mod error;
pub mod rpc;
pub mod types;

pub use error::OracleError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
