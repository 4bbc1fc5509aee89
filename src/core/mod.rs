// Public modules
pub mod convention;
pub mod error;
pub mod output;
pub mod refactor;

// Re-export common types for convenience
pub use convention::Convention;
pub use error::{Error, ErrorCode, Result};
pub use output::{BatchResult, BatchResultItem};
