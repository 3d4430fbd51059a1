//! Error type definitions for the tagwatch application

pub mod types;

pub use types::{AppError, RepositoryError, SourceError};

/// Convenience result alias used throughout the crate.
pub type AppResult<T> = Result<T, AppError>;

/// Result alias for the repository layer.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Result alias for the source layer.
pub type SourceResult<T> = Result<T, SourceError>;
