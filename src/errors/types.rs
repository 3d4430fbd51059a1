//! Error type definitions for the tagwatch application
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system that makes debugging and error
//! handling more straightforward.

use thiserror::Error;

/// Top-level application error type
///
/// This enum represents all possible errors that can occur in the application.
/// It uses `thiserror` to provide automatic error trait implementations and
/// proper error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository layer errors
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Provider (video search/metadata API) errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Repository layer specific errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// SQL query execution failures
    #[error("Query failed: {query} - {message}")]
    QueryFailed { query: String, message: String },

    /// A column the operation depends on is absent or has the wrong type.
    /// There is no safe default index, so the operation aborts.
    #[error("Missing or invalid column: {table}.{column} - {message}")]
    InvalidColumn {
        table: String,
        column: String,
        message: String,
    },

    /// A stored value could not be interpreted as its model type
    #[error("Invalid stored value: {table}.{column} = {value}")]
    InvalidValue {
        table: String,
        column: String,
        value: String,
    },
}

/// Source (provider) layer specific errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Non-success HTTP status from the provider
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Network-level request failure (connect, timeout, TLS)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body could not be decoded into the expected shape
    #[error("Parse error: {context} - {message}")]
    Parse { context: String, message: String },
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl RepositoryError {
    /// Create a query failed error
    pub fn query_failed<Q: Into<String>, M: Into<String>>(query: Q, message: M) -> Self {
        Self::QueryFailed {
            query: query.into(),
            message: message.into(),
        }
    }

    /// Create an invalid column error
    pub fn invalid_column<T, C, M>(table: T, column: C, message: M) -> Self
    where
        T: Into<String>,
        C: Into<String>,
        M: Into<String>,
    {
        Self::InvalidColumn {
            table: table.into(),
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value<T, C, V>(table: T, column: C, value: V) -> Self
    where
        T: Into<String>,
        C: Into<String>,
        V: Into<String>,
    {
        Self::InvalidValue {
            table: table.into(),
            column: column.into(),
            value: value.into(),
        }
    }
}

impl SourceError {
    /// Create a parse error
    pub fn parse<C: Into<String>, M: Into<String>>(context: C, message: M) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.into(),
        }
    }
}
