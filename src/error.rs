//! Error taxonomy for provisioning and reporting.

use crate::config::ConfigError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

// SQLite primary result codes (extended codes carry these in the low byte).
const SQLITE_PERM: i32 = 3;
const SQLITE_READONLY: i32 = 8;
const SQLITE_CANTOPEN: i32 = 14;
const SQLITE_AUTH: i32 = 23;

/// Failure to reach or open the database.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Access denied for user '{user}': {source}")]
    AccessDenied {
        user: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("Database '{database}' does not exist at {}", path.display())]
    UnknownDatabase { database: String, path: PathBuf },
    #[error("Host '{host}' is unreachable: {source}")]
    HostUnreachable {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("Database error: {0}")]
    Other(#[source] sqlx::Error),
}

/// Coarse category used for the operator-facing exit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Configuration,
    AccessDenied,
    UnknownDatabase,
    Other,
}

impl ConnectionError {
    /// Classify a driver error raised while opening `database` as `user`.
    pub fn classify(err: sqlx::Error, user: &str, database: &str, path: PathBuf) -> Self {
        let primary_code = match &err {
            sqlx::Error::Database(db_err) => db_err
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .map(|code| code & 0xff),
            _ => None,
        };
        let permission_denied =
            matches!(&err, sqlx::Error::Io(io_err) if io_err.kind() == io::ErrorKind::PermissionDenied);

        match primary_code {
            Some(SQLITE_PERM | SQLITE_READONLY | SQLITE_AUTH) => ConnectionError::AccessDenied {
                user: user.to_string(),
                source: err,
            },
            Some(SQLITE_CANTOPEN) if !path.exists() => ConnectionError::UnknownDatabase {
                database: database.to_string(),
                path,
            },
            _ if permission_denied => ConnectionError::AccessDenied {
                user: user.to_string(),
                source: err,
            },
            _ => ConnectionError::Other(err),
        }
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            ConnectionError::AccessDenied { .. } => FailureCategory::AccessDenied,
            ConnectionError::UnknownDatabase { .. } => FailureCategory::UnknownDatabase,
            ConnectionError::HostUnreachable { .. } | ConnectionError::Other(_) => {
                FailureCategory::Other
            }
        }
    }
}

/// A mutating or DDL statement failed.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Statement on table {table} failed: {source}")]
    Statement {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("Table {table}: no {parent} row named '{name}'")]
    UnresolvedParent {
        table: &'static str,
        parent: &'static str,
        name: String,
    },
    #[error("Transaction failed: {0}")]
    Transaction(#[source] sqlx::Error),
    #[error("Unknown table: {0}")]
    UnknownTable(String),
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl QueryError {
    pub fn statement(table: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| QueryError::Statement { table, source }
    }

    /// True when the driver rejected the statement for a constraint violation.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            QueryError::Statement {
                source: sqlx::Error::Database(db_err),
                ..
            } => {
                db_err.is_foreign_key_violation()
                    || db_err.is_unique_violation()
                    || db_err.is_check_violation()
                    || db_err.message().contains("constraint failed")
            }
            _ => false,
        }
    }
}

/// A read-only report failed; remaining reports are not run.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report '{report}' query failed: {source}")]
    Query {
        report: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("Report '{report}' output failed: {source}")]
    Output {
        report: &'static str,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Query error: {0}")]
    Query(#[from] QueryError),
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
    #[error("Output error: {0}")]
    Output(#[from] io::Error),
}

impl AppError {
    pub fn category(&self) -> FailureCategory {
        match self {
            AppError::Config(_) => FailureCategory::Configuration,
            AppError::Connection(err) => err.category(),
            AppError::Query(_) | AppError::Report(_) | AppError::Output(_) => {
                FailureCategory::Other
            }
        }
    }
}
