pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod report;

pub use config::Config;
pub use db::{MutationSummary, SchemaProvisioner, SeedSummary, Session, Table};
pub use domain::Fixtures;
pub use error::{AppError, ConnectionError, FailureCategory, QueryError, ReportError};
pub use report::{ReportKind, TabularReporter};
