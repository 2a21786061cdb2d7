use crate::config::Config;
use crate::db::{SchemaProvisioner, Session};
use crate::domain::Fixtures;
use crate::error::{AppError, FailureCategory};
use crate::report::{ReportKind, TabularReporter};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

/// Bacchus winery schema provisioning and reports
#[derive(Debug, Parser)]
#[command(name = "bacchus")]
#[command(about = "Provision the Bacchus winery database and print its reports", long_about = None)]
pub struct Cli {
    /// Secret file holding USER, PASSWORD, HOST and DATABASE
    #[arg(long, global = true, default_value = ".env")]
    pub env_file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check that the configured database can be opened
    Check,

    /// Create the database if needed, reset the schema and seed fixtures
    Provision {
        /// Skip printing the seeded tables
        #[arg(long)]
        no_dump: bool,
    },

    /// Print every row of the given tables (all tables when none given)
    Dump {
        /// Table names, e.g. suppliers wine_shipments
        tables: Vec<String>,
    },

    /// Insert, update and delete suppliers one guarded step at a time
    Demo,

    /// Run the canned reports
    Report {
        /// Which report to run
        #[arg(value_enum, default_value_t = ReportSelection::All)]
        report: ReportSelection,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportSelection {
    SupplierDeliveries,
    WineDistribution,
    EmployeeHours,
    All,
}

impl ReportSelection {
    fn kind(self) -> Option<ReportKind> {
        match self {
            ReportSelection::SupplierDeliveries => Some(ReportKind::SupplierDeliveries),
            ReportSelection::WineDistribution => Some(ReportKind::WineDistribution),
            ReportSelection::EmployeeHours => Some(ReportKind::EmployeeHours),
            ReportSelection::All => None,
        }
    }
}

/// Load configuration and run one command, writing its output to `out`.
pub async fn run<W: Write>(cli: Cli, out: &mut W) -> Result<(), AppError> {
    let config = Config::load(&cli.env_file)?;
    execute(&config, cli.command, out).await
}

/// Run one command against the configured database.
///
/// The session is closed whether or not the command succeeds; a command
/// failure takes precedence over a close failure.
pub async fn execute<W: Write>(
    config: &Config,
    command: Command,
    out: &mut W,
) -> Result<(), AppError> {
    if let Command::Provision { .. } = command {
        SchemaProvisioner::ensure_database(config, &config.database).await?;
    }

    let mut session = Session::open(config).await?;
    let outcome = run_command(&mut session, config, command, out).await;
    let closed = session.close().await;
    outcome?;
    closed?;
    Ok(())
}

async fn run_command<W: Write>(
    session: &mut Session,
    config: &Config,
    command: Command,
    out: &mut W,
) -> Result<(), AppError> {
    match command {
        Command::Check => {
            writeln!(
                out,
                "Database user {} connected on host {} with database {}",
                config.user, config.host, config.database
            )?;
        }
        Command::Provision { no_dump } => {
            let mut provisioner = SchemaProvisioner::new(session);
            provisioner.reset_schema().await?;
            let summary = provisioner.seed(&Fixtures::winery()).await?;
            writeln!(
                out,
                "Seeded {} rows into {} tables",
                summary.total_rows(),
                summary.inserted.len()
            )?;
            for (table, err) in &summary.failures {
                warn!(table = %table, error = %err, "Table was not seeded");
                writeln!(out, "Failed to seed {}: {}", table, err)?;
            }
            if !no_dump {
                provisioner.dump(out, &[]).await?;
            }
        }
        Command::Dump { tables } => {
            SchemaProvisioner::new(session)
                .dump_by_name(out, &tables)
                .await?;
        }
        Command::Demo => {
            let summary = SchemaProvisioner::new(session)
                .demo_mutations(out)
                .await?;
            writeln!(out)?;
            writeln!(
                out,
                "Applied {} of {} changes",
                summary.applied.len(),
                summary.applied.len() + summary.failures.len()
            )?;
        }
        Command::Report { report } => {
            let mut reporter = TabularReporter::new(session, &mut *out);
            match report.kind() {
                Some(kind) => reporter.run(kind).await?,
                None => reporter.run_all().await?,
            }
        }
    }
    Ok(())
}

/// Operator-facing message for a failed run.
pub fn failure_message(err: &AppError) -> String {
    match err.category() {
        FailureCategory::Configuration => format!(
            "{}. Set USER, PASSWORD, HOST and DATABASE in the env file or environment.",
            err
        ),
        FailureCategory::AccessDenied => {
            format!("Access denied: check your USER and PASSWORD. ({})", err)
        }
        FailureCategory::UnknownDatabase => format!(
            "Database does not exist: check DATABASE or run `bacchus provision`. ({})",
            err
        ),
        FailureCategory::Other => format!("Error: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::error::ConnectionError;

    #[test]
    fn test_parse_report_default_is_all() {
        let cli = Cli::try_parse_from(["bacchus", "report"]).unwrap();
        match cli.command {
            Command::Report { report } => assert_eq!(report, ReportSelection::All),
            other => panic!("Expected report command, got {:?}", other),
        }
        assert_eq!(cli.env_file, PathBuf::from(".env"));
    }

    #[test]
    fn test_parse_report_selection_and_env_file() {
        let cli = Cli::try_parse_from([
            "bacchus",
            "report",
            "employee-hours",
            "--env-file",
            "/etc/bacchus.env",
        ])
        .unwrap();
        assert_eq!(cli.env_file, PathBuf::from("/etc/bacchus.env"));
        match cli.command {
            Command::Report { report } => {
                assert_eq!(report.kind(), Some(ReportKind::EmployeeHours))
            }
            other => panic!("Expected report command, got {:?}", other),
        }
    }

    #[test]
    fn test_report_selection_names_match_report_kinds() {
        for selection in ReportSelection::value_variants() {
            let name = selection.to_possible_value().unwrap().get_name().to_string();
            match selection.kind() {
                Some(kind) => assert_eq!(name, kind.name()),
                None => assert_eq!(name, "all"),
            }
        }
    }

    #[test]
    fn test_parse_demo() {
        let cli = Cli::try_parse_from(["bacchus", "demo"]).unwrap();
        assert!(matches!(cli.command, Command::Demo));
    }

    #[test]
    fn test_parse_dump_tables() {
        let cli = Cli::try_parse_from(["bacchus", "dump", "suppliers", "wines"]).unwrap();
        match cli.command {
            Command::Dump { tables } => assert_eq!(tables, vec!["suppliers", "wines"]),
            other => panic!("Expected dump command, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_messages_are_categorized() {
        let missing = AppError::from(ConfigError::MissingEnv("PASSWORD".to_string()));
        assert!(failure_message(&missing).contains("PASSWORD"));

        let unknown = AppError::from(ConnectionError::UnknownDatabase {
            database: "bacchus".to_string(),
            path: PathBuf::from("/data/bacchus.db"),
        });
        assert!(failure_message(&unknown).starts_with("Database does not exist"));

        let denied = AppError::from(ConnectionError::AccessDenied {
            user: "winery".to_string(),
            source: sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )),
        });
        assert!(failure_message(&denied).starts_with("Access denied"));
    }
}
