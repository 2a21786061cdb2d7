//! The single database session held for a run.

use crate::config::Config;
use crate::error::ConnectionError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// One open connection to the winery database.
///
/// Callers close it explicitly with [`Session::close`]; dropping it on an
/// unwinding path still releases the underlying connection.
pub struct Session {
    conn: SqliteConnection,
    database: String,
}

impl Session {
    /// Open the configured database. The database must already exist.
    pub async fn open(config: &Config) -> Result<Self, ConnectionError> {
        check_host(&config.host)?;

        let path = config.database_path();
        if !path.exists() {
            return Err(ConnectionError::UnknownDatabase {
                database: config.database.clone(),
                path,
            });
        }

        let conn = connect(&path, false).await.map_err(|e| {
            ConnectionError::classify(e, &config.user, &config.database, path.clone())
        })?;

        info!(
            user = %config.user,
            host = %config.host,
            database = %config.database,
            "Session opened"
        );
        Ok(Session {
            conn,
            database: config.database.clone(),
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    /// Close the session, flushing the connection.
    pub async fn close(self) -> Result<(), ConnectionError> {
        let database = self.database;
        self.conn.close().await.map_err(ConnectionError::Other)?;
        info!(database = %database, "Session closed");
        Ok(())
    }
}

pub(crate) fn check_host(host: &str) -> Result<(), ConnectionError> {
    if Path::new(host).is_dir() {
        Ok(())
    } else {
        Err(ConnectionError::HostUnreachable {
            host: host.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "data directory does not exist"),
        })
    }
}

/// Open a connection to a database file and configure its pragmas.
pub(crate) async fn connect(
    path: &Path,
    create_if_missing: bool,
) -> Result<SqliteConnection, sqlx::Error> {
    let mut conn = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create_if_missing)
        .connect()
        .await?;
    configure_pragmas_conn(&mut conn).await?;
    Ok(conn)
}

/// Referential constraints are only enforced when foreign keys are on.
async fn configure_pragmas_conn(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    debug!("Configuring SQLite pragmas...");

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;

    let (foreign_keys,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
        .fetch_one(&mut *conn)
        .await?;
    if foreign_keys != 1 {
        warn!("SQLite refused to enable foreign key enforcement");
    }

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;

    debug!("SQLite pragmas configured");
    Ok(())
}
