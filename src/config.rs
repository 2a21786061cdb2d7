use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Connection settings for the winery database.
///
/// `host` is the data directory holding database files and `database` is the
/// file stem inside it, so the database lives at `<host>/<database>.db`.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub user: String,
    pub password: String,
    pub host: String,
    pub database: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
    #[error("Failed to read env file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

impl Config {
    /// Load configuration from a `.env` secret file, falling back to the
    /// process environment for keys the file does not set. File values take
    /// precedence over exported `USER` and `HOST` variables.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(env_file: &Path) -> Result<Self, ConfigError> {
        let mut env_map: HashMap<String, String> = std::env::vars().collect();
        env_map.extend(read_env_file(env_file)?);
        Self::from_env_map(env_map)
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let user = required(&env_map, "USER")?;
        let password = required(&env_map, "PASSWORD")?;
        let host = required(&env_map, "HOST")?;
        let database = required(&env_map, "DATABASE")?;

        if !is_plain_identifier(&database) {
            return Err(ConfigError::InvalidValue(
                "DATABASE".to_string(),
                format!(
                    "must contain only letters, digits, '_' or '-', got {}",
                    database
                ),
            ));
        }

        Ok(Config {
            user,
            password,
            host,
            database,
        })
    }

    /// Path of the configured database file.
    pub fn database_path(&self) -> PathBuf {
        self.database_path_for(&self.database)
    }

    /// Path of a named database on the configured host.
    pub fn database_path_for(&self, name: &str) -> PathBuf {
        Path::new(&self.host).join(format!("{}.db", name))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("database", &self.database)
            .finish()
    }
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    let value = env_map
        .get(key)
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))?;
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            "must not be empty".to_string(),
        ));
    }
    Ok(value.clone())
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let env_file_err = |source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    };
    let mut env_map = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(env_file_err)? {
        let (key, value) = item.map_err(env_file_err)?;
        env_map.insert(key, value);
    }
    Ok(env_map)
}

pub(crate) fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
