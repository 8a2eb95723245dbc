// couchbackup/src/config/credentials.rs
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::Path;

use crate::config::BackupConfig;
use crate::errors::{AppError, Result};

/// Name of the fallback credentials file inside --credentials-dir.
pub const CREDENTIALS_FILE_NAME: &str = ".cloudant";

/// Account credentials, resolved once per run and never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Resolves account credentials for this run.
///
/// An explicit --username/--password pair takes unconditional precedence; the
/// credentials file is then never touched. Otherwise the .cloudant file in the
/// configured directory is read and parsed as JSON.
pub fn resolve(config: &BackupConfig) -> Result<Credentials> {
    if let (Some(username), Some(password)) =
        (&config.explicit_username, &config.explicit_password)
    {
        return Ok(Credentials {
            username: username.clone(),
            password: password.clone(),
        });
    }

    read_credentials_file(&config.credentials_dir.join(CREDENTIALS_FILE_NAME))
}

fn read_credentials_file(path: &Path) -> Result<Credentials> {
    // Anything other than "file not found" must surface, not hang the run.
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::CredentialsNotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(AppError::CredentialsUnreadable {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&contents).map_err(|source| AppError::CredentialsMalformed {
        path: path.to_path_buf(),
        source,
    })
}
