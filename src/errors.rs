// couchbackup/src/errors.rs
use std::path::PathBuf;
use thiserror::Error;

/// Outcome details for a single database whose download failed.
#[derive(Debug, Clone)]
pub struct DatabaseFailure {
    pub database: String,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Credentials not found: no --username/--password given and {0} does not exist")]
    CredentialsNotFound(PathBuf),

    #[error("Failed to read credentials file {path}: {source}")]
    CredentialsUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Credentials file {path} is malformed: {source}")]
    CredentialsMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Failed to list databases: {0}")]
    ListFailed(String),

    #[error("Database(s) not found: nothing matched the requested list")]
    NoDatabasesMatched,

    #[error("Failed to list documents in database '{database}': {reason}")]
    DocumentListFailed { database: String, reason: String },

    #[error("Failed to write backup file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Backup failed for {} database(s): {}", .0.len(), format_failure_list(.0))]
    BackupFailed(Vec<DatabaseFailure>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

fn format_failure_list(failures: &[DatabaseFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.database, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_failed_message_names_every_database() {
        let err = AppError::BackupFailed(vec![
            DatabaseFailure {
                database: "alpha".to_string(),
                reason: "connection reset".to_string(),
            },
            DatabaseFailure {
                database: "gamma".to_string(),
                reason: "disk full".to_string(),
            },
        ]);

        let message = err.to_string();
        assert!(message.contains("2 database(s)"));
        assert!(message.contains("alpha: connection reset"));
        assert!(message.contains("gamma: disk full"));
    }
}
