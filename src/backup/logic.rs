// couchbackup/src/backup/logic.rs
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use futures::stream::{self, StreamExt};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::download;
use crate::config::{credentials, BackupConfig};
use crate::couch::CouchClient;
use crate::errors::{AppError, DatabaseFailure, Result};

/// Summary of a completed run, printed as the final success line.
#[derive(Debug)]
pub struct BackupReport {
    pub backed_up: Vec<String>,
    pub folder: PathBuf,
    pub completed_at: DateTime<Local>,
}

impl fmt::Display for BackupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully backed up all databases ({}) to {} at {}",
            self.backed_up.join(","),
            self.folder.display(),
            self.completed_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Runs the whole pipeline: resolve credentials, connect, enumerate, then
/// download every selected database into the destination folder.
pub async fn perform_backup_orchestration(config: &BackupConfig) -> Result<BackupReport> {
    let creds = credentials::resolve(config)?;
    let server_url = config.server_url_for(&creds.username)?;
    println!("🔍 Connecting to {}", server_url);

    let client = CouchClient::new(server_url, &creds)?;
    client.verify().await?;

    let all_databases = client.list_database_names().await?;
    let selected = filter_databases(all_databases, config.database_filter.as_deref())?;
    println!("📋 Databases to back up: {}", selected.join(","));

    let backup_dir = resolve_backup_folder(&config.folder, Local::now())?;
    create_backup_dir(&backup_dir)?;

    download_all_databases(&client, &selected, &backup_dir, config.concurrency).await?;

    Ok(BackupReport {
        backed_up: selected,
        folder: backup_dir,
        completed_at: Local::now(),
    })
}

/// Applies the optional allow-list to the enumerated database names.
///
/// Order is preserved from the server's listing; names in the allow-list the
/// server does not know are dropped silently.
fn filter_databases(all: Vec<String>, filter: Option<&[String]>) -> Result<Vec<String>> {
    let selected: Vec<String> = match filter {
        Some(wanted) => all
            .into_iter()
            .filter(|name| wanted.iter().any(|w| w == name))
            .collect(),
        None => all,
    };

    if selected.is_empty() {
        return Err(AppError::NoDatabasesMatched);
    }
    Ok(selected)
}

/// Resolves the destination folder once per run. A value containing chrono %
/// specifiers (e.g. %Y-%m-%d) is expanded against `now`; anything else is
/// taken literally.
fn resolve_backup_folder(folder: &str, now: DateTime<Local>) -> Result<PathBuf> {
    if !folder.contains('%') {
        return Ok(PathBuf::from(folder));
    }

    if StrftimeItems::new(folder).any(|item| matches!(item, Item::Error)) {
        return Err(AppError::InvalidInput(format!(
            "--folder contains an invalid % date specifier: {}",
            folder
        )));
    }
    Ok(PathBuf::from(now.format(folder).to_string()))
}

/// Creates the destination folder; a folder that already exists is fine.
fn create_backup_dir(backup_dir: &Path) -> Result<()> {
    fs::create_dir_all(backup_dir)?;
    println!("📂 Backup directory ready at: {}", backup_dir.display());
    Ok(())
}

/// Downloads every database concurrently, at most `concurrency` in flight,
/// and waits for all of them to settle before reporting.
///
/// Every database gets an individual verdict; completed files are kept even
/// when the overall run fails.
async fn download_all_databases(
    client: &CouchClient,
    databases: &[String],
    backup_dir: &Path,
    concurrency: usize,
) -> Result<()> {
    let results: Vec<(String, Result<PathBuf>)> = stream::iter(databases.iter().cloned())
        .map(|database| {
            let client = client.clone();
            let backup_dir = backup_dir.to_path_buf();
            async move {
                let result = download::download_database(&client, &database, &backup_dir).await;
                (database, result)
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut failures = Vec::new();
    for (database, result) in results {
        match result {
            Ok(path) => println!("✅ Backed up database {} to {}", database, path.display()),
            Err(e) => {
                eprintln!("❌ Failed to back up database {}: {}", database, e);
                failures.push(DatabaseFailure {
                    database,
                    reason: e.to_string(),
                });
            }
        }
    }

    if !failures.is_empty() {
        return Err(AppError::BackupFailed(failures));
    }
    Ok(())
}
