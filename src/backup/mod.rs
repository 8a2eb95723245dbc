// couchbackup/src/backup/mod.rs
mod download;
mod logic;

pub use logic::BackupReport;

use anyhow::Result;

use crate::config::BackupConfig;

/// Public entry point for the backup process.
///
/// Resolves credentials, enumerates the account's databases and downloads
/// each selected one into the destination folder.
pub async fn run_backup_flow(app_config: &BackupConfig) -> Result<BackupReport> {
    let report = logic::perform_backup_orchestration(app_config).await?;
    Ok(report)
}
