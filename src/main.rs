//! CouchDB/Cloudant Database Backup Tool
//!
//! Provides CLI interface for backing up document databases to local JSON files

// couchbackup/src/main.rs
mod backup;
mod config;
mod couch;
mod errors;

use anyhow::{Context, Result};
use backup::BackupReport;
use clap::Parser;
use config::{BackupConfig, Cli};
use std::process::ExitCode;

/// Main entry point for the backup tool
#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    match run_app().await {
        Ok(report) => {
            println!("✅ {}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app() -> Result<BackupReport> {
    let cli = Cli::parse();
    let app_config = BackupConfig::from_cli(cli)
        .context("Failed to build backup configuration from command line arguments")?;

    println!("🚀 Starting Backup Process...");
    backup::run_backup_flow(&app_config)
        .await
        .context("Backup process failed")
}
