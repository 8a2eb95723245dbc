// couchbackup/src/config/mod.rs
pub mod credentials;

use clap::Parser;
use std::path::PathBuf;
use url::Url;

use crate::errors::{AppError, Result};

/// Command-line surface of the backup tool.
#[derive(Debug, Parser)]
#[command(name = "couchbackup")]
#[command(about = "Back up CouchDB/Cloudant databases to local JSON files")]
#[command(version)]
pub struct Cli {
    /// Account username
    #[arg(short = 'u', long, requires = "password")]
    pub username: Option<String>,

    /// Account password
    #[arg(short = 'p', long, requires = "username")]
    pub password: Option<String>,

    /// Directory containing the .cloudant credentials file
    #[arg(long, env = "COUCH_CREDENTIALS_DIR", default_value = ".")]
    pub credentials_dir: PathBuf,

    /// Optionally filter databases (comma separated)
    #[arg(short = 'd', long = "db", value_delimiter = ',')]
    pub databases: Vec<String>,

    /// Folder in which to save backups; chrono % specifiers (e.g. %Y-%m-%d)
    /// are expanded against the current local time
    #[arg(short = 'f', long, default_value = ".")]
    pub folder: String,

    /// Server URL; defaults to https://<username>.cloudant.com
    #[arg(long, env = "COUCH_SERVER_URL")]
    pub server_url: Option<Url>,

    /// Maximum number of concurrent database downloads
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,
}

/// Validated run configuration, passed by reference into every stage.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    pub explicit_username: Option<String>,
    pub explicit_password: Option<String>,
    pub credentials_dir: PathBuf,
    pub database_filter: Option<Vec<String>>,
    pub folder: String,
    pub server_url: Option<Url>,
    pub concurrency: usize,
}

impl BackupConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        if cli.folder.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "--folder cannot be empty".to_string(),
            ));
        }

        if let Some(url) = &cli.server_url {
            if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
                return Err(AppError::InvalidInput(format!(
                    "--server-url must be an http(s) URL, got {}",
                    url
                )));
            }
        }

        let databases: Vec<String> = cli
            .databases
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        Ok(BackupConfig {
            explicit_username: cli.username,
            explicit_password: cli.password,
            credentials_dir: cli.credentials_dir,
            database_filter: if databases.is_empty() {
                None
            } else {
                Some(databases)
            },
            folder: cli.folder,
            server_url: cli.server_url,
            // At least one in-flight download, no matter what was asked for.
            concurrency: cli.concurrency.max(1),
        })
    }

    /// Server URL for the given account, falling back to the hosted default.
    pub fn server_url_for(&self, username: &str) -> Result<Url> {
        match &self.server_url {
            Some(url) => Ok(url.clone()),
            None => Url::parse(&format!("https://{}.cloudant.com", username)).map_err(|e| {
                AppError::InvalidInput(format!(
                    "Cannot derive a server URL for account '{}': {}",
                    username, e
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args.iter().copied()).expect("arguments should parse")
    }

    #[test]
    fn test_database_filter_is_split_and_trimmed() -> anyhow::Result<()> {
        let cli = parse(&["couchbackup", "--db", "alpha, gamma ,,beta"]);
        let config = BackupConfig::from_cli(cli)?;

        assert_eq!(
            config.database_filter,
            Some(vec![
                "alpha".to_string(),
                "gamma".to_string(),
                "beta".to_string()
            ])
        );
        Ok(())
    }

    #[test]
    fn test_no_db_flag_means_no_filter() -> anyhow::Result<()> {
        let cli = parse(&["couchbackup"]);
        let config = BackupConfig::from_cli(cli)?;

        assert_eq!(config.database_filter, None);
        assert_eq!(config.folder, ".");
        assert_eq!(config.concurrency, 4);
        Ok(())
    }

    #[test]
    fn test_username_requires_password() {
        let result = Cli::try_parse_from(["couchbackup", "--username", "acct1"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["couchbackup", "--password", "pw"]);
        assert!(result.is_err());

        let cli = parse(&["couchbackup", "-u", "acct1", "-p", "pw"]);
        assert_eq!(cli.username.as_deref(), Some("acct1"));
        assert_eq!(cli.password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_concurrency_is_clamped_to_at_least_one() -> anyhow::Result<()> {
        let cli = parse(&["couchbackup", "--concurrency", "0"]);
        let config = BackupConfig::from_cli(cli)?;

        assert_eq!(config.concurrency, 1);
        Ok(())
    }

    #[test]
    fn test_empty_folder_is_rejected() {
        let cli = parse(&["couchbackup", "--folder", "  "]);
        let result = BackupConfig::from_cli(cli);

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_server_url_defaults_to_hosted_account() -> anyhow::Result<()> {
        let cli = parse(&["couchbackup"]);
        let config = BackupConfig::from_cli(cli)?;

        let url = config.server_url_for("acct1")?;
        assert_eq!(url.as_str(), "https://acct1.cloudant.com/");
        Ok(())
    }

    #[test]
    fn test_explicit_server_url_wins_over_derived_default() -> anyhow::Result<()> {
        let cli = parse(&["couchbackup", "--server-url", "http://localhost:5984"]);
        let config = BackupConfig::from_cli(cli)?;

        let url = config.server_url_for("acct1")?;
        assert_eq!(url.as_str(), "http://localhost:5984/");
        Ok(())
    }

    #[test]
    fn test_non_http_server_url_is_rejected() {
        let cli = parse(&["couchbackup", "--server-url", "ftp://example.com"]);
        let result = BackupConfig::from_cli(cli);

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
