// couchbackup/src/backup/download.rs
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::couch::CouchClient;
use crate::errors::{AppError, Result};

/// Fetches every document in `database` (bodies included) and writes the raw
/// bulk result to `<backup_dir>/<database>.json`.
///
/// The whole result set is buffered in memory before serialization; an
/// existing file of the same name is overwritten.
pub async fn download_database(
    client: &CouchClient,
    database: &str,
    backup_dir: &Path,
) -> Result<PathBuf> {
    let body = client.all_documents(database).await?;
    write_backup_file(backup_dir, database, &body).await
}

async fn write_backup_file(backup_dir: &Path, database: &str, body: &Value) -> Result<PathBuf> {
    let path = backup_dir.join(format!("{}.json", database));
    let contents = serde_json::to_vec(body)?;

    tokio::fs::write(&path, contents)
        .await
        .map_err(|source| AppError::WriteFailed {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_backup_file_round_trips_the_bulk_result() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let body = json!({
            "total_rows": 2,
            "offset": 0,
            "rows": [
                {"id": "a", "doc": {"_id": "a", "value": 1}},
                {"id": "b", "doc": {"_id": "b", "value": 2}}
            ]
        });

        let path = write_backup_file(dir.path(), "alpha", &body).await?;
        assert_eq!(path, dir.path().join("alpha.json"));

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(written, body);
        Ok(())
    }

    #[tokio::test]
    async fn test_existing_file_is_overwritten() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("alpha.json"), "stale contents")?;

        let body = json!({"total_rows": 0, "offset": 0, "rows": []});
        let path = write_backup_file(dir.path(), "alpha", &body).await?;

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(written, body);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_folder_reports_write_failed() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let gone = dir.path().join("never-created");

        let body = json!({"rows": []});
        let result = write_backup_file(&gone, "alpha", &body).await;

        assert!(matches!(result, Err(AppError::WriteFailed { .. })));
        Ok(())
    }
}
