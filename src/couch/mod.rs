// couchbackup/src/couch/mod.rs
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::credentials::Credentials;
use crate::errors::{AppError, Result};

/// Authenticated handle to a CouchDB/Cloudant-style server.
///
/// Cheap to clone; all concurrent downloads share one connection pool and
/// authenticate per request with HTTP basic auth.
#[derive(Debug, Clone)]
pub struct CouchClient {
    http: Client,
    base_url: Url,
    username: String,
    password: String,
}

impl CouchClient {
    pub fn new(base_url: Url, credentials: &Credentials) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| AppError::ConnectionFailed {
                url: base_url.to_string(),
                reason: format!("could not build HTTP client: {}", e),
            })?;

        Ok(CouchClient {
            http,
            base_url,
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        })
    }

    /// Checks that the server is reachable and accepts the credentials.
    pub async fn verify(&self) -> Result<()> {
        let url = self.base_url.clone();
        let response = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| self.connection_failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.connection_failed(format!(
                "server responded with {} for user '{}'",
                response.status(),
                self.username
            )));
        }
        Ok(())
    }

    /// Fetches the full list of database names on the server.
    pub async fn list_database_names(&self) -> Result<Vec<String>> {
        let url = self.endpoint(&["_all_dbs"])?;
        let response = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| AppError::ListFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::ListFailed(format!(
                "server responded with {}",
                response.status()
            )));
        }

        response
            .json::<Vec<String>>()
            .await
            .map_err(|e| AppError::ListFailed(format!("invalid database list: {}", e)))
    }

    /// Fetches every document in `database`, bodies included, as one bulk
    /// result. The raw response body is returned untouched.
    pub async fn all_documents(&self, database: &str) -> Result<Value> {
        let url = self.endpoint(&[database, "_all_docs"])?;
        let response = self
            .http
            .get(url)
            .query(&[("include_docs", "true")])
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| self.document_list_failed(database, e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.document_list_failed(
                database,
                format!("server responded with {}", response.status()),
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| self.document_list_failed(database, format!("invalid body: {}", e)))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                AppError::InvalidInput(format!(
                    "Server URL {} cannot be used as a base",
                    self.base_url
                ))
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn connection_failed(&self, reason: String) -> AppError {
        AppError::ConnectionFailed {
            url: self.base_url.to_string(),
            reason,
        }
    }

    fn document_list_failed(&self, database: &str, reason: String) -> AppError {
        AppError::DocumentListFailed {
            database: database.to_string(),
            reason,
        }
    }
}
