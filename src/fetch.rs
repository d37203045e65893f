use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::path::Path;
use tracing::debug;
use url::Url;

use crate::error::PxError;

/// Read a local query-definition file and POST it to a PxWeb dataset
/// endpoint, returning the parsed JSON response.
///
/// The query body is opaque to us; it is sent verbatim. A non-success status
/// becomes [`PxError::Api`] carrying the status and response body text.
pub async fn run_query(client: &Client, url: &Url, query_path: &Path) -> Result<Value, PxError> {
    let body = load_query(query_path).await?;

    debug!(%url, path = %query_path.display(), "posting query");
    let resp = client
        .post(url.clone())
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "application/json")
        .json(&body)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(PxError::Api { status, body });
    }
    Ok(resp.json::<Value>().await?)
}

/// Retrieve a query file. Any failure, unreadable file or invalid JSON,
/// reports as a not-found [`PxError::QueryFile`] carrying the path, the same
/// not-ok surface a remote retrieval would give.
async fn load_query(path: &Path) -> Result<Value, PxError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|_| PxError::QueryFile {
            path: path.to_path_buf(),
        })?;
    serde_json::from_str(&text).map_err(|_| PxError::QueryFile {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn missing_query_file_errors_before_any_network_io() {
        let client = Client::new();
        let url = Url::parse("http://localhost:1/api").unwrap();
        let err = run_query(&client, &url, Path::new("no/such/query.json"))
            .await
            .unwrap_err();
        match err {
            PxError::QueryFile { path } => assert_eq!(path, Path::new("no/such/query.json")),
            other => panic!("expected QueryFile, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_json_query_file_is_a_query_file_error() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "not json at all").unwrap();
        let err = load_query(f.path()).await.unwrap_err();
        assert!(matches!(err, PxError::QueryFile { .. }));
    }

    #[tokio::test]
    async fn valid_query_file_loads_verbatim() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, r#"{{"query":[],"response":{{"format":"json-stat2"}}}}"#).unwrap();
        let body = load_query(f.path()).await.unwrap();
        assert_eq!(body["response"]["format"], "json-stat2");
    }
}
