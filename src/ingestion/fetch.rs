//! URL fetching for the URL-list ingestion path

use std::time::Duration;

use bytes::Bytes;

use crate::error::{Error, Result};

const SERVICE: &str = "fetch";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Derive a filename from a URL path, ignoring the query string
pub fn filename_from_url(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    let name = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    if name.is_empty() {
        "downloaded".to_string()
    } else {
        name.to_string()
    }
}

/// Infer a content type from a filename, defaulting to octet-stream
pub fn content_type_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Downloads documents over plain HTTP
pub struct UrlFetcher {
    http: reqwest::Client,
}

impl Default for UrlFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlFetcher {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Fetch a URL, optionally with a bearer token.
    ///
    /// Returns the body plus the content type, preferring the response
    /// header over the filename-based guess.
    pub async fn fetch(&self, url: &str, bearer: Option<&str>) -> Result<(Bytes, String)> {
        let mut request = self.http.get(url).timeout(DOWNLOAD_TIMEOUT);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(SERVICE, status.as_u16(), body));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .unwrap_or_else(|| content_type_for(&filename_from_url(url)));

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;
        Ok((bytes, content_type))
    }
}
