//! Microsoft Graph share-link client
//!
//! Resolves a share URL to a drive item, lists one level of folder
//! children, and downloads file content. Callers supply the bearer token
//! per request; this client holds no credentials.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytes::Bytes;
use serde::Deserialize;

use crate::error::{Error, Result};

const SERVICE: &str = "graph";

const RESOLVE_TIMEOUT: Duration = Duration::from_secs(60);
const LIST_TIMEOUT: Duration = Duration::from_secs(120);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// A drive item as returned by the Graph API
#[derive(Debug, Clone, Deserialize)]
pub struct DriveItem {
    pub id: String,
    pub name: String,
    /// Present when the item is a file
    #[serde(default)]
    pub file: Option<serde_json::Value>,
    /// Present when the item is a folder
    #[serde(default)]
    pub folder: Option<serde_json::Value>,
    #[serde(rename = "parentReference", default)]
    pub parent_reference: Option<ParentReference>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParentReference {
    #[serde(rename = "driveId", default)]
    pub drive_id: Option<String>,
}

impl DriveItem {
    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }

    pub fn is_file(&self) -> bool {
        self.file.is_some()
    }

    /// Drive id from the parent reference, required for content downloads
    pub fn drive_id(&self) -> Option<&str> {
        self.parent_reference
            .as_ref()
            .and_then(|p| p.drive_id.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ChildrenResponse {
    value: Vec<DriveItem>,
}

/// Client for a Microsoft Graph-compatible file-share API
pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
}

impl GraphClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Encode a share URL into a Graph share id
    pub fn share_id(share_url: &str) -> String {
        format!("u!{}", URL_SAFE_NO_PAD.encode(share_url))
    }

    /// Resolve a share URL to its drive item
    pub async fn resolve_share(&self, share_url: &str, bearer: &str) -> Result<DriveItem> {
        let url = format!(
            "{}/shares/{}/driveItem",
            self.base_url,
            Self::share_id(share_url)
        );
        let response = self
            .http
            .get(url)
            .bearer_auth(bearer)
            .timeout(RESOLVE_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(SERVICE, status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| Error::invalid_response(SERVICE, e.to_string()))
    }

    /// Immediate children of a folder item. No recursion into subfolders.
    pub async fn list_children(
        &self,
        drive_id: &str,
        item_id: &str,
        bearer: &str,
    ) -> Result<Vec<DriveItem>> {
        let url = format!(
            "{}/drives/{}/items/{}/children",
            self.base_url, drive_id, item_id
        );
        let response = self
            .http
            .get(url)
            .bearer_auth(bearer)
            .timeout(LIST_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(SERVICE, status.as_u16(), body));
        }

        let parsed: ChildrenResponse = response
            .json()
            .await
            .map_err(|e| Error::invalid_response(SERVICE, e.to_string()))?;
        Ok(parsed.value)
    }

    /// Download a file item's raw content
    pub async fn download(&self, drive_id: &str, item_id: &str, bearer: &str) -> Result<Bytes> {
        let url = format!(
            "{}/drives/{}/items/{}/content",
            self.base_url, drive_id, item_id
        );
        let response = self
            .http
            .get(url)
            .bearer_auth(bearer)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(SERVICE, status.as_u16(), body));
        }

        response
            .bytes()
            .await
            .map_err(|e| Error::transport(SERVICE, e))
    }
}
