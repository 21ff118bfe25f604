//! Ingestion endpoints: direct upload, URL list, share-link traversal

use axum::extract::{Multipart, State};
use axum::Json;

use crate::error::{Error, Result};
use crate::ingestion::fetch::{content_type_for, filename_from_url};
use crate::ingestion::{IngestReport, SourceDocument};
use crate::server::state::AppState;
use crate::types::{IngestResponse, IngestUrlsRequest, SharePointRequest, UrlIngestResponse};

/// `POST /ingest` — multipart form of one or more files plus a `project` field
pub async fn ingest_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>> {
    let mut project = "default".to_string();
    let mut documents = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::bad_request(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "project" {
            project = field
                .text()
                .await
                .map_err(|e| Error::bad_request(e.to_string()))?;
            continue;
        }

        let filename = field
            .file_name()
            .map(|f| f.to_string())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = field
            .content_type()
            .map(|c| c.to_string())
            .unwrap_or_else(|| content_type_for(&filename));
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::bad_request(e.to_string()))?;

        documents.push(SourceDocument {
            filename,
            content_type,
            bytes,
        });
    }

    if documents.is_empty() {
        return Err(Error::bad_request("no files in multipart body"));
    }

    let settings = state.settings_snapshot();
    let report = state
        .pipeline()
        .ingest(&project, documents, &settings)
        .await?;

    Ok(Json(IngestResponse {
        ok: true,
        project,
        chunks: report.total_chunks(),
        files: report.files(),
    }))
}

/// `POST /ingest_urls` — fetch each URL and ingest what succeeds.
///
/// A failing fetch skips that URL; the call still reports success with the
/// partial counts.
pub async fn ingest_urls(
    State(state): State<AppState>,
    Json(request): Json<IngestUrlsRequest>,
) -> Result<Json<UrlIngestResponse>> {
    let mut documents = Vec::new();
    let mut pre_skipped = IngestReport::default();

    for url in &request.urls {
        let filename = filename_from_url(url);
        match state.fetcher().fetch(url, request.bearer.as_deref()).await {
            Ok((bytes, content_type)) => documents.push(SourceDocument {
                filename,
                content_type,
                bytes,
            }),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "fetch failed, skipping");
                pre_skipped.push_skipped(filename, e.to_string());
            }
        }
    }

    let fetched = documents.len();
    let settings = state.settings_snapshot();
    let mut report = state
        .pipeline()
        .ingest(&request.project, documents, &settings)
        .await?;
    report.outcomes.extend(pre_skipped.outcomes);

    tracing::info!(
        attempted = report.outcomes.len(),
        fetched,
        chunks = report.total_chunks(),
        "url ingestion complete"
    );

    Ok(Json(UrlIngestResponse {
        ok: true,
        project: request.project,
        fetched,
        chunks: report.total_chunks(),
    }))
}

/// `POST /ingest_sharepoint` — resolve a share link and ingest the file, or
/// one level of folder children.
///
/// Resolution failures are hard errors; per-child download failures are
/// skipped.
pub async fn ingest_sharepoint(
    State(state): State<AppState>,
    Json(request): Json<SharePointRequest>,
) -> Result<Json<UrlIngestResponse>> {
    let graph = state.graph();
    let item = graph
        .resolve_share(&request.share_url, &request.bearer)
        .await?;

    let targets = if item.is_folder() {
        let drive_id = item
            .drive_id()
            .ok_or_else(|| Error::invalid_response("graph", "folder item has no drive id"))?
            .to_string();
        graph
            .list_children(&drive_id, &item.id, &request.bearer)
            .await?
            .into_iter()
            .filter(|child| child.is_file())
            .collect()
    } else if item.is_file() {
        vec![item]
    } else {
        tracing::warn!(name = %item.name, "share item is neither file nor folder");
        Vec::new()
    };

    let mut documents = Vec::new();
    for target in &targets {
        let Some(drive_id) = target.drive_id() else {
            tracing::warn!(file = %target.name, "item has no drive id, skipping");
            continue;
        };
        match graph.download(drive_id, &target.id, &request.bearer).await {
            Ok(bytes) => documents.push(SourceDocument {
                filename: target.name.clone(),
                content_type: content_type_for(&target.name),
                bytes,
            }),
            Err(e) => {
                tracing::warn!(file = %target.name, error = %e, "download failed, skipping");
            }
        }
    }

    let fetched = documents.len();
    let settings = state.settings_snapshot();
    let report = state
        .pipeline()
        .ingest(&request.project, documents, &settings)
        .await?;

    Ok(Json(UrlIngestResponse {
        ok: true,
        project: request.project,
        fetched,
        chunks: report.total_chunks(),
    }))
}
