//! Question answering endpoint

use axum::extract::State;
use axum::Json;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{ChatRequest, ChatResponse, ChatSource};

/// `POST /chat`
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    if request.question.trim().is_empty() {
        return Err(Error::bad_request("question must not be empty"));
    }

    // project is accepted but not applied as a retrieval filter
    tracing::info!(
        project = %request.project,
        top_k = request.top_k,
        "chat request"
    );

    let grounded = state
        .answers()
        .answer(&request.question, request.top_k)
        .await?;

    let sources = grounded
        .sources
        .into_iter()
        .map(|s| ChatSource {
            score: s.score,
            file: s.payload.file,
        })
        .collect();

    Ok(Json(ChatResponse {
        answer: grounded.answer,
        sources,
    }))
}
