//! Runtime configuration endpoints

use axum::extract::State;
use axum::Json;

use crate::config::SettingsPatch;
use crate::server::state::AppState;
use crate::types::ConfigResponse;

/// `GET /config`
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let settings = state.settings_snapshot();
    Json(ConfigResponse::new(state.config(), &settings))
}

/// `POST /config`
///
/// Fields that would make the settings invalid are skipped rather than
/// failing the request; the response reflects whatever was applied.
pub async fn update_config(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Json<ConfigResponse> {
    let current = state.settings_snapshot();
    let (next, rejected) = current.apply(&patch);

    if !rejected.is_empty() {
        tracing::warn!(?rejected, "ignoring invalid config fields");
    }
    if next != current {
        tracing::info!(
            embed_batch = next.embed_batch,
            upsert_batch = next.upsert_batch,
            chunk_size = next.chunk_size,
            chunk_overlap = next.chunk_overlap,
            "runtime settings updated"
        );
        state.replace_settings(next.clone());
    }

    Json(ConfigResponse::new(state.config(), &next))
}
