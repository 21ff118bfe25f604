//! End-to-end tests over the HTTP surface with mocked remote services

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use httpmock::prelude::*;
use serde_json::{json, Value};
use tower::ServiceExt;

use corpus_rag::config::{AppConfig, RuntimeSettings};
use corpus_rag::providers::ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
use corpus_rag::providers::qdrant::QdrantStore;
use corpus_rag::providers::vector_store::VectorStoreProvider;
use corpus_rag::server::state::AppState;
use corpus_rag::server::build_router;
use corpus_rag::Error;

const DIM: usize = 3;

fn test_state(ollama_url: &str, qdrant_url: &str) -> AppState {
    test_state_with_graph(ollama_url, qdrant_url, None)
}

fn test_state_with_graph(
    ollama_url: &str,
    qdrant_url: &str,
    graph_url: Option<&str>,
) -> AppState {
    let mut config = AppConfig {
        ollama_base_url: ollama_url.to_string(),
        qdrant_url: qdrant_url.to_string(),
        ..Default::default()
    };
    if let Some(graph_url) = graph_url {
        config.graph_base = graph_url.to_string();
    }
    let client = Arc::new(OllamaClient::new(ollama_url.to_string()));
    let embedder = Arc::new(OllamaEmbedder::new(
        client.clone(),
        config.embed_model.clone(),
        DIM,
    ));
    let llm = Arc::new(OllamaLlm::new(client, config.generate_model.clone()));
    let store = Arc::new(QdrantStore::new(
        qdrant_url.to_string(),
        config.collection.clone(),
    ));
    AppState::new(config, RuntimeSettings::default(), embedder, store, llm)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, method: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(uri: &str, project: &str, files: &[(&str, &str, &[u8])]) -> Request<Body> {
    let boundary = "test-boundary-7d93f1";
    let mut body: Vec<u8> = Vec::new();

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"project\"\r\n\r\n",
    );
    body.extend_from_slice(project.as_bytes());
    body.extend_from_slice(b"\r\n");

    for (filename, content_type, content) in files {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Request::builder()
        .uri(uri)
        .method("POST")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_answers_ok() {
    let app = build_router(test_state("http://127.0.0.1:1", "http://127.0.0.1:1"));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn config_patch_round_trips_and_skips_invalid_fields() {
    let app = build_router(test_state("http://127.0.0.1:1", "http://127.0.0.1:1"));

    let response = app
        .clone()
        .oneshot(json_request(
            "/config",
            "POST",
            json!({ "CHUNK_SIZE": 1000, "CHUNK_OVERLAP": 2000, "EMBED_BATCH": 16 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["chunk_size"], json!(1000));
    // invalid overlap (>= chunk_size) is skipped, default stays
    assert_eq!(body["chunk_overlap"], json!(120));
    assert_eq!(body["embed_batch"], json!(16));

    let response = app
        .oneshot(Request::builder().uri("/config").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["chunk_size"], json!(1000));
    assert_eq!(body["embed_batch"], json!(16));
    assert_eq!(body["collection"], json!("docs"));
}

#[tokio::test]
async fn uploading_two_windows_of_text_stores_two_points() {
    let ollama = MockServer::start();
    let qdrant = MockServer::start();

    let embed = ollama.mock(|when, then| {
        when.method(POST).path("/api/embeddings");
        then.status(200).json_body(json!({ "embedding": [0.1, 0.2, 0.3] }));
    });
    let upsert = qdrant.mock(|when, then| {
        when.method(PUT)
            .path("/collections/docs/points")
            .query_param("wait", "true")
            .matches(|req| {
                let Ok(body) = serde_json::from_slice::<Value>(
                    req.body.as_deref().unwrap_or_default(),
                ) else {
                    return false;
                };
                let Some(points) = body["points"].as_array() else {
                    return false;
                };
                points.len() == 2
                    && points.iter().all(|p| {
                        p["payload"]["project"] == json!("research")
                            && p["payload"]["file"] == json!("notes.txt")
                    })
            });
        then.status(200).json_body(json!({ "status": "ok" }));
    });

    let app = build_router(test_state(&ollama.base_url(), &qdrant.base_url()));
    let text = "y".repeat(2 * 800 - 120);
    let response = app
        .oneshot(multipart_request(
            "/ingest",
            "research",
            &[("notes.txt", "text/plain", text.as_bytes())],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["project"], json!("research"));
    assert_eq!(body["chunks"], json!(2));
    assert_eq!(body["files"], json!(["notes.txt"]));

    embed.assert_hits(2);
    upsert.assert();
}

#[tokio::test]
async fn chat_grounds_the_prompt_in_retrieved_chunks() {
    let ollama = MockServer::start();
    let qdrant = MockServer::start();

    ollama.mock(|when, then| {
        when.method(POST).path("/api/embeddings");
        then.status(200).json_body(json!({ "embedding": [0.4, 0.5, 0.6] }));
    });
    qdrant.mock(|when, then| {
        when.method(POST).path("/collections/docs/points/search");
        then.status(200).json_body(json!({
            "result": [
                {
                    "score": 0.91,
                    "payload": {
                        "text": "the flux capacitor needs 1.21 gigawatts",
                        "project": "default",
                        "file": "manual.pdf"
                    }
                },
                {
                    "score": 0.74,
                    "payload": {
                        "text": "plutonium is required",
                        "project": "default",
                        "file": "appendix.txt"
                    }
                }
            ]
        }));
    });
    let generate = ollama.mock(|when, then| {
        when.method(POST)
            .path("/api/generate")
            .body_contains("the flux capacitor needs 1.21 gigawatts")
            .body_contains("Question: How much power?");
        then.status(200).json_body(json!({ "response": "1.21 gigawatts." }));
    });

    let app = build_router(test_state(&ollama.base_url(), &qdrant.base_url()));
    let response = app
        .oneshot(json_request(
            "/chat",
            "POST",
            json!({ "question": "How much power?", "top_k": 2 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["answer"], json!("1.21 gigawatts."));
    assert_eq!(body["sources"][0]["file"], json!("manual.pdf"));
    assert_eq!(body["sources"][1]["file"], json!("appendix.txt"));

    generate.assert();
}

#[tokio::test]
async fn chat_surfaces_generation_failure_as_bad_gateway() {
    let ollama = MockServer::start();
    let qdrant = MockServer::start();

    ollama.mock(|when, then| {
        when.method(POST).path("/api/embeddings");
        then.status(200).json_body(json!({ "embedding": [0.4, 0.5, 0.6] }));
    });
    qdrant.mock(|when, then| {
        when.method(POST).path("/collections/docs/points/search");
        then.status(200).json_body(json!({ "result": [] }));
    });
    ollama.mock(|when, then| {
        when.method(POST).path("/api/generate");
        then.status(500).body("model exploded");
    });

    let app = build_router(test_state(&ollama.base_url(), &qdrant.base_url()));
    let response = app
        .oneshot(json_request(
            "/chat",
            "POST",
            json!({ "question": "anything" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["type"], json!("upstream_error"));
}

#[tokio::test]
async fn url_ingestion_skips_failing_urls_but_keeps_the_rest() {
    let ollama = MockServer::start();
    let qdrant = MockServer::start();
    let content = MockServer::start();

    ollama.mock(|when, then| {
        when.method(POST).path("/api/embeddings");
        then.status(200).json_body(json!({ "embedding": [0.1, 0.2, 0.3] }));
    });
    qdrant.mock(|when, then| {
        when.method(PUT).path("/collections/docs/points");
        then.status(200).json_body(json!({ "status": "ok" }));
    });

    content.mock(|when, then| {
        when.method(GET).path("/a.txt");
        then.status(200)
            .header("content-type", "text/plain")
            .body("alpha document body");
    });
    content.mock(|when, then| {
        when.method(GET).path("/b.txt");
        then.status(200)
            .header("content-type", "text/plain")
            .body("bravo document body");
    });
    content.mock(|when, then| {
        when.method(GET).path("/missing.txt");
        then.status(404).body("not here");
    });

    let app = build_router(test_state(&ollama.base_url(), &qdrant.base_url()));
    let response = app
        .oneshot(json_request(
            "/ingest_urls",
            "POST",
            json!({
                "project": "crawl",
                "urls": [
                    content.url("/a.txt"),
                    content.url("/missing.txt"),
                    content.url("/b.txt"),
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["fetched"], json!(2));
    assert_eq!(body["chunks"], json!(2));
}

#[tokio::test]
async fn sharepoint_folder_ingestion_lists_one_level_and_downloads_files() {
    let ollama = MockServer::start();
    let qdrant = MockServer::start();
    let graph = MockServer::start();

    ollama.mock(|when, then| {
        when.method(POST).path("/api/embeddings");
        then.status(200).json_body(json!({ "embedding": [0.1, 0.2, 0.3] }));
    });
    qdrant.mock(|when, then| {
        when.method(PUT).path("/collections/docs/points");
        then.status(200).json_body(json!({ "status": "ok" }));
    });

    let share_url = "https://contoso.sharepoint.com/:f:/g/reports";
    let resolve = graph.mock(|when, then| {
        when.method(GET)
            .path_contains("/shares/u!")
            .path_contains("/driveItem")
            .header("authorization", "Bearer tok-123");
        then.status(200).json_body(json!({
            "id": "folder-1",
            "name": "reports",
            "folder": { "childCount": 2 },
            "parentReference": { "driveId": "drive-9" }
        }));
    });
    graph.mock(|when, then| {
        when.method(GET).path("/drives/drive-9/items/folder-1/children");
        then.status(200).json_body(json!({
            "value": [
                {
                    "id": "item-a",
                    "name": "summary.txt",
                    "file": { "mimeType": "text/plain" },
                    "parentReference": { "driveId": "drive-9" }
                },
                {
                    "id": "sub-1",
                    "name": "archive",
                    "folder": { "childCount": 5 },
                    "parentReference": { "driveId": "drive-9" }
                }
            ]
        }));
    });
    let download = graph.mock(|when, then| {
        when.method(GET).path("/drives/drive-9/items/item-a/content");
        then.status(200).body("quarterly summary text");
    });

    let app = build_router(test_state_with_graph(
        &ollama.base_url(),
        &qdrant.base_url(),
        Some(&graph.base_url()),
    ));

    let response = app
        .oneshot(json_request(
            "/ingest_sharepoint",
            "POST",
            json!({
                "project": "finance",
                "share_url": share_url,
                "bearer": "tok-123"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["project"], json!("finance"));
    // only the file child is fetched; the subfolder is not recursed into
    assert_eq!(body["fetched"], json!(1));
    assert_eq!(body["chunks"], json!(1));

    resolve.assert();
    download.assert();
}

#[tokio::test]
async fn collection_setup_fails_hard_on_dimension_mismatch() {
    let qdrant = MockServer::start();
    qdrant.mock(|when, then| {
        when.method(GET).path("/collections/docs");
        then.status(200).json_body(json!({
            "result": { "config": { "params": { "vectors": { "size": 768 } } } }
        }));
    });

    let store = QdrantStore::new(qdrant.base_url(), "docs".to_string());
    let err = store.ensure_collection(DIM).await.unwrap_err();
    assert!(matches!(
        err,
        Error::DimensionMismatch {
            existing: 768,
            probed: 3,
            ..
        }
    ));
}

#[tokio::test]
async fn absent_collection_is_created_with_probed_dimension() {
    let qdrant = MockServer::start();
    qdrant.mock(|when, then| {
        when.method(GET).path("/collections/docs");
        then.status(404).body("collection not found");
    });
    let create = qdrant.mock(|when, then| {
        when.method(PUT)
            .path("/collections/docs")
            .json_body(json!({ "vectors": { "size": 3, "distance": "Cosine" } }));
        then.status(200).json_body(json!({ "result": true }));
    });

    let store = QdrantStore::new(qdrant.base_url(), "docs".to_string());
    store.ensure_collection(DIM).await.unwrap();
    create.assert();
}

#[tokio::test]
async fn matching_collection_is_left_untouched() {
    let qdrant = MockServer::start();
    qdrant.mock(|when, then| {
        when.method(GET).path("/collections/docs");
        then.status(200).json_body(json!({
            "result": { "config": { "params": { "vectors": { "size": 3 } } } }
        }));
    });
    let create = qdrant.mock(|when, then| {
        when.method(PUT).path("/collections/docs");
        then.status(200).json_body(json!({ "result": true }));
    });

    let store = QdrantStore::new(qdrant.base_url(), "docs".to_string());
    store.ensure_collection(DIM).await.unwrap();
    create.assert_hits(0);
}

#[tokio::test]
async fn multi_batch_ingestion_keeps_every_point_aligned() {
    let ollama = MockServer::start();
    let qdrant = MockServer::start();

    let embed = ollama.mock(|when, then| {
        when.method(POST).path("/api/embeddings");
        then.status(200).json_body(json!({ "embedding": [0.1, 0.2, 0.3] }));
    });
    // 5 chunks with upsert_batch 3 arrive as one batch of 3 and one of 2;
    // every point must still pair a uniform 128-char run with its metadata
    let upsert = qdrant.mock(|when, then| {
        when.method(PUT)
            .path("/collections/docs/points")
            .query_param("wait", "true")
            .matches(|req| {
                let Ok(body) = serde_json::from_slice::<Value>(
                    req.body.as_deref().unwrap_or_default(),
                ) else {
                    return false;
                };
                let Some(points) = body["points"].as_array() else {
                    return false;
                };
                (points.len() == 3 || points.len() == 2)
                    && points.iter().all(|p| {
                        let text = p["payload"]["text"].as_str().unwrap_or("");
                        let Some(first) = text.chars().next() else {
                            return false;
                        };
                        text.chars().count() == 128
                            && text.chars().all(|c| c == first)
                            && ('a'..='e').contains(&first)
                            && p["payload"]["file"] == json!("letters.txt")
                            && p["payload"]["project"] == json!("batching")
                    })
            });
        then.status(200).json_body(json!({ "status": "ok" }));
    });

    let app = build_router(test_state(&ollama.base_url(), &qdrant.base_url()));

    let response = app
        .clone()
        .oneshot(json_request(
            "/config",
            "POST",
            json!({
                "chunk_size": 128,
                "chunk_overlap": 0,
                "embed_batch": 2,
                "upsert_batch": 3
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let text: String = ('a'..='e').flat_map(|c| std::iter::repeat(c).take(128)).collect();
    let response = app
        .oneshot(multipart_request(
            "/ingest",
            "batching",
            &[("letters.txt", "text/plain", text.as_bytes())],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["chunks"], json!(5));

    // one remote call per chunk, batched two at a time
    embed.assert_hits(5);
    // 3 + 2 points across two upsert calls
    upsert.assert_hits(2);
}

#[tokio::test]
async fn sharepoint_item_without_file_facet_is_not_ingested() {
    let graph = MockServer::start();
    let resolve = graph.mock(|when, then| {
        when.method(GET)
            .path_contains("/shares/u!")
            .path_contains("/driveItem");
        then.status(200).json_body(json!({
            "id": "item-x",
            "name": "notebook-thing",
            "parentReference": { "driveId": "drive-9" }
        }));
    });

    let app = build_router(test_state_with_graph(
        "http://127.0.0.1:1",
        "http://127.0.0.1:1",
        Some(&graph.base_url()),
    ));
    let response = app
        .oneshot(json_request(
            "/ingest_sharepoint",
            "POST",
            json!({
                "project": "misc",
                "share_url": "https://contoso.sharepoint.com/:o:/g/notebook",
                "bearer": "tok-123"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["fetched"], json!(0));
    assert_eq!(body["chunks"], json!(0));
    resolve.assert();
}

#[tokio::test]
async fn blank_chunks_embed_as_zero_vectors_without_remote_calls() {
    let ollama = MockServer::start();
    let embed = ollama.mock(|when, then| {
        when.method(POST).path("/api/embeddings");
        then.status(200).json_body(json!({ "embedding": [0.7, 0.8, 0.9] }));
    });

    let client = Arc::new(OllamaClient::new(ollama.base_url()));
    let embedder = OllamaEmbedder::new(client, "nomic-embed-text:latest", DIM);

    use corpus_rag::providers::embedding::EmbeddingProvider;
    let vectors = embedder
        .embed_many(&[
            "first".to_string(),
            "   ".to_string(),
            "third".to_string(),
        ])
        .await
        .unwrap();

    assert_eq!(vectors.len(), 3);
    assert_eq!(vectors[1], vec![0.0; DIM]);
    assert_ne!(vectors[0], vec![0.0; DIM]);
    embed.assert_hits(2);
}
