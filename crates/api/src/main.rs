use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use api::{AppConfig, source_labels};
use index::VectorIndex;
use query::{AnswerComposer, QueryError};

struct AppState {
    index: VectorIndex,
    composer: AnswerComposer,
    config: AppConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    let api_key = AppConfig::api_key()?;

    // Expensive on the first run, cheap afterwards: the persisted index is
    // reused across restarts.
    let index = index::ingest(&config.ingest_config(), config.embedding_client(&api_key)).await?;
    tracing::info!(
        chunks = index.len(),
        model = index.model(),
        "knowledge base ready"
    );

    let composer = AnswerComposer::new(config.chat_client(&api_key));
    let state = Arc::new(AppState {
        index,
        composer,
        config,
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/documents", get(list_documents))
        .route("/ask", post(ask))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "serving FAQ assistant");
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    chunks: usize,
    embedding_model: String,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        chunks: state.index.len(),
        embedding_model: state.index.model().to_string(),
    })
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
    k: Option<usize>,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    sources: Vec<String>,
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, (StatusCode, String)> {
    let k = req.k.unwrap_or(state.config.retrieval.top_k);

    let result = state
        .composer
        .answer(&state.index, &req.question, k)
        .await
        .map_err(error_response)?;

    Ok(Json(AskResponse {
        answer: result.answer,
        sources: source_labels(&result.sources),
    }))
}

/// Map failures to readable responses; the user always sees a visible
/// failure rather than a silent empty answer.
fn error_response(err: QueryError) -> (StatusCode, String) {
    let status = match &err {
        QueryError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        QueryError::Index(index::IndexError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
        QueryError::Generation(_) => StatusCode::BAD_GATEWAY,
        QueryError::Index(index::IndexError::Embedding(_)) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::error!(error = %err, "failed to answer question");
    (status, err.to_string())
}

#[derive(Serialize)]
struct DocumentsResponse {
    documents: Vec<String>,
}

/// Corpus file listing for the download rail in the presentation layer.
async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DocumentsResponse>, (StatusCode, String)> {
    let mut documents = Vec::new();

    let mut entries = tokio::fs::read_dir(&state.config.corpus.docs_dir)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.ends_with(".pdf") || name.ends_with(".txt") || name.ends_with(".md") {
            documents.push(name.to_string());
        }
    }

    documents.sort();
    Ok(Json(DocumentsResponse { documents }))
}
