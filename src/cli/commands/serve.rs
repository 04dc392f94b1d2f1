//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for transcripts, summaries and questions.
//! Only YouTube inputs are accepted; local transcript files stay private.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings, TranscriptSettings};
use crate::error::TldwError;
use crate::llm::{create_model, LanguageModel};
use crate::qa::QuestionAnswerer;
use crate::reduction::ReductionLimits;
use crate::summarize::Summarizer;
use crate::transcript::{parse_input, SourceType, Transcript};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

/// Number of transcripts the server keeps before dropping the oldest.
const MAX_CACHED_TRANSCRIPTS: usize = 64;

/// Fetched transcripts, oldest first.
struct TranscriptCache {
    capacity: usize,
    entries: VecDeque<(String, Arc<Transcript>)>,
}

impl TranscriptCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    fn get(&self, id: &str) -> Option<Arc<Transcript>> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, transcript)| transcript.clone())
    }

    fn insert(&mut self, id: String, transcript: Arc<Transcript>) {
        self.entries.retain(|(key, _)| *key != id);
        self.entries.push_back((id, transcript));

        while self.entries.len() > self.capacity {
            if let Some((evicted, _)) = self.entries.pop_front() {
                debug!("Evicted transcript {} from cache", evicted);
            }
        }
    }
}

/// Shared application state.
struct AppState {
    summarizer: Summarizer,
    answerer: QuestionAnswerer,
    transcript_settings: TranscriptSettings,
    transcripts: RwLock<TranscriptCache>,
}

impl AppState {
    fn new(
        model: Arc<dyn LanguageModel>,
        prompts: Prompts,
        limits: ReductionLimits,
        transcript_settings: TranscriptSettings,
    ) -> Self {
        Self {
            summarizer: Summarizer::new(model.clone(), limits).with_prompts(prompts.clone()),
            answerer: QuestionAnswerer::new(model, limits).with_prompts(prompts),
            transcript_settings,
            transcripts: RwLock::new(TranscriptCache::new(MAX_CACHED_TRANSCRIPTS)),
        }
    }

    /// Fetch a transcript, or reuse one fetched by an earlier request.
    async fn transcript(&self, input: &str) -> Result<Arc<Transcript>, TldwError> {
        let (source, id) = parse_input(input, &self.transcript_settings)?;
        if source.source_type() == SourceType::Local {
            return Err(TldwError::InvalidInput(format!(
                "Local transcript files are not served over HTTP: {}",
                input
            )));
        }

        if let Some(transcript) = self.transcripts.read().await.get(&id) {
            debug!("Transcript cache hit for {}", id);
            return Ok(transcript);
        }

        let transcript = Arc::new(source.fetch(&id).await?);
        info!("Cached transcript for {} ({} chars)", id, transcript.char_count());
        self.transcripts.write().await.insert(id, transcript.clone());
        Ok(transcript)
    }
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/transcript", post(transcript))
        .route("/summarize", post(summarize))
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Model, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let state = Arc::new(AppState::new(
        create_model(&settings.model)?,
        prompts,
        settings.reduction_limits()?,
        settings.transcript.clone(),
    ));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("tldw API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Transcript", "POST /transcript");
    Output::kv("Summarize", "POST /summarize");
    Output::kv("Ask", "POST /ask");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct TranscriptRequest {
    /// YouTube URL or video ID
    input: String,
}

#[derive(Serialize)]
struct TranscriptResponse {
    video_id: String,
    chars: usize,
    text: String,
}

#[derive(Serialize)]
struct SummarizeResponse {
    video_id: String,
    summary: String,
}

#[derive(Deserialize)]
struct AskRequest {
    input: String,
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    video_id: String,
    question: String,
    answer: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Library error rendered as a JSON error response.
struct ApiError(TldwError);

impl From<TldwError> for ApiError {
    fn from(error: TldwError) -> Self {
        Self(error)
    }
}

fn status_for(error: &TldwError) -> StatusCode {
    match error {
        TldwError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        TldwError::TranscriptUnavailable(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            status_for(&self.0),
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn transcript(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranscriptRequest>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let transcript = state.transcript(&req.input).await?;

    Ok(Json(TranscriptResponse {
        video_id: transcript.video_id.clone(),
        chars: transcript.char_count(),
        text: transcript.text.clone(),
    }))
}

async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranscriptRequest>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let transcript = state.transcript(&req.input).await?;
    let summary = state.summarizer.summarize(&transcript.text).await?;

    Ok(Json(SummarizeResponse {
        video_id: transcript.video_id.clone(),
        summary,
    }))
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let question = req.question.trim();
    if question.is_empty() {
        return Err(TldwError::InvalidInput("Question is empty".to_string()).into());
    }

    let transcript = state.transcript(&req.input).await?;
    let answer = state.answerer.answer(question, &transcript.text).await?;

    Ok(Json(AskResponse {
        video_id: transcript.video_id.clone(),
        question: question.to_string(),
        answer,
    }))
}
