//! Servidor web Axum com HTTP e WebSocket para segmentação e anotação por dicionários
//!
//! Rotas:
//! - `GET  /health`: verificação de vida
//! - `POST /segment`: tokens, sentenças e parágrafos em offsets de caractere
//! - `POST /annotate`: anotação com dicionários enviados na requisição
//! - `GET  /ws`: mesma anotação, com os eventos do pipeline transmitidos um a um

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use sem_core::{
    document::{PARAGRAPHS, SENTENCES, TOKENS},
    trie::{Cleaner, Splitter},
    AnnotatedSpan, AnnotationPipeline, DictionaryLabeler, Document, Language, PipelineEvent,
    RuleTokenizer, Scheme, SemError, Span, Tokenizer, Trie,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Estado compartilhado da aplicação: um tokenizador compilado por idioma.
struct AppState {
    tokenizers: HashMap<Language, Arc<RuleTokenizer>>,
}

impl AppState {
    fn new() -> Result<Self, SemError> {
        let mut tokenizers = HashMap::new();
        for language in [Language::Default, Language::French, Language::English] {
            tokenizers.insert(language, Arc::new(RuleTokenizer::for_language(language)?));
        }
        Ok(Self { tokenizers })
    }

    fn tokenizer(&self, language: Language) -> Result<Arc<RuleTokenizer>, ApiError> {
        self.tokenizers
            .get(&language)
            .cloned()
            .ok_or_else(|| ApiError::bad_request(format!("idioma sem tokenizador: {}", language.code())))
    }
}

#[derive(Deserialize)]
struct SegmentRequest {
    text: String,
    #[serde(default)]
    language: Language,
}

#[derive(Serialize)]
struct SpanView {
    start: usize,
    end: usize,
    text: String,
}

#[derive(Serialize)]
struct SegmentResponse {
    tokens: Vec<SpanView>,
    sentences: Vec<SpanView>,
    paragraphs: Vec<SpanView>,
}

/// Dicionário de um rótulo; a ordem na requisição decide empates.
#[derive(Deserialize)]
struct DictionaryRequest {
    label: String,
    entries: Vec<String>,
}

/// Corpo de `POST /annotate` e das mensagens do WebSocket.
#[derive(Deserialize)]
struct AnnotateRequest {
    text: String,
    #[serde(default)]
    language: Language,
    #[serde(default)]
    scheme: Scheme,
    #[serde(default)]
    case_insensitive: bool,
    dictionaries: Vec<DictionaryRequest>,
}

#[derive(Serialize)]
struct AnnotateResponse {
    annotations: Vec<AnnotatedSpan>,
    total_tokens: usize,
}

/// Erro de API com status HTTP, serializado como `{"error": "..."}`.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<SemError> for ApiError {
    fn from(err: SemError) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let state = Arc::new(AppState::new()?);
    let addr = std::env::var("SEM_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Servidor de anotação iniciado em http://{addr}");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/segment", post(segment_handler))
        .route("/annotate", post(annotate_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Segmentação via HTTP POST
async fn segment_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SegmentRequest>,
) -> Result<Json<SegmentResponse>, ApiError> {
    let tokenizer = state.tokenizer(req.language)?;
    let document = Document::segment("request", req.text, tokenizer.as_ref());
    info!(language = req.language.code(), chars = document.content.len(), "segmentação");

    let views = |name: &str| -> Result<Vec<SpanView>, ApiError> {
        Ok(document
            .absolute_spans(name)?
            .iter()
            .map(|span| span_view(&document, span))
            .collect())
    };
    Ok(Json(SegmentResponse {
        tokens: views(TOKENS)?,
        sentences: views(SENTENCES)?,
        paragraphs: views(PARAGRAPHS)?,
    }))
}

/// Anotação via HTTP POST (sem streaming)
async fn annotate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnnotateRequest>,
) -> Result<Json<AnnotateResponse>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::bad_request("Texto vazio"));
    }
    let pipeline = build_pipeline(&state, &req)?;
    let document = pipeline.analyze("request", &req.text)?;
    let annotations = pipeline.resolved_annotations(&document)?;
    let total_tokens = document.segmentation(TOKENS).map(|s| s.len()).unwrap_or(0);
    info!(annotations = annotations.len(), total_tokens, "anotação concluída");
    Ok(Json(AnnotateResponse {
        annotations,
        total_tokens,
    }))
}

fn build_pipeline(state: &AppState, req: &AnnotateRequest) -> Result<AnnotationPipeline, ApiError> {
    let tokenizer: Arc<dyn Tokenizer> = state.tokenizer(req.language)?;
    let cleaner = if req.case_insensitive {
        Cleaner::StripLower
    } else {
        Cleaner::Strip
    };
    let mut labeler = DictionaryLabeler::new(req.scheme.flags()).case_insensitive(req.case_insensitive);
    for dictionary in &req.dictionaries {
        let trie = Trie::compile(&dictionary.entries, cleaner, Splitter::Whitespace);
        labeler = labeler.with_dictionary(dictionary.label.clone(), trie);
    }
    Ok(AnnotationPipeline::new(tokenizer, Arc::new(labeler)).with_scheme(req.scheme.flags()))
}

fn span_view(document: &Document, span: &Span) -> SpanView {
    SpanView {
        start: span.lb(),
        end: span.ub(),
        text: document.text(span).to_string(),
    }
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Recebe uma requisição de anotação por mensagem e devolve os eventos do pipeline.
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let events = match serde_json::from_str::<AnnotateRequest>(&text) {
                    Ok(req) => run_streaming(Arc::clone(&state), req).await,
                    Err(err) => vec![PipelineEvent::Error {
                        message: format!("requisição inválida: {err}"),
                    }],
                };
                for event in &events {
                    let json = match serde_json::to_string(event) {
                        Ok(json) => json,
                        Err(err) => {
                            warn!("evento não serializável: {err}");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(json)).await.is_err() {
                        return; // cliente desconectou
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}

/// Roda o pipeline (síncrono) fora do runtime e coleta os eventos emitidos.
async fn run_streaming(state: Arc<AppState>, req: AnnotateRequest) -> Vec<PipelineEvent> {
    let pipeline = match build_pipeline(&state, &req) {
        Ok(pipeline) => pipeline,
        Err(err) => return vec![PipelineEvent::Error { message: err.message }],
    };
    info!(chars = req.text.len(), "analisando via WebSocket");

    let (tx, rx) = std::sync::mpsc::channel::<PipelineEvent>();
    let handle = tokio::task::spawn_blocking(move || {
        pipeline.analyze_streaming("ws", &req.text, tx);
    });
    if let Err(err) = handle.await {
        return vec![PipelineEvent::Error {
            message: format!("pipeline interrompido: {err}"),
        }];
    }
    rx.try_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn router() -> Router {
        app(Arc::new(AppState::new().unwrap()))
    }

    async fn post_json(uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_segment_french() {
        let (status, body) = post_json(
            "/segment",
            serde_json::json!({ "text": "Dr. Dupont est parti. Il reviendra.", "language": "fr" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tokens"][0]["text"], "Dr.");
        assert_eq!(body["sentences"].as_array().unwrap().len(), 2);
        assert_eq!(body["sentences"][1]["text"], "Il reviendra.");
        assert_eq!(body["paragraphs"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_annotate_with_dictionaries() {
        let (status, body) = post_json(
            "/annotate",
            serde_json::json!({
                "text": "I live in new york city.",
                "language": "en",
                "scheme": "bilou",
                "case_insensitive": true,
                "dictionaries": [{ "label": "LOC", "entries": ["New York", "New York City"] }]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["annotations"][0]["value"], "LOC");
        assert_eq!(body["annotations"][0]["text"], "new york city");
        assert_eq!(body["total_tokens"], 7);
    }

    #[tokio::test]
    async fn test_annotate_rejects_empty_text() {
        let (status, body) = post_json("/annotate", serde_json::json!({ "text": "  ", "dictionaries": [] })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Texto vazio");
    }

    #[tokio::test]
    async fn test_streaming_events_end_with_done() {
        let state = Arc::new(AppState::new().unwrap());
        let req: AnnotateRequest = serde_json::from_value(serde_json::json!({
            "text": "Paris. Lyon.",
            "language": "fr",
            "dictionaries": [{ "label": "LOC", "entries": ["Paris", "Lyon"] }]
        }))
        .unwrap();
        let events = run_streaming(state, req).await;
        assert!(matches!(events.first(), Some(PipelineEvent::SegmentationDone { .. })));
        match events.last() {
            Some(PipelineEvent::Done { annotations, .. }) => assert_eq!(annotations.len(), 2),
            _ => panic!("Último evento deve ser Done"),
        }
    }
}
