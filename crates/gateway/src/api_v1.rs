//! HTTP API v1 — cases, documents, simulation runs and transcripts.
//!
//! Endpoints:
//!
//! - `POST   /v1/cases`                 — Create a case
//! - `GET    /v1/cases`                 — List cases (newest first)
//! - `GET    /v1/cases/{id}`            — Full case
//! - `DELETE /v1/cases/{id}`            — Drop a case
//! - `POST   /v1/cases/{id}/upload`     — Multipart document upload (`file`)
//! - `POST   /v1/cases/{id}/documents`  — Already-extracted text
//! - `GET    /v1/cases/{id}/files`      — Upload metadata
//! - `GET    /v1/cases/{id}/analysis`   — Stored case analysis
//! - `POST   /v1/cases/{id}/analysis`   — Analyze the case document
//! - `POST   /v1/cases/{id}/run`        — Run the simulation
//! - `GET    /v1/cases/{id}/transcript` — Turns, citations and verdict
//! - `GET    /v1/cases/{id}/export.txt` — Plain-text transcript download
//! - `GET    /v1/knowledge-base`        — Packaged legal principles
//! - `GET    /v1/status`                — Runtime status

use axum::{
    Router,
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use mocktrial_core::case::{Case, CaseFile, CaseStatus};
use mocktrial_core::error::{IngestError, ProviderError, TrialError};
use mocktrial_core::event::{DomainEvent, EventBus};
use mocktrial_core::trial::{CaseAnalysis, RunConfig, Turn, Verdict};
use mocktrial_providers::router::ProviderRouter;
use mocktrial_trial::{
    ContextAssembler, KnowledgeBase, ModelClient, Principle, TrialOrchestrator, export, ingest,
};

use crate::store::{CaseHandle, CaseStore, CaseSummary};

// ── State ─────────────────────────────────────────────────────────────────

/// Shared state for the v1 API.
pub struct ApiV1State {
    pub providers: ProviderRouter,
    pub knowledge_base: Arc<KnowledgeBase>,
    pub event_bus: Arc<EventBus>,
    pub cases: CaseStore,
    pub config: mocktrial_config::AppConfig,
    pub start_time: chrono::DateTime<Utc>,
}

pub type SharedApiState = Arc<ApiV1State>;

impl ApiV1State {
    pub fn new(
        config: mocktrial_config::AppConfig,
        providers: ProviderRouter,
        knowledge_base: Arc<KnowledgeBase>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            providers,
            knowledge_base,
            event_bus,
            cases: CaseStore::new(config.gateway.max_cases),
            config,
            start_time: Utc::now(),
        }
    }

    async fn case(&self, id: &str) -> ApiResult<CaseHandle> {
        self.cases
            .get(id)
            .await
            .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Case '{id}' not found")))
    }

    /// Orchestrator bound to the provider that serves `model`, plus the model
    /// name as that provider expects it.
    fn orchestrator_for(&self, model: &str) -> Result<(TrialOrchestrator, String), TrialError> {
        let (provider, model) = self.providers.resolve(model).ok_or_else(|| {
            ProviderError::NotConfigured(format!("no provider available for model '{model}'"))
        })?;

        let orchestrator = TrialOrchestrator::new(
            ModelClient::new(provider).with_max_tokens(self.config.default_max_tokens),
            ContextAssembler::new(self.knowledge_base.clone()),
        )
        .with_retrieval_k(self.config.simulation.retrieval_k)
        .with_event_bus(self.event_bus.clone());

        Ok((orchestrator, model))
    }

    /// Configured run defaults overlaid with the fields present in `body`.
    fn run_config(&self, body: &[u8]) -> ApiResult<RunConfig> {
        let mut config = serde_json::to_value(self.config.run_defaults())
            .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

        if !body.iter().all(u8::is_ascii_whitespace) {
            let patch: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
                api_error(StatusCode::BAD_REQUEST, format!("Invalid run config: {e}"))
            })?;
            if !patch.is_object() {
                return Err(api_error(
                    StatusCode::BAD_REQUEST,
                    "Run config must be a JSON object",
                ));
            }
            merge_json(&mut config, &patch);
        }

        serde_json::from_value(config)
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid run config: {e}")))
    }

    async fn ingest(
        &self,
        handle: &CaseHandle,
        text: String,
        file: Option<CaseFile>,
    ) -> ApiResult<Json<IngestResponse>> {
        let mut case = handle.lock().await;
        let summary = ingest::ingest_text(
            &mut case,
            text,
            self.config.ingest.chunk_size,
            self.config.ingest.chunk_overlap,
        )
        .map_err(ingest_error)?;
        if let Some(file) = file {
            case.record_file(file);
        }

        self.event_bus.publish(DomainEvent::DocumentIngested {
            case_id: case.id.to_string(),
            chars: summary.chars,
            chunks: summary.chunks,
            timestamp: Utc::now(),
        });

        Ok(Json(IngestResponse {
            ok: true,
            chars: summary.chars,
            chunks: summary.chunks,
        }))
    }
}

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/cases", get(list_cases_handler).post(create_case_handler))
        .route(
            "/cases/{id}",
            get(get_case_handler).delete(delete_case_handler),
        )
        .route("/cases/{id}/upload", post(upload_handler))
        .route("/cases/{id}/documents", post(documents_handler))
        .route("/cases/{id}/files", get(files_handler))
        .route(
            "/cases/{id}/analysis",
            get(get_analysis_handler).post(analyze_handler),
        )
        .route("/cases/{id}/run", post(run_handler))
        .route("/cases/{id}/transcript", get(transcript_handler))
        .route("/cases/{id}/export.txt", get(export_handler))
        .route("/knowledge-base", get(knowledge_base_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn busy(id: &str) -> (StatusCode, Json<ErrorResponse>) {
    api_error(
        StatusCode::CONFLICT,
        format!("Case '{id}' is being simulated; try again when the run finishes"),
    )
}

fn ingest_error(e: IngestError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        IngestError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        IngestError::ReadError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        IngestError::UnsupportedFormat(_) | IngestError::EmptyDocument => StatusCode::BAD_REQUEST,
    };
    api_error(status, e.to_string())
}

fn trial_error(e: TrialError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        TrialError::NoChunks(_) | TrialError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
        TrialError::Provider(ProviderError::NotConfigured(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        TrialError::Provider(_)
        | TrialError::Parse { .. }
        | TrialError::InvalidVerdict(_)
        | TrialError::InvalidAnalysis(_) => StatusCode::BAD_GATEWAY,
    };
    api_error(status, e.to_string())
}

#[derive(Default, Deserialize)]
struct CreateCaseRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct CaseListResponse {
    cases: Vec<CaseSummary>,
    count: usize,
}

#[derive(Deserialize)]
struct DocumentRequest {
    text: String,
}

#[derive(Serialize, Deserialize)]
struct IngestResponse {
    ok: bool,
    chars: usize,
    chunks: usize,
}

#[derive(Serialize, Deserialize)]
struct FileListResponse {
    files: Vec<CaseFile>,
    count: usize,
}

#[derive(Serialize, Deserialize)]
struct RunResponse {
    ok: bool,
    case_id: String,
    status: CaseStatus,
    turns: usize,
    verdict: Option<Verdict>,
}

#[derive(Serialize, Deserialize)]
struct TurnDto {
    #[serde(flatten)]
    turn: Turn,
    /// Citations matching neither a chunk nor a principle.
    unresolved_citations: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct TranscriptResponse {
    case_id: String,
    status: CaseStatus,
    turns: Vec<TurnDto>,
    verdict: Option<Verdict>,
}

#[derive(Serialize, Deserialize)]
struct KnowledgeBaseResponse {
    version: u32,
    count: usize,
    principles: Vec<Principle>,
}

#[derive(Serialize, Deserialize)]
struct StatusResponse {
    status: String,
    version: String,
    uptime_secs: i64,
    cases: usize,
    default_provider: String,
    default_model: String,
    providers: Vec<String>,
    principles: usize,
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn create_case_handler(
    State(state): State<SharedApiState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Case>)> {
    let req: CreateCaseRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateCaseRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid request: {e}")))?
    };

    let title = req
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "New Case".into());
    let case = Case::new(title).with_description(req.description.unwrap_or_default());
    let handle = state.cases.insert(case).await;
    let snapshot = handle.lock().await.clone();
    info!(case_id = %snapshot.id, title = %snapshot.title, "Case created");

    Ok((StatusCode::CREATED, Json(snapshot)))
}

async fn list_cases_handler(State(state): State<SharedApiState>) -> Json<CaseListResponse> {
    let cases = state.cases.list().await;
    Json(CaseListResponse {
        count: cases.len(),
        cases,
    })
}

async fn get_case_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Case>> {
    let handle = state.case(&id).await?;
    let case = handle.try_lock().map_err(|_| busy(&id))?;
    Ok(Json(case.clone()))
}

async fn delete_case_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.cases.remove(&id).await {
        info!(case_id = %id, "Case deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Case '{id}' not found"),
        ))
    }
}

async fn upload_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<IngestResponse>> {
    let handle = state.case(&id).await?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid upload: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload.txt").to_string();
            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid upload: {e}")))?;
            upload = Some((filename, mime_type, bytes));
            break;
        }
    }

    let (filename, mime_type, bytes) = upload
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing multipart field 'file'"))?;

    let limit = state.config.gateway.max_upload_bytes;
    if bytes.len() > limit {
        return Err(ingest_error(IngestError::TooLarge {
            size: bytes.len(),
            limit,
        }));
    }

    let text = ingest::extract_text(&filename, &bytes).map_err(|e| {
        warn!(case_id = %id, file = %filename, error = %e, "Upload rejected");
        ingest_error(e)
    })?;
    let file = CaseFile::new(filename, bytes.len(), mime_type);
    state.ingest(&handle, text, Some(file)).await
}

async fn documents_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
    Json(req): Json<DocumentRequest>,
) -> ApiResult<Json<IngestResponse>> {
    let handle = state.case(&id).await?;
    state.ingest(&handle, req.text, None).await
}

async fn files_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<FileListResponse>> {
    let handle = state.case(&id).await?;
    let case = handle.try_lock().map_err(|_| busy(&id))?;
    Ok(Json(FileListResponse {
        count: case.files.len(),
        files: case.files.clone(),
    }))
}

async fn get_analysis_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CaseAnalysis>> {
    let handle = state.case(&id).await?;
    let case = handle.try_lock().map_err(|_| busy(&id))?;
    case.analysis.clone().map(Json).ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            format!("No analysis available for case '{id}'"),
        )
    })
}

async fn analyze_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<CaseAnalysis>> {
    let handle = state.case(&id).await?;
    let mut config = state.run_config(&body)?;
    let (orchestrator, model) = state.orchestrator_for(&config.model).map_err(trial_error)?;
    config.model = model;

    let mut case = handle.lock().await;
    let analysis = orchestrator
        .analyze(&mut case, &config)
        .await
        .map_err(trial_error)?;
    Ok(Json(analysis.clone()))
}

async fn run_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<RunResponse>> {
    let handle = state.case(&id).await?;
    let mut config = state.run_config(&body)?;
    let (orchestrator, model) = state.orchestrator_for(&config.model).map_err(trial_error)?;
    config.model = model;

    let mut case = handle.lock().await;
    let case = orchestrator
        .run_sim(&mut case, &config)
        .await
        .map_err(trial_error)?;

    Ok(Json(RunResponse {
        ok: true,
        case_id: case.id.to_string(),
        status: case.status,
        turns: case.transcript.len(),
        verdict: case.verdict.clone(),
    }))
}

async fn transcript_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TranscriptResponse>> {
    let handle = state.case(&id).await?;
    let case = handle.try_lock().map_err(|_| busy(&id))?;
    let kb = &state.knowledge_base;

    let turns = case
        .transcript
        .iter()
        .map(|turn| TurnDto {
            unresolved_citations: turn.unresolved_citations(case.chunks.len(), |key| kb.contains(key)),
            turn: turn.clone(),
        })
        .collect();

    Ok(Json(TranscriptResponse {
        case_id: case.id.to_string(),
        status: case.status,
        turns,
        verdict: case.verdict.clone(),
    }))
}

async fn export_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let handle = state.case(&id).await?;
    let case = handle.try_lock().map_err(|_| busy(&id))?;
    let text = export::render_text(&case);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=transcript.txt",
            ),
        ],
        text,
    ))
}

async fn knowledge_base_handler(State(state): State<SharedApiState>) -> Json<KnowledgeBaseResponse> {
    let kb = &state.knowledge_base;
    Json(KnowledgeBaseResponse {
        version: kb.version(),
        count: kb.len(),
        principles: kb.principles().to_vec(),
    })
}

async fn status_handler(State(state): State<SharedApiState>) -> Json<StatusResponse> {
    let mut providers: Vec<String> = state.providers.list().into_iter().map(String::from).collect();
    providers.sort();

    Json(StatusResponse {
        status: "running".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_secs: (Utc::now() - state.start_time).num_seconds(),
        cases: state.cases.len().await,
        default_provider: state.config.default_provider.clone(),
        default_model: state.config.default_model.clone(),
        providers,
        principles: state.knowledge_base.len(),
    })
}

fn merge_json(base: &mut serde_json::Value, patch: &serde_json::Value) {
    if let (serde_json::Value::Object(base_map), serde_json::Value::Object(patch_map)) =
        (base, patch)
    {
        for (key, value) in patch_map {
            base_map.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use mocktrial_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
    use mocktrial_core::trial::VerdictKind;
    use tower::ServiceExt;

    const VERDICT: &str = r#"{"verdict": "Not Guilty", "rationale": "The identification [doc:0] is weak [kb:eyewitness-reliability]."}"#;

    const ANALYSIS: &str = r#"{"summary": "Disputed identification at a market.",
        "keyFacts": ["Grey hoodie on CCTV"], "legalIssues": ["identification"],
        "potentialArguments": {"prosecution": ["footage"], "defense": ["no fingerprint match"]}}"#;

    /// Answers analysis requests with an analysis, other JSON-mode requests
    /// with a verdict and everything else with citing prose.
    struct MockProvider {
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "gateway_mock"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            if self.fail {
                return Err(ProviderError::Network("connection refused".into()));
            }
            let text = if request.messages[0].content.contains("legal expert") {
                ANALYSIS.to_string()
            } else if request.json_mode {
                VERDICT.to_string()
            } else {
                "As [doc:0] shows, and per [kb:burden-of-proof] and [doc:99].".to_string()
            };
            Ok(ProviderResponse {
                message: mocktrial_core::message::Message::assistant(text),
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
                model: "mock-model".into(),
            })
        }
    }

    fn test_api_state_with(fail: bool) -> SharedApiState {
        let mut config = mocktrial_config::AppConfig::default();
        config.default_provider = "mock".into();
        config.default_model = "mock-model".into();

        let mut providers = ProviderRouter::new("mock");
        providers.register("mock", Arc::new(MockProvider { fail }));

        let kb = Arc::new(KnowledgeBase::builtin().unwrap());
        Arc::new(ApiV1State::new(
            config,
            providers,
            kb,
            Arc::new(EventBus::default()),
        ))
    }

    fn test_api_state() -> SharedApiState {
        test_api_state_with(false)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Bytes) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn create_case(app: &Router, title: &str) -> String {
        let (status, body) = send(app, post_json("/cases", serde_json::json!({ "title": title }))).await;
        assert_eq!(status, StatusCode::CREATED);
        let case: serde_json::Value = serde_json::from_slice(&body).unwrap();
        case["id"].as_str().unwrap().to_string()
    }

    async fn ingest_doc(app: &Router, id: &str) {
        let text = "CCTV footage from the marketplace shows a figure in a grey hoodie. \
                    The witness could not recall the phone number. \
                    Fingerprints on the stall were never compared.";
        let (status, _) = send(
            app,
            post_json(&format!("/cases/{id}/documents"), serde_json::json!({ "text": text })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    fn multipart(filename: &str, content: &[u8]) -> (String, Vec<u8>) {
        let boundary = "mocktrialboundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={boundary}"), body)
    }

    #[tokio::test]
    async fn create_list_and_get_case() {
        let app = v1_router(test_api_state());
        let id = create_case(&app, "State v. Doe").await;

        let (status, body) = send(&app, get("/cases")).await;
        assert_eq!(status, StatusCode::OK);
        let list: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(list["count"], 1);
        assert_eq!(list["cases"][0]["status"], "created");

        let (status, body) = send(&app, get(&format!("/cases/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        let case: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(case["title"], "State v. Doe");
        assert!(case.get("raw_text").is_none());
    }

    #[tokio::test]
    async fn create_case_without_body_uses_default_title() {
        let app = v1_router(test_api_state());
        let req = Request::builder()
            .method("POST")
            .uri("/cases")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::CREATED);
        let case: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(case["title"], "New Case");
    }

    #[tokio::test]
    async fn unknown_case_is_404() {
        let app = v1_router(test_api_state());
        let (status, body) = send(&app, get("/cases/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(err.error.contains("nope"));
    }

    #[tokio::test]
    async fn upload_multipart_text() {
        let app = v1_router(test_api_state());
        let id = create_case(&app, "Upload").await;

        let (content_type, body) = multipart("brief.txt", b"The witness saw a hoodie.\r\nNothing else.");
        let req = Request::builder()
            .method("POST")
            .uri(format!("/cases/{id}/upload"))
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        let resp: IngestResponse = serde_json::from_slice(&body).unwrap();
        assert!(resp.ok);
        assert_eq!(resp.chunks, 1);
        assert!(resp.chars > 0);
    }

    #[tokio::test]
    async fn upload_pdf_is_rejected() {
        let app = v1_router(test_api_state());
        let id = create_case(&app, "Pdf").await;

        let (content_type, body) = multipart("brief.pdf", b"%PDF-1.4 binary");
        let req = Request::builder()
            .method("POST")
            .uri(format!("/cases/{id}/upload"))
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_document_is_rejected() {
        let app = v1_router(test_api_state());
        let id = create_case(&app, "Empty").await;
        let (status, _) = send(
            &app,
            post_json(&format!("/cases/{id}/documents"), serde_json::json!({ "text": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn run_without_document_is_400() {
        let app = v1_router(test_api_state());
        let id = create_case(&app, "No doc").await;
        let (status, body) = send(&app, post_json(&format!("/cases/{id}/run"), serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(err.error.contains("no ingested chunks"));
    }

    #[tokio::test]
    async fn full_run_then_transcript_and_export() {
        let app = v1_router(test_api_state());
        let id = create_case(&app, "State v. Doe").await;
        ingest_doc(&app, &id).await;

        let (status, body) = send(&app, post_json(&format!("/cases/{id}/run"), serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        let run: RunResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(run.turns, 10);
        assert_eq!(run.status, CaseStatus::Completed);
        assert_eq!(run.verdict.unwrap().verdict, VerdictKind::NotGuilty);

        let (status, body) = send(&app, get(&format!("/cases/{id}/transcript"))).await;
        assert_eq!(status, StatusCode::OK);
        let transcript: TranscriptResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(transcript.turns.len(), 10);
        let first = &transcript.turns[0];
        assert!(first.turn.citations.contains("doc:0"));
        assert_eq!(first.unresolved_citations, vec!["doc:99".to_string()]);
        assert!(transcript.turns[8].unresolved_citations.is_empty());

        let (status, body) = send(&app, get(&format!("/cases/{id}/export.txt"))).await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("Case: State v. Doe\n\n[OPENING] Prosecution:\n"));
        assert!(text.contains("VERDICT:\n{\n  \"verdict\": \"Not Guilty\""));
    }

    #[tokio::test]
    async fn rerun_keeps_ten_turns() {
        let app = v1_router(test_api_state());
        let id = create_case(&app, "Twice").await;
        ingest_doc(&app, &id).await;

        for _ in 0..2 {
            let (status, _) = send(&app, post_json(&format!("/cases/{id}/run"), serde_json::json!({}))).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (_, body) = send(&app, get(&format!("/cases/{id}/transcript"))).await;
        let transcript: TranscriptResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(transcript.turns.len(), 10);
    }

    #[tokio::test]
    async fn invalid_run_config_is_400() {
        let app = v1_router(test_api_state());
        let id = create_case(&app, "Bad config").await;
        ingest_doc(&app, &id).await;

        let (status, _) = send(
            &app,
            post_json(&format!("/cases/{id}/run"), serde_json::json!({ "strictness": 3.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            post_json(&format!("/cases/{id}/run"), serde_json::json!(["not", "an", "object"])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn provider_failure_is_502_and_marks_case_failed() {
        let app = v1_router(test_api_state_with(true));
        let id = create_case(&app, "Offline").await;
        ingest_doc(&app, &id).await;

        let (status, _) = send(&app, post_json(&format!("/cases/{id}/run"), serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (_, body) = send(&app, get(&format!("/cases/{id}"))).await;
        let case: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(case["status"], "failed");
        assert!(case["last_error"].as_str().unwrap().contains("connection refused"));
        assert!(case["verdict"].is_null());
    }

    #[tokio::test]
    async fn delete_case() {
        let app = v1_router(test_api_state());
        let id = create_case(&app, "Gone").await;

        let req = Request::builder()
            .method("DELETE")
            .uri(format!("/cases/{id}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, get(&format!("/cases/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn busy_case_reads_are_409() {
        let state = test_api_state();
        let app = v1_router(state.clone());
        let id = create_case(&app, "Busy").await;

        let handle = state.cases.get(&id).await.unwrap();
        let _guard = handle.lock().await;
        let (status, _) = send(&app, get(&format!("/cases/{id}/transcript"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn analyze_then_read_back() {
        let app = v1_router(test_api_state());
        let id = create_case(&app, "Analysis").await;

        let (status, _) = send(&app, get(&format!("/cases/{id}/analysis"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        ingest_doc(&app, &id).await;
        let (status, body) = send(
            &app,
            post_json(&format!("/cases/{id}/analysis"), serde_json::json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let analysis: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(analysis["key_facts"][0], "Grey hoodie on CCTV");
        assert_eq!(analysis["potential_arguments"]["defense"][0], "no fingerprint match");

        let (status, body) = send(&app, get(&format!("/cases/{id}/analysis"))).await;
        assert_eq!(status, StatusCode::OK);
        let stored: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(stored, analysis);
    }

    #[tokio::test]
    async fn analyze_without_document_is_400() {
        let app = v1_router(test_api_state());
        let id = create_case(&app, "Bare").await;
        let req = Request::builder()
            .method("POST")
            .uri(format!("/cases/{id}/analysis"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn uploads_are_listed_with_metadata() {
        let app = v1_router(test_api_state());
        let id = create_case(&app, "Files").await;
        let content = b"The witness saw a hoodie.";

        let (content_type, body) = multipart("brief.txt", content);
        let req = Request::builder()
            .method("POST")
            .uri(format!("/cases/{id}/upload"))
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        ingest_doc(&app, &id).await;

        let (status, body) = send(&app, get(&format!("/cases/{id}/files"))).await;
        assert_eq!(status, StatusCode::OK);
        let list: FileListResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(list.count, 1);
        assert_eq!(list.files[0].filename, "brief.txt");
        assert_eq!(list.files[0].size, content.len());
        assert_eq!(list.files[0].mime_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn knowledge_base_listing() {
        let app = v1_router(test_api_state());
        let (status, body) = send(&app, get("/knowledge-base")).await;
        assert_eq!(status, StatusCode::OK);
        let kb: KnowledgeBaseResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(kb.count, kb.principles.len());
        assert!(kb.principles.iter().any(|p| p.id == "presumption-innocence"));
    }

    #[tokio::test]
    async fn status_reports_cases_and_providers() {
        let app = v1_router(test_api_state());
        create_case(&app, "One").await;
        let (status, body) = send(&app, get("/status")).await;
        assert_eq!(status, StatusCode::OK);
        let resp: StatusResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.cases, 1);
        assert_eq!(resp.providers, vec!["mock".to_string()]);
        assert_eq!(resp.default_model, "mock-model");
    }

    #[test]
    fn run_config_merges_over_defaults() {
        let state = test_api_state();
        let config = state.run_config(br#"{"seed": 99}"#).unwrap();
        assert_eq!(config.seed, 99);
        assert_eq!(config.model, "mock-model");

        let config = state.run_config(b"  ").unwrap();
        assert_eq!(config, state.config.run_defaults());
    }
}
