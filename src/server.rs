/*!
Dashboard HTTP server.

## Endpoints

- `GET /` - Dashboard page
- `GET /api/v1/layout` - Page layout (dropdown options, slider bounds, chart ids)
- `POST /api/v1/sessions` - Open a session, returns both charts
- `POST /api/v1/sessions/:id/input` - Apply one input change, returns the refreshed charts
- `DELETE /api/v1/sessions/:id` - Close a session
- `GET /api/v1/health` - Health check
*/

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::aggregate::ChartSpec;
use crate::args::Args;
use crate::dataset::Dataset;
use crate::error::DashError;
use crate::layout::DashboardLayout;
use crate::session::{ChartUpdate, InputEvent, OutputId, SessionStore};
use crate::vegalite::to_vega_lite;

const INDEX_HTML: &str = include_str!("../static/index.html");
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone)]
pub struct AppState {
    dataset: Arc<Dataset>,
    layout: Arc<DashboardLayout>,
    sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, session_ttl_mins: u64) -> Self {
        let layout = Arc::new(DashboardLayout::new(&dataset));
        Self {
            dataset,
            layout,
            sessions: Arc::new(SessionStore::new(session_ttl_mins)),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ApiSuccess<T> {
    status: String,
    data: T,
}

impl<T> ApiSuccess<T> {
    fn new(data: T) -> Json<Self> {
        Json(Self {
            status: "success".to_string(),
            data,
        })
    }
}

#[derive(Debug, Serialize)]
struct ApiError {
    status: String,
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
}

/// One refreshed chart as sent to the page.
#[derive(Debug, Serialize)]
struct OutputPayload {
    id: OutputId,
    chart: ChartSpec,
    figure: serde_json::Value,
}

impl From<ChartUpdate> for OutputPayload {
    fn from(update: ChartUpdate) -> Self {
        let figure = to_vega_lite(&update.chart);
        Self {
            id: update.output,
            chart: update.chart,
            figure,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionCreated {
    session_id: String,
    layout: DashboardLayout,
    outputs: Vec<OutputPayload>,
}

#[derive(Debug, Serialize)]
struct InputApplied {
    outputs: Vec<OutputPayload>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    records: usize,
    sessions: usize,
}

// ============================================================================
// Error Handling
// ============================================================================

struct ApiErrorResponse {
    status: StatusCode,
    error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<DashError> for ApiErrorResponse {
    fn from(err: DashError) -> Self {
        let (status, error_type) = match &err {
            DashError::DataLoad(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DataLoadError"),
            DashError::InvalidSelection(_) => (StatusCode::BAD_REQUEST, "InvalidSelectionError"),
            DashError::InvalidRange { .. } => (StatusCode::BAD_REQUEST, "InvalidRangeError"),
            DashError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "InvalidInputError"),
            DashError::UnknownSession(_) => (StatusCode::NOT_FOUND, "UnknownSessionError"),
        };

        ApiErrorResponse {
            status,
            error: ApiError {
                status: "error".to_string(),
                error: ErrorDetails {
                    message: err.to_string(),
                    error_type: error_type.to_string(),
                },
            },
        }
    }
}

// ============================================================================
// Handler Functions
// ============================================================================

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn layout_handler(State(state): State<AppState>) -> Json<ApiSuccess<DashboardLayout>> {
    ApiSuccess::new((*state.layout).clone())
}

async fn create_session_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiSuccess<SessionCreated>>) {
    let (session_id, updates) = state.sessions.create(&state.dataset);
    let created = SessionCreated {
        session_id,
        layout: (*state.layout).clone(),
        outputs: updates.into_iter().map(OutputPayload::from).collect(),
    };
    (StatusCode::CREATED, ApiSuccess::new(created))
}

async fn input_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<ApiSuccess<InputApplied>>, ApiErrorResponse> {
    let Json(body) = body.map_err(|e| DashError::InvalidInput(e.body_text()))?;
    let event = InputEvent::from_json(body)?;
    let updates = state
        .sessions
        .dispatch(&session_id, event, &state.dataset)?;
    Ok(ApiSuccess::new(InputApplied {
        outputs: updates.into_iter().map(OutputPayload::from).collect(),
    }))
}

async fn delete_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiErrorResponse> {
    if state.sessions.remove(&session_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(DashError::UnknownSession(session_id).into())
    }
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
        records: state.dataset.len(),
        sessions: state.sessions.len(),
    })
}

// ============================================================================
// Router and Server
// ============================================================================

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/v1/layout", get(layout_handler))
        .route("/api/v1/sessions", post(create_session_handler))
        .route("/api/v1/sessions/:id", delete(delete_session_handler))
        .route("/api/v1/sessions/:id/input", post(input_handler))
        .route("/api/v1/health", get(health_handler))
        .with_state(state)
}

fn cors_layer(cors_origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(vec![header::CONTENT_TYPE]);

    if cors_origin == "*" {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<_> = cors_origin
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

pub async fn serve(args: &Args, dataset: Arc<Dataset>) -> anyhow::Result<()> {
    let state = AppState::new(dataset, args.session_ttl_mins);

    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            sweeper.sessions().evict_idle();
        }
    });

    let app = router(state)
        .layer(cors_layer(&args.cors_origin))
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("Invalid host or port: {}:{}", args.host, args.port))?;

    info!(action = "start", component = "server", address = %addr, "Starting dashboard server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::small_dataset;
    use crate::record::PayloadRange;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    fn create_test_app() -> (Router, AppState) {
        let state = AppState::new(Arc::new(small_dataset()), 30);
        (router(state.clone()), state)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn open_session(app: &Router) -> serde_json::Value {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/sessions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    fn input_request(session_id: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/v1/sessions/{}/input", session_id))
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_index_serves_html() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("vega-embed"));
        assert!(html.contains("/api/v1/sessions"));
    }

    #[test]
    fn test_index_slider_has_no_native_step() {
        // A native step would snap the first thumb off the dataset's minimum payload.
        assert!(!INDEX_HTML.contains("step: c.step"));
        assert!(INDEX_HTML.contains("snap(input)"));
    }

    #[test]
    fn test_index_replays_input_after_session_expiry() {
        assert!(INDEX_HTML.contains("response.status === 404 && !retried"));
        assert!(INDEX_HTML.contains("syncControl(id, value);"));
        assert!(INDEX_HTML.contains("return sendInput(id, value, true);"));
        assert!(INDEX_HTML.contains("if (!response.ok)"));
    }

    #[tokio::test]
    async fn test_layout_endpoint() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/layout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["title"], "SpaceX Launch Records Dashboard");
        assert_eq!(json["data"]["components"][1]["options"][0]["value"], "ALL");
    }

    #[tokio::test]
    async fn test_create_session_returns_both_charts() {
        let (app, state) = create_test_app();
        let json = open_session(&app).await;

        assert!(json["data"]["sessionId"].as_str().is_some());
        let outputs = json["data"]["outputs"].as_array().unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0]["id"], "success-pie-chart");
        assert_eq!(outputs[0]["chart"]["title"], "Total Successful Launches by Site");
        assert_eq!(outputs[0]["figure"]["mark"]["type"], "arc");
        assert_eq!(outputs[1]["id"], "success-payload-scatter-chart");
        assert_eq!(outputs[1]["figure"]["data"]["values"].as_array().unwrap().len(), 3);
        assert_eq!(state.sessions().len(), 1);
    }

    #[tokio::test]
    async fn test_site_input_refreshes_both_charts() {
        let (app, _) = create_test_app();
        let created = open_session(&app).await;
        let session_id = created["data"]["sessionId"].as_str().unwrap();

        let response = app
            .oneshot(input_request(
                session_id,
                r#"{"id": "site-dropdown", "value": "A"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let outputs = json["data"]["outputs"].as_array().unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0]["chart"]["title"], "Launch Outcomes for A");
        assert_eq!(
            outputs[0]["chart"]["data"]["points"],
            serde_json::json!([
                {"category": "Success", "value": 1},
                {"category": "Failure", "value": 1},
            ])
        );
    }

    #[tokio::test]
    async fn test_payload_input_refreshes_scatter_only() {
        let (app, _) = create_test_app();
        let created = open_session(&app).await;
        let session_id = created["data"]["sessionId"].as_str().unwrap();

        let response = app
            .oneshot(input_request(
                session_id,
                r#"{"id": "payload-slider", "value": [0, 2000]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let outputs = json["data"]["outputs"].as_array().unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0]["id"], "success-payload-scatter-chart");
        assert_eq!(outputs[0]["chart"]["data"]["points"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_site_returns_empty_charts() {
        let (app, _) = create_test_app();
        let created = open_session(&app).await;
        let session_id = created["data"]["sessionId"].as_str().unwrap();

        let response = app
            .oneshot(input_request(
                session_id,
                r#"{"id": "site-dropdown", "value": "Nowhere"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        for output in json["data"]["outputs"].as_array().unwrap() {
            assert_eq!(output["figure"]["data"]["values"], serde_json::json!([]));
        }
    }

    #[tokio::test]
    async fn test_invalid_range_rejected() {
        let (app, _) = create_test_app();
        let created = open_session(&app).await;
        let session_id = created["data"]["sessionId"].as_str().unwrap();

        let response = app
            .oneshot(input_request(
                session_id,
                r#"{"id": "payload-slider", "value": [5000, 1000]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"]["type"], "InvalidRangeError");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("[5000, 1000]"));
    }

    #[tokio::test]
    async fn test_malformed_input_is_bad_request() {
        let (app, state) = create_test_app();
        let created = open_session(&app).await;
        let session_id = created["data"]["sessionId"].as_str().unwrap().to_string();

        for body in [
            r#"{"id": "color-picker", "value": "red"}"#,
            r#"{"id": "payload-slider", "value": "wide"}"#,
            r#"not json"#,
        ] {
            let response = app
                .clone()
                .oneshot(input_request(&session_id, body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");

            let json = body_json(response).await;
            assert_eq!(json["error"]["type"], "InvalidInputError");
        }

        // Rejected input leaves the session untouched
        let session = state.sessions().snapshot(&session_id).unwrap();
        assert_eq!(session.payload(), PayloadRange::new(500, 3_000).unwrap());
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(input_request(
                "does-not-exist",
                r#"{"id": "site-dropdown", "value": "ALL"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"]["type"], "UnknownSessionError");
    }

    #[tokio::test]
    async fn test_delete_session() {
        let (app, state) = create_test_app();
        let created = open_session(&app).await;
        let session_id = created["data"]["sessionId"].as_str().unwrap();

        let delete = |id: &str| {
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/sessions/{}", id))
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(delete(session_id)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.sessions().is_empty());

        let response = app.oneshot(delete(session_id)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["records"], 3);
        assert_eq!(json["sessions"], 0);
    }
}
