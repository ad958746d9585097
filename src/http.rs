use std::{fmt::Display, sync::Arc};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Request, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::{
    dispatch::PromptDispatcher,
    static_files::StaticFiles,
    types::{AiReply, AiRequest, ErrorReply, ModelsReply, ModelsRequest, ProviderKind},
};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<PromptDispatcher>,
    pub static_files: Arc<StaticFiles>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health).fallback(fallback))
        .route("/api/AIrequest", post(ai_request).fallback(fallback))
        .route("/api/models/provider", post(list_models).fallback(fallback))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

// The body is parsed by hand so malformed JSON answers 500 with the parser
// message instead of the extractor's 4xx rejection.
async fn ai_request(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorReply>)> {
    let request = AiRequest::from_json(&body).map_err(|error| {
        warn!(%error, "rejecting malformed AI request");
        internal_error(error)
    })?;

    let reply = state
        .dispatcher
        .process_prompt(&request.name, &request.string)
        .await;

    Ok((
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(AiReply { reply }),
    ))
}

async fn list_models(Json(request): Json<ModelsRequest>) -> Json<ModelsReply> {
    let models = ProviderKind::from_name(&request.provider.to_lowercase())
        .map(|kind| {
            kind.known_models()
                .iter()
                .map(|model| (*model).to_owned())
                .collect()
        })
        .unwrap_or_default();

    Json(ModelsReply { models })
}

// Also runs for known paths hit with an unrouted method, so those get the
// same static lookup or 404 as any other path.
async fn fallback(State(state): State<AppState>, request: Request) -> Response {
    match *request.method() {
        Method::GET | Method::HEAD => state.static_files.serve(request).await,
        Method::POST => StatusCode::NOT_FOUND.into_response(),
        _ => StatusCode::NOT_IMPLEMENTED.into_response(),
    }
}

fn internal_error(error: impl Display) -> (StatusCode, Json<ErrorReply>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorReply {
            error: error.to_string(),
        }),
    )
}
