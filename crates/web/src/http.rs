//! Axum host for the field layout control panel.

use std::net::SocketAddr;
use std::sync::Arc;

use adwizard_store::{FIELD_LAYOUTS_FILE_NAME, JsonFieldLayoutStore, JsonLayoutStore, LAYOUTS_FILE_NAME};
use adwizard_types::{BodyParams, FieldLayout};
use anyhow::{Context, Result, anyhow};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::config::AdWizardConfig;
use crate::controller::FieldLayoutsController;
use crate::error::HandlerError;
use crate::i18n::Translator;
use crate::request::{ActionRequest, ActionResponse, RouteContext};
use crate::session::{Identity, InMemorySessionGateway};
use crate::urls::UrlBuilder;
use crate::view::JsonViewRenderer;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "adwizard_session";

/// Username given to callers signed in with the configured token.
const TOKEN_USERNAME: &str = "admin";

/// Shared server state.
pub struct AppState {
    controller: FieldLayoutsController,
    sessions: Arc<InMemorySessionGateway>,
    auth_token: Option<String>,
}

impl AppState {
    pub fn new(controller: FieldLayoutsController, sessions: Arc<InMemorySessionGateway>, auth_token: Option<String>) -> Self {
        Self {
            controller,
            sessions,
            auth_token,
        }
    }

    /// Wire the JSON-backed stores and default collaborators from configuration.
    pub fn open(config: &AdWizardConfig) -> Result<Self> {
        let data_dir = config.data_dir();
        let layouts = Arc::new(
            JsonLayoutStore::open(data_dir.join(LAYOUTS_FILE_NAME))
                .with_context(|| format!("open layout store in {}", data_dir.display()))?,
        );
        let field_layouts = Arc::new(
            JsonFieldLayoutStore::open(data_dir.join(FIELD_LAYOUTS_FILE_NAME), layouts.clone())
                .with_context(|| format!("open field layout store in {}", data_dir.display()))?,
        );
        let sessions = Arc::new(InMemorySessionGateway::new(config.session_max_age()));
        let controller = FieldLayoutsController::new(
            field_layouts,
            layouts,
            sessions.clone(),
            Arc::new(JsonViewRenderer::new()),
            UrlBuilder::new(config.cp_base_url()?),
            Translator::new(config.translations.clone()),
        );
        Ok(Self::new(controller, sessions, config.auth_token().map(str::to_string)))
    }

    /// Resolve the caller's session and sign it in when the bearer token matches.
    fn begin(&self, headers: &HeaderMap, method: Method, body: BodyParams) -> HttpRequest {
        let session = self.sessions.resume(session_cookie(headers).as_deref());
        if let Some(expected) = self.auth_token.as_deref()
            && bearer_token(headers).is_some_and(|token| token == expected)
        {
            self.sessions.sign_in(&session, Identity::new(TOKEN_USERNAME));
        }
        let accepts_json = headers
            .get(ACCEPT)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|accept| accept.contains("application/json"));

        HttpRequest {
            action: ActionRequest {
                method,
                accepts_json,
                session,
                body,
            },
        }
    }
}

/// Build the control panel routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ad-wizard/fieldlayouts", get(index))
        .route("/ad-wizard/fieldlayouts/new", get(new_field_layout))
        .route("/ad-wizard/fieldlayouts/save", post(save_field_layout))
        .route("/ad-wizard/fieldlayouts/delete", post(delete_field_layout))
        .route("/ad-wizard/fieldlayouts/{field_layout_id}", get(edit_field_layout))
        .with_state(state)
}

/// Host configuration for the control panel HTTP server.
pub struct AdWizardHttpServer {
    bind_address: SocketAddr,
    state: Arc<AppState>,
}

impl AdWizardHttpServer {
    pub fn new(bind_address: SocketAddr, state: Arc<AppState>) -> Self {
        Self { bind_address, state }
    }

    /// Start the server and return a handle for inspection and shutdown.
    pub async fn start(self) -> Result<RunningAdWizardHttpServer> {
        let cancellation_token = CancellationToken::new();
        let listener = tokio::net::TcpListener::bind(self.bind_address)
            .await
            .with_context(|| format!("bind {}", self.bind_address))?;
        let bound_address = listener.local_addr()?;
        let app = router(self.state);

        let server_handle = tokio::spawn({
            let shutdown = cancellation_token.child_token();
            async move {
                if let Err(error) = axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        shutdown.cancelled().await;
                    })
                    .await
                {
                    warn!(%error, "control panel server stopped with an error");
                }
            }
        });

        Ok(RunningAdWizardHttpServer {
            bind_address: bound_address,
            cancellation_token,
            server_handle,
        })
    }
}

/// Runtime handle for a running control panel server.
#[derive(Debug)]
pub struct RunningAdWizardHttpServer {
    bind_address: SocketAddr,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<()>,
}

impl RunningAdWizardHttpServer {
    pub fn bound_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Stop the server and wait for in-flight requests to finish.
    pub async fn stop(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.server_handle
            .await
            .map_err(|error| anyhow!("control panel server task failed: {error}"))
    }
}

struct HttpRequest {
    action: ActionRequest,
}

impl HttpRequest {
    fn respond(&self, response: ActionResponse) -> Response {
        let mut http_response = match response {
            ActionResponse::View(view) => ([(CONTENT_TYPE, view.content_type)], view.body).into_response(),
            ActionResponse::Redirect(location) => (StatusCode::FOUND, [(LOCATION, location)]).into_response(),
            ActionResponse::Json(value) => Json(value).into_response(),
            ActionResponse::Empty => StatusCode::NO_CONTENT.into_response(),
        };
        self.attach_session(&mut http_response);
        http_response
    }

    fn fail(&self, error: HandlerError) -> Response {
        let status = error.status_code();
        if status.is_server_error() {
            warn!(%error, "request failed");
        } else {
            debug!(%error, "request rejected");
        }
        let message = error.public_message();
        let mut response = if self.action.accepts_json {
            (status, Json(json!({ "error": message }))).into_response()
        } else {
            (status, message).into_response()
        };
        self.attach_session(&mut response);
        response
    }

    fn finish(&self, result: Result<ActionResponse, HandlerError>) -> Response {
        match result {
            Ok(response) => self.respond(response),
            Err(error) => self.fail(error),
        }
    }

    fn attach_session(&self, response: &mut Response) {
        let cookie = format!("{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.action.session);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(SET_COOKIE, value);
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let request = state.begin(&headers, Method::GET, BodyParams::new());
    request.finish(state.controller.index(&request.action))
}

async fn new_field_layout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let request = state.begin(&headers, Method::GET, BodyParams::new());
    request.finish(
        state
            .controller
            .edit_field_layout(&request.action, None, Default::default()),
    )
}

async fn edit_field_layout(
    State(state): State<Arc<AppState>>,
    Path(field_layout_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let request = state.begin(&headers, Method::GET, BodyParams::new());
    request.finish(
        state
            .controller
            .edit_field_layout(&request.action, Some(field_layout_id), Default::default()),
    )
}

async fn save_field_layout(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> Response {
    let request = state.begin(&headers, Method::POST, parse_form(&body));
    let outcome = match state.controller.save_field_layout(&request.action) {
        Ok(outcome) => outcome,
        Err(error) => return request.fail(error),
    };
    if !outcome.response.is_empty() {
        return request.respond(outcome.response);
    }

    // Nothing to send back: show the edit form the layout was posted from.
    let field_layout_id = request.action.body.parse::<i64>("fieldLayoutId").ok().flatten();
    let context = carried_or_posted(outcome.context, field_layout_id, &request.action.body);
    request.finish(
        state
            .controller
            .edit_field_layout(&request.action, field_layout_id, context),
    )
}

/// Keep the carried layout, or rebuild one from the posted fields so the
/// edit form never goes back to the store after a failed save.
fn carried_or_posted(context: RouteContext, field_layout_id: Option<i64>, body: &BodyParams) -> RouteContext {
    if context.field_layout.is_some() {
        return context;
    }
    RouteContext::with_field_layout(FieldLayout::new(field_layout_id, body.get("name").map(str::to_string)))
}

async fn delete_field_layout(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> Response {
    let request = state.begin(&headers, Method::POST, parse_form(&body));
    request.finish(state.controller.delete_field_layout(&request.action))
}

fn parse_form(body: &[u8]) -> BodyParams {
    form_urlencoded::parse(body).into_owned().collect()
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}
