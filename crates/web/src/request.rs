//! Inputs and outputs of controller actions.

use adwizard_types::{BodyParams, FieldLayout};
use axum::http::Method;
use serde_json::Value;

use crate::session::SessionId;
use crate::view::RenderedView;

/// Everything an action reads from the inbound request.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub method: Method,
    /// Whether the caller asked for a JSON response.
    pub accepts_json: bool,
    pub session: SessionId,
    pub body: BodyParams,
}

impl ActionRequest {
    pub fn get(session: SessionId) -> Self {
        Self {
            method: Method::GET,
            accepts_json: false,
            session,
            body: BodyParams::new(),
        }
    }

    pub fn post(session: SessionId, body: BodyParams) -> Self {
        Self {
            method: Method::POST,
            accepts_json: false,
            session,
            body,
        }
    }

    pub fn accepting_json(mut self) -> Self {
        self.accepts_json = true;
        self
    }

    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }
}

/// What an action asks the host to send back.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResponse {
    View(RenderedView),
    Redirect(String),
    Json(Value),
    /// No response; the host decides what to show (the edit form for saves).
    Empty,
}

impl ActionResponse {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Request-scoped values handed from one action to the view rendered after it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteContext {
    /// Unsaved field layout to redisplay in the edit form.
    pub field_layout: Option<FieldLayout>,
}

impl RouteContext {
    pub fn with_field_layout(field_layout: FieldLayout) -> Self {
        Self {
            field_layout: Some(field_layout),
        }
    }
}

/// Response plus the context carried to a follow-up render.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub response: ActionResponse,
    pub context: RouteContext,
}

impl ActionOutcome {
    pub fn respond(response: ActionResponse) -> Self {
        Self {
            response,
            context: RouteContext::default(),
        }
    }

    pub fn empty() -> Self {
        Self::respond(ActionResponse::Empty)
    }

    pub fn empty_with(context: RouteContext) -> Self {
        Self {
            response: ActionResponse::Empty,
            context,
        }
    }
}
