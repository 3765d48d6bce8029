//! Control panel handlers for Ad Wizard field layouts.
//!
//! [`FieldLayoutsController`] implements the list, edit, save, and delete
//! actions against injected collaborators: the layout stores, a
//! [`SessionGateway`] for flash notices, a [`ViewRenderer`], a [`UrlBuilder`],
//! and a [`Translator`]. The [`http`] module hosts the controller on axum.

pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod i18n;
pub mod request;
pub mod session;
pub mod urls;
pub mod view;

pub use config::{AdWizardConfig, ConfigError};
pub use controller::FieldLayoutsController;
pub use error::HandlerError;
pub use http::{AdWizardHttpServer, AppState, RunningAdWizardHttpServer};
pub use i18n::Translator;
pub use request::{ActionOutcome, ActionRequest, ActionResponse, RouteContext};
pub use session::{Flash, FlashKind, Identity, InMemorySessionGateway, SessionGateway, SessionId};
pub use urls::UrlBuilder;
pub use view::{JsonViewRenderer, RenderedView, ViewError, ViewRenderer};
