//! Field layout control panel actions.

use std::sync::Arc;

use adwizard_store::{FieldLayoutStore, LayoutStore};
use adwizard_types::{AD_ELEMENT_TYPE, Crumb, FieldLayout};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::error::HandlerError;
use crate::i18n::{APP, PLUGIN, SITE, Translator};
use crate::request::{ActionOutcome, ActionRequest, ActionResponse, RouteContext};
use crate::session::{Identity, SessionGateway};
use crate::urls::{UrlBuilder, redirect_to_posted_url};
use crate::view::ViewRenderer;

pub const INDEX_TEMPLATE: &str = "ad-wizard/fieldlayouts";
pub const EDIT_TEMPLATE: &str = "ad-wizard/fieldlayouts/_edit";

/// Control panel path of the plugin root.
pub const PLUGIN_PATH: &str = "ad-wizard";
/// Control panel path of the field layouts index.
pub const FIELD_LAYOUTS_PATH: &str = "ad-wizard/fieldlayouts";

const SUBNAV_ITEM: &str = "fieldlayouts";

/// Handles the field layout index, edit, save, and delete actions.
pub struct FieldLayoutsController {
    field_layouts: Arc<dyn FieldLayoutStore>,
    layouts: Arc<dyn LayoutStore>,
    sessions: Arc<dyn SessionGateway>,
    views: Arc<dyn ViewRenderer>,
    urls: UrlBuilder,
    translator: Translator,
}

impl FieldLayoutsController {
    pub fn new(
        field_layouts: Arc<dyn FieldLayoutStore>,
        layouts: Arc<dyn LayoutStore>,
        sessions: Arc<dyn SessionGateway>,
        views: Arc<dyn ViewRenderer>,
        urls: UrlBuilder,
        translator: Translator,
    ) -> Self {
        Self {
            field_layouts,
            layouts,
            sessions,
            views,
            urls,
            translator,
        }
    }

    /// Render the list of field layouts.
    pub fn index(&self, request: &ActionRequest) -> Result<ActionResponse, HandlerError> {
        self.require_login(request)?;

        let field_layouts = self.field_layouts.field_layouts()?;

        self.render_template(
            request,
            INDEX_TEMPLATE,
            json!({
                "crumbs": self.field_layouts_crumbs(),
                "fieldLayouts": field_layouts,
            }),
        )
    }

    /// Render the edit form.
    ///
    /// `context` carries a field layout that failed to save; when present it
    /// is shown as-is instead of being loaded from the store.
    pub fn edit_field_layout(
        &self,
        request: &ActionRequest,
        field_layout_id: Option<i64>,
        context: RouteContext,
    ) -> Result<ActionResponse, HandlerError> {
        self.require_login(request)?;

        let mut field_layout = context.field_layout;
        if let Some(id) = field_layout_id
            && field_layout.is_none()
        {
            let found = self.field_layouts.field_layout_by_id(id)?;
            field_layout = Some(found.ok_or_else(|| HandlerError::not_found("Field layout not found"))?);
        }
        let field_layout = field_layout.unwrap_or_default();

        let mut crumbs = self.field_layouts_crumbs();
        // A zero id counts as unsaved.
        crumbs.push(match field_layout.id.filter(|id| *id != 0) {
            Some(id) => Crumb::new(
                self.translator.t(SITE, field_layout.display_name()),
                self.urls.cp_url(&format!("{FIELD_LAYOUTS_PATH}/{id}")),
            ),
            None => Crumb::new(
                self.translator.t(PLUGIN, "Create New Field Layout"),
                self.urls.cp_url(&format!("{FIELD_LAYOUTS_PATH}/new")),
            ),
        });

        self.render_template(
            request,
            EDIT_TEMPLATE,
            json!({
                "crumbs": crumbs,
                "fieldLayoutId": field_layout_id,
                "fieldLayout": field_layout,
            }),
        )
    }

    /// Save the posted layout: the generic layout first, then the wrapper.
    ///
    /// The two writes are not atomic. When the wrapper fails to save, the
    /// generic layout written in the first step stays behind without one.
    pub fn save_field_layout(&self, request: &ActionRequest) -> Result<ActionOutcome, HandlerError> {
        self.require_post_request(request)?;
        self.require_login(request)?;

        let mut layout = self.layouts.assemble_from_request(&request.body)?;
        layout.element_type = AD_ELEMENT_TYPE.to_string();

        if let Err(error) = self.layouts.save_layout(&mut layout) {
            warn!(%error, "couldn't save generic layout");
            self.sessions
                .set_error(&request.session, &self.translator.t(APP, "Couldn’t save field layout."));
            return Ok(ActionOutcome::empty());
        }

        let mut field_layout = FieldLayout::new(layout.id, request.body.get("name").map(str::to_string));

        if let Err(error) = self.field_layouts.save_field_layout(&field_layout) {
            warn!(%error, layout_id = ?layout.id, "couldn't save field layout");
            if let Some(errors) = error.field_errors() {
                field_layout.errors = errors.clone();
            }
            self.sessions
                .set_error(&request.session, &self.translator.t(PLUGIN, "Couldn’t save field layout."));
            return Ok(ActionOutcome::empty_with(RouteContext::with_field_layout(field_layout)));
        }

        info!(field_layout_id = ?field_layout.id, "field layout saved");
        self.sessions
            .set_notice(&request.session, &self.translator.t(PLUGIN, "Field layout saved."));

        let default = self.urls.cp_url(FIELD_LAYOUTS_PATH);
        let target = redirect_to_posted_url(&self.urls, &request.body, &field_layout, &default);
        Ok(ActionOutcome::respond(ActionResponse::Redirect(target)))
    }

    /// Delete the field layout named by the `id` body param.
    pub fn delete_field_layout(&self, request: &ActionRequest) -> Result<ActionResponse, HandlerError> {
        self.require_post_request(request)?;
        self.require_accepts_json(request)?;
        self.require_login(request)?;

        let field_layout_id: i64 = request.body.parse_required("id")?;

        self.field_layouts.delete_field_layout_by_id(field_layout_id)?;
        info!(field_layout_id, "field layout deleted");

        Ok(ActionResponse::Json(json!({ "success": true })))
    }

    /// Breadcrumbs shared by every field layout page.
    pub fn field_layouts_crumbs(&self) -> Vec<Crumb> {
        vec![
            Crumb::new(self.translator.t(PLUGIN, "Ad Wizard"), self.urls.cp_url(PLUGIN_PATH)),
            Crumb::new(self.translator.t(PLUGIN, "Field Layouts"), self.urls.cp_url(FIELD_LAYOUTS_PATH)),
        ]
    }

    fn render_template(&self, request: &ActionRequest, template: &str, variables: Value) -> Result<ActionResponse, HandlerError> {
        let mut context = Map::new();
        context.insert("selectedSubnavItem".into(), Value::from(SUBNAV_ITEM));
        context.insert("fullPageForm".into(), Value::Bool(true));
        if let Value::Object(variables) = variables {
            context.extend(variables);
        }
        let flashes = self.sessions.take_flashes(&request.session);
        context.insert("flashes".into(), serde_json::to_value(flashes).map_err(crate::view::ViewError::from)?);

        let view = self.views.render(template, Value::Object(context))?;
        Ok(ActionResponse::View(view))
    }

    fn require_login(&self, request: &ActionRequest) -> Result<Identity, HandlerError> {
        self.sessions.identity(&request.session).ok_or(HandlerError::Unauthenticated)
    }

    fn require_post_request(&self, request: &ActionRequest) -> Result<(), HandlerError> {
        if request.is_post() {
            Ok(())
        } else {
            Err(HandlerError::bad_request("Post request required"))
        }
    }

    fn require_accepts_json(&self, request: &ActionRequest) -> Result<(), HandlerError> {
        if request.accepts_json {
            Ok(())
        } else {
            Err(HandlerError::bad_request("Request must accept JSON in response"))
        }
    }
}
