//! Control panel URL generation and post-submit redirects.

use adwizard_types::BodyParams;
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Body param naming the post-submit destination.
pub const REDIRECT_PARAM: &str = "redirect";

/// Builds absolute control panel URLs from a base URL.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: Url,
}

impl UrlBuilder {
    pub fn new(mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { base }
    }

    pub fn parse(base: &str) -> Result<Self, url::ParseError> {
        Url::parse(base).map(Self::new)
    }

    /// Absolute URL for a control panel path such as `ad-wizard/fieldlayouts`.
    pub fn cp_url(&self, path: &str) -> String {
        let relative = path.trim_start_matches('/');
        match self.base.join(relative) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{relative}", self.base),
        }
    }

    /// Resolve a redirect target against the base URL.
    ///
    /// Returns `None` for blank or unparsable targets and for targets on
    /// another origin.
    pub fn resolve_redirect(&self, target: &str) -> Option<String> {
        let target = target.trim();
        if target.is_empty() {
            return None;
        }
        let resolved = match Url::parse(target) {
            Ok(absolute) => absolute,
            Err(url::ParseError::RelativeUrlWithoutBase) => self.base.join(target.trim_start_matches('/')).ok()?,
            Err(_) => return None,
        };
        (resolved.origin() == self.base.origin()).then(|| resolved.to_string())
    }
}

/// Destination after a successful submit.
///
/// `{attribute}` tokens in the posted `redirect` param are replaced with the
/// saved object's scalar attributes. Falls back to `default` when no usable
/// target was posted.
pub fn redirect_to_posted_url<T: Serialize>(urls: &UrlBuilder, params: &BodyParams, object: &T, default: &str) -> String {
    let Some(target) = params.get_trimmed(REDIRECT_PARAM) else {
        return default.to_string();
    };
    let attributes = serde_json::to_value(object).unwrap_or(Value::Null);
    let rendered = render_object_template(target, &attributes);
    urls.resolve_redirect(&rendered).unwrap_or_else(|| default.to_string())
}

/// Substitute `{key}` tokens with top-level scalar values of `object`.
/// Unknown tokens are left untouched.
pub fn render_object_template(template: &str, object: &Value) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        output.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            output.push_str(&rest[start..]);
            return output;
        };
        let key = &after[..end];
        match object.get(key.trim()) {
            Some(Value::String(text)) => output.push_str(text),
            Some(Value::Number(number)) => output.push_str(&number.to_string()),
            Some(Value::Bool(flag)) => output.push_str(if *flag { "true" } else { "false" }),
            _ => {
                output.push('{');
                output.push_str(key);
                output.push('}');
            }
        }
        rest = &after[end + 1..];
    }
    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn urls() -> UrlBuilder {
        UrlBuilder::parse("https://cms.example.com/admin").unwrap()
    }

    #[test]
    fn cp_url_joins_under_base_path() {
        assert_eq!(
            urls().cp_url("ad-wizard/fieldlayouts/new"),
            "https://cms.example.com/admin/ad-wizard/fieldlayouts/new"
        );
        assert_eq!(urls().cp_url("/ad-wizard"), "https://cms.example.com/admin/ad-wizard");
    }

    #[test]
    fn renders_object_tokens() {
        let object = json!({ "id": 4, "name": "Banner", "tags": ["a"] });
        assert_eq!(
            render_object_template("ad-wizard/fieldlayouts/{id}?n={name}&t={tags}&x={missing}", &object),
            "ad-wizard/fieldlayouts/4?n=Banner&t={tags}&x={missing}"
        );
        assert_eq!(render_object_template("open {brace", &object), "open {brace");
    }

    #[test]
    fn posted_redirect_is_resolved_with_tokens() {
        let params = BodyParams::new().with(REDIRECT_PARAM, "ad-wizard/fieldlayouts/{id}");
        let target = redirect_to_posted_url(&urls(), &params, &json!({ "id": 9 }), "fallback");
        assert_eq!(target, "https://cms.example.com/admin/ad-wizard/fieldlayouts/9");
    }

    #[test]
    fn missing_or_foreign_redirect_uses_default() {
        let object = json!({ "id": 1 });
        assert_eq!(
            redirect_to_posted_url(&urls(), &BodyParams::new(), &object, "fallback"),
            "fallback"
        );

        let foreign = BodyParams::new().with(REDIRECT_PARAM, "https://evil.example.net/");
        assert_eq!(redirect_to_posted_url(&urls(), &foreign, &object, "fallback"), "fallback");

        let same_origin = BodyParams::new().with(REDIRECT_PARAM, "https://cms.example.com/admin/dashboard");
        assert_eq!(
            redirect_to_posted_url(&urls(), &same_origin, &object, "fallback"),
            "https://cms.example.com/admin/dashboard"
        );
    }
}
