//! Render request type

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single render invocation: which template, with what data, in which
/// layout.
///
/// `layout` is omitted from the encoding entirely when absent (never `null`
/// or an empty string) so the service can apply its own default layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Template identifier, resolved by the service
    pub template: String,
    /// Data context handed to the template; keys and values are opaque
    pub context: Map<String, Value>,
    /// Optional layout override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
}

impl RenderRequest {
    pub fn new(template: impl Into<String>, context: Map<String, Value>) -> Self {
        Self {
            template: template.into(),
            context,
            layout: None,
        }
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".into(), json!("World"));
        map
    }

    #[test]
    fn layout_absent_is_omitted_from_encoding() {
        let request = RenderRequest::new("hello.hbs", context());
        let json = serde_json::to_string(&request).unwrap();

        assert!(!json.contains("layout"));
    }

    #[test]
    fn layout_present_is_encoded_verbatim() {
        let request = RenderRequest::new("hello.hbs", context()).with_layout("main.hbs");
        let json = serde_json::to_string(&request).unwrap();

        assert!(json.contains(r#""layout":"main.hbs""#));
    }

    #[test]
    fn request_round_trip() {
        let request = RenderRequest::new("hello.hbs", context()).with_layout("main.hbs");
        let json = serde_json::to_string(&request).unwrap();
        let parsed: RenderRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.template, "hello.hbs");
        assert_eq!(parsed.context["name"], json!("World"));
        assert_eq!(parsed.layout.as_deref(), Some("main.hbs"));
    }

    #[test]
    fn missing_layout_decodes_to_none() {
        let parsed: RenderRequest =
            serde_json::from_str(r#"{"template":"hello.hbs","context":{}}"#).unwrap();

        assert_eq!(parsed.layout, None);
    }

    #[test]
    fn empty_context_is_allowed() {
        let request = RenderRequest::new("hello.hbs", Map::new());
        let json = serde_json::to_string(&request).unwrap();

        assert_eq!(json, r#"{"template":"hello.hbs","context":{}}"#);
    }
}
