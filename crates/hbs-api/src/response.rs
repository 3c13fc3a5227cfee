//! Render response type

use serde::{Deserialize, Serialize};

/// Outcome of a render request, tagged on the wire by a `status` field.
///
/// The discriminator is explicit rather than inferred from payload shape:
/// `{"status":"success","html":...}` or `{"status":"error","message":...}`.
/// A payload without a recognizable `status` is a protocol error at the
/// transport layer, not a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderResponse {
    /// The service rendered the template
    Success { html: String },
    /// The service reported a failure; `message` is verbatim remote text
    #[serde(rename = "error")]
    Failure { message: String },
}

impl RenderResponse {
    pub fn success(html: impl Into<String>) -> Self {
        Self::Success { html: html.into() }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_decodes_from_status_tag() {
        let parsed: RenderResponse =
            serde_json::from_str(r#"{"status":"success","html":"Hello, World!"}"#).unwrap();

        assert_eq!(parsed, RenderResponse::success("Hello, World!"));
    }

    #[test]
    fn error_decodes_to_failure() {
        let parsed: RenderResponse =
            serde_json::from_str(r#"{"status":"error","message":"template not found"}"#).unwrap();

        assert_eq!(parsed, RenderResponse::failure("template not found"));
    }

    #[test]
    fn missing_status_is_rejected() {
        let result = serde_json::from_str::<RenderResponse>(r#"{"html":"<p>hi</p>"}"#);

        assert!(result.is_err());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result = serde_json::from_str::<RenderResponse>(r#"{"status":"maybe","html":""}"#);

        assert!(result.is_err());
    }

    #[test]
    fn html_may_contain_framing_tokens() {
        // JSON escaping keeps sentinel-looking content unambiguous on the
        // socket binding.
        let response = RenderResponse::success("before :EOF: after\nSUCCESS:line");
        let json = serde_json::to_string(&response).unwrap();
        let parsed: RenderResponse = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, response);
    }
}
