use reqwest::{Method, Url};
use thiserror::Error;

use crate::models::AdminResponse;

/// Header marking a request as script-originated, so the server answers
/// with a partial JSON response instead of a full page.
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

const GENERIC_FAILURE: &str = "Operation failed";

/// Errors surfaced by a background form submission.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SubmitError {
    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body was not a valid admin response
    #[error("Could not parse the server response")]
    Parse,

    /// The server answered with an error status or `ok: false`
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

impl SubmitError {
    /// Text shown to the operator.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// The fields of a form at the moment it was submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSubmission {
    pub action: String,
    /// Declared method; empty means POST.
    pub method: String,
    pub fields: Vec<(String, String)>,
}

impl FormSubmission {
    pub fn new(action: impl Into<String>, method: impl Into<String>) -> Self {
        FormSubmission {
            action: action.into(),
            method: method.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn http_method(&self) -> Method {
        let upper = self.method.trim().to_ascii_uppercase();
        if upper.is_empty() {
            return Method::POST;
        }
        Method::from_bytes(upper.as_bytes()).unwrap_or(Method::POST)
    }
}

/// Sends a captured form and returns the parsed partial response.
#[allow(async_fn_in_trait)]
pub trait FormTransport {
    async fn submit(&self, form: &FormSubmission) -> Result<AdminResponse, SubmitError>;
}

/// Turns a raw status and body into the submission result.
///
/// An unparseable body is a parse failure whatever the status; otherwise a
/// non-2xx status or `ok: false` is a rejection carrying the server's
/// message, or a generic one when the server sent none.
pub fn interpret_response(status: u16, body: &str) -> Result<AdminResponse, SubmitError> {
    let parsed: AdminResponse = serde_json::from_str(body).map_err(|_| SubmitError::Parse)?;
    if !(200..300).contains(&status) || !parsed.ok {
        let message = parsed
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        return Err(SubmitError::Rejected { status, message });
    }
    Ok(parsed)
}

/// HTTP transport for admin forms.
#[derive(Clone, Debug)]
pub struct Bridge {
    client: reqwest::Client,
    origin: Url,
    cookie: Option<String>,
}

impl Bridge {
    /// `origin` is the base form actions are resolved against, normally the
    /// page's own origin.
    pub fn new(origin: &str) -> Result<Self, SubmitError> {
        let origin = Url::parse(origin).map_err(|e| SubmitError::Transport(e.to_string()))?;
        Ok(Bridge {
            client: reqwest::Client::new(),
            origin,
            cookie: None,
        })
    }

    /// Sends `cookie` (e.g. `session_id=...`) with every request. Browsers
    /// attach the session on their own; headless callers need this.
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    pub fn resolve(&self, action: &str) -> Result<Url, SubmitError> {
        self.origin
            .join(action.trim())
            .map_err(|e| SubmitError::Transport(e.to_string()))
    }
}

impl FormTransport for Bridge {
    async fn submit(&self, form: &FormSubmission) -> Result<AdminResponse, SubmitError> {
        let url = self.resolve(&form.action)?;
        let mut req = self
            .client
            .request(form.http_method(), url)
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form.fields);
        if let Some(cookie) = &self.cookie {
            req = req.header(reqwest::header::COOKIE, cookie.as_str());
        }
        let resp = req
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        interpret_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_requires_ok_flag_and_2xx() {
        let ok = interpret_response(200, r#"{"ok":true,"message":"done","roles":["a"]}"#).unwrap();
        assert_eq!(ok.message.as_deref(), Some("done"));

        let flagged = interpret_response(200, r#"{"ok":false,"message":"nope"}"#).unwrap_err();
        assert_eq!(flagged, SubmitError::Rejected { status: 200, message: "nope".into() });

        let status = interpret_response(409, r#"{"ok":true}"#).unwrap_err();
        assert_eq!(status.user_message(), "Operation failed");
    }

    #[test]
    fn blank_server_message_falls_back_to_generic_text() {
        let err = interpret_response(400, r#"{"ok":false,"message":"  "}"#).unwrap_err();
        assert_eq!(err.user_message(), "Operation failed");
    }

    #[test]
    fn unparseable_bodies_are_parse_failures() {
        assert_eq!(interpret_response(200, "<html>login</html>"), Err(SubmitError::Parse));
        assert_eq!(interpret_response(500, ""), Err(SubmitError::Parse));
        assert_eq!(
            SubmitError::Parse.user_message(),
            "Could not parse the server response"
        );
    }

    #[test]
    fn actions_resolve_against_the_origin() {
        let bridge = Bridge::new("http://127.0.0.1:5000").unwrap();
        assert_eq!(
            bridge.resolve("/admin/users/7/grant").unwrap().as_str(),
            "http://127.0.0.1:5000/admin/users/7/grant"
        );
        assert_eq!(
            bridge.resolve("http://other.test/x").unwrap().as_str(),
            "http://other.test/x"
        );
        assert!(Bridge::new("not a url").is_err());
    }

    #[test]
    fn absolute_actions_keep_their_base_path() {
        // Browsers report `form.action` already resolved against the page.
        let bridge = Bridge::new("https://panel.example.com").unwrap();
        assert_eq!(
            bridge
                .resolve("https://panel.example.com/roster/admin/users/7/grant")
                .unwrap()
                .as_str(),
            "https://panel.example.com/roster/admin/users/7/grant"
        );
    }

    #[test]
    fn method_defaults_to_post() {
        assert_eq!(FormSubmission::new("/x", "").http_method(), Method::POST);
        assert_eq!(FormSubmission::new("/x", "post").http_method(), Method::POST);
        assert_eq!(FormSubmission::new("/x", "get").http_method(), Method::GET);
    }

    #[test]
    fn field_lookup_returns_first_match() {
        let form = FormSubmission::new("/x", "post").field("role", "editor").field("role", "viewer");
        assert_eq!(form.value("role"), Some("editor"));
        assert_eq!(form.value("missing"), None);
    }
}
