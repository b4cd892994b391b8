/// Error types shared by the admin operations and the HTTP layer
use thiserror::Error;

/// Failures of an admin operation. Every variant carries the message shown
/// to the operator.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// The user or role does not exist
    #[error("{0}")]
    NotFound(String),

    /// Username or email already taken
    #[error("{0}")]
    Conflict(String),

    #[error("Login required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    /// The data file could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AdminError {
    /// HTTP status code used for partial (JSON) responses.
    ///
    /// Unknown users and roles answer 400 rather than 404 so the admin page
    /// treats them like any other rejected input.
    pub fn status_code(&self) -> u16 {
        match self {
            AdminError::Validation(_) | AdminError::NotFound(_) => 400,
            AdminError::Conflict(_) => 409,
            AdminError::Unauthenticated => 401,
            AdminError::Forbidden(_) => 403,
            AdminError::Storage(_) => 500,
        }
    }
}

impl From<std::io::Error> for AdminError {
    fn from(e: std::io::Error) -> Self {
        AdminError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(e: serde_json::Error) -> Self {
        AdminError::Storage(e.to_string())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl axum::response::IntoResponse for AdminError {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::from_u16(self.status_code())
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        let body = crate::models::AdminResponse::failure(self.to_string());
        (status, axum::Json(body)).into_response()
    }
}
