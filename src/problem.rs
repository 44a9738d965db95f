//! Response bodies returned to callers
use serde::Serialize;

use super::change::FieldError;

/// An error body: `{"code": ..., "detail": ..., "errors": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    #[serde(skip)]
    pub status: u16,
    pub code: &'static str,
    pub detail: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl Problem {
    const fn new(status: u16, code: &'static str, detail: &'static str) -> Self {
        Self {
            status,
            code,
            detail,
            errors: Vec::new(),
        }
    }

    pub const INTERNAL_SERVER_ERROR: Problem =
        Problem::new(500, "INTERNAL_SERVER_ERROR", "Internal server error");
    pub const INVALID_REQUEST: Problem = Problem::new(400, "INVALID_REQUEST", "Invalid request");
    pub const UNAUTHORISED: Problem = Problem::new(401, "UNAUTHORISED", "Invalid JWT");
    pub const NOT_FOUND: Problem = Problem::new(404, "NOT_FOUND", "Record not found");
    pub const CONFLICT: Problem = Problem::new(409, "CONFLICT", "Record has been modified");

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = errors;
        self
    }

    pub fn respond(self) -> Response {
        match serde_json::to_string(&self) {
            Ok(body) => Response {
                status: self.status,
                body,
            },
            Err(_) => Response::internal_server_error(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn created(body: String) -> Self {
        Self { status: 201, body }
    }

    fn internal_server_error() -> Self {
        Self {
            status: 500,
            body: r#"{"code":"INTERNAL_SERVER_ERROR","detail":"Internal server error"}"#.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_omitted_when_empty() {
        let response = Problem::NOT_FOUND.respond();

        assert_eq!(response.status, 404);
        assert_eq!(response.body, r#"{"code":"NOT_FOUND","detail":"Record not found"}"#);
    }

    #[test]
    fn field_errors_are_listed() {
        let response = Problem::INVALID_REQUEST
            .with_errors(vec![FieldError::new("/type", "invalid value")])
            .respond();

        assert_eq!(response.status, 400);
        assert_eq!(
            response.body,
            r#"{"code":"INVALID_REQUEST","detail":"Invalid request","errors":[{"source":"/type","detail":"invalid value"}]}"#
        );
    }
}
