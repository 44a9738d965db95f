//! Caller identity as seen by the update pipeline
use std::collections::BTreeMap;

use super::change::author_uid;
use super::error::VerifyError;

pub const AUTH_HEADER: &str = "X-Jwt-Authorization";

pub type Headers = BTreeMap<String, String>;

/// The verified claims of a request. `subject` is the author URN, e.g.
/// `urn:opg:poas:makeregister:users:abc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub subject: String,
}

impl Claims {
    pub fn from_subject(subject: impl Into<String>) -> Result<Self, VerifyError> {
        let subject = subject.into();
        if author_uid(&subject).is_empty() {
            return Err(VerifyError::InvalidSubject);
        }

        Ok(Self { subject })
    }

    pub fn author_uid(&self) -> &str {
        author_uid(&self.subject)
    }
}

/// Checks the credentials carried by a request.
pub trait Verifier {
    fn verify_header(&self, headers: &Headers) -> Result<Claims, VerifyError>;
}

/// The token from the auth header with any `Bearer` prefix removed. Header
/// names match case-insensitively.
pub fn bearer_token(headers: &Headers) -> Result<&str, VerifyError> {
    let value = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(AUTH_HEADER))
        .map(|(_, value)| value.trim())
        .ok_or(VerifyError::MissingHeader)?;

    let token = match value.strip_prefix("Bearer") {
        Some(rest) => rest.trim_start_matches(' '),
        None => value,
    };

    if token.is_empty() {
        return Err(VerifyError::MissingHeader);
    }

    Ok(token)
}
