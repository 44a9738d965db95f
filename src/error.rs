use std::convert::Infallible;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Record {0} not found")]
    NotFound(String),
    #[error("Record {0} has been modified since it was read")]
    Conflict(String),
    #[error("Storage failure: {0}")]
    Sled(#[from] sled::Error),
    #[error("Stored document could not be (de)serialised: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Audit record could not be encoded: {0}")]
    CborEncode(#[from] minicbor::encode::Error<Infallible>),
    #[error("Audit record could not be decoded: {0}")]
    CborDecode(#[from] minicbor::decode::Error),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Invalid X-Jwt-Authorization header")]
    MissingHeader,
    #[error("Invalid JWT: {0}")]
    InvalidToken(String),
    #[error("JWT subject is not a user URN")]
    InvalidSubject,
}
