//! Service layer API for applying updates to stored documents
use tracing::{error, info, warn};

use super::auth::{Headers, Verifier};
use super::change::Update;
use super::error::StoreError;
use super::lpa::Lpa;
use super::problem::{Problem, Response};
use super::store::Store;
use super::types::TimeStamp;
use super::update::{Apply, validate_update};
use super::utils::new_update_id;

/// An update request for the document `uid`.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub uid: String,
    pub headers: Headers,
    pub body: String,
}

pub struct UpdateService<S, V> {
    store: S,
    verifier: V,
}

impl<S: Store, V: Verifier> UpdateService<S, V> {
    pub fn new(store: S, verifier: V) -> Self {
        Self { store, verifier }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs one update end to end. Success is a 201 carrying the updated
    /// document; every failure is a problem body.
    #[tracing::instrument(skip_all, fields(uid = %request.uid))]
    pub fn handle_update(&self, request: &Request) -> Response {
        match self.apply_update(request) {
            Ok(lpa) => match serde_json::to_string(&lpa) {
                Ok(body) => Response::created(body),
                Err(e) => {
                    error!(error = %e, "failed to serialise document");
                    Problem::INTERNAL_SERVER_ERROR.respond()
                }
            },
            Err(problem) => problem.respond(),
        }
    }

    fn apply_update(&self, request: &Request) -> Result<Lpa, Problem> {
        // Verify the caller
        let claims = self.verifier.verify_header(&request.headers).map_err(|e| {
            warn!(error = %e, "request failed verification");
            Problem::UNAUTHORISED
        })?;

        // Decode the update
        let mut update: Update = serde_json::from_str(&request.body).map_err(|e| {
            warn!(error = %e, "request body is not an update");
            Problem::INVALID_REQUEST
        })?;

        // Load the current document
        let mut lpa = self.store.get(&request.uid).map_err(|e| match e {
            StoreError::NotFound(_) => Problem::NOT_FOUND,
            e => {
                error!(error = %e, "failed to load document");
                Problem::INTERNAL_SERVER_ERROR
            }
        })?;

        update.uid = lpa.uid.clone();
        update.author = claims.subject;

        // Check the changes against the document
        let applyable = validate_update(&update, &lpa).map_err(|errors| {
            warn!(update_type = %update.update_type, errors = errors.len(), "update failed validation");
            Problem::INVALID_REQUEST.with_errors(errors)
        })?;

        // Apply business rules and mutate
        let read_at = lpa.updated_at;
        applyable.apply(&mut lpa).map_err(|errors| {
            warn!(update_type = %update.update_type, errors = errors.len(), "update was not applicable");
            Problem::INVALID_REQUEST.with_errors(errors)
        })?;

        let now = TimeStamp::new();
        lpa.updated_at = Some(now);
        update.id = new_update_id();
        update.applied = Some(now);

        // Persist the document with its audit record
        self.store
            .put_changes(&lpa, &update, read_at)
            .map_err(|e| match e {
                StoreError::Conflict(_) => {
                    warn!(update_id = %update.id, "document changed while the update was applied");
                    Problem::CONFLICT
                }
                e => {
                    error!(error = %e, "failed to store update");
                    Problem::INTERNAL_SERVER_ERROR
                }
            })?;

        info!(update_type = %update.update_type, update_id = %update.id, "update applied");

        Ok(lpa)
    }

    /// The applied updates for `uid`, oldest first.
    pub fn history(&self, uid: &str) -> Result<Vec<Update>, StoreError> {
        self.store.get_changes(uid)
    }
}
