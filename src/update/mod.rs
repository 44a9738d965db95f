//! The operation catalogue.
//!
//! [`validate_update`] picks the validator for an update's tag, runs it over
//! the changes against the current document and returns an [`Applyable`]
//! only when every change was accounted for. Applying is a second step so
//! that the caller decides when a document is mutated.
mod access_online;
mod attorneys;
mod correction;
mod decisions;
mod identity;
mod lifecycle;
mod opt_out;
mod person;
mod post_registration_correction;
mod redundant;
mod sever_restrictions;
mod sign;

pub use access_online::{PaperAttorneyAccessOnline, PaperCertificateProviderAccessOnline};
pub use attorneys::{AttorneyDecision, AttorneyDecisions, AttorneyStatusChange, ChangeAttorneys};
pub use correction::Correction;
pub use decisions::Decisions;
pub use identity::{ConfirmIdentity, IdentityActor};
pub use lifecycle::{DonorWithdrawLpa, OpgChangeStatus, Perfect, Register, StatutoryWaitingPeriod};
pub use opt_out::{AttorneyOptOut, CertificateProviderOptOut, TrustCorporationOptOut};
pub use post_registration_correction::PostRegistrationCorrection;
pub use redundant::redundant_change_errors;
pub use sever_restrictions::SeverRestrictionsAndConditions;
pub use sign::{AttorneySign, CertificateProviderSign, TrustCorporationSign};

use super::change::{FieldError, Update, UpdateType};
use super::lpa::Lpa;
use super::validate::MSG_INVALID;

/// A validated command that can mutate a document.
///
/// Implementations check every precondition before touching `lpa`, so an
/// `Err` always leaves the document as it was. Only the first violated rule
/// is reported.
pub trait Apply {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Applyable {
    CertificateProviderSign(CertificateProviderSign),
    AttorneySign(AttorneySign),
    TrustCorporationSign(TrustCorporationSign),
    AttorneyOptOut(AttorneyOptOut),
    CertificateProviderOptOut(CertificateProviderOptOut),
    TrustCorporationOptOut(TrustCorporationOptOut),
    DonorWithdrawLpa(DonorWithdrawLpa),
    Perfect(Perfect),
    Register(Register),
    StatutoryWaitingPeriod(StatutoryWaitingPeriod),
    OpgChangeStatus(OpgChangeStatus),
    Correction(Box<Correction>),
    PostRegistrationCorrection(Box<PostRegistrationCorrection>),
    AttorneyDecisions(AttorneyDecisions),
    ChangeAttorneys(ChangeAttorneys),
    PaperAttorneyAccessOnline(PaperAttorneyAccessOnline),
    PaperCertificateProviderAccessOnline(PaperCertificateProviderAccessOnline),
    SeverRestrictionsAndConditions(SeverRestrictionsAndConditions),
    ConfirmIdentity(ConfirmIdentity),
}

impl Apply for Applyable {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        match self {
            Applyable::CertificateProviderSign(op) => op.apply(lpa),
            Applyable::AttorneySign(op) => op.apply(lpa),
            Applyable::TrustCorporationSign(op) => op.apply(lpa),
            Applyable::AttorneyOptOut(op) => op.apply(lpa),
            Applyable::CertificateProviderOptOut(op) => op.apply(lpa),
            Applyable::TrustCorporationOptOut(op) => op.apply(lpa),
            Applyable::DonorWithdrawLpa(op) => op.apply(lpa),
            Applyable::Perfect(op) => op.apply(lpa),
            Applyable::Register(op) => op.apply(lpa),
            Applyable::StatutoryWaitingPeriod(op) => op.apply(lpa),
            Applyable::OpgChangeStatus(op) => op.apply(lpa),
            Applyable::Correction(op) => op.apply(lpa),
            Applyable::PostRegistrationCorrection(op) => op.apply(lpa),
            Applyable::AttorneyDecisions(op) => op.apply(lpa),
            Applyable::ChangeAttorneys(op) => op.apply(lpa),
            Applyable::PaperAttorneyAccessOnline(op) => op.apply(lpa),
            Applyable::PaperCertificateProviderAccessOnline(op) => op.apply(lpa),
            Applyable::SeverRestrictionsAndConditions(op) => op.apply(lpa),
            Applyable::ConfirmIdentity(op) => op.apply(lpa),
        }
    }
}

fn tagged<T>(wrap: impl FnOnce(T) -> Applyable, (data, errors): (T, Vec<FieldError>)) -> (Applyable, Vec<FieldError>) {
    (wrap(data), errors)
}

/// Turns an update into the command for its tag, or every structural
/// problem found with its changes.
pub fn validate_update(update: &Update, lpa: &Lpa) -> Result<Applyable, Vec<FieldError>> {
    let Some(update_type) = UpdateType::parse(&update.update_type) else {
        return Err(vec![FieldError::new("/type", MSG_INVALID)]);
    };

    let changes = update.changes.as_slice();

    let (applyable, mut errors) = match update_type {
        UpdateType::CertificateProviderSign => tagged(
            Applyable::CertificateProviderSign,
            sign::validate_certificate_provider_sign(changes),
        ),
        UpdateType::AttorneySign => tagged(
            Applyable::AttorneySign,
            sign::validate_attorney_sign(changes, lpa),
        ),
        UpdateType::TrustCorporationSign => tagged(
            Applyable::TrustCorporationSign,
            sign::validate_trust_corporation_sign(changes, lpa),
        ),
        UpdateType::AttorneyOptOut => tagged(
            Applyable::AttorneyOptOut,
            opt_out::validate_attorney_opt_out(update),
        ),
        UpdateType::CertificateProviderOptOut => tagged(
            Applyable::CertificateProviderOptOut,
            opt_out::validate_certificate_provider_opt_out(changes),
        ),
        UpdateType::TrustCorporationOptOut => tagged(
            Applyable::TrustCorporationOptOut,
            opt_out::validate_trust_corporation_opt_out(update),
        ),
        UpdateType::DonorWithdrawLpa => tagged(
            Applyable::DonorWithdrawLpa,
            lifecycle::validate_donor_withdraw_lpa(changes),
        ),
        UpdateType::Perfect => tagged(Applyable::Perfect, lifecycle::validate_perfect(changes)),
        UpdateType::Register => tagged(Applyable::Register, lifecycle::validate_register(changes)),
        UpdateType::StatutoryWaitingPeriod => tagged(
            Applyable::StatutoryWaitingPeriod,
            lifecycle::validate_statutory_waiting_period(changes),
        ),
        UpdateType::OpgStatusChange => tagged(
            Applyable::OpgChangeStatus,
            lifecycle::validate_opg_change_status(changes, lpa),
        ),
        UpdateType::Correction => tagged(
            |c| Applyable::Correction(Box::new(c)),
            correction::validate_correction(changes, lpa),
        ),
        UpdateType::PostRegistrationCorrection => tagged(
            |c| Applyable::PostRegistrationCorrection(Box::new(c)),
            post_registration_correction::validate_post_registration_correction(changes, lpa),
        ),
        UpdateType::AttorneyDecisions => tagged(
            Applyable::AttorneyDecisions,
            attorneys::validate_attorney_decisions(changes, lpa),
        ),
        UpdateType::ChangeAttorneys => tagged(
            Applyable::ChangeAttorneys,
            attorneys::validate_change_attorneys(changes, lpa),
        ),
        UpdateType::PaperAttorneyAccessOnline => tagged(
            Applyable::PaperAttorneyAccessOnline,
            access_online::validate_paper_attorney_access_online(changes, lpa),
        ),
        UpdateType::PaperCertificateProviderAccessOnline => tagged(
            Applyable::PaperCertificateProviderAccessOnline,
            access_online::validate_paper_certificate_provider_access_online(changes, lpa),
        ),
        UpdateType::SeverRestrictionsAndConditions => tagged(
            Applyable::SeverRestrictionsAndConditions,
            sever_restrictions::validate_sever_restrictions(changes, lpa),
        ),
        UpdateType::DonorConfirmIdentity => tagged(
            Applyable::ConfirmIdentity,
            identity::validate_confirm_identity(changes, lpa, IdentityActor::Donor),
        ),
        UpdateType::CertificateProviderConfirmIdentity => tagged(
            Applyable::ConfirmIdentity,
            identity::validate_confirm_identity(changes, lpa, IdentityActor::CertificateProvider),
        ),
    };

    errors.extend(redundant_change_errors(changes));

    if errors.is_empty() {
        Ok(applyable)
    } else {
        Err(errors)
    }
}

/// A single business rule failure.
pub(crate) fn reject(source: impl Into<String>, detail: impl Into<String>) -> Result<(), Vec<FieldError>> {
    Err(vec![FieldError::new(source, detail)])
}
