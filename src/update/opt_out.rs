use super::{Apply, reject};
use crate::change::{Change, FieldError, Update};
use crate::lpa::{AttorneyStatus, Lpa, LpaStatus};
use crate::parse::Parser;
use crate::validate::MSG_REQUIRED;

/// Opt-outs take no changes; the acting person is the update's author.
fn validate_author_opt_out(update: &Update) -> (String, Vec<FieldError>) {
    let mut errors = Parser::new(&update.changes).consumed();

    let uid = update.author_uid().to_string();
    if uid.is_empty() {
        errors.push(FieldError::new("/author", MSG_REQUIRED));
    }

    (uid, errors)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttorneyOptOut {
    pub attorney_uid: String,
}

impl Apply for AttorneyOptOut {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        let Some(index) = lpa.find_attorney_index(&self.attorney_uid) else {
            return reject("/type", "attorney not found");
        };

        let attorney = &mut lpa.attorneys[index];
        if attorney.signed_at.is_some() {
            return reject("/type", "attorney cannot opt out after signing");
        }

        attorney.status = AttorneyStatus::Removed;
        let appointment_type = attorney.appointment_type;

        if !lpa.can_register_without(appointment_type) {
            lpa.status = LpaStatus::CannotRegister;
        }

        Ok(())
    }
}

pub(super) fn validate_attorney_opt_out(update: &Update) -> (AttorneyOptOut, Vec<FieldError>) {
    let (attorney_uid, errors) = validate_author_opt_out(update);
    (AttorneyOptOut { attorney_uid }, errors)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrustCorporationOptOut {
    pub trust_corporation_uid: String,
}

impl Apply for TrustCorporationOptOut {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        let Some(index) = lpa.find_trust_corporation_index(&self.trust_corporation_uid) else {
            return reject("/type", "trust corporation not found");
        };

        let tc = &mut lpa.trust_corporations[index];
        if tc.signatories.iter().any(|s| s.signed_at.is_some()) {
            return reject("/type", "trust corporation cannot opt out after signing");
        }

        tc.status = AttorneyStatus::Removed;
        let appointment_type = tc.appointment_type;

        if !lpa.can_register_without(appointment_type) {
            lpa.status = LpaStatus::CannotRegister;
        }

        Ok(())
    }
}

pub(super) fn validate_trust_corporation_opt_out(
    update: &Update,
) -> (TrustCorporationOptOut, Vec<FieldError>) {
    let (trust_corporation_uid, errors) = validate_author_opt_out(update);
    (TrustCorporationOptOut { trust_corporation_uid }, errors)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertificateProviderOptOut;

impl Apply for CertificateProviderOptOut {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        if lpa.certificate_provider.signed_at.is_some() {
            return reject(
                "/type",
                "certificate provider cannot opt out after providing certificate",
            );
        }

        lpa.status = LpaStatus::CannotRegister;

        Ok(())
    }
}

pub(super) fn validate_certificate_provider_opt_out(
    changes: &[Change],
) -> (CertificateProviderOptOut, Vec<FieldError>) {
    (CertificateProviderOptOut, Parser::new(changes).consumed())
}
