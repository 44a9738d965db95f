use super::{Apply, reject};
use crate::change::{Change, FieldError};
use crate::lpa::{IdentityCheck, IdentityCheckType, Lpa};
use crate::parse::{Parser, optional, required};
use crate::types::TimeStamp;
use crate::validate::Validator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityActor {
    Donor,
    CertificateProvider,
}

impl IdentityActor {
    fn prefix(self) -> &'static str {
        match self {
            IdentityActor::Donor => "/donor/identityCheck",
            IdentityActor::CertificateProvider => "/certificateProvider/identityCheck",
        }
    }

    fn check(self, lpa: &Lpa) -> Option<&IdentityCheck> {
        match self {
            IdentityActor::Donor => lpa.donor.identity_check.as_ref(),
            IdentityActor::CertificateProvider => lpa.certificate_provider.identity_check.as_ref(),
        }
    }

    fn check_mut(self, lpa: &mut Lpa) -> &mut Option<IdentityCheck> {
        match self {
            IdentityActor::Donor => &mut lpa.donor.identity_check,
            IdentityActor::CertificateProvider => &mut lpa.certificate_provider.identity_check,
        }
    }
}

/// Records the outcome of an identity check for the donor or the
/// certificate provider. A repeat check is seeded from the stored one, so
/// its claimed old values must agree with it and only changed fields need
/// sending.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmIdentity {
    pub actor: IdentityActor,
    pub check_type: Option<IdentityCheckType>,
    pub checked_at: Option<TimeStamp>,
    pub reference: String,
}

impl Apply for ConfirmIdentity {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        let (Some(check_type), Some(checked_at)) = (self.check_type, self.checked_at) else {
            return reject(self.actor.prefix(), "identity check is incomplete");
        };

        *self.actor.check_mut(lpa) = Some(IdentityCheck {
            check_type,
            checked_at,
            reference: self.reference.clone(),
        });

        Ok(())
    }
}

pub(super) fn validate_confirm_identity(
    changes: &[Change],
    lpa: &Lpa,
    actor: IdentityActor,
) -> (ConfirmIdentity, Vec<FieldError>) {
    let existing = actor.check(lpa);

    let mut data = ConfirmIdentity {
        actor,
        check_type: existing.map(|c| c.check_type),
        checked_at: existing.map(|c| c.checked_at),
        reference: existing.map(|c| c.reference.clone()).unwrap_or_default(),
    };

    let opts = if existing.is_some() { optional() } else { required() };

    let errors = Parser::new(changes)
        .prefix(actor.prefix(), required(), |p| {
            p.field("/type", &mut data.check_type, opts.validate(Validator::Valid))
                .field(
                    "/checkedAt",
                    &mut data.checked_at,
                    opts.validate(Validator::NotEmpty),
                )
                .field("/reference", &mut data.reference, optional())
                .consumed();
        })
        .consumed();

    (data, errors)
}
