//! Status transitions that carry no field edits of their own, plus the
//! OPG status override.
use super::{Apply, reject};
use crate::change::{Change, FieldError};
use crate::lpa::{AttorneyStatus, Lpa, LpaStatus};
use crate::parse::{Parser, required};
use crate::types::TimeStamp;
use crate::validate::Validator;

/// The first missing signature, checked donor, certificate provider,
/// attorneys then trust corporations.
fn unsigned_party(lpa: &Lpa) -> Option<&'static str> {
    if lpa.signed_at.is_none() {
        return Some("lpa must be signed");
    }

    if lpa.certificate_provider.signed_at.is_none() {
        return Some("lpa must have a certificate");
    }

    if lpa
        .attorneys
        .iter()
        .any(|a| a.status != AttorneyStatus::Removed && a.signed_at.is_none())
    {
        return Some("lpa must be signed by attorneys");
    }

    if lpa
        .trust_corporations
        .iter()
        .any(|t| t.status != AttorneyStatus::Removed && !t.is_signed())
    {
        return Some("lpa must be signed by trust corporations");
    }

    None
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonorWithdrawLpa;

impl Apply for DonorWithdrawLpa {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        match lpa.status {
            LpaStatus::Withdrawn => reject("/type", "lpa has already been withdrawn"),
            LpaStatus::Registered => reject("/type", "cannot withdraw a registered lpa"),
            LpaStatus::CannotRegister => reject("/type", "cannot withdraw an unregisterable lpa"),
            _ => {
                lpa.status = LpaStatus::Withdrawn;
                Ok(())
            }
        }
    }
}

pub(super) fn validate_donor_withdraw_lpa(changes: &[Change]) -> (DonorWithdrawLpa, Vec<FieldError>) {
    (DonorWithdrawLpa, Parser::new(changes).consumed())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Perfect;

impl Apply for Perfect {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        if lpa.status != LpaStatus::InProgress {
            return reject("/type", "status must be in-progress to make perfect");
        }

        if let Some(detail) = unsigned_party(lpa) {
            return reject("/type", detail);
        }

        lpa.status = LpaStatus::Perfect;
        Ok(())
    }
}

pub(super) fn validate_perfect(changes: &[Change]) -> (Perfect, Vec<FieldError>) {
    (Perfect, Parser::new(changes).consumed())
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatutoryWaitingPeriod;

impl Apply for StatutoryWaitingPeriod {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        if lpa.status != LpaStatus::InProgress {
            return reject("/type", "status must be in-progress to enter statutory-waiting-period");
        }

        if let Some(detail) = unsigned_party(lpa) {
            return reject("/type", detail);
        }

        lpa.status = LpaStatus::StatutoryWaitingPeriod;
        Ok(())
    }
}

pub(super) fn validate_statutory_waiting_period(
    changes: &[Change],
) -> (StatutoryWaitingPeriod, Vec<FieldError>) {
    (StatutoryWaitingPeriod, Parser::new(changes).consumed())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Register;

impl Apply for Register {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        if lpa.status != LpaStatus::StatutoryWaitingPeriod {
            return reject("/type", "status must be statutory-waiting-period to register");
        }

        lpa.status = LpaStatus::Registered;
        lpa.registration_date = Some(TimeStamp::new());
        Ok(())
    }
}

pub(super) fn validate_register(changes: &[Change]) -> (Register, Vec<FieldError>) {
    (Register, Parser::new(changes).consumed())
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpgChangeStatus {
    pub status: LpaStatus,
}

impl Apply for OpgChangeStatus {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        use LpaStatus as S;

        let rule = match (self.status, lpa.status) {
            (S::CannotRegister, S::Registered) => {
                Some("Lpa status cannot be registered while changing to cannot register")
            }
            (S::CannotRegister, S::Cancelled) => {
                Some("Lpa status cannot be cancelled while changing to cannot register")
            }
            (S::CannotRegister, _) => None,
            (S::Cancelled, S::Registered) => None,
            (S::Cancelled, _) => Some("Lpa status has to be registered while changing to cancelled"),
            (S::DoNotRegister, S::StatutoryWaitingPeriod) => None,
            (S::DoNotRegister, _) => Some(
                "Lpa status has to be statutory waiting period while changing to do not register",
            ),
            (S::Expired, S::InProgress | S::StatutoryWaitingPeriod | S::DoNotRegister) => None,
            (S::Expired, _) => Some(
                "Lpa status has to be in progress, statutory waiting period or do not register while changing to expired",
            ),
            _ => Some(
                "Status to be updated should be cannot register, cancelled, do not register or expired",
            ),
        };

        if let Some(detail) = rule {
            return reject("/status", detail);
        }

        lpa.status = self.status;
        Ok(())
    }
}

pub(super) fn validate_opg_change_status(
    changes: &[Change],
    lpa: &Lpa,
) -> (OpgChangeStatus, Vec<FieldError>) {
    let mut data = OpgChangeStatus { status: lpa.status };

    let errors = Parser::new(changes)
        .field("/status", &mut data.status, required().validate(Validator::Valid))
        .consumed();

    (data, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::fixtures;
    use serde_json::json;

    #[test]
    fn withdraw() {
        let mut lpa = fixtures::lpa();
        DonorWithdrawLpa.apply(&mut lpa).unwrap();
        assert_eq!(lpa.status, LpaStatus::Withdrawn);

        let errors = DonorWithdrawLpa.apply(&mut lpa).unwrap_err();
        assert_eq!(errors, [FieldError::new("/type", "lpa has already been withdrawn")]);
    }

    #[test]
    fn withdraw_registered() {
        let mut lpa = fixtures::lpa();
        lpa.status = LpaStatus::Registered;

        let errors = DonorWithdrawLpa.apply(&mut lpa).unwrap_err();

        assert_eq!(errors, [FieldError::new("/type", "cannot withdraw a registered lpa")]);
        assert_eq!(lpa.status, LpaStatus::Registered);
    }

    #[test]
    fn perfect_checks_signatures_in_order() {
        let mut lpa = fixtures::lpa();
        assert_eq!(
            Perfect.apply(&mut lpa),
            Err(vec![FieldError::new("/type", "lpa must be signed")])
        );

        lpa.signed_at = Some(TimeStamp::new());
        assert_eq!(
            Perfect.apply(&mut lpa),
            Err(vec![FieldError::new("/type", "lpa must have a certificate")])
        );

        lpa.certificate_provider.signed_at = Some(TimeStamp::new());
        assert_eq!(
            Perfect.apply(&mut lpa),
            Err(vec![FieldError::new("/type", "lpa must be signed by attorneys")])
        );

        lpa.attorneys[0].signed_at = Some(TimeStamp::new());
        lpa.attorneys[1].status = AttorneyStatus::Removed;
        lpa.trust_corporations.push(fixtures::trust_corporation("tc"));
        assert_eq!(
            Perfect.apply(&mut lpa),
            Err(vec![FieldError::new("/type", "lpa must be signed by trust corporations")])
        );

        lpa.trust_corporations[0].status = AttorneyStatus::Removed;
        Perfect.apply(&mut lpa).unwrap();
        assert_eq!(lpa.status, LpaStatus::Perfect);
    }

    #[test]
    fn lifecycle_to_registered() {
        let mut lpa = fixtures::signed_lpa();

        StatutoryWaitingPeriod.apply(&mut lpa).unwrap();
        Register.apply(&mut lpa).unwrap();

        assert_eq!(lpa.status, LpaStatus::Registered);
        assert!(lpa.registration_date.is_some());
    }

    #[test]
    fn waiting_period_only_from_in_progress() {
        let mut lpa = fixtures::signed_lpa();
        Perfect.apply(&mut lpa).unwrap();
        let before = lpa.clone();

        let errors = StatutoryWaitingPeriod.apply(&mut lpa).unwrap_err();

        assert_eq!(
            errors,
            [FieldError::new("/type", "status must be in-progress to enter statutory-waiting-period")]
        );
        assert_eq!(lpa, before);
        assert_eq!(lpa.status, LpaStatus::Perfect);
    }

    #[test]
    fn register_requires_waiting_period() {
        let mut lpa = fixtures::signed_lpa();
        let before = lpa.clone();

        let errors = Register.apply(&mut lpa).unwrap_err();

        assert_eq!(
            errors,
            [FieldError::new("/type", "status must be statutory-waiting-period to register")]
        );
        assert_eq!(lpa, before);
    }

    #[test]
    fn transitions_take_no_changes() {
        let changes = [Change::new("/status", json!("in-progress"), json!("registered"))];

        let (_, errors) = validate_register(&changes);

        assert_eq!(errors, [FieldError::new("/changes/0", "unexpected change provided")]);
    }

    #[test]
    fn opg_change_status() {
        let mut lpa = fixtures::lpa();
        lpa.status = LpaStatus::StatutoryWaitingPeriod;
        let changes = [Change::new(
            "/status",
            json!("statutory-waiting-period"),
            json!("do-not-register"),
        )];

        let (data, errors) = validate_opg_change_status(&changes, &lpa);
        assert!(errors.is_empty());

        data.apply(&mut lpa).unwrap();
        assert_eq!(lpa.status, LpaStatus::DoNotRegister);
    }

    #[test]
    fn opg_change_status_rules() {
        let mut lpa = fixtures::lpa();

        let errors = OpgChangeStatus { status: LpaStatus::Cancelled }
            .apply(&mut lpa)
            .unwrap_err();
        assert_eq!(
            errors,
            [FieldError::new(
                "/status",
                "Lpa status has to be registered while changing to cancelled"
            )]
        );

        let errors = OpgChangeStatus { status: LpaStatus::Perfect }
            .apply(&mut lpa)
            .unwrap_err();
        assert_eq!(errors[0].source, "/status");

        OpgChangeStatus { status: LpaStatus::Expired }.apply(&mut lpa).unwrap();
        assert_eq!(lpa.status, LpaStatus::Expired);
    }

    #[test]
    fn opg_change_status_old_must_match() {
        let lpa = fixtures::lpa();
        let changes = [Change::new("/status", json!("registered"), json!("cancelled"))];

        let (_, errors) = validate_opg_change_status(&changes, &lpa);

        assert_eq!(errors, [FieldError::new("/changes/0/old", "does not match existing value")]);
    }
}
