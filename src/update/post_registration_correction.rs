use super::decisions::Decisions;
use super::person::{AttorneyCorrection, CertificateProviderCorrection, DonorCorrection};
use super::{Apply, reject};
use crate::change::{Change, FieldError};
use crate::lpa::Lpa;
use crate::parse::{Parser, optional};

/// A correction made once the LPA is registered. Signing dates are out of
/// reach and attorneys are addressed by UID.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRegistrationCorrection {
    pub donor: DonorCorrection,
    pub attorney: Option<(usize, AttorneyCorrection)>,
    pub certificate_provider: CertificateProviderCorrection,
    pub decisions: Decisions,
    pub restrictions_and_conditions: String,
}

impl Apply for PostRegistrationCorrection {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        if self.donor.date_of_birth != lpa.donor.date_of_birth {
            return reject(
                "/donor/dateOfBirth",
                "The donor's date of birth cannot be changed once the LPA is registered",
            );
        }

        let mut notes = self.donor.apply_to(&mut lpa.donor);
        notes.extend(self.certificate_provider.apply_to(&mut lpa.certificate_provider));

        if let Some((i, correction)) = &self.attorney {
            if let Some(attorney) = lpa.attorneys.get_mut(*i) {
                notes.extend(correction.apply_to(attorney));
            }
        }

        self.decisions.apply_to(lpa);
        lpa.restrictions_and_conditions = self.restrictions_and_conditions.clone();
        lpa.notes.extend(notes);

        Ok(())
    }
}

pub(super) fn validate_post_registration_correction(
    changes: &[Change],
    lpa: &Lpa,
) -> (PostRegistrationCorrection, Vec<FieldError>) {
    let mut data = PostRegistrationCorrection {
        donor: DonorCorrection::from_donor(&lpa.donor),
        attorney: None,
        certificate_provider: CertificateProviderCorrection::from_certificate_provider(
            &lpa.certificate_provider,
        ),
        decisions: Decisions::from_lpa(lpa),
        restrictions_and_conditions: lpa.restrictions_and_conditions.clone(),
    };

    let mut parser = Parser::new(changes);

    parser
        .prefix("/donor", optional(), |p| data.donor.parse(p))
        .prefix("/certificateProvider", optional(), |p| {
            data.certificate_provider.parse(p).consumed();
        })
        .prefix("/attorneys", optional(), |p| {
            p.each_key(|uid, p| {
                let Some(i) = lpa.find_attorney_index(uid) else {
                    p.out_of_range();
                    return;
                };
                if data.attorney.as_ref().is_some_and(|(seen, _)| *seen != i) {
                    p.out_of_range();
                    return;
                }

                let (_, correction) = data
                    .attorney
                    .get_or_insert_with(|| (i, AttorneyCorrection::from_attorney(&lpa.attorneys[i])));

                correction
                    .parse(p)
                    .field(
                        "/cannotMakeJointDecisions",
                        &mut correction.cannot_make_joint_decisions,
                        optional(),
                    )
                    .consumed();
            })
            .consumed();
        });

    data.decisions.parse(&mut parser, lpa);

    let errors = parser
        .field(
            "/restrictionsAndConditions",
            &mut data.restrictions_and_conditions,
            optional(),
        )
        .consumed();

    (data, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lpa::LpaStatus;
    use crate::update::fixtures;
    use serde_json::json;

    fn registered() -> Lpa {
        let mut lpa = fixtures::signed_lpa();
        lpa.status = LpaStatus::Registered;
        lpa
    }

    #[test]
    fn corrects_attorney_by_uid() {
        let mut lpa = registered();
        let changes = [
            Change::new("/attorneys/a2/lastName", json!("Attorney"), json!("Smith")),
            Change::new("/attorneys/a2/mobile", json!(null), json!("07777000000")),
        ];

        let (data, errors) = validate_post_registration_correction(&changes, &lpa);
        assert!(errors.is_empty());

        data.apply(&mut lpa).unwrap();
        assert_eq!(lpa.attorneys[1].last_name, "Smith");
        assert_eq!(lpa.attorneys[1].mobile, "07777000000");
        assert_eq!(lpa.notes[0].note_type, "ATTORNEY_NAME_CHANGE_V1");
        assert_eq!(lpa.notes[0].values["uid"], "a2");
    }

    #[test]
    fn unknown_attorney_uid_is_out_of_range() {
        let lpa = registered();
        let changes = [Change::new("/attorneys/zz/lastName", json!("Attorney"), json!("Smith"))];

        let (_, errors) = validate_post_registration_correction(&changes, &lpa);

        assert_eq!(errors, [FieldError::new("/changes/0/key", "index out of range")]);
    }

    #[test]
    fn signing_dates_are_not_correctable() {
        let lpa = registered();
        let changes = [Change::new(
            "/certificateProvider/signedAt",
            json!("2024-01-02T10:00:00Z"),
            json!("2024-01-01T10:00:00Z"),
        )];

        let (_, errors) = validate_post_registration_correction(&changes, &lpa);

        assert_eq!(errors, [FieldError::new("/changes/0", "unexpected change provided")]);
    }

    #[test]
    fn donor_date_of_birth_is_fixed() {
        let mut lpa = registered();
        let changes = [Change::new("/donor/dateOfBirth", json!("1960-05-06"), json!("1961-05-06"))];

        let (data, errors) = validate_post_registration_correction(&changes, &lpa);
        assert!(errors.is_empty());

        let before = lpa.clone();
        let errors = data.apply(&mut lpa).unwrap_err();
        assert_eq!(
            errors,
            [FieldError::new(
                "/donor/dateOfBirth",
                "The donor's date of birth cannot be changed once the LPA is registered"
            )]
        );
        assert_eq!(lpa, before);
    }

    #[test]
    fn restrictions_can_be_rewritten() {
        let mut lpa = registered();
        lpa.restrictions_and_conditions = "must not sell the house".into();
        let changes = [Change::new(
            "/restrictionsAndConditions",
            json!("must not sell the house"),
            json!("must not sell the car"),
        )];

        let (data, errors) = validate_post_registration_correction(&changes, &lpa);
        assert!(errors.is_empty());

        data.apply(&mut lpa).unwrap();
        assert_eq!(lpa.restrictions_and_conditions, "must not sell the car");
    }
}
