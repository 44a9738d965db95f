//! Signing by the certificate provider, an attorney or a trust corporation.
//!
//! Signing fields start unset rather than seeded from the document, so the
//! claimed `old` values must be null and signing twice is caught by `Apply`.
use super::{Apply, reject};
use crate::change::{Change, FieldError};
use crate::lpa::{Address, Lang, Lpa, Signatory};
use crate::parse::{Parser, optional, required};
use crate::types::TimeStamp;
use crate::validate::Validator;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CertificateProviderSign {
    pub address: Address,
    pub signed_at: Option<TimeStamp>,
    pub contact_language_preference: Option<Lang>,
}

impl Apply for CertificateProviderSign {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        if lpa.certificate_provider.signed_at.is_some() {
            return reject("/type", "certificate provider cannot sign again");
        }

        let cp = &mut lpa.certificate_provider;
        if !self.address.is_zero() {
            cp.address = self.address.clone();
        }
        cp.signed_at = self.signed_at;
        cp.contact_language_preference = self.contact_language_preference;

        Ok(())
    }
}

fn parse_sign_address(p: &mut Parser, address: &mut Address) {
    p.field("/line1", &mut address.line1, required().validate(Validator::NotEmpty))
        .field("/line2", &mut address.line2, optional())
        .field("/line3", &mut address.line3, optional())
        .field("/town", &mut address.town, required().validate(Validator::NotEmpty))
        .field("/postcode", &mut address.postcode, optional())
        .field(
            "/country",
            &mut address.country,
            required().validate(Validator::Country),
        )
        .consumed();
}

pub(super) fn validate_certificate_provider_sign(
    changes: &[Change],
) -> (CertificateProviderSign, Vec<FieldError>) {
    let mut data = CertificateProviderSign::default();

    let errors = Parser::new(changes)
        .prefix("/certificateProvider", required(), |p| {
            p.prefix("/address", optional(), |p| parse_sign_address(p, &mut data.address))
                .field(
                    "/signedAt",
                    &mut data.signed_at,
                    required().validate(Validator::NotEmpty),
                )
                .field(
                    "/contactLanguagePreference",
                    &mut data.contact_language_preference,
                    required().validate(Validator::Valid),
                )
                .consumed();
        })
        .consumed();

    (data, errors)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttorneySign {
    pub index: usize,
    pub mobile: String,
    pub signed_at: Option<TimeStamp>,
    pub contact_language_preference: Option<Lang>,
}

impl Apply for AttorneySign {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        let Some(attorney) = lpa.attorneys.get_mut(self.index) else {
            return reject("/type", "attorney not found");
        };

        if attorney.signed_at.is_some() {
            return reject("/type", "attorney cannot sign again");
        }

        if !self.mobile.is_empty() {
            attorney.mobile = self.mobile.clone();
        }
        attorney.signed_at = self.signed_at;
        attorney.contact_language_preference = self.contact_language_preference;

        Ok(())
    }
}

pub(super) fn validate_attorney_sign(changes: &[Change], lpa: &Lpa) -> (AttorneySign, Vec<FieldError>) {
    let mut data = AttorneySign::default();
    let mut index = None;

    let errors = Parser::new(changes)
        .prefix("/attorneys", required(), |p| {
            p.each(&[], |i, p| {
                if i >= lpa.attorneys.len() || index.is_some_and(|seen| seen != i) {
                    p.out_of_range();
                    return;
                }
                index = Some(i);

                p.field("/mobile", &mut data.mobile, optional())
                    .field(
                        "/signedAt",
                        &mut data.signed_at,
                        required().validate(Validator::NotEmpty),
                    )
                    .field(
                        "/contactLanguagePreference",
                        &mut data.contact_language_preference,
                        required().validate(Validator::Valid),
                    )
                    .consumed();
            })
            .consumed();
        })
        .consumed();

    data.index = index.unwrap_or_default();
    (data, errors)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrustCorporationSign {
    pub index: usize,
    pub mobile: String,
    pub signatories: [Signatory; 2],
    pub contact_language_preference: Option<Lang>,
}

impl Apply for TrustCorporationSign {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        let Some(tc) = lpa.trust_corporations.get_mut(self.index) else {
            return reject("/type", "trust corporation not found");
        };

        if tc.signatories.first().is_some_and(|s| s.signed_at.is_some()) {
            return reject("/type", "trust corporation cannot sign again");
        }

        if !self.mobile.is_empty() {
            tc.mobile = self.mobile.clone();
        }
        tc.signatories = self
            .signatories
            .iter()
            .filter(|s| !s.is_zero())
            .cloned()
            .collect();
        tc.contact_language_preference = self.contact_language_preference;

        Ok(())
    }
}

pub(super) fn validate_trust_corporation_sign(
    changes: &[Change],
    lpa: &Lpa,
) -> (TrustCorporationSign, Vec<FieldError>) {
    let mut data = TrustCorporationSign::default();
    let mut index = None;

    let errors = Parser::new(changes)
        .prefix("/trustCorporations", required(), |p| {
            p.each(&[], |i, p| {
                if i >= lpa.trust_corporations.len() || index.is_some_and(|seen| seen != i) {
                    p.out_of_range();
                    return;
                }
                index = Some(i);

                let signatories = &mut data.signatories;

                p.field("/mobile", &mut data.mobile, optional())
                    .prefix("/signatories", required(), |p| {
                        p.each(&[0], |s, p| {
                            let Some(signatory) = signatories.get_mut(s) else {
                                p.out_of_range();
                                return;
                            };

                            p.field(
                                "/firstNames",
                                &mut signatory.first_names,
                                required().validate(Validator::NotEmpty),
                            )
                            .field(
                                "/lastName",
                                &mut signatory.last_name,
                                required().validate(Validator::NotEmpty),
                            )
                            .field(
                                "/professionalTitle",
                                &mut signatory.professional_title,
                                required().validate(Validator::NotEmpty),
                            )
                            .field(
                                "/signedAt",
                                &mut signatory.signed_at,
                                required().validate(Validator::NotEmpty),
                            )
                            .consumed();
                        })
                        .consumed();
                    })
                    .field(
                        "/contactLanguagePreference",
                        &mut data.contact_language_preference,
                        required().validate(Validator::Valid),
                    )
                    .consumed();
            })
            .consumed();
        })
        .consumed();

    data.index = index.unwrap_or_default();
    (data, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::fixtures;
    use serde_json::json;

    #[test]
    fn certificate_provider_sign() {
        let changes = [
            Change::new(
                "/certificateProvider/signedAt",
                json!(null),
                json!("2024-01-02T10:00:00Z"),
            ),
            Change::new(
                "/certificateProvider/contactLanguagePreference",
                json!(null),
                json!("en"),
            ),
        ];
        let mut lpa = fixtures::lpa();

        let (data, errors) = validate_certificate_provider_sign(&changes);
        assert!(errors.is_empty());

        data.apply(&mut lpa).unwrap();
        assert_eq!(
            lpa.certificate_provider.signed_at,
            TimeStamp::new_with(2024, 1, 2, 10, 0, 0)
        );
        assert_eq!(lpa.certificate_provider.contact_language_preference, Some(Lang::En));
        assert_eq!(lpa.certificate_provider.address, fixtures::address());
    }

    #[test]
    fn certificate_provider_sign_partial_address() {
        let changes = [
            Change::new("/certificateProvider/address/line1", json!(null), json!("2 Road")),
            Change::new(
                "/certificateProvider/signedAt",
                json!(null),
                json!("2024-01-02T10:00:00Z"),
            ),
            Change::new(
                "/certificateProvider/contactLanguagePreference",
                json!(null),
                json!("cy"),
            ),
        ];

        let (_, errors) = validate_certificate_provider_sign(&changes);

        assert_eq!(
            errors,
            [
                FieldError::new("/changes", "missing /certificateProvider/address/town"),
                FieldError::new("/changes", "missing /certificateProvider/address/country"),
            ]
        );
    }

    #[test]
    fn certificate_provider_cannot_sign_again() {
        let mut lpa = fixtures::signed_lpa();
        let before = lpa.clone();
        let data = CertificateProviderSign {
            signed_at: TimeStamp::new_with(2024, 2, 2, 10, 0, 0),
            contact_language_preference: Some(Lang::Cy),
            ..Default::default()
        };

        let errors = data.apply(&mut lpa).unwrap_err();

        assert_eq!(errors, [FieldError::new("/type", "certificate provider cannot sign again")]);
        assert_eq!(lpa, before);
    }

    #[test]
    fn attorney_sign_rejects_other_fields() {
        let changes = [
            Change::new("/attorneys/1/mobile", json!(null), json!("07777000000")),
            Change::new("/attorneys/1/signedAt", json!(null), json!("2024-01-02T10:00:00Z")),
            Change::new("/attorneys/1/contactLanguagePreference", json!(null), json!("en")),
            Change::new("/donor/firstNames", json!("Dee"), json!("Dana")),
        ];

        let (data, errors) = validate_attorney_sign(&changes, &fixtures::lpa());

        assert_eq!(errors, [FieldError::new("/changes/3", "unexpected change provided")]);
        assert_eq!(data.index, 1);
        assert_eq!(data.mobile, "07777000000");
    }

    #[test]
    fn attorney_sign_one_attorney_at_a_time() {
        let changes = [
            Change::new("/attorneys/0/signedAt", json!(null), json!("2024-01-02T10:00:00Z")),
            Change::new("/attorneys/0/contactLanguagePreference", json!(null), json!("en")),
            Change::new("/attorneys/1/signedAt", json!(null), json!("2024-01-02T10:00:00Z")),
            Change::new("/attorneys/7/signedAt", json!(null), json!("2024-01-02T10:00:00Z")),
        ];

        let (_, errors) = validate_attorney_sign(&changes, &fixtures::lpa());

        assert_eq!(
            errors,
            [
                FieldError::new("/changes/2/key", "index out of range"),
                FieldError::new("/changes/3/key", "index out of range"),
            ]
        );
    }

    #[test]
    fn attorney_sign_old_must_be_null() {
        let changes = [
            Change::new("/attorneys/0/signedAt", json!("2024-01-01T10:00:00Z"), json!("2024-01-02T10:00:00Z")),
            Change::new("/attorneys/0/contactLanguagePreference", json!(null), json!("en")),
        ];

        let (_, errors) = validate_attorney_sign(&changes, &fixtures::lpa());

        assert_eq!(errors, [FieldError::new("/changes/0/old", "does not match existing value")]);
    }

    #[test]
    fn trust_corporation_sign() {
        let mut lpa = fixtures::lpa();
        lpa.trust_corporations.push(fixtures::trust_corporation("tc"));

        let changes = [
            Change::new("/trustCorporations/0/mobile", json!(null), json!("07777000000")),
            Change::new("/trustCorporations/0/signatories/0/firstNames", json!(null), json!("Sam")),
            Change::new("/trustCorporations/0/signatories/0/lastName", json!(null), json!("Smith")),
            Change::new(
                "/trustCorporations/0/signatories/0/professionalTitle",
                json!(null),
                json!("Director"),
            ),
            Change::new(
                "/trustCorporations/0/signatories/0/signedAt",
                json!(null),
                json!("2024-01-02T10:00:00Z"),
            ),
            Change::new("/trustCorporations/0/contactLanguagePreference", json!(null), json!("en")),
        ];

        let (data, errors) = validate_trust_corporation_sign(&changes, &lpa);
        assert!(errors.is_empty());

        data.apply(&mut lpa).unwrap();
        let tc = &lpa.trust_corporations[0];
        assert_eq!(tc.signatories.len(), 1);
        assert!(tc.is_signed());
        assert_eq!(tc.mobile, "07777000000");

        let errors = data.apply(&mut lpa).unwrap_err();
        assert_eq!(errors, [FieldError::new("/type", "trust corporation cannot sign again")]);
    }

    #[test]
    fn trust_corporation_sign_third_signatory_out_of_range() {
        let mut lpa = fixtures::lpa();
        lpa.trust_corporations.push(fixtures::trust_corporation("tc"));

        let changes = [Change::new(
            "/trustCorporations/0/signatories/2/firstNames",
            json!(null),
            json!("Sam"),
        )];

        let (_, errors) = validate_trust_corporation_sign(&changes, &lpa);

        assert!(errors.contains(&FieldError::new("/changes/0/key", "index out of range")));
        assert!(errors.contains(&FieldError::new(
            "/changes",
            "missing /trustCorporations/0/signatories/0/firstNames"
        )));
    }
}
