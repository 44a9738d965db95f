//! Giving paper attorneys and certificate providers an email address so they
//! can use the online service.
use super::{Apply, reject};
use crate::change::{Change, FieldError};
use crate::lpa::{Channel, Lpa};
use crate::parse::{Parser, required};
use crate::validate::Validator;

#[derive(Debug, Clone, PartialEq)]
pub struct PaperAttorneyAccessOnline {
    pub index: usize,
    pub email: String,
}

impl Apply for PaperAttorneyAccessOnline {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        let Some(attorney) = lpa.attorneys.get_mut(self.index) else {
            return reject("/type", "attorney not found");
        };

        if attorney.channel != Channel::Paper {
            return reject("/channel", "lpa channel is not paper");
        }

        attorney.email = self.email.clone();
        Ok(())
    }
}

pub(super) fn validate_paper_attorney_access_online(
    changes: &[Change],
    lpa: &Lpa,
) -> (PaperAttorneyAccessOnline, Vec<FieldError>) {
    let mut index = None;
    let mut email = String::new();

    let errors = Parser::new(changes)
        .prefix("/attorneys", required(), |p| {
            p.each_key(|uid, p| {
                let found = lpa.find_attorney_index(uid);
                let Some(i) = found.filter(|&i| index.is_none_or(|seen| seen == i)) else {
                    p.out_of_range();
                    return;
                };

                index = Some(i);
                email = lpa.attorneys[i].email.clone();

                p.field("/email", &mut email, required().validate(Validator::NotEmpty))
                    .consumed();
            })
            .consumed();
        })
        .consumed();

    let data = PaperAttorneyAccessOnline {
        index: index.unwrap_or_default(),
        email,
    };

    (data, errors)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaperCertificateProviderAccessOnline {
    pub email: String,
}

impl Apply for PaperCertificateProviderAccessOnline {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        if lpa.certificate_provider.channel != Channel::Paper {
            return reject("/channel", "lpa channel is not paper");
        }

        lpa.certificate_provider.email = self.email.clone();
        Ok(())
    }
}

pub(super) fn validate_paper_certificate_provider_access_online(
    changes: &[Change],
    lpa: &Lpa,
) -> (PaperCertificateProviderAccessOnline, Vec<FieldError>) {
    let mut data = PaperCertificateProviderAccessOnline {
        email: lpa.certificate_provider.email.clone(),
    };

    let errors = Parser::new(changes)
        .field(
            "/certificateProvider/email",
            &mut data.email,
            required().validate(Validator::NotEmpty),
        )
        .consumed();

    (data, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::fixtures;
    use serde_json::json;

    #[test]
    fn paper_attorney_gets_email() {
        let mut lpa = fixtures::lpa();
        lpa.attorneys[1].channel = Channel::Paper;
        let changes = [Change::new("/attorneys/a2/email", json!(null), json!("a2@example.com"))];

        let (data, errors) = validate_paper_attorney_access_online(&changes, &lpa);
        assert!(errors.is_empty());

        data.apply(&mut lpa).unwrap();
        assert_eq!(lpa.attorneys[1].email, "a2@example.com");
    }

    #[test]
    fn online_attorney_is_rejected() {
        let mut lpa = fixtures::lpa();
        let changes = [Change::new("/attorneys/a1/email", json!(null), json!("a1@example.com"))];

        let (data, errors) = validate_paper_attorney_access_online(&changes, &lpa);
        assert!(errors.is_empty());

        let errors = data.apply(&mut lpa).unwrap_err();
        assert_eq!(errors, [FieldError::new("/channel", "lpa channel is not paper")]);
    }

    #[test]
    fn only_one_attorney_per_update() {
        let lpa = fixtures::lpa();
        let changes = [
            Change::new("/attorneys/a1/email", json!(null), json!("a1@example.com")),
            Change::new("/attorneys/a2/email", json!(null), json!("a2@example.com")),
        ];

        let (_, errors) = validate_paper_attorney_access_online(&changes, &lpa);

        assert_eq!(errors, [FieldError::new("/changes/1/key", "index out of range")]);
    }

    #[test]
    fn certificate_provider_email_required() {
        let lpa = fixtures::lpa();
        let changes = [Change::new("/certificateProvider/email", json!(null), json!(""))];

        let (_, errors) = validate_paper_certificate_provider_access_online(&changes, &lpa);

        assert_eq!(errors, [FieldError::new("/changes/0/new", "field is required")]);
    }
}
