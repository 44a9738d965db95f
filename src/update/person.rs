//! Field sets for correcting the people named on a document.
//!
//! Each correction is seeded from the person as stored, so a claimed `old`
//! value has to agree with the document and untouched fields carry over.
use crate::lpa::{
    Address, Attorney, AuthorisedSignatory, CertificateProvider, Donor, IndependentWitness, Note,
    Signatory, TrustCorporation,
};
use crate::parse::{Parser, optional};
use crate::types::{Date, TimeStamp};
use crate::validate::Validator;

pub(crate) fn parse_address(p: &mut Parser, address: &mut Address) {
    p.field("/line1", &mut address.line1, optional())
        .field("/line2", &mut address.line2, optional())
        .field("/line3", &mut address.line3, optional())
        .field("/town", &mut address.town, optional())
        .field("/postcode", &mut address.postcode, optional())
        .field(
            "/country",
            &mut address.country,
            optional().validate(Validator::Country),
        )
        .consumed();
}

fn name_note(note_type: &str, uid: &str, first_names: &str, last_name: &str) -> Note {
    Note::new(
        note_type,
        [
            ("uid", uid.to_string()),
            ("firstNames", first_names.to_string()),
            ("lastName", last_name.to_string()),
        ],
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonorCorrection {
    pub first_names: String,
    pub last_name: String,
    pub other_names_known_by: String,
    pub date_of_birth: Option<Date>,
    pub address: Address,
    pub email: String,
}

impl DonorCorrection {
    pub fn from_donor(donor: &Donor) -> Self {
        Self {
            first_names: donor.first_names.clone(),
            last_name: donor.last_name.clone(),
            other_names_known_by: donor.other_names_known_by.clone(),
            date_of_birth: donor.date_of_birth,
            address: donor.address.clone(),
            email: donor.email.clone(),
        }
    }

    pub fn parse(&mut self, p: &mut Parser) {
        p.field(
            "/firstNames",
            &mut self.first_names,
            optional().validate(Validator::NotEmpty),
        )
        .field(
            "/lastName",
            &mut self.last_name,
            optional().validate(Validator::NotEmpty),
        )
        .field("/otherNamesKnownBy", &mut self.other_names_known_by, optional())
        .field(
            "/dateOfBirth",
            &mut self.date_of_birth,
            optional().validate(Validator::Date),
        )
        .prefix("/address", optional(), |p| parse_address(p, &mut self.address))
        .field("/email", &mut self.email, optional())
        .consumed();
    }

    /// Writes the correction and returns notes for a changed name or date of
    /// birth.
    pub fn apply_to(&self, donor: &mut Donor) -> Vec<Note> {
        let mut notes = Vec::new();

        if donor.first_names != self.first_names || donor.last_name != self.last_name {
            notes.push(name_note(
                "DONOR_NAME_CHANGE_V1",
                &donor.uid,
                &self.first_names,
                &self.last_name,
            ));
        }

        if donor.date_of_birth != self.date_of_birth {
            let dob = self.date_of_birth.map(|d| d.to_string()).unwrap_or_default();
            notes.push(Note::new(
                "DONOR_DOB_CHANGE_V1",
                [("uid", donor.uid.clone()), ("dateOfBirth", dob)],
            ));
        }

        donor.first_names = self.first_names.clone();
        donor.last_name = self.last_name.clone();
        donor.other_names_known_by = self.other_names_known_by.clone();
        donor.date_of_birth = self.date_of_birth;
        donor.address = self.address.clone();
        donor.email = self.email.clone();

        notes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttorneyCorrection {
    pub first_names: String,
    pub last_name: String,
    pub date_of_birth: Option<Date>,
    pub address: Address,
    pub email: String,
    pub mobile: String,
    pub signed_at: Option<TimeStamp>,
    pub cannot_make_joint_decisions: bool,
}

impl AttorneyCorrection {
    pub fn from_attorney(attorney: &Attorney) -> Self {
        Self {
            first_names: attorney.first_names.clone(),
            last_name: attorney.last_name.clone(),
            date_of_birth: attorney.date_of_birth,
            address: attorney.address.clone(),
            email: attorney.email.clone(),
            mobile: attorney.mobile.clone(),
            signed_at: attorney.signed_at,
            cannot_make_joint_decisions: attorney.cannot_make_joint_decisions,
        }
    }

    /// Parses the fields shared by both kinds of correction. The caller adds
    /// its own fields and calls [`Parser::consumed`].
    pub fn parse<'p>(&mut self, p: &'p mut Parser) -> &'p mut Parser {
        p.field(
            "/firstNames",
            &mut self.first_names,
            optional().validate(Validator::NotEmpty),
        )
        .field(
            "/lastName",
            &mut self.last_name,
            optional().validate(Validator::NotEmpty),
        )
        .field(
            "/dateOfBirth",
            &mut self.date_of_birth,
            optional().validate(Validator::Date),
        )
        .field("/email", &mut self.email, optional())
        .field("/mobile", &mut self.mobile, optional())
        .prefix("/address", optional(), |p| parse_address(p, &mut self.address))
    }

    pub fn apply_to(&self, attorney: &mut Attorney) -> Vec<Note> {
        let mut notes = Vec::new();

        if attorney.first_names != self.first_names || attorney.last_name != self.last_name {
            notes.push(name_note(
                "ATTORNEY_NAME_CHANGE_V1",
                &attorney.uid,
                &self.first_names,
                &self.last_name,
            ));
        }

        attorney.first_names = self.first_names.clone();
        attorney.last_name = self.last_name.clone();
        attorney.date_of_birth = self.date_of_birth;
        attorney.address = self.address.clone();
        attorney.email = self.email.clone();
        attorney.mobile = self.mobile.clone();
        attorney.signed_at = self.signed_at;
        attorney.cannot_make_joint_decisions = self.cannot_make_joint_decisions;

        notes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrustCorporationCorrection {
    pub name: String,
    pub company_number: String,
    pub email: String,
    pub mobile: String,
    pub address: Address,
    pub signatories: Vec<Signatory>,
}

impl TrustCorporationCorrection {
    pub fn from_trust_corporation(tc: &TrustCorporation) -> Self {
        Self {
            name: tc.name.clone(),
            company_number: tc.company_number.clone(),
            email: tc.email.clone(),
            mobile: tc.mobile.clone(),
            address: tc.address.clone(),
            signatories: tc.signatories.clone(),
        }
    }

    pub fn parse(&mut self, p: &mut Parser) {
        let signatories = &mut self.signatories;

        p.field("/name", &mut self.name, optional().validate(Validator::NotEmpty))
            .field(
                "/companyNumber",
                &mut self.company_number,
                optional().validate(Validator::NotEmpty),
            )
            .field("/email", &mut self.email, optional())
            .field("/mobile", &mut self.mobile, optional())
            .prefix("/address", optional(), |p| parse_address(p, &mut self.address))
            .prefix("/signatories", optional(), |p| {
                p.each(&[], |i, p| {
                    let Some(signatory) = signatories.get_mut(i) else {
                        p.out_of_range();
                        return;
                    };

                    p.field(
                        "/firstNames",
                        &mut signatory.first_names,
                        optional().validate(Validator::NotEmpty),
                    )
                    .field(
                        "/lastName",
                        &mut signatory.last_name,
                        optional().validate(Validator::NotEmpty),
                    )
                    .field(
                        "/professionalTitle",
                        &mut signatory.professional_title,
                        optional().validate(Validator::NotEmpty),
                    )
                    .field(
                        "/signedAt",
                        &mut signatory.signed_at,
                        optional().validate(Validator::NotEmpty),
                    )
                    .consumed();
                })
                .consumed();
            })
            .consumed();
    }

    pub fn apply_to(&self, tc: &mut TrustCorporation) {
        tc.name = self.name.clone();
        tc.company_number = self.company_number.clone();
        tc.email = self.email.clone();
        tc.mobile = self.mobile.clone();
        tc.address = self.address.clone();
        tc.signatories = self.signatories.clone();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertificateProviderCorrection {
    pub first_names: String,
    pub last_name: String,
    pub address: Address,
    pub email: String,
    pub phone: String,
    pub signed_at: Option<TimeStamp>,
}

impl CertificateProviderCorrection {
    pub fn from_certificate_provider(cp: &CertificateProvider) -> Self {
        Self {
            first_names: cp.first_names.clone(),
            last_name: cp.last_name.clone(),
            address: cp.address.clone(),
            email: cp.email.clone(),
            phone: cp.phone.clone(),
            signed_at: cp.signed_at,
        }
    }

    pub fn parse<'p>(&mut self, p: &'p mut Parser) -> &'p mut Parser {
        p.field(
            "/firstNames",
            &mut self.first_names,
            optional().validate(Validator::NotEmpty),
        )
        .field(
            "/lastName",
            &mut self.last_name,
            optional().validate(Validator::NotEmpty),
        )
        .prefix("/address", optional(), |p| parse_address(p, &mut self.address))
        .field("/email", &mut self.email, optional())
        .field("/phone", &mut self.phone, optional())
    }

    pub fn apply_to(&self, cp: &mut CertificateProvider) -> Vec<Note> {
        let mut notes = Vec::new();

        if cp.first_names != self.first_names || cp.last_name != self.last_name {
            notes.push(name_note(
                "CERTIFICATE_PROVIDER_NAME_CHANGE_V1",
                &cp.uid,
                &self.first_names,
                &self.last_name,
            ));
        }

        cp.first_names = self.first_names.clone();
        cp.last_name = self.last_name.clone();
        cp.address = self.address.clone();
        cp.email = self.email.clone();
        cp.phone = self.phone.clone();
        cp.signed_at = self.signed_at;

        notes
    }
}

pub(crate) fn parse_authorised_signatory(p: &mut Parser, signatory: &mut AuthorisedSignatory) {
    p.field(
        "/firstNames",
        &mut signatory.first_names,
        optional().validate(Validator::NotEmpty),
    )
    .field(
        "/lastName",
        &mut signatory.last_name,
        optional().validate(Validator::NotEmpty),
    )
    .consumed();
}

pub(crate) fn parse_independent_witness(p: &mut Parser, witness: &mut IndependentWitness) {
    p.field(
        "/firstNames",
        &mut witness.first_names,
        optional().validate(Validator::NotEmpty),
    )
    .field(
        "/lastName",
        &mut witness.last_name,
        optional().validate(Validator::NotEmpty),
    )
    .field("/phone", &mut witness.phone, optional())
    .prefix("/address", optional(), |p| parse_address(p, &mut witness.address))
    .consumed();
}
