use super::decisions::Decisions;
use super::person::{
    AttorneyCorrection, CertificateProviderCorrection, DonorCorrection, TrustCorporationCorrection,
    parse_authorised_signatory, parse_independent_witness,
};
use super::{Apply, reject};
use crate::change::{Change, FieldError};
use crate::lpa::{AuthorisedSignatory, Channel, IndependentWitness, Lpa, LpaStatus};
use crate::parse::{Parser, optional};
use crate::types::TimeStamp;
use crate::validate::Validator;

/// A correction made by OPG before registration.
///
/// At most one attorney and one trust corporation may be corrected per
/// update. On online LPAs the signing dates are fixed by the service that
/// captured the signature, so they cannot be corrected.
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub donor: DonorCorrection,
    pub attorney: Option<(usize, AttorneyCorrection)>,
    pub trust_corporation: Option<(usize, TrustCorporationCorrection)>,
    pub certificate_provider: CertificateProviderCorrection,
    pub authorised_signatory: Option<AuthorisedSignatory>,
    pub independent_witness: Option<IndependentWitness>,
    pub signed_at: Option<TimeStamp>,
    pub witnessed_by_certificate_provider_at: Option<TimeStamp>,
    pub witnessed_by_independent_witness_at: Option<TimeStamp>,
    pub decisions: Decisions,
}

impl Correction {
    fn online_signing_dates_unchanged(&self, lpa: &Lpa) -> Result<(), Vec<FieldError>> {
        if self.signed_at != lpa.signed_at {
            return reject("/signedAt", "LPA Signed on date cannot be changed for online LPAs");
        }

        if let Some((i, attorney)) = &self.attorney {
            if lpa.attorneys.get(*i).map(|a| a.signed_at) != Some(attorney.signed_at) {
                return reject(
                    format!("/attorneys/{i}/signedAt"),
                    "The attorney signed at date cannot be changed for online LPA",
                );
            }
        }

        if let Some((i, tc)) = &self.trust_corporation {
            let stored = lpa
                .trust_corporations
                .get(*i)
                .map(|t| t.signatories.as_slice())
                .unwrap_or_default();

            for (n, signatory) in tc.signatories.iter().enumerate() {
                if stored.get(n).and_then(|s| s.signed_at) != signatory.signed_at {
                    return reject(
                        format!("/trustCorporations/{i}/signatories/{n}/signedAt"),
                        "The trust corporation signatory signed at date cannot be changed for online LPA",
                    );
                }
            }
        }

        if self.certificate_provider.signed_at != lpa.certificate_provider.signed_at {
            return reject(
                "/certificateProvider/signedAt",
                "The certificate provider signed at date cannot be changed for online LPA",
            );
        }

        Ok(())
    }
}

impl Apply for Correction {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        if lpa.status == LpaStatus::Registered {
            return reject("/type", "cannot make corrections to a Registered LPA");
        }

        if lpa.channel == Channel::Online {
            self.online_signing_dates_unchanged(lpa)?;
        }

        let mut notes = self.donor.apply_to(&mut lpa.donor);

        if let Some((i, correction)) = &self.attorney {
            if let Some(attorney) = lpa.attorneys.get_mut(*i) {
                notes.extend(correction.apply_to(attorney));
            }
        }

        if let Some((i, correction)) = &self.trust_corporation {
            if let Some(tc) = lpa.trust_corporations.get_mut(*i) {
                correction.apply_to(tc);
            }
        }

        notes.extend(self.certificate_provider.apply_to(&mut lpa.certificate_provider));

        if let Some(signatory) = &self.authorised_signatory {
            lpa.authorised_signatory = Some(signatory.clone());
        }

        if let Some(witness) = &self.independent_witness {
            lpa.independent_witness = Some(witness.clone());
        }

        lpa.signed_at = self.signed_at;
        lpa.witnessed_by_certificate_provider_at = self.witnessed_by_certificate_provider_at;
        lpa.witnessed_by_independent_witness_at = self.witnessed_by_independent_witness_at;

        self.decisions.apply_to(lpa);
        lpa.notes.extend(notes);

        Ok(())
    }
}

pub(super) fn validate_correction(changes: &[Change], lpa: &Lpa) -> (Correction, Vec<FieldError>) {
    let mut data = Correction {
        donor: DonorCorrection::from_donor(&lpa.donor),
        attorney: None,
        trust_corporation: None,
        certificate_provider: CertificateProviderCorrection::from_certificate_provider(
            &lpa.certificate_provider,
        ),
        authorised_signatory: None,
        independent_witness: None,
        signed_at: lpa.signed_at,
        witnessed_by_certificate_provider_at: lpa.witnessed_by_certificate_provider_at,
        witnessed_by_independent_witness_at: lpa.witnessed_by_independent_witness_at,
        decisions: Decisions::from_lpa(lpa),
    };

    let mut parser = Parser::new(changes);

    parser
        .prefix("/donor", optional(), |p| data.donor.parse(p))
        .field(
            "/signedAt",
            &mut data.signed_at,
            optional().validate(Validator::NotEmpty),
        )
        .field(
            "/witnessedByCertificateProviderAt",
            &mut data.witnessed_by_certificate_provider_at,
            optional().validate(Validator::NotEmpty),
        )
        .field(
            "/witnessedByIndependentWitnessAt",
            &mut data.witnessed_by_independent_witness_at,
            optional().validate(Validator::NotEmpty),
        )
        .prefix("/attorneys", optional(), |p| {
            p.each(&[], |i, p| {
                let Some(attorney) = lpa.attorneys.get(i) else {
                    p.out_of_range();
                    return;
                };
                if data.attorney.as_ref().is_some_and(|(seen, _)| *seen != i) {
                    p.out_of_range();
                    return;
                }

                let (_, correction) = data
                    .attorney
                    .get_or_insert_with(|| (i, AttorneyCorrection::from_attorney(attorney)));

                correction
                    .parse(p)
                    .field(
                        "/signedAt",
                        &mut correction.signed_at,
                        optional().validate(Validator::NotEmpty),
                    )
                    .consumed();
            })
            .consumed();
        })
        .prefix("/trustCorporations", optional(), |p| {
            p.each(&[], |i, p| {
                let Some(tc) = lpa.trust_corporations.get(i) else {
                    p.out_of_range();
                    return;
                };
                if data.trust_corporation.as_ref().is_some_and(|(seen, _)| *seen != i) {
                    p.out_of_range();
                    return;
                }

                let (_, correction) = data.trust_corporation.get_or_insert_with(|| {
                    (i, TrustCorporationCorrection::from_trust_corporation(tc))
                });

                correction.parse(p);
            })
            .consumed();
        })
        .prefix("/certificateProvider", optional(), |p| {
            let cp = &mut data.certificate_provider;

            cp.parse(p)
                .field(
                    "/signedAt",
                    &mut cp.signed_at,
                    optional().validate(Validator::NotEmpty),
                )
                .consumed();
        })
        .prefix("/authorisedSignatory", optional(), |p| {
            let signatory = data
                .authorised_signatory
                .insert(lpa.authorised_signatory.clone().unwrap_or_default());

            parse_authorised_signatory(p, signatory);
        })
        .prefix("/independentWitness", optional(), |p| {
            let witness = data
                .independent_witness
                .insert(lpa.independent_witness.clone().unwrap_or_default());

            parse_independent_witness(p, witness);
        });

    data.decisions.parse(&mut parser, lpa);

    let errors = parser.consumed();

    (data, errors)
}
