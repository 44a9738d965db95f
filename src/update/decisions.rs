use crate::lpa::{
    CanUse, HowMakeDecisions, HowStepIn, LifeSustainingTreatment, Lpa, LpaType,
};
use crate::parse::{Opts, Parser, optional, required};
use crate::validate::Validator;

/// How the attorneys act, as a correction may change it.
///
/// Which fields may be sent depends on the document: the decision mode only
/// matters with more than one attorney, step-in rules only with
/// replacements, and the LPA type picks between the life-sustaining
/// treatment option and when the LPA can be used. Details are required when
/// a mode is newly set to one that calls for them, and must be empty
/// otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Decisions {
    pub how_attorneys_make_decisions: Option<HowMakeDecisions>,
    pub how_attorneys_make_decisions_details: String,
    pub how_replacement_attorneys_make_decisions: Option<HowMakeDecisions>,
    pub how_replacement_attorneys_make_decisions_details: String,
    pub how_replacement_attorneys_step_in: Option<HowStepIn>,
    pub how_replacement_attorneys_step_in_details: String,
    pub when_the_lpa_can_be_used: Option<CanUse>,
    pub life_sustaining_treatment_option: Option<LifeSustainingTreatment>,
}

fn details_opts(calls_for_details: bool, newly_set: bool) -> Opts {
    match (calls_for_details, newly_set) {
        (true, true) => required().validate(Validator::NotEmpty),
        (true, false) => optional().validate(Validator::NotEmpty),
        (false, _) => optional().validate(Validator::Empty),
    }
}

impl Decisions {
    pub fn from_lpa(lpa: &Lpa) -> Self {
        Self {
            how_attorneys_make_decisions: lpa.how_attorneys_make_decisions,
            how_attorneys_make_decisions_details: lpa.how_attorneys_make_decisions_details.clone(),
            how_replacement_attorneys_make_decisions: lpa.how_replacement_attorneys_make_decisions,
            how_replacement_attorneys_make_decisions_details: lpa
                .how_replacement_attorneys_make_decisions_details
                .clone(),
            how_replacement_attorneys_step_in: lpa.how_replacement_attorneys_step_in,
            how_replacement_attorneys_step_in_details: lpa
                .how_replacement_attorneys_step_in_details
                .clone(),
            when_the_lpa_can_be_used: lpa.when_the_lpa_can_be_used,
            life_sustaining_treatment_option: lpa.life_sustaining_treatment_option,
        }
    }

    /// Parses the decision fields at the top level of `p`. Does not call
    /// [`Parser::consumed`].
    pub fn parse(&mut self, p: &mut Parser, lpa: &Lpa) {
        let (actives, replacements) = lpa.count_attorneys();

        if actives > 1 {
            p.field(
                "/howAttorneysMakeDecisions",
                &mut self.how_attorneys_make_decisions,
                optional().validate(Validator::Valid),
            );
        }

        let mixed = self.how_attorneys_make_decisions
            == Some(HowMakeDecisions::JointlyForSomeSeverallyForOthers);
        p.field(
            "/howAttorneysMakeDecisionsDetails",
            &mut self.how_attorneys_make_decisions_details,
            details_opts(
                mixed,
                self.how_attorneys_make_decisions != lpa.how_attorneys_make_decisions,
            ),
        );

        let jointly_and_severally =
            self.how_attorneys_make_decisions == Some(HowMakeDecisions::JointlyAndSeverally);

        if replacements > 0 && jointly_and_severally {
            p.field(
                "/howReplacementAttorneysStepIn",
                &mut self.how_replacement_attorneys_step_in,
                optional().validate(Validator::Valid),
            );
        }

        p.field(
            "/howReplacementAttorneysStepInDetails",
            &mut self.how_replacement_attorneys_step_in_details,
            details_opts(
                self.how_replacement_attorneys_step_in == Some(HowStepIn::AnotherWay),
                self.how_replacement_attorneys_step_in != lpa.how_replacement_attorneys_step_in,
            ),
        );

        let all_step_in =
            self.how_replacement_attorneys_step_in == Some(HowStepIn::AllCanNoLongerAct);

        if replacements > 1 && (all_step_in || !jointly_and_severally) {
            p.field(
                "/howReplacementAttorneysMakeDecisions",
                &mut self.how_replacement_attorneys_make_decisions,
                optional().validate(Validator::Valid),
            );
        }

        p.field(
            "/howReplacementAttorneysMakeDecisionsDetails",
            &mut self.how_replacement_attorneys_make_decisions_details,
            details_opts(
                self.how_replacement_attorneys_make_decisions
                    == Some(HowMakeDecisions::JointlyForSomeSeverallyForOthers),
                self.how_replacement_attorneys_make_decisions
                    != lpa.how_replacement_attorneys_make_decisions,
            ),
        );

        match lpa.lpa_type {
            LpaType::PersonalWelfare => {
                p.field(
                    "/lifeSustainingTreatmentOption",
                    &mut self.life_sustaining_treatment_option,
                    optional().validate(Validator::Valid),
                );
            }
            LpaType::PropertyAndAffairs => {
                p.field(
                    "/whenTheLpaCanBeUsed",
                    &mut self.when_the_lpa_can_be_used,
                    optional().validate(Validator::Valid),
                );
            }
        }
    }

    /// Writes the decisions, dropping details the chosen modes no longer
    /// call for.
    pub fn apply_to(&self, lpa: &mut Lpa) {
        let mixed = Some(HowMakeDecisions::JointlyForSomeSeverallyForOthers);

        lpa.how_attorneys_make_decisions = self.how_attorneys_make_decisions;
        lpa.how_attorneys_make_decisions_details = if self.how_attorneys_make_decisions == mixed {
            self.how_attorneys_make_decisions_details.clone()
        } else {
            String::new()
        };

        lpa.how_replacement_attorneys_make_decisions = self.how_replacement_attorneys_make_decisions;
        lpa.how_replacement_attorneys_make_decisions_details =
            if self.how_replacement_attorneys_make_decisions == mixed {
                self.how_replacement_attorneys_make_decisions_details.clone()
            } else {
                String::new()
            };

        lpa.how_replacement_attorneys_step_in = self.how_replacement_attorneys_step_in;
        lpa.how_replacement_attorneys_step_in_details =
            if self.how_replacement_attorneys_step_in == Some(HowStepIn::AnotherWay) {
                self.how_replacement_attorneys_step_in_details.clone()
            } else {
                String::new()
            };

        lpa.when_the_lpa_can_be_used = self.when_the_lpa_can_be_used;
        lpa.life_sustaining_treatment_option = self.life_sustaining_treatment_option;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{Change, FieldError};
    use crate::lpa::{AppointmentType, AttorneyStatus};
    use crate::update::fixtures;
    use serde_json::json;

    fn parse(lpa: &Lpa, changes: &[Change]) -> (Decisions, Vec<FieldError>) {
        let mut decisions = Decisions::from_lpa(lpa);
        let mut p = Parser::new(changes);
        decisions.parse(&mut p, lpa);
        (decisions, p.consumed())
    }

    #[test]
    fn mode_needs_more_than_one_attorney() {
        let mut lpa = fixtures::lpa();
        lpa.attorneys.truncate(1);

        let (_, errors) = parse(
            &lpa,
            &[Change::new(
                "/howAttorneysMakeDecisions",
                json!("jointly-and-severally"),
                json!("jointly"),
            )],
        );

        assert_eq!(errors, [FieldError::new("/changes/0", "unexpected change provided")]);
    }

    #[test]
    fn switching_to_mixed_requires_details() {
        let lpa = fixtures::lpa();

        let (_, errors) = parse(
            &lpa,
            &[Change::new(
                "/howAttorneysMakeDecisions",
                json!("jointly-and-severally"),
                json!("jointly-for-some-severally-for-others"),
            )],
        );

        assert_eq!(
            errors,
            [FieldError::new("/changes", "missing /howAttorneysMakeDecisionsDetails")]
        );
    }

    #[test]
    fn leaving_mixed_clears_details() {
        let mut lpa = fixtures::lpa();
        lpa.how_attorneys_make_decisions = Some(HowMakeDecisions::JointlyForSomeSeverallyForOthers);
        lpa.how_attorneys_make_decisions_details = "some of them".into();

        let (decisions, errors) = parse(
            &lpa,
            &[Change::new(
                "/howAttorneysMakeDecisions",
                json!("jointly-for-some-severally-for-others"),
                json!("jointly"),
            )],
        );
        assert!(errors.is_empty());

        decisions.apply_to(&mut lpa);
        assert_eq!(lpa.how_attorneys_make_decisions, Some(HowMakeDecisions::Jointly));
        assert_eq!(lpa.how_attorneys_make_decisions_details, "");
    }

    #[test]
    fn step_in_only_with_replacements() {
        let mut lpa = fixtures::lpa();
        let change = Change::new(
            "/howReplacementAttorneysStepIn",
            json!(null),
            json!("all-can-no-longer-act"),
        );

        let (_, errors) = parse(&lpa, std::slice::from_ref(&change));
        assert_eq!(errors, [FieldError::new("/changes/0", "unexpected change provided")]);

        let mut replacement = fixtures::attorney("r1");
        replacement.status = AttorneyStatus::Inactive;
        replacement.appointment_type = AppointmentType::Replacement;
        lpa.attorneys.push(replacement);

        let (decisions, errors) = parse(&lpa, &[change]);
        assert!(errors.is_empty());
        assert_eq!(
            decisions.how_replacement_attorneys_step_in,
            Some(HowStepIn::AllCanNoLongerAct)
        );
    }

    #[test]
    fn lpa_type_picks_the_usage_field() {
        let lpa = fixtures::lpa();

        let (_, errors) = parse(
            &lpa,
            &[Change::new(
                "/lifeSustainingTreatmentOption",
                json!(null),
                json!("option-a"),
            )],
        );

        assert_eq!(errors, [FieldError::new("/changes/0", "unexpected change provided")]);
    }
}
