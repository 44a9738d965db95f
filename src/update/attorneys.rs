use super::{Apply, reject};
use crate::change::{Change, FieldError};
use crate::lpa::{AppointmentType, AttorneyStatus, HowMakeDecisions, Lpa};
use crate::parse::{Parser, required};
use crate::validate::Validator;

#[derive(Debug, Clone, PartialEq)]
pub struct AttorneyDecision {
    pub index: usize,
    pub cannot_make_joint_decisions: bool,
}

/// Marks attorneys who cannot take part in joint decisions. Only meaningful
/// where their group acts jointly for some decisions and severally for
/// others.
#[derive(Debug, Clone, PartialEq)]
pub struct AttorneyDecisions {
    pub decisions: Vec<AttorneyDecision>,
}

impl Apply for AttorneyDecisions {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        let mixed = Some(HowMakeDecisions::JointlyForSomeSeverallyForOthers);

        for decision in &self.decisions {
            let Some(attorney) = lpa.attorneys.get(decision.index) else {
                return reject("/type", "attorney not found");
            };

            let group_mode = match attorney.appointment_type {
                AppointmentType::Original => lpa.how_attorneys_make_decisions,
                AppointmentType::Replacement => lpa.how_replacement_attorneys_make_decisions,
            };

            if group_mode != mixed {
                return reject(
                    format!("/attorneys/{}/cannotMakeJointDecisions", decision.index),
                    "The appointment type must be jointly for some and severally for others",
                );
            }
        }

        for decision in &self.decisions {
            lpa.attorneys[decision.index].cannot_make_joint_decisions =
                decision.cannot_make_joint_decisions;
        }

        Ok(())
    }
}

pub(super) fn validate_attorney_decisions(
    changes: &[Change],
    lpa: &Lpa,
) -> (AttorneyDecisions, Vec<FieldError>) {
    let mut decisions = Vec::new();

    let errors = Parser::new(changes)
        .prefix("/attorneys", required(), |p| {
            p.each_key(|uid, p| {
                let Some(index) = lpa.find_attorney_index(uid) else {
                    p.out_of_range();
                    return;
                };

                let mut decision = AttorneyDecision {
                    index,
                    cannot_make_joint_decisions: lpa.attorneys[index].cannot_make_joint_decisions,
                };

                p.field(
                    "/cannotMakeJointDecisions",
                    &mut decision.cannot_make_joint_decisions,
                    required(),
                )
                .consumed();

                decisions.push(decision);
            })
            .consumed();
        })
        .consumed();

    (AttorneyDecisions { decisions }, errors)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttorneyStatusChange {
    pub index: usize,
    pub status: AttorneyStatus,
}

/// Moves attorneys between active, inactive and removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeAttorneys {
    pub changes: Vec<AttorneyStatusChange>,
}

impl Apply for ChangeAttorneys {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        for change in &self.changes {
            let Some(attorney) = lpa.attorneys.get(change.index) else {
                return reject("/type", "attorney not found");
            };

            let rule = match (attorney.status, change.status) {
                (AttorneyStatus::Inactive, AttorneyStatus::Removed) => {
                    Some("An inactive attorney cannot be removed")
                }
                (AttorneyStatus::Active, AttorneyStatus::Inactive) => {
                    Some("An active attorney cannot be made inactive")
                }
                (AttorneyStatus::Removed, AttorneyStatus::Active) => {
                    Some("A removed attorney cannot be made active")
                }
                _ => None,
            };

            if let Some(detail) = rule {
                return reject(format!("/attorneys/{}/status", change.index), detail);
            }
        }

        for change in &self.changes {
            lpa.attorneys[change.index].status = change.status;
        }

        Ok(())
    }
}

pub(super) fn validate_change_attorneys(
    changes: &[Change],
    lpa: &Lpa,
) -> (ChangeAttorneys, Vec<FieldError>) {
    let mut status_changes = Vec::new();

    let errors = Parser::new(changes)
        .prefix("/attorneys", required(), |p| {
            p.each(&[], |index, p| {
                let Some(attorney) = lpa.attorneys.get(index) else {
                    p.out_of_range();
                    return;
                };

                let mut change = AttorneyStatusChange {
                    index,
                    status: attorney.status,
                };

                p.field(
                    "/status",
                    &mut change.status,
                    required().validate(Validator::Valid),
                )
                .consumed();

                status_changes.push(change);
            })
            .consumed();
        })
        .consumed();

    (ChangeAttorneys { changes: status_changes }, errors)
}
