use super::Apply;
use crate::change::{Change, FieldError};
use crate::lpa::{Lpa, Note};
use crate::parse::{Parser, optional};

const KEY: &str = "/restrictionsAndConditions";

/// Removes restrictions a court has severed. The caller may send the
/// remaining wording; otherwise all restrictions are cleared. Scanned images
/// of the original wording are always dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct SeverRestrictionsAndConditions {
    pub restrictions_and_conditions: String,
}

impl Apply for SeverRestrictionsAndConditions {
    fn apply(&self, lpa: &mut Lpa) -> Result<(), Vec<FieldError>> {
        lpa.notes.push(Note::new(
            "RESTRICTIONS_AND_CONDITIONS_SEVERED_V1",
            [
                ("previous", lpa.restrictions_and_conditions.clone()),
                ("current", self.restrictions_and_conditions.clone()),
            ],
        ));

        lpa.restrictions_and_conditions = self.restrictions_and_conditions.clone();
        lpa.restrictions_and_conditions_images.clear();

        Ok(())
    }
}

pub(super) fn validate_sever_restrictions(
    changes: &[Change],
    lpa: &Lpa,
) -> (SeverRestrictionsAndConditions, Vec<FieldError>) {
    let mut data = SeverRestrictionsAndConditions {
        restrictions_and_conditions: lpa.restrictions_and_conditions.clone(),
    };

    let errors = Parser::new(changes)
        .field(KEY, &mut data.restrictions_and_conditions, optional())
        .consumed();

    if !changes.iter().any(|c| c.key == KEY) {
        data.restrictions_and_conditions.clear();
    }

    (data, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lpa::FileUpload;
    use crate::update::fixtures;
    use serde_json::json;

    fn restricted() -> Lpa {
        let mut lpa = fixtures::lpa();
        lpa.restrictions_and_conditions = "do not sell the house. do not sell the car".into();
        lpa.restrictions_and_conditions_images.push(FileUpload {
            path: "uploads/r.png".into(),
            hash: "abc".into(),
        });
        lpa
    }

    #[test]
    fn rewords_remaining_restrictions() {
        let mut lpa = restricted();
        let changes = [Change::new(
            KEY,
            json!("do not sell the house. do not sell the car"),
            json!("do not sell the car"),
        )];

        let (data, errors) = validate_sever_restrictions(&changes, &lpa);
        assert!(errors.is_empty());

        data.apply(&mut lpa).unwrap();
        assert_eq!(lpa.restrictions_and_conditions, "do not sell the car");
        assert!(lpa.restrictions_and_conditions_images.is_empty());
        assert_eq!(lpa.notes[0].note_type, "RESTRICTIONS_AND_CONDITIONS_SEVERED_V1");
    }

    #[test]
    fn clears_everything_without_changes() {
        let mut lpa = restricted();

        let (data, errors) = validate_sever_restrictions(&[], &lpa);
        assert!(errors.is_empty());

        data.apply(&mut lpa).unwrap();
        assert_eq!(lpa.restrictions_and_conditions, "");
        assert!(lpa.restrictions_and_conditions_images.is_empty());
    }

    #[test]
    fn stale_old_value_is_rejected() {
        let lpa = restricted();
        let changes = [Change::new(KEY, json!("something else"), json!("do not sell the car"))];

        let (_, errors) = validate_sever_restrictions(&changes, &lpa);

        assert_eq!(errors, [FieldError::new("/changes/0/old", "does not match existing value")]);
    }
}
