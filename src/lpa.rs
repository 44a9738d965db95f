//! The Lasting Power of Attorney document and the people it names
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{Date, TimeStamp};

/// An enum whose wire form is a fixed lowercase string.
pub trait StringEnum: Copy + PartialEq + 'static {
    const VARIANTS: &'static [Self];

    fn as_str(self) -> &'static str;

    fn from_wire(value: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.as_str() == value)
    }
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $value)] $variant),+
        }

        impl StringEnum for $name {
            const VARIANTS: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(
    /// Lifecycle position of the document.
    LpaStatus {
        InProgress => "in-progress",
        Perfect => "perfect",
        StatutoryWaitingPeriod => "statutory-waiting-period",
        Registered => "registered",
        CannotRegister => "cannot-register",
        Withdrawn => "withdrawn",
        Cancelled => "cancelled",
        DoNotRegister => "do-not-register",
        Expired => "expired",
    }
);

string_enum!(LpaType {
    PropertyAndAffairs => "property-and-affairs",
    PersonalWelfare => "personal-welfare",
});

string_enum!(Channel {
    Online => "online",
    Paper => "paper",
});

string_enum!(Lang {
    Cy => "cy",
    En => "en",
});

string_enum!(AttorneyStatus {
    Active => "active",
    Inactive => "inactive",
    Removed => "removed",
});

string_enum!(AppointmentType {
    Original => "original",
    Replacement => "replacement",
});

string_enum!(HowMakeDecisions {
    Jointly => "jointly",
    JointlyAndSeverally => "jointly-and-severally",
    JointlyForSomeSeverallyForOthers => "jointly-for-some-severally-for-others",
});

string_enum!(HowStepIn {
    AllCanNoLongerAct => "all-can-no-longer-act",
    OneCanNoLongerAct => "one-can-no-longer-act",
    AnotherWay => "another-way",
});

string_enum!(CanUse {
    WhenCapacityLost => "when-capacity-lost",
    WhenHasCapacity => "when-has-capacity",
});

string_enum!(LifeSustainingTreatment {
    OptionA => "option-a",
    OptionB => "option-b",
});

string_enum!(IdentityCheckType {
    OneLogin => "one-login",
    OpgPaperId => "opg-paper-id",
});

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub line1: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub line2: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub line3: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub town: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub postcode: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub country: String,
}

impl Address {
    pub fn is_zero(&self) -> bool {
        *self == Address::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityCheck {
    #[serde(rename = "type")]
    pub check_type: IdentityCheckType,
    pub checked_at: TimeStamp,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reference: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Donor {
    pub uid: String,
    pub first_names: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub other_names_known_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<Date>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_language_preference: Option<Lang>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_check: Option<IdentityCheck>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attorney {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub first_names: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<Date>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mobile: String,
    #[serde(default)]
    pub address: Address,
    pub status: AttorneyStatus,
    pub appointment_type: AppointmentType,
    pub channel: Channel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<TimeStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_language_preference: Option<Lang>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub cannot_make_joint_decisions: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Signatory {
    pub first_names: String,
    pub last_name: String,
    pub professional_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<TimeStamp>,
}

impl Signatory {
    pub fn is_zero(&self) -> bool {
        *self == Signatory::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustCorporation {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company_number: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mobile: String,
    #[serde(default)]
    pub address: Address,
    pub status: AttorneyStatus,
    pub appointment_type: AppointmentType,
    pub channel: Channel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signatories: Vec<Signatory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_language_preference: Option<Lang>,
}

impl TrustCorporation {
    /// Signed once at least one signatory exists and every signatory has signed.
    ///
    /// Signing stores one or two signatories, each with `signedAt` set, so
    /// every recorded signatory is checked. A trust corporation that has
    /// never signed has no signatories and counts as unsigned. Callers skip
    /// removed trust corporations: one can only be removed by opting out
    /// before signing.
    pub fn is_signed(&self) -> bool {
        !self.signatories.is_empty() && self.signatories.iter().all(|s| s.signed_at.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateProvider {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub first_names: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(default)]
    pub address: Address,
    pub channel: Channel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<TimeStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_language_preference: Option<Lang>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_check: Option<IdentityCheck>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorisedSignatory {
    pub uid: String,
    pub first_names: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndependentWitness {
    pub uid: String,
    pub first_names: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileUpload {
    pub path: String,
    pub hash: String,
}

/// An audit annotation attached to the document by an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "type")]
    pub note_type: String,
    pub datetime: TimeStamp,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, String>,
}

impl Note {
    pub fn new<'a>(note_type: &str, values: impl IntoIterator<Item = (&'a str, String)>) -> Self {
        Self {
            note_type: note_type.to_string(),
            datetime: TimeStamp::new(),
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lpa {
    pub uid: String,
    pub status: LpaStatus,
    pub lpa_type: LpaType,
    pub channel: Channel,
    pub donor: Donor,
    #[serde(default)]
    pub attorneys: Vec<Attorney>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trust_corporations: Vec<TrustCorporation>,
    pub certificate_provider: CertificateProvider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorised_signatory: Option<AuthorisedSignatory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub independent_witness: Option<IndependentWitness>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how_attorneys_make_decisions: Option<HowMakeDecisions>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub how_attorneys_make_decisions_details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how_replacement_attorneys_make_decisions: Option<HowMakeDecisions>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub how_replacement_attorneys_make_decisions_details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how_replacement_attorneys_step_in: Option<HowStepIn>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub how_replacement_attorneys_step_in_details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_the_lpa_can_be_used: Option<CanUse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_sustaining_treatment_option: Option<LifeSustainingTreatment>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub restrictions_and_conditions: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions_and_conditions_images: Vec<FileUpload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<TimeStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witnessed_by_certificate_provider_at: Option<TimeStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witnessed_by_independent_witness_at: Option<TimeStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_provider_not_related_confirmed_at: Option<TimeStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<TimeStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<TimeStamp>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
}

impl Lpa {
    pub fn find_attorney_index(&self, uid: &str) -> Option<usize> {
        self.attorneys.iter().position(|a| a.uid == uid)
    }

    pub fn find_trust_corporation_index(&self, uid: &str) -> Option<usize> {
        self.trust_corporations.iter().position(|t| t.uid == uid)
    }

    /// Counts attorneys (trust corporations included) able to act now and
    /// replacements still able to step in.
    pub fn count_attorneys(&self) -> (usize, usize) {
        let people = self
            .attorneys
            .iter()
            .map(|a| (a.status, a.appointment_type));
        let corporations = self
            .trust_corporations
            .iter()
            .map(|t| (t.status, t.appointment_type));

        people
            .chain(corporations)
            .fold((0, 0), |(actives, replacements), pair| match pair {
                (AttorneyStatus::Active, _) => (actives + 1, replacements),
                (AttorneyStatus::Inactive, AppointmentType::Replacement) => {
                    (actives, replacements + 1)
                }
                _ => (actives, replacements),
            })
    }

    /// Whether the remaining attorneys can still act after `removed` left,
    /// given how the original attorneys were appointed to make decisions.
    pub fn can_register_without(&self, removed: AppointmentType) -> bool {
        let (actives, replacements) = self.count_attorneys();

        if actives + replacements == 0 {
            return false;
        }

        let joint = matches!(
            self.how_attorneys_make_decisions,
            Some(HowMakeDecisions::Jointly | HowMakeDecisions::JointlyForSomeSeverallyForOthers)
        );

        !(removed == AppointmentType::Original && joint && replacements == 0)
    }
}
