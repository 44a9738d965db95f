//! Wire types for claimed field edits and the updates that carry them
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::TimeStamp;

/// One claimed edit: the path, the value the caller believes is stored, and
/// the value to store instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub key: String,
    #[serde(default)]
    pub old: Value,
    #[serde(default)]
    pub new: Value,
}

impl Change {
    pub fn new(key: impl Into<String>, old: Value, new: Value) -> Self {
        Self {
            key: key.into(),
            old,
            new,
        }
    }
}

/// A typed batch of changes. `id`, `uid`, `author` and `applied` are audit
/// metadata filled in once the update has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied: Option<TimeStamp>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(rename = "type")]
    pub update_type: String,
    #[serde(default)]
    pub changes: Vec<Change>,
}

impl Update {
    pub fn new(update_type: impl Into<String>, changes: Vec<Change>) -> Self {
        Self {
            id: String::new(),
            uid: String::new(),
            applied: None,
            author: String::new(),
            update_type: update_type.into(),
            changes,
        }
    }

    /// The trailing identifier of the author URN, e.g. `abc` for
    /// `urn:opg:poas:makeregister:users:abc`.
    pub fn author_uid(&self) -> &str {
        author_uid(&self.author)
    }
}

pub(crate) fn author_uid(urn: &str) -> &str {
    match urn.rsplit_once(":users:") {
        Some((_, uid)) => uid,
        None => "",
    }
}

/// A positional problem with one change, or with the update as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub source: String,
    pub detail: String,
}

impl FieldError {
    pub fn new(source: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            detail: detail.into(),
        }
    }
}

/// The operation tags an update may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateType {
    CertificateProviderSign,
    AttorneySign,
    TrustCorporationSign,
    AttorneyOptOut,
    CertificateProviderOptOut,
    TrustCorporationOptOut,
    DonorWithdrawLpa,
    Perfect,
    Register,
    StatutoryWaitingPeriod,
    OpgStatusChange,
    Correction,
    PostRegistrationCorrection,
    AttorneyDecisions,
    ChangeAttorneys,
    PaperAttorneyAccessOnline,
    PaperCertificateProviderAccessOnline,
    SeverRestrictionsAndConditions,
    DonorConfirmIdentity,
    CertificateProviderConfirmIdentity,
}

impl UpdateType {
    pub const ALL: [UpdateType; 20] = [
        UpdateType::CertificateProviderSign,
        UpdateType::AttorneySign,
        UpdateType::TrustCorporationSign,
        UpdateType::AttorneyOptOut,
        UpdateType::CertificateProviderOptOut,
        UpdateType::TrustCorporationOptOut,
        UpdateType::DonorWithdrawLpa,
        UpdateType::Perfect,
        UpdateType::Register,
        UpdateType::StatutoryWaitingPeriod,
        UpdateType::OpgStatusChange,
        UpdateType::Correction,
        UpdateType::PostRegistrationCorrection,
        UpdateType::AttorneyDecisions,
        UpdateType::ChangeAttorneys,
        UpdateType::PaperAttorneyAccessOnline,
        UpdateType::PaperCertificateProviderAccessOnline,
        UpdateType::SeverRestrictionsAndConditions,
        UpdateType::DonorConfirmIdentity,
        UpdateType::CertificateProviderConfirmIdentity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UpdateType::CertificateProviderSign => "CERTIFICATE_PROVIDER_SIGN",
            UpdateType::AttorneySign => "ATTORNEY_SIGN",
            UpdateType::TrustCorporationSign => "TRUST_CORPORATION_SIGN",
            UpdateType::AttorneyOptOut => "ATTORNEY_OPT_OUT",
            UpdateType::CertificateProviderOptOut => "CERTIFICATE_PROVIDER_OPT_OUT",
            UpdateType::TrustCorporationOptOut => "TRUST_CORPORATION_OPT_OUT",
            UpdateType::DonorWithdrawLpa => "DONOR_WITHDRAW_LPA",
            UpdateType::Perfect => "PERFECT",
            UpdateType::Register => "REGISTER",
            UpdateType::StatutoryWaitingPeriod => "STATUTORY_WAITING_PERIOD",
            UpdateType::OpgStatusChange => "OPG_STATUS_CHANGE",
            UpdateType::Correction => "CORRECTION",
            UpdateType::PostRegistrationCorrection => "POST_REGISTRATION_CORRECTION",
            UpdateType::AttorneyDecisions => "ATTORNEY_DECISIONS",
            UpdateType::ChangeAttorneys => "CHANGE_ATTORNEYS",
            UpdateType::PaperAttorneyAccessOnline => "PAPER_ATTORNEY_ACCESS_ONLINE",
            UpdateType::PaperCertificateProviderAccessOnline => {
                "PAPER_CERTIFICATE_PROVIDER_ACCESS_ONLINE"
            }
            UpdateType::SeverRestrictionsAndConditions => "SEVER_RESTRICTIONS_AND_CONDITIONS",
            UpdateType::DonorConfirmIdentity => "DONOR_CONFIRM_IDENTITY",
            UpdateType::CertificateProviderConfirmIdentity => {
                "CERTIFICATE_PROVIDER_CONFIRM_IDENTITY"
            }
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl std::fmt::Display for UpdateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
