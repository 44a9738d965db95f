//! Post-decode field checks, keyed by the kind of value being checked
use super::types::{Date, TimeStamp};

pub const MSG_REQUIRED: &str = "field is required";
pub const MSG_TYPE: &str = "unexpected type";
pub const MSG_NOT_PROVIDED: &str = "field must not be provided";
pub const MSG_INVALID: &str = "invalid value";
pub const MSG_FORMAT: &str = "invalid format";
pub const MSG_COUNTRY_CODE: &str = "must be a valid ISO-3166-1 country code";

/// A view of a decoded field value, so each check can be resolved by match
/// rather than by probing the value's type at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind<'a> {
    Text(&'a str),
    Flag(bool),
    Time(Option<&'a TimeStamp>),
    Date(Option<&'a Date>),
    Choice(Option<&'static str>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// Value must be present.
    NotEmpty,
    /// Value must be absent.
    Empty,
    /// An enum value must be chosen. Unknown values are already rejected when decoding.
    Valid,
    /// A calendar date must be present.
    Date,
    /// Two letter upper case country code.
    Country,
}

impl Validator {
    pub fn check(self, kind: FieldKind<'_>) -> Option<&'static str> {
        match (self, kind) {
            (Validator::NotEmpty, FieldKind::Text(s)) => s.is_empty().then_some(MSG_REQUIRED),
            (Validator::NotEmpty, FieldKind::Time(t)) => t.is_none().then_some(MSG_REQUIRED),
            (Validator::NotEmpty, FieldKind::Date(d)) => d.is_none().then_some(MSG_REQUIRED),
            (Validator::NotEmpty, FieldKind::Choice(c)) => c.is_none().then_some(MSG_REQUIRED),
            (Validator::NotEmpty, FieldKind::Flag(_)) => None,

            (Validator::Empty, FieldKind::Text(s)) => (!s.is_empty()).then_some(MSG_NOT_PROVIDED),
            (Validator::Empty, FieldKind::Time(t)) => t.is_some().then_some(MSG_NOT_PROVIDED),
            (Validator::Empty, FieldKind::Date(d)) => d.is_some().then_some(MSG_NOT_PROVIDED),
            (Validator::Empty, FieldKind::Choice(c)) => c.is_some().then_some(MSG_NOT_PROVIDED),
            (Validator::Empty, FieldKind::Flag(f)) => f.then_some(MSG_NOT_PROVIDED),

            (Validator::Valid, FieldKind::Choice(c)) => c.is_none().then_some(MSG_REQUIRED),
            (Validator::Date, FieldKind::Date(d)) => d.is_none().then_some(MSG_REQUIRED),
            (Validator::Country, FieldKind::Text(s)) => {
                (!is_country_code(s)).then_some(MSG_COUNTRY_CODE)
            }

            _ => Some(MSG_TYPE),
        }
    }
}

fn is_country_code(value: &str) -> bool {
    value.len() == 2 && value.bytes().all(|b| b.is_ascii_uppercase())
}
