//! Combinators for consuming a list of [`Change`]s into typed targets.
//!
//! A [`Parser`] holds the changes not yet accounted for. Each combinator
//! removes the changes it recognises, checks the claimed `old` value against
//! the target's current value, decodes `new` into the target and records any
//! problem as a [`FieldError`] pointing back at the change's position in the
//! request. [`Parser::consumed`] turns whatever is left into errors, so the
//! fields an operation reads form a closed whitelist.
use serde_json::Value;
use std::collections::BTreeMap;

use super::change::{Change, FieldError};
use super::lpa::{
    AttorneyStatus, CanUse, Channel, HowMakeDecisions, HowStepIn, IdentityCheckType, Lang,
    LifeSustainingTreatment, LpaStatus, StringEnum,
};
use super::types::{Date, TimeStamp};
use super::validate::{FieldKind, MSG_FORMAT, MSG_INVALID, MSG_REQUIRED, MSG_TYPE, Validator};

/// A field type the parser can decode into and compare against.
///
/// `matches` implements the null mapping used for old-value checks: an
/// empty string, an absent time or date and an unchosen enum all match a
/// JSON `null`.
pub trait FieldValue: Sized {
    fn decode(value: &Value) -> Result<Self, &'static str>;
    fn matches(&self, old: &Value) -> bool;
    fn kind(&self) -> FieldKind<'_>;
}

impl FieldValue for String {
    fn decode(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Null => Ok(String::new()),
            _ => Err(MSG_TYPE),
        }
    }
    fn matches(&self, old: &Value) -> bool {
        match old {
            Value::Null => self.is_empty(),
            Value::String(s) => s == self,
            _ => false,
        }
    }
    fn kind(&self) -> FieldKind<'_> {
        FieldKind::Text(self)
    }
}

impl FieldValue for bool {
    fn decode(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Null => Ok(false),
            _ => Err(MSG_TYPE),
        }
    }
    fn matches(&self, old: &Value) -> bool {
        match old {
            Value::Null => !*self,
            Value::Bool(b) => b == self,
            _ => false,
        }
    }
    fn kind(&self) -> FieldKind<'_> {
        FieldKind::Flag(*self)
    }
}

impl FieldValue for Option<TimeStamp> {
    fn decode(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::String(s) => TimeStamp::parse(s).map(Some).ok_or(MSG_TYPE),
            _ => Err(MSG_TYPE),
        }
    }
    fn matches(&self, old: &Value) -> bool {
        Self::decode(old).is_ok_and(|old| old == *self)
    }
    fn kind(&self) -> FieldKind<'_> {
        FieldKind::Time(self.as_ref())
    }
}

impl FieldValue for Option<Date> {
    fn decode(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::String(s) => Date::parse(s).map(Some).ok_or(MSG_FORMAT),
            _ => Err(MSG_TYPE),
        }
    }
    fn matches(&self, old: &Value) -> bool {
        Self::decode(old).is_ok_and(|old| old == *self)
    }
    fn kind(&self) -> FieldKind<'_> {
        FieldKind::Date(self.as_ref())
    }
}

fn decode_choice<E: StringEnum>(value: &Value) -> Result<Option<E>, &'static str> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => E::from_wire(s).map(Some).ok_or(MSG_INVALID),
        _ => Err(MSG_TYPE),
    }
}

fn matches_choice<E: StringEnum>(current: Option<E>, old: &Value) -> bool {
    match old {
        Value::Null => current.is_none(),
        Value::String(s) if s.is_empty() => current.is_none(),
        Value::String(s) => current.is_some_and(|c| c.as_str() == s),
        _ => false,
    }
}

macro_rules! choice_fields {
    ($($ty:ty),+ $(,)?) => {$(
        impl FieldValue for Option<$ty> {
            fn decode(value: &Value) -> Result<Self, &'static str> {
                decode_choice(value)
            }
            fn matches(&self, old: &Value) -> bool {
                matches_choice(*self, old)
            }
            fn kind(&self) -> FieldKind<'_> {
                FieldKind::Choice(self.map(|v| v.as_str()))
            }
        }

        impl FieldValue for $ty {
            fn decode(value: &Value) -> Result<Self, &'static str> {
                decode_choice(value)?.ok_or(MSG_REQUIRED)
            }
            fn matches(&self, old: &Value) -> bool {
                matches_choice(Some(*self), old)
            }
            fn kind(&self) -> FieldKind<'_> {
                FieldKind::Choice(Some(self.as_str()))
            }
        }
    )+};
}

choice_fields!(
    LpaStatus,
    AttorneyStatus,
    Channel,
    Lang,
    HowMakeDecisions,
    HowStepIn,
    CanUse,
    LifeSustainingTreatment,
    IdentityCheckType,
);

#[derive(Debug, Clone, Copy, Default)]
pub struct Opts {
    optional: bool,
    validator: Option<Validator>,
}

/// The key must be present.
pub fn required() -> Opts {
    Opts::default()
}

/// The key may be absent.
pub fn optional() -> Opts {
    Opts {
        optional: true,
        validator: None,
    }
}

impl Opts {
    /// Runs `validator` on the decoded value. Ignored by [`Parser::prefix`].
    pub fn validate(self, validator: Validator) -> Opts {
        Opts {
            validator: Some(validator),
            ..self
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    old: Value,
    new: Value,
    pos: usize,
}

impl Entry {
    fn source(&self, after: &str) -> String {
        format!("/changes/{}{}", self.pos, after)
    }
}

#[derive(Debug, Default)]
pub struct Parser {
    root: String,
    changes: Vec<Entry>,
    errors: Vec<FieldError>,
}

impl Parser {
    pub fn new(changes: &[Change]) -> Self {
        let changes = changes
            .iter()
            .enumerate()
            .map(|(pos, c)| Entry {
                key: c.key.clone(),
                old: c.old.clone(),
                new: c.new.clone(),
                pos,
            })
            .collect();

        Self {
            root: String::new(),
            changes,
            errors: Vec::new(),
        }
    }

    fn child(&self, root: String, changes: Vec<Entry>) -> Parser {
        Parser {
            root,
            changes,
            errors: Vec::new(),
        }
    }

    fn missing(&mut self, what: &str) {
        let detail = format!("missing {}{}", self.root, what);
        self.errors.push(FieldError::new("/changes", detail));
    }

    /// Consumes the change for `key`, checks its `old` value against
    /// `target` and decodes its `new` value into `target`.
    ///
    /// ```
    /// use lpa_store::change::Change;
    /// use lpa_store::parse::{Parser, required};
    /// use serde_json::json;
    ///
    /// let changes = [Change::new("/thing", json!(null), json!("a string"))];
    /// let mut thing = String::new();
    /// let errors = Parser::new(&changes)
    ///     .field("/thing", &mut thing, required())
    ///     .consumed();
    ///
    /// assert!(errors.is_empty());
    /// assert_eq!(thing, "a string");
    /// ```
    pub fn field<T: FieldValue>(&mut self, key: &str, target: &mut T, opts: Opts) -> &mut Self {
        let Some(index) = self.changes.iter().position(|c| c.key == key) else {
            if !opts.optional {
                self.missing(key);
            }
            return self;
        };

        let change = self.changes.remove(index);

        if !target.matches(&change.old) {
            self.errors.push(FieldError::new(
                change.source("/old"),
                "does not match existing value",
            ));
            return self;
        }

        match T::decode(&change.new) {
            Ok(value) => {
                if let Some(detail) = opts.validator.and_then(|v| v.check(value.kind())) {
                    self.errors
                        .push(FieldError::new(change.source("/new"), detail));
                }
                *target = value;
            }
            Err(detail) => {
                self.errors
                    .push(FieldError::new(change.source("/new"), detail));
            }
        }

        self
    }

    /// Runs `f` with a parser over the changes below `prefix`, with the
    /// prefix stripped from their keys.
    pub fn prefix(&mut self, prefix: &str, opts: Opts, f: impl FnOnce(&mut Parser)) -> &mut Self {
        let wanted = format!("{prefix}/");
        let (matching, remaining): (Vec<Entry>, Vec<Entry>) = std::mem::take(&mut self.changes)
            .into_iter()
            .partition(|c| c.key.starts_with(&wanted));
        self.changes = remaining;

        if matching.is_empty() {
            if !opts.optional {
                self.missing(&format!("{prefix}/..."));
            }
            return self;
        }

        let matching = matching
            .into_iter()
            .map(|c| {
                let key = c.key[prefix.len()..].to_string();
                Entry { key, ..c }
            })
            .collect();

        let mut sub = self.child(format!("{}{}", self.root, prefix), matching);
        f(&mut sub);
        self.errors.append(&mut sub.errors);

        self
    }

    /// Groups every remaining change by a leading numeric segment
    /// (`/<n>/rest`) and runs `f` once per index, in ascending order. Indexes
    /// in `required` are visited even when no change names them.
    pub fn each(&mut self, required: &[usize], mut f: impl FnMut(usize, &mut Parser)) -> &mut Self {
        let mut groups: BTreeMap<usize, Vec<Entry>> =
            required.iter().map(|&i| (i, Vec::new())).collect();

        for change in std::mem::take(&mut self.changes) {
            let parsed = split_leading(&change.key)
                .and_then(|(segment, rest)| Some((segment.parse::<usize>().ok()?, rest.to_string())));

            match parsed {
                Some((index, key)) => groups.entry(index).or_default().push(Entry { key, ..change }),
                None => self
                    .errors
                    .push(FieldError::new(change.source("/key"), "require index")),
            }
        }

        for (index, changes) in groups {
            let mut sub = self.child(format!("{}/{}", self.root, index), changes);
            f(index, &mut sub);
            self.errors.append(&mut sub.errors);
        }

        self
    }

    /// As [`Parser::each`], but the leading segment is an opaque key such as
    /// a UID. `f` must call [`Parser::out_of_range`] when the key does not
    /// resolve.
    pub fn each_key(&mut self, mut f: impl FnMut(&str, &mut Parser)) -> &mut Self {
        let mut groups: BTreeMap<String, Vec<Entry>> = BTreeMap::new();

        for change in std::mem::take(&mut self.changes) {
            let parsed = split_leading(&change.key)
                .filter(|(segment, _)| !segment.is_empty())
                .map(|(segment, rest)| (segment.to_string(), rest.to_string()));

            match parsed {
                Some((group, key)) => groups.entry(group).or_default().push(Entry { key, ..change }),
                None => self
                    .errors
                    .push(FieldError::new(change.source("/key"), "require index")),
            }
        }

        for (group, changes) in groups {
            let mut sub = self.child(format!("{}/{}", self.root, group), changes);
            f(&group, &mut sub);
            self.errors.append(&mut sub.errors);
        }

        self
    }

    /// Rejects every remaining change as naming an unknown index.
    pub fn out_of_range(&mut self) -> &mut Self {
        for change in std::mem::take(&mut self.changes) {
            self.errors
                .push(FieldError::new(change.source("/key"), "index out of range"));
        }
        self
    }

    /// Rejects every remaining change and returns all errors found so far.
    pub fn consumed(&mut self) -> Vec<FieldError> {
        for change in std::mem::take(&mut self.changes) {
            self.errors
                .push(FieldError::new(change.source(""), "unexpected change provided"));
        }
        self.errors.clone()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }
}

/// Splits `/segment/rest` into `segment` and `/rest`.
fn split_leading(key: &str) -> Option<(&str, &str)> {
    let rest = key.strip_prefix('/')?;
    let (segment, _) = rest.split_once('/')?;
    Some((segment, &rest[segment.len()..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn change(key: &str, old: Value, new: Value) -> Change {
        Change::new(key, old, new)
    }

    #[test]
    fn field_decodes_new_value() {
        let changes = [change("/thing", json!(null), json!("val"))];

        let mut v = String::new();
        let errors = Parser::new(&changes).field("/thing", &mut v, required()).consumed();

        assert!(errors.is_empty());
        assert_eq!(v, "val");
    }

    #[test]
    fn field_when_missing() {
        let mut v = String::new();
        let mut parser = Parser::new(&[]);
        parser.field("/thing", &mut v, required());

        assert_eq!(parser.errors(), [FieldError::new("/changes", "missing /thing")]);
    }

    #[test]
    fn field_optional_when_missing() {
        let mut v = String::new();
        let errors = Parser::new(&[]).field("/thing", &mut v, optional()).consumed();

        assert!(errors.is_empty());
    }

    #[test]
    fn field_when_wrong_type() {
        let changes = [change("/thing", json!(null), json!(5))];

        let mut v = String::new();
        let errors = Parser::new(&changes).field("/thing", &mut v, required()).consumed();

        assert_eq!(errors, [FieldError::new("/changes/0/new", "unexpected type")]);
    }

    #[test]
    fn field_old_must_match_current_value() {
        let changes = [change("/thing", json!("not-hey"), json!("val"))];

        let mut v = "hey".to_string();
        let errors = Parser::new(&changes).field("/thing", &mut v, required()).consumed();

        assert_eq!(errors, [FieldError::new("/changes/0/old", "does not match existing value")]);
        assert_eq!(v, "hey");
    }

    #[test]
    fn field_old_empty_string_matches_null() {
        let changes = [change("/thing", json!(""), json!("val"))];

        let mut v = String::new();
        let errors = Parser::new(&changes).field("/thing", &mut v, required()).consumed();

        assert!(errors.is_empty());
        assert_eq!(v, "val");
    }

    #[test]
    fn field_old_time_compares_instants() {
        let changes = [change(
            "/at",
            json!("2024-01-02T11:00:00+01:00"),
            json!("2024-01-03T10:00:00Z"),
        )];

        let mut at = TimeStamp::parse("2024-01-02T10:00:00Z");
        let errors = Parser::new(&changes).field("/at", &mut at, required()).consumed();

        assert!(errors.is_empty());
        assert_eq!(at, TimeStamp::parse("2024-01-03T10:00:00Z"));
    }

    #[test]
    fn field_enum_unset_matches_null() {
        let changes = [change("/how", json!(null), json!("jointly"))];

        let mut how: Option<HowMakeDecisions> = None;
        let errors = Parser::new(&changes).field("/how", &mut how, required()).consumed();

        assert!(errors.is_empty());
        assert_eq!(how, Some(HowMakeDecisions::Jointly));
    }

    #[test]
    fn field_enum_unknown_value_is_invalid() {
        let changes = [change("/status", json!("active"), json!("dancing"))];

        let mut status = AttorneyStatus::Active;
        let errors = Parser::new(&changes).field("/status", &mut status, required()).consumed();

        assert_eq!(errors, [FieldError::new("/changes/0/new", "invalid value")]);
        assert_eq!(status, AttorneyStatus::Active);
    }

    #[test]
    fn field_validate_reports_on_new() {
        let changes = [change("/thing", json!(null), json!(""))];

        let mut v = String::new();
        let errors = Parser::new(&changes)
            .field("/thing", &mut v, required().validate(Validator::NotEmpty))
            .consumed();

        assert_eq!(errors, [FieldError::new("/changes/0/new", "field is required")]);
    }

    #[test]
    fn malformed_date_is_invalid_format() {
        let changes = [change("/dob", json!(null), json!("1st May"))];

        let mut dob: Option<Date> = None;
        let errors = Parser::new(&changes).field("/dob", &mut dob, required()).consumed();

        assert_eq!(errors, [FieldError::new("/changes/0/new", "invalid format")]);
    }

    #[test]
    fn consumed_reports_leftovers_by_position() {
        let changes = [
            change("/a", json!(null), json!("x")),
            change("/b", json!(null), json!("y")),
        ];

        let mut a = String::new();
        let errors = Parser::new(&changes).field("/a", &mut a, required()).consumed();

        assert_eq!(errors, [FieldError::new("/changes/1", "unexpected change provided")]);
    }

    #[test]
    fn prefix_strips_and_roots_missing_errors() {
        let changes = [change("/thing/name", json!(null), json!("n"))];

        let mut name = String::new();
        let mut size = String::new();
        let errors = Parser::new(&changes)
            .prefix("/thing", required(), |p| {
                p.field("/name", &mut name, required())
                    .field("/size", &mut size, required())
                    .consumed();
            })
            .consumed();

        assert_eq!(name, "n");
        assert_eq!(errors, [FieldError::new("/changes", "missing /thing/size")]);
    }

    #[test]
    fn prefix_missing() {
        let errors = Parser::new(&[]).prefix("/thing", required(), |_| {}).consumed();

        assert_eq!(errors, [FieldError::new("/changes", "missing /thing/...")]);
    }

    #[test]
    fn each_groups_by_index_and_visits_required() {
        let changes = [
            change("/1/name", json!(null), json!("b")),
            change("/0/name", json!(null), json!("a")),
        ];

        let mut names = vec![String::new(); 3];
        let errors = Parser::new(&changes)
            .each(&[2], |i, p| {
                p.field("/name", &mut names[i], required()).consumed();
            })
            .consumed();

        assert_eq!(names, ["a", "b", ""]);
        assert_eq!(errors, [FieldError::new("/changes", "missing /2/name")]);
    }

    #[test]
    fn each_requires_numeric_segment() {
        let changes = [change("/x/name", json!(null), json!("b"))];

        let mut called = false;
        let errors = Parser::new(&changes).each(&[], |_, _| called = true).consumed();

        assert!(!called);
        assert_eq!(errors, [FieldError::new("/changes/0/key", "require index")]);
    }

    #[test]
    fn each_key_out_of_range() {
        let changes = [
            change("/abc/name", json!(null), json!("a")),
            change("/abc/email", json!(null), json!("b")),
        ];

        let errors = Parser::new(&changes)
            .each_key(|key, p| {
                assert_eq!(key, "abc");
                p.out_of_range();
            })
            .consumed();

        assert_eq!(
            errors,
            [
                FieldError::new("/changes/0/key", "index out of range"),
                FieldError::new("/changes/1/key", "index out of range"),
            ]
        );
    }
}
