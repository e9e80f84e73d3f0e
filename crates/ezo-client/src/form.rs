//! Outbound form payloads and field allow-listing.
//!
//! Every mutation renders a typed payload into [`FormFields`], then runs the
//! fields through the operation's [`FormSchema`] before anything is sent.
//! Only names the schema accepts reach the wire; the rest are dropped and
//! logged at `debug`.

use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::NaiveDate;

use crate::error::EzoError;

/// Date format the API expects for every date field.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

// ── Fields ─────────────────────────────────────────────────────────

/// Ordered `name=value` pairs for a form-encoded request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Display) {
        self.0.push((name.into(), value.to_string()));
    }

    /// Push `value` only when it is set.
    pub fn push_opt<V: Display>(&mut self, name: &str, value: Option<V>) {
        if let Some(value) = value {
            self.push(name, value);
        }
    }

    /// Render a custom-attribute side channel as `{namespace}[{key}]` pairs.
    pub fn push_custom(&mut self, namespace: &str, attributes: &BTreeMap<String, String>) {
        for (key, value) in attributes {
            self.push(format!("{namespace}[{key}]"), value);
        }
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ── Schema ─────────────────────────────────────────────────────────

/// One accepted field name shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// The name must match exactly.
    Exact(&'static str),
    /// Any name starting with this namespace, e.g. `cust_attr`.
    Prefix(&'static str),
    /// Bracketed array fields such as `linked_inventory_items[12][quantity]`.
    Pattern {
        prefix: &'static str,
        suffix: &'static str,
    },
}

impl FieldRule {
    fn matches(self, name: &str) -> bool {
        match self {
            Self::Exact(exact) => name == exact,
            Self::Prefix(prefix) => name.starts_with(prefix),
            Self::Pattern { prefix, suffix } => {
                name.len() > prefix.len() + suffix.len()
                    && name.starts_with(prefix)
                    && name.ends_with(suffix)
            }
        }
    }
}

/// The declared set of field names one operation accepts.
#[derive(Debug, Clone, Copy)]
pub struct FormSchema {
    pub operation: &'static str,
    pub rules: &'static [FieldRule],
}

impl FormSchema {
    pub fn accepts(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(name))
    }

    /// Keep only the fields this schema accepts.
    #[must_use]
    pub fn filter(&self, fields: FormFields) -> FormFields {
        let (kept, dropped): (Vec<_>, Vec<_>) = fields
            .0
            .into_iter()
            .partition(|(name, _)| self.accepts(name));
        if !dropped.is_empty() {
            let names: Vec<&str> = dropped.iter().map(|(n, _)| n.as_str()).collect();
            tracing::debug!(operation = self.operation, ?names, "dropping fields not in allow-list");
        }
        FormFields(kept)
    }
}

/// A typed request body for one mutation.
pub trait FormPayload {
    /// Allow-list applied to the rendered fields.
    const SCHEMA: FormSchema;

    /// Reject malformed input before any request is sent.
    ///
    /// # Errors
    ///
    /// Returns [`EzoError::Precondition`] naming the offending field.
    fn validate(&self) -> Result<(), EzoError> {
        Ok(())
    }

    /// Render the payload into form fields, using the API's field names.
    fn to_fields(&self) -> FormFields;

    /// Validate, render, and allow-list in one step.
    ///
    /// # Errors
    ///
    /// Returns [`EzoError::Precondition`] if [`FormPayload::validate`] fails.
    fn encode(&self) -> Result<FormFields, EzoError> {
        self.validate()?;
        Ok(Self::SCHEMA.filter(self.to_fields()))
    }
}

// ── Validation helpers ─────────────────────────────────────────────

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), EzoError> {
    if value.trim().is_empty() {
        return Err(EzoError::missing(field));
    }
    Ok(())
}

pub(crate) fn require_id(field: &str, value: u64) -> Result<(), EzoError> {
    if value == 0 {
        return Err(EzoError::missing(field));
    }
    Ok(())
}

/// Dates must be `mm/dd/yyyy`.
pub(crate) fn check_date(field: &str, value: &str) -> Result<(), EzoError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| EzoError::invalid(field, format!("'{value}' must be in the format mm/dd/yyyy")))
}

pub(crate) fn check_optional_date(field: &str, value: Option<&str>) -> Result<(), EzoError> {
    value.map_or(Ok(()), |v| check_date(field, v))
}

pub(crate) fn check_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), EzoError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(EzoError::invalid(
        field,
        format!("'{value}' must be one of {}", allowed.join(", ")),
    ))
}
