//! Field-keyed validation error bag.
//!
//! An [`ErrorBag`] holds the most recent validation errors reported by the
//! server, keyed by field name. A field is either absent (no known error) or
//! maps to at least one message; [`body::ErrorBody`] takes care of only
//! handing well-formed mappings to [`ErrorBag::set`].

pub mod body;

pub use body::ErrorBody;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name to ordered messages, as carried by a 422 response.
pub type ErrorMessages = BTreeMap<String, Vec<String>>;

/// Most recent server-reported validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorBag {
    errors: ErrorMessages,
}

impl ErrorBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole mapping.
    pub fn set(&mut self, errors: ErrorMessages) {
        self.errors = errors;
    }

    /// Whether the given field has an error.
    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// First message for the given field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// All messages for the given field, in server order.
    pub fn get_all(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// Remove a single field, or every field when `field` is `None`.
    ///
    /// The key itself is removed so anything watching key presence sees it go.
    pub fn clear_with(&mut self, field: Option<&str>) {
        match field {
            Some(field) => {
                self.errors.remove(field);
            }
            None => self.errors.clear(),
        }
    }

    pub fn clear_field(&mut self, field: &str) {
        self.clear_with(Some(field));
    }

    pub fn clear(&mut self) {
        self.clear_with(None);
    }

    /// Whether any field has an error.
    pub fn any(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Field names with errors, sorted.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    pub fn as_map(&self) -> &ErrorMessages {
        &self.errors
    }
}

impl From<ErrorMessages> for ErrorBag {
    fn from(errors: ErrorMessages) -> Self {
        Self { errors }
    }
}

impl<K, M> FromIterator<(K, Vec<M>)> for ErrorBag
where
    K: Into<String>,
    M: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Vec<M>)>>(iter: I) -> Self {
        let errors = iter
            .into_iter()
            .map(|(field, messages)| {
                (
                    field.into(),
                    messages.into_iter().map(Into::into).collect(),
                )
            })
            .collect();
        Self { errors }
    }
}
