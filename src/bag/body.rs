//! Shape of a 422 response body.

use super::ErrorMessages;
use serde_json::Value;

/// The two accepted 422 body layouts.
///
/// Newer servers wrap the mapping (`{"errors": {...}}`), older ones send it
/// bare (`{"email": ["..."]}`). A body with an `errors` key is always read as
/// the wrapped form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    Wrapped(ErrorMessages),
    Bare(ErrorMessages),
}

impl ErrorBody {
    /// Parse a response body, returning `None` for any other shape.
    pub fn parse(data: &Value) -> Option<Self> {
        let object = data.as_object()?;
        match object.get("errors") {
            Some(inner) => messages_from(inner).map(ErrorBody::Wrapped),
            None => messages_from(data).map(ErrorBody::Bare),
        }
    }

    pub fn into_messages(self) -> ErrorMessages {
        match self {
            ErrorBody::Wrapped(messages) | ErrorBody::Bare(messages) => messages,
        }
    }
}

fn messages_from(value: &Value) -> Option<ErrorMessages> {
    let object = value.as_object()?;
    let mut messages = ErrorMessages::new();
    for (field, list) in object {
        let list = list
            .as_array()?
            .iter()
            .map(|m| m.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()?;
        // empty lists carry no error; keep the non-empty invariant
        if !list.is_empty() {
            messages.insert(field.clone(), list);
        }
    }
    Some(messages)
}
