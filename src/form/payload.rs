//! Submission data and request payloads.

use bytes::Bytes;
use serde_json::{Map, Number, Value};

/// A binary attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub bytes: Bytes,
    pub file_name: Option<String>,
    pub mime: Option<String>,
}

impl FileUpload {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: None,
            mime: None,
        }
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A single field value.
///
/// Nested values are plain JSON, so a file can only sit at the top level.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// Absent, undefined or null.
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Json(Value),
    File(FileUpload),
}

impl FormValue {
    pub fn is_file(&self) -> bool {
        matches!(self, FormValue::File(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FormValue::Null)
    }

    /// Text used when the value becomes part of a URL.
    pub fn to_path_segment(&self) -> String {
        match self {
            FormValue::Null => "null".to_string(),
            FormValue::Bool(b) => b.to_string(),
            FormValue::Number(n) => n.to_string(),
            FormValue::Text(s) => s.clone(),
            FormValue::Json(v) => v.to_string(),
            FormValue::File(f) => f.file_name.clone().unwrap_or_default(),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            FormValue::Null => Value::Null,
            FormValue::Bool(b) => Value::Bool(*b),
            FormValue::Number(n) => Value::Number(n.clone()),
            FormValue::Text(s) => Value::String(s.clone()),
            FormValue::Json(v) => v.clone(),
            FormValue::File(f) => f
                .file_name
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
        }
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        FormValue::Text(s.to_string())
    }
}

impl From<String> for FormValue {
    fn from(s: String) -> Self {
        FormValue::Text(s)
    }
}

impl From<bool> for FormValue {
    fn from(b: bool) -> Self {
        FormValue::Bool(b)
    }
}

impl From<i64> for FormValue {
    fn from(n: i64) -> Self {
        FormValue::Number(n.into())
    }
}

impl From<i32> for FormValue {
    fn from(n: i32) -> Self {
        FormValue::Number(n.into())
    }
}

impl From<u64> for FormValue {
    fn from(n: u64) -> Self {
        FormValue::Number(n.into())
    }
}

/// NaN and infinities have no JSON form and become [`FormValue::Null`], which
/// a multipart body sends as an empty string.
impl From<f64> for FormValue {
    fn from(n: f64) -> Self {
        Number::from_f64(n)
            .map(FormValue::Number)
            .unwrap_or(FormValue::Null)
    }
}

impl From<FileUpload> for FormValue {
    fn from(f: FileUpload) -> Self {
        FormValue::File(f)
    }
}

impl<T: Into<FormValue>> From<Option<T>> for FormValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FormValue::Null)
    }
}

impl From<Value> for FormValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => FormValue::Null,
            Value::Bool(b) => FormValue::Bool(b),
            Value::Number(n) => FormValue::Number(n),
            Value::String(s) => FormValue::Text(s),
            other => FormValue::Json(other),
        }
    }
}

/// Insertion-ordered submission data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    fields: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an existing value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FormValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn file(self, name: impl Into<String>, file: FileUpload) -> Self {
        self.field(name, FormValue::File(file))
    }

    /// Build from any value that serializes to a JSON object.
    pub fn from_serialize<T: serde::Serialize>(value: &T) -> crate::Result<Self> {
        Self::try_from(serde_json::to_value(value)?)
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<FormValue> {
        let idx = self.fields.iter().position(|(k, _)| k == name)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether any top-level value is a file. Nested values are not inspected.
    pub fn has_files(&self) -> bool {
        self.fields.iter().any(|(_, v)| v.is_file())
    }

    /// JSON object view of the data.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Value::Object(map)
    }
}

impl<K: Into<String>, V: Into<FormValue>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = FormData::new();
        for (k, v) in iter {
            data.insert(k, v);
        }
        data
    }
}

impl From<Map<String, Value>> for FormData {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl TryFrom<Value> for FormData {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Object(map) => Ok(map.into()),
            other => Err(crate::Error::validation_with_context(
                "submission data must be a JSON object",
                crate::ErrorContext::new().with_details(format!("got {}", json_kind(&other))),
            )),
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A multipart field.
#[derive(Debug, Clone, PartialEq)]
pub enum MultipartValue {
    Text(String),
    File(FileUpload),
}

/// Request body built from [`FormData`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Multipart(Vec<(String, MultipartValue)>),
}

impl Payload {
    /// Multipart when the data carries a file, otherwise the data unchanged.
    pub fn from_form_data(data: FormData) -> Self {
        if !data.has_files() {
            return Payload::Json(data.to_json());
        }
        Payload::Multipart(
            data.fields
                .into_iter()
                .map(|(name, value)| (name, sanitize(value)))
                .collect(),
        )
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, Payload::Multipart(_))
    }

    /// Multipart field by name.
    pub fn part(&self, name: &str) -> Option<&MultipartValue> {
        match self {
            Payload::Multipart(parts) => parts.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            Payload::Json(_) => None,
        }
    }
}

/// Prepare a value for multipart encoding; nulls become empty strings.
pub fn sanitize(value: FormValue) -> MultipartValue {
    match value {
        FormValue::Null => MultipartValue::Text(String::new()),
        FormValue::Bool(b) => MultipartValue::Text(b.to_string()),
        FormValue::Number(n) => MultipartValue::Text(n.to_string()),
        FormValue::Text(s) => MultipartValue::Text(s),
        FormValue::Json(v) => MultipartValue::Text(v.to_string()),
        FormValue::File(f) => MultipartValue::File(f),
    }
}
