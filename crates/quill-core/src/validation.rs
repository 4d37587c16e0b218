//! Post payload validation.
//!
//! Request bodies arrive as untyped JSON objects. They are checked here and
//! turned into [`PostInput`] (every field required) or [`PostPatch`] (only
//! the fields that were sent) before anything touches the store.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum title length, in characters.
pub const TITLE_MAX_CHARS: usize = 255;

/// Field-level validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation for `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for a single field.
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// A fully validated post payload (create, replace).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInput {
    pub title: String,
    pub content: String,
}

/// A validated partial payload. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl From<PostInput> for PostPatch {
    fn from(input: PostInput) -> Self {
        Self {
            title: Some(input.title),
            content: Some(input.content),
        }
    }
}

/// Which rule set an update is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// PUT: every field is required.
    Replace,
    /// PATCH: only fields present in the payload are checked.
    Merge,
}

/// Validate a payload where `title` and `content` are both required.
pub fn validate_post(payload: &Value) -> Result<PostInput, ValidationErrors> {
    let fields = payload.as_object();
    let mut errors = ValidationErrors::new();

    let title = check_field(&mut errors, fields, "title", Some(TITLE_MAX_CHARS));
    let content = check_field(&mut errors, fields, "content", None);

    match (title, content) {
        (Some(title), Some(content)) => Ok(PostInput { title, content }),
        _ => Err(errors),
    }
}

/// Validate a payload where only the fields that are present are checked.
pub fn validate_post_patch(payload: &Value) -> Result<PostPatch, ValidationErrors> {
    let fields = payload.as_object();
    let present = |name: &str| fields.is_some_and(|map| map.contains_key(name));
    let mut errors = ValidationErrors::new();

    let title = if present("title") {
        check_field(&mut errors, fields, "title", Some(TITLE_MAX_CHARS))
    } else {
        None
    };
    let content = if present("content") {
        check_field(&mut errors, fields, "content", None)
    } else {
        None
    };

    errors.into_result()?;
    Ok(PostPatch { title, content })
}

/// Validate an update payload under the given mode.
pub fn validate_update(payload: &Value, mode: UpdateMode) -> Result<PostPatch, ValidationErrors> {
    match mode {
        UpdateMode::Replace => validate_post(payload).map(PostPatch::from),
        UpdateMode::Merge => validate_post_patch(payload),
    }
}

/// Checks one field: required, string, optional max length. Stops at the
/// first failing rule.
fn check_field(
    errors: &mut ValidationErrors,
    fields: Option<&Map<String, Value>>,
    name: &str,
    max_chars: Option<usize>,
) -> Option<String> {
    let value = match fields.and_then(|map| map.get(name)) {
        None | Some(Value::Null) => {
            errors.add(name, format!("The {name} field is required."));
            return None;
        }
        Some(value) => value,
    };

    let Some(text) = value.as_str() else {
        errors.add(name, format!("The {name} field must be a string."));
        return None;
    };

    if text.is_empty() {
        errors.add(name, format!("The {name} field is required."));
        return None;
    }

    if let Some(max) = max_chars {
        if text.chars().count() > max {
            errors.add(
                name,
                format!("The {name} field must not be greater than {max} characters."),
            );
            return None;
        }
    }

    Some(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_payload_is_accepted_as_is() {
        let input = validate_post(&json!({"title": "  Hello ", "content": "World"})).unwrap();
        assert_eq!(input.title, "  Hello ");
        assert_eq!(input.content, "World");
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let errors = validate_post(&json!({})).unwrap_err();
        assert_eq!(
            errors.field("title").unwrap(),
            ["The title field is required."]
        );
        assert_eq!(
            errors.field("content").unwrap(),
            ["The content field is required."]
        );
    }

    #[test]
    fn test_non_object_body_counts_as_empty() {
        let errors = validate_post(&json!(["title", "content"])).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["content", "title"]);
    }

    #[test]
    fn test_null_and_empty_count_as_missing() {
        let errors = validate_post(&json!({"title": null, "content": ""})).unwrap_err();
        assert_eq!(
            errors.field("title").unwrap(),
            ["The title field is required."]
        );
        assert_eq!(
            errors.field("content").unwrap(),
            ["The content field is required."]
        );
    }

    #[test]
    fn test_non_string_values_are_rejected() {
        let errors = validate_post(&json!({"title": 42, "content": {"a": 1}})).unwrap_err();
        assert_eq!(
            errors.field("title").unwrap(),
            ["The title field must be a string."]
        );
        assert_eq!(
            errors.field("content").unwrap(),
            ["The content field must be a string."]
        );
    }

    #[test]
    fn test_title_length_counts_characters() {
        let at_limit = "é".repeat(TITLE_MAX_CHARS);
        assert!(validate_post(&json!({"title": at_limit, "content": "x"})).is_ok());

        let too_long = "a".repeat(TITLE_MAX_CHARS + 1);
        let errors = validate_post(&json!({"title": too_long, "content": "x"})).unwrap_err();
        assert_eq!(
            errors.field("title").unwrap(),
            ["The title field must not be greater than 255 characters."]
        );
        assert!(errors.field("content").is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let input = validate_post(&json!({
            "title": "t",
            "content": "c",
            "user_id": "00000000-0000-0000-0000-000000000000"
        }))
        .unwrap();
        assert_eq!(input.title, "t");
    }

    #[test]
    fn test_patch_only_checks_present_fields() {
        let patch = validate_post_patch(&json!({"title": "New"})).unwrap();
        assert_eq!(patch.title.as_deref(), Some("New"));
        assert_eq!(patch.content, None);

        let empty = validate_post_patch(&json!({})).unwrap();
        assert_eq!(empty, PostPatch::default());
    }

    #[test]
    fn test_patch_rejects_invalid_present_fields() {
        let errors = validate_post_patch(&json!({"content": "", "title": 7})).unwrap_err();
        assert_eq!(
            errors.field("content").unwrap(),
            ["The content field is required."]
        );
        assert_eq!(
            errors.field("title").unwrap(),
            ["The title field must be a string."]
        );
    }

    #[test]
    fn test_replace_mode_requires_every_field() {
        let errors = validate_update(&json!({"title": "New"}), UpdateMode::Replace).unwrap_err();
        assert!(errors.field("content").is_some());

        let patch = validate_update(&json!({"title": "New"}), UpdateMode::Merge).unwrap();
        assert_eq!(patch.title.as_deref(), Some("New"));
    }

    #[test]
    fn test_errors_serialize_as_plain_map() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "The title field is required.");
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value, json!({"title": ["The title field is required."]}));
    }
}
