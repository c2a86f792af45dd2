use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Text field that must be present and non-empty.
///
/// Construction is the only validation point: a `RequiredText` can never hold
/// an empty string, so the store layer never sees one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequiredText(String);

impl RequiredText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RequiredText {
    type Error = EmptyTextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Err(EmptyTextError)
        } else {
            Ok(Self(value))
        }
    }
}

impl TryFrom<&str> for RequiredText {
    type Error = EmptyTextError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_string())
    }
}

impl From<RequiredText> for String {
    fn from(text: RequiredText) -> Self {
        text.0
    }
}

impl fmt::Display for RequiredText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyTextError;

impl fmt::Display for EmptyTextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("required text field must not be empty")
    }
}

impl std::error::Error for EmptyTextError {}

/// Store-assigned book identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BookId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for BookId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Writable fields of a book; the body of create and replace requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct BookFields {
    /// Title of the book
    #[schema(value_type = String, min_length = 1)]
    pub title: RequiredText,
    /// Short description of the book
    #[schema(value_type = String, min_length = 1)]
    pub description: RequiredText,
    /// Caller-defined flag, e.g. "published"
    pub status: bool,
}

impl BookFields {
    pub fn new(
        title: impl TryInto<RequiredText, Error = EmptyTextError>,
        description: impl TryInto<RequiredText, Error = EmptyTextError>,
        status: bool,
    ) -> Result<Self, EmptyTextError> {
        Ok(Self {
            title: title.try_into()?,
            description: description.try_into()?,
            status,
        })
    }
}

/// A persisted book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    /// Unique identifier assigned by the store
    #[schema(value_type = String)]
    pub id: BookId,
    pub title: String,
    pub description: String,
    pub status: bool,
}

impl Book {
    pub fn new(id: BookId, fields: BookFields) -> Self {
        Self {
            id,
            title: fields.title.into(),
            description: fields.description.into(),
            status: fields.status,
        }
    }

    /// Writable part of this record.
    pub fn fields(&self) -> BookFields {
        BookFields {
            title: RequiredText(self.title.clone()),
            description: RequiredText(self.description.clone()),
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fields_deserialize_from_complete_body() {
        let fields: BookFields = serde_json::from_value(json!({
            "title": "Slaughterhouse Five",
            "description": "War novel",
            "status": true
        }))
        .unwrap();

        assert_eq!(fields.title.as_str(), "Slaughterhouse Five");
        assert!(fields.status);
    }

    #[test]
    fn missing_field_is_rejected() {
        let err = serde_json::from_value::<BookFields>(json!({
            "title": "Slaughterhouse Five",
            "description": "War novel"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("missing field `status`"));
    }

    #[test]
    fn empty_text_is_rejected() {
        let err = serde_json::from_value::<BookFields>(json!({
            "title": "",
            "description": "War novel",
            "status": true
        }))
        .unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(serde_json::from_value::<BookFields>(json!({
            "title": "Slaughterhouse Five",
            "description": "War novel",
            "status": "true"
        }))
        .is_err());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = serde_json::from_value::<BookFields>(json!({
            "title": "Slaughterhouse Five",
            "description": "War novel",
            "status": true,
            "author": "Kurt Vonnegut"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unknown field `author`"));
    }

    #[test]
    fn book_serializes_flat_with_id() {
        let fields = BookFields::new("Fiction title", "Fiction", false).unwrap();
        let book = Book::new(BookId::from("abc"), fields.clone());

        assert_eq!(
            serde_json::to_value(&book).unwrap(),
            json!({
                "id": "abc",
                "title": "Fiction title",
                "description": "Fiction",
                "status": false
            })
        );
        assert_eq!(book.fields(), fields);
    }
}
