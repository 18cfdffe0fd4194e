//! Error payloads returned by the backend.
//!
//! The backend answers failed requests with one of two JSON shapes:
//!
//! ```json
//! { "message": "Stok tidak mencukupi" }
//! { "message": "The given data was invalid.", "errors": { "email": ["..."] } }
//! ```
//!
//! [`ApiFailure`] discriminates them once, at the boundary, so callers match
//! on a variant instead of probing for fields.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// A decoded backend error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFailure {
    /// A single (optional) message.
    General {
        /// Server-provided message, if the body carried one.
        message: Option<String>,
    },
    /// Field-level validation errors.
    Validation {
        /// Summary message, if the body carried one.
        message: Option<String>,
        /// Field name to messages.
        fields: BTreeMap<String, Vec<String>>,
    },
}

#[derive(Deserialize)]
struct RawFailure {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<Value>,
}

/// Field messages from an `errors` object. A field may carry a list of
/// strings or a single string; anything else is skipped.
fn field_messages(errors: Value) -> BTreeMap<String, Vec<String>> {
    let Value::Object(map) = errors else {
        return BTreeMap::new();
    };
    map.into_iter()
        .filter_map(|(field, value)| {
            let messages: Vec<String> = match value {
                Value::String(message) => vec![message],
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(message) => Some(message),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };
            (!messages.is_empty()).then_some((field, messages))
        })
        .collect()
}

impl ApiFailure {
    /// Decode an error body. Empty or non-JSON bodies become a
    /// [`ApiFailure::General`] without a message.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Self {
        let Ok(raw) = serde_json::from_slice::<RawFailure>(body) else {
            return Self::General { message: None };
        };
        let message = raw.message.filter(|m| !m.trim().is_empty());
        let fields = raw.errors.map(field_messages).unwrap_or_default();
        if fields.is_empty() {
            Self::General { message }
        } else {
            Self::Validation { message, fields }
        }
    }

    /// The server's summary message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::General { message } | Self::Validation { message, .. } => message.as_deref(),
        }
    }

    /// Field messages joined into one line, in field-name order.
    ///
    /// Returns `None` for [`ApiFailure::General`].
    #[must_use]
    pub fn flattened(&self) -> Option<String> {
        match self {
            Self::General { .. } => None,
            Self::Validation { fields, .. } => Some(
                fields
                    .values()
                    .flatten()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }
}
