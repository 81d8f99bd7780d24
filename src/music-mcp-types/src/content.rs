//! Tool result content.

use serde::{Deserialize, Serialize};

/// A content item in a tool result. Every tool in this server answers with
/// a single text item holding a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Content {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },
}

impl Content {
    /// Create text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Borrow the text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_content_is_tagged() {
        let value = serde_json::to_value(Content::text("hi")).unwrap();
        assert_eq!(value, serde_json::json!({"type": "text", "text": "hi"}));
    }
}
