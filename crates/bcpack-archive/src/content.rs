//! Extracted file content.

use std::borrow::Cow;

/// Decrypted contents of one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "data", rename_all = "lowercase"))]
pub enum Content {
    /// Binary image data (`.png`).
    Bytes(Vec<u8>),
    /// UTF-8 text. Invalid sequences are replaced, never rejected.
    Text(String),
}

impl Content {
    /// Decode bytes as text, replacing invalid UTF-8.
    pub(crate) fn text_lossy(data: &[u8]) -> Self {
        Content::Text(String::from_utf8_lossy(data).into_owned())
    }

    /// The text, if this is text content.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Bytes(_) => None,
        }
    }

    /// Whether this is binary content.
    pub fn is_binary(&self) -> bool {
        matches!(self, Content::Bytes(_))
    }

    /// Raw bytes of the content, whichever kind it is.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Content::Bytes(data) => data,
            Content::Text(text) => text.as_bytes(),
        }
    }

    /// Content as text for display; binary data is decoded lossily.
    pub fn to_text_lossy(&self) -> Cow<'_, str> {
        match self {
            Content::Text(text) => Cow::Borrowed(text),
            Content::Bytes(data) => String::from_utf8_lossy(data),
        }
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the content is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume into raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Content::Bytes(data) => data,
            Content::Text(text) => text.into_bytes(),
        }
    }
}
