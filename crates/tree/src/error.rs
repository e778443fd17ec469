use thiserror::Error;

/// Errors produced while converting XML text into a structured value.
///
/// Offsets are byte positions into the input text, taken from the underlying
/// reader where available.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("syntax error at byte {offset}: {reason}")]
    Syntax { offset: usize, reason: String },

    #[error("invalid entity or character reference at byte {offset}: {reason}")]
    InvalidEntity { offset: usize, reason: String },

    #[error("invalid attribute at byte {offset}: {reason}")]
    InvalidAttribute { offset: usize, reason: String },

    #[error("element <{name}> is never closed")]
    UnclosedElement { name: String },

    #[error("document is empty")]
    EmptyDocument,

    #[error("content found after the document root at byte {offset}")]
    TrailingContent { offset: usize },

    #[error("value cannot be written as an xml document: {reason}")]
    Unwritable { reason: String },
}

impl XmlError {
    pub fn syntax<S: ToString>(offset: usize, reason: S) -> Self {
        Self::Syntax { offset, reason: reason.to_string() }
    }

    pub fn invalid_entity<S: ToString>(offset: usize, reason: S) -> Self {
        Self::InvalidEntity { offset, reason: reason.to_string() }
    }

    pub fn invalid_attribute<S: ToString>(offset: usize, reason: S) -> Self {
        Self::InvalidAttribute { offset, reason: reason.to_string() }
    }

    pub fn unclosed_element<S: ToString>(name: S) -> Self {
        Self::UnclosedElement { name: name.to_string() }
    }

    pub fn unwritable<S: ToString>(reason: S) -> Self {
        Self::Unwritable { reason: reason.to_string() }
    }
}
