//! Shaping options for the XML to value conversion.

use std::borrow::Cow;

/// Options controlling how an XML document is shaped into an [`XmlValue`].
///
/// The record is established once and passed unchanged to the converter; no
/// validation is performed on it here.
///
/// [`XmlValue`]: crate::XmlValue
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Trim whitespace around text node content.
    pub normalize: bool,
    /// Lower-case element names before grouping siblings.
    pub normalize_tags: bool,
    /// Wrap every child element in a sequence, even a single one.
    ///
    /// When disabled, a child name with exactly one occurrence maps directly
    /// to its value instead of a one-element sequence.
    pub explicit_array: bool,
    /// Map key under which element attributes are collected.
    pub attr_key: Cow<'static, str>,
    /// Map key under which mixed text content is stored when the element
    /// also has attributes or children.
    pub char_key: Cow<'static, str>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self {
            normalize: false,
            normalize_tags: false,
            explicit_array: true,
            attr_key: Cow::Borrowed("$"),
            char_key: Cow::Borrowed("_"),
        }
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn normalize_tags(mut self, normalize_tags: bool) -> Self {
        self.normalize_tags = normalize_tags;
        self
    }

    pub fn explicit_array(mut self, explicit_array: bool) -> Self {
        self.explicit_array = explicit_array;
        self
    }

    pub fn attr_key(mut self, attr_key: impl Into<Cow<'static, str>>) -> Self {
        self.attr_key = attr_key.into();
        self
    }

    pub fn char_key(mut self, char_key: impl Into<Cow<'static, str>>) -> Self {
        self.char_key = char_key.into();
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}
