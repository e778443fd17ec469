//! Interceptor configuration, established once at construction and read-only
//! afterwards.

use crate::matcher::{ContentTypeMatcher, MatchPredicate};
use std::fmt;
use std::sync::Arc;
use xml_tree::ParseOptions;

/// Upper bound on a buffered request body when none is configured.
///
/// Stands in for the host framework's own body size default; hosts with a
/// different policy should set [`XmlBodyConfigBuilder::max_body_size`].
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Immutable settings for the body interceptor.
///
/// Construct through [`XmlBodyConfig::builder`]; every field has a
/// documented default, so `XmlBodyConfig::default()` is a fully working
/// configuration matching the stock XML media types.
pub struct XmlBodyConfig {
    pub(crate) matcher: ContentTypeMatcher,
    pub(crate) xml: ParseOptions,
    pub(crate) max_body_size: usize,
    pub(crate) tolerate_empty: bool,
}

impl XmlBodyConfig {
    pub fn builder() -> XmlBodyConfigBuilder {
        XmlBodyConfigBuilder::new()
    }

    pub fn matcher(&self) -> &ContentTypeMatcher {
        &self.matcher
    }

    pub fn xml(&self) -> &ParseOptions {
        &self.xml
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    pub fn tolerate_empty(&self) -> bool {
        self.tolerate_empty
    }
}

impl Default for XmlBodyConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for XmlBodyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlBodyConfig")
            .field("matcher", &self.matcher)
            .field("xml", &self.xml)
            .field("max_body_size", &self.max_body_size)
            .field("tolerate_empty", &self.tolerate_empty)
            .finish()
    }
}

/// Builder for [`XmlBodyConfig`].
pub struct XmlBodyConfigBuilder {
    types: Vec<String>,
    custom: Option<MatchPredicate>,
    xml: ParseOptions,
    max_body_size: usize,
    tolerate_empty: bool,
}

impl XmlBodyConfigBuilder {
    fn new() -> Self {
        Self {
            types: Vec::new(),
            custom: None,
            xml: ParseOptions::new(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            tolerate_empty: false,
        }
    }

    /// Adds one content type to treat as XML.
    ///
    /// Supplying any type replaces the default set. A single string and a
    /// sequence of strings (via [`content_types`]) are matched identically.
    ///
    /// [`content_types`]: Self::content_types
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.types.push(content_type.into());
        self
    }

    /// Adds a sequence of content types to treat as XML.
    pub fn content_types<I, S>(mut self, content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types.extend(content_types.into_iter().map(Into::into));
        self
    }

    /// Installs a custom matching predicate, consulted with the normalized
    /// `type/subtype` essence after the exact set fails to match.
    pub fn match_custom<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.custom = Some(Arc::new(predicate));
        self
    }

    /// Shaping options forwarded unchanged to the XML converter.
    pub fn xml(mut self, options: ParseOptions) -> Self {
        self.xml = options;
        self
    }

    /// Maximum number of body bytes buffered before the request is rejected
    /// as payload too large.
    pub fn max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Treat an empty matching-type body as an empty mapping instead of a
    /// malformed document.
    pub fn tolerate_empty(mut self, tolerate_empty: bool) -> Self {
        self.tolerate_empty = tolerate_empty;
        self
    }

    pub fn build(self) -> XmlBodyConfig {
        XmlBodyConfig {
            matcher: ContentTypeMatcher::new(self.types, self.custom),
            xml: self.xml,
            max_body_size: self.max_body_size,
            tolerate_empty: self.tolerate_empty,
        }
    }
}

impl fmt::Debug for XmlBodyConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlBodyConfigBuilder")
            .field("types", &self.types)
            .field("custom", &self.custom.is_some())
            .field("xml", &self.xml)
            .field("max_body_size", &self.max_body_size)
            .field("tolerate_empty", &self.tolerate_empty)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_MAX_BODY_SIZE, XmlBodyConfig};
    use http::HeaderValue;

    #[test]
    fn defaults_match_stock_xml_types() {
        let config = XmlBodyConfig::default();
        assert_eq!(config.max_body_size(), DEFAULT_MAX_BODY_SIZE);
        assert!(!config.tolerate_empty());
        assert!(config.matcher().matches(Some(&HeaderValue::from_static("application/xml"))));
    }

    #[test]
    fn single_string_and_sequence_configure_identically() {
        let single = XmlBodyConfig::builder().content_type("application/custom-xml-type").build();
        let listed = XmlBodyConfig::builder().content_types(["application/custom-xml-type"]).build();

        let value = HeaderValue::from_static("application/custom-xml-type");
        assert!(single.matcher().matches(Some(&value)));
        assert!(listed.matcher().matches(Some(&value)));
        assert!(!single.matcher().matches(Some(&HeaderValue::from_static("application/xml"))));
        assert!(!listed.matcher().matches(Some(&HeaderValue::from_static("application/xml"))));
    }
}
