//! The converter seam between the interceptor and the XML library.
//!
//! The interceptor never parses XML itself; it hands the collected body text
//! to an injected [`XmlConverter`], so its own classification and collection
//! logic is testable against a mock converter.

use xml_tree::{ParseOptions, XmlError, XmlValue};

/// Converts XML text into a structured value.
///
/// Implementations must be cheap to share: one instance serves every
/// in-flight request.
#[cfg_attr(test, mockall::automock)]
pub trait XmlConverter: Send + Sync {
    fn convert(&self, text: &str, options: &ParseOptions) -> Result<XmlValue, XmlError>;
}

/// The default converter, backed by the `xml-tree` parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeConverter;

impl XmlConverter for TreeConverter {
    fn convert(&self, text: &str, options: &ParseOptions) -> Result<XmlValue, XmlError> {
        xml_tree::parse(text, options)
    }
}
