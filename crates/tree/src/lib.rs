//! XML text to structured value conversion
//!
//! This crate converts an XML document into a general purpose nested value
//! ([`XmlValue`]) made of text, sequences and maps, with configurable shaping
//! rules ([`ParseOptions`]): whitespace normalization, tag name lowercasing
//! and sibling grouping. It also re-serializes a value back to XML text
//! ([`to_xml`]) so conversions can be verified to round-trip.
//!
//! The converter is strict about well-formedness: unclosed elements,
//! mismatched end tags, unknown entities, content outside the document root
//! and empty documents are all reported as [`XmlError`] values carrying a
//! byte offset where one is available.
//!
//! # Example
//!
//! ```
//! use xml_tree::{parse, ParseOptions};
//!
//! let value = parse("<customer><name>Bob</name></customer>", &ParseOptions::new()).unwrap();
//!
//! let customer = value.get("customer").unwrap();
//! let names = customer.get("name").unwrap().as_sequence().unwrap();
//! assert_eq!(names[0].as_text(), Some("Bob"));
//! ```

mod error;
mod options;
mod parser;
mod value;
mod writer;

pub use error::XmlError;
pub use options::ParseOptions;
pub use parser::parse;
pub use value::XmlValue;
pub use writer::to_xml;
