//! Event-driven conversion of XML text into an [`XmlValue`] tree.
//!
//! The reader walks the document once, keeping a stack of open elements.
//! Shaping (attribute keys, sibling grouping, whitespace handling) happens
//! when an element closes, so a document is converted in a single pass with
//! no intermediate DOM.

use crate::error::XmlError;
use crate::options::ParseOptions;
use crate::value::XmlValue;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeMap;
use tracing::trace;

/// Converts an XML document into an [`XmlValue`].
///
/// The result is always a map with a single entry: the root element name
/// mapped to the shaped root value. The root itself is never wrapped in a
/// sequence, regardless of `explicit_array`.
///
/// # Errors
///
/// Returns [`XmlError`] for ill-formed input: unclosed or mismatched
/// elements, unknown entities, invalid attributes, content outside the
/// document root, or an empty document.
pub fn parse(text: &str, options: &ParseOptions) -> Result<XmlValue, XmlError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<(String, XmlValue)> = None;

    loop {
        let position = position_of(&reader);
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::TrailingContent { offset: position });
                }
                stack.push(OpenElement::open(&start, options, position)?);
            }
            Ok(Event::Empty(start)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::TrailingContent { offset: position });
                }
                let (name, value) = OpenElement::open(&start, options, position)?.close(options);
                attach(&mut stack, &mut root, name, value);
            }
            Ok(Event::End(_)) => {
                // mismatched names are rejected by the reader itself, so a
                // pop here always matches the closing tag
                let Some(element) = stack.pop() else {
                    return Err(XmlError::syntax(position, "closing tag without a matching open element"));
                };
                let (name, value) = element.close(options);
                attach(&mut stack, &mut root, name, value);
            }
            Ok(Event::Text(text)) => {
                let unescaped =
                    text.unescape().map_err(|e| XmlError::invalid_entity(position_of(&reader), e))?;
                match stack.last_mut() {
                    Some(element) => element.text.push_str(&unescaped),
                    None if unescaped.trim().is_empty() => {}
                    None if root.is_some() => return Err(XmlError::TrailingContent { offset: position }),
                    None => return Err(XmlError::syntax(position, "character data before the document root")),
                }
            }
            Ok(Event::CData(cdata)) => {
                let content = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                match stack.last_mut() {
                    Some(element) => element.text.push_str(&content),
                    None if root.is_some() => return Err(XmlError::TrailingContent { offset: position }),
                    None => return Err(XmlError::syntax(position, "cdata before the document root")),
                }
            }
            Ok(Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_)) => {}
            Ok(Event::Eof) => {
                if let Some(element) = stack.last() {
                    return Err(XmlError::unclosed_element(&element.name));
                }
                break;
            }
            Err(e) => return Err(XmlError::syntax(position_of(&reader), e)),
        }
    }

    let (name, value) = root.ok_or(XmlError::EmptyDocument)?;
    trace!(root = %name, "converted xml document");
    Ok(XmlValue::Map(BTreeMap::from([(name, value)])))
}

fn position_of(reader: &Reader<&[u8]>) -> usize {
    reader.buffer_position().try_into().unwrap_or(usize::MAX)
}

/// An element whose end tag has not been seen yet.
struct OpenElement {
    name: String,
    attrs: Vec<(String, String)>,
    /// Children in document order; grouped by name when the element closes.
    children: Vec<(String, XmlValue)>,
    text: String,
}

impl OpenElement {
    fn open(start: &BytesStart<'_>, options: &ParseOptions, position: usize) -> Result<Self, XmlError> {
        let mut name = String::from_utf8_lossy(start.name().into_inner()).into_owned();
        if options.normalize_tags {
            name.make_ascii_lowercase();
        }

        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| XmlError::invalid_attribute(position, e))?;
            let key = String::from_utf8_lossy(attr.key.into_inner()).into_owned();
            let value =
                attr.unescape_value().map_err(|e| XmlError::invalid_entity(position, e))?.into_owned();
            attrs.push((key, value));
        }

        Ok(Self { name, attrs, children: Vec::new(), text: String::new() })
    }

    /// Shapes the collected attributes, text and children into a value.
    fn close(self, options: &ParseOptions) -> (String, XmlValue) {
        let text = if options.normalize { self.text.trim().to_string() } else { self.text };
        let text_is_blank = text.trim().is_empty();

        if self.attrs.is_empty() && self.children.is_empty() {
            // plain element: its value is just the text (empty for <a/>)
            return (self.name, XmlValue::Text(text));
        }

        let mut map = BTreeMap::new();

        if !self.attrs.is_empty() {
            let attr_map: BTreeMap<String, XmlValue> =
                self.attrs.into_iter().map(|(key, value)| (key, XmlValue::Text(value))).collect();
            map.insert(options.attr_key.to_string(), XmlValue::Map(attr_map));
        }

        // whitespace-only text between child elements is discarded
        if !text_is_blank {
            map.insert(options.char_key.to_string(), XmlValue::Text(text));
        }

        let mut grouped: BTreeMap<String, Vec<XmlValue>> = BTreeMap::new();
        for (name, value) in self.children {
            grouped.entry(name).or_default().push(value);
        }
        for (name, mut values) in grouped {
            let value = match (options.explicit_array, values.len()) {
                (false, 1) => values.remove(0),
                _ => XmlValue::Sequence(values),
            };
            map.insert(name, value);
        }

        (self.name, XmlValue::Map(map))
    }
}

fn attach(
    stack: &mut [OpenElement],
    root: &mut Option<(String, XmlValue)>,
    name: String,
    value: XmlValue,
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push((name, value)),
        None => *root = Some((name, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::parse;
    use crate::XmlError;
    use crate::options::ParseOptions;
    use serde_json::json;

    fn shape(text: &str, options: &ParseOptions) -> serde_json::Value {
        serde_json::to_value(parse(text, options).unwrap()).unwrap()
    }

    #[test]
    fn single_child_is_wrapped_by_default() {
        let shaped = shape("<customer><name>Bob</name></customer>", &ParseOptions::new());
        assert_eq!(shaped, json!({"customer": {"name": ["Bob"]}}));
    }

    #[test]
    fn single_child_collapses_without_explicit_array() {
        let options = ParseOptions::new().explicit_array(false);
        let shaped = shape("<customer><name>Bob</name></customer>", &options);
        assert_eq!(shaped, json!({"customer": {"name": "Bob"}}));
    }

    #[test]
    fn repeated_siblings_group_under_one_key() {
        let options = ParseOptions::new().explicit_array(false);
        let shaped = shape("<order><item>a</item><item>b</item></order>", &options);
        assert_eq!(shaped, json!({"order": {"item": ["a", "b"]}}));
    }

    #[test]
    fn normalize_trims_text_nodes() {
        let doc = "<customer><name>  Bob  </name></customer>";

        let kept = shape(doc, &ParseOptions::new().explicit_array(false));
        assert_eq!(kept, json!({"customer": {"name": "  Bob  "}}));

        let trimmed = shape(doc, &ParseOptions::new().explicit_array(false).normalize(true));
        assert_eq!(trimmed, json!({"customer": {"name": "Bob"}}));
    }

    #[test]
    fn normalize_tags_lowercases_element_names() {
        let options = ParseOptions::new().explicit_array(false).normalize_tags(true);
        let shaped = shape("<Customer><Name>Bob</Name></Customer>", &options);
        assert_eq!(shaped, json!({"customer": {"name": "Bob"}}));
    }

    #[test]
    fn normalized_tags_merge_as_siblings() {
        let options = ParseOptions::new().normalize_tags(true);
        let shaped = shape("<list><Item>a</Item><item>b</item></list>", &options);
        assert_eq!(shaped, json!({"list": {"item": ["a", "b"]}}));
    }

    #[test]
    fn attributes_collect_under_attr_key() {
        let options = ParseOptions::new().explicit_array(false);
        let shaped = shape(r#"<customer id="7"><name>Bob</name></customer>"#, &options);
        assert_eq!(shaped, json!({"customer": {"$": {"id": "7"}, "name": "Bob"}}));
    }

    #[test]
    fn mixed_text_collects_under_char_key() {
        let options = ParseOptions::new().explicit_array(false).normalize(true);
        let shaped = shape(r#"<note lang="en">call Bob</note>"#, &options);
        assert_eq!(shaped, json!({"note": {"$": {"lang": "en"}, "_": "call Bob"}}));
    }

    #[test]
    fn whitespace_between_children_is_discarded() {
        let options = ParseOptions::new().explicit_array(false);
        let shaped = shape("<customer>\n  <name>Bob</name>\n</customer>", &options);
        assert_eq!(shaped, json!({"customer": {"name": "Bob"}}));
    }

    #[test]
    fn empty_element_becomes_empty_text() {
        let shaped = shape("<customer><note/></customer>", &ParseOptions::new().explicit_array(false));
        assert_eq!(shaped, json!({"customer": {"note": ""}}));
    }

    #[test]
    fn cdata_is_kept_verbatim() {
        let options = ParseOptions::new().explicit_array(false);
        let shaped = shape("<note><![CDATA[a < b]]></note>", &options);
        assert_eq!(shaped, json!({"note": "a < b"}));
    }

    #[test]
    fn standard_entities_are_resolved() {
        let options = ParseOptions::new().explicit_array(false);
        let shaped = shape("<note>Bob &amp; Ann</note>", &options);
        assert_eq!(shaped, json!({"note": "Bob & Ann"}));
    }

    #[test]
    fn unknown_entity_is_rejected() {
        let err = parse("<note>&nosuch;</note>", &ParseOptions::new()).unwrap_err();
        assert!(matches!(err, XmlError::InvalidEntity { .. }), "{err:?}");
    }

    #[test]
    fn unclosed_element_is_rejected() {
        let err = parse("<invalid-xml>", &ParseOptions::new()).unwrap_err();
        // the reader may report this itself depending on its own eof checks
        assert!(matches!(err, XmlError::UnclosedElement { .. } | XmlError::Syntax { .. }), "{err:?}");
    }

    #[test]
    fn mismatched_end_tag_is_rejected() {
        let err = parse("<a><b></a>", &ParseOptions::new()).unwrap_err();
        assert!(matches!(err, XmlError::Syntax { .. }), "{err:?}");
    }

    #[test]
    fn empty_document_is_rejected() {
        assert!(matches!(parse("", &ParseOptions::new()).unwrap_err(), XmlError::EmptyDocument));
        assert!(matches!(parse("   \n ", &ParseOptions::new()).unwrap_err(), XmlError::EmptyDocument));
    }

    #[test]
    fn second_root_is_rejected() {
        let err = parse("<a>1</a><b>2</b>", &ParseOptions::new()).unwrap_err();
        assert!(matches!(err, XmlError::TrailingContent { .. }), "{err:?}");
    }

    #[test]
    fn text_after_root_is_rejected() {
        let err = parse("<a>1</a>junk", &ParseOptions::new()).unwrap_err();
        assert!(matches!(err, XmlError::TrailingContent { .. }), "{err:?}");
    }

    #[test]
    fn declaration_and_comments_are_skipped() {
        let doc = "<?xml version=\"1.0\"?><!-- note --><customer><name>Bob</name></customer>";
        let shaped = shape(doc, &ParseOptions::new());
        assert_eq!(shaped, json!({"customer": {"name": ["Bob"]}}));
    }

    #[test]
    fn root_value_is_never_sequence_wrapped() {
        let value = parse("<customer><name>Bob</name></customer>", &ParseOptions::new()).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.get("customer").unwrap().as_map().is_some());
    }
}
