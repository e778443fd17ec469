//! Re-serialization of an [`XmlValue`] tree back to XML text.
//!
//! The writer is the inverse of [`parse`](crate::parse) for the structural
//! part of a document: element nesting, text content and attributes survive
//! a parse / write / parse cycle unchanged (modulo the whitespace and tag
//! normalization options applied when parsing).

use crate::error::XmlError;
use crate::options::ParseOptions;
use crate::value::XmlValue;
use quick_xml::escape::escape;

/// Writes a value produced by [`parse`](crate::parse) back to XML text.
///
/// The value must be a map with exactly one entry, the document root. The
/// same `attr_key` / `char_key` options used when parsing tell the writer
/// which map entries are attributes and mixed text rather than children.
///
/// # Errors
///
/// Returns [`XmlError::Unwritable`] when the value does not describe a
/// single-rooted document, or when an attribute entry is not a map of text.
pub fn to_xml(value: &XmlValue, options: &ParseOptions) -> Result<String, XmlError> {
    let Some(map) = value.as_map() else {
        return Err(XmlError::unwritable("document root must be a map"));
    };
    let mut entries = map.iter();
    let (Some((name, root)), None) = (entries.next(), entries.next()) else {
        return Err(XmlError::unwritable("document must have exactly one root element"));
    };

    let mut out = String::new();
    write_element(name, root, options, &mut out)?;
    Ok(out)
}

fn write_element(
    name: &str,
    value: &XmlValue,
    options: &ParseOptions,
    out: &mut String,
) -> Result<(), XmlError> {
    match value {
        XmlValue::Text(text) if text.is_empty() => {
            out.push('<');
            out.push_str(name);
            out.push_str("/>");
        }
        XmlValue::Text(text) => {
            out.push('<');
            out.push_str(name);
            out.push('>');
            out.push_str(&escape(text));
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        // repeated siblings write as consecutive same-named elements
        XmlValue::Sequence(items) => {
            for item in items {
                write_element(name, item, options, out)?;
            }
        }
        XmlValue::Map(map) => {
            out.push('<');
            out.push_str(name);

            if let Some(attrs) = map.get(options.attr_key.as_ref()) {
                let Some(attrs) = attrs.as_map() else {
                    return Err(XmlError::unwritable(format!(
                        "attribute entry `{}` of <{name}> must be a map",
                        options.attr_key
                    )));
                };
                for (key, attr_value) in attrs {
                    let Some(text) = attr_value.as_text() else {
                        return Err(XmlError::unwritable(format!(
                            "attribute `{key}` of <{name}> must be text"
                        )));
                    };
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape(text));
                    out.push('"');
                }
            }

            let text = map.get(options.char_key.as_ref());
            let children: Vec<_> = map
                .iter()
                .filter(|(key, _)| {
                    key.as_str() != options.attr_key.as_ref() && key.as_str() != options.char_key.as_ref()
                })
                .collect();

            if text.is_none() && children.is_empty() {
                out.push_str("/>");
                return Ok(());
            }
            out.push('>');

            if let Some(text) = text {
                let Some(text) = text.as_text() else {
                    return Err(XmlError::unwritable(format!(
                        "text entry `{}` of <{name}> must be text",
                        options.char_key
                    )));
                };
                out.push_str(&escape(text));
            }
            for (key, child) in children {
                write_element(key, child, options, out)?;
            }

            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::to_xml;
    use crate::options::ParseOptions;
    use crate::parser::parse;
    use crate::value::XmlValue;
    use crate::XmlError;

    fn round_trips(doc: &str, options: &ParseOptions) {
        let parsed = parse(doc, options).unwrap();
        let written = to_xml(&parsed, options).unwrap();
        let reparsed = parse(&written, options).unwrap();
        assert_eq!(parsed, reparsed, "written form: {written}");
    }

    #[test]
    fn nested_document_round_trips() {
        round_trips("<customer><name>Bob</name><age>42</age></customer>", &ParseOptions::new());
    }

    #[test]
    fn repeated_siblings_round_trip() {
        round_trips("<order><item>a</item><item>b</item><item>c</item></order>", &ParseOptions::new());
    }

    #[test]
    fn attributes_and_mixed_text_round_trip() {
        let options = ParseOptions::new().normalize(true);
        round_trips(r#"<note lang="en" priority="high">call &amp; write</note>"#, &options);
    }

    #[test]
    fn empty_elements_round_trip() {
        round_trips("<customer><note/><name>Bob</name></customer>", &ParseOptions::new());
    }

    #[test]
    fn collapsed_shapes_round_trip() {
        let options = ParseOptions::new().explicit_array(false);
        round_trips("<customer><name>Bob</name></customer>", &options);
    }

    #[test]
    fn escaped_text_round_trips() {
        round_trips("<m>a &lt; b &amp; c</m>", &ParseOptions::new());
    }

    #[test]
    fn non_map_root_is_unwritable() {
        let err = to_xml(&XmlValue::from("Bob"), &ParseOptions::new()).unwrap_err();
        assert!(matches!(err, XmlError::Unwritable { .. }));
    }

    #[test]
    fn multi_rooted_map_is_unwritable() {
        let value: XmlValue =
            [("a".to_string(), XmlValue::from("1")), ("b".to_string(), XmlValue::from("2"))]
                .into_iter()
                .collect();
        let err = to_xml(&value, &ParseOptions::new()).unwrap_err();
        assert!(matches!(err, XmlError::Unwritable { .. }));
    }
}
