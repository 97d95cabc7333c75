//! Lookup response parsing
//!
//! The service answers with XML shaped like
//!
//! ```xml
//! <kvSequenceEntryXML>
//!   <matches>
//!     <match>
//!       <proteinMD5>4CD214BD2268CC5AB7F4398B9CBC6CE0</proteinMD5>
//!       <hit>...</hit>
//!       <hit>...</hit>
//!     </match>
//!   </matches>
//! </kvSequenceEntryXML>
//! ```
//!
//! The hit structure is opaque to us, so the document is first turned into a
//! generic JSON tree and only the envelope is checked. Conversion rules:
//!
//! - an element with no attributes and no children becomes its text, or `null`
//!   when empty
//! - otherwise it becomes an object; attributes are keyed `@name`, text is kept
//!   under `#text`
//! - a child tag seen once is a single value, a repeated tag is an array
//!
//! The last rule means one `<match>` and many `<match>` arrive in different
//! shapes. [`parse_matches`] folds both into a `Vec`, and nothing past this
//! module sees the difference.

use crate::api::types::MatchRecord;
use crate::error::{CliError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Root element of a lookup response
pub const ROOT_ELEMENT: &str = "kvSequenceEntryXML";

/// Collection element under the root
pub const MATCHES_ELEMENT: &str = "matches";

/// Repeated match element under the collection
pub const MATCH_ELEMENT: &str = "match";

/// Element being assembled while its children are read
struct Node {
    name: String,
    fields: Map<String, Value>,
    text: String,
    has_children: bool,
}

impl Node {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut fields = Map::new();

        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr.unescape_value()?.into_owned();
            fields.insert(key, Value::String(value));
        }

        Ok(Self {
            name,
            fields,
            text: String::new(),
            has_children: false,
        })
    }

    fn add_child(&mut self, name: String, value: Value) {
        self.has_children = true;
        match self.fields.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            },
            None => {
                self.fields.insert(name, value);
            },
        }
    }

    fn finish(mut self) -> (String, Value) {
        let text = self.text.trim();

        let value = if self.fields.is_empty() && !self.has_children {
            if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            }
        } else {
            if !text.is_empty() {
                self.fields
                    .insert("#text".to_string(), Value::String(text.to_string()));
            }
            Value::Object(self.fields)
        };

        (self.name, value)
    }
}

/// Convert an XML document to a JSON object keyed by its root element
pub fn xml_to_json(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Node::open(&start)?),
            Event::Empty(start) => {
                let (name, value) = Node::open(&start)?.finish();
                close_element(&mut stack, &mut root, name, value)?;
            },
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| CliError::response_parse("unbalanced closing tag"))?;
                let (name, value) = node.finish();
                close_element(&mut stack, &mut root, name, value)?;
            },
            Event::Text(text) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text.unescape()?);
                }
            },
            Event::CData(data) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            },
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctypes
            _ => {},
        }
    }

    if !stack.is_empty() {
        return Err(CliError::response_parse("document ended inside an open element"));
    }

    let (name, value) =
        root.ok_or_else(|| CliError::response_parse("document has no root element"))?;

    let mut document = Map::new();
    document.insert(name, value);
    Ok(Value::Object(document))
}

fn close_element(
    stack: &mut [Node],
    root: &mut Option<(String, Value)>,
    name: String,
    value: Value,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.add_child(name, value),
        None if root.is_none() => *root = Some((name, value)),
        None => return Err(CliError::response_parse("document has more than one root element")),
    }
    Ok(())
}

/// Parse a lookup response body into match records
///
/// An empty `<matches/>` collection is a valid answer and yields no records.
pub fn parse_matches(xml: &str) -> Result<Vec<MatchRecord>> {
    let document = xml_to_json(xml)?;

    let root = document.get(ROOT_ELEMENT).ok_or_else(|| {
        CliError::response_parse(format!("missing <{}> root element", ROOT_ELEMENT))
    })?;

    let matches = match root {
        Value::Object(fields) => fields.get(MATCHES_ELEMENT).ok_or_else(|| {
            CliError::response_parse(format!(
                "missing <{}> inside <{}>",
                MATCHES_ELEMENT, ROOT_ELEMENT
            ))
        })?,
        _ => {
            return Err(CliError::response_parse(format!(
                "missing <{}> inside <{}>",
                MATCHES_ELEMENT, ROOT_ELEMENT
            )))
        },
    };

    let elements = match matches {
        Value::Null => Vec::new(),
        Value::Object(fields) => match fields.get(MATCH_ELEMENT) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(single) => vec![single.clone()],
        },
        other => {
            return Err(CliError::response_parse(format!(
                "<{}> should contain <{}> elements, found {}",
                MATCHES_ELEMENT, MATCH_ELEMENT, other
            )))
        },
    };

    elements
        .into_iter()
        .map(|element| {
            serde_json::from_value(element)
                .map_err(|e| CliError::response_parse(format!("invalid <{}>: {}", MATCH_ELEMENT, e)))
        })
        .collect()
}
