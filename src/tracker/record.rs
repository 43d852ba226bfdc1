use std::collections::BTreeMap;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ParseError;

/// Flat view of one tracker element: child element name to text.
///
/// Only direct children are kept. Nested collections such as `<labels>` or
/// `<notes>` come through with whatever text sits directly inside them, which
/// for Pivotal payloads is nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Parse a single `<story>`-style document.
    pub fn parse(xml: &str) -> Result<Self, ParseError> {
        let root = parse_document(xml)?;
        Ok(Self::from_element(&root))
    }

    /// Parse a `<stories>`-style document into one record per child element.
    pub fn parse_list(xml: &str) -> Result<Vec<Self>, ParseError> {
        let root = parse_document(xml)?;
        Ok(root.children.iter().map(Self::from_element).collect())
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    fn from_element(element: &Element) -> Self {
        let mut fields = BTreeMap::new();
        for child in &element.children {
            // first occurrence wins, like a find() over the children
            fields
                .entry(child.name.clone())
                .or_insert_with(|| child.text.clone());
        }
        Self { fields }
    }
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Self::default()
        }
    }
}

fn parse_document(xml: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut stack: Vec<Element> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(Element::new(e.name().as_ref())),
            Ok(Event::Empty(e)) => {
                let element = Element::new(e.name().as_ref());
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| ParseError::Xml(err.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ParseError::Xml("unbalanced closing tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Ok(Event::Eof) => {
                return Err(ParseError::Xml(if stack.is_empty() {
                    "document has no root element".to_string()
                } else {
                    "unexpected end of document".to_string()
                }))
            }
            Ok(_) => {}
            Err(err) => return Err(ParseError::Xml(err.to_string())),
        }
    }
}

/// Render `<root><field>value</field>...</root>` with escaped values.
pub fn render_element(root: &str, fields: &[(&str, &str)]) -> String {
    let mut body = format!("<{root}>");
    for (name, value) in fields {
        body.push_str(&format!("<{name}>{}</{name}>", escape(*value)));
    }
    body.push_str(&format!("</{root}>"));
    body
}
