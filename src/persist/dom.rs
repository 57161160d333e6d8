//! Minimal XML element tree.
//!
//! The deck format uses elements, attributes and text only, so the tree
//! keeps exactly that: child elements in order and the concatenated text of
//! each element (whitespace preserved).

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{CardforgeError, Result};

/// One XML element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// All character data directly inside this element.
    pub text: String,
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First child element named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Trimmed text of the first child named `name`.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim())
    }
}

fn start_element(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CardforgeError::Xml {
            message: format!("Invalid attribute: {e}"),
            position: None,
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Parse a document and return its root element.
pub fn parse(content: &str) -> Result<Element> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    let mut attach = |stack: &mut Vec<Element>, element: Element| -> Result<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_none() => root = Some(element),
            None => return Err(CardforgeError::InvalidDeck("multiple root elements".into())),
        }
        Ok(())
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(start_element(&e)?),
            Ok(Event::Empty(e)) => {
                let element = start_element(&e)?;
                attach(&mut stack, element)?;
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let element = stack.pop().ok_or_else(|| CardforgeError::Xml {
                    message: format!("unexpected closing tag </{name}>"),
                    position: Some(reader.buffer_position() as u64),
                })?;
                attach(&mut stack, element)?;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape()?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(CardforgeError::Xml {
                    message: e.to_string(),
                    position: Some(reader.error_position()),
                })
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(CardforgeError::Xml {
            message: format!("unclosed element <{}>", open.name),
            position: None,
        });
    }
    root.ok_or_else(|| CardforgeError::InvalidDeck("empty document".into()))
}
