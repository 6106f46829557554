// ZAPI element tree
//
// ZAPI requests and responses are small XML documents where every node
// has a name, optional text content, optional attributes and children.
// `NaElement` models exactly that shape; encoding and decoding go
// through quick-xml.

use std::fmt;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::Error;

/// A single ZAPI XML node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NaElement {
    name: String,
    content: Option<String>,
    attributes: Vec<(String, String)>,
    children: Vec<NaElement>,
}

fn xml_err(e: impl fmt::Display) -> Error {
    Error::Xml(e.to_string())
}

impl NaElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A leaf node carrying text content.
    pub fn with_content(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Build a node whose children are `name -> content` leaves, in order.
    pub fn with_children<I, K, V>(name: impl Into<String>, children: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut element = Self::new(name);
        for (key, value) in children {
            element.add_new_child(key, value);
        }
        element
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn children(&self) -> &[NaElement] {
        &self.children
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn add_child(&mut self, child: NaElement) -> &mut Self {
        self.children.push(child);
        self
    }

    pub fn add_new_child(&mut self, name: impl Into<String>, content: impl Into<String>) -> &mut Self {
        self.add_child(Self::with_content(name, content))
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&NaElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text content of the first direct child with the given name.
    pub fn child_content(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(NaElement::content)
    }

    // ── Encoding ─────────────────────────────────────────────────────

    /// Serialize this element (and its subtree) to an XML fragment.
    pub fn to_xml(&self) -> Result<String, Error> {
        let mut writer = Writer::new(Vec::new());
        self.write_into(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(xml_err)
    }

    fn write_into(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), Error> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        writer.write_event(Event::Start(start)).map_err(xml_err)?;
        if let Some(content) = &self.content {
            writer
                .write_event(Event::Text(BytesText::new(content)))
                .map_err(xml_err)?;
        }
        for child in &self.children {
            child.write_into(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(xml_err)?;
        Ok(())
    }

    // ── Decoding ─────────────────────────────────────────────────────

    /// Parse an XML document into its root element.
    ///
    /// Declarations, doctypes, comments and processing instructions are
    /// skipped; namespace prefixes are dropped from element and attribute
    /// names.
    pub fn parse(xml: &str) -> Result<Self, Error> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<NaElement> = Vec::new();
        let mut root: Option<NaElement> = None;

        loop {
            match reader.read_event().map_err(xml_err)? {
                Event::Start(start) => stack.push(Self::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Self::from_start(&start)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::Xml("unbalanced closing tag".into()))?;
                    attach(&mut stack, &mut root, element);
                }
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        let text = text.unescape().map_err(xml_err)?;
                        top.content.get_or_insert_with(String::new).push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        let bytes = data.into_inner();
                        top.content
                            .get_or_insert_with(String::new)
                            .push_str(&String::from_utf8_lossy(&bytes));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::Xml("unexpected end of document".into()));
        }
        root.ok_or_else(|| Error::Xml("document has no root element".into()))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, Error> {
        let mut element = Self::new(String::from_utf8_lossy(start.local_name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(xml_err)?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value().map_err(xml_err)?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }
}

fn attach(stack: &mut [NaElement], root: &mut Option<NaElement>, element: NaElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

impl fmt::Display for NaElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_xml() {
            Ok(xml) => f.write_str(&xml),
            Err(_) => write!(f, "<{}/>", self.name),
        }
    }
}
