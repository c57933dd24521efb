//! Owned XML element tree
//!
//! Project documents are parsed into [`XmlElement`] trees with quick-xml and
//! written back the same way. Element lookups match on local names so the
//! `con:` namespace prefix never has to be spelled out by callers. Unknown
//! elements, attributes, comments and whitespace survive a round trip.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::{Error, Result};

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified name, e.g. `con:testStep`
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

/// Local part of a qualified name.
pub fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Namespace prefix, if the name has one.
    pub fn prefix(&self) -> Option<&str> {
        self.name.rsplit_once(':').map(|(prefix, _)| prefix)
    }

    /// `local` qualified with this element's prefix.
    pub fn qualify(&self, local: &str) -> String {
        match self.prefix() {
            Some(prefix) => format!("{prefix}:{local}"),
            None => local.to_string(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(idx).1)
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.local_name() == local)
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        self.children.iter_mut().find_map(|node| match node {
            XmlNode::Element(el) if el.local_name() == local => Some(el),
            _ => None,
        })
    }

    /// Child elements with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.elements().filter(move |el| el.local_name() == local)
    }

    /// The `n`th child element with the given local name.
    pub fn nth_child_mut(&mut self, local: &str, n: usize) -> Option<&mut XmlElement> {
        self.children
            .iter_mut()
            .filter_map(|node| match node {
                XmlNode::Element(el) if el.local_name() == local => Some(el),
                _ => None,
            })
            .nth(n)
    }

    /// Remove the `n`th child element with the given local name, along with
    /// the whitespace preceding it.
    pub fn remove_nth_child(&mut self, local: &str, n: usize) -> Option<XmlElement> {
        let idx = self
            .children
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node, XmlNode::Element(el) if el.local_name() == local))
            .map(|(idx, _)| idx)
            .nth(n)?;
        let removed = match self.children.remove(idx) {
            XmlNode::Element(el) => el,
            _ => return None,
        };
        if idx > 0 && matches!(&self.children[idx - 1], XmlNode::Text(t) if t.trim().is_empty()) {
            self.children.remove(idx - 1);
        }
        Some(removed)
    }

    /// First child with the local name of `name`, appending `<name/>` if absent.
    pub fn child_or_insert(&mut self, name: &str) -> &mut XmlElement {
        let local = local_name(name).to_string();
        let idx = match self
            .children
            .iter()
            .position(|node| matches!(node, XmlNode::Element(el) if el.local_name() == local))
        {
            Some(idx) => idx,
            None => {
                self.children.push(XmlNode::Element(XmlElement::new(name)));
                self.children.len() - 1
            }
        };
        match &mut self.children[idx] {
            XmlNode::Element(el) => el,
            _ => unreachable!("index points at an element"),
        }
    }

    /// Replace the first child with the same local name, or append.
    pub fn replace_child(&mut self, element: XmlElement) {
        let local = element.local_name().to_string();
        match self.child_mut(&local) {
            Some(existing) => *existing = element,
            None => self.children.push(XmlNode::Element(element)),
        }
    }

    /// Concatenated text and CDATA of the direct children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) | XmlNode::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all direct text with `text`.
    ///
    /// Non-empty text is stored as CDATA unless it contains the CDATA
    /// terminator.
    pub fn set_text(&mut self, text: &str) {
        self.children
            .retain(|node| !matches!(node, XmlNode::Text(_) | XmlNode::CData(_)));
        if text.is_empty() {
            return;
        }
        let node = if text.contains("]]>") {
            XmlNode::Text(text.to_string())
        } else {
            XmlNode::CData(text.to_string())
        };
        self.children.insert(0, node);
    }

    /// Serialize this element (without a declaration).
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, self)?;
        String::from_utf8(writer.into_inner()).map_err(|e| Error::xml(e.to_string()))
    }

    /// Parse a single element from an XML fragment.
    pub fn parse(xml: &str) -> Result<Self> {
        XmlDocument::parse(xml).map(|doc| doc.root)
    }
}

/// A parsed document: one root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub root: XmlElement,
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        Self { root }
    }

    /// Parse a document.
    ///
    /// Declarations, processing instructions and anything outside the root
    /// element are dropped.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    return Err(Error::xml(format!(
                        "at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            };

            match event {
                Event::Start(start) => stack.push(element_from(&start)?),
                Event::Empty(start) => {
                    let element = element_from(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::xml("unbalanced end tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        let raw = utf8(&text)?;
                        push_text(top, &unescape_or_raw(raw));
                    }
                }
                Event::GeneralRef(reference) => {
                    if let Some(top) = stack.last_mut() {
                        let entity = format!("&{};", utf8(&reference)?);
                        push_text(top, &unescape_or_raw(&entity));
                    }
                }
                Event::CData(cdata) => {
                    if let Some(top) = stack.last_mut() {
                        top.children.push(XmlNode::CData(utf8(&cdata)?.to_string()));
                    }
                }
                Event::Comment(comment) => {
                    if let Some(top) = stack.last_mut() {
                        top.children.push(XmlNode::Comment(utf8(&comment)?.to_string()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::xml(format!("unclosed element <{}>", stack[stack.len() - 1].name)));
        }
        root.map(Self::new)
            .ok_or_else(|| Error::xml("document has no root element"))
    }

    /// Serialize with an XML declaration.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| Error::xml(e.to_string()))?;
        writer
            .write_event(Event::Text(BytesText::new("\n")))
            .map_err(|e| Error::xml(e.to_string()))?;
        write_element(&mut writer, &self.root)?;
        String::from_utf8(writer.into_inner()).map_err(|e| Error::xml(e.to_string()))
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| Error::xml(e.to_string()))
}

fn unescape_or_raw(raw: &str) -> Cow<'_, str> {
    unescape(raw).unwrap_or(Cow::Borrowed(raw))
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlElement> {
    let mut element = XmlElement::new(utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::xml(e.to_string()))?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let value = unescape_or_raw(utf8(&attr.value)?).into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Append text, merging with a preceding text node (entity references
/// arrive as separate events).
fn push_text(element: &mut XmlElement, text: &str) {
    if let Some(XmlNode::Text(existing)) = element.children.last_mut() {
        existing.push_str(text);
    } else {
        element.children.push(XmlNode::Text(text.to_string()));
    }
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(Error::xml("multiple root elements")),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| Error::xml(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| Error::xml(e.to_string()))?;
    for child in &element.children {
        let written = match child {
            XmlNode::Element(el) => {
                write_element(writer, el)?;
                continue;
            }
            XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text))),
            XmlNode::CData(text) => writer.write_event(Event::CData(BytesCData::new(text.as_str()))),
            XmlNode::Comment(text) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))
            }
        };
        written.map_err(|e| Error::xml(e.to_string()))?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| Error::xml(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<con:soapui-project name="P &amp; Co" xmlns:con="http://eviware.com/soapui/config">
  <!-- kept -->
  <con:testSuite name="S"><con:setupScript><![CDATA[log.info "<hi>"]]></con:setupScript></con:testSuite>
  <con:description>a &lt; b</con:description>
</con:soapui-project>"#;

    #[test]
    fn parse_reads_attributes_and_children() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();

        assert_eq!(doc.root.local_name(), "soapui-project");
        assert_eq!(doc.root.attr("name"), Some("P & Co"));
        let suite = doc.root.child("testSuite").unwrap();
        assert_eq!(suite.child("setupScript").unwrap().text(), "log.info \"<hi>\"");
        assert_eq!(doc.root.child("description").unwrap().text(), "a < b");
    }

    #[test]
    fn round_trip_preserves_content() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let written = doc.to_xml_string().unwrap();
        let reparsed = XmlDocument::parse(&written).unwrap();

        assert_eq!(reparsed, doc);
        assert!(written.contains("<!-- kept -->"));
        assert!(written.contains("<![CDATA[log.info \"<hi>\"]]>"));
    }

    #[test]
    fn set_text_uses_cdata_unless_terminator_present() {
        let mut el = XmlElement::new("script");
        el.set_text("a < b");
        assert_eq!(el.to_xml_string().unwrap(), "<script><![CDATA[a < b]]></script>");

        el.set_text("x ]]> y");
        assert_eq!(el.to_xml_string().unwrap(), "<script>x ]]&gt; y</script>");
        assert_eq!(el.text(), "x ]]> y");
    }

    #[test]
    fn child_or_insert_matches_local_name() {
        let mut config = XmlElement::new("con:config");
        config.child_or_insert("script").set_text("1");
        config.child_or_insert("script").set_text("2");

        assert_eq!(config.elements().count(), 1);
        assert_eq!(config.child("script").unwrap().text(), "2");
    }

    #[test]
    fn parse_rejects_unclosed() {
        assert!(XmlDocument::parse("<a><b></a>").is_err());
    }

    #[test]
    fn remove_nth_child_drops_leading_whitespace() {
        let mut root = XmlElement::parse("<a>\n  <b n=\"1\"/>\n  <b n=\"2\"/>\n</a>").unwrap();
        let removed = root.remove_nth_child("b", 1).unwrap();

        assert_eq!(removed.attr("n"), Some("2"));
        assert_eq!(root.to_xml_string().unwrap(), "<a>\n  <b n=\"1\"/>\n</a>");
    }

    #[test]
    fn qualify_uses_prefix() {
        assert_eq!(XmlElement::new("con:config").qualify("request"), "con:request");
        assert_eq!(XmlElement::new("config").qualify("request"), "request");
    }
}
