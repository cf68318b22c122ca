//! Minimal XML element tree built with quick-xml

use perxer_core::{CodecError, CodecResult, Location};
use quick_xml::Reader;
use quick_xml::events::Event;

/// One XML element with its character data and child elements
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    /// Concatenated character data directly inside this element, untrimmed
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether the element carries character data other than whitespace
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Parse a document into its root element
    ///
    /// Comments, processing instructions and the XML declaration are ignored.
    /// Anything that is not a single well-formed root element is `MalformedInput`.
    /// Elements nested more than `max_depth` levels deep (the root is level 1)
    /// are `UnsupportedType`; parsing stops at the first one.
    pub fn parse(xml: &str, max_depth: usize) -> CodecResult<XmlElement> {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let position = reader.buffer_position();
            let malformed = |message: String| {
                CodecError::malformed(format!("{} (byte {})", message, position), Location::Unknown)
            };
            match reader.read_event_into(&mut buf) {
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => {
                    if root.is_some() {
                        return Err(malformed("content after the root element".to_string()));
                    }
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    check_depth(stack.len() + 1, max_depth, &name)?;
                    stack.push(XmlElement::new(name));
                }
                Ok(Event::Empty(e)) => {
                    check_depth(
                        stack.len() + 1,
                        max_depth,
                        &String::from_utf8_lossy(e.name().as_ref()),
                    )?;
                    let element = XmlElement::new(String::from_utf8_lossy(e.name().as_ref()));
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None if root.is_none() => root = Some(element),
                        None => return Err(malformed("content after the root element".to_string())),
                    }
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| malformed("unbalanced end tag".to_string()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| malformed(format!("invalid character data: {}", err)))?;
                    match stack.last_mut() {
                        Some(current) => current.text.push_str(&text),
                        None if text.trim().is_empty() => {}
                        None => return Err(malformed("text outside the root element".to_string())),
                    }
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8(e.into_inner().into_owned())
                        .map_err(|err| malformed(format!("invalid CDATA: {}", err)))?;
                    match stack.last_mut() {
                        Some(current) => current.text.push_str(&text),
                        None => return Err(malformed("CDATA outside the root element".to_string())),
                    }
                }
                Ok(Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_)) => {}
                Err(e) => return Err(malformed(format!("XML parse error: {}", e))),
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(CodecError::malformed(
                format!("element <{}> is never closed", open.name),
                Location::Unknown,
            ));
        }
        root.ok_or_else(|| CodecError::malformed("no root element", Location::Unknown))
    }
}

fn check_depth(depth: usize, max_depth: usize, name: &str) -> CodecResult<()> {
    if depth > max_depth {
        return Err(CodecError::unsupported(
            format!("element <{}> nested deeper than {} levels", name, max_depth),
            Location::Unknown,
        ));
    }
    Ok(())
}
