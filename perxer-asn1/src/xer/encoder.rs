//! XER encoder: [`AbstractValue`] to XML text

use perxer_core::{AbstractValue, CodecError, CodecResult, Location, TypeDef, TypeModel};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Output layout switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XerOptions {
    /// Pretty-print with this many spaces per level; compact when `None`
    pub indent: Option<usize>,
    /// Emit an XML declaration before the root element
    pub declaration: bool,
    pub max_depth: usize,
}

impl Default for XerOptions {
    fn default() -> Self {
        Self {
            indent: None,
            declaration: false,
            max_depth: 64,
        }
    }
}

/// Encoder producing XML text for values of a type model
pub struct XerEncoder {
    writer: Writer<Vec<u8>>,
    options: XerOptions,
    path: Vec<String>,
}

impl Default for XerEncoder {
    fn default() -> Self {
        Self::new(XerOptions::default())
    }
}

impl XerEncoder {
    pub fn new(options: XerOptions) -> Self {
        let writer = match options.indent {
            Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
            None => Writer::new(Vec::new()),
        };
        Self {
            writer,
            options,
            path: Vec::new(),
        }
    }

    /// Encode `value` as a document whose root element is named after `ty`
    pub fn encode(mut self, value: &AbstractValue, ty: &TypeModel) -> CodecResult<String> {
        value.conform(ty)?;
        if self.options.declaration {
            self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }
        self.write_element(ty.name(), value, ty)?;
        String::from_utf8(self.writer.into_inner()).map_err(|e| {
            CodecError::malformed(format!("encoder produced invalid UTF-8: {}", e), Location::Unknown)
        })
    }

    fn location(&self) -> Location {
        Location::Path(self.path.join("/"))
    }

    fn write(&mut self, event: Event<'_>) -> CodecResult<()> {
        self.writer.write_event(event).map_err(|e| {
            CodecError::malformed(format!("XML write error: {}", e), self.location())
        })
    }

    fn write_element(&mut self, tag: &str, value: &AbstractValue, ty: &TypeModel) -> CodecResult<()> {
        self.path.push(tag.to_string());
        if self.path.len() > self.options.max_depth {
            return Err(CodecError::unsupported(
                format!("nesting deeper than {} levels", self.options.max_depth),
                self.location(),
            ));
        }
        let result = self.write_content(tag, value, ty);
        self.path.pop();
        result
    }

    fn write_content(&mut self, tag: &str, value: &AbstractValue, ty: &TypeModel) -> CodecResult<()> {
        match (ty.def(), value) {
            (TypeDef::Boolean, AbstractValue::Boolean(b)) => {
                self.write_keyword(tag, if *b { "true" } else { "false" })
            }
            (TypeDef::Enumerated { .. }, AbstractValue::Enumerated(id)) => {
                self.write_keyword(tag, id)
            }
            (TypeDef::Null, AbstractValue::Null) => self.write(Event::Empty(BytesStart::new(tag))),
            (TypeDef::Integer { .. }, AbstractValue::Integer(v)) => {
                self.write_text_element(tag, &v.to_string())
            }
            (TypeDef::BitString { .. }, AbstractValue::BitString(bits)) => {
                // MSB-first octets, unused low bits zero
                self.write_text_element(tag, &hex::encode_upper(bits.as_bytes()))
            }
            (TypeDef::OctetString { .. }, AbstractValue::OctetString(bytes)) => {
                self.write_text_element(tag, &hex::encode_upper(bytes))
            }
            (TypeDef::CharacterString { .. }, AbstractValue::CharacterString(text)) => {
                self.write_text_element(tag, text)
            }
            (TypeDef::Sequence { fields, .. }, AbstractValue::Sequence(entries)) => {
                if entries.is_empty() {
                    return self.write(Event::Empty(BytesStart::new(tag)));
                }
                self.write(Event::Start(BytesStart::new(tag)))?;
                for (name, component) in entries {
                    let field = fields.iter().find(|f| f.name() == name).ok_or_else(|| {
                        CodecError::mismatch(
                            format!("unknown component '{}' in {}", name, ty.name()),
                            self.location(),
                        )
                    })?;
                    self.write_element(name, component, field.ty())?;
                }
                self.write(Event::End(BytesEnd::new(tag)))
            }
            (TypeDef::SequenceOf { element, .. }, AbstractValue::SequenceOf(items)) => {
                if items.is_empty() {
                    return self.write(Event::Empty(BytesStart::new(tag)));
                }
                self.write(Event::Start(BytesStart::new(tag)))?;
                for item in items {
                    self.write_element(element.name(), item, element)?;
                }
                self.write(Event::End(BytesEnd::new(tag)))
            }
            (TypeDef::Choice { alternatives, .. }, AbstractValue::Choice(name, inner)) => {
                let alternative = alternatives.iter().find(|a| a.name() == name).ok_or_else(|| {
                    CodecError::mismatch(
                        format!("unknown alternative '{}' in {}", name, ty.name()),
                        self.location(),
                    )
                })?;
                self.write(Event::Start(BytesStart::new(tag)))?;
                self.write_element(name, inner, alternative.ty())?;
                self.write(Event::End(BytesEnd::new(tag)))
            }
            (_, other) => Err(CodecError::mismatch(
                format!("{} value given for {} type {}", other.kind(), ty.kind(), ty.name()),
                self.location(),
            )),
        }
    }

    /// `<tag><keyword/></tag>`
    fn write_keyword(&mut self, tag: &str, keyword: &str) -> CodecResult<()> {
        self.write(Event::Start(BytesStart::new(tag)))?;
        self.write(Event::Empty(BytesStart::new(keyword)))?;
        self.write(Event::End(BytesEnd::new(tag)))
    }

    fn write_text_element(&mut self, tag: &str, text: &str) -> CodecResult<()> {
        if text.is_empty() {
            return self.write(Event::Empty(BytesStart::new(tag)));
        }
        self.write(Event::Start(BytesStart::new(tag)))?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.write(Event::End(BytesEnd::new(tag)))
    }
}

/// Encode `value` as compact XML
pub fn encode(value: &AbstractValue, ty: &TypeModel) -> CodecResult<String> {
    XerEncoder::default().encode(value, ty)
}
