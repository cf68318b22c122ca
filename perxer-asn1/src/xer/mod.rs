//! XER (XML Encoding Rules) codec driven by a runtime type model
//!
//! # Element Mapping
//!
//! | kind              | XML form                                        |
//! |-------------------|-------------------------------------------------|
//! | SEQUENCE          | one child element per present component, in order |
//! | SEQUENCE OF       | one child element per item, named after the item type |
//! | CHOICE            | a single child element named after the alternative |
//! | ENUMERATED        | empty child element named after the identifier  |
//! | BOOLEAN           | `<true/>` or `<false/>`                         |
//! | NULL              | empty element                                   |
//! | INTEGER           | decimal text                                    |
//! | OCTET STRING      | hexadecimal text (uppercase on output)          |
//! | BIT STRING        | hex of the MSB-first padded octets              |
//! | character strings | escaped text, kept verbatim                     |
//!
//! The root element is named after the type. Whitespace-only text between
//! elements is ignored on input; leaf text is trimmed for every kind except
//! character strings. ENUMERATED and BOOLEAN values are also accepted as text.

pub mod decoder;
pub mod encoder;
pub mod node;

pub use decoder::{XerDecoder, decode};
pub use encoder::{XerEncoder, XerOptions, encode};
pub use node::XmlElement;
