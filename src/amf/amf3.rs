//! AMF3 encoder
//!
//! AMF3 is the ActionScript 3.0 serialization format.
//! Reference: AMF 3 Specification (amf3_spec_121207.pdf)
//!
//! Type Markers:
//! ```text
//! 0x00 - Undefined
//! 0x01 - Null
//! 0x02 - False
//! 0x03 - True
//! 0x04 - Integer (U29, 29-bit signed)
//! 0x05 - Double (IEEE 754)
//! 0x06 - String (U29 length/reference + UTF-8)
//! 0x07 - XMLDocument
//! 0x08 - Date
//! 0x09 - Array (dense + associative)
//! 0x0A - Object (traits + members)
//! 0x0B - XML (E4X)
//! 0x0C - ByteArray
//! ```
//!
//! Strings, traits and objects each have their own reference table. A U29
//! header whose low bit is 0 is a reference (`index << 1`); a low bit of 1
//! means the value follows inline.

use crate::amf::cache::Traits;
use crate::amf::sink::U29_MAX;
use crate::amf::value::AmfValue;
use crate::error::{Error, Result};
use crate::session::Session;

// AMF3 type markers
pub const MARKER_UNDEFINED: u8 = 0x00;
pub const MARKER_NULL: u8 = 0x01;
pub const MARKER_FALSE: u8 = 0x02;
pub const MARKER_TRUE: u8 = 0x03;
pub const MARKER_INTEGER: u8 = 0x04;
pub const MARKER_DOUBLE: u8 = 0x05;
pub const MARKER_STRING: u8 = 0x06;
pub const MARKER_XML_DOC: u8 = 0x07;
pub const MARKER_DATE: u8 = 0x08;
pub const MARKER_ARRAY: u8 = 0x09;
pub const MARKER_OBJECT: u8 = 0x0A;
pub const MARKER_XML: u8 = 0x0B;
pub const MARKER_BYTE_ARRAY: u8 = 0x0C;

/// Smallest integer written with the integer marker
pub const INTEGER_MIN: i64 = -(1 << 28);
/// Largest integer written with the integer marker
pub const INTEGER_MAX: i64 = (1 << 28) - 1;

/// The empty string, and the terminator of dynamic members
const EMPTY_STRING: u8 = 0x01;

/// U29 header carrying `n` and the inline/reference flag in the low bit
fn flagged(n: usize, inline: bool) -> Result<u32> {
    if n > (U29_MAX >> 1) as usize {
        return Err(Error::constraint(format!(
            "{} is too large for an AMF3 length or reference",
            n
        )));
    }
    Ok(((n as u32) << 1) | inline as u32)
}

impl Session<'_> {
    /// Encode a single AMF3 value
    pub(crate) fn write_amf3(&mut self, value: &AmfValue) -> Result<()> {
        match value {
            AmfValue::Undefined => self.sink.write_byte(MARKER_UNDEFINED),
            AmfValue::Null => self.sink.write_byte(MARKER_NULL),
            AmfValue::Boolean(b) => self
                .sink
                .write_byte(if *b { MARKER_TRUE } else { MARKER_FALSE }),
            AmfValue::Integer(n) => {
                if (INTEGER_MIN..=INTEGER_MAX).contains(n) {
                    self.sink.write_byte(MARKER_INTEGER)?;
                    self.sink.write_u29((*n as u32) & U29_MAX)
                } else {
                    self.sink.write_byte(MARKER_DOUBLE)?;
                    self.sink.write_double(*n as f64)
                }
            }
            AmfValue::Number(n) => {
                self.sink.write_byte(MARKER_DOUBLE)?;
                self.sink.write_double(*n)
            }
            AmfValue::String(s) => {
                self.sink.write_byte(MARKER_STRING)?;
                self.write_amf3_utf8(s)
            }
            AmfValue::Date(ms) => {
                self.sink.write_byte(MARKER_DATE)?;
                // Readers table every date; dates have no identity to match later
                self.amf3.objects.reserve();
                self.sink.write_u29(flagged(0, true)?)?;
                self.sink.write_double(*ms)
            }
            AmfValue::ByteArray(bytes) => {
                self.sink.write_byte(MARKER_BYTE_ARRAY)?;
                if self.write_amf3_object_ref(value)? {
                    return Ok(());
                }
                self.sink.write_u29(flagged(bytes.len(), true)?)?;
                self.sink.write_bytes(bytes)
            }
            AmfValue::Xml(xml) | AmfValue::XmlDocument(xml) => {
                let marker = if matches!(value, AmfValue::Xml(_)) {
                    MARKER_XML
                } else {
                    MARKER_XML_DOC
                };
                self.sink.write_byte(marker)?;
                if self.write_amf3_object_ref(value)? {
                    return Ok(());
                }
                self.nested(|s| {
                    s.sink.write_u29(flagged(xml.len(), true)?)?;
                    s.sink.write_bytes(xml.as_bytes())
                })
            }
            AmfValue::Array(elements) => {
                self.sink.write_byte(MARKER_ARRAY)?;
                if self.write_amf3_object_ref(value)? {
                    return Ok(());
                }
                let elements = elements.borrow();
                self.nested(|s| {
                    s.sink.write_u29(flagged(elements.len(), true)?)?;
                    s.sink.write_byte(EMPTY_STRING)?;
                    for element in elements.iter() {
                        s.encode(element)?;
                    }
                    Ok(())
                })
            }
            AmfValue::EcmaArray(entries) => {
                self.sink.write_byte(MARKER_ARRAY)?;
                if self.write_amf3_object_ref(value)? {
                    return Ok(());
                }
                let entries = entries.borrow();
                self.nested(|s| {
                    s.sink.write_u29(flagged(0, true)?)?;
                    s.write_amf3_pairs(&entries)?;
                    s.sink.write_byte(EMPTY_STRING)
                })
            }
            AmfValue::Map(entries) => {
                self.sink.write_byte(MARKER_OBJECT)?;
                if self.write_amf3_object_ref(value)? {
                    return Ok(());
                }
                let entries = entries.borrow();
                self.nested(|s| {
                    s.write_amf3_traits(&Traits::anonymous())?;
                    s.write_amf3_pairs(&entries)?;
                    s.sink.write_byte(EMPTY_STRING)
                })
            }
            AmfValue::Object(object) => {
                self.sink.write_byte(MARKER_OBJECT)?;
                if self.write_amf3_object_ref(value)? {
                    return Ok(());
                }
                let mapped = self.map_object(object)?;
                let traits = Traits {
                    class_name: mapped.class_name,
                    dynamic: mapped.dynamic,
                    externalizable: false,
                    members: mapped.members.iter().map(|(k, _)| k.clone()).collect(),
                };
                self.nested(|s| {
                    s.write_amf3_traits(&traits)?;
                    for (_, member) in &mapped.members {
                        s.encode(member)?;
                    }
                    if traits.dynamic {
                        s.write_amf3_pairs(&mapped.dynamic_members)?;
                        s.sink.write_byte(EMPTY_STRING)?;
                    }
                    Ok(())
                })
            }
        }
    }

    /// Write a UTF-8-vr string through the string table (no type marker)
    pub(crate) fn write_amf3_utf8(&mut self, s: &str) -> Result<()> {
        match self.amf3.strings.lookup_or_insert(s) {
            None => self.sink.write_byte(EMPTY_STRING),
            Some((index, true)) => self.sink.write_u29(flagged(index, false)?),
            Some((_, false)) => {
                self.sink.write_u29(flagged(s.len(), true)?)?;
                self.sink.write_bytes(s.as_bytes())
            }
        }
    }

    /// Write a reference if the value was seen before, otherwise claim an
    /// index for it. Returns whether a reference was written.
    fn write_amf3_object_ref(&mut self, value: &AmfValue) -> Result<bool> {
        let (index, present) = match self.amf3.objects.lookup_or_insert(value) {
            Some(entry) => entry,
            None => return Ok(false),
        };
        if present {
            self.sink.write_u29(flagged(index, false)?)?;
        }
        Ok(present)
    }

    /// Write inline traits, or a reference to traits written before
    fn write_amf3_traits(&mut self, traits: &Traits) -> Result<()> {
        let (index, present) = self.amf3.traits.lookup_or_insert(traits);
        if present {
            if index > (U29_MAX >> 2) as usize {
                return Err(Error::constraint(format!(
                    "trait reference {} is too large",
                    index
                )));
            }
            // U29O-traits-ref: object inline, traits by reference
            return self.sink.write_u29(((index as u32) << 2) | 0b01);
        }

        if traits.members.len() > (U29_MAX >> 4) as usize {
            return Err(Error::constraint(format!(
                "class {} has too many sealed members ({})",
                traits.class_name,
                traits.members.len()
            )));
        }
        let header = ((traits.members.len() as u32) << 4)
            | ((traits.dynamic as u32) << 3)
            | ((traits.externalizable as u32) << 2)
            | 0b011;
        self.sink.write_u29(header)?;
        self.write_amf3_utf8(&traits.class_name)?;
        for member in &traits.members {
            self.write_amf3_utf8(member)?;
        }
        Ok(())
    }

    /// Write name/value pairs; the caller writes the terminator
    fn write_amf3_pairs(&mut self, pairs: &[(String, AmfValue)]) -> Result<()> {
        for (name, value) in pairs {
            if name.is_empty() {
                return Err(Error::constraint(
                    "empty member name would terminate the member list",
                ));
            }
            self.write_amf3_utf8(name)?;
            self.encode(value)?;
        }
        Ok(())
    }
}
