//! AMF0 encoder
//!
//! AMF0 is the original Action Message Format used in Flash/RTMP.
//! Reference: AMF0 File Format Specification (amf0-file-format-specification.pdf)
//!
//! Type Markers:
//! ```text
//! 0x00 - Number (IEEE 754 double)
//! 0x01 - Boolean
//! 0x02 - String (UTF-8, 16-bit length prefix)
//! 0x03 - Object (key-value pairs until 0x000009)
//! 0x04 - MovieClip (reserved, not supported)
//! 0x05 - Null
//! 0x06 - Undefined
//! 0x07 - Reference (16-bit index)
//! 0x08 - ECMA Array (associative array)
//! 0x09 - Object End (0x000009 sequence)
//! 0x0A - Strict Array (dense array)
//! 0x0B - Date (double + timezone)
//! 0x0C - Long String (UTF-8, 32-bit length prefix)
//! 0x0D - Unsupported
//! 0x0E - RecordSet (reserved, not supported)
//! 0x0F - XML Document
//! 0x10 - Typed Object (class name + properties)
//! 0x11 - AVM+ (switch to AMF3)
//! ```
//!
//! Objects, typed objects, ECMA arrays and strict arrays enter a single
//! reference table in the order they are first written. There is no string
//! or trait table.

use crate::amf::value::AmfValue;
use crate::error::{Error, Result};
use crate::session::Session;

// AMF0 type markers
pub const MARKER_NUMBER: u8 = 0x00;
pub const MARKER_BOOLEAN: u8 = 0x01;
pub const MARKER_STRING: u8 = 0x02;
pub const MARKER_OBJECT: u8 = 0x03;
pub const MARKER_NULL: u8 = 0x05;
pub const MARKER_UNDEFINED: u8 = 0x06;
pub const MARKER_REFERENCE: u8 = 0x07;
pub const MARKER_ECMA_ARRAY: u8 = 0x08;
pub const MARKER_OBJECT_END: u8 = 0x09;
pub const MARKER_STRICT_ARRAY: u8 = 0x0A;
pub const MARKER_DATE: u8 = 0x0B;
pub const MARKER_LONG_STRING: u8 = 0x0C;
pub const MARKER_XML_DOCUMENT: u8 = 0x0F;
pub const MARKER_TYPED_OBJECT: u8 = 0x10;
pub const MARKER_AVMPLUS: u8 = 0x11;

impl Session<'_> {
    /// Encode a single AMF0 value
    pub(crate) fn write_amf0(&mut self, value: &AmfValue) -> Result<()> {
        match value {
            AmfValue::Null => self.sink.write_byte(MARKER_NULL),
            AmfValue::Undefined => self.sink.write_byte(MARKER_UNDEFINED),
            AmfValue::Boolean(b) => {
                self.sink.write_byte(MARKER_BOOLEAN)?;
                self.sink.write_byte(if *b { 1 } else { 0 })
            }
            AmfValue::Number(n) => {
                self.sink.write_byte(MARKER_NUMBER)?;
                self.sink.write_double(*n)
            }
            AmfValue::Integer(i) => {
                // AMF0 doesn't have integer type, encode as number
                self.sink.write_byte(MARKER_NUMBER)?;
                self.sink.write_double(*i as f64)
            }
            AmfValue::String(s) => {
                if s.len() > 0xFFFF {
                    let len = u32::try_from(s.len()).map_err(|_| {
                        Error::constraint(format!("string of {} bytes is too long", s.len()))
                    })?;
                    self.sink.write_byte(MARKER_LONG_STRING)?;
                    self.sink.write_u32(len)?;
                } else {
                    self.sink.write_byte(MARKER_STRING)?;
                    self.sink.write_u16(s.len() as u16)?;
                }
                self.sink.write_bytes(s.as_bytes())
            }
            AmfValue::Date(timestamp) => {
                self.sink.write_byte(MARKER_DATE)?;
                self.sink.write_double(*timestamp)?;
                self.sink.write_i16(0) // Timezone (deprecated)
            }
            AmfValue::Xml(xml) | AmfValue::XmlDocument(xml) => self.nested(|s| {
                let len = u32::try_from(xml.len())
                    .map_err(|_| Error::constraint("XML document is too long"))?;
                s.sink.write_byte(MARKER_XML_DOCUMENT)?;
                s.sink.write_u32(len)?;
                s.sink.write_bytes(xml.as_bytes())
            }),
            AmfValue::ByteArray(_) => {
                // No AMF0 type, switch to AMF3 for this value
                self.sink.write_byte(MARKER_AVMPLUS)?;
                self.with_amf3_context(|s| s.write_amf3(value))
            }
            AmfValue::Array(elements) => {
                if self.write_amf0_reference(value)? {
                    return Ok(());
                }
                let elements = elements.borrow();
                self.nested(|s| {
                    let count = u32::try_from(elements.len())
                        .map_err(|_| Error::constraint("array is too long"))?;
                    s.sink.write_byte(MARKER_STRICT_ARRAY)?;
                    s.sink.write_u32(count)?;
                    for element in elements.iter() {
                        s.encode(element)?;
                    }
                    Ok(())
                })
            }
            AmfValue::Map(props) => {
                if self.write_amf0_reference(value)? {
                    return Ok(());
                }
                let props = props.borrow();
                self.nested(|s| {
                    s.sink.write_byte(MARKER_OBJECT)?;
                    s.write_amf0_properties(&props)?;
                    s.write_amf0_object_end()
                })
            }
            AmfValue::EcmaArray(props) => {
                if self.write_amf0_reference(value)? {
                    return Ok(());
                }
                let props = props.borrow();
                self.nested(|s| {
                    let count = u32::try_from(props.len())
                        .map_err(|_| Error::constraint("ECMA array is too long"))?;
                    s.sink.write_byte(MARKER_ECMA_ARRAY)?;
                    s.sink.write_u32(count)?;
                    s.write_amf0_properties(&props)?;
                    s.write_amf0_object_end()
                })
            }
            AmfValue::Object(object) => {
                if self.write_amf0_reference(value)? {
                    return Ok(());
                }
                let mapped = self.map_object(object)?;
                self.nested(|s| {
                    s.sink.write_byte(MARKER_TYPED_OBJECT)?;
                    s.write_amf0_utf8(&mapped.class_name)?;
                    s.write_amf0_properties(&mapped.members)?;
                    s.write_amf0_properties(&mapped.dynamic_members)?;
                    s.write_amf0_object_end()
                })
            }
        }
    }

    /// Write a back-reference if the value was written before
    ///
    /// A value whose first index does not fit in 16 bits is written inline
    /// again and takes a fresh index, as the reader will table it again.
    fn write_amf0_reference(&mut self, value: &AmfValue) -> Result<bool> {
        let (index, present) = match self.amf0_refs.lookup_or_insert(value) {
            Some(entry) => entry,
            None => return Ok(false),
        };
        if !present {
            return Ok(false);
        }
        match u16::try_from(index) {
            Ok(index) => {
                self.sink.write_byte(MARKER_REFERENCE)?;
                self.sink.write_u16(index)?;
                Ok(true)
            }
            Err(_) => {
                self.amf0_refs.reserve();
                Ok(false)
            }
        }
    }

    fn write_amf0_properties(&mut self, props: &[(String, AmfValue)]) -> Result<()> {
        for (key, val) in props {
            if key.is_empty() {
                return Err(Error::constraint(
                    "empty property name would end the object",
                ));
            }
            self.write_amf0_utf8(key)?;
            self.encode(val)?;
        }
        Ok(())
    }

    fn write_amf0_object_end(&mut self) -> Result<()> {
        self.sink.write_u16(0)?; // Empty key
        self.sink.write_byte(MARKER_OBJECT_END)
    }

    /// Write UTF-8 string with 16-bit length prefix (no type marker)
    fn write_amf0_utf8(&mut self, s: &str) -> Result<()> {
        let len = u16::try_from(s.len()).map_err(|_| {
            Error::constraint(format!(
                "name of {} bytes does not fit a 16-bit length",
                s.len()
            ))
        })?;
        self.sink.write_u16(len)?;
        self.sink.write_bytes(s.as_bytes())
    }
}
