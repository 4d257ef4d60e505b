//! Reference AMF0/AMF3 reader used by the tests
//!
//! Decodes a byte stream into a plain tree and keeps the reader-side
//! reference tables, so tests can check both the values and the table
//! bookkeeping the encoder must agree with.

use bytes::{Buf, Bytes};
use std::fmt;

use crate::amf::{amf0, amf3};

/// Maximum nesting depth accepted by the reader
const MAX_NESTING_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum ReadError {
    UnknownMarker(u8),
    UnexpectedEof,
    InvalidUtf8,
    InvalidReference(usize),
    NestingTooDeep,
    InvalidObjectEnd,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Decoded value
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Null,
    Undefined,
    Boolean(bool),
    Integer(i32),
    Number(f64),
    String(String),
    Date(f64),
    ByteArray(Vec<u8>),
    Xml(String),
    XmlDocument(String),
    Array(Vec<Decoded>),
    EcmaArray(Vec<(String, Decoded)>),
    Object {
        class_name: String,
        members: Vec<(String, Decoded)>,
        dynamic_members: Vec<(String, Decoded)>,
    },
    /// Reference to a table entry still being decoded (a cycle)
    Cycle(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadTraits {
    pub class_name: String,
    pub dynamic: bool,
    pub members: Vec<String>,
}

/// AMF3 reader with its three reference tables
#[derive(Default)]
pub struct Amf3Reader {
    pub strings: Vec<String>,
    pub traits: Vec<ReadTraits>,
    pub objects: Vec<Option<Decoded>>,
    depth: usize,
}

impl Amf3Reader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&mut self, buf: &mut Bytes) -> Result<Decoded, ReadError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ReadError::NestingTooDeep);
        }
        let marker = read_u8(buf)?;
        let result = self.read_value(marker, buf);
        self.depth -= 1;
        result
    }

    fn read_value(&mut self, marker: u8, buf: &mut Bytes) -> Result<Decoded, ReadError> {
        match marker {
            amf3::MARKER_UNDEFINED => Ok(Decoded::Undefined),
            amf3::MARKER_NULL => Ok(Decoded::Null),
            amf3::MARKER_FALSE => Ok(Decoded::Boolean(false)),
            amf3::MARKER_TRUE => Ok(Decoded::Boolean(true)),
            amf3::MARKER_INTEGER => {
                let n = read_u29(buf)?;
                // sign-extend from 29 bits
                Ok(Decoded::Integer(((n << 3) as i32) >> 3))
            }
            amf3::MARKER_DOUBLE => Ok(Decoded::Number(read_f64(buf)?)),
            amf3::MARKER_STRING => Ok(Decoded::String(self.read_utf8(buf)?)),
            amf3::MARKER_XML_DOC | amf3::MARKER_XML | amf3::MARKER_BYTE_ARRAY => {
                let header = read_u29(buf)? as usize;
                if header & 1 == 0 {
                    return self.object_ref(header >> 1);
                }
                let raw = read_bytes(buf, header >> 1)?;
                let value = match marker {
                    amf3::MARKER_BYTE_ARRAY => Decoded::ByteArray(raw),
                    amf3::MARKER_XML => Decoded::Xml(utf8(raw)?),
                    _ => Decoded::XmlDocument(utf8(raw)?),
                };
                self.objects.push(Some(value.clone()));
                Ok(value)
            }
            amf3::MARKER_DATE => {
                let header = read_u29(buf)? as usize;
                if header & 1 == 0 {
                    return self.object_ref(header >> 1);
                }
                let value = Decoded::Date(read_f64(buf)?);
                self.objects.push(Some(value.clone()));
                Ok(value)
            }
            amf3::MARKER_ARRAY => self.read_array(buf),
            amf3::MARKER_OBJECT => self.read_object(buf),
            other => Err(ReadError::UnknownMarker(other)),
        }
    }

    fn object_ref(&self, index: usize) -> Result<Decoded, ReadError> {
        match self.objects.get(index) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => Ok(Decoded::Cycle(index)),
            None => Err(ReadError::InvalidReference(index)),
        }
    }

    fn read_array(&mut self, buf: &mut Bytes) -> Result<Decoded, ReadError> {
        let header = read_u29(buf)? as usize;
        if header & 1 == 0 {
            return self.object_ref(header >> 1);
        }
        let count = header >> 1;
        let index = self.objects.len();
        self.objects.push(None);

        let mut named = Vec::new();
        loop {
            let key = self.read_utf8(buf)?;
            if key.is_empty() {
                break;
            }
            named.push((key, self.read(buf)?));
        }
        let mut dense = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            dense.push(self.read(buf)?);
        }

        let value = if named.is_empty() {
            Decoded::Array(dense)
        } else {
            Decoded::EcmaArray(named)
        };
        self.objects[index] = Some(value.clone());
        Ok(value)
    }

    fn read_object(&mut self, buf: &mut Bytes) -> Result<Decoded, ReadError> {
        let header = read_u29(buf)? as usize;
        if header & 1 == 0 {
            return self.object_ref(header >> 1);
        }
        let traits = if header & 0b10 == 0 {
            let index = header >> 2;
            self.traits
                .get(index)
                .cloned()
                .ok_or(ReadError::InvalidReference(index))?
        } else {
            let dynamic = header & 0b1000 != 0;
            let count = header >> 4;
            let class_name = self.read_utf8(buf)?;
            let mut members = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                members.push(self.read_utf8(buf)?);
            }
            let traits = ReadTraits {
                class_name,
                dynamic,
                members,
            };
            self.traits.push(traits.clone());
            traits
        };

        let index = self.objects.len();
        self.objects.push(None);

        let mut members = Vec::with_capacity(traits.members.len());
        for name in &traits.members {
            members.push((name.clone(), self.read(buf)?));
        }
        let mut dynamic_members = Vec::new();
        if traits.dynamic {
            loop {
                let key = self.read_utf8(buf)?;
                if key.is_empty() {
                    break;
                }
                dynamic_members.push((key, self.read(buf)?));
            }
        }

        let value = Decoded::Object {
            class_name: traits.class_name,
            members,
            dynamic_members,
        };
        self.objects[index] = Some(value.clone());
        Ok(value)
    }

    fn read_utf8(&mut self, buf: &mut Bytes) -> Result<String, ReadError> {
        let header = read_u29(buf)? as usize;
        if header & 1 == 0 {
            let index = header >> 1;
            return self
                .strings
                .get(index)
                .cloned()
                .ok_or(ReadError::InvalidReference(index));
        }
        let s = utf8(read_bytes(buf, header >> 1)?)?;
        if !s.is_empty() {
            self.strings.push(s.clone());
        }
        Ok(s)
    }
}

/// AMF0 reader with its reference table
#[derive(Default)]
pub struct Amf0Reader {
    pub references: Vec<Option<Decoded>>,
    depth: usize,
}

impl Amf0Reader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&mut self, buf: &mut Bytes) -> Result<Decoded, ReadError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ReadError::NestingTooDeep);
        }
        let marker = read_u8(buf)?;
        let result = self.read_value(marker, buf);
        self.depth -= 1;
        result
    }

    fn read_value(&mut self, marker: u8, buf: &mut Bytes) -> Result<Decoded, ReadError> {
        match marker {
            amf0::MARKER_NUMBER => Ok(Decoded::Number(read_f64(buf)?)),
            amf0::MARKER_BOOLEAN => Ok(Decoded::Boolean(read_u8(buf)? != 0)),
            amf0::MARKER_STRING => Ok(Decoded::String(read_utf8_short(buf)?)),
            amf0::MARKER_LONG_STRING => {
                let len = read_u32(buf)? as usize;
                Ok(Decoded::String(utf8(read_bytes(buf, len)?)?))
            }
            amf0::MARKER_NULL => Ok(Decoded::Null),
            amf0::MARKER_UNDEFINED => Ok(Decoded::Undefined),
            amf0::MARKER_REFERENCE => {
                let index = read_u16(buf)? as usize;
                match self.references.get(index) {
                    Some(Some(value)) => Ok(value.clone()),
                    Some(None) => Ok(Decoded::Cycle(index)),
                    None => Err(ReadError::InvalidReference(index)),
                }
            }
            amf0::MARKER_OBJECT => {
                let index = self.table();
                let members = self.read_properties(buf)?;
                self.fill(
                    index,
                    Decoded::Object {
                        class_name: String::new(),
                        members: Vec::new(),
                        dynamic_members: members,
                    },
                )
            }
            amf0::MARKER_TYPED_OBJECT => {
                let class_name = read_utf8_short(buf)?;
                let index = self.table();
                let members = self.read_properties(buf)?;
                self.fill(
                    index,
                    Decoded::Object {
                        class_name,
                        members,
                        dynamic_members: Vec::new(),
                    },
                )
            }
            amf0::MARKER_ECMA_ARRAY => {
                let _count = read_u32(buf)?;
                let index = self.table();
                let members = self.read_properties(buf)?;
                self.fill(index, Decoded::EcmaArray(members))
            }
            amf0::MARKER_STRICT_ARRAY => {
                let count = read_u32(buf)? as usize;
                let index = self.table();
                let mut elements = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    elements.push(self.read(buf)?);
                }
                self.fill(index, Decoded::Array(elements))
            }
            amf0::MARKER_DATE => {
                let timestamp = read_f64(buf)?;
                let _timezone = read_u16(buf)?;
                Ok(Decoded::Date(timestamp))
            }
            amf0::MARKER_XML_DOCUMENT => {
                let len = read_u32(buf)? as usize;
                Ok(Decoded::XmlDocument(utf8(read_bytes(buf, len)?)?))
            }
            amf0::MARKER_AVMPLUS => Amf3Reader::new().read(buf),
            other => Err(ReadError::UnknownMarker(other)),
        }
    }

    fn table(&mut self) -> usize {
        self.references.push(None);
        self.references.len() - 1
    }

    fn fill(&mut self, index: usize, value: Decoded) -> Result<Decoded, ReadError> {
        self.references[index] = Some(value.clone());
        Ok(value)
    }

    fn read_properties(&mut self, buf: &mut Bytes) -> Result<Vec<(String, Decoded)>, ReadError> {
        let mut props = Vec::new();
        loop {
            let key = read_utf8_short(buf)?;
            if key.is_empty() {
                if read_u8(buf)? != amf0::MARKER_OBJECT_END {
                    return Err(ReadError::InvalidObjectEnd);
                }
                return Ok(props);
            }
            props.push((key, self.read(buf)?));
        }
    }
}

/// Decode every top-level AMF3 value, returning the reader for inspection
pub fn read_all_amf3(data: &[u8]) -> Result<(Vec<Decoded>, Amf3Reader), ReadError> {
    let mut reader = Amf3Reader::new();
    let mut buf = Bytes::copy_from_slice(data);
    let mut values = Vec::new();
    while buf.has_remaining() {
        values.push(reader.read(&mut buf)?);
    }
    Ok((values, reader))
}

/// Decode every top-level AMF0 value
pub fn read_all_amf0(data: &[u8]) -> Result<Vec<Decoded>, ReadError> {
    let mut reader = Amf0Reader::new();
    let mut buf = Bytes::copy_from_slice(data);
    let mut values = Vec::new();
    while buf.has_remaining() {
        values.push(reader.read(&mut buf)?);
    }
    Ok(values)
}

fn read_u8(buf: &mut Bytes) -> Result<u8, ReadError> {
    if buf.is_empty() {
        return Err(ReadError::UnexpectedEof);
    }
    Ok(buf.get_u8())
}

fn read_u16(buf: &mut Bytes) -> Result<u16, ReadError> {
    if buf.remaining() < 2 {
        return Err(ReadError::UnexpectedEof);
    }
    Ok(buf.get_u16())
}

fn read_u32(buf: &mut Bytes) -> Result<u32, ReadError> {
    if buf.remaining() < 4 {
        return Err(ReadError::UnexpectedEof);
    }
    Ok(buf.get_u32())
}

fn read_f64(buf: &mut Bytes) -> Result<f64, ReadError> {
    if buf.remaining() < 8 {
        return Err(ReadError::UnexpectedEof);
    }
    Ok(buf.get_f64())
}

fn read_bytes(buf: &mut Bytes, len: usize) -> Result<Vec<u8>, ReadError> {
    if buf.remaining() < len {
        return Err(ReadError::UnexpectedEof);
    }
    Ok(buf.copy_to_bytes(len).to_vec())
}

fn read_utf8_short(buf: &mut Bytes) -> Result<String, ReadError> {
    let len = read_u16(buf)? as usize;
    utf8(read_bytes(buf, len)?)
}

fn utf8(raw: Vec<u8>) -> Result<String, ReadError> {
    String::from_utf8(raw).map_err(|_| ReadError::InvalidUtf8)
}

fn read_u29(buf: &mut Bytes) -> Result<u32, ReadError> {
    let mut result: u32 = 0;
    for _ in 0..3 {
        let b = read_u8(buf)?;
        if b & 0x80 == 0 {
            return Ok((result << 7) | b as u32);
        }
        result = (result << 7) | (b & 0x7F) as u32;
    }
    // Fourth byte contributes all 8 bits
    Ok((result << 8) | read_u8(buf)? as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u29_matches_layout() {
        let mut buf = Bytes::from_static(&[0x81, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(read_u29(&mut buf).unwrap(), 0x80);
        assert_eq!(read_u29(&mut buf).unwrap(), 0x1FFF_FFFF);
    }

    #[test]
    fn test_negative_integer() {
        let (values, _) = read_all_amf3(&[0x04, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(values, vec![Decoded::Integer(-1)]);
    }

    #[test]
    fn test_truncated_input() {
        assert_eq!(read_all_amf0(&[0x00, 0x40]), Err(ReadError::UnexpectedEof));
        assert!(matches!(
            read_all_amf3(&[0x06, 0x02]),
            Err(ReadError::InvalidReference(1))
        ));
    }
}
