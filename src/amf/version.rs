//! AMF format versions

use std::convert::TryFrom;
use std::fmt;

use crate::error::Error;

/// Wire format selected for one serialization call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmfVersion {
    /// Original format: no compact integers, one reference table for
    /// objects and arrays
    Amf0 = 0,
    /// ActionScript 3.0 format: compact integers and separate string, trait
    /// and object reference tables
    Amf3 = 3,
}

impl TryFrom<u8> for AmfVersion {
    type Error = Error;

    fn try_from(v: u8) -> Result<Self, Error> {
        match v {
            0 => Ok(AmfVersion::Amf0),
            3 => Ok(AmfVersion::Amf3),
            other => Err(Error::UnsupportedVersion(other)),
        }
    }
}

impl fmt::Display for AmfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmfVersion::Amf0 => write!(f, "AMF0"),
            AmfVersion::Amf3 => write!(f, "AMF3"),
        }
    }
}
