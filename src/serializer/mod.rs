//! Serializer entry points
//!
//! [`Serializer`] holds the configuration and class mapper; it has no
//! per-call state and can be reused for any number of calls. Each call runs
//! in its own [`Session`], so no reference table outlives the call that
//! built it.

pub mod config;

use bytes::Bytes;

use crate::amf::value::AmfValue;
use crate::amf::version::AmfVersion;
use crate::class_mapping::{ClassMapper, ClassMapping};
use crate::error::Result;
use crate::session::Session;

pub use config::SerializerConfig;

/// Reusable AMF serializer
pub struct Serializer<M = ClassMapping> {
    config: SerializerConfig,
    mapper: M,
}

impl Serializer<ClassMapping> {
    /// Serializer with default configuration and an empty class mapping
    pub fn new() -> Self {
        Self::with_mapper(SerializerConfig::default(), ClassMapping::new())
    }
}

impl Default for Serializer<ClassMapping> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ClassMapper> Serializer<M> {
    /// Serializer with explicit configuration and class mapper
    pub fn with_mapper(config: SerializerConfig, mapper: M) -> Self {
        Self { config, mapper }
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Encode one value
    ///
    /// Either the complete encoding is returned or an error; output is never
    /// partial.
    pub fn serialize(&self, version: AmfVersion, value: &AmfValue) -> Result<Bytes> {
        self.serialize_all(version, std::slice::from_ref(value))
    }

    /// Encode several top-level values back to back in one session
    ///
    /// Under AMF3 the values share reference tables, as the values of an RTMP
    /// command body do.
    pub fn serialize_all(&self, version: AmfVersion, values: &[AmfValue]) -> Result<Bytes> {
        self.config.validate()?;
        tracing::trace!(version = %version, values = values.len(), "Serializing");

        let mut session = Session::new(version, &self.config, &self.mapper);
        for value in values {
            session.write_value(value)?;
        }
        session.finish()
    }
}

/// Encode one value with the default configuration and class mapping
pub fn serialize(version: AmfVersion, value: &AmfValue) -> Result<Bytes> {
    Serializer::new().serialize(version, value)
}
