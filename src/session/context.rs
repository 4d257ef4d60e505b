//! Session context and value dispatch

use bytes::Bytes;

use crate::amf::cache::{Amf3Caches, ObjectCache};
use crate::amf::sink::ByteSink;
use crate::amf::value::{AmfValue, ObjectRef};
use crate::amf::version::AmfVersion;
use crate::class_mapping::{ClassMapper, MappedObject};
use crate::error::{Error, Result};
use crate::serializer::config::SerializerConfig;
use crate::session::state::SessionState;

/// State of one serialization call
///
/// The encoders in [`crate::amf::amf0`] and [`crate::amf::amf3`] are
/// implemented as methods on this type; they reach nested values only through
/// [`Session::encode`], which tracks depth and picks the version.
pub struct Session<'a> {
    pub(crate) version: AmfVersion,
    pub(crate) sink: ByteSink,
    pub(crate) amf3: Amf3Caches,
    pub(crate) amf0_refs: ObjectCache,
    depth: usize,
    state: SessionState,
    mapper: &'a dyn ClassMapper,
    config: &'a SerializerConfig,
}

impl<'a> Session<'a> {
    /// Create a fresh session
    pub fn new(
        version: AmfVersion,
        config: &'a SerializerConfig,
        mapper: &'a dyn ClassMapper,
    ) -> Self {
        Self {
            version,
            sink: ByteSink::new(config.initial_capacity, config.max_output_len),
            amf3: Amf3Caches::default(),
            amf0_refs: ObjectCache::new(),
            depth: 0,
            state: SessionState::Fresh,
            mapper,
            config,
        }
    }

    pub fn version(&self) -> AmfVersion {
        self.version
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.sink.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sink.is_empty()
    }

    /// Write one top-level value
    ///
    /// Any error moves the session to `Failed` and drops everything written,
    /// including earlier top-level values.
    pub fn write_value(&mut self, value: &AmfValue) -> Result<()> {
        if !self.state.is_writable() {
            return Err(Error::constraint(format!(
                "session is {:?} and cannot accept more values",
                self.state
            )));
        }
        self.state = SessionState::Encoding;

        match self.encode(value) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Hand the output to the caller
    pub fn finish(mut self) -> Result<Bytes> {
        match self.state {
            SessionState::Fresh | SessionState::Encoding => {
                self.state = SessionState::Done;
                tracing::trace!(
                    version = %self.version,
                    bytes = self.sink.len(),
                    strings = self.amf3.strings.len(),
                    traits = self.amf3.traits.len(),
                    objects = self.amf3.objects.len(),
                    "Session finished"
                );
                Ok(self.sink.finish())
            }
            state => Err(Error::constraint(format!(
                "session is {:?} and has no output",
                state
            ))),
        }
    }

    fn fail(&mut self, error: &Error) {
        tracing::debug!(
            version = %self.version,
            depth = self.depth,
            error = %error,
            "Serialization failed"
        );
        self.state = SessionState::Failed;
        self.sink.discard();
    }

    /// Dispatch a value to the encoder of the session's current version
    pub(crate) fn encode(&mut self, value: &AmfValue) -> Result<()> {
        match self.version {
            AmfVersion::Amf0 => self.write_amf0(value),
            AmfVersion::Amf3 => self.write_amf3(value),
        }
    }

    /// Run `f` one nesting level deeper
    pub(crate) fn nested<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if self.depth >= self.config.max_depth {
            return Err(Error::DepthExceeded {
                max: self.config.max_depth,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Run `f` in a fresh AMF3 context, as AMF0's AVM+ marker requires
    pub(crate) fn with_amf3_context<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let outer_caches = std::mem::take(&mut self.amf3);
        let outer_version = std::mem::replace(&mut self.version, AmfVersion::Amf3);
        let result = f(self);
        self.version = outer_version;
        self.amf3 = outer_caches;
        result
    }

    /// Ask the class mapper for an object's shape and check it is usable
    pub(crate) fn map_object(&self, object: &ObjectRef) -> Result<MappedObject> {
        let type_name = object.type_name();
        let mapped = self
            .mapper
            .map_object(object.as_ref())
            .ok_or_else(|| Error::UnsupportedType(type_name.to_string()))?;

        if mapped.class_name.is_empty() {
            return Err(Error::constraint(format!(
                "{} is mapped as a typed object without a class name",
                type_name
            )));
        }
        if !mapped.dynamic && !mapped.dynamic_members.is_empty() {
            return Err(Error::constraint(format!(
                "sealed class {} reports dynamic members",
                mapped.class_name
            )));
        }
        Ok(mapped)
    }
}
