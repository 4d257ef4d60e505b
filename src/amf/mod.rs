//! AMF (Action Message Format) encoding
//!
//! AMF is Adobe's binary serialization format, used by RTMP and Flash
//! Remoting to carry object graphs. This module holds the wire-level pieces
//! shared by both versions: the value model, the output sink, the reference
//! tables, and one encoder per version.
//!
//! AMF0 writes every value inline except objects and arrays seen before,
//! which get a 16-bit back-reference. AMF3 adds compact integers and three
//! reference tables (strings, traits, objects).

pub mod amf0;
pub mod amf3;
pub mod cache;
#[cfg(test)]
pub(crate) mod reader;
pub mod sink;
pub mod value;
pub mod version;

pub use cache::{Amf3Caches, ObjectCache, StringCache, TraitCache, Traits};
pub use sink::ByteSink;
pub use value::{AmfObject, AmfValue, ArrayRef, MapRef, ObjectRef, TypedObject};
pub use version::AmfVersion;
