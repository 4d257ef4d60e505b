//! amf-serializer: AMF0/AMF3 encoding for object graphs
//!
//! This library turns a graph of [`AmfValue`]s into Action Message Format
//! bytes, the wire format Flash Remoting and RTMP use for commands and
//! metadata:
//! - AMF0 and AMF3 behind one entry point
//! - AMF3 string, trait and object reference tables
//! - AMF0 object/array back-references
//! - Cyclic graphs (through the reference tables) and a nesting ceiling
//! - Pluggable class mapping for host objects
//!
//! Every call is all-or-nothing: either the complete encoding is returned or
//! an error, never a partial buffer.
//!
//! # Example
//!
//! ```
//! use amf_serializer::{serialize, AmfValue, AmfVersion};
//!
//! let value = AmfValue::from(vec!["x", "x"]);
//! let bytes = serialize(AmfVersion::Amf3, &value).unwrap();
//!
//! // array header, inline "x", then a reference to string 0
//! assert_eq!(&bytes[..], &[0x09, 0x05, 0x01, 0x06, 0x03, b'x', 0x06, 0x00]);
//! ```
//!
//! # Example: class-backed objects
//!
//! ```
//! use amf_serializer::{AmfValue, AmfVersion, ClassMapping, Serializer, SerializerConfig};
//! use amf_serializer::amf::AmfObject;
//!
//! struct User {
//!     name: String,
//! }
//!
//! impl AmfObject for User {
//!     fn type_name(&self) -> &str {
//!         "app::User"
//!     }
//!
//!     fn properties(&self) -> Vec<(String, AmfValue)> {
//!         vec![("name".to_string(), self.name.as_str().into())]
//!     }
//!
//!     fn as_any(&self) -> &dyn std::any::Any {
//!         self
//!     }
//! }
//!
//! let mapping = ClassMapping::new().map("com.example.User", "app::User");
//! let serializer = Serializer::with_mapper(SerializerConfig::default(), mapping);
//!
//! let user = AmfValue::object(User { name: "ada".into() });
//! let bytes = serializer.serialize(AmfVersion::Amf0, &user).unwrap();
//! assert_eq!(bytes[0], 0x10); // typed object
//! ```

pub mod amf;
pub mod class_mapping;
pub mod error;
pub mod serializer;
pub mod session;

// Re-export main types for convenience
pub use amf::{AmfObject, AmfValue, AmfVersion, TypedObject};
pub use class_mapping::{ClassMapper, ClassMapping, MappedObject};
pub use error::{Error, Result};
pub use serializer::{serialize, Serializer, SerializerConfig};
pub use session::{Session, SessionState};
