//! Class mapping
//!
//! The serializer never inspects host objects itself. For every
//! [`AmfValue::Object`] it asks a [`ClassMapper`] for the AS class name, the
//! dynamic flag and the ordered members. [`ClassMapping`] is the default
//! mapper: a registry from host type names to AS class names.

use std::collections::HashMap;

use crate::amf::value::{AmfObject, AmfValue, TypedObject};

/// Shape of a host object as it will appear on the wire
#[derive(Debug, Clone)]
pub struct MappedObject {
    /// AS class name; must be non-empty for class-backed objects
    pub class_name: String,
    /// Whether `dynamic_members` may be written
    pub dynamic: bool,
    /// Sealed members in declaration order
    pub members: Vec<(String, AmfValue)>,
    /// Members beyond the sealed set, written after them
    pub dynamic_members: Vec<(String, AmfValue)>,
}

/// Query interface the serializer uses to shape class-backed objects
///
/// Implementations must not have side effects; the serializer may ask about
/// the same object more than once across calls.
pub trait ClassMapper {
    /// Map a host object, or `None` when it has no AMF representation
    fn map_object(&self, object: &dyn AmfObject) -> Option<MappedObject>;
}

#[derive(Debug, Clone)]
struct Mapping {
    as_class: String,
    dynamic: bool,
}

/// Registry-based class mapper
///
/// Host types are identified by [`AmfObject::type_name`]. A [`TypedObject`]
/// maps to its own class name unless its type name is registered.
#[derive(Debug, Clone, Default)]
pub struct ClassMapping {
    by_type: HashMap<String, Mapping>,
}

impl ClassMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a host type to a sealed AS class
    pub fn map(mut self, as_class: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.insert(as_class.into(), type_name.into(), false);
        self
    }

    /// Map a host type to a dynamic AS class
    pub fn map_dynamic(mut self, as_class: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.insert(as_class.into(), type_name.into(), true);
        self
    }

    fn insert(&mut self, as_class: String, type_name: String, dynamic: bool) {
        self.by_type.insert(type_name, Mapping { as_class, dynamic });
    }

    /// AS class name registered for a host type
    pub fn as_class_name(&self, type_name: &str) -> Option<&str> {
        self.by_type.get(type_name).map(|m| m.as_class.as_str())
    }

    /// Drop every registered mapping
    pub fn reset(&mut self) {
        self.by_type.clear();
    }
}

impl ClassMapper for ClassMapping {
    fn map_object(&self, object: &dyn AmfObject) -> Option<MappedObject> {
        if let Some(mapping) = self.by_type.get(object.type_name()) {
            return Some(MappedObject {
                class_name: mapping.as_class.clone(),
                dynamic: mapping.dynamic,
                members: object.properties(),
                dynamic_members: Vec::new(),
            });
        }

        let typed = object.as_any().downcast_ref::<TypedObject>()?;
        Some(MappedObject {
            class_name: typed.class_name().to_string(),
            dynamic: typed.is_dynamic(),
            members: typed.members(),
            dynamic_members: typed.dynamic_members(),
        })
    }
}
