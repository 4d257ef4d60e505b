//! AMF value types
//!
//! The serializer walks a graph of [`AmfValue`]s. Composite values live behind
//! `Rc` handles: the handle is what gives a value its identity for the
//! object reference tables, and `RefCell` lets a graph point back at itself.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to an ordered list
pub type ArrayRef = Rc<RefCell<Vec<AmfValue>>>;

/// Shared handle to an insertion-ordered string-keyed map
pub type MapRef = Rc<RefCell<Vec<(String, AmfValue)>>>;

/// Shared handle to a class-backed host object
pub type ObjectRef = Rc<dyn AmfObject>;

/// A host object that the class mapper may turn into a typed AMF object
pub trait AmfObject: Any {
    /// Kind reported in errors and used as the class mapping key
    fn type_name(&self) -> &str;

    /// Properties in declaration order
    fn properties(&self) -> Vec<(String, AmfValue)>;

    fn as_any(&self) -> &dyn Any;
}

/// Value graph accepted by the serializer
#[derive(Clone)]
pub enum AmfValue {
    /// Null value (AMF0: 0x05, AMF3: 0x01)
    Null,

    /// Undefined value (AMF0: 0x06, AMF3: 0x00)
    Undefined,

    /// Boolean value (AMF0: 0x01, AMF3: 0x02/0x03)
    Boolean(bool),

    /// Host integer. AMF3 writes it as a compact integer when it fits the
    /// 29-bit signed range and as a double otherwise.
    Integer(i64),

    /// IEEE 754 double-precision floating point (AMF0: 0x00, AMF3: 0x05)
    Number(f64),

    /// UTF-8 string (AMF0: 0x02/0x0C, AMF3: 0x06)
    String(String),

    /// Date value as milliseconds since Unix epoch
    /// (AMF0: 0x0B, AMF3: 0x08)
    Date(f64),

    /// Raw byte array (AMF3: 0x0C, AMF0 via the AVM+ marker)
    ByteArray(Rc<[u8]>),

    /// E4X XML (AMF0: 0x0F, AMF3: 0x0B)
    Xml(Rc<str>),

    /// Legacy XMLDocument (AMF0: 0x0F, AMF3: 0x07)
    XmlDocument(Rc<str>),

    /// Dense ordered list (AMF0: 0x0A, AMF3: 0x09)
    Array(ArrayRef),

    /// Anonymous key-value object (AMF0: 0x03, AMF3: 0x0A)
    Map(MapRef),

    /// Associative array (AMF0: 0x08, AMF3: 0x09 with only named entries)
    EcmaArray(MapRef),

    /// Class-backed object, shaped by the class mapper
    Object(ObjectRef),
}

impl AmfValue {
    /// Build an array value from its elements
    pub fn array(elements: Vec<AmfValue>) -> Self {
        AmfValue::Array(Rc::new(RefCell::new(elements)))
    }

    /// Build an anonymous object from ordered pairs
    pub fn map<K: Into<String>>(entries: Vec<(K, AmfValue)>) -> Self {
        AmfValue::Map(Rc::new(RefCell::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    /// Build an associative array from ordered pairs
    pub fn ecma_array<K: Into<String>>(entries: Vec<(K, AmfValue)>) -> Self {
        AmfValue::EcmaArray(Rc::new(RefCell::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    pub fn object<T: AmfObject>(object: T) -> Self {
        AmfValue::Object(Rc::new(object))
    }

    pub fn byte_array(bytes: impl Into<Rc<[u8]>>) -> Self {
        AmfValue::ByteArray(bytes.into())
    }

    pub fn xml(xml: &str) -> Self {
        AmfValue::Xml(Rc::from(xml))
    }

    pub fn xml_document(xml: &str) -> Self {
        AmfValue::XmlDocument(Rc::from(xml))
    }

    /// Name of this value's kind, as reported in errors
    pub fn kind(&self) -> &str {
        match self {
            AmfValue::Null => "null",
            AmfValue::Undefined => "undefined",
            AmfValue::Boolean(_) => "boolean",
            AmfValue::Integer(_) => "integer",
            AmfValue::Number(_) => "number",
            AmfValue::String(_) => "string",
            AmfValue::Date(_) => "date",
            AmfValue::ByteArray(_) => "byte array",
            AmfValue::Xml(_) => "xml",
            AmfValue::XmlDocument(_) => "xml document",
            AmfValue::Array(_) => "array",
            AmfValue::Map(_) => "map",
            AmfValue::EcmaArray(_) => "ecma array",
            AmfValue::Object(obj) => obj.type_name(),
        }
    }

    /// Identity token of a reference-eligible value
    ///
    /// Two values share a token only when they are the same allocation.
    /// Scalars and strings have no identity.
    pub fn identity(&self) -> Option<usize> {
        match self {
            AmfValue::Array(a) => Some(Rc::as_ptr(a) as *const () as usize),
            AmfValue::Map(m) | AmfValue::EcmaArray(m) => Some(Rc::as_ptr(m) as *const () as usize),
            AmfValue::Object(o) => Some(Rc::as_ptr(o) as *const () as usize),
            AmfValue::ByteArray(b) => Some(Rc::as_ptr(b) as *const u8 as usize),
            AmfValue::Xml(s) | AmfValue::XmlDocument(s) => Some(Rc::as_ptr(s) as *const u8 as usize),
            _ => None,
        }
    }

    /// Try to get this value as a string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AmfValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if this value is null or undefined
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, AmfValue::Null | AmfValue::Undefined)
    }
}

impl Default for AmfValue {
    fn default() -> Self {
        AmfValue::Null
    }
}

// Composite values may be cyclic, so Debug never descends into them.
impl fmt::Debug for AmfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmfValue::Null => write!(f, "Null"),
            AmfValue::Undefined => write!(f, "Undefined"),
            AmfValue::Boolean(b) => write!(f, "Boolean({})", b),
            AmfValue::Integer(i) => write!(f, "Integer({})", i),
            AmfValue::Number(n) => write!(f, "Number({})", n),
            AmfValue::String(s) => write!(f, "String({:?})", s),
            AmfValue::Date(ms) => write!(f, "Date({})", ms),
            AmfValue::ByteArray(b) => write!(f, "ByteArray(len={})", b.len()),
            AmfValue::Xml(s) => write!(f, "Xml(len={})", s.len()),
            AmfValue::XmlDocument(s) => write!(f, "XmlDocument(len={})", s.len()),
            AmfValue::Array(a) => write!(f, "Array(len={})", a.borrow().len()),
            AmfValue::Map(m) => write!(f, "Map(len={})", m.borrow().len()),
            AmfValue::EcmaArray(m) => write!(f, "EcmaArray(len={})", m.borrow().len()),
            AmfValue::Object(o) => write!(f, "Object({})", o.type_name()),
        }
    }
}

impl From<bool> for AmfValue {
    fn from(v: bool) -> Self {
        AmfValue::Boolean(v)
    }
}

impl From<f64> for AmfValue {
    fn from(v: f64) -> Self {
        AmfValue::Number(v)
    }
}

impl From<i32> for AmfValue {
    fn from(v: i32) -> Self {
        AmfValue::Integer(v as i64)
    }
}

impl From<i64> for AmfValue {
    fn from(v: i64) -> Self {
        AmfValue::Integer(v)
    }
}

impl From<u32> for AmfValue {
    fn from(v: u32) -> Self {
        AmfValue::Integer(v as i64)
    }
}

impl From<String> for AmfValue {
    fn from(v: String) -> Self {
        AmfValue::String(v)
    }
}

impl From<&str> for AmfValue {
    fn from(v: &str) -> Self {
        AmfValue::String(v.to_string())
    }
}

impl<V: Into<AmfValue>> From<Vec<V>> for AmfValue {
    fn from(v: Vec<V>) -> Self {
        AmfValue::array(v.into_iter().map(|x| x.into()).collect())
    }
}

impl<V: Into<AmfValue>> From<Option<V>> for AmfValue {
    fn from(v: Option<V>) -> Self {
        v.map_or(AmfValue::Null, Into::into)
    }
}

/// Ready-made class-backed object
///
/// Carries its own AS class name, dynamic flag and members, so it can be
/// serialized without registering a host type with the class mapping.
pub struct TypedObject {
    class_name: String,
    dynamic: bool,
    members: RefCell<Vec<(String, AmfValue)>>,
    dynamic_members: RefCell<Vec<(String, AmfValue)>>,
}

impl TypedObject {
    /// Create a sealed object of the given class
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            dynamic: false,
            members: RefCell::new(Vec::new()),
            dynamic_members: RefCell::new(Vec::new()),
        }
    }

    /// Create a dynamic object of the given class
    pub fn dynamic(class_name: impl Into<String>) -> Self {
        Self {
            dynamic: true,
            ..Self::new(class_name)
        }
    }

    /// Add a sealed member
    pub fn member(self, name: impl Into<String>, value: impl Into<AmfValue>) -> Self {
        self.members.borrow_mut().push((name.into(), value.into()));
        self
    }

    /// Add a dynamic member (only meaningful for dynamic objects)
    pub fn dynamic_member(self, name: impl Into<String>, value: impl Into<AmfValue>) -> Self {
        self.dynamic_members
            .borrow_mut()
            .push((name.into(), value.into()));
        self
    }

    /// Replace a sealed member's value after construction (used to close cycles)
    pub fn set(&self, name: &str, value: AmfValue) {
        let mut members = self.members.borrow_mut();
        match members.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => members.push((name.to_string(), value)),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Sealed members in declaration order
    pub fn members(&self) -> Vec<(String, AmfValue)> {
        self.members.borrow().clone()
    }

    pub fn dynamic_members(&self) -> Vec<(String, AmfValue)> {
        self.dynamic_members.borrow().clone()
    }
}

impl AmfObject for TypedObject {
    fn type_name(&self) -> &str {
        &self.class_name
    }

    fn properties(&self) -> Vec<(String, AmfValue)> {
        let mut props = self.members();
        props.extend(self.dynamic_members());
        props
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
