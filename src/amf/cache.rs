//! Reference tables
//!
//! AMF3 keeps three independent tables: strings (by content), traits (by
//! shape) and objects (by identity). AMF0 keeps one table of objects and
//! arrays, also by identity. Indices are handed out in first-seen order and
//! never change.

use std::collections::HashMap;
use std::hash::Hash;

use crate::amf::value::AmfValue;

/// Class-shape descriptor of a serialized object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Traits {
    /// AS class name, empty for anonymous objects
    pub class_name: String,
    /// Whether the object may carry members beyond `members`
    pub dynamic: bool,
    /// Externalizable objects write their own body
    pub externalizable: bool,
    /// Sealed member names in declaration order
    pub members: Vec<String>,
}

impl Traits {
    /// Traits shared by every anonymous object
    pub fn anonymous() -> Self {
        Self {
            class_name: String::new(),
            dynamic: true,
            externalizable: false,
            members: Vec::new(),
        }
    }
}

/// Insertion-ordered key -> index table
#[derive(Debug)]
struct IndexTable<K> {
    indices: HashMap<K, usize>,
    next: usize,
}

impl<K: Eq + Hash> IndexTable<K> {
    fn new() -> Self {
        Self {
            indices: HashMap::new(),
            next: 0,
        }
    }

    fn get(&self, key: &K) -> Option<usize> {
        self.indices.get(key).copied()
    }

    fn insert(&mut self, key: K) -> usize {
        let index = self.take_index();
        self.indices.insert(key, index);
        index
    }

    fn take_index(&mut self) -> usize {
        let index = self.next;
        self.next += 1;
        index
    }
}

/// String table, keyed by content
///
/// The empty string is never cached.
#[derive(Debug)]
pub struct StringCache {
    table: IndexTable<String>,
}

impl StringCache {
    pub fn new() -> Self {
        Self {
            table: IndexTable::new(),
        }
    }

    /// Returns `(index, was_present)`, or `None` for the empty string
    pub fn lookup_or_insert(&mut self, s: &str) -> Option<(usize, bool)> {
        if s.is_empty() {
            return None;
        }
        match self.table.indices.get(s).copied() {
            Some(index) => Some((index, true)),
            None => Some((self.table.insert(s.to_owned()), false)),
        }
    }

    pub fn len(&self) -> usize {
        self.table.next
    }

    pub fn is_empty(&self) -> bool {
        self.table.next == 0
    }
}

impl Default for StringCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait table, keyed by class name, dynamic flag and member sequence
#[derive(Debug)]
pub struct TraitCache {
    table: IndexTable<Traits>,
}

impl TraitCache {
    pub fn new() -> Self {
        Self {
            table: IndexTable::new(),
        }
    }

    /// Returns `(index, was_present)`
    pub fn lookup_or_insert(&mut self, traits: &Traits) -> (usize, bool) {
        match self.table.get(traits) {
            Some(index) => (index, true),
            None => (self.table.insert(traits.clone()), false),
        }
    }

    pub fn len(&self) -> usize {
        self.table.next
    }

    pub fn is_empty(&self) -> bool {
        self.table.next == 0
    }
}

impl Default for TraitCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Object table, keyed by identity token
///
/// Used for the AMF3 object table and for the AMF0 reference table. Every
/// tabled value is held until the cache is dropped, so an address in the
/// table cannot be freed and handed to a different value mid-session.
#[derive(Debug)]
pub struct ObjectCache {
    table: IndexTable<usize>,
    held: Vec<AmfValue>,
}

impl ObjectCache {
    pub fn new() -> Self {
        Self {
            table: IndexTable::new(),
            held: Vec::new(),
        }
    }

    /// Returns `(index, was_present)`, or `None` for values without identity
    pub fn lookup_or_insert(&mut self, value: &AmfValue) -> Option<(usize, bool)> {
        let identity = value.identity()?;
        match self.table.get(&identity) {
            Some(index) => Some((index, true)),
            None => {
                self.held.push(value.clone());
                Some((self.table.insert(identity), false))
            }
        }
    }

    /// Take an index for a value the reader tables but that has no identity
    pub fn reserve(&mut self) -> usize {
        self.table.take_index()
    }

    pub fn len(&self) -> usize {
        self.table.next
    }

    pub fn is_empty(&self) -> bool {
        self.table.next == 0
    }
}

impl Default for ObjectCache {
    fn default() -> Self {
        Self::new()
    }
}

/// The three AMF3 tables of one AMF3 context
#[derive(Debug, Default)]
pub struct Amf3Caches {
    pub strings: StringCache,
    pub traits: TraitCache,
    pub objects: ObjectCache,
}
