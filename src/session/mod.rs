//! Serialization sessions
//!
//! A session owns everything one `serialize` call mutates:
//! - the output sink
//! - the AMF3 string, trait and object tables, and the AMF0 reference table
//! - the nesting depth counter
//! - its lifecycle state
//!
//! Sessions are never reused; every call starts from a fresh one.

pub mod context;
pub mod state;

pub use context::Session;
pub use state::SessionState;
