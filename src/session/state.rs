//! Session lifecycle

/// Lifecycle of one serialization session
///
/// ```text
/// Fresh -> Encoding -> Done
///              \-----> Failed
/// ```
///
/// `Done` and `Failed` are terminal. A failed session has already dropped
/// its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Caches empty, depth 0, nothing written
    Fresh,
    /// At least one value is being or has been written
    Encoding,
    /// Output handed to the caller
    Done,
    /// An error aborted the session
    Failed,
}

impl SessionState {
    /// Whether more values may still be written
    pub fn is_writable(&self) -> bool {
        matches!(self, SessionState::Fresh | SessionState::Encoding)
    }

    /// Whether the session has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Done | SessionState::Failed)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Fresh
    }
}
