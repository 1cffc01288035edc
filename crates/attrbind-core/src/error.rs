//! Error types for registration, persistence and rendering.
//!
//! ## Error Hierarchy
//!
//! ```text
//! BindingError (top-level wrapper)
//! ├── RegistrationError - duplicate or malformed declarations
//! ├── SnapshotError     - reading/writing persisted stores
//! ├── RenderError       - call expression rendering
//! └── Config            - configuration loading
//! ```
//!
//! Resolution itself never fails: an unresolved setter degrades to a fallback
//! call and is reported through [`Diagnostics`](crate::Diagnostics).

use thiserror::Error;

use crate::Location;

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while adding declarations to a store.
///
/// A failed declaration is dropped; the rest of the round proceeds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// An adapter with the same attribute, view type and value type was
    /// already declared this round.
    #[error("duplicate binding adapter for '{attribute}' on ({view_type}, {value_type}): {method}")]
    DuplicateAdapter {
        attribute: String,
        view_type: String,
        value_type: String,
        method: String,
    },

    /// A multi-attribute adapter with an equal key was already declared this round.
    #[error("duplicate multi-attribute binding adapter for {attributes:?} on {view_type}: {method}")]
    DuplicateMultiAttributeAdapter {
        attributes: Vec<String>,
        view_type: String,
        method: String,
    },

    /// The declaration is structurally invalid.
    #[error(transparent)]
    Malformed(#[from] MalformedDeclaration),
}

impl RegistrationError {
    /// Location of the offending declaration, when known.
    pub fn location(&self) -> Option<&Location> {
        match self {
            RegistrationError::Malformed(malformed) => Some(&malformed.location),
            _ => None,
        }
    }
}

/// A declaration with the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {reason}")]
pub struct MalformedDeclaration {
    pub location: Location,
    pub reason: String,
}

impl MalformedDeclaration {
    pub fn new(location: Location, reason: impl Into<String>) -> Self {
        Self {
            location,
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Snapshot Errors
// ============================================================================

/// Errors reading or writing a persisted store.
///
/// When loading dependency snapshots these are logged and the snapshot is
/// treated as empty.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The blob does not start with the snapshot magic bytes.
    #[error("not a setter store snapshot")]
    BadMagic,

    #[error("cannot decode snapshot: {0}")]
    Decode(String),

    #[error("cannot encode snapshot: {0}")]
    Encode(String),
}

// ============================================================================
// Render Errors
// ============================================================================

/// Errors rendering a call expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The number of value expressions does not match the call.
    #[error("call to {call} needs {expected} value(s), received {found}")]
    ArityMismatch {
        call: String,
        expected: usize,
        found: usize,
    },
}

// ============================================================================
// Top-level
// ============================================================================

/// Any error produced by the binding engine.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("configuration error: {0}")]
    Config(String),
}
