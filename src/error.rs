//! Error types for splicewiz-native

use thiserror::Error;

/// Result type alias for splicewiz-native operations
pub type Result<T> = std::result::Result<T, SpliceWizError>;

/// Error types that can occur while marshalling, registering, or running natives
///
/// Only the marshalling and registration variants ever reach the host runtime.
/// Native routines report their own failures through their return values.
#[derive(Debug, Error)]
pub enum SpliceWizError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Compression/decompression error
    #[error("Compression error: {0}")]
    Compression(String),

    /// Boxed value has the wrong host type for the requested native type
    #[error("Not compatible with requested type: [type={found}; target={expected}]")]
    TypeMismatch {
        /// Native type the shim asked for
        expected: &'static str,
        /// Host type name of the boxed value
        found: &'static str,
    },

    /// Boxed value has the wrong length for a scalar parameter
    #[error("Expecting a single {expected} value: [extent={extent}]")]
    ExtentMismatch {
        /// Native type the shim asked for
        expected: &'static str,
        /// Length of the boxed vector
        extent: usize,
    },

    /// Wrong number of arguments for a registered routine
    #[error("Incorrect number of arguments ({got}), expecting {expected} for '{name}'")]
    ArityMismatch {
        /// Exported routine name
        name: String,
        /// Registered arity
        expected: usize,
        /// Number of arguments supplied
        got: usize,
    },

    /// Routine is neither registered nor resolvable dynamically
    #[error("native symbol '{0}' not found in the loaded module")]
    SymbolNotFound(String),

    /// Same exported name appears twice in a call table
    #[error("duplicate entry point '{0}' in call table")]
    DuplicateEntry(String),

    /// Operation not permitted in the current module state
    #[error("cannot {operation} a module in state {state}")]
    InvalidState {
        /// Attempted operation
        operation: &'static str,
        /// Current state name
        state: &'static str,
    },

    /// Native routine panicked; surfaced as a host error
    #[error("native routine '{name}' panicked: {message}")]
    NativePanic {
        /// Native routine name
        name: &'static str,
        /// Panic payload, when it was a string
        message: String,
    },

    /// Worker pool could not be built
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Malformed call table
    #[error("Invalid call table: {0}")]
    InvalidTable(String),
}
