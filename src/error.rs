//! Error types for the Gatesim logic simulator.
//!
//! This module provides a unified error type [`GatesimError`] that covers
//! all error conditions that can occur while wiring a circuit, propagating
//! signals, and decoding a saved project.

use thiserror::Error;

use crate::circuit::{ComponentId, ConnectorRef, Direction};

/// Result type alias using [`GatesimError`].
pub type Result<T> = std::result::Result<T, GatesimError>;

/// Unified error type for all Gatesim operations.
#[derive(Error, Debug)]
pub enum GatesimError {
    // ============ Wiring Errors ============
    /// Both endpoints of a wire have the same direction
    #[error("Cannot wire {from} to {to}: both endpoints are {direction} connectors")]
    SameDirection {
        from: ConnectorRef,
        to: ConnectorRef,
        direction: Direction,
    },

    /// The destination input already has a driver
    #[error("Input {dest} is already connected")]
    InputAlreadyConnected { dest: ConnectorRef },

    /// A wire would connect a component to itself
    #[error("Cannot wire component {component} to itself")]
    SelfLoop { component: ComponentId },

    /// Component index out of range
    #[error("Component {component} not found")]
    ComponentNotFound { component: ComponentId },

    /// Connector reference does not address an existing connector
    #[error("Connector {connector} not found")]
    ConnectorNotFound { connector: ConnectorRef },

    /// Line index out of range
    #[error("Line {line} not found")]
    LineNotFound { line: usize },

    /// Attempt to drive a component that is not a primitive source
    #[error("Component {component} ({kind}) is not an input source")]
    NotASource {
        component: ComponentId,
        kind: &'static str,
    },

    /// Bit index beyond a component's width
    #[error("Bit {bit} out of range for component {component} (width {width})")]
    BitOutOfRange {
        component: ComponentId,
        bit: usize,
        width: usize,
    },

    /// Palette template index out of range
    #[error("Block template {index} not found in palette")]
    TemplateNotFound { index: usize },

    /// Block creation with nothing selected
    #[error("Cannot create a block from an empty selection")]
    EmptySelection,

    /// The same component appears twice in a block selection
    #[error("Component {component} selected more than once")]
    DuplicateSelection { component: ComponentId },

    /// No component carries the requested label
    #[error("No component labelled '{label}'")]
    LabelNotFound { label: String },

    // ============ Propagation Errors ============
    /// Propagation recursed past the configured bound (wiring cycle)
    #[error("Propagation exceeded depth {max_depth} - circuit likely contains a feedback loop")]
    PropagationOverflow { max_depth: usize },

    /// Truth table enumeration would be too large
    #[error("Truth table needs {bits} input bits (limit is {max})")]
    TooManyInputs { bits: usize, max: usize },

    // ============ Decode Errors ============
    /// Stream ended before a record was complete
    #[error("Unexpected end of project data at byte {offset} (needed {needed} more bytes)")]
    UnexpectedEof { offset: usize, needed: usize },

    /// Stream does not start with the project magic
    #[error("Invalid project magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },

    /// Format version this build cannot read
    #[error("Unsupported project format version {version}")]
    UnsupportedVersion { version: u16 },

    /// Unknown component type tag
    #[error("Unknown component tag {tag} at byte {offset}")]
    UnknownComponentTag { tag: u8, offset: usize },

    /// Unknown gate subtype
    #[error("Unknown gate kind {code} at byte {offset}")]
    UnknownGateKind { code: u8, offset: usize },

    /// Bus width other than 2, 4 or 8
    #[error("Invalid bus width {width} at byte {offset}")]
    InvalidBusWidth { width: u8, offset: usize },

    /// Direction byte other than IN/OUT
    #[error("Invalid connector direction {value} at byte {offset}")]
    InvalidDirection { value: u8, offset: usize },

    /// Label is not valid UTF-8
    #[error("Invalid UTF-8 label at byte {offset}")]
    InvalidUtf8 { offset: usize },

    /// Record is internally inconsistent
    #[error("Malformed project record: {message}")]
    MalformedRecord { message: String },

    /// Data left over after the last record
    #[error("{count} trailing bytes after project data")]
    TrailingBytes { count: usize },

    /// Blocks nested deeper than the decoder accepts
    #[error("Block nesting exceeds {max} levels")]
    NestingTooDeep { max: usize },

    // ============ I/O Errors ============
    /// Error reading a project file
    #[error("Failed to read project file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a project file
    #[error("Failed to write project file '{path}': {source}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl GatesimError {
    /// Create a malformed record error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            message: message.into(),
        }
    }

    /// Create a connector-not-found error
    pub fn connector_not_found(connector: ConnectorRef) -> Self {
        Self::ConnectorNotFound { connector }
    }

    /// Create a component-not-found error
    pub fn component_not_found(component: ComponentId) -> Self {
        Self::ComponentNotFound { component }
    }

    /// Whether this error came from decoding project data.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEof { .. }
                | Self::InvalidMagic { .. }
                | Self::UnsupportedVersion { .. }
                | Self::UnknownComponentTag { .. }
                | Self::UnknownGateKind { .. }
                | Self::InvalidBusWidth { .. }
                | Self::InvalidDirection { .. }
                | Self::InvalidUtf8 { .. }
                | Self::MalformedRecord { .. }
                | Self::TrailingBytes { .. }
                | Self::NestingTooDeep { .. }
        )
    }
}
