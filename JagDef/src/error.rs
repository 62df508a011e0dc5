//! Error types for `JagDef`

use thiserror::Error;

use crate::definitions::DefinitionKind;

/// The error type for `JagDef` operations.
///
/// Most failures in this crate degrade silently (a definition renders as its
/// default, a morph resolves to "no override"); the variants below are what
/// surfaces when a caller asks for the failure explicitly.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from the underlying byte reader or writer.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Codec Errors ====================
    /// A read requested more bytes than the record has left.
    #[error("out of data: needed {needed} bytes at offset {offset}, {remaining} remaining")]
    OutOfData {
        /// Cursor position when the read was attempted.
        offset: usize,
        /// Width of the requested read.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    // ==================== Record Errors ====================
    /// The record contains an opcode the decoder for its kind does not know.
    #[error("{kind} {id}: unrecognised opcode {opcode} (after {last_opcode:?})")]
    UnknownOpcode {
        /// Kind of record being decoded.
        kind: DefinitionKind,
        /// Id of the record being decoded.
        id: u32,
        /// The unrecognised opcode.
        opcode: u8,
        /// The last opcode that decoded successfully, if any.
        last_opcode: Option<u8>,
    },

    /// The record stopped decoding partway through an opcode payload.
    #[error("malformed {kind} {id} at opcode {opcode}: {message}")]
    MalformedRecord {
        /// Kind of record being decoded.
        kind: DefinitionKind,
        /// Id of the record being decoded.
        id: u32,
        /// Opcode whose payload could not be read.
        opcode: u8,
        /// Description of the underlying read failure.
        message: String,
    },

    // ==================== Readiness Errors ====================
    /// Geometry for an object stayed missing past the retry limit.
    #[error("object {id} (type {model_type}): geometry still missing after {attempts} polls")]
    ReadinessExhausted {
        /// Object definition id.
        id: u32,
        /// Requested model type.
        model_type: i32,
        /// Number of consecutive unsatisfied polls.
        attempts: u32,
    },

    // ==================== Configuration Errors ====================
    /// Engine configuration failed validation.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// The validation error message.
        message: String,
    },
}

/// A specialized Result type for `JagDef` operations.
pub type Result<T> = std::result::Result<T, Error>;
