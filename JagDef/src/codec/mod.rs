//! Primitive record codec
//!
//! Forward-only big-endian reads over an immutable record buffer, plus the
//! matching writer. Both understand the two variable-width integer forms used
//! by definition records:
//!
//! - **smart**: one byte when the high bit is clear, otherwise two bytes
//!   biased by `0x8000` (unsigned) or `0xC000` (signed).
//! - **wide id**: two bytes when the sign bit of the first byte is clear, with
//!   `0x7FFF` meaning "absent", otherwise four bytes with the sign bit masked
//!   off.

pub mod reader;
pub mod writer;

pub use reader::ByteCursor;
pub use writer::RecordWriter;

/// Two-byte wide id value that encodes "no id".
pub const WIDE_ID_ABSENT: u16 = 0x7FFF;

/// Largest id the two-byte wide id form can carry.
pub const WIDE_ID_SHORT_MAX: u32 = 0x7FFE;
