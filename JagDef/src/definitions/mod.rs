//! Opcode-tagged definition records
//!
//! Every definition kind shares one framing: a run of `(opcode: u8, payload)`
//! entries terminated by opcode `0`. Each kind supplies a [`RecordBuilder`]
//! that knows its payload widths; [`decode_record`] drives the loop and keeps
//! failures local to the record being decoded.

pub mod animation;
pub mod graphic;
pub mod object;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::ByteCursor;
use crate::config::UnknownOpcodePolicy;
use crate::error::{Error, Result};

pub use animation::{AnimationDecoder, AnimationDefinition};
pub use graphic::{GraphicDecoder, GraphicDefinition};
pub use object::{ObjectDecoder, ObjectDefinition};

/// Opcode that ends every record.
pub const TERMINATOR: u8 = 0;

/// The kinds of definition this crate decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    Object,
    Animation,
    Graphic,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Object => "object",
            Self::Animation => "animation",
            Self::Graphic => "graphic",
        })
    }
}

/// Result of decoding one record.
///
/// Decoding never fails outright: a record that breaks partway through keeps
/// every field set before the break, and `issue` says what went wrong.
#[derive(Debug)]
pub struct Decoded<T> {
    pub definition: T,
    pub issue: Option<Error>,
}

impl<T> Decoded<T> {
    /// A record that decoded without problems.
    #[must_use]
    pub fn clean(definition: T) -> Self {
        Self {
            definition,
            issue: None,
        }
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issue.is_none()
    }
}

/// Per-kind decoding capability used by the registry.
pub trait DefinitionDecoder<T>: Send + Sync {
    /// Kind of record this decoder reads.
    fn kind(&self) -> DefinitionKind;

    /// The default ("reset") definition for `id`.
    fn empty(&self, id: u32) -> T;

    /// Decode one record.
    fn decode(&self, id: u32, data: &[u8]) -> Decoded<T>;
}

/// Accumulates a definition while the opcode loop runs.
pub trait RecordBuilder {
    type Output;

    /// Apply one opcode's payload. Returns `Ok(false)` for an unrecognised
    /// opcode, in which case nothing has been consumed.
    fn apply(&mut self, opcode: u8, cursor: &mut ByteCursor<'_>) -> Result<bool>;

    /// Normalize and freeze.
    fn finish(self) -> Self::Output;
}

/// Run the shared opcode loop over `data`.
pub fn decode_record<B: RecordBuilder>(
    kind: DefinitionKind,
    id: u32,
    data: &[u8],
    policy: UnknownOpcodePolicy,
    mut builder: B,
) -> Decoded<B::Output> {
    let mut cursor = ByteCursor::new(data);
    let mut last_opcode = None;
    let mut issue = None;

    loop {
        // A record that simply runs out is treated as terminated.
        let Ok(opcode) = cursor.read_u8() else {
            tracing::debug!("{} {}: record ended without terminator", kind, id);
            break;
        };
        if opcode == TERMINATOR {
            break;
        }

        match builder.apply(opcode, &mut cursor) {
            Ok(true) => last_opcode = Some(opcode),
            Ok(false) => {
                tracing::debug!(
                    "{} {}: unrecognised opcode {} at offset {} (last {:?})",
                    kind,
                    id,
                    opcode,
                    cursor.position() - 1,
                    last_opcode
                );
                issue.get_or_insert(Error::UnknownOpcode {
                    kind,
                    id,
                    opcode,
                    last_opcode,
                });
                if policy == UnknownOpcodePolicy::Truncate {
                    tracing::warn!("{} {}: truncated at unrecognised opcode {}", kind, id, opcode);
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("{} {}: truncated at opcode {}: {}", kind, id, opcode, e);
                issue = Some(Error::MalformedRecord {
                    kind,
                    id,
                    opcode,
                    message: e.to_string(),
                });
                break;
            }
        }
    }

    Decoded {
        definition: builder.finish(),
        issue,
    }
}
