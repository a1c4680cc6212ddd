//! JVM elements: classes, constants, members, frames, and the machine root.

pub mod class;
pub mod class_loader;
pub mod code;
pub mod frame;
pub mod opcode;
pub mod parsing;
pub mod vm;

use std::fmt;

/// A string read from a constant pool.
///
/// Class files encode strings in Modified UTF-8 (CESU-8 with a two-byte
/// encoding of NUL). Strings that do not decode are preserved as raw bytes
/// instead of being rejected at parse time; consumers that require text get
/// an error on access.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavaString {
    /// A string decoded from valid Modified UTF-8.
    Utf8(String),
    /// The raw bytes of a string that is not valid Modified UTF-8.
    InvalidUtf8(Vec<u8>),
}

impl JavaString {
    /// Returns the decoded text, or `None` for undecodable bytes.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(text) => Some(text),
            Self::InvalidUtf8(_) => None,
        }
    }
}

impl fmt::Display for JavaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8(text) => write!(f, "{text}"),
            Self::InvalidUtf8(bytes) => write!(f, "(invalid UTF-8) {bytes:02x?}"),
        }
    }
}

impl From<&str> for JavaString {
    fn from(text: &str) -> Self {
        Self::Utf8(text.to_owned())
    }
}
