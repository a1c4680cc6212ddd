//! Binary-stream plumbing and the decode-side error taxonomy.

pub(crate) mod reader_utils;

use std::{io, num::TryFromIntError};

use num_traits::ToBytes;

use super::class::constant_pool;

/// An error raised while decoding a class file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The stream ended before the requested width could be read.
    #[error("unexpected end of stream")]
    UnexpectedEndOfStream,
    /// The underlying input source failed.
    #[error("failed to read from stream: {0}")]
    Io(#[source] io::Error),
    /// The stream does not start with the classfile magic.
    #[error("the stream does not contain a Java class file")]
    NotAClassFile,
    /// A constant pool entry carries a tag this crate does not know.
    #[error("unknown constant pool tag {0}")]
    MalformedConstantPool(u8),
    /// A cross-reference in the constant pool points at an entry of the
    /// wrong kind.
    #[error("constant pool failed referential validation")]
    ConstantValidationFailed,
    /// An attribute body does not have the size its kind requires.
    #[error("attribute {name} declares length {declared}, expected {expected}")]
    AttributeLengthMismatch {
        /// The resolved attribute name.
        name: String,
        /// The length field read from the stream.
        declared: u32,
        /// The length the attribute kind requires.
        expected: u32,
    },
    /// A field or method index is past the end of its member pool.
    #[error("member index {0} is out of range")]
    MemberIndexOutOfRange(u16),
    /// No attribute with the requested name exists in the pool.
    #[error("no attribute named {0:?}")]
    AttributeNotFound(String),
    /// An error when accessing the constant pool.
    #[error(transparent)]
    ConstantPool(#[from] constant_pool::Error),
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEndOfStream
        } else {
            Self::Io(error)
        }
    }
}

/// Writes a length value in the fixed-width big-endian format class files
/// use for counts.
pub(crate) fn write_length<Len>(
    writer: &mut (impl io::Write + ?Sized),
    length: usize,
) -> io::Result<()>
where
    usize: TryInto<Len, Error = TryFromIntError>,
    Len: ToBytes,
{
    let length: Len = length
        .try_into()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    writer.write_all(length.to_be_bytes().as_ref())
}
