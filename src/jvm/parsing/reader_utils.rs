use std::io::{Read, Result};

use trait_gen::trait_gen;

/// A value with a fixed-width big-endian encoding in a classfile stream.
pub(crate) trait FromBytes {
    /// Decodes an instance of this type from the given reader.
    fn from_reader<R: Read + ?Sized>(reader: &mut R) -> Result<Self>
    where
        Self: Sized;
}

/// Extension trait turning any [`Read`] into a big-endian primitive decoder.
pub(crate) trait ValueReaderExt: Read {
    fn read_value<T: FromBytes>(&mut self) -> Result<T>;
}

impl<R: Read + ?Sized> ValueReaderExt for R {
    fn read_value<T: FromBytes>(&mut self) -> Result<T> {
        T::from_reader(self)
    }
}

impl<const N: usize> FromBytes for [u8; N] {
    fn from_reader<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; N];
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}

#[trait_gen(T -> u8, u16, u32, u64, i8, i16, i32, i64, f32, f64)]
impl FromBytes for T {
    fn from_reader<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let buf = reader.read_value()?;
        Ok(Self::from_be_bytes(buf))
    }
}

/// Reads exactly `len` bytes and advances the reader past them.
pub(crate) fn read_vec<R>(reader: &mut R, len: usize) -> Result<Vec<u8>>
where
    R: Read + ?Sized,
{
    let mut buf = vec![0u8; len];
    reader.read_exact(buf.as_mut_slice())?;
    Ok(buf)
}
