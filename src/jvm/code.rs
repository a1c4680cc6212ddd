//! A borrowed view over the body of a `Code` attribute.

use crate::{
    jvm::parsing::{self, reader_utils::ValueReaderExt},
    macros::see_jvm_spec,
};

/// The headers and bytecode stream of a method's `Code` attribute.
///
/// Only the operand-stack and local sizing headers plus the bytecode are
/// dissected; the exception table and nested attributes that follow in the
/// body are left untouched.
#[doc = see_jvm_spec!(4, 7, 3)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code<'a> {
    /// The maximum operand-stack depth, in 32-bit slots.
    pub max_stack: u16,
    /// The number of local-variable slots.
    pub max_locals: u16,
    /// The executable bytecode stream.
    pub bytecode: &'a [u8],
}

impl<'a> Code<'a> {
    /// Dissects the raw body of a `Code` attribute without copying the
    /// bytecode.
    ///
    /// # Errors
    /// [`parsing::Error::UnexpectedEndOfStream`] when the body is shorter
    /// than its headers declare.
    pub fn parse(body: &'a [u8]) -> Result<Self, parsing::Error> {
        let mut reader = body;
        let max_stack: u16 = reader.read_value()?;
        let max_locals: u16 = reader.read_value()?;
        let code_length: u32 = reader.read_value()?;
        let code_length =
            usize::try_from(code_length).map_err(|_| parsing::Error::UnexpectedEndOfStream)?;
        if reader.len() < code_length {
            return Err(parsing::Error::UnexpectedEndOfStream);
        }
        let bytecode = &reader[..code_length];
        Ok(Self {
            max_stack,
            max_locals,
            bytecode,
        })
    }
}
