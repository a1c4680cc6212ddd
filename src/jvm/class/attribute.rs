//! Attribute records attached to the class file, its fields, and its methods.

use std::io::Read;

use itertools::Itertools;

use super::constant_pool::ConstantPool;
use crate::{
    jvm::parsing::{
        self,
        reader_utils::{ValueReaderExt, read_vec},
    },
    macros::see_jvm_spec,
};

/// A single attribute record: the common header plus its decoded payload.
#[doc = see_jvm_spec!(4, 7)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name_index: u16,
    name: String,
    info: AttributeInfo,
}

/// The payload of an [`Attribute`].
///
/// Only `ConstantValue` is decoded here. The `Code` body is retained
/// verbatim and dissected by the interpreter when a frame is created;
/// everything else is kept as an opaque blob of the declared length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeInfo {
    /// A field's compile-time constant: an index into the constant pool.
    ConstantValue(u16),
    /// The undissected body of a `Code` attribute.
    Code(Vec<u8>),
    /// The body of an attribute this crate does not recognise.
    Unknown(Vec<u8>),
}

impl Attribute {
    /// The name of the `ConstantValue` attribute.
    pub const CONSTANT_VALUE: &'static str = "ConstantValue";
    /// The name of the `Code` attribute.
    pub const CODE: &'static str = "Code";

    /// The resolved attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pool index the name was resolved from.
    #[must_use]
    pub const fn name_index(&self) -> u16 {
        self.name_index
    }

    /// The decoded payload.
    #[must_use]
    pub const fn info(&self) -> &AttributeInfo {
        &self.info
    }

    fn parse<R>(reader: &mut R, pool: &ConstantPool) -> Result<Self, parsing::Error>
    where
        R: Read + ?Sized,
    {
        let name_index: u16 = reader.read_value()?;
        let name = pool.get_str(name_index)?.to_owned();
        let length: u32 = reader.read_value()?;
        let info = match name.as_str() {
            Self::CONSTANT_VALUE => {
                if length != 2 {
                    return Err(parsing::Error::AttributeLengthMismatch {
                        name,
                        declared: length,
                        expected: 2,
                    });
                }
                AttributeInfo::ConstantValue(reader.read_value()?)
            }
            Self::CODE => AttributeInfo::Code(read_body(reader, length)?),
            _ => AttributeInfo::Unknown(read_body(reader, length)?),
        };
        Ok(Self {
            name_index,
            name,
            info,
        })
    }
}

fn read_body<R: Read + ?Sized>(reader: &mut R, length: u32) -> Result<Vec<u8>, parsing::Error> {
    let length = usize::try_from(length).map_err(|_| parsing::Error::UnexpectedEndOfStream)?;
    Ok(read_vec(reader, length)?)
}

/// The ordered, name-addressable attribute table of a class, field, or
/// method.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributePool {
    attributes: Vec<Attribute>,
}

impl AttributePool {
    /// Parses an attribute table, resolving names through the owning
    /// class's constant pool.
    ///
    /// # Errors
    /// See [`parsing::Error`].
    pub(crate) fn from_reader<R>(reader: &mut R, pool: &ConstantPool) -> Result<Self, parsing::Error>
    where
        R: Read + ?Sized,
    {
        let count: u16 = reader.read_value()?;
        let attributes = (0..count)
            .map(|_| Attribute::parse(reader, pool))
            .try_collect()?;
        Ok(Self { attributes })
    }

    /// The number of attributes in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Whether an attribute with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.iter().any(|attr| attr.name == name)
    }

    /// Gets the first attribute with the given name, in input order.
    ///
    /// Nothing forbids two attributes sharing a name; this returns the
    /// first.
    ///
    /// # Errors
    /// [`parsing::Error::AttributeNotFound`] when no attribute matches.
    pub fn get(&self, name: &str) -> Result<&Attribute, parsing::Error> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .ok_or_else(|| parsing::Error::AttributeNotFound(name.to_owned()))
    }

    /// Iterates over the attributes in input order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }
}
