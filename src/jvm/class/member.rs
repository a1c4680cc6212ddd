//! Fields and methods of a class, which share one record shape.

use std::io::Read;

use itertools::Itertools;

use super::{
    access_flags::AccessFlags,
    attribute::AttributePool,
    constant_pool::{self, ConstantPool},
};
use crate::{
    jvm::parsing::{self, reader_utils::ValueReaderExt},
    macros::see_jvm_spec,
};

/// A field or a method of a class. The two share the exact same binary
/// structure, so one record serves both.
#[doc = see_jvm_spec!(4, 5)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMember {
    access_flags: AccessFlags,
    name_index: u16,
    descriptor_index: u16,
    attributes: AttributePool,
}

impl ClassMember {
    fn from_reader<R>(reader: &mut R, pool: &ConstantPool) -> Result<Self, parsing::Error>
    where
        R: Read + ?Sized,
    {
        let access_flags = AccessFlags::from_word(reader.read_value()?);
        let name_index = reader.read_value()?;
        let descriptor_index = reader.read_value()?;
        let attributes = AttributePool::from_reader(reader, pool)?;
        Ok(Self {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    /// The member's access flags.
    #[must_use]
    pub const fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    /// The pool index of the member's name.
    #[must_use]
    pub const fn name_index(&self) -> u16 {
        self.name_index
    }

    /// The pool index of the member's descriptor.
    #[must_use]
    pub const fn descriptor_index(&self) -> u16 {
        self.descriptor_index
    }

    /// The member's attribute table.
    #[must_use]
    pub const fn attributes(&self) -> &AttributePool {
        &self.attributes
    }

    /// Resolves the member's name through the owning pool.
    ///
    /// # Errors
    /// See [`constant_pool::Error`].
    pub fn name<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str, constant_pool::Error> {
        pool.get_str(self.name_index)
    }

    /// Resolves the member's descriptor through the owning pool.
    ///
    /// # Errors
    /// See [`constant_pool::Error`].
    pub fn descriptor<'p>(&self, pool: &'p ConstantPool) -> Result<&'p str, constant_pool::Error> {
        pool.get_str(self.descriptor_index)
    }
}

/// All of either the fields or the methods of a class file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberPool {
    members: Vec<ClassMember>,
}

impl MemberPool {
    /// Parses a counted list of member records.
    ///
    /// # Errors
    /// See [`parsing::Error`].
    pub(crate) fn from_reader<R>(reader: &mut R, pool: &ConstantPool) -> Result<Self, parsing::Error>
    where
        R: Read + ?Sized,
    {
        let count: u16 = reader.read_value()?;
        let members = (0..count)
            .map(|_| ClassMember::from_reader(reader, pool))
            .try_collect()?;
        Ok(Self { members })
    }

    /// The number of members in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Gets the member at the given index.
    ///
    /// # Errors
    /// [`parsing::Error::MemberIndexOutOfRange`] past the end of the pool.
    pub fn get(&self, index: u16) -> Result<&ClassMember, parsing::Error> {
        self.members
            .get(usize::from(index))
            .ok_or(parsing::Error::MemberIndexOutOfRange(index))
    }

    /// Iterates over the members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassMember> {
        self.members.iter()
    }
}
