//! JVM classes: the composite classfile root and its component pools.

pub mod access_flags;
pub mod attribute;
pub mod constant_pool;
pub mod member;

use std::io::Read;

use itertools::Itertools;

pub use access_flags::AccessFlags;
pub use attribute::{Attribute, AttributeInfo, AttributePool};
pub use constant_pool::ConstantPool;
pub use member::{ClassMember, MemberPool};

use self::constant_pool::Entry;
use crate::{
    jvm::parsing::{self, reader_utils::ValueReaderExt},
    macros::see_jvm_spec,
};

/// Value of the magic bytes every class file starts with.
pub const CLASS_FILE_MAGIC: u32 = 0xCAFE_BABE;

/// The name of the class-initialiser method.
pub const CLASS_INITIALIZER: &str = "<clinit>";

/// A decoded `.class` file.
///
/// The strict parse order is magic, versions, constant pool, access flags,
/// this/super indices, interfaces, fields, methods, attributes. A pool that
/// fails referential validation is rejected at construction.
#[doc = see_jvm_spec!(4, 1)]
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    magic: u32,
    minor_version: u16,
    major_version: u16,
    constant_pool: ConstantPool,
    access_flags: AccessFlags,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: MemberPool,
    methods: MemberPool,
    attributes: AttributePool,
    clinit: Option<u16>,
}

impl ClassFile {
    /// Parses a class file from the given reader.
    ///
    /// # Errors
    /// [`parsing::Error::NotAClassFile`] when the magic is wrong;
    /// [`parsing::Error::ConstantValidationFailed`] when a pool
    /// cross-reference points at an entry of the wrong kind; any other
    /// [`parsing::Error`] on malformed or truncated input.
    pub fn from_reader<R>(reader: &mut R) -> Result<Self, parsing::Error>
    where
        R: Read + ?Sized,
    {
        let magic: u32 = reader.read_value()?;
        if magic != CLASS_FILE_MAGIC {
            return Err(parsing::Error::NotAClassFile);
        }
        let minor_version = reader.read_value()?;
        let major_version = reader.read_value()?;
        let constant_pool_count: u16 = reader.read_value()?;
        let constant_pool = ConstantPool::from_reader(reader, constant_pool_count)?;
        if !constant_pool.validate() {
            return Err(parsing::Error::ConstantValidationFailed);
        }
        let access_flags = AccessFlags::from_word(reader.read_value()?);
        let this_class = reader.read_value()?;
        let super_class = reader.read_value()?;
        let interfaces_count: u16 = reader.read_value()?;
        let interfaces = (0..interfaces_count)
            .map(|_| reader.read_value())
            .try_collect()?;
        let fields = MemberPool::from_reader(reader, &constant_pool)?;
        let methods = MemberPool::from_reader(reader, &constant_pool)?;
        let attributes = AttributePool::from_reader(reader, &constant_pool)?;
        let clinit = methods
            .iter()
            .position(|method| {
                method
                    .name(&constant_pool)
                    .is_ok_and(|name| name == CLASS_INITIALIZER)
            })
            .and_then(|index| u16::try_from(index).ok());
        Ok(Self {
            magic,
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
            clinit,
        })
    }

    /// The magic constant; always [`CLASS_FILE_MAGIC`] for a parsed file.
    #[must_use]
    pub const fn magic(&self) -> u32 {
        self.magic
    }

    /// The minor classfile version.
    #[must_use]
    pub const fn minor_version(&self) -> u16 {
        self.minor_version
    }

    /// The major classfile version.
    #[must_use]
    pub const fn major_version(&self) -> u16 {
        self.major_version
    }

    /// The class's constant pool.
    #[must_use]
    pub const fn constant_pool(&self) -> &ConstantPool {
        &self.constant_pool
    }

    /// The class's access flags.
    #[must_use]
    pub const fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    /// The pool index of this class's own `Class` entry.
    #[must_use]
    pub const fn this_class(&self) -> u16 {
        self.this_class
    }

    /// The pool index of the superclass entry; 0 for `java/lang/Object`.
    #[must_use]
    pub const fn super_class(&self) -> u16 {
        self.super_class
    }

    /// The pool indexes of the directly implemented interfaces.
    #[must_use]
    pub fn interfaces(&self) -> &[u16] {
        &self.interfaces
    }

    /// The class's fields.
    #[must_use]
    pub const fn fields(&self) -> &MemberPool {
        &self.fields
    }

    /// The class's methods.
    #[must_use]
    pub const fn methods(&self) -> &MemberPool {
        &self.methods
    }

    /// The class-level attribute table.
    #[must_use]
    pub const fn attributes(&self) -> &AttributePool {
        &self.attributes
    }

    /// The memoised `<clinit>` method, if the class declares one.
    #[must_use]
    pub fn clinit(&self) -> Option<&ClassMember> {
        self.clinit.and_then(|index| self.methods.get(index).ok())
    }

    /// Resolves this class's binary name through the pool.
    ///
    /// # Errors
    /// See [`constant_pool::Error`].
    pub fn binary_name(&self) -> Result<&str, constant_pool::Error> {
        self.constant_pool.get_class_name(self.this_class)
    }

    /// Resolves the superclass's binary name; `None` when there is none.
    ///
    /// # Errors
    /// See [`constant_pool::Error`].
    pub fn super_class_name(&self) -> Result<Option<&str>, constant_pool::Error> {
        if self.super_class == 0 {
            Ok(None)
        } else {
            self.constant_pool
                .get_class_name(self.super_class)
                .map(Some)
        }
    }

    /// Iterates, in pool-index order, over the binary names of every class
    /// referenced from the constant pool, with array descriptors reduced to
    /// their element class and primitive element types skipped.
    pub fn referenced_classes(&self) -> impl Iterator<Item = &str> {
        self.constant_pool
            .entries()
            .filter_map(|(_, entry)| {
                if let Entry::Class { name_index } = entry {
                    self.constant_pool.get_str(*name_index).ok()
                } else {
                    None
                }
            })
            .filter_map(referenced_name)
    }
}

/// Reduces a `Class` entry's name to the class it makes reachable:
/// non-array names pass through, `[`-prefixed object arrays yield their
/// element class, and primitive arrays yield nothing.
fn referenced_name(name: &str) -> Option<&str> {
    let element = name.trim_start_matches('[');
    if element.len() == name.len() {
        return (!name.is_empty()).then_some(name);
    }
    let object = element.strip_prefix('L')?.strip_suffix(';')?;
    (!object.is_empty()).then_some(object)
}
