//! Constant pool in a JVM class file.

use std::io::{self, Read, Write};

use crate::{
    jvm::{
        JavaString,
        parsing::{
            self,
            reader_utils::{ValueReaderExt, read_vec},
            write_length,
        },
    },
    macros::see_jvm_spec,
};

/// A JVM constant pool.
///
/// The pool is 1-indexed; index 0 is reserved and inaccessible. `Long` and
/// `Double` entries consume two index slots, and the slot after them is a
/// reserved hole that fails every lookup.
#[doc = see_jvm_spec!(4, 4)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantPool {
    inner: Vec<Slot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Entry(Entry),
    Padding,
}

/// An error when accessing the constant pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The index is zero or past the end of the pool.
    #[error("constant pool index {0} is out of range")]
    IndexOutOfRange(u16),
    /// The index points at the reserved slot after a `Long` or `Double`.
    #[error("constant pool index {0} is the reserved slot after a 64-bit constant")]
    ReservedHole(u16),
    /// The entry has a different tag than the caller asked for.
    #[error("mismatched constant pool entry, expected {expected}, found {found}")]
    Mismatched {
        /// The kind of entry the caller asked for.
        expected: &'static str,
        /// The kind of entry actually stored at the index.
        found: &'static str,
    },
    /// The entry holds bytes that are not valid Modified UTF-8.
    #[error("constant pool index {0} holds invalid Modified UTF-8")]
    BrokenUtf8(u16),
}

#[inline]
fn mismatch<T>(expected: &'static str, entry: &Entry) -> Result<T, Error> {
    Err(Error::Mismatched {
        expected,
        found: entry.kind(),
    })
}

impl ConstantPool {
    /// Parses a constant pool from the given reader.
    ///
    /// `constant_pool_count` is the maximum index of entries in the pool
    /// plus one, as encoded in the class file.
    ///
    /// # Errors
    /// [`parsing::Error::MalformedConstantPool`] on an unknown tag;
    /// [`parsing::Error::UnexpectedEndOfStream`] on a truncated stream.
    pub fn from_reader<R>(reader: &mut R, constant_pool_count: u16) -> Result<Self, parsing::Error>
    where
        R: Read + ?Sized,
    {
        let count: usize = constant_pool_count.into();
        let mut inner = Vec::with_capacity(count.max(1));
        inner.push(Slot::Padding);
        while inner.len() < count {
            let entry = Entry::parse(reader)?;
            if let entry @ (Entry::Long(_) | Entry::Double(_)) = entry {
                inner.push(Slot::Entry(entry));
                inner.push(Slot::Padding);
            } else {
                inner.push(Slot::Entry(entry));
            }
        }
        Ok(Self { inner })
    }

    /// The `constant_pool_count` this pool would be encoded with.
    #[must_use]
    pub fn count(&self) -> u16 {
        u16::try_from(self.inner.len()).unwrap_or(u16::MAX)
    }

    /// Gets the constant pool entry at the given index.
    ///
    /// # Errors
    /// [`Error::IndexOutOfRange`] if `index` is zero or past the end of the
    /// pool; [`Error::ReservedHole`] if it names the slot after a 64-bit
    /// constant.
    pub fn get_entry(&self, index: u16) -> Result<&Entry, Error> {
        match self.inner.get(usize::from(index)) {
            Some(Slot::Entry(entry)) => Ok(entry),
            Some(Slot::Padding) if index > 0 => Err(Error::ReservedHole(index)),
            _ => Err(Error::IndexOutOfRange(index)),
        }
    }

    /// Iterates over the occupied slots of the pool in index order.
    pub fn entries(&self) -> impl Iterator<Item = (u16, &Entry)> {
        self.inner.iter().enumerate().filter_map(|(index, slot)| {
            let index = u16::try_from(index).ok()?;
            match slot {
                Slot::Entry(entry) => Some((index, entry)),
                Slot::Padding => None,
            }
        })
    }

    /// Gets the text of the `Utf8` entry at the given index.
    ///
    /// # Errors
    /// [`Error::BrokenUtf8`] when the stored bytes do not decode.
    pub fn get_str(&self, index: u16) -> Result<&str, Error> {
        match self.get_entry(index)? {
            Entry::Utf8(JavaString::Utf8(text)) => Ok(text),
            Entry::Utf8(JavaString::InvalidUtf8(_)) => Err(Error::BrokenUtf8(index)),
            it => mismatch("CONSTANT_Utf8", it),
        }
    }

    /// Gets the `Utf8` entry at the given index, decoded or not.
    ///
    /// # Errors
    /// See [`Error`].
    pub fn get_utf8(&self, index: u16) -> Result<&JavaString, Error> {
        match self.get_entry(index)? {
            Entry::Utf8(string) => Ok(string),
            it => mismatch("CONSTANT_Utf8", it),
        }
    }

    /// Gets the value of the `Integer` entry at the given index.
    ///
    /// # Errors
    /// See [`Error`].
    pub fn get_integer(&self, index: u16) -> Result<i32, Error> {
        match self.get_entry(index)? {
            Entry::Integer(value) => Ok(*value),
            it => mismatch("CONSTANT_Integer", it),
        }
    }

    /// Gets the value of the `Float` entry at the given index.
    ///
    /// # Errors
    /// See [`Error`].
    pub fn get_float(&self, index: u16) -> Result<f32, Error> {
        match self.get_entry(index)? {
            Entry::Float(value) => Ok(*value),
            it => mismatch("CONSTANT_Float", it),
        }
    }

    /// Gets the value of the `Long` entry at the given index.
    ///
    /// # Errors
    /// See [`Error`].
    pub fn get_long(&self, index: u16) -> Result<i64, Error> {
        match self.get_entry(index)? {
            Entry::Long(value) => Ok(*value),
            it => mismatch("CONSTANT_Long", it),
        }
    }

    /// Gets the value of the `Double` entry at the given index.
    ///
    /// # Errors
    /// See [`Error`].
    pub fn get_double(&self, index: u16) -> Result<f64, Error> {
        match self.get_entry(index)? {
            Entry::Double(value) => Ok(*value),
            it => mismatch("CONSTANT_Double", it),
        }
    }

    /// Resolves the binary name behind the `Class` entry at the given index.
    ///
    /// # Errors
    /// See [`Error`].
    pub fn get_class_name(&self, index: u16) -> Result<&str, Error> {
        match self.get_entry(index)? {
            Entry::Class { name_index } => self.get_str(*name_index),
            it => mismatch("CONSTANT_Class", it),
        }
    }

    /// Resolves the string behind the `String` entry at the given index.
    ///
    /// # Errors
    /// See [`Error`].
    pub fn get_string_value(&self, index: u16) -> Result<&JavaString, Error> {
        match self.get_entry(index)? {
            Entry::String { string_index } => self.get_utf8(*string_index),
            it => mismatch("CONSTANT_String", it),
        }
    }

    /// Resolves the `(name, descriptor)` pair behind the `NameAndType` entry
    /// at the given index.
    ///
    /// # Errors
    /// See [`Error`].
    pub fn get_name_and_type(&self, index: u16) -> Result<(&str, &str), Error> {
        match self.get_entry(index)? {
            Entry::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.get_str(*name_index)?, self.get_str(*descriptor_index)?)),
            it => mismatch("CONSTANT_NameAndType", it),
        }
    }

    /// Returns whether the entry at `index` is a `Utf8`, without failing on
    /// holes or bad indexes.
    #[must_use]
    pub fn is_utf8(&self, index: u16) -> bool {
        matches!(self.get_entry(index), Ok(Entry::Utf8(_)))
    }

    /// Returns whether the entry at `index` is a `Class`.
    #[must_use]
    pub fn is_class_info(&self, index: u16) -> bool {
        matches!(self.get_entry(index), Ok(Entry::Class { .. }))
    }

    /// Returns whether the entry at `index` is a `NameAndType`.
    #[must_use]
    pub fn is_name_and_type(&self, index: u16) -> bool {
        matches!(self.get_entry(index), Ok(Entry::NameAndType { .. }))
    }

    /// Returns whether the entry at `index` is a `Long`.
    #[must_use]
    pub fn is_long(&self, index: u16) -> bool {
        matches!(self.get_entry(index), Ok(Entry::Long(_)))
    }

    /// Returns whether the entry at `index` is a `Double`.
    #[must_use]
    pub fn is_double(&self, index: u16) -> bool {
        matches!(self.get_entry(index), Ok(Entry::Double(_)))
    }

    /// Checks that every cross-reference in the pool points at an entry of
    /// the expected kind. Value entries are always self-valid.
    #[must_use]
    pub fn validate(&self) -> bool {
        self.entries().all(|(_, entry)| self.validate_entry(entry))
    }

    fn validate_entry(&self, entry: &Entry) -> bool {
        match *entry {
            Entry::Utf8(_)
            | Entry::Integer(_)
            | Entry::Float(_)
            | Entry::Long(_)
            | Entry::Double(_)
            | Entry::MethodHandle { .. } => true,
            Entry::Class { name_index } | Entry::MethodType {
                descriptor_index: name_index,
            } => self.is_utf8(name_index),
            Entry::String { string_index } => self.is_utf8(string_index),
            Entry::FieldRef {
                class_index,
                name_and_type_index,
            }
            | Entry::MethodRef {
                class_index,
                name_and_type_index,
            }
            | Entry::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => self.is_class_info(class_index) && self.is_name_and_type(name_and_type_index),
            Entry::NameAndType {
                name_index,
                descriptor_index,
            } => self.is_utf8(name_index) && self.is_utf8(descriptor_index),
            Entry::InvokeDynamic {
                name_and_type_index,
                ..
            } => self.is_name_and_type(name_and_type_index),
        }
    }

    /// Writes the pool back in classfile encoding: the count followed by the
    /// occupied slots.
    ///
    /// # Errors
    /// Any error of the underlying writer.
    pub fn to_writer<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.count().to_be_bytes())?;
        for (_, entry) in self.entries() {
            entry.to_writer(writer)?;
        }
        Ok(())
    }
}

/// An entry in the [`ConstantPool`].
#[doc = see_jvm_spec!(4, 4)]
#[derive(Debug, Clone)]
pub enum Entry {
    /// A UTF-8 string (tag 1).
    Utf8(JavaString),
    /// A signed 32-bit integer (tag 3).
    Integer(i32),
    /// An IEEE-754 32-bit float (tag 4).
    Float(f32),
    /// A signed 64-bit integer (tag 5); occupies two index slots.
    Long(i64),
    /// An IEEE-754 64-bit double (tag 6); occupies two index slots.
    Double(f64),
    /// A class reference (tag 7).
    Class {
        /// The index of the `Utf8` holding the binary name.
        name_index: u16,
    },
    /// A string literal (tag 8).
    String {
        /// The index of the `Utf8` holding the value.
        string_index: u16,
    },
    /// A field reference (tag 9).
    FieldRef {
        /// The index of the `Class` owning the field.
        class_index: u16,
        /// The index of the field's `NameAndType`.
        name_and_type_index: u16,
    },
    /// A method reference (tag 10).
    MethodRef {
        /// The index of the `Class` owning the method.
        class_index: u16,
        /// The index of the method's `NameAndType`.
        name_and_type_index: u16,
    },
    /// An interface method reference (tag 11).
    InterfaceMethodRef {
        /// The index of the interface `Class` owning the method.
        class_index: u16,
        /// The index of the method's `NameAndType`.
        name_and_type_index: u16,
    },
    /// A symbolic name paired with a type descriptor (tag 12).
    NameAndType {
        /// The index of the `Utf8` holding the name.
        name_index: u16,
        /// The index of the `Utf8` holding the descriptor.
        descriptor_index: u16,
    },
    /// A method handle (tag 15).
    MethodHandle {
        /// The kind of the handle.
        reference_kind: u8,
        /// The index of the referenced member.
        reference_index: u16,
    },
    /// A method type (tag 16).
    MethodType {
        /// The index of the `Utf8` holding the descriptor.
        descriptor_index: u16,
    },
    /// An `invokedynamic` call site (tag 18).
    InvokeDynamic {
        /// The index into the bootstrap-method table.
        bootstrap_method_attr_index: u16,
        /// The index of the call site's `NameAndType`.
        name_and_type_index: u16,
    },
}

impl Entry {
    /// Gets the kind of this constant pool entry.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Utf8(_) => "CONSTANT_Utf8",
            Self::Integer(_) => "CONSTANT_Integer",
            Self::Float(_) => "CONSTANT_Float",
            Self::Long(_) => "CONSTANT_Long",
            Self::Double(_) => "CONSTANT_Double",
            Self::Class { .. } => "CONSTANT_Class",
            Self::String { .. } => "CONSTANT_String",
            Self::FieldRef { .. } => "CONSTANT_Fieldref",
            Self::MethodRef { .. } => "CONSTANT_Methodref",
            Self::InterfaceMethodRef { .. } => "CONSTANT_InterfaceMethodref",
            Self::NameAndType { .. } => "CONSTANT_NameAndType",
            Self::MethodHandle { .. } => "CONSTANT_MethodHandle",
            Self::MethodType { .. } => "CONSTANT_MethodType",
            Self::InvokeDynamic { .. } => "CONSTANT_InvokeDynamic",
        }
    }

    /// Gets the tag byte this entry is encoded with.
    #[must_use]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Utf8(_) => 1,
            Self::Integer(_) => 3,
            Self::Float(_) => 4,
            Self::Long(_) => 5,
            Self::Double(_) => 6,
            Self::Class { .. } => 7,
            Self::String { .. } => 8,
            Self::FieldRef { .. } => 9,
            Self::MethodRef { .. } => 10,
            Self::InterfaceMethodRef { .. } => 11,
            Self::NameAndType { .. } => 12,
            Self::MethodHandle { .. } => 15,
            Self::MethodType { .. } => 16,
            Self::InvokeDynamic { .. } => 18,
        }
    }

    pub(crate) fn parse<R: Read + ?Sized>(reader: &mut R) -> Result<Self, parsing::Error> {
        let tag: u8 = reader.read_value()?;
        match tag {
            1 => Self::parse_utf8(reader),
            3 => Ok(Self::Integer(reader.read_value()?)),
            4 => Ok(Self::Float(reader.read_value()?)),
            5 => Ok(Self::Long(reader.read_value()?)),
            6 => Ok(Self::Double(reader.read_value()?)),
            7 => Ok(Self::Class {
                name_index: reader.read_value()?,
            }),
            8 => Ok(Self::String {
                string_index: reader.read_value()?,
            }),
            9 => Ok(Self::FieldRef {
                class_index: reader.read_value()?,
                name_and_type_index: reader.read_value()?,
            }),
            10 => Ok(Self::MethodRef {
                class_index: reader.read_value()?,
                name_and_type_index: reader.read_value()?,
            }),
            11 => Ok(Self::InterfaceMethodRef {
                class_index: reader.read_value()?,
                name_and_type_index: reader.read_value()?,
            }),
            12 => Ok(Self::NameAndType {
                name_index: reader.read_value()?,
                descriptor_index: reader.read_value()?,
            }),
            15 => Ok(Self::MethodHandle {
                reference_kind: reader.read_value()?,
                reference_index: reader.read_value()?,
            }),
            16 => Ok(Self::MethodType {
                descriptor_index: reader.read_value()?,
            }),
            18 => Ok(Self::InvokeDynamic {
                bootstrap_method_attr_index: reader.read_value()?,
                name_and_type_index: reader.read_value()?,
            }),
            it => Err(parsing::Error::MalformedConstantPool(it)),
        }
    }

    fn parse_utf8<R: Read + ?Sized>(reader: &mut R) -> Result<Self, parsing::Error> {
        let length: u16 = reader.read_value()?;
        let content = read_vec(reader, length.into())?;
        match cesu8::from_java_cesu8(content.as_slice()) {
            Ok(text) => Ok(Self::Utf8(JavaString::Utf8(text.into_owned()))),
            Err(_) => Ok(Self::Utf8(JavaString::InvalidUtf8(content))),
        }
    }

    /// Writes this entry back in classfile encoding.
    ///
    /// # Errors
    /// Any error of the underlying writer.
    pub fn to_writer<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.tag().to_be_bytes())?;
        match self {
            Self::Utf8(JavaString::Utf8(text)) => {
                let cesu8_bytes = cesu8::to_java_cesu8(text);
                write_length::<u16>(writer, cesu8_bytes.len())?;
                writer.write_all(cesu8_bytes.as_ref())?;
            }
            Self::Utf8(JavaString::InvalidUtf8(bytes)) => {
                write_length::<u16>(writer, bytes.len())?;
                writer.write_all(bytes)?;
            }
            Self::Integer(value) => writer.write_all(&value.to_be_bytes())?,
            Self::Float(value) => writer.write_all(&value.to_be_bytes())?,
            Self::Long(value) => writer.write_all(&value.to_be_bytes())?,
            Self::Double(value) => writer.write_all(&value.to_be_bytes())?,
            Self::Class { name_index } => writer.write_all(&name_index.to_be_bytes())?,
            Self::String { string_index } => writer.write_all(&string_index.to_be_bytes())?,
            Self::FieldRef {
                class_index,
                name_and_type_index,
            }
            | Self::MethodRef {
                class_index,
                name_and_type_index,
            }
            | Self::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => {
                writer.write_all(&class_index.to_be_bytes())?;
                writer.write_all(&name_and_type_index.to_be_bytes())?;
            }
            Self::NameAndType {
                name_index,
                descriptor_index,
            } => {
                writer.write_all(&name_index.to_be_bytes())?;
                writer.write_all(&descriptor_index.to_be_bytes())?;
            }
            Self::MethodHandle {
                reference_kind,
                reference_index,
            } => {
                writer.write_all(&reference_kind.to_be_bytes())?;
                writer.write_all(&reference_index.to_be_bytes())?;
            }
            Self::MethodType { descriptor_index } => {
                writer.write_all(&descriptor_index.to_be_bytes())?;
            }
            Self::InvokeDynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            } => {
                writer.write_all(&bootstrap_method_attr_index.to_be_bytes())?;
                writer.write_all(&name_and_type_index.to_be_bytes())?;
            }
        }
        Ok(())
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Utf8(lhs), Self::Utf8(rhs)) => lhs == rhs,
            (Self::Integer(lhs), Self::Integer(rhs)) => lhs == rhs,
            // Floats compare by bit pattern so that NaN-valued constants
            // survive a round trip.
            (Self::Float(lhs), Self::Float(rhs)) => lhs.to_bits() == rhs.to_bits(),
            (Self::Long(lhs), Self::Long(rhs)) => lhs == rhs,
            (Self::Double(lhs), Self::Double(rhs)) => lhs.to_bits() == rhs.to_bits(),
            (Self::Class { name_index: lhs }, Self::Class { name_index: rhs })
            | (Self::String { string_index: lhs }, Self::String { string_index: rhs })
            | (
                Self::MethodType {
                    descriptor_index: lhs,
                },
                Self::MethodType {
                    descriptor_index: rhs,
                },
            ) => lhs == rhs,
            (
                Self::FieldRef {
                    class_index: lhs_class,
                    name_and_type_index: lhs_nat,
                },
                Self::FieldRef {
                    class_index: rhs_class,
                    name_and_type_index: rhs_nat,
                },
            )
            | (
                Self::MethodRef {
                    class_index: lhs_class,
                    name_and_type_index: lhs_nat,
                },
                Self::MethodRef {
                    class_index: rhs_class,
                    name_and_type_index: rhs_nat,
                },
            )
            | (
                Self::InterfaceMethodRef {
                    class_index: lhs_class,
                    name_and_type_index: lhs_nat,
                },
                Self::InterfaceMethodRef {
                    class_index: rhs_class,
                    name_and_type_index: rhs_nat,
                },
            )
            | (
                Self::NameAndType {
                    name_index: lhs_class,
                    descriptor_index: lhs_nat,
                },
                Self::NameAndType {
                    name_index: rhs_class,
                    descriptor_index: rhs_nat,
                },
            )
            | (
                Self::InvokeDynamic {
                    bootstrap_method_attr_index: lhs_class,
                    name_and_type_index: lhs_nat,
                },
                Self::InvokeDynamic {
                    bootstrap_method_attr_index: rhs_class,
                    name_and_type_index: rhs_nat,
                },
            ) => lhs_class == rhs_class && lhs_nat == rhs_nat,
            (
                Self::MethodHandle {
                    reference_kind: lhs_kind,
                    reference_index: lhs_index,
                },
                Self::MethodHandle {
                    reference_kind: rhs_kind,
                    reference_index: rhs_index,
                },
            ) => lhs_kind == rhs_kind && lhs_index == rhs_index,
            _ => false,
        }
    }
}

impl Eq for Entry {}
