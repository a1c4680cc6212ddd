//! The 16-bit access-flags word attached to classes, fields, and methods.

use bitflags::bitflags;

bitflags! {
    /// The access flags of a class, field, or method.
    ///
    /// A single mask type serves all three contexts; bits 0x0020, 0x0040,
    /// and 0x0080 carry different meanings per context and are exposed
    /// under both names. Callers pick the predicate appropriate to what
    /// they are looking at.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccessFlags: u16 {
        /// Declared `public`; may be accessed from outside its package.
        const PUBLIC = 0x0001;
        /// Declared `private`; accessible only within the defining class.
        const PRIVATE = 0x0002;
        /// Declared `protected`; may be accessed within subclasses.
        const PROTECTED = 0x0004;
        /// Declared `static`.
        const STATIC = 0x0008;
        /// Declared `final`; no subclasses, reassignment, or overriding.
        const FINAL = 0x0010;
        /// On a class: treat superclass methods specially under `invokespecial`.
        const SUPER = 0x0020;
        /// On a method: declared `synchronized`.
        const SYNCHRONIZED = 0x0020;
        /// On a field: declared `volatile`.
        const VOLATILE = 0x0040;
        /// On a method: a bridge method generated by the compiler.
        const BRIDGE = 0x0040;
        /// On a field: declared `transient`.
        const TRANSIENT = 0x0080;
        /// On a method: declared with a variable number of arguments.
        const VARARGS = 0x0080;
        /// Declared `native`; implemented outside the JVM.
        const NATIVE = 0x0100;
        /// Is an interface, not a class.
        const INTERFACE = 0x0200;
        /// Declared `abstract`; must not be instantiated.
        const ABSTRACT = 0x0400;
        /// Declared `strictfp`; floating-point mode is FP-strict.
        const STRICT = 0x0800;
        /// Declared synthetic; not present in the source code.
        const SYNTHETIC = 0x1000;
        /// Declared as an enum class or an element of one.
        const ENUM = 0x4000;
    }
}

impl AccessFlags {
    /// Wraps a raw flags word without discarding unassigned bits.
    #[must_use]
    pub const fn from_word(word: u16) -> Self {
        Self::from_bits_retain(word)
    }

    /// The raw 16-bit word.
    #[must_use]
    pub const fn word(self) -> u16 {
        self.bits()
    }

    /// Whether the `public` bit is set.
    #[must_use]
    pub const fn is_public(self) -> bool {
        self.contains(Self::PUBLIC)
    }

    /// Whether the `private` bit is set.
    #[must_use]
    pub const fn is_private(self) -> bool {
        self.contains(Self::PRIVATE)
    }

    /// Whether the `protected` bit is set.
    #[must_use]
    pub const fn is_protected(self) -> bool {
        self.contains(Self::PROTECTED)
    }

    /// Whether the `static` bit is set.
    #[must_use]
    pub const fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    /// Whether the `final` bit is set.
    #[must_use]
    pub const fn is_final(self) -> bool {
        self.contains(Self::FINAL)
    }

    /// Whether the `super` bit is set (class context).
    #[must_use]
    pub const fn is_super(self) -> bool {
        self.contains(Self::SUPER)
    }

    /// Whether the `synchronized` bit is set (method context).
    #[must_use]
    pub const fn is_synchronized(self) -> bool {
        self.contains(Self::SYNCHRONIZED)
    }

    /// Whether the `volatile` bit is set (field context).
    #[must_use]
    pub const fn is_volatile(self) -> bool {
        self.contains(Self::VOLATILE)
    }

    /// Whether the `bridge` bit is set (method context).
    #[must_use]
    pub const fn is_bridge(self) -> bool {
        self.contains(Self::BRIDGE)
    }

    /// Whether the `transient` bit is set (field context).
    #[must_use]
    pub const fn is_transient(self) -> bool {
        self.contains(Self::TRANSIENT)
    }

    /// Whether the `varargs` bit is set (method context).
    #[must_use]
    pub const fn is_varargs(self) -> bool {
        self.contains(Self::VARARGS)
    }

    /// Whether the `native` bit is set.
    #[must_use]
    pub const fn is_native(self) -> bool {
        self.contains(Self::NATIVE)
    }

    /// Whether the `interface` bit is set.
    #[must_use]
    pub const fn is_interface(self) -> bool {
        self.contains(Self::INTERFACE)
    }

    /// Whether the `abstract` bit is set.
    #[must_use]
    pub const fn is_abstract(self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    /// Whether the `strictfp` bit is set.
    #[must_use]
    pub const fn is_strict(self) -> bool {
        self.contains(Self::STRICT)
    }

    /// Whether the `synthetic` bit is set.
    #[must_use]
    pub const fn is_synthetic(self) -> bool {
        self.contains(Self::SYNTHETIC)
    }

    /// Whether the `enum` bit is set.
    #[must_use]
    pub const fn is_enum(self) -> bool {
        self.contains(Self::ENUM)
    }
}
