//! Discovering and loading classes out of ordered archive sources.

pub mod class_paths;

use std::{
    collections::HashMap,
    fmt::Debug,
    ops::{Deref, DerefMut},
    path::PathBuf,
};

use crate::jvm::{class::ClassFile, parsing};

/// An error that can occur while locating or loading a class.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No configured source has a member for the class.
    #[error("class not found: {0}")]
    ClassNotFound(String),
    /// An archive could not be opened at construction.
    #[error("failed to open archive {path}: {source}")]
    ArchiveOpenFailed {
        /// The archive path.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A single source has no member under the requested name. The
    /// registry treats this as "keep probing"; it only surfaces when a
    /// class path is queried directly.
    #[error("archive has no member named {0}")]
    ArchiveMemberMissing(String),
    /// An archive member exists but could not be read.
    #[error("failed to read an archive member: {0}")]
    ArchiveReadFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The member bytes do not decode as a class file.
    #[error("error parsing class bytes: {0}")]
    Malformed(#[from] parsing::Error),
    /// The underlying IO failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A source of classes, searched by binary internal name.
pub trait ClassPath: Debug {
    /// Finds the member `<binary_name>.class`, reads it fully, and parses
    /// it.
    ///
    /// # Errors
    /// [`Error::ArchiveMemberMissing`] when this source has no such member;
    /// any read or parse failure otherwise.
    fn find_class(&mut self, binary_name: &str) -> Result<ClassFile, Error>;
}

impl<T> ClassPath for T
where
    T: DerefMut + Debug,
    <T as Deref>::Target: ClassPath,
{
    fn find_class(&mut self, binary_name: &str) -> Result<ClassFile, Error> {
        self.deref_mut().find_class(binary_name)
    }
}

/// A name-to-class cache backed by an ordered list of class paths, with
/// driven loading of transitively referenced classes.
///
/// Loading a class registers it *before* its referenced classes are
/// resolved, so recursive references terminate on the cache.
#[derive(Debug)]
pub struct ClassRegistry<P> {
    class_paths: Vec<P>,
    classes: HashMap<String, ClassFile>,
}

impl<P: ClassPath> ClassRegistry<P> {
    /// Creates a registry over the given class paths, probed in order.
    #[must_use]
    pub fn new<C: Into<Vec<P>>>(class_paths: C) -> Self {
        Self {
            class_paths: class_paths.into(),
            classes: HashMap::new(),
        }
    }

    /// The number of registered classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no class has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Whether a class is already registered under the given name.
    #[must_use]
    pub fn contains(&self, binary_name: &str) -> bool {
        self.classes.contains_key(binary_name)
    }

    /// Gets an already-registered class without touching the sources.
    #[must_use]
    pub fn get(&self, binary_name: &str) -> Option<&ClassFile> {
        self.classes.get(binary_name)
    }

    /// Resolves a class by name: returns the cached entry, or reads it
    /// from the first class path that has it, registers it, and loads
    /// every class its constant pool references.
    ///
    /// # Errors
    /// [`Error::ClassNotFound`] when no source has the class; any failure
    /// of reading, parsing, or transitive loading.
    pub fn load_class(&mut self, binary_name: &str) -> Result<&ClassFile, Error> {
        if !self.classes.contains_key(binary_name) {
            let class = self.find_class(binary_name)?;
            log::debug!("registering class {binary_name}");
            self.classes.insert(binary_name.to_owned(), class);
            self.initialize(binary_name)?;
        }
        // The entry was either present or inserted above, and nothing is
        // ever removed from the map.
        Ok(self.classes.get(binary_name).unwrap())
    }

    fn find_class(&mut self, binary_name: &str) -> Result<ClassFile, Error> {
        for class_path in &mut self.class_paths {
            match class_path.find_class(binary_name) {
                Ok(class) => return Ok(class),
                Err(Error::ArchiveMemberMissing(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Err(Error::ClassNotFound(binary_name.to_owned()))
    }

    /// Loads every class referenced from the named class's constant pool,
    /// in pool-index order. The entry must already be registered so that
    /// reference cycles bottom out.
    fn initialize(&mut self, binary_name: &str) -> Result<(), Error> {
        let referenced: Vec<String> = self.classes[binary_name]
            .referenced_classes()
            .map(str::to_owned)
            .collect();
        for name in referenced {
            self.load_class(&name)?;
        }
        Ok(())
    }
}
