//! Implementations of [`ClassPath`].

use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use zip::{ZipArchive, result::ZipError};

use super::{ClassPath, Error};
use crate::jvm::class::ClassFile;

/// A class path backed by a zip-compatible archive (a JAR), opened once at
/// construction and held open for the lifetime of the value.
#[derive(Debug)]
pub struct JarClassPath {
    path: PathBuf,
    archive: ZipArchive<BufReader<File>>,
}

impl JarClassPath {
    /// Opens the archive eagerly.
    ///
    /// # Errors
    /// [`Error::ArchiveOpenFailed`] when the file cannot be opened or is
    /// not a zip archive.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let file = File::open(&path).map_err(|err| Error::ArchiveOpenFailed {
            path: path.clone(),
            source: Box::new(err),
        })?;
        let archive = ZipArchive::new(BufReader::new(file)).map_err(|err| {
            Error::ArchiveOpenFailed {
                path: path.clone(),
                source: Box::new(err),
            }
        })?;
        Ok(Self { path, archive })
    }

    /// The path the archive was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ClassPath for JarClassPath {
    fn find_class(&mut self, binary_name: &str) -> Result<ClassFile, Error> {
        let member_name = format!("{binary_name}.class");
        let mut member = self.archive.by_name(&member_name).map_err(|err| match err {
            ZipError::FileNotFound => Error::ArchiveMemberMissing(member_name.clone()),
            ZipError::Io(io_err) => Error::Io(io_err),
            other => Error::ArchiveReadFailed(Box::new(other)),
        })?;
        // Stage the whole member in memory; the decoder wants a
        // forward-only stream and the member handle must not outlive this
        // call.
        let mut bytes = Vec::new();
        member
            .read_to_end(&mut bytes)
            .map_err(|err| Error::ArchiveReadFailed(Box::new(err)))?;
        drop(member);
        Ok(ClassFile::from_reader(&mut bytes.as_slice())?)
    }
}

/// A class path over loose `.class` files under a root directory.
#[derive(Debug)]
pub struct DirectoryClassPath {
    directory: PathBuf,
}

impl DirectoryClassPath {
    /// Creates a directory class path rooted at `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl ClassPath for DirectoryClassPath {
    fn find_class(&mut self, binary_name: &str) -> Result<ClassFile, Error> {
        let class_file_path = self.directory.join(binary_name).with_extension("class");
        if class_file_path.exists() {
            let file = File::open(class_file_path)?;
            let mut reader = BufReader::new(file);
            Ok(ClassFile::from_reader(&mut reader)?)
        } else {
            Err(Error::ArchiveMemberMissing(format!("{binary_name}.class")))
        }
    }
}
