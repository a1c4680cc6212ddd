//! Hand-assembled classfile images and a scripted class path for the
//! loader and machine tests.
#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::HashMap,
    rc::Rc,
};

use cortado::jvm::{
    class::ClassFile,
    class_loader::{self, ClassPath},
};

pub fn utf8_entry(text: &str) -> Vec<u8> {
    let mut bytes = vec![1];
    let encoded = text.as_bytes();
    bytes.extend(u16::try_from(encoded.len()).unwrap().to_be_bytes());
    bytes.extend(encoded);
    bytes
}

pub fn class_entry(name_index: u16) -> Vec<u8> {
    let mut bytes = vec![7];
    bytes.extend(name_index.to_be_bytes());
    bytes
}

fn pool_bytes(entries: &[Vec<u8>]) -> (u16, Vec<u8>) {
    let count = u16::try_from(entries.len() + 1).unwrap();
    let bytes = entries.iter().flatten().copied().collect();
    (count, bytes)
}

/// Assembles a class named `name` whose constant pool additionally carries
/// one `Class` entry per name in `referenced`.
pub fn class_image(name: &str, referenced: &[&str]) -> Vec<u8> {
    class_image_with_methods(name, referenced, &[])
}

/// Assembles a class with the given raw method records appended.
pub fn class_image_with_methods(name: &str, referenced: &[&str], methods: &[Vec<u8>]) -> Vec<u8> {
    let mut entries = vec![utf8_entry(name), class_entry(1)];
    for reference in referenced {
        entries.push(utf8_entry(reference));
        let name_index = u16::try_from(entries.len()).unwrap();
        entries.push(class_entry(name_index));
    }
    entries.push(utf8_entry("Code"));
    entries.push(utf8_entry("run"));
    entries.push(utf8_entry("()V"));
    let (count, pool) = pool_bytes(&entries);

    let mut bytes = 0xCAFE_BABEu32.to_be_bytes().to_vec();
    bytes.extend(0u16.to_be_bytes());
    bytes.extend(52u16.to_be_bytes());
    bytes.extend(count.to_be_bytes());
    bytes.extend(pool);
    bytes.extend(0x0021u16.to_be_bytes());
    bytes.extend(2u16.to_be_bytes());
    bytes.extend(0u16.to_be_bytes());
    bytes.extend(0u16.to_be_bytes());
    bytes.extend(0u16.to_be_bytes());
    bytes.extend(u16::try_from(methods.len()).unwrap().to_be_bytes());
    for method in methods {
        bytes.extend(method);
    }
    bytes.extend(0u16.to_be_bytes());
    bytes
}

/// A static `run()V` method record wrapping the given bytecode. The pool
/// indexes match the layout of [`class_image_with_methods`]: the three
/// trailing strings are `Code`, `run`, and `()V`.
pub fn run_method(referenced_count: usize, bytecode: &[u8]) -> Vec<u8> {
    let base = u16::try_from(2 + 2 * referenced_count).unwrap();
    let code_name = base + 1;
    let method_name = base + 2;
    let descriptor = base + 3;

    let mut body = Vec::new();
    body.extend(8u16.to_be_bytes());
    body.extend(8u16.to_be_bytes());
    body.extend(u32::try_from(bytecode.len()).unwrap().to_be_bytes());
    body.extend(bytecode);
    body.extend(0u16.to_be_bytes());
    body.extend(0u16.to_be_bytes());

    let mut bytes = Vec::new();
    bytes.extend(0x0008u16.to_be_bytes());
    bytes.extend(method_name.to_be_bytes());
    bytes.extend(descriptor.to_be_bytes());
    bytes.extend(1u16.to_be_bytes());
    bytes.extend(code_name.to_be_bytes());
    bytes.extend(u32::try_from(body.len()).unwrap().to_be_bytes());
    bytes.extend(body);
    bytes
}

/// Per-name load counters shared with the test body.
pub type LoadCounts = Rc<RefCell<HashMap<String, usize>>>;

/// A class path scripted from in-memory classfile images, counting how
/// often each member is read.
#[derive(Debug, Default)]
pub struct MockClassPath {
    classes: HashMap<String, Vec<u8>>,
    loads: LoadCounts,
}

impl MockClassPath {
    pub fn new(classes: impl IntoIterator<Item = (String, Vec<u8>)>) -> Self {
        Self {
            classes: classes.into_iter().collect(),
            loads: Rc::default(),
        }
    }

    pub fn with_class(mut self, name: &str, image: Vec<u8>) -> Self {
        self.classes.insert(name.to_owned(), image);
        self
    }

    pub fn load_counts(&self) -> LoadCounts {
        Rc::clone(&self.loads)
    }
}

impl ClassPath for MockClassPath {
    fn find_class(&mut self, binary_name: &str) -> Result<ClassFile, class_loader::Error> {
        let Some(image) = self.classes.get(binary_name) else {
            return Err(class_loader::Error::ArchiveMemberMissing(format!(
                "{binary_name}.class"
            )));
        };
        *self
            .loads
            .borrow_mut()
            .entry(binary_name.to_owned())
            .or_insert(0) += 1;
        Ok(ClassFile::from_reader(&mut image.as_slice())?)
    }
}
