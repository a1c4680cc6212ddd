//! The virtual-machine root: configuration, the class registry, and the
//! id-keyed heap tables.

use std::{collections::HashMap, path::PathBuf};

use super::{
    class_loader::{self, ClassPath, ClassRegistry, class_paths::JarClassPath},
    frame::{self, Frame, OperandStack},
};

/// The class a machine falls back to when none is configured.
pub const DEFAULT_MAIN_CLASS: &str = "java/lang/Object";

/// Explicit machine configuration; there is no process-wide state.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Ordered archive list probed during class resolution.
    pub archives: Vec<PathBuf>,
    /// Binary name of the main class; [`DEFAULT_MAIN_CLASS`] when absent.
    pub main_class: Option<String>,
    /// Emit a trace line per executed opcode.
    pub trace: bool,
}

/// An error surfaced by a top-level machine operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A class could not be located or decoded.
    #[error(transparent)]
    Load(#[from] class_loader::Error),
    /// Bytecode execution failed.
    #[error(transparent)]
    Execution(#[from] frame::Error),
}

/// The entire machine: class registry, heap tables, and main-class handle.
#[derive(Debug)]
pub struct VirtualMachine {
    registry: ClassRegistry<Box<dyn ClassPath>>,
    heap: Heap,
    main_class: Option<String>,
    trace: bool,
}

impl VirtualMachine {
    /// Builds a machine from explicit options, opening every configured
    /// archive eagerly and loading the main class if one is named.
    ///
    /// # Errors
    /// [`class_loader::Error::ArchiveOpenFailed`] for an unreadable
    /// archive; any load failure of the configured main class.
    pub fn new(options: Options) -> Result<Self, Error> {
        let Options {
            archives,
            main_class,
            trace,
        } = options;
        let mut class_paths: Vec<Box<dyn ClassPath>> = Vec::with_capacity(archives.len());
        for path in archives {
            class_paths.push(Box::new(JarClassPath::open(path)?));
        }
        let mut vm = Self::with_class_paths(class_paths, trace);
        if let Some(name) = main_class {
            vm.set_main_class(&name)?;
        }
        Ok(vm)
    }

    /// Builds a machine over already-constructed class paths; used when
    /// the sources are not plain archives.
    #[must_use]
    pub fn with_class_paths(class_paths: Vec<Box<dyn ClassPath>>, trace: bool) -> Self {
        Self {
            registry: ClassRegistry::new(class_paths),
            heap: Heap::default(),
            main_class: None,
            trace,
        }
    }

    /// Loads the named class and remembers it as the main class.
    ///
    /// # Errors
    /// See [`class_loader::Error`].
    pub fn set_main_class(&mut self, binary_name: &str) -> Result<(), Error> {
        self.registry.load_class(binary_name)?;
        self.main_class = Some(binary_name.to_owned());
        Ok(())
    }

    /// The configured main class, if one has been set.
    #[must_use]
    pub fn main_class(&self) -> Option<&str> {
        self.main_class.as_deref()
    }

    /// Ensures the main class (configured or default) is loaded and
    /// reports the registry size. Running `<clinit>` and `main` belongs to
    /// a later revision.
    ///
    /// # Errors
    /// See [`class_loader::Error`].
    pub fn run_main(&mut self) -> Result<(), Error> {
        let main_class = self
            .main_class
            .clone()
            .unwrap_or_else(|| DEFAULT_MAIN_CLASS.to_owned());
        self.registry.load_class(&main_class)?;
        log::info!(
            "{} classes registered after loading {main_class}",
            self.registry.len()
        );
        Ok(())
    }

    /// Executes one method of a loaded class in a fresh frame and returns
    /// the frame's final operand stack.
    ///
    /// # Errors
    /// [`class_loader::Error::ClassNotFound`] when the class is not
    /// registered; any execution failure.
    pub fn execute_method(
        &mut self,
        binary_name: &str,
        method_index: u16,
    ) -> Result<OperandStack, Error> {
        let class = self
            .registry
            .get(binary_name)
            .ok_or_else(|| class_loader::Error::ClassNotFound(binary_name.to_owned()))?;
        let method = class
            .methods()
            .get(method_index)
            .map_err(frame::Error::from)?;
        let mut frame = Frame::new(class.constant_pool(), method)?.with_trace(self.trace);
        frame.run(&mut self.heap)?;
        Ok(frame.into_stack())
    }

    /// The class registry.
    #[must_use]
    pub const fn registry(&self) -> &ClassRegistry<Box<dyn ClassPath>> {
        &self.registry
    }

    /// The class registry, mutable.
    pub const fn registry_mut(&mut self) -> &mut ClassRegistry<Box<dyn ClassPath>> {
        &mut self.registry
    }

    /// The heap tables.
    #[must_use]
    pub const fn heap(&self) -> &Heap {
        &self.heap
    }

    /// The heap tables, mutable.
    pub const fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }
}

/// The id-keyed tables for heap-resident arrays and object instances.
/// Identifiers are what travel on the operand stack; 0 is the null
/// reference and is never handed out.
#[derive(Debug, Default)]
pub struct Heap {
    instances: HashMap<u32, Instance>,
    arrays: HashMap<u32, JavaArray>,
    next_reference: u32,
}

impl Heap {
    fn next_reference(&mut self) -> u32 {
        self.next_reference += 1;
        self.next_reference
    }

    /// Allocates a zeroed array of `length` slots and returns its id.
    pub fn alloc_array(&mut self, length: u32) -> u32 {
        let reference = self.next_reference();
        self.arrays.insert(reference, JavaArray::new(length));
        reference
    }

    /// Gets the array registered under `reference`.
    ///
    /// # Errors
    /// [`frame::Error::UnknownReference`] for an unregistered id.
    pub fn array(&self, reference: u32) -> Result<&JavaArray, frame::Error> {
        self.arrays
            .get(&reference)
            .ok_or(frame::Error::UnknownReference(reference))
    }

    /// Gets the array registered under `reference`, mutable.
    ///
    /// # Errors
    /// [`frame::Error::UnknownReference`] for an unregistered id.
    pub fn array_mut(&mut self, reference: u32) -> Result<&mut JavaArray, frame::Error> {
        self.arrays
            .get_mut(&reference)
            .ok_or(frame::Error::UnknownReference(reference))
    }

    /// Allocates an instance of the named class with no fields set.
    pub fn alloc_instance(&mut self, class_name: impl Into<String>) -> u32 {
        let reference = self.next_reference();
        self.instances.insert(reference, Instance::new(class_name));
        reference
    }

    /// Gets the instance registered under `reference`.
    ///
    /// # Errors
    /// [`frame::Error::UnknownReference`] for an unregistered id.
    pub fn instance(&self, reference: u32) -> Result<&Instance, frame::Error> {
        self.instances
            .get(&reference)
            .ok_or(frame::Error::UnknownReference(reference))
    }

    /// Gets the instance registered under `reference`, mutable.
    ///
    /// # Errors
    /// [`frame::Error::UnknownReference`] for an unregistered id.
    pub fn instance_mut(&mut self, reference: u32) -> Result<&mut Instance, frame::Error> {
        self.instances
            .get_mut(&reference)
            .ok_or(frame::Error::UnknownReference(reference))
    }
}

/// A heap array: a sized block of 64-bit slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaArray {
    storage: Vec<u64>,
}

impl JavaArray {
    fn new(length: u32) -> Self {
        Self {
            storage: vec![0; length as usize],
        }
    }

    /// The array length.
    #[must_use]
    pub fn length(&self) -> u32 {
        u32::try_from(self.storage.len()).unwrap_or(u32::MAX)
    }

    /// Reads a slot; out-of-range reads yield 0.
    #[must_use]
    pub fn get(&self, index: u32) -> u64 {
        self.storage.get(index as usize).copied().unwrap_or(0)
    }

    /// Writes a slot; out-of-range writes are ignored.
    pub fn set(&mut self, index: u32, value: u64) {
        if let Some(slot) = self.storage.get_mut(index as usize) {
            *slot = value;
        }
    }
}

/// A heap object instance: a field map keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    class_name: String,
    fields: HashMap<String, u64>,
}

impl Instance {
    fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            fields: HashMap::new(),
        }
    }

    /// The binary name of the instance's class.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Reads a field; unset fields read as 0.
    #[must_use]
    pub fn field(&self, name: &str) -> u64 {
        self.fields.get(name).copied().unwrap_or(0)
    }

    /// Writes a field.
    pub fn set_field(&mut self, name: impl Into<String>, value: u64) {
        self.fields.insert(name.into(), value);
    }
}
