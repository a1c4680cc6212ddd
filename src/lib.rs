#![warn(
    clippy::pedantic,
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms
)]
#![deny(rustdoc::broken_intra_doc_links)]

//! `cortado` is an embryonic Java Virtual Machine.
//!
//! The crate decodes `.class` artifacts from zip-compatible archives into a
//! validated in-memory representation, resolves classes lazily out of an
//! ordered list of archive sources, and executes method bytecode against a
//! stack-based operand model. See [`jvm`] for the module tree.

pub mod jvm;
pub(crate) mod macros;
