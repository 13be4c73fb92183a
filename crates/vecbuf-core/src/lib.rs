//! Core types and traits for the vecbuf containers.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the pieces every vector is built from:
//!
//! - [`ElementLayout`]: the validated, immutable per-vector configuration
//!   (element byte size and alignment).
//! - [`Allocator`]: the raw-memory collaborator, with [`Heap`] as the
//!   default implementation over the global allocator.
//! - [`VecError`] and [`AllocError`]: the error vocabulary.
//!
//! `unsafe` is confined to the [`alloc`] module.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod alloc;
pub mod error;
pub mod layout;

pub use alloc::{Allocator, Heap};
pub use error::{AllocError, VecError};
pub use layout::ElementLayout;
