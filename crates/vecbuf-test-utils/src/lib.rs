//! Test utilities for vecbuf development.
//!
//! - [`FailingAllocator`]: forwards to the heap until told to fail, for
//!   checking that failed operations leave a vector unchanged.
//! - [`CountingAllocator`]: forwards to the heap and tracks live bytes and
//!   call counts, for leak and lifecycle checks.
//! - [`init_tracing`]: route `tracing` output to the test harness.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod allocators;

pub use allocators::{CountingAllocator, FailingAllocator};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a test-writer subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env())
        .try_init();
}
