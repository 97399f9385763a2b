//! Filesystem primitives for the ash workspace mirror
//!
//! Provides the bookkeeping path names, crash-safe writes and a
//! JSON document store used for snapshot files.

pub mod constants;
pub mod error;
pub mod io;
pub mod store;

pub use constants::AshPath;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use store::DocumentStore;
