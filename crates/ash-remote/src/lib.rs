//! Remote tree model and forge adapters for the ash workspace mirror
//!
//! The forge hosts a tree of groups: a root group holds sub-groups, each
//! sub-group holds projects. [`RemoteTree`] is the read-only view of that
//! tree the sync engine consumes; [`GlabRemote`] implements it on top of the
//! `glab` CLI and [`RetryingRemote`] adds backoff for transient failures.

pub mod error;
pub mod glab;
pub mod model;
pub mod remote;
pub mod retry;

pub use error::{Error, Result};
pub use glab::GlabRemote;
pub use model::{CloneUrls, Identified, LeafResource, NodeIdentity, Protocol, SubNode};
pub use remote::RemoteTree;
pub use retry::{RetryPolicy, RetryingRemote};
