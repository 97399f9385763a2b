//! Shared test utilities for the ash workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not
//! re-implement fakes. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: git repository fixtures at two realism levels
//! - [`remote`]: [`remote::FakeRemote`], an in-memory remote tree
//! - [`vcs`]: [`vcs::FakeVcs`], a recording version-control executor
//! - [`workspace`]: [`workspace::TestWorkspace`] builder for managed directories

pub mod git;
pub mod remote;
pub mod vcs;
pub mod workspace;
