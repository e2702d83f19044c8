//! Core gallery logic: catalog records, filter state, and persistence.
//!
//! Nothing in this module depends on any TUI or rendering crate.  Side
//! effects go through the [`storage::KeyValueStore`], [`scheduler::Scheduler`]
//! and [`viewport::Viewport`] ports so the controller runs unchanged under test.

pub mod catalog;
pub mod gallery;
pub mod records;
pub mod scheduler;
pub mod snapshot;
pub mod storage;
pub mod viewport;
