//! Application orchestration: state, event loop plumbing and input handling.

pub mod event;
pub mod handler;
pub mod media;
pub mod page;
pub mod settings;
pub mod state;
pub mod timers;
