//! UI / rendering layer.  Everything that touches Ratatui widgets.
//!
//! This layer takes the *core* data structures and turns them into cells on
//! the terminal.  No filesystem I/O happens here.

pub mod detail;
pub mod gallery;
pub mod layout;
pub mod popup;
pub mod spinner;
pub mod theme;
