//! Kanban Web Bridge
//!
//! Connects a JavaScript presentation layer to the kanban store: JSON
//! commands in, JSON replies and change notifications out.

mod bridge;

pub use bridge::{Bridge, BridgeError, Command, Reply};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{start, KanbanApp};
