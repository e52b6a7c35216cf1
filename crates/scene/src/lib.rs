//! Renderable tree: the client-facing, backend-agnostic scene description.
//!
//! # Invariants
//! - The client owns every renderable; nothing downstream keeps one alive.
//! - Child order is insertion order.
//! - A node has at most one parent and is never its own ancestor.
//! - Structural edits advance the parent's modified time.

mod kinds;
mod renderable;

pub use kinds::{RenderableKind, props, tags};
pub use renderable::{Renderable, SceneError, WeakRenderable};

pub fn crate_info() -> &'static str {
    "sceneview-scene v0.1.0"
}
