//! View-node tree, two-phase traversal and the backend factory registry.
//!
//! The client owns a tree of renderables. A [`RenderView`] mirrors it with
//! a tree of [`ViewNode`]s built through a [`FactoryRegistry`], then walks
//! that tree twice per frame: a build pass that syncs shape and resources,
//! then a render pass that issues effects through a [`GraphicsContext`].
//!
//! # Invariants
//! - Each renderable has at most one view node per view tree.
//! - A subtree is completely built before the render pass touches it.
//! - Backend resources of a view node are released exactly once.
//! - View nodes never keep renderables alive.

mod context;
mod error;
mod node;
mod phase;
mod registry;
mod report;
mod view;

pub use context::{ClearMask, ContextCommand, GraphicsContext, RecordingContext, SharedContext};
pub use error::{ContextError, RegistryError, TraversalError};
pub use node::{NodeBehavior, ROOT_CONTEXT, VIEW_NODE, ViewNode};
pub use phase::{NodeState, Pass, Phase};
pub use registry::{FactoryRegistry, NodeConstructor};
pub use report::describe;
pub use view::{FrameStats, RenderConfig, RenderView};

pub fn crate_info() -> &'static str {
    "sceneview-render v0.1.0"
}
