//! wgpu backend for the view-node tree.
//!
//! Provides a view node for every renderable kind and a [`WgpuContext`]
//! that renders into offscreen color and depth targets.
//!
//! # Invariants
//! - Each renderer clears before any of its props render, inside its own
//!   debug group.
//! - Depth testing is enabled after every renderer clear.
//! - Debug groups opened on enter are closed on leave of the same node.

mod context;
mod nodes;

pub use context::{
    COLOR_FORMAT, DEPTH_FORMAT, WgpuContext, WgpuContextError, color_writes, depth_stencil_state,
    load_ops,
};
pub use nodes::{
    LeafNode, PropNode, RenderWindowNode, RendererNode, clear_mask, node_tags, register_nodes,
    registry,
};

pub fn crate_info() -> &'static str {
    "sceneview-render-wgpu v0.1.0"
}
