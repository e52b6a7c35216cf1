use sceneview_object::{ObjectError, ObjectId, TypeTag};
use sceneview_scene::SceneError;

use crate::phase::Pass;

/// Errors raised by a graphics context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("no frame in progress")]
    NoFrame,
    #[error("frame already in progress")]
    FrameInProgress,
    #[error("debug group stack is unbalanced")]
    UnbalancedDebugGroup,
    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors from building or rendering the view tree.
#[derive(Debug, thiserror::Error)]
pub enum TraversalError {
    /// Operation on a node that has been removed. Fatal to that call only;
    /// traversal catches it at the node boundary and moves on.
    #[error("{operation} on removed view node {node}")]
    InvalidState {
        node: ObjectId,
        operation: &'static str,
    },
    #[error("render reached view node {node} ({class}) before it was built")]
    StaleRender { node: ObjectId, class: TypeTag },
    #[error("view node {node} re-entered during its own {pass:?} call")]
    Reentrant { node: ObjectId, pass: Pass },
    #[error("no ancestor of view node {node} provides a graphics context")]
    MissingContext { node: ObjectId },
    #[error("no view node constructor for root renderable with tags {0:?}")]
    UnsupportedRoot(Vec<TypeTag>),
    #[error("render view not initialized")]
    NotInitialized,
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Object(#[from] ObjectError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Errors from the process-wide registry lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("a factory registry is already installed")]
    AlreadyInstalled,
}
