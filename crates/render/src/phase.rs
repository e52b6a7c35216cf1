use std::fmt;

/// Half of a two-part traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Top-down, before the node's children.
    Enter,
    /// Bottom-up, after all children.
    Leave,
}

/// Which protocol a traversal runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Synchronize view-tree shape and resources with the renderable tree.
    Build,
    /// Issue backend side effects.
    Render,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => f.write_str("build"),
            Self::Render => f.write_str("render"),
        }
    }
}

/// Lifecycle of a view node.
///
/// `Unbuilt → Built ⇄ Stale`, any of them `→ Removed` (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    /// Allocated, never completed a build.
    Unbuilt,
    /// Synced with its renderable as of the last build.
    Built,
    /// The renderable changed since the last build.
    Stale,
    /// Released and detached. Rejects further build and render calls.
    Removed,
}
