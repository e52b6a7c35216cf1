//! View nodes: the backend-side mirror of the renderable tree.
//!
//! # Invariants
//!
//! - A view node references exactly one renderable, weakly. It never keeps
//!   the client's tree alive.
//! - After a build pass, a node's children mirror the subset of its
//!   renderable's children the registry resolves, in discovery order, with
//!   at most one view node per renderable.
//! - `NodeBehavior::release` runs at most once per node. A released node is
//!   `Removed` and rejects `build`/`render` with `InvalidState`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use sceneview_object::{
    Capability, Hierarchy, ObjectId, ObjectState, TypeTag, current_mtime, first_ancestor_of_type,
};
use sceneview_scene::{Renderable, WeakRenderable};

use crate::context::SharedContext;
use crate::error::TraversalError;
use crate::phase::{NodeState, Pass, Phase};
use crate::registry::FactoryRegistry;

/// Tag carried by every view node.
pub const VIEW_NODE: TypeTag = TypeTag::new("ViewNode");
/// Role of the node that owns the graphics context for its subtree.
pub const ROOT_CONTEXT: TypeTag = TypeTag::new("RenderWindowView");

/// Per-kind behavior of a view node, owned exclusively by that node.
///
/// Implementations must not call back into the orchestrator, and must not
/// release the node they are invoked on.
pub trait NodeBehavior {
    /// Most-derived tag of the view node this behavior implements.
    fn tag(&self) -> TypeTag;

    /// Extra tags the node carries between `ViewNode` and [`Self::tag`],
    /// e.g. [`ROOT_CONTEXT`].
    fn roles(&self) -> &'static [TypeTag] {
        &[]
    }

    /// Build-pass hook. By default, `Enter` synchronizes the node's children
    /// with its renderable's children.
    fn build(&mut self, node: &ViewNode, phase: Phase) -> Result<(), TraversalError> {
        if phase == Phase::Enter {
            if let Some(renderable) = node.renderable() {
                node.sync_children(&renderable.children())?;
            }
        }
        Ok(())
    }

    /// Render-pass hook.
    fn render(&mut self, _node: &ViewNode, _phase: Phase) -> Result<(), TraversalError> {
        Ok(())
    }

    /// Free backend resources. Called exactly once, after the node's
    /// children have been released.
    fn release(&mut self, _node: &ViewNode) {}
}

struct NodeInner {
    state: ObjectState,
    renderable: WeakRenderable,
    renderable_id: ObjectId,
    registry: Arc<FactoryRegistry>,
    behavior: RefCell<Box<dyn NodeBehavior>>,
    parent: RefCell<Weak<NodeInner>>,
    children: RefCell<Vec<ViewNode>>,
    lifecycle: Cell<NodeState>,
    synced_mtime: Cell<u64>,
    visited: Cell<bool>,
    context: RefCell<Option<SharedContext>>,
}

/// Shared handle to a view node.
#[derive(Clone)]
pub struct ViewNode(Rc<NodeInner>);

impl ViewNode {
    /// Create the root of a view tree for `renderable`.
    pub fn new_root(
        renderable: &Renderable,
        registry: Arc<FactoryRegistry>,
    ) -> Result<Self, TraversalError> {
        Self::create(renderable, &registry)
            .ok_or_else(|| TraversalError::UnsupportedRoot(renderable.tags()))
    }

    fn create(renderable: &Renderable, registry: &Arc<FactoryRegistry>) -> Option<Self> {
        let (matched, behavior) = registry.create(&renderable.tags())?;

        let mut capabilities = vec![Capability::new(VIEW_NODE)];
        capabilities.extend(behavior.roles().iter().map(|role| Capability::new(*role)));
        capabilities.push(Capability::new(behavior.tag()));
        let state = ObjectState::with_capabilities(&capabilities);

        tracing::debug!(
            renderable = %renderable.id().short(),
            %matched,
            node = %behavior.tag(),
            "view node created"
        );

        Some(Self(Rc::new(NodeInner {
            state,
            renderable: renderable.downgrade(),
            renderable_id: renderable.id(),
            registry: registry.clone(),
            behavior: RefCell::new(behavior),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            lifecycle: Cell::new(NodeState::Unbuilt),
            synced_mtime: Cell::new(0),
            visited: Cell::new(false),
            context: RefCell::new(None),
        })))
    }

    // -- identity ------------------------------------------------------------

    pub fn id(&self) -> ObjectId {
        self.0.state.id()
    }

    pub fn tags(&self) -> &[TypeTag] {
        self.0.state.tags()
    }

    pub fn class_name(&self) -> TypeTag {
        self.0.state.class_name()
    }

    pub fn is_a(&self, tag: TypeTag) -> bool {
        self.0.state.is_a(tag)
    }

    /// The mirrored renderable, if the client still holds it.
    pub fn renderable(&self) -> Option<Renderable> {
        self.0.renderable.upgrade()
    }

    pub fn renderable_id(&self) -> ObjectId {
        self.0.renderable_id
    }

    pub fn registry(&self) -> &Arc<FactoryRegistry> {
        &self.0.registry
    }

    pub fn ptr_eq(&self, other: &ViewNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // -- lifecycle -----------------------------------------------------------

    /// Current lifecycle state. `Stale` is derived from the renderable's
    /// modified time.
    pub fn state(&self) -> NodeState {
        match self.0.lifecycle.get() {
            NodeState::Built => match self.renderable() {
                Some(r) if r.mtime() > self.0.synced_mtime.get() => NodeState::Stale,
                _ => NodeState::Built,
            },
            other => other,
        }
    }

    pub fn is_removed(&self) -> bool {
        self.0.lifecycle.get() == NodeState::Removed
    }

    /// Clock value recorded when the last build pass left this node.
    pub fn synced_mtime(&self) -> u64 {
        self.0.synced_mtime.get()
    }

    // -- tree ----------------------------------------------------------------

    pub fn parent(&self) -> Option<ViewNode> {
        self.0.parent.borrow().upgrade().map(ViewNode)
    }

    /// Snapshot of the child list.
    pub fn children(&self) -> Vec<ViewNode> {
        self.0.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.children.borrow().len()
    }

    pub fn first_ancestor_of_type(&self, tag: TypeTag) -> Option<ViewNode> {
        first_ancestor_of_type(self, tag)
    }

    /// Depth-first search of this subtree for the node mirroring
    /// `renderable`.
    pub fn view_node_for(&self, renderable: &Renderable) -> Option<ViewNode> {
        if self.0.renderable_id == renderable.id() {
            return Some(self.clone());
        }
        self.children()
            .iter()
            .find_map(|child| child.view_node_for(renderable))
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(ViewNode::subtree_len)
            .sum::<usize>()
    }

    /// Nodes in this subtree that are not up to date (`Unbuilt` or `Stale`).
    pub fn count_stale(&self) -> usize {
        let own = matches!(self.state(), NodeState::Unbuilt | NodeState::Stale) as usize;
        own + self
            .children()
            .iter()
            .map(ViewNode::count_stale)
            .sum::<usize>()
    }

    // -- graphics context ----------------------------------------------------

    pub fn context(&self) -> Option<SharedContext> {
        self.0.context.borrow().clone()
    }

    pub fn set_context(&self, context: Option<SharedContext>) {
        *self.0.context.borrow_mut() = context;
    }

    /// The context owned by this node or by the nearest ancestor with the
    /// root-context role.
    pub fn graphics_context(&self) -> Result<SharedContext, TraversalError> {
        let owner = if self.is_a(ROOT_CONTEXT) {
            Some(self.clone())
        } else {
            self.first_ancestor_of_type(ROOT_CONTEXT)
        };
        owner
            .and_then(|node| node.context())
            .ok_or(TraversalError::MissingContext { node: self.id() })
    }

    // -- traversal -----------------------------------------------------------

    pub fn build(&self, phase: Phase) -> Result<(), TraversalError> {
        self.apply(Pass::Build, phase)
    }

    pub fn render(&self, phase: Phase) -> Result<(), TraversalError> {
        self.apply(Pass::Render, phase)
    }

    fn apply(&self, pass: Pass, phase: Phase) -> Result<(), TraversalError> {
        let state = self.state();
        if state == NodeState::Removed {
            return Err(TraversalError::InvalidState {
                node: self.id(),
                operation: match pass {
                    Pass::Build => "build",
                    Pass::Render => "render",
                },
            });
        }
        if pass == Pass::Render && state != NodeState::Built {
            return Err(TraversalError::StaleRender {
                node: self.id(),
                class: self.class_name(),
            });
        }
        if pass == Pass::Build && phase == Phase::Enter && !self.0.renderable.is_alive() {
            tracing::trace!(node = %self.id().short(), "renderable dropped, build skipped");
            return Ok(());
        }

        tracing::trace!(node = %self.id().short(), class = %self.class_name(), %pass, ?phase, "apply");
        {
            let mut behavior =
                self.0
                    .behavior
                    .try_borrow_mut()
                    .map_err(|_| TraversalError::Reentrant {
                        node: self.id(),
                        pass,
                    })?;
            match pass {
                Pass::Build => behavior.build(self, phase)?,
                Pass::Render => behavior.render(self, phase)?,
            }
        }

        if pass == Pass::Build && phase == Phase::Leave && !self.is_removed() {
            self.0.lifecycle.set(NodeState::Built);
            self.0.synced_mtime.set(current_mtime());
        }
        Ok(())
    }

    /// Run `pass` over this subtree: `Enter`, every child, then `Leave`.
    ///
    /// Children are snapshotted after `Enter`. A child that turns out to be
    /// removed is logged and skipped; its siblings still run.
    pub fn traverse(&self, pass: Pass) -> Result<(), TraversalError> {
        self.apply(pass, Phase::Enter)?;
        for child in self.children() {
            match child.traverse(pass) {
                Err(TraversalError::InvalidState { node, operation }) => {
                    tracing::warn!(%node, operation, "skipping removed view node");
                }
                other => other?,
            }
        }
        self.apply(pass, Phase::Leave)
    }

    // -- add / remove --------------------------------------------------------

    fn ensure_live(&self, operation: &'static str) -> Result<(), TraversalError> {
        if self.is_removed() {
            return Err(TraversalError::InvalidState {
                node: self.id(),
                operation,
            });
        }
        Ok(())
    }

    /// Clear the visited mark of every child.
    pub fn prepare_nodes(&self) {
        for child in self.0.children.borrow().iter() {
            child.0.visited.set(false);
        }
    }

    /// Mark the child mirroring each renderable as visited, creating it
    /// through the registry when missing. Renderables the registry cannot
    /// resolve, or that were deleted, are skipped. Returns how many nodes
    /// were created.
    pub fn add_missing_nodes(&self, renderables: &[Renderable]) -> Result<usize, TraversalError> {
        self.ensure_live("add_missing_nodes")?;
        let mut created = 0;
        for renderable in renderables {
            if renderable.is_deleted() {
                tracing::trace!(renderable = %renderable.id().short(), "deleted renderable skipped");
                continue;
            }
            let existing = self
                .0
                .children
                .borrow()
                .iter()
                .find(|child| child.0.renderable_id == renderable.id())
                .cloned();
            if let Some(child) = existing {
                child.0.visited.set(true);
                continue;
            }
            match Self::create(renderable, &self.0.registry) {
                Some(child) => {
                    child.0.visited.set(true);
                    *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
                    self.0.children.borrow_mut().push(child);
                    created += 1;
                }
                None => {
                    tracing::trace!(
                        renderable = %renderable.id().short(),
                        class = %renderable.class_name(),
                        "no view node constructor, skipped"
                    );
                }
            }
        }
        Ok(created)
    }

    /// Unlink and release every child that was not visited since the last
    /// [`Self::prepare_nodes`], or whose renderable is gone. Returns how many
    /// nodes were released.
    pub fn remove_unused_nodes(&self) -> Result<usize, TraversalError> {
        self.ensure_live("remove_unused_nodes")?;
        let unused: Vec<ViewNode> = {
            let mut children = self.0.children.borrow_mut();
            let (keep, unused) = std::mem::take(&mut *children)
                .into_iter()
                .partition(|child| child.0.visited.get() && child.0.renderable.is_alive());
            *children = keep;
            unused
        };
        let mut released = 0;
        for node in unused {
            if node.release() {
                released += 1;
            }
        }
        Ok(released)
    }

    /// [`Self::prepare_nodes`], [`Self::add_missing_nodes`] and
    /// [`Self::remove_unused_nodes`] in one call. Returns `(added, removed)`.
    pub fn sync_children(&self, renderables: &[Renderable]) -> Result<(usize, usize), TraversalError> {
        self.prepare_nodes();
        let added = self.add_missing_nodes(renderables)?;
        let removed = self.remove_unused_nodes()?;
        Ok((added, removed))
    }

    /// Release this subtree bottom-up and detach it from its parent.
    ///
    /// Returns false if the node was already released.
    pub fn release(&self) -> bool {
        if self.is_removed() {
            return false;
        }
        self.0.lifecycle.set(NodeState::Removed);

        let children = std::mem::take(&mut *self.0.children.borrow_mut());
        for child in &children {
            child.release();
        }

        match self.0.behavior.try_borrow_mut() {
            Ok(mut behavior) => behavior.release(self),
            Err(_) => tracing::warn!(
                node = %self.id(),
                "view node released from inside its own hook, backend release skipped"
            ),
        }

        self.set_context(None);
        if let Some(parent) = self.parent() {
            parent
                .0
                .children
                .borrow_mut()
                .retain(|child| !Rc::ptr_eq(&child.0, &self.0));
        }
        *self.0.parent.borrow_mut() = Weak::new();
        tracing::debug!(node = %self.id().short(), class = %self.class_name(), "view node released");
        true
    }
}

impl Hierarchy for ViewNode {
    fn parent(&self) -> Option<Self> {
        ViewNode::parent(self)
    }

    fn is_a(&self, tag: TypeTag) -> bool {
        ViewNode::is_a(self, tag)
    }
}

impl PartialEq for ViewNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ViewNode {}

impl fmt::Debug for ViewNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewNode")
            .field("class", &self.class_name())
            .field("id", &self.id().short())
            .field("renderable", &self.0.renderable_id.short())
            .field("state", &self.state())
            .field("children", &self.child_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sceneview_scene::{RenderableKind, props, tags};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WINDOW_NODE: TypeTag = TypeTag::new("TestWindow");
    const RENDERER_NODE: TypeTag = TypeTag::new("TestRenderer");
    const ACTOR_NODE: TypeTag = TypeTag::new("TestActor");

    struct Plain {
        tag: TypeTag,
        roles: &'static [TypeTag],
        releases: Arc<AtomicUsize>,
    }

    impl NodeBehavior for Plain {
        fn tag(&self) -> TypeTag {
            self.tag
        }

        fn roles(&self) -> &'static [TypeTag] {
            self.roles
        }

        fn release(&mut self, _node: &ViewNode) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn plain(
        releases: &Arc<AtomicUsize>,
        tag: TypeTag,
        roles: &'static [TypeTag],
    ) -> impl Fn() -> Box<dyn NodeBehavior> + Send + Sync + 'static {
        let releases = releases.clone();
        move || -> Box<dyn NodeBehavior> {
            Box::new(Plain {
                tag,
                roles,
                releases: releases.clone(),
            })
        }
    }

    // No camera node, so cameras are unresolvable.
    fn registry(releases: &Arc<AtomicUsize>) -> Arc<FactoryRegistry> {
        let mut registry = FactoryRegistry::new();
        registry.register(tags::RENDER_WINDOW, plain(releases, WINDOW_NODE, &[ROOT_CONTEXT]));
        registry.register(tags::RENDERER, plain(releases, RENDERER_NODE, &[]));
        registry.register(tags::PROP, plain(releases, ACTOR_NODE, &[]));
        Arc::new(registry)
    }

    struct Scene {
        window: Renderable,
        renderer: Renderable,
        actors: Vec<Renderable>,
        camera: Renderable,
    }

    fn scene() -> Scene {
        let window = Renderable::new(RenderableKind::RenderWindow);
        let renderer = Renderable::new(RenderableKind::Renderer);
        let camera = Renderable::new(RenderableKind::Camera);
        let actors = vec![
            Renderable::new(RenderableKind::Actor),
            Renderable::new(RenderableKind::Volume),
        ];
        window.add_child(&renderer).unwrap();
        renderer.add_child(&camera).unwrap();
        for actor in &actors {
            renderer.add_child(actor).unwrap();
        }
        Scene {
            window,
            renderer,
            actors,
            camera,
        }
    }

    fn assert_isomorphic(node: &ViewNode, registry: &FactoryRegistry) {
        let renderable = node.renderable().unwrap();
        let expected: Vec<ObjectId> = renderable
            .children()
            .iter()
            .filter(|r| registry.resolves(&r.tags()))
            .map(Renderable::id)
            .collect();
        let actual: Vec<ObjectId> = node.children().iter().map(ViewNode::renderable_id).collect();
        assert_eq!(actual, expected);
        for child in node.children() {
            assert_eq!(child.parent().as_ref(), Some(node));
            assert_isomorphic(&child, registry);
        }
    }

    #[test]
    fn build_pass_mirrors_resolvable_subset() {
        let releases = Arc::new(AtomicUsize::new(0));
        let registry = registry(&releases);
        let s = scene();
        let root = ViewNode::new_root(&s.window, registry.clone()).unwrap();
        assert_eq!(root.state(), NodeState::Unbuilt);

        root.traverse(Pass::Build).unwrap();

        assert_isomorphic(&root, &registry);
        assert_eq!(root.subtree_len(), 4);
        assert_eq!(root.count_stale(), 0);
        assert!(root.view_node_for(&s.camera).is_none());
        let renderer = root.view_node_for(&s.renderer).unwrap();
        assert_eq!(renderer.class_name(), RENDERER_NODE);
        assert_eq!(renderer.tags(), &[VIEW_NODE, RENDERER_NODE]);
        assert!(root.is_a(ROOT_CONTEXT));
    }

    #[test]
    fn rebuild_tracks_structural_changes() {
        let releases = Arc::new(AtomicUsize::new(0));
        let registry = registry(&releases);
        let s = scene();
        let root = ViewNode::new_root(&s.window, registry.clone()).unwrap();
        root.traverse(Pass::Build).unwrap();

        let renderer = root.view_node_for(&s.renderer).unwrap();
        let kept = root.view_node_for(&s.actors[1]).unwrap();
        s.renderer.remove_child(&s.actors[0]).unwrap();
        let added = Renderable::new(RenderableKind::Actor);
        s.renderer.add_child(&added).unwrap();
        assert_eq!(renderer.state(), NodeState::Stale);

        root.traverse(Pass::Build).unwrap();

        assert_isomorphic(&root, &registry);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert!(root.view_node_for(&s.actors[0]).is_none());
        assert!(root.view_node_for(&s.actors[1]).unwrap().ptr_eq(&kept));
        assert_eq!(renderer.state(), NodeState::Built);
    }

    #[test]
    fn remove_unused_twice_is_a_noop() {
        let releases = Arc::new(AtomicUsize::new(0));
        let registry = registry(&releases);
        let s = scene();
        let root = ViewNode::new_root(&s.window, registry).unwrap();
        root.traverse(Pass::Build).unwrap();
        let renderer = root.view_node_for(&s.renderer).unwrap();

        renderer.prepare_nodes();
        renderer.add_missing_nodes(&s.actors[..1]).unwrap();
        assert_eq!(renderer.remove_unused_nodes().unwrap(), 1);
        assert_eq!(renderer.remove_unused_nodes().unwrap(), 0);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert_eq!(renderer.child_count(), 1);
    }

    #[test]
    fn dropped_renderables_are_pruned() {
        let releases = Arc::new(AtomicUsize::new(0));
        let registry = registry(&releases);
        let window = Renderable::new(RenderableKind::RenderWindow);
        let root = ViewNode::new_root(&window, registry).unwrap();
        {
            let renderer = Renderable::new(RenderableKind::Renderer);
            root.add_missing_nodes(std::slice::from_ref(&renderer)).unwrap();
            assert_eq!(root.child_count(), 1);
        }
        // Still visited, but the renderable is gone.
        assert_eq!(root.remove_unused_nodes().unwrap(), 1);
        assert_eq!(root.child_count(), 0);
    }

    #[test]
    fn release_is_bottom_up_and_once() {
        let releases = Arc::new(AtomicUsize::new(0));
        let registry = registry(&releases);
        let s = scene();
        let root = ViewNode::new_root(&s.window, registry).unwrap();
        root.traverse(Pass::Build).unwrap();
        let renderer = root.view_node_for(&s.renderer).unwrap();

        assert!(renderer.release());
        assert!(!renderer.release());
        assert_eq!(releases.load(Ordering::SeqCst), 3);
        assert_eq!(renderer.state(), NodeState::Removed);
        assert!(renderer.parent().is_none());
        assert_eq!(root.child_count(), 0);
    }

    #[test]
    fn removed_node_rejects_calls() {
        let releases = Arc::new(AtomicUsize::new(0));
        let registry = registry(&releases);
        let s = scene();
        let root = ViewNode::new_root(&s.window, registry).unwrap();
        root.release();

        for result in [
            root.build(Phase::Enter),
            root.render(Phase::Leave),
            root.traverse(Pass::Build),
        ] {
            assert!(matches!(result, Err(TraversalError::InvalidState { .. })));
        }
        assert!(root.add_missing_nodes(&[s.renderer.clone()]).is_err());
    }

    #[test]
    fn render_before_build_is_rejected() {
        let releases = Arc::new(AtomicUsize::new(0));
        let registry = registry(&releases);
        let s = scene();
        let root = ViewNode::new_root(&s.window, registry).unwrap();
        assert!(matches!(
            root.render(Phase::Enter),
            Err(TraversalError::StaleRender { .. })
        ));
        root.traverse(Pass::Build).unwrap();
        root.traverse(Pass::Render).unwrap();
    }

    #[test]
    fn property_change_marks_node_stale() {
        let releases = Arc::new(AtomicUsize::new(0));
        let registry = registry(&releases);
        let s = scene();
        let root = ViewNode::new_root(&s.window, registry).unwrap();
        root.traverse(Pass::Build).unwrap();
        let actor = root.view_node_for(&s.actors[0]).unwrap();
        assert_eq!(actor.state(), NodeState::Built);

        assert!(s.actors[0].set(props::VISIBILITY, false).unwrap());
        assert_eq!(actor.state(), NodeState::Stale);
        assert_eq!(root.count_stale(), 1);

        root.traverse(Pass::Build).unwrap();
        assert_eq!(actor.state(), NodeState::Built);
        assert!(actor.synced_mtime() >= s.actors[0].mtime());
    }

    #[test]
    fn build_enter_without_renderable_is_noop() {
        let releases = Arc::new(AtomicUsize::new(0));
        let registry = registry(&releases);
        let root = {
            let window = Renderable::new(RenderableKind::RenderWindow);
            ViewNode::new_root(&window, registry).unwrap()
        };
        assert!(root.renderable().is_none());
        root.build(Phase::Enter).unwrap();
        assert_eq!(root.child_count(), 0);
    }

    #[test]
    fn unsupported_root_is_an_error() {
        let releases = Arc::new(AtomicUsize::new(0));
        let registry = registry(&releases);
        let camera = Renderable::new(RenderableKind::Camera);
        let err = ViewNode::new_root(&camera, registry).unwrap_err();
        assert!(matches!(err, TraversalError::UnsupportedRoot(found) if found.contains(&tags::CAMERA)));
    }

    #[test]
    fn context_is_found_on_root() {
        let releases = Arc::new(AtomicUsize::new(0));
        let registry = registry(&releases);
        let s = scene();
        let root = ViewNode::new_root(&s.window, registry).unwrap();
        root.traverse(Pass::Build).unwrap();
        let actor = root.view_node_for(&s.actors[0]).unwrap();

        assert!(matches!(
            actor.graphics_context(),
            Err(TraversalError::MissingContext { .. })
        ));
        root.set_context(Some(crate::context::RecordingContext::shared(8, 8)));
        assert!(actor.graphics_context().is_ok());
        assert!(root.graphics_context().is_ok());
        assert_eq!(
            actor.first_ancestor_of_type(ROOT_CONTEXT).as_ref(),
            Some(&root)
        );
    }
}
