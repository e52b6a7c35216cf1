use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use sceneview_scene::{Renderable, props, tags};

use crate::context::SharedContext;
use crate::error::TraversalError;
use crate::node::ViewNode;
use crate::phase::Pass;
use crate::registry::FactoryRegistry;

/// Orchestrator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Initial surface width in pixels.
    pub width: u32,
    /// Initial surface height in pixels.
    pub height: u32,
    /// Build the view tree on the first `render()` instead of requiring
    /// `initialize()`.
    pub auto_initialize: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
            auto_initialize: true,
        }
    }
}

/// What one `render()` call did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    /// 1-based frame number.
    pub frame: u64,
    /// View nodes in the tree after the build pass.
    pub view_nodes: usize,
    /// Nodes that were unbuilt or stale when the frame started.
    pub stale_before_build: usize,
    pub build_time: Duration,
    pub render_time: Duration,
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {}: {} view nodes, {} stale, build {:?}, render {:?}",
            self.frame, self.view_nodes, self.stale_before_build, self.build_time, self.render_time
        )
    }
}

/// Drives the view tree for one render window.
///
/// Every `render()` runs exactly one build pass followed by exactly one
/// render pass. Mutate the renderable tree between frames, never during one.
pub struct RenderView {
    window: Renderable,
    registry: Arc<FactoryRegistry>,
    config: RenderConfig,
    root: Option<ViewNode>,
    context: Option<SharedContext>,
    frames: u64,
}

impl RenderView {
    pub fn new(window: Renderable, registry: Arc<FactoryRegistry>, config: RenderConfig) -> Self {
        Self {
            window,
            registry,
            config,
            root: None,
            context: None,
            frames: 0,
        }
    }

    /// Create the root view node and bind the surface to it. Calling it
    /// again is a no-op.
    pub fn initialize(&mut self) -> Result<(), TraversalError> {
        if self.root.is_some() {
            return Ok(());
        }
        let root = ViewNode::new_root(&self.window, self.registry.clone())?;
        root.set_context(self.context.clone());
        if self.window.get(props::WIDTH).is_some() {
            self.window.set(props::WIDTH, i64::from(self.config.width))?;
            self.window.set(props::HEIGHT, i64::from(self.config.height))?;
        }
        tracing::debug!(window = %self.window.id(), root = %root.class_name(), "render view initialized");
        self.root = Some(root);
        Ok(())
    }

    /// Build then render one frame.
    pub fn render(&mut self) -> Result<FrameStats, TraversalError> {
        if self.root.is_none() {
            if !self.config.auto_initialize {
                return Err(TraversalError::NotInitialized);
            }
            self.initialize()?;
        }
        let root = self.root.clone().ok_or(TraversalError::NotInitialized)?;

        let frame = self.frames + 1;
        let _frame = tracing::info_span!("frame", frame).entered();
        let stale_before_build = root.count_stale();

        let started = Instant::now();
        {
            let _pass = tracing::info_span!("pass", pass = %Pass::Build).entered();
            root.traverse(Pass::Build)?;
        }
        let build_time = started.elapsed();

        let started = Instant::now();
        {
            let _pass = tracing::info_span!("pass", pass = %Pass::Render).entered();
            if let Err(err) = root.traverse(Pass::Render) {
                Self::abort_frame(&root);
                return Err(err);
            }
        }
        let render_time = started.elapsed();

        self.frames = frame;
        let stats = FrameStats {
            frame,
            view_nodes: root.subtree_len(),
            stale_before_build,
            build_time,
            render_time,
        };
        tracing::trace!(%stats, "frame done");
        Ok(stats)
    }

    /// Close a frame the failed render pass left open, so the next frame
    /// can begin.
    fn abort_frame(root: &ViewNode) {
        if let Ok(context) = root.graphics_context() {
            match context.try_borrow_mut() {
                Ok(mut context) => context.abort_frame(),
                Err(_) => tracing::warn!("graphics context busy, frame left open"),
            }
        }
        tracing::warn!(node = %root.id().short(), "render pass failed, frame aborted");
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), TraversalError> {
        self.config.width = width;
        self.config.height = height;
        if self.window.get(props::WIDTH).is_some() {
            self.window.set(props::WIDTH, i64::from(width))?;
            self.window.set(props::HEIGHT, i64::from(height))?;
        }
        if let Some(context) = &self.context {
            context.borrow_mut().resize(width, height);
        }
        Ok(())
    }

    /// Attach a renderer to the window. Returns false if `renderer` is not
    /// a renderer.
    pub fn add_renderer(&self, renderer: &Renderable) -> Result<bool, TraversalError> {
        if !renderer.is_a(tags::RENDERER) {
            tracing::debug!(class = %renderer.class_name(), "not a renderer, ignored");
            return Ok(false);
        }
        Ok(self.window.add_child(renderer)?)
    }

    pub fn remove_renderer(&self, renderer: &Renderable) -> Result<bool, TraversalError> {
        if !renderer.is_a(tags::RENDERER) {
            return Ok(false);
        }
        Ok(self.window.remove_child(renderer)?)
    }

    /// Bind the graphics context the root view node renders through.
    pub fn set_surface(&mut self, context: SharedContext) {
        if let Some(root) = &self.root {
            root.set_context(Some(context.clone()));
        }
        self.context = Some(context);
    }

    pub fn root(&self) -> Option<&ViewNode> {
        self.root.as_ref()
    }

    pub fn window(&self) -> &Renderable {
        &self.window
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Text dump of the current view tree.
    pub fn describe(&self) -> String {
        match &self.root {
            Some(root) => crate::report::describe(root, self.frames),
            None => String::from("=== View Tree (uninitialized) ===\n"),
        }
    }
}

impl Drop for RenderView {
    fn drop(&mut self) {
        if let Some(root) = self.root.take() {
            root.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{GraphicsContext, RecordingContext};
    use crate::node::{NodeBehavior, ROOT_CONTEXT};
    use crate::phase::{NodeState, Phase};
    use sceneview_object::TypeTag;
    use sceneview_scene::RenderableKind;

    struct Window;

    impl NodeBehavior for Window {
        fn tag(&self) -> TypeTag {
            TypeTag::new("TestWindow")
        }

        fn roles(&self) -> &'static [TypeTag] {
            &[ROOT_CONTEXT]
        }

        fn render(&mut self, node: &ViewNode, phase: Phase) -> Result<(), TraversalError> {
            let context = node.graphics_context()?;
            let mut context = context.borrow_mut();
            match phase {
                Phase::Enter => context.begin_frame()?,
                Phase::Leave => context.present()?,
            }
            Ok(())
        }
    }

    struct Leaf;

    impl NodeBehavior for Leaf {
        fn tag(&self) -> TypeTag {
            TypeTag::new("TestLeaf")
        }
    }

    fn registry() -> Arc<FactoryRegistry> {
        let mut registry = FactoryRegistry::new();
        registry.register(tags::RENDER_WINDOW, || Box::new(Window));
        registry.register(tags::OBJECT, || Box::new(Leaf));
        Arc::new(registry)
    }

    #[test]
    fn render_runs_build_then_render() {
        let window = Renderable::new(RenderableKind::RenderWindow);
        let recording = RecordingContext::shared(300, 300);
        let mut view = RenderView::new(window, registry(), RenderConfig::default());
        view.set_surface(recording.clone());

        let renderer = Renderable::new(RenderableKind::Renderer);
        assert!(view.add_renderer(&renderer).unwrap());
        let stats = view.render().unwrap();

        assert_eq!(stats.frame, 1);
        assert_eq!(stats.view_nodes, 2);
        assert_eq!(stats.stale_before_build, 1);
        assert_eq!(view.frame_count(), 1);
        assert_eq!(recording.borrow().frames_presented(), 1);

        let stats = view.render().unwrap();
        assert_eq!(stats.stale_before_build, 0);
        assert_eq!(recording.borrow().frames_presented(), 2);
    }

    #[test]
    fn explicit_initialize_required_when_configured() {
        let window = Renderable::new(RenderableKind::RenderWindow);
        let config = RenderConfig {
            auto_initialize: false,
            ..RenderConfig::default()
        };
        let mut view = RenderView::new(window, registry(), config);
        view.set_surface(RecordingContext::shared(1, 1));
        assert!(matches!(view.render(), Err(TraversalError::NotInitialized)));

        view.initialize().unwrap();
        view.initialize().unwrap();
        assert!(view.render().is_ok());
    }

    #[test]
    fn initialize_applies_configured_size() {
        let window = Renderable::new(RenderableKind::RenderWindow);
        let config = RenderConfig {
            width: 640,
            height: 480,
            auto_initialize: true,
        };
        let mut view = RenderView::new(window.clone(), registry(), config);
        view.initialize().unwrap();
        assert_eq!(window.get_i64(props::WIDTH).unwrap(), 640);
        assert_eq!(window.get_i64(props::HEIGHT).unwrap(), 480);
    }

    #[test]
    fn resize_updates_window_and_surface() {
        let window = Renderable::new(RenderableKind::RenderWindow);
        let recording = RecordingContext::shared(300, 300);
        let mut view = RenderView::new(window.clone(), registry(), RenderConfig::default());
        view.set_surface(recording.clone());
        view.resize(800, 600).unwrap();

        assert_eq!(window.get_i64(props::WIDTH).unwrap(), 800);
        assert_eq!(recording.borrow().size(), (800, 600));
        assert_eq!(view.config().height, 600);
    }

    #[test]
    fn add_renderer_rejects_other_kinds() {
        let window = Renderable::new(RenderableKind::RenderWindow);
        let view = RenderView::new(window.clone(), registry(), RenderConfig::default());
        let actor = Renderable::new(RenderableKind::Actor);
        assert!(!view.add_renderer(&actor).unwrap());
        assert_eq!(window.child_count(), 0);

        let renderer = Renderable::new(RenderableKind::Renderer);
        view.add_renderer(&renderer).unwrap();
        assert!(view.remove_renderer(&renderer).unwrap());
        assert!(!view.remove_renderer(&renderer).unwrap());
    }

    #[test]
    fn unsupported_window_fails_initialize() {
        let camera = Renderable::new(RenderableKind::Camera);
        let mut view = RenderView::new(camera, Arc::new(FactoryRegistry::new()), RenderConfig::default());
        assert!(matches!(
            view.initialize(),
            Err(TraversalError::UnsupportedRoot(_))
        ));
    }

    #[test]
    fn drop_releases_the_tree() {
        let window = Renderable::new(RenderableKind::RenderWindow);
        let mut view = RenderView::new(window, registry(), RenderConfig::default());
        view.set_surface(RecordingContext::shared(1, 1));
        view.render().unwrap();
        let root = view.root().cloned().unwrap();
        drop(view);
        assert_eq!(root.state(), NodeState::Removed);
    }

    #[test]
    fn config_from_json_fills_defaults() {
        let config: RenderConfig = serde_json::from_str(r#"{ "width": 1024 }"#).unwrap();
        assert_eq!(config.width, 1024);
        assert_eq!(config.height, 300);
        assert!(config.auto_initialize);
    }
}
