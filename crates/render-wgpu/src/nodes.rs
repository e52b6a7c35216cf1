//! View nodes for every renderable kind.

use sceneview_object::TypeTag;
use sceneview_render::{
    ClearMask, FactoryRegistry, NodeBehavior, Phase, ROOT_CONTEXT, TraversalError, ViewNode,
};
use sceneview_scene::{Renderable, props, tags};

pub mod node_tags {
    use sceneview_object::TypeTag;

    pub const RENDER_WINDOW: TypeTag = TypeTag::new("WgpuRenderWindow");
    pub const RENDERER: TypeTag = TypeTag::new("WgpuRenderer");
    pub const ACTOR: TypeTag = TypeTag::new("WgpuActor");
    pub const VOLUME: TypeTag = TypeTag::new("WgpuVolume");
    pub const MAPPER: TypeTag = TypeTag::new("WgpuMapper");
    pub const CAMERA: TypeTag = TypeTag::new("WgpuCamera");
}

/// Buffers a renderer clears at the start of its render.
pub fn clear_mask(transparent: bool, preserve_depth: bool) -> ClearMask {
    let mut mask = ClearMask::empty();
    if !transparent {
        mask |= ClearMask::COLOR;
    }
    if !preserve_depth {
        mask |= ClearMask::DEPTH;
    }
    mask
}

/// Register a node for every renderable kind this backend draws.
pub fn register_nodes(registry: &mut FactoryRegistry) {
    registry.register(tags::RENDER_WINDOW, || Box::new(RenderWindowNode));
    registry.register(tags::RENDERER, || Box::<RendererNode>::default());
    registry.register(tags::ACTOR, || Box::new(PropNode::new(node_tags::ACTOR)));
    registry.register(tags::VOLUME, || Box::new(PropNode::new(node_tags::VOLUME)));
    registry.register(tags::ABSTRACT_MAPPER, || Box::new(LeafNode(node_tags::MAPPER)));
    registry.register(tags::CAMERA, || Box::new(LeafNode(node_tags::CAMERA)));
}

/// A registry holding just this backend's nodes.
pub fn registry() -> FactoryRegistry {
    let mut registry = FactoryRegistry::new();
    register_nodes(&mut registry);
    registry
}

fn debug_label(renderable: &Renderable) -> String {
    let name = renderable.get_text(props::NAME).unwrap_or_default();
    if name.is_empty() {
        format!("{} {}", renderable.class_name(), renderable.id().short())
    } else {
        format!("{} {}", renderable.class_name(), name)
    }
}

/// Owns the graphics context: opens the frame on enter and presents it on
/// leave. Builds like any other node, mirroring every resolvable child.
pub struct RenderWindowNode;

impl NodeBehavior for RenderWindowNode {
    fn tag(&self) -> TypeTag {
        node_tags::RENDER_WINDOW
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

/// Clears its viewport and brackets its props in a debug group.
#[derive(Default)]
pub struct RendererNode {
    group_open: bool,
}

impl NodeBehavior for RendererNode {
    fn tag(&self) -> TypeTag {
        node_tags::RENDERER
    }

    fn build(&mut self, node: &ViewNode, phase: Phase) -> Result<(), TraversalError> {
        if phase != Phase::Enter {
            return Ok(());
        }
        let Some(renderer) = node.renderable() else {
            return Ok(());
        };
        node.prepare_nodes();
        node.add_missing_nodes(&renderer.children())?;
        node.remove_unused_nodes()?;
        Ok(())
    }

    fn render(&mut self, node: &ViewNode, phase: Phase) -> Result<(), TraversalError> {
        match phase {
            Phase::Enter => {
                let Some(renderer) = node.renderable() else {
                    return Ok(());
                };
                let context = node.graphics_context()?;
                let mut ctx = context.borrow_mut();
                ctx.push_debug_group(&debug_label(&renderer))?;
                self.group_open = true;

                let mask = clear_mask(
                    renderer.get_bool(props::TRANSPARENT)?,
                    renderer.get_bool(props::PRESERVE_DEPTH_BUFFER)?,
                );
                if mask.contains(ClearMask::COLOR) {
                    ctx.set_clear_color(renderer.get_vec3(props::BACKGROUND)?.extend(1.0));
                }
                if mask.contains(ClearMask::DEPTH) {
                    ctx.set_clear_depth(1.0);
                    ctx.set_depth_write(true);
                } else {
                    ctx.set_depth_write(false);
                }
                ctx.set_color_write([true; 4]);
                ctx.clear(mask)?;
                ctx.set_depth_test(true);
                tracing::trace!(renderer = %renderer.id().short(), ?mask, "renderer cleared");
            }
            Phase::Leave => {
                if self.group_open {
                    self.group_open = false;
                    node.graphics_context()?.borrow_mut().pop_debug_group()?;
                }
            }
        }
        Ok(())
    }
}

/// Actor or volume. Visible props get a debug group around their mapper.
pub struct PropNode {
    tag: TypeTag,
    group_open: bool,
}

impl PropNode {
    pub fn new(tag: TypeTag) -> Self {
        Self {
            tag,
            group_open: false,
        }
    }
}

impl NodeBehavior for PropNode {
    fn tag(&self) -> TypeTag {
        self.tag
    }

    fn render(&mut self, node: &ViewNode, phase: Phase) -> Result<(), TraversalError> {
        match phase {
            Phase::Enter => {
                let Some(prop) = node.renderable() else {
                    return Ok(());
                };
                if prop.get_bool(props::VISIBILITY)? {
                    node.graphics_context()?
                        .borrow_mut()
                        .push_debug_group(&debug_label(&prop))?;
                    self.group_open = true;
                }
            }
            Phase::Leave => {
                if self.group_open {
                    self.group_open = false;
                    node.graphics_context()?.borrow_mut().pop_debug_group()?;
                }
            }
        }
        Ok(())
    }
}

/// Mapper or camera. No GPU effects of its own.
pub struct LeafNode(pub TypeTag);

impl NodeBehavior for LeafNode {
    fn tag(&self) -> TypeTag {
        self.0
    }
}
