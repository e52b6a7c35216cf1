use std::fmt::Write as _;

use crate::node::ViewNode;

/// Human-readable dump of a view tree, one line per node, indented by depth.
///
/// Useful for CLI output, logging, and asserting on tree shape.
pub fn describe(root: &ViewNode, frame: u64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== View Tree (frame={frame}) ===");
    let _ = writeln!(out, "Nodes: {}", root.subtree_len());
    describe_node(root, 0, &mut out);
    out
}

fn describe_node(node: &ViewNode, depth: usize, out: &mut String) {
    let source = match node.renderable() {
        Some(r) => r.class_name().to_string(),
        None => String::from("<dropped>"),
    };
    let _ = writeln!(
        out,
        "{:indent$}[{}] {} <- {} ({:?})",
        "",
        node.id().short(),
        node.class_name(),
        source,
        node.state(),
        indent = depth * 2
    );
    for child in node.children() {
        describe_node(&child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sceneview_object::TypeTag;
    use sceneview_scene::{Renderable, RenderableKind, tags};

    use crate::node::NodeBehavior;
    use crate::phase::Pass;
    use crate::registry::FactoryRegistry;

    struct Named(&'static str);

    impl NodeBehavior for Named {
        fn tag(&self) -> TypeTag {
            TypeTag::new(self.0)
        }
    }

    #[test]
    fn describes_every_node() {
        let mut registry = FactoryRegistry::new();
        registry.register(tags::RENDER_WINDOW, || Box::new(Named("WindowNode")));
        registry.register(tags::RENDERER, || Box::new(Named("RendererNode")));
        let window = Renderable::new(RenderableKind::RenderWindow);
        let renderer = Renderable::new(RenderableKind::Renderer);
        window.add_child(&renderer).unwrap();

        let root = ViewNode::new_root(&window, Arc::new(registry)).unwrap();
        root.traverse(Pass::Build).unwrap();
        let output = describe(&root, 3);

        assert!(output.contains("frame=3"));
        assert!(output.contains("Nodes: 2"));
        assert!(output.contains("WindowNode <- RenderWindow (Built)"));
        assert!(output.contains("  ["));
        assert!(output.contains("RendererNode <- Renderer"));
    }

    #[test]
    fn dropped_renderable_is_marked() {
        let mut registry = FactoryRegistry::new();
        registry.register(tags::RENDER_WINDOW, || Box::new(Named("WindowNode")));
        let root = {
            let window = Renderable::new(RenderableKind::RenderWindow);
            ViewNode::new_root(&window, Arc::new(registry)).unwrap()
        };
        assert!(describe(&root, 0).contains("<dropped>"));
    }
}
