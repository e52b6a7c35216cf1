use std::hint::black_box;
use std::sync::Arc;
use std::time::Instant;

use sceneview_object::TypeTag;
use sceneview_render::{FactoryRegistry, NodeBehavior, Pass, ViewNode};
use sceneview_scene::{Renderable, RenderableKind, props, tags};

struct Passive;

impl NodeBehavior for Passive {
    fn tag(&self) -> TypeTag {
        TypeTag::new("Passive")
    }
}

fn registry() -> Arc<FactoryRegistry> {
    let mut registry = FactoryRegistry::new();
    registry.register(tags::OBJECT, || Box::new(Passive));
    Arc::new(registry)
}

fn make_scene(renderers: usize, actors_per_renderer: usize) -> (Renderable, Vec<Renderable>) {
    let window = Renderable::new(RenderableKind::RenderWindow);
    let mut actors = Vec::new();
    for _ in 0..renderers {
        let renderer = Renderable::new(RenderableKind::Renderer);
        for _ in 0..actors_per_renderer {
            let actor = Renderable::new(RenderableKind::Actor);
            renderer.add_child(&actor).expect("add actor");
            actors.push(actor);
        }
        window.add_child(&renderer).expect("add renderer");
    }
    (window, actors)
}

fn bench_first_build(renderers: usize, actors: usize, iterations: usize) {
    let (window, _actors) = make_scene(renderers, actors);
    let registry = registry();

    let start = Instant::now();
    for _ in 0..iterations {
        let root = ViewNode::new_root(&window, registry.clone()).expect("root");
        root.traverse(Pass::Build).expect("build");
        black_box(root.subtree_len());
        root.release();
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  first build ({renderers}x{actors} nodes, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_steady_frame(renderers: usize, actors: usize, iterations: usize) {
    let (window, scene_actors) = make_scene(renderers, actors);
    let root = ViewNode::new_root(&window, registry()).expect("root");
    root.traverse(Pass::Build).expect("build");

    let start = Instant::now();
    for i in 0..iterations {
        // Touch one actor per frame so some nodes go stale.
        let actor = &scene_actors[i % scene_actors.len()];
        actor
            .set(props::VISIBILITY, i % 2 == 0)
            .expect("toggle visibility");
        root.traverse(black_box(Pass::Build)).expect("build");
        root.traverse(black_box(Pass::Render)).expect("render");
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  steady frame ({renderers}x{actors} nodes, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Traversal Benchmarks ===\n");

    println!("First build:");
    bench_first_build(4, 16, 200);
    bench_first_build(16, 64, 50);

    println!("\nSteady-state frames:");
    bench_steady_frame(4, 16, 1000);
    bench_steady_frame(16, 64, 200);

    println!("\n=== Done ===");
}
