mod config;
mod scene;

use std::path::PathBuf;
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sceneview_render::{FactoryRegistry, RecordingContext, RenderView, SharedContext};
use sceneview_render_wgpu::WgpuContext;

use crate::config::SceneConfig;
use crate::scene::DemoScene;

#[derive(Parser)]
#[command(name = "sceneview-cli", about = "Render scene-graph demos and inspect view trees")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Render a many-renderer scene for a number of frames
    Demo {
        /// JSON scene config; flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of renderers
        #[arg(short, long)]
        renderers: Option<usize>,
        /// Volumes per renderer
        #[arg(long)]
        volumes: Option<usize>,
        /// Number of frames to render
        #[arg(short, long)]
        frames: Option<u64>,
        /// Render through a headless wgpu device instead of the recording context
        #[arg(long)]
        gpu: bool,
    },
    /// Build the demo scene once and print its view tree
    Tree {
        /// Number of renderers
        #[arg(short, long, default_value = "2")]
        renderers: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let registry = sceneview_render_wgpu::registry().install()?;

    match cli.command {
        Commands::Info => {
            println!("sceneview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("object: {}", sceneview_object::crate_info());
            println!("scene: {}", sceneview_scene::crate_info());
            println!("render: {}", sceneview_render::crate_info());
            println!("render-wgpu: {}", sceneview_render_wgpu::crate_info());
            println!("registered kinds: {}", registry.len());
        }
        Commands::Demo {
            config,
            renderers,
            volumes,
            frames,
            gpu,
        } => {
            let mut config = match config {
                Some(path) => SceneConfig::load(path)?,
                None => SceneConfig::default(),
            };
            if let Some(renderers) = renderers {
                config.renderers = renderers;
            }
            if let Some(volumes) = volumes {
                config.volumes_per_renderer = volumes;
            }
            if let Some(frames) = frames {
                config.frames = frames;
            }
            run_demo(&config, gpu)?;
        }
        Commands::Tree { renderers } => {
            let config = SceneConfig {
                renderers,
                frames: 1,
                ..SceneConfig::default()
            };
            let scene = DemoScene::build(&config)?;
            let mut view = new_view(&scene, &config)?;
            view.set_surface(RecordingContext::shared(
                config.render.width,
                config.render.height,
            ));
            view.render()?;
            print!("{}", view.describe());
        }
    }

    Ok(())
}

/// A view over the demo window using the process-wide node registry.
fn new_view(scene: &DemoScene, config: &SceneConfig) -> anyhow::Result<RenderView> {
    let registry = FactoryRegistry::global().context("node registry not installed")?;
    Ok(RenderView::new(
        scene.window.clone(),
        registry,
        config.render.clone(),
    ))
}

fn run_demo(config: &SceneConfig, gpu: bool) -> anyhow::Result<()> {
    println!(
        "Demo: {} renderers x {} volumes, {} frames",
        config.renderers, config.volumes_per_renderer, config.frames
    );

    let mut scene = DemoScene::build(config)?;
    let mut view = new_view(&scene, config)?;
    let (width, height) = (config.render.width, config.render.height);
    let recording = RecordingContext::shared(width, height);
    let surface: SharedContext = if gpu {
        let context = WgpuContext::headless(width, height)?;
        std::rc::Rc::new(std::cell::RefCell::new(context))
    } else {
        recording.clone()
    };
    view.set_surface(surface);
    view.initialize()?;

    for frame in 1..=config.frames {
        let stats = view.render()?;
        println!("{stats}");
        scene.mutate(&view, frame, config)?;
    }

    if !gpu {
        let recording = recording.borrow();
        println!(
            "Recorded {} commands, {} clears, {} frames presented",
            recording.commands().len(),
            recording.clears().len(),
            recording.frames_presented()
        );
    }
    Ok(())
}
