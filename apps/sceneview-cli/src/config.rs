use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sceneview_render::RenderConfig;

/// Demo scene settings, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Renderers laid out in a grid across the window.
    pub renderers: usize,
    /// Volumes (each with a volume mapper) per renderer.
    pub volumes_per_renderer: usize,
    pub frames: u64,
    /// Toggle one volume's visibility every this many frames. 0 disables.
    pub toggle_every: u64,
    /// Frame after which the last renderer is removed. 0 disables.
    pub drop_renderer_after: u64,
    pub render: RenderConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            renderers: 4,
            volumes_per_renderer: 2,
            frames: 3,
            toggle_every: 1,
            drop_renderer_after: 0,
            render: RenderConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening scene config {}", path.display()))?;
        let config = serde_json::from_reader(file)
            .with_context(|| format!("parsing scene config {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
